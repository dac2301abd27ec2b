/// Number of consecutive page numbers shown around the current page.
const WINDOW: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageButton {
    Prev { enabled: bool },
    Page { number: u32, current: bool },
    Ellipsis,
    Next { enabled: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub current: u32,
    pub total_pages: u32,
    pub buttons: Vec<PageButton>,
    /// Every button is inert while a fetch is in flight.
    pub disabled: bool,
}

/// `None` when there is at most one page: the strip is not shown at all.
pub fn build(current: u32, total_pages: u32, loading: bool) -> Option<PaginationView> {
    if total_pages <= 1 {
        return None;
    }

    let mut start = current.saturating_sub(2).max(1);
    let end = total_pages.min(start + WINDOW - 1);
    if end.saturating_sub(start) < WINDOW - 1 && start > 1 {
        start = end.saturating_sub(WINDOW - 1).max(1);
    }

    let mut buttons = vec![PageButton::Prev {
        enabled: current != 1 && !loading,
    }];

    if start > 1 {
        buttons.push(PageButton::Page {
            number: 1,
            current: false,
        });
        if start > 2 {
            buttons.push(PageButton::Ellipsis);
        }
    }

    buttons.extend((start..=end).map(|number| PageButton::Page {
        number,
        current: number == current,
    }));

    if end < total_pages {
        if end < total_pages - 1 {
            buttons.push(PageButton::Ellipsis);
        }
        buttons.push(PageButton::Page {
            number: total_pages,
            current: false,
        });
    }

    buttons.push(PageButton::Next {
        enabled: current != total_pages && !loading,
    });

    Some(PaginationView {
        current,
        total_pages,
        buttons,
        disabled: loading,
    })
}
