use std::fmt::Write as _;

use client_core::QueryState;
use shared::domain::{total_page_count, PageSize, Photo};

use super::pagination::{self, PageButton, PaginationView};

const TITLE_WIDTH: usize = 48;
const PLACEHOLDER_IMAGE: &str = "[no-image]";

pub fn render(state: &QueryState) -> String {
    let mut out = String::new();
    render_header(&mut out, state);
    render_search(&mut out, state);
    render_grid(&mut out, state);

    let total_pages = total_page_count(state.total_match_count, state.page_size);
    if let Some(view) = pagination::build(state.page_number, total_pages, state.is_loading) {
        render_pagination(&mut out, &view);
    }
    out
}

fn render_header(out: &mut String, state: &QueryState) {
    let _ = writeln!(out, "Photo Gallery");
    if !state.is_loading {
        let _ = writeln!(
            out,
            "Showing {} of {} photos",
            state.results.len(),
            state.total_match_count
        );
    }

    let sizes = PageSize::ALL
        .iter()
        .map(|size| {
            if *size == state.page_size {
                format!("[{size}]")
            } else {
                size.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(out, "Photos per page: {sizes}");
}

fn render_search(out: &mut String, state: &QueryState) {
    let spinner = if state.is_loading { " ..." } else { "" };
    let _ = writeln!(out, "Search: {}{spinner}", state.raw_search_text);
}

fn render_grid(out: &mut String, state: &QueryState) {
    if let Some(error) = &state.last_error {
        let _ = writeln!(out, "Error: {error}");
        return;
    }
    if state.is_loading {
        let _ = writeln!(out, "Loading photos...");
        return;
    }
    if state.results.is_empty() {
        let _ = writeln!(out, "No photos found");
        return;
    }
    for photo in &state.results {
        render_card(out, photo);
    }
}

fn render_card(out: &mut String, photo: &Photo) {
    let _ = writeln!(
        out,
        "{PLACEHOLDER_IMAGE} {}  ID: {}  Album: {}",
        truncate_title(&photo.title),
        photo.id,
        photo.album_id
    );
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() <= TITLE_WIDTH {
        return title.to_string();
    }
    let mut short: String = title.chars().take(TITLE_WIDTH - 3).collect();
    short.push_str("...");
    short
}

fn render_pagination(out: &mut String, view: &PaginationView) {
    let _ = writeln!(out, "Page {} of {}", view.current, view.total_pages);
    let strip = view
        .buttons
        .iter()
        .map(|button| match button {
            PageButton::Prev { enabled: true } => "«".to_string(),
            PageButton::Prev { enabled: false } => "(«)".to_string(),
            PageButton::Next { enabled: true } => "»".to_string(),
            PageButton::Next { enabled: false } => "(»)".to_string(),
            PageButton::Page {
                number,
                current: true,
            } => format!("[{number}]"),
            PageButton::Page { number, .. } => number.to_string(),
            PageButton::Ellipsis => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");
    if view.disabled {
        let _ = writeln!(out, "{strip} (busy)");
    } else {
        let _ = writeln!(out, "{strip}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::{AlbumId, PhotoId};

    fn photo(id: i64, title: &str) -> Photo {
        Photo {
            id: PhotoId(id),
            album_id: AlbumId(1),
            title: title.to_string(),
            url: String::new(),
            thumbnail_url: String::new(),
        }
    }

    fn loaded(results: Vec<Photo>, total: u64) -> QueryState {
        let mut state = QueryState::new(PageSize::Ten);
        state.results = results;
        state.total_match_count = total;
        state
    }

    #[test]
    fn renders_cards_counts_and_pagination() {
        let results = (1..=10).map(|id| photo(id, "accusamus")).collect();
        let text = render(&loaded(results, 200));

        assert!(text.contains("Showing 10 of 200 photos"));
        assert!(text.contains("Photos per page: [10] 20 50 100"));
        assert!(text.contains("[no-image] accusamus  ID: 7  Album: 1"));
        assert!(text.contains("Page 1 of 20"));
        assert!(text.contains("(«) [1] 2 3 4 5 ... 20 »"));
    }

    #[test]
    fn single_page_has_no_pagination() {
        let text = render(&loaded(vec![photo(1, "only")], 1));
        assert!(!text.contains("Page 1 of"));
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let text = render(&loaded(Vec::new(), 0));
        assert!(text.contains("No photos found"));
        assert!(!text.contains("Error:"));
    }

    #[test]
    fn error_replaces_the_grid() {
        let mut state = loaded(vec![photo(1, "stale")], 30);
        state.last_error = Some("photo page request failed with HTTP 500".into());
        let text = render(&state);
        assert!(text.contains("Error: photo page request failed with HTTP 500"));
        assert!(!text.contains("stale"));
    }

    #[test]
    fn loading_hides_counts_and_marks_strip_busy() {
        let mut state = loaded(Vec::new(), 30);
        state.is_loading = true;
        state.raw_search_text = "cat".into();
        let text = render(&state);
        assert!(!text.contains("Showing"));
        assert!(text.contains("Search: cat ..."));
        assert!(text.contains("Loading photos..."));
        assert!(text.contains("(busy)"));
    }

    #[test]
    fn long_titles_are_shortened() {
        let title = "x".repeat(80);
        let short = truncate_title(&title);
        assert_eq!(short.chars().count(), TITLE_WIDTH);
        assert!(short.ends_with("..."));
    }
}
