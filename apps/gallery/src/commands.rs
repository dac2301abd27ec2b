//! Terminal input lines → user intents → controller calls.

use anyhow::{anyhow, Context, Result};
use client_core::QueryState;
use shared::domain::{total_page_count, PageSize};

pub const HELP: &str = "\
Type to search titles (an empty line clears the search).
  /page N    jump to page N
  /next      next page
  /prev      previous page
  /first     first page
  /last      last page
  /size N    photos per page (10, 20, 50, 100)
  /clear     clear the search
  /help      show this help
  /quit      exit
Start a search with '//' to look for a literal leading '/'.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Search(String),
    GoToPage(u32),
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    PageSize(PageSize),
    Help,
    Quit,
}

pub fn parse_intent(line: &str) -> Result<Intent> {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(literal) = line.strip_prefix("//") {
        return Ok(Intent::Search(format!("/{literal}")));
    }
    let Some(command) = line.strip_prefix('/') else {
        return Ok(Intent::Search(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();
    match (name, arg) {
        ("page", Some(n)) => {
            let page = n
                .parse::<u32>()
                .with_context(|| format!("'{n}' is not a page number"))?;
            Ok(Intent::GoToPage(page))
        }
        ("size", Some(n)) => Ok(Intent::PageSize(n.parse::<PageSize>()?)),
        ("next", None) => Ok(Intent::NextPage),
        ("prev", None) => Ok(Intent::PrevPage),
        ("first", None) => Ok(Intent::FirstPage),
        ("last", None) => Ok(Intent::LastPage),
        ("clear", None) => Ok(Intent::Search(String::new())),
        ("help", None) => Ok(Intent::Help),
        ("quit" | "exit", None) => Ok(Intent::Quit),
        _ => Err(anyhow!("unknown command '/{command}', try /help")),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetSearch(String),
    SetPage(u32),
    SetPageSize(PageSize),
    ShowHelp,
    Quit,
    Refused(String),
}

/// Maps an intent onto a controller call. Navigation is confined to
/// `[1, total pages]` and refused while a fetch is in flight.
pub fn resolve(intent: Intent, state: &QueryState) -> Action {
    let total_pages = total_page_count(state.total_match_count, state.page_size);
    let target = match intent {
        Intent::Search(text) => return Action::SetSearch(text),
        Intent::Help => return Action::ShowHelp,
        Intent::Quit => return Action::Quit,
        Intent::PageSize(_)
        | Intent::GoToPage(_)
        | Intent::NextPage
        | Intent::PrevPage
        | Intent::FirstPage
        | Intent::LastPage
            if state.is_loading =>
        {
            return Action::Refused("still loading, try again in a moment".into());
        }
        Intent::PageSize(size) => return Action::SetPageSize(size),
        Intent::GoToPage(page) => page,
        Intent::NextPage => state.page_number.saturating_add(1),
        Intent::PrevPage => state.page_number.saturating_sub(1),
        Intent::FirstPage => 1,
        Intent::LastPage => total_pages,
    };

    if target == 0 || target > total_pages {
        return Action::Refused(format!("no page {target} (1-{total_pages})"));
    }
    if target == state.page_number {
        return Action::Refused(format!("already on page {target}"));
    }
    Action::SetPage(target)
}
