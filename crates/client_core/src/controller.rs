//! Search/pagination state controller.
//!
//! The controller owns the query state of one gallery session. The view reads
//! it through [`QueryController::snapshot`] or the event stream, and writes it
//! only through the three setters. Every change to the
//! `(page_number, page_size, effective_search_text)` triple dispatches a fetch
//! cycle made of a page request and a count request.

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use shared::{
    domain::{FetchParams, PageSize, Photo},
    error::ValidationError,
    protocol::{PhotoCountQuery, PhotoPageQuery},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

use crate::{config::Settings, debounce::Debouncer, transport::PhotoApi};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub raw_search_text: String,
    pub effective_search_text: String,
    pub page_number: u32,
    pub page_size: PageSize,
    pub results: Vec<Photo>,
    pub total_match_count: u64,
    pub is_loading: bool,
    pub last_error: Option<String>,
}

impl QueryState {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            raw_search_text: String::new(),
            effective_search_text: String::new(),
            page_number: 1,
            page_size,
            results: Vec::new(),
            total_match_count: 0,
            is_loading: false,
            last_error: None,
        }
    }

    pub fn fetch_params(&self) -> FetchParams {
        FetchParams {
            page_number: self.page_number,
            page_size: self.page_size,
            search: self.effective_search_text.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    StateChanged(QueryState),
    FetchDispatched { seq: u64, params: FetchParams },
    StaleResponseDiscarded { seq: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    pub debounce: Duration,
    pub page_size: PageSize,
    /// Commit an emptied search box without waiting for the debounce delay.
    pub immediate_clear: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            page_size: PageSize::default(),
            immediate_clear: false,
        }
    }
}

impl From<&Settings> for ControllerOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            debounce: settings.debounce(),
            page_size: settings.default_page_size,
            immediate_clear: settings.immediate_clear,
        }
    }
}

struct ControllerInner {
    state: QueryState,
    /// Sequence number of the most recently dispatched fetch cycle; 0 before mount.
    latest_seq: u64,
}

pub struct QueryController {
    api: Arc<dyn PhotoApi>,
    options: ControllerOptions,
    inner: Mutex<ControllerInner>,
    debouncer: Debouncer,
    events: broadcast::Sender<ControllerEvent>,
}

impl QueryController {
    pub fn new(api: Arc<dyn PhotoApi>, options: ControllerOptions) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            api,
            options,
            inner: Mutex::new(ControllerInner {
                state: QueryState::new(options.page_size),
                latest_seq: 0,
            }),
            debouncer: Debouncer::new(options.debounce),
            events,
        })
    }

    pub fn options(&self) -> ControllerOptions {
        self.options
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> QueryState {
        self.inner.lock().await.state.clone()
    }

    /// Mounts the controller: dispatches the first fetch cycle for the
    /// current triple. Calling it again is a no-op.
    ///
    /// Setters used before mounting only update state.
    pub async fn start(self: &Arc<Self>) {
        let mut inner = self.inner.lock().await;
        if inner.latest_seq == 0 {
            self.dispatch_locked(&mut inner);
        }
    }

    pub async fn set_search_text(self: &Arc<Self>, text: impl Into<String>) {
        let text = text.into();
        let clear_now = self.options.immediate_clear && text.is_empty();
        {
            let mut inner = self.inner.lock().await;
            inner.state.raw_search_text = text.clone();
            self.emit(ControllerEvent::StateChanged(inner.state.clone()));
        }

        if clear_now {
            self.debouncer.cancel().await;
            self.commit_search().await;
            return;
        }

        let controller = Arc::downgrade(self);
        self.debouncer
            .schedule(async move {
                if let Some(controller) = Weak::upgrade(&controller) {
                    controller.commit_scheduled_search(&text).await;
                }
            })
            .await;
    }

    /// Sets the page directly. Range checks against the total page count
    /// belong to the caller.
    pub async fn set_page_number(
        self: &Arc<Self>,
        page_number: u32,
    ) -> Result<(), ValidationError> {
        if page_number == 0 {
            return Err(ValidationError::ZeroPageNumber);
        }
        let mut inner = self.inner.lock().await;
        if inner.state.page_number != page_number {
            inner.state.page_number = page_number;
            self.after_dependency_change(&mut inner);
        }
        Ok(())
    }

    /// Changes the page size and keeps the current page number.
    pub async fn set_page_size(self: &Arc<Self>, page_size: PageSize) {
        let mut inner = self.inner.lock().await;
        if inner.state.page_size != page_size {
            inner.state.page_size = page_size;
            self.after_dependency_change(&mut inner);
        }
    }

    /// Commits `scheduled` only if it is still the raw text. A timer that
    /// elapsed just before a newer keystroke leaves that keystroke to its
    /// own quiet window.
    async fn commit_scheduled_search(self: &Arc<Self>, scheduled: &str) {
        let mut inner = self.inner.lock().await;
        if inner.state.raw_search_text != scheduled {
            debug!(scheduled, "search text changed before commit; skipping");
            return;
        }
        self.commit_locked(&mut inner);
    }

    async fn commit_search(self: &Arc<Self>) {
        let mut inner = self.inner.lock().await;
        self.commit_locked(&mut inner);
    }

    fn commit_locked(self: &Arc<Self>, inner: &mut ControllerInner) {
        let committed = inner.state.raw_search_text.clone();
        let changed =
            inner.state.effective_search_text != committed || inner.state.page_number != 1;
        inner.state.effective_search_text = committed;
        inner.state.page_number = 1;
        if changed {
            debug!(search = %inner.state.effective_search_text, "search text committed");
            self.after_dependency_change(inner);
        }
    }

    fn after_dependency_change(self: &Arc<Self>, inner: &mut ControllerInner) {
        if inner.latest_seq == 0 {
            self.emit(ControllerEvent::StateChanged(inner.state.clone()));
        } else {
            self.dispatch_locked(inner);
        }
    }

    fn dispatch_locked(self: &Arc<Self>, inner: &mut ControllerInner) {
        inner.latest_seq += 1;
        let seq = inner.latest_seq;
        inner.state.is_loading = true;
        inner.state.last_error = None;
        let params = inner.state.fetch_params();

        debug!(
            seq,
            page = params.page_number,
            page_size = params.page_size.get(),
            search = %params.search,
            "dispatching fetch cycle"
        );
        self.emit(ControllerEvent::FetchDispatched {
            seq,
            params: params.clone(),
        });
        self.emit(ControllerEvent::StateChanged(inner.state.clone()));

        let controller = Arc::clone(self);
        tokio::spawn(async move {
            controller.run_fetch_cycle(seq, params).await;
        });
    }

    async fn run_fetch_cycle(&self, seq: u64, params: FetchParams) {
        let page_query = PhotoPageQuery::from(&params);
        let count_query = PhotoCountQuery::from(&params);
        let outcome = futures::future::try_join(
            self.api.fetch_page(&page_query),
            self.api.count_matches(&count_query),
        )
        .await;

        let mut inner = self.inner.lock().await;
        if seq != inner.latest_seq {
            debug!(seq, latest = inner.latest_seq, "discarding stale fetch response");
            self.emit(ControllerEvent::StaleResponseDiscarded { seq });
            return;
        }

        let state = &mut inner.state;
        match outcome {
            Ok((mut photos, total)) => {
                photos.truncate(params.limit() as usize);
                state.results = photos;
                state.total_match_count = total;
                state.last_error = None;
            }
            Err(error) => {
                warn!(seq, page = params.page_number, %error, "fetch cycle failed");
                state.last_error = Some(error.to_string());
            }
        }
        state.is_loading = false;
        self.emit(ControllerEvent::StateChanged(inner.state.clone()));
    }

    fn emit(&self, event: ControllerEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
