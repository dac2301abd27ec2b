use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex as StdMutex,
    },
};

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use shared::{
    domain::{AlbumId, Photo, PhotoId},
    protocol::{PhotoCountQuery, PhotoPageQuery},
};
use tokio::{net::TcpListener, sync::Notify};

use crate::{error::FetchError, transport::PhotoApi};

const TITLE_WORDS: [&str; 4] = ["cat nap", "harbor at dusk", "dog walk", "sleepy cat"];

pub(crate) fn sample_photos(count: i64) -> Vec<Photo> {
    (1..=count)
        .map(|id| Photo {
            id: PhotoId(id),
            album_id: AlbumId((id - 1) / 50 + 1),
            title: format!("{} {id}", TITLE_WORDS[(id as usize - 1) % TITLE_WORDS.len()]),
            url: format!("https://via.placeholder.com/600/{id}"),
            thumbnail_url: format!("https://via.placeholder.com/150/{id}"),
        })
        .collect()
}

fn matching<'a>(photos: &'a [Photo], title_like: Option<&str>) -> Vec<&'a Photo> {
    let needle = title_like.map(str::to_ascii_lowercase);
    photos
        .iter()
        .filter(|photo| match &needle {
            Some(needle) => photo.title.to_ascii_lowercase().contains(needle),
            None => true,
        })
        .collect()
}

/// Photo service kept in memory; records every query it receives.
pub(crate) struct InMemoryPhotoApi {
    photos: Vec<Photo>,
    page_calls: StdMutex<Vec<PhotoPageQuery>>,
    count_calls: StdMutex<Vec<PhotoCountQuery>>,
    page_failure: StdMutex<Option<FetchError>>,
    count_failure: StdMutex<Option<FetchError>>,
    held_pages: StdMutex<HashMap<u32, Arc<Notify>>>,
    oversize_pages: AtomicBool,
}

impl InMemoryPhotoApi {
    pub(crate) fn with_photos(count: i64) -> Arc<Self> {
        Arc::new(Self {
            photos: sample_photos(count),
            page_calls: StdMutex::new(Vec::new()),
            count_calls: StdMutex::new(Vec::new()),
            page_failure: StdMutex::new(None),
            count_failure: StdMutex::new(None),
            held_pages: StdMutex::new(HashMap::new()),
            oversize_pages: AtomicBool::new(false),
        })
    }

    pub(crate) fn fail_pages_with(&self, error: Option<FetchError>) {
        *self.page_failure.lock().expect("lock") = error;
    }

    pub(crate) fn fail_counts_with(&self, error: Option<FetchError>) {
        *self.count_failure.lock().expect("lock") = error;
    }

    /// Page requests ignore `_limit` and return every match from `_start` on.
    pub(crate) fn oversize_pages(&self, enabled: bool) {
        self.oversize_pages.store(enabled, Ordering::SeqCst);
    }

    /// The next page request at `start` blocks until the returned gate is notified.
    pub(crate) fn hold_page(&self, start: u32) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.held_pages
            .lock()
            .expect("lock")
            .insert(start, Arc::clone(&gate));
        gate
    }

    pub(crate) fn page_calls(&self) -> Vec<PhotoPageQuery> {
        self.page_calls.lock().expect("lock").clone()
    }

    pub(crate) fn count_calls(&self) -> Vec<PhotoCountQuery> {
        self.count_calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl PhotoApi for InMemoryPhotoApi {
    async fn fetch_page(&self, query: &PhotoPageQuery) -> Result<Vec<Photo>, FetchError> {
        self.page_calls.lock().expect("lock").push(query.clone());
        let gate = self.held_pages.lock().expect("lock").remove(&query.start);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(error) = self.page_failure.lock().expect("lock").clone() {
            return Err(error);
        }
        let limit = if self.oversize_pages.load(Ordering::SeqCst) {
            usize::MAX
        } else {
            query.limit as usize
        };
        Ok(matching(&self.photos, query.title_like.as_deref())
            .into_iter()
            .skip(query.start as usize)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_matches(&self, query: &PhotoCountQuery) -> Result<u64, FetchError> {
        self.count_calls.lock().expect("lock").push(query.clone());
        if let Some(error) = self.count_failure.lock().expect("lock").clone() {
            return Err(error);
        }
        Ok(matching(&self.photos, query.title_like.as_deref()).len() as u64)
    }
}

#[derive(Clone, Default)]
pub(crate) struct CatalogBehavior {
    pub(crate) page_status: Option<StatusCode>,
    pub(crate) count_status: Option<StatusCode>,
    pub(crate) malformed_body: bool,
}

#[derive(Clone)]
struct CatalogState {
    photos: Arc<Vec<Photo>>,
    behavior: CatalogBehavior,
    seen: Arc<StdMutex<Vec<HashMap<String, String>>>>,
}

pub(crate) struct CatalogServer {
    pub(crate) url: String,
    seen: Arc<StdMutex<Vec<HashMap<String, String>>>>,
}

impl CatalogServer {
    /// Raw query maps in arrival order.
    pub(crate) fn seen_queries(&self) -> Vec<HashMap<String, String>> {
        self.seen.lock().expect("lock").clone()
    }
}

async fn list_photos(
    State(state): State<CatalogState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.seen.lock().expect("lock").push(params.clone());

    let is_page = params.contains_key("_start");
    let failure = if is_page {
        state.behavior.page_status
    } else {
        state.behavior.count_status
    };
    if let Some(status) = failure {
        return status.into_response();
    }
    if state.behavior.malformed_body {
        return "<html>not json</html>".into_response();
    }

    let matches = matching(&state.photos, params.get("title_like").map(String::as_str));
    let body: Vec<Photo> = if is_page {
        let start = params
            .get("_start")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        let limit = params
            .get("_limit")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(usize::MAX);
        matches.into_iter().skip(start).take(limit).cloned().collect()
    } else {
        matches.into_iter().cloned().collect()
    };
    Json(body).into_response()
}

pub(crate) async fn spawn_catalog_server(
    photo_count: i64,
    behavior: CatalogBehavior,
) -> anyhow::Result<CatalogServer> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let seen = Arc::new(StdMutex::new(Vec::new()));
    let state = CatalogState {
        photos: Arc::new(sample_photos(photo_count)),
        behavior,
        seen: Arc::clone(&seen),
    };
    let app = Router::new()
        .route("/photos", get(list_photos))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(CatalogServer {
        url: format!("http://{addr}"),
        seen,
    })
}
