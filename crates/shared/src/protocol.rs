use serde::{Deserialize, Serialize};

use crate::domain::FetchParams;

/// Query string of `GET /photos` for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoPageQuery {
    #[serde(rename = "_start")]
    pub start: u32,
    #[serde(rename = "_limit")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_like: Option<String>,
}

/// Query string of the unpaginated `GET /photos` used only for its length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoCountQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_like: Option<String>,
}

impl From<&FetchParams> for PhotoPageQuery {
    fn from(params: &FetchParams) -> Self {
        Self {
            start: params.offset(),
            limit: params.limit(),
            title_like: params.title_filter().map(str::to_owned),
        }
    }
}

impl From<&FetchParams> for PhotoCountQuery {
    fn from(params: &FetchParams) -> Self {
        Self {
            title_like: params.title_filter().map(str::to_owned),
        }
    }
}
