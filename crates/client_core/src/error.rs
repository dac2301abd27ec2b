use thiserror::Error;

/// Everything that can end a fetch cycle early.
///
/// The `Display` text is what the controller stores as `last_error`, so the
/// status variants always embed the numeric code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("photo page request failed with HTTP {status}")]
    PageStatus { status: u16 },
    #[error("photo count request failed with HTTP {status}")]
    CountStatus { status: u16 },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::PageStatus { status } | FetchError::CountStatus { status } => {
                Some(*status)
            }
            FetchError::Transport(_) | FetchError::Decode(_) => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }
}
