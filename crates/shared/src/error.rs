use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("page size {0} is not one of 10, 20, 50, 100")]
    InvalidPageSize(u32),
    #[error("'{0}' is not a page size")]
    UnparseablePageSize(String),
    #[error("page numbers start at 1")]
    ZeroPageNumber,
}
