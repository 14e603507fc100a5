use thiserror::Error;

use super::models::BookId;

/// Failures of the book operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("Please provide the book name")]
    MissingName,

    #[error("readPage must not be greater than pageCount")]
    ReadPageExceedsPageCount { read_page: u32, page_count: u32 },

    #[error("Id not found")]
    NotFound(BookId),

    #[error("book storage unavailable: {0}")]
    Storage(String),
}

impl BookError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BookError::MissingName | BookError::ReadPageExceedsPageCount { .. }
        )
    }
}
