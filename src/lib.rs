//! Bookshelf application library
//!
//! Feature modules plugged into the bookshelf kernel. Today that is the
//! in-memory book catalogue served under `/books`.

pub mod modules;

pub use modules::books::{
    error::BookError,
    models::{Book, BookFilter, BookId, BookPayload, BookSummary},
    repository::{BookRepository, InMemoryBookRepository},
    BooksModule,
};
pub use modules::register_all;
