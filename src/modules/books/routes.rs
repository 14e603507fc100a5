//! HTTP handlers for `/books`.

use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use bookshelf_http::{ApiResponse, AppError, AppResult, JsonBody, QueryParams};

use super::error::BookError;
use super::models::{Book, BookFilter, BookId, BookPayload, BookSummary};
use super::repository::BookRepository;

pub type SharedBookRepository = Arc<dyn BookRepository>;

/// Query string of `GET /books`. Flags use `1`/`0`.
#[derive(Debug, Default, Deserialize)]
pub struct ListBooksQuery {
    pub name: Option<String>,
    pub reading: Option<String>,
    pub finished: Option<String>,
}

impl From<ListBooksQuery> for BookFilter {
    fn from(query: ListBooksQuery) -> Self {
        Self {
            name: query.name.filter(|name| !name.is_empty()),
            reading: query.reading.as_deref().map(parse_flag),
            finished: query.finished.as_deref().map(parse_flag),
        }
    }
}

/// `"1"` is true, anything else false.
fn parse_flag(value: &str) -> bool {
    value == "1"
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCreated {
    pub book_id: BookId,
}

#[derive(Debug, Serialize)]
pub struct BookList {
    pub books: Vec<BookSummary>,
}

#[derive(Debug, Serialize)]
pub struct BookDetail {
    pub book: Book,
}

pub fn router(books: SharedBookRepository) -> Router {
    Router::new()
        .route("/books", get(list_books).post(add_book))
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(books)
}

/// Map a domain failure to the envelope, prefixing the operation.
fn reject(action: &str, err: BookError) -> AppError {
    if err.is_validation() {
        return AppError::validation(format!("{action}. {err}"));
    }
    match err {
        BookError::NotFound(_) => AppError::not_found(format!("{action}. {err}")),
        _ => AppError::Internal(anyhow!(err).context(action.to_string())),
    }
}

async fn add_book(
    State(books): State<SharedBookRepository>,
    JsonBody(payload): JsonBody<BookPayload>,
) -> AppResult<(StatusCode, Json<ApiResponse<BookCreated>>)> {
    let book_id = books
        .add(payload)
        .map_err(|err| reject("Failed to add book", err))?;

    Ok(ApiResponse::success(BookCreated { book_id })
        .with_message("Book added successfully")
        .with_status(StatusCode::CREATED))
}

async fn list_books(
    State(books): State<SharedBookRepository>,
    QueryParams(query): QueryParams<ListBooksQuery>,
) -> AppResult<ApiResponse<BookList>> {
    let filter = BookFilter::from(query);
    let books = books
        .list(&filter)
        .map_err(|err| reject("Failed to list books", err))?;

    Ok(ApiResponse::success(BookList { books }))
}

async fn get_book(
    State(books): State<SharedBookRepository>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<BookDetail>> {
    match books.get(&id) {
        Ok(book) => Ok(ApiResponse::success(BookDetail { book })),
        Err(BookError::NotFound(_)) => Err(AppError::not_found("Book not found")),
        Err(err) => Err(reject("Failed to fetch book", err)),
    }
}

async fn update_book(
    State(books): State<SharedBookRepository>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<BookPayload>,
) -> AppResult<ApiResponse> {
    books
        .update(&id, payload)
        .map_err(|err| reject("Failed to update book", err))?;

    Ok(ApiResponse::done("Book updated successfully"))
}

async fn delete_book(
    State(books): State<SharedBookRepository>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse> {
    books
        .delete(&id)
        .map_err(|err| reject("Failed to delete book", err))?;

    Ok(ApiResponse::done("Book deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(name: Option<&str>, reading: Option<&str>, finished: Option<&str>) -> ListBooksQuery {
        ListBooksQuery {
            name: name.map(str::to_string),
            reading: reading.map(str::to_string),
            finished: finished.map(str::to_string),
        }
    }

    #[test]
    fn flags_parse_at_the_boundary() {
        let filter = BookFilter::from(query(Some("war"), Some("1"), Some("0")));
        assert_eq!(filter.name.as_deref(), Some("war"));
        assert_eq!(filter.reading, Some(true));
        assert_eq!(filter.finished, Some(false));

        let filter = BookFilter::from(query(None, Some("yes"), None));
        assert_eq!(filter.reading, Some(false));
        assert_eq!(filter.finished, None);
    }

    #[test]
    fn empty_name_filter_is_ignored() {
        let filter = BookFilter::from(query(Some(""), None, None));
        assert_eq!(filter, BookFilter::default());
    }

    #[test]
    fn reject_prefixes_the_action() {
        let err = reject("Failed to add book", BookError::MissingName);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "validation error: Failed to add book. Please provide the book name"
        );

        let err = reject(
            "Failed to delete book",
            BookError::NotFound(BookId::from("x".to_string())),
        );
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = reject(
            "Failed to add book",
            BookError::Storage("lock poisoned".to_string()),
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to add book");
    }
}
