//! Storage of book records.
//!
//! Every operation holds the collection lock for its whole duration, so a
//! lookup followed by a write cannot interleave with another request.

use std::sync::{Mutex, MutexGuard};

use time::OffsetDateTime;

use super::error::BookError;
use super::models::{Book, BookFilter, BookId, BookPayload, BookSummary};

/// The five book operations
pub trait BookRepository: Send + Sync {
    /// Validate and append a new record, returning its id
    fn add(&self, payload: BookPayload) -> Result<BookId, BookError>;

    /// Summaries of the records matching `filter`, in insertion order
    fn list(&self, filter: &BookFilter) -> Result<Vec<BookSummary>, BookError>;

    fn get(&self, id: &str) -> Result<Book, BookError>;

    /// Validate, then replace every mutable field of record `id`
    fn update(&self, id: &str, payload: BookPayload) -> Result<(), BookError>;

    fn delete(&self, id: &str) -> Result<(), BookError>;

    /// Number of stored records
    fn len(&self) -> Result<usize, BookError>;
}

/// Process-local collection; emptied when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryBookRepository {
    books: Mutex<Vec<Book>>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn books(&self) -> Result<MutexGuard<'_, Vec<Book>>, BookError> {
        self.books
            .lock()
            .map_err(|_| BookError::Storage("book collection lock poisoned".to_string()))
    }

    fn unused_id(books: &[Book]) -> BookId {
        loop {
            let id = BookId::generate();
            if books.iter().all(|book| book.id != id) {
                return id;
            }
        }
    }
}

impl BookRepository for InMemoryBookRepository {
    fn add(&self, payload: BookPayload) -> Result<BookId, BookError> {
        let details = payload.validate()?;
        let mut books = self.books()?;

        let id = Self::unused_id(&books);
        books.push(Book::create(id.clone(), details, OffsetDateTime::now_utc()));

        tracing::info!(book_id = %id, total = books.len(), "book added");
        Ok(id)
    }

    fn list(&self, filter: &BookFilter) -> Result<Vec<BookSummary>, BookError> {
        let books = self.books()?;
        Ok(books
            .iter()
            .filter(|book| filter.matches(book))
            .map(Book::summary)
            .collect())
    }

    fn get(&self, id: &str) -> Result<Book, BookError> {
        self.books()?
            .iter()
            .find(|book| book.id.as_str() == id)
            .cloned()
            .ok_or_else(|| BookError::NotFound(BookId::from(id.to_string())))
    }

    fn update(&self, id: &str, payload: BookPayload) -> Result<(), BookError> {
        let details = payload.validate()?;
        let mut books = self.books()?;

        let book = books
            .iter_mut()
            .find(|book| book.id.as_str() == id)
            .ok_or_else(|| BookError::NotFound(BookId::from(id.to_string())))?;
        book.apply(details, OffsetDateTime::now_utc());

        tracing::info!(book_id = %id, finished = book.finished, "book updated");
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), BookError> {
        let mut books = self.books()?;

        let index = books
            .iter()
            .position(|book| book.id.as_str() == id)
            .ok_or_else(|| BookError::NotFound(BookId::from(id.to_string())))?;
        books.remove(index);

        tracing::info!(book_id = %id, total = books.len(), "book deleted");
        Ok(())
    }

    fn len(&self) -> Result<usize, BookError> {
        Ok(self.books()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn payload(name: &str, page_count: u32, read_page: u32, reading: bool) -> BookPayload {
        BookPayload {
            name: Some(name.to_string()),
            year: 1965,
            author: "Frank Herbert".to_string(),
            summary: "Spice".to_string(),
            publisher: format!("{name} Press"),
            page_count,
            read_page,
            reading,
        }
    }

    fn filter(name: Option<&str>, reading: Option<bool>, finished: Option<bool>) -> BookFilter {
        BookFilter {
            name: name.map(str::to_string),
            reading,
            finished,
        }
    }

    #[test]
    fn add_grows_collection_with_unique_ids() {
        let repo = InMemoryBookRepository::new();
        let mut ids = HashSet::new();

        for n in 0..50 {
            let id = repo.add(payload(&format!("Book {n}"), 10, 1, false)).unwrap();
            assert!(ids.insert(id));
            assert_eq!(repo.len().unwrap(), n + 1);
        }
    }

    #[test]
    fn rejected_add_leaves_collection_untouched() {
        let repo = InMemoryBookRepository::new();

        let missing = BookPayload {
            name: None,
            ..payload("x", 10, 1, false)
        };
        assert_eq!(repo.add(missing).unwrap_err(), BookError::MissingName);
        assert!(repo.add(payload("Dune", 400, 401, false)).unwrap_err().is_validation());
        assert_eq!(repo.len().unwrap(), 0);
    }

    #[test]
    fn get_returns_full_record_with_derived_finished() {
        let repo = InMemoryBookRepository::new();
        let id = repo.add(payload("Dune", 400, 400, false)).unwrap();

        let book = repo.get(id.as_str()).unwrap();
        assert_eq!(book.id, id);
        assert_eq!(book.name, "Dune");
        assert!(book.finished);
        assert_eq!(book.inserted_at, book.updated_at);

        assert_eq!(
            repo.get("missing").unwrap_err(),
            BookError::NotFound(BookId::from("missing".to_string()))
        );
    }

    #[test]
    fn list_filters_are_conjunctive_and_keep_order() {
        let repo = InMemoryBookRepository::new();
        let war = repo.add(payload("War and Peace", 1200, 100, true)).unwrap();
        let art = repo.add(payload("The Art of War", 90, 90, false)).unwrap();
        repo.add(payload("Dune", 400, 12, true)).unwrap();

        let all = repo.list(&BookFilter::default()).unwrap();
        assert_eq!(all.len(), 3);

        let by_name = repo.list(&filter(Some("WAR"), None, None)).unwrap();
        let ids: Vec<_> = by_name.iter().map(|b| b.id.clone()).collect();
        assert_eq!(ids, vec![war.clone(), art.clone()]);

        let reading_war = repo.list(&filter(Some("war"), Some(true), None)).unwrap();
        assert_eq!(reading_war.len(), 1);
        assert_eq!(reading_war[0].id, war);

        let finished = repo.list(&filter(None, None, Some(true))).unwrap();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].name, "The Art of War");
        assert_eq!(finished[0].publisher, "The Art of War Press");

        assert!(repo
            .list(&filter(Some("dune"), Some(false), None))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn update_replaces_fields_but_keeps_identity() {
        let repo = InMemoryBookRepository::new();
        let id = repo.add(payload("Dune", 400, 12, true)).unwrap();
        let before = repo.get(id.as_str()).unwrap();

        repo.update(
            id.as_str(),
            BookPayload {
                name: Some("Dune Messiah".to_string()),
                year: 1969,
                author: "F. Herbert".to_string(),
                summary: "Sequel".to_string(),
                publisher: "Putnam".to_string(),
                page_count: 256,
                read_page: 256,
                reading: false,
            },
        )
        .unwrap();

        let after = repo.get(id.as_str()).unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.inserted_at, before.inserted_at);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(after.name, "Dune Messiah");
        assert_eq!(after.year, 1969);
        assert_eq!(after.publisher, "Putnam");
        assert_eq!(after.page_count, 256);
        assert!(after.finished);
        assert!(!after.reading);
    }

    #[test]
    fn invalid_update_is_rejected_before_lookup() {
        let repo = InMemoryBookRepository::new();
        let id = repo.add(payload("Dune", 400, 400, false)).unwrap();
        let before = repo.get(id.as_str()).unwrap();

        let err = repo
            .update(id.as_str(), payload("Dune", 400, 500, false))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(repo.get(id.as_str()).unwrap(), before);

        let err = repo
            .update("missing", payload("Dune", 400, 500, false))
            .unwrap_err();
        assert!(err.is_validation());

        let err = repo.update("missing", payload("Dune", 1, 1, false)).unwrap_err();
        assert!(matches!(err, BookError::NotFound(_)));
    }

    #[test]
    fn delete_removes_only_the_target() {
        let repo = InMemoryBookRepository::new();
        let first = repo.add(payload("First", 1, 1, false)).unwrap();
        let second = repo.add(payload("Second", 1, 1, false)).unwrap();
        let third = repo.add(payload("Third", 1, 1, false)).unwrap();

        repo.delete(second.as_str()).unwrap();
        let ids: Vec<_> = repo
            .list(&BookFilter::default())
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec![first, third]);

        assert!(matches!(
            repo.delete(second.as_str()).unwrap_err(),
            BookError::NotFound(_)
        ));
        assert_eq!(repo.len().unwrap(), 2);
    }

    #[test]
    fn poisoned_lock_surfaces_as_storage_error() {
        let repo = Arc::new(InMemoryBookRepository::new());

        let poisoner = repo.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.books.lock().unwrap();
            panic!("poison the collection");
        })
        .join();

        let err = repo.add(payload("Dune", 1, 1, false)).unwrap_err();
        assert!(matches!(err, BookError::Storage(_)));
    }

    #[test]
    fn concurrent_adds_are_all_kept() {
        let repo = Arc::new(InMemoryBookRepository::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let repo = repo.clone();
                std::thread::spawn(move || {
                    for n in 0..25 {
                        repo.add(payload(&format!("Book {t}-{n}"), 5, 0, true))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(repo.len().unwrap(), 200);
    }
}
