use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::error::BookError;

const BOOK_ID_LEN: usize = 16;

/// Opaque record identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Fresh random 16-character alphanumeric id.
    pub fn generate() -> Self {
        let id = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(BOOK_ID_LEN)
            .map(char::from)
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BookId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored book record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub name: String,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    pub page_count: u32,
    pub read_page: u32,
    pub finished: bool,
    pub reading: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub inserted_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Book {
    /// Build a new record from a validated payload
    pub(crate) fn create(id: BookId, details: BookDetails, now: OffsetDateTime) -> Self {
        let finished = details.finished();
        Self {
            id,
            name: details.name,
            year: details.year,
            author: details.author,
            summary: details.summary,
            publisher: details.publisher,
            page_count: details.page_count,
            read_page: details.read_page,
            finished,
            reading: details.reading,
            inserted_at: now,
            updated_at: now,
        }
    }

    /// Replace every mutable field. `id` and `inserted_at` are kept and
    /// `updated_at` never moves backwards.
    pub(crate) fn apply(&mut self, details: BookDetails, now: OffsetDateTime) {
        self.finished = details.finished();
        self.name = details.name;
        self.year = details.year;
        self.author = details.author;
        self.summary = details.summary;
        self.publisher = details.publisher;
        self.page_count = details.page_count;
        self.read_page = details.read_page;
        self.reading = details.reading;
        self.updated_at = now.max(self.updated_at);
    }

    pub fn summary(&self) -> BookSummary {
        BookSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            publisher: self.publisher.clone(),
        }
    }
}

/// The `{id, name, publisher}` projection returned by listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookSummary {
    pub id: BookId,
    pub name: String,
    pub publisher: String,
}

/// Body of create and update requests.
///
/// `name` stays optional so a missing name reaches validation; a `finished`
/// key is ignored because the value is always derived.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookPayload {
    pub name: Option<String>,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    pub page_count: u32,
    pub read_page: u32,
    pub reading: bool,
}

impl BookPayload {
    /// Check the payload: name first, then the page bounds.
    pub fn validate(self) -> Result<BookDetails, BookError> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(BookError::MissingName),
        };

        if self.read_page > self.page_count {
            return Err(BookError::ReadPageExceedsPageCount {
                read_page: self.read_page,
                page_count: self.page_count,
            });
        }

        Ok(BookDetails {
            name,
            year: self.year,
            author: self.author,
            summary: self.summary,
            publisher: self.publisher,
            page_count: self.page_count,
            read_page: self.read_page,
            reading: self.reading,
        })
    }
}

/// A payload that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetails {
    pub name: String,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    pub page_count: u32,
    pub read_page: u32,
    pub reading: bool,
}

impl BookDetails {
    pub fn finished(&self) -> bool {
        self.read_page == self.page_count
    }
}

/// Conjunctive listing filter; `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub name: Option<String>,
    pub reading: Option<bool>,
    pub finished: Option<bool>,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        let name_matches = self.name.as_ref().map_or(true, |needle| {
            book.name.to_lowercase().contains(&needle.to_lowercase())
        });

        name_matches
            && self.reading.map_or(true, |reading| book.reading == reading)
            && self.finished.map_or(true, |finished| book.finished == finished)
    }
}
