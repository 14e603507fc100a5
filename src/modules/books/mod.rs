pub mod error;
pub mod models;
pub mod repository;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};

use repository::{BookRepository, InMemoryBookRepository};
use routes::SharedBookRepository;

/// Books module: the in-memory catalogue and its `/books` endpoints
pub struct BooksModule {
    books: SharedBookRepository,
}

impl BooksModule {
    pub fn new(books: SharedBookRepository) -> Self {
        Self { books }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.books.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        match self.books.len() {
            Ok(discarded) => {
                tracing::info!(module = self.name(), discarded, "books module stopped")
            }
            Err(err) => tracing::warn!(
                module = self.name(),
                error = %err,
                "books module stopped; record count unavailable"
            ),
        }
        Ok(())
    }
}

/// Create the books module backed by a fresh, empty collection
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule::new(Arc::new(InMemoryBookRepository::new())))
}

fn fail_response(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/FailResponse" }
            }
        }
    })
}

fn success_response(description: &str, data: serde_json::Value) -> serde_json::Value {
    let mut properties = serde_json::json!({
        "status": { "type": "string", "enum": ["success"] },
        "message": { "type": "string" }
    });
    if !data.is_null() {
        properties["data"] = data;
    }

    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": properties,
                    "required": ["status"]
                }
            }
        }
    })
}

fn id_parameter() -> serde_json::Value {
    serde_json::json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    })
}

fn flag_parameter(name: &str, description: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "in": "query",
        "required": false,
        "description": description,
        "schema": { "type": "string", "enum": ["0", "1"] }
    })
}

fn payload_body() -> serde_json::Value {
    serde_json::json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookPayload" }
            }
        }
    })
}

fn openapi() -> serde_json::Value {
    serde_json::json!({
        "paths": {
            "/books": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "parameters": [
                        {
                            "name": "name",
                            "in": "query",
                            "required": false,
                            "description": "Case-insensitive substring of the book name",
                            "schema": { "type": "string" }
                        },
                        flag_parameter("reading", "1 for books being read, 0 otherwise"),
                        flag_parameter("finished", "1 for finished books, 0 otherwise")
                    ],
                    "responses": {
                        "200": success_response("Matching book summaries", serde_json::json!({
                            "type": "object",
                            "properties": {
                                "books": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/BookSummary" }
                                }
                            }
                        }))
                    }
                },
                "post": {
                    "summary": "Add a book",
                    "tags": ["Books"],
                    "requestBody": payload_body(),
                    "responses": {
                        "201": success_response("Book added", serde_json::json!({
                            "type": "object",
                            "properties": { "bookId": { "type": "string" } }
                        })),
                        "400": fail_response("Missing name, readPage above pageCount, or malformed body"),
                        "500": fail_response("Book could not be stored")
                    }
                }
            },
            "/books/{id}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": success_response("The full record", serde_json::json!({
                            "type": "object",
                            "properties": { "book": { "$ref": "#/components/schemas/Book" } }
                        })),
                        "404": fail_response("Book not found")
                    }
                },
                "put": {
                    "summary": "Replace a book",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "requestBody": payload_body(),
                    "responses": {
                        "200": success_response("Book updated", serde_json::Value::Null),
                        "400": fail_response("Missing name, readPage above pageCount, or malformed body"),
                        "404": fail_response("Id not found")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": success_response("Book deleted", serde_json::Value::Null),
                        "404": fail_response("Id not found")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "name": { "type": "string" },
                        "year": { "type": "integer" },
                        "author": { "type": "string" },
                        "summary": { "type": "string" },
                        "publisher": { "type": "string" },
                        "pageCount": { "type": "integer", "minimum": 0 },
                        "readPage": { "type": "integer", "minimum": 0 },
                        "finished": { "type": "boolean" },
                        "reading": { "type": "boolean" },
                        "insertedAt": { "type": "string", "format": "date-time" },
                        "updatedAt": { "type": "string", "format": "date-time" }
                    },
                    "required": [
                        "id", "name", "year", "author", "summary", "publisher", "pageCount",
                        "readPage", "finished", "reading", "insertedAt", "updatedAt"
                    ]
                },
                "BookSummary": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "name": { "type": "string" },
                        "publisher": { "type": "string" }
                    },
                    "required": ["id", "name", "publisher"]
                },
                "BookPayload": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "year": { "type": "integer" },
                        "author": { "type": "string" },
                        "summary": { "type": "string" },
                        "publisher": { "type": "string" },
                        "pageCount": { "type": "integer", "minimum": 0 },
                        "readPage": { "type": "integer", "minimum": 0 },
                        "reading": { "type": "boolean" }
                    },
                    "required": ["name"]
                }
            }
        }
    })
}
