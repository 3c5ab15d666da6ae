pub mod handlers;
pub mod models;

use async_trait::async_trait;
use axum::{routing::get, Router};
use courselib_kernel::{InitCtx, Module};
use courselib_store::{seed, LibraryStore};
use serde_json::json;

use handlers::{authors_options, create_author, delete_author, get_author, list_authors};

/// Authors resource at `/api/authors`.
pub struct AuthorsModule {
    store: LibraryStore,
}

impl AuthorsModule {
    pub fn new(store: LibraryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if ctx.settings.library.seed_demo_data && self.store.author_count().await == 0 {
            let applied = self.store.seed(seed::demo_authors()).await?;
            tracing::info!(module = self.name(), applied, "demo authors seeded");
        }

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "authors module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route(
                "/",
                get(list_authors)
                    .post(create_author)
                    .options(authors_options),
            )
            .route("/{author_id}", get(get_author).delete(delete_author))
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List authors",
                        "tags": ["Authors"],
                        "parameters": [
                            {
                                "name": "mainCategory",
                                "in": "query",
                                "required": false,
                                "schema": { "type": "string" }
                            },
                            {
                                "name": "searchQuery",
                                "in": "query",
                                "required": false,
                                "schema": { "type": "string" }
                            },
                            {
                                "name": "matchCase",
                                "in": "query",
                                "required": false,
                                "schema": { "type": "boolean", "default": false }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Authors matching the filters",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Author" }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create an author, optionally with courses",
                        "tags": ["Authors"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/AuthorForCreate" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Author created",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Author" }
                                    }
                                }
                            },
                            "400": {
                                "description": "Malformed body",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            },
                            "422": {
                                "description": "Validation failed",
                                "content": {
                                    "application/problem+json": {
                                        "schema": { "$ref": "#/components/schemas/ValidationProblem" }
                                    }
                                }
                            }
                        }
                    },
                    "options": {
                        "summary": "Allowed methods",
                        "tags": ["Authors"],
                        "responses": {
                            "200": {
                                "description": "The Allow header lists the methods",
                                "headers": {
                                    "Allow": { "schema": { "type": "string" } }
                                }
                            }
                        }
                    }
                },
                "/{author_id}": {
                    "parameters": [
                        {
                            "name": "author_id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "string", "format": "uuid" }
                        }
                    ],
                    "get": {
                        "summary": "Get one author",
                        "tags": ["Authors"],
                        "responses": {
                            "200": {
                                "description": "The author",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Author" }
                                    }
                                }
                            },
                            "404": {
                                "description": "Author not found",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    },
                    "delete": {
                        "summary": "Delete an author and its courses",
                        "tags": ["Authors"],
                        "responses": {
                            "204": { "description": "Author deleted" },
                            "404": {
                                "description": "Author not found",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Author": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "format": "uuid" },
                            "name": { "type": "string" },
                            "age": { "type": "integer" },
                            "mainCategory": { "type": "string" }
                        },
                        "required": ["id", "name", "age", "mainCategory"]
                    },
                    "AuthorForCreate": {
                        "type": "object",
                        "properties": {
                            "firstName": { "type": "string", "maxLength": 50 },
                            "lastName": { "type": "string", "maxLength": 50 },
                            "dateOfBirth": { "type": "string", "format": "date" },
                            "mainCategory": { "type": "string", "maxLength": 50 },
                            "courses": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/CourseForCreate" }
                            }
                        },
                        "required": ["firstName", "lastName", "dateOfBirth", "mainCategory"]
                    }
                }
            }
        }))
    }
}
