pub mod handlers;

use async_trait::async_trait;
use axum::{
    routing::{get, post},
    Router,
};
use courselib_kernel::Module;
use courselib_store::LibraryStore;
use serde_json::json;

use handlers::{create_author_collection, get_author_collection};

/// Batch author operations at `/api/authorcollections`.
pub struct AuthorCollectionsModule {
    store: LibraryStore,
}

impl AuthorCollectionsModule {
    pub fn new(store: LibraryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for AuthorCollectionsModule {
    fn name(&self) -> &'static str {
        "authorcollections"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", post(create_author_collection))
            .route("/{ids}", get(get_author_collection))
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "post": {
                        "summary": "Create several authors at once",
                        "tags": ["Author collections"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/AuthorForCreate" }
                                    }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Authors created; Location points at the collection",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Author" }
                                        }
                                    }
                                }
                            },
                            "400": {
                                "description": "Malformed or empty body",
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
                    }
                },
                "/{ids}": {
                    "get": {
                        "summary": "Get authors by a parenthesized id list",
                        "tags": ["Author collections"],
                        "parameters": [
                            {
                                "name": "ids",
                                "in": "path",
                                "required": true,
                                "description": "Comma-separated author ids wrapped in parentheses",
                                "schema": { "type": "string", "example": "(id1,id2)" }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Every requested author, by last then first name",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Author" }
                                        }
                                    }
                                }
                            },
                            "400": {
                                "description": "Missing or malformed id list",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            },
                            "404": {
                                "description": "At least one author was not found",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }))
    }
}
