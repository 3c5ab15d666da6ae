pub mod handlers;
pub mod models;
pub mod patch;

use async_trait::async_trait;
use axum::{routing::get, Router};
use courselib_kernel::{InitCtx, Module};
use courselib_store::LibraryStore;
use serde_json::{json, Value};

use handlers::{create_course, delete_course, get_course, list_courses, patch_course, upsert_course};

/// Courses of one author, nested under `/api/authors/{author_id}/courses`.
pub struct CoursesModule {
    store: LibraryStore,
}

impl CoursesModule {
    pub fn new(store: LibraryStore) -> Self {
        Self { store }
    }
}

fn uuid_param(name: &str) -> Value {
    json!({
        "name": name,
        "in": "path",
        "required": true,
        "schema": { "type": "string", "format": "uuid" }
    })
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn validation_response() -> Value {
    json!({
        "description": "Validation failed",
        "content": {
            "application/problem+json": {
                "schema": { "$ref": "#/components/schemas/ValidationProblem" }
            }
        }
    })
}

fn json_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{schema}") }
            }
        }
    })
}

fn course_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Course" }
            }
        }
    })
}

#[async_trait]
impl Module for CoursesModule {
    fn name(&self) -> &'static str {
        "courses"
    }

    fn base_path(&self) -> String {
        "/api/authors/{author_id}/courses".to_string()
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "courses module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_courses).post(create_course))
            .route(
                "/{course_id}",
                get(get_course)
                    .put(upsert_course)
                    .patch(patch_course)
                    .delete(delete_course),
            )
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<Value> {
        let author = uuid_param("author_id");
        let course = uuid_param("course_id");

        Some(json!({
            "paths": {
                "/": {
                    "parameters": [author],
                    "get": {
                        "summary": "List an author's courses, ordered by title",
                        "tags": ["Courses"],
                        "responses": {
                            "200": {
                                "description": "Courses of the author",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Course" }
                                        }
                                    }
                                }
                            },
                            "404": error_response("Author not found")
                        }
                    },
                    "post": {
                        "summary": "Create a course for an author",
                        "tags": ["Courses"],
                        "requestBody": json_body("CourseForCreate"),
                        "responses": {
                            "201": course_response("Course created"),
                            "400": error_response("Malformed body"),
                            "404": error_response("Author not found"),
                            "422": validation_response()
                        }
                    }
                },
                "/{course_id}": {
                    "parameters": [author, course],
                    "get": {
                        "summary": "Get one course",
                        "tags": ["Courses"],
                        "responses": {
                            "200": course_response("The course"),
                            "404": error_response("Author or course not found")
                        }
                    },
                    "put": {
                        "summary": "Replace a course, or create it with this id",
                        "tags": ["Courses"],
                        "requestBody": json_body("CourseForUpsert"),
                        "responses": {
                            "201": course_response("Course created with the given id"),
                            "204": { "description": "Course replaced" },
                            "404": error_response("Author not found"),
                            "409": error_response("Id is used by another author's course"),
                            "422": validation_response()
                        }
                    },
                    "patch": {
                        "summary": "Apply patch operations to a course, or create it with this id",
                        "tags": ["Courses"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/PatchOperation" }
                                    }
                                }
                            }
                        },
                        "responses": {
                            "201": course_response("Course created with the given id"),
                            "204": { "description": "Course updated" },
                            "404": error_response("Author not found"),
                            "409": error_response("Id is used by another author's course"),
                            "422": validation_response()
                        }
                    },
                    "delete": {
                        "summary": "Delete a course",
                        "tags": ["Courses"],
                        "responses": {
                            "204": { "description": "Course deleted" },
                            "404": error_response("Author or course not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Course": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "format": "uuid" },
                            "title": { "type": "string" },
                            "description": { "type": ["string", "null"] },
                            "authorId": { "type": "string", "format": "uuid" }
                        },
                        "required": ["id", "title", "authorId"]
                    },
                    "CourseForCreate": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "maxLength": 150 },
                            "description": { "type": "string", "maxLength": 1500 }
                        },
                        "required": ["title"]
                    },
                    "CourseForUpsert": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "maxLength": 150 },
                            "description": { "type": "string", "maxLength": 1500 }
                        },
                        "required": ["title", "description"]
                    },
                    "PatchOperation": {
                        "type": "object",
                        "properties": {
                            "op": {
                                "type": "string",
                                "enum": ["add", "remove", "replace", "move", "copy", "test"]
                            },
                            "path": { "type": "string", "example": "/title" },
                            "from": { "type": "string" },
                            "value": { "type": ["string", "null"] }
                        },
                        "required": ["op", "path"]
                    }
                }
            }
        }))
    }
}
