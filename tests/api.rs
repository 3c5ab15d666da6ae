use axum::{
    body::{to_bytes, Body},
    http::{
        header::{ACCEPT, ALLOW, CONTENT_TYPE, LOCATION},
        Method, Request, StatusCode,
    },
    response::Response,
    Router,
};
use courselib_app::build_app;
use courselib_kernel::settings::Settings;
use courselib_store::{seed::demo_authors, Author, LibraryStore};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    router: Router,
    store: LibraryStore,
}

impl TestApp {
    async fn empty() -> Self {
        let store = LibraryStore::new();
        let router = build_app(&store, &Settings::default()).await.unwrap();
        Self { router, store }
    }

    async fn seeded() -> Self {
        let app = Self::empty().await;
        app.store.seed(demo_authors()).await.unwrap();
        app
    }

    async fn author(&self, first_name: &str) -> Author {
        self.store
            .session()
            .get_authors()
            .await
            .into_iter()
            .find(|author| author.first_name == first_name)
            .unwrap()
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str) -> Response {
        self.send(Method::GET, uri, None).await
    }

    async fn get_accepting(&self, uri: &str, accept: &str) -> Response {
        let request = Request::builder()
            .uri(uri)
            .header(ACCEPT, accept)
            .body(Body::empty())
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response) -> String {
    response.headers()[LOCATION].to_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check_answers() {
    let app = TestApp::empty().await;
    assert_eq!(app.get("/healthz").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn list_authors_filters_by_category_and_search() {
    let app = TestApp::seeded().await;

    let response = app.get("/api/authors?mainCategory=Rum&searchQuery=ev").await;
    assert_eq!(response.status(), StatusCode::OK);

    let authors = body_json(response).await;
    let names: Vec<&str> = authors
        .as_array()
        .unwrap()
        .iter()
        .map(|author| author["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Eva Yneq"]);
}

#[tokio::test]
async fn list_authors_without_filters_returns_everyone() {
    let app = TestApp::seeded().await;

    let authors = body_json(app.get("/api/authors").await).await;
    assert_eq!(authors.as_array().unwrap().len(), 3);

    let authors = body_json(app.get("/api/authors?searchQuery=EV&matchCase=true").await).await;
    assert!(authors.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn head_and_options_on_authors() {
    let app = TestApp::seeded().await;

    let response = app.send(Method::HEAD, "/api/authors", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());

    let response = app.send(Method::OPTIONS, "/api/authors", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[ALLOW], "GET, OPTIONS, HEAD, POST");
}

#[tokio::test]
async fn get_author_maps_name_and_age() {
    let app = TestApp::seeded().await;
    let atherton = app.author("Atherton").await;

    let response = app.get(&format!("/api/authors/{}", atherton.id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let author = body_json(response).await;
    assert_eq!(author["id"], atherton.id.to_string());
    assert_eq!(author["name"], "Atherton Uldae");
    assert_eq!(author["mainCategory"], "Rum");
    assert!(author["age"].as_i64().unwrap() >= 25);

    let missing = app.get(&format!("/api/authors/{}", Uuid::new_v4())).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_author_assigns_ids_to_nested_courses() {
    let app = TestApp::empty().await;

    let response = app
        .send(
            Method::POST,
            "/api/authors",
            Some(json!({
                "firstName": "Nancy",
                "lastName": "Rye",
                "dateOfBirth": "1978-11-23",
                "mainCategory": "Singing",
                "courses": [
                    { "title": "Shanties", "description": "Songs for long voyages" },
                    { "title": "Ballads", "description": "Slow songs" }
                ]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let location = location(&response);
    let author = body_json(response).await;
    let author_id = author["id"].as_str().unwrap().to_string();
    assert_eq!(location, format!("/api/authors/{author_id}"));
    assert_eq!(author["name"], "Nancy Rye");

    let courses = body_json(app.get(&format!("{location}/courses")).await).await;
    let courses = courses.as_array().unwrap();
    assert_eq!(courses.len(), 2);
    assert_ne!(courses[0]["id"], courses[1]["id"]);
    assert!(courses.iter().all(|course| course["authorId"] == author_id.as_str()));
}

#[tokio::test]
async fn create_author_rejects_invalid_payloads() {
    let app = TestApp::empty().await;

    let response = app
        .send(
            Method::POST,
            "/api/authors",
            Some(json!({
                "firstName": "",
                "lastName": "Rye",
                "dateOfBirth": "1978-11-23",
                "mainCategory": "Singing",
                "courses": [{ "title": "Same", "description": "Same" }]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let problem = body_json(response).await;
    assert!(problem["errors"]["firstName"].is_array());
    assert!(problem["errors"]["courses[0]"].is_array());
    assert_eq!(app.store.author_count().await, 0);

    let response = app
        .send(Method::POST, "/api/authors", Some(json!({ "firstName": 3 })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_author_cascades_to_courses() {
    let app = TestApp::seeded().await;
    let eva = app.author("Eva").await;

    let response = app
        .send(Method::DELETE, &format!("/api/authors/{}", eva.id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let courses = app.get(&format!("/api/authors/{}/courses", eva.id)).await;
    assert_eq!(courses.status(), StatusCode::NOT_FOUND);

    let again = app
        .send(Method::DELETE, &format!("/api/authors/{}", eva.id), None)
        .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn author_collection_requires_every_id() {
    let app = TestApp::seeded().await;
    let eva = app.author("Eva").await;
    let atherton = app.author("Atherton").await;

    let response = app
        .get(&format!("/api/authorcollections/({},%20{})", eva.id, atherton.id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let authors = body_json(response).await;
    let names: Vec<&str> = authors
        .as_array()
        .unwrap()
        .iter()
        .map(|author| author["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Atherton Uldae", "Eva Yneq"]);

    let response = app
        .get(&format!("/api/authorcollections/({},{})", eva.id, Uuid::new_v4()))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn author_collection_rejects_malformed_lists() {
    let app = TestApp::seeded().await;
    let eva = app.author("Eva").await;

    for uri in [
        "/api/authorcollections/()".to_string(),
        format!("/api/authorcollections/({},not-a-guid)", eva.id),
        format!("/api/authorcollections/{}", eva.id),
    ] {
        let response = app.get(&uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn create_author_collection_location_fetches_the_batch() {
    let app = TestApp::empty().await;

    let response = app
        .send(
            Method::POST,
            "/api/authorcollections",
            Some(json!([
                {
                    "firstName": "Atherton",
                    "lastName": "Uldae",
                    "dateOfBirthday": "1999-04-03",
                    "mainCategory": "Rum",
                    "courses": [{ "Title": "Boxing", "Description": "The best gym ever" }]
                },
                {
                    "firstName": "Eva",
                    "lastName": "Yneq",
                    "dateOfBirthday": "1999-05-03",
                    "mainCategory": "Rum"
                }
            ])),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let location = location(&response);
    let created = body_json(response).await;
    assert_eq!(created.as_array().unwrap().len(), 2);
    assert!(location.starts_with("/api/authorcollections/("));

    let fetched = app.get(&location).await;
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(body_json(fetched).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn create_author_collection_is_all_or_nothing() {
    let app = TestApp::empty().await;

    let response = app
        .send(
            Method::POST,
            "/api/authorcollections",
            Some(json!([
                {
                    "firstName": "Eva",
                    "lastName": "Yneq",
                    "dateOfBirth": "1999-05-03",
                    "mainCategory": "Rum"
                },
                {
                    "firstName": "Nancy",
                    "lastName": "",
                    "dateOfBirth": "1978-11-23",
                    "mainCategory": "Singing"
                }
            ])),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let problem = body_json(response).await;
    assert!(problem["errors"]["[1].lastName"].is_array());
    assert_eq!(app.store.author_count().await, 0);

    let empty = app
        .send(Method::POST, "/api/authorcollections", Some(json!([])))
        .await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn courses_are_ordered_by_title() {
    let app = TestApp::seeded().await;
    let atherton = app.author("Atherton").await;

    let courses = body_json(app.get(&format!("/api/authors/{}/courses", atherton.id)).await).await;
    let titles: Vec<&str> = courses
        .as_array()
        .unwrap()
        .iter()
        .map(|course| course["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Boxing", "Fitness"]);
}

#[tokio::test]
async fn missing_author_wins_over_missing_course() {
    let app = TestApp::seeded().await;
    let uri = format!("/api/authors/{}/courses/{}", Uuid::new_v4(), Uuid::new_v4());

    let response = app.get(&uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_json(response).await["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("author"));

    let response = app
        .send(
            Method::PUT,
            &uri,
            Some(json!({ "title": "Boxing", "description": "Gloves on" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_course_returns_location() {
    let app = TestApp::seeded().await;
    let nancy = app.author("Nancy").await;

    let response = app
        .send(
            Method::POST,
            &format!("/api/authors/{}/courses", nancy.id),
            Some(json!({ "title": "Harmony" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let location = location(&response);
    let course = body_json(response).await;
    assert_eq!(
        location,
        format!("/api/authors/{}/courses/{}", nancy.id, course["id"].as_str().unwrap())
    );
    assert_eq!(course["authorId"], nancy.id.to_string());
    assert_eq!(app.get(&location).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_course_reports_field_errors() {
    let app = TestApp::seeded().await;
    let nancy = app.author("Nancy").await;
    let uri = format!("/api/authors/{}/courses", nancy.id);

    let response = app
        .send(Method::POST, &uri, Some(json!({ "description": "No title" })))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/problem+json");

    let problem = body_json(response).await;
    assert_eq!(problem["status"], 422);
    assert_eq!(problem["instance"], uri);
    assert_eq!(problem["errors"]["title"][0], "You should fill out a title.");
}

#[tokio::test]
async fn upsert_creates_then_replaces() {
    let app = TestApp::seeded().await;
    let nancy = app.author("Nancy").await;
    let course_id = Uuid::new_v4();
    let uri = format!("/api/authors/{}/courses/{}", nancy.id, course_id);

    let response = app
        .send(
            Method::PUT,
            &uri,
            Some(json!({ "title": "Harmony", "description": "Singing together" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(location(&response), uri);
    assert_eq!(body_json(response).await["id"], course_id.to_string());

    let response = app
        .send(
            Method::PUT,
            &uri,
            Some(json!({ "title": "Harmony II", "description": "Singing in parts" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let course = body_json(app.get(&uri).await).await;
    assert_eq!(course["title"], "Harmony II");
    assert_eq!(course["description"], "Singing in parts");
}

#[tokio::test]
async fn upsert_rejects_id_owned_by_another_author() {
    let app = TestApp::seeded().await;
    let eva = app.author("Eva").await;
    let nancy = app.author("Nancy").await;

    let response = app
        .send(
            Method::PUT,
            &format!("/api/authors/{}/courses/{}", nancy.id, eva.courses[0].id),
            Some(json!({ "title": "Harmony", "description": "Singing together" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn patch_rejects_equal_title_and_description() {
    let app = TestApp::seeded().await;
    let atherton = app.author("Atherton").await;
    let course = atherton
        .courses
        .iter()
        .find(|course| course.title == "Boxing")
        .unwrap()
        .clone();
    let uri = format!("/api/authors/{}/courses/{}", atherton.id, course.id);

    let response = app
        .send(
            Method::PATCH,
            &uri,
            Some(json!([
                { "op": "replace", "path": "/title", "value": "The best gym ever" }
            ])),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let problem = body_json(response).await;
    assert_eq!(
        problem["errors"]["CourseForUpsert"][0],
        "The provided description should be different from the title."
    );

    let stored = body_json(app.get(&uri).await).await;
    assert_eq!(stored["title"], "Boxing");
}

#[tokio::test]
async fn patch_updates_existing_and_creates_missing() {
    let app = TestApp::seeded().await;
    let atherton = app.author("Atherton").await;
    let course = &atherton.courses[0];
    let uri = format!("/api/authors/{}/courses/{}", atherton.id, course.id);

    let response = app
        .send(
            Method::PATCH,
            &uri,
            Some(json!([{ "op": "replace", "path": "/description", "value": "Updated" }])),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let stored = body_json(app.get(&uri).await).await;
    assert_eq!(stored["description"], "Updated");
    assert_eq!(stored["title"], course.title.as_str());

    let new_uri = format!("/api/authors/{}/courses/{}", atherton.id, Uuid::new_v4());
    let incomplete = app
        .send(
            Method::PATCH,
            &new_uri,
            Some(json!([{ "op": "add", "path": "/title", "value": "Sparring" }])),
        )
        .await;
    assert_eq!(incomplete.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_json(incomplete).await["errors"]["description"].is_array());

    let response = app
        .send(
            Method::PATCH,
            &new_uri,
            Some(json!([
                { "op": "add", "path": "/title", "value": "Sparring" },
                { "op": "add", "path": "/description", "value": "Rounds with a partner" }
            ])),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(app.get(&new_uri).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn delete_course_then_not_found() {
    let app = TestApp::seeded().await;
    let eva = app.author("Eva").await;
    let uri = format!("/api/authors/{}/courses/{}", eva.id, eva.courses[0].id);

    assert_eq!(
        app.send(Method::DELETE, &uri, None).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        app.send(Method::DELETE, &uri, None).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.get(&uri).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = TestApp::empty().await;
    let response = app.get("/api/authors").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn unsupported_accept_gets_406() {
    let app = TestApp::seeded().await;

    let response = app.get_accepting("/api/authors", "application/xml").await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    assert!(response.headers().contains_key("x-request-id"));
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "not_acceptable");

    for accept in ["application/json", "*/*", "application/xml, application/*;q=0.8"] {
        let response = app.get_accepting("/api/authors", accept).await;
        assert_eq!(response.status(), StatusCode::OK, "{accept}");
    }
}

#[tokio::test]
async fn openapi_document_carries_request_id() {
    let app = TestApp::empty().await;
    let response = app.get("/docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}
