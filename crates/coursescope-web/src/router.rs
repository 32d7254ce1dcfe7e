use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::handlers;
use crate::state::AppState;

/// All routes, with CORS open to any origin and uploads capped at
/// `max_upload_bytes`.
pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index::index))
        .route("/api/majors", get(handlers::majors::list))
        .route(
            "/api/majors/{id}/requirements",
            get(handlers::majors::requirements),
        )
        .route("/api/courses", get(handlers::courses::list))
        .route("/api/courses/eligible", post(handlers::courses::eligible))
        .route("/api/courses/{code}", get(handlers::courses::show))
        .route("/api/courses/{code}/grades", get(handlers::courses::grades))
        .route("/api/audit/upload", post(handlers::audit::upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use coursescope_audit::{AuditParsingConfig, ExtractorChain};
    use coursescope_catalog::{CatalogDatabase, NewCourse, SharedCatalog};
    use coursescope_core::{BackendError, ExtractionError};
    use serde_json::Value;
    use tower::ServiceExt;

    const AUDIT_TEXT: &str = "\
Completed Courses
FA22 CS 111 3.00 A Program Design I
FA22 MATH 180 4.00 B Calculus I
In Progress Courses
FA24 CS 251 4.00 Data Structures
";

    const BOUNDARY: &str = "coursescope-test-boundary";

    fn state_with_chain(chain: ExtractorChain) -> (Arc<AppState>, i64) {
        let db = CatalogDatabase::open_in_memory().unwrap();
        db.upsert_course(&NewCourse {
            level: Some(111),
            credits: Some("3 hours.".into()),
            ..NewCourse::new("CS 111", "Program Design I")
        })
        .unwrap();
        let cs141 = db
            .upsert_course(&NewCourse {
                level: Some(141),
                ..NewCourse::new("CS 141", "Program Design II")
            })
            .unwrap();
        db.upsert_course(&NewCourse::new("CS 251", "Data Structures"))
            .unwrap();
        db.upsert_course(&NewCourse::new("CS 342", "Software Design"))
            .unwrap();
        db.add_prerequisite(cs141, "CS 111", 0).unwrap();

        let major = db.upsert_major("Computer Science", None).unwrap();
        for code in ["CS 111", "CS 141", "CS 251"] {
            db.add_requirement(major, code, "core").unwrap();
        }
        db.add_elective(major, "CS 342", "technical").unwrap();

        let state = AppState {
            catalog: SharedCatalog::new(db),
            chain,
            parsing: AuditParsingConfig::default(),
        };
        (Arc::new(state), major)
    }

    fn app() -> (Router, i64) {
        let chain = ExtractorChain::new().with_fn("fixed", |_| Ok(AUDIT_TEXT.to_string()));
        let (state, major) = state_with_chain(chain);
        (build_router(state, 1024 * 1024), major)
    }

    async fn json_body(resp: axum::response::Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn multipart_request(uri: &str, file: Option<&[u8]>, major_id: Option<&str>) -> Request<Body> {
        let mut body: Vec<u8> = Vec::new();
        if let Some(data) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
                     filename=\"audit.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        if let Some(id) = major_id {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"majorId\"\r\n\r\n{id}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_index() {
        let (app, _) = app();
        let resp = app.oneshot(get_request("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            json_body(resp).await,
            serde_json::json!({ "ok": true, "service": "CourseScope API", "docs": "/api/majors" })
        );
    }

    #[tokio::test]
    async fn test_majors_and_requirements() {
        let (app, major) = app();
        let resp = app.clone().oneshot(get_request("/api/majors")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let majors = json_body(resp).await;
        assert_eq!(majors[0]["name"], "Computer Science");

        let resp = app
            .clone()
            .oneshot(get_request(&format!("/api/majors/{major}/requirements")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let reqs = json_body(resp).await;
        assert_eq!(reqs["requiredCourses"].as_array().unwrap().len(), 3);

        let resp = app
            .oneshot(get_request("/api/majors/999/requirements"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(resp).await["error"], "Major not found");
    }

    #[tokio::test]
    async fn test_course_lookup() {
        let (app, _) = app();
        let resp = app.clone().oneshot(get_request("/api/courses/cs141")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let course = json_body(resp).await;
        assert_eq!(course["code"], "CS 141");
        assert_eq!(course["prerequisitesFormatted"], "CS 111");

        let resp = app.clone().oneshot(get_request("/api/courses")).await.unwrap();
        assert_eq!(json_body(resp).await.as_array().unwrap().len(), 4);

        let resp = app.oneshot(get_request("/api/courses/CS999")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(resp).await["error"], "Course not found");
    }

    #[tokio::test]
    async fn test_grades_endpoint() {
        let (app, _) = app();
        let resp = app.clone().oneshot(get_request("/api/courses/CS111/grades")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["has_data"], false);

        let resp = app.oneshot(get_request("/api/courses/XYZ100/grades")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_eligible_courses() {
        let (app, _) = app();
        let req = Request::builder()
            .method("POST")
            .uri("/api/courses/eligible")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"completed": ["CS 111"]}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let codes: Vec<String> = json_body(resp)
            .await
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["code"].as_str().unwrap().to_string())
            .collect();
        assert!(codes.contains(&"CS 141".to_string()));
        assert!(!codes.contains(&"CS 111".to_string()));
    }

    #[tokio::test]
    async fn test_upload_with_major() {
        let (app, major) = app();
        let req = multipart_request(
            "/api/audit/upload",
            Some(b"%PDF-1.4 fake"),
            Some(&major.to_string()),
        );
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let report = json_body(resp).await;
        assert_eq!(
            report["parsed"]["completed"],
            serde_json::json!(["CS111", "MATH180"])
        );
        assert_eq!(report["parsed"]["in_progress"], serde_json::json!(["CS251"]));
        assert_eq!(
            report["summary"]["remainingRequired"],
            serde_json::json!(["CS 141"])
        );
        assert_eq!(
            report["summary"]["remainingElectives"],
            serde_json::json!(["CS 342"])
        );
    }

    #[tokio::test]
    async fn test_upload_major_in_query() {
        let (app, major) = app();
        let req = multipart_request(
            &format!("/api/audit/upload?majorId={major}"),
            Some(b"%PDF-1.4 fake"),
            None,
        );
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(json_body(resp).await["summary"]["remainingRequired"].is_array());
    }

    #[tokio::test]
    async fn test_upload_without_major() {
        let (app, _) = app();
        let req = multipart_request("/api/audit/upload", Some(b"%PDF-1.4 fake"), None);
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(json_body(resp).await["summary"].is_null());
    }

    #[tokio::test]
    async fn test_upload_unknown_major_reports_inline() {
        let (app, _) = app();
        let req = multipart_request("/api/audit/upload", Some(b"%PDF-1.4 fake"), Some("404"));
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let report = json_body(resp).await;
        let error = report["summary"]["error"].as_str().unwrap();
        assert!(error.starts_with("Failed to compute remaining requirements"));
        assert_eq!(report["parsed"]["in_progress"], serde_json::json!(["CS251"]));
    }

    #[tokio::test]
    async fn test_upload_malformed_input() {
        let (app, _) = app();

        let resp = app
            .clone()
            .oneshot(multipart_request("/api/audit/upload", None, Some("1")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["error"], "No file uploaded");

        let resp = app
            .clone()
            .oneshot(multipart_request("/api/audit/upload", Some(b"PK\x03\x04"), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = app
            .clone()
            .oneshot(multipart_request(
                "/api/audit/upload",
                Some(b"%PDF-1.4 fake"),
                Some("cs"),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = Request::builder()
            .method("POST")
            .uri("/api/audit/upload")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(resp).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_upload_extraction_failure() {
        let chain = ExtractorChain::new()
            .with_fn("broken", |_| Err(BackendError::OpenError("bad xref".into())))
            .with_fn("blank", |_| Ok("  \n".to_string()));
        let (state, _) = state_with_chain(chain);
        let app = build_router(state, 1024 * 1024);

        let resp = app
            .oneshot(multipart_request("/api/audit/upload", Some(b"%PDF-1.4 fake"), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let expected = format!("Failed to parse PDF: {}", ExtractionError::NoText);
        assert_eq!(json_body(resp).await["error"], expected);
    }

    #[tokio::test]
    async fn test_upload_over_limit() {
        let chain = ExtractorChain::new().with_fn("fixed", |_| Ok(AUDIT_TEXT.to_string()));
        let (state, _) = state_with_chain(chain);
        let app = build_router(state, 64);

        let mut big = b"%PDF-1.4 ".to_vec();
        big.resize(4096, b'x');
        let resp = app
            .oneshot(multipart_request("/api/audit/upload", Some(&big), None))
            .await
            .unwrap();
        assert!(resp.status().is_client_error());
    }
}
