pub mod api;
pub mod health;
pub mod pages;
pub mod upload;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::Session;
use crate::state::AppState;

pub(crate) async fn session_handle(
    state: &AppState,
    id: Uuid,
) -> Result<Arc<Mutex<Session>>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Pages
        .route("/", get(pages::index))
        .route("/analyze", post(pages::analyze_new))
        .route("/sessions/:id", get(pages::show_session))
        .route("/sessions/:id/analyze", post(pages::reanalyze))
        .route("/sessions/:id/chat", post(pages::ask))
        .route("/sessions/:id/chat/clear", post(pages::clear_chat))
        // JSON API
        .route("/api/v1/sessions", post(api::handle_create_session))
        .route("/api/v1/sessions/:id", delete(api::handle_delete_session))
        .route("/api/v1/sessions/:id/analyze", post(api::handle_analyze))
        .route(
            "/api/v1/sessions/:id/job-description",
            put(api::handle_replace_job_description),
        )
        .route(
            "/api/v1/sessions/:id/candidates",
            get(api::handle_get_candidates),
        )
        .route(
            "/api/v1/sessions/:id/candidates/:candidate_id",
            get(api::handle_get_candidate),
        )
        .route(
            "/api/v1/sessions/:id/chat",
            get(api::handle_get_chat)
                .post(api::handle_chat)
                .delete(api::handle_clear_chat),
        )
        .route("/api/v1/score", post(api::handle_score))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::extraction::KeywordExtractor;
    use crate::llm_client::testing::ScriptedModel;
    use crate::llm_client::LlmError;
    use crate::session::SessionStore;

    const BOUNDARY: &str = "recruiter-test-boundary";

    fn test_state(replies: Vec<Result<String, LlmError>>) -> AppState {
        AppState {
            sessions: SessionStore::default(),
            llm: Arc::new(ScriptedModel::new(replies)),
            extractor: Arc::new(KeywordExtractor),
            config: Config::for_tests(),
        }
    }

    fn multipart_body(files: &[(&str, &str, &str)]) -> String {
        let mut body = String::new();
        for (field, file_name, content) in files {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: text/plain\r\n\r\n{content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn multipart_request(method: &str, uri: &str, files: &[(&str, &str, &str)]) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(files)))
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn create_session(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(empty_request("POST", "/api/v1/sessions"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["session_id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    const JD: &str = "Hiring a data analyst. Required: Python, SQL, Tableau, Excel.";

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state(vec![]));
        let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["extraction_backend"], "keyword");
        assert_eq!(body["model"], "scripted");
    }

    #[tokio::test]
    async fn test_analyze_and_rank_over_api() {
        let app = build_router(test_state(vec![]));
        let id = create_session(&app).await;

        let response = app
            .clone()
            .oneshot(multipart_request(
                "POST",
                &format!("/api/v1/sessions/{id}/analyze"),
                &[
                    ("job_description", "jd.txt", JD),
                    ("resumes", "bob.txt", "Excel and Tableau"),
                    ("resumes", "alice.txt", "Python, SQL, Tableau, Excel"),
                    ("resumes", "notes.csv", "a,b,c"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;

        let candidates = body["candidates"].as_array().unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0]["name"], "alice.txt");
        assert_eq!(candidates[0]["score"]["percentage"], 100.0);
        assert_eq!(candidates[1]["name"], "bob.txt");
        assert_eq!(candidates[1]["score"]["matched"], 2);
        assert!(candidates[0].get("raw_text").is_none());
        assert_eq!(body["skipped"][0]["file_name"], "notes.csv");

        let candidate_id = candidates[1]["id"].as_str().unwrap();
        let response = app
            .clone()
            .oneshot(empty_request(
                "GET",
                &format!("/api/v1/sessions/{id}/candidates/{candidate_id}"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["name"], "bob.txt");
    }

    #[tokio::test]
    async fn test_zero_resumes_gives_empty_table() {
        let app = build_router(test_state(vec![]));
        let id = create_session(&app).await;

        let response = app
            .clone()
            .oneshot(multipart_request(
                "POST",
                &format!("/api/v1/sessions/{id}/analyze"),
                &[("job_description", "jd.txt", JD)],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await["candidates"]
            .as_array()
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_missing_job_description_is_bad_request() {
        let app = build_router(test_state(vec![]));
        let id = create_session(&app).await;

        let response = app
            .oneshot(multipart_request(
                "POST",
                &format!("/api/v1/sessions/{id}/analyze"),
                &[("resumes", "alice.txt", "Python")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_replace_job_description_rescores() {
        let app = build_router(test_state(vec![]));
        let id = create_session(&app).await;

        app.clone()
            .oneshot(multipart_request(
                "POST",
                &format!("/api/v1/sessions/{id}/analyze"),
                &[
                    ("job_description", "jd.txt", JD),
                    ("resumes", "analyst.txt", "SQL, Excel"),
                    ("resumes", "ml.txt", "PyTorch, Deep Learning"),
                ],
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(multipart_request(
                "PUT",
                &format!("/api/v1/sessions/{id}/job-description"),
                &[("job_description", "ml.txt", "Needs PyTorch")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["job_description"]["name"], "ml.txt");
        assert_eq!(body["candidates"][0]["name"], "ml.txt");
        assert_eq!(body["candidates"][0]["score"]["percentage"], 100.0);
    }

    #[tokio::test]
    async fn test_chat_round_trip_and_failure() {
        let app = build_router(test_state(vec![
            Ok("alice.txt is the strongest match.".into()),
            Err(LlmError::Api {
                status: 400,
                message: "API key not valid".into(),
            }),
        ]));
        let id = create_session(&app).await;
        app.clone()
            .oneshot(multipart_request(
                "POST",
                &format!("/api/v1/sessions/{id}/analyze"),
                &[
                    ("job_description", "jd.txt", JD),
                    ("resumes", "alice.txt", "Python, SQL"),
                ],
            ))
            .await
            .unwrap();

        let chat_uri = format!("/api/v1/sessions/{id}/chat");
        let response = app
            .clone()
            .oneshot(json_request("POST", &chat_uri, json!({"message": "Who is best?"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["reply"], "alice.txt is the strongest match.");
        assert_eq!(body["transcript"].as_array().unwrap().len(), 2);

        let response = app
            .clone()
            .oneshot(json_request("POST", &chat_uri, json!({"message": "Why?"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = app
            .clone()
            .oneshot(empty_request("GET", &chat_uri))
            .await
            .unwrap();
        let messages = body_json(response).await["messages"].clone();
        let roles: Vec<&str> = messages
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["user", "assistant", "user"]);

        let response = app
            .clone()
            .oneshot(empty_request("DELETE", &chat_uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = app.oneshot(empty_request("GET", &chat_uri)).await.unwrap();
        assert!(body_json(response).await["messages"]
            .as_array()
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_chat_before_analysis_is_rejected() {
        let app = build_router(test_state(vec![]));
        let id = create_session(&app).await;
        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/chat"),
                json!({"message": "hello"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let app = build_router(test_state(vec![]));
        let response = app
            .clone()
            .oneshot(empty_request(
                "GET",
                &format!("/api/v1/sessions/{}/candidates", Uuid::new_v4()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(empty_request(
                "DELETE",
                &format!("/api/v1/sessions/{}", Uuid::new_v4()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_session() {
        let app = build_router(test_state(vec![]));
        let id = create_session(&app).await;
        let response = app
            .clone()
            .oneshot(empty_request("DELETE", &format!("/api/v1/sessions/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = app
            .oneshot(empty_request("GET", &format!("/api/v1/sessions/{id}/chat")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_word_overlap_score_endpoint() {
        let app = build_router(test_state(vec![]));
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/score",
                json!({"resume": "Python and SQL", "job_description": "python sql rust go"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["match_score_percent"], "50.00");
    }

    #[tokio::test]
    async fn test_page_flow_renders_ranking_and_chat() {
        let app = build_router(test_state(vec![Ok("Alice knows SQL.".into())]));

        let response = app.clone().oneshot(empty_request("GET", "/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Analyze Candidates"));

        let response = app
            .clone()
            .oneshot(multipart_request(
                "POST",
                "/analyze",
                &[
                    ("job_description", "jd.txt", JD),
                    ("resumes", "alice.txt", "Python, SQL"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(location.starts_with("/sessions/"));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("{location}/chat"))
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("question=Who+knows+SQL%3F"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app.oneshot(empty_request("GET", &location)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("alice.txt - Match: 50.00%"));
        assert!(html.contains("Could not automatically extract experience."));
        assert!(html.contains("Who knows SQL?"));
        assert!(html.contains("Alice knows SQL."));
    }

    #[tokio::test]
    async fn test_page_analyze_error_is_inline() {
        let app = build_router(test_state(vec![]));
        let response = app
            .oneshot(multipart_request(
                "POST",
                "/analyze",
                &[("resumes", "alice.txt", "Python")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response)
            .await
            .contains("A job description file is required"));
    }

    #[tokio::test]
    async fn test_page_unknown_session_shows_upload_form() {
        let app = build_router(test_state(vec![]));
        let response = app
            .oneshot(empty_request("GET", &format!("/sessions/{}", Uuid::new_v4())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("no longer exists"));
    }

    #[tokio::test]
    async fn test_truncated_unknown_field_is_bad_request() {
        let app = build_router(test_state(vec![]));
        let id = create_session(&app).await;
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"notes\"\r\n\r\nunterminated"
        );
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/sessions/{id}/analyze"))
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }
}
