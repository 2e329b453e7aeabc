use crate::application::dto::AgentSelection;
use crate::application::use_cases::{SubmitError, SubmitSbomUseCase};
use crate::ports::inbound::{AnalysisError, AnalysisPort};
use crate::ports::outbound::SbomRepository;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::error;

/// Maximum accepted upload size for SBOM documents (32 MB).
const MAX_UPLOAD_BYTES: usize = 32 << 20;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub submit: Arc<SubmitSbomUseCase>,
    pub repository: Arc<dyn SbomRepository>,
    pub analyzer: Arc<dyn AnalysisPort>,
}

/// JSON body returned on SBOM submission.
#[derive(Debug, Serialize)]
struct SubmitSbomResponse {
    id: String,
    message: &'static str,
}

/// Standardized JSON error envelope.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

fn error_response(status: StatusCode, error: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error,
            message: message.into(),
        }),
    )
        .into_response()
}

fn method_not_allowed() -> Response {
    error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "method_not_allowed",
        "Method is not allowed for this endpoint",
    )
}

/// Builds the HTTP router over the engine.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/v1/sboms",
            post(submit_sbom).fallback(|| async { method_not_allowed() }),
        )
        .route(
            "/api/v1/sboms/get",
            get(get_sbom).fallback(|| async { method_not_allowed() }),
        )
        .route(
            "/api/v1/sboms/{id}/analyze",
            post(analyze_sbom).fallback(|| async { method_not_allowed() }),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn health() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({"status": "ok", "service": "sbom-sentinel"})),
    )
        .into_response()
}

/// POST /api/v1/sboms - multipart upload of one CycloneDX document under
/// the `sbom` form field.
async fn submit_sbom(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut payload = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() == Some("sbom") {
                    match field.bytes().await {
                        Ok(bytes) => {
                            payload = Some(bytes);
                            break;
                        }
                        Err(_) => {
                            return error_response(
                                StatusCode::BAD_REQUEST,
                                "invalid_form",
                                "Failed to read uploaded file",
                            );
                        }
                    }
                }
            }
            Ok(None) => break,
            Err(_) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "invalid_form",
                    "Failed to parse multipart form",
                );
            }
        }
    }

    let Some(payload) = payload else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "missing_file",
            "SBOM file is required. Please upload a file with the 'sbom' field name",
        );
    };

    if payload.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "empty_file", "Uploaded file is empty");
    }

    match state.submit.execute(&payload).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(SubmitSbomResponse {
                id,
                message: "SBOM submitted successfully",
            }),
        )
            .into_response(),
        Err(SubmitError::Parse(err)) => error_response(
            StatusCode::BAD_REQUEST,
            "parse_error",
            format!("Failed to parse SBOM file: {err}"),
        ),
        Err(SubmitError::Store(err)) => {
            error!(error = %err, "failed to store submitted SBOM");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                format!("Failed to store SBOM: {err}"),
            )
        }
    }
}

/// GET /api/v1/sboms/get?id=<id>
async fn get_sbom(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(id) = params.get("id").filter(|id| !id.is_empty()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "missing_id",
            "SBOM ID is required as query parameter",
        );
    };

    match state.repository.find_by_id(id).await {
        Ok(Some(sbom)) => (StatusCode::OK, Json(sbom)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "not_found", "SBOM not found"),
        Err(err) => {
            error!(error = %err, "failed to retrieve SBOM");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                format!("Failed to retrieve SBOM: {err}"),
            )
        }
    }
}

/// POST /api/v1/sboms/{id}/analyze with optional `enable-*` query flags.
async fn analyze_sbom(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if id.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "missing_id",
            "SBOM ID is required in URL path",
        );
    }

    let flag = |name: &str| params.get(name).map(String::as_str) == Some("true");
    let selection = AgentSelection {
        health: flag("enable-ai-health-check"),
        proactive: flag("enable-proactive-scan"),
        vuln: flag("enable-vuln-scan"),
    };

    match state
        .analyzer
        .analyze(CancellationToken::new(), &id, selection)
        .await
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(AnalysisError::NotFound(_)) => {
            error_response(StatusCode::NOT_FOUND, "not_found", "SBOM not found")
        }
        Err(AnalysisError::Store(err)) => {
            error!(error = %err, "failed to retrieve SBOM for analysis");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                format!("Failed to retrieve SBOM: {err}"),
            )
        }
        Err(err) => {
            error!(error = %err, "analysis failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "analysis_error",
                format!("Analysis failed: {err}"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::AnalysisResponse;
    use crate::domain::{Component, Finding, Sbom, Severity};
    use crate::ports::outbound::StoreError;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct InMemoryRepository {
        sboms: Mutex<HashMap<String, Sbom>>,
    }

    impl InMemoryRepository {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sboms: Mutex::new(HashMap::new()),
            })
        }
    }

    #[async_trait]
    impl SbomRepository for InMemoryRepository {
        async fn store(&self, sbom: &Sbom) -> Result<(), StoreError> {
            self.sboms
                .lock()
                .unwrap()
                .insert(sbom.id.clone(), sbom.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<Sbom>, StoreError> {
            Ok(self.sboms.lock().unwrap().get(id).cloned())
        }
    }

    /// Analyzer stub replaying the license-agent behavior over the stored
    /// components.
    struct StubAnalyzer {
        repository: Arc<InMemoryRepository>,
    }

    #[async_trait]
    impl AnalysisPort for StubAnalyzer {
        async fn analyze(
            &self,
            _cancel: CancellationToken,
            sbom_id: &str,
            selection: AgentSelection,
        ) -> Result<AnalysisResponse, AnalysisError> {
            let sbom = self
                .repository
                .find_by_id(sbom_id)
                .await?
                .ok_or_else(|| AnalysisError::NotFound(sbom_id.to_string()))?;

            let results: Vec<Finding> = sbom
                .components
                .iter()
                .filter(|c| c.license.contains("GPL"))
                .map(|c| Finding::new("License Agent", format!("{} flagged", c.name), Severity::High))
                .collect();

            let mut agents_run = vec!["License Agent".to_string()];
            if selection.health {
                agents_run.push("Dependency Health Agent".to_string());
            }

            Ok(AnalysisResponse::new(sbom_id, results, agents_run))
        }
    }

    fn test_state() -> (AppState, Arc<InMemoryRepository>) {
        let repository = InMemoryRepository::new();
        let state = AppState {
            submit: Arc::new(SubmitSbomUseCase::new(repository.clone())),
            repository: repository.clone(),
            analyzer: Arc::new(StubAnalyzer {
                repository: repository.clone(),
            }),
        };
        (state, repository)
    }

    fn multipart_body(field: &str, content: &str) -> (String, Body) {
        let boundary = "sentinel-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"sbom.json\"\r\n\
             Content-Type: application/json\r\n\r\n\
             {content}\r\n\
             --{boundary}--\r\n"
        );
        (
            format!("multipart/form-data; boundary={boundary}"),
            Body::from(body),
        )
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const SAMPLE_SBOM: &str = r#"{
        "bomFormat": "CycloneDX",
        "specVersion": "1.5",
        "serialNumber": "urn:uuid:aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee",
        "components": [
            {"name": "copyleft-lib", "version": "2.1.0",
             "licenses": [{"license": {"id": "GPL-3.0-only"}}]}
        ]
    }"#;

    #[tokio::test]
    async fn test_health_endpoint() {
        let (state, _) = test_state();
        let response = router(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "sbom-sentinel");
    }

    #[tokio::test]
    async fn test_submit_stores_sbom_and_returns_id() {
        let (state, repository) = test_state();
        let (content_type, body) = multipart_body("sbom", SAMPLE_SBOM);

        let response = router(state)
            .oneshot(
                Request::post("/api/v1/sboms")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["id"], "urn:uuid:aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee");
        assert_eq!(json["message"], "SBOM submitted successfully");
        assert!(repository
            .sboms
            .lock()
            .unwrap()
            .contains_key("urn:uuid:aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee"));
    }

    #[tokio::test]
    async fn test_submit_without_sbom_field_is_missing_file() {
        let (state, _) = test_state();
        let (content_type, body) = multipart_body("other", "{}");

        let response = router(state)
            .oneshot(
                Request::post("/api/v1/sboms")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "missing_file");
    }

    #[tokio::test]
    async fn test_submit_empty_file() {
        let (state, _) = test_state();
        let (content_type, body) = multipart_body("sbom", "");

        let response = router(state)
            .oneshot(
                Request::post("/api/v1/sboms")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "empty_file");
    }

    #[tokio::test]
    async fn test_submit_unparseable_document() {
        let (state, _) = test_state();
        let (content_type, body) = multipart_body("sbom", r#"{"bomFormat": "SPDX"}"#);

        let response = router(state)
            .oneshot(
                Request::post("/api/v1/sboms")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "parse_error");
    }

    #[tokio::test]
    async fn test_get_requires_id() {
        let (state, _) = test_state();
        let response = router(state)
            .oneshot(Request::get("/api/v1/sboms/get").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "missing_id");
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let (state, _) = test_state();
        let response = router(state)
            .oneshot(
                Request::get("/api/v1/sboms/get?id=urn:uuid:unknown")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "not_found");
    }

    #[tokio::test]
    async fn test_get_returns_stored_sbom() {
        let (state, repository) = test_state();
        let mut sbom = Sbom::new("urn:uuid:stored", "demo");
        sbom.components.push(Component::new("express", "4.18.2", "", "MIT"));
        repository.store(&sbom).await.unwrap();

        let response = router(state)
            .oneshot(
                Request::get("/api/v1/sboms/get?id=urn:uuid:stored")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["id"], "urn:uuid:stored");
        assert_eq!(json["components"][0]["name"], "express");
    }

    #[tokio::test]
    async fn test_analyze_unknown_id_is_not_found() {
        let (state, _) = test_state();
        let response = router(state)
            .oneshot(
                Request::post("/api/v1/sboms/urn:uuid:unknown/analyze")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "not_found");
    }

    #[tokio::test]
    async fn test_analyze_returns_findings_and_summary() {
        let (state, repository) = test_state();
        let mut sbom = Sbom::new("urn:uuid:gpl", "demo");
        sbom.components.push(Component::new("copyleft-lib", "2.1.0", "", "GPL-3.0-only"));
        repository.store(&sbom).await.unwrap();

        let response = router(state)
            .oneshot(
                Request::post("/api/v1/sboms/urn:uuid:gpl/analyze?enable-ai-health-check=true&unknown-flag=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["sbom_id"], "urn:uuid:gpl");
        assert_eq!(json["summary"]["total_findings"], 1);
        assert_eq!(json["summary"]["agents_run"][0], "License Agent");
        assert_eq!(json["summary"]["agents_run"][1], "Dependency Health Agent");
        assert_eq!(json["results"][0]["severity"], "High");
    }

    #[tokio::test]
    async fn test_wrong_method_is_405_with_json_body() {
        let (state, _) = test_state();
        let response = router(state)
            .oneshot(Request::get("/api/v1/sboms").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(response).await["error"], "method_not_allowed");
    }
}
