use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, info};

use tikoy_lifecycle::TikoyError;
use tikoy_types::TikoyRecord;
use tikoy_types::api::{
    Countdown, CreateTikoyRequest, ErrorResponse, HealthResponse, PassTikoyRequest, TikoyResponse,
};
use tikoy_types::models::share_url;

use crate::state::{AppState, AppStateInner};
use crate::validate::validate_form;

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Shown for every storage failure; backend detail stays in the logs.
const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: message.into() }))
}

fn map_tikoy_error(e: TikoyError) -> ApiError {
    match e {
        TikoyError::NotFound(_) => api_error(StatusCode::NOT_FOUND, "Tikoy not found."),
        TikoyError::AlreadyPassed(_) => {
            api_error(StatusCode::CONFLICT, "This Tikoy has already been passed on.")
        }
        TikoyError::Expired(_) => {
            api_error(StatusCode::GONE, "This Tikoy has expired. The chain has ended.")
        }
        TikoyError::ChainFull(_) => api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "This chain cannot be passed any further.",
        ),
        TikoyError::Persistence(e) => {
            error!("Persistence failure: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE)
        }
    }
}

/// Rejected request bodies get the same `{ "error": .. }` shape as validation
/// errors.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| api_error(StatusCode::BAD_REQUEST, rejection.body_text()))
}

fn tikoy_response(state: &AppStateInner, tikoy: TikoyRecord) -> TikoyResponse {
    let now = state.manager.now_ms();
    TikoyResponse {
        effective_status: tikoy.effective_status(now),
        share_url: share_url(&state.public_origin, &tikoy.id),
        countdown: Countdown::at(tikoy.expires_at, now),
        tikoy,
    }
}

/// POST /tikoys — start a new chain.
pub async fn create_tikoy(
    State(state): State<AppState>,
    payload: Result<Json<CreateTikoyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload)?;
    let form = validate_form(&req.sender_name, &req.message)
        .map_err(|msg| api_error(StatusCode::BAD_REQUEST, msg))?;

    let tikoy = state
        .manager
        .create(&form.sender_name, &form.message, None)
        .await
        .map_err(map_tikoy_error)?;

    Ok((StatusCode::CREATED, Json(tikoy_response(&state, tikoy))))
}

/// GET /tikoys/{id}
pub async fn get_tikoy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tikoy = state
        .manager
        .get(&id)
        .await
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Tikoy not found."))?;

    Ok(Json(tikoy_response(&state, tikoy)))
}

/// POST /tikoys/{id}/pass — create the successor of `id`.
pub async fn pass_tikoy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PassTikoyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload)?;
    let form = validate_form(&req.sender_name, &req.message)
        .map_err(|msg| api_error(StatusCode::BAD_REQUEST, msg))?;

    let tikoy = state
        .manager
        .pass(&id, &form.sender_name, &form.message)
        .await
        .map_err(map_tikoy_error)?;

    info!("Tikoy {} passed forward as {}", id, tikoy.id);
    Ok((StatusCode::CREATED, Json(tikoy_response(&state, tikoy))))
}

/// GET /tikoys/{id}/chain — journey from the chain root up to `id`.
pub async fn get_chain(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let journey = state
        .manager
        .journey(&id)
        .await
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Tikoy not found."))?;

    Ok(Json(journey))
}

/// GET /health — liveness check plus the active storage path.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        backend: state.manager.store().backend().as_str().into(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use tikoy_lifecycle::{ManualClock, TikoyManager};
    use tikoy_store::testing::{FailingStore, MemoryStore};
    use tikoy_store::{FailoverStore, Store};
    use tikoy_types::models::PASS_WINDOW_MS;

    use crate::routes::router;
    use crate::state::AppStateInner;

    const START: i64 = 1_700_000_000_000;

    fn app_with(store: FailoverStore) -> (Router, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(START));
        let state = Arc::new(AppStateInner {
            manager: TikoyManager::new(store, clock.clone()),
            public_origin: "https://tikoy.test".into(),
        });
        (router(state), clock)
    }

    fn app() -> (Router, Arc<ManualClock>) {
        app_with(FailoverStore::fallback_only(Arc::new(MemoryStore::new())))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (u16, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        dispatch(app, req).await
    }

    async fn send_raw(app: &Router, uri: &str, body: &'static str) -> (u16, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        dispatch(app, req).await
    }

    async fn dispatch(app: &Router, req: Request<Body>) -> (u16, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status().as_u16();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn create_and_fetch() {
        let (app, _clock) = app();
        let (status, body) = send(
            &app,
            "POST",
            "/tikoys",
            Some(json!({"senderName": " Mary ", "message": "Huat ah!"})),
        )
        .await;

        assert_eq!(status, 201);
        let id = body["tikoy"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["tikoy"]["senderName"], "Mary");
        assert_eq!(body["tikoy"]["passCount"], 0);
        assert_eq!(body["effectiveStatus"], "active");
        assert_eq!(body["shareUrl"], format!("https://tikoy.test/tikoy/{}", id));
        assert_eq!(body["countdown"]["urgency"], "relaxed");

        let (status, body) = send(&app, "GET", &format!("/tikoys/{}", id), None).await;
        assert_eq!(status, 200);
        assert_eq!(body["tikoy"]["message"], "Huat ah!");
    }

    #[tokio::test]
    async fn invalid_input_is_rejected() {
        let (app, _clock) = app();
        let (status, body) = send(
            &app,
            "POST",
            "/tikoys",
            Some(json!({"senderName": "   ", "message": "Huat ah!"})),
        )
        .await;
        assert_eq!(status, 400);
        assert!(body["error"].as_str().unwrap().contains("senderName"));
    }

    #[tokio::test]
    async fn malformed_bodies_get_json_400() {
        let (app, _clock) = app();
        let cases = [
            r#"{"senderName": "Mary"}"#,
            r#"{"senderName": "Mary", "message": "Huat ah!", "status": "passed"}"#,
            r#"{"senderName": "Mary", "message": "#,
            r#"{"sender_name": "Mary", "message": "Huat ah!"}"#,
        ];

        for body in cases {
            let (status, json) = send_raw(&app, "/tikoys", body).await;
            assert_eq!(status, 400, "{}", body);
            assert!(!json["error"].as_str().unwrap().is_empty());

            let (status, json) = send_raw(&app, "/tikoys/any/pass", body).await;
            assert_eq!(status, 400, "{}", body);
            assert!(json["error"].is_string());
        }
    }

    #[tokio::test]
    async fn unknown_tikoy_is_404() {
        let (app, _clock) = app();
        let (status, _) = send(&app, "GET", "/tikoys/nope", None).await;
        assert_eq!(status, 404);
        let (status, _) = send(&app, "GET", "/tikoys/nope/chain", None).await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn pass_flow() {
        let (app, clock) = app();
        let (_, a) = send(
            &app,
            "POST",
            "/tikoys",
            Some(json!({"senderName": "Mary", "message": "Huat ah!"})),
        )
        .await;
        let a_id = a["tikoy"]["id"].as_str().unwrap().to_string();

        let form = json!({"senderName": "Jose", "message": "Keep it going"});
        let (status, b) = send(&app, "POST", &format!("/tikoys/{}/pass", a_id), Some(form.clone())).await;
        assert_eq!(status, 201);
        assert_eq!(b["tikoy"]["passCount"], 1);
        assert_eq!(b["tikoy"]["previousTikoyId"], a_id.as_str());
        assert_eq!(b["tikoy"]["chainId"], a["tikoy"]["chainId"]);

        let (_, a_now) = send(&app, "GET", &format!("/tikoys/{}", a_id), None).await;
        assert_eq!(a_now["tikoy"]["status"], "passed");

        let (status, _) = send(&app, "POST", &format!("/tikoys/{}/pass", a_id), Some(form.clone())).await;
        assert_eq!(status, 409);

        let b_id = b["tikoy"]["id"].as_str().unwrap().to_string();
        let (status, journey) = send(&app, "GET", &format!("/tikoys/{}/chain", b_id), None).await;
        assert_eq!(status, 200);
        assert_eq!(journey["stats"]["totalPasses"], 1);
        assert_eq!(journey["chainId"], a["tikoy"]["chainId"]);
        assert_eq!(journey["links"][0]["holderName"], "Mary");
        assert_eq!(journey["links"].as_array().unwrap().len(), 2);

        clock.advance(PASS_WINDOW_MS + 1);
        let (_, b_now) = send(&app, "GET", &format!("/tikoys/{}", b_id), None).await;
        assert_eq!(b_now["tikoy"]["status"], "active");
        assert_eq!(b_now["effectiveStatus"], "expired");
        assert_eq!(b_now["countdown"]["urgency"], "expired");

        let (status, _) = send(&app, "POST", &format!("/tikoys/{}/pass", b_id), Some(form)).await;
        assert_eq!(status, 410);
    }

    #[tokio::test]
    async fn status_cannot_be_forced_without_a_successor() {
        let (app, _clock) = app();
        let (_, a) = send(
            &app,
            "POST",
            "/tikoys",
            Some(json!({"senderName": "Mary", "message": "Huat ah!"})),
        )
        .await;
        let a_id = a["tikoy"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(&app, "POST", &format!("/tikoys/{}/passed", a_id), None).await;
        assert_eq!(status, 404);

        let (_, a_now) = send(&app, "GET", &format!("/tikoys/{}", a_id), None).await;
        assert_eq!(a_now["tikoy"]["status"], "active");

        let form = json!({"senderName": "Jose", "message": "Keep it going"});
        let (status, _) = send(&app, "POST", &format!("/tikoys/{}/pass", a_id), Some(form)).await;
        assert_eq!(status, 201);
    }

    #[tokio::test]
    async fn exhausted_pass_count_is_422() {
        let memory = Arc::new(MemoryStore::new());
        let (app, _clock) = app_with(FailoverStore::fallback_only(memory.clone()));
        let (_, a) = send(
            &app,
            "POST",
            "/tikoys",
            Some(json!({"senderName": "Mary", "message": "Huat ah!"})),
        )
        .await;
        let a_id = a["tikoy"]["id"].as_str().unwrap().to_string();

        let mut stored = memory.get(&a_id).await.unwrap().unwrap();
        stored.pass_count = u32::MAX;
        memory.put(&a_id, &stored).await.unwrap();

        let form = json!({"senderName": "Jose", "message": "Keep it going"});
        let (status, body) = send(&app, "POST", &format!("/tikoys/{}/pass", a_id), Some(form)).await;
        assert_eq!(status, 422);
        assert!(body["error"].is_string());
        assert_eq!(memory.len().await, 1);
    }

    #[tokio::test]
    async fn storage_failure_is_generic_500() {
        let store = FailoverStore::new(Some(Arc::new(FailingStore::new())), Arc::new(FailingStore::new()));
        let (app, _clock) = app_with(store);
        let (status, body) = send(
            &app,
            "POST",
            "/tikoys",
            Some(json!({"senderName": "Mary", "message": "Huat ah!"})),
        )
        .await;
        assert_eq!(status, 500);
        assert_eq!(body["error"], super::GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn health_reports_backend() {
        let (app, _clock) = app();
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, 200);
        assert_eq!(body["backend"], "fallback-only");
    }
}
