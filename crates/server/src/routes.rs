use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use callcenter_agent::profile::{catalog, ActionDescriptor};
use callcenter_agent::{ActionOutput, ActionRuntime, AgentProfile};
use callcenter_core::{ApplicationError, InterfaceError};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::health;

#[derive(Clone)]
pub struct AppState {
    pub runtime: ActionRuntime,
    pub profile: Arc<AgentProfile>,
}

/// Body the LLM runtime posts for one action call.
#[derive(Clone, Debug, Deserialize)]
pub struct InvokeRequest {
    pub input_str: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: &'static str,
    pub detail: String,
    pub correlation_id: String,
}

impl From<&InterfaceError> for ErrorBody {
    fn from(error: &InterfaceError) -> Self {
        Self {
            error: error.error_class(),
            message: error.user_message(),
            detail: error.message().to_string(),
            correlation_id: error.correlation_id().to_string(),
        }
    }
}

fn status_for(error: &InterfaceError) -> StatusCode {
    match error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/agent", get(agent_profile))
        .route("/actions", get(list_actions))
        .route("/actions/{identifier}", post(invoke_action))
        .with_state(state)
}

async fn agent_profile(State(state): State<AppState>) -> Json<AgentProfile> {
    Json(state.profile.as_ref().clone())
}

async fn list_actions() -> Json<Vec<ActionDescriptor>> {
    Json(catalog())
}

async fn invoke_action(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
    payload: Result<Json<InvokeRequest>, JsonRejection>,
) -> Result<Json<ActionOutput>, (StatusCode, Json<ErrorBody>)> {
    let correlation_id = Uuid::new_v4().to_string();

    let result = match payload {
        Ok(Json(request)) => state
            .runtime
            .invoke_with_correlation(&identifier, &request.input_str, &correlation_id)
            .await
            .map_err(ApplicationError::from),
        Err(rejection) => Err(ApplicationError::InvalidRequest(rejection.body_text())),
    };

    result.map(Json).map_err(|error| {
        let interface = error.into_interface(&correlation_id);
        let status = status_for(&interface);
        warn!(
            event_name = "http.actions.rejected",
            correlation_id = %correlation_id,
            identifier = %identifier,
            status = status.as_u16(),
            error_class = interface.error_class(),
            "action call rejected"
        );
        (status, Json(ErrorBody::from(&interface)))
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use callcenter_agent::{ActionFactory, ActionRuntime, ActionSettings, AgentProfile};
    use callcenter_core::config::{AgentConfig, FindSlotsConfig, SendTextConfig};
    use callcenter_core::{DryRunSmsSender, StaticAvailability};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::{router, AppState};

    pub(crate) fn state_with(availability: StaticAvailability) -> AppState {
        let factory = ActionFactory::new(
            ActionSettings {
                find_slots: FindSlotsConfig { nearest: false },
                send_text: SendTextConfig { timeout_secs: 5 },
                from_number: "+15550001111".to_string(),
            },
            Arc::new(availability),
            Arc::new(DryRunSmsSender),
        );
        AppState {
            runtime: ActionRuntime::new(factory),
            profile: Arc::new(AgentProfile::from_config(&AgentConfig {
                first_message: "Hello, how can I help?".to_string(),
                prompt_preamble: "You book appointments.".to_string(),
            })),
        }
    }

    async fn call(request: Request<Body>) -> (StatusCode, Value) {
        let response = router(state_with(StaticAvailability::default()))
            .oneshot(request)
            .await
            .expect("router responds");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body is readable");
        let body = serde_json::from_slice(&bytes).expect("body is json");
        (status, body)
    }

    fn post_action(identifier: &str, input_str: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/actions/{identifier}"))
            .header("content-type", "application/json")
            .body(Body::from(serde_json::json!({ "input_str": input_str }).to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn find_slots_call_returns_action_output() {
        let (status, body) =
            call(post_action("find_slots", "John Smith|415 Mission St|headache|john smith")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action_type"], "find_slots");
        assert_eq!(body["response"]["success"], true);
        assert_eq!(
            body["response"]["message"],
            "John Smith, 2024-03-08 12:00:00.000000, 55 Fruit St, Boston, MA 02114"
        );
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn malformed_send_text_is_a_failed_output_not_an_http_error() {
        let (status, body) = call(post_action("send_text", "John|555-1234")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"]["success"], false);
        assert_eq!(body["error"]["error_class"], "malformed_parameter");
    }

    #[tokio::test]
    async fn unknown_action_returns_not_found_with_correlation_id() {
        let (status, body) = call(post_action("best_times", "anything")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "The requested action is not available.");
        assert_eq!(body["detail"], "unknown action `best_times`");
        assert!(!body["correlation_id"].as_str().unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn body_without_input_str_is_a_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/actions/find_slots")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"input":"Ann|1 Main St|rash|"}"#))
            .expect("request builds");

        let (status, body) = call(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
        assert_eq!(
            body["message"],
            "The request could not be processed. Check inputs and try again."
        );
        assert!(body["detail"].as_str().unwrap_or_default().contains("input_str"));
    }

    #[tokio::test]
    async fn catalog_and_profile_are_published() {
        let (status, actions) =
            call(Request::builder().uri("/actions").body(Body::empty()).expect("request")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(actions.as_array().map(Vec::len), Some(2));
        assert_eq!(actions[1]["action_type"], "send_text");

        let (status, profile) =
            call(Request::builder().uri("/agent").body(Body::empty()).expect("request")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["first_message"], "Hello, how can I help?");
        assert_eq!(profile["actions"][0]["action_type"], "find_slots");
    }
}
