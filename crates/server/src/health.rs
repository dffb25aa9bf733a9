use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use crate::routes::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub sms: HealthCheck,
    pub availability: HealthCheck,
    pub checked_at: String,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let factory = state.runtime.factory();
    let availability = availability_check(factory.availability().provider_count());
    let ready = availability.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "callcenter-server action runtime initialized".to_string(),
        },
        sms: HealthCheck {
            status: "ready",
            detail: format!("sms provider `{}` configured", factory.sms().provider_name()),
        },
        availability,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn availability_check(provider_count: usize) -> HealthCheck {
    if provider_count == 0 {
        return HealthCheck {
            status: "degraded",
            detail: "availability table has no providers".to_string(),
        };
    }

    HealthCheck { status: "ready", detail: format!("{provider_count} providers with open slots") }
}
