//! Axum REST API over recorded pledges.

use std::sync::Arc;

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::currency;
use crate::db::{self, PledgeRow};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PledgeView {
    #[serde(flatten)]
    pub row: PledgeRow,
    pub amount_display: String,
}

#[derive(Serialize)]
pub struct PledgesResponse {
    pub count: usize,
    pub pledges: Vec<PledgeView>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/pledges", get(get_all_pledges))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /pledges`
///
/// Returns every recorded pledge, oldest first, with the amount rendered as
/// `IDR 100.000`.
pub async fn get_all_pledges(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    match db::get_all_pledges(&state.pool).await {
        Ok(rows) => {
            let pledges: Vec<PledgeView> = rows
                .into_iter()
                .map(|row| PledgeView {
                    amount_display: currency::to_display(&row.faith_promise),
                    row,
                })
                .collect();
            (
                StatusCode::OK,
                Json(serde_json::json!(PledgesResponse {
                    count: pledges.len(),
                    pledges,
                })),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!(ErrorResponse {
                error: e.to_string()
            })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::Value;

    use super::*;
    use crate::db::tests::memory_pool;
    use crate::form::{PaymentMethod, PledgeRecord};

    async fn serve(pool: SqlitePool) -> String {
        let app = router(Arc::new(ApiState { pool }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let base = serve(memory_pool().await).await;
        let body: Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn pledges_are_listed_with_display_amount() {
        let pool = memory_pool().await;
        let record = PledgeRecord {
            full_name: "Budi".into(),
            faith_promise: "100000".into(),
            payment_method: PaymentMethod::Cash,
            proof_of_transfer: None,
            submitted_at: Utc::now(),
        };
        db::insert_pledge(&pool, &record).await.unwrap();

        let base = serve(pool).await;
        let resp = reqwest::get(format!("{base}/pledges")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["count"], 1);
        assert_eq!(body["pledges"][0]["full_name"], "Budi");
        assert_eq!(body["pledges"][0]["amount_display"], "IDR 100.000");
        assert_eq!(body["pledges"][0]["payment_method"], "Cash");
    }
}
