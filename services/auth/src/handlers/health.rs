//! Readiness probe. Liveness (`/healthz`) comes from `murmur_core`; readiness
//! is service-specific because it has to reach the backing stores.

use axum::extract::State;
use axum::http::StatusCode;
use deadpool_redis::redis::cmd;
use tracing::warn;

use crate::state::AppState;

/// Handler for `GET /readyz` — 200 only when both Postgres and Redis answer.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    if let Err(e) = state.db.ping().await {
        warn!(error = %e, "readiness: database unreachable");
        return StatusCode::SERVICE_UNAVAILABLE;
    }

    let redis_ok = async {
        let mut conn = state.redis.get().await?;
        cmd("PING").query_async::<()>(&mut conn).await?;
        Ok::<_, anyhow::Error>(())
    }
    .await;
    if let Err(e) = redis_ok {
        warn!(error = %e, "readiness: redis unreachable");
        return StatusCode::SERVICE_UNAVAILABLE;
    }

    StatusCode::OK
}
