use axum::http::StatusCode;

/// Handler for `GET /healthz` — liveness only: the process is up and the
/// router answers. Readiness lives in each service, next to the backing
/// stores it has to probe.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
