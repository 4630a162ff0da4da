use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use murmur_core::health::healthz;
use murmur_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    account::{login_activities, me},
    email::{resend_email, verify_email},
    health::readyz,
    mfa::{activate, deactivate, regenerate_codes, status, verify},
    password::{confirm_reset, request_reset},
    session::{login, logout, mfa_login, refresh_token},
    signup::signup,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Session
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/mfa/login", post(mfa_login))
        .route("/token/refresh", post(refresh_token))
        .route("/logout", post(logout))
        // Email verification
        .route("/verify/email", post(verify_email))
        .route("/resend/email", post(resend_email))
        // MFA management
        .route("/mfa/activate", post(activate))
        .route("/mfa/verify", post(verify))
        .route("/mfa/status", get(status))
        .route("/mfa/regenerate-codes", post(regenerate_codes))
        .route("/mfa/deactivate", post(deactivate))
        // Password reset
        .route("/password/reset", post(request_reset))
        .route("/password/reset/new", post(confirm_reset))
        // Account
        .route("/me", get(me))
        .route("/login/activities", get(login_activities))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
