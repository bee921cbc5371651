//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get},
    Router,
};
use tower_http::trace::TraceLayer;

use super::auth::require_bearer;
use super::handlers::{
    clear_handler, delete_item_handler, get_item_handler, method_not_allowed, not_found,
    put_item_handler, reset_stats_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET|DELETE /stats` - Snapshot or reset statistics
/// - `DELETE /items` - Clear the store
/// - `GET|PUT|DELETE /items/{key}` - Single item operations
/// - `GET /.well-known/acme-challenge/{token}` - Only when `challenge` is given
///
/// Any other verb on these paths is a 405, any other path a 404.
///
/// # Middleware
/// - Authorization: bearer token check ahead of every handler
/// - Body limit: disabled, the store decides what it accepts
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState, challenge: Option<Router>) -> Router {
    let mut router = Router::new()
        .route(
            "/stats",
            get(stats_handler)
                .head(method_not_allowed)
                .delete(reset_stats_handler)
                .fallback(method_not_allowed),
        )
        .route("/items", delete(clear_handler).fallback(method_not_allowed))
        .route(
            "/items/*key",
            get(get_item_handler)
                .head(method_not_allowed)
                .put(put_item_handler)
                .delete(delete_item_handler)
                .fallback(method_not_allowed),
        )
        .fallback(not_found)
        .with_state(state.clone());

    if let Some(challenge) = challenge {
        router = router.merge(challenge);
    }

    router
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::from_fn_with_state(state, require_bearer))
        .layer(TraceLayer::new_for_http())
}
