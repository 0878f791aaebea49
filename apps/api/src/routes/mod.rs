pub mod health;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::auth::require_admin;
use crate::portfolio::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/api/profile",
            get(handlers::handle_get_profile)
                .post(handlers::handle_upsert_profile)
                .put(handlers::handle_replace_profile),
        )
        .route(
            "/api/skills",
            get(handlers::handle_list_skills).post(handlers::handle_create_skill),
        )
        .route(
            "/api/skills/:id",
            put(handlers::handle_update_skill).delete(handlers::handle_delete_skill),
        )
        .route(
            "/api/projects",
            get(handlers::handle_list_projects).post(handlers::handle_create_project),
        )
        .route(
            "/api/projects/:id",
            put(handlers::handle_update_project).delete(handlers::handle_delete_project),
        )
        .route("/api/explore", get(handlers::handle_explore))
        .route("/api/search", get(handlers::handle_search))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    // Anything the API does not claim (resume.pdf, images) comes from disk.
    let assets = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(api)
        .fallback_service(assets)
        .with_state(state)
}
