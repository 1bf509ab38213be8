// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn app(app_state: AppState) -> Router {
    // Rotas públicas
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(handlers::auth::login));

    // Tudo abaixo exige Bearer token
    let protected_routes = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::get_me))
        .route(
            "/api/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/api/users/{id}",
            put(handlers::users::update_user).delete(handlers::users::delete_user),
        )
        .route(
            "/api/regulacao",
            get(handlers::regulacao::list_records).post(handlers::regulacao::create_record),
        )
        .route("/api/regulacao/stats", get(handlers::regulacao::get_stats))
        .route("/api/regulacao/export", get(handlers::regulacao::export_records))
        .route(
            "/api/regulacao/{id}",
            get(handlers::regulacao::get_record)
                .put(handlers::regulacao::update_record)
                .delete(handlers::regulacao::delete_record),
        )
        .route(
            "/api/fisioterapia",
            get(handlers::fisioterapia::list_records).post(handlers::fisioterapia::create_record),
        )
        .route("/api/fisioterapia/report", get(handlers::fisioterapia::get_report))
        .route("/api/fisioterapia/lookup/{cnsCpf}", get(handlers::fisioterapia::lookup_patient))
        .route(
            "/api/fisioterapia/{id}",
            get(handlers::fisioterapia::get_record).put(handlers::fisioterapia::update_patient),
        )
        .route("/api/fisioterapia/{id}/admit", post(handlers::fisioterapia::admit_patient))
        .route(
            "/api/fisioterapia/{id}/sessions/{numero}",
            put(handlers::fisioterapia::record_session),
        )
        .route("/api/fisioterapia/{id}/discharge", post(handlers::fisioterapia::discharge_patient))
        .route("/api/fisioterapia/{id}/observation", put(handlers::fisioterapia::update_observation))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}
