use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let enable_cors = state.config.security.enable_cors;

    let router = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .fallback(public::system::route_not_found)
        .layer(TraceLayer::new_for_http());

    let router = if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::{session, system};

    Router::new()
        .route("/ping", get(system::ping))
        .route("/health", get(system::health))
        .route("/signup", post(session::signup))
        .route("/login", post(session::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{cctvs, contacts, users};

    Router::new()
        .route("/user/me", get(users::me))
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/:id",
            get(users::get)
                .put(users::update)
                .patch(users::update)
                .delete(users::delete),
        )
        .route("/contacts", get(contacts::list).post(contacts::create))
        .route(
            "/contacts/:id",
            get(contacts::get)
                .put(contacts::update)
                .patch(contacts::update)
                .delete(contacts::delete),
        )
        .route("/cctvs", get(cctvs::list).post(cctvs::create))
        .route(
            "/cctvs/:id",
            get(cctvs::get)
                .put(cctvs::update)
                .patch(cctvs::update)
                .delete(cctvs::delete),
        )
        // Only matched routes pass through the bearer check
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
