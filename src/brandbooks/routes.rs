use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Create the brandbooks router
///
/// Both `/brandbooks` and `/brandbooks/` are served.
pub fn brandbooks_routes() -> Router {
    Router::new()
        .route(
            "/brandbooks",
            get(handlers::list_brandbooks).post(handlers::create_brandbook),
        )
        .route(
            "/brandbooks/",
            get(handlers::list_brandbooks).post(handlers::create_brandbook),
        )
        .route(
            "/brandbooks/:id",
            get(handlers::get_brandbook).delete(handlers::delete_brandbook),
        )
        .route("/brandbooks/:id/items", post(handlers::add_item))
        .route("/brandbooks/:id/files", post(handlers::add_file))
}
