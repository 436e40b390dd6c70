pub mod admin;
pub mod dashboard;
pub mod helpers;
pub mod session;

use axum::Router;

use crate::store::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(session::router())
        .merge(dashboard::router())
        .merge(admin::router())
}
