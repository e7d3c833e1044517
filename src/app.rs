use crate::handlers;
use crate::remote::RemoteStore;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn router<R: RemoteStore>(state: AppState<R>) -> Router {
    Router::new()
        .route("/", get(handlers::index::<R>))
        .route("/days/:day/toggle/:task", post(handlers::form_toggle::<R>))
        .route("/days/:day/clear", post(handlers::form_clear::<R>))
        .route("/days/:day/note", post(handlers::form_note::<R>))
        .route("/api/tasks", get(handlers::get_tasks))
        .route("/api/days", get(handlers::get_days::<R>))
        .route("/api/days/:day", get(handlers::get_day::<R>))
        .route("/api/days/:day/toggle", post(handlers::toggle::<R>))
        .route("/api/days/:day/clear", post(handlers::clear::<R>))
        .route("/api/days/:day/note", put(handlers::save_note::<R>))
        .route("/api/stats", get(handlers::get_stats::<R>))
        .route("/api/status", get(handlers::get_status::<R>))
        .with_state(state)
}
