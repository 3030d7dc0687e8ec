use crate::blobs;
use crate::handlers;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, patch, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/session", get(handlers::session))
        .route("/api/auth/logout", post(handlers::logout))
        .route(
            "/api/plans",
            get(handlers::list_plans).post(handlers::create_plan),
        )
        .route(
            "/api/plans/:id",
            patch(handlers::update_plan).delete(handlers::delete_plan),
        )
        .route("/api/plans/:id/duplicate", post(handlers::duplicate_plan))
        .route("/api/plans/:id/complete", post(handlers::complete_plan))
        .route("/api/plans/:id/timer", post(handlers::save_timer))
        .route("/api/plans/:id/tasks", post(handlers::add_task))
        .route(
            "/api/plans/:id/tasks/reorder",
            post(handlers::reorder_tasks),
        )
        .route(
            "/api/plans/:id/tasks/:task_id",
            patch(handlers::update_task).delete(handlers::delete_task),
        )
        .route(
            "/api/plans/:id/progress",
            get(handlers::list_progress).post(handlers::add_progress),
        )
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/notifications", get(handlers::get_notifications))
        .route("/api/windows", get(handlers::list_windows))
        .route("/api/windows/resize", post(handlers::resize_windows))
        .route("/api/windows/:id/focus", post(handlers::focus_window))
        .route("/api/windows/:id/close", post(handlers::close_window))
        .route("/api/windows/:id/minimize", post(handlers::minimize_window))
        .route("/api/windows/:id/drag", post(handlers::drag_window))
        .route(
            "/api/files",
            get(handlers::list_files).post(handlers::upload_file),
        )
        .route(
            "/api/files/:name",
            get(handlers::download_file).delete(handlers::delete_file),
        )
        .route("/api/files/:name/rename", post(handlers::rename_file))
        .route("/api/ipinfo", get(handlers::get_ipinfo))
        .route("/api/run", post(handlers::run_lookup))
        // the documented cap is enforced per upload; the transport limit
        // just has to stay out of the way
        .layer(DefaultBodyLimit::max(blobs::MAX_FILE_SIZE as usize + 1024))
        .with_state(state)
}
