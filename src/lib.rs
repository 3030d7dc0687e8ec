pub mod app;
pub mod auth;
pub mod blobs;
pub mod errors;
pub mod handlers;
pub mod ipinfo;
pub mod models;
pub mod notify;
pub mod plans;
pub mod state;
pub mod stats;
pub mod store;
pub mod ui;
pub mod windows;

pub use app::router;
pub use state::AppState;
pub use store::{load_tables, resolve_data_dir};
