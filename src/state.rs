use crate::auth::SessionStore;
use crate::store::{self, Tables};
use crate::windows::WindowManager;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub tables_path: PathBuf,
    pub tables: Arc<Mutex<Tables>>,
    pub session: Arc<Mutex<SessionStore>>,
    pub windows: Arc<Mutex<WindowManager>>,
    pub bucket_root: PathBuf,
    pub http: reqwest::Client,
    pub ipapi_url: String,
}

impl AppState {
    pub fn new(
        data_dir: &std::path::Path,
        tables: Tables,
        session: SessionStore,
        ipapi_url: String,
    ) -> Self {
        Self {
            tables_path: store::tables_path(data_dir),
            tables: Arc::new(Mutex::new(tables)),
            session: Arc::new(Mutex::new(session)),
            // seeded with a desktop viewport until the client reports one
            windows: Arc::new(Mutex::new(WindowManager::new(1280, 800))),
            bucket_root: store::bucket_root(data_dir),
            http: reqwest::Client::new(),
            ipapi_url,
        }
    }
}
