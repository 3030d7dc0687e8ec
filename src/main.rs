use hackdesk::auth::SessionStore;
use hackdesk::ipinfo::DEFAULT_IPAPI_URL;
use hackdesk::{app, store, AppState};
use std::{env, net::SocketAddr};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let data_dir = store::resolve_data_dir();
    fs::create_dir_all(&data_dir).await?;
    fs::create_dir_all(store::bucket_root(&data_dir)).await?;

    let tables = store::load_tables(&store::tables_path(&data_dir)).await;
    let session = SessionStore::load(&store::session_path(&data_dir)).await;
    let ipapi_url =
        env::var("HACKDESK_IPAPI_URL").unwrap_or_else(|_| DEFAULT_IPAPI_URL.to_string());
    let state = AppState::new(&data_dir, tables, session, ipapi_url);

    let app = app::router(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
