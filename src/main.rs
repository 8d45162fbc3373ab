// main.rs
use poem::{EndpointExt, Route, listener::TcpListener, middleware::{Cors, Tracing}};
use poem_openapi::OpenApiService;
use std::sync::Arc;

mod api;
mod config;
mod entities;
mod error;
mod export;
mod matcher;
mod migration;
mod query;
mod store;
mod uploads;

use api::{Api, AppState};
use config::Settings;
use store::Store;
use uploads::UploadDir;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();

    let store = Store::open(&settings.database_url).await?;
    let state = Arc::new(AppState {
        store: store.clone(),
        export_dir: settings.export_dir.clone(),
        uploads: UploadDir::new(settings.upload_dir.clone()),
    });

    let api = OpenApiService::new(Api::new(state), "Job Match API", "1.0")
        .server("/api");
    let ui = api.swagger_ui();

    let app = Route::new()
        .nest("/api", api)
        .nest("/", ui)
        .with(Cors::new())
        .with(Tracing);

    tracing::info!("listening on {}", settings.listen_addr);
    poem::Server::new(TcpListener::bind(settings.listen_addr.as_str()))
        .run_with_graceful_shutdown(
            app,
            async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("received ctrl+c, shutting down");
            },
            None,
        )
        .await?;

    store.close().await?;
    Ok(())
}
