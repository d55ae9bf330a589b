use dotenvy::dotenv;
use tracing::info;

use kurs_config::ServerConfig;

use kurs::logging::init_tracing;
use kurs::router::init_router;
use kurs::state::init_app_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing()?;

    let state = init_app_state().await?;
    tokio::fs::create_dir_all(&state.upload_config.dir).await?;

    let server_config = ServerConfig::from_env();
    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind(server_config.bind_addr()).await?;
    info!(addr = %server_config.bind_addr(), "Server running");
    info!("Swagger UI available at /swagger-ui, Scalar at /scalar");

    axum::serve(listener, app).await?;
    Ok(())
}
