use upload_backend::{
    media_storage::create_object_store,
    server,
    types::{Environment, StorageConfig},
    upload::UploadPolicy,
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.tracing_level().to_string()));

    // Use JSON format for staging/production, regular format for development
    if environment.json_logs() {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    let port = Environment::port(|name| std::env::var(name).ok())?;
    let storage_config = StorageConfig::from_env()?;
    tracing::debug!("Storage configuration: {storage_config:?}");

    let policy = UploadPolicy::for_config(&storage_config);
    let store = create_object_store(&storage_config)?;

    server::start(environment, port, store, policy).await
}
