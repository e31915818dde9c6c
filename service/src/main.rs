use tutotime_common::connect;

use crate::infrastructure::AppStateImpl;
use crate::infrastructure::auth::IdentityClient;
use crate::infrastructure::http::{HttpServer, HttpServerConfig};
use crate::infrastructure::media::MediaClient;
use crate::infrastructure::persistence::PostgresRecordStore;
use crate::infrastructure::settings::Settings;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod domain;
mod infrastructure;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database = connect(&settings.database).await?;
    tracing::info!("connected to the record store");

    let records = PostgresRecordStore::new(database);
    let media = MediaClient::from_settings(&settings.media)?;
    let identity = IdentityClient::new(&settings.identity);
    identity.resolve_initial_session().await;

    let state = AppStateImpl::new(records, media, identity);

    let server_config = HttpServerConfig {
        port: &settings.server_port,
    };
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}
