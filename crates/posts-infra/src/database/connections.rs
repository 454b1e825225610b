use std::time::Duration;

use bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

/// Configuration for the document database.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub app_name: Option<String>,
}

/// Connected MongoDB client and selected database.
///
/// The driver multiplexes a connection pool behind `Client`, so one instance is
/// shared by every request.
#[derive(Clone)]
pub struct MongoConnection {
    pub client: Client,
    pub database: Database,
}

impl MongoConnection {
    /// Connect and verify the server is reachable with a `ping`.
    pub async fn init(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        tracing::info!(database = %config.database, "Connecting to MongoDB...");

        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = config.app_name.clone();
        options.connect_timeout = Some(Duration::from_secs(10));
        options.server_selection_timeout = Some(Duration::from_secs(10));

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);
        database.run_command(doc! { "ping": 1 }).await?;

        tracing::info!(database = %config.database, "MongoDB connected");

        Ok(Self { client, database })
    }
}
