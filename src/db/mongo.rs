use std::fs;
use uuid::Uuid;
use tracing::{debug, info};
use mongodb::{Client, Database, bson::{doc, Document}, options::ClientOptions};
use crate::utils::config::Configuration;
use crate::utils::errors::{ErrorCode, WardenError};

///
/// Run any schema-like updates against MongoDB that haven't been run yet.
///
pub async fn update_mongo(db: &Database) -> Result<(), WardenError> {
    create_init_indexes(db).await?;
    Ok(())
}

async fn create_init_indexes(db: &Database) -> Result<(), WardenError> {
    // Note: the current driver doesn't yet support creating indexes on collections, so the dbcommand must be used instead.
    // https://docs.mongodb.com/manual/reference/command/createIndexes/#createindexes

    db.run_command(doc! { "createIndexes": "Members",        "indexes": [{ "key": { "email": 1 }, "name": "idx_email", "unique": true }] }, None).await?;
    db.run_command(doc! { "createIndexes": "RecoveryTokens", "indexes": [{ "key": { "token": 1 }, "name": "idx_token", "unique": true }] }, None).await?;

    Ok(())
}

pub async fn get_mongo_db(app_name: &str, config: &Configuration) -> Result<Database, WardenError> {

    let uri = match &config.mongo_credentials {
        Some(filename) => {
            debug!("Loading MongoDB credentials from secrets file {}", filename);

            // Read username and password from a secrets file.
            let credentials = fs::read_to_string(filename)
                .map_err(|err| ErrorCode::UnableToReadCredentials
                    .with_msg(&format!("Unable to read credentials from {}: {}", filename, err)))?;
            let mut credentials = credentials.lines();
            let uri = config.mongo_uri.replace("$USERNAME", credentials.next().unwrap_or_default());
            uri.replace("$PASSWORD", credentials.next().unwrap_or_default())
        },
        None => config.mongo_uri.clone(),
    };

    let mut client_options = ClientOptions::parse(&uri).await?;
    client_options.app_name = Some(app_name.to_string());

    let client = Client::with_options(client_options)?;

    info!("Connecting to MongoDB...");

    let db = client.database(&config.db_name);
    ping(&db).await?;

    info!("Connected to MongoDB");
    Ok(db)
}

pub async fn ping(db: &Database) -> Result<Document, WardenError> {
    Ok(db.run_command(doc! { "ping": 1 }, None).await?)
}

pub fn generate_id() -> String {
    Uuid::new_v4().to_hyphenated().to_string()
}
