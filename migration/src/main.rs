use tutotime_common::connect;

use crate::settings::Settings;

pub mod settings;
pub mod tables;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    let database = connect(&settings.database).await?;
    println!("Connected to DB");

    database
        .execute_in_transaction(tables::migration_steps(), "tutorials schema")
        .await?;
    println!("Schema migrated");

    database.close().await;
    Ok(())
}
