use anyhow::{Context, Result};
use sqlx::MySqlPool;

pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Roster pool plus the clocking device pool, shared when both URLs match.
pub async fn init_pools(database_url: &str, attendance_url: &str) -> Result<(MySqlPool, MySqlPool)> {
    let main = init_db(database_url).await?;
    let attendance = if attendance_url == database_url {
        main.clone()
    } else {
        init_db(attendance_url)
            .await
            .context("Failed to connect to attendance store")?
    };

    Ok((main, attendance))
}
