use sea_orm::DatabaseConnection;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::{postgres, testcontainers};
use todolist_server::config::DatabaseConfig;

pub async fn setup_container() -> anyhow::Result<testcontainers::ContainerAsync<postgres::Postgres>>
{
    let container = postgres::Postgres::default().start().await?;
    Ok(container)
}

/// Connects to the container through the application's own connector and migrates it.
pub async fn setup_db(
    container: &testcontainers::ContainerAsync<postgres::Postgres>,
) -> anyhow::Result<DatabaseConnection> {
    let config = DatabaseConfig {
        user: "postgres".to_string(),
        password: "postgres".to_string(),
        host: container.get_host().await?.to_string(),
        port: container.get_host_port_ipv4(5432).await?,
        dbname: "postgres".to_string(),
    };
    let db = todolist_server::db::connect(&config).await?;
    todolist_server::db::run_migrations(&db).await?;
    Ok(db)
}
