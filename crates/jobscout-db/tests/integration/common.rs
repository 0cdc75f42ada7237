use chrono::{TimeZone, Utc};
use jobscout_core::models::JobPosting;
use jobscout_db::Database;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

/// Spins up a PostgreSQL container, applies migrations, and returns a pool.
///
/// Keep the `ContainerAsync` alive for the whole test; dropping it stops
/// the container.
pub async fn setup_test_db() -> (PgPool, ContainerAsync<GenericImage>) {
    let container = GenericImage::new("postgres", "16")
        .with_exposed_port(ContainerPort::Tcp(5432))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_PASSWORD", "postgres")
        .with_env_var("POSTGRES_DB", "jobscout_test")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");

    let connection_string = format!("postgresql://postgres:postgres@{host}:{port}/jobscout_test");

    // The ready message is printed once during init too; keep retrying.
    const MAX_RETRIES: u32 = 30;
    let mut retries = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .connect(&connection_string)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retries += 1;
                if retries >= MAX_RETRIES {
                    panic!("Failed to connect to database after {MAX_RETRIES} retries: {e}");
                }
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }
        }
    };

    Database::from_pool(pool.clone())
        .migrate()
        .await
        .expect("Failed to run migrations");

    (pool, container)
}

pub fn posting(source: &str, source_id: &str) -> JobPosting {
    JobPosting {
        source: source.to_string(),
        source_id: source_id.to_string(),
        title: "Backend Engineer".to_string(),
        company: "Acme Corp".to_string(),
        location: "Berlin".to_string(),
        remote: true,
        url: format!("https://jobs.example.com/{source}/{source_id}"),
        description: "Django and Postgres".to_string(),
        published_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
        ingested_at: Some(Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap()),
        ai_class: None,
        ai_reasoning: None,
        tags: Vec::new(),
    }
}
