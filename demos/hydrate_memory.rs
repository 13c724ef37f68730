//! Hydrates a typed configuration from an in-memory provider.
//!
//! Run with `cargo run --example hydrate_memory`.

use anyhow::Result;
use cloudsecrets::{HydrateOptions, MemoryProvider, hydrate_record, hydrate_with};
use serde_json::json;

#[derive(Debug, Default)]
struct Config {
    db: Db,
    features: serde_json::Value,
}

hydrate_record!(Config { db, features });

#[derive(Debug, Default)]
struct Db {
    database: String,
    host: String,
    username: String,
    password: String,
}

hydrate_record!(Db { database, host, username, password });

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloudsecrets=debug".into()),
        )
        .init();

    let provider: MemoryProvider = [
        ("apiDbPassword", "changethissecret"),
        ("analyticsToken", "AuthTokenSecret"),
    ]
    .into_iter()
    .collect();

    let mut config = Config {
        db: Db {
            database: "postgres".to_string(),
            host: "localhost:5432".to_string(),
            username: "sequence".to_string(),
            password: "$SECRET:apiDbPassword".to_string(),
        },
        features: json!({
            "analytics": { "token": "$SECRET:analyticsToken" },
        }),
    };

    hydrate_with(&provider, &mut config, &HydrateOptions::new()).await?;

    println!("{config:#?}");
    Ok(())
}
