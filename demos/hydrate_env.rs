//! Hydrates a configuration from environment variables through the
//! selector entry point, without an ambient async runtime.
//!
//! Run with `cargo run --example hydrate_env`.

use anyhow::Result;
use cloudsecrets::{hydrate_blocking, hydrate_record};

#[derive(Debug, Default)]
struct Config {
    listen_addr: String,
    api_token: String,
}

hydrate_record!(Config { listen_addr, api_token });

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    // Stands in for a variable provisioned by the deployment environment.
    unsafe {
        std::env::set_var("DEMO_API_TOKEN", "tok-123456");
    }

    let mut config = Config {
        listen_addr: "0.0.0.0:8000".to_string(),
        api_token: "$SECRET:DEMO_API_TOKEN".to_string(),
    };

    hydrate_blocking("env", &mut config)?;

    println!("{config:#?}");
    Ok(())
}
