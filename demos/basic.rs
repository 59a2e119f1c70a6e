//! Basic usage example

use envtag::Record;

#[derive(Debug, Default, Record)]
struct Config {
    // Required: fails when DATABASE_URL is not set
    #[env("DATABASE_URL,required")]
    pub database_url: String,

    // With default value
    #[env("SERVER_ADDR,defVal:127.0.0.1:8080")]
    pub server_addr: String,

    // Numeric type
    #[env("MAX_CONNECTIONS,defVal:10")]
    pub max_connections: u32,

    // Boolean type, left false when unset
    #[env("DEBUG_MODE")]
    pub debug_mode: bool,
}

fn main() -> anyhow::Result<()> {
    // RUST_LOG=envtag=debug shows how each field was resolved
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Set environment variables for demonstration
    std::env::set_var("DATABASE_URL", "postgres://localhost/mydb");
    std::env::set_var("SERVER_ADDR", "0.0.0.0:3000");

    // Load configuration
    let mut config = Config::default();
    envtag::bind(&mut config)?;

    println!("Configuration loaded:");
    println!("  Database URL: {}", config.database_url);
    println!("  Server Address: {}", config.server_addr);
    println!("  Max Connections: {}", config.max_connections);
    println!("  Debug Mode: {}", config.debug_mode);

    Ok(())
}
