//! Example demonstrating list and duration fields

use std::time::Duration;

use envtag::Record;

#[derive(Debug, Default, Record)]
struct Config {
    // Comma separated, at least one entry
    #[env("ALLOWED_ORIGINS,defVal:localhost,min:1")]
    pub allowed_origins: Vec<String>,

    // Directive tokens are comma separated too, so a default holds one element
    #[env("RETRY_CODES,defVal:503")]
    pub retry_codes: Vec<u16>,

    // Unit suffixes: ns, us, ms, s, m, h
    #[env("REQUEST_TIMEOUT,defVal:1m30s")]
    pub request_timeout: Duration,

    // A plain integer counts seconds
    #[env("IDLE_TIMEOUT,defVal:300")]
    pub idle_timeout: Duration,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("ALLOWED_ORIGINS", "https://example.com,https://api.example.com");
    std::env::set_var("RETRY_CODES", "429,503");

    let config = Config::from_env()?;

    println!("Configuration loaded:");
    println!("  Allowed Origins: {:?}", config.allowed_origins);
    println!("  Retry Codes: {:?}", config.retry_codes);
    println!("  Request Timeout: {:?}", config.request_timeout);
    println!("  Idle Timeout: {:?}", config.idle_timeout);

    Ok(())
}
