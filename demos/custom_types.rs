//! Example demonstrating conversions for custom types

use std::net::IpAddr;

use envtag::{Binder, Record, Registry};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct Upstream {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Default, Record)]
struct Config {
    // Registered with FromStr
    #[env("BIND_IP,defVal:127.0.0.1")]
    pub bind_ip: Option<IpAddr>,

    // List of a registered element type
    #[env("TRUSTED_PROXIES")]
    pub trusted_proxies: Vec<IpAddr>,

    // Decoded from JSON
    #[env("UPSTREAM,required")]
    pub upstream: Upstream,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("TRUSTED_PROXIES", "10.0.0.1,10.0.0.2");
    std::env::set_var("UPSTREAM", r#"{"host":"db.internal","port":5432}"#);

    let mut registry = Registry::new();
    registry
        .register(|raw: &str| raw.parse::<IpAddr>().map(Some))
        .register_list(|raw: &str| raw.parse::<IpAddr>())
        .register_json::<Upstream>();

    let mut config = Config::default();
    Binder::new().with_registry(registry).bind(&mut config)?;

    println!("Configuration loaded:");
    println!("  Bind IP: {:?}", config.bind_ip);
    println!("  Trusted Proxies: {:?}", config.trusted_proxies);
    println!("  Upstream: {}:{}", config.upstream.host, config.upstream.port);

    Ok(())
}
