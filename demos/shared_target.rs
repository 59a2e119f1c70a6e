//! Example demonstrating binding into shared configuration

use std::sync::{Arc, RwLock};

use envtag::{BindError, Record};

#[derive(Debug, Default, Record)]
struct Config {
    #[env("LOG_LEVEL,defVal:info")]
    pub log_level: String,
}

fn main() -> anyhow::Result<()> {
    let shared = Arc::new(RwLock::new(Config::default()));

    std::env::set_var("LOG_LEVEL", "debug");
    envtag::bind(&*shared)?;
    println!("Log level: {}", shared.read().map_err(|e| anyhow::anyhow!("{e}"))?.log_level);

    // A record that is being read cannot be bound
    let reader = shared.read().map_err(|e| anyhow::anyhow!("{e}"))?;
    match envtag::bind(&*shared) {
        Err(BindError::Unassignable { target, reason }) => {
            println!("Cannot bind {target}: {reason}");
        }
        other => println!("Unexpected result: {other:?}"),
    }
    drop(reader);

    Ok(())
}
