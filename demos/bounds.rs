//! Example demonstrating min/max bounds and error reporting

use std::time::Duration;

use envtag::{BindError, Binder, Policy, Record};

#[derive(Debug, Default, Record)]
struct Config {
    // Numeric bounds compare the value
    #[env("WORKERS,defVal:4,min:1,max:64")]
    pub workers: u32,

    // String bounds compare the length
    #[env("SERVICE_NAME,defVal:api,min:2,max:16")]
    pub service_name: String,

    // List bounds compare the number of elements
    #[env("REPLICAS,defVal:a,min:2")]
    pub replicas: Vec<String>,

    #[env("SHUTDOWN_GRACE,defVal:10s,max:1m")]
    pub shutdown_grace: Duration,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("WORKERS", "0");
    std::env::set_var("SHUTDOWN_GRACE", "5m");

    // Collect every failing field
    let mut config = Config::default();
    match envtag::bind(&mut config) {
        Ok(()) => println!("Configuration loaded: {config:?}"),
        Err(BindError::Fields(errors)) => {
            println!("{} field(s) failed:", errors.len());
            for error in &errors {
                println!("  {error}");
            }
        }
        Err(error) => return Err(error.into()),
    }

    // Or stop at the first one
    let binder = Binder::new().with_policy(Policy::FailFast);
    if let Err(error) = binder.bind(&mut config) {
        println!("First failure only:\n  {error}");
    }

    Ok(())
}
