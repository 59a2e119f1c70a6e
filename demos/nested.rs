//! Example demonstrating nested records

use envtag::Record;

#[derive(Debug, Default, Record)]
struct Config {
    #[env("APP_NAME,defVal:my-application")]
    pub app_name: String,

    #[env(nested)]
    pub database: DatabaseConfig,

    #[env(nested)]
    pub cache: CacheConfig,
}

#[derive(Debug, Default, Record)]
struct DatabaseConfig {
    #[env("DB_HOST,defVal:localhost")]
    pub host: String,

    #[env("DB_PORT,defVal:5432")]
    pub port: u16,

    #[env("DB_USER,required")]
    pub username: String,
}

#[derive(Debug, Default, Record)]
struct CacheConfig {
    #[env("CACHE_SIZE,defVal:1024")]
    pub size: usize,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("DB_USER", "admin");
    std::env::set_var("CACHE_SIZE", "4096");

    let mut config = Config::default();
    envtag::bind(&mut config)?;

    println!("Configuration loaded:");
    println!("  App Name: {}", config.app_name);
    println!(
        "  Database: {}:{} (user: {})",
        config.database.host, config.database.port, config.database.username
    );
    println!("  Cache Size: {}", config.cache.size);

    Ok(())
}
