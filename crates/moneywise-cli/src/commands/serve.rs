//! Server command implementation

use anyhow::Result;
use moneywise_core::Settings;
use moneywise_server::ServerConfig;

use super::open_db;

pub async fn cmd_serve(settings: &Settings, host: &str, port: u16) -> Result<()> {
    println!("🚀 Starting Moneywise web server...");
    println!("   Database: {}", settings.database_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!();
    println!("   ⚠️  No authentication - do not expose to network!");

    let db = open_db(settings)?;
    let config = ServerConfig {
        currency: settings.currency.clone(),
        recent_limit: settings.recent_limit,
    };

    moneywise_server::serve(db, host, port, config).await
}
