use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Sales tax applied at checkout, in basis points (250 = 2.5%).
    pub tax_rate_bps: i64,
    /// Directory of plain-SQL migration files, applied in filename order.
    pub migrations_dir: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let tax_rate_bps = env::var("TAX_RATE_BPS")
            .ok()
            .and_then(|p| p.parse::<i64>().ok())
            .unwrap_or(0);
        let migrations_dir =
            env::var("MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string());
        Ok(Self {
            database_url,
            host,
            port,
            tax_rate_bps,
            migrations_dir,
        })
    }
}
