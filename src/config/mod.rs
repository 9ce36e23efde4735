use rust_decimal::Decimal;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    /// Bearer token for the /api routes (optional; unset disables auth).
    pub api_token: Option<String>,

    // Market defaults applied when a create request omits them
    pub default_creator_fee: Decimal,
    pub default_market_duration_hours: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            api_token: env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),

            default_creator_fee: env::var("DEFAULT_CREATOR_FEE")
                .unwrap_or_else(|_| "5".into())
                .parse()
                .unwrap_or(Decimal::from(5)),
            default_market_duration_hours: env::var("DEFAULT_MARKET_DURATION_HOURS")
                .unwrap_or_else(|_| "24".into())
                .parse()
                .unwrap_or(24),
        })
    }
}
