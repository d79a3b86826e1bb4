use std::env;

use dotenvy::dotenv;

use crate::service::reset_token::TokenPolicy;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_reset_per_min: u32,
    pub rate_protected_per_min: u32,

    // Reset-token policy
    pub reset_expiration_minutes: i64,
    pub reset_resend_interval_minutes: i64,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            access_token_ttl: env::var("ACCESS_TOKEN_TTL")
                .unwrap_or_else(|_| "900".to_string()) // default 15 min
                .parse()
                .unwrap(),

            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_reset_per_min: env::var("RATE_RESET_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            reset_expiration_minutes: env::var("RESET_TOKEN_TTL_MIN")
                .unwrap_or_else(|_| "120".to_string()) // 2 hours
                .parse()
                .unwrap(),
            reset_resend_interval_minutes: env::var("RESET_RESEND_INTERVAL_MIN")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
        }
    }

    pub fn token_policy(&self) -> TokenPolicy {
        TokenPolicy {
            expiration_limit: self.reset_expiration_minutes,
            resend_interval: self.reset_resend_interval_minutes,
        }
    }
}
