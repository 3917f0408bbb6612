//! Config - Configurazione dell'applicazione letta dalle variabili d'ambiente

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

const DEFAULT_JWT_SECRET: &str = "petconnect-dev-secret-change-me";

/// Parametri SMTP, presenti solo se `SMTP_HOST` è impostato
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub max_connections: u32,
    pub connection_lifetime_secs: u64,
    pub app_env: String,
    pub cors_allowed_origin: String,
    pub upload_dir: PathBuf,
    pub max_photo_bytes: usize,
    pub frontend_url: String,
    pub reset_token_ttl_minutes: i64,
    pub smtp: Option<SmtpConfig>,
}

/// Legge una variabile numerica con default, restituendo un messaggio leggibile in caso di errore
fn parse_var<T: FromStr>(name: &str, default: &str, hint: &str) -> Result<T, String> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|_| format!("Invalid {name}: {hint}"))
}

impl Config {
    /// Carica la configurazione dalle variabili d'ambiente
    /// Chiama dotenv() automaticamente
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set in .env file".to_string())?;

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using default (not secure for production!)");
            DEFAULT_JWT_SECRET.to_string()
        });

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port = parse_var::<u16>("SERVER_PORT", "3000", "must be a number between 0-65535")?;
        let max_connections =
            parse_var::<u32>("MAX_DB_CONNECTIONS", "20", "must be a positive number")?;
        let connection_lifetime_secs =
            parse_var::<u64>("DB_CONNECTION_LIFETIME_SECS", "1800", "must be a positive number")?;
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let cors_allowed_origin = env::var("CORS_ALLOWED_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());
        let upload_dir = PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()));
        let max_photo_bytes =
            parse_var::<usize>("MAX_PHOTO_BYTES", "5242880", "must be a size in bytes")?;
        let frontend_url = env::var("FRONTEND_URL").unwrap_or_else(|_| cors_allowed_origin.clone());
        let reset_token_ttl_minutes =
            parse_var::<i64>("RESET_TOKEN_TTL_MINUTES", "30", "must be a number of minutes")?;

        let smtp = match env::var("SMTP_HOST") {
            Ok(host) if !host.trim().is_empty() => Some(SmtpConfig {
                host,
                port: parse_var::<u16>("SMTP_PORT", "587", "must be a port number")?,
                username: env::var("SMTP_USERNAME").unwrap_or_default(),
                password: env::var("SMTP_PASSWORD").unwrap_or_default(),
                from_address: env::var("SMTP_FROM")
                    .unwrap_or_else(|_| "PetConnect <no-reply@petconnect.local>".to_string()),
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            server_host,
            server_port,
            max_connections,
            connection_lifetime_secs,
            app_env,
            cors_allowed_origin,
            upload_dir,
            max_photo_bytes,
            frontend_url,
            reset_token_ttl_minutes,
            smtp,
        })
    }

    /// Logga la configurazione (nascondendo i segreti)
    pub fn print_info(&self) {
        info!("Server configuration:");
        info!("   Environment: {}", self.app_env);
        info!("   Server Address: {}:{}", self.server_host, self.server_port);
        info!("   Database: {}", Self::mask_url(&self.database_url));
        info!("   Max DB Connections: {}", self.max_connections);
        info!("   Connection Lifetime: {}s", self.connection_lifetime_secs);
        info!("   CORS Origin: {}", self.cors_allowed_origin);
        info!("   Upload Dir: {}", self.upload_dir.display());
        match &self.smtp {
            Some(smtp) => info!("   SMTP: {}:{} (from {})", smtp.host, smtp.port, smtp.from_address),
            None => info!("   SMTP: not configured, emails are only logged"),
        }
        if self.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("   JWT Secret: USING DEFAULT (INSECURE!)");
        } else {
            info!("   JWT Secret: custom secret configured");
        }
    }

    /// Maschera l'URL del database per il logging
    fn mask_url(url: &str) -> String {
        if let (Some(at_pos), Some(scheme_end)) = (url.rfind('@'), url.find("://")) {
            let scheme = &url[..scheme_end + 3];
            let after_at = &url[at_pos..];
            return format!("{}***{}", scheme, after_at);
        }
        "***".to_string()
    }
}
