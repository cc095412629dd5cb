pub use crate::utils::database;
use crate::modules::payment::{
    gateway,
    repository::{PaymentStore, PgPaymentStore},
};
use async_trait::async_trait;
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
pub enum AppEnvironment {
    Production,
    Development,
}

impl AppEnvironment {
    pub fn from(raw_environment: String) -> Self {
        match raw_environment.as_ref() {
            "production" => Self::Production,
            _ => Self::Development,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppContext {
    pub host: String,
    pub environment: AppEnvironment,
    pub port: u32,
    pub url: String,
}

#[derive(Clone, Debug)]
pub struct PaymentContext {
    pub gateway: gateway::Client,
    pub callback_domain: String,
    pub due_minutes: u32,
    pub verify_notifications: bool,
}

#[derive(Clone)]
pub struct Context {
    pub app: AppContext,
    pub payment: PaymentContext,
    pub payments: Arc<dyn PaymentStore>,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub environment: AppEnvironment,
    pub port: u32,
    pub url: String,
}

#[derive(Clone)]
pub struct PaymentConfig {
    pub base_url: String,
    pub client_id: String,
    pub secret_key: String,
    pub callback_domain: String,
    pub due_minutes: u32,
    pub timeout_secs: u64,
    pub verify_notifications: bool,
}

impl fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("secret_key", &"<redacted>")
            .field("callback_domain", &self.callback_domain)
            .field("due_minutes", &self.due_minutes)
            .field("timeout_secs", &self.timeout_secs)
            .field("verify_notifications", &self.verify_notifications)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database: DatabaseConfig,
    pub app: AppConfig,
    pub payment: PaymentConfig,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("payment gateway error: {0}")]
    Gateway(#[from] gateway::Error),
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

struct Vars<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn optional(&self, name: &'static str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn parsed<T: std::str::FromStr>(
        &self,
        name: &'static str,
        default: T,
    ) -> Result<T, ConfigError> {
        match self.optional(name) {
            Some(value) => value
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::Invalid { name, value }),
            None => Ok(default),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars { lookup };

        let database_url = vars.required("DATABASE_URL")?;
        let host = vars
            .optional("HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string());
        let environment = vars
            .optional("APP_ENV")
            .unwrap_or_else(|| "development".to_string());
        let port = vars.parsed::<u32>("PORT", 8000)?;
        let url = vars
            .optional("URL")
            .unwrap_or_else(|| format!("http://{}:{}", host, port));

        let payment_base_url = vars.required("PAYMENT_GATEWAY_BASE_URL")?;
        let payment_client_id = vars.required("PAYMENT_GATEWAY_CLIENT_ID")?;
        let payment_secret_key = vars.required("PAYMENT_GATEWAY_SECRET_KEY")?;
        let payment_callback_domain = vars.required("PAYMENT_CALLBACK_DOMAIN")?;
        let payment_due_minutes = vars.parsed::<u32>("PAYMENT_DUE_MINUTES", 60)?;
        let payment_timeout_secs = vars.parsed::<u64>("PAYMENT_GATEWAY_TIMEOUT_SECS", 30)?;
        let payment_verify_notifications =
            vars.parsed::<bool>("PAYMENT_NOTIFICATION_VERIFY", true)?;

        if payment_due_minutes == 0 {
            return Err(ConfigError::Invalid {
                name: "PAYMENT_DUE_MINUTES",
                value: payment_due_minutes.to_string(),
            });
        }

        Ok(Self {
            database: DatabaseConfig { url: database_url },
            app: AppConfig {
                host,
                environment: AppEnvironment::from(environment),
                port,
                url,
            },
            payment: PaymentConfig {
                base_url: payment_base_url,
                client_id: payment_client_id,
                secret_key: payment_secret_key,
                callback_domain: payment_callback_domain
                    .trim()
                    .trim_end_matches('/')
                    .to_string(),
                due_minutes: payment_due_minutes,
                timeout_secs: payment_timeout_secs,
                verify_notifications: payment_verify_notifications,
            },
        })
    }
}

impl PaymentConfig {
    pub fn to_context(self) -> Result<PaymentContext, gateway::Error> {
        let gateway = gateway::Client::new(gateway::ClientConfig {
            base_url: self.base_url,
            client_id: self.client_id,
            secret_key: self.secret_key,
            timeout: Duration::from_secs(self.timeout_secs),
        })?;

        Ok(PaymentContext {
            gateway,
            callback_domain: self.callback_domain,
            due_minutes: self.due_minutes,
            verify_notifications: self.verify_notifications,
        })
    }
}

#[async_trait]
pub trait ToContext {
    async fn to_context(self) -> Result<Context, StartupError>;
}

#[async_trait]
impl ToContext for Config {
    async fn to_context(self) -> Result<Context, StartupError> {
        let payment = self.payment.to_context()?;

        let db_conn = database::connect(self.database.url.as_str()).await?;
        database::migrate(&db_conn).await?;

        Ok(Context {
            app: AppContext {
                host: self.app.host,
                environment: self.app.environment,
                port: self.app.port,
                url: self.app.url,
            },
            payment,
            payments: Arc::new(PgPaymentStore::new(db_conn.pool)),
        })
    }
}
