pub use crate::utils::database;
use async_trait::async_trait;
use std::env;

#[derive(Clone)]
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

#[derive(Clone)]
pub struct AppContext {
    pub host: String,
    pub environment: AppEnvironment,
    pub port: u32,
    pub url: String,
    pub snack_name: String,
}

#[derive(Clone)]
pub struct AdminContext {
    pub username: String,
    pub password: String,
}

/// Business-hours window and capacity for the pickup-slot grid.
#[derive(Clone)]
pub struct ScheduleContext {
    pub open_hour: u32,
    pub close_hour: u32,
    pub slot_interval_minutes: u32,
    pub max_orders_per_slot: i64,
}

#[derive(Clone)]
pub struct SmsContext {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

#[derive(Clone)]
pub struct PosContext {
    pub forward_url: String,
}

#[derive(Clone)]
pub struct Context {
    pub app: AppContext,
    pub db_conn: database::DatabaseConnection,
    pub admin: AdminContext,
    pub schedule: ScheduleContext,
    pub sms: Option<SmsContext>,
    pub pos: Option<PosContext>,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub environment: AppEnvironment,
    pub port: u32,
    pub url: String,
    pub snack_name: String,
}

#[derive(Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

#[derive(Clone)]
pub struct ScheduleConfig {
    pub open_hour: u32,
    pub close_hour: u32,
    pub slot_interval_minutes: u32,
    pub max_orders_per_slot: i64,
}

#[derive(Clone)]
pub struct SmsConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

#[derive(Clone)]
pub struct PosConfig {
    pub forward_url: String,
}

#[derive(Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub app: AppConfig,
    pub admin: AdminConfig,
    pub schedule: ScheduleConfig,
    pub sms: Option<SmsConfig>,
    pub pos: Option<PosConfig>,
}

fn env_var_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u32>()
        .unwrap_or_else(|_| panic!("Invalid {} number", name))
}

impl Default for Config {
    fn default() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://snack.db".to_string());
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u32>()
            .expect("Invalid PORT number");
        let url = env::var("URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));
        let snack_name = env::var("SNACK_NAME").unwrap_or_else(|_| "Le Snack".to_string());
        let admin_username = env::var("ADMIN_USER").expect("ADMIN_USER not set");
        let admin_password = env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD not set");
        let open_hour = env_var_u32("OPEN_HOUR", 11);
        let close_hour = env_var_u32("CLOSE_HOUR", 22);
        let slot_interval_minutes = env_var_u32("SLOT_INTERVAL_MINUTES", 5);
        let max_orders_per_slot = env_var_u32("MAX_ORDERS_PER_SLOT", 2) as i64;

        let sms = match (
            env::var("TWILIO_ACCOUNT_SID"),
            env::var("TWILIO_AUTH_TOKEN"),
            env::var("TWILIO_FROM_NUMBER"),
        ) {
            (Ok(account_sid), Ok(auth_token), Ok(from_number)) => Some(SmsConfig {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => None,
        };

        let pos = env::var("POS_FORWARD_URL")
            .ok()
            .map(|forward_url| PosConfig { forward_url });

        Self {
            database: DatabaseConfig { url: database_url },
            app: AppConfig {
                host,
                environment: AppEnvironment::from(environment),
                port,
                url,
                snack_name,
            },
            admin: AdminConfig {
                username: admin_username,
                password: admin_password,
            },
            schedule: ScheduleConfig {
                open_hour,
                close_hour,
                slot_interval_minutes,
                max_orders_per_slot,
            },
            sms,
            pos,
        }
    }
}

#[async_trait]
pub trait ToContext {
    async fn to_context(self) -> Context;
}

#[async_trait]
impl ToContext for Config {
    async fn to_context(self) -> Context {
        let db_conn = database::connect(self.database.url.as_str()).await;
        database::migrate(db_conn.clone()).await;

        Context {
            app: AppContext {
                host: self.app.host,
                environment: self.app.environment,
                port: self.app.port,
                url: self.app.url,
                snack_name: self.app.snack_name,
            },
            db_conn,
            admin: AdminContext {
                username: self.admin.username,
                password: self.admin.password,
            },
            schedule: ScheduleContext {
                open_hour: self.schedule.open_hour,
                close_hour: self.schedule.close_hour,
                slot_interval_minutes: self.schedule.slot_interval_minutes,
                max_orders_per_slot: self.schedule.max_orders_per_slot,
            },
            sms: self.sms.map(|sms| SmsContext {
                account_sid: sms.account_sid,
                auth_token: sms.auth_token,
                from_number: sms.from_number,
            }),
            pos: self.pos.map(|pos| PosContext {
                forward_url: pos.forward_url,
            }),
        }
    }
}
