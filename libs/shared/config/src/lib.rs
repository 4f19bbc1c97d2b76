use std::env;

use chrono_tz::Tz;
use tracing::warn;

pub const DEFAULT_CLINIC_TIMEZONE: &str = "Asia/Ho_Chi_Minh";
pub const DEFAULT_FIREBASE_DATABASE_URL: &str =
    "https://bhep-iot-default-rtdb.asia-southeast1.firebasedatabase.app";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub schedule_api_url: String,
    pub schedule_api_key: String,
    pub firebase_database_url: String,
    pub firebase_api_key: String,
    pub clinic_timezone: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        // A missing .env file is fine, real environment variables still apply
        dotenv::dotenv().ok();

        let config = Self {
            schedule_api_url: env::var("SCHEDULE_API_URL")
                .unwrap_or_else(|_| {
                    warn!("SCHEDULE_API_URL not set, using empty value");
                    String::new()
                }),
            schedule_api_key: env::var("SCHEDULE_API_KEY")
                .unwrap_or_default(),
            firebase_database_url: env::var("FIREBASE_DATABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("FIREBASE_DATABASE_URL not set, using default");
                    DEFAULT_FIREBASE_DATABASE_URL.to_string()
                }),
            firebase_api_key: env::var("FIREBASE_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("FIREBASE_API_KEY not set, database reads will be unauthenticated");
                    String::new()
                }),
            clinic_timezone: env::var("CLINIC_TIMEZONE")
                .unwrap_or_else(|_| DEFAULT_CLINIC_TIMEZONE.to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.schedule_api_url.is_empty()
    }

    pub fn is_vitals_configured(&self) -> bool {
        !self.firebase_database_url.is_empty()
    }

    /// Timezone every calendar-day comparison is fixed to.
    pub fn clinic_tz(&self) -> Result<Tz, String> {
        self.clinic_timezone
            .parse::<Tz>()
            .map_err(|_| format!("Unknown clinic timezone: {}", self.clinic_timezone))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schedule_api_url: String::new(),
            schedule_api_key: String::new(),
            firebase_database_url: DEFAULT_FIREBASE_DATABASE_URL.to_string(),
            firebase_api_key: String::new(),
            clinic_timezone: DEFAULT_CLINIC_TIMEZONE.to_string(),
        }
    }
}
