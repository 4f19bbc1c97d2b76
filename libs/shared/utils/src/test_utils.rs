use std::sync::Once;

use chrono::NaiveDate;
use chrono_tz::Tz;
use uuid::Uuid;

use shared_config::{AppConfig, DEFAULT_CLINIC_TIMEZONE};
use shared_models::auth::{AuthState, User};

use crate::time::FixedClock;

static TRACING: Once = Once::new();

/// Install a fmt subscriber once per test binary. Honors `RUST_LOG`.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

pub struct TestConfig {
    pub schedule_api_url: String,
    pub firebase_database_url: String,
    pub api_key: String,
    pub clinic_timezone: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            schedule_api_url: "http://localhost:54321".to_string(),
            firebase_database_url: "http://localhost:9000".to_string(),
            api_key: "test-api-key".to_string(),
            clinic_timezone: DEFAULT_CLINIC_TIMEZONE.to_string(),
        }
    }
}

impl TestConfig {
    /// Point both remote collaborators at a mock server.
    pub fn with_server(uri: &str) -> Self {
        Self {
            schedule_api_url: uri.to_string(),
            firebase_database_url: uri.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            schedule_api_url: self.schedule_api_url.clone(),
            schedule_api_key: self.api_key.clone(),
            firebase_database_url: self.firebase_database_url.clone(),
            firebase_api_key: String::new(),
            clinic_timezone: self.clinic_timezone.clone(),
        }
    }

    pub fn tz(&self) -> Tz {
        self.clinic_timezone.parse().unwrap_or(chrono_tz::Asia::Ho_Chi_Minh)
    }

    /// Clock pinned to `date` in the configured clinic zone.
    pub fn clock_on(&self, date: NaiveDate) -> FixedClock {
        FixedClock::at_midday(self.tz(), date)
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "patient".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: None,
        }
    }

    pub fn to_auth_state(&self) -> AuthState {
        AuthState::signed_in(self.to_user())
    }
}
