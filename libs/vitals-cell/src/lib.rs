// Vitals cell: the heart-rate card shown to patients
pub mod models;
pub mod services;

pub use models::{FontSize, HeartRateReading, VitalsCard};

pub mod api {
    pub use crate::services::heart_rate::HeartRateService;
}
