pub mod heart_rate;

pub use heart_rate::HeartRateService;
