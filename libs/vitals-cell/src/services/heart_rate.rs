use anyhow::Result;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::firebase::FirebaseClient;

use crate::models::{HeartRateReading, VitalsCard};

/// Realtime database node holding a patient's latest heart rate.
pub const DEFAULT_NODE_TEMPLATE: &str = "vitals/{patient_id}/heartRate";

pub struct HeartRateService {
    firebase: FirebaseClient,
    node_template: String,
}

impl HeartRateService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            firebase: FirebaseClient::new(config),
            node_template: DEFAULT_NODE_TEMPLATE.to_string(),
        }
    }

    /// Read from a different node layout; `{patient_id}` is substituted.
    pub fn with_node_template(mut self, template: impl Into<String>) -> Self {
        self.node_template = template.into();
        self
    }

    pub fn node_path(&self, patient_id: &str) -> String {
        self.node_template.replace("{patient_id}", patient_id)
    }

    pub async fn latest_reading(&self, patient_id: &str) -> Result<Option<HeartRateReading>> {
        debug!("Fetching heart rate for patient: {}", patient_id);
        self.firebase.get_value(&self.node_path(patient_id)).await
    }

    /// Card for the patient's latest reading, `None` when nothing was recorded.
    pub async fn card_for_patient(&self, patient_id: &str) -> Result<Option<VitalsCard>> {
        let reading = self.latest_reading(patient_id).await?;
        Ok(VitalsCard::from_reading(reading))
    }
}
