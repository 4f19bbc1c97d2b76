use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::rest::RestClient;
use shared_models::error::AppError;

use crate::models::{
    decode_schedule_list, ApiEnvelope, EmployeeId, FetchedSchedule, NewScheduleRecord,
    ScheduleDate, ScheduleId, UpdateScheduleRequest,
};

/// Remote store of doctor work schedules.
#[async_trait]
pub trait ScheduleApi: Send + Sync {
    /// All schedules of `employee_id`. No schedule yet is `AppError::NotFound`.
    async fn get_schedules(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<FetchedSchedule>, AppError>;

    async fn create_schedules(
        &self,
        employee_id: &EmployeeId,
        records: &[NewScheduleRecord],
    ) -> Result<(), AppError>;

    /// Replace the full time list stored for `date`.
    async fn update_schedule(
        &self,
        employee_id: &EmployeeId,
        date: &ScheduleDate,
        time: &[String],
    ) -> Result<(), AppError>;

    async fn delete_schedule(
        &self,
        schedule_id: &ScheduleId,
        employee_id: &EmployeeId,
    ) -> Result<(), AppError>;
}

pub struct ScheduleService {
    client: RestClient,
}

impl ScheduleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: RestClient::new(config),
        }
    }

    fn check_reply(reply: Option<Value>) -> Result<(), AppError> {
        match reply {
            Some(body @ Value::Object(_)) => {
                let envelope: ApiEnvelope = serde_json::from_value(body)?;
                envelope.check()
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ScheduleApi for ScheduleService {
    async fn get_schedules(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<FetchedSchedule>, AppError> {
        debug!("Fetching schedules for doctor: {}", employee_id);

        let path = format!("/api/schedules/{}", employee_id);
        let body: Value = self.client.request(Method::GET, &path, None).await?;

        let schedules = decode_schedule_list(body)?;
        debug!("Fetched {} schedule records", schedules.len());

        Ok(schedules)
    }

    async fn create_schedules(
        &self,
        employee_id: &EmployeeId,
        records: &[NewScheduleRecord],
    ) -> Result<(), AppError> {
        debug!("Creating {} schedule records for doctor: {}", records.len(), employee_id);

        let path = format!("/api/schedules/{}", employee_id);
        let body = serde_json::to_value(records)?;
        let reply: Option<Value> = self
            .client
            .request_optional(Method::POST, &path, Some(body))
            .await?;

        Self::check_reply(reply)?;
        info!("Created schedules for doctor {}", employee_id);
        Ok(())
    }

    async fn update_schedule(
        &self,
        employee_id: &EmployeeId,
        date: &ScheduleDate,
        time: &[String],
    ) -> Result<(), AppError> {
        debug!("Updating schedule {} for doctor: {}", date, employee_id);

        let path = format!("/api/schedules/{}/{}", employee_id, date);
        let request = UpdateScheduleRequest {
            time: time.to_vec(),
        };
        let body = serde_json::to_value(&request)?;
        let reply: Option<Value> = self
            .client
            .request_optional(Method::PUT, &path, Some(body))
            .await?;

        Self::check_reply(reply)?;
        info!("Updated schedule {} for doctor {}", date, employee_id);
        Ok(())
    }

    async fn delete_schedule(
        &self,
        schedule_id: &ScheduleId,
        employee_id: &EmployeeId,
    ) -> Result<(), AppError> {
        debug!("Deleting schedule {} for doctor: {}", schedule_id, employee_id);

        let path = format!("/api/schedules/{}?employeeId={}", schedule_id, employee_id);
        let reply: Option<Value> = self
            .client
            .request_optional(Method::DELETE, &path, None)
            .await?;

        Self::check_reply(reply)?;
        info!("Deleted schedule {} for doctor {}", schedule_id, employee_id);
        Ok(())
    }
}
