// libs/doctor-cell/tests/schedule_service_test.rs

use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::models::{EmployeeId, NewScheduleRecord, ScheduleDate, ScheduleId, TimeRange};
use doctor_cell::services::{ScheduleApi, ScheduleService};
use shared_models::error::AppError;
use shared_utils::test_utils::{init_test_tracing, TestConfig};

fn service_for(server: &MockServer) -> ScheduleService {
    init_test_tracing();
    ScheduleService::new(&TestConfig::with_server(&server.uri()).to_app_config())
}

fn doctor() -> EmployeeId {
    EmployeeId::new(Uuid::new_v4().to_string())
}

#[tokio::test]
async fn test_get_schedules_bare_list() {
    let server = MockServer::start().await;
    let employee = doctor();

    Mock::given(method("GET"))
        .and(path(format!("/api/schedules/{}", employee)))
        .and(header("apikey", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s-1", "date": "12-05-2030", "time": ["08:00-11:00", "13:00-17:00"] },
            { "id": 2, "date": "13-05-2030", "time": ["08:00-11:00"] }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let schedules = service_for(&server).get_schedules(&employee).await.unwrap();

    assert_eq!(schedules.len(), 2);
    assert_eq!(schedules[0].id, Some(ScheduleId::new("s-1")));
    assert_eq!(schedules[1].id, Some(ScheduleId::new("2")));
    assert_eq!(schedules[0].time, vec!["08:00-11:00", "13:00-17:00"]);
}

#[tokio::test]
async fn test_get_schedules_enveloped_list() {
    let server = MockServer::start().await;
    let employee = doctor();

    Mock::given(method("GET"))
        .and(path(format!("/api/schedules/{}", employee)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "isSuccess": true,
            "statusCode": 200,
            "data": [{ "id": "s-1", "date": "12-05-2030", "time": ["08:00-11:00"] }]
        })))
        .mount(&server)
        .await;

    let schedules = service_for(&server).get_schedules(&employee).await.unwrap();
    assert_eq!(schedules.len(), 1);
}

#[tokio::test]
async fn test_get_schedules_not_found_variants() {
    let server = MockServer::start().await;
    let by_status = doctor();
    let by_envelope = doctor();

    Mock::given(method("GET"))
        .and(path(format!("/api/schedules/{}", by_status)))
        .respond_with(ResponseTemplate::new(404).set_body_string("no schedule"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/api/schedules/{}", by_envelope)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "isSuccess": false,
            "statusCode": 404,
            "message": "Schedule not found"
        })))
        .mount(&server)
        .await;

    let service = service_for(&server);
    assert_matches!(service.get_schedules(&by_status).await, Err(e) if e.is_not_found());
    assert_matches!(
        service.get_schedules(&by_envelope).await,
        Err(AppError::NotFound(msg)) if msg == "Schedule not found"
    );
}

#[tokio::test]
async fn test_create_schedules_posts_records() {
    let server = MockServer::start().await;
    let employee = doctor();
    let date = ScheduleDate::from_ymd(2030, 5, 12).unwrap();

    Mock::given(method("POST"))
        .and(path(format!("/api/schedules/{}", employee)))
        .and(body_json(json!([{ "date": "12-05-2030", "time": ["08:00-11:00"] }])))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "isSuccess": true, "statusCode": 201 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let records = vec![NewScheduleRecord::new(&date, &[TimeRange::new("08:00", "11:00")])];
    service_for(&server).create_schedules(&employee, &records).await.unwrap();
}

#[tokio::test]
async fn test_update_schedule_puts_full_list() {
    let server = MockServer::start().await;
    let employee = doctor();
    let date = ScheduleDate::from_ymd(2030, 5, 12).unwrap();

    Mock::given(method("PUT"))
        .and(path(format!("/api/schedules/{}/12-05-2030", employee)))
        .and(body_json(json!({ "time": ["08:00-11:00", "13:00-17:00"] })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let time = vec!["08:00-11:00".to_string(), "13:00-17:00".to_string()];
    service_for(&server).update_schedule(&employee, &date, &time).await.unwrap();
}

#[tokio::test]
async fn test_delete_schedule_by_id() {
    let server = MockServer::start().await;
    let employee = doctor();

    Mock::given(method("DELETE"))
        .and(path("/api/schedules/s-1"))
        .and(query_param("employeeId", employee.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "isSuccess": true })))
        .expect(1)
        .mount(&server)
        .await;

    service_for(&server)
        .delete_schedule(&ScheduleId::new("s-1"), &employee)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unsuccessful_envelope_is_an_error() {
    let server = MockServer::start().await;
    let employee = doctor();

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "isSuccess": false,
            "statusCode": 500,
            "message": "database unavailable"
        })))
        .mount(&server)
        .await;

    let result = service_for(&server)
        .delete_schedule(&ScheduleId::new("s-1"), &employee)
        .await;
    assert_matches!(
        result,
        Err(AppError::ExternalService(msg)) if msg.contains("database unavailable")
    );
}
