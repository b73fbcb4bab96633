//! Panel flows against a mock backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use expohub_client::{
    ApiClient, ApplicationStatus, Attachment, BoothApplication, DEFAULT_BOOTH_CAPACITY,
    DEFAULT_BUSINESS_TYPE, NewExhibition, NewProperty,
};
use expohub_panels::{AdminPanel, ExhibitorPanel, PanelError, Prompt, ScanPhase, VisitorPanel};
use serde_json::json;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Prompt with a fixed answer that records every alert.
struct RecordingPrompt {
    answer: bool,
    alerts: Mutex<Vec<String>>,
}

impl RecordingPrompt {
    fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            alerts: Mutex::new(Vec::new()),
        })
    }

    fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Prompt for RecordingPrompt {
    fn confirm(&self, _message: &str) -> bool {
        self.answer
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(&format!("{}/api/", server.uri())).unwrap()
}

/// Exhibitions as a paginated list.
fn events_body() -> serde_json::Value {
    json!({
        "count": 2,
        "next": null,
        "previous": null,
        "results": [
            {"id": 3, "name": "Property Expo", "venue_name": "Expo Centre", "city": "Pune"},
            {"id": 5, "name": "Realty Fair", "venue_name": "Beach Hall", "city": "Goa"},
        ]
    })
}

fn new_property(application: i64) -> NewProperty {
    NewProperty {
        exhibitor_application: application,
        title: "Sea View Flat".to_string(),
        location: "Baner".to_string(),
        price_min: "45000".to_string(),
        price_max: "60000".to_string(),
        description: String::new(),
    }
}

#[tokio::test]
async fn test_exhibitor_application_is_refetched_as_pending() {
    expohub_testing::init_test_tracing();
    let server = MockServer::start().await;
    let application = json!({
        "id": 12,
        "exhibition": 3,
        "company_name": "Acme Realty",
        "council_area": "Pune Municipal",
        "business_type": "Developer",
        "contact_details": "acme@example.com",
        "status": "PENDING",
    });

    Mock::given(method("POST"))
        .and(path("/api/exhibitor/applications/"))
        .and(body_string_contains("name=\"exhibition\""))
        .and(body_string_contains("name=\"company_name\""))
        .and(body_string_contains("name=\"council_area\""))
        .and(body_string_contains("name=\"business_type\""))
        .and(body_string_contains("name=\"contact_details\""))
        .and(body_string_contains("name=\"payment_screenshot\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(application.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/exhibitor/applications/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([application])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body()))
        .mount(&server)
        .await;

    let mut panel = ExhibitorPanel::new(client(&server), RecordingPrompt::answering(true));
    let created = panel
        .apply(BoothApplication {
            exhibition: 3,
            company_name: "Acme Realty".to_string(),
            council_area: "Pune Municipal".to_string(),
            business_type: DEFAULT_BUSINESS_TYPE.to_string(),
            contact_details: "acme@example.com".to_string(),
            payment_screenshot: Some(Attachment::new("receipt.jpg", b"receipt".to_vec())),
        })
        .await
        .unwrap();

    assert_eq!(created.id, 12);
    let mine = panel.applications();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].status, ApplicationStatus::Pending);
}

#[tokio::test]
async fn test_exhibitor_open_exhibitions_and_properties() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/exhibitor/applications/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 12, "exhibition": 3, "company_name": "Acme", "status": "APPROVED"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/exhibitor/properties/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 40, "exhibitor_application": 12, "title": "Sea View Flat"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/exhibitor/properties/"))
        .and(query_param("exhibitor_application", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 40, "exhibitor_application": 12, "title": "Sea View Flat",
             "price_min": "45000.00", "price_max": "60000.00"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/exhibitor/properties/40/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let mut panel = ExhibitorPanel::new(client(&server), RecordingPrompt::answering(false));
    panel.load().await;

    let open: Vec<i64> = panel.open_exhibitions().iter().map(|e| e.id).collect();
    assert_eq!(open, vec![5]);

    panel.add_property(new_property(12)).await.unwrap();
    assert_eq!(panel.open_application(), Some(12));
    assert_eq!(panel.properties().len(), 1);
    assert_eq!(panel.properties()[0].price_range(), "45000.00 - 60000.00");

    // Declined confirmation sends nothing
    assert!(!panel.delete_property(40).await.unwrap());
}

#[tokio::test]
async fn test_properties_need_an_approved_application() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/exhibitor/applications/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 12, "exhibition": 3, "company_name": "Acme", "status": "APPROVED"},
            {"id": 13, "exhibition": 5, "company_name": "Acme", "status": "PENDING"},
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body()))
        .mount(&server)
        .await;
    Mock::given(path("/api/exhibitor/properties/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let prompt = RecordingPrompt::answering(true);
    let mut panel = ExhibitorPanel::new(client(&server), prompt.clone());
    panel.load().await;

    let approved: Vec<i64> = panel.approved_applications().iter().map(|a| a.id).collect();
    assert_eq!(approved, vec![12]);

    let err = panel.open_properties(13).await.unwrap_err();
    assert_eq!(err, PanelError::NotApproved(13));
    assert_eq!(panel.open_application(), None);

    let err = panel.add_property(new_property(13)).await.unwrap_err();
    assert_eq!(err, PanelError::NotApproved(13));

    // Unknown ids are refused the same way
    assert!(panel.open_properties(99).await.is_err());
    assert_eq!(
        prompt.alerts(),
        vec![
            "Application #13 is not approved".to_string(),
            "Application #13 is not approved".to_string(),
            "Application #99 is not approved".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_admin_approval_removes_actions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/exhibitor/applications/"))
        .and(query_param("exhibition", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 12, "exhibition": 3, "company_name": "Acme", "status": "PENDING"}
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/exhibitor/applications/"))
        .and(query_param("exhibition", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 12, "exhibition": 3, "company_name": "Acme", "status": "APPROVED"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/exhibitor/applications/12/approve/"))
        .and(body_json(json!({"booth_number": "B-14"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "approved"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut panel = AdminPanel::new(client(&server), RecordingPrompt::answering(true));
    panel.select_event(3).await;
    assert_eq!(panel.applications()[0].available_actions().len(), 2);

    panel.approve(12, Some("B-14".to_string())).await.unwrap();

    let application = &panel.applications()[0];
    assert_eq!(application.status, ApplicationStatus::Approved);
    assert!(application.available_actions().is_empty());
}

#[tokio::test]
async fn test_admin_event_lifecycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/events/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "end_date": ["End date must be after start date."]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/events/3/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 5, "name": "Realty Fair"}
        ])))
        .mount(&server)
        .await;

    let prompt = RecordingPrompt::answering(true);
    let mut panel = AdminPanel::new(client(&server), prompt.clone());

    let at = |day| {
        chrono::NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    };
    let err = panel
        .create_event(NewExhibition {
            name: "Broken".to_string(),
            description: String::new(),
            venue_name: "Nowhere Hall".to_string(),
            address: String::new(),
            city: "Nowhere".to_string(),
            state: String::new(),
            country: "India".to_string(),
            start_date: at(2),
            end_date: at(1),
            booth_capacity: DEFAULT_BOOTH_CAPACITY,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PanelError::Api(_)));
    assert_eq!(
        prompt.alerts(),
        vec!["Failed to create exhibition: end_date: End date must be after start date.".to_string()]
    );

    assert!(panel.delete_event(3).await.unwrap());
    assert_eq!(panel.events().len(), 1);
}

#[tokio::test]
async fn test_load_failure_keeps_previous_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let prompt = RecordingPrompt::answering(true);
    let mut panel = AdminPanel::new(client(&server), prompt.clone());
    panel.load().await;
    panel.load().await;

    assert_eq!(panel.events().len(), 2);
    assert!(prompt.alerts().is_empty());
}

#[tokio::test]
async fn test_visitor_registration_and_ticket() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/visitor/registrations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/visitor/registrations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 30, "exhibition": 5, "qr_token": "tok-30",
             "exhibition_details": {"id": 5, "name": "Realty Fair"}}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/visitor/registrations/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 30, "exhibition": 5, "qr_token": "tok-30"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut panel = VisitorPanel::new(client(&server), RecordingPrompt::answering(true));
    panel.load().await;
    assert_eq!(panel.open_exhibitions().len(), 2);
    assert_eq!(panel.ticket(5), None);

    panel.register(5).await.unwrap();
    assert_eq!(panel.ticket(5), Some("tok-30"));
    assert_eq!(panel.registrations()[0].ticket_title(), "Realty Fair");
    let open: Vec<i64> = panel.open_exhibitions().iter().map(|e| e.id).collect();
    assert_eq!(open, vec![3]);
}

#[tokio::test]
async fn test_admin_scans_tickets() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/visitor/registrations/verify-qr/"))
        .and(body_string_contains("tok-30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Entry granted",
            "registration": {"id": 30, "exhibition": 5, "qr_token": "tok-30", "is_verified": true}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/visitor/registrations/verify-qr/"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "Invalid QR code"})),
        )
        .mount(&server)
        .await;

    let panel = AdminPanel::new(client(&server), RecordingPrompt::answering(true));

    let state = panel.scan("tok-30").await.unwrap();
    assert_eq!(state.phase, ScanPhase::ResultShown);
    let result = state.last_result.unwrap();
    assert!(result.is_verified());
    assert_eq!(result.message(), "Entry granted");

    // Held on the result until the operator resumes
    panel.scan("tok-30").await.unwrap();
    panel.resume_scanning().await.unwrap();

    let state = panel.scan("forged").await.unwrap();
    assert_eq!(state.last_result.unwrap().message(), "Invalid QR code");
    assert_eq!(state.verified_count, 1);
    assert_eq!(state.rejected_count, 1);
}
