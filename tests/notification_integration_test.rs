mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::*;
use component_triage::{
    ingest::IncidentTable,
    notifications::{AlertOutcome, NotificationService, ALERT_SUBJECT},
    processing::TriageRequest,
};
use std::sync::Arc;
use tower::ServiceExt;

fn live_table() -> IncidentTable {
    IncidentTable::from_reader(live_table_csv().as_bytes()).unwrap()
}

#[tokio::test]
async fn test_alert_routed_to_category_recipients() {
    let transport = Arc::new(RecordingTransport::default());
    let processor = processor().with_notifications(service_with(transport.clone()));

    let request = TriageRequest::new(None, Some("BSIV".to_string()));
    let outcome = processor.process(live_table(), &request).unwrap();
    let handle = processor
        .dispatch_alerts(outcome.alerts, request.emission_category.clone())
        .unwrap();
    handle.await.unwrap();

    let messages = transport.messages();
    assert_eq!(messages.len(), 1);

    let message = &messages[0];
    assert_eq!(
        message.recipients,
        vec!["bsiv-owner@example.com", "quality@example.com"]
    );
    assert!(message.subject.contains(ALERT_SUBJECT));
    assert!(message.html_body.contains("INC-1"));
    assert!(message.html_body.contains("North Motors"));
    assert!(!message.html_body.contains("INC-2"));
    assert!(message.text_body.contains("Emissions Category: BSIV"));
}

#[tokio::test]
async fn test_unmapped_category_falls_back_to_sender() {
    let transport = Arc::new(RecordingTransport::default());
    let service = service_with(transport.clone());

    let outcome = processor()
        .process(live_table(), &TriageRequest::default())
        .unwrap();
    let result = service
        .send_alert(&outcome.alerts, Some("CPCBII"))
        .await
        .unwrap();

    assert_eq!(
        result,
        AlertOutcome::Sent {
            recipients: vec![
                "alerts@example.com".to_string(),
                "quality@example.com".to_string()
            ]
        }
    );
}

#[tokio::test]
async fn test_nothing_sent_without_eligible_incidents() {
    let transport = Arc::new(RecordingTransport::default());
    let processor = processor().with_notifications(service_with(transport.clone()));

    let csv = format!(
        "Incident Id,Observation,Creation Date,Incident Status\n\
         INC-9,radiator leak,{},Closed\n\
         INC-10,radiator leak,{},Open\n",
        days_ago(12),
        days_ago(1),
    );
    let table = IncidentTable::from_reader(csv.as_bytes()).unwrap();
    let outcome = processor.process(table, &TriageRequest::default()).unwrap();

    assert!(outcome.alerts.is_empty());
    assert!(processor.dispatch_alerts(outcome.alerts, None).is_none());
    assert!(transport.messages().is_empty());
}

#[tokio::test]
async fn test_failed_delivery_does_not_propagate() {
    let processor = processor().with_notifications(service_with(Arc::new(FailingTransport)));

    let outcome = processor
        .process(live_table(), &TriageRequest::default())
        .unwrap();
    assert_eq!(outcome.alerts.len(), 1);

    let handle = processor.dispatch_alerts(outcome.alerts, None).unwrap();
    assert!(handle.await.is_ok());
}

#[tokio::test]
async fn test_report_returned_when_delivery_fails() {
    let processor = processor().with_notifications(service_with(Arc::new(FailingTransport)));
    let app = router_with(processor);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/reports?emission_category=BSV")
        .body(Body::from(live_table_csv()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_disabled_email_builds_no_transport() {
    let service = NotificationService::new(notification_config()).unwrap();
    assert!(!service.is_enabled());
}
