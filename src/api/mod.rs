use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use prometheus::{Encoder, Registry, TextEncoder};
use serde::Deserialize;
use serde_json::Value;

use crate::messaging::EventPublisher;
use crate::metrics::Metrics;
use crate::models::UserEvent;
use crate::store::EventStore;

// ============================================================================
// HTTP API
// ============================================================================
//
// POST /events/generate  - validate, build the event, publish, acknowledge.
//                          The 201 means publish-confirmed, not
//                          processing-confirmed; the consumer loop applies
//                          the event asynchronously.
// GET  /events/processed - current store contents in append order.
// GET  /health           - liveness probe.
// GET  /metrics          - Prometheus text exposition.
//
// ============================================================================

// Fields arrive as Options so the 400 body keeps the documented shape instead
// of the extractor's default rejection.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateEventRequest {
    pub user_id: Option<String>,
    pub event_type: Option<String>,
    pub payload: Option<Value>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/events/generate", web::post().to(generate_event))
        .route("/events/processed", web::get().to(processed_events))
        .route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics_exposition));
}

async fn generate_event(
    body: web::Json<GenerateEventRequest>,
    publisher: web::Data<Arc<EventPublisher>>,
    metrics: web::Data<Arc<Metrics>>,
) -> impl Responder {
    let (user_id, event_type) = match (&body.user_id, &body.event_type) {
        (Some(user_id), Some(event_type)) if !user_id.is_empty() && !event_type.is_empty() => {
            (user_id, event_type)
        }
        _ => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Bad Request",
                "message": "userId and eventType are required fields.",
            }));
        }
    };

    let event = UserEvent::generate(user_id, event_type, body.payload.clone());

    match publisher.publish(&event).await {
        Ok(()) => {
            metrics
                .events_published
                .with_label_values(&[event_type.as_str()])
                .inc();
            HttpResponse::Created().json(serde_json::json!({
                "status": "Created",
                "eventId": event.event_id,
            }))
        }
        Err(e) => {
            metrics.publish_failures.inc();
            tracing::error!(error = %e, event_id = %event.event_id, "Publish failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal Server Error",
            }))
        }
    }
}

async fn processed_events(store: web::Data<Arc<EventStore>>) -> impl Responder {
    HttpResponse::Ok().json(store.list().await)
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "user-activity-pipeline",
    }))
}

async fn metrics_exposition(registry: web::Data<Arc<Registry>>) -> impl Responder {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_generate_rejects_missing_event_type() {
        let store = Arc::new(EventStore::new());
        let metrics = Arc::new(Metrics::new().unwrap());
        // The producer object is created lazily; no broker is contacted until
        // a publish, and validation rejects before that point.
        let publisher = Arc::new(EventPublisher::new("127.0.0.1:9092").unwrap());

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store.clone()))
                .app_data(web::Data::new(publisher))
                .app_data(web::Data::new(metrics))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/events/generate")
            .set_json(serde_json::json!({"userId": "u1"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Bad Request");

        // Nothing was constructed or stored for the rejected call
        assert_eq!(store.len().await, 0);
    }

    #[actix_web::test]
    async fn test_generate_rejects_empty_user_id() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let publisher = Arc::new(EventPublisher::new("127.0.0.1:9092").unwrap());

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Arc::new(EventStore::new())))
                .app_data(web::Data::new(publisher))
                .app_data(web::Data::new(metrics))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/events/generate")
            .set_json(serde_json::json!({"userId": "", "eventType": "LOGIN"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_processed_returns_store_in_append_order() {
        let store = Arc::new(EventStore::new());
        let first = UserEvent::generate("u1", "LOGIN", None);
        let second = UserEvent::generate("u2", "LOGOUT", None);
        store.append(first.clone()).await;
        store.append(second.clone()).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store))
                .route("/events/processed", web::get().to(processed_events)),
        )
        .await;

        let req = test::TestRequest::get().uri("/events/processed").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let events = body.as_array().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["eventId"], first.event_id.as_str());
        assert_eq!(events[1]["eventId"], second.event_id.as_str());
    }

    #[actix_web::test]
    async fn test_health_reports_ok() {
        let app = test::init_service(
            App::new().route("/health", web::get().to(health)),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
    }

    // The 201 publish-confirmed path needs a reachable broker; it is covered
    // by integration tooling against a running Kafka, not here.
}
