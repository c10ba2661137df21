// ============================================================================
// HTTP API
// ============================================================================
//
// Binds the customer service to REST routes. Deserialization and status-code
// mapping live here; the service only sees typed requests.
//
//   GET    /health
//   GET    /metrics
//   POST   /api/v1/customers
//   GET    /api/v1/customers
//   GET    /api/v1/customers/search
//   GET    /api/v1/customers/{id}
//   PUT    /api/v1/customers/{id}
//   DELETE /api/v1/customers/{id}
//
// The application must register `web::Data<S>` and `web::Data<Metrics>`.
//
// ============================================================================

mod error;
mod handlers;

use actix_web::web;

use crate::domain::customer::CustomerService;
use crate::metrics::metrics_handler;

pub fn configure<S: CustomerService + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .route("/health", web::get().to(handlers::health))
        .route("/metrics", web::get().to(metrics_handler))
        .service(
            web::scope("/api/v1/customers")
                .route("", web::post().to(handlers::create_customer::<S>))
                .route("", web::get().to(handlers::list_customers::<S>))
                .route("/search", web::get().to(handlers::search_customers::<S>))
                .route("/{id}", web::get().to(handlers::get_customer::<S>))
                .route("/{id}", web::put().to(handlers::update_customer::<S>))
                .route("/{id}", web::delete().to(handlers::delete_customer::<S>)),
        );
}

#[cfg(test)]
mod tests {
    use super::error::ErrorResponse;
    use super::*;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::json;

    use crate::domain::customer::{CustomerListResponse, CustomerResponse, CustomerServiceImpl};
    use crate::metrics::Metrics;
    use crate::persistence::memory::InMemoryCustomerRepository;

    type TestService = CustomerServiceImpl<InMemoryCustomerRepository>;

    macro_rules! test_app {
        () => {{
            let service = TestService::new(Arc::new(InMemoryCustomerRepository::new()));
            test::init_service(
                App::new()
                    .app_data(web::Data::new(service))
                    .app_data(web::Data::new(Metrics::new().unwrap()))
                    .configure(configure::<TestService>),
            )
            .await
        }};
    }

    fn customer_json(first_name: &str, email: &str) -> serde_json::Value {
        json!({
            "first_name": first_name,
            "last_name": "Doe",
            "email": email,
            "phone": "5551234567",
            "date_of_birth": "1990-05-17",
            "address": { "street": "1 Main St", "country": "NG" }
        })
    }

    #[actix_web::test]
    async fn test_health() {
        let app = test_app!();
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "customer-service");
    }

    #[actix_web::test]
    async fn test_create_then_get() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/api/v1/customers")
            .set_json(customer_json("John", "john@x.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: CustomerResponse = test::read_body_json(resp).await;
        assert_eq!(created.address.street.as_deref(), Some("1 Main St"));
        assert_eq!(created.address.city, None);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/customers/{}", created.id))
            .to_request();
        let fetched: CustomerResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched, created);
    }

    #[actix_web::test]
    async fn test_validation_error_is_bad_request() {
        let app = test_app!();
        let req = test::TestRequest::post()
            .uri("/api/v1/customers")
            .set_json(customer_json("John", "not-an-email"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "Validation failed");
        assert!(body.message.contains("not-an-email"));
    }

    #[actix_web::test]
    async fn test_missing_fields_are_validation_errors() {
        let app = test_app!();
        let req = test::TestRequest::post()
            .uri("/api/v1/customers")
            .set_json(json!({ "last_name": "Doe" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, "first_name is required");
    }

    #[actix_web::test]
    async fn test_malformed_json_is_bad_request() {
        let app = test_app!();
        let req = test::TestRequest::post()
            .uri("/api/v1/customers")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "Invalid request body");
    }

    #[actix_web::test]
    async fn test_duplicate_email_is_conflict() {
        let app = test_app!();
        for (name, expected) in [("John", StatusCode::CREATED), ("Jane", StatusCode::CONFLICT)] {
            let req = test::TestRequest::post()
                .uri("/api/v1/customers")
                .set_json(customer_json(name, "dup@x.com"))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), expected);
        }
    }

    #[actix_web::test]
    async fn test_invalid_id_is_bad_request() {
        let app = test_app!();
        let req = test::TestRequest::get()
            .uri("/api/v1/customers/not-a-uuid")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "Invalid customer ID");
    }

    #[actix_web::test]
    async fn test_unknown_id_is_not_found() {
        let app = test_app!();
        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/customers/{}", uuid::Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_update_and_delete() {
        let app = test_app!();
        let req = test::TestRequest::post()
            .uri("/api/v1/customers")
            .set_json(customer_json("John", "john@x.com"))
            .to_request();
        let created: CustomerResponse = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/api/v1/customers/{}", created.id);

        let req = test::TestRequest::put()
            .uri(&uri)
            .set_json(customer_json("Johnny", "johnny@x.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let updated: CustomerResponse = test::read_body_json(resp).await;
        assert_eq!(updated.first_name, "Johnny");

        let req = test::TestRequest::delete().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_list_and_search() {
        let app = test_app!();
        for (name, email) in [("John", "john@x.com"), ("Jane", "jane@x.com")] {
            let req = test::TestRequest::post()
                .uri("/api/v1/customers")
                .set_json(customer_json(name, email))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get()
            .uri("/api/v1/customers?page=1&page_size=150")
            .to_request();
        let list: CustomerListResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(list.total, 2);
        assert_eq!(list.page_size, 100);
        assert_eq!(list.total_pages, 1);

        let req = test::TestRequest::get()
            .uri("/api/v1/customers/search?query=jo&status=active")
            .to_request();
        let found: CustomerListResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].email, "john@x.com");
    }

    #[actix_web::test]
    async fn test_list_response_uses_items_key() {
        let app = test_app!();
        let req = test::TestRequest::get().uri("/api/v1/customers").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["items"].is_array());
        assert_eq!(body["page"], 1);
        assert_eq!(body["page_size"], 10);
        assert_eq!(body["total_pages"], 0);
    }

    #[actix_web::test]
    async fn test_bad_query_params_are_bad_request() {
        let app = test_app!();
        let req = test::TestRequest::get()
            .uri("/api/v1/customers?page=abc")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_unknown_status_filter_is_bad_request() {
        let app = test_app!();
        let req = test::TestRequest::get()
            .uri("/api/v1/customers/search?status=archived")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_metrics_endpoint_reports_operations() {
        let app = test_app!();
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/customers/{}", uuid::Uuid::new_v4()))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("customer_operations_total"));
        assert!(text.contains("not_found"));
    }

    #[actix_web::test]
    async fn test_malformed_id_is_counted_in_metrics() {
        let app = test_app!();
        let req = test::TestRequest::delete()
            .uri("/api/v1/customers/not-a-uuid")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains(
            r#"customer_operations_total{operation="delete",outcome="invalid_id"} 1"#
        ));
    }
}
