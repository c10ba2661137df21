use std::future::Future;
use std::time::Instant;

use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;

use crate::domain::customer::{
    CustomerRequest, CustomerSearchRequest, CustomerService, ListCustomersRequest,
};
use crate::metrics::Metrics;

use super::error::ApiError;

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId)
}

/// Run one operation and record its outcome, id parsing included
async fn observed<T>(
    metrics: &Metrics,
    operation: &'static str,
    call: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    let started = Instant::now();
    let result = call.await;
    let outcome = match &result {
        Ok(_) => "ok",
        Err(err) => err.kind(),
    };
    metrics.record_operation(operation, outcome, started.elapsed().as_secs_f64());
    result
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "customer-service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn create_customer<S: CustomerService>(
    service: web::Data<S>,
    metrics: web::Data<Metrics>,
    body: web::Json<CustomerRequest>,
) -> Result<HttpResponse, ApiError> {
    let customer = observed(&metrics, "create", async {
        Ok::<_, ApiError>(service.create_customer(body.into_inner()).await?)
    })
    .await?;
    Ok(HttpResponse::Created().json(customer))
}

pub async fn get_customer<S: CustomerService>(
    service: web::Data<S>,
    metrics: web::Data<Metrics>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let customer = observed(&metrics, "get", async {
        let id = parse_id(&path)?;
        Ok::<_, ApiError>(service.get_customer(id).await?)
    })
    .await?;
    Ok(HttpResponse::Ok().json(customer))
}

pub async fn update_customer<S: CustomerService>(
    service: web::Data<S>,
    metrics: web::Data<Metrics>,
    path: web::Path<String>,
    body: web::Json<CustomerRequest>,
) -> Result<HttpResponse, ApiError> {
    let customer = observed(&metrics, "update", async {
        let id = parse_id(&path)?;
        Ok::<_, ApiError>(service.update_customer(id, body.into_inner()).await?)
    })
    .await?;
    Ok(HttpResponse::Ok().json(customer))
}

pub async fn delete_customer<S: CustomerService>(
    service: web::Data<S>,
    metrics: web::Data<Metrics>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    observed(&metrics, "delete", async {
        let id = parse_id(&path)?;
        Ok::<_, ApiError>(service.delete_customer(id).await?)
    })
    .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn list_customers<S: CustomerService>(
    service: web::Data<S>,
    metrics: web::Data<Metrics>,
    query: web::Query<ListCustomersRequest>,
) -> Result<HttpResponse, ApiError> {
    let page = observed(&metrics, "list", async {
        Ok::<_, ApiError>(service.list_customers(query.into_inner()).await?)
    })
    .await?;
    Ok(HttpResponse::Ok().json(page))
}

pub async fn search_customers<S: CustomerService>(
    service: web::Data<S>,
    metrics: web::Data<Metrics>,
    query: web::Query<CustomerSearchRequest>,
) -> Result<HttpResponse, ApiError> {
    let page = observed(&metrics, "search", async {
        Ok::<_, ApiError>(service.search_customers(query.into_inner()).await?)
    })
    .await?;
    Ok(HttpResponse::Ok().json(page))
}
