use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::persistence::{CustomerRepository, SearchFilter};

use super::errors::{CustomerError, CustomerResult};
use super::models::{
    Customer, CustomerListResponse, CustomerRequest, CustomerResponse, CustomerSearchRequest,
    ListCustomersRequest, PageRequest,
};
use super::value_objects::CustomerStatus;

// ============================================================================
// Customer Service
// ============================================================================
//
// Orchestrates: Request → Validation → Uniqueness pre-check → Repository
//
// The email pre-check only gives an early, friendly answer. Two concurrent
// requests can both pass it; the store's unique index decides, and the
// repository reports that as the same `EmailConflict`.
//
// ============================================================================

#[async_trait]
pub trait CustomerService: Send + Sync {
    async fn create_customer(&self, request: CustomerRequest) -> CustomerResult<CustomerResponse>;

    async fn get_customer(&self, id: Uuid) -> CustomerResult<CustomerResponse>;

    async fn update_customer(
        &self,
        id: Uuid,
        request: CustomerRequest,
    ) -> CustomerResult<CustomerResponse>;

    async fn delete_customer(&self, id: Uuid) -> CustomerResult<()>;

    async fn list_customers(
        &self,
        request: ListCustomersRequest,
    ) -> CustomerResult<CustomerListResponse>;

    async fn search_customers(
        &self,
        request: CustomerSearchRequest,
    ) -> CustomerResult<CustomerListResponse>;
}

pub struct CustomerServiceImpl<R> {
    repository: Arc<R>,
}

impl<R: CustomerRepository> CustomerServiceImpl<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Fail if a non-deleted customer other than `owner` holds `email`
    async fn ensure_email_available(&self, email: &str, owner: Option<Uuid>) -> CustomerResult<()> {
        match self.repository.find_by_email(email).await? {
            Some(existing) if Some(existing.id) != owner => {
                tracing::warn!(
                    email = %email,
                    existing_customer_id = %existing.id,
                    "Email already registered"
                );
                Err(CustomerError::EmailConflict(email.to_string()))
            }
            _ => Ok(()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[async_trait]
impl<R: CustomerRepository> CustomerService for CustomerServiceImpl<R> {
    async fn create_customer(&self, request: CustomerRequest) -> CustomerResult<CustomerResponse> {
        let draft = request.validate()?;
        self.ensure_email_available(draft.email.as_str(), None).await?;

        let customer = Customer::register(draft);
        let stored = self.repository.insert(&customer).await?;

        tracing::info!(customer_id = %stored.id, "Customer created");
        Ok(stored.into())
    }

    async fn get_customer(&self, id: Uuid) -> CustomerResult<CustomerResponse> {
        let customer = self.repository.find_by_id(id).await?;
        Ok(customer.into())
    }

    async fn update_customer(
        &self,
        id: Uuid,
        request: CustomerRequest,
    ) -> CustomerResult<CustomerResponse> {
        let draft = request.validate()?;
        let mut customer = self.repository.find_by_id(id).await?;

        if customer.email != draft.email.as_str() {
            self.ensure_email_available(draft.email.as_str(), Some(id)).await?;
        }

        customer.apply(draft);
        let stored = self.repository.save(&customer).await?;

        tracing::info!(customer_id = %id, "Customer updated");
        Ok(stored.into())
    }

    async fn delete_customer(&self, id: Uuid) -> CustomerResult<()> {
        self.repository.soft_delete(id).await?;
        tracing::info!(customer_id = %id, "Customer soft-deleted");
        Ok(())
    }

    async fn list_customers(
        &self,
        request: ListCustomersRequest,
    ) -> CustomerResult<CustomerListResponse> {
        let window = PageRequest::normalize(request.page, request.page_size);
        let page = self.repository.list_page(window).await?;
        Ok(CustomerListResponse::from_page(page, window))
    }

    async fn search_customers(
        &self,
        request: CustomerSearchRequest,
    ) -> CustomerResult<CustomerListResponse> {
        let window = PageRequest::normalize(request.page, request.page_size);
        let status = non_empty(request.status)
            .map(|s| s.parse::<CustomerStatus>())
            .transpose()?;
        let filter = SearchFilter {
            query: non_empty(request.query),
            status,
        };

        tracing::debug!(
            query = ?filter.query,
            status = ?filter.status,
            page = window.page,
            page_size = window.page_size,
            "Searching customers"
        );

        let page = self.repository.search_page(&filter, window).await?;
        Ok(CustomerListResponse::from_page(page, window))
    }
}
