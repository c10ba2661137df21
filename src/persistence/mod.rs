// ============================================================================
// Persistence Layer - Customer Repository
// ============================================================================
//
// The repository owns soft-delete filtering and translates store
// constraint violations into domain errors. Every read hides rows whose
// `deleted_at` is set.
//
// ============================================================================

mod postgres;
pub mod schema;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::customer::{Customer, CustomerPage, CustomerResult, CustomerStatus, PageRequest};

pub use postgres::PgCustomerRepository;

/// Search predicate: `query` matches any of first_name, last_name, email
/// or phone; `status` must match exactly. Both are ANDed when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub query: Option<String>,
    pub status: Option<CustomerStatus>,
}

impl SearchFilter {
    /// `ILIKE` pattern for the free-text query, with LIKE wildcards in the
    /// input escaped so the query always matches as a literal substring.
    pub fn like_pattern(&self) -> Option<String> {
        self.query.as_deref().map(|q| {
            let mut pattern = String::with_capacity(q.len() + 2);
            pattern.push('%');
            for c in q.chars() {
                if matches!(c, '\\' | '%' | '_') {
                    pattern.push('\\');
                }
                pattern.push(c);
            }
            pattern.push('%');
            pattern
        })
    }

    /// In-process equivalent of the SQL predicate
    #[cfg(test)]
    pub fn matches(&self, customer: &Customer) -> bool {
        if let Some(status) = self.status {
            if customer.status != status {
                return false;
            }
        }
        match self.query.as_deref() {
            None => true,
            Some(q) => {
                let needle = q.to_lowercase();
                [
                    &customer.first_name,
                    &customer.last_name,
                    &customer.email,
                    &customer.phone,
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Persist a new customer. Fails with `EmailConflict` when another
    /// non-deleted customer already holds the email.
    async fn insert(&self, customer: &Customer) -> CustomerResult<Customer>;

    async fn find_by_id(&self, id: Uuid) -> CustomerResult<Customer>;

    /// Best-effort lookup for the email pre-check. Not authoritative.
    async fn find_by_email(&self, email: &str) -> CustomerResult<Option<Customer>>;

    /// Overwrite the mutable fields of a non-deleted customer
    async fn save(&self, customer: &Customer) -> CustomerResult<Customer>;

    async fn soft_delete(&self, id: Uuid) -> CustomerResult<()>;

    async fn list_page(&self, window: PageRequest) -> CustomerResult<CustomerPage>;

    async fn search_page(
        &self,
        filter: &SearchFilter,
        window: PageRequest,
    ) -> CustomerResult<CustomerPage>;
}
