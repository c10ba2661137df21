use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::customer::{
    Customer, CustomerError, CustomerPage, CustomerResult, Lifecycle, PageRequest,
};

use super::{CustomerRepository, SearchFilter};

// ============================================================================
// In-Memory Customer Repository (tests only)
// ============================================================================
//
// Mirrors the PostgreSQL schema: email is unique among non-deleted rows,
// reads hide deleted rows, timestamps are assigned on write.
//
// ============================================================================

#[derive(Default)]
pub struct InMemoryCustomerRepository {
    rows: Mutex<Vec<Customer>>,
    last_timestamp: Mutex<Option<DateTime<Utc>>>,
    hide_email_lookup: AtomicBool,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `find_by_email` always miss, so duplicate emails reach the
    /// uniqueness check in `insert`/`save`, as with two racing requests.
    pub fn hide_email_lookup(&self) {
        self.hide_email_lookup.store(true, Ordering::SeqCst);
    }

    /// Raw row access, deleted rows included
    pub fn raw(&self, id: Uuid) -> Option<Customer> {
        self.rows.lock().unwrap().iter().find(|c| c.id == id).cloned()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    // Strictly increasing so created_at ordering is deterministic
    fn next_timestamp(&self) -> DateTime<Utc> {
        let mut last = self.last_timestamp.lock().unwrap();
        let now = Utc::now();
        let next = match *last {
            Some(prev) if now <= prev => prev + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(next);
        next
    }

    fn email_taken(rows: &[Customer], email: &str, except: Uuid) -> bool {
        rows.iter()
            .any(|c| c.lifecycle.is_active() && c.email == email && c.id != except)
    }

    fn page(&self, filter: &SearchFilter, window: PageRequest) -> CustomerPage {
        let rows = self.rows.lock().unwrap();
        let mut matching: Vec<Customer> = rows
            .iter()
            .filter(|c| c.lifecycle.is_active() && filter.matches(c))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let customers = matching
            .into_iter()
            .skip(window.offset() as usize)
            .take(window.limit() as usize)
            .collect();

        CustomerPage { customers, total }
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn insert(&self, customer: &Customer) -> CustomerResult<Customer> {
        let now = self.next_timestamp();
        let mut rows = self.rows.lock().unwrap();
        if Self::email_taken(&rows, &customer.email, customer.id) {
            return Err(CustomerError::EmailConflict(customer.email.clone()));
        }

        let mut stored = customer.clone();
        stored.created_at = now;
        stored.updated_at = now;
        stored.lifecycle = Lifecycle::Active;
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> CustomerResult<Customer> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id && c.lifecycle.is_active())
            .cloned()
            .ok_or(CustomerError::NotFound(id))
    }

    async fn find_by_email(&self, email: &str) -> CustomerResult<Option<Customer>> {
        if self.hide_email_lookup.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.email == email && c.lifecycle.is_active())
            .cloned())
    }

    async fn save(&self, customer: &Customer) -> CustomerResult<Customer> {
        let now = self.next_timestamp();
        let mut rows = self.rows.lock().unwrap();
        if Self::email_taken(&rows, &customer.email, customer.id) {
            return Err(CustomerError::EmailConflict(customer.email.clone()));
        }

        let existing = rows
            .iter_mut()
            .find(|c| c.id == customer.id && c.lifecycle.is_active())
            .ok_or(CustomerError::NotFound(customer.id))?;

        existing.first_name = customer.first_name.clone();
        existing.last_name = customer.last_name.clone();
        existing.email = customer.email.clone();
        existing.phone = customer.phone.clone();
        existing.date_of_birth = customer.date_of_birth;
        existing.address = customer.address.clone();
        existing.updated_at = now;
        Ok(existing.clone())
    }

    async fn soft_delete(&self, id: Uuid) -> CustomerResult<()> {
        let now = self.next_timestamp();
        let mut rows = self.rows.lock().unwrap();
        let existing = rows
            .iter_mut()
            .find(|c| c.id == id && c.lifecycle.is_active())
            .ok_or(CustomerError::NotFound(id))?;

        existing.lifecycle = Lifecycle::Deleted { deleted_at: now };
        Ok(())
    }

    async fn list_page(&self, window: PageRequest) -> CustomerResult<CustomerPage> {
        Ok(self.page(&SearchFilter::default(), window))
    }

    async fn search_page(
        &self,
        filter: &SearchFilter,
        window: PageRequest,
    ) -> CustomerResult<CustomerPage> {
        Ok(self.page(filter, window))
    }
}
