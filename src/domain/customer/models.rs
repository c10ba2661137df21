use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::ValidationError;
use super::value_objects::{Address, CustomerStatus, Email, Lifecycle, PersonName, PhoneNumber};

// ============================================================================
// Customer Entity
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Address,
    pub status: CustomerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lifecycle: Lifecycle,
}

impl Customer {
    /// Build a new active customer with a fresh id.
    ///
    /// Timestamps are provisional; the repository assigns the stored values
    /// on insert.
    pub fn register(draft: CustomerDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_name: draft.first_name.into_inner(),
            last_name: draft.last_name.into_inner(),
            email: draft.email.into_inner(),
            phone: draft.phone.into_inner(),
            date_of_birth: draft.date_of_birth,
            address: draft.address,
            status: CustomerStatus::Active,
            created_at: now,
            updated_at: now,
            lifecycle: Lifecycle::Active,
        }
    }

    /// Overwrite every mutable field. `id`, `status` and timestamps stay.
    pub fn apply(&mut self, draft: CustomerDraft) {
        self.first_name = draft.first_name.into_inner();
        self.last_name = draft.last_name.into_inner();
        self.email = draft.email.into_inner();
        self.phone = draft.phone.into_inner();
        self.date_of_birth = draft.date_of_birth;
        self.address = draft.address;
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Payload for creating or updating a customer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub address: Address,
}

impl CustomerRequest {
    /// Validate fields in order, stopping at the first violation:
    /// first_name, last_name, email, phone.
    pub fn validate(self) -> Result<CustomerDraft, ValidationError> {
        let first_name = PersonName::parse("first_name", &self.first_name)?;
        let last_name = PersonName::parse("last_name", &self.last_name)?;
        let email = Email::parse(&self.email)?;
        let phone = PhoneNumber::parse(&self.phone)?;

        Ok(CustomerDraft {
            first_name,
            last_name,
            email,
            phone,
            date_of_birth: self.date_of_birth,
            address: self.address,
        })
    }
}

/// A request that passed validation
#[derive(Debug, Clone)]
pub struct CustomerDraft {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: Email,
    pub phone: PhoneNumber,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Address,
}

/// Query parameters for listing customers
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCustomersRequest {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Query parameters for searching customers
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerSearchRequest {
    pub query: Option<String>,
    pub status: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

// ============================================================================
// Pagination
// ============================================================================

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Normalized page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Missing or non-positive page becomes 1. Missing or non-positive page
    /// size becomes the default; anything above the maximum is clamped.
    pub fn normalize(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p.min(u32::MAX as i64) as u32,
            _ => 1,
        };
        let page_size = match page_size {
            Some(s) if s >= 1 => s.min(MAX_PAGE_SIZE as i64) as u32,
            _ => DEFAULT_PAGE_SIZE,
        };
        Self { page, page_size }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        let size = self.page_size as i64;
        (total + size - 1) / size
    }
}

/// One page of customers plus the total number of matching rows
#[derive(Debug, Clone)]
pub struct CustomerPage {
    pub customers: Vec<Customer>,
    pub total: i64,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Address,
    pub status: CustomerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            first_name: customer.first_name,
            last_name: customer.last_name,
            email: customer.email,
            phone: customer.phone,
            date_of_birth: customer.date_of_birth,
            address: customer.address,
            status: customer.status,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerListResponse {
    pub items: Vec<CustomerResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: i64,
}

impl CustomerListResponse {
    pub fn from_page(page: CustomerPage, window: PageRequest) -> Self {
        Self {
            total_pages: window.total_pages(page.total),
            items: page.customers.into_iter().map(CustomerResponse::from).collect(),
            total: page.total,
            page: window.page,
            page_size: window.page_size,
        }
    }
}
