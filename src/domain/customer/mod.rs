// ============================================================================
// Customer Domain
// ============================================================================
//
// - Value objects (PersonName, Email, PhoneNumber, Address, CustomerStatus, Lifecycle)
// - Errors (ValidationError, CustomerError)
// - Models (Customer entity, requests, responses, pagination)
// - Service (CustomerService trait and its repository-backed implementation)
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod models;
pub mod service;

// Re-export for convenience
pub use value_objects::*;
pub use errors::*;
pub use models::*;
pub use service::*;
