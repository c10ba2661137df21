// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Business rules live here, above raw persistence:
// - Value objects and input validation
// - Errors
// - Entity, request and response models
// - Service
//
// ============================================================================

pub mod customer;
