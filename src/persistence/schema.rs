use anyhow::{Context, Result};
use sqlx::PgPool;

// ============================================================================
// Customer Schema
// ============================================================================
//
// Idempotent DDL applied at startup and by the `migrate` command.
// Email uniqueness is a partial index so a soft-deleted customer's email
// can be registered again. Column widths never undercut request
// validation: bounded fields match their validated maximum, the rest are
// TEXT.
//
// ============================================================================

pub const EMAIL_UNIQUE_INDEX: &str = "idx_customers_email_active";

const STATEMENTS: &[(&str, &str)] = &[
    (
        "customers table",
        "CREATE TABLE IF NOT EXISTS customers (
            id                  UUID PRIMARY KEY,
            first_name          VARCHAR(100) NOT NULL,
            last_name           VARCHAR(100) NOT NULL,
            email               TEXT         NOT NULL,
            phone               VARCHAR(20)  NOT NULL,
            date_of_birth       DATE,
            address_street      TEXT,
            address_city        TEXT,
            address_state       TEXT,
            address_postal_code TEXT,
            address_country     TEXT,
            status              VARCHAR(20)  NOT NULL DEFAULT 'active'
                CHECK (status IN ('active', 'inactive', 'suspended', 'closed')),
            created_at          TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
            updated_at          TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
            deleted_at          TIMESTAMPTZ
        )",
    ),
    (
        "email unique index",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_customers_email_active
            ON customers (email) WHERE deleted_at IS NULL",
    ),
    (
        "deleted_at index",
        "CREATE INDEX IF NOT EXISTS idx_customers_deleted_at ON customers (deleted_at)",
    ),
    (
        "created_at index",
        "CREATE INDEX IF NOT EXISTS idx_customers_created_at ON customers (created_at DESC)",
    ),
];

/// Apply the customer schema
pub async fn migrate(pool: &PgPool) -> Result<()> {
    for (name, sql) in STATEMENTS {
        sqlx::query(sql)
            .execute(pool)
            .await
            .with_context(|| format!("failed to apply {name}"))?;
        tracing::debug!(step = %name, "Applied schema step");
    }

    tracing::info!(steps = STATEMENTS.len(), "Database migration completed");
    Ok(())
}
