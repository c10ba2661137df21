use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::customer::{
    Address, Customer, CustomerError, CustomerPage, CustomerResult, CustomerStatus, Lifecycle,
    PageRequest,
};

use super::schema::EMAIL_UNIQUE_INDEX;
use super::{CustomerRepository, SearchFilter};

// ============================================================================
// PostgreSQL Customer Repository
// ============================================================================

const COLUMNS: &str = "id, first_name, last_name, email, phone, date_of_birth, \
     address_street, address_city, address_state, address_postal_code, address_country, \
     status, created_at, updated_at, deleted_at";

const ORDERING: &str = " ORDER BY created_at DESC, id DESC";

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    date_of_birth: Option<NaiveDate>,
    address_street: Option<String>,
    address_city: Option<String>,
    address_state: Option<String>,
    address_postal_code: Option<String>,
    address_country: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = anyhow::Error;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let status: CustomerStatus = row
            .status
            .parse()
            .map_err(|_| anyhow!("customer {} has unknown status {:?}", row.id, row.status))?;

        Ok(Customer {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            date_of_birth: row.date_of_birth,
            address: Address {
                street: row.address_street,
                city: row.address_city,
                state: row.address_state,
                postal_code: row.address_postal_code,
                country: row.address_country,
            },
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            lifecycle: Lifecycle::from_deleted_at(row.deleted_at),
        })
    }
}

fn into_customers(rows: Vec<CustomerRow>) -> CustomerResult<Vec<Customer>> {
    rows.into_iter()
        .map(|row| Customer::try_from(row).map_err(CustomerError::from))
        .collect()
}

/// Translate a write failure. A unique violation on the email index becomes
/// `EmailConflict`; everything else is internal.
fn write_error(err: sqlx::Error, email: &str, action: &'static str) -> CustomerError {
    if let sqlx::Error::Database(db_err) = &err {
        let on_email = db_err
            .constraint()
            .map_or(true, |name| name == EMAIL_UNIQUE_INDEX);
        if db_err.is_unique_violation() && on_email {
            return CustomerError::EmailConflict(email.to_string());
        }
    }
    store_error(err, action)
}

fn store_error(err: sqlx::Error, action: &'static str) -> CustomerError {
    CustomerError::Internal(anyhow::Error::new(err).context(action))
}

fn push_search_predicate(builder: &mut QueryBuilder<'_, Postgres>, filter: &SearchFilter) {
    builder.push(" WHERE deleted_at IS NULL");

    if let Some(pattern) = filter.like_pattern() {
        builder.push(" AND (first_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR last_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR email ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR phone ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }

    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status.as_str());
    }
}

pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn insert(&self, customer: &Customer) -> CustomerResult<Customer> {
        let sql = format!(
            "INSERT INTO customers (
                id, first_name, last_name, email, phone, date_of_birth,
                address_street, address_city, address_state, address_postal_code, address_country,
                status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW(), NOW())
            RETURNING {COLUMNS}"
        );

        let row: CustomerRow = sqlx::query_as(&sql)
            .bind(customer.id)
            .bind(&customer.first_name)
            .bind(&customer.last_name)
            .bind(&customer.email)
            .bind(&customer.phone)
            .bind(customer.date_of_birth)
            .bind(&customer.address.street)
            .bind(&customer.address.city)
            .bind(&customer.address.state)
            .bind(&customer.address.postal_code)
            .bind(&customer.address.country)
            .bind(customer.status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_error(e, &customer.email, "failed to insert customer"))?;

        tracing::debug!(customer_id = %row.id, "Inserted customer row");
        Ok(Customer::try_from(row)?)
    }

    async fn find_by_id(&self, id: Uuid) -> CustomerResult<Customer> {
        let sql = format!("SELECT {COLUMNS} FROM customers WHERE id = $1 AND deleted_at IS NULL");

        let row: Option<CustomerRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error(e, "failed to get customer"))?;

        match row {
            Some(row) => Ok(Customer::try_from(row)?),
            None => Err(CustomerError::NotFound(id)),
        }
    }

    async fn find_by_email(&self, email: &str) -> CustomerResult<Option<Customer>> {
        let sql =
            format!("SELECT {COLUMNS} FROM customers WHERE email = $1 AND deleted_at IS NULL");

        let row: Option<CustomerRow> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error(e, "failed to look up customer by email"))?;

        Ok(row.map(Customer::try_from).transpose()?)
    }

    async fn save(&self, customer: &Customer) -> CustomerResult<Customer> {
        let sql = format!(
            "UPDATE customers SET
                first_name = $2, last_name = $3, email = $4, phone = $5, date_of_birth = $6,
                address_street = $7, address_city = $8, address_state = $9,
                address_postal_code = $10, address_country = $11,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {COLUMNS}"
        );

        let row: Option<CustomerRow> = sqlx::query_as(&sql)
            .bind(customer.id)
            .bind(&customer.first_name)
            .bind(&customer.last_name)
            .bind(&customer.email)
            .bind(&customer.phone)
            .bind(customer.date_of_birth)
            .bind(&customer.address.street)
            .bind(&customer.address.city)
            .bind(&customer.address.state)
            .bind(&customer.address.postal_code)
            .bind(&customer.address.country)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| write_error(e, &customer.email, "failed to update customer"))?;

        match row {
            Some(row) => Ok(Customer::try_from(row)?),
            None => Err(CustomerError::NotFound(customer.id)),
        }
    }

    async fn soft_delete(&self, id: Uuid) -> CustomerResult<()> {
        let result = sqlx::query(
            "UPDATE customers SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error(e, "failed to delete customer"))?;

        if result.rows_affected() == 0 {
            return Err(CustomerError::NotFound(id));
        }
        Ok(())
    }

    async fn list_page(&self, window: PageRequest) -> CustomerResult<CustomerPage> {
        self.search_page(&SearchFilter::default(), window).await
    }

    async fn search_page(
        &self,
        filter: &SearchFilter,
        window: PageRequest,
    ) -> CustomerResult<CustomerPage> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM customers");
        push_search_predicate(&mut count, filter);

        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| store_error(e, "failed to count customers"))?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM customers"));
        push_search_predicate(&mut select, filter);
        select.push(ORDERING);
        select.push(" LIMIT ");
        select.push_bind(window.limit());
        select.push(" OFFSET ");
        select.push_bind(window.offset());

        let rows: Vec<CustomerRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error(e, "failed to list customers"))?;

        tracing::debug!(
            total = total,
            returned = rows.len(),
            page = window.page,
            page_size = window.page_size,
            "Loaded customer page"
        );

        Ok(CustomerPage {
            customers: into_customers(rows)?,
            total,
        })
    }
}
