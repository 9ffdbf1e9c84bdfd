//! Postgres-backed stores.
//!
//! Schema lives in `migrations/0001_init.sql` and is applied by
//! [`ensure_schema`].
//!
//! ## Account isolation
//!
//! Every statement carries `account_id` in its WHERE clause or primary key.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `UniqueViolation` |
//! | Database (other) | Any other | `Unavailable` |
//! | PoolClosed / IO / other | N/A | `Unavailable` |

use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool, Postgres, Row, Transaction, postgres::PgRow};
use tracing::instrument;
use uuid::Uuid;

use shelfwatch_core::{AccountId, CalendarDate};
use shelfwatch_inventory::{Record, RecordKey};
use shelfwatch_products::{Product, Sku};

use super::{AccountStore, InsertOutcome, ProductStore, RecordStore, ResetSummary, StoreError};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Apply the schema (idempotent).
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    Ok(())
}

/// Postgres-backed product template store (`products` table).
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: Arc<PgPool>,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self), fields(account_id = %account), err)]
    async fn list(&self, account: AccountId) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT account_id, sku, name, shelf_life_days, reminder_days, location
            FROM products
            WHERE account_id = $1
            ORDER BY sku ASC
            "#,
        )
        .bind(account.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self), fields(account_id = %account, sku = %sku), err)]
    async fn get(&self, account: AccountId, sku: &Sku) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT account_id, sku, name, shelf_life_days, reminder_days, location
            FROM products
            WHERE account_id = $1 AND sku = $2
            "#,
        )
        .bind(account.as_uuid())
        .bind(sku.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_product", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self, product), fields(account_id = %product.account_id(), sku = %product.sku()), err)]
    async fn insert(&self, product: Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (account_id, sku, name, shelf_life_days, reminder_days, location)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(product.account_id().as_uuid())
        .bind(product.sku().as_str())
        .bind(product.name())
        .bind(i64::from(product.shelf_life_days()))
        .bind(i64::from(product.reminder_days()))
        .bind(product.location())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(())
    }

    #[instrument(skip(self, product), fields(account_id = %product.account_id(), sku = %product.sku()), err)]
    async fn replace(&self, product: Product) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $3,
                shelf_life_days = $4,
                reminder_days = $5,
                location = $6,
                updated_at = NOW()
            WHERE account_id = $1 AND sku = $2
            "#,
        )
        .bind(product.account_id().as_uuid())
        .bind(product.sku().as_str())
        .bind(product.name())
        .bind(i64::from(product.shelf_life_days()))
        .bind(i64::from(product.reminder_days()))
        .bind(product.location())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("replace_product", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(account_id = %account, sku = %sku), err)]
    async fn delete(&self, account: AccountId, sku: &Sku) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE account_id = $1 AND sku = $2")
            .bind(account.as_uuid())
            .bind(sku.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        Ok(result.rows_affected() > 0)
    }
}

/// Postgres-backed batch record store (`product_records` table).
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: Arc<PgPool>,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a transaction holding the advisory lock for one record key.
    ///
    /// Every insert path takes this lock, so `batch_seq` allocation and the
    /// phase-1 conflict check never interleave for the same key.
    async fn lock_key(&self, key: &RecordKey, account: AccountId) -> Result<Transaction<'static, Postgres>, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_record_insert", e))?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!(
                "product_records/{}/{}/{}",
                account, key.sku, key.production_date
            ))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_record_key", e))?;

        Ok(tx)
    }
}

async fn find_first_copy(
    conn: &mut PgConnection,
    account: AccountId,
    key: &RecordKey,
) -> Result<Option<Record>, StoreError> {
    let row = sqlx::query(
        r#"
        SELECT account_id, sku, name, production_date, shelf_life_days, reminder_days, location
        FROM product_records
        WHERE account_id = $1 AND sku = $2 AND production_date = $3
        ORDER BY batch_seq ASC
        LIMIT 1
        "#,
    )
    .bind(account.as_uuid())
    .bind(key.sku.as_str())
    .bind(key.production_date.as_naive())
    .fetch_optional(conn)
    .await
    .map_err(|e| map_sqlx_error("find_record", e))?;

    row.as_ref().map(record_from_row).transpose()
}

#[async_trait::async_trait]
impl RecordStore for PostgresRecordStore {
    #[instrument(skip(self), fields(account_id = %account), err)]
    async fn list(&self, account: AccountId) -> Result<Vec<Record>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT account_id, sku, name, production_date, shelf_life_days, reminder_days, location
            FROM product_records
            WHERE account_id = $1
            ORDER BY sku ASC, production_date ASC, batch_seq ASC
            "#,
        )
        .bind(account.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_records", e))?;

        rows.iter().map(record_from_row).collect()
    }

    #[instrument(skip(self), fields(account_id = %account, sku = %sku), err)]
    async fn list_by_sku(&self, account: AccountId, sku: &Sku) -> Result<Vec<Record>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT account_id, sku, name, production_date, shelf_life_days, reminder_days, location
            FROM product_records
            WHERE account_id = $1 AND sku = $2
            ORDER BY production_date ASC, batch_seq ASC
            "#,
        )
        .bind(account.as_uuid())
        .bind(sku.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_records_by_sku", e))?;

        rows.iter().map(record_from_row).collect()
    }

    #[instrument(skip(self, record), fields(account_id = %record.account_id, key = %record.key()), err)]
    async fn insert_unique(&self, record: Record) -> Result<InsertOutcome, StoreError> {
        let key = record.key();
        let mut tx = self.lock_key(&key, record.account_id).await?;

        // Any copy counts, not just batch_seq 0: deletes remove the newest copy first.
        if let Some(existing) = find_first_copy(&mut tx, record.account_id, &key).await? {
            tx.commit()
                .await
                .map_err(|e| map_sqlx_error("commit_insert_record", e))?;
            return Ok(InsertOutcome::Existing(existing));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO product_records (
                account_id, sku, production_date, batch_seq,
                name, shelf_life_days, reminder_days, location
            )
            VALUES ($1, $2, $3, 0, $4, $5, $6, $7)
            ON CONFLICT (account_id, sku, production_date, batch_seq) DO NOTHING
            "#,
        )
        .bind(record.account_id.as_uuid())
        .bind(record.sku.as_str())
        .bind(record.production_date.as_naive())
        .bind(&record.name)
        .bind(i64::from(record.shelf_life_days))
        .bind(i64::from(record.reminder_days))
        .bind(&record.location)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_record", e))?;

        if result.rows_affected() != 1 {
            return Err(StoreError::Unavailable(format!(
                "insert for {key} conflicted while holding the key lock"
            )));
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_insert_record", e))?;
        Ok(InsertOutcome::Inserted)
    }

    #[instrument(skip(self, record), fields(account_id = %record.account_id, key = %record.key()), err)]
    async fn insert_duplicate(&self, record: Record) -> Result<(), StoreError> {
        let mut tx = self.lock_key(&record.key(), record.account_id).await?;

        sqlx::query(
            r#"
            INSERT INTO product_records (
                account_id, sku, production_date, batch_seq,
                name, shelf_life_days, reminder_days, location
            )
            SELECT $1, $2, $3, COALESCE(MAX(batch_seq) + 1, 0), $4, $5, $6, $7
            FROM product_records
            WHERE account_id = $1 AND sku = $2 AND production_date = $3
            "#,
        )
        .bind(record.account_id.as_uuid())
        .bind(record.sku.as_str())
        .bind(record.production_date.as_naive())
        .bind(&record.name)
        .bind(i64::from(record.shelf_life_days))
        .bind(i64::from(record.reminder_days))
        .bind(&record.location)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_duplicate_record", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_insert_duplicate", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(account_id = %account, key = %key), err)]
    async fn delete_one(&self, account: AccountId, key: &RecordKey) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM product_records
            WHERE id = (
                SELECT id FROM product_records
                WHERE account_id = $1 AND sku = $2 AND production_date = $3
                ORDER BY batch_seq DESC
                LIMIT 1
            )
            "#,
        )
        .bind(account.as_uuid())
        .bind(key.sku.as_str())
        .bind(key.production_date.as_naive())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_record", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(account_id = %account, cutoff = %cutoff), err)]
    async fn delete_expired_before(&self, account: AccountId, cutoff: CalendarDate) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM product_records
            WHERE account_id = $1
              AND production_date + shelf_life_days::integer < $2
            "#,
        )
        .bind(account.as_uuid())
        .bind(cutoff.as_naive())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("purge_expired_records", e))?;
        Ok(result.rows_affected())
    }
}

/// Account-wide operations over both tables.
#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: Arc<PgPool>,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip(self), fields(account_id = %account), err)]
    async fn clear_account(&self, account: AccountId) -> Result<ResetSummary, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_clear_account", e))?;

        let records = sqlx::query("DELETE FROM product_records WHERE account_id = $1")
            .bind(account.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("clear_records", e))?;

        let products = sqlx::query("DELETE FROM products WHERE account_id = $1")
            .bind(account.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("clear_products", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_clear_account", e))?;

        Ok(ResetSummary {
            products_removed: products.rows_affected(),
            records_removed: records.rows_affected(),
        })
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let account: Uuid = row.try_get("account_id").map_err(corrupt_row)?;
    let sku: String = row.try_get("sku").map_err(corrupt_row)?;
    let name: String = row.try_get("name").map_err(corrupt_row)?;
    let shelf_life_days: i64 = row.try_get("shelf_life_days").map_err(corrupt_row)?;
    let reminder_days: i64 = row.try_get("reminder_days").map_err(corrupt_row)?;
    let location: String = row.try_get("location").map_err(corrupt_row)?;

    let sku = Sku::parse(&sku).map_err(|e| StoreError::Unavailable(format!("corrupt product row: {e}")))?;
    Product::new(
        AccountId::from_uuid(account),
        sku,
        name,
        shelf_life_days,
        reminder_days,
        location,
    )
    .map_err(|e| StoreError::Unavailable(format!("corrupt product row: {e}")))
}

fn record_from_row(row: &PgRow) -> Result<Record, StoreError> {
    let account: Uuid = row.try_get("account_id").map_err(corrupt_row)?;
    let sku: String = row.try_get("sku").map_err(corrupt_row)?;
    let production_date: NaiveDate = row.try_get("production_date").map_err(corrupt_row)?;
    let shelf_life_days: i64 = row.try_get("shelf_life_days").map_err(corrupt_row)?;
    let reminder_days: i64 = row.try_get("reminder_days").map_err(corrupt_row)?;

    let to_days = |v: i64| {
        u32::try_from(v).map_err(|_| StoreError::Unavailable(format!("corrupt record row: day count {v}")))
    };

    Ok(Record {
        account_id: AccountId::from_uuid(account),
        sku: Sku::parse(&sku).map_err(|e| StoreError::Unavailable(format!("corrupt record row: {e}")))?,
        name: row.try_get("name").map_err(corrupt_row)?,
        production_date: CalendarDate::from_naive(production_date),
        shelf_life_days: to_days(shelf_life_days)?,
        reminder_days: to_days(reminder_days)?,
        location: row.try_get("location").map_err(corrupt_row)?,
    })
}

fn corrupt_row(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(format!("failed to decode row: {err}"))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code == "23505" => StoreError::UniqueViolation(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Unavailable(format!("sqlx error in {}: {}", operation, err)),
    }
}
