use async_trait::async_trait;
use common::{Money, TransactionId};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::error::{PaymentError, Result, StorageError};
use crate::store::TransactionStore;
use crate::transaction::{Transaction, TransactionStatus};

const TRANSACTION_COLUMNS: &str = "id, order_id, cents, status, created_at, updated_at";

/// PostgreSQL-backed transaction store.
///
/// Resolution is a single conditional `UPDATE` keyed on `Pending`, so a
/// transaction can never resolve twice even under concurrent callers.
#[derive(Clone)]
pub struct PostgresTransactionStore {
    pool: PgPool,
}

impl PostgresTransactionStore {
    /// Creates a new PostgreSQL transaction store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the payment-service database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations/payment").run(&self.pool).await
    }

    fn row_to_transaction(row: PgRow) -> std::result::Result<Transaction, StorageError> {
        let status_str: String = row.try_get("status")?;
        let status = TransactionStatus::parse(&status_str).ok_or_else(|| {
            StorageError::Invalid(format!("unknown transaction status: {status_str}"))
        })?;

        Ok(Transaction {
            id: TransactionId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_id: row.try_get("order_id")?,
            amount: Money::from_cents(row.try_get("cents")?),
            status,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl TransactionStore for PostgresTransactionStore {
    async fn insert(&self, transaction: Transaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, order_id, cents, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(&transaction.order_id)
        .bind(transaction.amount.cents())
        .bind(transaction.status.as_str())
        .bind(transaction.created_at)
        .bind(transaction.updated_at)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(())
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let row = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::from)?;

        row.map(Self::row_to_transaction)
            .transpose()
            .map_err(PaymentError::from)
    }

    async fn resolve(&self, id: TransactionId, status: TransactionStatus) -> Result<Transaction> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE transactions
            SET status = $2, updated_at = $3
            WHERE id = $1 AND status = $4
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(chrono::Utc::now())
        .bind(TransactionStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::from)?;

        if let Some(row) = row {
            return Ok(Self::row_to_transaction(row)?);
        }

        // The conditional update missed: already resolved, or missing.
        let current = sqlx::query("SELECT status FROM transactions WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        match current {
            Some(row) => {
                let status_str: String = row.try_get("status").map_err(StorageError::from)?;
                let current = TransactionStatus::parse(&status_str).ok_or_else(|| {
                    StorageError::Invalid(format!("unknown transaction status: {status_str}"))
                })?;
                Err(PaymentError::AlreadyResolved {
                    id,
                    status: current,
                })
            }
            None => Err(PaymentError::TransactionNotFound(id)),
        }
    }
}
