use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, ProductId};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::error::{OrderError, Result, StorageError};
use crate::order::{Order, ProductSnapshot, TimelineEvent};
use crate::product::Product;
use crate::status::OrderStatus;
use crate::store::{NewOrder, OrderStore, PaymentRecord, Transition};

const ORDER_COLUMNS: &str = "id, customer_id, product_id, product_name, product_price_cents, \
     quantity, total_cents, status, payment_id, paid_cents, timeline, created_at, updated_at";

/// PostgreSQL-backed order store.
///
/// Stock reservation and status transitions are single conditional `UPDATE`
/// statements; order creation runs inside a transaction so the insert and the
/// decrement commit together or not at all.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the order-service database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations/order").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> std::result::Result<Order, StorageError> {
        let status_str: String = row.try_get("status")?;
        let status = OrderStatus::parse(&status_str)
            .ok_or_else(|| StorageError::Invalid(format!("unknown order status: {status_str}")))?;

        let timeline_json: serde_json::Value = row.try_get("timeline")?;
        let timeline: Vec<TimelineEvent> = serde_json::from_value(timeline_json)?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            customer_id: CustomerId::new(row.try_get::<String, _>("customer_id")?),
            product: ProductSnapshot {
                id: ProductId::new(row.try_get::<String, _>("product_id")?),
                name: row.try_get("product_name")?,
                price: Money::from_cents(row.try_get("product_price_cents")?),
            },
            quantity: row.try_get::<i32, _>("quantity")? as u32,
            total_amount: Money::from_cents(row.try_get("total_cents")?),
            status,
            payment_id: row.try_get("payment_id")?,
            paid_amount: row
                .try_get::<Option<i64>, _>("paid_cents")?
                .map(Money::from_cents),
            timeline,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_product(row: PgRow) -> std::result::Result<Product, StorageError> {
        Ok(Product {
            id: ProductId::new(row.try_get::<String, _>("id")?),
            name: row.try_get("name")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            stocks: row.try_get::<i32, _>("stocks")? as u32,
        })
    }

    fn timeline_entry(name: &str, timestamp: DateTime<Utc>) -> std::result::Result<serde_json::Value, StorageError> {
        Ok(serde_json::to_value(vec![TimelineEvent {
            name: name.to_string(),
            timestamp,
        }])?)
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert_product(&self, product: Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price_cents, stocks)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, price_cents = EXCLUDED.price_cents, stocks = EXCLUDED.stocks
            "#,
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(product.price.cents())
        .bind(product.stocks as i32)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(())
    }

    async fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT id, name, price_cents, stocks FROM products WHERE id = $1")
            .bind(product_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        row.map(Self::row_to_product)
            .transpose()
            .map_err(OrderError::from)
    }

    async fn reserve_stock(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        let result =
            sqlx::query("UPDATE products SET stocks = stocks - $2 WHERE id = $1 AND stocks >= $2")
                .bind(product_id.as_str())
                .bind(quantity as i32)
                .execute(&self.pool)
                .await
                .map_err(StorageError::from)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let exists = sqlx::query("SELECT 1 FROM products WHERE id = $1")
            .bind(product_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Err(match exists {
            Some(_) => OrderError::InsufficientStock {
                product_id: product_id.clone(),
            },
            None => OrderError::ProductNotFound(product_id.clone()),
        })
    }

    async fn release_stock(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        let result = sqlx::query("UPDATE products SET stocks = stocks + $2 WHERE id = $1")
            .bind(product_id.as_str())
            .bind(quantity as i32)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(OrderError::ProductNotFound(product_id.clone()));
        }
        Ok(())
    }

    async fn create_order(&self, new_order: NewOrder) -> Result<Order> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        let row = sqlx::query("SELECT id, name, price_cents, stocks FROM products WHERE id = $1")
            .bind(new_order.product_id.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(StorageError::from)?;

        let Some(row) = row else {
            return Err(OrderError::ProductNotFound(new_order.product_id));
        };
        let product = Self::row_to_product(row)?;

        if product.stocks < new_order.quantity {
            return Err(OrderError::InsufficientStock {
                product_id: new_order.product_id,
            });
        }

        let order = Order::create(new_order.customer_id, &product, new_order.quantity);
        let timeline = serde_json::to_value(&order.timeline).map_err(StorageError::from)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, product_id, product_name, product_price_cents,
                                quantity, total_cents, status, payment_id, paid_cents, timeline,
                                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.customer_id.as_str())
        .bind(order.product.id.as_str())
        .bind(&order.product.name)
        .bind(order.product.price.cents())
        .bind(order.quantity as i32)
        .bind(order.total_amount.cents())
        .bind(order.status.as_str())
        .bind(order.payment_id.as_deref())
        .bind(order.paid_amount.map(|m| m.cents()))
        .bind(&timeline)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::from)?;

        // The conditional decrement is the authoritative stock guard; the
        // read above only fast-paths the common failure. Losing the race
        // here rolls the insert back with the transaction.
        let updated =
            sqlx::query("UPDATE products SET stocks = stocks - $2 WHERE id = $1 AND stocks >= $2")
                .bind(order.product.id.as_str())
                .bind(order.quantity as i32)
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;

        if updated.rows_affected() == 0 {
            return Err(OrderError::InsufficientStock {
                product_id: order.product.id,
            });
        }

        tx.commit().await.map_err(StorageError::from)?;
        Ok(order)
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(order_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        row.map(Self::row_to_order)
            .transpose()
            .map_err(OrderError::from)
    }

    async fn orders_for_customer(&self, customer_id: &CustomerId) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = $1 ORDER BY created_at DESC"
        ))
        .bind(customer_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;

        rows.into_iter()
            .map(|row| Self::row_to_order(row).map_err(OrderError::from))
            .collect()
    }

    async fn transition(
        &self,
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
        payment: Option<PaymentRecord>,
    ) -> Result<Transition> {
        let now = Utc::now();
        let entry = Self::timeline_entry(to.as_str(), now)?;
        let (payment_id, paid_cents) = match &payment {
            Some(p) => (p.payment_id.clone(), Some(p.amount.cents())),
            None => (None, None),
        };

        let row = sqlx::query(&format!(
            r#"
            UPDATE orders
            SET status = $3,
                updated_at = $4,
                timeline = timeline || $5,
                payment_id = COALESCE($6, payment_id),
                paid_cents = COALESCE($7, paid_cents)
            WHERE id = $1 AND status = $2
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order_id.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(now)
        .bind(&entry)
        .bind(payment_id)
        .bind(paid_cents)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::from)?;

        if let Some(row) = row {
            return Ok(Transition::Applied(Self::row_to_order(row)?));
        }

        // The conditional update missed: distinguish a status mismatch from
        // a missing order.
        let current = sqlx::query("SELECT status FROM orders WHERE id = $1")
            .bind(order_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        match current {
            Some(row) => {
                let status_str: String = row.try_get("status").map_err(StorageError::from)?;
                let current = OrderStatus::parse(&status_str).ok_or_else(|| {
                    StorageError::Invalid(format!("unknown order status: {status_str}"))
                })?;
                Ok(Transition::StatusMismatch { current })
            }
            None => Ok(Transition::NotFound),
        }
    }

    async fn append_timeline(&self, order_id: OrderId, entry: &str) -> Result<bool> {
        let now = Utc::now();
        let entry = Self::timeline_entry(entry, now)?;

        let result = sqlx::query(
            "UPDATE orders SET updated_at = $2, timeline = timeline || $3 WHERE id = $1",
        )
        .bind(order_id.as_uuid())
        .bind(now)
        .bind(&entry)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn deliver_confirmed_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let now = Utc::now();
        let entry = Self::timeline_entry(OrderStatus::Delivered.as_str(), now)?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $3, updated_at = $4, timeline = timeline || $5
            WHERE status = $2 AND updated_at < $1
            "#,
        )
        .bind(cutoff)
        .bind(OrderStatus::Confirmed.as_str())
        .bind(OrderStatus::Delivered.as_str())
        .bind(now)
        .bind(&entry)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(result.rows_affected())
    }
}
