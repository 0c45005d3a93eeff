//! PostgreSQL-backed order store.

use async_trait::async_trait;
use common::{Cpf, DateRange, Money, OrderId, Sku};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::error::Result;
use crate::model::Order;
use crate::store::OrderStore;

/// Durable order store on top of `sqlx`.
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

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> std::result::Result<Order, sqlx::Error> {
        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            cpf: Cpf::new(row.try_get::<String, _>("cpf")?),
            sku: Sku::new(row.try_get::<String, _>("sku")?),
            customer_name: row.try_get("customer_name")?,
            product_title: row.try_get("product_title")?,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
            quantity: row.try_get::<i64, _>("quantity")? as u32,
            total: Money::from_cents(row.try_get("total_cents")?),
            processing: row.try_get("processing")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders
                (id, cpf, sku, customer_name, product_title,
                 unit_price_cents, quantity, total_cents, processing, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.cpf.as_str())
        .bind(order.sku.as_str())
        .bind(&order.customer_name)
        .bind(&order.product_title)
        .bind(order.unit_price.cents())
        .bind(order.quantity as i64)
        .bind(order.total.cents())
        .bind(order.processing)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose().map_err(Into::into)
    }

    async fn list(&self, range: DateRange) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM orders
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at <= $2)
            ORDER BY created_at
            "#,
        )
        .bind(range.after)
        .bind(range.before)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_order)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    async fn mark_processing(&self, id: OrderId) -> Result<()> {
        sqlx::query("UPDATE orders SET processing = TRUE WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: OrderId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
