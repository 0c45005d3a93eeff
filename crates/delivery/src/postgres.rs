//! PostgreSQL-backed delivery store.

use async_trait::async_trait;
use common::{Cpf, DateRange, Money, OrderId, Sku};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{Delivery, DeliveryStatus};
use crate::store::DeliveryStore;

/// Durable delivery store on top of `sqlx`.
#[derive(Clone)]
pub struct PostgresDeliveryStore {
    pool: PgPool,
}

impl PostgresDeliveryStore {
    /// Creates a new PostgreSQL delivery store.
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

    fn row_to_delivery(row: PgRow) -> std::result::Result<Delivery, sqlx::Error> {
        let status_raw: String = row.try_get("status")?;
        let status = DeliveryStatus::parse(&status_raw).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown delivery status {status_raw:?}").into())
        })?;

        Ok(Delivery {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            cpf: Cpf::new(row.try_get::<String, _>("cpf")?),
            sku: Sku::new(row.try_get::<String, _>("sku")?),
            customer_name: row.try_get("customer_name")?,
            product_title: row.try_get("product_title")?,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
            quantity: row.try_get::<i64, _>("quantity")? as u32,
            total: Money::from_cents(row.try_get("total_cents")?),
            status,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl DeliveryStore for PostgresDeliveryStore {
    async fn insert_if_absent(&self, delivery: &Delivery) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO deliveries
                (id, cpf, sku, customer_name, product_title,
                 unit_price_cents, quantity, total_cents, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(delivery.id.as_uuid())
        .bind(delivery.cpf.as_str())
        .bind(delivery.sku.as_str())
        .bind(&delivery.customer_name)
        .bind(&delivery.product_title)
        .bind(delivery.unit_price.cents())
        .bind(delivery.quantity as i64)
        .bind(delivery.total.cents())
        .bind(delivery.status.as_str())
        .bind(delivery.created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Delivery>> {
        let row = sqlx::query("SELECT * FROM deliveries WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_delivery)
            .transpose()
            .map_err(Into::into)
    }

    async fn list(&self, range: DateRange) -> Result<Vec<Delivery>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM deliveries
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
            .map(Self::row_to_delivery)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    async fn set_status(&self, id: OrderId, status: DeliveryStatus) -> Result<()> {
        sqlx::query("UPDATE deliveries SET status = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: OrderId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM deliveries WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_canceled(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM deliveries WHERE status = $1")
            .bind(DeliveryStatus::Canceled.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
