#[cfg(feature = "database")]
use anyhow::Result;
#[cfg(feature = "database")]
use async_trait::async_trait;
#[cfg(feature = "database")]
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Row, SqlitePool};
#[cfg(feature = "database")]
use tracing::info;

#[cfg(feature = "database")]
use crate::external::{GatewayError, RecordStore};
#[cfg(feature = "database")]
use crate::weighing::record::{Invoice, WeighingRecord};
#[cfg(feature = "database")]
use crate::weighing::types::{ActorId, CargoType, FuelType, ImageRef, Scale};

#[cfg(feature = "database")]
impl From<sqlx::Error> for GatewayError {
    fn from(e: sqlx::Error) -> Self {
        GatewayError::Database {
            message: e.to_string(),
        }
    }
}

#[cfg(feature = "database")]
/// SQLite-backed record store
pub struct DatabaseManager {
    pool: SqlitePool,
}

#[cfg(feature = "database")]
impl DatabaseManager {
    /// Initialize database with automatic migrations
    pub async fn new(database_url: &str, max_connections: u32, auto_migrate: bool) -> Result<Self> {
        // Create database if it doesn't exist
        if !sqlx::Sqlite::database_exists(database_url).await? {
            info!("Creating database at {}", database_url);
            sqlx::Sqlite::create_database(database_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        if auto_migrate {
            info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Database migrations completed");
        }

        Ok(Self { pool })
    }

    /// Close database connections gracefully
    pub async fn shutdown(&self) {
        info!("Shutting down database connections...");
        self.pool.close().await;
        info!("Database connections closed");
    }
}

#[cfg(feature = "database")]
fn corrupt(e: impl std::fmt::Display) -> GatewayError {
    GatewayError::Corrupt {
        message: e.to_string(),
    }
}

#[cfg(feature = "database")]
fn count(value: Option<i64>) -> Result<Option<u32>, GatewayError> {
    value.map(|v| u32::try_from(v).map_err(corrupt)).transpose()
}

#[cfg(feature = "database")]
fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<WeighingRecord, GatewayError> {
    let id: String = row.try_get("id")?;
    let cargo_type: String = row.try_get("cargo_type")?;
    let fuel_type: Option<String> = row.try_get("fuel_type")?;
    let scale: String = row.try_get("scale")?;
    let recorded_at: String = row.try_get("recorded_at")?;

    let invoice_number: Option<String> = row.try_get("invoice_number")?;
    let invoice = match invoice_number {
        Some(number) => Some(Invoice {
            number,
            supplier: row.try_get::<Option<String>, _>("invoice_supplier")?.unwrap_or_default(),
            product: row.try_get::<Option<String>, _>("invoice_product")?.unwrap_or_default(),
            photo: ImageRef::new(
                row.try_get::<Option<String>, _>("invoice_photo")?.unwrap_or_default(),
            ),
        }),
        None => None,
    };

    Ok(WeighingRecord {
        id: id.parse::<uuid::Uuid>().map_err(corrupt)?,
        actor_id: ActorId(row.try_get("actor_id")?),
        identity_number: row.try_get("identity_number")?,
        vehicle_plate: row.try_get("vehicle_plate")?,
        cargo_type: cargo_type.parse::<CargoType>().map_err(corrupt)?,
        unit_count: count(row.try_get("unit_count")?)?,
        fuel_type: fuel_type.map(|code| code.parse::<FuelType>()).transpose().map_err(corrupt)?,
        fuel_volume: row.try_get("fuel_volume")?,
        invoice,
        scale: scale.parse::<Scale>().map_err(corrupt)?,
        live_count: count(row.try_get("live_count")?)?,
        dead_count: count(row.try_get("dead_count")?)?,
        weight_kg: row.try_get("weight_kg")?,
        weight_photo: ImageRef::new(row.try_get::<String, _>("weight_photo")?),
        recorded_at: chrono::DateTime::parse_from_rfc3339(&recorded_at)
            .map_err(corrupt)?
            .with_timezone(&chrono::Utc),
    })
}

#[cfg(feature = "database")]
#[async_trait]
impl RecordStore for DatabaseManager {
    async fn save(&self, record: &WeighingRecord) -> Result<(), GatewayError> {
        let invoice = record.invoice.as_ref();
        sqlx::query(
            r#"
            INSERT INTO weighings (
                id, actor_id, identity_number, vehicle_plate, cargo_type, unit_count,
                fuel_type, fuel_volume, invoice_number, invoice_supplier, invoice_product,
                invoice_photo, scale, live_count, dead_count, weight_kg, weight_photo, recorded_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.actor_id.0)
        .bind(&record.identity_number)
        .bind(&record.vehicle_plate)
        .bind(record.cargo_type.as_str())
        .bind(record.unit_count.map(i64::from))
        .bind(record.fuel_type.map(|fuel| fuel.as_str()))
        .bind(record.fuel_volume)
        .bind(invoice.map(|i| i.number.as_str()))
        .bind(invoice.map(|i| i.supplier.as_str()))
        .bind(invoice.map(|i| i.product.as_str()))
        .bind(invoice.map(|i| i.photo.as_str()))
        .bind(record.scale.as_str())
        .bind(record.live_count.map(i64::from))
        .bind(record.dead_count.map(i64::from))
        .bind(record.weight_kg)
        .bind(record.weight_photo.as_str())
        .bind(record.recorded_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        info!(record_id = %record.id, "Weighing stored in database");
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<WeighingRecord>, GatewayError> {
        let rows = sqlx::query(
            r#"
            SELECT *
            FROM weighings
            ORDER BY recorded_at DESC
            LIMIT ?1
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }

    async fn close(&self) {
        self.shutdown().await;
    }
}
