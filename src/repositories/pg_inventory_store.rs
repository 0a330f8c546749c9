//! Almacén PostgreSQL
//!
//! Carga el inventario completo al arrancar y persiste cada `ChangeSet` en
//! una sola transacción. Los CHECK y los índices únicos parciales del esquema
//! repiten los invariantes del motor.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};

use crate::models::{Bike, Rental, Repair, Station};
use crate::repositories::inventory_store::InventoryStore;
use crate::services::change_set::ChangeSet;
use crate::services::inventory::InventorySnapshot;
use crate::utils::errors::AppResult;

#[derive(Clone)]
pub struct PgInventoryStore {
    pool: PgPool,
}

impl PgInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn upsert_station(tx: &mut Transaction<'_, Postgres>, station: &Station) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stations (id, name, address, latitude, longitude, capacity, bike_count, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, address = EXCLUDED.address,
                latitude = EXCLUDED.latitude, longitude = EXCLUDED.longitude,
                capacity = EXCLUDED.capacity, bike_count = EXCLUDED.bike_count,
                status = EXCLUDED.status
            "#,
        )
        .bind(station.id)
        .bind(&station.name)
        .bind(&station.address)
        .bind(station.latitude)
        .bind(station.longitude)
        .bind(station.capacity)
        .bind(station.bike_count)
        .bind(station.status)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn upsert_bike(tx: &mut Transaction<'_, Postgres>, bike: &Bike) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO bikes (id, current_station, status, use_count)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET current_station = EXCLUDED.current_station, status = EXCLUDED.status,
                use_count = EXCLUDED.use_count
            "#,
        )
        .bind(bike.id)
        .bind(bike.current_station)
        .bind(bike.status)
        .bind(bike.use_count)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn upsert_rental(tx: &mut Transaction<'_, Postgres>, rental: &Rental) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rentals (id, user_id, bike_id, start_station, end_station, rental_time,
                                 return_time, duration, distance, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE
            SET end_station = EXCLUDED.end_station, return_time = EXCLUDED.return_time,
                duration = EXCLUDED.duration, distance = EXCLUDED.distance,
                status = EXCLUDED.status
            "#,
        )
        .bind(rental.id)
        .bind(rental.user_id)
        .bind(rental.bike_id)
        .bind(rental.start_station)
        .bind(rental.end_station)
        .bind(rental.rental_time)
        .bind(rental.return_time)
        .bind(rental.duration)
        .bind(rental.distance)
        .bind(rental.status)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn upsert_repair(tx: &mut Transaction<'_, Postgres>, repair: &Repair) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO repairs (id, reporter_id, target_type, target_id, category, description,
                                 status, admin_note, created_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE
            SET status = EXCLUDED.status, admin_note = EXCLUDED.admin_note,
                completed_at = EXCLUDED.completed_at
            "#,
        )
        .bind(repair.id)
        .bind(repair.reporter_id)
        .bind(repair.target_type)
        .bind(repair.target_id)
        .bind(&repair.category)
        .bind(&repair.description)
        .bind(repair.status)
        .bind(&repair.admin_note)
        .bind(repair.created_at)
        .bind(repair.completed_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn load(&self) -> AppResult<InventorySnapshot> {
        let stations = sqlx::query_as::<_, Station>("SELECT * FROM stations ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        let bikes = sqlx::query_as::<_, Bike>("SELECT * FROM bikes ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        let rentals = sqlx::query_as::<_, Rental>("SELECT * FROM rentals ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        let repairs = sqlx::query_as::<_, Repair>("SELECT * FROM repairs ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        info!(
            "📦 Inventory loaded from PostgreSQL: {} stations, {} bikes, {} rentals, {} repairs",
            stations.len(),
            bikes.len(),
            rentals.len(),
            repairs.len()
        );

        Ok(InventorySnapshot {
            stations,
            bikes,
            rentals,
            repairs,
        })
    }

    async fn commit(&self, changes: &ChangeSet) -> AppResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        // Estaciones antes que bicis y alquileres por las claves foráneas
        for staged in &changes.stations {
            Self::upsert_station(&mut tx, &staged.after).await?;
        }
        for staged in &changes.bikes {
            Self::upsert_bike(&mut tx, &staged.after).await?;
        }
        for staged in &changes.rentals {
            Self::upsert_rental(&mut tx, &staged.after).await?;
        }
        for staged in &changes.repairs {
            Self::upsert_repair(&mut tx, &staged.after).await?;
        }

        tx.commit().await?;
        debug!("💾 Committed {} records", changes.len());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
