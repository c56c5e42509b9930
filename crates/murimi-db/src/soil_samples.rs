//! Soil sample repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use murimi_core::{
    CreateSoilSampleRequest, Error, HealthRating, Result, SoilSample, SoilSampleRepository,
};

const SAMPLE_COLUMNS: &str = "id, member_id, sampled_on, lab_reference, ph, lime_recommendation, \
     health_rating, notes, uploaded_by, report_url, created_at";

fn sample_from_row(row: &PgRow) -> SoilSample {
    let rating: Option<String> = row.get("health_rating");
    SoilSample {
        id: row.get("id"),
        member_id: row.get("member_id"),
        sampled_on: row.get("sampled_on"),
        lab_reference: row.get("lab_reference"),
        ph: row.get("ph"),
        lime_recommendation: row.get("lime_recommendation"),
        health_rating: rating.as_deref().and_then(HealthRating::from_db),
        notes: row.get("notes"),
        uploaded_by: row.get("uploaded_by"),
        report_url: row.get("report_url"),
        created_at: row.get("created_at"),
    }
}

/// PostgreSQL implementation of SoilSampleRepository.
pub struct PgSoilSampleRepository {
    pool: Pool<Postgres>,
}

impl PgSoilSampleRepository {
    /// Create a new PgSoilSampleRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SoilSampleRepository for PgSoilSampleRepository {
    async fn insert(&self, member_id: Uuid, req: CreateSoilSampleRequest) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO soil_sample (
                id, member_id, sampled_on, lab_reference, ph,
                lime_recommendation, health_rating, notes, uploaded_by, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id)
        .bind(member_id)
        .bind(req.sampled_on)
        .bind(&req.lab_reference)
        .bind(req.ph)
        .bind(&req.lime_recommendation)
        .bind(req.health_rating.map(|r| r.to_string()))
        .bind(&req.notes)
        .bind(&req.uploaded_by)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "soil_samples",
            op = "insert",
            sample_id = %id,
            member_id = %member_id,
            "Recorded soil sample"
        );
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<SoilSample>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM soil_sample WHERE id = $1",
            SAMPLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(sample_from_row))
    }

    async fn list_for_member(&self, member_id: Uuid) -> Result<Vec<SoilSample>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM soil_sample WHERE member_id = $1 ORDER BY sampled_on DESC",
            SAMPLE_COLUMNS
        ))
        .bind(member_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(sample_from_row).collect())
    }

    async fn set_report_url(&self, id: Uuid, url: &str) -> Result<()> {
        let result = sqlx::query("UPDATE soil_sample SET report_url = $2 WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Soil sample {}", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM soil_sample WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Soil sample {}", id)));
        }
        Ok(())
    }
}
