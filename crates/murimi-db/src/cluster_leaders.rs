//! Cluster leader repository implementation.
//!
//! `cluster_name` is the unique business key members reference by free text.
//! The unique index rejects duplicates; that conflict surfaces as
//! [`Error::DuplicateClusterName`] so callers can show a tailored message.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use murimi_core::{
    ClusterLeader, ClusterLeaderRepository, ContactPerson, CreateClusterLeaderRequest, Error,
    LeaderStatus, Result, UpdateClusterLeaderRequest,
};

const LEADER_COLUMNS: &str = "id, first_name, last_name, cluster_name, year_appointed, phone, \
     email, province, district, ward, village, deputy_name, deputy_phone, secretary_name, \
     secretary_phone, treasurer_name, treasurer_phone, status, bio, created_at";

fn contact_from_row(row: &PgRow, name_col: &str, phone_col: &str) -> Option<ContactPerson> {
    let name: Option<String> = row.get(name_col);
    name.map(|name| ContactPerson {
        name,
        phone: row.get(phone_col),
    })
}

fn leader_from_row(row: &PgRow) -> ClusterLeader {
    let status: String = row.get("status");
    ClusterLeader {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        cluster_name: row.get("cluster_name"),
        year_appointed: row.get("year_appointed"),
        phone: row.get("phone"),
        email: row.get("email"),
        province: row.get("province"),
        district: row.get("district"),
        ward: row.get("ward"),
        village: row.get("village"),
        deputy: contact_from_row(row, "deputy_name", "deputy_phone"),
        secretary: contact_from_row(row, "secretary_name", "secretary_phone"),
        treasurer: contact_from_row(row, "treasurer_name", "treasurer_phone"),
        status: LeaderStatus::from_db(&status),
        bio: row.get("bio"),
        created_at: row.get("created_at"),
    }
}

fn map_unique_violation(e: sqlx::Error, cluster_name: &str) -> Error {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return Error::DuplicateClusterName(cluster_name.to_string());
        }
    }
    Error::Database(e)
}

/// PostgreSQL implementation of ClusterLeaderRepository.
pub struct PgClusterLeaderRepository {
    pool: Pool<Postgres>,
}

impl PgClusterLeaderRepository {
    /// Create a new PgClusterLeaderRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClusterLeaderRepository for PgClusterLeaderRepository {
    async fn insert(&self, req: CreateClusterLeaderRequest) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO cluster_leader (
                id, first_name, last_name, cluster_name, year_appointed, phone, email,
                province, district, ward, village,
                deputy_name, deputy_phone, secretary_name, secretary_phone,
                treasurer_name, treasurer_phone, status, bio, created_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20
            )
            "#,
        )
        .bind(id)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.cluster_name)
        .bind(req.year_appointed)
        .bind(&req.phone)
        .bind(&req.email)
        .bind(&req.province)
        .bind(&req.district)
        .bind(&req.ward)
        .bind(&req.village)
        .bind(req.deputy.as_ref().map(|c| c.name.clone()))
        .bind(req.deputy.as_ref().and_then(|c| c.phone.clone()))
        .bind(req.secretary.as_ref().map(|c| c.name.clone()))
        .bind(req.secretary.as_ref().and_then(|c| c.phone.clone()))
        .bind(req.treasurer.as_ref().map(|c| c.name.clone()))
        .bind(req.treasurer.as_ref().and_then(|c| c.phone.clone()))
        .bind(req.status.to_string())
        .bind(&req.bio)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &req.cluster_name))?;

        debug!(
            subsystem = "db",
            component = "cluster_leaders",
            op = "insert",
            leader_id = %id,
            cluster = %req.cluster_name,
            "Registered cluster leader"
        );
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ClusterLeader>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM cluster_leader WHERE id = $1",
            LEADER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(leader_from_row))
    }

    async fn list(&self, status: Option<LeaderStatus>) -> Result<Vec<ClusterLeader>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "SELECT {} FROM cluster_leader WHERE status = $1 ORDER BY created_at DESC",
                    LEADER_COLUMNS
                ))
                .bind(status.to_string())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM cluster_leader ORDER BY created_at DESC",
                    LEADER_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(Error::Database)?;

        Ok(rows.iter().map(leader_from_row).collect())
    }

    async fn update(&self, id: Uuid, req: UpdateClusterLeaderRequest) -> Result<()> {
        // Contact blocks replace wholesale when provided; their inner phone
        // may legitimately be cleared, so no COALESCE on the phone columns
        // of a provided block.
        let new_cluster_name = req.cluster_name.clone().unwrap_or_default();

        let result = sqlx::query(
            r#"
            UPDATE cluster_leader SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                cluster_name = COALESCE($4, cluster_name),
                year_appointed = COALESCE($5, year_appointed),
                phone = COALESCE($6, phone),
                email = COALESCE($7, email),
                province = COALESCE($8, province),
                district = COALESCE($9, district),
                ward = COALESCE($10, ward),
                village = COALESCE($11, village),
                deputy_name = CASE WHEN $12 THEN $13 ELSE deputy_name END,
                deputy_phone = CASE WHEN $12 THEN $14 ELSE deputy_phone END,
                secretary_name = CASE WHEN $15 THEN $16 ELSE secretary_name END,
                secretary_phone = CASE WHEN $15 THEN $17 ELSE secretary_phone END,
                treasurer_name = CASE WHEN $18 THEN $19 ELSE treasurer_name END,
                treasurer_phone = CASE WHEN $18 THEN $20 ELSE treasurer_phone END,
                status = COALESCE($21, status),
                bio = COALESCE($22, bio)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.cluster_name)
        .bind(req.year_appointed)
        .bind(&req.phone)
        .bind(&req.email)
        .bind(&req.province)
        .bind(&req.district)
        .bind(&req.ward)
        .bind(&req.village)
        .bind(req.deputy.is_some())
        .bind(req.deputy.as_ref().map(|c| c.name.clone()))
        .bind(req.deputy.as_ref().and_then(|c| c.phone.clone()))
        .bind(req.secretary.is_some())
        .bind(req.secretary.as_ref().map(|c| c.name.clone()))
        .bind(req.secretary.as_ref().and_then(|c| c.phone.clone()))
        .bind(req.treasurer.is_some())
        .bind(req.treasurer.as_ref().map(|c| c.name.clone()))
        .bind(req.treasurer.as_ref().and_then(|c| c.phone.clone()))
        .bind(req.status.map(|s| s.to_string()))
        .bind(&req.bio)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &new_cluster_name))?;

        if result.rows_affected() == 0 {
            return Err(Error::ClusterLeaderNotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM cluster_leader WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::ClusterLeaderNotFound(id));
        }

        debug!(
            subsystem = "db",
            component = "cluster_leaders",
            op = "delete",
            leader_id = %id,
            "Deleted cluster leader"
        );
        Ok(())
    }
}
