//! Member repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use murimi_core::{
    ContractStatus, CreateMemberRequest, Error, Member, MemberFilter, MemberRepository, Result,
    UpdateMemberRequest,
};

use crate::escape_like;

const MEMBER_COLUMNS: &str = "id, first_name, last_name, national_id, date_of_birth, gender, \
     phone, secondary_phone, email, province, district, ward, village, cluster, farm_type, \
     farm_size, has_insurance, contract_status, created_at";

fn member_from_row(row: &PgRow) -> Member {
    let status: String = row.get("contract_status");
    Member {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        national_id: row.get("national_id"),
        date_of_birth: row.get("date_of_birth"),
        gender: row.get("gender"),
        phone: row.get("phone"),
        secondary_phone: row.get("secondary_phone"),
        email: row.get("email"),
        province: row.get("province"),
        district: row.get("district"),
        ward: row.get("ward"),
        village: row.get("village"),
        cluster: row.get("cluster"),
        farm_type: row.get("farm_type"),
        farm_size: row.get("farm_size"),
        has_insurance: row.get("has_insurance"),
        contract_status: ContractStatus::from_db(&status),
        created_at: row.get("created_at"),
    }
}

/// PostgreSQL implementation of MemberRepository.
pub struct PgMemberRepository {
    pool: Pool<Postgres>,
}

impl PgMemberRepository {
    /// Create a new PgMemberRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    async fn insert(&self, req: CreateMemberRequest) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO member (
                id, first_name, last_name, national_id, date_of_birth, gender,
                phone, secondary_phone, email, province, district, ward, village,
                cluster, farm_type, farm_size, has_insurance, contract_status, created_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19
            )
            "#,
        )
        .bind(id)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.national_id)
        .bind(req.date_of_birth)
        .bind(&req.gender)
        .bind(&req.phone)
        .bind(&req.secondary_phone)
        .bind(&req.email)
        .bind(&req.province)
        .bind(&req.district)
        .bind(&req.ward)
        .bind(&req.village)
        .bind(&req.cluster)
        .bind(&req.farm_type)
        .bind(&req.farm_size)
        .bind(req.has_insurance)
        .bind(req.contract_status.to_string())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "members",
            op = "insert",
            member_id = %id,
            cluster = %req.cluster,
            "Registered member"
        );
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Member>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM member WHERE id = $1",
            MEMBER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(member_from_row))
    }

    async fn list(&self, filter: &MemberFilter) -> Result<Vec<Member>> {
        // Full snapshot, no pagination: aggregations consume every row.
        let mut sql = format!("SELECT {} FROM member WHERE 1=1 ", MEMBER_COLUMNS);
        let mut param_idx = 0;

        if filter.province.is_some() {
            param_idx += 1;
            sql.push_str(&format!("AND province = ${} ", param_idx));
        }
        if filter.cluster.is_some() {
            param_idx += 1;
            sql.push_str(&format!("AND cluster = ${} ", param_idx));
        }
        if filter.contract_status.is_some() {
            param_idx += 1;
            sql.push_str(&format!("AND contract_status = ${} ", param_idx));
        }
        if filter.farm_type.is_some() {
            param_idx += 1;
            sql.push_str(&format!("AND farm_type = ${} ", param_idx));
        }
        if filter.search.is_some() {
            param_idx += 1;
            sql.push_str(&format!(
                "AND (first_name ILIKE ${i} OR last_name ILIKE ${i} OR national_id ILIKE ${i}) ",
                i = param_idx
            ));
        }
        sql.push_str("ORDER BY created_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(province) = &filter.province {
            query = query.bind(province);
        }
        if let Some(cluster) = &filter.cluster {
            query = query.bind(cluster);
        }
        if let Some(status) = &filter.contract_status {
            query = query.bind(status.to_string());
        }
        if let Some(farm_type) = &filter.farm_type {
            query = query.bind(farm_type);
        }
        if let Some(search) = &filter.search {
            query = query.bind(format!("%{}%", escape_like(search)));
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "members",
            op = "list",
            row_count = rows.len(),
            "Fetched member snapshot"
        );
        Ok(rows.iter().map(member_from_row).collect())
    }

    async fn update(&self, id: Uuid, req: UpdateMemberRequest) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE member SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                national_id = COALESCE($4, national_id),
                date_of_birth = COALESCE($5, date_of_birth),
                gender = COALESCE($6, gender),
                phone = COALESCE($7, phone),
                secondary_phone = COALESCE($8, secondary_phone),
                email = COALESCE($9, email),
                province = COALESCE($10, province),
                district = COALESCE($11, district),
                ward = COALESCE($12, ward),
                village = COALESCE($13, village),
                cluster = COALESCE($14, cluster),
                farm_type = COALESCE($15, farm_type),
                farm_size = COALESCE($16, farm_size),
                has_insurance = COALESCE($17, has_insurance),
                contract_status = COALESCE($18, contract_status)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.national_id)
        .bind(req.date_of_birth)
        .bind(&req.gender)
        .bind(&req.phone)
        .bind(&req.secondary_phone)
        .bind(&req.email)
        .bind(&req.province)
        .bind(&req.district)
        .bind(&req.ward)
        .bind(&req.village)
        .bind(&req.cluster)
        .bind(&req.farm_type)
        .bind(&req.farm_size)
        .bind(req.has_insurance)
        .bind(req.contract_status.map(|s| s.to_string()))
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::MemberNotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM member WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::MemberNotFound(id));
        }

        debug!(
            subsystem = "db",
            component = "members",
            op = "delete",
            member_id = %id,
            "Deleted member"
        );
        Ok(())
    }
}
