//! Calendar event repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use murimi_core::{
    CreateEventRequest, Error, Event, EventAudience, EventFilter, EventRepository, EventStatus,
    EventType, Result, UpdateEventRequest,
};

const EVENT_COLUMNS: &str = "id, title, description, event_type, starts_at, ends_at, location, \
     organizer, audience, cluster, province, status, created_at";

fn event_from_row(row: &PgRow) -> Event {
    let event_type: String = row.get("event_type");
    let audience: String = row.get("audience");
    let status: String = row.get("status");
    Event {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        event_type: EventType::from_db(&event_type),
        starts_at: row.get("starts_at"),
        ends_at: row.get("ends_at"),
        location: row.get("location"),
        organizer: row.get("organizer"),
        audience: EventAudience::from_db(&audience),
        cluster: row.get("cluster"),
        province: row.get("province"),
        status: EventStatus::from_db(&status),
        created_at: row.get("created_at"),
    }
}

/// PostgreSQL implementation of EventRepository.
pub struct PgEventRepository {
    pool: Pool<Postgres>,
}

impl PgEventRepository {
    /// Create a new PgEventRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn insert(&self, req: CreateEventRequest) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO event (
                id, title, description, event_type, starts_at, ends_at,
                location, organizer, audience, cluster, province, status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.event_type.to_string())
        .bind(req.starts_at)
        .bind(req.ends_at)
        .bind(&req.location)
        .bind(&req.organizer)
        .bind(req.audience.to_string())
        .bind(&req.cluster)
        .bind(&req.province)
        .bind(req.status.to_string())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "events",
            op = "insert",
            event_id = %id,
            "Created event"
        );
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Event>> {
        let row = sqlx::query(&format!("SELECT {} FROM event WHERE id = $1", EVENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.as_ref().map(event_from_row))
    }

    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let mut sql = format!("SELECT {} FROM event WHERE 1=1 ", EVENT_COLUMNS);
        let mut param_idx = 0;

        if filter.from.is_some() {
            param_idx += 1;
            sql.push_str(&format!("AND starts_at >= ${} ", param_idx));
        }
        if filter.to.is_some() {
            param_idx += 1;
            sql.push_str(&format!("AND starts_at <= ${} ", param_idx));
        }
        if filter.event_type.is_some() {
            param_idx += 1;
            sql.push_str(&format!("AND event_type = ${} ", param_idx));
        }
        if filter.cluster.is_some() {
            param_idx += 1;
            sql.push_str(&format!("AND cluster = ${} ", param_idx));
        }
        sql.push_str("ORDER BY starts_at ASC");

        let mut query = sqlx::query(&sql);
        if let Some(from) = filter.from {
            query = query.bind(from);
        }
        if let Some(to) = filter.to {
            query = query.bind(to);
        }
        if let Some(event_type) = filter.event_type {
            query = query.bind(event_type.to_string());
        }
        if let Some(cluster) = &filter.cluster {
            query = query.bind(cluster);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(event_from_row).collect())
    }

    async fn update(&self, id: Uuid, req: UpdateEventRequest) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE event SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                event_type = COALESCE($4, event_type),
                starts_at = COALESCE($5, starts_at),
                ends_at = COALESCE($6, ends_at),
                location = COALESCE($7, location),
                organizer = COALESCE($8, organizer),
                audience = COALESCE($9, audience),
                cluster = COALESCE($10, cluster),
                province = COALESCE($11, province),
                status = COALESCE($12, status)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.event_type.map(|t| t.to_string()))
        .bind(req.starts_at)
        .bind(req.ends_at)
        .bind(&req.location)
        .bind(&req.organizer)
        .bind(req.audience.map(|a| a.to_string()))
        .bind(&req.cluster)
        .bind(&req.province)
        .bind(req.status.map(|s| s.to_string()))
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Event {}", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM event WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Event {}", id)));
        }
        Ok(())
    }
}
