//! Analytics HTTP handlers.
//!
//! Each endpoint fetches a full snapshot from the database and runs the pure
//! aggregation functions from `murimi-analytics` over it. There is no caching
//! or partial-result fallback: if a fetch fails, the request fails.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use murimi_analytics::{
    cluster_rollup, farm_type_distribution, growth_percent, reduce_members, weekly_signups,
    ClusterRollup, FarmTypeShare, MemberMetrics, WeekBucket, WeekScheme, DASHBOARD_TOP_CLUSTERS,
};
use murimi_core::{ClusterLeaderRepository, MemberFilter, MemberRepository};

use crate::{ApiError, AppState};

/// Dashboard headline figures.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub metrics: MemberMetrics,
    /// Month-over-month growth in new registrations; absent when last month
    /// had none (growth is undefined, not infinite).
    pub growth_percent: Option<f64>,
    /// Display form of the growth figure, "—" when undefined.
    pub growth_label: String,
}

/// Render the growth figure for display: signed percentage, or a neutral
/// dash when undefined.
pub fn growth_label(growth: Option<f64>) -> String {
    match growth {
        Some(pct) => format!("{:+.1}%", pct),
        None => "\u{2014}".to_string(),
    }
}

/// `GET /analytics/dashboard`
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, ApiError> {
    let members = state.db.members.list(&MemberFilter::default()).await?;
    let metrics = reduce_members(&members, Utc::now());
    let growth = growth_percent(metrics.new_this_month, metrics.new_last_month);

    Ok(Json(DashboardResponse {
        metrics,
        growth_percent: growth,
        growth_label: growth_label(growth),
    }))
}

#[derive(Debug, Deserialize)]
pub struct TrendsQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// `fixed` or `iso`; falls back to the server-configured scheme.
    pub scheme: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TrendsResponse {
    pub year: i32,
    pub month: u32,
    pub scheme: WeekScheme,
    pub weeks: Vec<WeekBucket>,
}

/// `GET /analytics/trends?year=&month=&scheme=`
///
/// Year and month default to the current month.
pub async fn trends(
    State(state): State<AppState>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<TrendsResponse>, ApiError> {
    let now = Utc::now();
    let year = query.year.unwrap_or_else(|| now.year());
    let month = query.month.unwrap_or_else(|| now.month());

    if !(1..=12).contains(&month) {
        return Err(ApiError::BadRequest(format!(
            "Invalid month: {} (expected 1-12)",
            month
        )));
    }
    if !(2000..=9999).contains(&year) {
        return Err(ApiError::BadRequest(format!("Invalid year: {}", year)));
    }

    let scheme = match query.scheme.as_deref() {
        Some(raw) => WeekScheme::parse(raw)
            .ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "Invalid week scheme: '{}' (expected 'fixed' or 'iso')",
                    raw
                ))
            })?,
        None => state.week_scheme,
    };

    let members = state.db.members.list(&MemberFilter::default()).await?;
    let weeks = weekly_signups(&members, year, month, scheme);

    Ok(Json(TrendsResponse {
        year,
        month,
        scheme,
        weeks,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct TopClustersQuery {
    pub limit: Option<usize>,
}

/// `GET /analytics/clusters/top?limit=`
///
/// Both the member and leader snapshots must load; a failure of either fails
/// the request rather than serving a partial rollup.
pub async fn top_clusters(
    State(state): State<AppState>,
    Query(query): Query<TopClustersQuery>,
) -> Result<Json<Vec<ClusterRollup>>, ApiError> {
    let limit = query.limit.unwrap_or(DASHBOARD_TOP_CLUSTERS);
    let members = state.db.members.list(&MemberFilter::default()).await?;
    let leaders = state.db.cluster_leaders.list(None).await?;
    Ok(Json(cluster_rollup(&members, &leaders, limit)))
}

/// `GET /analytics/farm-types`
pub async fn farm_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<FarmTypeShare>>, ApiError> {
    let members = state.db.members.list(&MemberFilter::default()).await?;
    Ok(Json(farm_type_distribution(&members)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_label_neutral_when_undefined() {
        assert_eq!(growth_label(None), "\u{2014}");
    }

    #[test]
    fn test_growth_label_signed_percent() {
        assert_eq!(growth_label(Some(25.0)), "+25.0%");
        assert_eq!(growth_label(Some(-12.5)), "-12.5%");
        assert_eq!(growth_label(Some(0.0)), "+0.0%");
    }
}
