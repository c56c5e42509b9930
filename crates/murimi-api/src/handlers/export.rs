//! Member CSV export handler.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use murimi_core::{
    export::{members_to_csv, parse_field_selection, ExportFormat},
    ContractStatus, MemberFilter, MemberRepository,
};

use crate::{ApiError, AppState};

/// Query parameters for the export endpoint. Filter params mirror the member
/// listing so an export matches what the caller sees on screen.
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    /// Comma-separated column keys; empty or absent selects every column.
    pub fields: Option<String>,
    /// `csv` (default) or `excel`.
    pub format: Option<String>,
    pub province: Option<String>,
    pub cluster: Option<String>,
    pub status: Option<ContractStatus>,
    pub farm_type: Option<String>,
    pub search: Option<String>,
}

/// `GET /members/export?fields=…&format=csv|excel`
///
/// Streams nothing: the registry is small enough that the whole document is
/// built in memory, matching the listing endpoints.
pub async fn export_members(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let fields = parse_field_selection(query.fields.as_deref().unwrap_or(""))?;
    let format = match query.format.as_deref() {
        Some(raw) => ExportFormat::from_query(raw)?,
        None => ExportFormat::default(),
    };

    let filter = MemberFilter {
        province: query.province,
        cluster: query.cluster,
        contract_status: query.status,
        farm_type: query.farm_type,
        search: query.search,
    };
    let members = state.db.members.list(&filter).await?;
    let csv = members_to_csv(&members, &fields);
    let filename = format.filename(Utc::now().date_naive());

    info!(
        subsystem = "api",
        op = "export_members",
        row_count = members.len(),
        field_count = fields.len(),
        bytes = csv.len(),
        %filename,
        "exported members"
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(format.content_type()),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
            .map_err(|e| ApiError::BadRequest(format!("Invalid export filename: {}", e)))?,
    );

    Ok((StatusCode::OK, headers, csv))
}
