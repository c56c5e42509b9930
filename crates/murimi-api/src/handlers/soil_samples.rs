//! Soil sample HTTP handlers, including lab report uploads.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use murimi_core::{
    CreateSoilSampleRequest, MemberRepository, SoilSample, SoilSampleRepository,
};

use crate::{ApiError, AppState};

/// Record a soil sample against a member.
pub async fn create_soil_sample(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    Json(req): Json<CreateSoilSampleRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    // Reject samples for unknown members up front so the FK violation never
    // surfaces as a 500.
    if state.db.members.get(member_id).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "Member {} not found",
            member_id
        )));
    }
    let id = state.db.soil_samples.insert(member_id, req).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// List a member's soil samples, most recent sample date first.
pub async fn list_soil_samples(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<SoilSample>>, ApiError> {
    let samples = state.db.soil_samples.list_for_member(member_id).await?;
    Ok(Json(samples))
}

pub async fn delete_soil_sample(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.db.soil_samples.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Keep the uploaded filename's extension if it looks safe; anything else is
/// stored without one.
fn safe_extension(filename: &str) -> Option<&str> {
    let ext = filename.rsplit_once('.')?.1;
    if !ext.is_empty()
        && ext.len() <= 8
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        Some(ext)
    } else {
        None
    }
}

/// Upload a lab report for a soil sample.
///
/// Accepts multipart form data with a single `file` part. The file is stored
/// under `soil-reports/<sample-id>[.ext]` and the resulting public URL is
/// persisted on the sample.
pub async fn upload_soil_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let sample = state
        .db
        .soil_samples
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Soil sample {} not found", id)))?;

    let mut upload: Option<(Option<String>, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
            upload = Some((filename, data.to_vec()));
            break;
        }
    }

    let (filename, data) = upload
        .ok_or_else(|| ApiError::BadRequest("Missing 'file' part in upload".to_string()))?;
    if data.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }

    let storage_path = match filename.as_deref().and_then(safe_extension) {
        Some(ext) => format!("soil-reports/{}.{}", id, ext),
        None => format!("soil-reports/{}", id),
    };

    let url = state.storage.upload(&storage_path, &data).await?;
    state.db.soil_samples.set_report_url(id, &url).await?;

    info!(
        subsystem = "api",
        op = "upload_soil_report",
        sample_id = %id,
        member_id = %sample.member_id,
        bytes = data.len(),
        "stored soil report"
    );

    Ok(Json(serde_json::json!({ "report_url": url })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_extension() {
        assert_eq!(safe_extension("report.pdf"), Some("pdf"));
        assert_eq!(safe_extension("scan.final.PNG"), Some("PNG"));
        assert_eq!(safe_extension("noextension"), None);
        assert_eq!(safe_extension("trailing."), None);
        assert_eq!(safe_extension("weird.p/df"), None);
        assert_eq!(safe_extension("long.abcdefghij"), None);
    }
}
