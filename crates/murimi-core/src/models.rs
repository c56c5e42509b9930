//! Core data models for murimi.
//!
//! These types are shared across all murimi crates and represent the domain
//! entities of the registry: members, cluster leaders, calendar events, and
//! soil samples. Entities are treated as read-only immutable snapshots for
//! the duration of one aggregation pass.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// STATUS / CATEGORY ENUMS
// =============================================================================

/// Membership contract state, driving eligibility metrics.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Active,
    #[default]
    Inactive,
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

impl ContractStatus {
    /// Parse a stored status string.
    ///
    /// Unknown values degrade to `Inactive`: the legacy store compared the
    /// raw string against "Active", so anything unrecognized never counted
    /// as an active contract.
    pub fn from_db(s: &str) -> Self {
        match s {
            "active" => Self::Active,
            _ => Self::Inactive,
        }
    }
}

/// Cluster leadership status.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum LeaderStatus {
    #[default]
    Active,
    Inactive,
}

impl std::fmt::Display for LeaderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

impl LeaderStatus {
    /// Parse a stored status string; unknown values degrade to `Inactive`.
    pub fn from_db(s: &str) -> Self {
        match s {
            "active" => Self::Active,
            _ => Self::Inactive,
        }
    }
}

/// Calendar event category.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Training,
    Meeting,
    #[default]
    General,
    Deadline,
    Inspection,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Training => write!(f, "training"),
            Self::Meeting => write!(f, "meeting"),
            Self::General => write!(f, "general"),
            Self::Deadline => write!(f, "deadline"),
            Self::Inspection => write!(f, "inspection"),
        }
    }
}

impl EventType {
    pub fn from_db(s: &str) -> Self {
        match s {
            "training" => Self::Training,
            "meeting" => Self::Meeting,
            "deadline" => Self::Deadline,
            "inspection" => Self::Inspection,
            _ => Self::General,
        }
    }
}

/// Who an event is aimed at.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EventAudience {
    #[default]
    All,
    Members,
    ClusterLeaders,
}

impl std::fmt::Display for EventAudience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Members => write!(f, "members"),
            Self::ClusterLeaders => write!(f, "cluster_leaders"),
        }
    }
}

impl EventAudience {
    pub fn from_db(s: &str) -> Self {
        match s {
            "members" => Self::Members,
            "cluster_leaders" => Self::ClusterLeaders,
            _ => Self::All,
        }
    }
}

/// Lifecycle state of a calendar event.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl EventStatus {
    pub fn from_db(s: &str) -> Self {
        match s {
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            _ => Self::Scheduled,
        }
    }
}

/// Soil health rating assigned by the lab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthRating {
    Good,
    Fair,
    Poor,
}

impl std::fmt::Display for HealthRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Good => write!(f, "good"),
            Self::Fair => write!(f, "fair"),
            Self::Poor => write!(f, "poor"),
        }
    }
}

impl HealthRating {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "good" => Some(Self::Good),
            "fair" => Some(Self::Fair),
            "poor" => Some(Self::Poor),
            _ => None,
        }
    }
}

// =============================================================================
// MEMBER
// =============================================================================

/// A registered member of the farmer-support organization.
///
/// `cluster` is a free-text name key, not a foreign id: it must equal some
/// `ClusterLeader::cluster_name` verbatim for rollups to attribute the member.
/// There is no referential-integrity enforcement; a mismatch silently excludes
/// the member from that cluster's rollup.
///
/// `farm_size` is kept as the raw stored text (decimal hectares). Aggregations
/// parse it through [`crate::numeric::parse_decimal_or_zero`] so malformed
/// values contribute 0 instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Member {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub village: String,
    pub cluster: String,
    pub farm_type: String,
    pub farm_size: Option<String>,
    pub has_insurance: bool,
    pub contract_status: ContractStatus,
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Full display name, "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Request to register a new member.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateMemberRequest {
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    pub phone: String,
    #[serde(default)]
    pub secondary_phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub village: String,
    pub cluster: String,
    pub farm_type: String,
    #[serde(default)]
    pub farm_size: Option<String>,
    #[serde(default)]
    pub has_insurance: bool,
    #[serde(default)]
    pub contract_status: ContractStatus,
}

/// Partial update to an existing member. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateMemberRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub national_id: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub secondary_phone: Option<String>,
    pub email: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub ward: Option<String>,
    pub village: Option<String>,
    pub cluster: Option<String>,
    pub farm_type: Option<String>,
    pub farm_size: Option<String>,
    pub has_insurance: Option<bool>,
    pub contract_status: Option<ContractStatus>,
}

/// Filter for member listings. All criteria are conjunctive.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct MemberFilter {
    pub province: Option<String>,
    pub cluster: Option<String>,
    pub contract_status: Option<ContractStatus>,
    pub farm_type: Option<String>,
    /// Case-insensitive substring match against names and national id.
    pub search: Option<String>,
}

impl MemberFilter {
    /// True when no criteria are set (the listing is a full snapshot).
    pub fn is_empty(&self) -> bool {
        self.province.is_none()
            && self.cluster.is_none()
            && self.contract_status.is_none()
            && self.farm_type.is_none()
            && self.search.is_none()
    }
}

// =============================================================================
// CLUSTER LEADER
// =============================================================================

/// A named contact within a cluster leadership team.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ContactPerson {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// An elected leader of a member cluster.
///
/// `cluster_name` is the unique business key members reference by free text.
/// Uniqueness is enforced by the database and surfaced as
/// [`crate::Error::DuplicateClusterName`].
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ClusterLeader {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub cluster_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_appointed: Option<i32>,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub village: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deputy: Option<ContactPerson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secretary: Option<ContactPerson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treasurer: Option<ContactPerson>,
    pub status: LeaderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ClusterLeader {
    /// Full display name, "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Request to register a new cluster leader.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateClusterLeaderRequest {
    pub first_name: String,
    pub last_name: String,
    pub cluster_name: String,
    #[serde(default)]
    pub year_appointed: Option<i32>,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub village: String,
    #[serde(default)]
    pub deputy: Option<ContactPerson>,
    #[serde(default)]
    pub secretary: Option<ContactPerson>,
    #[serde(default)]
    pub treasurer: Option<ContactPerson>,
    #[serde(default)]
    pub status: LeaderStatus,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Partial update to a cluster leader. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateClusterLeaderRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub cluster_name: Option<String>,
    pub year_appointed: Option<i32>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub ward: Option<String>,
    pub village: Option<String>,
    pub deputy: Option<ContactPerson>,
    pub secretary: Option<ContactPerson>,
    pub treasurer: Option<ContactPerson>,
    pub status: Option<LeaderStatus>,
    pub bio: Option<String>,
}

// =============================================================================
// EVENT
// =============================================================================

/// A calendar event (training day, cluster meeting, deadline, ...).
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub event_type: EventType,
    pub starts_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    pub audience: EventAudience,
    /// Optional scoping to one cluster (by name, same free-text key members use).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
}

/// Request to create a calendar event.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub event_type: EventType,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub organizer: Option<String>,
    #[serde(default)]
    pub audience: EventAudience,
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub status: EventStatus,
}

/// Partial update to an event. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<EventType>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub organizer: Option<String>,
    pub audience: Option<EventAudience>,
    pub cluster: Option<String>,
    pub province: Option<String>,
    pub status: Option<EventStatus>,
}

/// Calendar range filter for event listings (inclusive bounds on `starts_at`).
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct EventFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub event_type: Option<EventType>,
    pub cluster: Option<String>,
}

// =============================================================================
// SOIL SAMPLE
// =============================================================================

/// A lab soil sample recorded against a member's farm.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SoilSample {
    pub id: Uuid,
    pub member_id: Uuid,
    pub sampled_on: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lab_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lime_recommendation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_rating: Option<HealthRating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
    /// Public URL of the stored lab report file, if one was uploaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request to record a soil sample for a member.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateSoilSampleRequest {
    pub sampled_on: NaiveDate,
    #[serde(default)]
    pub lab_reference: Option<String>,
    #[serde(default)]
    pub ph: Option<f64>,
    #[serde(default)]
    pub lime_recommendation: Option<String>,
    #[serde(default)]
    pub health_rating: Option<HealthRating>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub uploaded_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_status_round_trip() {
        assert_eq!(ContractStatus::from_db("active"), ContractStatus::Active);
        assert_eq!(ContractStatus::Active.to_string(), "active");
        assert_eq!(ContractStatus::Inactive.to_string(), "inactive");
    }

    #[test]
    fn test_contract_status_unknown_degrades_to_inactive() {
        assert_eq!(ContractStatus::from_db("ACTIVE"), ContractStatus::Inactive);
        assert_eq!(ContractStatus::from_db(""), ContractStatus::Inactive);
        assert_eq!(ContractStatus::from_db("pending"), ContractStatus::Inactive);
    }

    #[test]
    fn test_event_type_unknown_degrades_to_general() {
        assert_eq!(EventType::from_db("field_day"), EventType::General);
        assert_eq!(EventType::from_db("training"), EventType::Training);
    }

    #[test]
    fn test_health_rating_unknown_is_none() {
        assert_eq!(HealthRating::from_db("excellent"), None);
        assert_eq!(HealthRating::from_db("poor"), Some(HealthRating::Poor));
    }

    #[test]
    fn test_contract_status_serde_lowercase() {
        let json = serde_json::to_string(&ContractStatus::Active).unwrap();
        assert_eq!(json, "\"active\"");
        let parsed: ContractStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(parsed, ContractStatus::Inactive);
    }

    #[test]
    fn test_audience_serde_snake_case() {
        let json = serde_json::to_string(&EventAudience::ClusterLeaders).unwrap();
        assert_eq!(json, "\"cluster_leaders\"");
    }

    #[test]
    fn test_member_filter_is_empty() {
        assert!(MemberFilter::default().is_empty());
        let filter = MemberFilter {
            province: Some("Harare".to_string()),
            ..Default::default()
        };
        assert!(!filter.is_empty());
    }
}
