//! Repository trait definitions.
//!
//! These traits are the seams between the HTTP layer and the PostgreSQL
//! implementations in `murimi-db`, and allow tests to substitute fakes.
//! Listing operations return full snapshots: the registry is small and the
//! aggregation layer consumes entire collections per pass.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    ClusterLeader, CreateClusterLeaderRequest, CreateEventRequest, CreateMemberRequest,
    CreateSoilSampleRequest, Event, EventFilter, LeaderStatus, Member, MemberFilter, SoilSample,
    UpdateClusterLeaderRequest, UpdateEventRequest, UpdateMemberRequest,
};

/// Repository for member records.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Register a new member, returning its id.
    async fn insert(&self, req: CreateMemberRequest) -> Result<Uuid>;

    /// Fetch one member by id.
    async fn get(&self, id: Uuid) -> Result<Option<Member>>;

    /// Fetch the member snapshot matching the filter, newest first.
    async fn list(&self, filter: &MemberFilter) -> Result<Vec<Member>>;

    /// Apply a partial update. Errors with `MemberNotFound` if absent.
    async fn update(&self, id: Uuid, req: UpdateMemberRequest) -> Result<()>;

    /// Delete a member. Errors with `MemberNotFound` if absent.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Repository for cluster leader records.
#[async_trait]
pub trait ClusterLeaderRepository: Send + Sync {
    /// Register a new cluster leader, returning its id.
    ///
    /// Errors with `DuplicateClusterName` when the cluster name is taken.
    async fn insert(&self, req: CreateClusterLeaderRequest) -> Result<Uuid>;

    /// Fetch one leader by id.
    async fn get(&self, id: Uuid) -> Result<Option<ClusterLeader>>;

    /// Fetch leaders, optionally restricted to one status, newest first.
    async fn list(&self, status: Option<LeaderStatus>) -> Result<Vec<ClusterLeader>>;

    /// Apply a partial update. Errors with `ClusterLeaderNotFound` if absent,
    /// `DuplicateClusterName` if renaming onto a taken cluster name.
    async fn update(&self, id: Uuid, req: UpdateClusterLeaderRequest) -> Result<()>;

    /// Delete a leader. Errors with `ClusterLeaderNotFound` if absent.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Repository for calendar events.
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn insert(&self, req: CreateEventRequest) -> Result<Uuid>;

    async fn get(&self, id: Uuid) -> Result<Option<Event>>;

    /// Fetch events within the filter's `starts_at` range, soonest first.
    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>>;

    async fn update(&self, id: Uuid, req: UpdateEventRequest) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Repository for soil sample records.
#[async_trait]
pub trait SoilSampleRepository: Send + Sync {
    /// Record a soil sample for a member, returning its id.
    async fn insert(&self, member_id: Uuid, req: CreateSoilSampleRequest) -> Result<Uuid>;

    async fn get(&self, id: Uuid) -> Result<Option<SoilSample>>;

    /// Fetch all samples for one member, most recent sample date first.
    async fn list_for_member(&self, member_id: Uuid) -> Result<Vec<SoilSample>>;

    /// Attach the public URL of an uploaded lab report.
    async fn set_report_url(&self, id: Uuid, url: &str) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}
