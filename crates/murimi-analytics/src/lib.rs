//! # murimi-analytics
//!
//! Pure, synchronous aggregation over in-memory registry snapshots.
//!
//! Each function takes immutable slices fetched by the caller and folds them
//! into the figures the dashboard renders. Nothing here performs I/O, retries,
//! or caching: every request re-runs the full fetch-and-reduce pipeline, and a
//! failed fetch means the corresponding computation is skipped entirely.
//!
//! All numeric inputs are treated permissively (see
//! [`murimi_core::numeric::parse_decimal_or_zero`]): malformed fields degrade
//! to zero rather than failing the pass.

pub mod distribution;
pub mod metrics;
pub mod rollup;
pub mod trends;

pub use distribution::{farm_type_distribution, normalize_farm_type_label, FarmTypeShare};
pub use metrics::{growth_percent, reduce_members, MemberMetrics};
pub use rollup::{cluster_rollup, ClusterRollup, DASHBOARD_TOP_CLUSTERS};
pub use trends::{weekly_signups, WeekBucket, WeekScheme};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Utc};
    use murimi_core::{ContractStatus, Member};
    use uuid::Uuid;

    /// Minimal member fixture; tests override the fields they exercise.
    pub fn member(created_at: DateTime<Utc>) -> Member {
        Member {
            id: Uuid::new_v4(),
            first_name: "Tari".to_string(),
            last_name: "Moyo".to_string(),
            national_id: "63-000000A00".to_string(),
            date_of_birth: None,
            gender: None,
            phone: "+263770000000".to_string(),
            secondary_phone: None,
            email: None,
            province: "Harare".to_string(),
            district: "Harare".to_string(),
            ward: "1".to_string(),
            village: "Mbare".to_string(),
            cluster: "Mhondoro North".to_string(),
            farm_type: "mixed_crops".to_string(),
            farm_size: Some("1.0".to_string()),
            has_insurance: false,
            contract_status: ContractStatus::Active,
            created_at,
        }
    }
}
