//! Per-cluster aggregate statistics and the dashboard's ranked top list.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use murimi_core::{
    parse_decimal_or_zero, percent_share, round1, ClusterLeader, ContractStatus, LeaderStatus,
    Member,
};

/// Number of clusters shown on the dashboard leaderboard.
pub const DASHBOARD_TOP_CLUSTERS: usize = 4;

/// Aggregate statistics for one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ClusterRollup {
    pub cluster_name: String,
    pub leader_name: String,
    pub province: String,
    pub member_count: usize,
    pub active_contracts: usize,
    /// round(active_contracts / member_count * 100); 0 when member_count is 0.
    pub contract_rate: u32,
    /// Total farm area in hectares, rounded to one decimal.
    pub total_area: f64,
}

#[derive(Default)]
struct ClusterAccumulator {
    member_count: usize,
    active_contracts: usize,
    total_area: f64,
}

/// Join members to active cluster leaders by cluster name and rank clusters
/// by membership.
///
/// Members key into leaders through their verbatim `cluster` string: the
/// match is exact, case-sensitive, and untrimmed, so a spelling mismatch
/// silently excludes a member from every rollup. Clusters without members
/// are dropped; ties in member count keep leader input order (the sort is
/// stable); the result is truncated to `top_n`.
pub fn cluster_rollup(
    members: &[Member],
    leaders: &[ClusterLeader],
    top_n: usize,
) -> Vec<ClusterRollup> {
    let mut by_cluster: HashMap<&str, ClusterAccumulator> = HashMap::new();
    for member in members {
        let acc = by_cluster.entry(member.cluster.as_str()).or_default();
        acc.member_count += 1;
        if member.contract_status == ContractStatus::Active {
            acc.active_contracts += 1;
        }
        acc.total_area += parse_decimal_or_zero(member.farm_size.as_deref());
    }

    const EMPTY: ClusterAccumulator = ClusterAccumulator {
        member_count: 0,
        active_contracts: 0,
        total_area: 0.0,
    };

    let mut rollups: Vec<ClusterRollup> = leaders
        .iter()
        .filter(|leader| leader.status == LeaderStatus::Active)
        .map(|leader| {
            let acc = by_cluster.get(leader.cluster_name.as_str()).unwrap_or(&EMPTY);
            ClusterRollup {
                cluster_name: leader.cluster_name.clone(),
                leader_name: leader.full_name(),
                province: leader.province.clone(),
                member_count: acc.member_count,
                active_contracts: acc.active_contracts,
                contract_rate: percent_share(acc.active_contracts, acc.member_count),
                total_area: round1(acc.total_area),
            }
        })
        .filter(|rollup| rollup.member_count > 0)
        .collect();

    rollups.sort_by(|a, b| b.member_count.cmp(&a.member_count));
    rollups.truncate(top_n);

    debug!(
        subsystem = "analytics",
        component = "rollup",
        op = "cluster_rollup",
        row_count = members.len(),
        result_count = rollups.len(),
        "Computed cluster rollup"
    );

    rollups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::member;
    use chrono::{TimeZone, Utc};
    use murimi_core::ContactPerson;
    use uuid::Uuid;

    fn leader(cluster_name: &str, first: &str, last: &str) -> ClusterLeader {
        ClusterLeader {
            id: Uuid::new_v4(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            cluster_name: cluster_name.to_string(),
            year_appointed: Some(2023),
            phone: "+263770000001".to_string(),
            email: None,
            province: "Mashonaland West".to_string(),
            district: "Chegutu".to_string(),
            ward: "4".to_string(),
            village: "Kaguvi".to_string(),
            deputy: Some(ContactPerson {
                name: "T. Ncube".to_string(),
                phone: None,
            }),
            secretary: None,
            treasurer: None,
            status: LeaderStatus::Active,
            bio: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn member_in(cluster: &str) -> Member {
        let mut m = member(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        m.cluster = cluster.to_string();
        m
    }

    #[test]
    fn test_rollup_counts_and_ordering() {
        let leaders = vec![leader("A", "Jane", "Moyo"), leader("B", "Tom", "Banda")];
        let members = vec![member_in("A"), member_in("A"), member_in("B")];

        let rollups = cluster_rollup(&members, &leaders, DASHBOARD_TOP_CLUSTERS);
        assert_eq!(rollups.len(), 2);
        assert_eq!(rollups[0].cluster_name, "A");
        assert_eq!(rollups[0].member_count, 2);
        assert_eq!(rollups[0].leader_name, "Jane Moyo");
        assert_eq!(rollups[1].cluster_name, "B");
        assert_eq!(rollups[1].member_count, 1);
    }

    #[test]
    fn test_zero_member_clusters_are_dropped() {
        let leaders = vec![leader("Empty", "Jane", "Moyo"), leader("Full", "Tom", "Banda")];
        let members = vec![member_in("Full")];

        let rollups = cluster_rollup(&members, &leaders, 4);
        assert_eq!(rollups.len(), 1);
        assert_eq!(rollups[0].cluster_name, "Full");
    }

    #[test]
    fn test_contract_rate_rounds_and_never_divides_by_zero() {
        let leaders = vec![leader("A", "Jane", "Moyo")];
        let mut active = member_in("A");
        active.contract_status = ContractStatus::Active;
        let mut inactive1 = member_in("A");
        inactive1.contract_status = ContractStatus::Inactive;
        let mut inactive2 = member_in("A");
        inactive2.contract_status = ContractStatus::Inactive;

        let rollups = cluster_rollup(&[active, inactive1, inactive2], &leaders, 4);
        assert_eq!(rollups[0].contract_rate, 33);

        // A leader whose cluster has no members never reaches the rate
        // computation; percent_share itself also defines 0/0 as 0.
        assert_eq!(percent_share(0, 0), 0);
    }

    #[test]
    fn test_join_is_case_sensitive_and_untrimmed() {
        let leaders = vec![leader("Mhondoro", "Jane", "Moyo")];
        let members = vec![
            member_in("Mhondoro"),
            member_in("mhondoro"),
            member_in("Mhondoro "),
        ];

        let rollups = cluster_rollup(&members, &leaders, 4);
        assert_eq!(rollups[0].member_count, 1);
    }

    #[test]
    fn test_inactive_leaders_are_excluded() {
        let mut retired = leader("A", "Jane", "Moyo");
        retired.status = LeaderStatus::Inactive;
        let members = vec![member_in("A")];

        let rollups = cluster_rollup(&members, &[retired], 4);
        assert!(rollups.is_empty());
    }

    #[test]
    fn test_truncated_to_top_n_with_stable_ties() {
        let leaders = vec![
            leader("A", "L1", "One"),
            leader("B", "L2", "Two"),
            leader("C", "L3", "Three"),
            leader("D", "L4", "Four"),
            leader("E", "L5", "Five"),
        ];
        let mut members = Vec::new();
        members.extend((0..3).map(|_| member_in("A")));
        members.push(member_in("B"));
        members.push(member_in("C"));
        members.extend((0..2).map(|_| member_in("D")));
        members.push(member_in("E"));

        let rollups = cluster_rollup(&members, &leaders, DASHBOARD_TOP_CLUSTERS);
        assert_eq!(rollups.len(), 4);
        let names: Vec<&str> = rollups.iter().map(|r| r.cluster_name.as_str()).collect();
        // B, C, E all tie at 1; input order keeps B then C, and E is cut.
        assert_eq!(names, vec!["A", "D", "B", "C"]);
    }

    #[test]
    fn test_total_area_rounded_one_decimal() {
        let leaders = vec![leader("A", "Jane", "Moyo")];
        let mut a = member_in("A");
        a.farm_size = Some("1.26".to_string());
        let mut b = member_in("A");
        b.farm_size = Some("2.21".to_string());
        let mut c = member_in("A");
        c.farm_size = Some("not-a-number".to_string());

        let rollups = cluster_rollup(&[a, b, c], &leaders, 4);
        assert_eq!(rollups[0].total_area, 3.5);
    }
}
