//! Member distribution across farm-type categories.

use serde::Serialize;

use murimi_core::{percent_share, Member};

/// One farm-type group and its share of the membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct FarmTypeShare {
    /// Normalized display label, e.g. "Mixed Crops" for "mixed_crops".
    pub farm_type: String,
    pub count: usize,
    /// round(count / total * 100).
    pub share: u32,
}

/// Turn a raw farm-type key into a display label: underscores become spaces
/// and the first letter of each word is capitalized.
pub fn normalize_farm_type_label(raw: &str) -> String {
    raw.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Group members by farm type.
///
/// Groups are keyed on the raw category string before normalization, ordered
/// by descending count with ties in first-seen order. Zero-member groups are
/// never constructed.
pub fn farm_type_distribution(members: &[Member]) -> Vec<FarmTypeShare> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();

    for member in members {
        let key = member.farm_type.as_str();
        let entry = counts.entry(key).or_insert(0);
        if *entry == 0 {
            order.push(key);
        }
        *entry += 1;
    }

    let total = members.len();
    let mut shares: Vec<FarmTypeShare> = order
        .into_iter()
        .map(|key| {
            let count = counts[key];
            FarmTypeShare {
                farm_type: normalize_farm_type_label(key),
                count,
                share: percent_share(count, total),
            }
        })
        .collect();

    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::member;
    use chrono::{TimeZone, Utc};

    fn member_with(farm_type: &str) -> Member {
        let mut m = member(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        m.farm_type = farm_type.to_string();
        m
    }

    #[test]
    fn test_label_normalization() {
        assert_eq!(normalize_farm_type_label("mixed_crops"), "Mixed Crops");
        assert_eq!(normalize_farm_type_label("dairy"), "Dairy");
        assert_eq!(
            normalize_farm_type_label("small_scale_poultry"),
            "Small Scale Poultry"
        );
        assert_eq!(normalize_farm_type_label(""), "");
    }

    #[test]
    fn test_distribution_counts_and_shares() {
        let members = vec![
            member_with("mixed_crops"),
            member_with("mixed_crops"),
            member_with("mixed_crops"),
            member_with("dairy"),
        ];
        let shares = farm_type_distribution(&members);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].farm_type, "Mixed Crops");
        assert_eq!(shares[0].count, 3);
        assert_eq!(shares[0].share, 75);
        assert_eq!(shares[1].farm_type, "Dairy");
        assert_eq!(shares[1].share, 25);
    }

    #[test]
    fn test_zero_groups_never_constructed() {
        let shares = farm_type_distribution(&[]);
        assert!(shares.is_empty());
    }

    #[test]
    fn test_tie_order_is_first_seen() {
        let members = vec![
            member_with("tobacco"),
            member_with("horticulture"),
            member_with("horticulture"),
            member_with("dairy"),
        ];
        let shares = farm_type_distribution(&members);
        let labels: Vec<&str> = shares.iter().map(|s| s.farm_type.as_str()).collect();
        assert_eq!(labels, vec!["Horticulture", "Tobacco", "Dairy"]);
    }
}
