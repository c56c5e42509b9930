//! Scalar KPI reduction over the member snapshot.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tracing::debug;

use murimi_core::{parse_decimal_or_zero, round1, ContractStatus, Member};

/// Headline figures for the dashboard cards.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct MemberMetrics {
    /// Count of all member records.
    pub total_members: usize,
    /// Sum of parseable farm sizes in hectares, rounded to one decimal.
    /// Malformed or missing sizes contribute exactly 0.
    pub total_farm_area: f64,
    /// Members whose contract status is Active. Always <= total_members.
    pub active_contracts: usize,
    /// Cardinality of distinct non-empty province strings (case-sensitive).
    pub provinces_covered: usize,
    /// Registrations in the calendar month of the reference instant.
    pub new_this_month: usize,
    /// Registrations in the month before that (year wraps at January).
    pub new_last_month: usize,
}

/// Calendar month before `(year, month)`, wrapping the year at January.
fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Fold the member snapshot into dashboard KPIs.
///
/// `now` is the reference instant for the this-month/last-month windows;
/// callers pass `Utc::now()` in production and a fixed instant in tests.
pub fn reduce_members(members: &[Member], now: DateTime<Utc>) -> MemberMetrics {
    let (this_year, this_month) = (now.year(), now.month());
    let (last_year, last_month) = previous_month(this_year, this_month);

    let mut total_farm_area = 0.0;
    let mut active_contracts = 0;
    let mut new_this_month = 0;
    let mut new_last_month = 0;
    let mut provinces: std::collections::HashSet<&str> = std::collections::HashSet::new();

    for member in members {
        total_farm_area += parse_decimal_or_zero(member.farm_size.as_deref());

        if member.contract_status == ContractStatus::Active {
            active_contracts += 1;
        }

        if !member.province.is_empty() {
            provinces.insert(member.province.as_str());
        }

        let created = member.created_at;
        if created.year() == this_year && created.month() == this_month {
            new_this_month += 1;
        } else if created.year() == last_year && created.month() == last_month {
            new_last_month += 1;
        }
    }

    let metrics = MemberMetrics {
        total_members: members.len(),
        total_farm_area: round1(total_farm_area),
        active_contracts,
        provinces_covered: provinces.len(),
        new_this_month,
        new_last_month,
    };

    debug!(
        subsystem = "analytics",
        component = "metrics",
        op = "reduce",
        row_count = members.len(),
        total_farm_area = metrics.total_farm_area,
        "Reduced member snapshot"
    );

    metrics
}

/// Month-over-month registration growth in percent.
///
/// Undefined when last month had no registrations: returns `None`, which the
/// API renders as a neutral label. Never produces NaN or infinity.
pub fn growth_percent(new_this_month: usize, new_last_month: usize) -> Option<f64> {
    if new_last_month == 0 {
        return None;
    }
    let this = new_this_month as f64;
    let last = new_last_month as f64;
    Some(round1((this - last) / last * 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::member;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_total_farm_area_sums_valid_and_zeroes_invalid() {
        let now = at(2026, 8, 23);
        let mut a = member(at(2026, 1, 1));
        a.farm_size = Some("2.5".to_string());
        let mut b = member(at(2026, 1, 1));
        b.farm_size = Some("abc".to_string());
        let mut c = member(at(2026, 1, 1));
        c.farm_size = None;
        let mut d = member(at(2026, 1, 1));
        d.farm_size = Some("1.24".to_string());

        let metrics = reduce_members(&[a, b, c, d], now);
        assert_eq!(metrics.total_farm_area, 3.7);
    }

    #[test]
    fn test_active_contracts_never_exceed_total() {
        let now = at(2026, 8, 23);
        let mut a = member(at(2026, 1, 1));
        a.contract_status = ContractStatus::Active;
        let mut b = member(at(2026, 1, 1));
        b.contract_status = ContractStatus::Inactive;

        let metrics = reduce_members(&[a, b], now);
        assert_eq!(metrics.total_members, 2);
        assert_eq!(metrics.active_contracts, 1);
        assert!(metrics.active_contracts <= metrics.total_members);
    }

    #[test]
    fn test_provinces_are_case_sensitive_and_skip_empty() {
        let now = at(2026, 8, 23);
        let mut a = member(at(2026, 1, 1));
        a.province = "Harare".to_string();
        let mut b = member(at(2026, 1, 1));
        b.province = "harare".to_string();
        let mut c = member(at(2026, 1, 1));
        c.province = String::new();

        let metrics = reduce_members(&[a, b, c], now);
        assert_eq!(metrics.provinces_covered, 2);
    }

    #[test]
    fn test_month_windows() {
        let now = at(2026, 8, 23);
        let this = member(at(2026, 8, 2));
        let last = member(at(2026, 7, 31));
        let old = member(at(2026, 5, 1));
        // Same calendar month in a different year must not count.
        let other_year = member(at(2025, 8, 10));

        let metrics = reduce_members(&[this, last, old, other_year], now);
        assert_eq!(metrics.new_this_month, 1);
        assert_eq!(metrics.new_last_month, 1);
    }

    #[test]
    fn test_january_wraps_to_previous_december() {
        let now = at(2026, 1, 15);
        let december = member(at(2025, 12, 20));
        let january = member(at(2026, 1, 3));

        let metrics = reduce_members(&[december, january], now);
        assert_eq!(metrics.new_this_month, 1);
        assert_eq!(metrics.new_last_month, 1);
    }

    #[test]
    fn test_growth_percent_defined() {
        assert_eq!(growth_percent(3, 2), Some(50.0));
        assert_eq!(growth_percent(1, 2), Some(-50.0));
        assert_eq!(growth_percent(2, 2), Some(0.0));
    }

    #[test]
    fn test_growth_percent_undefined_when_last_month_zero() {
        assert_eq!(growth_percent(5, 0), None);
        assert_eq!(growth_percent(0, 0), None);
    }

    #[test]
    fn test_empty_snapshot() {
        let metrics = reduce_members(&[], at(2026, 8, 23));
        assert_eq!(metrics.total_members, 0);
        assert_eq!(metrics.total_farm_area, 0.0);
        assert_eq!(metrics.provinces_covered, 0);
    }
}
