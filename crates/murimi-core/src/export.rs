//! CSV export of member records.
//!
//! The export is a header row of human-readable labels followed by one row per
//! record, with the column set chosen by the caller. Fields containing commas,
//! quotes, or newlines are double-quote-escaped; rows are joined with `\n`.
//!
//! The legacy "Excel" variant serves the identical CSV bytes under a
//! spreadsheet MIME type and an `.xlsx` filename. It is not a real binary
//! spreadsheet; it is kept only for clients that depend on the old labeling.

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::models::Member;

/// An exportable member column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberField {
    FirstName,
    LastName,
    NationalId,
    DateOfBirth,
    Gender,
    Phone,
    SecondaryPhone,
    Email,
    Province,
    District,
    Ward,
    Village,
    Cluster,
    FarmType,
    FarmSize,
    HasInsurance,
    ContractStatus,
    CreatedAt,
}

/// Every exportable column, in catalog order (the order used when no explicit
/// selection is given).
pub const ALL_MEMBER_FIELDS: &[MemberField] = &[
    MemberField::FirstName,
    MemberField::LastName,
    MemberField::NationalId,
    MemberField::DateOfBirth,
    MemberField::Gender,
    MemberField::Phone,
    MemberField::SecondaryPhone,
    MemberField::Email,
    MemberField::Province,
    MemberField::District,
    MemberField::Ward,
    MemberField::Village,
    MemberField::Cluster,
    MemberField::FarmType,
    MemberField::FarmSize,
    MemberField::HasInsurance,
    MemberField::ContractStatus,
    MemberField::CreatedAt,
];

impl MemberField {
    /// Stable selection key, as used in `?fields=` query strings.
    pub fn key(&self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::NationalId => "national_id",
            Self::DateOfBirth => "date_of_birth",
            Self::Gender => "gender",
            Self::Phone => "phone",
            Self::SecondaryPhone => "secondary_phone",
            Self::Email => "email",
            Self::Province => "province",
            Self::District => "district",
            Self::Ward => "ward",
            Self::Village => "village",
            Self::Cluster => "cluster",
            Self::FarmType => "farm_type",
            Self::FarmSize => "farm_size",
            Self::HasInsurance => "has_insurance",
            Self::ContractStatus => "contract_status",
            Self::CreatedAt => "created_at",
        }
    }

    /// Human-readable header label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::NationalId => "National ID",
            Self::DateOfBirth => "Date of Birth",
            Self::Gender => "Gender",
            Self::Phone => "Phone",
            Self::SecondaryPhone => "Secondary Phone",
            Self::Email => "Email",
            Self::Province => "Province",
            Self::District => "District",
            Self::Ward => "Ward",
            Self::Village => "Village",
            Self::Cluster => "Cluster",
            Self::FarmType => "Farm Type",
            Self::FarmSize => "Farm Size (ha)",
            Self::HasInsurance => "Insurance",
            Self::ContractStatus => "Contract Status",
            Self::CreatedAt => "Registered On",
        }
    }

    /// Look up a field by its selection key.
    pub fn from_key(key: &str) -> Option<Self> {
        ALL_MEMBER_FIELDS.iter().copied().find(|f| f.key() == key)
    }

    fn extract(&self, member: &Member) -> String {
        match self {
            Self::FirstName => member.first_name.clone(),
            Self::LastName => member.last_name.clone(),
            Self::NationalId => member.national_id.clone(),
            Self::DateOfBirth => member
                .date_of_birth
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            Self::Gender => member.gender.clone().unwrap_or_default(),
            Self::Phone => member.phone.clone(),
            Self::SecondaryPhone => member.secondary_phone.clone().unwrap_or_default(),
            Self::Email => member.email.clone().unwrap_or_default(),
            Self::Province => member.province.clone(),
            Self::District => member.district.clone(),
            Self::Ward => member.ward.clone(),
            Self::Village => member.village.clone(),
            Self::Cluster => member.cluster.clone(),
            Self::FarmType => member.farm_type.clone(),
            Self::FarmSize => member.farm_size.clone().unwrap_or_default(),
            Self::HasInsurance => if member.has_insurance { "Yes" } else { "No" }.to_string(),
            Self::ContractStatus => match member.contract_status {
                crate::models::ContractStatus::Active => "Active".to_string(),
                crate::models::ContractStatus::Inactive => "Inactive".to_string(),
            },
            Self::CreatedAt => member.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Parse a comma-separated list of field keys into a column selection.
///
/// An empty list selects every column. Unknown keys are rejected so a typo
/// can't silently drop a column from someone's export.
pub fn parse_field_selection(keys: &str) -> Result<Vec<MemberField>> {
    let trimmed = keys.trim();
    if trimmed.is_empty() {
        return Ok(ALL_MEMBER_FIELDS.to_vec());
    }
    trimmed
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| {
            MemberField::from_key(k)
                .ok_or_else(|| Error::InvalidInput(format!("Unknown export field: '{}'", k)))
        })
        .collect()
}

/// Quote a CSV field when it contains a comma, quote, or newline.
/// Embedded quotes are doubled.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Serialize members to CSV with the given column selection.
///
/// Output is the header row of labels followed by one row per member,
/// joined by `\n`.
pub fn members_to_csv(members: &[Member], fields: &[MemberField]) -> String {
    let header = fields
        .iter()
        .map(|f| csv_field(f.label()))
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = Vec::with_capacity(members.len() + 1);
    lines.push(header);
    for member in members {
        let row = fields
            .iter()
            .map(|f| csv_field(&f.extract(member)))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(row);
    }
    lines.join("\n")
}

/// Export content labeling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Honest CSV: `text/csv`, `.csv`.
    #[default]
    Csv,
    /// Legacy spreadsheet labeling: the same CSV bytes served as
    /// `application/vnd.ms-excel` with an `.xlsx` filename.
    Excel,
}

impl ExportFormat {
    /// Parse the `?format=` query value. Unknown values are rejected.
    pub fn from_query(value: &str) -> Result<Self> {
        match value {
            "csv" => Ok(Self::Csv),
            "excel" => Ok(Self::Excel),
            other => Err(Error::InvalidInput(format!(
                "Unknown export format: '{}' (expected 'csv' or 'excel')",
                other
            ))),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Excel => "application/vnd.ms-excel",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "xlsx",
        }
    }

    /// Date-stamped download filename, e.g. `members_export_2026-08-23.csv`.
    pub fn filename(&self, date: NaiveDate) -> String {
        format!(
            "members_export_{}.{}",
            date.format("%Y-%m-%d"),
            self.extension()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContractStatus;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn member(first: &str, last: &str) -> Member {
        Member {
            id: Uuid::new_v4(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            national_id: "63-123456A18".to_string(),
            date_of_birth: None,
            gender: None,
            phone: "+263771234567".to_string(),
            secondary_phone: None,
            email: None,
            province: "Harare".to_string(),
            district: "Harare".to_string(),
            ward: "12".to_string(),
            village: "Glen View".to_string(),
            cluster: "Mhondoro North".to_string(),
            farm_type: "mixed_crops".to_string(),
            farm_size: Some("2.5".to_string()),
            has_insurance: false,
            contract_status: ContractStatus::Active,
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_two_column_export_exact_bytes() {
        let members = vec![member("Jane", "Moyo"), member("Tom", "Banda")];
        let fields = [MemberField::FirstName, MemberField::LastName];
        let csv = members_to_csv(&members, &fields);
        assert_eq!(csv, "First Name,Last Name\nJane,Moyo\nTom,Banda");
    }

    #[test]
    fn test_field_with_comma_is_quoted() {
        let mut m = member("Jane", "Moyo");
        m.village = "Glen View, Area 8".to_string();
        let csv = members_to_csv(&[m], &[MemberField::Village]);
        assert_eq!(csv, "Village\n\"Glen View, Area 8\"");
    }

    #[test]
    fn test_embedded_quote_is_doubled() {
        let mut m = member("Jane", "Moyo");
        m.village = "kwaMai \"Gogo\"".to_string();
        let csv = members_to_csv(&[m], &[MemberField::Village]);
        assert_eq!(csv, "Village\n\"kwaMai \"\"Gogo\"\"\"");
    }

    #[test]
    fn test_empty_member_list_yields_header_only() {
        let csv = members_to_csv(&[], &[MemberField::FirstName, MemberField::Cluster]);
        assert_eq!(csv, "First Name,Cluster");
    }

    #[test]
    fn test_optional_fields_export_empty() {
        let m = member("Jane", "Moyo");
        let csv = members_to_csv(&[m], &[MemberField::Email, MemberField::Gender]);
        assert_eq!(csv, "Email,Gender\n,");
    }

    #[test]
    fn test_parse_field_selection() {
        let fields = parse_field_selection("first_name, last_name").unwrap();
        assert_eq!(fields, vec![MemberField::FirstName, MemberField::LastName]);
    }

    #[test]
    fn test_parse_field_selection_empty_selects_all() {
        let fields = parse_field_selection("").unwrap();
        assert_eq!(fields.len(), ALL_MEMBER_FIELDS.len());
    }

    #[test]
    fn test_parse_field_selection_unknown_key_rejected() {
        let err = parse_field_selection("first_name,surname").unwrap_err();
        assert!(err.to_string().contains("surname"));
    }

    #[test]
    fn test_format_content_types() {
        assert_eq!(ExportFormat::Csv.content_type(), "text/csv; charset=utf-8");
        assert_eq!(
            ExportFormat::Excel.content_type(),
            "application/vnd.ms-excel"
        );
    }

    #[test]
    fn test_format_filenames_are_date_stamped() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        assert_eq!(
            ExportFormat::Csv.filename(date),
            "members_export_2026-08-23.csv"
        );
        assert_eq!(
            ExportFormat::Excel.filename(date),
            "members_export_2026-08-23.xlsx"
        );
    }

    #[test]
    fn test_format_from_query() {
        assert_eq!(ExportFormat::from_query("csv").unwrap(), ExportFormat::Csv);
        assert_eq!(
            ExportFormat::from_query("excel").unwrap(),
            ExportFormat::Excel
        );
        assert!(ExportFormat::from_query("xlsx").is_err());
    }
}
