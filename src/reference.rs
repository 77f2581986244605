//! Fixed reference tables for the publication.
//!
//! Every enumeration the breakdown families depend on lives here exactly once:
//! the staff-group ignore-list, the closed set of absence reason labels, the
//! disclosure control threshold, the literal labels injected into output rows,
//! the excluded organisation codes assumed by the record source, and the
//! display orders of the tagged workbook tables.

use rust_decimal::Decimal;

use crate::error::{PublicationError, PublicationResult};

/// Rows with this many FTE days available or fewer are suppressed.
pub const SUPPRESSION_THRESHOLD_DAYS: i64 = 330;

/// Returns the suppression threshold as a decimal day count.
pub fn suppression_threshold() -> Decimal {
    Decimal::from(SUPPRESSION_THRESHOLD_DAYS)
}

/// Number of decimal places absence rates are published to.
pub const RATE_DECIMAL_PLACES: u32 = 2;

/// Serialized form of a not-applicable cell in CSV outputs.
pub const NOT_APPLICABLE_SENTINEL: &str = "9999";

/// Serialized form of a not-applicable cell in workbook sub-tables.
pub const WORKBOOK_NOT_APPLICABLE: &str = ".";

/// Staff groups excluded from every named staff-group breakdown.
pub const IGNORED_STAFF_GROUPS: &[&str] = &["General payments", "Unknown", "Non-funded staff"];

/// Breakdown value of the national total in the sickness rates table.
pub const ALL_ENGLAND: &str = "ALL_ENGLAND";
/// Staff group label of all-staff rows.
pub const ALL_STAFF_GROUPS: &str = "All staff groups";
/// Reason label of rows computed without reason filtering.
pub const ALL_REASONS: &str = "ALL REASONS";
/// Region label of England-level COVID rows.
pub const ALL_NHSE_REGIONS: &str = "All NHSE regions";
/// Organisation label of England- and region-level COVID rows.
pub const ALL_ORGANISATIONS: &str = "All organisations";
/// Minor staff group holding the medical grades.
pub const HCHS_DOCTORS: &str = "HCHS Doctors";
/// Breed value of medical staff.
pub const MEDICAL_BREED: &str = "Med";
/// Related-reason prefix marking a COVID absence.
pub const COVID_REASON_PREFIX: &str = "Coronavirus (COVID-19)";
/// Organisation type with no reporting organisations.
pub const SPECIAL_HEALTH_AUTHORITY: &str = "Special Health Authority";
/// Raw staff group label relabelled in the benchmarking tool.
pub const UNKNOWN_STAFF_GROUP: &str = "Unknown";
/// Published replacement for [`UNKNOWN_STAFF_GROUP`].
pub const UNKNOWN_STAFF_GROUP_LABEL: &str = "Other staff or those with unknown classification";

/// The closed set of absence reasons published in the reason-by-staff table.
pub const ABSENCE_REASONS: &[&str] = &[
    "S10 Anxiety/stress/depression/other psychiatric illnesses",
    "S11 Back Problems",
    "S12 Other musculoskeletal problems",
    "S13 Cold Cough Flu - Influenza",
    "S14 Asthma",
    "S15 Chest & respiratory problems",
    "S16 Headache / migraine",
    "S17 Benign and malignant tumours cancers",
    "S18 Blood disorders",
    "S19 Heart cardiac & circulatory problems",
    "S20 Burns poisoning frostbite hypothermia",
    "S21 Ear nose throat (ENT)",
    "S22 Dental and oral problems",
    "S23 Eye problems",
    "S24 Endocrine / glandular problems",
    "S25 Gastrointestinal problems",
    "S26 Genitourinary & gynaecological disorders",
    "S27 Infectious diseases",
    "S28 Injury fracture",
    "S29 Nervous system disorders",
    "S30 Pregnancy related disorders",
    "S31 Skin disorders",
    "S32 Substance abuse",
    "S98 Other known causes - not elsewhere classified",
    "S99 Unknown causes / Not specified",
];

/// Organisation codes the record source must already have removed.
pub const EXCLUDED_ORG_CODES: &[&str] = &["8HK67", "8J318", "8J149", "NL1"];

/// Organisation code prefixes the record source must already have removed.
pub const EXCLUDED_ORG_PREFIXES: &[char] = &['5', 'Q'];

/// Column order of workbook Table 1 (rates by region).
pub const TABLE_1_REGION_ORDER: &[&str] = &[
    ALL_ENGLAND,
    "London",
    "South West",
    "South East",
    "Midlands",
    "East of England",
    "North West",
    "North East and Yorkshire",
    "Special Health Authorities and other statutory bodies",
];

/// Row order of workbook Table 2 (rates by staff group and grade).
pub const TABLE_2_STAFF_ORDER: &[&str] = &[
    ALL_ENGLAND,
    "Professionally qualified clinical staff",
    HCHS_DOCTORS,
    "Consultant",
    "Associate Specialist",
    "Specialty Doctor",
    "Staff Grade",
    "Specialty Registrar",
    "Core Training",
    "Foundation Doctor Year 2",
    "Foundation Doctor Year 1",
    "Hospital Practitioner / Clinical Assistant",
    "Other and Local HCHS Doctor Grades",
    "Nurses & health visitors",
    "Midwives",
    "Ambulance staff",
    "Scientific, therapeutic & technical staff",
    "Support to clinical staff",
    "Support to doctors, nurses & midwives",
    "Support to ambulance staff",
    "Support to ST&T staff",
    "NHS infrastructure support",
    "Central functions",
    "Hotel, property & estates",
    "Senior managers",
    "Managers",
    UNKNOWN_STAFF_GROUP_LABEL,
];

/// Column order of workbook Table 3 (rates by organisation type).
pub const TABLE_3_ORG_TYPE_ORDER: &[&str] = &[
    ALL_ENGLAND,
    "Acute",
    "Ambulance",
    "Clinical Commissioning Group",
    "Commissioning Support Unit",
    "Community Provider Trust",
    "Mental Health",
    SPECIAL_HEALTH_AUTHORITY,
    "Others",
];

/// Returns true when `group` is on the staff-group ignore-list.
pub fn is_ignored_staff_group(group: &str) -> bool {
    IGNORED_STAFF_GROUPS.contains(&group)
}

/// Resolves a raw attendance reason to its published reason label.
///
/// Source systems decorate reason labels, so the match is a substring match
/// against the closed list. The first listed label contained in `raw` wins.
///
/// # Errors
///
/// Returns [`PublicationError::UnknownBreakdownValue`] when `raw` contains
/// none of the known labels.
///
/// # Example
///
/// ```
/// use absence_rates::reference::known_reason;
///
/// assert_eq!(known_reason("S11 Back Problems").unwrap(), "S11 Back Problems");
/// assert!(known_reason("Bereavement").is_err());
/// ```
pub fn known_reason(raw: &str) -> PublicationResult<&'static str> {
    ABSENCE_REASONS
        .iter()
        .copied()
        .find(|reason| raw.contains(reason))
        .ok_or_else(|| PublicationError::UnknownBreakdownValue {
            field: "attendance_reason".to_string(),
            value: raw.to_string(),
        })
}

/// Returns true when an organisation code breaches the record source scope.
pub fn is_excluded_org_code(code: &str) -> bool {
    EXCLUDED_ORG_CODES.contains(&code)
        || code
            .chars()
            .next()
            .is_some_and(|first| EXCLUDED_ORG_PREFIXES.contains(&first))
}
