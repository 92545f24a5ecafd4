use regex::Regex;
use std::sync::LazyLock;

static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z]+)").unwrap());

/// A domain term that looks like a camel-case compound but names a single
/// column. It is never split.
pub const RESERVED_IDENTIFIER: &str = "patientpomr";

/// `dischargeNurseRequest` -> `discharge_nurse_request`, `patientID` -> `patient_id`.
pub fn camel_to_snake(identifier: &str) -> String {
    if identifier.eq_ignore_ascii_case(RESERVED_IDENTIFIER) {
        return identifier.to_lowercase();
    }
    CAMEL_BOUNDARY
        .replace_all(identifier, "${1}_${2}")
        .to_lowercase()
}

/// Whether two identifiers name the same column once converted.
pub fn same_column(a: &str, b: &str) -> bool {
    camel_to_snake(a) == camel_to_snake(b)
}
