use jpa_sampler::entity_catalog::camel_to_snake;
use jpa_sampler::entity_catalog::naming::RESERVED_IDENTIFIER;
use test_case::test_case;

#[test_case("hospitalGroupId", "hospital_group_id")]
#[test_case("dischargeNurseRequest", "discharge_nurse_request")]
#[test_case("bedNO", "bed_no")]
#[test_case("a", "a")]
#[test_case("ward_id", "ward_id")]
fn converts_field_names(input: &str, expected: &str) {
    assert_eq!(camel_to_snake(input), expected);
}

#[test]
fn reserved_identifier_is_never_split() {
    for spelling in ["patientPomr", "patientPOMR", "PatientPomr", "patientpomr"] {
        assert_eq!(camel_to_snake(spelling), RESERVED_IDENTIFIER);
    }
}

#[test]
fn conversion_is_idempotent() {
    for input in ["hospitalId", "dischargeNurseRequest", "bedNO", "x", "aBcDe"] {
        let once = camel_to_snake(input);
        assert_eq!(camel_to_snake(&once), once, "not idempotent for {}", input);
    }
}
