use mfa_core::{from_json_slice, stable_hash_string, to_canonical_json_bytes, Interaction};
use serde_json::json;

#[test]
fn canonical_json_sorts_keys() {
    let value = json!({"zeta": 1, "alpha": {"b": 2, "a": 1}});
    let bytes = to_canonical_json_bytes(&value).expect("json");
    assert_eq!(
        String::from_utf8(bytes).expect("utf8"),
        r#"{"alpha":{"a":1,"b":2},"zeta":1}"#
    );
}

#[test]
fn interaction_round_trips_and_hashes_stably() {
    let j = Interaction::from_rows(vec![vec![0.0, -1.0], vec![-1.0, 0.0]]).expect("valid");
    let bytes = to_canonical_json_bytes(&j).expect("encode");
    let decoded: Interaction = from_json_slice(&bytes).expect("decode");
    assert_eq!(decoded, j);
    assert_eq!(
        stable_hash_string(&j).expect("hash"),
        stable_hash_string(&decoded).expect("hash")
    );
}

#[test]
fn invalid_interaction_json_is_rejected() {
    let bytes = br#"[[0.0, 1.0], [2.0, 0.0]]"#;
    assert!(from_json_slice::<Interaction>(bytes).is_err());
}
