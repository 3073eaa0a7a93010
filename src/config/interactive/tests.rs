use super::*;

#[test]
fn api_key_status_reporting() {
    assert_eq!(api_key_status(None), "not set");
    assert_eq!(api_key_status(Some("")), "not set");
    assert_eq!(api_key_status(Some("  ")), "not set");
    assert_eq!(api_key_status(Some("gsk_example")), "set");
}
