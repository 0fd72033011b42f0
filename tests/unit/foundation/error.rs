use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LayergenError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(LayergenError::parse("x").to_string().contains("parse error:"));
    assert!(LayergenError::fetch("x").to_string().contains("fetch error:"));
    assert!(
        LayergenError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert!(LayergenError::write("x").to_string().contains("write error:"));
}

#[test]
fn stage_names_follow_variant() {
    assert_eq!(LayergenError::validation("x").stage(), "validate");
    assert_eq!(LayergenError::write("x").stage(), "write");
    let err: LayergenError = serde_json::from_str::<serde_json::Value>("{")
        .unwrap_err()
        .into();
    assert_eq!(err.stage(), "parse");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LayergenError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
