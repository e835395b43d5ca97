use super::*;
use serde_json::json;

fn parse(s: &str) -> Color {
    s.parse().unwrap()
}

#[test]
fn parses_hex_forms() {
    assert_eq!(parse("#ff0000"), Color::rgba8(255, 0, 0, 255));
    assert_eq!(parse("#F00"), Color::rgba8(255, 0, 0, 255));
    assert_eq!(parse("#0000ff80").to_rgba8(), [0, 0, 255, 128]);
    assert_eq!(parse("#0f08").to_rgba8(), [0, 255, 0, 136]);
    assert!("#12345".parse::<Color>().is_err());
    assert!("#gg0000".parse::<Color>().is_err());
}

#[test]
fn parses_rgb_functions() {
    assert_eq!(parse("rgb(255, 128, 0)").to_rgba8(), [255, 128, 0, 255]);
    assert_eq!(parse("rgba(0,0,0,0.5)").to_rgba8(), [0, 0, 0, 128]);
    assert_eq!(parse("RGBA(100%, 0%, 0%, 50%)").to_rgba8(), [255, 0, 0, 128]);
    assert_eq!(parse("rgb(10 20 30 / 0.25)").to_rgba8(), [10, 20, 30, 64]);
    assert!("rgb(1, 2)".parse::<Color>().is_err());
    assert!("rgb(a, b, c)".parse::<Color>().is_err());
}

#[test]
fn parses_named_colors() {
    assert_eq!(parse("white").to_rgba8(), [255, 255, 255, 255]);
    assert_eq!(parse(" Orange ").to_rgba8(), [255, 165, 0, 255]);
    assert_eq!(parse("transparent"), Color::TRANSPARENT);
    assert!("notacolor".parse::<Color>().is_err());
}

#[test]
fn premul_conversion_scales_channels() {
    let c = parse("rgba(255, 255, 255, 0.5)").to_rgba8_premul();
    assert_eq!(c.to_array(), [128, 128, 128, 128]);
    assert!(Color::TRANSPARENT.to_rgba8_premul().is_transparent());
}

#[test]
fn deserializes_strings_objects_and_arrays() {
    let c: Color = serde_json::from_value(json!("#00ff00")).unwrap();
    assert_eq!(c, Color::rgba8(0, 255, 0, 255));

    let c: Color = serde_json::from_value(json!({"r": 0.25, "g": 0.5, "b": 0.75})).unwrap();
    assert_eq!(c, Color::rgba(0.25, 0.5, 0.75, 1.0));

    let c: Color = serde_json::from_value(json!([0.25, 0.5, 0.75, 0.9])).unwrap();
    assert_eq!(c, Color::rgba(0.25, 0.5, 0.75, 0.9));

    assert!(serde_json::from_value::<Color>(json!([1.0])).is_err());
    assert!(serde_json::from_value::<Color>(json!("nope")).is_err());
}
