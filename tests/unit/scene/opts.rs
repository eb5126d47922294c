use super::*;

#[test]
fn defaults_match_hd() {
    let opts = SceneOpts::default();
    assert_eq!(opts.resolution, Resolution::HD);
    assert_eq!(opts.layout_epsilon, 0.25);
    assert_eq!(opts.line_spacing(), 8.0);
    assert_eq!(opts.system_font_size("MediumSystemFont"), 24.0);
}

#[test]
fn fhd_scales_metrics() {
    let opts = SceneOpts::from_json_str(r#"{"resolution":"FHD"}"#).expect("opts");
    assert_eq!(opts.resolution.scene_rect(), Rect2D::new(0.0, 0.0, 1920.0, 1080.0));
    assert_eq!(opts.line_spacing(), 12.0);
    assert_eq!(opts.system_font_size("LargeBoldSystemFont"), 45.0);
}

#[test]
fn line_spacing_override_wins() {
    let opts = SceneOpts::from_json_str(r#"{"label_line_spacing":3}"#).expect("opts");
    assert_eq!(opts.line_spacing(), 3.0);
}

#[test]
fn rejects_negative_epsilon_and_unknown_keys() {
    let err = SceneOpts::from_json_str(r#"{"layout_epsilon":-1}"#).expect_err("negative");
    assert!(err.to_string().starts_with("validation error:"));
    assert!(SceneOpts::from_json_str(r#"{"dpi":2}"#).is_err());
}
