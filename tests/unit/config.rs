use super::*;

#[test]
fn defaults_match_reference_animation() {
    let cfg = AnimationConfig::default();
    assert_eq!((cfg.width, cfg.height), (2560, 1440));
    assert_eq!(cfg.pixel_format, PixelFormat::Rgb0);
    assert_eq!(cfg.bit_rate, 24_000_000);
    assert_eq!(cfg.gop_size, 30);
    assert_eq!(cfg.time_base(), Rational { num: 1, den: 60 });
    assert_eq!(cfg.preset.as_deref(), Some("slow"));
    assert_eq!(cfg.codec, "h264_nvenc");
    assert_eq!(cfg.frame_count, 3000);
    assert_eq!(cfg.threads, 12);
    assert_eq!(cfg.formula, FormulaKind::RationalPower);
    cfg.validate().unwrap();
}

#[test]
fn partial_json_falls_back_to_defaults() {
    let cfg = AnimationConfig::from_json_str(
        r#"{"width": 64, "height": 32, "formula": "polynomial_blend", "fps": {"num": 30, "den": 1}}"#,
    )
    .unwrap();
    assert_eq!(cfg.canvas(), Canvas { width: 64, height: 32 });
    assert_eq!(cfg.formula, FormulaKind::PolynomialBlend);
    assert_eq!(cfg.fps, Rational { num: 30, den: 1 });
    assert_eq!(cfg.frame_count, 3000);
    cfg.validate().unwrap();
}

#[test]
fn unknown_fields_are_serde_errors() {
    let err = AnimationConfig::from_json_str(r#"{"widht": 64}"#).unwrap_err();
    assert!(matches!(err, ArgandError::Serde(_)));
}

#[test]
fn validate_rejects_bad_knobs() {
    let bad = [
        AnimationConfig {
            width: 63,
            ..AnimationConfig::default()
        },
        AnimationConfig {
            height: 0,
            ..AnimationConfig::default()
        },
        AnimationConfig {
            fps: Rational { num: 60, den: 0 },
            ..AnimationConfig::default()
        },
        AnimationConfig {
            frame_count: 0,
            ..AnimationConfig::default()
        },
        AnimationConfig {
            gop_size: 0,
            ..AnimationConfig::default()
        },
        AnimationConfig {
            threads: 0,
            ..AnimationConfig::default()
        },
        AnimationConfig {
            scale: f64::NAN,
            ..AnimationConfig::default()
        },
        AnimationConfig {
            codec: " ".to_string(),
            ..AnimationConfig::default()
        },
    ];
    for cfg in bad {
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ArgandError::Validation(_)), "{cfg:?}");
    }
}

#[test]
fn from_json_file_reports_missing_file() {
    let err = AnimationConfig::from_json_file("target/config_unit/does-not-exist.json").unwrap_err();
    assert!(matches!(err, ArgandError::Other(_)));
    assert!(err.to_string().contains("does-not-exist.json"));
}

#[test]
fn from_json_file_validates() {
    let dir = std::path::Path::new("target/config_unit");
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join("odd.json");
    std::fs::write(&path, r#"{"width": 65, "height": 64}"#).unwrap();
    assert!(AnimationConfig::from_json_file(&path).is_err());
}

#[test]
fn encoder_options_follow_config() {
    let cfg = AnimationConfig {
        width: 64,
        height: 64,
        lookahead: 2,
        ..AnimationConfig::default()
    };
    let opts = cfg.ffmpeg_encoder_opts();
    assert_eq!(opts.codec_name, "h264_nvenc");
    assert_eq!(opts.bit_rate, 24_000_000);
    assert_eq!(opts.frame_rate, cfg.fps);

    let raw = cfg.raw_encoder().unwrap();
    assert_eq!(raw.queued(), 0);
}
