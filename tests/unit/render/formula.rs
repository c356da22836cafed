use super::*;

#[test]
fn viewport_is_centered_and_flipped() {
    let vp = Viewport::centered(
        Canvas {
            width: 8,
            height: 4,
        },
        0.5,
    );
    assert_eq!(vp.to_plane(4, 2), Complex::ZERO);
    assert_eq!(vp.to_plane(0, 2), Complex::new(-2.0, 0.0));
    assert_eq!(vp.to_plane(4, 0), Complex::new(0.0, 1.0));
    // Moving down the raster moves down the imaginary axis.
    assert!(vp.to_plane(4, 3).im < 0.0);
}

#[test]
fn rational_power_first_frame_has_no_power_term() {
    let f = RationalPower::default();
    let z = Complex::new(0.5, -0.25);
    let expected = (z * z - Complex::ONE) / (z * z + Complex::new(2.0, 2.0));
    let got = f.eval(z, FrameIndex(0));
    assert!((got.re - expected.re).abs() < 1e-12);
    assert!((got.im - expected.im).abs() < 1e-12);
}

#[test]
fn rational_power_pole_propagates_non_finite() {
    let f = RationalPower::default();
    // z² = -2 - 2i makes the denominator vanish; z = sqrt of that.
    let z = Complex::new(-2.0, -2.0).powf(0.5);
    let out = f.eval(z, FrameIndex(3));
    assert!(!out.is_finite() || out.norm() > 1e6);
}

#[test]
fn polynomial_blend_moves_from_square_to_cube() {
    let f = PolynomialBlend { frame_count: 10 };
    let z = Complex::new(1.5, 0.5);
    assert_eq!(f.eval(z, FrameIndex(0)), z * z);
    let end = f.eval(z, FrameIndex(10));
    let cube = z * z * z;
    assert!((end.re - cube.re).abs() < 1e-12 && (end.im - cube.im).abs() < 1e-12);

    let empty = PolynomialBlend { frame_count: 0 };
    assert_eq!(empty.eval(z, FrameIndex(4)), z * z);
}

#[test]
fn closures_are_formulas() {
    let f: Arc<dyn Formula> = Arc::new(|z: Complex, i: FrameIndex| z * (i.0 as f64));
    assert_eq!(
        f.eval(Complex::new(1.0, 1.0), FrameIndex(2)),
        Complex::new(2.0, 2.0)
    );
}

#[test]
fn kind_round_trips_through_json() {
    let kind: FormulaKind = serde_json::from_str("\"polynomial_blend\"").unwrap();
    assert_eq!(kind, FormulaKind::PolynomialBlend);
    let z = Complex::new(0.2, 0.3);
    assert_eq!(kind.build(4).eval(z, FrameIndex(0)), z * z);
}
