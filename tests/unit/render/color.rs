use super::*;
use std::f64::consts::TAU;

fn max_channel_delta(a: Rgb8, b: Rgb8) -> u8 {
    a.r.abs_diff(b.r).max(a.g.abs_diff(b.g)).max(a.b.abs_diff(b.b))
}

fn assert_near(got: Rgb8, want: Rgb8) {
    assert!(max_channel_delta(got, want) <= 1, "{got:?} vs {want:?}");
}

#[test]
fn primary_directions() {
    assert_eq!(hue_color(Complex::new(1.0, 0.0)), Rgb8::new(255, 0, 0));
    // θ = π/3 is the sector 0/1 edge: yellow.
    assert_near(hue_color_from_arg(PI / 3.0 + 1e-12), Rgb8::new(255, 255, 0));
    assert_near(hue_color(Complex::new(-1.0, 0.0)), Rgb8::new(0, 255, 255));
    // θ = 4π/3 starts sector 4 with a zero ramp: blue.
    assert_near(hue_color_from_arg(4.0 * PI / 3.0 + 1e-12), Rgb8::new(0, 0, 255));
}

#[test]
fn magnitude_is_ignored() {
    for theta in [0.1, 1.0, 2.5, 4.0, 6.0] {
        let a = hue_color(Complex::from_polar(0.01, theta));
        let b = hue_color(Complex::from_polar(1e6, theta));
        assert_eq!(a, b);
    }
}

#[test]
fn sector_boundaries_are_continuous() {
    let eps = 1e-9;
    for k in 1..SECTORS {
        let edge = k as f64 * PI / 3.0;
        let below = hue_color_from_arg(edge - eps);
        let above = hue_color_from_arg(edge + eps);
        assert!(
            max_channel_delta(below, above) <= 1,
            "edge {k}: {below:?} vs {above:?}"
        );
    }
}

#[test]
fn full_turn_wraps_to_sector_zero() {
    let zero = hue_color_from_arg(0.0);
    assert_eq!(hue_color_from_arg(TAU), zero);
    assert!(max_channel_delta(hue_color_from_arg(TAU - 1e-9), zero) <= 1);
}

#[test]
fn out_of_table_angles_are_clamped() {
    assert_eq!(hue_color_from_arg(TAU * 3.0), Rgb8::new(255, 0, 0));
    assert_eq!(hue_color_from_arg(-1.0), hue_color_from_arg(0.0));
}

#[test]
fn non_finite_input_yields_fixed_color() {
    let nan = Complex::new(f64::NAN, f64::NAN);
    assert_eq!(hue_color(nan), Rgb8::new(255, 0, 0));
    let div = Complex::new(1.0, 2.0) / Complex::ZERO;
    assert_eq!(hue_color(div), hue_color(div));
}
