use std::f64::consts::PI;

/// Easing curves for tween animations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    /// Material "standard" curve, `cubic-bezier(0.4, 0, 0.2, 1)`
    FastOutSlowIn,
    /// `cubic-bezier(0, 0, 0.2, 1)`
    LinearOutSlowIn,
    /// `cubic-bezier(0.4, 0, 1, 1)`
    FastOutLinearIn,
    EaseInOutSine,
    EaseOutCubic,
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },
}

impl Easing {
    /// Apply the easing curve to a normalized time value (0.0 to 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::FastOutSlowIn => cubic_bezier_ease(0.4, 0.0, 0.2, 1.0, t),
            Easing::LinearOutSlowIn => cubic_bezier_ease(0.0, 0.0, 0.2, 1.0, t),
            Easing::FastOutLinearIn => cubic_bezier_ease(0.4, 0.0, 1.0, 1.0, t),
            Easing::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::CubicBezier { x1, y1, x2, y2 } => cubic_bezier_ease(x1, y1, x2, y2, t),
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Easing::FastOutSlowIn
    }
}

/// One coordinate of a cubic bezier through `p0..p3` at parameter `t`
pub fn bezier_cubic(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    let tt = t * t;
    let uu = u * u;
    uu * u * p0 + 3.0 * uu * t * p1 + 3.0 * u * tt * p2 + tt * t * p3
}

/// CSS-style timing curve anchored at (0, 0) and (1, 1).
///
/// Finds the curve parameter whose x equals `fraction` by bisection, then
/// reads y at that parameter. x is monotonic for control x values in [0, 1].
fn cubic_bezier_ease(x1: f64, y1: f64, x2: f64, y2: f64, fraction: f64) -> f64 {
    if fraction <= 0.0 {
        return 0.0;
    }
    if fraction >= 1.0 {
        return 1.0;
    }

    let mut low = 0.0;
    let mut high = 1.0;
    let mut t = fraction;
    for _ in 0..64 {
        let x = bezier_cubic(0.0, x1, x2, 1.0, t);
        if (x - fraction).abs() < 1e-9 {
            break;
        }
        if x < fraction {
            low = t;
        } else {
            high = t;
        }
        t = (low + high) * 0.5;
    }
    bezier_cubic(0.0, y1, y2, 1.0, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_are_fixed() {
        for easing in [
            Easing::Linear,
            Easing::FastOutSlowIn,
            Easing::LinearOutSlowIn,
            Easing::FastOutLinearIn,
            Easing::EaseInOutSine,
            Easing::EaseOutCubic,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-9, "{easing:?}");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9, "{easing:?}");
            assert!((easing.apply(1.5) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fast_out_slow_in_shape() {
        let easing = Easing::FastOutSlowIn;
        // Most of the travel happens in the first half
        assert!(easing.apply(0.5) > 0.7);
        let mut previous = 0.0;
        for i in 1..=100 {
            let value = easing.apply(i as f64 / 100.0);
            assert!(value >= previous);
            previous = value;
        }
    }

    #[test]
    fn test_linear_bezier_is_identity() {
        let linear = Easing::CubicBezier {
            x1: 0.25,
            y1: 0.25,
            x2: 0.75,
            y2: 0.75,
        };
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert!((linear.apply(t) - t).abs() < 1e-6);
        }
    }

    #[test]
    fn test_bezier_cubic() {
        assert_eq!(bezier_cubic(0.0, 0.0, 1.0, 1.0, 0.5), 0.5);
        assert_eq!(bezier_cubic(2.0, 5.0, -3.0, 7.0, 0.0), 2.0);
        assert_eq!(bezier_cubic(2.0, 5.0, -3.0, 7.0, 1.0), 7.0);
    }
}
