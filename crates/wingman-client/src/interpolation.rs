// interpolation.rs — renders remote entities slightly in the past,
// smoothing over jitter and loss in the position updates they arrive as:
// an `INTERPOLATION_DELAY` of 50 ms, linear interpolation between the two
// `StateHistory` samples bracketing render time, and capped extrapolation
// when render time outruns the newest sample. The local player is exempt
// — see [`crate::prediction`].

use wingman_ecs::components::StateSample;

/// Render time trails the most recent sample by this much.
pub const INTERPOLATION_DELAY: f64 = 0.05;

/// Extrapolation factor cap, keyed by the distance between the two
/// newest samples: a remote entity moving fast between updates is
/// extrapolated more conservatively than one moving slowly.
fn extrapolation_cap(sample_distance: f32) -> f32 {
    if sample_distance >= 20.0 {
        0.95
    } else if sample_distance >= 10.0 {
        1.0
    } else if sample_distance >= 5.0 {
        1.05
    } else {
        1.15
    }
}

/// Interpolate (or cautiously extrapolate) a remote entity's render
/// position from its `StateHistory` snapshot at time `now` (same clock as
/// the samples' `t`, i.e. server seconds). Returns `None` for an entity
/// with no samples yet.
pub fn interpolate(samples: &[StateSample], now: f64) -> Option<(f32, f32)> {
    let newest = samples.last()?;
    if samples.len() == 1 {
        return Some((newest.x, newest.y));
    }
    let render_time = now - INTERPOLATION_DELAY;

    if render_time >= newest.t {
        let prev = samples[samples.len() - 2];
        let dt = newest.t - prev.t;
        if dt <= 0.0 {
            return Some((newest.x, newest.y));
        }
        let dx = newest.x - prev.x;
        let dy = newest.y - prev.y;
        let cap = extrapolation_cap((dx * dx + dy * dy).sqrt());
        let alpha = (((render_time - prev.t) / dt) as f32).min(cap);
        return Some((prev.x + dx * alpha, prev.y + dy * alpha));
    }

    let oldest = samples[0];
    if render_time <= oldest.t {
        return Some((oldest.x, oldest.y));
    }

    for pair in samples.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.t <= render_time && render_time <= b.t {
            let dt = b.t - a.t;
            let alpha = if dt > 0.0 { ((render_time - a.t) / dt) as f32 } else { 0.0 };
            return Some((a.x + (b.x - a.x) * alpha, a.y + (b.y - a.y) * alpha));
        }
    }

    Some((newest.x, newest.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f32, t: f64) -> StateSample {
        StateSample { x, y: 0.0, t }
    }

    #[test]
    fn no_samples_returns_none() {
        assert!(interpolate(&[], 1.0).is_none());
    }

    #[test]
    fn single_sample_returns_it_verbatim() {
        let samples = [sample(10.0, 1.0)];
        assert_eq!(interpolate(&samples, 5.0), Some((10.0, 0.0)));
    }

    #[test]
    fn interpolates_between_bracketing_samples() {
        let samples = [sample(0.0, 0.0), sample(10.0, 0.1)];
        let (x, _) = interpolate(&samples, 0.1).unwrap();
        // render_time = 0.1 - 0.05 = 0.05, halfway between t=0 and t=0.1.
        assert!((x - 5.0).abs() < 0.01);
    }

    #[test]
    fn render_time_before_oldest_sample_clamps_to_it() {
        let samples = [sample(0.0, 1.0), sample(10.0, 1.1)];
        let (x, _) = interpolate(&samples, 1.02).unwrap();
        assert_eq!(x, 0.0);
    }

    #[test]
    fn fast_motion_caps_extrapolation_tighter_than_slow_motion() {
        let fast = [sample(0.0, 0.0), sample(30.0, 0.1)];
        let slow = [sample(0.0, 0.0), sample(2.0, 0.1)];
        // Push render_time well past the newest sample for both.
        let now = 0.3;
        let (fx, _) = interpolate(&fast, now).unwrap();
        let (sx, _) = interpolate(&slow, now).unwrap();
        // Fast-moving pair is capped at 0.95x the per-sample delta per
        // extrapolated step, slow-moving at 1.15x — so the slow case
        // should have extrapolated proportionally further past its delta.
        let fast_alpha_equiv = fx / 30.0;
        let slow_alpha_equiv = sx / 2.0;
        assert!(slow_alpha_equiv > fast_alpha_equiv);
    }
}
