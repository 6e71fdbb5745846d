/// Lowest blend factor; keeps the filter from freezing at smoothing = 1.
const MIN_ALPHA: f32 = 0.02;

/// EMA filter over a skeleton's 3D keypoints.
///
/// Keypoints are filtered component-wise. A keypoint that disappears (NaN)
/// is reported as NaN, and its last known value is kept so that it blends
/// back in when observed again.
pub struct SkeletonSmoother {
    alpha: f32,
    prev: Option<Vec<[f32; 3]>>,
}

impl SkeletonSmoother {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(MIN_ALPHA, 1.0),
            prev: None,
        }
    }

    /// `smoothing` follows the runtime parameter: 0 is raw, 1 is heaviest.
    pub fn from_smoothing(smoothing: f32) -> Self {
        Self::new(1.0 - smoothing)
    }

    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.alpha = (1.0 - smoothing).clamp(MIN_ALPHA, 1.0);
    }

    pub fn apply(&mut self, keypoints: &[[f32; 3]]) -> Vec<[f32; 3]> {
        if self.prev.as_ref().map_or(true, |p| p.len() != keypoints.len()) {
            self.prev = Some(keypoints.to_vec());
            return keypoints.to_vec();
        }

        let a = self.alpha;
        let Some(prev) = self.prev.as_mut() else {
            return keypoints.to_vec();
        };

        let mut out = Vec::with_capacity(keypoints.len());
        for (state, kp) in prev.iter_mut().zip(keypoints) {
            if !is_observed(kp) {
                out.push([f32::NAN; 3]);
                continue;
            }
            if is_observed(state) {
                *state = [
                    a * kp[0] + (1.0 - a) * state[0],
                    a * kp[1] + (1.0 - a) * state[1],
                    a * kp[2] + (1.0 - a) * state[2],
                ];
            } else {
                *state = *kp;
            }
            out.push(*state);
        }
        out
    }

    pub fn reset(&mut self) {
        self.prev = None;
    }
}

fn is_observed(p: &[f32; 3]) -> bool {
    p.iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: &[f32; 3], b: &[f32; 3], eps: f32) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < eps)
    }

    #[test]
    fn test_first_frame_passthrough() {
        let mut s = SkeletonSmoother::from_smoothing(0.7);
        let kps = vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        assert_eq!(s.apply(&kps), kps);
    }

    #[test]
    fn test_no_smoothing() {
        let mut s = SkeletonSmoother::from_smoothing(0.0);
        s.apply(&[[0.0, 0.0, 0.0]]);
        let out = s.apply(&[[1.0, 2.0, 3.0]]);
        assert!(approx_eq(&out[0], &[1.0, 2.0, 3.0], 1e-6));
    }

    #[test]
    fn test_half_smoothing() {
        let mut s = SkeletonSmoother::from_smoothing(0.5);
        s.apply(&[[0.0, 0.0, 0.0]]);
        let out = s.apply(&[[2.0, 4.0, 6.0]]);
        assert!(approx_eq(&out[0], &[1.0, 2.0, 3.0], 1e-6));
    }

    #[test]
    fn test_full_smoothing_still_moves() {
        let mut s = SkeletonSmoother::from_smoothing(1.0);
        s.apply(&[[0.0, 0.0, 0.0]]);
        let out = s.apply(&[[1.0, 1.0, 1.0]]);
        assert!(out[0][0] > 0.0);
        assert!(out[0][0] < 0.1);
    }

    #[test]
    fn test_missing_keypoint_stays_missing_and_recovers() {
        let mut s = SkeletonSmoother::from_smoothing(0.5);
        s.apply(&[[0.0, 0.0, 0.0], [2.0, 2.0, 2.0]]);

        let out = s.apply(&[[0.0, 0.0, 0.0], [f32::NAN; 3]]);
        assert!(out[1][0].is_nan());

        // Blends from the last observed value, not from NaN.
        let out = s.apply(&[[0.0, 0.0, 0.0], [4.0, 4.0, 4.0]]);
        assert!(approx_eq(&out[1], &[3.0, 3.0, 3.0], 1e-6));
    }

    #[test]
    fn test_first_observation_after_nan_passes_through() {
        let mut s = SkeletonSmoother::from_smoothing(0.5);
        s.apply(&[[f32::NAN; 3]]);
        let out = s.apply(&[[5.0, 5.0, 5.0]]);
        assert!(approx_eq(&out[0], &[5.0, 5.0, 5.0], 1e-6));
    }

    #[test]
    fn test_layout_change_resets() {
        let mut s = SkeletonSmoother::from_smoothing(0.9);
        s.apply(&[[0.0, 0.0, 0.0]]);
        let kps = vec![[1.0, 1.0, 1.0], [2.0, 2.0, 2.0]];
        assert_eq!(s.apply(&kps), kps);
    }

    #[test]
    fn test_reset() {
        let mut s = SkeletonSmoother::from_smoothing(0.9);
        s.apply(&[[0.0, 0.0, 0.0]]);
        s.reset();
        let out = s.apply(&[[7.0, 8.0, 9.0]]);
        assert_eq!(out, vec![[7.0, 8.0, 9.0]]);
    }
}
