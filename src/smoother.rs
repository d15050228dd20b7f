//! Temporal upsampling of lattice-space plans into smoothed device-pixel
//! tracks (§4.3).

use crate::config::Point;
use crate::lattice::LatticeTransform;
use crate::planner::LatticePlan;

/// Per-tweezer, length-`N*(T-1)+1` sequence of device-pixel points (§3
/// SmoothedTrack).
pub type SmoothedTrack = Vec<Vec<Point>>;

/// Project a [`LatticePlan`] into device-pixel space via `transform`, one
/// point per planning step (§3 DeviceTrack).
pub fn to_device_track(plan: &LatticePlan, transform: &LatticeTransform) -> Vec<Vec<Point>> {
    plan.iter()
        .map(|sites| sites.iter().map(|&(r, c)| transform.device(r, c)).collect())
        .collect()
}

/// Linearly interpolate `n` samples between each consecutive pair of device
/// points, per tweezer (§4.3).
///
/// For a track of length `T`, the output has `n*(T-1)+1` samples:
/// `M[j*n] == D[j]` for every `j`, and within segment `j` the `n`
/// intermediate samples step linearly toward `D[j+1]`, which itself becomes
/// `M[(j+1)*n]` once, written after that segment's inner loop (not
/// overwritten by every later segment's terminal point — see DESIGN.md open
/// question 2).
pub fn smooth(device_track: &[Vec<Point>], n: u32) -> SmoothedTrack {
    let n = n as usize;
    device_track
        .iter()
        .map(|track| smooth_one(track, n))
        .collect()
}

fn smooth_one(track: &[Point], n: usize) -> Vec<Point> {
    let t = track.len();
    if t == 0 {
        return Vec::new();
    }
    if t == 1 {
        return vec![track[0]];
    }

    let mut out = vec![Point::default(); n * (t - 1) + 1];
    for j in 0..t - 1 {
        let d_j = track[j];
        let d_j1 = track[j + 1];
        let dx = (d_j1.x - d_j.x) / n as f64;
        let dy = (d_j1.y - d_j.y) / n as f64;
        for k in 0..n {
            out[j * n + k] = Point::new(d_j.x + dx * k as f64, d_j.y + dy * k as f64);
        }
        out[(j + 1) * n] = d_j1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s3_n1_passes_through_unchanged() {
        let track = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        let out = smooth_one(&track, 1);
        assert_eq!(out, track);
    }

    #[test]
    fn s4_n2_interpolates_midpoint() {
        let track = vec![Point::new(0.0, 0.0), Point::new(10.0, 20.0)];
        let out = smooth_one(&track, 2);
        assert_eq!(out, vec![Point::new(0.0, 0.0), Point::new(5.0, 10.0), Point::new(10.0, 20.0)]);
    }

    #[test]
    fn endpoints_match_device_track_endpoints() {
        let track = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 8.0),
            Point::new(-3.0, 1.0),
            Point::new(2.0, 2.0),
        ];
        let n = 4;
        let out = smooth_one(&track, n);
        assert_eq!(out[0], track[0]);
        assert_eq!(*out.last().unwrap(), *track.last().unwrap());
        assert_eq!(out.len(), n * (track.len() - 1) + 1);
    }

    #[test]
    fn interior_boundaries_are_not_clobbered_by_later_segments() {
        // Three segments with very different terminal points: the boundary
        // after segment 0 must equal track[1], not track[3].
        let track = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let n = 5;
        let out = smooth_one(&track, n);
        assert_eq!(out[1 * n], track[1]);
        assert_eq!(out[2 * n], track[2]);
        assert_eq!(out[3 * n], track[3]);
    }

    #[test]
    fn linearity_holds_within_each_segment() {
        let track = vec![Point::new(0.0, 0.0), Point::new(10.0, 20.0)];
        let n = 5;
        let out = smooth_one(&track, n);
        for k in 0..n {
            let expected = Point::new(10.0 * k as f64 / n as f64, 20.0 * k as f64 / n as f64);
            assert!((out[k].x - expected.x).abs() < 1e-9);
            assert!((out[k].y - expected.y).abs() < 1e-9);
        }
    }
}
