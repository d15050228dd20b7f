//! Lattice-space → device-pixel affine transform (§4.1). Pure, no error modes.

use crate::config::{LatticeBasis, Point};

/// Maps integer lattice coordinates to device-pixel coordinates via the
/// configured basis, recentering `(r, c)` against the occupancy matrix
/// dimensions the planner consumed.
#[derive(Debug, Clone, Copy)]
pub struct LatticeTransform {
    basis: LatticeBasis,
    half_rows: i32,
    half_cols: i32,
}

impl LatticeTransform {
    pub fn new(rows: usize, cols: usize, basis: LatticeBasis) -> Self {
        LatticeTransform {
            basis,
            half_rows: (rows as i32) / 2,
            half_cols: (cols as i32) / 2,
        }
    }

    /// `device(r, c) = center + (r - R/2) * v1 + (c - C/2) * v2`.
    pub fn device(&self, r: i32, c: i32) -> Point {
        let rr = (r - self.half_rows) as f64;
        let cc = (c - self.half_cols) as f64;
        Point::new(
            self.basis.center.x + rr * self.basis.v1.x + cc * self.basis.v2.x,
            self.basis.center.y + rr * self.basis.v1.y + cc * self.basis.v2.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_cell_maps_to_center() {
        let basis = LatticeBasis::default();
        let t = LatticeTransform::new(10, 10, basis);
        let p = t.device(5, 5);
        assert_eq!(p, basis.center);
    }

    #[test]
    fn offset_cell_uses_basis_vectors() {
        let basis = LatticeBasis {
            v1: Point::new(1.0, 0.0),
            v2: Point::new(0.0, 1.0),
            center: Point::new(0.0, 0.0),
        };
        let t = LatticeTransform::new(0, 0, basis);
        let p = t.device(3, 4);
        assert_eq!(p, Point::new(3.0, 4.0));
    }
}
