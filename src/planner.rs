//! Rearrangement planner (§4.2): deterministic, one-tweezer-at-a-time greedy
//! mover from an arbitrary initial occupancy toward a center-of-mass-anchored
//! cluster.
//!
//! The occupancy matrix is a single flat `Vec<u8>` with computed
//! `row * cols + col` strides rather than nested per-row allocations (§9
//! re-architecture guidance) — better cache behavior, one owner, nothing to
//! leak.

use tracing::{debug, info};

use crate::error::{DmdError, Result};

/// A lattice site, row-major.
pub type Site = (i32, i32);

/// Row-major binary occupancy matrix. `sum(cells) == num_tweezers` is
/// maintained as an invariant across every mutation the planner performs.
#[derive(Debug, Clone)]
pub struct Occupancy {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl Occupancy {
    /// Build from a row-major `{0,1}` buffer of length `rows * cols`. Panics
    /// if the buffer is mis-sized; that is a programming error at the call
    /// site, not caller-supplied data to validate (use [`Occupancy::checked`]
    /// when `num_tweezers` is supplied separately and might disagree).
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<u8>) -> Self {
        assert_eq!(cells.len(), rows * cols);
        Occupancy { rows, cols, cells }
    }

    /// Build from a row-major `{0,1}` buffer, validating that `num_tweezers`
    /// matches the count of `1`s (§7 OccupancyMismatch) and is itself `> 0`
    /// (§3 `num_tweezers: int > 0` — an all-empty occupancy has nothing for
    /// the planner to anchor a center of mass to).
    pub fn checked(rows: usize, cols: usize, cells: Vec<u8>, num_tweezers: usize) -> Result<Self> {
        if num_tweezers == 0 {
            return Err(DmdError::InvalidConfig(
                "num_tweezers must be > 0".to_string(),
            ));
        }
        let occupancy = Occupancy::from_cells(rows, cols, cells);
        let actual = occupancy.count_ones();
        if actual != num_tweezers {
            return Err(DmdError::OccupancyMismatch {
                num_tweezers,
                actual,
            });
        }
        Ok(occupancy)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn index(&self, r: i32, c: i32) -> usize {
        r as usize * self.cols + c as usize
    }

    #[inline]
    fn in_bounds(&self, r: i32, c: i32) -> bool {
        r >= 0 && c >= 0 && (r as usize) < self.rows && (c as usize) < self.cols
    }

    #[inline]
    pub fn get(&self, r: i32, c: i32) -> u8 {
        self.cells[self.index(r, c)]
    }

    #[inline]
    fn set(&mut self, r: i32, c: i32, v: u8) {
        let idx = self.index(r, c);
        self.cells[idx] = v;
    }

    /// Count of occupied sites, in row-major scan order.
    pub fn count_ones(&self) -> usize {
        self.cells.iter().filter(|&&v| v != 0).count()
    }

    /// Sites holding a tweezer, in row-major scan order — the order in which
    /// tweezer indices are assigned during setup.
    fn occupied_sites(&self) -> Vec<Site> {
        let mut sites = Vec::with_capacity(self.count_ones());
        for r in 0..self.rows as i32 {
            for c in 0..self.cols as i32 {
                if self.get(r, c) != 0 {
                    sites.push((r, c));
                }
            }
        }
        sites
    }

    /// Whether `(r, c)` is in bounds and unoccupied — the admissibility test
    /// every candidate move in §4.2 shares.
    fn is_vacant(&self, r: i32, c: i32) -> bool {
        self.in_bounds(r, c) && self.get(r, c) == 0
    }
}

/// For each tweezer `i`, its ordered sequence of lattice sites, one entry per
/// planning step (§3 LatticePlan). `plan[i][0]` is the site tweezer `i` was
/// registered at.
pub type LatticePlan = Vec<Vec<Site>>;

/// Integer-truncated center of mass of the occupied sites.
fn center_of_mass(sites: &[Site]) -> (i32, i32) {
    let k = sites.len() as i32;
    let sum_r: i32 = sites.iter().map(|s| s.0).sum();
    let sum_c: i32 = sites.iter().map(|s| s.1).sum();
    (sum_r / k, sum_c / k)
}

/// One tweezer's attempt to move this step: the candidate site and which
/// guard admitted it, in priority order (§4.2 table).
fn propose_move(site: Site, com: (i32, i32), occupancy: &Occupancy) -> Option<Site> {
    let (row, col) = site;
    let (com_r, com_c) = com;
    let dr = row - com_r;
    let dc = col - com_c;

    // A / A': reduce the larger axial deviation first, on the row axis.
    if row != com_r && dr.abs() >= dc.abs() {
        if dr > 0 && occupancy.is_vacant(row - 1, col) {
            return Some((row - 1, col));
        }
        if dr < 0 && occupancy.is_vacant(row + 1, col) {
            return Some((row + 1, col));
        }
    }
    // B / B': cross-axis fallback.
    if col != com_c {
        if dc > 0 && occupancy.is_vacant(row, col - 1) {
            return Some((row, col - 1));
        }
        if dc < 0 && occupancy.is_vacant(row, col + 1) {
            return Some((row, col + 1));
        }
    }
    // C / C': re-try the row axis even when it wasn't dominant.
    if row != com_r {
        if dr > 0 && occupancy.is_vacant(row - 1, col) {
            return Some((row - 1, col));
        }
        if dr < 0 && occupancy.is_vacant(row + 1, col) {
            return Some((row + 1, col));
        }
    }
    None
}

/// Run the planner to completion or until `max_plan_steps` is exceeded.
///
/// Tweezers are enumerated in row-major scan order of the initial occupancy;
/// within a step, tweezers are processed in that same index order, so a
/// later tweezer may observe a site an earlier tweezer vacated this step —
/// intentional, it enables chains (§4.2 rationale).
pub fn plan(mut occupancy: Occupancy, max_plan_steps: usize) -> Result<LatticePlan> {
    let initial_sites = occupancy.occupied_sites();
    let k = initial_sites.len();
    if k == 0 {
        return Err(DmdError::InvalidConfig(
            "occupancy has no tweezers to plan for".to_string(),
        ));
    }
    let com = center_of_mass(&initial_sites);

    let mut positions: Vec<Site> = initial_sites.clone();
    let mut plan: LatticePlan = initial_sites.into_iter().map(|s| vec![s]).collect();

    let mut t = 0usize;
    loop {
        if t >= max_plan_steps {
            return Err(DmdError::PlanOverflow {
                max: max_plan_steps,
            });
        }

        let mut num_moves = 0usize;
        for i in 0..k {
            let current = positions[i];
            match propose_move(current, com, &occupancy) {
                Some(next) => {
                    occupancy.set(current.0, current.1, 0);
                    occupancy.set(next.0, next.1, 1);
                    positions[i] = next;
                    plan[i].push(next);
                    num_moves += 1;
                }
                None => {
                    plan[i].push(current);
                }
            }
        }

        debug!(target: "planner.step", step = t, num_moves, "planning step");

        if num_moves == 0 {
            // Every tweezer took the resting (`None`) branch this sweep, which
            // pushed one extra entry onto each trajectory. That entry isn't
            // part of the output — `T = t`, not `t + 1` — so undo it before
            // returning (mirrors `numFrames = currentFrame + 1` never
            // counting the terminal sweep's resting writes).
            for tweezer in &mut plan {
                tweezer.pop();
            }
            info!(target: "planner.step", steps = t + 1, tweezers = k, "planning complete");
            return Ok(plan);
        }
        t += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occ(rows: usize, cols: usize, ones: &[(i32, i32)]) -> Occupancy {
        let mut cells = vec![0u8; rows * cols];
        for &(r, c) in ones {
            cells[r as usize * cols + c as usize] = 1;
        }
        Occupancy::from_cells(rows, cols, cells)
    }

    fn no_duplicates_per_step(p: &LatticePlan) {
        let t_max = p.iter().map(|row| row.len()).max().unwrap_or(0);
        for t in 0..t_max {
            let mut seen = std::collections::HashSet::new();
            for tweezer in p {
                let site = tweezer[t.min(tweezer.len() - 1)];
                assert!(seen.insert(site), "duplicate site {:?} at t={}", site, t);
            }
        }
    }

    #[test]
    fn s1_identity_matrix_converges_near_center() {
        let sites: Vec<Site> = (0..5).map(|i| (i, i)).collect();
        let occupancy = occ(5, 5, &sites);
        let result = plan(occupancy, 30).unwrap();
        assert_eq!(result.len(), 5);
        no_duplicates_per_step(&result);
        for tweezer in &result {
            let (r, c) = *tweezer.last().unwrap();
            assert!((r - 2).abs() <= 1, "row {r} not near COM row 2");
            assert!((c - 2).abs() <= 1, "col {c} not near COM col 2");
        }
    }

    #[test]
    fn s2_single_tweezer_at_com_halts_immediately() {
        let occupancy = occ(3, 3, &[(0, 0)]);
        let result = plan(occupancy, 30).unwrap();
        assert_eq!(result[0], vec![(0, 0)]);
    }

    #[test]
    fn s5_two_tweezers_converge_without_both_moving_same_step() {
        let occupancy = occ(1, 3, &[(0, 0), (0, 2)]);
        let result = plan(occupancy, 30).unwrap();
        // Step 0 -> step 1: exactly one of the two tweezers should have moved.
        let moved_0 = result[0][0] != result[0][1];
        let moved_1 = result[1][0] != result[1][1];
        assert!(moved_0 ^ moved_1, "expected exactly one mover at step 1");
        no_duplicates_per_step(&result);
    }

    #[test]
    fn conservation_and_unit_step_hold_for_arbitrary_cluster() {
        let occupancy = occ(6, 6, &[(0, 0), (0, 5), (5, 0), (5, 5), (2, 3)]);
        let result = plan(occupancy, 64).unwrap();
        no_duplicates_per_step(&result);
        for tweezer in &result {
            for w in tweezer.windows(2) {
                let (r0, c0) = w[0];
                let (r1, c1) = w[1];
                let step = (r1 - r0).abs() + (c1 - c0).abs();
                assert!(step <= 1, "multi-axis or >1 step move: {:?} -> {:?}", w[0], w[1]);
            }
        }
    }

    #[test]
    fn overflow_when_max_steps_too_small() {
        let occupancy = occ(6, 6, &[(0, 0), (0, 5), (5, 0), (5, 5), (2, 3)]);
        let err = plan(occupancy, 1).unwrap_err();
        assert!(matches!(err, DmdError::PlanOverflow { max: 1 }));
    }

    #[test]
    fn terminates_for_already_converged_block() {
        // A tight 2x2 block already centered at its own COM: no tweezer should move.
        let occupancy = occ(4, 4, &[(1, 1), (1, 2), (2, 1), (2, 2)]);
        let result = plan(occupancy, 10).unwrap();
        for tweezer in &result {
            assert_eq!(tweezer.len(), 1);
        }
    }

    #[test]
    fn checked_accepts_matching_tweezer_count() {
        let cells = vec![0u8, 1, 0, 1];
        let occupancy = Occupancy::checked(2, 2, cells, 2).unwrap();
        assert_eq!(occupancy.count_ones(), 2);
    }

    #[test]
    fn checked_rejects_mismatched_tweezer_count() {
        let cells = vec![0u8, 1, 0, 1];
        let err = Occupancy::checked(2, 2, cells, 3).unwrap_err();
        assert!(matches!(
            err,
            DmdError::OccupancyMismatch {
                num_tweezers: 3,
                actual: 2
            }
        ));
    }
}
