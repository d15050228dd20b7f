//! The driver loop (§4.6): orchestrates plan → smooth → pack → remap →
//! present and owns every flag and suspension point that reaches outside the
//! pure pipeline (§5).

use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::lattice::LatticeTransform;
use crate::packer::FramePacker;
use crate::planner::{self, Occupancy};
use crate::presentation::PresentationSink;
use crate::remap;
use crate::smoother::{self, SmoothedTrack};

/// Flags that belong to the driver loop, not to the pure pipeline (§4.6).
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Present the DMD-remapped frame (`F'`) instead of the raw packed one
    /// (`F`).
    pub use_dmd_coords: bool,
    /// Wrap back to the start of the current track instead of stopping once
    /// it runs dry.
    pub loop_mode: bool,
    /// Sleep this long between presented frames, if set.
    pub idle_delay: Option<Duration>,
    /// When looping, sleep a random duration in this range before restarting
    /// the track, instead of restarting immediately.
    pub randomize_inter_plan_wait: Option<(Duration, Duration)>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            use_dmd_coords: false,
            loop_mode: false,
            idle_delay: None,
            randomize_inter_plan_wait: None,
        }
    }
}

/// Telemetry returned by [`DriverLoop::step`], one per presented frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTelemetry {
    pub iter: usize,
    pub presented_remapped: bool,
}

/// Owns the session's configuration, current smoothed track, and the
/// presentation sink. Steps the pipeline one tick per call the way a
/// frame-stepped emulator core does.
pub struct DriverLoop<S: PresentationSink> {
    cfg: Config,
    driver_cfg: DriverConfig,
    sink: S,
    track: Option<SmoothedTrack>,
    iter: usize,
    close_requested: bool,
}

impl<S: PresentationSink> DriverLoop<S> {
    pub fn new(cfg: Config, driver_cfg: DriverConfig, mut sink: S) -> Result<Self> {
        sink.init(cfg.width as usize, cfg.height as usize)?;
        info!(target: "driver.session", width = cfg.width, height = cfg.height, "session created");
        Ok(DriverLoop {
            cfg,
            driver_cfg,
            sink,
            track: None,
            iter: 0,
            close_requested: false,
        })
    }

    /// Plan + smooth a fresh occupancy and make it the active track,
    /// resetting the tick counter (§4.6 step 1).
    pub fn load_plan(&mut self, occupancy: Occupancy) -> Result<()> {
        let rows = occupancy.rows();
        let cols = occupancy.cols();
        let lattice_plan = planner::plan(occupancy, self.cfg.max_plan_steps)?;
        let transform = LatticeTransform::new(rows, cols, self.cfg.lattice_basis);
        let device_track = smoother::to_device_track(&lattice_plan, &transform);
        let track = smoother::smooth(&device_track, self.cfg.smoothing_factor);

        info!(
            target: "driver.plan",
            tweezers = track.len(),
            steps = lattice_plan.iter().map(|t| t.len()).max().unwrap_or(0),
            "plan generated"
        );

        self.track = Some(track);
        self.iter = 0;
        Ok(())
    }

    /// Signal the loop to stop at its next poll (§5 cancellation).
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn is_close_requested(&self) -> bool {
        self.close_requested
    }

    /// Pack and present the next tick. Returns `Ok(None)` when there is
    /// nothing left to present (no active plan, the track ran dry and
    /// `loop_mode` is off, or a close was requested) instead of an error —
    /// running dry is an expected end state, not a failure (§4.6).
    pub fn step(&mut self) -> Result<Option<StepTelemetry>> {
        if self.close_requested {
            return Ok(None);
        }
        let Some(track) = self.track.as_ref() else {
            warn!(target: "driver.session", "step() called with no active plan");
            return Ok(None);
        };

        let packer = FramePacker::new(track, self.cfg);
        let tick_count = packer.tick_count();
        if self.iter >= tick_count {
            if !self.driver_cfg.loop_mode {
                return Ok(None);
            }
            self.wait_before_restart();
            self.iter = 0;
        }

        let frame = packer.pack(self.iter);
        let presented = if self.driver_cfg.use_dmd_coords {
            remap::remap(&frame, &self.cfg)
        } else {
            frame
        };
        self.sink.present(&presented)?;

        let telemetry = StepTelemetry {
            iter: self.iter,
            presented_remapped: self.driver_cfg.use_dmd_coords,
        };
        self.iter += 1;

        if let Some(delay) = self.driver_cfg.idle_delay {
            thread::sleep(delay);
        }
        Ok(Some(telemetry))
    }

    fn wait_before_restart(&self) {
        if let Some((lo, hi)) = self.driver_cfg.randomize_inter_plan_wait {
            let wait = if hi > lo {
                let mut rng = rand::thread_rng();
                lo + Duration::from_nanos(rng.gen_range(0..(hi - lo).as_nanos() as u64))
            } else {
                lo
            };
            thread::sleep(wait);
        }
    }

    /// Drive the loop until `should_close` returns true, a close was
    /// requested, or (without `loop_mode`) the track runs dry. Polls
    /// `should_close` once per tick (§5).
    pub fn run(&mut self, mut should_close: impl FnMut() -> bool) -> Result<()> {
        loop {
            if should_close() || self.close_requested {
                break;
            }
            match self.step()? {
                Some(_) => {}
                None => break,
            }
        }
        Ok(())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::BufferSink;

    fn single_tweezer_occupancy() -> Occupancy {
        Occupancy::from_cells(3, 3, vec![0, 0, 0, 0, 1, 0, 0, 0, 0])
    }

    #[test]
    fn step_returns_none_once_no_plan_loaded() {
        let mut driver = DriverLoop::new(Config::default(), DriverConfig::default(), BufferSink::default()).unwrap();
        assert!(driver.step().unwrap().is_none());
    }

    #[test]
    fn run_presents_every_tick_then_stops_without_loop_mode() {
        let mut driver = DriverLoop::new(Config::default(), DriverConfig::default(), BufferSink::default()).unwrap();
        driver.load_plan(single_tweezer_occupancy()).unwrap();
        driver.run(|| false).unwrap();
        assert!(!driver.sink().frames.is_empty());
    }

    #[test]
    fn close_request_halts_the_loop() {
        let mut driver = DriverLoop::new(
            Config {
                smoothing_factor: 100,
                ..Config::default()
            },
            DriverConfig::default(),
            BufferSink::default(),
        )
        .unwrap();
        driver.load_plan(single_tweezer_occupancy()).unwrap();

        let mut ticks = 0;
        driver
            .run(|| {
                ticks += 1;
                ticks > 3
            })
            .unwrap();
        assert!(driver.sink().frames.len() <= 4);
    }

    #[test]
    fn loop_mode_restarts_instead_of_stopping() {
        let mut driver = DriverLoop::new(
            Config::default(),
            DriverConfig {
                loop_mode: true,
                ..DriverConfig::default()
            },
            BufferSink::default(),
        )
        .unwrap();
        driver.load_plan(single_tweezer_occupancy()).unwrap();

        let mut ticks = 0;
        driver
            .run(|| {
                ticks += 1;
                ticks > 5
            })
            .unwrap();
        // A single resting tweezer produces exactly one tick per track;
        // looping five extra times should still have presented frames each
        // time rather than stopping after the first.
        assert_eq!(driver.sink().frames.len(), 5);
    }
}
