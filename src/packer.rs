//! Frame packing (§4.4): accumulate 24 consecutive smoothed sub-frames into
//! one RGB image, bit-plane per channel.

use crate::config::Config;
use crate::error::{DmdError, Result};
use crate::smoother::SmoothedTrack;

/// One packed pixel, `repr(C)` so it reinterprets cleanly over three
/// consecutive bytes of [`RgbFrame::bytes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Rgb(pub [u8; 3]);

/// One `W*H*3` row-major `RGBRGB…` byte buffer.
#[derive(Debug, Clone)]
pub struct RgbFrame {
    pub width: usize,
    pub height: usize,
    pub bytes: Vec<u8>,
}

impl RgbFrame {
    /// Allocate a zeroed frame, refusing rather than aborting the process
    /// when `width * height * 3` overflows or the allocator can't satisfy it
    /// (§7 OutOfMemory).
    pub fn try_zeroed(width: usize, height: usize) -> Result<Self> {
        let len = width
            .checked_mul(height)
            .and_then(|px| px.checked_mul(3))
            .ok_or(DmdError::OutOfMemory {
                requested: usize::MAX,
            })?;
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(len)
            .map_err(|_| DmdError::OutOfMemory { requested: len })?;
        bytes.resize(len, 0);
        Ok(RgbFrame {
            width,
            height,
            bytes,
        })
    }

    /// Infallible convenience for dimensions already known to be bounded
    /// (device width/height, validated at [`Config`] construction).
    pub fn zeroed(width: usize, height: usize) -> Self {
        Self::try_zeroed(width, height).expect("device frame dimensions should never overflow")
    }

    #[inline]
    fn channel_index(&self, x: usize, y: usize, channel: usize) -> usize {
        (x * self.width + y) * 3 + channel
    }

    /// A `width * height` POD view over the packed bytes, one [`Rgb`] per
    /// pixel, for backends that want pixel-sized rather than byte-sized
    /// access without an extra copy.
    pub fn pixels(&self) -> &[Rgb] {
        bytemuck::cast_slice(&self.bytes)
    }

    /// OR `bit` into the given channel byte at `(x, y)`; a no-op if the
    /// coordinate is outside the frame (§4.4 bounds: clamp per pixel, not a
    /// hard stop on the whole write).
    #[inline]
    fn or_bit(&mut self, x: i64, y: i64, channel: usize, bit: u8) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        // x indexes rows (range [0, height)), y indexes columns (range [0, width)).
        if x >= self.height || y >= self.width {
            return;
        }
        let idx = self.channel_index(x, y, channel);
        self.bytes[idx] |= bit;
    }
}

/// Steps a [`SmoothedTrack`] in chunks of 24, emitting one [`RgbFrame`] per
/// tick.
pub struct FramePacker<'a> {
    track: &'a SmoothedTrack,
    cfg: Config,
}

impl<'a> FramePacker<'a> {
    pub fn new(track: &'a SmoothedTrack, cfg: Config) -> Self {
        FramePacker { track, cfg }
    }

    /// Total number of ticks available before the track runs dry.
    pub fn tick_count(&self) -> usize {
        let longest = self.track.iter().map(|t| t.len()).max().unwrap_or(0);
        longest.div_ceil(24)
    }

    /// Pack tick `iter`: 24 consecutive samples per tweezer, starting at
    /// `iter * 24`, drawn as filled squares of half-side `tweezer_radius`.
    pub fn pack(&self, iter: usize) -> RgbFrame {
        let mut frame = RgbFrame::zeroed(self.cfg.width as usize, self.cfg.height as usize);
        let rho = self.cfg.tweezer_radius;
        let base = iter * 24;

        for tweezer in self.track {
            for j in 0..24usize {
                let Some(&point) = tweezer.get(base + j) else {
                    break;
                };
                let (channel, bit) = channel_and_bit(j);
                let cx = point.x.floor() as i64;
                let cy = point.y.floor() as i64;
                for dx in -rho as i64..=rho as i64 {
                    for dy in -rho as i64..=rho as i64 {
                        frame.or_bit(cx + dx, cy + dy, channel, bit);
                    }
                }
            }
        }
        frame
    }
}

/// Which channel and bit sub-frame `j` (0..24) belongs to (§4.4 table).
fn channel_and_bit(j: usize) -> (usize, u8) {
    let channel = j / 8;
    let bit = 1u8 << (7 - (j % 8));
    (channel, bit)
}
