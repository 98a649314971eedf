//! Sample-Stream Synthesis
//!
//! Renders encoded frames into the demodulated-sample domain the decoder
//! consumes: a bit equal to its predecessor produces a quiet bit period, a
//! bit inversion produces a full bit period outside the noise region with
//! the sign of the new bit value. The differential state starts at one per
//! frame, matching the decoder's read precondition, and frames are
//! separated by idle fill so the next frame can start on a full second.

use alloc::vec;
use alloc::vec::Vec;

use bitvec::prelude::*;

use crate::frame::{self, TimeFrame};

/// Default rendering amplitude, comfortably outside the default noise
/// hysteresis.
pub const DEFAULT_AMPLITUDE: i16 = 30_000;

/// Bit rate of the broadcast.
pub const BITS_PER_SECOND: usize = 50;

/// Render one frame into `96 * samples_per_bit` samples.
pub fn frame_samples(frame: &TimeFrame, samples_per_bit: usize, amplitude: i16) -> Vec<i16> {
    let mut samples = Vec::with_capacity(frame::FRAME_BITS * samples_per_bit);
    let mut previous = frame::READ_START_PRECONDITION;

    for bit in frame.view_bits::<Msb0>() {
        let bit = *bit;
        let level = if bit == previous {
            0
        } else if bit {
            amplitude
        } else {
            -amplitude
        };
        for _ in 0..samples_per_bit {
            samples.push(level);
        }
        previous = bit;
    }

    samples
}

/// Idle carrier between frames.
pub fn idle_samples(count: usize) -> Vec<i16> {
    vec![0; count]
}

/// Idle fill padding a rendered frame to a whole number of seconds.
///
/// A 96-bit frame at 50 bit/s lasts 1.92 s; frames repeat every
/// `seconds_per_frame` seconds on the air.
pub fn inter_frame_gap(samples_per_bit: usize, seconds_per_frame: usize) -> usize {
    (seconds_per_frame * BITS_PER_SECOND).saturating_sub(frame::FRAME_BITS) * samples_per_bit
}

/// Overlay deterministic uniform noise confined to `max_abs`.
///
/// Keeps transitions decodable as long as `max_abs` stays below both the
/// hysteresis and the rendering amplitude's margin over it.
#[cfg(any(feature = "std", test))]
pub fn add_uniform_noise(samples: &mut [i16], max_abs: i16, seed: u64) {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Uniform};

    let mut rng = StdRng::seed_from_u64(seed);
    let jitter = Uniform::new_inclusive(-max_abs, max_abs).unwrap();
    for sample in samples.iter_mut() {
        *sample = sample.saturating_add(jitter.sample(&mut rng));
    }
}
