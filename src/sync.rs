//! Sync-Word Correlation
//!
//! The 0x5555 sync word alternates bit values, so every bit period of a
//! real sync carries a carrier phase change: each sampled position must sit
//! outside the noise region with a sign matching its sync bit (positive for
//! one, negative for zero). A single in-band or wrong-sign sample rejects
//! the position.
//!
//! Correlation is evaluated against the newest sample as the sync LSB, with
//! earlier bits spaced `samples_per_bit` back, and the verdict is stored at
//! the index of the presumed sync MSB so the frame start can be looked up
//! directly.

use crate::frame::{SYNC_WORD, SYNC_WORD_BITS};
use crate::stream::{StreamBuffer, LAST_STREAM_INDEX};

/// Evaluate sync-word correlation for the newest sample and store the
/// verdict at the sync MSB position.
///
/// Does nothing when a full sync word does not fit the buffer at this
/// oversampling rate.
pub fn correlate_latest(buffer: &mut StreamBuffer, samples_per_bit: usize) {
    let span = (SYNC_WORD_BITS - 1) * samples_per_bit;
    let Some(msb_index) = LAST_STREAM_INDEX.checked_sub(span) else {
        return;
    };

    // LSB of the sync word is one, so the newest sample must be positive.
    let mut matched = buffer.sample(LAST_STREAM_INDEX) > 0;
    if matched {
        for bit in 0..SYNC_WORD_BITS {
            let index = LAST_STREAM_INDEX - bit * samples_per_bit;
            let expect_one = (SYNC_WORD >> bit) & 1 != 0;
            if !buffer.is_out_of_noise(index) || (buffer.sample(index) > 0) != expect_one {
                matched = false;
                break;
            }
        }
    }

    buffer.set_sync_match(msb_index, matched);
}
