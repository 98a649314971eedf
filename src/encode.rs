//! Time-Frame Encoding
//!
//! Builds on-air 12-byte frames from time data: field packing, scrambling,
//! Reed-Solomon parity over the message window and the trailing CRC-8.
//! This is the exact inverse of the decode pipeline and exists for the
//! simulator and for end-to-end tests; the broadcast side proper is not
//! this crate's concern.

use bitvec::prelude::*;

use crate::crc8;
use crate::frame::{
    self, RsCodeword, TimeFrame, FRAME_START_BYTE, RS_CORRECTABLE_SYMBOLS, RS_DATA_SYMBOLS,
    RS_SYMBOL_BITS, TIME_MESSAGE_PREFIX,
};
use crate::rs::ReedSolomon;
use crate::time::{TimeData, TIME_RESOLUTION_SECONDS};

/// Encoder turning [`TimeData`] into ready-to-modulate time frames.
pub struct FrameEncoder {
    rs: ReedSolomon,
}

impl FrameEncoder {
    pub fn new() -> Self {
        Self {
            rs: ReedSolomon::new(RS_SYMBOL_BITS, RS_CORRECTABLE_SYMBOLS),
        }
    }

    /// Encode one frame.
    ///
    /// The epoch counter keeps only its transmitted bits T[34:5]; seconds
    /// below the 96-second wire granularity are truncated away.
    pub fn encode(&self, time: &TimeData) -> TimeFrame {
        let epochs = time.utc_seconds_since_2000 / TIME_RESOLUTION_SECONDS;

        let mut frame: TimeFrame = Default::default();
        frame[0] = 0x55;
        frame[1] = 0x55;
        frame[2] = FRAME_START_BYTE;
        frame[3] = TIME_MESSAGE_PREFIX << 5;

        let bits = frame[3..8].view_bits_mut::<Msb0>();
        bits[3..33].store_be::<u64>(epochs >> 5);

        frame[7] |= time.offset.to_wire() << 5;
        if time.leap_second_announced {
            frame[7] |= 0x10;
        }
        if time.leap_second_positive {
            frame[7] |= 0x08;
        }
        if time.time_zone_change_announced {
            frame[7] |= 0x04;
        }
        frame[7] |= time.transmitter_state.to_wire();

        // Whiten first: parity and CRC cover the scrambled window.
        frame::scramble(&mut frame);

        let codeword = frame::extract_rs_codeword(&frame);
        let encoded = self.rs.encode(&codeword[..RS_DATA_SYMBOLS]);
        let mut repacked: RsCodeword = Default::default();
        repacked.copy_from_slice(&encoded);
        frame::apply_rs_codeword(&mut frame, &repacked);

        frame[11] = crc8::crc8(&frame[3..8]);
        frame
    }
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new()
    }
}
