//! e-CzasPL Stream Decoder
//!
//! Drives the complete decode pipeline one sample at a time: buffer the
//! sample, correlate against the sync word, look up a frame start, read the
//! twelve frame bytes differentially, then validate, Reed-Solomon-correct,
//! CRC-repair, descramble and unpack the time message.
//!
//! Every stage reports through an optional callback; for a given frame the
//! callbacks fire in the order raw frame, RS-processed frame, CRC-processed
//! frame, time message, each carrying the absolute number of the frame's
//! first sample. Processing is fully synchronous, so callback ordering
//! follows sample order exactly.
//!
//! Recovery is local: a frame that fails a static check or the Reed-Solomon
//! stage advances the search by the minimum plausible amount and the
//! decoder returns to sync scanning; nothing is retried and nothing is
//! logged.

use alloc::boxed::Box;

use snafu::Snafu;

use crate::frame::{
    self, RsCodeword, TimeFrame, FRAME_BITS, RS_CORRECTABLE_SYMBOLS, RS_SYMBOL_BITS,
    SYNC_WORD_BITS,
};
use crate::rs::ReedSolomon;
use crate::stream::{StreamBuffer, LAST_STREAM_INDEX, STREAM_SIZE};
use crate::sync;
use crate::time::TimeData;

/// Frame-level decode failures reported through the error callback.
#[derive(Debug, Snafu, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingError {
    /// More symbol errors in the message window than the code can resolve
    #[snafu(display("Reed-Solomon correction failed"))]
    RsCorrectionFailed,

    /// CRC mismatch persisted after the SK1 candidate flip
    #[snafu(display("CRC-8 correction failed"))]
    CrcCorrectionFailed,
}

/// Callback for frame-stage events: the frame and the absolute number of
/// its first sample.
pub type TimeFrameCallback = Box<dyn FnMut(&TimeFrame, u32)>;

/// Callback for decoded time messages.
pub type TimeDataCallback = Box<dyn FnMut(&TimeData, u32)>;

/// Callback for frame-level decode failures.
pub type ProcessingErrorCallback = Box<dyn FnMut(ProcessingError)>;

/// e-CzasPL time data decoder.
///
/// Owns its stream buffer and Reed-Solomon tables; separate instances share
/// nothing and may run in parallel.
pub struct Decoder {
    buffer: StreamBuffer,
    rs: ReedSolomon,
    samples_per_bit: usize,
    awaiting_sync: bool,
    false_detections: u32,
    raw_frame_callback: Option<TimeFrameCallback>,
    rs_frame_callback: Option<TimeFrameCallback>,
    crc_frame_callback: Option<TimeFrameCallback>,
    time_data_callback: Option<TimeDataCallback>,
    error_callback: Option<ProcessingErrorCallback>,
}

impl Decoder {
    /// Build a decoder for a stream oversampled at `samples_per_bit`
    /// samples per signal bit (10 for the reference demodulator).
    pub fn new(samples_per_bit: u8) -> Self {
        Self::with_buffer(samples_per_bit, StreamBuffer::new())
    }

    /// Build a decoder with a non-default noise hysteresis.
    pub fn with_hysteresis(samples_per_bit: u8, hysteresis: u16) -> Self {
        Self::with_buffer(samples_per_bit, StreamBuffer::with_hysteresis(hysteresis))
    }

    fn with_buffer(samples_per_bit: u8, buffer: StreamBuffer) -> Self {
        Self {
            buffer,
            rs: ReedSolomon::new(RS_SYMBOL_BITS, RS_CORRECTABLE_SYMBOLS),
            samples_per_bit: samples_per_bit as usize,
            awaiting_sync: true,
            false_detections: 0,
            raw_frame_callback: None,
            rs_frame_callback: None,
            crc_frame_callback: None,
            time_data_callback: None,
            error_callback: None,
        }
    }

    /// Register a callback for raw frames as read off the stream.
    pub fn on_raw_frame(&mut self, callback: impl FnMut(&TimeFrame, u32) + 'static) {
        self.raw_frame_callback = Some(Box::new(callback));
    }

    /// Register a callback for frames after Reed-Solomon correction.
    pub fn on_rs_frame(&mut self, callback: impl FnMut(&TimeFrame, u32) + 'static) {
        self.rs_frame_callback = Some(Box::new(callback));
    }

    /// Register a callback for frames after the CRC check/repair.
    pub fn on_crc_frame(&mut self, callback: impl FnMut(&TimeFrame, u32) + 'static) {
        self.crc_frame_callback = Some(Box::new(callback));
    }

    /// Register a callback for decoded time messages.
    pub fn on_time_data(&mut self, callback: impl FnMut(&TimeData, u32) + 'static) {
        self.time_data_callback = Some(Box::new(callback));
    }

    /// Register a callback for frame-level decode failures.
    pub fn on_processing_error(&mut self, callback: impl FnMut(ProcessingError) + 'static) {
        self.error_callback = Some(Box::new(callback));
    }

    /// Sync or frame candidates that failed validation so far.
    pub fn false_detections(&self) -> u32 {
        self.false_detections
    }

    /// Process one demodulated sample.
    ///
    /// Returns true when the stream buffer has filled up: the oldest sample
    /// is lost on the next call unless a frame completes first.
    pub fn process_sample(&mut self, sample: i16) -> bool {
        self.buffer.push(sample);
        sync::correlate_latest(&mut self.buffer, self.samples_per_bit);

        if self.awaiting_sync && self.lookup_frame_start().is_some() {
            self.awaiting_sync = false;
        }

        if !self.awaiting_sync {
            // The frame's last bit sample must already be buffered.
            let start = self.buffer.meaningful_start();
            if let Some(last_index) = start
                .checked_add((FRAME_BITS - 1) * self.samples_per_bit)
                .filter(|&index| index <= LAST_STREAM_INDEX)
            {
                self.process_buffered_frame(start, last_index);
            }
        }

        self.buffer.is_full()
    }

    /// Find a validated frame start in the sync-match flags.
    ///
    /// On a flag hit the meaningful-data marker moves to the hit; the hit
    /// is then confirmed by differentially reading the two sync bytes. A
    /// confirmation failure advances the search by one bit period. With no
    /// flag set, everything older than the newest possible sync position is
    /// invalidated.
    fn lookup_frame_start(&mut self) -> Option<usize> {
        let span = (SYNC_WORD_BITS - 1) * self.samples_per_bit;
        let bound = STREAM_SIZE.checked_sub(span)?;
        if self.buffer.meaningful_start() >= bound {
            return None;
        }

        let hit = (self.buffer.meaningful_start()..bound)
            .find(|&index| self.buffer.sync_match(index));
        let Some(index) = hit else {
            self.buffer.set_meaningful_start(bound);
            return None;
        };

        self.buffer.set_meaningful_start(index);
        if self.sync_bytes_confirmed(index) {
            return Some(index);
        }

        self.false_detections = self.false_detections.wrapping_add(1);
        self.buffer
            .advance_meaningful_start(self.samples_per_bit);
        None
    }

    fn sync_bytes_confirmed(&self, index: usize) -> bool {
        let Some(first) = self.buffer.read_byte(
            index,
            self.samples_per_bit,
            frame::READ_START_PRECONDITION,
        ) else {
            return false;
        };
        let Some(second) =
            self.buffer
                .read_byte(first.next_index, self.samples_per_bit, first.bit_is_one)
        else {
            return false;
        };
        first.value == 0x55 && second.value == 0x55
    }

    /// Read, validate and fully decode the frame starting at the
    /// meaningful-data marker. Always leaves the decoder back in sync
    /// search, with the marker advanced past the consumed (or rejected)
    /// region.
    fn process_buffered_frame(&mut self, start: usize, last_index: usize) {
        let Some(mut frame) = self.read_frame(start) else {
            return;
        };
        let first_sample_number = self.buffer.sample_number(start);

        if !frame::has_valid_static_fields(&frame) {
            self.false_detections = self.false_detections.wrapping_add(1);
            self.buffer.advance_meaningful_start(1);
            self.awaiting_sync = true;
            return;
        }

        self.emit_frame(EmitStage::Raw, &frame, first_sample_number);

        let codeword = frame::extract_rs_codeword(&frame);
        match self.rs.decode(&codeword) {
            Ok(corrected) => {
                let mut repacked: RsCodeword = Default::default();
                repacked.copy_from_slice(&corrected);
                frame::apply_rs_codeword(&mut frame, &repacked);
            }
            Err(_) => {
                self.emit_error(ProcessingError::RsCorrectionFailed);
                self.buffer.advance_meaningful_start(1);
                self.awaiting_sync = true;
                return;
            }
        }
        self.emit_frame(EmitStage::Rs, &frame, first_sample_number);

        if !frame::correct_sk1_with_crc(&mut frame) {
            self.emit_error(ProcessingError::CrcCorrectionFailed);
            // A frame that got this far was aligned; skip it whole.
            self.buffer.advance_meaningful_start(last_index - start);
            self.awaiting_sync = true;
            return;
        }
        self.emit_frame(EmitStage::Crc, &frame, first_sample_number);

        frame::scramble(&mut frame);
        let time = TimeData::from_frame(&frame);
        if let Some(callback) = self.time_data_callback.as_mut() {
            callback(&time, first_sample_number);
        }

        self.buffer.set_meaningful_start(last_index);
        self.awaiting_sync = true;
    }

    fn read_frame(&self, start: usize) -> Option<TimeFrame> {
        let mut frame: TimeFrame = Default::default();
        let mut index = start;
        let mut bit_is_one = frame::READ_START_PRECONDITION;
        for byte in frame.iter_mut() {
            let read = self
                .buffer
                .read_byte(index, self.samples_per_bit, bit_is_one)?;
            *byte = read.value;
            index = read.next_index;
            bit_is_one = read.bit_is_one;
        }
        Some(frame)
    }

    fn emit_frame(&mut self, stage: EmitStage, frame: &TimeFrame, first_sample_number: u32) {
        let callback = match stage {
            EmitStage::Raw => self.raw_frame_callback.as_mut(),
            EmitStage::Rs => self.rs_frame_callback.as_mut(),
            EmitStage::Crc => self.crc_frame_callback.as_mut(),
        };
        if let Some(callback) = callback {
            callback(frame, first_sample_number);
        }
    }

    fn emit_error(&mut self, error: ProcessingError) {
        if let Some(callback) = self.error_callback.as_mut() {
            callback(error);
        }
    }
}

#[derive(Clone, Copy)]
enum EmitStage {
    Raw,
    Rs,
    Crc,
}
