//! Time-Frame Wire Format
//!
//! A time frame is 12 bytes on the wire:
//!
//! | byte  | contents                                              |
//! | ----- | ----------------------------------------------------- |
//! | 0-1   | sync word 0x5555                                      |
//! | 2     | start-of-frame marker 0x60                            |
//! | 3     | message prefix 0b101 in the top three bits, T[34:30]  |
//! | 4-6   | T[29:6]                                               |
//! | 7     | T[5], TZ, LS, LSS, TZC, SK0, SK1                      |
//! | 8-10  | Reed-Solomon parity, two 4-bit symbols per byte       |
//! | 11    | CRC-8 over bytes 3..=7                                |
//!
//! Bytes 3..=7 travel XOR-whitened with a fixed 5-byte scrambling word
//! whose top three bits are zero, which keeps the message prefix readable
//! on the air.
//!
//! The Reed-Solomon message window is not byte aligned: the nine data
//! symbols cover the 36 bits from byte 3 bit 4 down to byte 7 bit 1. The
//! top three bits of byte 3 (static prefix) and the LSB of byte 7 (SK1)
//! are outside the code; SK1 is instead covered by the CRC repair path.

use bitvec::prelude::*;

use crate::crc8;

/// Time frame length in bytes.
pub const FRAME_BYTES: usize = 12;

/// Time frame length in bits.
pub const FRAME_BITS: usize = FRAME_BYTES * 8;

/// Frame synchronization word.
pub const SYNC_WORD: u16 = 0x5555;

/// Frame synchronization length in bits.
pub const SYNC_WORD_BITS: usize = 16;

/// Start-of-frame marker in byte 2.
pub const FRAME_START_BYTE: u8 = 0x60;

/// Static prefix in the top three bits of byte 3 marking a time message.
pub const TIME_MESSAGE_PREFIX: u8 = 0x05;

/// XOR whitener for bytes 3..=7.
pub const SCRAMBLING_WORD: [u8; 5] = [0x0A, 0x47, 0x55, 0x4D, 0x2B];

/// Initial running-bit value for differential frame reads.
pub const READ_START_PRECONDITION: bool = true;

/// Reed-Solomon symbol width used by the broadcast.
pub const RS_SYMBOL_BITS: u8 = 4;

/// Symbol errors the broadcast code can correct.
pub const RS_CORRECTABLE_SYMBOLS: u8 = 3;

/// Data symbols per codeword.
pub const RS_DATA_SYMBOLS: usize = 9;

/// Symbols per codeword.
pub const RS_CODEWORD_SYMBOLS: usize = 15;

/// A 12-byte time frame.
pub type TimeFrame = [u8; FRAME_BYTES];

/// A Reed-Solomon codeword in symbol form, data symbols first.
pub type RsCodeword = [u8; RS_CODEWORD_SYMBOLS];

/// Bit offset of the message window inside bytes 3..=7 (the static prefix
/// sits above it).
const WINDOW_FIRST_BIT: usize = 3;

/// Check the fields every valid time frame carries verbatim: sync bytes,
/// start marker and message prefix.
pub fn has_valid_static_fields(frame: &TimeFrame) -> bool {
    frame[0] == 0x55
        && frame[1] == 0x55
        && frame[2] == FRAME_START_BYTE
        && frame[3] >> 5 == TIME_MESSAGE_PREFIX
}

/// Gather the Reed-Solomon codeword from a frame: nine data nibbles from
/// the message window of bytes 3..=7 and six parity nibbles from bytes
/// 8..=10, high nibble first.
pub fn extract_rs_codeword(frame: &TimeFrame) -> RsCodeword {
    let bits = frame[3..8].view_bits::<Msb0>();
    let mut codeword = [0u8; RS_CODEWORD_SYMBOLS];

    for (symbol, cell) in codeword[..RS_DATA_SYMBOLS].iter_mut().enumerate() {
        let offset = WINDOW_FIRST_BIT + 4 * symbol;
        *cell = bits[offset..offset + 4].load_be::<u8>();
    }
    for (pair, &byte) in frame[8..11].iter().enumerate() {
        codeword[RS_DATA_SYMBOLS + 2 * pair] = byte >> 4;
        codeword[RS_DATA_SYMBOLS + 2 * pair + 1] = byte & 0x0F;
    }

    codeword
}

/// Write a codeword back into the frame, the exact inverse of
/// [`extract_rs_codeword`]. The static prefix of byte 3 and the LSB of
/// byte 7 are left untouched.
pub fn apply_rs_codeword(frame: &mut TimeFrame, codeword: &RsCodeword) {
    let bits = frame[3..8].view_bits_mut::<Msb0>();
    for (symbol, &value) in codeword[..RS_DATA_SYMBOLS].iter().enumerate() {
        let offset = WINDOW_FIRST_BIT + 4 * symbol;
        bits[offset..offset + 4].store_be(value);
    }
    for (pair, byte) in frame[8..11].iter_mut().enumerate() {
        *byte = (codeword[RS_DATA_SYMBOLS + 2 * pair] << 4)
            | codeword[RS_DATA_SYMBOLS + 2 * pair + 1];
    }
}

/// XOR bytes 3..=7 with the scrambling word. Self-inverse, so the same
/// call whitens on transmit and de-whitens on receive.
pub fn scramble(frame: &mut TimeFrame) {
    for (byte, key) in frame[3..8].iter_mut().zip(SCRAMBLING_WORD) {
        *byte ^= key;
    }
}

/// Verify the frame CRC, trying an SK1 repair on mismatch.
///
/// SK1 (byte 7 LSB) is the one message bit outside the Reed-Solomon window,
/// so a lone surviving bit error can only live there: flip it and re-check.
/// Returns false, with the frame restored, when the CRC still disagrees.
pub fn correct_sk1_with_crc(frame: &mut TimeFrame) -> bool {
    if crc8::crc8(&frame[3..8]) == frame[11] {
        return true;
    }
    frame[7] ^= 0x01;
    if crc8::crc8(&frame[3..8]) == frame[11] {
        return true;
    }
    frame[7] ^= 0x01;
    false
}
