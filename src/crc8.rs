//! CRC-8 Implementation for e-CzasPL
//!
//! Each time frame carries a CRC-8 over frame bytes 3..=7 in its last byte.
//! The broadcast uses polynomial 0x07 with a zero initial value and no bit
//! reflection (the CRC-8/SMBUS parameter set).

use crc::{Algorithm, Crc};

/// e-CzasPL CRC-8 polynomial
pub const CRC8_POLYNOMIAL: u8 = 0x07;

/// e-CzasPL CRC-8 initialization value
pub const CRC8_INIT_VALUE: u8 = 0x00;

/// e-CzasPL CRC-8 algorithm configuration
const CRC_ECZAS: Algorithm<u8> = Algorithm {
    width: 8,
    poly: CRC8_POLYNOMIAL,
    init: CRC8_INIT_VALUE,
    refin: false,
    refout: false,
    xorout: 0x00,
    check: 0xF4,
    residue: 0x00,
};

/// e-CzasPL CRC instance
pub const ECZAS_CRC: Crc<u8> = Crc::<u8>::new(&CRC_ECZAS);

/// Calculate the CRC-8 of a byte slice.
///
/// Equivalent to feeding the bytes one at a time through a
/// shift-and-conditional-XOR register: `crc ^= byte`, then eight rounds of
/// `crc = (crc << 1) ^ (crc & 0x80 != 0 ? 0x07 : 0)`.
pub fn crc8(data: &[u8]) -> u8 {
    ECZAS_CRC.checksum(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc8_check_value() {
        // Standard CRC check string
        assert_eq!(crc8(b"123456789"), 0xF4);
    }

    #[test]
    fn test_crc8_empty_and_zero() {
        assert_eq!(crc8(&[]), 0x00);
        // Zero init and zero data keep the register at zero
        assert_eq!(crc8(&[0x00; 5]), 0x00);
    }

    #[test]
    fn test_crc8_known_frame_window() {
        // Captured from a live frame: scrambled bytes 3..=7 and the CRC the
        // transmitter appended
        let window = [0xAD, 0xF1, 0x30, 0x60, 0x0B];
        assert_eq!(crc8(&window), 0x37);
    }

    #[test]
    fn test_crc8_incremental_digest_matches_oneshot() {
        let data = [0xAA, 0x7A, 0x4C, 0xA4, 0xFE];
        let mut digest = ECZAS_CRC.digest();
        for byte in data {
            digest.update(&[byte]);
        }
        assert_eq!(digest.finalize(), crc8(&data));
    }

    #[test]
    fn test_crc8_single_bit_sensitivity() {
        let window = [0xAA, 0x47, 0x55, 0x4D, 0x2B];
        let reference = crc8(&window);
        for byte in 0..window.len() {
            for bit in 0..8 {
                let mut corrupted = window;
                corrupted[byte] ^= 1 << bit;
                assert_ne!(
                    crc8(&corrupted),
                    reference,
                    "single-bit flip at byte {} bit {} not detected",
                    byte,
                    bit
                );
            }
        }
    }
}
