//! Reed-Solomon Error Correction
//!
//! Parametric systematic Reed-Solomon codec over GF(2^m). A code built for
//! `symbol_bits = m` and `correctable = t` has codeword length
//! `n = 2^m - 1` symbols, `2t` parity symbols and `n - 2t` data symbols,
//! and corrects up to `t` symbol errors per codeword.
//!
//! The time broadcast uses RS(15,9): 4-bit symbols, t = 3.
//!
//! **Encoding** is a shift-register long division by the generator
//! polynomial g(X) = (X + α)(X + α²)···(X + α^2t).
//!
//! **Decoding** computes syndromes, runs Berlekamp-Massey for the error
//! locator, locates roots by Chien search and evaluates magnitudes with
//! Forney's formula. A codeword with all-zero syndromes is returned
//! unchanged without running the machinery.
//!
//! Codewords are polynomial-form symbol slices with index 0 holding the
//! highest-degree coefficient, laid out as data followed by parity.

pub mod field;

mod decode;
mod encode;

use alloc::vec;
use alloc::vec::Vec;

use snafu::Snafu;

use field::GfField;

/// Decode failure conditions.
///
/// All of them mean the received word is unrecoverable; the caller decides
/// whether to drop the enclosing frame or retry with fresh data.
#[derive(Debug, Snafu, Clone, Copy, PartialEq, Eq)]
pub enum RsError {
    /// Received word length differs from the codeword length
    #[snafu(display("received {got} symbols, codeword takes {expected}"))]
    InvalidLength { got: usize, expected: usize },

    /// Error-locator degree exceeds the correction capability
    #[snafu(display("error locator degree {found} exceeds t = {max}"))]
    TooManyErrors { found: usize, max: usize },

    /// Chien search root count does not match the locator degree
    #[snafu(display("located {found} error positions, locator degree is {expected}"))]
    ChienSearchFailed { found: usize, expected: usize },

    /// Corrected word still fails the syndrome check
    #[snafu(display("correction left non-zero syndromes"))]
    CorrectionFailed,
}

/// Reed-Solomon encoder and decoder.
///
/// Field tables and the generator polynomial are immutable after
/// construction and may be shared read-only across threads.
#[derive(Debug, Clone)]
pub struct ReedSolomon {
    field: GfField,
    correctable: usize,
    /// Generator polynomial, highest-degree (monic) coefficient first.
    generator: Vec<u8>,
}

impl ReedSolomon {
    /// Build a codec for `symbol_bits`-wide symbols correcting up to
    /// `correctable` symbol errors.
    pub fn new(symbol_bits: u8, correctable: u8) -> Self {
        let field = GfField::new(symbol_bits);
        let correctable = correctable as usize;
        assert!(
            field.order() > 2 * correctable,
            "parity does not fit the codeword"
        );
        let generator = Self::build_generator(&field, correctable);
        Self {
            field,
            correctable,
            generator,
        }
    }

    /// Codeword length n = 2^m - 1.
    pub fn codeword_len(&self) -> usize {
        self.field.order()
    }

    /// Data length k = n - 2t.
    pub fn data_len(&self) -> usize {
        self.field.order() - self.parity_len()
    }

    /// Parity length 2t.
    pub fn parity_len(&self) -> usize {
        2 * self.correctable
    }

    /// Maximum number of correctable symbol errors.
    pub fn correctable(&self) -> usize {
        self.correctable
    }

    pub(crate) fn field(&self) -> &GfField {
        &self.field
    }

    pub(crate) fn generator(&self) -> &[u8] {
        &self.generator
    }

    /// g(X) = prod_{i=1..2t} (X + alpha^i), kept highest-degree first.
    fn build_generator(field: &GfField, correctable: usize) -> Vec<u8> {
        let parity = 2 * correctable;
        let mut generator = vec![0u8; parity + 1];
        generator[parity] = 1;

        for i in 0..parity {
            let root = field.alpha(i + 1);
            let mut next = vec![0u8; parity + 1];
            for j in 0..=parity {
                if generator[j] != 0 {
                    if j > 0 {
                        next[j - 1] ^= generator[j];
                    }
                    next[j] ^= field.mul(generator[j], root);
                }
            }
            generator = next;
        }

        generator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rs15_9_dimensions() {
        let rs = ReedSolomon::new(4, 3);
        assert_eq!(rs.codeword_len(), 15);
        assert_eq!(rs.data_len(), 9);
        assert_eq!(rs.parity_len(), 6);
        assert_eq!(rs.correctable(), 3);
    }

    #[test]
    fn test_rs15_9_generator_polynomial() {
        // g(X) = prod_{i=1..6}(X + alpha^i) over GF(16) with p(x) = x^4+x+1
        let rs = ReedSolomon::new(4, 3);
        assert_eq!(rs.generator(), &[1, 7, 9, 3, 12, 10, 12]);
    }

    #[test]
    fn test_generator_has_expected_roots() {
        let rs = ReedSolomon::new(4, 3);
        let field = rs.field();
        for i in 1..=6 {
            let x = field.alpha(i);
            // Horner, highest-degree coefficient first
            let mut value = 0u8;
            for &coefficient in rs.generator() {
                value = field.mul(value, x) ^ coefficient;
            }
            assert_eq!(value, 0, "alpha^{i} is not a root");
        }
        // alpha^7 must not be a root
        let x = field.alpha(7);
        let mut value = 0u8;
        for &coefficient in rs.generator() {
            value = field.mul(value, x) ^ coefficient;
        }
        assert_ne!(value, 0);
    }
}
