//! Systematic Reed-Solomon encoding.

use alloc::vec;
use alloc::vec::Vec;

use super::ReedSolomon;

impl ReedSolomon {
    /// Encode `data` (exactly [`data_len`](Self::data_len) symbols) into a
    /// full codeword of data followed by parity.
    ///
    /// Parity is the remainder of `data(X) * X^2t` divided by the generator
    /// polynomial, computed with the usual feedback shift register.
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        assert_eq!(
            data.len(),
            self.data_len(),
            "encode takes exactly k data symbols"
        );

        let parity_len = self.parity_len();
        let mut remainder = vec![0u8; parity_len];

        for &symbol in data {
            let feedback = symbol ^ remainder[0];
            remainder.copy_within(1.., 0);
            remainder[parity_len - 1] = 0;
            if feedback != 0 {
                for (cell, &coefficient) in remainder.iter_mut().zip(&self.generator()[1..]) {
                    *cell ^= self.field().mul(feedback, coefficient);
                }
            }
        }

        let mut codeword = Vec::with_capacity(self.codeword_len());
        codeword.extend_from_slice(data);
        codeword.extend_from_slice(&remainder);
        codeword
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_zero_data_gives_zero_parity() {
        let rs = ReedSolomon::new(4, 3);
        let codeword = rs.encode(&[0; 9]);
        assert_eq!(codeword, vec![0; 15]);
    }

    #[test]
    fn test_encode_is_systematic() {
        let rs = ReedSolomon::new(4, 3);
        let data = [5, 3, 13, 2, 6, 5, 2, 7, 15];
        let codeword = rs.encode(&data);
        assert_eq!(codeword.len(), 15);
        assert_eq!(&codeword[..9], &data);
    }

    #[test]
    fn test_encoded_word_has_zero_syndromes() {
        let rs = ReedSolomon::new(4, 3);
        let field = rs.field();
        let data = [1, 2, 3, 4, 5, 6, 7, 8, 9];
        let codeword = rs.encode(&data);
        for i in 1..=6 {
            let x = field.alpha(i);
            let mut value = 0u8;
            for &symbol in &codeword {
                value = field.mul(value, x) ^ symbol;
            }
            assert_eq!(value, 0, "syndrome at alpha^{i} is non-zero");
        }
    }
}
