//! Reed-Solomon decoding: syndromes, Berlekamp-Massey, Chien, Forney.

use alloc::vec;
use alloc::vec::Vec;

use super::{
    ChienSearchFailedSnafu, CorrectionFailedSnafu, InvalidLengthSnafu, ReedSolomon, RsError,
    TooManyErrorsSnafu,
};
use snafu::ensure;

impl ReedSolomon {
    /// Decode a received codeword, correcting up to `t` symbol errors.
    ///
    /// Returns the full corrected codeword. A word whose syndromes are all
    /// zero is returned as-is. Uncorrectable words (locator degree above
    /// `t`, or a root count that does not match the locator degree) fail
    /// with the corresponding [`RsError`].
    pub fn decode(&self, received: &[u8]) -> Result<Vec<u8>, RsError> {
        ensure!(
            received.len() == self.codeword_len(),
            InvalidLengthSnafu {
                got: received.len(),
                expected: self.codeword_len(),
            }
        );

        let mut codeword = received.to_vec();
        let syndromes = self.syndromes(&codeword);
        if syndromes.iter().all(|&s| s == 0) {
            return Ok(codeword);
        }

        let sigma = self.berlekamp_massey(&syndromes)?;
        let positions = self.chien_search(&sigma)?;
        let magnitudes = self.forney(&syndromes, &sigma, &positions)?;

        for (&position, &magnitude) in positions.iter().zip(&magnitudes) {
            codeword[position] ^= magnitude;
        }

        // A locator consistent with > t errors can still pass the root-count
        // check; the recomputed syndromes catch that case.
        ensure!(
            self.syndromes(&codeword).iter().all(|&s| s == 0),
            CorrectionFailedSnafu
        );

        Ok(codeword)
    }

    /// S_i = r(alpha^i) for i in 1..=2t.
    fn syndromes(&self, received: &[u8]) -> Vec<u8> {
        let field = self.field();
        (1..=self.parity_len())
            .map(|i| {
                let x = field.alpha(i);
                received
                    .iter()
                    .fold(0u8, |acc, &symbol| field.mul(acc, x) ^ symbol)
            })
            .collect()
    }

    /// Berlekamp-Massey: the minimal LFSR generating the syndrome sequence
    /// is the error-locator polynomial sigma, returned lowest-degree first
    /// with sigma[0] = 1.
    fn berlekamp_massey(&self, syndromes: &[u8]) -> Result<Vec<u8>, RsError> {
        let field = self.field();
        let parity_len = syndromes.len();

        let mut current = vec![0u8; parity_len + 1];
        current[0] = 1;
        let mut previous = current.clone();
        let mut errors = 0usize;
        let mut shift = 1usize;
        let mut last_discrepancy = 1u8;

        for n in 0..parity_len {
            let mut discrepancy = syndromes[n];
            for i in 1..=errors {
                discrepancy ^= field.mul(current[i], syndromes[n - i]);
            }

            if discrepancy == 0 {
                shift += 1;
                continue;
            }

            let update = |current: &mut Vec<u8>, previous: &[u8], coefficient: u8, shift: usize| {
                for i in 0..=parity_len {
                    if i + shift <= parity_len {
                        current[i + shift] ^= field.mul(coefficient, previous[i]);
                    }
                }
            };

            let coefficient = field.div(discrepancy, last_discrepancy);
            if 2 * errors <= n {
                let stashed = current.clone();
                update(&mut current, &previous, coefficient, shift);
                errors = n + 1 - errors;
                previous = stashed;
                last_discrepancy = discrepancy;
                shift = 1;
            } else {
                update(&mut current, &previous, coefficient, shift);
                shift += 1;
            }
        }

        let degree = current.iter().rposition(|&c| c != 0).unwrap_or(0);
        current.truncate(degree + 1);

        ensure!(
            degree <= self.correctable(),
            TooManyErrorsSnafu {
                found: degree,
                max: self.correctable(),
            }
        );

        Ok(current)
    }

    /// Chien search: evaluate sigma at every alpha^i; a root at alpha^i
    /// places an error at codeword index n-1 - ((order - i) mod order).
    fn chien_search(&self, sigma: &[u8]) -> Result<Vec<usize>, RsError> {
        let field = self.field();
        let order = field.order();
        let expected = sigma.len() - 1;

        let mut positions = Vec::with_capacity(expected);
        for i in 0..self.codeword_len() {
            let x = field.alpha(i);
            if self.eval_poly_low_first(sigma, x) == 0 {
                let power = (order - i) % order;
                positions.push(self.codeword_len() - 1 - power);
            }
        }

        ensure!(
            positions.len() == expected,
            ChienSearchFailedSnafu {
                found: positions.len(),
                expected,
            }
        );

        positions.sort_unstable();
        Ok(positions)
    }

    /// Forney: magnitudes e_j = Omega(X_j^-1) / sigma'(X_j^-1), with
    /// Omega = S(x)·sigma(x) mod x^2t and the first consecutive root at
    /// alpha^1.
    fn forney(
        &self,
        syndromes: &[u8],
        sigma: &[u8],
        positions: &[usize],
    ) -> Result<Vec<u8>, RsError> {
        let field = self.field();
        let order = field.order();
        let parity_len = self.parity_len();

        let mut omega = vec![0u8; parity_len];
        for i in 0..parity_len {
            for (j, &coefficient) in sigma.iter().enumerate().take(i + 1) {
                omega[i] ^= field.mul(coefficient, syndromes[i - j]);
            }
        }

        let mut magnitudes = Vec::with_capacity(positions.len());
        for &position in positions {
            let power = self.codeword_len() - 1 - position;
            let x_inv = field.alpha(order - power);

            let omega_value = self.eval_poly_low_first(&omega, x_inv);

            // Formal derivative over GF(2^m): only odd-degree terms survive.
            let mut sigma_prime = 0u8;
            for k in (1..sigma.len()).step_by(2) {
                sigma_prime ^= field.mul(sigma[k], field.pow(x_inv, k - 1));
            }
            ensure!(sigma_prime != 0, CorrectionFailedSnafu);

            magnitudes.push(field.div(omega_value, sigma_prime));
        }

        Ok(magnitudes)
    }

    /// Evaluate a polynomial stored lowest-degree first.
    fn eval_poly_low_first(&self, poly: &[u8], x: u8) -> u8 {
        let field = self.field();
        let mut value = 0u8;
        let mut x_power = 1u8;
        for &coefficient in poly {
            value ^= field.mul(coefficient, x_power);
            x_power = field.mul(x_power, x);
        }
        value
    }
}
