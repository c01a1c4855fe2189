use rand::Rng;

/// Cumulative distribution table of a centered discrete Gaussian over Z,
/// truncated to [-tail, tail] with tail = ceil(6σ).
#[derive(Clone, Debug)]
pub struct GaussianTable {
    tail: i64,
    cdf: Vec<f64>,
}

impl GaussianTable {
    pub fn new(sigma: f64) -> Self {
        let tail = (6.0 * sigma).ceil() as i64;
        let two_sigma_sq = 2.0 * sigma * sigma;

        let mut cdf = Vec::with_capacity((2 * tail + 1) as usize);
        let mut cumulative = 0.0f64;
        for x in -tail..=tail {
            cumulative += (-((x * x) as f64) / two_sigma_sq).exp();
            cdf.push(cumulative);
        }
        Self { tail, cdf }
    }

    /// Largest magnitude a draw can take.
    pub fn tail(&self) -> i64 {
        self.tail
    }

    /// Draw one value.
    ///
    /// Every table entry is visited and the result picked with an integer
    /// mask, so the running time does not depend on the sample.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> i64 {
        let total = self.cdf.last().copied().unwrap_or(1.0);
        let u: f64 = rng.random::<f64>() * total;

        let mut result = self.tail;
        for (i, &bound) in self.cdf.iter().enumerate().rev() {
            let mask = ((u < bound) as i64).wrapping_neg();
            let candidate = -self.tail + i as i64;
            result = (candidate & mask) | (result & !mask);
        }
        result
    }

    /// Draw `d` values and store them mod `q`, negatives as q - |s|.
    pub fn sample_coeffs<R: Rng>(&self, d: usize, q: u64, rng: &mut R) -> Vec<u64> {
        (0..d)
            .map(|_| (self.sample(rng) as i128).rem_euclid(q as i128) as u64)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_gaussian_distribution() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let sigma = 3.2;
        let table = GaussianTable::new(sigma);
        let n = 10000;

        let samples: Vec<i64> = (0..n).map(|_| table.sample(&mut rng)).collect();

        let mean: f64 = samples.iter().map(|&x| x as f64).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.5, "mean = {mean}");

        let var: f64 = samples.iter().map(|&x| (x as f64 - mean).powi(2)).sum::<f64>() / n as f64;
        let expected_var = sigma * sigma;
        assert!((var - expected_var).abs() < 2.0, "var = {var}, expected ≈ {expected_var}");

        assert_eq!(table.tail(), 20);
        for &s in &samples {
            assert!(s.abs() <= table.tail(), "sample {s} exceeds tail bound");
        }
    }

    #[test]
    fn test_negative_draws_wrap() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let table = GaussianTable::new(3.2);
        let q = 65537u64;
        let coeffs = table.sample_coeffs(1024, q, &mut rng);
        assert_eq!(coeffs.len(), 1024);
        for &c in &coeffs {
            assert!(c <= 20 || c >= q - 20, "coefficient {c} is not small");
        }
        assert!(coeffs.iter().any(|&c| c > q / 2));
    }
}
