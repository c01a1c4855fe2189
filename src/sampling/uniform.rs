use rand::Rng;
use rand::seq::index;

/// `d` coefficients uniform in [0, q).
///
/// # Panics
///
/// Panics if `q < 2`. The ternary and Hamming samplers share the precondition.
pub fn sample_uniform_coeffs<R: Rng>(d: usize, q: u64, rng: &mut R) -> Vec<u64> {
    assert!(q > 1, "modulus must be > 1");
    // Rejection sampling on the smallest covering power of two avoids bias
    let mask = if q.is_power_of_two() {
        q - 1
    } else {
        u64::MAX >> q.leading_zeros()
    };

    (0..d)
        .map(|_| loop {
            let val = rng.random::<u64>() & mask;
            if val < q {
                break val;
            }
        })
        .collect()
}

/// `d` coefficients uniform in {-1, 0, 1}, stored as {q-1, 0, 1}.
pub fn sample_ternary_coeffs<R: Rng>(d: usize, q: u64, rng: &mut R) -> Vec<u64> {
    assert!(q > 1, "modulus must be > 1");
    (0..d)
        .map(|_| {
            let val = loop {
                let r = rng.random::<u8>() & 0x03;
                if r < 3 {
                    break r;
                }
            };
            match val {
                0 => q - 1,
                1 => 0,
                _ => 1,
            }
        })
        .collect()
}

/// `d` coefficients with exactly `h` of them set to ±1 at random positions.
/// Callers check `h <= d`.
pub fn sample_hamming_coeffs<R: Rng>(d: usize, q: u64, h: usize, rng: &mut R) -> Vec<u64> {
    assert!(q > 1, "modulus must be > 1");
    let mut coeffs = vec![0u64; d];
    for pos in index::sample(rng, d, h) {
        coeffs[pos] = if rng.random::<bool>() { 1 } else { q - 1 };
    }
    coeffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_uniform() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let coeffs = sample_uniform_coeffs(1024, 65537, &mut rng);
        assert_eq!(coeffs.len(), 1024);
        assert!(coeffs.iter().all(|&c| c < 65537));
        // a few values should land in the top half
        assert!(coeffs.iter().any(|&c| c > 32768));
    }

    #[test]
    fn test_uniform_small_moduli() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        assert!(sample_uniform_coeffs(64, 2, &mut rng).iter().all(|&c| c < 2));
        assert!(sample_uniform_coeffs(64, 3, &mut rng).iter().all(|&c| c < 3));
    }

    #[test]
    #[should_panic(expected = "modulus must be > 1")]
    fn test_uniform_rejects_zero_modulus() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        sample_uniform_coeffs(8, 0, &mut rng);
    }

    #[test]
    fn test_ternary() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let q = 65537u64;
        let coeffs = sample_ternary_coeffs(1024, q, &mut rng);
        for &c in &coeffs {
            assert!(c == 0 || c == 1 || c == q - 1, "invalid ternary coeff: {c}");
        }
        let zeros = coeffs.iter().filter(|&&c| c == 0).count();
        let ones = coeffs.iter().filter(|&&c| c == 1).count();
        let neg_ones = coeffs.iter().filter(|&&c| c == q - 1).count();
        assert!(zeros > 200 && zeros < 500, "zeros = {zeros}");
        assert!(ones > 200 && ones < 500, "ones = {ones}");
        assert!(neg_ones > 200 && neg_ones < 500, "neg_ones = {neg_ones}");
    }

    #[test]
    fn test_hamming_weight() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let q = 97u64;
        let coeffs = sample_hamming_coeffs(64, q, 10, &mut rng);
        assert_eq!(coeffs.iter().filter(|&&c| c != 0).count(), 10);
        assert!(coeffs.iter().all(|&c| c == 0 || c == 1 || c == q - 1));
    }
}
