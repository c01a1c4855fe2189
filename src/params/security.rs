//! Rough RLWE security estimation.
//!
//! Uses the Lindner-Peikert root-Hermite-factor model. This is only a sanity
//! check for parameter selection; cross-validate real deployments with the
//! lattice-estimator sage tool.

/// Estimate the security level (in bits) of RLWE with ring degree `n`,
/// modulus of `log2_q` bits and error width `sigma`.
///
/// log2(δ) = log2(q/σ)^2 / (4·n·log2 q), λ ≈ 1.8 / log2(δ) - 110.
pub fn estimate_security_bits(ring_degree: usize, log2_q: f64, sigma: f64) -> f64 {
    let n = ring_degree as f64;
    let log2_ratio = log2_q - sigma.log2();
    if n <= 0.0 || log2_q <= 0.0 || log2_ratio <= 0.0 {
        return 0.0;
    }
    let log2_delta = log2_ratio * log2_ratio / (4.0 * n * log2_q);
    (1.8 / log2_delta - 110.0).max(0.0)
}

/// Check if parameters meet a minimum security level.
pub fn check_security(ring_degree: usize, log2_q: f64, sigma: f64, min_bits: f64) -> bool {
    estimate_security_bits(ring_degree, log2_q, sigma) >= min_bits
}

/// Find the minimum power-of-two ring degree for the given modulus size and target.
pub fn min_ring_degree(log2_q: f64, sigma: f64, target_bits: f64) -> usize {
    let mut n = 2;
    while n < (1 << 17) {
        if check_security(n, log2_q, sigma, target_bits) {
            return n;
        }
        n *= 2;
    }
    n
}
