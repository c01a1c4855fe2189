//! Modulus chain derivation.
//!
//! Every ciphertext modulus is `k·p + 1` for an even `k`, so each level is
//! congruent to 1 modulo the plaintext modulus and modulus switching preserves
//! the plaintext residue exactly. The smallest modulus must absorb the worst
//! case noise of one multiplication of fresh ciphertexts, the gadget noise of
//! relinearization and key switching, and the rounding error of every switch.

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};

use crate::error::{BgvError, Result};

/// Largest supported ciphertext modulus, in bits.
pub const MAX_MODULUS_BITS: u32 = 62;

/// Largest gadget width a 64-bit modulus can need.
const MAX_GADGET_ROWS: u64 = 64;

/// Truncation bound of the discrete Gaussian, ⌈6σ⌉.
pub fn gaussian_tail(sigma: f64) -> u64 {
    (6.0 * sigma).ceil() as u64
}

/// Smallest admissible q_0 for ring degree `d`, plaintext modulus `p`,
/// depth `depth` and noise width `sigma`.
///
/// With every small polynomial bounded by T = ⌈6σ⌉ in infinity norm:
/// - fresh phase:  B = p·(1 + T + 2·d·T²)
/// - one product:  d·B²
/// - gadget noise: 3·p·64·d·T
/// - switching:    L·(p+1)·(1 + d·T + d²·T²)
///
/// q_0 must exceed four times the sum, which keeps the phase below q/2 with a
/// bit to spare.
pub fn required_min_modulus(d: usize, p: u64, depth: usize, sigma: f64) -> BigUint {
    let t = BigUint::from(gaussian_tail(sigma));
    let d = BigUint::from(d);
    let p = BigUint::from(p);
    let l = BigUint::from(depth);
    let one = BigUint::one();

    let t_sq = &t * &t;
    let fresh = &p * (&one + &t + BigUint::from(2u32) * &d * &t_sq);
    let mult = &d * &fresh * &fresh;
    let gadget = BigUint::from(3 * MAX_GADGET_ROWS) * &p * &d * &t;
    let switch = &l * (&p + &one) * (&one + &d * &t + &d * &d * &t_sq);

    BigUint::from(4u32) * (mult + gadget + switch) + one
}

/// Build L+1 moduli q_0 < q_1 < ... < q_L with q_i = k_i·p + 1, k_i even,
/// k_{i+1} = k_i + 2 and q_0 >= `min_modulus`.
pub fn build_modulus_chain(p: u64, depth: usize, min_modulus: &BigUint) -> Result<Vec<u64>> {
    let limit = 1u64 << MAX_MODULUS_BITS;
    let exhausted = || {
        BgvError::ModulusChainExhausted(format!(
            "{} levels above {} bits do not fit below 2^{}",
            depth + 1,
            min_modulus.bits(),
            MAX_MODULUS_BITS
        ))
    };

    let min = min_modulus.to_u64().filter(|&m| m < limit).ok_or_else(exhausted)?;
    let mut k = (min.saturating_sub(1)).div_ceil(p).max(2);
    if k % 2 == 1 {
        k += 1;
    }

    (0..=depth as u64)
        .map(|i| {
            k.checked_add(2 * i)
                .and_then(|ki| ki.checked_mul(p))
                .and_then(|kp| kp.checked_add(1))
                .filter(|&q| q < limit)
                .ok_or_else(exhausted)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_modulus_toy() {
        // d=8, p=241, L=2: B = 241·6421, the product term dominates.
        let min = required_min_modulus(8, 241, 2, 3.2);
        let fresh = 241u128 * 6421;
        assert!(min > BigUint::from(8 * fresh * fresh * 4));
        assert_eq!(min.bits(), 47);
    }

    #[test]
    fn test_chain_congruence_and_order() {
        let min = required_min_modulus(8, 241, 3, 3.2);
        let chain = build_modulus_chain(241, 3, &min).unwrap();
        assert_eq!(chain.len(), 4);
        assert!(BigUint::from(chain[0]) >= min);
        for q in &chain {
            assert_eq!(q % 241, 1);
            assert_eq!(((q - 1) / 241) % 2, 0);
        }
        for w in chain.windows(2) {
            assert!(w[1] > w[0]);
        }
    }

    #[test]
    fn test_chain_exhausted() {
        let min = required_min_modulus(4096, 65537, 2, 3.2);
        let err = build_modulus_chain(65537, 2, &min).unwrap_err();
        assert!(matches!(err, BgvError::ModulusChainExhausted(_)));
    }
}
