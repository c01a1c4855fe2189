use crate::error::Result;
use crate::ring::modular::{div_mod, mul_wide};
use crate::ring::{PolyMatrix, Polynomial};

/// Unreduced rescaled coefficient: the integer closest to `q_next·c/q` that is
/// congruent to `c` mod p.
fn rescale(c: u64, q: u64, q_next: u64, p: u64) -> i128 {
    let (hi, lo) = mul_wide(q_next, c);
    let (quot, rem) = div_mod(hi, lo, q);
    let scaled = if 2 * rem as u128 >= q as u128 { quot + 1 } else { quot } as i128;

    let diff = scaled - c as i128;
    let p = p as i128;
    // round(diff / p), halves away from -inf
    let k = (2 * diff + p).div_euclid(2 * p);
    c as i128 + k * p
}

/// Move one coefficient from modulus `q` to `q_next`, keeping its residue
/// modulo the plaintext modulus `p`. Both moduli must be 1 mod p.
pub fn drop_to_next_modulus(c: u64, q: u64, q_next: u64, p: u64) -> u64 {
    rescale(c, q, q_next, p).rem_euclid(q_next as i128) as u64
}

pub fn mod_switch_poly(poly: &Polynomial, q_next: u64, p: u64) -> Polynomial {
    let q = poly.modulus();
    let coeffs = poly.coeffs().iter()
        .map(|&c| drop_to_next_modulus(c, q, q_next, p))
        .collect();
    Polynomial::from_coeffs(coeffs, q_next)
}

/// Switch every entry of a ciphertext column to `q_next`.
pub fn mod_switch_components(data: &PolyMatrix, q_next: u64, p: u64) -> Result<PolyMatrix> {
    let polys = data.iter()
        .map(|poly| mod_switch_poly(poly, q_next, p))
        .collect();
    PolyMatrix::from_polys(data.rows(), data.cols(), polys)
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: u64 = 241;
    const Q: u64 = 241 * 1_000_000 + 1;
    const Q_NEXT: u64 = 241 * 999_998 + 1;

    #[test]
    fn test_rescale_keeps_residue() {
        for c in [0u64, 1, 2, 240, 241, 12345, Q / 2, Q / 2 + 1, Q - 1] {
            let r = rescale(c, Q, Q_NEXT, P);
            assert_eq!((r - c as i128).rem_euclid(P as i128), 0, "c = {c}");
            let exact = Q_NEXT as f64 * c as f64 / Q as f64;
            assert!((r as f64 - exact).abs() <= P as f64 / 2.0 + 1.0, "c = {c}, r = {r}");
        }
    }

    #[test]
    fn test_small_values_survive() {
        // c and q - c stand for +v and -v
        assert_eq!(drop_to_next_modulus(5, Q, Q_NEXT, P) % P, 5);
        let neg = drop_to_next_modulus(Q - 5, Q, Q_NEXT, P);
        assert!(neg > Q_NEXT / 2);
        assert_eq!((Q_NEXT - neg) % P, 5);
    }

    #[test]
    fn test_large_moduli() {
        let p = 769u64;
        let q = p * ((1u64 << 61) / p) + 1;
        let q_next = q - 2 * p;
        let c = q - 3;
        let r = drop_to_next_modulus(c, q, q_next, p);
        assert!(r < q_next);
        assert_eq!((q_next - r) % p, 3);
    }

    #[test]
    fn test_switch_poly() {
        let poly = Polynomial::from_signed(&[7, -7, 0, 120], Q);
        let out = mod_switch_poly(&poly, Q_NEXT, P);
        assert_eq!(out.modulus(), Q_NEXT);
        let centered: Vec<i128> = out.centered_coeffs().iter().map(|c| c.rem_euclid(P as i128)).collect();
        assert_eq!(centered, vec![7, P as i128 - 7, 0, 120]);
    }
}
