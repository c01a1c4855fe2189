use crate::ring::modular::{mod_pow, mul_mod};

/// Witnesses that make Miller-Rabin deterministic for every n < 2^64.
const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Deterministic Miller-Rabin primality test for 64-bit integers.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for &p in &WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }

    let mut d = n - 1;
    let mut s = 0u32;
    while d & 1 == 0 {
        d >>= 1;
        s += 1;
    }

    'witness: for &a in &WITNESSES {
        let mut x = mod_pow(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Largest prime with exactly `bits` bits that is congruent to 1 mod `step`.
///
/// Searches downwards from 2^bits - 1, as batching-friendly plaintext moduli
/// are usually chosen.
pub fn largest_prime_congruent_one(bits: u32, step: u64) -> Option<u64> {
    if bits < 2 || bits > 63 || step == 0 {
        return None;
    }
    let lower = 1u64 << (bits - 1);
    let upper = (1u64 << bits) - 1;

    // largest candidate <= upper with candidate = 1 mod step
    let mut candidate = upper - ((upper - 1) % step);
    while candidate >= lower {
        if is_prime(candidate) {
            return Some(candidate);
        }
        candidate = candidate.checked_sub(step)?;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_primes() {
        let primes: Vec<u64> = (0..60).filter(|&n| is_prime(n)).collect();
        assert_eq!(
            primes,
            vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59]
        );
    }

    #[test]
    fn test_large_values() {
        assert!(is_prime(65537));
        assert!(is_prime(1099509805057));
        assert!(is_prime(0xFFFF_FFFF_0000_0001));
        assert!(!is_prime(1099509805057 * 3));
        // strong pseudoprime to bases 2, 3, 5, 7
        assert!(!is_prime(3_215_031_751));
        assert!(!is_prime(u64::MAX));
    }

    #[test]
    fn test_plain_modulus_search() {
        // 8-bit primes = 1 mod 16 are 193 and 241
        assert_eq!(largest_prime_congruent_one(8, 16), Some(241));
        // 10-bit primes = 1 mod 64
        assert_eq!(largest_prime_congruent_one(10, 64), Some(769));
        // no 3-bit prime is 1 mod 16
        assert_eq!(largest_prime_congruent_one(3, 16), None);
    }
}
