//! Overflow-safe arithmetic modulo a 64-bit modulus.
//!
//! Every routine widens to u128 before reducing, so inputs may use the full
//! u64 range and need not be reduced beforehand.

/// Modular addition: (a + b) mod m.
#[inline(always)]
pub fn add_mod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 + b as u128) % m as u128) as u64
}

/// Modular subtraction: (a - b) mod m.
#[inline(always)]
pub fn sub_mod(a: u64, b: u64, m: u64) -> u64 {
    add_mod(a, negate_mod(b, m), m)
}

/// Modular negation: (-a) mod m.
#[inline(always)]
pub fn negate_mod(a: u64, m: u64) -> u64 {
    let r = a % m;
    if r == 0 { 0 } else { m - r }
}

/// Modular multiplication: (a * b) mod m.
#[inline(always)]
pub fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

/// Full 128-bit product of two words, returned as (high, low).
#[inline(always)]
pub fn mul_wide(a: u64, b: u64) -> (u64, u64) {
    let product = a as u128 * b as u128;
    ((product >> 64) as u64, product as u64)
}

/// Divide the 128-bit value `hi·2^64 + lo` by `divisor`.
///
/// Returns (quotient, remainder). The quotient may need more than 64 bits.
#[inline(always)]
pub fn div_mod(hi: u64, lo: u64, divisor: u64) -> (u128, u64) {
    let dividend = ((hi as u128) << 64) | lo as u128;
    let d = divisor as u128;
    (dividend / d, (dividend % d) as u64)
}

/// Modular exponentiation: base^exp mod m.
pub fn mod_pow(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut result = 1 % m;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, m);
        }
        exp >>= 1;
        base = mul_mod(base, base, m);
    }
    result
}

/// Signed representative of `c mod m` in (-m/2, m/2].
///
/// `c > m/2` counts as negative. This is the sign convention shared by
/// [`Polynomial::reset`](crate::ring::Polynomial::reset) and decryption.
#[inline(always)]
pub fn centered(c: u64, m: u64) -> i128 {
    let c = c % m;
    if c > m / 2 {
        c as i128 - m as i128
    } else {
        c as i128
    }
}

/// Bit length of `q`, i.e. floor(log2 q) + 1. This is the gadget width used
/// by relinearization and key switching.
#[inline]
pub fn bit_width(q: u64) -> usize {
    (64 - q.leading_zeros()) as usize
}
