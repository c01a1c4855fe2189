use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::error::{BgvError, Result};
use crate::ring::PolyMatrix;

fn level_entry(keys: &[PolyMatrix], level: usize) -> Result<&PolyMatrix> {
    keys.get(level).ok_or(BgvError::UnknownLevel {
        level,
        depth: keys.len().saturating_sub(1),
    })
}

fn check_key_matrices(keys: &[PolyMatrix]) -> Result<()> {
    if keys.is_empty() {
        return Err(BgvError::Malformed("key holds no levels".into()));
    }
    for (level, m) in keys.iter().enumerate() {
        if m.rows() == 0 || m.cols() != 2 {
            return Err(BgvError::Malformed(format!(
                "key at level {level} is {} x {}, expected N x 2",
                m.rows(),
                m.cols()
            )));
        }
    }
    Ok(())
}

/// Secret key `(1, t)` stored per level.
///
/// Every level holds the same small `t`, reduced into that level's modulus.
/// Coefficients are wiped when the key is dropped.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "RawLeveledKey")]
pub struct SecretKey {
    keys: Vec<PolyMatrix>,
}

#[derive(Deserialize)]
struct RawLeveledKey {
    keys: Vec<PolyMatrix>,
}

impl TryFrom<RawLeveledKey> for SecretKey {
    type Error = BgvError;

    fn try_from(raw: RawLeveledKey) -> Result<Self> {
        SecretKey::new(raw.keys)
    }
}

impl SecretKey {
    pub fn new(keys: Vec<PolyMatrix>) -> Result<Self> {
        if keys.is_empty() {
            return Err(BgvError::Malformed("secret key holds no levels".into()));
        }
        for (level, m) in keys.iter().enumerate() {
            if m.rows() != 2 || m.cols() != 1 {
                return Err(BgvError::Malformed(format!(
                    "secret key at level {level} is {} x {}, expected 2 x 1",
                    m.rows(),
                    m.cols()
                )));
            }
        }
        Ok(Self { keys })
    }

    /// `(1, t)` over R_{q_level}.
    pub fn key(&self, level: usize) -> Result<&PolyMatrix> {
        level_entry(&self.keys, level)
    }

    /// Key matching a ciphertext of `size` polynomials: `(1, t)` for size 2,
    /// the tensor square `(1, t, t^2)` for size 3. The copy is wiped on drop.
    pub fn key_for_size(&self, level: usize, size: usize) -> Result<Zeroizing<PolyMatrix>> {
        let key = self.key(level)?;
        match size {
            2 => Ok(Zeroizing::new(key.clone())),
            3 => {
                let one = key[(0, 0)].clone();
                let t = key[(1, 0)].clone();
                let t_sq = t.mul(&t)?;
                Ok(Zeroizing::new(PolyMatrix::column(vec![one, t, t_sq])?))
            }
            got => Err(BgvError::SizeMismatch { expected: 2, got }),
        }
    }

    /// Number of levels.
    pub fn count(&self) -> usize {
        self.keys.len()
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        for m in self.keys.iter_mut() {
            m.zeroize();
        }
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey").field("levels", &self.keys.len()).finish_non_exhaustive()
    }
}

macro_rules! leveled_key {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "RawLeveledKey")]
        pub struct $name {
            keys: Vec<PolyMatrix>,
        }

        impl TryFrom<RawLeveledKey> for $name {
            type Error = BgvError;

            fn try_from(raw: RawLeveledKey) -> Result<Self> {
                $name::new(raw.keys)
            }
        }

        impl $name {
            /// Wrap one N x 2 matrix per level.
            pub fn new(keys: Vec<PolyMatrix>) -> Result<Self> {
                check_key_matrices(&keys)?;
                Ok(Self { keys })
            }

            /// Key rows `(b_i | B_i)` for `level`.
            pub fn data(&self, level: usize) -> Result<&PolyMatrix> {
                level_entry(&self.keys, level)
            }

            /// Number of levels.
            pub fn count(&self) -> usize {
                self.keys.len()
            }
        }
    };
}

leveled_key!(
    /// Public key `(b, B)` per level with `b = -B t + p e`.
    PublicKey
);

leveled_key!(
    /// Relinearization keys: row r at level l encrypts `2^r t^2` under `t`.
    RelinKeys
);

leveled_key!(
    /// Key-switching keys from one secret to another. Row `r·N + c` at a
    /// level with gadget width N encrypts `sk_from[r] · 2^c` under the target key.
    SwitchKeys
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::Polynomial;

    fn toy_secret() -> SecretKey {
        let q = 97;
        let one = Polynomial::constant(4, q, 1);
        let t = Polynomial::from_signed(&[1, -1, 0, 2], q);
        SecretKey::new(vec![PolyMatrix::column(vec![one, t]).unwrap()]).unwrap()
    }

    #[test]
    fn test_tensor_square() {
        let sk = toy_secret();
        let sq = sk.key_for_size(0, 3).unwrap();
        assert_eq!(sq.rows(), 3);
        let t = &sk.key(0).unwrap()[(1, 0)];
        assert_eq!(sq[(2, 0)], t.mul(t).unwrap());
        assert_eq!(*sk.key_for_size(0, 2).unwrap(), *sk.key(0).unwrap());
        assert!(matches!(sk.key_for_size(0, 4), Err(BgvError::SizeMismatch { got: 4, .. })));
        assert!(matches!(sk.key(1), Err(BgvError::UnknownLevel { level: 1, depth: 0 })));
    }

    #[test]
    fn test_key_copy_wipes_independently() {
        let sk = toy_secret();
        let mut sq = sk.key_for_size(0, 3).unwrap();
        sq.zeroize();
        assert_eq!(*sq, PolyMatrix::new(3, 1, 4, 97));
        assert_eq!(sk.key(0).unwrap()[(1, 0)], Polynomial::from_signed(&[1, -1, 0, 2], 97));
    }

    #[test]
    fn test_key_shape_validation() {
        assert!(PublicKey::new(vec![]).is_err());
        assert!(RelinKeys::new(vec![PolyMatrix::new(3, 1, 4, 97)]).is_err());
        assert!(SwitchKeys::new(vec![PolyMatrix::new(0, 2, 4, 97)]).is_err());
        let rk = RelinKeys::new(vec![PolyMatrix::new(7, 2, 4, 97), PolyMatrix::new(8, 2, 4, 193)]).unwrap();
        assert_eq!(rk.count(), 2);
        assert_eq!(rk.data(1).unwrap().rows(), 8);
        assert!(SecretKey::new(vec![PolyMatrix::new(3, 1, 4, 97)]).is_err());
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let text = format!("{:?}", toy_secret());
        assert!(text.contains("levels: 1"));
        assert!(!text.contains("coeffs"));
    }
}
