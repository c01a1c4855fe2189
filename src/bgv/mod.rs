//! Leveled BGV: keys, encryption and homomorphic evaluation.

pub mod encoding;
pub mod encrypt;
pub mod eval;
pub mod keygen;
pub mod keys;
pub mod keyswitch;
pub mod modswitch;

pub use encoding::Encoder;
pub use encrypt::{Decryptor, Encryptor};
pub use eval::Evaluator;
pub use keygen::{KeyGenerator, SecretDistribution};
pub use keys::{PublicKey, RelinKeys, SecretKey, SwitchKeys};

use serde::{Deserialize, Serialize};

use crate::error::{BgvError, Result};
use crate::params::EncryptionParameters;
use crate::ring::{PolyMatrix, Polynomial};

/// A BGV ciphertext: a column of 2 polynomials, or 3 right after a
/// multiplication, over R_q of its level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCiphertext")]
pub struct Ciphertext {
    data: PolyMatrix,
    params: EncryptionParameters,
}

#[derive(Deserialize)]
struct RawCiphertext {
    data: PolyMatrix,
    params: EncryptionParameters,
}

impl TryFrom<RawCiphertext> for Ciphertext {
    type Error = BgvError;

    fn try_from(raw: RawCiphertext) -> Result<Self> {
        Ciphertext::new(raw.data, raw.params)
    }
}

impl Ciphertext {
    pub fn new(data: PolyMatrix, params: EncryptionParameters) -> Result<Self> {
        if data.cols() != 1 {
            return Err(BgvError::DimensionMismatch { expected: 1, got: data.cols() });
        }
        if !(2..=3).contains(&data.rows()) {
            return Err(BgvError::SizeMismatch { expected: 2, got: data.rows() });
        }
        if data.modulus() != params.q() {
            return Err(BgvError::ModulusMismatch { expected: params.q(), got: data.modulus() });
        }
        Ok(Self { data, params })
    }

    pub fn data(&self) -> &PolyMatrix {
        &self.data
    }

    pub fn params(&self) -> &EncryptionParameters {
        &self.params
    }

    pub fn level(&self) -> usize {
        self.params.level()
    }

    /// Number of polynomials (2 or 3).
    pub fn size(&self) -> usize {
        self.data.rows()
    }

    /// Component `i` of the ciphertext.
    pub fn component(&self, i: usize) -> Option<&Polynomial> {
        self.data.get(i, 0)
    }
}

/// A plaintext polynomial over R_p, held as a 1 x 1 matrix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPlaintext")]
pub struct Plaintext {
    data: PolyMatrix,
}

#[derive(Deserialize)]
struct RawPlaintext {
    data: PolyMatrix,
}

impl TryFrom<RawPlaintext> for Plaintext {
    type Error = BgvError;

    fn try_from(raw: RawPlaintext) -> Result<Self> {
        if raw.data.rows() != 1 || raw.data.cols() != 1 {
            return Err(BgvError::Malformed(format!(
                "plaintext must be 1 x 1, got {} x {}",
                raw.data.rows(),
                raw.data.cols()
            )));
        }
        Ok(Self { data: raw.data })
    }
}

impl Plaintext {
    pub fn new(poly: Polynomial) -> Result<Self> {
        Ok(Self { data: PolyMatrix::column(vec![poly])? })
    }

    pub fn data(&self) -> &PolyMatrix {
        &self.data
    }

    pub fn poly(&self) -> &Polynomial {
        &self.data[(0, 0)]
    }

    /// Plaintext modulus p.
    pub fn modulus(&self) -> u64 {
        self.data.modulus()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::params::Context;

    #[test]
    fn test_ciphertext_shape_checks() {
        let ctx = Context::new(8, 8, 2).unwrap();
        let params = *ctx.first_param();
        let q = params.q();

        assert!(Ciphertext::new(PolyMatrix::new(2, 1, 8, q), params).is_ok());
        assert!(Ciphertext::new(PolyMatrix::new(3, 1, 8, q), params).is_ok());

        let err = Ciphertext::new(PolyMatrix::new(4, 1, 8, q), params).unwrap_err();
        assert!(matches!(err, BgvError::SizeMismatch { got: 4, .. }));
        assert_eq!(err.kind(), ErrorKind::Mismatch);

        assert!(Ciphertext::new(PolyMatrix::new(2, 2, 8, q), params).is_err());
        let err = Ciphertext::new(PolyMatrix::new(2, 1, 8, ctx.last_param().q()), params).unwrap_err();
        assert!(matches!(err, BgvError::ModulusMismatch { .. }));
    }

    #[test]
    fn test_plaintext_accessors() {
        let pt = Plaintext::new(Polynomial::from_signed(&[1, -1, 2], 241)).unwrap();
        assert_eq!(pt.modulus(), 241);
        assert_eq!(pt.poly().coeffs(), &[1, 240, 2]);
        assert_eq!(pt.data().rows(), 1);
    }
}
