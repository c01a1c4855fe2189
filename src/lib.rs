//! # bgv-core: leveled BGV homomorphic encryption
//!
//! Integer vectors are encoded as polynomials over R_p = Z_p[X]/(X^d + 1),
//! encrypted under a public key into R_q, and combined homomorphically with
//! additions and multiplications. A chain of moduli q_0 < q_1 < ... < q_L,
//! all congruent to 1 mod p, lets a ciphertext move down one level at a time
//! while keeping its plaintext. Neighbouring moduli are nearly equal, so a
//! switch does not reduce the noise; q_0 is sized for one multiplication.
//!
//! Arithmetic is plain schoolbook multiplication over a single 64-bit
//! modulus; this crate favours clarity over speed and its parameters are
//! far too small to be secure.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bgv_core::prelude::*;
//!
//! let context = Context::new(8, 8, 2).unwrap();
//! let mut keygen = KeyGenerator::new(&context).unwrap();
//! let public_key = keygen.create_public_key().unwrap();
//! let relin_keys = keygen.create_relin_keys().unwrap();
//!
//! let encoder = Encoder::new(&context);
//! let mut encryptor = Encryptor::new(&context, &public_key).unwrap();
//! let decryptor = Decryptor::new(&context, keygen.secret_key());
//! let evaluator = Evaluator::new(&context);
//!
//! let a = encryptor.encrypt(&encoder.encode(&[1, 2, 3]).unwrap()).unwrap();
//! let b = encryptor.encrypt(&encoder.encode(&[4, 5]).unwrap()).unwrap();
//!
//! let product = evaluator.multiply(&a, &b).unwrap();
//! let product = evaluator.relinearize(&product, &relin_keys).unwrap();
//! let product = evaluator.mod_switch(&product).unwrap();
//!
//! let result = encoder.decode(&decryptor.decrypt(&product).unwrap()).unwrap();
//! // (1 + 2x + 3x^2)(4 + 5x)
//! assert_eq!(&result[..4], &[4, 13, 22, 15]);
//! ```

pub mod bgv;
pub mod error;
pub mod params;
pub mod ring;
pub mod sampling;
pub mod serialization;

/// Convenient re-exports for common types and functions.
pub mod prelude {
    pub use crate::bgv::{
        Ciphertext, Decryptor, Encoder, Encryptor, Evaluator, KeyGenerator, Plaintext, PublicKey,
        RelinKeys, SecretDistribution, SecretKey, SwitchKeys,
    };
    pub use crate::error::{BgvError, ErrorKind, Result};
    pub use crate::params::{Context, ContextBuilder, EncryptionParameters};
    pub use crate::ring::{PolyMatrix, Polynomial};
    pub use crate::sampling::Sampler;
    pub use crate::serialization::{from_bytes, to_bytes};
}
