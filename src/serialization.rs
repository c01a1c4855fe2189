//! Binary encoding of ciphertexts, keys and parameters.
//!
//! bincode's default layout: little-endian integers, sequences prefixed with
//! their length as a u64. Decoding re-runs the same shape and range checks
//! as the constructors, so a tampered buffer fails instead of producing an
//! inconsistent value.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

pub fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}
