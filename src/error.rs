use thiserror::Error;

/// Coarse category of a [`BgvError`].
///
/// Every error in this crate is a caller bug or a parameter misconfiguration;
/// none of them is transient, so nothing here is worth retrying.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed parameters or containers.
    Construction,
    /// Operands that disagree in level, modulus, degree, shape or size.
    Mismatch,
    /// Running out of levels or out of room for the modulus chain.
    Exhaustion,
}

#[derive(Debug, Error)]
pub enum BgvError {
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    #[error("ring degree must be a power of 2 and at least 2, got {0}")]
    InvalidRingDegree(usize),

    #[error("depth must be at least 1, got {0}")]
    InvalidDepth(usize),

    #[error("no {bits}-bit prime p with p = 1 mod {two_d} exists")]
    PlainModulusTooSmall { bits: u32, two_d: usize },

    #[error("malformed container: {0}")]
    Malformed(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("modulus mismatch: expected {expected}, got {got}")]
    ModulusMismatch { expected: u64, got: u64 },

    #[error("level mismatch: expected {expected}, got {got}")]
    LevelMismatch { expected: usize, got: usize },

    #[error("ciphertext size mismatch: expected {expected}, got {got}")]
    SizeMismatch { expected: usize, got: usize },

    #[error("level {level} does not exist (depth {depth})")]
    UnknownLevel { level: usize, depth: usize },

    #[error("modulus switching cannot proceed below level {level}")]
    LevelExhausted { level: usize },

    #[error("modulus chain exhausted: {0}")]
    ModulusChainExhausted(String),
}

impl BgvError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BgvError::InvalidParam(_)
            | BgvError::InvalidRingDegree(_)
            | BgvError::InvalidDepth(_)
            | BgvError::PlainModulusTooSmall { .. }
            | BgvError::Malformed(_)
            | BgvError::Serialization(_) => ErrorKind::Construction,
            BgvError::DimensionMismatch { .. }
            | BgvError::ModulusMismatch { .. }
            | BgvError::LevelMismatch { .. }
            | BgvError::SizeMismatch { .. }
            | BgvError::UnknownLevel { .. } => ErrorKind::Mismatch,
            BgvError::LevelExhausted { .. } | BgvError::ModulusChainExhausted(_) => {
                ErrorKind::Exhaustion
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BgvError>;
