pub mod matrix;
pub mod modular;
pub mod poly;
pub mod prime;

pub use matrix::PolyMatrix;
pub use modular::{add_mod, centered, div_mod, mul_mod, mul_wide, negate_mod, sub_mod};
pub use poly::Polynomial;
