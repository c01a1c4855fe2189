use std::sync::Arc;

use crate::error::Result;
use crate::params::{Context, ContextBuilder};

/// Tiny parameters for tests and examples: d = 8, p = 241, two levels above
/// level 0. Not secure.
pub fn toy() -> Result<Arc<Context>> {
    ContextBuilder::new()
        .ring_degree(8)
        .plain_modulus_bits(8)
        .depth(2)
        .build()
}

/// Slightly larger demo parameters: d = 32, p = 769, depth 3. Not secure.
pub fn small() -> Result<Arc<Context>> {
    ContextBuilder::new()
        .ring_degree(32)
        .plain_modulus_bits(10)
        .depth(3)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_build() {
        let ctx = toy().unwrap();
        assert_eq!(ctx.plain_modulus_value(), 241);
        assert_eq!(ctx.depth(), 2);

        let ctx = small().unwrap();
        assert_eq!(ctx.poly_modulus_degree(), 32);
        assert_eq!(ctx.plain_modulus_value(), 769);
        assert!(ctx.first_param().q() < 1 << 62);
    }
}
