use std::sync::Arc;

use tracing::{debug, instrument};

use crate::bgv::encrypt::check_plaintext;
use crate::bgv::keys::{RelinKeys, SwitchKeys};
use crate::bgv::keyswitch::{relinearize_components, switch_components};
use crate::bgv::modswitch::mod_switch_components;
use crate::bgv::{Ciphertext, Plaintext};
use crate::error::{BgvError, Result};
use crate::params::{Context, EncryptionParameters};
use crate::ring::{PolyMatrix, Polynomial};

/// Homomorphic operations on ciphertexts of one context.
///
/// Binary operations require both operands at the same level; nothing is
/// switched implicitly. Sizes follow the usual BGV rules: `multiply` takes two
/// size-2 ciphertexts and returns size 3, `relinearize` brings that back to 2.
pub struct Evaluator {
    context: Arc<Context>,
}

impl Evaluator {
    pub fn new(context: &Arc<Context>) -> Self {
        Self { context: Arc::clone(context) }
    }

    pub fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.check_pair(a, b)?;
        if a.size() != b.size() {
            return Err(BgvError::SizeMismatch { expected: a.size(), got: b.size() });
        }
        Ciphertext::new(a.data().add(b.data())?, *a.params())
    }

    pub fn sub(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.check_pair(a, b)?;
        if a.size() != b.size() {
            return Err(BgvError::SizeMismatch { expected: a.size(), got: b.size() });
        }
        Ciphertext::new(a.data().sub(b.data())?, *a.params())
    }

    pub fn negate(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        self.check_ciphertext(ct)?;
        Ciphertext::new(ct.data().neg(), *ct.params())
    }

    pub fn add_plain(&self, ct: &Ciphertext, pt: &Plaintext) -> Result<Ciphertext> {
        let m = self.lift(ct, pt)?;
        let mut data = ct.data().clone();
        let c0 = data[(0, 0)].add(&m)?;
        data.set(0, 0, c0)?;
        Ciphertext::new(data, *ct.params())
    }

    pub fn sub_plain(&self, ct: &Ciphertext, pt: &Plaintext) -> Result<Ciphertext> {
        let m = self.lift(ct, pt)?;
        let mut data = ct.data().clone();
        let c0 = data[(0, 0)].sub(&m)?;
        data.set(0, 0, c0)?;
        Ciphertext::new(data, *ct.params())
    }

    /// Multiply every component by the plaintext lifted to R_q.
    pub fn multiply_plain(&self, ct: &Ciphertext, pt: &Plaintext) -> Result<Ciphertext> {
        let m = self.lift(ct, pt)?;
        let polys = ct.data().iter()
            .map(|c| c.mul(&m))
            .collect::<Result<Vec<_>>>()?;
        Ciphertext::new(PolyMatrix::column(polys)?, *ct.params())
    }

    /// Tensor product `(c0·k0, c0·k1 + c1·k0, c1·k1)` of two size-2 ciphertexts.
    #[instrument(skip_all, fields(level = a.level()))]
    pub fn multiply(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.check_pair(a, b)?;
        for ct in [a, b] {
            if ct.size() != 2 {
                return Err(BgvError::SizeMismatch { expected: 2, got: ct.size() });
            }
        }
        let (c0, c1) = (&a.data()[(0, 0)], &a.data()[(1, 0)]);
        let (k0, k1) = (&b.data()[(0, 0)], &b.data()[(1, 0)]);

        let d0 = c0.mul(k0)?;
        let d1 = c0.mul(k1)?.add(&c1.mul(k0)?)?;
        let d2 = c1.mul(k1)?;
        Ciphertext::new(PolyMatrix::column(vec![d0, d1, d2])?, *a.params())
    }

    /// Size 3 to size 2 under the same secret.
    #[instrument(skip_all, fields(level = ct.level()))]
    pub fn relinearize(&self, ct: &Ciphertext, relin_keys: &RelinKeys) -> Result<Ciphertext> {
        self.check_ciphertext(ct)?;
        if ct.size() != 3 {
            return Err(BgvError::SizeMismatch { expected: 3, got: ct.size() });
        }
        let rk = relin_keys.data(ct.level())?;
        check_key_modulus(rk, ct)?;
        let width = self.context.gadget_width(ct.level())?;
        if rk.rows() != width {
            return Err(BgvError::DimensionMismatch { expected: width, got: rk.rows() });
        }
        Ciphertext::new(relinearize_components(ct.data(), rk)?, *ct.params())
    }

    /// Re-encrypt a size-2 ciphertext under the target secret of `switch_keys`.
    #[instrument(skip_all, fields(level = ct.level()))]
    pub fn key_switch(&self, ct: &Ciphertext, switch_keys: &SwitchKeys) -> Result<Ciphertext> {
        self.check_ciphertext(ct)?;
        if ct.size() != 2 {
            return Err(BgvError::SizeMismatch { expected: 2, got: ct.size() });
        }
        let wk = switch_keys.data(ct.level())?;
        check_key_modulus(wk, ct)?;
        let width = 2 * self.context.gadget_width(ct.level())?;
        if wk.rows() != width {
            return Err(BgvError::DimensionMismatch { expected: width, got: wk.rows() });
        }
        Ciphertext::new(switch_components(ct.data(), wk)?, *ct.params())
    }

    /// Move to the next level down.
    ///
    /// Adjacent moduli differ only by 2p, so the noise keeps roughly its
    /// absolute size; switching spends a level rather than buying headroom.
    #[instrument(skip_all, fields(level = ct.level()))]
    pub fn mod_switch(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        let current = self.check_ciphertext(ct)?;
        let next = *self.context.next_param(current)?;
        let p = self.context.plain_modulus_value();
        let data = mod_switch_components(ct.data(), next.q(), p)?;
        debug!(from = ct.params().q(), to = next.q(), "switched modulus");
        Ciphertext::new(data, next)
    }

    /// Switch down repeatedly until `level` is reached.
    pub fn mod_switch_to(&self, ct: &Ciphertext, level: usize) -> Result<Ciphertext> {
        if level > ct.level() {
            return Err(BgvError::LevelMismatch { expected: ct.level(), got: level });
        }
        let mut current = ct.clone();
        while current.level() > level {
            current = self.mod_switch(&current)?;
        }
        Ok(current)
    }

    pub fn add_plaintexts(&self, a: &Plaintext, b: &Plaintext) -> Result<Plaintext> {
        self.check_plaintexts(a, b)?;
        Plaintext::new(a.poly().add(b.poly())?)
    }

    pub fn sub_plaintexts(&self, a: &Plaintext, b: &Plaintext) -> Result<Plaintext> {
        self.check_plaintexts(a, b)?;
        Plaintext::new(a.poly().sub(b.poly())?)
    }

    pub fn multiply_plaintexts(&self, a: &Plaintext, b: &Plaintext) -> Result<Plaintext> {
        self.check_plaintexts(a, b)?;
        Plaintext::new(a.poly().mul(b.poly())?)
    }

    /// The ciphertext's parameters must be exactly the context's parameters
    /// for its level; returns the context's copy.
    fn check_ciphertext(&self, ct: &Ciphertext) -> Result<&EncryptionParameters> {
        let expected = self.context.param(ct.level())?;
        if ct.params().q() != expected.q() {
            return Err(BgvError::ModulusMismatch { expected: expected.q(), got: ct.params().q() });
        }
        if ct.params() != expected {
            return Err(BgvError::Malformed(format!(
                "ciphertext parameters {:?} disagree with the context at level {}",
                ct.params(),
                ct.level()
            )));
        }
        Ok(expected)
    }

    fn check_pair(&self, a: &Ciphertext, b: &Ciphertext) -> Result<()> {
        self.check_ciphertext(a)?;
        self.check_ciphertext(b)?;
        if a.level() != b.level() {
            return Err(BgvError::LevelMismatch { expected: a.level(), got: b.level() });
        }
        Ok(())
    }

    fn check_plaintexts(&self, a: &Plaintext, b: &Plaintext) -> Result<()> {
        let (d, p) = (self.context.poly_modulus_degree(), self.context.plain_modulus_value());
        check_plaintext(a, d, p)?;
        check_plaintext(b, d, p)
    }

    /// Plaintext as an element of R_q, keeping the sign of centered coefficients.
    fn lift(&self, ct: &Ciphertext, pt: &Plaintext) -> Result<Polynomial> {
        self.check_ciphertext(ct)?;
        let d = self.context.poly_modulus_degree();
        check_plaintext(pt, d, self.context.plain_modulus_value())?;
        pt.poly().reset(d, ct.params().q())
    }
}

fn check_key_modulus(key: &PolyMatrix, ct: &Ciphertext) -> Result<()> {
    if key.modulus() != ct.params().q() {
        return Err(BgvError::ModulusMismatch { expected: ct.params().q(), got: key.modulus() });
    }
    Ok(())
}
