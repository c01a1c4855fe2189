use crate::error::{BgvError, Result};
use crate::ring::{PolyMatrix, Polynomial};

/// Binary gadget decomposition.
///
/// Returns `width` polynomials where plane c holds bit c of every coefficient
/// of `poly` (taken in [0, q)), so that `poly = Σ_c 2^c · plane_c`. A width
/// of at least `bit_width(q)` reconstructs exactly.
pub fn decompose_bits(poly: &Polynomial, width: usize) -> Vec<Polynomial> {
    let q = poly.modulus();
    (0..width)
        .map(|c| {
            let plane = poly.coeffs().iter()
                .map(|&coeff| if c < 64 { (coeff >> c) & 1 } else { 0 })
                .collect();
            Polynomial::from_coeffs(plane, q)
        })
        .collect()
}

/// Fold the third component of `(c0, c1, c2)` back into the first two.
///
/// With D the 1 x N row of bit planes of c2, returns `(c0, c1) + (D · rk)ᵀ`.
pub fn relinearize_components(data: &PolyMatrix, rk: &PolyMatrix) -> Result<PolyMatrix> {
    if data.rows() != 3 {
        return Err(BgvError::SizeMismatch { expected: 3, got: data.rows() });
    }
    let width = rk.rows();
    let planes = decompose_bits(&data[(2, 0)], width);
    let d = PolyMatrix::from_polys(1, width, planes)?;
    let folded = d.mul(rk)?.t();

    let head = data.reset(2, 1, data.ring_degree(), data.modulus())?;
    head.add(&folded)
}

/// Re-encrypt `(c0, c1)` under the target key of a switching key.
///
/// D stacks the bit planes of c0 then c1 as a 2N x 1 column; returns
/// `(Dᵀ · wk)ᵀ`.
pub fn switch_components(data: &PolyMatrix, wk: &PolyMatrix) -> Result<PolyMatrix> {
    if data.rows() != 2 {
        return Err(BgvError::SizeMismatch { expected: 2, got: data.rows() });
    }
    if wk.rows() % 2 != 0 {
        return Err(BgvError::Malformed(format!(
            "switch key must have an even number of rows, got {}",
            wk.rows()
        )));
    }
    let width = wk.rows() / 2;
    let mut planes = decompose_bits(&data[(0, 0)], width);
    planes.extend(decompose_bits(&data[(1, 0)], width));
    let d = PolyMatrix::column(planes)?;

    Ok(d.t().mul(wk)?.t())
}
