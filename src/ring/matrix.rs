use std::ops::Index;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{BgvError, Result};
use crate::ring::poly::Polynomial;

/// Row-major matrix of polynomials sharing one ring degree and modulus.
///
/// Ciphertexts are size x 1 columns, secret keys 2 x 1 (or the 3 x 1 tensor
/// square) and public, relinearization and switch keys N x 2.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPolyMatrix")]
pub struct PolyMatrix {
    rows: usize,
    cols: usize,
    ring_degree: usize,
    modulus: u64,
    elems: Vec<Polynomial>,
}

#[derive(Deserialize)]
struct RawPolyMatrix {
    rows: usize,
    cols: usize,
    ring_degree: usize,
    modulus: u64,
    elems: Vec<Polynomial>,
}

impl TryFrom<RawPolyMatrix> for PolyMatrix {
    type Error = BgvError;

    fn try_from(raw: RawPolyMatrix) -> Result<Self> {
        if raw.modulus < 2 {
            return Err(BgvError::Malformed(format!("matrix modulus {}", raw.modulus)));
        }
        let m = PolyMatrix::from_polys(raw.rows, raw.cols, raw.elems)?;
        if m.rows * m.cols > 0 && (m.ring_degree != raw.ring_degree || m.modulus != raw.modulus) {
            return Err(BgvError::Malformed("matrix header disagrees with its entries".into()));
        }
        Ok(PolyMatrix { ring_degree: raw.ring_degree, modulus: raw.modulus, ..m })
    }
}

impl PolyMatrix {
    /// Zero matrix of the given shape.
    ///
    /// # Panics
    ///
    /// Panics if `modulus < 2`, like [`Polynomial::zero`].
    pub fn new(rows: usize, cols: usize, ring_degree: usize, modulus: u64) -> Self {
        Self {
            rows,
            cols,
            ring_degree,
            modulus,
            elems: vec![Polynomial::zero(ring_degree, modulus); rows * cols],
        }
    }

    /// Build a matrix from row-major entries, all of which must share degree and modulus.
    pub fn from_polys(rows: usize, cols: usize, elems: Vec<Polynomial>) -> Result<Self> {
        if elems.len() != rows * cols {
            return Err(BgvError::DimensionMismatch { expected: rows * cols, got: elems.len() });
        }
        let (ring_degree, modulus) = match elems.first() {
            Some(p) => (p.ring_degree(), p.modulus()),
            None => (0, 0),
        };
        for p in &elems {
            if p.ring_degree() != ring_degree {
                return Err(BgvError::DimensionMismatch { expected: ring_degree, got: p.ring_degree() });
            }
            if p.modulus() != modulus {
                return Err(BgvError::ModulusMismatch { expected: modulus, got: p.modulus() });
            }
        }
        Ok(Self { rows, cols, ring_degree, modulus, elems })
    }

    /// Column vector from a list of polynomials.
    pub fn column(polys: Vec<Polynomial>) -> Result<Self> {
        let rows = polys.len();
        Self::from_polys(rows, 1, polys)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn ring_degree(&self) -> usize {
        self.ring_degree
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Polynomial> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.elems.get(row * self.cols + col)
    }

    /// Replace entry (row, col). The polynomial must match the matrix degree and modulus.
    pub fn set(&mut self, row: usize, col: usize, poly: Polynomial) -> Result<()> {
        if row >= self.rows {
            return Err(BgvError::DimensionMismatch { expected: self.rows, got: row + 1 });
        }
        if col >= self.cols {
            return Err(BgvError::DimensionMismatch { expected: self.cols, got: col + 1 });
        }
        if poly.ring_degree() != self.ring_degree {
            return Err(BgvError::DimensionMismatch { expected: self.ring_degree, got: poly.ring_degree() });
        }
        if poly.modulus() != self.modulus {
            return Err(BgvError::ModulusMismatch { expected: self.modulus, got: poly.modulus() });
        }
        self.elems[row * self.cols + col] = poly;
        Ok(())
    }

    /// Entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Polynomial> {
        self.elems.iter()
    }

    fn check_same_shape(&self, other: &Self) -> Result<()> {
        if self.rows != other.rows {
            return Err(BgvError::DimensionMismatch { expected: self.rows, got: other.rows });
        }
        if self.cols != other.cols {
            return Err(BgvError::DimensionMismatch { expected: self.cols, got: other.cols });
        }
        self.check_same_ring(other)
    }

    fn check_same_ring(&self, other: &Self) -> Result<()> {
        if self.ring_degree != other.ring_degree {
            return Err(BgvError::DimensionMismatch { expected: self.ring_degree, got: other.ring_degree });
        }
        if self.modulus != other.modulus {
            return Err(BgvError::ModulusMismatch { expected: self.modulus, got: other.modulus });
        }
        Ok(())
    }

    fn map_entries<F>(&self, f: F) -> Self
    where
        F: Fn(&Polynomial) -> Polynomial,
    {
        Self { elems: self.elems.iter().map(f).collect(), ..self.clone_header() }
    }

    fn clone_header(&self) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            ring_degree: self.ring_degree,
            modulus: self.modulus,
            elems: Vec::new(),
        }
    }

    pub fn add(&self, other: &Self) -> Result<Self> {
        self.check_same_shape(other)?;
        let elems = self.elems.iter()
            .zip(other.elems.iter())
            .map(|(a, b)| a.add(b))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { elems, ..self.clone_header() })
    }

    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.check_same_shape(other)?;
        let elems = self.elems.iter()
            .zip(other.elems.iter())
            .map(|(a, b)| a.sub(b))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { elems, ..self.clone_header() })
    }

    pub fn neg(&self) -> Self {
        self.map_entries(Polynomial::neg)
    }

    pub fn scalar_mul(&self, scalar: u64) -> Self {
        self.map_entries(|p| p.scalar_mul(scalar))
    }

    /// Matrix product over R_q. Output cells are computed in parallel.
    pub fn mul(&self, other: &Self) -> Result<Self> {
        if self.cols != other.rows {
            return Err(BgvError::DimensionMismatch { expected: self.cols, got: other.rows });
        }
        self.check_same_ring(other)?;

        let (d, q) = (self.ring_degree, self.modulus);
        let inner = self.cols;
        let out_cols = other.cols;
        let elems: Vec<Polynomial> = (0..self.rows * out_cols)
            .into_par_iter()
            .map(|idx| {
                let (r, c) = (idx / out_cols, idx % out_cols);
                let mut acc = Polynomial::zero(d, q);
                for k in 0..inner {
                    let prod = self.elems[r * inner + k].mul_unchecked(&other.elems[k * out_cols + c]);
                    acc.add_assign_unchecked(&prod);
                }
                acc
            })
            .collect();

        Ok(Self {
            rows: self.rows,
            cols: out_cols,
            ring_degree: d,
            modulus: q,
            elems,
        })
    }

    /// Transpose.
    pub fn t(&self) -> Self {
        let mut elems = Vec::with_capacity(self.elems.len());
        for c in 0..self.cols {
            for r in 0..self.rows {
                elems.push(self.elems[r * self.cols + c].clone());
            }
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            ring_degree: self.ring_degree,
            modulus: self.modulus,
            elems,
        }
    }

    /// Reshape and move every entry to a new degree and modulus with
    /// [`Polynomial::reset`]. Cells outside the old shape become zero.
    pub fn reset(&self, rows: usize, cols: usize, ring_degree: usize, modulus: u64) -> Result<Self> {
        if modulus < 2 {
            return Err(BgvError::InvalidParam(format!("modulus must be >= 2, got {modulus}")));
        }
        let mut elems = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                let entry = match self.get(r, c) {
                    Some(p) => p.reset(ring_degree, modulus)?,
                    None => Polynomial::zero(ring_degree, modulus),
                };
                elems.push(entry);
            }
        }
        Ok(Self { rows, cols, ring_degree, modulus, elems })
    }
}

impl Zeroize for PolyMatrix {
    fn zeroize(&mut self) {
        for p in self.elems.iter_mut() {
            p.zeroize();
        }
    }
}

impl Index<(usize, usize)> for PolyMatrix {
    type Output = Polynomial;

    fn index(&self, (row, col): (usize, usize)) -> &Polynomial {
        assert!(row < self.rows && col < self.cols, "index ({row}, {col}) out of range");
        &self.elems[row * self.cols + col]
    }
}
