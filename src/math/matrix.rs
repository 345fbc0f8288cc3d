use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{check_len, Result};

/// Dense row-major matrix of `f64`.
///
/// Dense layers store their weights as an `input_size × size` matrix so that a
/// row vector input `x` maps to `x · W`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix { rows, cols, data: vec![0.0; rows * cols] }
    }

    /// Wraps `data` (row-major) as a `rows × cols` matrix.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Matrix> {
        check_len(rows * cols, data.len())?;
        Ok(Matrix { rows, cols, data })
    }

    /// He initialization: N(0, sqrt(2 / fan_in)) where `rows` is the fan-in.
    /// Suited to ReLU-family layers.
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::normal(rows, cols, (2.0 / rows.max(1) as f64).sqrt(), rng)
    }

    /// Xavier (Glorot) initialization: N(0, sqrt(1 / fan_in)).
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::normal(rows, cols, (1.0 / rows.max(1) as f64).sqrt(), rng)
    }

    fn normal<R: Rng + ?Sized>(rows: usize, cols: usize, std_dev: f64, rng: &mut R) -> Matrix {
        let data = (0..rows * cols)
            .map(|_| standard_normal(&mut *rng) * std_dev)
            .collect();
        Matrix { rows, cols, data }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn fill(&mut self, value: f64) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    /// Row vector times matrix: `x · self`, with `x.len() == rows`.
    pub fn left_mul(&self, x: &[f64]) -> Result<Vec<f64>> {
        check_len(self.rows, x.len())?;
        let mut out = vec![0.0; self.cols];
        for (row, &xi) in self.data.chunks_exact(self.cols.max(1)).zip(x) {
            for (o, &w) in out.iter_mut().zip(row) {
                *o += xi * w;
            }
        }
        Ok(out)
    }

    /// Matrix times column vector: `self · v`, with `v.len() == cols`.
    pub fn right_mul(&self, v: &[f64]) -> Result<Vec<f64>> {
        check_len(self.cols, v.len())?;
        Ok(self
            .data
            .chunks_exact(self.cols.max(1))
            .take(self.rows)
            .map(|row| row.iter().zip(v).map(|(w, d)| w * d).sum())
            .collect())
    }

    /// Accumulates the outer product `a ⊗ b` into `self`.
    pub fn add_outer(&mut self, a: &[f64], b: &[f64]) -> Result<()> {
        check_len(self.rows, a.len())?;
        check_len(self.cols, b.len())?;
        for (row, &ai) in self.data.chunks_exact_mut(self.cols.max(1)).zip(a) {
            for (cell, &bj) in row.iter_mut().zip(b) {
                *cell += ai * bj;
            }
        }
        Ok(())
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix::zeros(0, 0)
    }
}

/// One N(0, 1) sample via Box-Muller; both uniforms are drawn from (0, 1].
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = 1.0 - rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn m(rows: usize, cols: usize, data: &[f64]) -> Matrix {
        Matrix::from_vec(rows, cols, data.to_vec()).unwrap()
    }

    #[test]
    fn left_and_right_products() {
        // [[1, 2, 3], [4, 5, 6]]
        let w = m(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(w.left_mul(&[1.0, 1.0]).unwrap(), vec![5.0, 7.0, 9.0]);
        assert_eq!(w.right_mul(&[1.0, 0.0, 1.0]).unwrap(), vec![4.0, 10.0]);
        assert!(w.left_mul(&[1.0]).is_err());
    }

    #[test]
    fn outer_product_accumulates() {
        let mut g = Matrix::zeros(2, 2);
        g.add_outer(&[1.0, 2.0], &[3.0, 4.0]).unwrap();
        g.add_outer(&[1.0, 0.0], &[1.0, 1.0]).unwrap();
        assert_eq!(g.as_slice(), &[4.0, 5.0, 6.0, 8.0]);
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(Matrix::from_vec(2, 2, vec![0.0; 3]).is_err());
    }

    #[test]
    fn he_init_has_expected_spread() {
        let mut rng = rand::thread_rng();
        let w = Matrix::he(200, 50, &mut rng);
        let n = w.as_slice().len() as f64;
        let mean = w.as_slice().iter().sum::<f64>() / n;
        let var = w.as_slice().iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        assert_relative_eq!(var, 2.0 / 200.0, max_relative = 0.2);
    }
}
