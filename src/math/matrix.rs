use serde::{Deserialize, Serialize};

use crate::error::{NetError, Result};

/// Dense row-major matrix of `f64`.
///
/// Every binary operation checks operand shapes and reports
/// `NetError::DimensionMismatch` instead of panicking. Operations never
/// mutate their operands except `add_assign`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixRecord")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

/// Unchecked wire form; converted into a `Matrix` only if `data` fits the shape.
#[derive(Deserialize)]
struct MatrixRecord {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl TryFrom<MatrixRecord> for Matrix {
    type Error = NetError;

    fn try_from(record: MatrixRecord) -> Result<Self> {
        Matrix::new(record.rows, record.cols, record.data)
    }
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Builds a matrix from row-major `data`, which must hold exactly `rows * cols` values.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Matrix> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(NetError::DimensionMismatch {
                op: "new",
                left: (rows, cols),
                right: (data.len(), 1),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// An `n x 1` column vector.
    pub fn column(values: &[f64]) -> Matrix {
        Matrix {
            rows: values.len(),
            cols: 1,
            data: values.to_vec(),
        }
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Matrix> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |r| r.len());
        if let Some(bad) = rows.iter().find(|r| r.len() != n_cols) {
            return Err(NetError::DimensionMismatch {
                op: "from_rows",
                left: (n_rows, n_cols),
                right: (1, bad.len()),
            });
        }
        Ok(Matrix {
            rows: n_rows,
            cols: n_cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Entry at row `i`, column `j`. Panics if out of bounds, like slice indexing.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds for {:?}", self.shape());
        self.data[i * self.cols + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Entries of the first column, i.e. the values of a column vector.
    pub fn column_values(&self) -> Vec<f64> {
        (0..self.rows).map(|i| self.get(i, 0)).collect()
    }

    /// Matrix product `self · rhs`.
    pub fn dot(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(self.mismatch("dot", rhs));
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.data[i * self.cols + k];
                let rhs_row = rhs.row(k);
                let out = &mut res.data[i * rhs.cols..(i + 1) * rhs.cols];
                for (o, b) in out.iter_mut().zip(rhs_row) {
                    *o += a * b;
                }
            }
        }

        Ok(res)
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i * res.cols + j] = self.data[j * self.cols + i];
            }
        }

        res
    }

    pub fn add(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with("add", rhs, |a, b| a + b)
    }

    pub fn subtract(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with("subtract", rhs, |a, b| a - b)
    }

    /// Element-wise (Hadamard) product.
    pub fn multiply(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with("multiply", rhs, |a, b| a * b)
    }

    pub fn scale(&self, k: f64) -> Matrix {
        self.apply(|x| k * x)
    }

    pub fn apply<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }

    /// In-place `self += rhs`. The shape is checked before any entry changes.
    pub fn add_assign(&mut self, rhs: &Matrix) -> Result<()> {
        if self.shape() != rhs.shape() {
            return Err(self.mismatch("add_assign", rhs));
        }
        for (a, b) in self.data.iter_mut().zip(&rhs.data) {
            *a += b;
        }
        Ok(())
    }

    fn zip_with<F>(&self, op: &'static str, rhs: &Matrix, functor: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.shape() != rhs.shape() {
            return Err(self.mismatch(op, rhs));
        }
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&rhs.data)
                .map(|(&a, &b)| functor(a, b))
                .collect(),
        })
    }

    fn mismatch(&self, op: &'static str, rhs: &Matrix) -> NetError {
        NetError::DimensionMismatch {
            op,
            left: self.shape(),
            right: rhs.shape(),
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_rows(rows).unwrap()
    }

    #[test]
    fn dot_multiplies_rows_by_columns() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let b = m(vec![vec![7.0, 8.0], vec![9.0, 10.0], vec![11.0, 12.0]]);
        let c = a.dot(&b).unwrap();
        assert_eq!(c, m(vec![vec![58.0, 64.0], vec![139.0, 154.0]]));
    }

    #[test]
    fn dot_rejects_incompatible_shapes() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(2, 3);
        match a.dot(&b) {
            Err(NetError::DimensionMismatch { op, left, right }) => {
                assert_eq!(op, "dot");
                assert_eq!(left, (2, 3));
                assert_eq!(right, (2, 3));
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn transpose_swaps_shape_and_entries() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let t = a.transpose();
        assert_eq!(t.shape(), (3, 2));
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(a.get(i, j), t.get(j, i));
            }
        }
    }

    #[test]
    fn element_wise_operations() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = m(vec![vec![0.5, -1.0], vec![2.0, 0.0]]);
        assert_eq!(a.add(&b).unwrap(), m(vec![vec![1.5, 1.0], vec![5.0, 4.0]]));
        assert_eq!(a.subtract(&b).unwrap(), m(vec![vec![0.5, 3.0], vec![1.0, 4.0]]));
        assert_eq!(a.multiply(&b).unwrap(), m(vec![vec![0.5, -2.0], vec![6.0, 0.0]]));
        assert_eq!(a.scale(2.0), m(vec![vec![2.0, 4.0], vec![6.0, 8.0]]));
        assert_eq!(a.apply(|x| x * x), m(vec![vec![1.0, 4.0], vec![9.0, 16.0]]));
    }

    #[test]
    fn element_wise_operations_reject_shape_mismatch() {
        let a = Matrix::zeros(2, 2);
        let b = Matrix::zeros(2, 1);
        assert!(a.add(&b).is_err());
        assert!(a.subtract(&b).is_err());
        assert!(a.multiply(&b).is_err());
    }

    #[test]
    fn add_assign_leaves_matrix_untouched_on_mismatch() {
        let mut a = m(vec![vec![1.0, 2.0]]);
        let before = a.clone();
        assert!(a.add_assign(&Matrix::zeros(2, 1)).is_err());
        assert_eq!(a, before);

        a.add_assign(&m(vec![vec![1.0, 1.0]])).unwrap();
        assert_eq!(a, m(vec![vec![2.0, 3.0]]));
    }

    #[test]
    fn operands_are_not_mutated() {
        let a = m(vec![vec![1.0, 2.0]]);
        let b = m(vec![vec![3.0, 4.0]]);
        let _ = a.add(&b).unwrap();
        let _ = a.transpose();
        assert_eq!(a, m(vec![vec![1.0, 2.0]]));
        assert_eq!(b, m(vec![vec![3.0, 4.0]]));
    }

    #[test]
    fn new_checks_data_length() {
        assert!(Matrix::new(2, 2, vec![1.0, 2.0, 3.0]).is_err());
        assert!(Matrix::from_rows(vec![vec![1.0], vec![1.0, 2.0]]).is_err());
        let c = Matrix::column(&[1.0, 2.0, 3.0]);
        assert_eq!(c.shape(), (3, 1));
        assert_eq!(c.column_values(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn json_round_trip_keeps_every_bit() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(17);
        let data: Vec<f64> = (0..50_000)
            .map(|i| match i % 3 {
                0 => rng.gen_range(-1.0..1.0),
                1 => rng.gen::<f64>() * 1e-7,
                _ => rng.gen_range(-1e6..1e6),
            })
            .collect();
        let original = Matrix::new(250, 200, data).unwrap();

        let text = serde_json::to_string(&original).unwrap();
        let restored: Matrix = serde_json::from_str(&text).unwrap();

        assert_eq!(restored.shape(), original.shape());
        let mismatches = original
            .as_slice()
            .iter()
            .zip(restored.as_slice())
            .filter(|(a, b)| a.to_bits() != b.to_bits())
            .count();
        assert_eq!(mismatches, 0, "{mismatches} of 50000 values changed");
    }

    #[test]
    fn deserialize_rejects_inconsistent_shape() {
        let ok: Matrix = serde_json::from_str(r#"{"rows":1,"cols":2,"data":[0.5,0.25]}"#).unwrap();
        assert_eq!(ok.shape(), (1, 2));
        let bad = serde_json::from_str::<Matrix>(r#"{"rows":2,"cols":2,"data":[0.5]}"#);
        assert!(bad.is_err());
    }
}
