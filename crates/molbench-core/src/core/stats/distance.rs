use nalgebra::DMatrix;
use rayon::prelude::*;

pub fn euclidean(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Symmetric matrix of Euclidean distances between every pair of rows.
pub fn euclidean_distance_matrix(rows: &[Vec<f32>]) -> DMatrix<f64> {
    let n = rows.len();
    let columns: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|j| (0..n).map(|i| euclidean(&rows[i], &rows[j])).collect())
        .collect();
    DMatrix::from_iterator(n, n, columns.into_iter().flatten())
}
