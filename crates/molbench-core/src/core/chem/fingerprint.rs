use nalgebra::DMatrix;
use rayon::prelude::*;

/// Tanimoto (Jaccard) similarity generalized to real-valued vectors:
/// `a·b / (|a|² + |b|² - a·b)`. For binary fingerprints this is `|a ∧ b| / |a ∨ b|`.
///
/// Two all-zero vectors are treated as identical.
pub fn tanimoto_similarity(a: &[f32], b: &[f32]) -> f64 {
    let (mut dot, mut aa, mut bb) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        aa += x * x;
        bb += y * y;
    }
    let denom = aa + bb - dot;
    if denom <= f64::EPSILON {
        return 1.0;
    }
    dot / denom
}

pub fn tanimoto_distance(a: &[f32], b: &[f32]) -> f64 {
    1.0 - tanimoto_similarity(a, b)
}

/// Symmetric matrix of Tanimoto distances between every pair of rows.
pub fn tanimoto_distance_matrix(rows: &[Vec<f32>]) -> DMatrix<f64> {
    let n = rows.len();
    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            (i + 1..n)
                .map(|j| tanimoto_distance(&rows[i], &rows[j]))
                .collect()
        })
        .collect();

    let mut matrix = DMatrix::zeros(n, n);
    for (i, row) in upper.into_iter().enumerate() {
        for (offset, d) in row.into_iter().enumerate() {
            let j = i + 1 + offset;
            matrix[(i, j)] = d;
            matrix[(j, i)] = d;
        }
    }
    matrix
}
