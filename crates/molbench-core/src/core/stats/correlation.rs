use super::mean;

pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return f64::NAN;
    }

    let mx = mean(xs);
    let my = mean(ys);

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return f64::NAN;
    }
    sxy / denom
}

/// 1-based ranks; tied values share the average of the ranks they span.
pub fn ranks_average_ties(xs: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let mut idx: Vec<usize> = (0..n).collect();
    idx.sort_by(|&a, &b| xs[a].total_cmp(&xs[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let start = i;
        let v = xs[idx[i]];
        i += 1;
        while i < n && xs[idx[i]] == v {
            i += 1;
        }
        let avg_rank = (start as f64 + 1.0 + i as f64) * 0.5;
        for &j in &idx[start..i] {
            ranks[j] = avg_rank;
        }
    }
    ranks
}

pub fn spearman(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return f64::NAN;
    }
    pearson(&ranks_average_ties(xs), &ranks_average_ties(ys))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pearson_of_linear_relation_is_one() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [2.0, 4.0, 6.0, 8.0];
        assert!((pearson(&xs, &ys) - 1.0).abs() < 1e-12);
        let neg: Vec<f64> = ys.iter().map(|y| -y).collect();
        assert!((pearson(&xs, &neg) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_of_constant_series_is_nan() {
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
        assert!(pearson(&[1.0], &[1.0]).is_nan());
    }

    #[test]
    fn ties_share_their_average_rank() {
        assert_eq!(
            ranks_average_ties(&[10.0, 20.0, 10.0, 30.0]),
            vec![1.5, 3.0, 1.5, 4.0]
        );
    }

    #[test]
    fn spearman_is_invariant_to_monotone_transforms() {
        let xs = [0.1, 0.4, 0.2, 0.9, 0.5];
        let ys: Vec<f64> = xs.iter().map(|x: &f64| x.exp() * 10.0).collect();
        assert!((spearman(&xs, &ys) - 1.0).abs() < 1e-12);
    }
}
