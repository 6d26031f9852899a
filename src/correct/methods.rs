//! Correction algorithms, matching R `p.adjust` semantics.
//!
//! All functions expect finite p-values (the NaN policy is handled by the
//! caller in [`super::correct`]) and return adjusted values clipped to 1.0.

/// Indices that sort `p` ascending. Ties keep input order, so the adjustment
/// is deterministic for a fixed input ordering.
fn ascending_order(p: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..p.len()).collect();
    order.sort_by(|&a, &b| p[a].partial_cmp(&p[b]).unwrap_or(std::cmp::Ordering::Equal));
    order
}

/// Bonferroni single-step: `min(p * n, 1)`.
pub fn bonferroni(p: &[f64]) -> Vec<f64> {
    let n = p.len() as f64;
    p.iter().map(|&v| (v * n).min(1.0)).collect()
}

/// Sidak single-step: `1 - (1 - p)^n`.
pub fn sidak(p: &[f64]) -> Vec<f64> {
    let n = p.len() as f64;
    p.iter().map(|&v| (1.0 - (1.0 - v).powf(n)).min(1.0)).collect()
}

/// Holm step-down: rank p ascending, multiply by `n - rank + 1`, enforce a
/// running maximum.
pub fn holm(p: &[f64]) -> Vec<f64> {
    let n = p.len();
    let order = ascending_order(p);
    let mut adjusted = vec![0.0; n];
    let mut running_max = 0.0f64;
    for (rank, &idx) in order.iter().enumerate() {
        let scaled = p[idx] * (n - rank) as f64;
        running_max = running_max.max(scaled).min(1.0);
        adjusted[idx] = running_max;
    }
    adjusted
}

/// Hommel closed-testing adjustment (R `p.adjust(..., "hommel")`).
pub fn hommel(p: &[f64]) -> Vec<f64> {
    let n = p.len();
    if n < 3 {
        // For fewer than three hypotheses the Hommel adjustment coincides
        // with Holm.
        return holm(p);
    }
    let order = ascending_order(p);
    let sorted: Vec<f64> = order.iter().map(|&i| p[i]).collect();
    let nf = n as f64;

    let init = (0..n)
        .map(|i| nf * sorted[i] / (i + 1) as f64)
        .fold(f64::INFINITY, f64::min);
    let mut q = vec![init; n];
    let mut pa = vec![init; n];

    for m in (2..n).rev() {
        let mf = m as f64;
        // i1 covers ranks 1..=n-m+1, i2 covers ranks n-m+2..=n (1-based).
        let split = n - m + 1;
        let q1 = (split..n)
            .map(|i| mf * sorted[i] / (i - split + 2) as f64)
            .fold(f64::INFINITY, f64::min);
        for (i, qi) in q.iter_mut().enumerate().take(split) {
            *qi = (mf * sorted[i]).min(q1);
        }
        let tail = q[split - 1];
        for qi in q.iter_mut().take(n).skip(split) {
            *qi = tail;
        }
        for (pai, &qi) in pa.iter_mut().zip(&q) {
            *pai = pai.max(qi);
        }
    }

    let mut adjusted = vec![0.0; n];
    for (rank, &idx) in order.iter().enumerate() {
        adjusted[idx] = pa[rank].max(sorted[rank]).min(1.0);
    }
    adjusted
}

/// Benjamini-Hochberg step-up FDR: rank p ascending, scale by `n / rank`,
/// enforce a running minimum from the largest p-value down.
pub fn fdr_bh(p: &[f64]) -> Vec<f64> {
    let n = p.len();
    if n == 0 {
        return Vec::new();
    }
    let order = ascending_order(p);
    let nf = n as f64;

    let mut q_sorted = vec![0.0; n];
    q_sorted[n - 1] = p[order[n - 1]].min(1.0);
    for i in (0..n - 1).rev() {
        let rank = i + 1;
        let scaled = p[order[i]] * nf / rank as f64;
        q_sorted[i] = scaled.min(q_sorted[i + 1]).min(1.0);
    }

    let mut adjusted = vec![0.0; n];
    for (i, &idx) in order.iter().enumerate() {
        adjusted[idx] = q_sorted[i];
    }
    adjusted
}
