// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ledger Visualization Engine - Integer Percent Allocation
//
// Largest-remainder apportionment of amounts into whole percentages that sum
// to exactly 100, with every strictly positive amount getting at least 1%.

use std::cmp::Ordering;

const TOTAL_POINTS: u32 = 100;

/// Integer percentages for `amounts`.
///
/// Negative and non-finite amounts count as zero. A zero total yields all
/// zeros. When more than 100 items are positive the 1% floor cannot be
/// honoured; that case falls back to all zeros and is logged.
pub fn allocate_integer_percents(amounts: &[f64]) -> Vec<u32> {
    let n = amounts.len();
    let clean: Vec<f64> = amounts
        .iter()
        .map(|&a| if a.is_finite() && a > 0.0 { a } else { 0.0 })
        .collect();
    let total: f64 = clean.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return vec![0; n];
    }

    let exact: Vec<f64> = clean.iter().map(|a| a / total * 100.0).collect();
    let mut result: Vec<u32> = exact.iter().map(|e| e.floor() as u32).collect();
    let mut remainders: Vec<f64> = exact
        .iter()
        .zip(&result)
        .map(|(e, &floor)| e - floor as f64)
        .collect();

    // Positive amounts never round to zero. A bumped item has already been
    // paid more than its remainder, so it drops out of the remainder race.
    for i in 0..n {
        if clean[i] > 0.0 && result[i] == 0 {
            result[i] = 1;
            remainders[i] = 0.0;
        }
    }

    let mut sum: u32 = result.iter().sum();

    while sum > TOTAL_POINTS {
        // Take from the largest share first; among equals, the one that was
        // rounded down the most already has the least to lose.
        let candidate = (0..n).filter(|&i| result[i] > 1).max_by(|&a, &b| {
            result[a]
                .cmp(&result[b])
                .then_with(|| cmp_f64(remainders[b], remainders[a]))
                .then_with(|| b.cmp(&a))
        });
        match candidate {
            Some(i) => {
                result[i] -= 1;
                sum -= 1;
            }
            None => {
                tracing::warn!(
                    items = n,
                    positive = clean.iter().filter(|a| **a > 0.0).count(),
                    "percent allocation infeasible: 1% floor exceeds 100, returning zeros"
                );
                return vec![0; n];
            }
        }
    }

    if sum < TOTAL_POINTS {
        let mut order: Vec<usize> = (0..n).filter(|&i| clean[i] > 0.0).collect();
        order.sort_by(|&a, &b| {
            cmp_f64(remainders[b], remainders[a]).then_with(|| cmp_f64(clean[b], clean[a]))
        });
        let mut k = 0;
        while sum < TOTAL_POINTS {
            result[order[k % order.len()]] += 1;
            sum += 1;
            k += 1;
        }
    }

    result
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
