//! Invoice totals
//!
//! Amounts are summed with an exactly rounded partials summation, so the
//! total of a set of items does not depend on their order.

use crate::LineItem;
use serde::{Deserialize, Serialize};

/// The three figures printed in the totals block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: f64,
    pub total: f64,
    pub balance_due: f64,
}

/// Pure fold over line item amounts
pub struct TotalsCalculator;

impl TotalsCalculator {
    /// Sum of `rate * quantity` over all items
    pub fn total(items: &[LineItem]) -> f64 {
        exact_sum(items.iter().map(LineItem::amount))
    }

    /// Subtotal, total and balance due. No tax or payments are modelled,
    /// so all three coincide.
    pub fn summarize(items: &[LineItem]) -> Totals {
        let total = Self::total(items);
        Totals {
            subtotal: total,
            total,
            balance_due: total,
        }
    }
}

/// Correctly rounded sum of a sequence of doubles.
///
/// Keeps a list of non-overlapping partial sums whose exact total equals the
/// exact total of the inputs, then rounds that once (half to even).
pub fn exact_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut partials: Vec<f64> = Vec::new();

    for value in values {
        let mut x = value;
        let mut kept = 0;
        for j in 0..partials.len() {
            let mut y = partials[j];
            if x.abs() < y.abs() {
                std::mem::swap(&mut x, &mut y);
            }
            let hi = x + y;
            let lo = y - (hi - x);
            if lo != 0.0 {
                partials[kept] = lo;
                kept += 1;
            }
            x = hi;
        }
        partials.truncate(kept);
        partials.push(x);
    }

    round_partials(&partials)
}

fn round_partials(partials: &[f64]) -> f64 {
    let mut n = partials.len();
    if n == 0 {
        return 0.0;
    }

    n -= 1;
    let mut hi = partials[n];
    let mut lo = 0.0;
    while n > 0 {
        let x = hi;
        n -= 1;
        let y = partials[n];
        hi = x + y;
        let y_rounded = hi - x;
        lo = y - y_rounded;
        if lo != 0.0 {
            break;
        }
    }

    // Half-way case: the remaining partials decide the rounding direction.
    if n > 0 && ((lo < 0.0 && partials[n - 1] < 0.0) || (lo > 0.0 && partials[n - 1] > 0.0)) {
        let y = lo * 2.0;
        let x = hi + y;
        if y == x - hi {
            hi = x;
        }
    }

    hi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Unit;
    use proptest::prelude::*;

    fn item(rate: f64, qty: f64) -> LineItem {
        LineItem::new("work", rate, qty, Unit::Hours)
    }

    #[test]
    fn test_single_item_total() {
        let totals = TotalsCalculator::summarize(&[item(25.0, 1.0)]);
        assert_eq!(totals.subtotal, 25.0);
        assert_eq!(totals.total, 25.0);
        assert_eq!(totals.balance_due, 25.0);
    }

    #[test]
    fn test_empty_total_is_zero() {
        assert_eq!(TotalsCalculator::total(&[]), 0.0);
    }

    #[test]
    fn test_exact_sum_cancellation() {
        assert_eq!(exact_sum([1e100, 1.0, -1e100]), 1.0);
        assert_eq!(exact_sum([0.1, 0.2, 0.3]), 0.6);
        assert_eq!(exact_sum([0.1; 10]), 1.0);
    }

    proptest! {
        #[test]
        fn prop_amount_is_product(rate in 0.0f64..1e6, qty in 0.0f64..1e4) {
            let item = item(rate, qty);
            prop_assert_eq!(item.amount(), rate * qty);
        }

        #[test]
        fn prop_total_is_order_invariant(
            values in prop::collection::vec((0.0f64..10_000.0, 0.0f64..500.0), 0..40)
        ) {
            let items: Vec<LineItem> = values.iter().map(|&(r, q)| item(r, q)).collect();
            let mut reversed = items.clone();
            reversed.reverse();
            let mut rotated = items.clone();
            if !rotated.is_empty() {
                rotated.rotate_left(items.len() / 2);
            }

            let total = TotalsCalculator::total(&items);
            prop_assert_eq!(total, TotalsCalculator::total(&reversed));
            prop_assert_eq!(total, TotalsCalculator::total(&rotated));
            prop_assert_eq!(total, TotalsCalculator::total(&items));
        }

        #[test]
        fn prop_total_matches_naive_sum_closely(
            values in prop::collection::vec((0.0f64..1_000.0, 0.0f64..100.0), 0..40)
        ) {
            let items: Vec<LineItem> = values.iter().map(|&(r, q)| item(r, q)).collect();
            let naive: f64 = items.iter().map(LineItem::amount).sum();
            let total = TotalsCalculator::total(&items);
            prop_assert!((total - naive).abs() <= 1e-6 * naive.max(1.0));
        }
    }
}
