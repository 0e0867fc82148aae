use crate::models::CouponKind;

/// A cart line as seen by the totals computation. Prices are snapshots taken
/// when the line was added, in minor currency units.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub price: i64,
    pub original_price: Option<i64>,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct AppliedCoupon {
    pub kind: CouponKind,
    /// Percent (0..=100) for `Percentage`, minor units for `Fixed`.
    pub value: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub total_amount: i64,
    pub total_items: i32,
    pub savings: i64,
}

/// Recompute the derived cart fields from its lines and coupons.
///
/// `total_amount` starts at the sum of price x quantity, then coupons apply in
/// list order, percentages against the running total. Each coupon's discount is
/// clamped to the remaining total, so the final amount never drops below zero
/// and `savings` grows by exactly the amount actually taken off.
pub fn compute_totals(lines: &[CartLine], coupons: &[AppliedCoupon]) -> CartTotals {
    let mut total_amount: i64 = 0;
    let mut total_items: i32 = 0;
    let mut savings: i64 = 0;

    for line in lines {
        let quantity = i64::from(line.quantity);
        total_amount += line.price * quantity;
        total_items += line.quantity;
        if let Some(original) = line.original_price {
            savings += (original - line.price).max(0) * quantity;
        }
    }

    for coupon in coupons {
        let discount = match coupon.kind {
            CouponKind::Percentage => total_amount * coupon.value / 100,
            CouponKind::Fixed => coupon.value,
        };
        let discount = discount.clamp(0, total_amount);
        total_amount -= discount;
        savings += discount;
    }

    CartTotals {
        total_amount,
        total_items,
        savings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: i64, original: Option<i64>, quantity: i32) -> CartLine {
        CartLine {
            price,
            original_price: original,
            quantity,
        }
    }

    #[test]
    fn empty_cart_is_all_zero() {
        let totals = compute_totals(&[], &[]);
        assert_eq!(
            totals,
            CartTotals {
                total_amount: 0,
                total_items: 0,
                savings: 0
            }
        );
    }

    #[test]
    fn sums_lines_and_counts_items() {
        let totals = compute_totals(&[line(100, None, 2), line(250, None, 3)], &[]);
        assert_eq!(totals.total_amount, 950);
        assert_eq!(totals.total_items, 5);
        assert_eq!(totals.savings, 0);
    }

    #[test]
    fn percentage_coupon_scenario() {
        // One line {price:100, quantity:2} and a 20% coupon.
        let totals = compute_totals(
            &[line(100, None, 2)],
            &[AppliedCoupon {
                kind: CouponKind::Percentage,
                value: 20,
            }],
        );
        assert_eq!(totals.total_amount, 160);
        assert_eq!(totals.savings, 40);
    }

    #[test]
    fn original_price_discount_counts_as_savings() {
        let totals = compute_totals(&[line(80, Some(100), 3)], &[]);
        assert_eq!(totals.total_amount, 240);
        assert_eq!(totals.savings, 60);
    }

    #[test]
    fn original_price_below_current_price_is_ignored() {
        let totals = compute_totals(&[line(100, Some(90), 1)], &[]);
        assert_eq!(totals.savings, 0);
    }

    #[test]
    fn coupons_apply_in_order_against_running_total() {
        // 1000 -> fixed 200 off -> 800 -> 10% off -> 720.
        let totals = compute_totals(
            &[line(1000, None, 1)],
            &[
                AppliedCoupon {
                    kind: CouponKind::Fixed,
                    value: 200,
                },
                AppliedCoupon {
                    kind: CouponKind::Percentage,
                    value: 10,
                },
            ],
        );
        assert_eq!(totals.total_amount, 720);
        assert_eq!(totals.savings, 280);
    }

    #[test]
    fn total_is_floored_at_zero() {
        let totals = compute_totals(
            &[line(100, None, 1)],
            &[AppliedCoupon {
                kind: CouponKind::Fixed,
                value: 500,
            }],
        );
        assert_eq!(totals.total_amount, 0);
        // Savings only grows by what was actually discounted.
        assert_eq!(totals.savings, 100);
    }

    #[test]
    fn totals_track_any_mutation_sequence() {
        // add 2x100, add 1x50, set first line to 5, remove second line
        let mut lines = vec![line(100, None, 2), line(50, None, 1)];
        lines[0].quantity = 5;
        lines.remove(1);
        let totals = compute_totals(&lines, &[]);
        assert_eq!(totals.total_amount, 500);
        assert_eq!(totals.total_items, 5);
    }
}
