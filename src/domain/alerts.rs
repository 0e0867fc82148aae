use chrono::NaiveDate;

use crate::models::{AlertSeverity, AlertType};

/// The slice of an inventory record that alert evaluation looks at.
#[derive(Debug, Clone)]
pub struct StockSnapshot {
    pub stock_level: i32,
    pub min_stock_level: i32,
    pub max_stock_level: i32,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertCondition {
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
}

/// Evaluate the stock and expiry state of one inventory record.
///
/// The stock tiers are mutually exclusive and checked in priority order:
/// out-of-stock beats low-stock beats overstock, so at most one of the three
/// fires per evaluation. The expiry check runs independently of the stock
/// check.
pub fn evaluate(snapshot: &StockSnapshot, today: NaiveDate) -> Vec<AlertCondition> {
    let mut conditions = Vec::new();

    if snapshot.stock_level == 0 {
        conditions.push(AlertCondition {
            alert_type: AlertType::OutOfStock,
            severity: AlertSeverity::Critical,
            message: "Stock depleted".to_string(),
        });
    } else if snapshot.stock_level <= snapshot.min_stock_level {
        conditions.push(AlertCondition {
            alert_type: AlertType::LowStock,
            severity: AlertSeverity::High,
            message: format!(
                "Stock level {} at or below minimum {}",
                snapshot.stock_level, snapshot.min_stock_level
            ),
        });
    } else if is_overstocked(snapshot.stock_level, snapshot.max_stock_level) {
        conditions.push(AlertCondition {
            alert_type: AlertType::Overstock,
            severity: AlertSeverity::Low,
            message: format!(
                "Stock level {} at or above 90% of maximum {}",
                snapshot.stock_level, snapshot.max_stock_level
            ),
        });
    }

    if let Some(expiry) = snapshot.expiry_date {
        let days_left = (expiry - today).num_days();
        if days_left <= 0 {
            conditions.push(AlertCondition {
                alert_type: AlertType::Expired,
                severity: AlertSeverity::Critical,
                message: format!("Expired on {expiry}"),
            });
        } else if days_left <= 30 {
            let severity = if days_left <= 7 {
                AlertSeverity::High
            } else {
                AlertSeverity::Medium
            };
            conditions.push(AlertCondition {
                alert_type: AlertType::ExpiringSoon,
                severity,
                message: format!("Expires in {days_left} days"),
            });
        }
    }

    conditions
}

// stock >= 0.9 * max, kept integral to avoid float comparison.
fn is_overstocked(stock_level: i32, max_stock_level: i32) -> bool {
    max_stock_level > 0 && i64::from(stock_level) * 10 >= i64::from(max_stock_level) * 9
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(stock: i32, min: i32, max: i32) -> StockSnapshot {
        StockSnapshot {
            stock_level: stock,
            min_stock_level: min,
            max_stock_level: max,
            expiry_date: None,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn zero_stock_raises_exactly_out_of_stock() {
        let conditions = evaluate(&snapshot(0, 10, 100), day(2026, 8, 24));
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].alert_type, AlertType::OutOfStock);
        assert_eq!(conditions[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn zero_stock_never_also_raises_low_stock() {
        let conditions = evaluate(&snapshot(0, 10, 100), day(2026, 8, 24));
        assert!(
            conditions
                .iter()
                .all(|c| c.alert_type != AlertType::LowStock)
        );
    }

    #[test]
    fn stock_at_minimum_raises_low_stock_high() {
        let conditions = evaluate(&snapshot(10, 10, 100), day(2026, 8, 24));
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].alert_type, AlertType::LowStock);
        assert_eq!(conditions[0].severity, AlertSeverity::High);
    }

    #[test]
    fn ninety_five_of_hundred_raises_exactly_overstock() {
        let conditions = evaluate(&snapshot(95, 10, 100), day(2026, 8, 24));
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].alert_type, AlertType::Overstock);
        assert_eq!(conditions[0].severity, AlertSeverity::Low);
    }

    #[test]
    fn healthy_stock_raises_nothing() {
        let conditions = evaluate(&snapshot(50, 10, 100), day(2026, 8, 24));
        assert!(conditions.is_empty());
    }

    #[test]
    fn expired_is_critical_and_independent_of_stock() {
        let mut snap = snapshot(50, 10, 100);
        snap.expiry_date = Some(day(2026, 8, 24));
        let conditions = evaluate(&snap, day(2026, 8, 24));
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].alert_type, AlertType::Expired);
        assert_eq!(conditions[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn expiring_within_a_week_is_high() {
        let mut snap = snapshot(50, 10, 100);
        snap.expiry_date = Some(day(2026, 8, 30));
        let conditions = evaluate(&snap, day(2026, 8, 24));
        assert_eq!(conditions[0].alert_type, AlertType::ExpiringSoon);
        assert_eq!(conditions[0].severity, AlertSeverity::High);
    }

    #[test]
    fn expiring_within_a_month_is_medium() {
        let mut snap = snapshot(50, 10, 100);
        snap.expiry_date = Some(day(2026, 9, 15));
        let conditions = evaluate(&snap, day(2026, 8, 24));
        assert_eq!(conditions[0].alert_type, AlertType::ExpiringSoon);
        assert_eq!(conditions[0].severity, AlertSeverity::Medium);
    }

    #[test]
    fn stock_and_expiry_conditions_stack() {
        let mut snap = snapshot(0, 10, 100);
        snap.expiry_date = Some(day(2026, 8, 1));
        let conditions = evaluate(&snap, day(2026, 8, 24));
        assert_eq!(conditions.len(), 2);
    }

    #[test]
    fn severity_ordering_is_total_over_all_four_values() {
        let ranks = [
            AlertSeverity::Critical,
            AlertSeverity::High,
            AlertSeverity::Medium,
            AlertSeverity::Low,
        ]
        .map(|s| s.rank());
        assert_eq!(ranks, [0, 1, 2, 3]);
    }

    #[test]
    fn evaluation_is_deterministic_for_unchanged_state() {
        let snap = snapshot(3, 10, 100);
        let first = evaluate(&snap, day(2026, 8, 24));
        let second = evaluate(&snap, day(2026, 8, 24));
        assert_eq!(first, second);
    }
}
