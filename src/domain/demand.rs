/// Window used for the moving average, in days.
pub const WINDOW_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandProjection {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
}

/// Project demand from the units sold over the trailing window: a simple
/// moving average per day, scaled to weekly and monthly horizons.
pub fn project(units_sold_in_window: i64) -> DemandProjection {
    let daily = units_sold_in_window as f64 / WINDOW_DAYS as f64;
    DemandProjection {
        daily,
        weekly: daily * 7.0,
        monthly: daily * 30.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_sales_projects_zero() {
        let p = project(0);
        assert_eq!(p.daily, 0.0);
        assert_eq!(p.weekly, 0.0);
        assert_eq!(p.monthly, 0.0);
    }

    #[test]
    fn ninety_units_is_one_per_day() {
        let p = project(90);
        assert_eq!(p.daily, 1.0);
        assert_eq!(p.weekly, 7.0);
        assert_eq!(p.monthly, 30.0);
    }

    #[test]
    fn projection_scales_linearly() {
        let p = project(450);
        assert_eq!(p.daily, 5.0);
        assert_eq!(p.weekly, 35.0);
    }
}
