//! Liquidity and leverage buckets for the financial health report.

use analysis_core::{FinancialHealth, Fundamentals, HealthGrade, HealthItem, HealthStatus};

pub fn assess_current_ratio(value: Option<f64>) -> HealthStatus {
    match value {
        None => HealthStatus::NotAvailable,
        Some(v) if v >= 1.5 => HealthStatus::Good,
        Some(v) if v >= 1.0 => HealthStatus::Fair,
        Some(_) => HealthStatus::Caution,
    }
}

/// `value` is a percentage number (120 = 120%).
pub fn assess_debt_to_equity(value: Option<f64>) -> HealthStatus {
    match value {
        None => HealthStatus::NotAvailable,
        Some(v) if v < 100.0 => HealthStatus::Good,
        Some(v) if v < 200.0 => HealthStatus::Fair,
        Some(_) => HealthStatus::Caution,
    }
}

pub fn assess_quick_ratio(value: Option<f64>) -> HealthStatus {
    match value {
        None => HealthStatus::NotAvailable,
        Some(v) if v >= 1.0 => HealthStatus::Good,
        Some(v) if v >= 0.5 => HealthStatus::Fair,
        Some(_) => HealthStatus::Caution,
    }
}

pub fn assess_financial_health(fundamentals: &Fundamentals) -> FinancialHealth {
    let current_ratio = HealthItem {
        value: fundamentals.current_ratio,
        status: assess_current_ratio(fundamentals.current_ratio),
    };
    let debt_to_equity = HealthItem {
        value: fundamentals.debt_to_equity,
        status: assess_debt_to_equity(fundamentals.debt_to_equity),
    };
    let quick_ratio = HealthItem {
        value: fundamentals.quick_ratio,
        status: assess_quick_ratio(fundamentals.quick_ratio),
    };

    let good = [&current_ratio, &debt_to_equity, &quick_ratio]
        .iter()
        .filter(|item| item.status == HealthStatus::Good)
        .count();

    FinancialHealth {
        current_ratio,
        debt_to_equity,
        quick_ratio,
        overall: HealthGrade::from_good_count(good),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_ratio_buckets() {
        assert_eq!(assess_current_ratio(Some(1.5)), HealthStatus::Good);
        assert_eq!(assess_current_ratio(Some(1.49)), HealthStatus::Fair);
        assert_eq!(assess_current_ratio(Some(1.0)), HealthStatus::Fair);
        assert_eq!(assess_current_ratio(Some(0.99)), HealthStatus::Caution);
        assert_eq!(assess_current_ratio(None), HealthStatus::NotAvailable);
    }

    #[test]
    fn test_debt_to_equity_buckets() {
        assert_eq!(assess_debt_to_equity(Some(0.0)), HealthStatus::Good);
        assert_eq!(assess_debt_to_equity(Some(99.9)), HealthStatus::Good);
        assert_eq!(assess_debt_to_equity(Some(100.0)), HealthStatus::Fair);
        assert_eq!(assess_debt_to_equity(Some(200.0)), HealthStatus::Caution);
        assert_eq!(assess_debt_to_equity(None), HealthStatus::NotAvailable);
    }

    #[test]
    fn test_quick_ratio_buckets() {
        assert_eq!(assess_quick_ratio(Some(1.0)), HealthStatus::Good);
        assert_eq!(assess_quick_ratio(Some(0.5)), HealthStatus::Fair);
        assert_eq!(assess_quick_ratio(Some(0.49)), HealthStatus::Caution);
        assert_eq!(assess_quick_ratio(None), HealthStatus::NotAvailable);
    }

    #[test]
    fn test_overall_grade_counts_good_ratios() {
        let mut f = Fundamentals {
            current_ratio: Some(2.0),
            debt_to_equity: Some(40.0),
            quick_ratio: Some(1.2),
            ..Fundamentals::new("TEST")
        };
        let health = assess_financial_health(&f);
        assert_eq!(health.overall, HealthGrade::Healthy);
        assert_eq!(health.debt_to_equity.value, Some(40.0));

        f.quick_ratio = Some(0.7);
        assert_eq!(assess_financial_health(&f).overall, HealthGrade::Good);

        f.debt_to_equity = Some(250.0);
        assert_eq!(assess_financial_health(&f).overall, HealthGrade::Fair);

        f.current_ratio = None;
        let health = assess_financial_health(&f);
        assert_eq!(health.overall, HealthGrade::Caution);
        assert_eq!(health.current_ratio.status, HealthStatus::NotAvailable);
    }
}
