//! Overall 0-100 score and rating label.
//!
//! Scoring starts at 50 and applies four independent adjustments in a fixed
//! order: price versus fair value, ROE, debt-to-equity, revenue growth. Each
//! adjustment that fires appends one reason, so `reasons` follows that order.

use analysis_core::numeric::present;
use analysis_core::{Fundamentals, OverallRating, Rating};

const BASE_SCORE: i32 = 50;

pub fn compute_overall_rating(
    current_price: Option<f64>,
    average_fair_value: Option<f64>,
    fundamentals: &Fundamentals,
) -> OverallRating {
    let mut adjustments: Vec<(i32, &str)> = Vec::new();

    if let (Some(price), Some(fair)) = (present(current_price), present(average_fair_value)) {
        let ratio = price / fair;
        if ratio < 0.80 {
            adjustments.push((20, "price more than 20% below fair value"));
        } else if ratio < 0.95 {
            adjustments.push((10, "price below fair value"));
        } else if ratio > 1.20 {
            adjustments.push((-20, "price more than 20% above fair value"));
        } else if ratio > 1.05 {
            adjustments.push((-10, "price above fair value"));
        }
    }

    if let Some(roe) = present(fundamentals.roe) {
        if roe > 0.20 {
            adjustments.push((10, "ROE above 20% (excellent)"));
        } else if roe > 0.15 {
            adjustments.push((5, "ROE above 15% (good)"));
        } else if roe < 0.05 {
            adjustments.push((-10, "ROE below 5% (weak)"));
        }
    }

    // Percentage number, and zero is a real reading here
    if let Some(d2e) = fundamentals.debt_to_equity {
        if d2e < 50.0 {
            adjustments.push((5, "debt-to-equity below 50% (sound)"));
        } else if d2e > 150.0 {
            adjustments.push((-10, "debt-to-equity above 150% (risky)"));
        }
    }

    if let Some(growth) = present(fundamentals.revenue_growth) {
        if growth > 0.20 {
            adjustments.push((10, "revenue growth above 20%"));
        } else if growth > 0.10 {
            adjustments.push((5, "revenue growth above 10%"));
        } else if growth < 0.0 {
            adjustments.push((-10, "revenue declining"));
        }
    }

    let raw: i32 = BASE_SCORE + adjustments.iter().map(|(delta, _)| delta).sum::<i32>();
    let score = raw.clamp(0, 100) as u8;
    let rating = Rating::from_score(score);

    tracing::debug!(
        "{}: score {} -> {}",
        fundamentals.ticker,
        score,
        rating.to_label()
    );

    OverallRating {
        score,
        rating,
        reasons: adjustments
            .into_iter()
            .map(|(_, reason)| reason.to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Fundamentals {
        Fundamentals::new("TEST")
    }

    #[test]
    fn test_no_signals_is_hold() {
        let r = compute_overall_rating(None, None, &base());
        assert_eq!(r.score, 50);
        assert_eq!(r.rating, Rating::Hold);
        assert!(r.reasons.is_empty());
    }

    #[test]
    fn test_price_gap_bands() {
        let f = base();
        assert_eq!(compute_overall_rating(Some(79.0), Some(100.0), &f).score, 70);
        assert_eq!(compute_overall_rating(Some(90.0), Some(100.0), &f).score, 60);
        assert_eq!(compute_overall_rating(Some(100.0), Some(100.0), &f).score, 50);
        assert_eq!(compute_overall_rating(Some(110.0), Some(100.0), &f).score, 40);
        assert_eq!(compute_overall_rating(Some(121.0), Some(100.0), &f).score, 30);
        // Price gap needs both operands
        assert_eq!(compute_overall_rating(Some(50.0), None, &f).score, 50);
    }

    #[test]
    fn test_roe_is_monotonic() {
        let mut previous = 0;
        for roe in [0.04, 0.10, 0.16, 0.25] {
            let f = Fundamentals {
                roe: Some(roe),
                ..base()
            };
            let score = compute_overall_rating(None, None, &f).score;
            assert!(score >= previous, "roe {} scored {}", roe, score);
            previous = score;
        }
        assert_eq!(previous, 60);
    }

    #[test]
    fn test_zero_roe_and_growth_are_ignored() {
        let f = Fundamentals {
            roe: Some(0.0),
            revenue_growth: Some(0.0),
            ..base()
        };
        let r = compute_overall_rating(None, None, &f);
        assert_eq!(r.score, 50);
        assert!(r.reasons.is_empty());
    }

    #[test]
    fn test_zero_debt_counts_as_sound() {
        let f = Fundamentals {
            debt_to_equity: Some(0.0),
            ..base()
        };
        let r = compute_overall_rating(None, None, &f);
        assert_eq!(r.score, 55);
        assert_eq!(r.reasons, vec!["debt-to-equity below 50% (sound)"]);
    }

    #[test]
    fn test_best_case_reaches_95_with_ordered_reasons() {
        let f = Fundamentals {
            roe: Some(0.30),
            debt_to_equity: Some(10.0),
            revenue_growth: Some(0.35),
            ..base()
        };
        let r = compute_overall_rating(Some(50.0), Some(100.0), &f);
        assert_eq!(r.score, 95);
        assert_eq!(r.rating, Rating::StrongBuy);
        assert_eq!(
            r.reasons,
            vec![
                "price more than 20% below fair value",
                "ROE above 20% (excellent)",
                "debt-to-equity below 50% (sound)",
                "revenue growth above 20%",
            ]
        );
    }

    #[test]
    fn test_worst_case_bottoms_at_zero() {
        let f = Fundamentals {
            roe: Some(0.01),
            debt_to_equity: Some(300.0),
            revenue_growth: Some(-0.12),
            ..base()
        };
        let r = compute_overall_rating(Some(200.0), Some(100.0), &f);
        assert_eq!(r.score, 0);
        assert_eq!(r.rating, Rating::StrongSell);
        assert_eq!(r.reasons.len(), 4);
        assert_eq!(r.reasons[3], "revenue declining");
    }
}
