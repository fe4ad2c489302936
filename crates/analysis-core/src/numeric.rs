//! Numeric helpers shared by the valuation crates.
//!
//! Providers report "no data" as either a missing field or a literal zero, so
//! most consumers go through [`present`] before branching on a value.

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Treat zero as absent.
pub fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Fraction to display percent (0.153 -> 15.3), `None` when absent or zero.
pub fn as_percent(value: Option<f64>) -> Option<f64> {
    present(value).map(|v| round2(v * 100.0))
}

/// Mean of the values that are present, `None` if there are none.
pub fn mean_of<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_round2() {
        assert_relative_eq!(round2(109.107142857), 109.11);
        assert_relative_eq!(round2(-9.106), -9.11);
        assert_relative_eq!(round2(122.50000000000003), 122.5);
    }

    #[test]
    fn test_present_drops_zero() {
        assert_eq!(present(Some(0.0)), None);
        assert_eq!(present(None), None);
        assert_eq!(present(Some(-0.2)), Some(-0.2));
    }

    #[test]
    fn test_as_percent() {
        assert_eq!(as_percent(Some(0.2237)), Some(22.37));
        assert_eq!(as_percent(Some(0.0)), None);
        assert_eq!(as_percent(None), None);
    }

    #[test]
    fn test_mean_of_skips_missing() {
        assert_eq!(mean_of(vec![Some(10.0), None, Some(20.0)]), Some(15.0));
        assert_eq!(mean_of(vec![None, None]), None);
    }
}
