//! Standard normal CDF and the ACT/ACT ISDA day count used throughout
//! the classifier.

use chrono::{Datelike, NaiveDate};

/// Year fraction between `start` and `end` under the ACT/ACT ISDA
/// convention: each calendar year contributes `days_in_that_year /
/// (365 or 366)`. Returns `0.0` if `end <= start`.
pub fn act_act_isda(start: NaiveDate, end: NaiveDate) -> f64 {
    if end <= start {
        return 0.0;
    }
    let mut total = 0.0;
    let mut cursor = start;
    while cursor < end {
        let year = cursor.year();
        let year_end = NaiveDate::from_ymd_opt(year + 1, 1, 1).expect("valid calendar year boundary");
        let days_in_year = if is_leap_year(year) { 366.0 } else { 365.0 };
        let segment_end = end.min(year_end);
        let days = (segment_end - cursor).num_days() as f64;
        total += days / days_in_year;
        cursor = segment_end;
    }
    total
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Complementary error function, Abramowitz & Stegun formula 7.1.26
/// (maximum absolute error ~1.5e-7).
fn erfc_approx(x: f64) -> f64 {
    let abs_x = x.abs();

    let a1 = 0.254_829_592;
    let a2 = -0.284_496_736;
    let a3 = 1.421_413_741;
    let a4 = -1.453_152_027;
    let a5 = 1.061_405_429;
    let p = 0.327_591_1;

    let t = 1.0 / (1.0 + p * abs_x);
    let poly = a1 + t * (a2 + t * (a3 + t * (a4 + t * a5)));
    let erfc_abs = t * poly * (-abs_x * abs_x).exp();

    if x < 0.0 {
        2.0 - erfc_abs
    } else {
        erfc_abs
    }
}

/// Standard normal cumulative distribution function, `Φ(x) = P(X ≤ x)`.
pub fn phi(x: f64) -> f64 {
    0.5 * erfc_approx(-x / std::f64::consts::SQRT_2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn phi_at_zero_is_one_half() {
        assert_relative_eq!(phi(0.0), 0.5, epsilon = 1e-7);
    }

    #[test]
    fn phi_is_monotone_and_bounded() {
        assert_relative_eq!(phi(-10.0), 0.0, epsilon = 1e-6);
        assert_relative_eq!(phi(10.0), 1.0, epsilon = 1e-6);
        assert!(phi(1.0) > phi(0.0));
    }

    #[test]
    fn act_act_isda_ten_years_is_about_ten() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert_relative_eq!(act_act_isda(start, end), 10.0, epsilon = 1e-6);
    }

    #[test]
    fn act_act_isda_matured_is_zero() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        assert_eq!(act_act_isda(end, start) > 0.0, true);
        assert_eq!(act_act_isda(start, end), 0.0);
    }
}
