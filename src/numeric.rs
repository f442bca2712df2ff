//! # Numeric
//!
//! $$
//! \Phi(x;\mu,\sigma)=\tfrac12\left[1+\operatorname{erf}\!\left(\frac{x-\mu}{\sigma\sqrt2}\right)\right]
//! $$
//!
//! Stateless helpers shared by every pricing model. All probabilities in the
//! crate go through [`erf`] and [`normal_cdf`].

use chrono::NaiveDate;

/// Rounding unit for theoretical prices (3 decimals).
pub const PRICE_PRECISION: f64 = 1000.0;
/// Rounding unit for dollar amounts (2 decimals).
pub const DOLLAR_PRECISION: f64 = 100.0;

const A1: f64 = 0.254829592;
const A2: f64 = -0.284496736;
const A3: f64 = 1.421413741;
const A4: f64 = -1.453152027;
const A5: f64 = 1.061405429;
const P: f64 = 0.3275911;

/// Error function, Abramowitz & Stegun 7.1.26 (|ε| ≤ 1.5e-7).
pub fn erf(x: f64) -> f64 {
  let sign = if x >= 0.0 { 1.0 } else { -1.0 };
  let x = x.abs();

  let t = 1.0 / (1.0 + P * x);
  let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();
  sign * y
}

/// Normal cumulative distribution function.
pub fn normal_cdf(x: f64, mean: f64, stddev: f64) -> f64 {
  0.5 * (1.0 + erf((x - mean) / (stddev * std::f64::consts::SQRT_2)))
}

/// Standard normal density.
pub fn normal_pdf(x: f64) -> f64 {
  (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

/// Round `value` to the precision given by `unit`, the reciprocal of the step
/// (`unit = 100.0` keeps two decimals).
pub fn round(value: f64, unit: f64) -> f64 {
  (value * unit).round() / unit
}

pub fn sum(values: &[f64]) -> f64 {
  values.iter().sum()
}

/// Whole calendar days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> f64 {
  to.signed_duration_since(from).num_days() as f64
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use statrs::distribution::ContinuousCDF;
  use statrs::distribution::Normal;

  use super::*;

  #[test]
  fn erf_matches_reference_within_tolerance() {
    for &(x, expected) in &[
      (0.0, 0.0),
      (0.5, 0.520_499_877_8),
      (1.0, 0.842_700_792_9),
      (2.0, 0.995_322_265_0),
      (3.0, 0.999_977_909_5),
    ] {
      assert_abs_diff_eq!(erf(x), expected, epsilon = 2e-7);
      assert_abs_diff_eq!(erf(-x), -expected, epsilon = 2e-7);
    }
  }

  #[test]
  fn normal_cdf_tracks_statrs() {
    let n = Normal::new(0.0, 1.0).unwrap();
    let mut x = -4.0;
    while x <= 4.0 {
      assert_abs_diff_eq!(normal_cdf(x, 0.0, 1.0), n.cdf(x), epsilon = 1e-7);
      x += 0.25;
    }

    let shifted = Normal::new(10.0, 2.5).unwrap();
    assert_abs_diff_eq!(normal_cdf(12.0, 10.0, 2.5), shifted.cdf(12.0), epsilon = 1e-7);
  }

  #[test]
  fn round_uses_reciprocal_unit() {
    assert_eq!(round(1.23456, 100.0), 1.23);
    assert_eq!(round(1.23456, 1000.0), 1.235);
    assert_eq!(round(-2.5049, 100.0), -2.5);
    assert_eq!(round(7.0, 1.0), 7.0);
  }

  #[test]
  fn days_between_counts_calendar_days() {
    let a = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let b = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    assert_eq!(days_between(a, b), 60.0);
    assert_eq!(days_between(b, a), -60.0);
  }

  #[test]
  fn pdf_peaks_at_zero() {
    assert_abs_diff_eq!(normal_pdf(0.0), 0.398_942_280_4, epsilon = 1e-9);
    assert_eq!(sum(&[1.0, 2.5, -0.5]), 3.0);
  }
}
