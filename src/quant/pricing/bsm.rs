use chrono::NaiveDate;

use crate::error::Error;
use crate::error::ImpliedVolError;
use crate::error::Result;
use crate::numeric::normal_cdf;
use crate::numeric::round;
use crate::numeric::DOLLAR_PRECISION;
use crate::numeric::PRICE_PRECISION;
use crate::quant::position::PositionAttributes;
use crate::quant::traits::PositionExt;
use crate::quant::Action;
use crate::quant::Instrument;
use crate::quant::OptionType;
use crate::quant::Side;

/// Units of the underlying per option contract.
pub const CONTRACT_MULTIPLIER: i64 = 100;
/// Days per year used for pricing.
pub const CALENDAR_DAYS: f64 = 365.0;
/// Days per year used for the display bounds.
pub const TRADING_DAYS: f64 = 252.0;
/// Year fraction used at expiration, keeps `d1` finite.
pub const EXPIRATION_TAU: f64 = 1e-14;
/// Volatility above this is capped when estimating bounds.
pub const BOUNDS_VOLATILITY_CAP: f64 = 3.0;

/// Default price tolerance of the implied-volatility solver.
pub const IV_TOLERANCE: f64 = 1e-6;
/// Default bisection budget of the implied-volatility solver.
pub const IV_MAX_ITER: usize = 100;
const SIGMA_FLOOR: f64 = 1e-6;
const SIGMA_START: f64 = 0.3;
const SIGMA_CEILING: f64 = 100.0;

/// Convert calendar days to a year fraction.
pub fn year_fraction(days: f64) -> f64 {
  if days > 0.0 {
    days / CALENDAR_DAYS
  } else if days == 0.0 {
    EXPIRATION_TAU
  } else {
    0.0
  }
}

/// European option position priced with Black-Scholes (no dividends).
///
/// The volatility is solved from the entry price when the position is built,
/// so a value of this type always carries a finite implied volatility.
#[derive(Debug, Clone, PartialEq)]
pub struct BSMPosition {
  /// Buy or sell
  pub side: Side,
  /// Call or put
  pub option_type: OptionType,
  /// Contracts as entered
  pub quantity: u32,
  /// Units held, negative when short
  pub signed_quantity: i64,
  /// Price paid or received per unit
  pub entry_price: f64,
  /// Underlying price at entry
  pub s: f64,
  /// Strike price
  pub k: f64,
  /// Risk-free rate
  pub r: f64,
  /// Calendar days to expiration at entry
  pub days: f64,
  /// Expiration date
  pub expiration: Option<NaiveDate>,
  /// Volatility, solved from `entry_price` unless overridden
  pub v: f64,
}

impl BSMPosition {
  /// Build the position and solve its implied volatility from `entry_price`.
  pub fn new(
    side: Side,
    option_type: OptionType,
    quantity: u32,
    entry_price: f64,
    s: f64,
    k: f64,
    r: f64,
    days: f64,
    expiration: Option<NaiveDate>,
  ) -> Result<Self> {
    let mut position = Self {
      side,
      option_type,
      quantity,
      signed_quantity: quantity as i64 * side.sign() * CONTRACT_MULTIPLIER,
      entry_price,
      s,
      k,
      r,
      days,
      expiration,
      v: f64::NAN,
    };

    position.v = position.solve_implied_volatility(entry_price, IV_TOLERANCE, IV_MAX_ITER)?;
    Ok(position)
  }

  /// Replace the volatility used for valuation and bounds.
  pub fn set_volatility(&mut self, v: f64) -> Result<()> {
    if !(v.is_finite() && v > 0.0) {
      return Err(Error::InvalidVolatility(v));
    }
    self.v = v;
    Ok(())
  }

  fn d1_d2(&self, s: f64, v: f64, tau: f64) -> (f64, f64) {
    let d1 = ((s / self.k).ln() + (self.r + v.powi(2) / 2.0) * tau) / (v * tau.sqrt());
    let d2 = d1 - v * tau.sqrt();

    (d1, d2)
  }

  /// Call and put prices for underlying `s`, volatility `v` and `days` left,
  /// rounded to price precision.
  pub fn calculate_call_put(&self, s: f64, v: f64, days: f64) -> (f64, f64) {
    let tau = year_fraction(days);
    let (d1, d2) = self.d1_d2(s, v, tau);
    let discount = (-self.r * tau).exp();

    let call = s * normal_cdf(d1, 0.0, 1.0) - self.k * discount * normal_cdf(d2, 0.0, 1.0);
    let put = self.k * discount * normal_cdf(-d2, 0.0, 1.0) - s * normal_cdf(-d1, 0.0, 1.0);

    (round(call, PRICE_PRECISION), round(put, PRICE_PRECISION))
  }

  /// Price with any of the market inputs overridden; the position is untouched.
  pub fn price_with(&self, s: f64, v: f64, days: f64) -> f64 {
    let (call, put) = self.calculate_call_put(s, v, days);
    match self.option_type {
      OptionType::Call => call,
      OptionType::Put => put,
    }
  }

  /// Volatility reproducing `market_price` at the entry spot and days.
  ///
  /// Brackets the root by doubling from 0.3, then bisects. Relies on the
  /// price being increasing in volatility, which holds for vanilla options.
  pub fn solve_implied_volatility(
    &self,
    market_price: f64,
    tol: f64,
    max_iter: usize,
  ) -> std::result::Result<f64, ImpliedVolError> {
    let price = |v: f64| self.price_with(self.s, v, self.days);

    let mut sigma_low = SIGMA_FLOOR;
    let floor_price = price(sigma_low);
    if floor_price > market_price {
      return Err(ImpliedVolError::ArbitrageViolation {
        market_price,
        floor_price,
      });
    }

    let mut sigma_high = SIGMA_START;
    let mut bs = price(sigma_high);
    while bs < market_price {
      sigma_high *= 2.0;
      bs = price(sigma_high);
      if sigma_high > SIGMA_CEILING {
        return Err(ImpliedVolError::VolatilityCeilingExceeded {
          market_price,
          ceiling: SIGMA_CEILING,
        });
      }
    }

    for _ in 0..max_iter {
      let sigma = (sigma_low + sigma_high) / 2.0;
      let diff = price(sigma) - market_price;
      if diff.abs() < tol {
        return Ok(sigma);
      }

      if diff < 0.0 {
        sigma_low = sigma;
      } else {
        sigma_high = sigma;
      }
    }

    Err(ImpliedVolError::ConvergenceFailure {
      iterations: max_iter,
    })
  }
}

impl PositionExt for BSMPosition {
  fn price(&self, u: f64, day: f64) -> f64 {
    self.price_with(u, self.v, day)
  }

  fn profit(&self, price: f64) -> f64 {
    round(
      (price - self.entry_price) * self.signed_quantity as f64,
      DOLLAR_PRECISION,
    )
  }

  /// One standard deviation around the entry spot over the remaining
  /// trading days.
  fn bounds(&self) -> (f64, f64) {
    let v = self.v.min(BOUNDS_VOLATILITY_CAP);
    let stddev = self.s * v * (self.days / TRADING_DAYS).sqrt();

    let lower = round((self.s - stddev).max(0.0), DOLLAR_PRECISION);
    let upper = round(self.s + stddev, DOLLAR_PRECISION);
    (lower, upper)
  }

  fn day(&self) -> f64 {
    self.days
  }

  fn debit(&self) -> f64 {
    self.signed_quantity as f64 * self.entry_price
  }

  fn strike(&self) -> Option<f64> {
    Some(self.k)
  }

  fn implied_volatility(&self) -> Option<f64> {
    Some(self.v)
  }

  fn attributes(&self) -> PositionAttributes {
    PositionAttributes {
      action: Action::new(self.side, Instrument::Option(self.option_type)),
      quantity: self.quantity,
      signed_quantity: self.signed_quantity,
      entry_price: self.entry_price,
      spot: Some(self.s),
      strike: Some(self.k),
      rate: Some(self.r),
      days: Some(self.days),
      implied_volatility: Some(self.v),
      debit: self.debit(),
      expiration: self.expiration,
    }
  }
}
