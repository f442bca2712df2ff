//! # Errors
//!
//! Every failure in the engine is recoverable: the operation that reports it
//! leaves the session exactly as it was.

use thiserror::Error;

/// Why the implied-volatility solver gave up.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ImpliedVolError {
  /// Market price sits below the price at the volatility floor.
  #[error("market price {market_price} is below the theoretical minimum {floor_price}")]
  ArbitrageViolation { market_price: f64, floor_price: f64 },
  /// Doubling the upper volatility never reached the market price.
  #[error("no volatility up to {ceiling} reproduces market price {market_price}")]
  VolatilityCeilingExceeded { market_price: f64, ceiling: f64 },
  /// Bisection ran out of iterations.
  #[error("bisection did not converge within {iterations} iterations")]
  ConvergenceFailure { iterations: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
  #[error("unable to find implied volatility: {0}")]
  ImpliedVolatilityUnsolvable(#[from] ImpliedVolError),

  #[error("invalid price grid parameters (lower={lower}, upper={upper}, nobs={nobs})")]
  InvalidPriceGridParameters { lower: f64, upper: f64, nobs: usize },

  #[error("invalid day value {value}, expected a value in [0, {max}]")]
  InvalidDayValue { value: f64, max: f64 },

  #[error("position #{index} does not exist ({len} positions held)")]
  IndexOutOfRange { index: usize, len: usize },

  #[error("invalid position input: {0}")]
  InvalidPositionInput(String),

  #[error("invalid volatility {0}, expected a finite positive number")]
  InvalidVolatility(f64),

  #[error("strategy has no positions")]
  EmptySession,
}

pub type Result<T> = std::result::Result<T, Error>;
