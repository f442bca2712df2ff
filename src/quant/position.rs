//! # Positions
//!
//! $$
//! \text{debit}=q\cdot m\cdot \operatorname{sgn}(\text{side})\cdot p_0
//! $$
//!
//! A closed set of position models behind [`PositionExt`], dispatched on the
//! action label when a [`PositionSpec`] is built.

use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

use super::pricing::bsm::BSMPosition;
use super::pricing::stock::StockPosition;
use super::traits::PositionExt;
use super::Action;
use super::Instrument;
use super::OptionType;
use super::Side;
use crate::error::Error;
use crate::error::Result;
use crate::numeric::days_between;

/// Already-typed inputs for a new position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSpec {
  pub action: Action,
  /// Contracts for options, shares for stock
  pub quantity: u32,
  /// Price paid or received per unit
  pub entry_price: f64,
  /// Options only
  pub strike: Option<f64>,
  /// Underlying price at entry, options only
  pub spot: Option<f64>,
  /// Annual risk-free rate in [0, 1), options only
  pub rate: Option<f64>,
  /// Options only, not before the valuation date
  pub expiration: Option<NaiveDate>,
}

impl PositionSpec {
  pub fn stock(side: Side, quantity: u32, entry_price: f64) -> Self {
    Self {
      action: Action::new(side, Instrument::Stock),
      quantity,
      entry_price,
      strike: None,
      spot: None,
      rate: None,
      expiration: None,
    }
  }

  pub fn option(
    side: Side,
    option_type: OptionType,
    quantity: u32,
    entry_price: f64,
    strike: f64,
    spot: f64,
    rate: f64,
    expiration: NaiveDate,
  ) -> Self {
    Self {
      action: Action::new(side, Instrument::Option(option_type)),
      quantity,
      entry_price,
      strike: Some(strike),
      spot: Some(spot),
      rate: Some(rate),
      expiration: Some(expiration),
    }
  }

  /// Validate the inputs and build the position as of `today`.
  ///
  /// Options solve their implied volatility here; a failed solve is
  /// reported and no position is produced.
  pub fn build(&self, today: NaiveDate) -> Result<Position> {
    if self.quantity == 0 {
      return Err(invalid("quantity must be a positive integer"));
    }
    positive("entry price", self.entry_price)?;

    match self.action.instrument {
      Instrument::Stock => Ok(Position::Stock(StockPosition::new(
        self.action.side,
        self.quantity,
        self.entry_price,
      ))),
      Instrument::Option(option_type) => {
        let strike = positive("strike", required("strike", self.strike)?)?;
        let spot = positive("underlying spot", required("underlying spot", self.spot)?)?;
        let rate = required("risk-free rate", self.rate)?;
        if !(rate.is_finite() && (0.0..1.0).contains(&rate)) {
          return Err(invalid(format!("risk-free rate {rate} must lie in [0, 1)")));
        }
        let expiration = self
          .expiration
          .ok_or_else(|| invalid("expiration date is required for options"))?;
        if expiration < today {
          return Err(invalid(format!(
            "expiration {expiration} is before the valuation date {today}"
          )));
        }

        let position = BSMPosition::new(
          self.action.side,
          option_type,
          self.quantity,
          self.entry_price,
          spot,
          strike,
          rate,
          days_between(today, expiration),
          Some(expiration),
        )?;
        Ok(Position::Option(position))
      }
    }
  }
}

fn invalid(msg: impl Into<String>) -> Error {
  Error::InvalidPositionInput(msg.into())
}

fn required(name: &str, value: Option<f64>) -> Result<f64> {
  value.ok_or_else(|| invalid(format!("{name} is required for options")))
}

fn positive(name: &str, value: f64) -> Result<f64> {
  if value.is_finite() && value > 0.0 {
    Ok(value)
  } else {
    Err(invalid(format!("{name} must be a positive number, got {value}")))
  }
}

/// Read-only view of a position, as shown in a positions table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionAttributes {
  pub action: Action,
  pub quantity: u32,
  pub signed_quantity: i64,
  pub entry_price: f64,
  pub spot: Option<f64>,
  pub strike: Option<f64>,
  pub rate: Option<f64>,
  pub days: Option<f64>,
  pub implied_volatility: Option<f64>,
  pub debit: f64,
  pub expiration: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Position {
  Option(BSMPosition),
  Stock(StockPosition),
}

impl Position {
  /// Override the volatility of an option; stock has none and is left as is.
  pub fn set_volatility(&mut self, v: f64) -> Result<()> {
    match self {
      Position::Option(option) => option.set_volatility(v),
      Position::Stock(_) => Ok(()),
    }
  }

  fn model(&self) -> &dyn PositionExt {
    match self {
      Position::Option(option) => option,
      Position::Stock(stock) => stock,
    }
  }
}

impl PositionExt for Position {
  fn price(&self, u: f64, day: f64) -> f64 {
    self.model().price(u, day)
  }

  fn profit(&self, price: f64) -> f64 {
    self.model().profit(price)
  }

  fn bounds(&self) -> (f64, f64) {
    self.model().bounds()
  }

  fn day(&self) -> f64 {
    self.model().day()
  }

  fn debit(&self) -> f64 {
    self.model().debit()
  }

  fn strike(&self) -> Option<f64> {
    self.model().strike()
  }

  fn implied_volatility(&self) -> Option<f64> {
    self.model().implied_volatility()
  }

  fn attributes(&self) -> PositionAttributes {
    self.model().attributes()
  }
}
