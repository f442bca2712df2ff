use std::fmt::Display;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;

pub mod day;
pub mod grid;
pub mod portfolio;
pub mod position;
pub mod pricing;
pub mod strategy;
pub mod surface;
pub mod traits;

/// Option type.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum OptionType {
  #[default]
  Call,
  Put,
}

/// Position side.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Side {
  #[default]
  Buy,
  Sell,
}

impl Side {
  /// +1 for long, -1 for short.
  pub fn sign(&self) -> i64 {
    match self {
      Side::Buy => 1,
      Side::Sell => -1,
    }
  }
}

/// What a position trades.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Instrument {
  Option(OptionType),
  Stock,
}

/// Action label of a position, e.g. `Buy Call` or `Sell Stock`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Action {
  pub side: Side,
  pub instrument: Instrument,
}

impl Action {
  pub fn new(side: Side, instrument: Instrument) -> Self {
    Self { side, instrument }
  }

  pub fn is_option(&self) -> bool {
    matches!(self.instrument, Instrument::Option(_))
  }
}

impl Display for Action {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let side = match self.side {
      Side::Buy => "Buy",
      Side::Sell => "Sell",
    };
    let instrument = match self.instrument {
      Instrument::Option(OptionType::Call) => "Call",
      Instrument::Option(OptionType::Put) => "Put",
      Instrument::Stock => "Stock",
    };
    write!(f, "{side} {instrument}")
  }
}

impl FromStr for Action {
  type Err = Error;

  /// Tokens are matched anywhere in the label, case-sensitively.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let side = if s.contains("Buy") {
      Side::Buy
    } else if s.contains("Sell") {
      Side::Sell
    } else {
      return Err(Error::InvalidPositionInput(format!(
        "action '{s}' names neither Buy nor Sell"
      )));
    };

    let instrument = if s.contains("Call") {
      Instrument::Option(OptionType::Call)
    } else if s.contains("Put") {
      Instrument::Option(OptionType::Put)
    } else if s.contains("Stock") {
      Instrument::Stock
    } else {
      return Err(Error::InvalidPositionInput(format!(
        "action '{s}' names neither Call, Put nor Stock"
      )));
    };

    Ok(Self { side, instrument })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn action_labels_round_trip() {
    for label in ["Buy Call", "Sell Call", "Buy Put", "Sell Put", "Buy Stock", "Sell Stock"] {
      let action: Action = label.parse().unwrap();
      assert_eq!(action.to_string(), label);
    }
  }

  #[test]
  fn action_parsing_matches_tokens_anywhere() {
    let action: Action = "Sell-Put".parse().unwrap();
    assert_eq!(action.side, Side::Sell);
    assert_eq!(action.instrument, Instrument::Option(OptionType::Put));
    assert!(action.is_option());
  }

  #[test]
  fn action_parsing_rejects_unknown_labels() {
    assert!("Hold Call".parse::<Action>().is_err());
    assert!("Buy Future".parse::<Action>().is_err());
  }
}
