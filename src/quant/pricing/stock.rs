use crate::quant::position::PositionAttributes;
use crate::quant::traits::PositionExt;
use crate::quant::Action;
use crate::quant::Instrument;
use crate::quant::Side;

/// Relative half-width of the display band around the entry price.
pub const STOCK_BAND: f64 = 0.2;

/// Shares held outright; worth exactly the underlying price.
#[derive(Debug, Clone, PartialEq)]
pub struct StockPosition {
  /// Buy or sell
  pub side: Side,
  /// Shares as entered
  pub quantity: u32,
  /// Shares held, negative when short
  pub signed_quantity: i64,
  /// Price paid or received per share
  pub entry_price: f64,
}

impl StockPosition {
  pub fn new(side: Side, quantity: u32, entry_price: f64) -> Self {
    Self {
      side,
      quantity,
      signed_quantity: quantity as i64 * side.sign(),
      entry_price,
    }
  }
}

impl PositionExt for StockPosition {
  fn price(&self, u: f64, _day: f64) -> f64 {
    u
  }

  fn profit(&self, price: f64) -> f64 {
    (price - self.entry_price) * self.signed_quantity as f64
  }

  fn bounds(&self) -> (f64, f64) {
    let band = self.entry_price * STOCK_BAND;
    (self.entry_price - band, self.entry_price + band)
  }

  fn day(&self) -> f64 {
    0.0
  }

  fn debit(&self) -> f64 {
    self.signed_quantity as f64 * self.entry_price
  }

  fn attributes(&self) -> PositionAttributes {
    PositionAttributes {
      action: Action::new(self.side, Instrument::Stock),
      quantity: self.quantity,
      signed_quantity: self.signed_quantity,
      entry_price: self.entry_price,
      spot: None,
      strike: None,
      rate: None,
      days: None,
      implied_volatility: None,
      debit: self.debit(),
      expiration: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn stock_bounds_are_twenty_percent_band() {
    let stock = StockPosition::new(Side::Buy, 100, 50.0);
    assert_eq!(stock.bounds(), (40.0, 60.0));
  }

  #[test]
  fn stock_price_ignores_time() {
    let stock = StockPosition::new(Side::Buy, 10, 50.0);
    assert_eq!(stock.price(57.5, 0.0), 57.5);
    assert_eq!(stock.price(57.5, 30.0), 57.5);
    assert_eq!(stock.day(), 0.0);
    assert_eq!(stock.strike(), None);
    assert_eq!(stock.implied_volatility(), None);
  }

  #[test]
  fn short_stock_profits_when_price_falls() {
    let stock = StockPosition::new(Side::Sell, 100, 50.0);
    assert_eq!(stock.signed_quantity, -100);
    assert_eq!(stock.debit(), -5000.0);
    assert_eq!(stock.profit(45.0), 500.0);
    assert_eq!(stock.profit(55.0), -500.0);
  }
}
