use super::position::PositionAttributes;

/// Capability shared by every position model.
///
/// Prices and profits are per unit of the underlying grid: `price` answers
/// "what is one unit worth if the underlying trades at `u` with `day` days
/// left", and `profit` turns such a price into the position's P&L.
pub trait PositionExt {
  /// Theoretical price at underlying `u` with `day` days to expiration.
  fn price(&self, u: f64, day: f64) -> f64;

  /// Profit of the whole position if one unit is worth `price`.
  fn profit(&self, price: f64) -> f64;

  /// Expected display range `(lower, upper)` of the underlying.
  fn bounds(&self) -> (f64, f64);

  /// Days to expiration at entry (0 for instruments that do not expire).
  fn day(&self) -> f64;

  /// Net cost of opening the position; negative for a credit.
  fn debit(&self) -> f64;

  fn strike(&self) -> Option<f64> {
    None
  }

  fn implied_volatility(&self) -> Option<f64> {
    None
  }

  /// Snapshot of the position for renderers.
  fn attributes(&self) -> PositionAttributes;
}
