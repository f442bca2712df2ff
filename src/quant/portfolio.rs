//! # Portfolio
//!
//! $$
//! \Pi(u,t)=\sum_i q_i\,\bigl(V_i(u,t)-p_i\bigr)
//! $$
//!
//! Ordered set of positions with the aggregate queries used to size the price
//! grid and to fill the computed surfaces. A position's index is its id and
//! shifts down when an earlier position is removed.

use super::position::Position;
use super::position::PositionAttributes;
use super::traits::PositionExt;
use crate::error::Error;
use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct PositionSet {
  positions: Vec<Position>,
}

impl PositionSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a position and return its index.
  pub fn add(&mut self, position: Position) -> usize {
    self.positions.push(position);
    self.positions.len() - 1
  }

  /// Swap the position at `index` for `position`, returning the old one.
  pub fn replace_at(&mut self, index: usize, position: Position) -> Result<Position> {
    let len = self.positions.len();
    let slot = self
      .positions
      .get_mut(index)
      .ok_or(Error::IndexOutOfRange { index, len })?;
    Ok(std::mem::replace(slot, position))
  }

  /// Remove the position at `index`; later positions move down by one.
  pub fn remove_at(&mut self, index: usize) -> Result<Position> {
    let len = self.positions.len();
    if index >= len {
      return Err(Error::IndexOutOfRange { index, len });
    }
    Ok(self.positions.remove(index))
  }

  pub fn remove_all(&mut self) {
    self.positions.clear();
  }

  pub fn len(&self) -> usize {
    self.positions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&Position> {
    self.positions.get(index)
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Position> {
    self.positions.iter()
  }

  /// Smallest lower and largest upper bound over all positions.
  pub fn combined_bounds(&self) -> Option<(f64, f64)> {
    let mut iter = self.positions.iter().map(|p| p.bounds());
    let first = iter.next()?;
    Some(iter.fold(first, |(lower, upper), (l, u)| {
      (if l < lower { l } else { lower }, if u > upper { u } else { upper })
    }))
  }

  /// Longest days to expiration; 0 for an empty or stock-only set.
  pub fn max_days_to_expiration(&self) -> f64 {
    self
      .positions
      .iter()
      .map(|p| p.day())
      .fold(0.0, |max, d| if d > max { d } else { max })
  }

  pub fn net_debit(&self) -> f64 {
    self.positions.iter().map(|p| p.debit()).sum()
  }

  /// Strikes in order of first appearance, without duplicates.
  pub fn distinct_strikes(&self) -> Vec<f64> {
    let mut strikes: Vec<f64> = Vec::new();
    for strike in self.positions.iter().filter_map(|p| p.strike()) {
      if !strikes.contains(&strike) {
        strikes.push(strike);
      }
    }
    strikes
  }

  /// Theoretical price of each position at underlying `u` with `day` days left.
  pub fn prices_at(&self, u: f64, day: f64) -> Vec<f64> {
    self.positions.iter().map(|p| p.price(u, day)).collect()
  }

  /// Profit of each position given its theoretical price in `prices`.
  pub fn profits_at(&self, prices: &[f64]) -> Vec<f64> {
    self
      .positions
      .iter()
      .zip(prices)
      .map(|(p, &price)| p.profit(price))
      .collect()
  }

  pub fn total_profit_at(&self, u: f64, day: f64) -> f64 {
    self
      .positions
      .iter()
      .map(|p| p.profit(p.price(u, day)))
      .sum()
  }

  /// Override the volatility of every option position.
  pub fn change_volatility(&mut self, v: f64) -> Result<()> {
    if !(v.is_finite() && v > 0.0) {
      return Err(Error::InvalidVolatility(v));
    }
    for position in &mut self.positions {
      position.set_volatility(v)?;
    }
    Ok(())
  }

  pub fn attributes(&self) -> Vec<PositionAttributes> {
    self.positions.iter().map(|p| p.attributes()).collect()
  }
}

impl<'a> IntoIterator for &'a PositionSet {
  type Item = &'a Position;
  type IntoIter = std::slice::Iter<'a, Position>;

  fn into_iter(self) -> Self::IntoIter {
    self.positions.iter()
  }
}
