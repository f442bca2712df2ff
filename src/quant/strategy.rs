//! # Strategy Session
//!
//! $$
//! \text{Empty}\xrightarrow{\text{add}}\text{Active}\xrightarrow{\text{remove last}}\text{Empty}
//! $$
//!
//! Owns the positions, the two day counters, the price grid and the current
//! and expiration surfaces, and keeps them consistent. Every mutation either
//! completes with all dependent state recomputed or fails without touching
//! anything.

use chrono::Local;
use chrono::NaiveDate;
use impl_new_derive::ImplNew;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use super::day::DayCounter;
use super::grid::PriceGrid;
use super::grid::PriceRange;
use super::portfolio::PositionSet;
use super::position::PositionAttributes;
use super::position::PositionSpec;
use super::surface::Surface;
use crate::error::Error;
use crate::error::Result;

/// Runtime configuration for [`StrategySession`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
  /// Grid size used whenever the positions change.
  pub default_nobs: usize,
  /// Date days to expiration are counted from; `None` means today.
  pub valuation_date: Option<NaiveDate>,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self {
      default_nobs: 12,
      valuation_date: None,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
  /// No positions; counters, grid and surfaces are unset.
  Empty,
  /// At least one position; everything is initialized.
  Active,
}

/// Current day and the furthest selectable day.
#[derive(ImplNew, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayInfo {
  pub day: f64,
  pub max_day: f64,
}

/// Read-only snapshot for price and day controls.
#[derive(ImplNew, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionValues {
  pub price_range: PriceRange,
  pub day: DayInfo,
}

#[derive(Clone, Debug, Default)]
pub struct StrategySession {
  config: SessionConfig,
  positions: PositionSet,
  day: DayCounter,
  expiration_day: DayCounter,
  grid: PriceGrid,
  current: Surface,
  expiration: Surface,
  max_day: Option<f64>,
}

impl StrategySession {
  pub fn new(config: SessionConfig) -> Self {
    Self {
      config,
      ..Self::default()
    }
  }

  pub fn config(&self) -> &SessionConfig {
    &self.config
  }

  pub fn state(&self) -> SessionState {
    if self.positions.is_empty() {
      SessionState::Empty
    } else {
      SessionState::Active
    }
  }

  /// Date new option positions count their days to expiration from.
  pub fn valuation_date(&self) -> NaiveDate {
    self
      .config
      .valuation_date
      .unwrap_or_else(|| Local::now().date_naive())
  }

  /// Build a position from `spec` and append it; returns its id.
  pub fn add_position(&mut self, spec: &PositionSpec) -> Result<usize> {
    let position = spec.build(self.valuation_date()).inspect_err(|err| {
      warn!(action = %spec.action, %err, "position rejected");
    })?;

    let mut positions = self.positions.clone();
    let id = positions.add(position);
    self.rebuild(positions)?;
    Ok(id)
  }

  /// Swap position `id` for one built from `spec`.
  pub fn replace_position(&mut self, id: usize, spec: &PositionSpec) -> Result<()> {
    let position = spec.build(self.valuation_date()).inspect_err(|err| {
      warn!(id, action = %spec.action, %err, "replacement rejected");
    })?;

    let mut positions = self.positions.clone();
    positions.replace_at(id, position)?;
    self.rebuild(positions)
  }

  /// Remove position `id`; later ids shift down by one.
  pub fn remove_position(&mut self, id: usize) -> Result<()> {
    let mut positions = self.positions.clone();
    positions
      .remove_at(id)
      .inspect_err(|err| warn!(id, %err, "remove rejected"))?;
    self.rebuild(positions)
  }

  pub fn remove_all_positions(&mut self) {
    self.positions.remove_all();
    self.clear();
    debug!("all positions removed");
  }

  /// Resample the grid; strikes stay required points.
  pub fn set_prices(&mut self, lower: f64, upper: f64, nobs: usize) -> Result<()> {
    self.ensure_active()?;
    let strikes = self.positions.distinct_strikes();
    self
      .grid
      .build(lower, upper, nobs, &strikes)
      .inspect_err(|err| warn!(%err, "price range rejected"))?;

    self.recompute_all();
    debug!(rows = self.grid.len(), lower, upper, "prices updated");
    Ok(())
  }

  /// Move the current day; only the current surface depends on it.
  pub fn set_day(&mut self, n: f64) -> Result<()> {
    self.ensure_active()?;
    self
      .day
      .set(n)
      .inspect_err(|err| warn!(%err, "day rejected"))?;

    self.recompute_current();
    debug!(day = n, "day updated");
    Ok(())
  }

  /// Override the volatility of every option and recompute.
  pub fn set_volatility(&mut self, v: f64) -> Result<()> {
    self.ensure_active()?;
    let mut positions = self.positions.clone();
    positions
      .change_volatility(v)
      .inspect_err(|err| warn!(%err, "volatility rejected"))?;
    self.rebuild(positions)
  }

  /// `None` while empty.
  pub fn day(&self) -> Option<DayInfo> {
    Some(DayInfo::new(
      self.day.value()?,
      self.positions.max_days_to_expiration(),
    ))
  }

  /// Price range and day for controls; `None` while empty.
  pub fn values(&self) -> Option<SessionValues> {
    Some(SessionValues::new(self.grid.range()?, self.day()?))
  }

  pub fn positions(&self) -> &PositionSet {
    &self.positions
  }

  pub fn attributes(&self) -> Vec<PositionAttributes> {
    self.positions.attributes()
  }

  pub fn net_debit(&self) -> f64 {
    self.positions.net_debit()
  }

  pub fn grid(&self) -> &PriceGrid {
    &self.grid
  }

  pub fn current_day(&self) -> &DayCounter {
    &self.day
  }

  pub fn expiration_day(&self) -> &DayCounter {
    &self.expiration_day
  }

  pub fn max_day(&self) -> Option<f64> {
    self.max_day
  }

  pub fn current_surface(&self) -> &Surface {
    &self.current
  }

  pub fn expiration_surface(&self) -> &Surface {
    &self.expiration
  }

  fn ensure_active(&self) -> Result<()> {
    match self.state() {
      SessionState::Active => Ok(()),
      SessionState::Empty => Err(Error::EmptySession),
    }
  }

  /// Adopt `positions` and rebuild everything derived from them. Nothing is
  /// committed unless the new grid can be built.
  fn rebuild(&mut self, positions: PositionSet) -> Result<()> {
    let Some((lower, upper)) = positions.combined_bounds() else {
      self.positions = positions;
      self.clear();
      debug!("last position removed");
      return Ok(());
    };

    let max_day = positions.max_days_to_expiration();
    self
      .grid
      .init(
        lower,
        upper,
        self.config.default_nobs,
        &positions.distinct_strikes(),
      )
      .inspect_err(|err| warn!(%err, "price grid rejected"))?;

    self.positions = positions;
    self.max_day = Some(max_day);
    self.day.init(max_day);
    self.expiration_day.init(0.0);
    self.recompute_all();

    debug!(
      positions = self.positions.len(),
      rows = self.grid.len(),
      max_day,
      "strategy rebuilt"
    );
    Ok(())
  }

  fn recompute_all(&mut self) {
    let (Some(day), Some(expiration_day)) = (self.day.value(), self.expiration_day.value()) else {
      return;
    };
    let (positions, grid) = (&self.positions, &self.grid);
    let (current, expiration) = rayon::join(
      || Surface::compute(positions, grid, day),
      || Surface::compute(positions, grid, expiration_day),
    );
    self.current = current;
    self.expiration = expiration;
  }

  fn recompute_current(&mut self) {
    if let Some(day) = self.day.value() {
      self.current.recompute(&self.positions, &self.grid, day);
    }
  }

  fn clear(&mut self) {
    self.max_day = None;
    self.day.clear();
    self.expiration_day.clear();
    self.grid.clear();
    self.current.clear();
    self.expiration.clear();
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use tracing_test::traced_test;

  use super::*;
  use crate::quant::traits::PositionExt;
  use crate::quant::OptionType;
  use crate::quant::Side;

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
  }

  fn session() -> StrategySession {
    StrategySession::new(SessionConfig {
      valuation_date: Some(today()),
      ..SessionConfig::default()
    })
  }

  fn call(strike: f64, entry: f64, days: i64) -> PositionSpec {
    PositionSpec::option(
      Side::Buy,
      OptionType::Call,
      1,
      entry,
      strike,
      100.0,
      0.05,
      today() + chrono::Duration::days(days),
    )
  }

  #[test]
  fn new_session_is_empty() {
    let mut s = session();
    assert_eq!(s.state(), SessionState::Empty);
    assert_eq!(s.values(), None);
    assert_eq!(s.day(), None);
    assert!(s.current_surface().is_empty());
    assert_eq!(s.set_day(0.0), Err(Error::EmptySession));
    assert_eq!(s.set_prices(1.0, 2.0, 3), Err(Error::EmptySession));
    assert_eq!(s.set_volatility(0.2), Err(Error::EmptySession));
  }

  #[test]
  fn first_add_activates_and_initializes() {
    let mut s = session();
    let id = s.add_position(&call(100.0, 3.0, 30)).unwrap();
    assert_eq!(id, 0);
    assert_eq!(s.state(), SessionState::Active);

    assert_eq!(s.max_day(), Some(30.0));
    assert_eq!(s.current_day().value(), Some(30.0));
    assert_eq!(s.expiration_day().value(), Some(0.0));
    assert_eq!(s.grid().len(), 12);
    assert!(s.grid().prices().contains(&100.0));

    let (lower, upper) = s.positions().combined_bounds().unwrap();
    assert_eq!(s.grid().lower(), Some(lower));
    assert_eq!(s.grid().upper(), Some(upper));

    assert_eq!(s.current_surface().rows(), 12);
    assert_eq!(s.expiration_surface().rows(), 12);
    assert_eq!(s.current_surface().day(), Some(30.0));
    assert_eq!(s.expiration_surface().day(), Some(0.0));

    let values = s.values().unwrap();
    assert_eq!(values.day, DayInfo::new(30.0, 30.0));
    assert_eq!(values.price_range.nobs, 12);
  }

  #[test]
  fn stock_and_options_share_one_grid() {
    let mut s = session();
    s.add_position(&call(100.0, 3.0, 30)).unwrap();
    s.add_position(&PositionSpec::stock(Side::Buy, 100, 50.0)).unwrap();
    s.add_position(&call(110.0, 1.0, 60)).unwrap();

    assert_eq!(s.max_day(), Some(60.0));
    assert_eq!(s.grid().lower(), Some(40.0));
    assert_eq!(s.grid().upper(), s.positions().combined_bounds().map(|b| b.1));
    assert!(s.grid().prices().contains(&100.0));
    assert_eq!(s.current_surface().prices().dim(), (12, 3));
    assert_abs_diff_eq!(s.net_debit(), 300.0 + 5000.0 + 100.0, epsilon = 1e-9);
    assert_eq!(s.attributes().len(), 3);
  }

  #[test]
  fn rejected_position_leaves_session_unchanged() {
    let mut s = session();
    s.add_position(&call(100.0, 3.0, 30)).unwrap();
    let before = s.values();
    let rows = s.current_surface().clone();

    let err = s.add_position(&call(100.0, 500.0, 30)).unwrap_err();
    assert!(matches!(err, Error::ImpliedVolatilityUnsolvable(_)));
    assert_eq!(s.positions().len(), 1);
    assert_eq!(s.values(), before);
    assert_eq!(s.current_surface(), &rows);
  }

  #[test]
  fn zero_grid_size_rejects_add_atomically() {
    let mut s = StrategySession::new(SessionConfig {
      default_nobs: 0,
      valuation_date: Some(today()),
    });
    let err = s.add_position(&call(100.0, 3.0, 30)).unwrap_err();
    assert!(matches!(err, Error::InvalidPriceGridParameters { .. }));
    assert_eq!(s.state(), SessionState::Empty);
  }

  #[test]
  fn set_day_recomputes_only_current_surface() {
    let mut s = session();
    s.add_position(&call(100.0, 3.0, 30)).unwrap();
    let expiration = s.expiration_surface().clone();
    let before = s.current_surface().clone();

    s.set_day(10.0).unwrap();
    assert_eq!(s.current_surface().day(), Some(10.0));
    assert_ne!(s.current_surface(), &before);
    assert_eq!(s.expiration_surface(), &expiration);
    assert_eq!(s.day(), Some(DayInfo::new(10.0, 30.0)));

    let err = s.set_day(31.0).unwrap_err();
    assert_eq!(err, Error::InvalidDayValue { value: 31.0, max: 30.0 });
    assert_eq!(s.current_day().value(), Some(10.0));
    assert_eq!(s.current_surface().day(), Some(10.0));
  }

  #[test]
  fn set_prices_rebuilds_both_surfaces() {
    let mut s = session();
    s.add_position(&call(100.0, 3.0, 30)).unwrap();

    s.set_prices(80.0, 120.0, 5).unwrap();
    assert_eq!(s.grid().prices(), &[80.0, 90.0, 100.0, 110.0, 120.0]);
    assert_eq!(s.current_surface().rows(), 5);
    assert_eq!(s.expiration_surface().rows(), 5);

    let grid = s.grid().clone();
    assert!(s.set_prices(80.0, 120.0, 0).is_err());
    assert!(s.set_prices(-5.0, 120.0, 5).is_err());
    assert_eq!(s.grid(), &grid);
    assert_eq!(s.current_surface().rows(), 5);
  }

  #[test]
  fn expiration_surface_shows_intrinsic_profit() {
    let mut s = session();
    s.add_position(&call(100.0, 3.0, 30)).unwrap();
    s.set_prices(90.0, 110.0, 3).unwrap();

    let total = s.expiration_surface().total();
    assert_abs_diff_eq!(total[0], -300.0, epsilon = 0.01);
    assert_abs_diff_eq!(total[1], -300.0, epsilon = 0.01);
    assert_abs_diff_eq!(total[2], 700.0, epsilon = 0.01);
  }

  #[test]
  fn removing_last_position_empties_session() {
    let mut s = session();
    s.add_position(&call(100.0, 3.0, 30)).unwrap();
    s.add_position(&PositionSpec::stock(Side::Sell, 10, 100.0)).unwrap();

    s.remove_position(0).unwrap();
    assert_eq!(s.state(), SessionState::Active);
    assert_eq!(s.max_day(), Some(0.0));
    assert_eq!(s.current_surface().prices().dim(), (12, 1));

    assert_eq!(
      s.remove_position(3),
      Err(Error::IndexOutOfRange { index: 3, len: 1 })
    );

    s.remove_position(0).unwrap();
    assert_eq!(s.state(), SessionState::Empty);
    assert_eq!(s.current_day().value(), None);
    assert_eq!(s.expiration_day().value(), None);
    assert!(s.grid().is_empty());
    assert!(s.current_surface().is_empty());
    assert!(s.expiration_surface().is_empty());
    assert_eq!(s.values(), None);
  }

  #[test]
  fn remove_all_clears_everything() {
    let mut s = session();
    s.add_position(&call(100.0, 3.0, 30)).unwrap();
    s.add_position(&call(105.0, 1.5, 45)).unwrap();

    s.remove_all_positions();
    assert_eq!(s.state(), SessionState::Empty);
    assert_eq!(s.max_day(), None);
    assert!(s.expiration_surface().is_empty());
  }

  #[test]
  fn replace_position_rebuilds_in_place() {
    let mut s = session();
    s.add_position(&call(100.0, 3.0, 30)).unwrap();
    s.add_position(&PositionSpec::stock(Side::Buy, 100, 100.0)).unwrap();

    s.replace_position(0, &call(95.0, 6.5, 90)).unwrap();
    assert_eq!(s.positions().len(), 2);
    assert_eq!(s.positions().get(0).unwrap().strike(), Some(95.0));
    assert_eq!(s.max_day(), Some(90.0));

    assert!(s.replace_position(0, &call(95.0, 900.0, 90)).is_err());
    assert!(s.replace_position(7, &call(95.0, 6.5, 90)).is_err());
    assert_eq!(s.positions().get(0).unwrap().strike(), Some(95.0));
  }

  #[test]
  fn set_volatility_overrides_options() {
    let mut s = session();
    s.add_position(&call(100.0, 3.0, 30)).unwrap();
    let before = s.current_surface().clone();

    s.set_volatility(0.9).unwrap();
    assert_eq!(s.attributes()[0].implied_volatility, Some(0.9));
    assert_ne!(s.current_surface(), &before);
    assert!(s.set_volatility(0.0).is_err());
  }

  #[test]
  #[traced_test]
  fn mutations_are_logged() {
    let mut s = session();
    s.add_position(&call(100.0, 3.0, 30)).unwrap();
    assert!(logs_contain("strategy rebuilt"));

    assert!(s.set_day(99.0).is_err());
    assert!(logs_contain("day rejected"));
  }

  #[test]
  fn values_serialize_for_renderers() {
    let mut s = session();
    s.add_position(&call(100.0, 3.0, 30)).unwrap();
    let json = serde_json::to_value(s.values().unwrap()).unwrap();
    assert_eq!(json["day"]["max_day"], 30.0);
    assert_eq!(json["price_range"]["nobs"], 12);
    assert_eq!(json["price_range"]["min"], 0.0);
  }
}
