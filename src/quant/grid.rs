//! # Price Grid
//!
//! $$
//! x_{\text{new}}=\tfrac12\,(x_{i-1}+x_i),\qquad i=\arg\max_j\,(x_j-x_{j-1})
//! $$
//!
//! Ascending samples of the underlying used as the x-axis of every table and
//! chart. The bounds and the required points (strikes) are placed first and
//! the widest gaps are then bisected until the target count is reached.

use impl_new_derive::ImplNew;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;
use crate::numeric::round;
use crate::numeric::DOLLAR_PRECISION;

/// Rounding unit for inserted samples.
pub const GRID_PRECISION: f64 = DOLLAR_PRECISION;
/// `display_max` starts at this multiple of the first upper bound.
pub const DISPLAY_MULTIPLIER: f64 = 1.5;

/// Range of the grid as shown to price controls.
#[derive(ImplNew, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
  pub lower: f64,
  pub upper: f64,
  /// Smallest selectable price, always 0
  pub min: f64,
  /// Largest selectable price
  pub max: f64,
  pub nobs: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceGrid {
  prices: Vec<f64>,
  lower: Option<f64>,
  upper: Option<f64>,
  nobs: Option<usize>,
  display_max: Option<f64>,
}

impl PriceGrid {
  pub fn new() -> Self {
    Self::default()
  }

  /// Forget the samples and the display maximum.
  pub fn clear(&mut self) {
    *self = Self::default();
  }

  /// Rebuild from scratch, restarting the display maximum.
  pub fn init(&mut self, lower: f64, upper: f64, nobs: usize, required: &[f64]) -> Result<()> {
    let mut grid = Self::new();
    grid.build(lower, upper, nobs, required)?;
    *self = grid;
    Ok(())
  }

  /// Resample between `lower` and `upper` with exactly `nobs` points.
  ///
  /// `lower > upper` collapses the range onto `lower`. Required points inside
  /// the range are kept while capacity lasts, in the order given. On error
  /// the grid is left untouched.
  pub fn build(&mut self, lower: f64, upper: f64, nobs: usize, required: &[f64]) -> Result<()> {
    if !(lower >= 0.0 && upper >= 0.0 && nobs > 0) || !lower.is_finite() || !upper.is_finite() {
      return Err(Error::InvalidPriceGridParameters { lower, upper, nobs });
    }
    let upper = upper.max(lower);

    let mut prices = Vec::with_capacity(nobs);
    for bound in [lower, upper] {
      if prices.len() < nobs {
        prices.push(bound);
      }
    }

    for &point in required {
      if prices.len() >= nobs {
        break;
      }
      if point >= lower && point <= upper && !prices.contains(&point) {
        prices.push(point);
      }
    }

    prices.sort_by(|a, b| a.total_cmp(b));

    while prices.len() < nobs {
      match widest_gap(&prices) {
        Some(i) => {
          let mid = prices[i - 1] + (prices[i] - prices[i - 1]) / 2.0;
          prices.insert(i, round(mid, GRID_PRECISION));
        }
        None => {
          let last = prices[prices.len() - 1];
          prices.push(round(last, GRID_PRECISION));
        }
      }
    }

    self.lower = prices.first().copied();
    self.upper = prices.last().copied();
    self.nobs = Some(prices.len());
    self.prices = prices;
    self.update_display_max();

    Ok(())
  }

  fn update_display_max(&mut self) {
    let Some(upper) = self.upper else {
      return;
    };
    match self.display_max {
      Some(max) if max != 0.0 => {
        if upper > max {
          self.display_max = Some(upper);
        }
      }
      _ => self.display_max = Some(round(upper * DISPLAY_MULTIPLIER, GRID_PRECISION)),
    }
  }

  pub fn prices(&self) -> &[f64] {
    &self.prices
  }

  pub fn is_empty(&self) -> bool {
    self.prices.is_empty()
  }

  pub fn len(&self) -> usize {
    self.prices.len()
  }

  pub fn lower(&self) -> Option<f64> {
    self.lower
  }

  pub fn upper(&self) -> Option<f64> {
    self.upper
  }

  pub fn nobs(&self) -> Option<usize> {
    self.nobs
  }

  pub fn display_max(&self) -> Option<f64> {
    self.display_max
  }

  pub fn max_price(&self) -> Option<f64> {
    self.prices.iter().copied().reduce(f64::max)
  }

  /// `None` until the grid has been built.
  pub fn range(&self) -> Option<PriceRange> {
    Some(PriceRange::new(
      self.lower?,
      self.upper?,
      0.0,
      self.display_max?,
      self.nobs?,
    ))
  }
}

/// Right index of the leftmost widest strictly positive gap.
fn widest_gap(prices: &[f64]) -> Option<usize> {
  let mut widest = 0.0;
  let mut index = None;
  for (i, pair) in prices.windows(2).enumerate() {
    let gap = pair[1] - pair[0];
    if gap > widest {
      widest = gap;
      index = Some(i + 1);
    }
  }
  index
}
