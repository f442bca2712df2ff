//! # Computed Surface
//!
//! $$
//! P_{ij}=V_j(u_i,t),\qquad \Pi_{ij}=\pi_j(P_{ij}),\qquad T_i=\sum_j \Pi_{ij}
//! $$
//!
//! Theoretical prices and profits of every position at every grid sample for
//! one day snapshot. Rows are independent and are filled in parallel.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::Zip;

use super::grid::PriceGrid;
use super::portfolio::PositionSet;
use crate::numeric::sum;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Surface {
  day: Option<f64>,
  /// Grid samples, one per row
  underlying: Array1<f64>,
  /// Per-position theoretical prices, `rows x positions`
  prices: Array2<f64>,
  /// Per-position profits, `rows x positions`
  profits: Array2<f64>,
  /// Total profit per row
  total: Array1<f64>,
}

impl Surface {
  /// Evaluate every position at every sample of `grid` with `day` days left.
  pub fn compute(positions: &PositionSet, grid: &PriceGrid, day: f64) -> Self {
    let rows = grid.len();
    let cols = positions.len();

    let underlying = Array1::from(grid.prices().to_vec());
    let mut prices = Array2::<f64>::zeros((rows, cols));
    let mut profits = Array2::<f64>::zeros((rows, cols));
    let mut total = Array1::<f64>::zeros(rows);

    Zip::from(prices.rows_mut())
      .and(profits.rows_mut())
      .and(&mut total)
      .and(&underlying)
      .par_for_each(|mut price_row, mut profit_row, row_total, &u| {
        let row_prices = positions.prices_at(u, day);
        let row_profits = positions.profits_at(&row_prices);
        *row_total = sum(&row_profits);
        price_row.assign(&ArrayView1::from(&row_prices[..]));
        profit_row.assign(&ArrayView1::from(&row_profits[..]));
      });

    Self {
      day: Some(day),
      underlying,
      prices,
      profits,
      total,
    }
  }

  /// Replace the contents with a full pass over the inputs.
  pub fn recompute(&mut self, positions: &PositionSet, grid: &PriceGrid, day: f64) {
    *self = Self::compute(positions, grid, day);
  }

  pub fn clear(&mut self) {
    *self = Self::default();
  }

  pub fn is_empty(&self) -> bool {
    self.day.is_none()
  }

  /// Day snapshot the surface was computed for.
  pub fn day(&self) -> Option<f64> {
    self.day
  }

  pub fn underlying(&self) -> &Array1<f64> {
    &self.underlying
  }

  pub fn prices(&self) -> &Array2<f64> {
    &self.prices
  }

  pub fn profits(&self) -> &Array2<f64> {
    &self.profits
  }

  pub fn total(&self) -> &Array1<f64> {
    &self.total
  }

  pub fn rows(&self) -> usize {
    self.underlying.len()
  }
}
