//! # Visualization
//!
//! $$
//! \{(u_i, T_i^{\text{now}}, T_i^{\text{exp}})\}_{i=1}^{n} \mapsto \text{table, chart}
//! $$
//!
//! Thin renderers over the surfaces of a [`StrategySession`]. Nothing here
//! computes prices; everything is read from the session.

use std::fs;
use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use plotly::common::DashType;
use plotly::common::Line;
use plotly::common::Mode;
use plotly::common::Title;
use plotly::Layout;
use plotly::Plot;
use plotly::Scatter;
use prettytable::Cell;
use prettytable::Row;
use prettytable::Table;

use crate::quant::strategy::StrategySession;

/// Decimals shown for theoretical prices.
pub const PRICE_DECIMALS: usize = 3;
/// Decimals shown for dollar amounts.
pub const DOLLAR_DECIMALS: usize = 2;

/// `-12.5` becomes `-$12.50`.
pub fn format_dollars(value: f64) -> String {
  let text = format!("{:.*}", DOLLAR_DECIMALS, value.abs());
  if value < 0.0 && text.chars().any(|c| c != '0' && c != '.') {
    format!("-${text}")
  } else {
    format!("${text}")
  }
}

/// One row per grid sample: the sample, each position's price and profit at
/// the current day, then total profit now and at expiration.
pub fn pnl_table(session: &StrategySession) -> Option<Table> {
  let current = session.current_surface();
  let expiration = session.expiration_surface();
  if current.is_empty() || expiration.is_empty() {
    return None;
  }

  let mut table = Table::new();
  let mut titles = vec![Cell::new("Price")];
  for id in 1..=session.positions().len() {
    titles.push(Cell::new(&format!("#{id} Price")));
    titles.push(Cell::new(&format!("#{id} P&L")));
  }
  titles.push(Cell::new("Current"));
  titles.push(Cell::new("Expiration"));
  table.set_titles(Row::new(titles));

  for (i, u) in current.underlying().iter().enumerate() {
    let mut cells = vec![Cell::new(&format!("{:.*}", DOLLAR_DECIMALS, u))];
    for (price, profit) in current.prices().row(i).iter().zip(current.profits().row(i)) {
      cells.push(Cell::new(&format!("{:.*}", PRICE_DECIMALS, price)));
      cells.push(Cell::new(&format_dollars(*profit)));
    }
    cells.push(Cell::new(&format_dollars(current.total()[i])));
    cells.push(Cell::new(&format_dollars(expiration.total()[i])));
    table.add_row(Row::new(cells));
  }

  Some(table)
}

/// Total profit against the underlying, now and at expiration.
#[derive(Clone, Debug)]
pub struct PnlChart {
  title: String,
  line_width: f64,
  show_legend: bool,
}

impl Default for PnlChart {
  fn default() -> Self {
    Self {
      title: "Profit / Loss".to_string(),
      line_width: 2.0,
      show_legend: true,
    }
  }
}

impl PnlChart {
  pub fn new(title: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      ..Self::default()
    }
  }

  pub fn line_width(mut self, width: f64) -> Self {
    self.line_width = width;
    self
  }

  pub fn show_legend(mut self, show: bool) -> Self {
    self.show_legend = show;
    self
  }

  /// `None` while the session has no positions.
  pub fn plot(&self, session: &StrategySession) -> Option<Plot> {
    let current = session.current_surface();
    let expiration = session.expiration_surface();
    if current.is_empty() || expiration.is_empty() {
      return None;
    }

    let x = current.underlying().to_vec();
    let day = current.day().unwrap_or_default();

    let mut plot = Plot::new();
    plot.add_trace(
      Scatter::new(x.clone(), current.total().to_vec())
        .name(format!("{day} days"))
        .mode(Mode::Lines)
        .line(Line::new().width(self.line_width))
        .show_legend(self.show_legend),
    );
    plot.add_trace(
      Scatter::new(x, expiration.total().to_vec())
        .name("Expiration")
        .mode(Mode::Lines)
        .line(Line::new().width(self.line_width).dash(DashType::Dash))
        .show_legend(self.show_legend),
    );
    plot.set_layout(Layout::new().title(Title::from(self.title.as_str())));

    Some(plot)
  }

  /// Write the chart to `output_html`, creating parent directories.
  pub fn write_html(&self, session: &StrategySession, output_html: impl AsRef<Path>) -> Result<()> {
    let plot = self
      .plot(session)
      .context("cannot chart a strategy without positions")?;

    let output_html = output_html.as_ref();
    if let Some(parent) = output_html.parent() {
      fs::create_dir_all(parent)
        .with_context(|| format!("failed creating chart output directory {:?}", parent))?;
    }
    plot.write_html(output_html);
    Ok(())
  }
}
