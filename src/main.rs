use std::env;

use anyhow::Context;
use anyhow::Result;
use chrono::Days;
use chrono::Local;
use oedge::quant::position::PositionSpec;
use oedge::quant::strategy::SessionConfig;
use oedge::quant::strategy::StrategySession;
use oedge::quant::OptionType;
use oedge::quant::Side;
use oedge::visualization::pnl_table;
use oedge::visualization::PnlChart;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Prints a sample bull call spread hedged with stock, halfway to
/// expiration. Pass a path to also write the P&L chart as HTML.
fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let today = Local::now().date_naive();
  let expiration = today
    .checked_add_days(Days::new(30))
    .context("expiration date out of range")?;

  let mut session = StrategySession::new(SessionConfig {
    valuation_date: Some(today),
    ..SessionConfig::default()
  });

  let legs = [
    PositionSpec::option(Side::Buy, OptionType::Call, 1, 3.0, 100.0, 100.0, 0.05, expiration),
    PositionSpec::option(Side::Sell, OptionType::Call, 1, 1.0, 105.0, 100.0, 0.05, expiration),
    PositionSpec::stock(Side::Sell, 50, 100.0),
  ];
  for leg in &legs {
    let id = session
      .add_position(leg)
      .with_context(|| format!("failed adding {}", leg.action))?;
    info!(id, action = %leg.action, "position added");
  }

  session.set_prices(85.0, 115.0, 13)?;
  session.set_day(15.0)?;

  for attributes in session.attributes() {
    match attributes.implied_volatility {
      Some(v) => info!(action = %attributes.action, iv = v, debit = attributes.debit, "leg"),
      None => info!(action = %attributes.action, debit = attributes.debit, "leg"),
    }
  }
  info!(net_debit = session.net_debit(), "strategy");

  if let Some(table) = pnl_table(&session) {
    table.printstd();
  }

  if let Some(path) = env::args().nth(1) {
    PnlChart::new("Bull call spread with short stock").write_html(&session, &path)?;
    info!(path = %path, "chart written");
  }

  Ok(())
}
