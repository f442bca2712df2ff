//! # oedge
//!
//! $$
//! \Pi(u,t)=\sum_i q_i\left(V_i(u,t)-p_i\right)
//! $$
//!
//! Theoretical prices and profit/loss of option and stock strategies over a
//! grid of underlying prices and over time.
//!
//! - [`quant::pricing`] Black-Scholes option model with an implied-volatility
//!   solver, and a linear stock model.
//! - [`quant::portfolio`] ordered position set with aggregate queries.
//! - [`quant::grid`] adaptive sampling of underlying prices.
//! - [`quant::surface`] price/profit matrices for one day snapshot.
//! - [`quant::strategy`] session tying positions, days, grid and surfaces
//!   together.
//! - [`visualization`] P&L table and chart built from a session.
//!
//! ```ignore
//! use oedge::quant::position::PositionSpec;
//! use oedge::quant::strategy::{SessionConfig, StrategySession};
//!
//! let mut session = StrategySession::new(SessionConfig::default());
//! session.add_position(&spec)?;
//! session.set_day(10.0)?;
//! let totals = session.current_surface().total();
//! ```

pub mod error;
pub mod numeric;
pub mod quant;
pub mod visualization;

pub use error::Error;
pub use error::ImpliedVolError;
pub use error::Result;
