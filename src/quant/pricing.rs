//! # Pricing
//!
//! $$
//! C=S\,\Phi(d_1)-Ke^{-rT}\Phi(d_2),\qquad P=Ke^{-rT}\Phi(-d_2)-S\,\Phi(-d_1)
//! $$
//!
pub mod bsm;
pub mod stock;
