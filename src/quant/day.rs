use crate::error::Error;
use crate::error::Result;

/// Days left until expiration, bounded by the longest-dated position.
///
/// A cleared counter has neither a value nor a maximum and rejects every
/// `set`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DayCounter {
  max: Option<f64>,
  value: Option<f64>,
}

impl DayCounter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start at `max` days, the furthest point from expiration.
  pub fn init(&mut self, max: f64) {
    self.max = Some(max);
    self.value = Some(max);
  }

  pub fn clear(&mut self) {
    self.max = None;
    self.value = None;
  }

  /// Move to `n` days left; rejected without change outside `[0, max]`.
  pub fn set(&mut self, n: f64) -> Result<()> {
    let Some(max) = self.max else {
      return Err(Error::EmptySession);
    };
    if !(n >= 0.0 && n <= max) {
      return Err(Error::InvalidDayValue { value: n, max });
    }
    self.value = Some(n);
    Ok(())
  }

  pub fn value(&self) -> Option<f64> {
    self.value
  }

  pub fn max(&self) -> Option<f64> {
    self.max
  }
}
