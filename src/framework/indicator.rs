//! # Busy/Idle Indicators
//!
//! Each seat owns one boolean output that is lit while its philosopher eats.
//! On a development board these are LEDs; here the output medium is an
//! injected [`IndicatorSink`] so the philosophers never depend on it.
//! Indicator calls are best effort: a failure is logged by the caller and
//! never stops or blocks the philosopher.

use crate::framework::error::IndicatorError;
use crate::model::Seat;
use tracing::debug;

/// Output device for per-seat busy/idle state.
pub trait IndicatorSink: Send + Sync {
    /// Sets the indicator of `seat` to busy (`true`) or idle (`false`).
    /// Must not block.
    fn set_indicator(&self, seat: Seat, busy: bool) -> Result<(), IndicatorError>;
}

/// Discards every update. Used when there is nothing to light up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullIndicator;

impl IndicatorSink for NullIndicator {
    fn set_indicator(&self, _seat: Seat, _busy: bool) -> Result<(), IndicatorError> {
        Ok(())
    }
}

/// Emits every indicator change as a `debug` event, one "LED" per seat.
///
/// Seats beyond `outputs` have no output wired and report
/// [`IndicatorError::Unavailable`].
#[derive(Debug, Clone, Copy)]
pub struct TracingIndicator {
    outputs: usize,
}

impl TracingIndicator {
    pub fn new(outputs: usize) -> Self {
        Self { outputs }
    }
}

impl IndicatorSink for TracingIndicator {
    fn set_indicator(&self, seat: Seat, busy: bool) -> Result<(), IndicatorError> {
        if seat.0 >= self.outputs {
            return Err(IndicatorError::Unavailable(format!(
                "no output wired for seat {seat}"
            )));
        }
        let led = if busy { "on" } else { "off" };
        debug!(%seat, led, "Indicator");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_indicator_rejects_unwired_seat() {
        let leds = TracingIndicator::new(5);
        assert!(leds.set_indicator(Seat(4), true).is_ok());
        assert!(matches!(
            leds.set_indicator(Seat(5), true),
            Err(IndicatorError::Unavailable(_))
        ));
    }
}
