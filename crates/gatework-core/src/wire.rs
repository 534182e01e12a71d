//! Connect and disconnect.
//!
//! Both sides of a wire are updated together: an input's `driver` names
//! an output exactly when that output's `driven` list contains the input.

use crate::circuit::Circuit;
use crate::endpoint::{Endpoint, InputId, OutputId};
use crate::error::CircuitError;
use crate::signal::Signal;

/// Split an endpoint pair into (input, output), whatever the argument order.
fn orient(a: Endpoint, b: Endpoint) -> Result<(InputId, OutputId), CircuitError> {
    match (a, b) {
        (Endpoint::Input(input), Endpoint::Output(output))
        | (Endpoint::Output(output), Endpoint::Input(input)) => Ok((input, output)),
        _ => Err(CircuitError::TypeMismatch),
    }
}

impl Circuit {
    /// Wire an output to an input. Arguments may come in either order.
    ///
    /// An input that already has a driver is disconnected from it first.
    /// The input then adopts the output's value and notifies, even if the
    /// value is unchanged, so its unit is re-evaluated.
    pub fn connect(
        &mut self,
        a: impl Into<Endpoint>,
        b: impl Into<Endpoint>,
    ) -> Result<(), CircuitError> {
        let (input, output) = orient(a.into(), b.into())?;
        self.input(input)?;
        self.output(output)?;
        self.wire(input, output);
        Ok(())
    }

    /// Remove the wire between an output and an input.
    ///
    /// Fails with [`CircuitError::NotConnected`] and changes nothing if the
    /// pair is not wired together.
    pub fn disconnect(
        &mut self,
        a: impl Into<Endpoint>,
        b: impl Into<Endpoint>,
    ) -> Result<(), CircuitError> {
        let (input, output) = orient(a.into(), b.into())?;
        self.input(input)?;
        self.output(output)?;
        self.unwire(input, output)
    }

    /// Check if `output` drives `input`.
    pub fn is_connected(&self, input: InputId, output: OutputId) -> bool {
        self.input(input)
            .map(|i| i.driver == Some(output))
            .unwrap_or(false)
    }

    /// Connect two existing endpoints. Callers have checked both IDs.
    pub(crate) fn wire(&mut self, input: InputId, output: OutputId) {
        if let Some(previous) = self.input(input).ok().and_then(|i| i.driver) {
            if let Err(err) = self.unwire(input, previous) {
                tracing::debug!(%input, %previous, %err, "stale driver on rewire");
            }
        }
        // Unwiring propagated; make sure both ends survived before linking.
        let (Ok(_), Ok(_)) = (self.input(input), self.output(output)) else {
            return;
        };
        if let Ok(target) = self.input_mut(input) {
            target.driver = Some(output);
        }
        if let Ok(source) = self.output_mut(output) {
            if !source.driven.contains(&input) {
                source.driven.push(input);
            }
        }
        tracing::debug!(%output, %input, "connected");
        self.refresh_input(input);
    }

    /// Break an existing wire, reset the input to `Low` and notify it.
    pub(crate) fn unwire(&mut self, input: InputId, output: OutputId) -> Result<(), CircuitError> {
        if !self.is_connected(input, output) {
            return Err(CircuitError::NotConnected { input, output });
        }
        if let Ok(source) = self.output_mut(output) {
            source.driven.retain(|&driven| driven != input);
        }
        let target = self.input_mut(input)?;
        target.driver = None;
        target.value = Signal::Low;
        tracing::debug!(%output, %input, "disconnected");
        self.notify_input(input);
        Ok(())
    }
}
