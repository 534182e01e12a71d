//! Change propagation.
//!
//! Propagation is synchronous and depth-first. Assigning a new value to
//! an output pushes it to every driven input; each input re-evaluates its
//! unit, which may assign further outputs, recursively, before the
//! original assignment returns.
//!
//! Feedback loops are legal. An output that keeps re-entering its own
//! assignment more than [`Limits::max_reentry`](crate::Limits) times is
//! treated as oscillating: its driven inputs are disconnected and a
//! [`Fault::Oscillation`] is recorded.

use crate::circuit::Circuit;
use crate::endpoint::{Endpoint, InputId, OutputId};
use crate::error::{CircuitError, Fault};
use crate::notify::ValueChange;
use crate::signal::Signal;
use crate::unit::{UnitId, UnitKind};

impl Circuit {
    /// Force an output to `value` and propagate the change.
    ///
    /// Assigning the value an output already holds does nothing: no
    /// downstream evaluation and no notification.
    pub fn drive(&mut self, output: OutputId, value: Signal) -> Result<(), CircuitError> {
        self.output(output)?;
        self.set_output(output, value);
        Ok(())
    }

    /// Assign an output and propagate. Unknown outputs are ignored.
    ///
    /// `reentry` counts how many assignments of this output are currently
    /// on the stack. An unchanged value returns early and leaves it alone;
    /// it only returns to zero once every enclosing assignment unwinds, or
    /// when the guard trips.
    pub(crate) fn set_output(&mut self, id: OutputId, value: Signal) {
        let max_reentry = self.limits.max_reentry;
        let Ok(output) = self.output_mut(id) else {
            return;
        };
        if output.value == value {
            return;
        }
        if output.reentry > max_reentry {
            output.reentry = 0;
            self.sever(id);
            return;
        }
        output.reentry += 1;
        output.value = value;
        let driven = output.driven.clone();

        for input in driven {
            // A nested propagation may have severed this wire already.
            if self.is_connected(input, id) {
                self.refresh_input(input);
            }
        }

        let Ok(output) = self.output_mut(id) else {
            return;
        };
        output.reentry = output.reentry.saturating_sub(1);
        let value = output.value;
        self.watchers.fire(ValueChange {
            endpoint: Endpoint::Output(id),
            value,
        });
    }

    /// Break every wire out of an oscillating output and record the fault.
    fn sever(&mut self, id: OutputId) {
        let driven = match self.output(id) {
            Ok(output) => output.driven.clone(),
            Err(_) => return,
        };
        let mut severed = Vec::with_capacity(driven.len());
        for input in driven {
            match self.unwire(input, id) {
                Ok(()) => severed.push(input),
                Err(err) => {
                    tracing::debug!(output = %id, %input, %err, "input already detached while severing");
                }
            }
        }
        tracing::warn!(
            output = %id,
            severed = severed.len(),
            "oscillation guard tripped, severed feedback wiring"
        );
        self.faults.push(Fault::Oscillation {
            output: id,
            severed,
        });
    }

    /// Copy the driver's current value into an input and notify it.
    pub(crate) fn refresh_input(&mut self, id: InputId) {
        let driver = match self.input(id) {
            Ok(input) => input.driver,
            Err(_) => return,
        };
        let value = driver
            .and_then(|output| self.output(output).ok())
            .map_or(Signal::Low, |output| output.value);
        if let Ok(input) = self.input_mut(id) {
            input.value = value;
        }
        self.notify_input(id);
    }

    /// Tell watchers and the owning unit that an input changed.
    pub(crate) fn notify_input(&mut self, id: InputId) {
        let (owner, value) = match self.input(id) {
            Ok(input) => (input.owner, input.value),
            Err(_) => return,
        };
        self.watchers.fire(ValueChange {
            endpoint: Endpoint::Input(id),
            value,
        });
        self.evaluate(owner);
    }

    /// Recompute a primitive unit's outputs from its inputs.
    ///
    /// Only gates evaluate. Switches are driven by `toggle`, lamps have
    /// no outputs, and a group's pins are evaluated by its members.
    pub(crate) fn evaluate(&mut self, id: UnitId) {
        let Ok(unit) = self.unit(id) else {
            return;
        };
        let UnitKind::Gate(logic) = &unit.kind else {
            return;
        };
        let logic = logic.clone();
        let inputs: Vec<Signal> = unit
            .inputs
            .iter()
            .map(|slot| {
                slot.and_then(|input| self.input(input).ok())
                    .map_or(Signal::Low, |input| input.value)
            })
            .collect();
        let outputs = unit.outputs.clone();

        self.evaluations += 1;
        tracing::trace!(unit = %id, "evaluating");

        let values = logic.eval(&inputs);
        for (slot, value) in outputs.into_iter().zip(values) {
            if let Some(output) = slot {
                self.set_output(output, value);
            }
        }
    }
}
