//! Circuit arena: owns every unit and endpoint.
//!
//! Units and endpoints are addressed by IDs into slot vectors. A slot is
//! emptied when its occupant is removed and is never reused, so a stale ID
//! reports `Unknown*` instead of aliasing a newer entity.

use crate::endpoint::{Endpoint, Input, InputId, Output, OutputId, PinLabel, PinMarker};
use crate::error::{CircuitError, Fault};
use crate::layout::{Bounds, Placement, Point, Side};
use crate::limits::Limits;
use crate::notify::{ValueChange, Watchers};
use crate::signal::{Gate, Logic, Signal};
use crate::unit::{LogicUnit, UnitId, UnitKind};

/// Pin count of the default switch and lamp.
pub const DEFAULT_PIN_COUNT: usize = 4;

/// An in-memory circuit.
///
/// All mutation goes through `&mut Circuit`, which gives propagation the
/// exclusive access it assumes.
#[derive(Debug, Default)]
pub struct Circuit {
    pub(crate) units: Vec<Option<LogicUnit>>,
    pub(crate) inputs: Vec<Option<Input>>,
    pub(crate) outputs: Vec<Option<Output>>,
    pub(crate) watchers: Watchers,
    pub(crate) faults: Vec<Fault>,
    pub(crate) limits: Limits,
    pub(crate) evaluations: u64,
}

impl Circuit {
    /// Create an empty circuit with default limits.
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    /// Create an empty circuit with custom limits.
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Limits this circuit was created with.
    pub fn limits(&self) -> Limits {
        self.limits
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Add a built-in gate.
    pub fn add_gate(&mut self, gate: Gate) -> UnitId {
        self.add_unit(Logic::from(gate), gate.name(), gate.symbol())
    }

    /// Add a primitive unit evaluating `logic`.
    ///
    /// The unit is evaluated once immediately, so its outputs reflect the
    /// function applied to all-`Low` inputs.
    pub fn add_unit(
        &mut self,
        logic: Logic,
        name: impl Into<String>,
        symbol: impl Into<String>,
    ) -> UnitId {
        let inputs = vec![PinLabel::default(); logic.input_arity()];
        let outputs = vec![PinLabel::default(); logic.output_arity()];
        let id = self.alloc_unit(
            UnitKind::Gate(logic),
            name.into(),
            symbol.into(),
            inputs,
            outputs,
            Placement::default(),
        );
        self.evaluate(id);
        id
    }

    /// Add a switch with `outputs` pins, initially off.
    pub fn add_switch(&mut self, outputs: usize) -> UnitId {
        self.alloc_unit(
            UnitKind::Switch { on: false },
            "Switch".to_string(),
            String::new(),
            Vec::new(),
            vec![PinLabel::default(); outputs],
            Placement::default(),
        )
    }

    /// Add a lamp with `inputs` pins.
    pub fn add_lamp(&mut self, inputs: usize) -> UnitId {
        self.alloc_unit(
            UnitKind::Lamp,
            "Lamp".to_string(),
            String::new(),
            vec![PinLabel::default(); inputs],
            Vec::new(),
            Placement::default(),
        )
    }

    /// Allocate a unit and its endpoints. Does not evaluate.
    pub(crate) fn alloc_unit(
        &mut self,
        kind: UnitKind,
        name: String,
        symbol: String,
        input_labels: Vec<PinLabel>,
        output_labels: Vec<PinLabel>,
        placement: Placement,
    ) -> UnitId {
        let id = UnitId(self.units.len());
        let inputs = input_labels
            .into_iter()
            .map(|label| Some(self.push_input(Input::new(id, label))))
            .collect();
        let outputs = output_labels
            .into_iter()
            .map(|label| Some(self.push_output(Output::new(id, label))))
            .collect();
        self.units.push(Some(LogicUnit {
            name,
            symbol,
            kind,
            inputs,
            outputs,
            parent: None,
            placement,
        }));
        id
    }

    pub(crate) fn push_unit(&mut self, unit: LogicUnit) -> UnitId {
        let id = UnitId(self.units.len());
        self.units.push(Some(unit));
        id
    }

    fn push_input(&mut self, input: Input) -> InputId {
        let id = InputId(self.inputs.len());
        self.inputs.push(Some(input));
        id
    }

    fn push_output(&mut self, output: Output) -> OutputId {
        let id = OutputId(self.outputs.len());
        self.outputs.push(Some(output));
        id
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Look up a unit.
    pub fn unit(&self, id: UnitId) -> Result<&LogicUnit, CircuitError> {
        self.units
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(CircuitError::UnknownUnit(id))
    }

    /// Look up an input.
    pub fn input(&self, id: InputId) -> Result<&Input, CircuitError> {
        self.inputs
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(CircuitError::UnknownInput(id))
    }

    /// Look up an output.
    pub fn output(&self, id: OutputId) -> Result<&Output, CircuitError> {
        self.outputs
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(CircuitError::UnknownOutput(id))
    }

    pub(crate) fn unit_mut(&mut self, id: UnitId) -> Result<&mut LogicUnit, CircuitError> {
        self.units
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(CircuitError::UnknownUnit(id))
    }

    pub(crate) fn input_mut(&mut self, id: InputId) -> Result<&mut Input, CircuitError> {
        self.inputs
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(CircuitError::UnknownInput(id))
    }

    pub(crate) fn output_mut(&mut self, id: OutputId) -> Result<&mut Output, CircuitError> {
        self.outputs
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(CircuitError::UnknownOutput(id))
    }

    /// Top-level units, in creation order.
    pub fn units(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.units.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref()
                .filter(|unit| unit.is_top_level())
                .map(|_| UnitId(index))
        })
    }

    /// Number of live units, group internals included.
    pub fn unit_count(&self) -> usize {
        self.units.iter().flatten().count()
    }

    /// Current value of any endpoint.
    pub fn signal(&self, endpoint: impl Into<Endpoint>) -> Result<Signal, CircuitError> {
        match endpoint.into() {
            Endpoint::Input(id) => self.input(id).map(Input::value),
            Endpoint::Output(id) => self.output(id).map(Output::value),
        }
    }

    /// Outermost unit exposing `endpoint`.
    ///
    /// For a group boundary pin this is the group (or the group enclosing
    /// it), not the internal unit that evaluates it.
    pub fn holder(&self, endpoint: impl Into<Endpoint>) -> Result<UnitId, CircuitError> {
        let endpoint = endpoint.into();
        let mut current = match endpoint {
            Endpoint::Input(id) => self.input(id)?.owner,
            Endpoint::Output(id) => self.output(id)?.owner,
        };
        while let Some(parent) = self.unit(current)?.parent {
            let group = self.unit(parent)?;
            let exposed = match endpoint {
                Endpoint::Input(id) => group.exposes_input(id),
                Endpoint::Output(id) => group.exposes_output(id),
            };
            if !exposed {
                break;
            }
            current = parent;
        }
        Ok(current)
    }

    /// Nesting depth of a unit: 0 for leaves, 1 + deepest member for groups.
    pub fn group_depth(&self, id: UnitId) -> Result<usize, CircuitError> {
        let mut deepest = None;
        for &member in self.unit(id)?.members() {
            let depth = self.group_depth(member)?;
            deepest = Some(deepest.map_or(depth, |d: usize| d.max(depth)));
        }
        Ok(deepest.map_or(0, |d| d + 1))
    }

    /// Number of unit evaluations performed so far.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    // ------------------------------------------------------------------
    // Labels
    // ------------------------------------------------------------------

    /// Set the display name of an endpoint.
    pub fn rename(
        &mut self,
        endpoint: impl Into<Endpoint>,
        name: impl Into<String>,
    ) -> Result<(), CircuitError> {
        self.label_mut(endpoint.into())?.name = name.into();
        Ok(())
    }

    /// Set the display marker of an endpoint.
    pub fn set_marker(
        &mut self,
        endpoint: impl Into<Endpoint>,
        marker: PinMarker,
    ) -> Result<(), CircuitError> {
        self.label_mut(endpoint.into())?.marker = marker;
        Ok(())
    }

    pub(crate) fn label(&self, endpoint: Endpoint) -> Result<&PinLabel, CircuitError> {
        match endpoint {
            Endpoint::Input(id) => Ok(&self.input(id)?.label),
            Endpoint::Output(id) => Ok(&self.output(id)?.label),
        }
    }

    fn label_mut(&mut self, endpoint: Endpoint) -> Result<&mut PinLabel, CircuitError> {
        match endpoint {
            Endpoint::Input(id) => Ok(&mut self.input_mut(id)?.label),
            Endpoint::Output(id) => Ok(&mut self.output_mut(id)?.label),
        }
    }

    // ------------------------------------------------------------------
    // Watchers and faults
    // ------------------------------------------------------------------

    /// Call `watcher` every time the value of `endpoint` changes.
    ///
    /// Inputs also notify on every successful connect, even when the
    /// value they adopt equals the previous one.
    pub fn watch<F>(&mut self, endpoint: impl Into<Endpoint>, watcher: F) -> Result<(), CircuitError>
    where
        F: FnMut(&ValueChange) + 'static,
    {
        let endpoint = endpoint.into();
        self.label(endpoint)?;
        self.watchers.add(endpoint, Box::new(watcher));
        Ok(())
    }

    /// Call `watcher` on the next value change of `output` only.
    pub fn watch_once<F>(&mut self, output: OutputId, watcher: F) -> Result<(), CircuitError>
    where
        F: FnMut(&ValueChange) + 'static,
    {
        self.output(output)?;
        self.watchers.add_once(output, Box::new(watcher));
        Ok(())
    }

    /// Number of watchers registered on `endpoint`.
    pub fn watcher_count(&self, endpoint: impl Into<Endpoint>) -> usize {
        self.watchers.count(endpoint.into())
    }

    /// Faults recorded since the last call.
    pub fn take_faults(&mut self) -> Vec<Fault> {
        std::mem::take(&mut self.faults)
    }

    /// Faults recorded and not yet taken.
    pub fn faults(&self) -> &[Fault] {
        &self.faults
    }

    // ------------------------------------------------------------------
    // Switches and lamps
    // ------------------------------------------------------------------

    /// Flip a switch, inverting each of its outputs.
    pub fn toggle(&mut self, id: UnitId) -> Result<(), CircuitError> {
        let unit = self.unit_mut(id)?;
        let UnitKind::Switch { on } = &mut unit.kind else {
            return Err(CircuitError::NotASwitch(id));
        };
        *on = !*on;
        let outputs = unit.outputs.clone();
        for output in outputs.into_iter().flatten() {
            let value = self.output(output)?.value;
            self.set_output(output, !value);
        }
        Ok(())
    }

    /// Check if a switch is on. `false` for every other unit kind.
    pub fn is_on(&self, id: UnitId) -> Result<bool, CircuitError> {
        Ok(matches!(self.unit(id)?.kind, UnitKind::Switch { on: true }))
    }

    /// Check if any input of a lamp is high. `false` for non-lamps.
    pub fn is_lit(&self, id: UnitId) -> Result<bool, CircuitError> {
        let unit = self.unit(id)?;
        if !matches!(unit.kind, UnitKind::Lamp) {
            return Ok(false);
        }
        for input in unit.inputs.iter().flatten() {
            if self.input(*input)?.value.is_high() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    /// Move a unit to `position`.
    pub fn move_unit(&mut self, id: UnitId, position: Point) -> Result<(), CircuitError> {
        self.unit_mut(id)?.placement.position = position;
        Ok(())
    }

    /// Mirror a unit horizontally.
    pub fn flip_unit(&mut self, id: UnitId) -> Result<(), CircuitError> {
        let placement = &mut self.unit_mut(id)?.placement;
        placement.flipped = !placement.flipped;
        Ok(())
    }

    /// Anchor point of an endpoint on the unit that exposes it.
    pub fn pin_anchor(&self, endpoint: impl Into<Endpoint>) -> Result<Point, CircuitError> {
        let endpoint = endpoint.into();
        let unit = self.unit(self.holder(endpoint)?)?;
        let (side, index, count) = match endpoint {
            Endpoint::Input(id) => (
                Side::Input,
                unit.inputs.iter().position(|slot| *slot == Some(id)),
                unit.inputs.len(),
            ),
            Endpoint::Output(id) => (
                Side::Output,
                unit.outputs.iter().position(|slot| *slot == Some(id)),
                unit.outputs.len(),
            ),
        };
        let index = index.unwrap_or(0);
        Ok(unit.placement.pin_anchor(unit.bounds(), side, index, count))
    }

    /// Body size of a unit.
    pub fn bounds(&self, id: UnitId) -> Result<Bounds, CircuitError> {
        Ok(self.unit(id)?.bounds())
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Remove a top-level unit, disconnecting every endpoint it owns.
    ///
    /// Removing a group removes all of its internal units.
    pub fn remove_unit(&mut self, id: UnitId) -> Result<(), CircuitError> {
        if !self.unit(id)?.is_top_level() {
            return Err(CircuitError::InternalUnit(id));
        }
        self.release(id);
        tracing::debug!(unit = %id, "removed unit");
        Ok(())
    }

    /// Take a unit out of the arena, then release what it owns.
    ///
    /// The unit slot is emptied first so that evaluations triggered by the
    /// disconnects below find nothing to evaluate.
    fn release(&mut self, id: UnitId) {
        let Some(unit) = self.units.get_mut(id.0).and_then(Option::take) else {
            return;
        };
        if let UnitKind::Group { members } = unit.kind {
            for member in members {
                self.release(member);
            }
            return;
        }
        for output in unit.outputs.into_iter().flatten() {
            self.release_output(output);
        }
        for input in unit.inputs.into_iter().flatten() {
            self.release_input(input);
        }
    }

    fn release_output(&mut self, id: OutputId) {
        let Ok(output) = self.output(id) else {
            return;
        };
        for input in output.driven.clone() {
            if let Err(err) = self.unwire(input, id) {
                tracing::debug!(output = %id, %input, %err, "driven input already detached");
            }
        }
        self.watchers.forget(Endpoint::Output(id));
        self.outputs[id.0] = None;
    }

    fn release_input(&mut self, id: InputId) {
        let Ok(input) = self.input(id) else {
            return;
        };
        if let Some(driver) = input.driver {
            if let Err(err) = self.unwire(id, driver) {
                tracing::debug!(input = %id, %err, "input already detached");
            }
        }
        self.watchers.forget(Endpoint::Input(id));
        self.inputs[id.0] = None;
    }

    // ------------------------------------------------------------------
    // Copy
    // ------------------------------------------------------------------

    /// Duplicate a unit with fresh, unconnected endpoints.
    ///
    /// Gates share their function with the original; groups are rebuilt
    /// from their internal units. The copy is always top-level.
    pub fn copy_unit(&mut self, id: UnitId) -> Result<UnitId, CircuitError> {
        let copy = self.duplicate(id)?;
        tracing::debug!(unit = %id, %copy, "copied unit");
        Ok(copy)
    }

    /// Copy each unit independently. Wires between them are not copied.
    pub fn copy_units(&mut self, ids: &[UnitId]) -> Result<Vec<UnitId>, CircuitError> {
        for &id in ids {
            self.unit(id)?;
        }
        ids.iter().map(|&id| self.copy_unit(id)).collect()
    }

    pub(crate) fn duplicate(&mut self, id: UnitId) -> Result<UnitId, CircuitError> {
        let unit = self.unit(id)?;
        let name = unit.name.clone();
        let symbol = unit.symbol.clone();
        let placement = unit.placement;
        match unit.kind.clone() {
            UnitKind::Group { members } => {
                let inputs = unit.inputs.clone();
                let outputs = unit.outputs.clone();
                self.assemble(&members, &inputs, &outputs, name, symbol, placement)
            }
            kind => {
                let inputs = self.input_labels(&unit.inputs)?;
                let outputs = self.output_labels(&unit.outputs)?;
                let kind = match kind {
                    UnitKind::Switch { .. } => UnitKind::Switch { on: false },
                    other => other,
                };
                let copy = self.alloc_unit(kind, name, symbol, inputs, outputs, placement);
                self.evaluate(copy);
                Ok(copy)
            }
        }
    }

    fn input_labels(&self, slots: &[Option<InputId>]) -> Result<Vec<PinLabel>, CircuitError> {
        slots
            .iter()
            .map(|slot| match slot {
                Some(id) => Ok(self.input(*id)?.label.clone()),
                None => Ok(PinLabel::default()),
            })
            .collect()
    }

    fn output_labels(&self, slots: &[Option<OutputId>]) -> Result<Vec<PinLabel>, CircuitError> {
        slots
            .iter()
            .map(|slot| match slot {
                Some(id) => Ok(self.output(*id)?.label.clone()),
                None => Ok(PinLabel::default()),
            })
            .collect()
    }
}
