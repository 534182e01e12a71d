//! Group construction: freezing a sub-circuit into one reusable unit.
//!
//! A group is built by copying its member units, replaying the wires that
//! run between members, and exposing a chosen set of member pins as the
//! group's own boundary. The copies belong to the group; the original
//! members are left untouched, so the group stays independent of them.

use std::collections::HashSet;

use crate::circuit::Circuit;
use crate::endpoint::{Endpoint, InputId, OutputId};
use crate::error::CircuitError;
use crate::layout::{Placement, Point};
use crate::unit::{LogicUnit, UnitId, UnitKind};

/// Collects members and boundary pins for a new group.
///
/// ```
/// use gatework_core::{Circuit, Gate, GroupBuilder, Signal};
///
/// let mut circuit = Circuit::new();
/// let a = circuit.add_gate(Gate::Not);
/// let b = circuit.add_gate(Gate::Not);
/// let a_out = circuit.unit(a).unwrap().output(0).unwrap();
/// let b_in = circuit.unit(b).unwrap().input(0).unwrap();
/// circuit.connect(a_out, b_in).unwrap();
///
/// let mut builder = GroupBuilder::new("Buffer", "▷▷");
/// builder.add_member(a).unwrap();
/// builder.add_member(b).unwrap();
/// builder.expose(circuit.unit(a).unwrap().input(0).unwrap());
/// builder.expose(circuit.unit(b).unwrap().output(0).unwrap());
///
/// let group = builder.build(&mut circuit).unwrap();
/// let out = circuit.unit(group).unwrap().output(0).unwrap();
/// assert_eq!(circuit.signal(out).unwrap(), Signal::Low);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GroupBuilder {
    name: String,
    symbol: String,
    members: Vec<UnitId>,
    /// Members added so far, for duplicate detection.
    seen: HashSet<UnitId>,
    inputs: Vec<InputId>,
    outputs: Vec<OutputId>,
    position: Option<Point>,
}

impl GroupBuilder {
    /// Create an empty builder for a group called `name`.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Add a member unit. Adding the same unit twice is an error.
    pub fn add_member(&mut self, unit: UnitId) -> Result<(), CircuitError> {
        if !self.seen.insert(unit) {
            return Err(CircuitError::DuplicateMember(unit));
        }
        self.members.push(unit);
        Ok(())
    }

    /// Expose a member endpoint on the group boundary.
    ///
    /// Boundary slots are ordered by the order of `expose` calls, inputs
    /// and outputs separately.
    pub fn expose(&mut self, endpoint: impl Into<Endpoint>) {
        match endpoint.into() {
            Endpoint::Input(id) => self.inputs.push(id),
            Endpoint::Output(id) => self.outputs.push(id),
        }
    }

    /// Place the group. Defaults to the first member's position.
    pub fn at(&mut self, position: Point) {
        self.position = Some(position);
    }

    /// Members added so far, in order.
    pub fn members(&self) -> &[UnitId] {
        &self.members
    }

    /// Inputs to expose, in boundary order.
    pub fn exposed_inputs(&self) -> &[InputId] {
        &self.inputs
    }

    /// Outputs to expose, in boundary order.
    pub fn exposed_outputs(&self) -> &[OutputId] {
        &self.outputs
    }

    /// Build the group. Members stay in the circuit, unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - fewer than two members were added
    /// - a member is unknown, internal to another group, or not a gate or group
    /// - the group would nest deeper than the circuit's limits allow
    ///
    /// A boundary pin that does not belong to any member is not an error:
    /// its slot is left empty.
    pub fn build(&self, circuit: &mut Circuit) -> Result<UnitId, CircuitError> {
        self.validate(circuit)?;
        let placement = match self.position {
            Some(position) => Placement::at(position),
            None => circuit.unit(self.members[0])?.placement,
        };
        let inputs: Vec<_> = self.inputs.iter().copied().map(Some).collect();
        let outputs: Vec<_> = self.outputs.iter().copied().map(Some).collect();
        let group = circuit.assemble(
            &self.members,
            &inputs,
            &outputs,
            self.name.clone(),
            self.symbol.clone(),
            placement,
        )?;
        tracing::debug!(
            %group,
            members = self.members.len(),
            inputs = inputs.len(),
            outputs = outputs.len(),
            "built group"
        );
        Ok(group)
    }

    /// Build the group, then remove the members from the circuit.
    ///
    /// This is the editor's "create element" action: the selected units
    /// are replaced by the new group.
    pub fn encapsulate(&self, circuit: &mut Circuit) -> Result<UnitId, CircuitError> {
        let group = self.build(circuit)?;
        for &member in &self.members {
            circuit.remove_unit(member)?;
        }
        Ok(group)
    }

    fn validate(&self, circuit: &Circuit) -> Result<(), CircuitError> {
        if self.members.len() < 2 {
            return Err(CircuitError::TooFewMembers(self.members.len()));
        }
        let mut depth = 0;
        for &member in &self.members {
            let unit = circuit.unit(member)?;
            if !unit.is_top_level() {
                return Err(CircuitError::InternalUnit(member));
            }
            if !unit.kind.is_groupable() {
                return Err(CircuitError::NotGroupable(member));
            }
            depth = depth.max(circuit.group_depth(member)? + 1);
        }
        let max_depth = circuit.limits().max_group_depth;
        if depth > max_depth {
            return Err(CircuitError::NestingTooDeep(max_depth));
        }
        Ok(())
    }
}

impl Circuit {
    /// Copy `members` into a new group and expose the requested pins.
    ///
    /// Also used to copy an existing group, in which case `members` are its
    /// internal units and the pin slots are its current boundary (possibly
    /// with empty slots, which stay empty).
    pub(crate) fn assemble(
        &mut self,
        members: &[UnitId],
        inputs: &[Option<InputId>],
        outputs: &[Option<OutputId>],
        name: String,
        symbol: String,
        placement: Placement,
    ) -> Result<UnitId, CircuitError> {
        let mut copies = Vec::with_capacity(members.len());
        for &member in members {
            copies.push(self.duplicate(member)?);
        }

        // Replay wires that start and end inside the member set.
        for (source, &member) in members.iter().enumerate() {
            let member_outputs = self.unit(member)?.outputs.clone();
            for (pin, slot) in member_outputs.into_iter().enumerate() {
                let Some(output) = slot else {
                    continue;
                };
                for input in self.output(output)?.driven.clone() {
                    let Some((target, target_pin)) = self.locate_input(members, input) else {
                        continue;
                    };
                    let from = self.unit(copies[source])?.output(pin);
                    let to = self.unit(copies[target])?.input(target_pin);
                    if let (Some(from), Some(to)) = (from, to) {
                        self.wire(to, from);
                    }
                }
            }
        }

        let mut boundary_inputs = Vec::with_capacity(inputs.len());
        for requested in inputs {
            let exposed = match requested.and_then(|id| self.locate_input(members, id)) {
                Some((member, pin)) => self.unit(copies[member])?.input(pin),
                None => None,
            };
            match (*requested, exposed) {
                (Some(requested), Some(exposed)) => {
                    let label = self.input(requested)?.label.clone();
                    self.input_mut(exposed)?.label = label;
                }
                (Some(requested), None) => {
                    tracing::debug!(%requested, "boundary input not found among members");
                }
                _ => {}
            }
            boundary_inputs.push(exposed);
        }

        let mut boundary_outputs = Vec::with_capacity(outputs.len());
        for requested in outputs {
            let exposed = match requested.and_then(|id| self.locate_output(members, id)) {
                Some((member, pin)) => self.unit(copies[member])?.output(pin),
                None => None,
            };
            match (*requested, exposed) {
                (Some(requested), Some(exposed)) => {
                    let label = self.output(requested)?.label.clone();
                    self.output_mut(exposed)?.label = label;
                }
                (Some(requested), None) => {
                    tracing::debug!(%requested, "boundary output not found among members");
                }
                _ => {}
            }
            boundary_outputs.push(exposed);
        }

        let group = self.push_unit(LogicUnit {
            name,
            symbol,
            kind: UnitKind::Group {
                members: copies.clone(),
            },
            inputs: boundary_inputs,
            outputs: boundary_outputs,
            parent: None,
            placement,
        });
        for copy in copies {
            self.unit_mut(copy)?.parent = Some(group);
        }
        Ok(group)
    }

    /// Find which member exposes `input`, and in which slot.
    fn locate_input(&self, members: &[UnitId], input: InputId) -> Option<(usize, usize)> {
        members.iter().enumerate().find_map(|(index, &member)| {
            let unit = self.unit(member).ok()?;
            let pin = unit.inputs.iter().position(|slot| *slot == Some(input))?;
            Some((index, pin))
        })
    }

    /// Find which member exposes `output`, and in which slot.
    fn locate_output(&self, members: &[UnitId], output: OutputId) -> Option<(usize, usize)> {
        members.iter().enumerate().find_map(|(index, &member)| {
            let unit = self.unit(member).ok()?;
            let pin = unit.outputs.iter().position(|slot| *slot == Some(output))?;
            Some((index, pin))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::PinMarker;
    use crate::signal::{Gate, Signal};
    use crate::Limits;
    use Signal::{High, Low};

    /// Two inverters in series, grouped into a buffer.
    fn double_inverter(circuit: &mut Circuit) -> (UnitId, UnitId, UnitId) {
        let a = circuit.add_gate(Gate::Not);
        let b = circuit.add_gate(Gate::Not);
        let a_in = circuit.unit(a).unwrap().input(0).unwrap();
        let a_out = circuit.unit(a).unwrap().output(0).unwrap();
        let b_in = circuit.unit(b).unwrap().input(0).unwrap();
        let b_out = circuit.unit(b).unwrap().output(0).unwrap();
        circuit.connect(a_out, b_in).unwrap();

        let mut builder = GroupBuilder::new("Buffer", "▷");
        builder.add_member(a).unwrap();
        builder.add_member(b).unwrap();
        builder.expose(a_in);
        builder.expose(b_out);
        let group = builder.build(circuit).unwrap();
        (a, b, group)
    }

    fn drive_input(circuit: &mut Circuit, input: InputId) -> UnitId {
        let switch = circuit.add_switch(1);
        let out = circuit.unit(switch).unwrap().output(0).unwrap();
        circuit.connect(out, input).unwrap();
        switch
    }

    #[test]
    fn test_double_inverter_behaves_as_identity() {
        let mut circuit = Circuit::new();
        let (_, _, group) = double_inverter(&mut circuit);
        let unit = circuit.unit(group).unwrap();
        assert_eq!(unit.input_arity(), 1);
        assert_eq!(unit.output_arity(), 1);
        let input = unit.input(0).unwrap();
        let output = unit.output(0).unwrap();

        assert_eq!(circuit.signal(output).unwrap(), Low);
        let switch = drive_input(&mut circuit, input);
        circuit.toggle(switch).unwrap();
        assert_eq!(circuit.signal(output).unwrap(), High);
        circuit.toggle(switch).unwrap();
        assert_eq!(circuit.signal(output).unwrap(), Low);
    }

    #[test]
    fn test_group_members_are_fresh_copies() {
        let mut circuit = Circuit::new();
        let (a, b, group) = double_inverter(&mut circuit);
        let members = circuit.unit(group).unwrap().members().to_vec();
        assert_eq!(members.len(), 2);
        assert!(!members.contains(&a));
        assert!(!members.contains(&b));
        for &member in &members {
            assert_eq!(circuit.unit(member).unwrap().parent(), Some(group));
        }
        assert_eq!(circuit.units().collect::<Vec<_>>(), vec![a, b, group]);
    }

    #[test]
    fn test_mutating_donors_does_not_affect_group() {
        let mut circuit = Circuit::new();
        let (a, b, group) = double_inverter(&mut circuit);
        let a_out = circuit.unit(a).unwrap().output(0).unwrap();
        let b_in = circuit.unit(b).unwrap().input(0).unwrap();
        circuit.disconnect(a_out, b_in).unwrap();
        circuit.remove_unit(a).unwrap();

        let input = circuit.unit(group).unwrap().input(0).unwrap();
        let output = circuit.unit(group).unwrap().output(0).unwrap();
        let switch = drive_input(&mut circuit, input);
        circuit.toggle(switch).unwrap();
        assert_eq!(circuit.signal(output).unwrap(), High);
    }

    #[test]
    fn test_external_wires_are_not_copied() {
        let mut circuit = Circuit::new();
        let a = circuit.add_gate(Gate::Not);
        let b = circuit.add_gate(Gate::Not);
        let outside = circuit.add_gate(Gate::Identity);
        let a_out = circuit.unit(a).unwrap().output(0).unwrap();
        let b_in = circuit.unit(b).unwrap().input(0).unwrap();
        let outside_in = circuit.unit(outside).unwrap().input(0).unwrap();
        circuit.connect(a_out, b_in).unwrap();
        circuit.connect(a_out, outside_in).unwrap();

        let mut builder = GroupBuilder::new("G", "g");
        builder.add_member(a).unwrap();
        builder.add_member(b).unwrap();
        builder.expose(a_out);
        let group = builder.build(&mut circuit).unwrap();

        let exposed = circuit.unit(group).unwrap().output(0).unwrap();
        let driven = circuit.output(exposed).unwrap().driven().to_vec();
        assert_eq!(driven.len(), 1);
        assert_ne!(driven[0], b_in);
        assert_ne!(driven[0], outside_in);
        assert_eq!(circuit.output(a_out).unwrap().driven(), &[b_in, outside_in]);
    }

    #[test]
    fn test_foreign_boundary_pin_leaves_empty_slot() {
        let mut circuit = Circuit::new();
        let a = circuit.add_gate(Gate::Not);
        let b = circuit.add_gate(Gate::Not);
        let stranger = circuit.add_gate(Gate::And);
        let stranger_in = circuit.unit(stranger).unwrap().input(1).unwrap();
        let a_in = circuit.unit(a).unwrap().input(0).unwrap();

        let mut builder = GroupBuilder::new("G", "g");
        builder.add_member(a).unwrap();
        builder.add_member(b).unwrap();
        builder.expose(stranger_in);
        builder.expose(a_in);
        let group = builder.build(&mut circuit).unwrap();

        let unit = circuit.unit(group).unwrap();
        assert_eq!(unit.input_arity(), 2);
        assert_eq!(unit.input(0), None);
        assert!(unit.input(1).is_some());
        assert_eq!(unit.output_arity(), 0);

        // Empty slots survive copying.
        let copy = circuit.copy_unit(group).unwrap();
        let copied = circuit.unit(copy).unwrap();
        assert_eq!(copied.input(0), None);
        assert!(copied.input(1).is_some());
        assert!(circuit.pin_anchor(copied.input(1).unwrap()).is_ok());
    }

    #[test]
    fn test_boundary_labels_are_carried() {
        let mut circuit = Circuit::new();
        let a = circuit.add_gate(Gate::Not);
        let b = circuit.add_gate(Gate::Not);
        let a_in = circuit.unit(a).unwrap().input(0).unwrap();
        let b_out = circuit.unit(b).unwrap().output(0).unwrap();
        circuit.rename(a_in, "D").unwrap();
        circuit.rename(b_out, "Q").unwrap();
        circuit.set_marker(b_out, PinMarker::StaticInverse).unwrap();

        let mut builder = GroupBuilder::new("G", "g");
        builder.add_member(a).unwrap();
        builder.add_member(b).unwrap();
        builder.expose(a_in);
        builder.expose(b_out);
        let group = builder.build(&mut circuit).unwrap();

        let unit = circuit.unit(group).unwrap();
        let input = circuit.input(unit.input(0).unwrap()).unwrap();
        let output = circuit.output(unit.output(0).unwrap()).unwrap();
        assert_eq!(input.name(), "D");
        assert_eq!(output.name(), "Q");
        assert_eq!(output.marker(), PinMarker::StaticInverse);

        let copy = circuit.copy_unit(group).unwrap();
        let copy_out = circuit.unit(copy).unwrap().output(0).unwrap();
        assert_eq!(circuit.output(copy_out).unwrap().name(), "Q");
    }

    #[test]
    fn test_holder_resolves_to_group() {
        let mut circuit = Circuit::new();
        let (_, _, group) = double_inverter(&mut circuit);
        let input = circuit.unit(group).unwrap().input(0).unwrap();
        assert_eq!(circuit.holder(input).unwrap(), group);
        assert_ne!(circuit.input(input).unwrap().owner(), group);
    }

    #[test]
    fn test_copy_of_group_is_independent() {
        let mut circuit = Circuit::new();
        let (_, _, group) = double_inverter(&mut circuit);
        let copy = circuit.copy_unit(group).unwrap();
        assert_eq!(circuit.unit(copy).unwrap().members().len(), 2);

        let copy_in = circuit.unit(copy).unwrap().input(0).unwrap();
        let copy_out = circuit.unit(copy).unwrap().output(0).unwrap();
        let group_out = circuit.unit(group).unwrap().output(0).unwrap();
        let switch = drive_input(&mut circuit, copy_in);
        circuit.toggle(switch).unwrap();

        assert_eq!(circuit.signal(copy_out).unwrap(), High);
        assert_eq!(circuit.signal(group_out).unwrap(), Low);
    }

    #[test]
    fn test_nested_groups() {
        let mut circuit = Circuit::new();
        let (_, _, first) = double_inverter(&mut circuit);
        let (_, _, second) = double_inverter(&mut circuit);
        let first_out = circuit.unit(first).unwrap().output(0).unwrap();
        let first_in = circuit.unit(first).unwrap().input(0).unwrap();
        let second_in = circuit.unit(second).unwrap().input(0).unwrap();
        let second_out = circuit.unit(second).unwrap().output(0).unwrap();
        circuit.connect(first_out, second_in).unwrap();

        let mut builder = GroupBuilder::new("Outer", "▷▷");
        builder.add_member(first).unwrap();
        builder.add_member(second).unwrap();
        builder.expose(first_in);
        builder.expose(second_out);
        let outer = builder.build(&mut circuit).unwrap();
        assert_eq!(circuit.group_depth(outer).unwrap(), 2);

        let copy = circuit.copy_unit(outer).unwrap();
        for unit in [outer, copy] {
            let input = circuit.unit(unit).unwrap().input(0).unwrap();
            let output = circuit.unit(unit).unwrap().output(0).unwrap();
            let switch = drive_input(&mut circuit, input);
            circuit.toggle(switch).unwrap();
            assert_eq!(circuit.signal(output).unwrap(), High);
            assert_eq!(circuit.holder(output).unwrap(), unit);
        }
    }

    #[test]
    fn test_too_few_members() {
        let mut circuit = Circuit::new();
        let a = circuit.add_gate(Gate::Not);
        let mut builder = GroupBuilder::new("G", "g");
        builder.add_member(a).unwrap();
        assert_eq!(builder.build(&mut circuit), Err(CircuitError::TooFewMembers(1)));
    }

    #[test]
    fn test_duplicate_member() {
        let mut circuit = Circuit::new();
        let a = circuit.add_gate(Gate::Not);
        let mut builder = GroupBuilder::new("G", "g");
        builder.add_member(a).unwrap();
        assert_eq!(builder.add_member(a), Err(CircuitError::DuplicateMember(a)));
    }

    #[test]
    fn test_switch_is_not_groupable() {
        let mut circuit = Circuit::new();
        let a = circuit.add_gate(Gate::Not);
        let switch = circuit.add_switch(1);
        let mut builder = GroupBuilder::new("G", "g");
        builder.add_member(a).unwrap();
        builder.add_member(switch).unwrap();
        assert_eq!(builder.build(&mut circuit), Err(CircuitError::NotGroupable(switch)));
    }

    #[test]
    fn test_internal_unit_is_rejected() {
        let mut circuit = Circuit::new();
        let (_, _, group) = double_inverter(&mut circuit);
        let internal = circuit.unit(group).unwrap().members()[0];
        let other = circuit.add_gate(Gate::Not);

        let mut builder = GroupBuilder::new("G", "g");
        builder.add_member(internal).unwrap();
        builder.add_member(other).unwrap();
        assert_eq!(builder.build(&mut circuit), Err(CircuitError::InternalUnit(internal)));
        assert_eq!(circuit.remove_unit(internal), Err(CircuitError::InternalUnit(internal)));
    }

    #[test]
    fn test_nesting_limit() {
        let mut circuit = Circuit::with_limits(Limits::new(10, 1));
        let (_, _, first) = double_inverter(&mut circuit);
        let (_, _, second) = double_inverter(&mut circuit);
        let mut builder = GroupBuilder::new("Outer", "o");
        builder.add_member(first).unwrap();
        builder.add_member(second).unwrap();
        assert_eq!(builder.build(&mut circuit), Err(CircuitError::NestingTooDeep(1)));
    }

    #[test]
    fn test_encapsulate_removes_members() {
        let mut circuit = Circuit::new();
        let a = circuit.add_gate(Gate::Not);
        let b = circuit.add_gate(Gate::Not);
        let a_in = circuit.unit(a).unwrap().input(0).unwrap();
        let a_out = circuit.unit(a).unwrap().output(0).unwrap();
        let b_in = circuit.unit(b).unwrap().input(0).unwrap();
        let b_out = circuit.unit(b).unwrap().output(0).unwrap();
        circuit.connect(a_out, b_in).unwrap();
        circuit.move_unit(a, Point::new(30.0, 40.0)).unwrap();

        let mut builder = GroupBuilder::new("Buffer", "▷");
        builder.add_member(a).unwrap();
        builder.add_member(b).unwrap();
        builder.expose(a_in);
        builder.expose(b_out);
        let group = builder.encapsulate(&mut circuit).unwrap();

        assert!(circuit.unit(a).is_err());
        assert!(circuit.unit(b).is_err());
        assert_eq!(circuit.units().collect::<Vec<_>>(), vec![group]);
        assert_eq!(
            circuit.unit(group).unwrap().placement().position,
            Point::new(30.0, 40.0)
        );
    }

    #[test]
    fn test_remove_group_removes_members() {
        let mut circuit = Circuit::new();
        let (a, b, group) = double_inverter(&mut circuit);
        let members = circuit.unit(group).unwrap().members().to_vec();
        circuit.remove_unit(group).unwrap();
        for member in members {
            assert!(circuit.unit(member).is_err());
        }
        assert_eq!(circuit.unit_count(), 2);
        assert!(circuit.unit(a).is_ok() && circuit.unit(b).is_ok());
    }
}
