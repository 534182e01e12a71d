//! Logic units: gates, groups, switches and lamps.

use std::fmt;

use crate::endpoint::{InputId, OutputId};
use crate::layout::{Bounds, Placement};
use crate::signal::Logic;

/// Handle to a unit in a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub(crate) usize);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit{}", self.0)
    }
}

/// What a unit does when its inputs change.
#[derive(Debug, Clone)]
pub enum UnitKind {
    /// Primitive combinational unit.
    Gate(Logic),
    /// Encapsulated sub-circuit. Its boundary pins belong to the members.
    Group { members: Vec<UnitId> },
    /// Manually toggled source.
    Switch { on: bool },
    /// Sink that is lit while any input is high.
    Lamp,
}

impl UnitKind {
    /// Only gates and groups can be encapsulated.
    pub fn is_groupable(&self) -> bool {
        matches!(self, UnitKind::Gate(_) | UnitKind::Group { .. })
    }
}

/// A unit with fixed input and output arity.
///
/// Pin slots are `Option` because a group boundary slot stays empty when
/// the endpoint it was asked to expose could not be found among its
/// members. Primitive units always have every slot filled.
#[derive(Debug, Clone)]
pub struct LogicUnit {
    pub(crate) name: String,
    pub(crate) symbol: String,
    pub(crate) kind: UnitKind,
    pub(crate) inputs: Vec<Option<InputId>>,
    pub(crate) outputs: Vec<Option<OutputId>>,
    /// Enclosing group, for units created as group internals.
    pub(crate) parent: Option<UnitId>,
    pub(crate) placement: Placement,
}

impl LogicUnit {
    /// Unit name, shown by presenters.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short display symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// What this unit does.
    pub fn kind(&self) -> &UnitKind {
        &self.kind
    }

    /// Input slots in order.
    pub fn inputs(&self) -> &[Option<InputId>] {
        &self.inputs
    }

    /// Output slots in order.
    pub fn outputs(&self) -> &[Option<OutputId>] {
        &self.outputs
    }

    /// Input slot `index`, `None` if out of range or not exposed.
    pub fn input(&self, index: usize) -> Option<InputId> {
        self.inputs.get(index).copied().flatten()
    }

    /// Output slot `index`, `None` if out of range or not exposed.
    pub fn output(&self, index: usize) -> Option<OutputId> {
        self.outputs.get(index).copied().flatten()
    }

    /// Number of input slots, empty ones included.
    pub fn input_arity(&self) -> usize {
        self.inputs.len()
    }

    /// Number of output slots, empty ones included.
    pub fn output_arity(&self) -> usize {
        self.outputs.len()
    }

    /// Enclosing group, `None` for top-level units.
    pub fn parent(&self) -> Option<UnitId> {
        self.parent
    }

    /// Check if this unit is not internal to a group.
    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    /// Internal units of a group; empty for every other kind.
    pub fn members(&self) -> &[UnitId] {
        match &self.kind {
            UnitKind::Group { members } => members,
            _ => &[],
        }
    }

    /// Position and orientation.
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Body size derived from the arity.
    pub fn bounds(&self) -> Bounds {
        Bounds::for_arity(self.inputs.len(), self.outputs.len())
    }

    /// Check if this unit exposes `input` in one of its slots.
    pub fn exposes_input(&self, input: InputId) -> bool {
        self.inputs.contains(&Some(input))
    }

    /// Check if this unit exposes `output` in one of its slots.
    pub fn exposes_output(&self, output: OutputId) -> bool {
        self.outputs.contains(&Some(output))
    }
}

impl fmt::Display for LogicUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            f.write_str(&self.symbol)
        } else {
            f.write_str(&self.name)
        }
    }
}
