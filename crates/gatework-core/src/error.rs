//! Error and fault types for circuit construction and propagation.

use thiserror::Error;

use crate::endpoint::{InputId, OutputId};
use crate::unit::UnitId;

/// Errors returned by topology, construction and query operations.
///
/// None of these are fatal: the circuit is left exactly as it was before
/// the failing call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CircuitError {
    /// Connect was given two inputs or two outputs.
    #[error("cannot connect two endpoints of the same kind")]
    TypeMismatch,

    /// Disconnect was given a pair that is not wired together.
    #[error("{input} is not driven by {output}")]
    NotConnected { input: InputId, output: OutputId },

    /// Unit ID does not name a live unit.
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),

    /// Input ID does not name a live input.
    #[error("unknown input {0}")]
    UnknownInput(InputId),

    /// Output ID does not name a live output.
    #[error("unknown output {0}")]
    UnknownOutput(OutputId),

    /// A group needs at least two member units.
    #[error("a group needs at least 2 members, got {0}")]
    TooFewMembers(usize),

    /// The same unit was added to a group twice.
    #[error("unit {0} is already a member")]
    DuplicateMember(UnitId),

    /// Unit kind cannot be encapsulated in a group.
    #[error("unit {0} cannot be part of a group")]
    NotGroupable(UnitId),

    /// Toggle was given a unit that is not a switch.
    #[error("unit {0} is not a switch")]
    NotASwitch(UnitId),

    /// Operation is only valid on top-level units.
    #[error("unit {0} is internal to a group")]
    InternalUnit(UnitId),

    /// Group nesting would exceed the configured limit.
    #[error("maximum group nesting exceeded ({0})")]
    NestingTooDeep(usize),
}

/// Non-fatal faults raised while propagating.
///
/// Faults never abort the operation that triggered them; the circuit
/// records them and the caller drains them with
/// [`Circuit::take_faults`](crate::Circuit::take_faults).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Fault {
    /// An output kept re-entering its own propagation. The inputs it was
    /// driving have been disconnected to break the feedback loop.
    ///
    /// `output` is whichever output tripped first, which is not always the
    /// one closing the loop. When a group's boundary output feeds back into
    /// its own boundary input, the trip can land on an internal member: the
    /// wire severed is then inside the group, and the external feedback
    /// wire stays connected. The group stays broken until it is rebuilt or
    /// replaced by a fresh copy.
    #[error("oscillation on {output}: severed {} driven input(s), check for a feedback wire", severed.len())]
    Oscillation {
        output: OutputId,
        severed: Vec<InputId>,
    },
}
