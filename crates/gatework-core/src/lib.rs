//! Gatework: a signal propagation engine for gate-level logic circuits.
//!
//! # Overview
//!
//! A [`Circuit`] owns logic units (gates, groups, switches and lamps) and
//! the endpoints that wire them together. Key properties:
//!
//! - **Event driven**: assigning a new value to an output pushes it through
//!   every wire synchronously, depth first
//! - **Feedback allowed**: loops are legal; an output that oscillates is
//!   detected and its outgoing wires are severed
//! - **Composable**: a set of wired units can be frozen into a group that
//!   behaves like a single unit and can be copied or nested
//!
//! # Example
//!
//! ```
//! use gatework_core::{Circuit, Gate, Signal};
//!
//! // a AND (NOT b)
//! let mut circuit = Circuit::new();
//! let and = circuit.add_gate(Gate::And);
//! let not = circuit.add_gate(Gate::Not);
//! let a = circuit.add_switch(1);
//! let b = circuit.add_switch(1);
//!
//! let a_out = circuit.unit(a).unwrap().output(0).unwrap();
//! let b_out = circuit.unit(b).unwrap().output(0).unwrap();
//! let not_in = circuit.unit(not).unwrap().input(0).unwrap();
//! let not_out = circuit.unit(not).unwrap().output(0).unwrap();
//! let and_in = circuit.unit(and).unwrap().inputs().to_vec();
//! let result = circuit.unit(and).unwrap().output(0).unwrap();
//!
//! circuit.connect(a_out, and_in[0].unwrap()).unwrap();
//! circuit.connect(b_out, not_in).unwrap();
//! circuit.connect(not_out, and_in[1].unwrap()).unwrap();
//!
//! circuit.toggle(a).unwrap();
//! assert_eq!(circuit.signal(result).unwrap(), Signal::High);
//! circuit.toggle(b).unwrap();
//! assert_eq!(circuit.signal(result).unwrap(), Signal::Low);
//! ```
//!
//! # Oscillation
//!
//! Wiring an inverter to itself never settles. The engine breaks the loop
//! and reports it instead of overflowing the stack:
//!
//! ```
//! use gatework_core::{Circuit, Fault, Gate};
//!
//! let mut circuit = Circuit::new();
//! let not = circuit.add_gate(Gate::Not);
//! let input = circuit.unit(not).unwrap().input(0).unwrap();
//! let output = circuit.unit(not).unwrap().output(0).unwrap();
//!
//! circuit.connect(output, input).unwrap();
//! let faults = circuit.take_faults();
//! assert!(matches!(faults.as_slice(), [Fault::Oscillation { .. }]));
//! assert!(!circuit.is_connected(input, output));
//! ```

pub mod circuit;
pub mod endpoint;
pub mod error;
pub mod group;
pub mod layout;
pub mod limits;
pub mod notify;
pub mod propagate;
pub mod signal;
pub mod unit;
pub mod wire;

pub use circuit::{Circuit, DEFAULT_PIN_COUNT};
pub use endpoint::{Endpoint, Input, InputId, Output, OutputId, PinLabel, PinMarker};
pub use error::{CircuitError, Fault};
pub use group::GroupBuilder;
pub use layout::{Bounds, Placement, Point, Side};
pub use limits::Limits;
pub use notify::{ValueChange, Watcher};
pub use signal::{Gate, Logic, LogicFn, Signal};
pub use unit::{LogicUnit, UnitId, UnitKind};
