//! Connection endpoints.
//!
//! Inputs and outputs are the two variants of an endpoint. An input has
//! at most one driving output; an output drives any number of inputs.
//! Both sides of a wire are kept in sync by the circuit, never by the
//! endpoints themselves.

use std::fmt;

use crate::signal::Signal;
use crate::unit::UnitId;

/// Handle to an input endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputId(pub(crate) usize);

/// Handle to an output endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputId(pub(crate) usize);

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "in{}", self.0)
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "out{}", self.0)
    }
}

/// Either kind of endpoint.
///
/// Operations that accept "any endpoint" (connect, disconnect, queries)
/// take `impl Into<Endpoint>`, so plain IDs can be passed directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Input(InputId),
    Output(OutputId),
}

impl From<InputId> for Endpoint {
    fn from(id: InputId) -> Self {
        Endpoint::Input(id)
    }
}

impl From<OutputId> for Endpoint {
    fn from(id: OutputId) -> Self {
        Endpoint::Output(id)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Input(id) => id.fmt(f),
            Endpoint::Output(id) => id.fmt(f),
        }
    }
}

/// Display marker drawn next to an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PinMarker {
    /// Plain pin.
    #[default]
    Static,
    /// Inversion bubble.
    StaticInverse,
    /// Rising-edge slash.
    Dynamic,
    /// Falling-edge slash.
    DynamicInverse,
}

/// Presentation label carried by an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PinLabel {
    pub name: String,
    pub marker: PinMarker,
}

impl PinLabel {
    /// Create a label with the given name and marker.
    pub fn new(name: impl Into<String>, marker: PinMarker) -> Self {
        Self {
            name: name.into(),
            marker,
        }
    }
}

/// An input endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub(crate) owner: UnitId,
    pub(crate) label: PinLabel,
    pub(crate) value: Signal,
    pub(crate) driver: Option<OutputId>,
}

impl Input {
    pub(crate) fn new(owner: UnitId, label: PinLabel) -> Self {
        Self {
            owner,
            label,
            value: Signal::Low,
            driver: None,
        }
    }

    /// Unit whose evaluation this input feeds.
    pub fn owner(&self) -> UnitId {
        self.owner
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.label.name
    }

    /// Display marker.
    pub fn marker(&self) -> PinMarker {
        self.label.marker
    }

    /// Name and marker together.
    pub fn label(&self) -> &PinLabel {
        &self.label
    }

    /// Last value received from the driver, `Low` when unconnected.
    pub fn value(&self) -> Signal {
        self.value
    }

    /// The output driving this input, if any.
    pub fn driver(&self) -> Option<OutputId> {
        self.driver
    }

    /// Check if an output drives this input.
    pub fn is_connected(&self) -> bool {
        self.driver.is_some()
    }
}

/// An output endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub(crate) owner: UnitId,
    pub(crate) label: PinLabel,
    pub(crate) value: Signal,
    /// Inputs driven by this output, in connection order.
    pub(crate) driven: Vec<InputId>,
    /// Nesting depth of in-flight assignments (oscillation guard).
    pub(crate) reentry: usize,
}

impl Output {
    pub(crate) fn new(owner: UnitId, label: PinLabel) -> Self {
        Self {
            owner,
            label,
            value: Signal::Low,
            driven: Vec::new(),
            reentry: 0,
        }
    }

    /// Unit whose evaluation assigns this output.
    pub fn owner(&self) -> UnitId {
        self.owner
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.label.name
    }

    /// Display marker.
    pub fn marker(&self) -> PinMarker {
        self.label.marker
    }

    /// Name and marker together.
    pub fn label(&self) -> &PinLabel {
        &self.label
    }

    /// Current value, authoritative for every driven input.
    pub fn value(&self) -> Signal {
        self.value
    }

    /// Inputs currently driven by this output.
    pub fn driven(&self) -> &[InputId] {
        &self.driven
    }

    /// Check if this output drives `input`.
    pub fn drives(&self, input: InputId) -> bool {
        self.driven.contains(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_ids() {
        assert_eq!(Endpoint::from(InputId(2)), Endpoint::Input(InputId(2)));
        assert_eq!(Endpoint::from(OutputId(5)), Endpoint::Output(OutputId(5)));
        assert_eq!(Endpoint::from(OutputId(5)).to_string(), "out5");
    }

    #[test]
    fn test_new_endpoints_are_unconnected() {
        let input = Input::new(UnitId(0), PinLabel::new("clk", PinMarker::Dynamic));
        assert_eq!(input.owner(), UnitId(0));
        assert_eq!(input.name(), "clk");
        assert_eq!(input.marker(), PinMarker::Dynamic);
        assert_eq!(input.driver(), None);
        assert_eq!(input.value(), Signal::Low);

        let output = Output::new(UnitId(1), PinLabel::new("q", PinMarker::StaticInverse));
        assert!(output.driven().is_empty());
        assert!(!output.drives(InputId(0)));
        assert_eq!(output.value(), Signal::Low);
    }
}
