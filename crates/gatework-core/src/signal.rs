//! Signal domain and built-in gate vocabulary.
//!
//! Every wire in a circuit carries a single [`Signal`]. Gates are pure
//! functions from an input vector of signals to an output vector; the
//! closed set of built-in gates lives in [`Gate`], and arbitrary user
//! functions are wrapped in [`Logic`].

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::rc::Rc;

/// Binary value carried by a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signal {
    /// Logic zero. Unconnected inputs read as `Low`.
    #[default]
    Low,
    /// Logic one.
    High,
}

impl Signal {
    /// Check if this signal is `High`.
    #[inline]
    pub fn is_high(self) -> bool {
        self == Signal::High
    }
}

impl From<bool> for Signal {
    fn from(value: bool) -> Self {
        if value {
            Signal::High
        } else {
            Signal::Low
        }
    }
}

impl From<Signal> for bool {
    fn from(value: Signal) -> Self {
        value.is_high()
    }
}

impl Not for Signal {
    type Output = Signal;

    #[inline]
    fn not(self) -> Signal {
        match self {
            Signal::Low => Signal::High,
            Signal::High => Signal::Low,
        }
    }
}

impl BitAnd for Signal {
    type Output = Signal;

    #[inline]
    fn bitand(self, rhs: Signal) -> Signal {
        Signal::from(self.is_high() && rhs.is_high())
    }
}

impl BitOr for Signal {
    type Output = Signal;

    #[inline]
    fn bitor(self, rhs: Signal) -> Signal {
        Signal::from(self.is_high() || rhs.is_high())
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Low => f.write_str("0"),
            Signal::High => f.write_str("1"),
        }
    }
}

/// Built-in primitive gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Buffer: one input, one output, passes the value through.
    Identity,
    /// Inverter: one input, one output.
    Not,
    /// Two-input conjunction.
    And,
    /// Two-input disjunction.
    Or,
}

impl Gate {
    /// Number of inputs this gate reads.
    pub fn input_arity(self) -> usize {
        match self {
            Gate::Identity | Gate::Not => 1,
            Gate::And | Gate::Or => 2,
        }
    }

    /// Number of outputs this gate drives.
    pub fn output_arity(self) -> usize {
        1
    }

    /// Default unit name for this gate.
    pub fn name(self) -> &'static str {
        match self {
            Gate::Identity => "▷",
            Gate::Not => "Not",
            Gate::And => "And",
            Gate::Or => "Or",
        }
    }

    /// Default display symbol for this gate.
    pub fn symbol(self) -> &'static str {
        match self {
            Gate::Identity => "▷",
            Gate::Not => "!",
            Gate::And => "&",
            Gate::Or => "|",
        }
    }

    /// Evaluate this gate.
    ///
    /// Missing inputs read as `Low`, extra inputs are ignored.
    #[inline]
    pub fn eval(self, inputs: &[Signal]) -> Signal {
        let operand = |index: usize| inputs.get(index).copied().unwrap_or_default();
        match self {
            Gate::Identity => operand(0),
            Gate::Not => !operand(0),
            Gate::And => operand(0) & operand(1),
            Gate::Or => operand(0) | operand(1),
        }
    }
}

/// Shared evaluation function: reads the input vector, writes the output vector.
pub type LogicFn = Rc<dyn Fn(&[Signal], &mut [Signal])>;

/// A combinational function with fixed arity.
///
/// Cloning a `Logic` shares the underlying function; it is stateless, so
/// every copy of a unit evaluates through the same closure.
#[derive(Clone)]
pub struct Logic {
    inputs: usize,
    outputs: usize,
    func: LogicFn,
}

impl Logic {
    /// Wrap a function over `inputs` signals producing `outputs` signals.
    ///
    /// The output slice handed to `func` is pre-filled with `Low`; the
    /// function must be total over every input vector.
    pub fn new<F>(inputs: usize, outputs: usize, func: F) -> Self
    where
        F: Fn(&[Signal], &mut [Signal]) + 'static,
    {
        Self {
            inputs,
            outputs,
            func: Rc::new(func),
        }
    }

    /// Number of inputs read.
    pub fn input_arity(&self) -> usize {
        self.inputs
    }

    /// Number of outputs written.
    pub fn output_arity(&self) -> usize {
        self.outputs
    }

    /// Evaluate the function on an input vector.
    ///
    /// Missing trailing inputs read as `Low`, extra inputs are ignored.
    pub fn eval(&self, inputs: &[Signal]) -> Vec<Signal> {
        let mut padded = vec![Signal::Low; self.inputs];
        for (slot, value) in padded.iter_mut().zip(inputs) {
            *slot = *value;
        }
        let mut outputs = vec![Signal::Low; self.outputs];
        (self.func)(&padded, &mut outputs);
        outputs
    }

    /// Check whether two `Logic` values share the same function.
    pub fn same_function(&self, other: &Logic) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl From<Gate> for Logic {
    fn from(gate: Gate) -> Self {
        Logic::new(gate.input_arity(), gate.output_arity(), move |inputs, outputs| {
            outputs[0] = gate.eval(inputs);
        })
    }
}

impl fmt::Debug for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logic")
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}
