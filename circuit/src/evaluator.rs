/// Circuit evaluator: computes a concrete assignment for every wire.
///
/// Evaluation is two passes: the client first writes sample values for all
/// declared input and prover-witness wires, then the evaluator replays the
/// generator's queue in insertion order. Each basic op reads its (already
/// assigned) inputs and writes its (not yet assigned) outputs; assertion ops
/// verify instead of writing. When the walk finishes, every allocated wire
/// must hold a value.
use std::fmt;

use field::FieldElement;

use crate::generator::{CircuitGenerator, ONE_WIRE_ID};
use crate::ops::Instruction;
use crate::wire::{Wire, WireId};

/// Evaluation invariant violations. Fatal at evaluation time.
#[derive(Debug)]
pub enum EvalError {
    /// An instruction read a wire that has no value yet.
    UnassignedWire { id: WireId },
    /// An instruction wrote a wire that already has a value.
    AlreadyAssigned { id: WireId },
    /// A boolean-only input carried a value outside `{0, 1}`.
    NonBooleanValue { id: WireId, value: FieldElement },
    /// A `split` input does not fit the requested width.
    SplitOverflow { id: WireId, bits: usize },
    /// An assertion triple `w1 · w2 = w3` does not hold for the sample
    /// assignment.
    AssertionNotSatisfied { w1: WireId, w2: WireId, w3: WireId },
    /// Sample values can only be given to input and witness wires.
    ConstantWireAssignment,
    /// A wire was never assigned by the end of evaluation.
    IncompleteAssignment { id: WireId },
    /// An out-of-circuit witness computation failed.
    WitnessComputation(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UnassignedWire { id } => write!(f, "wire {id} read before assignment"),
            EvalError::AlreadyAssigned { id } => write!(f, "wire {id} assigned twice"),
            EvalError::NonBooleanValue { id, value } => {
                write!(f, "wire {id} must be boolean but holds {value}")
            }
            EvalError::SplitOverflow { id, bits } => {
                write!(f, "wire {id} does not fit in {bits} bits")
            }
            EvalError::AssertionNotSatisfied { w1, w2, w3 } => {
                write!(f, "assertion not satisfied: wire {w1} * wire {w2} != wire {w3}")
            }
            EvalError::ConstantWireAssignment => {
                write!(f, "constant wires cannot be assigned sample values")
            }
            EvalError::IncompleteAssignment { id } => {
                write!(f, "wire {id} was never assigned during evaluation")
            }
            EvalError::WitnessComputation(msg) => {
                write!(f, "witness computation failed: {msg}")
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Dense wire-id-indexed storage of optional field values.
pub struct Assignment {
    values: Vec<Option<FieldElement>>,
}

impl Assignment {
    pub fn with_capacity(num_wires: usize) -> Self {
        Self {
            values: vec![None; num_wires],
        }
    }

    pub fn get(&self, id: WireId) -> Result<&FieldElement, EvalError> {
        self.values
            .get(id)
            .and_then(Option::as_ref)
            .ok_or(EvalError::UnassignedWire { id })
    }

    pub fn set(&mut self, id: WireId, value: FieldElement) -> Result<(), EvalError> {
        match self.values.get_mut(id) {
            Some(slot @ None) => {
                *slot = Some(value);
                Ok(())
            }
            Some(Some(_)) => Err(EvalError::AlreadyAssigned { id }),
            None => Err(EvalError::UnassignedWire { id }),
        }
    }

    pub fn try_get(&self, id: WireId) -> Option<&FieldElement> {
        self.values.get(id).and_then(Option::as_ref)
    }
}

pub struct CircuitEvaluator {
    assignment: Assignment,
}

impl CircuitEvaluator {
    /// A fresh evaluator for `generator`, with the one-wire pre-assigned.
    pub fn new(generator: &CircuitGenerator) -> Self {
        let mut assignment = Assignment::with_capacity(generator.num_wires());
        assignment.values[ONE_WIRE_ID] = Some(FieldElement::one());
        Self { assignment }
    }

    /// Provide a sample value for a declared input or prover-witness wire.
    pub fn set_wire_value(&mut self, w: &Wire, value: FieldElement) -> Result<(), EvalError> {
        match w.id() {
            Some(id) => self.assignment.set(id, value),
            None => Err(EvalError::ConstantWireAssignment),
        }
    }

    /// Replay the queue in insertion order, then check that every allocated
    /// wire received a value.
    pub fn evaluate(&mut self, generator: &CircuitGenerator) -> Result<(), EvalError> {
        for instruction in generator.evaluation_queue() {
            match instruction {
                Instruction::Op(op) => {
                    op.check_inputs(&self.assignment)?;
                    op.compute(&mut self.assignment)?;
                }
                Instruction::Label(_) => {}
                Instruction::WitnessHook(hook) => (hook.run)(&mut self.assignment)?,
            }
        }
        for id in 1..generator.num_wires() {
            if self.assignment.try_get(id).is_none() {
                return Err(EvalError::IncompleteAssignment { id });
            }
        }
        Ok(())
    }

    /// The value of `w`, if known. Constants answer directly.
    pub fn wire_value(&self, w: &Wire) -> Option<FieldElement> {
        match w {
            Wire::Constant(c) => Some(c.clone()),
            _ => w.id().and_then(|id| self.assignment.try_get(id)).cloned(),
        }
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub fn assignment_mut(&mut self) -> &mut Assignment {
        &mut self.assignment
    }
}
