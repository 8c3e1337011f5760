/// Primitive operations: the closed set of instructions a circuit is built
/// from.
///
/// Each basic op is defined by its opcode, ordered input/output wire ids, a
/// multiplication-gate cost, a structural-equality key (for deduplication in
/// the evaluation queue), a witness `compute` routine, and a `check_inputs`
/// validation run before evaluation.
use std::fmt;

use field::FieldElement;
use num_bigint::BigUint;
use num_traits::Zero;

use crate::evaluator::{Assignment, EvalError};
use crate::wire::WireId;

/// Opcode of a basic op. `ConstMul` carries its constant and `Split` derives
/// its width from the op's output count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OpCode {
    Mul,
    Add,
    ConstMul(FieldElement),
    Or,
    Xor,
    ZeroP,
    Split,
    Pack,
    Assert,
}

impl OpCode {
    /// Number of R1CS multiplication gates the op contributes.
    pub fn num_mul_gates(&self, num_outputs: usize) -> usize {
        match self {
            OpCode::Mul | OpCode::Or | OpCode::Xor | OpCode::Assert => 1,
            OpCode::ZeroP => 2,
            OpCode::Split => num_outputs,
            OpCode::Add | OpCode::ConstMul(_) | OpCode::Pack => 0,
        }
    }

    /// Whether the op treats its two operands as an unordered pair.
    pub fn is_commutative(&self) -> bool {
        matches!(self, OpCode::Mul | OpCode::Add | OpCode::Or | OpCode::Xor)
    }

    /// The opcode as printed in the `.arith` file.
    pub fn label(&self) -> String {
        match self {
            OpCode::Mul => "mul".into(),
            OpCode::Add => "add".into(),
            OpCode::ConstMul(c) => format!("const-mul-{}", c.to_hex_string()),
            OpCode::Or => "or".into(),
            OpCode::Xor => "xor".into(),
            OpCode::ZeroP => "zerop".into(),
            OpCode::Split => "split".into(),
            OpCode::Pack => "pack".into(),
            OpCode::Assert => "assert".into(),
        }
    }
}

/// Structural identity of a basic op, used as the evaluation-queue key.
///
/// Identity covers the opcode (with its constant, for `const-mul`), the
/// input-id sequence, and the output arity (which distinguishes splits of
/// different widths). Output ids are deliberately excluded; returning the
/// first op's outputs for a structurally equal resubmission is the whole
/// point of the deduplication. Commutative ops normalize their two operands
/// into a sorted pair so swapped submissions collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpKey {
    code: OpCode,
    inputs: Vec<WireId>,
    num_outputs: usize,
}

impl OpKey {
    pub fn new(code: &OpCode, inputs: &[WireId], num_outputs: usize) -> Self {
        let mut inputs = inputs.to_vec();
        if code.is_commutative() && inputs.len() == 2 && inputs[0] > inputs[1] {
            inputs.swap(0, 1);
        }
        Self {
            code: code.clone(),
            inputs,
            num_outputs,
        }
    }
}

/// A basic op queued for emission into the circuit.
#[derive(Debug, Clone)]
pub struct BasicOp {
    pub code: OpCode,
    pub inputs: Vec<WireId>,
    pub outputs: Vec<WireId>,
    pub desc: String,
}

impl BasicOp {
    pub fn key(&self) -> OpKey {
        OpKey::new(&self.code, &self.inputs, self.outputs.len())
    }

    pub fn num_mul_gates(&self) -> usize {
        self.code.num_mul_gates(self.outputs.len())
    }

    /// Pre-evaluation validation: all inputs must be assigned, and the
    /// boolean-only ops must see values in `{0, 1}`.
    pub fn check_inputs(&self, assignment: &Assignment) -> Result<(), EvalError> {
        for &id in &self.inputs {
            assignment.get(id)?;
        }
        if matches!(self.code, OpCode::Or | OpCode::Xor | OpCode::Pack) {
            for &id in &self.inputs {
                let v = assignment.get(id)?;
                if !v.is_binary() {
                    return Err(EvalError::NonBooleanValue {
                        id,
                        value: v.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Assign this op's outputs from its already-assigned inputs.
    pub fn compute(&self, assignment: &mut Assignment) -> Result<(), EvalError> {
        match &self.code {
            OpCode::Mul => {
                let v = assignment
                    .get(self.inputs[0])?
                    .mul(assignment.get(self.inputs[1])?);
                assignment.set(self.outputs[0], v)
            }
            OpCode::Add => {
                let v = assignment
                    .get(self.inputs[0])?
                    .add(assignment.get(self.inputs[1])?);
                assignment.set(self.outputs[0], v)
            }
            OpCode::ConstMul(c) => {
                let v = c.mul(assignment.get(self.inputs[0])?);
                assignment.set(self.outputs[0], v)
            }
            OpCode::Or => {
                let zero = assignment.get(self.inputs[0])?.is_zero()
                    && assignment.get(self.inputs[1])?.is_zero();
                let v = if zero {
                    FieldElement::zero()
                } else {
                    FieldElement::one()
                };
                assignment.set(self.outputs[0], v)
            }
            OpCode::Xor => {
                let differ =
                    assignment.get(self.inputs[0])? != assignment.get(self.inputs[1])?;
                let v = if differ {
                    FieldElement::one()
                } else {
                    FieldElement::zero()
                };
                assignment.set(self.outputs[0], v)
            }
            OpCode::ZeroP => {
                let x = assignment.get(self.inputs[0])?.clone();
                let m = x.inv().unwrap_or_else(FieldElement::zero);
                let y = if x.is_zero() {
                    FieldElement::zero()
                } else {
                    FieldElement::one()
                };
                assignment.set(self.outputs[0], m)?;
                assignment.set(self.outputs[1], y)
            }
            OpCode::Split => {
                let x = assignment.get(self.inputs[0])?.clone();
                let n = self.outputs.len();
                if !x.fits_in_bits(n) {
                    return Err(EvalError::SplitOverflow {
                        id: self.inputs[0],
                        bits: n,
                    });
                }
                for (i, &out) in self.outputs.iter().enumerate() {
                    let bit = if x.bit(i) {
                        FieldElement::one()
                    } else {
                        FieldElement::zero()
                    };
                    assignment.set(out, bit)?;
                }
                Ok(())
            }
            OpCode::Pack => {
                let mut acc = BigUint::zero();
                for (i, &id) in self.inputs.iter().enumerate() {
                    if assignment.get(id)?.is_one() {
                        acc.set_bit(i as u64, true);
                    }
                }
                assignment.set(self.outputs[0], FieldElement::from_biguint(acc))
            }
            OpCode::Assert => {
                let lhs = assignment
                    .get(self.inputs[0])?
                    .mul(assignment.get(self.inputs[1])?);
                if &lhs != assignment.get(self.inputs[2])? {
                    return Err(EvalError::AssertionNotSatisfied {
                        w1: self.inputs[0],
                        w2: self.inputs[1],
                        w3: self.inputs[2],
                    });
                }
                Ok(())
            }
        }
    }
}

fn join_ids(ids: &[WireId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for BasicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            // The assertion triple prints its product operand in the out
            // clause: `assert in 2 <w1> <w2> out 1 <w3>`.
            OpCode::Assert => write!(
                f,
                "assert in 2 {} {} out 1 {}",
                self.inputs[0], self.inputs[1], self.inputs[2]
            )?,
            _ => write!(
                f,
                "{} in {} {} out {} {}",
                self.code.label(),
                self.inputs.len(),
                join_ids(&self.inputs),
                self.outputs.len(),
                join_ids(&self.outputs)
            )?,
        }
        if !self.desc.is_empty() {
            write!(f, " # {}", self.desc)?;
        }
        Ok(())
    }
}

// ============================================================================
// Wire labels
// ============================================================================

/// The role a label op marks a wire with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelType {
    Input,
    NizkInput,
    Output,
    Debug,
}

impl LabelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelType::Input => "input",
            LabelType::NizkInput => "nizkinput",
            LabelType::Output => "output",
            LabelType::Debug => "debug",
        }
    }
}

/// A label op. Contributes no gates; the serializer prints input, witness
/// and output declarations from these, and skips debug labels.
#[derive(Debug, Clone)]
pub struct WireLabel {
    pub label: LabelType,
    pub wire: WireId,
    pub desc: String,
}

impl fmt::Display for WireLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label.as_str(), self.wire)?;
        if !self.desc.is_empty() {
            write!(f, " # {}", self.desc)?;
        }
        Ok(())
    }
}

// ============================================================================
// Witness hooks
// ============================================================================

/// An out-of-circuit computation. The evaluator runs it in queue order like
/// any other instruction, but the serializer never emits it. It exists to
/// assign prover-witness wires whose values are not expressible as R1CS
/// primitives (division, modular reduction, ...).
pub struct WitnessHook {
    pub desc: String,
    pub run: Box<dyn Fn(&mut Assignment) -> Result<(), EvalError> + Send>,
}

impl fmt::Debug for WitnessHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WitnessHook({})", self.desc)
    }
}

// ============================================================================
// Instruction
// ============================================================================

/// A node in the evaluation queue.
#[derive(Debug)]
pub enum Instruction {
    Op(BasicOp),
    Label(WireLabel),
    WitnessHook(WitnessHook),
}

impl Instruction {
    /// Whether the instruction is part of the emitted circuit. Witness hooks
    /// and debug labels are evaluator-only.
    pub fn done_within_circuit(&self) -> bool {
        match self {
            Instruction::Op(_) => true,
            Instruction::Label(l) => l.label != LabelType::Debug,
            Instruction::WitnessHook(_) => false,
        }
    }
}
