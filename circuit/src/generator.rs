/// Circuit generator: sole allocator of wire ids and owner of the
/// evaluation queue.
///
/// The queue is an insertion-ordered set keyed by structural op identity:
/// re-submitting a basic op that is structurally equal to an earlier one
/// returns the earlier op's output wires and allocates nothing. Construction
/// order is evaluation order, and also the line order of the emitted
/// `.arith` file.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

use field::FieldElement;
use once_cell::sync::Lazy;

use crate::config::Config;
use crate::error::{ConfigError, ConstructionError};
use crate::evaluator::{Assignment, EvalError};
use crate::ops::{BasicOp, Instruction, LabelType, OpCode, OpKey, WireLabel, WitnessHook};
use crate::wire::{Wire, WireId};

/// The canonical one-wire. Id 0 never exists; the one-wire is always the
/// first allocated wire and the first declared input.
pub const ONE_WIRE_ID: WireId = 1;

/// Variant to allocate for a fresh op output.
#[derive(Debug, Clone, Copy)]
pub(crate) enum OutKind {
    Variable,
    VariableBit,
    LinearCombination,
}

pub struct CircuitGenerator {
    name: String,
    config: Config,
    current_wire_id: WireId,
    queue: Vec<Instruction>,
    dedup: HashMap<OpKey, Vec<Wire>>,
    in_wires: Vec<Wire>,
    out_wires: Vec<Wire>,
    prover_witness_wires: Vec<Wire>,
    known_constants: HashMap<FieldElement, WireId>,
    num_constraints: usize,
}

impl CircuitGenerator {
    pub fn new(name: &str) -> Self {
        Self::with_config(name, Config::default())
    }

    pub fn with_config(name: &str, config: Config) -> Self {
        let mut generator = Self {
            name: name.to_string(),
            config,
            current_wire_id: 1,
            queue: Vec::new(),
            dedup: HashMap::new(),
            in_wires: Vec::new(),
            out_wires: Vec::new(),
            prover_witness_wires: Vec::new(),
            known_constants: HashMap::new(),
            num_constraints: 0,
        };
        generator.init_circuit_construction();
        generator
    }

    /// Declare the one-wire: id 1, cached as the constant 1, and always the
    /// first circuit input.
    fn init_circuit_construction(&mut self) {
        let id = self.alloc_id();
        debug_assert_eq!(id, ONE_WIRE_ID);
        self.known_constants.insert(FieldElement::one(), id);
        self.queue.push(Instruction::Label(WireLabel {
            label: LabelType::Input,
            wire: id,
            desc: "The one-input wire.".to_string(),
        }));
        self.in_wires.push(Wire::Constant(FieldElement::one()));
    }

    // ------------------------------------------------------------------
    // Allocation and queue
    // ------------------------------------------------------------------

    fn alloc_id(&mut self) -> WireId {
        let id = self.current_wire_id;
        self.current_wire_id += 1;
        id
    }

    /// Append a basic op, or return the outputs of a structurally equal op
    /// already in the queue. Output ids are allocated only for fresh ops, so
    /// every op's inputs have strictly smaller ids than its outputs.
    pub(crate) fn append_op(
        &mut self,
        code: OpCode,
        inputs: Vec<WireId>,
        out_kinds: &[OutKind],
        desc: String,
    ) -> Vec<Wire> {
        let key = OpKey::new(&code, &inputs, out_kinds.len());
        if let Some(existing) = self.dedup.get(&key) {
            return existing.clone();
        }
        let outputs: Vec<Wire> = out_kinds
            .iter()
            .map(|kind| {
                let id = self.alloc_id();
                match kind {
                    OutKind::Variable => Wire::Variable(id),
                    OutKind::VariableBit => Wire::VariableBit(id),
                    OutKind::LinearCombination => Wire::LinearCombination(id),
                }
            })
            .collect();
        let out_ids: Vec<WireId> = outputs.iter().filter_map(Wire::id).collect();
        self.num_constraints += code.num_mul_gates(out_ids.len());
        self.queue.push(Instruction::Op(BasicOp {
            code,
            inputs,
            outputs: out_ids,
            desc,
        }));
        self.dedup.insert(key, outputs.clone());
        outputs
    }

    /// The wire id backing `w`, materializing constants on first use.
    pub(crate) fn resolve(&mut self, w: &Wire) -> WireId {
        match w {
            Wire::Constant(c) => self.materialize_constant(c),
            Wire::Variable(id)
            | Wire::VariableBit(id)
            | Wire::LinearCombination(id)
            | Wire::LinearCombinationBit(id) => *id,
        }
    }

    /// Allocate (once) a circuit wire holding the constant `c`, emitted as a
    /// `const-mul` of the one-wire and cached by value.
    fn materialize_constant(&mut self, c: &FieldElement) -> WireId {
        if let Some(&id) = self.known_constants.get(c) {
            return id;
        }
        let out = self
            .append_op(
                OpCode::ConstMul(c.clone()),
                vec![ONE_WIRE_ID],
                &[OutKind::LinearCombination],
                String::new(),
            )
            .remove(0);
        let id = self.resolve(&out);
        self.known_constants.insert(c.clone(), id);
        id
    }

    // ------------------------------------------------------------------
    // Wire declaration
    // ------------------------------------------------------------------

    /// The constant-one wire (id 1).
    pub fn one_wire(&self) -> Wire {
        Wire::Constant(FieldElement::one())
    }

    /// The constant-zero wire: `one · 0`, constant-folded. Acquiring it
    /// allocates nothing.
    pub fn zero_wire(&self) -> Wire {
        Wire::Constant(FieldElement::zero())
    }

    pub fn zero_wire_array(&self, n: usize) -> Vec<Wire> {
        vec![self.zero_wire(); n]
    }

    pub fn one_wire_array(&self, n: usize) -> Vec<Wire> {
        vec![self.one_wire(); n]
    }

    /// Declare a circuit input wire.
    pub fn create_input_wire(&mut self, desc: &str) -> Wire {
        let id = self.alloc_id();
        let w = Wire::Variable(id);
        self.queue.push(Instruction::Label(WireLabel {
            label: LabelType::Input,
            wire: id,
            desc: desc.to_string(),
        }));
        self.in_wires.push(w.clone());
        w
    }

    pub fn create_input_wire_array(&mut self, n: usize, desc: &str) -> Vec<Wire> {
        (0..n)
            .map(|i| {
                if desc.is_empty() {
                    self.create_input_wire("")
                } else {
                    self.create_input_wire(&format!("{desc} {i}"))
                }
            })
            .collect()
    }

    /// Declare a prover-witness (nizk-input) wire.
    pub fn create_prover_witness_wire(&mut self, desc: &str) -> Wire {
        let id = self.alloc_id();
        let w = Wire::Variable(id);
        self.queue.push(Instruction::Label(WireLabel {
            label: LabelType::NizkInput,
            wire: id,
            desc: desc.to_string(),
        }));
        self.prover_witness_wires.push(w.clone());
        w
    }

    pub fn create_prover_witness_wire_array(&mut self, n: usize, desc: &str) -> Vec<Wire> {
        (0..n)
            .map(|i| {
                if desc.is_empty() {
                    self.create_prover_witness_wire("")
                } else {
                    self.create_prover_witness_wire(&format!("{desc} {i}"))
                }
            })
            .collect()
    }

    /// A wire holding the constant `c`: the cached one-wire scaled by `c`.
    pub fn create_constant_wire(&mut self, c: &FieldElement) -> Wire {
        let one = self.one_wire();
        self.const_mul(&one, c)
    }

    pub fn create_constant_wire_array(&mut self, constants: &[FieldElement]) -> Vec<Wire> {
        constants
            .iter()
            .map(|c| self.create_constant_wire(c))
            .collect()
    }

    // ------------------------------------------------------------------
    // Outputs
    // ------------------------------------------------------------------

    /// Declare `w` as a circuit output.
    ///
    /// Prover-witness wires are routed through a fresh variable (one
    /// multiply-by-one gate) so a single wire does not serve both roles.
    /// Declaring an input wire as an output works but wastes a constraint, so
    /// it warns. Linear combinations are packed; plain variables are used
    /// directly.
    pub fn make_output(&mut self, w: &Wire, desc: &str) -> Result<Wire, ConstructionError> {
        if let Some(id) = w.id() {
            if id == 0 || id >= self.current_wire_id {
                return Err(ConstructionError::UnknownWire { id });
            }
        }
        let output = if self.prover_witness_wires.contains(w) {
            self.make_variable(w)
        } else if self.in_wires.contains(w) {
            eprintln!(
                "warning: an input wire is redeclared as an output; this adds a redundant constraint"
            );
            self.make_variable(w)
        } else if w.is_variable() {
            w.clone()
        } else if w.is_linear_combination() {
            self.pack_if_needed(w)
        } else {
            // A constant output still needs a backing variable.
            self.make_variable(w)
        };
        let id = self.resolve(&output);
        self.queue.push(Instruction::Label(WireLabel {
            label: LabelType::Output,
            wire: id,
            desc: desc.to_string(),
        }));
        self.out_wires.push(output.clone());
        Ok(output)
    }

    pub fn make_output_array(
        &mut self,
        wires: &[Wire],
        desc: &str,
    ) -> Result<Vec<Wire>, ConstructionError> {
        wires
            .iter()
            .enumerate()
            .map(|(i, w)| {
                if desc.is_empty() {
                    self.make_output(w, "")
                } else {
                    self.make_output(w, &format!("{desc}[{i}]"))
                }
            })
            .collect()
    }

    /// Introduce a fresh variable equal to `w` via a multiply-by-one gate.
    pub(crate) fn make_variable(&mut self, w: &Wire) -> Wire {
        let wid = self.resolve(w);
        let kind = if w.is_boolean() {
            OutKind::VariableBit
        } else {
            OutKind::Variable
        };
        self.append_op(
            OpCode::Mul,
            vec![wid, ONE_WIRE_ID],
            &[kind],
            String::new(),
        )
        .remove(0)
    }

    /// Queue a debug label for `w`. Debug labels are evaluator-side only and
    /// never reach the `.arith` file.
    pub fn add_debug_instruction(&mut self, w: &Wire, desc: &str) {
        let packed = self.pack_if_needed(w);
        let id = self.resolve(&packed);
        self.queue.push(Instruction::Label(WireLabel {
            label: LabelType::Debug,
            wire: id,
            desc: desc.to_string(),
        }));
    }

    // ------------------------------------------------------------------
    // Assertions
    // ------------------------------------------------------------------

    /// Assert the R1CS contract `w1 · w2 = w3`.
    ///
    /// An all-constant triple is verified immediately at construction time;
    /// otherwise the operands are packed if needed and an `assert` op is
    /// queued for evaluation-time verification.
    pub fn add_assertion(
        &mut self,
        w1: &Wire,
        w2: &Wire,
        w3: &Wire,
    ) -> Result<(), ConstructionError> {
        if let (Some(a), Some(b), Some(c)) =
            (w1.constant_value(), w2.constant_value(), w3.constant_value())
        {
            if a.mul(b) != *c {
                return Err(ConstructionError::ConstantAssertionFailed {
                    w1: a.clone(),
                    w2: b.clone(),
                    w3: c.clone(),
                });
            }
            return Ok(());
        }
        let p1 = self.pack_if_needed(w1);
        let p2 = self.pack_if_needed(w2);
        let p3 = self.pack_if_needed(w3);
        let i1 = self.resolve(&p1);
        let i2 = self.resolve(&p2);
        let i3 = self.resolve(&p3);
        self.append_op(OpCode::Assert, vec![i1, i2, i3], &[], String::new());
        Ok(())
    }

    pub fn add_zero_assertion(&mut self, w: &Wire) -> Result<(), ConstructionError> {
        let one = self.one_wire();
        let zero = self.zero_wire();
        self.add_assertion(w, &one, &zero)
    }

    pub fn add_one_assertion(&mut self, w: &Wire) -> Result<(), ConstructionError> {
        let one = self.one_wire();
        self.add_assertion(w, &one, &one)
    }

    /// Assert `w ∈ {0, 1}` via `w · (1 − w) = 0`, returning the bit-tagged
    /// wire. Wires already known to be boolean are returned unchanged and no
    /// redundant assertion is queued.
    pub fn add_binary_assertion(&mut self, w: &Wire) -> Result<Wire, ConstructionError> {
        if w.is_boolean() {
            return Ok(w.clone());
        }
        let negated = self.neg(w);
        let one = self.one_wire();
        let complement = self.add(&one, &negated);
        let zero = self.zero_wire();
        self.add_assertion(w, &complement, &zero)?;
        Ok(match w {
            Wire::Variable(id) => Wire::VariableBit(*id),
            Wire::LinearCombination(id) => Wire::LinearCombinationBit(*id),
            other => other.clone(),
        })
    }

    pub fn add_equality_assertion(
        &mut self,
        w1: &Wire,
        w2: &Wire,
    ) -> Result<(), ConstructionError> {
        if w1 == w2 {
            return Ok(());
        }
        let one = self.one_wire();
        self.add_assertion(w1, &one, w2)
    }

    pub fn add_equality_assertion_const(
        &mut self,
        w: &Wire,
        c: &FieldElement,
    ) -> Result<(), ConstructionError> {
        let one = self.one_wire();
        self.add_assertion(w, &one, &Wire::Constant(c.clone()))
    }

    // ------------------------------------------------------------------
    // Witness hooks
    // ------------------------------------------------------------------

    /// Queue an out-of-circuit computation run by the evaluator in queue
    /// order, used to assign prover-witness wires whose values R1CS
    /// primitives cannot express.
    pub fn specify_prover_witness_computation<F>(&mut self, desc: &str, f: F)
    where
        F: Fn(&mut Assignment) -> Result<(), EvalError> + Send + 'static,
    {
        self.queue.push(Instruction::WitnessHook(WitnessHook {
            desc: desc.to_string(),
            run: Box::new(f),
        }));
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// One past the highest allocated wire id (ids start at 1).
    pub fn num_wires(&self) -> usize {
        self.current_wire_id
    }

    /// Total multiplication gates queued so far.
    pub fn num_constraints(&self) -> usize {
        self.num_constraints
    }

    pub fn evaluation_queue(&self) -> &[Instruction] {
        &self.queue
    }

    pub fn in_wires(&self) -> &[Wire] {
        &self.in_wires
    }

    pub fn out_wires(&self) -> &[Wire] {
        &self.out_wires
    }

    pub fn prover_witness_wires(&self) -> &[Wire] {
        &self.prover_witness_wires
    }

    /// The id backing `w`, without materializing anything. Constants that
    /// were never used in an emitted instruction have no id yet.
    pub fn wire_id(&self, w: &Wire) -> Option<WireId> {
        match w {
            Wire::Constant(c) => self.known_constants.get(c).copied(),
            _ => w.id(),
        }
    }

    pub fn print_state(&self, message: &str) {
        println!(
            "generator state @ {message}: {} wires, {} constraints",
            self.current_wire_id, self.num_constraints
        );
    }
}

// ============================================================================
// Ambient generator registry
// ============================================================================

/// A generator shared behind `Arc<Mutex<_>>` so the ambient registry can
/// hand it out, including across threads in single-generator mode.
pub type SharedGenerator = Arc<Mutex<CircuitGenerator>>;

/// Single-generator mode: one process-wide slot, visible from every thread.
/// Each registration replaces the previous one.
static SINGLE_GENERATOR: Mutex<Option<SharedGenerator>> = Mutex::new(None);

/// Multi-generator mode: registrations keyed by the owning thread.
static ACTIVE_GENERATORS: Lazy<Mutex<HashMap<ThreadId, SharedGenerator>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Register `g` as the ambient generator, in the registry selected by its
/// own `running_multi_generators` setting.
pub fn set_active_generator(g: &SharedGenerator) {
    let multi = g
        .lock()
        .expect("generator mutex poisoned")
        .config()
        .running_multi_generators;
    if multi {
        ACTIVE_GENERATORS
            .lock()
            .expect("ambient generator registry poisoned")
            .insert(std::thread::current().id(), Arc::clone(g));
    } else {
        *SINGLE_GENERATOR
            .lock()
            .expect("ambient generator registry poisoned") = Some(Arc::clone(g));
    }
}

/// Drop the ambient registration in the registry selected by `config`: the
/// process-wide slot in single-generator mode, the current thread's entry in
/// multi-generator mode.
pub fn clear_active_generator(config: &Config) {
    if config.running_multi_generators {
        ACTIVE_GENERATORS
            .lock()
            .expect("ambient generator registry poisoned")
            .remove(&std::thread::current().id());
    } else {
        *SINGLE_GENERATOR
            .lock()
            .expect("ambient generator registry poisoned") = None;
    }
}

/// The ambient generator. In single-generator mode this is the process-wide
/// slot, whichever thread asks; in multi-generator mode the lookup is keyed
/// by the current thread, which is what keeps independent generators on
/// parallel threads isolated.
pub fn active_generator(config: &Config) -> Result<SharedGenerator, ConfigError> {
    let found = if config.running_multi_generators {
        ACTIVE_GENERATORS
            .lock()
            .expect("ambient generator registry poisoned")
            .get(&std::thread::current().id())
            .cloned()
    } else {
        SINGLE_GENERATOR
            .lock()
            .expect("ambient generator registry poisoned")
            .clone()
    };
    found.ok_or(ConfigError::NoActiveGenerator)
}

impl CircuitGenerator {
    /// Construct a generator and register it as the ambient generator per
    /// its configuration.
    pub fn new_shared(name: &str, config: Config) -> SharedGenerator {
        let g = Arc::new(Mutex::new(Self::with_config(name, config)));
        set_active_generator(&g);
        g
    }
}
