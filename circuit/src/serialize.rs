/// Serializer for the two line-based text formats the external prover
/// consumes.
///
/// `<name>.arith` holds the circuit: a `total <n>` header followed by one
/// line per in-circuit instruction in queue order. `<name>.in` holds the
/// sample assignment: one `<id> <hex-value>` line per declared input and
/// prover-witness wire.
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::CircuitError;
use crate::evaluator::{CircuitEvaluator, EvalError};
use crate::generator::CircuitGenerator;
use crate::ops::Instruction;

/// Render the `.arith` circuit description.
pub fn arith_to_string(generator: &CircuitGenerator) -> String {
    let mut out = String::new();
    out.push_str(&format!("total {}\n", generator.num_wires()));
    for instruction in generator.evaluation_queue() {
        if !instruction.done_within_circuit() {
            continue;
        }
        match instruction {
            Instruction::Op(op) => {
                out.push_str(&op.to_string());
                out.push('\n');
            }
            Instruction::Label(label) => {
                out.push_str(&label.to_string());
                out.push('\n');
            }
            Instruction::WitnessHook(_) => {}
        }
    }
    out
}

/// Stream the `.arith` circuit description to a writer.
pub fn write_arith<W: Write>(generator: &CircuitGenerator, writer: &mut W) -> io::Result<()> {
    writer.write_all(arith_to_string(generator).as_bytes())
}

/// Write `<dir>/<name>.arith` and return its path.
pub fn write_circuit_file(generator: &CircuitGenerator, dir: &Path) -> io::Result<PathBuf> {
    let path = dir.join(format!("{}.arith", generator.name()));
    fs::write(&path, arith_to_string(generator))?;
    Ok(path)
}

/// Render the `.in` witness file: the evaluated values of every declared
/// input and prover-witness wire, in declaration order, in hex.
pub fn input_to_string(
    generator: &CircuitGenerator,
    evaluator: &CircuitEvaluator,
) -> Result<String, EvalError> {
    let mut out = String::new();
    for wire in generator
        .in_wires()
        .iter()
        .chain(generator.prover_witness_wires())
    {
        // Declared wires always carry an id by construction.
        let Some(id) = generator.wire_id(wire) else {
            continue;
        };
        let value = evaluator
            .wire_value(wire)
            .ok_or(EvalError::UnassignedWire { id })?;
        out.push_str(&format!("{} {}\n", id, value.to_hex_string()));
    }
    Ok(out)
}

/// Write `<dir>/<name>.in` and return its path.
pub fn write_input_file(
    generator: &CircuitGenerator,
    evaluator: &CircuitEvaluator,
    dir: &Path,
) -> Result<PathBuf, CircuitError> {
    let path = dir.join(format!("{}.in", generator.name()));
    let contents = input_to_string(generator, evaluator)?;
    fs::write(&path, contents).map_err(CircuitError::Io)?;
    Ok(path)
}
