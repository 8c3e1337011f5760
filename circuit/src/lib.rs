pub mod algebra;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod ops;
pub mod serialize;
pub mod wire;

pub use config::Config;
pub use error::{CircuitError, ConfigError, ConstructionError};
pub use evaluator::{Assignment, CircuitEvaluator, EvalError};
pub use generator::{
    active_generator, clear_active_generator, set_active_generator, CircuitGenerator,
    SharedGenerator,
};
pub use ops::{BasicOp, Instruction, LabelType, OpCode, WireLabel, WitnessHook};
pub use serialize::{arith_to_string, input_to_string, write_circuit_file, write_input_file};
pub use wire::{Wire, WireId};
