pub mod args;
pub mod circuits;
pub mod prover;
