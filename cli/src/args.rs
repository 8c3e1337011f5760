use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rsnark")]
#[command(about = "R1CS circuit builder driver", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build an example circuit: writes <name>.arith and <name>.in
    Build {
        /// Example circuit ("dot-product" or "sbox")
        circuit: String,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Vector length for the dot-product circuit
        #[arg(long, default_value_t = 3)]
        dimension: usize,
        /// Sample input byte for the sbox circuit (decimal or 0x hex)
        #[arg(long, default_value = "0x53")]
        sample: String,
    },
    /// Run the external prover on a previously built circuit
    Prove {
        /// Circuit name (expects <name>.arith and <name>.in in the output directory)
        name: String,
        /// Directory holding the circuit files
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Path of the external prover binary
        #[arg(long)]
        prover_path: PathBuf,
    },
}
