use anyhow::{bail, Context, Result};
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::circuits;
use cli::prover;

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Build {
            circuit: which,
            output,
            dimension,
            sample,
        } => {
            let (generator, evaluator) = match which.as_str() {
                "dot-product" => circuits::build_dot_product(dimension)?,
                "sbox" => {
                    let byte = circuits::parse_sample(&sample)?;
                    circuits::build_sbox(byte)?
                }
                other => bail!("unknown example circuit {other:?} (use \"dot-product\" or \"sbox\")"),
            };

            std::fs::create_dir_all(&output)
                .with_context(|| format!("cannot create output directory {}", output.display()))?;
            let arith = circuit::write_circuit_file(&generator, &output)?;
            let input = circuit::write_input_file(&generator, &evaluator, &output)?;

            let value = circuits::first_output_value(&generator, &evaluator)?;
            println!(
                "{}: {} wires, {} constraints, output = {} (0x{})",
                generator.name(),
                generator.num_wires(),
                generator.num_constraints(),
                value,
                value.to_hex_string()
            );
            println!("wrote {}", arith.display());
            println!("wrote {}", input.display());
            Ok(())
        }
        Commands::Prove {
            name,
            output,
            prover_path,
        } => {
            let arith = output.join(format!("{name}.arith"));
            let input = output.join(format!("{name}.in"));
            if !arith.is_file() || !input.is_file() {
                bail!(
                    "circuit files not found; run `rsnark build` first (expected {} and {})",
                    arith.display(),
                    input.display()
                );
            }
            let text = prover::run_prover(&prover_path, &arith, &input)?;
            print!("{text}");
            Ok(())
        }
    }
}
