use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use circuit::ConfigError;

/// Spawn the external prover on an `.arith`/`.in` pair and return its
/// combined output.
pub fn run_prover(prover: &Path, arith: &Path, input: &Path) -> Result<String> {
    if !prover.is_file() {
        return Err(ConfigError::ProverNotFound(prover.to_path_buf()).into());
    }
    let output = Command::new(prover)
        .arg(arith)
        .arg(input)
        .output()
        .with_context(|| format!("failed to spawn prover: {}", prover.display()))?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    if !output.status.success() {
        bail!("prover exited with {}:\n{text}", output.status);
    }
    Ok(text)
}
