use std::path::PathBuf;

use num_bigint::BigUint;

/// Builder configuration.
///
/// The field prime is fixed at compile time in the `field` crate; it is
/// exposed here for callers that want to reach it through the configuration
/// surface.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Selects the ambient-generator registry. Off (the default), one
    /// process-wide slot serves every thread and each newly registered
    /// generator replaces the previous one. On, registrations are keyed by
    /// the owning thread, isolating generators constructed on parallel
    /// threads.
    pub running_multi_generators: bool,
    /// Absolute path of the external prover binary, if proving is wanted.
    pub prover_path: Option<PathBuf>,
}

impl Config {
    /// The scalar field prime `p`.
    pub fn field_prime(&self) -> &'static BigUint {
        field::modulus()
    }
}
