pub mod element;

pub use element::{modulus, FieldElement, FIELD_PRIME_DECIMAL};
