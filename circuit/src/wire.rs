use field::FieldElement;

/// Index of a wire in the circuit. Id 0 never exists; id 1 is always the
/// canonical one-wire.
pub type WireId = usize;

/// A handle to a field-valued quantity in the circuit.
///
/// All variants behave the same for user-facing operations but differ in how
/// they lower to primitive instructions:
///
/// - `Constant` wires carry a compile-time value and no id. They fold in
///   algebra and only materialize (via a `const-mul` from the one-wire) when
///   an emitted instruction needs to reference them.
/// - `Variable` wires back an allocated circuit wire.
/// - `LinearCombination` wires are outputs of zero-gate linear instructions
///   (`add`, `const-mul`). They must be packed into a variable (a
///   multiply-by-one gate) before they can serve as a multiplication or
///   assertion operand, or be declared as a circuit output.
/// - The `*Bit` variants additionally remember that the wire is constrained
///   to `{0, 1}`, which lets redundant binary assertions be skipped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Wire {
    Constant(FieldElement),
    Variable(WireId),
    VariableBit(WireId),
    LinearCombination(WireId),
    LinearCombinationBit(WireId),
}

impl Wire {
    /// The allocated id, if any. Constants have none until materialized.
    pub fn id(&self) -> Option<WireId> {
        match self {
            Wire::Constant(_) => None,
            Wire::Variable(id)
            | Wire::VariableBit(id)
            | Wire::LinearCombination(id)
            | Wire::LinearCombinationBit(id) => Some(*id),
        }
    }

    /// Whether the wire is known to carry a value in `{0, 1}`.
    pub fn is_boolean(&self) -> bool {
        match self {
            Wire::Constant(c) => c.is_binary(),
            Wire::VariableBit(_) | Wire::LinearCombinationBit(_) => true,
            Wire::Variable(_) | Wire::LinearCombination(_) => false,
        }
    }

    /// The compile-time value, for constant wires.
    pub fn constant_value(&self) -> Option<&FieldElement> {
        match self {
            Wire::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Wire::Constant(_))
    }

    /// Variable-backed wires can be gate operands and outputs directly.
    pub fn is_variable(&self) -> bool {
        matches!(self, Wire::Variable(_) | Wire::VariableBit(_))
    }

    /// Linear-combination wires pack into a variable before use as a
    /// multiplication/assertion operand or circuit output.
    pub fn is_linear_combination(&self) -> bool {
        matches!(self, Wire::LinearCombination(_) | Wire::LinearCombinationBit(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_wires_have_no_id() {
        let w = Wire::Constant(FieldElement::from_u64(5));
        assert_eq!(w.id(), None);
        assert!(w.is_constant());
        assert!(!w.is_variable());
        assert!(!w.is_linear_combination());
    }

    #[test]
    fn boolean_predicate_per_variant() {
        assert!(Wire::Constant(FieldElement::zero()).is_boolean());
        assert!(Wire::Constant(FieldElement::one()).is_boolean());
        assert!(!Wire::Constant(FieldElement::from_u64(2)).is_boolean());
        assert!(Wire::VariableBit(4).is_boolean());
        assert!(Wire::LinearCombinationBit(4).is_boolean());
        assert!(!Wire::Variable(4).is_boolean());
        assert!(!Wire::LinearCombination(4).is_boolean());
    }

    #[test]
    fn id_bearing_variants() {
        assert_eq!(Wire::Variable(7).id(), Some(7));
        assert_eq!(Wire::VariableBit(7).id(), Some(7));
        assert_eq!(Wire::LinearCombination(7).id(), Some(7));
        assert_eq!(Wire::LinearCombinationBit(7).id(), Some(7));
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(Wire::Variable(3), Wire::Variable(3));
        assert_ne!(Wire::Variable(3), Wire::VariableBit(3));
        assert_eq!(
            Wire::Constant(FieldElement::from_u64(9)),
            Wire::Constant(FieldElement::from_u64(9))
        );
    }
}
