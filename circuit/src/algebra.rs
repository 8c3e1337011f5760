/// Wire algebra: the user-facing operations, dispatched by wire variant.
///
/// The lowering policy is uniform: anything computable on constants folds in
/// the field and emits nothing; linear work (`add`, `const-mul`) emits a
/// zero-gate instruction whose output is a linear-combination wire; anything
/// quadratic packs its linear-combination operands into variables and emits
/// a gate.
use field::FieldElement;

use crate::error::ConstructionError;
use crate::generator::{CircuitGenerator, OutKind};
use crate::ops::OpCode;
use crate::wire::Wire;

impl CircuitGenerator {
    // ------------------------------------------------------------------
    // Arithmetic
    // ------------------------------------------------------------------

    /// `a + b`. Constant pairs fold; adding zero is the identity; otherwise
    /// a zero-gate `add` is emitted and the result stays a linear
    /// combination.
    pub fn add(&mut self, a: &Wire, b: &Wire) -> Wire {
        if let (Some(x), Some(y)) = (a.constant_value(), b.constant_value()) {
            return Wire::Constant(x.add(y));
        }
        if a.constant_value().is_some_and(FieldElement::is_zero) {
            return b.clone();
        }
        if b.constant_value().is_some_and(FieldElement::is_zero) {
            return a.clone();
        }
        let ia = self.resolve(a);
        let ib = self.resolve(b);
        self.append_op(
            OpCode::Add,
            vec![ia, ib],
            &[OutKind::LinearCombination],
            String::new(),
        )
        .remove(0)
    }

    /// Sum of a slice of wires, folded left. Empty input sums to zero.
    pub fn add_many(&mut self, wires: &[Wire]) -> Wire {
        let mut acc = self.zero_wire();
        for w in wires {
            acc = self.add(&acc, w);
        }
        acc
    }

    /// `a - b`, lowered as `a + (-1)·b`.
    pub fn sub(&mut self, a: &Wire, b: &Wire) -> Wire {
        let nb = self.neg(b);
        self.add(a, &nb)
    }

    /// `-a`, lowered as `(p-1)·a`.
    pub fn neg(&mut self, w: &Wire) -> Wire {
        let minus_one = FieldElement::one().neg();
        self.const_mul(w, &minus_one)
    }

    /// `a · b`. Constants fold (a one-sided constant degrades to
    /// `const-mul`); otherwise both operands are packed if needed and a
    /// `mul` gate is emitted. The product of two boolean wires is boolean.
    pub fn mul(&mut self, a: &Wire, b: &Wire) -> Wire {
        if let (Some(x), Some(y)) = (a.constant_value(), b.constant_value()) {
            return Wire::Constant(x.mul(y));
        }
        if let Some(c) = a.constant_value() {
            let c = c.clone();
            return self.const_mul(b, &c);
        }
        if let Some(c) = b.constant_value() {
            let c = c.clone();
            return self.const_mul(a, &c);
        }
        let pa = self.pack_if_needed(a);
        let pb = self.pack_if_needed(b);
        let kind = if pa.is_boolean() && pb.is_boolean() {
            OutKind::VariableBit
        } else {
            OutKind::Variable
        };
        let ia = self.resolve(&pa);
        let ib = self.resolve(&pb);
        self.append_op(OpCode::Mul, vec![ia, ib], &[kind], String::new())
            .remove(0)
    }

    /// `c · w` for a compile-time scalar: zero gates. Multiplying by 0 or 1
    /// folds away entirely.
    pub fn const_mul(&mut self, w: &Wire, c: &FieldElement) -> Wire {
        if let Some(x) = w.constant_value() {
            return Wire::Constant(x.mul(c));
        }
        if c.is_zero() {
            return Wire::Constant(FieldElement::zero());
        }
        if c.is_one() {
            return w.clone();
        }
        let id = self.resolve(w);
        self.append_op(
            OpCode::ConstMul(c.clone()),
            vec![id],
            &[OutKind::LinearCombination],
            String::new(),
        )
        .remove(0)
    }

    /// Materialize a linear-combination wire into a variable via a
    /// multiply-by-one gate. Idempotent: variables (and constants) pass
    /// through untouched, and repeated packing of the same wire
    /// deduplicates to the same output id.
    pub fn pack_if_needed(&mut self, w: &Wire) -> Wire {
        if w.is_linear_combination() {
            self.make_variable(w)
        } else {
            w.clone()
        }
    }

    // ------------------------------------------------------------------
    // Boolean operations
    // ------------------------------------------------------------------

    fn require_boolean(&self, w: &Wire, op: &'static str) -> Result<(), ConstructionError> {
        if w.is_boolean() {
            return Ok(());
        }
        match w.constant_value() {
            Some(c) => Err(ConstructionError::NonBooleanConstant {
                op,
                value: c.clone(),
            }),
            None => Err(ConstructionError::NonBooleanOperand { op }),
        }
    }

    /// Boolean OR. One gate unless a constant operand folds it away.
    pub fn or(&mut self, a: &Wire, b: &Wire) -> Result<Wire, ConstructionError> {
        self.require_boolean(a, "or")?;
        self.require_boolean(b, "or")?;
        match (a.constant_value(), b.constant_value()) {
            (Some(x), Some(y)) => {
                let v = if x.is_zero() && y.is_zero() {
                    FieldElement::zero()
                } else {
                    FieldElement::one()
                };
                Ok(Wire::Constant(v))
            }
            (Some(x), None) => Ok(if x.is_one() {
                Wire::Constant(FieldElement::one())
            } else {
                b.clone()
            }),
            (None, Some(y)) => Ok(if y.is_one() {
                Wire::Constant(FieldElement::one())
            } else {
                a.clone()
            }),
            (None, None) => {
                let ia = self.resolve(a);
                let ib = self.resolve(b);
                Ok(self
                    .append_op(OpCode::Or, vec![ia, ib], &[OutKind::VariableBit], String::new())
                    .remove(0))
            }
        }
    }

    /// Boolean XOR. One gate unless a constant operand folds it away.
    pub fn xor(&mut self, a: &Wire, b: &Wire) -> Result<Wire, ConstructionError> {
        self.require_boolean(a, "xor")?;
        self.require_boolean(b, "xor")?;
        match (a.constant_value(), b.constant_value()) {
            (Some(x), Some(y)) => {
                let v = if x == y {
                    FieldElement::zero()
                } else {
                    FieldElement::one()
                };
                Ok(Wire::Constant(v))
            }
            (Some(x), None) => Ok(if x.is_zero() {
                b.clone()
            } else {
                self.complement_bit(b)
            }),
            (None, Some(y)) => Ok(if y.is_zero() {
                a.clone()
            } else {
                self.complement_bit(a)
            }),
            (None, None) => {
                let ia = self.resolve(a);
                let ib = self.resolve(b);
                Ok(self
                    .append_op(OpCode::Xor, vec![ia, ib], &[OutKind::VariableBit], String::new())
                    .remove(0))
            }
        }
    }

    /// Boolean AND: a multiplication gate whose output stays boolean.
    pub fn and(&mut self, a: &Wire, b: &Wire) -> Result<Wire, ConstructionError> {
        self.require_boolean(a, "and")?;
        self.require_boolean(b, "and")?;
        Ok(self.mul(a, b))
    }

    /// Boolean NOT: `1 - a`, zero gates.
    pub fn not(&mut self, w: &Wire) -> Result<Wire, ConstructionError> {
        self.require_boolean(w, "not")?;
        if let Some(c) = w.constant_value() {
            return Ok(Wire::Constant(FieldElement::one().sub(c)));
        }
        Ok(self.complement_bit(w))
    }

    /// `1 - w` for a wire already known boolean; the result is a boolean
    /// linear combination.
    fn complement_bit(&mut self, w: &Wire) -> Wire {
        let negated = self.neg(w);
        let one = self.one_wire();
        match self.add(&one, &negated) {
            Wire::LinearCombination(id) => Wire::LinearCombinationBit(id),
            other => other,
        }
    }

    // ------------------------------------------------------------------
    // Predicates and selection
    // ------------------------------------------------------------------

    /// The non-zero indicator: 1 iff `w ≠ 0`. Two gates; the prover supplies
    /// the inverse witness `m` alongside the indicator.
    pub fn check_non_zero(&mut self, w: &Wire) -> Wire {
        if let Some(c) = w.constant_value() {
            let v = if c.is_zero() {
                FieldElement::zero()
            } else {
                FieldElement::one()
            };
            return Wire::Constant(v);
        }
        let id = self.resolve(w);
        let outs = self.append_op(
            OpCode::ZeroP,
            vec![id],
            &[OutKind::Variable, OutKind::VariableBit],
            String::new(),
        );
        outs[1].clone()
    }

    /// Equality indicator: 1 iff `a = b`, computed as `NOT zerop(a - b)`.
    pub fn is_equal_to(&mut self, a: &Wire, b: &Wire) -> Wire {
        let diff = self.sub(a, b);
        let nz = self.check_non_zero(&diff);
        if let Some(c) = nz.constant_value() {
            return Wire::Constant(FieldElement::one().sub(c));
        }
        self.complement_bit(&nz)
    }

    /// Equality against a compile-time constant.
    pub fn is_equal_to_const(&mut self, w: &Wire, c: &FieldElement) -> Wire {
        self.is_equal_to(w, &Wire::Constant(c.clone()))
    }

    /// Two-way selection: `cond·t + (1-cond)·f`, lowered as
    /// `f + cond·(t - f)`. `cond` must be boolean.
    pub fn select(&mut self, cond: &Wire, t: &Wire, f: &Wire) -> Result<Wire, ConstructionError> {
        self.require_boolean(cond, "select")?;
        if let Some(c) = cond.constant_value() {
            return Ok(if c.is_one() { t.clone() } else { f.clone() });
        }
        let diff = self.sub(t, f);
        let scaled = self.mul(cond, &diff);
        Ok(self.add(f, &scaled))
    }

    // ------------------------------------------------------------------
    // Bit conversion
    // ------------------------------------------------------------------

    /// Constrain `w = Σ 2^i · b_i` over `n` fresh boolean wires and return
    /// them little-endian. Costs `n` gates (one booleanity constraint per
    /// bit). Splitting a known-boolean wire into a single bit is the wire
    /// itself.
    pub fn split(&mut self, w: &Wire, n: usize) -> Result<Vec<Wire>, ConstructionError> {
        if n == 0 {
            return Err(ConstructionError::ZeroWidthSplit);
        }
        if let Some(c) = w.constant_value() {
            if !c.fits_in_bits(n) {
                return Err(ConstructionError::ConstantOutOfRange { bits: n });
            }
            return Ok((0..n)
                .map(|i| {
                    Wire::Constant(if c.bit(i) {
                        FieldElement::one()
                    } else {
                        FieldElement::zero()
                    })
                })
                .collect());
        }
        if w.is_boolean() && n == 1 {
            return Ok(vec![w.clone()]);
        }
        let id = self.resolve(w);
        let kinds = vec![OutKind::VariableBit; n];
        Ok(self.append_op(OpCode::Split, vec![id], &kinds, String::new()))
    }

    /// `Σ 2^i · b_i` over boolean wires: zero gates (the result is a linear
    /// combination). Every input must already be boolean.
    pub fn pack_bits(&mut self, bits: &[Wire]) -> Result<Wire, ConstructionError> {
        if bits.is_empty() {
            return Err(ConstructionError::EmptyBitVector);
        }
        for b in bits {
            self.require_boolean(b, "pack")?;
        }
        if bits.iter().all(|b| b.is_constant()) {
            let mut acc = FieldElement::zero();
            let mut power = FieldElement::one();
            let two = FieldElement::from_u64(2);
            for b in bits {
                if let Some(c) = b.constant_value() {
                    acc = acc.add(&power.mul(c));
                }
                power = power.mul(&two);
            }
            return Ok(Wire::Constant(acc));
        }
        let inputs: Vec<_> = bits.iter().map(|b| self.resolve(b)).collect();
        Ok(self
            .append_op(
                OpCode::Pack,
                inputs,
                &[OutKind::LinearCombination],
                String::new(),
            )
            .remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::Instruction;

    fn fe(n: u64) -> FieldElement {
        FieldElement::from_u64(n)
    }

    fn count_ops(g: &CircuitGenerator, code: fn(&OpCode) -> bool) -> usize {
        g.evaluation_queue()
            .iter()
            .filter(|i| matches!(i, Instruction::Op(op) if code(&op.code)))
            .count()
    }

    #[test]
    fn constant_arithmetic_folds() {
        let mut g = CircuitGenerator::new("t");
        let a = Wire::Constant(fe(6));
        let b = Wire::Constant(fe(7));
        assert_eq!(g.add(&a, &b), Wire::Constant(fe(13)));
        assert_eq!(g.sub(&b, &a), Wire::Constant(fe(1)));
        assert_eq!(g.mul(&a, &b), Wire::Constant(fe(42)));
        assert_eq!(g.neg(&Wire::Constant(fe(0))), Wire::Constant(fe(0)));
        // Nothing was queued beyond the one-wire declaration.
        assert_eq!(g.evaluation_queue().len(), 1);
        assert_eq!(g.num_wires(), 2);
    }

    #[test]
    fn adding_zero_is_identity() {
        let mut g = CircuitGenerator::new("t");
        let x = g.create_input_wire("x");
        let z = g.zero_wire();
        assert_eq!(g.add(&x, &z), x);
        assert_eq!(g.add(&z, &x), x);
        assert_eq!(count_ops(&g, |c| *c == OpCode::Add), 0);
    }

    #[test]
    fn symbolic_add_is_a_zero_gate_linear_combination() {
        let mut g = CircuitGenerator::new("t");
        let a = g.create_input_wire("a");
        let b = g.create_input_wire("b");
        let s = g.add(&a, &b);
        assert!(s.is_linear_combination());
        assert_eq!(g.num_constraints(), 0);
        assert_eq!(count_ops(&g, |c| *c == OpCode::Add), 1);
    }

    #[test]
    fn const_mul_by_zero_and_one_folds() {
        let mut g = CircuitGenerator::new("t");
        let x = g.create_input_wire("x");
        assert_eq!(g.const_mul(&x, &FieldElement::zero()), g.zero_wire());
        assert_eq!(g.const_mul(&x, &FieldElement::one()), x);
        assert_eq!(g.evaluation_queue().len(), 2); // one-wire + x declarations only
    }

    #[test]
    fn symbolic_const_mul_costs_no_gates() {
        let mut g = CircuitGenerator::new("t");
        let x = g.create_input_wire("x");
        let y = g.const_mul(&x, &fe(5));
        assert!(y.is_linear_combination());
        assert_eq!(g.num_constraints(), 0);
    }

    #[test]
    fn mul_with_constant_degrades_to_const_mul() {
        let mut g = CircuitGenerator::new("t");
        let x = g.create_input_wire("x");
        let c = Wire::Constant(fe(5));
        let y = g.mul(&x, &c);
        assert!(y.is_linear_combination());
        assert_eq!(count_ops(&g, |c| matches!(c, OpCode::ConstMul(_))), 1);
        assert_eq!(count_ops(&g, |c| *c == OpCode::Mul), 0);
    }

    #[test]
    fn mul_packs_linear_combination_operands() {
        let mut g = CircuitGenerator::new("t");
        let a = g.create_input_wire("a");
        let b = g.create_input_wire("b");
        let c = g.create_input_wire("c");
        let sum = g.add(&a, &b);
        let p = g.mul(&sum, &c);
        assert!(p.is_variable());
        // One gate to pack the sum, one for the product itself.
        assert_eq!(g.num_constraints(), 2);
    }

    #[test]
    fn pack_if_needed_is_idempotent() {
        let mut g = CircuitGenerator::new("t");
        let a = g.create_input_wire("a");
        let b = g.create_input_wire("b");
        let sum = g.add(&a, &b);

        let p1 = g.pack_if_needed(&sum);
        let p2 = g.pack_if_needed(&sum);
        assert!(p1.is_variable());
        assert_eq!(p1, p2);
        assert_eq!(g.pack_if_needed(&p1), p1);
        assert_eq!(g.num_constraints(), 1);
    }

    #[test]
    fn boolean_ops_reject_unproven_wires() {
        let mut g = CircuitGenerator::new("t");
        let a = g.create_input_wire("a");
        let b = g.create_input_wire("b");
        assert!(matches!(
            g.or(&a, &b),
            Err(ConstructionError::NonBooleanOperand { op: "or" })
        ));
        assert!(matches!(
            g.not(&Wire::Constant(fe(2))),
            Err(ConstructionError::NonBooleanConstant { op: "not", .. })
        ));
    }

    #[test]
    fn boolean_ops_on_bits() {
        let mut g = CircuitGenerator::new("t");
        let a = g.create_input_wire("a");
        let bits = g.split(&a, 2).unwrap();

        let o = g.or(&bits[0], &bits[1]).unwrap();
        let x = g.xor(&bits[0], &bits[1]).unwrap();
        let n = g.not(&bits[0]).unwrap();
        let d = g.and(&bits[0], &bits[1]).unwrap();
        assert!(o.is_boolean() && x.is_boolean() && n.is_boolean() && d.is_boolean());
        assert_eq!(count_ops(&g, |c| *c == OpCode::Or), 1);
        assert_eq!(count_ops(&g, |c| *c == OpCode::Xor), 1);
        // The AND is the only multiplication gate.
        assert_eq!(count_ops(&g, |c| *c == OpCode::Mul), 1);
    }

    #[test]
    fn boolean_constant_folds() {
        let mut g = CircuitGenerator::new("t");
        let a = g.create_input_wire("a");
        let bit = g.add_binary_assertion(&a).unwrap();
        let one = Wire::Constant(fe(1));
        let zero = Wire::Constant(fe(0));

        assert_eq!(g.or(&bit, &one).unwrap(), one);
        assert_eq!(g.or(&bit, &zero).unwrap(), bit);
        assert_eq!(g.xor(&bit, &zero).unwrap(), bit);
        let flipped = g.xor(&bit, &one).unwrap();
        assert!(flipped.is_boolean());
        assert_ne!(flipped, bit);
        assert_eq!(g.xor(&one, &one).unwrap(), zero);
    }

    #[test]
    fn check_non_zero_emits_a_two_gate_zerop() {
        let mut g = CircuitGenerator::new("t");
        let x = g.create_input_wire("x");
        let y = g.check_non_zero(&x);
        assert!(y.is_boolean());
        assert_eq!(g.num_constraints(), 2);
        assert_eq!(count_ops(&g, |c| *c == OpCode::ZeroP), 1);
    }

    #[test]
    fn check_non_zero_folds_constants() {
        let mut g = CircuitGenerator::new("t");
        assert_eq!(
            g.check_non_zero(&Wire::Constant(fe(0))),
            Wire::Constant(fe(0))
        );
        assert_eq!(
            g.check_non_zero(&Wire::Constant(fe(9))),
            Wire::Constant(fe(1))
        );
        assert_eq!(g.num_constraints(), 0);
    }

    #[test]
    fn is_equal_to_folds_constants() {
        let mut g = CircuitGenerator::new("t");
        let a = Wire::Constant(fe(7));
        let b = Wire::Constant(fe(7));
        let c = Wire::Constant(fe(8));
        assert_eq!(g.is_equal_to(&a, &b), Wire::Constant(fe(1)));
        assert_eq!(g.is_equal_to(&a, &c), Wire::Constant(fe(0)));
    }

    #[test]
    fn select_with_constant_condition_folds() {
        let mut g = CircuitGenerator::new("t");
        let t = g.create_input_wire("t");
        let f = g.create_input_wire("f");
        let one = Wire::Constant(fe(1));
        let zero = Wire::Constant(fe(0));
        assert_eq!(g.select(&one, &t, &f).unwrap(), t);
        assert_eq!(g.select(&zero, &t, &f).unwrap(), f);
        assert_eq!(g.num_constraints(), 0);
    }

    #[test]
    fn split_allocates_bit_wires() {
        let mut g = CircuitGenerator::new("t");
        let x = g.create_input_wire("x");
        let bits = g.split(&x, 8).unwrap();
        assert_eq!(bits.len(), 8);
        assert!(bits.iter().all(Wire::is_boolean));
        assert_eq!(g.num_constraints(), 8);
    }

    #[test]
    fn split_of_constant_folds() {
        let mut g = CircuitGenerator::new("t");
        let bits = g.split(&Wire::Constant(fe(0b101)), 3).unwrap();
        assert_eq!(
            bits,
            vec![
                Wire::Constant(fe(1)),
                Wire::Constant(fe(0)),
                Wire::Constant(fe(1))
            ]
        );
        assert!(matches!(
            g.split(&Wire::Constant(fe(8)), 3),
            Err(ConstructionError::ConstantOutOfRange { bits: 3 })
        ));
        assert_eq!(g.num_constraints(), 0);
    }

    #[test]
    fn split_of_a_bit_is_itself() {
        let mut g = CircuitGenerator::new("t");
        let x = g.create_input_wire("x");
        let bit = g.add_binary_assertion(&x).unwrap();
        let before = g.num_constraints();
        let bits = g.split(&bit, 1).unwrap();
        assert_eq!(bits, vec![bit]);
        assert_eq!(g.num_constraints(), before);
    }

    #[test]
    fn split_rejects_zero_width() {
        let mut g = CircuitGenerator::new("t");
        let x = g.create_input_wire("x");
        assert!(matches!(
            g.split(&x, 0),
            Err(ConstructionError::ZeroWidthSplit)
        ));
    }

    #[test]
    fn pack_bits_is_zero_gates() {
        let mut g = CircuitGenerator::new("t");
        let x = g.create_input_wire("x");
        let bits = g.split(&x, 4).unwrap();
        let before = g.num_constraints();
        let packed = g.pack_bits(&bits).unwrap();
        assert!(packed.is_linear_combination());
        assert_eq!(g.num_constraints(), before);
    }

    #[test]
    fn pack_bits_rejects_non_boolean_wires() {
        let mut g = CircuitGenerator::new("t");
        let x = g.create_input_wire("x");
        let err = g.pack_bits(&[x]).unwrap_err();
        assert!(matches!(err, ConstructionError::NonBooleanOperand { op: "pack" }));
        assert!(matches!(
            g.pack_bits(&[]),
            Err(ConstructionError::EmptyBitVector)
        ));
        assert!(matches!(
            g.pack_bits(&[Wire::Constant(fe(2))]),
            Err(ConstructionError::NonBooleanConstant { op: "pack", .. })
        ));
    }

    #[test]
    fn pack_of_constant_bits_folds() {
        let mut g = CircuitGenerator::new("t");
        let bits = vec![
            Wire::Constant(fe(1)),
            Wire::Constant(fe(0)),
            Wire::Constant(fe(1)),
            Wire::Constant(fe(1)),
        ];
        assert_eq!(g.pack_bits(&bits).unwrap(), Wire::Constant(fe(0b1101)));
    }

    #[test]
    fn add_many_folds_left() {
        let mut g = CircuitGenerator::new("t");
        let ws = g.create_input_wire_array(3, "w");
        let sum = g.add_many(&ws);
        assert!(sum.is_linear_combination());
        assert_eq!(count_ops(&g, |c| *c == OpCode::Add), 2);
        assert_eq!(g.add_many(&[]), g.zero_wire());
    }
}
