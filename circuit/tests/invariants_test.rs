//! Universal invariants checked over a circuit that exercises every
//! primitive: dependency ordering, wire accounting, structural
//! deduplication, the constraint tally, and assignment completeness.

use circuit::{
    arith_to_string, CircuitEvaluator, CircuitGenerator, Instruction, OpCode, Wire,
};
use field::FieldElement;

fn fe(n: u64) -> FieldElement {
    FieldElement::from_u64(n)
}

/// A mixed circuit touching every primitive op.
fn build() -> (CircuitGenerator, Vec<Wire>) {
    let mut g = CircuitGenerator::new("mixed");
    let a = g.create_input_wire("a");
    let b = g.create_input_wire("b");
    let w = g.create_prover_witness_wire("w");

    let p = g.mul(&a, &b);
    let five = g.create_constant_wire(&fe(5));
    let scaled = g.mul(&p, &five);
    let s = g.add(&scaled, &w);

    let bits = g.split(&a, 8).unwrap();
    let o = g.or(&bits[0], &bits[1]).unwrap();
    let x = g.xor(&bits[2], &bits[3]).unwrap();
    let both = g.and(&o, &x).unwrap();
    let packed = g.pack_bits(&bits).unwrap();
    g.add_equality_assertion(&packed, &a).unwrap();

    let nz = g.check_non_zero(&b);
    let chosen = g.select(&nz, &s, &p).unwrap();
    let out1 = g.make_output(&chosen, "selected").unwrap();
    let out2 = g.make_output(&both, "bit test").unwrap();
    (g, vec![a, b, w, out1, out2])
}

fn sample_evaluator(g: &CircuitGenerator, wires: &[Wire]) -> CircuitEvaluator {
    let mut ev = CircuitEvaluator::new(g);
    ev.set_wire_value(&wires[0], fe(0xA5)).unwrap();
    ev.set_wire_value(&wires[1], fe(3)).unwrap();
    ev.set_wire_value(&wires[2], fe(1000)).unwrap();
    ev.evaluate(g).unwrap();
    ev
}

#[test]
fn op_inputs_precede_their_outputs() {
    let (g, _) = build();
    for instruction in g.evaluation_queue() {
        if let Instruction::Op(op) = instruction {
            if op.outputs.is_empty() {
                continue; // assertions verify, they define nothing
            }
            let max_in = op.inputs.iter().max().unwrap();
            let min_out = op.outputs.iter().min().unwrap();
            assert!(
                max_in < min_out,
                "op `{op}` reads id {max_in} but defines id {min_out}"
            );
        }
    }
}

#[test]
fn wire_count_is_one_past_the_highest_referenced_id() {
    let (g, _) = build();
    let mut max_id = 0;
    for instruction in g.evaluation_queue() {
        if let Instruction::Op(op) = instruction {
            for &id in op.inputs.iter().chain(&op.outputs) {
                max_id = max_id.max(id);
            }
        }
    }
    assert_eq!(g.num_wires(), max_id + 1);
}

#[test]
fn constraint_tally_matches_the_queue() {
    let (g, _) = build();
    let tally: usize = g
        .evaluation_queue()
        .iter()
        .filter_map(|i| match i {
            Instruction::Op(op) => Some(op.num_mul_gates()),
            _ => None,
        })
        .sum();
    assert_eq!(g.num_constraints(), tally);
}

#[test]
fn every_allocated_wire_is_assigned() {
    let (g, wires) = build();
    let ev = sample_evaluator(&g, &wires);
    for id in 1..g.num_wires() {
        assert!(ev.assignment().try_get(id).is_some(), "wire {id} unassigned");
    }
}

#[test]
fn assertion_triples_hold_under_the_sample_assignment() {
    let (g, wires) = build();
    let ev = sample_evaluator(&g, &wires);
    let mut checked = 0;
    for instruction in g.evaluation_queue() {
        if let Instruction::Op(op) = instruction {
            if op.code == OpCode::Assert {
                let a = ev.assignment().get(op.inputs[0]).unwrap();
                let b = ev.assignment().get(op.inputs[1]).unwrap();
                let c = ev.assignment().get(op.inputs[2]).unwrap();
                assert_eq!(a.mul(b), *c);
                checked += 1;
            }
        }
    }
    assert!(checked > 0);
}

#[test]
fn emitted_lines_match_the_in_circuit_queue() {
    let (g, _) = build();
    let emitted = g
        .evaluation_queue()
        .iter()
        .filter(|i| i.done_within_circuit())
        .count();
    assert_eq!(arith_to_string(&g).lines().count(), emitted + 1); // + total line
}

#[test]
fn resubmitted_ops_do_not_grow_the_queue() {
    let mut g = CircuitGenerator::new("t");
    let a = g.create_input_wire("a");
    let b = g.create_input_wire("b");
    let p1 = g.mul(&a, &b);
    let s1 = g.add(&a, &b);
    let queue_len = g.evaluation_queue().len();

    let p2 = g.mul(&b, &a);
    let s2 = g.add(&b, &a);
    assert_eq!(p1, p2);
    assert_eq!(s1, s2);
    assert_eq!(g.evaluation_queue().len(), queue_len);
}

mod consistency {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The evaluator agrees with direct field arithmetic on a random
        /// quadratic expression a*b + c*a + 7.
        #[test]
        fn evaluator_matches_field_arithmetic(
            av in 0u64..1 << 32,
            bv in 0u64..1 << 32,
            cv in 0u64..1 << 32,
        ) {
            let mut g = CircuitGenerator::new("quad");
            let a = g.create_input_wire("a");
            let b = g.create_input_wire("b");
            let c = g.create_input_wire("c");
            let ab = g.mul(&a, &b);
            let ca = g.mul(&c, &a);
            let sum = g.add(&ab, &ca);
            let seven = Wire::Constant(fe(7));
            let total = g.add(&sum, &seven);
            let out = g.make_output(&total, "").unwrap();

            let mut ev = CircuitEvaluator::new(&g);
            ev.set_wire_value(&a, fe(av)).unwrap();
            ev.set_wire_value(&b, fe(bv)).unwrap();
            ev.set_wire_value(&c, fe(cv)).unwrap();
            ev.evaluate(&g).unwrap();

            let expected = fe(av).mul(&fe(bv)).add(&fe(cv).mul(&fe(av))).add(&fe(7));
            prop_assert_eq!(ev.wire_value(&out), Some(expected));
        }

        /// pack(split(w, 64)) == w for any u64.
        #[test]
        fn split_pack_roundtrip(value in any::<u64>()) {
            let mut g = CircuitGenerator::new("roundtrip");
            let w = g.create_input_wire("w");
            let bits = g.split(&w, 64).unwrap();
            let packed = g.pack_bits(&bits).unwrap();
            let out = g.make_output(&packed, "").unwrap();

            let mut ev = CircuitEvaluator::new(&g);
            ev.set_wire_value(&w, fe(value)).unwrap();
            ev.evaluate(&g).unwrap();
            prop_assert_eq!(ev.wire_value(&out), Some(fe(value)));
        }
    }
}
