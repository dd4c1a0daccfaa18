//! Property-based tests for interpreter determinism.
//!
//! Interpreting the same experiment twice, with fresh interpreters, must
//! yield identical event streams and identical backend output.

use qconvert_core::{ConvertOptions, Converter, EventRecorder, Interpreter};
use qconvert_expr::Evaluator;
use qconvert_ir::{Experiment, ExperimentHeader, GateTable, Instruction, Qobj};
use proptest::prelude::*;

/// Instructions that are valid for a circuit with `n` qubits and one
/// register covering `n` memory bits.
fn arb_instruction(n: u32) -> impl Strategy<Value = Instruction> {
    let angle = -6.3_f64..6.3;
    prop_oneof![
        (0..n).prop_map(|q| Instruction::gate("h", vec![q])),
        (0..n).prop_map(|q| Instruction::gate("x", vec![q])),
        (0..n).prop_map(|q| Instruction::gate("iden", vec![q])),
        (0..n, angle.clone()).prop_map(|(q, a)| Instruction::gate("rx", vec![q]).with_params(vec![a])),
        (0..n, angle.clone()).prop_map(|(q, a)| Instruction::gate("u1", vec![q]).with_params(vec![a])),
        (0..n, angle.clone(), angle.clone(), angle)
            .prop_map(|(q, t, p, l)| Instruction::gate("u3", vec![q]).with_params(vec![t, p, l])),
        (0..n, 0..n)
            .prop_filter("distinct qubits", |(a, b)| a != b)
            .prop_map(|(a, b)| Instruction::gate("cx", vec![a, b])),
        (0..n).prop_map(|q| Instruction::measure(vec![q], vec![u64::from(q)])),
        Just(Instruction::barrier((0..n).collect())),
    ]
}

fn arb_experiment() -> impl Strategy<Value = Experiment> {
    (2_u32..=5).prop_flat_map(|n| {
        prop::collection::vec(arb_instruction(n), 0..=20).prop_map(move |instructions| Experiment {
            header: Some(ExperimentHeader {
                n_qubits: n,
                memory_slots: u64::from(n),
                creg_sizes: vec![("c".to_string(), n)],
            }),
            instructions,
        })
    })
}

proptest! {
    #[test]
    fn prop_event_stream_is_deterministic(experiment in arb_experiment()) {
        let table = GateTable::builtin().unwrap();
        let evaluator = Evaluator::new();
        let options = ConvertOptions::default();

        let mut first = EventRecorder::new();
        Interpreter::new(&table, &evaluator, &options).run(&experiment, &mut first).unwrap();
        let mut second = EventRecorder::new();
        Interpreter::new(&table, &evaluator, &options).run(&experiment, &mut second).unwrap();

        prop_assert_eq!(&first.events, &second.events);
        // start, end, plus at most one event per instruction
        prop_assert!(first.events.len() <= experiment.instructions.len() + 2);
    }

    #[test]
    fn prop_backend_output_is_deterministic(experiment in arb_experiment()) {
        let converter = Converter::builtin().unwrap();
        let options = ConvertOptions::default();
        let qobj = Qobj { experiments: vec![experiment] };

        let a = converter.qobj_to_pyquil(&qobj, &options).unwrap();
        let b = converter.qobj_to_pyquil(&qobj, &options).unwrap();
        prop_assert_eq!(a, b);

        let a = converter.qobj_to_toaster(&qobj, &options).unwrap();
        let b = converter.qobj_to_toaster(&qobj, &options).unwrap();
        prop_assert_eq!(a, b);
    }
}
