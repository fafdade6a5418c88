use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use stream_eval::{ConstructError, ConversionTable, Context, EvalError, Evaluator, Registry, Tuple, Unit};

fn compile(expr: &str) -> Box<dyn Evaluator> {
    let mut evaluator = Registry::with_builtins().construct_evaluator(expr).unwrap();
    evaluator.set_context(Arc::new(Context::new()));
    evaluator
}

fn arb_unit() -> impl Strategy<Value = Unit> {
    proptest::sample::select(Unit::ALL.to_vec())
}

fn arb_authored() -> impl Strategy<Value = (Unit, Unit, f64)> {
    proptest::sample::select(ConversionTable::global().entries().collect::<Vec<_>>())
}

proptest! {
    #[test]
    fn authored_pairs_multiply_exactly((from, to, factor) in arb_authored(), x in -1.0e12f64..1.0e12) {
        let evaluator = compile(&format!("convert({from}, {to}, x)"));
        let out = evaluator.evaluate(&Tuple::new().with("x", x)).unwrap();
        prop_assert_eq!(out, json!(x * factor));
    }

    #[test]
    fn absent_pairs_fail_naming_both_units(from in arb_unit(), to in arb_unit(), x in -1.0e6f64..1.0e6) {
        prop_assume!(ConversionTable::global().lookup(from, to).is_none());
        let evaluator = compile(&format!("convert({}, {}, x)", from.canonical_name().to_lowercase(), to));
        match evaluator.evaluate(&Tuple::new().with("x", x)) {
            Err(EvalError::NoConversion { from: f, to: t }) => {
                prop_assert_eq!(f, from.canonical_name());
                prop_assert_eq!(t, to.canonical_name());
            }
            other => prop_assert!(false, "expected NoConversion, got {:?}", other),
        }
    }

    #[test]
    fn wrong_arity_fails_at_construction(n in 0usize..8) {
        prop_assume!(n != 3);
        let args = (0..n).map(|i| format!("a{i}")).collect::<Vec<_>>().join(", ");
        let err = Registry::with_builtins()
            .construct_evaluator(&format!("convert({args})"))
            .unwrap_err();
        match err {
            ConstructError::Arity { expected, found, .. } => {
                prop_assert_eq!(expected, 3);
                prop_assert_eq!(found, n);
            }
            other => prop_assert!(false, "expected Arity, got {:?}", other),
        }
    }

    #[test]
    fn evaluation_is_idempotent((from, to, _f) in arb_authored(), x in any::<i32>()) {
        let evaluator = compile(&format!("convert({from}, {to}, x)"));
        let tuple = Tuple::new().with("x", x);
        let first = evaluator.evaluate(&tuple).unwrap();
        let second = evaluator.evaluate(&tuple).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn raw_ignores_tuple(field in "[a-z]{1,8}", value in any::<i64>()) {
        let evaluator = compile("raw(meters)");
        let out = evaluator.evaluate(&Tuple::new().with(field, value)).unwrap();
        prop_assert_eq!(out, json!("meters"));
    }
}
