use numlab_core::numeric::{NumericKind, Value};
use numlab_core::{Bindings, Expression, LowerOptions, Lowered, Pipeline, evaluate, lower, parser};
use std::sync::Arc;
use std::thread;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_public_types_are_send_and_sync() {
    assert_send_sync::<Value>();
    assert_send_sync::<NumericKind>();
    assert_send_sync::<Expression>();
    assert_send_sync::<Lowered>();
    assert_send_sync::<numlab_core::PipelineError>();
}

#[test]
fn test_concurrent_evaluation_and_lowering() {
    let ast = parser::parse("4x*(1-x)", "test").expect("parses");
    let expr = Arc::new(
        Pipeline::new("4x*(1-x)".to_string(), "test".to_string()).desugar(&ast, &LowerOptions::default()),
    );
    let ast = Arc::new(ast);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let expr = Arc::clone(&expr);
            let ast = Arc::clone(&ast);
            thread::spawn(move || {
                let x = Value::rational(i, 10).expect("rational");
                let bindings: Bindings = [("x".to_string(), x)].into_iter().collect();
                let value = evaluate(&expr, &bindings).expect("evaluates");
                let lowered = lower(&ast, &NumericKind::Rational, &LowerOptions::default()).expect("lowers");
                (value, lowered.stages())
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread finished"))
        .collect();

    for (i, (value, stages)) in results.iter().enumerate() {
        let i = i as i64;
        assert_eq!(Some(value.clone()), Value::rational(4 * i * (10 - i), 100));
        assert_eq!(stages, &results[0].1);
    }
}
