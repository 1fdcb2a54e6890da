//! Shared fixtures for unit tests

use std::sync::Arc;

use crate::diagnostics::CollectingSink;
use crate::error::OperationError;
use crate::factory::OperationFactory;
use crate::signature::{Arguments, Callable, Parameter, Signature};
use crate::types::TypeTag;

fn int_arg(args: &Arguments, name: &str) -> crate::error::Result<i64> {
    args.get(name)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| OperationError::invocation("add", format!("missing integer '{}'", name)))
}

/// `add(x: int = 1, y: int = 2) -> int`
pub(crate) fn add_callable() -> Callable {
    Callable::new(
        "add",
        Signature::new([
            Parameter::optional("x", TypeTag::Int, 1),
            Parameter::optional("y", TypeTag::Int, 2),
        ])
        .returns(TypeTag::Int),
        |args| Ok(serde_json::json!(int_arg(args, "x")? + int_arg(args, "y")?)),
    )
}

/// `pair(n: int) -> (int, float)`
pub(crate) fn pair_callable() -> Callable {
    Callable::new(
        "pair",
        Signature::new([Parameter::required("n", TypeTag::Int)])
            .returns_many([TypeTag::Int, TypeTag::Float]),
        |args| Ok(serde_json::json!([args.get("n").cloned().unwrap_or_default(), 0.5])),
    )
}

/// A factory whose diagnostics can be inspected
pub(crate) fn collecting_factory() -> (OperationFactory, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::new());
    let factory = OperationFactory::with_sink(sink.clone());
    (factory, sink)
}
