//! Contract compliance tests for core_types
//!
//! These tests pin the public surface other components build on.

use core_types::{
    AccessorId, ErrorKind, FunctionId, JsError, JsString, ObjectId, ScopeId, SlotHandle,
    SourcePosition, StackFrame, Value,
};

#[cfg(test)]
mod value_contract_tests {
    use super::*;

    /// Contract: Value has exactly the nine tags of the data model
    #[test]
    fn test_value_has_all_tags() {
        let values = [
            Value::Undefined,
            Value::Null,
            Value::Boolean(true),
            Value::Number(1.0),
            Value::String(JsString::from("s")),
            Value::Object(ObjectId::from_raw(0, 0)),
            Value::Function(FunctionId::from_raw(0, 0)),
            Value::Symbol(ObjectId::from_raw(1, 0)),
            Value::Accessor(AccessorId::from_raw(0, 0)),
        ];
        let tags: Vec<&str> = values.iter().map(|v| v.type_of()).collect();
        assert_eq!(
            tags,
            vec!["undefined", "object", "boolean", "number", "string", "object", "function", "symbol", "object"]
        );
    }

    /// Contract: handles are plain copyable data
    #[test]
    fn test_handles_are_copy() {
        let scope = ScopeId::from_raw(5, 2);
        let copy = scope;
        assert_eq!(scope, copy);
    }
}

#[cfg(test)]
mod error_contract_tests {
    use super::*;

    /// Contract: JsError exposes kind, message, stack and position
    #[test]
    fn test_js_error_fields() {
        let error = JsError {
            kind: ErrorKind::TypeError,
            message: "m".to_string(),
            stack: vec![StackFrame {
                function_name: None,
                position: SourcePosition::new(0, 0),
            }],
            source_position: Some(SourcePosition::new(0, 0)),
        };
        assert_eq!(error.stack.len(), 1);
        assert!(error.source_position.is_some());
    }
}
