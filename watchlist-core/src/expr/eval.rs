//! Expression evaluator
//!
//! Evaluates watch expressions against a namespace snapshot. Failures are
//! reported per expression and never escape this boundary; the refresh pass
//! only ever sees an [`EvaluationResult`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ast::{BinOp, Expr, Literal, UnaryOp};
use super::error::EvalError;
use super::value::Value;

/// Rendered values longer than this are cut off with a trailing ellipsis.
const MAX_VALUE_LEN: usize = 512;

/// Combined globals/locals mapping at the current debugger position.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    variables: HashMap<String, Value>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a namespace from a JSON snapshot object. Anything that is not
    /// a JSON object yields an empty namespace.
    pub fn from_json(snapshot: &serde_json::Value) -> Self {
        let mut ns = Namespace::new();
        if let serde_json::Value::Object(map) = snapshot {
            for (name, value) in map {
                ns.insert(name.clone(), Value::from_json(value));
            }
        }
        ns
    }

    /// Add or update a variable
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Outcome of evaluating one expression; recomputed every refresh pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvaluationResult {
    Value { text: String },
    Error { kind: String, message: String },
}

/// Capability interface for evaluation strategies. The table model only
/// depends on this trait, so a session-backed evaluator can be substituted
/// without touching the widget.
pub trait Evaluate {
    fn evaluate(&self, expression: &str, namespace: &Namespace) -> EvaluationResult;
}

/// In-process evaluator over parsed watch expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalEvaluator;

impl LocalEvaluator {
    pub fn new() -> Self {
        LocalEvaluator
    }
}

impl Evaluate for LocalEvaluator {
    fn evaluate(&self, expression: &str, namespace: &Namespace) -> EvaluationResult {
        match super::parser::parse_expr(expression).and_then(|ast| eval_expr(&ast, namespace)) {
            Ok(value) => EvaluationResult::Value {
                text: truncate(value.to_string()),
            },
            Err(e) => EvaluationResult::Error {
                kind: e.kind().to_string(),
                message: e.to_string(),
            },
        }
    }
}

fn truncate(text: String) -> String {
    if text.chars().count() <= MAX_VALUE_LEN {
        return text;
    }
    let mut cut: String = text.chars().take(MAX_VALUE_LEN).collect();
    cut.push('…');
    cut
}

/// Evaluate an expression against a namespace
pub fn eval_expr(expr: &Expr, ns: &Namespace) -> Result<Value, EvalError> {
    match expr {
        Expr::Name(name) => ns
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::unknown_name(name)),
        Expr::Literal(lit) => Ok(literal_to_value(lit)),
        Expr::Attr { base, name } => {
            let base = eval_expr(base, ns)?;
            eval_attr(&base, name)
        }
        Expr::Subscript { base, index } => {
            let base = eval_expr(base, ns)?;
            let index = eval_expr(index, ns)?;
            eval_subscript(&base, &index)
        }
        Expr::Binary { left, op, right } => {
            // Logical operators short-circuit and yield the deciding operand.
            if matches!(op, BinOp::And | BinOp::Or) {
                let l = eval_expr(left, ns)?;
                return match (op, l.is_truthy()) {
                    (BinOp::And, false) | (BinOp::Or, true) => Ok(l),
                    _ => eval_expr(right, ns),
                };
            }
            let l = eval_expr(left, ns)?;
            let r = eval_expr(right, ns)?;
            apply_binop(&l, *op, &r)
        }
        Expr::Unary { op, expr } => {
            let v = eval_expr(expr, ns)?;
            apply_unary(*op, &v)
        }
        Expr::Paren(inner) => eval_expr(inner, ns),
    }
}

fn literal_to_value(lit: &Literal) -> Value {
    match lit {
        Literal::Int(v) => Value::Int(*v),
        Literal::Float(v) => Value::Float(*v),
        Literal::Bool(v) => Value::Bool(*v),
        Literal::Str(v) => Value::Str(v.clone()),
    }
}

fn eval_attr(base: &Value, name: &str) -> Result<Value, EvalError> {
    if let Value::Dict(entries) = base {
        if let Some((_, value)) = entries.iter().find(|(key, _)| key == name) {
            return Ok(value.clone());
        }
    }
    Err(EvalError::MissingAttribute {
        type_name: base.type_name().to_string(),
        attribute: name.to_string(),
    })
}

fn eval_subscript(base: &Value, index: &Value) -> Result<Value, EvalError> {
    match base {
        Value::List(items) => {
            let Some(i) = index_as_int(index) else {
                return Err(EvalError::BadIndexType {
                    type_name: "list".to_string(),
                });
            };
            sequence_get(items, i)
                .cloned()
                .ok_or_else(|| EvalError::IndexOutOfRange {
                    type_name: "list".to_string(),
                })
        }
        Value::Str(s) => {
            let Some(i) = index_as_int(index) else {
                return Err(EvalError::BadIndexType {
                    type_name: "string".to_string(),
                });
            };
            let chars: Vec<char> = s.chars().collect();
            sequence_get(&chars, i)
                .map(|c| Value::Str(c.to_string()))
                .ok_or_else(|| EvalError::IndexOutOfRange {
                    type_name: "string".to_string(),
                })
        }
        Value::Dict(entries) => {
            let Value::Str(key) = index else {
                return Err(EvalError::KeyNotFound {
                    key: index.to_string(),
                });
            };
            entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| EvalError::KeyNotFound { key: key.clone() })
        }
        other => Err(EvalError::NotSubscriptable {
            type_name: other.type_name().to_string(),
        }),
    }
}

fn index_as_int(index: &Value) -> Option<i128> {
    match index {
        Value::Int(i) => Some(*i),
        Value::Bool(b) => Some(*b as i128),
        _ => None,
    }
}

/// Index with negative-wrapping semantics.
fn sequence_get<T>(items: &[T], index: i128) -> Option<&T> {
    let len = items.len() as i128;
    let effective = if index < 0 { index + len } else { index };
    if effective < 0 || effective >= len {
        return None;
    }
    items.get(effective as usize)
}

/// Numeric view of a value; booleans coerce to integers.
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i128),
    Float(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }
}

fn as_num(value: &Value) -> Option<Num> {
    match value {
        Value::Int(i) => Some(Num::Int(*i)),
        Value::Float(f) => Some(Num::Float(*f)),
        Value::Bool(b) => Some(Num::Int(*b as i128)),
        _ => None,
    }
}

fn apply_binop(left: &Value, op: BinOp, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => {
            apply_arithmetic(left, op, right)
        }
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            apply_comparison(left, op, right)
        }
        BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor | BinOp::Shl | BinOp::Shr => {
            apply_bitwise(left, op, right)
        }
        // Short-circuit operators are handled before operand evaluation.
        BinOp::And | BinOp::Or => unreachable!("logical operators short-circuit"),
    }
}

fn apply_arithmetic(left: &Value, op: BinOp, right: &Value) -> Result<Value, EvalError> {
    // Concatenation
    if op == BinOp::Add {
        if let (Value::Str(l), Value::Str(r)) = (left, right) {
            return Ok(Value::Str(format!("{}{}", l, r)));
        }
        if let (Value::List(l), Value::List(r)) = (left, right) {
            let mut items = l.clone();
            items.extend(r.iter().cloned());
            return Ok(Value::List(items));
        }
    }

    let (Some(l), Some(r)) = (as_num(left), as_num(right)) else {
        return Err(EvalError::bad_operands(
            op.as_str(),
            left.type_name(),
            right.type_name(),
        ));
    };

    // Division is always true division.
    if op == BinOp::Div {
        return match r {
            Num::Int(0) => Err(EvalError::DivisionByZero),
            Num::Float(f) if f == 0.0 => Err(EvalError::FloatDivisionByZero),
            _ => Ok(Value::Float(l.as_f64() / r.as_f64())),
        };
    }

    if let (Num::Int(l), Num::Int(r)) = (l, r) {
        let result = match op {
            BinOp::Add => l.checked_add(r),
            BinOp::Sub => l.checked_sub(r),
            BinOp::Mul => l.checked_mul(r),
            BinOp::Rem => {
                if r == 0 {
                    return Err(EvalError::ModuloByZero);
                }
                // Remainder follows the divisor's sign. checked_rem covers
                // the MIN % -1 overflow, which yields 0.
                match l.checked_rem(r) {
                    Some(m) if m != 0 && (m < 0) != (r < 0) => Some(m + r),
                    Some(m) => Some(m),
                    None => Some(0),
                }
            }
            _ => unreachable!(),
        };
        return result.map(Value::Int).ok_or(EvalError::Overflow);
    }

    let (l, r) = (l.as_f64(), r.as_f64());
    let result = match op {
        BinOp::Add => l + r,
        BinOp::Sub => l - r,
        BinOp::Mul => l * r,
        BinOp::Rem => {
            if r == 0.0 {
                return Err(EvalError::ModuloByZero);
            }
            ((l % r) + r) % r
        }
        _ => unreachable!(),
    };
    Ok(Value::Float(result))
}

fn apply_comparison(left: &Value, op: BinOp, right: &Value) -> Result<Value, EvalError> {
    if matches!(op, BinOp::Eq | BinOp::Ne) {
        let equal = values_equal(left, right);
        return Ok(Value::Bool(if op == BinOp::Eq { equal } else { !equal }));
    }

    let ordering = if let (Some(l), Some(r)) = (as_num(left), as_num(right)) {
        match (l, r) {
            (Num::Int(l), Num::Int(r)) => Some(l.cmp(&r)),
            _ => l.as_f64().partial_cmp(&r.as_f64()),
        }
    } else if let (Value::Str(l), Value::Str(r)) = (left, right) {
        Some(l.cmp(r))
    } else {
        return Err(EvalError::bad_operands(
            op.as_str(),
            left.type_name(),
            right.type_name(),
        ));
    };

    let Some(ordering) = ordering else {
        // NaN compares false against everything.
        return Ok(Value::Bool(false));
    };

    let result = match op {
        BinOp::Lt => ordering.is_lt(),
        BinOp::Le => ordering.is_le(),
        BinOp::Gt => ordering.is_gt(),
        BinOp::Ge => ordering.is_ge(),
        _ => unreachable!(),
    };
    Ok(Value::Bool(result))
}

/// Structural equality with numeric cross-type coercion (1 == 1.0).
fn values_equal(left: &Value, right: &Value) -> bool {
    if let (Some(l), Some(r)) = (as_num(left), as_num(right)) {
        return match (l, r) {
            (Num::Int(l), Num::Int(r)) => l == r,
            _ => l.as_f64() == r.as_f64(),
        };
    }
    match (left, right) {
        (Value::None, Value::None) => true,
        (Value::Str(l), Value::Str(r)) => l == r,
        (Value::List(l), Value::List(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| values_equal(a, b))
        }
        // Entry order is display order only; equality is key-based.
        (Value::Dict(l), Value::Dict(r)) => {
            l.len() == r.len()
                && l.iter().all(|(lk, lv)| {
                    r.iter()
                        .find(|(rk, _)| rk == lk)
                        .is_some_and(|(_, rv)| values_equal(lv, rv))
                })
        }
        _ => false,
    }
}

fn apply_bitwise(left: &Value, op: BinOp, right: &Value) -> Result<Value, EvalError> {
    let (Some(Num::Int(l)), Some(Num::Int(r))) = (as_num(left), as_num(right)) else {
        return Err(EvalError::bad_operands(
            op.as_str(),
            left.type_name(),
            right.type_name(),
        ));
    };

    let result = match op {
        BinOp::BitAnd => Some(l & r),
        BinOp::BitOr => Some(l | r),
        BinOp::BitXor => Some(l ^ r),
        BinOp::Shl => u32::try_from(r).ok().and_then(|r| l.checked_shl(r)),
        BinOp::Shr => u32::try_from(r).ok().and_then(|r| l.checked_shr(r)),
        _ => unreachable!(),
    };
    result.map(Value::Int).ok_or(EvalError::Overflow)
}

fn apply_unary(op: UnaryOp, value: &Value) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Neg => match as_num(value) {
            Some(Num::Int(i)) => i.checked_neg().map(Value::Int).ok_or(EvalError::Overflow),
            Some(Num::Float(f)) => Ok(Value::Float(-f)),
            None => Err(EvalError::bad_operands("-", value.type_name(), "")),
        },
        UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parser::parse_expr;

    fn eval_str(input: &str, ns: &Namespace) -> Result<Value, EvalError> {
        eval_expr(&parse_expr(input).unwrap(), ns)
    }

    #[test]
    fn test_literal_eval() {
        let ns = Namespace::new();
        assert_eq!(eval_str("42", &ns).unwrap().to_string(), "42");
        assert_eq!(eval_str("true", &ns).unwrap().to_string(), "True");
    }

    #[test]
    fn test_arithmetic() {
        let ns = Namespace::new();
        assert_eq!(eval_str("10 + 5", &ns).unwrap().to_string(), "15");
        assert_eq!(eval_str("10 - 5", &ns).unwrap().to_string(), "5");
        assert_eq!(eval_str("10 * 5", &ns).unwrap().to_string(), "50");
        // True division
        assert_eq!(eval_str("1 / 2", &ns).unwrap().to_string(), "0.5");
    }

    #[test]
    fn test_variable_lookup() {
        let mut ns = Namespace::new();
        ns.insert("x", Value::Int(42));
        assert_eq!(eval_str("x", &ns).unwrap().to_string(), "42");
        assert_eq!(eval_str("x + 1", &ns).unwrap().to_string(), "43");
    }

    #[test]
    fn test_unknown_variable() {
        let ns = Namespace::new();
        let err = eval_str("missing", &ns).unwrap_err();
        assert_eq!(err.kind(), "NameError");
        assert_eq!(err.to_string(), "name 'missing' is not defined");
    }

    #[test]
    fn test_division_by_zero() {
        let ns = Namespace::new();
        let err = eval_str("1 / 0", &ns).unwrap_err();
        assert_eq!(err, EvalError::DivisionByZero);
        assert_eq!(err.kind(), "ZeroDivisionError");
        assert_eq!(err.to_string(), "division by zero");
    }

    #[test]
    fn test_modulo_follows_divisor_sign() {
        let ns = Namespace::new();
        assert_eq!(eval_str("-7 % 3", &ns).unwrap().to_string(), "2");
        assert_eq!(eval_str("7 % -3", &ns).unwrap().to_string(), "-2");
    }

    #[test]
    fn test_modulo_at_integer_minimum() {
        let mut ns = Namespace::new();
        ns.insert("m", Value::Int(i128::MIN));
        assert_eq!(eval_str("m % (0 - 1)", &ns).unwrap().to_string(), "0");
        assert_eq!(
            eval_str("m % 0", &ns).unwrap_err().kind(),
            "ZeroDivisionError"
        );
    }

    #[test]
    fn test_string_concat_and_mismatch() {
        let mut ns = Namespace::new();
        ns.insert("s", Value::Str("ab".to_string()));
        assert_eq!(eval_str("s + 'c'", &ns).unwrap().to_string(), "abc");

        let err = eval_str("s + 1", &ns).unwrap_err();
        assert_eq!(err.kind(), "TypeError");
    }

    #[test]
    fn test_negative_index() {
        let mut ns = Namespace::new();
        ns.insert(
            "xs",
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
        );
        assert_eq!(eval_str("xs[-1]", &ns).unwrap().to_string(), "3");
        assert_eq!(
            eval_str("xs[3]", &ns).unwrap_err().kind(),
            "IndexError"
        );
    }

    #[test]
    fn test_dict_attr_and_key() {
        let mut ns = Namespace::new();
        ns.insert(
            "obj",
            Value::Dict(vec![("field".to_string(), Value::Int(7))]),
        );
        assert_eq!(eval_str("obj.field", &ns).unwrap().to_string(), "7");
        assert_eq!(eval_str("obj[\"field\"]", &ns).unwrap().to_string(), "7");
        assert_eq!(
            eval_str("obj.other", &ns).unwrap_err().kind(),
            "AttributeError"
        );
        assert_eq!(
            eval_str("obj[\"other\"]", &ns).unwrap_err().kind(),
            "KeyError"
        );
    }

    #[test]
    fn test_logical_short_circuit() {
        let mut ns = Namespace::new();
        ns.insert("zero", Value::Int(0));
        // Right side would be a NameError but must not be evaluated.
        assert_eq!(eval_str("zero && missing", &ns).unwrap().to_string(), "0");
        assert_eq!(eval_str("1 || missing", &ns).unwrap().to_string(), "1");
    }

    #[test]
    fn test_dict_equality_ignores_entry_order() {
        let mut ns = Namespace::new();
        ns.insert(
            "d1",
            Value::Dict(vec![
                ("a".to_string(), Value::Int(1)),
                ("b".to_string(), Value::Int(2)),
            ]),
        );
        ns.insert(
            "d2",
            Value::Dict(vec![
                ("b".to_string(), Value::Int(2)),
                ("a".to_string(), Value::Int(1)),
            ]),
        );
        ns.insert(
            "d3",
            Value::Dict(vec![
                ("a".to_string(), Value::Int(1)),
                ("b".to_string(), Value::Int(9)),
            ]),
        );
        assert_eq!(eval_str("d1 == d2", &ns).unwrap().to_string(), "True");
        assert_eq!(eval_str("d1 == d3", &ns).unwrap().to_string(), "False");
    }

    #[test]
    fn test_mixed_numeric_comparison() {
        let ns = Namespace::new();
        assert_eq!(eval_str("1 == 1.0", &ns).unwrap().to_string(), "True");
        assert_eq!(eval_str("2 > 1.5", &ns).unwrap().to_string(), "True");
    }

    #[test]
    fn test_local_evaluator_isolates_failures() {
        let evaluator = LocalEvaluator::new();
        let ns = Namespace::new();

        let result = evaluator.evaluate("1/0", &ns);
        assert_eq!(
            result,
            EvaluationResult::Error {
                kind: "ZeroDivisionError".to_string(),
                message: "division by zero".to_string(),
            }
        );

        let result = evaluator.evaluate("not an expression @@@", &ns);
        assert!(matches!(result, EvaluationResult::Error { kind, .. } if kind == "SyntaxError"));
    }

    #[test]
    fn test_long_values_truncate() {
        let evaluator = LocalEvaluator::new();
        let mut ns = Namespace::new();
        ns.insert("long", Value::Str("x".repeat(600)));

        let EvaluationResult::Value { text } = evaluator.evaluate("long", &ns) else {
            panic!("expected a value");
        };
        assert_eq!(text.chars().count(), MAX_VALUE_LEN + 1);
        assert!(text.ends_with('…'));
    }
}
