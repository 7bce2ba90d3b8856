//! Expression parser using syn
//!
//! Converts watch expression strings to our AST. Anything syn cannot parse
//! is a syntax error; parseable forms the evaluator has no semantics for
//! are reported as unsupported.

use syn::{
    Expr as SynExpr, ExprBinary, ExprField, ExprIndex, ExprLit, ExprParen, ExprPath, ExprUnary,
};

use super::ast::{BinOp, Expr, Literal, UnaryOp};
use super::error::EvalError;

/// Parse an expression string into our AST
pub fn parse_expr(input: &str) -> Result<Expr, EvalError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(EvalError::syntax("empty expression"));
    }

    let syn_expr: SynExpr =
        syn::parse_str(trimmed).map_err(|e| EvalError::syntax(e.to_string()))?;

    convert_expr(&syn_expr)
}

/// Convert syn expression to our AST
fn convert_expr(expr: &SynExpr) -> Result<Expr, EvalError> {
    match expr {
        // Binary operations: a + b
        SynExpr::Binary(ExprBinary {
            left, op, right, ..
        }) => {
            let bin_op = convert_binop(op)?;
            Ok(Expr::Binary {
                left: Box::new(convert_expr(left)?),
                op: bin_op,
                right: Box::new(convert_expr(right)?),
            })
        }

        // Unary operations: -a, !b
        SynExpr::Unary(ExprUnary { op, expr, .. }) => {
            let unary_op = convert_unary_op(op)?;
            Ok(Expr::Unary {
                op: unary_op,
                expr: Box::new(convert_expr(expr)?),
            })
        }

        // Literals: 42, 3.14, true, "hello"
        SynExpr::Lit(ExprLit { lit, .. }) => {
            let literal = convert_literal(lit)?;
            Ok(Expr::Literal(literal))
        }

        // Variable reference: a
        SynExpr::Path(ExprPath { path, .. }) => {
            if let Some(ident) = path.get_ident() {
                Ok(Expr::Name(ident.to_string()))
            } else {
                Err(EvalError::unsupported("qualified paths"))
            }
        }

        // Attribute access: a.b (and numeric members: a.0 as a subscript)
        SynExpr::Field(ExprField { base, member, .. }) => {
            let base = Box::new(convert_expr(base)?);
            match member {
                syn::Member::Named(ident) => Ok(Expr::Attr {
                    base,
                    name: ident.to_string(),
                }),
                syn::Member::Unnamed(index) => Ok(Expr::Subscript {
                    base,
                    index: Box::new(Expr::Literal(Literal::Int(index.index as i128))),
                }),
            }
        }

        // Subscript: a[0], a["key"], a[i], a[-1]
        SynExpr::Index(ExprIndex { expr, index, .. }) => Ok(Expr::Subscript {
            base: Box::new(convert_expr(expr)?),
            index: Box::new(convert_expr(index)?),
        }),

        // Parenthesized: (a + b)
        SynExpr::Paren(ExprParen { expr, .. }) => Ok(Expr::Paren(Box::new(convert_expr(expr)?))),

        // Function calls - not supported locally
        SynExpr::Call(_) => Err(EvalError::unsupported("function calls")),

        // Method calls - not supported locally
        SynExpr::MethodCall(_) => Err(EvalError::unsupported("method calls")),

        // Other parseable-but-meaningless forms
        other => {
            let debug_str = format!("{:?}", other);
            let kind = debug_str.split('(').next().unwrap_or("unknown").to_string();
            Err(EvalError::unsupported(kind))
        }
    }
}

/// Convert syn binary operator to our BinOp
fn convert_binop(op: &syn::BinOp) -> Result<BinOp, EvalError> {
    match op {
        syn::BinOp::Add(_) => Ok(BinOp::Add),
        syn::BinOp::Sub(_) => Ok(BinOp::Sub),
        syn::BinOp::Mul(_) => Ok(BinOp::Mul),
        syn::BinOp::Div(_) => Ok(BinOp::Div),
        syn::BinOp::Rem(_) => Ok(BinOp::Rem),
        syn::BinOp::Eq(_) => Ok(BinOp::Eq),
        syn::BinOp::Ne(_) => Ok(BinOp::Ne),
        syn::BinOp::Lt(_) => Ok(BinOp::Lt),
        syn::BinOp::Le(_) => Ok(BinOp::Le),
        syn::BinOp::Gt(_) => Ok(BinOp::Gt),
        syn::BinOp::Ge(_) => Ok(BinOp::Ge),
        syn::BinOp::And(_) => Ok(BinOp::And),
        syn::BinOp::Or(_) => Ok(BinOp::Or),
        syn::BinOp::BitAnd(_) => Ok(BinOp::BitAnd),
        syn::BinOp::BitOr(_) => Ok(BinOp::BitOr),
        syn::BinOp::BitXor(_) => Ok(BinOp::BitXor),
        syn::BinOp::Shl(_) => Ok(BinOp::Shl),
        syn::BinOp::Shr(_) => Ok(BinOp::Shr),
        _ => Err(EvalError::unsupported("assignment operators")),
    }
}

/// Convert syn unary operator to our UnaryOp
fn convert_unary_op(op: &syn::UnOp) -> Result<UnaryOp, EvalError> {
    match op {
        syn::UnOp::Neg(_) => Ok(UnaryOp::Neg),
        syn::UnOp::Not(_) => Ok(UnaryOp::Not),
        _ => Err(EvalError::unsupported("dereference operators")),
    }
}

/// Convert syn literal to our Literal
fn convert_literal(lit: &syn::Lit) -> Result<Literal, EvalError> {
    match lit {
        syn::Lit::Int(i) => {
            let value = i
                .base10_parse::<i128>()
                .map_err(|e| EvalError::syntax(e.to_string()))?;
            Ok(Literal::Int(value))
        }
        syn::Lit::Float(f) => {
            let value = f
                .base10_parse::<f64>()
                .map_err(|e| EvalError::syntax(e.to_string()))?;
            Ok(Literal::Float(value))
        }
        syn::Lit::Bool(b) => Ok(Literal::Bool(b.value)),
        // Single-quoted one-character strings parse as char literals
        syn::Lit::Char(c) => Ok(Literal::Str(c.value().to_string())),
        syn::Lit::Str(s) => Ok(Literal::Str(s.value())),
        _ => Err(EvalError::unsupported("byte literals")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name() {
        let expr = parse_expr("foo").unwrap();
        assert!(matches!(expr, Expr::Name(name) if name == "foo"));
    }

    #[test]
    fn test_parse_attr_access() {
        let expr = parse_expr("foo.bar").unwrap();
        let Expr::Attr { base, name } = expr else {
            panic!("expected Attr");
        };
        assert!(matches!(*base, Expr::Name(_)));
        assert_eq!(name, "bar");
    }

    #[test]
    fn test_parse_binary() {
        let expr = parse_expr("a + b").unwrap();
        assert!(matches!(expr, Expr::Binary { op: BinOp::Add, .. }));
    }

    #[test]
    fn test_parse_literal() {
        let expr = parse_expr("42").unwrap();
        assert!(matches!(expr, Expr::Literal(Literal::Int(42))));
    }

    #[test]
    fn test_parse_negative_subscript() {
        let expr = parse_expr("xs[-1]").unwrap();
        let Expr::Subscript { index, .. } = expr else {
            panic!("expected Subscript");
        };
        assert!(matches!(*index, Expr::Unary { op: UnaryOp::Neg, .. }));
    }

    #[test]
    fn test_empty_is_syntax_error() {
        let result = parse_expr("   ");
        assert!(matches!(result, Err(EvalError::Syntax { .. })));
    }

    #[test]
    fn test_unsupported_function_call() {
        let result = parse_expr("foo()");
        assert!(matches!(result, Err(EvalError::Unsupported { .. })));
    }

    #[test]
    fn test_unsupported_method_call() {
        let result = parse_expr("a.len()");
        assert!(matches!(result, Err(EvalError::Unsupported { .. })));
    }
}
