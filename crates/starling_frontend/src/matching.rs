//! Constant evaluation and pattern matching over constant values.
//!
//! This gives patterns a meaning that can be checked without a type checker:
//! `[head, tail @ ..]` against `[1, 2, 3]` binds `head` to `1` and `tail`
//! to `[2, 3]`.

use starling_interner::Istr;

use crate::ast::*;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i128),
    Float(f64),
    Bool(bool),
    Char(char),
    String(Istr),
    Tuple(Vec<Value>),
    List(Vec<Value>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("expression is not a constant")]
    NotConstant,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("division by zero")]
    DivisionByZero,

    #[error("mismatched operand types")]
    TypeMismatch,
}

pub type Bindings = Vec<(Istr, Value)>;

pub fn eval_const(expr: &Expr) -> Result<Value, EvalError> {
    match &expr.kind {
        ExprKind::Literal(lit) => Ok(literal_value(*lit, false)),

        ExprKind::Parenthesized(inner) => eval_const(inner),

        ExprKind::Tuple(elems) => elems
            .iter()
            .map(eval_const)
            .collect::<Result<_, _>>()
            .map(Value::Tuple),

        ExprKind::List(elems) => elems
            .iter()
            .map(eval_const)
            .collect::<Result<_, _>>()
            .map(Value::List),

        ExprKind::Prefix { op, expr } => match (op, eval_const(expr)?) {
            (PrefixOp::Neg, Value::Integer(n)) => {
                n.checked_neg().map(Value::Integer).ok_or(EvalError::Overflow)
            }
            (PrefixOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
            (PrefixOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
            (PrefixOp::BitNot, Value::Integer(n)) => Ok(Value::Integer(!n)),
            (PrefixOp::PreIncrement | PrefixOp::PreDecrement, _) => Err(EvalError::NotConstant),
            _ => Err(EvalError::TypeMismatch),
        },

        ExprKind::Binary { op, lhs, rhs } => eval_binary(*op, eval_const(lhs)?, eval_const(rhs)?),

        ExprKind::If { cond, then, else_ } => match eval_const(cond)? {
            Value::Bool(true) => eval_block(then),
            Value::Bool(false) => match else_ {
                Some(else_) => eval_const(else_),
                None => Ok(Value::Tuple(vec![])),
            },
            _ => Err(EvalError::TypeMismatch),
        },

        ExprKind::Block(block) => eval_block(block),

        _ => Err(EvalError::NotConstant),
    }
}

/// A block of only a tail expression, or an empty block.
fn eval_block(block: &Block) -> Result<Value, EvalError> {
    match (block.stmts.len(), block.tail()) {
        (0, _) => Ok(Value::Tuple(vec![])),
        (1, Some(tail)) => eval_const(tail),
        _ => Err(EvalError::NotConstant),
    }
}

fn eval_binary(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    use Value::*;

    let value = match (lhs, rhs) {
        (Integer(a), Integer(b)) => match op {
            BinOp::Add => Integer(a.checked_add(b).ok_or(EvalError::Overflow)?),
            BinOp::Sub => Integer(a.checked_sub(b).ok_or(EvalError::Overflow)?),
            BinOp::Mul => Integer(a.checked_mul(b).ok_or(EvalError::Overflow)?),
            BinOp::Div | BinOp::Mod if b == 0 => return Err(EvalError::DivisionByZero),
            BinOp::Div => Integer(a.checked_div(b).ok_or(EvalError::Overflow)?),
            BinOp::Mod => Integer(a.checked_rem(b).ok_or(EvalError::Overflow)?),
            BinOp::Pow => {
                let exp = u32::try_from(b).map_err(|_| EvalError::Overflow)?;
                Integer(a.checked_pow(exp).ok_or(EvalError::Overflow)?)
            }

            BinOp::BitAnd => Integer(a & b),
            BinOp::BitOr => Integer(a | b),
            BinOp::BitXor => Integer(a ^ b),
            BinOp::Shl | BinOp::Shr => {
                let shift = u32::try_from(b).map_err(|_| EvalError::Overflow)?;
                let shifted = match op {
                    BinOp::Shl => a.checked_shl(shift),
                    _ => a.checked_shr(shift),
                };
                Integer(shifted.ok_or(EvalError::Overflow)?)
            }

            _ => return compare(op, &Integer(a), &Integer(b)),
        },

        (Float(a), Float(b)) => match op {
            BinOp::Add => Float(a + b),
            BinOp::Sub => Float(a - b),
            BinOp::Mul => Float(a * b),
            BinOp::Div => Float(a / b),
            BinOp::Mod => Float(a % b),
            BinOp::Pow => Float(a.powf(b)),
            _ => return compare(op, &Float(a), &Float(b)),
        },

        (Bool(a), Bool(b)) => match op {
            BinOp::And => Bool(a && b),
            BinOp::Or => Bool(a || b),
            BinOp::BitAnd => Bool(a & b),
            BinOp::BitOr => Bool(a | b),
            BinOp::BitXor => Bool(a ^ b),
            _ => return compare(op, &Bool(a), &Bool(b)),
        },

        (lhs, rhs) => return compare(op, &lhs, &rhs),
    };

    Ok(value)
}

fn compare(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    if std::mem::discriminant(lhs) != std::mem::discriminant(rhs) {
        return Err(EvalError::TypeMismatch);
    }

    let ordering = match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => a.partial_cmp(b),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
        (Value::Char(a), Value::Char(b)) => a.partial_cmp(b),
        _ => None,
    };

    let result = match op {
        BinOp::Eq => lhs == rhs,
        BinOp::NotEq => lhs != rhs,
        BinOp::Lt => ordering.ok_or(EvalError::TypeMismatch)?.is_lt(),
        BinOp::LtEq => ordering.ok_or(EvalError::TypeMismatch)?.is_le(),
        BinOp::Gt => ordering.ok_or(EvalError::TypeMismatch)?.is_gt(),
        BinOp::GtEq => ordering.ok_or(EvalError::TypeMismatch)?.is_ge(),
        _ => return Err(EvalError::TypeMismatch),
    };

    Ok(Value::Bool(result))
}

fn literal_value(lit: Literal, negative: bool) -> Value {
    match lit {
        Literal::Integer(n) if negative => Value::Integer(-i128::from(n)),
        Literal::Integer(n) => Value::Integer(i128::from(n)),
        Literal::Float(f) if negative => Value::Float(-f.get()),
        Literal::Float(f) => Value::Float(f.get()),
        Literal::Char(c) => Value::Char(c),
        Literal::String(s) => Value::String(s),
        Literal::Bool(b) => Value::Bool(b),
    }
}

/// Match `value` against `pattern`, returning the bindings in the order they
/// appear in the pattern. Nominal patterns (structs, tuple-likes and paths)
/// never match a constant.
pub fn match_pattern(pattern: &Pattern, value: &Value) -> Option<Bindings> {
    let mut bindings = vec![];
    match_into(pattern, value, &mut bindings).then_some(bindings)
}

fn match_into(pattern: &Pattern, value: &Value, bindings: &mut Bindings) -> bool {
    match (&pattern.kind, value) {
        (PatternKind::Wildcard | PatternKind::Rest, _) => true,

        (PatternKind::Identifier { name, sub }, _) => {
            if let Some(sub) = sub {
                if !match_into(sub, value, bindings) {
                    return false;
                }
            }

            bindings.push((name.name, value.clone()));
            true
        }

        (PatternKind::Literal { lit, negative }, _) => literal_value(*lit, *negative) == *value,

        (PatternKind::Grouped(inner), _) => match_into(inner, value, bindings),

        (PatternKind::Or(alternatives), _) => alternatives.iter().any(|alternative| {
            let mut alternative_bindings = vec![];
            let matched = match_into(alternative, value, &mut alternative_bindings);
            if matched {
                bindings.append(&mut alternative_bindings);
            }
            matched
        }),

        (PatternKind::Tuple(patterns), Value::Tuple(values)) => {
            match_sequence(patterns, values, Value::Tuple, bindings)
        }

        (PatternKind::List(patterns), Value::List(values)) => {
            match_sequence(patterns, values, Value::List, bindings)
        }

        _ => false,
    }
}

/// Element-wise match with at most one rest pattern, which takes whatever
/// the patterns either side of it leave over.
fn match_sequence(
    patterns: &[Pattern],
    values: &[Value],
    rebuild: fn(Vec<Value>) -> Value,
    bindings: &mut Bindings,
) -> bool {
    let Some(rest_index) = patterns.iter().position(Pattern::is_rest) else {
        return patterns.len() == values.len()
            && patterns
                .iter()
                .zip(values)
                .all(|(pattern, value)| match_into(pattern, value, bindings));
    };

    let before = &patterns[..rest_index];
    let after = &patterns[rest_index + 1..];

    if values.len() < before.len() + after.len() {
        return false;
    }

    let rest_end = values.len() - after.len();

    if !before
        .iter()
        .zip(&values[..rest_index])
        .all(|(pattern, value)| match_into(pattern, value, bindings))
    {
        return false;
    }

    if let PatternKind::Identifier { name, .. } = &patterns[rest_index].kind {
        let rest = rebuild(values[rest_index..rest_end].to_vec());
        bindings.push((name.name, rest));
    }

    after
        .iter()
        .zip(&values[rest_end..])
        .all(|(pattern, value)| match_into(pattern, value, bindings))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use starling_interner::Interner;

    use super::*;

    fn value(source: &str, interner: &Interner) -> Value {
        let (expr, errors) = crate::parse_expr(source, interner);
        assert_eq!(errors, vec![]);
        eval_const(&expr).unwrap()
    }

    fn matches(pattern: &str, expr: &str) -> Option<Vec<(String, Value)>> {
        let interner = Interner::new();

        let (pattern, errors) = crate::parse_pattern(pattern, &interner);
        assert_eq!(errors, vec![]);

        let value = value(expr, &interner);

        match_pattern(&pattern, &value).map(|bindings| {
            bindings
                .into_iter()
                .map(|(name, value)| (interner[name].to_owned(), value))
                .collect()
        })
    }

    #[test]
    fn head_and_tail() {
        assert_eq!(
            matches("[head, tail @ ..]", "[1, 2, 3]"),
            Some(vec![
                ("head".to_owned(), Value::Integer(1)),
                (
                    "tail".to_owned(),
                    Value::List(vec![Value::Integer(2), Value::Integer(3)])
                ),
            ])
        );

        assert_eq!(matches("[head, tail @ ..]", "[]"), None);
        assert_eq!(
            matches("[.., last]", "[1, 2, 3]"),
            Some(vec![("last".to_owned(), Value::Integer(3))])
        );
    }

    #[test]
    fn literals_and_alternatives() {
        assert_eq!(matches("-1", "0 - 1"), Some(vec![]));
        assert_eq!(matches("1 | 2", "2"), Some(vec![]));
        assert_eq!(matches("1 | 2", "3"), None);
        assert_eq!(matches("'a'", "'a'"), Some(vec![]));
        assert_eq!(
            matches("(x, _, true)", "(1 + 2 * 3, 'c', 1 < 2)"),
            Some(vec![("x".to_owned(), Value::Integer(7))])
        );
        assert_eq!(matches("(a, b)", "(1, 2, 3)"), None);
        assert_eq!(matches("Some(x)", "1"), None);
    }

    #[test]
    fn const_eval() {
        let interner = Interner::new();

        assert_eq!(value("2 ** 3 ** 2", &interner), Value::Integer(512));
        assert_eq!(value("(2 + 3) * 4", &interner), Value::Integer(20));
        assert_eq!(value("!(1 == 2) && true", &interner), Value::Bool(true));
        assert_eq!(value("if 1 < 2 { 10 } else { 20 }", &interner), Value::Integer(10));
        assert_eq!(
            value("-9223372036854775808", &interner),
            Value::Integer(i128::from(i64::MIN))
        );

        let (expr, _) = crate::parse_expr("1 / 0", &interner);
        assert_eq!(eval_const(&expr), Err(EvalError::DivisionByZero));

        let (expr, _) = crate::parse_expr("x + 1", &interner);
        assert_eq!(eval_const(&expr), Err(EvalError::NotConstant));
    }
}
