//! Binary and relational operators over arbitrary values

use core_types::{number, Value};

use crate::coercion::PreferredType;
use crate::error::VmResult;
use crate::vm::Vm;

/// Numeric binary operators, all of which coerce both sides with ToNumber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericOp {
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `>>>`
    UShr,
}

impl NumericOp {
    fn apply(self, x: f64, y: f64) -> f64 {
        match self {
            NumericOp::Sub => number::subtract(x, y),
            NumericOp::Mul => number::multiply(x, y),
            NumericOp::Div => number::divide(x, y),
            NumericOp::Mod => number::remainder(x, y),
            NumericOp::BitAnd => number::bitwise_and(x, y),
            NumericOp::BitOr => number::bitwise_or(x, y),
            NumericOp::BitXor => number::bitwise_xor(x, y),
            NumericOp::Shl => number::left_shift(x, y),
            NumericOp::Shr => number::signed_right_shift(x, y),
            NumericOp::UShr => number::unsigned_right_shift(x, y),
        }
    }
}

/// Relational operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
}

impl Vm {
    /// `a + b`: string concatenation if either primitive is a string,
    /// numeric addition otherwise.
    pub fn add_values(&mut self, a: &Value, b: &Value) -> VmResult<Value> {
        let lprim = self.to_primitive(a, PreferredType::Default)?;
        let rprim = self.with_rooted(std::slice::from_ref(&lprim), |vm| vm.to_primitive(b, PreferredType::Default))?;
        if matches!(lprim, Value::String(_)) || matches!(rprim, Value::String(_)) {
            let lstr = self.to_js_string(&lprim)?;
            let rstr = self.to_js_string(&rprim)?;
            return Ok(Value::String(lstr.concat(&rstr)));
        }
        let x = self.to_number(&lprim)?;
        let y = self.to_number(&rprim)?;
        Ok(Value::Number(number::add(x, y)))
    }

    /// Any operator in [`NumericOp`]. The left operand is coerced first.
    pub fn numeric_binary(&mut self, op: NumericOp, a: &Value, b: &Value) -> VmResult<Value> {
        let x = self.to_number(a)?;
        let y = self.to_number(b)?;
        Ok(Value::Number(op.apply(x, y)))
    }

    /// Loose equality (`==`).
    pub fn loose_equals(&mut self, a: &Value, b: &Value) -> VmResult<bool> {
        if std::mem::discriminant(a) == std::mem::discriminant(b) {
            return Ok(a.strict_equals(b));
        }
        match (a, b) {
            (x, y) if x.is_nullish() && y.is_nullish() => Ok(true),
            (Value::Number(x), Value::String(s)) => Ok(number::equal(*x, number::parse_js_number(s))),
            (Value::String(s), Value::Number(y)) => Ok(number::equal(number::parse_js_number(s), *y)),
            (Value::Boolean(x), _) => {
                let x = Value::Number(if *x { 1.0 } else { 0.0 });
                self.loose_equals(&x, b)
            }
            (_, Value::Boolean(y)) => {
                let y = Value::Number(if *y { 1.0 } else { 0.0 });
                self.loose_equals(a, &y)
            }
            (Value::Object(_) | Value::Function(_), Value::String(_) | Value::Number(_) | Value::Symbol(_)) => {
                let x = self.to_primitive(a, PreferredType::Default)?;
                self.with_rooted(std::slice::from_ref(&x), |vm| vm.loose_equals(&x, b))
            }
            (Value::String(_) | Value::Number(_) | Value::Symbol(_), Value::Object(_) | Value::Function(_)) => {
                let y = self.to_primitive(b, PreferredType::Default)?;
                self.with_rooted(std::slice::from_ref(&y), |vm| vm.loose_equals(a, &y))
            }
            _ => Ok(false),
        }
    }

    /// IsLessThan. `None` means undefined (a NaN was involved).
    fn less_than(&mut self, x: &Value, y: &Value, left_first: bool) -> VmResult<Option<bool>> {
        let (px, py) = if left_first {
            let px = self.to_primitive(x, PreferredType::Number)?;
            let py = self.with_rooted(std::slice::from_ref(&px), |vm| vm.to_primitive(y, PreferredType::Number))?;
            (px, py)
        } else {
            let py = self.to_primitive(y, PreferredType::Number)?;
            let px = self.with_rooted(std::slice::from_ref(&py), |vm| vm.to_primitive(x, PreferredType::Number))?;
            (px, py)
        };
        if let (Value::String(a), Value::String(b)) = (&px, &py) {
            return Ok(Some(a.compare_code_units(b).is_lt()));
        }
        let (nx, ny) = if left_first {
            let nx = self.to_number(&px)?;
            (nx, self.to_number(&py)?)
        } else {
            let ny = self.to_number(&py)?;
            (self.to_number(&px)?, ny)
        };
        Ok(number::less_than(nx, ny))
    }

    /// Any operator in [`Relation`]. Comparisons involving NaN are false.
    pub fn compare(&mut self, relation: Relation, a: &Value, b: &Value) -> VmResult<bool> {
        Ok(match relation {
            Relation::Less => self.less_than(a, b, true)? == Some(true),
            Relation::Greater => self.less_than(b, a, false)? == Some(true),
            Relation::LessEqual => self.less_than(b, a, false)? == Some(false),
            Relation::GreaterEqual => self.less_than(a, b, true)? == Some(false),
        })
    }

    /// `-a`
    pub fn negate(&mut self, a: &Value) -> VmResult<Value> {
        Ok(Value::Number(number::unary_minus(self.to_number(a)?)))
    }

    /// `~a`
    pub fn bitwise_not(&mut self, a: &Value) -> VmResult<Value> {
        Ok(Value::Number(number::bitwise_not(self.to_number(a)?)))
    }
}
