use std::fmt;

use crate::ast::BinaryOp;

/// Semantic type of an expression or binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    Float,
    Str,
    Bool,
    Void,
    Any,
    Range,
    Array(Box<Type>, Option<usize>),
    Struct(String),
    Function(Vec<Type>, Box<Type>),
    Unknown,
}

impl Type {
    /// Resolve a written annotation such as `int`, `float[]`, or `string[4]`.
    /// Capitalized names resolve to struct types.
    pub fn from_name(name: &str) -> Option<Type> {
        if let Some(open) = name.find('[') {
            if !name.ends_with(']') {
                return None;
            }
            let element = Type::from_name(&name[..open])?;
            let size_text = &name[open + 1..name.len() - 1];
            let size = if size_text.is_empty() {
                None
            } else {
                Some(size_text.parse().ok()?)
            };
            return Some(Type::Array(Box::new(element), size));
        }
        let ty = match name {
            "int" => Type::Int,
            "float" => Type::Float,
            "string" => Type::Str,
            "bool" => Type::Bool,
            "void" => Type::Void,
            "any" => Type::Any,
            other if other.chars().next().is_some_and(|ch| ch.is_uppercase()) => {
                Type::Struct(other.to_string())
            }
            _ => return None,
        };
        Some(ty)
    }

    /// Whether a value of `self` can flow into a slot of type `target`.
    /// `int` widens to `float`; `any` accepts and supplies everything.
    pub fn is_compatible_with(&self, target: &Type) -> bool {
        match (self, target) {
            (a, b) if a == b => true,
            (Type::Any, _) | (_, Type::Any) => true,
            (Type::Unknown, _) | (_, Type::Unknown) => true,
            (Type::Int, Type::Float) => true,
            (Type::Array(a, n), Type::Array(b, m)) => {
                a.is_compatible_with(b) && (m.is_none() || n == m)
            }
            (Type::Function(params_a, ret_a), Type::Function(params_b, ret_b)) => {
                params_a.len() == params_b.len()
                    && params_a
                        .iter()
                        .zip(params_b)
                        .all(|(a, b)| a.is_compatible_with(b))
                    && ret_a.is_compatible_with(ret_b)
            }
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float | Type::Any | Type::Unknown)
    }

    /// Result type of an arithmetic operation, or a message describing
    /// why the operands do not combine.
    pub fn arithmetic(op: BinaryOp, left: &Type, right: &Type) -> Result<Type, String> {
        if matches!(left, Type::Unknown) || matches!(right, Type::Unknown) {
            return Ok(Type::Unknown);
        }
        if matches!(left, Type::Any) || matches!(right, Type::Any) {
            return Ok(Type::Any);
        }
        match (op, left, right) {
            (BinaryOp::Add, Type::Str, Type::Str) => Ok(Type::Str),
            (_, Type::Int, Type::Int) => Ok(Type::Int),
            (_, Type::Int | Type::Float, Type::Int | Type::Float) => Ok(Type::Float),
            _ => Err(format!(
                "cannot apply `{}` to `{left}` and `{right}`",
                op_symbol(op)
            )),
        }
    }

    /// Validity of a comparison; equality needs compatible operands,
    /// ordering needs numerics or two strings.
    pub fn comparison(op: BinaryOp, left: &Type, right: &Type) -> Result<Type, String> {
        let valid = match op {
            BinaryOp::Equal | BinaryOp::NotEqual => {
                left.is_compatible_with(right) || right.is_compatible_with(left)
            }
            _ => {
                (left.is_numeric() && right.is_numeric())
                    || matches!(
                        (left, right),
                        (Type::Str, Type::Str) | (Type::Any, _) | (_, Type::Any)
                    )
            }
        };
        if valid {
            Ok(Type::Bool)
        } else {
            Err(format!(
                "cannot compare `{left}` and `{right}` with `{}`",
                op_symbol(op)
            ))
        }
    }

    /// Element type yielded when iterating a value of this type.
    pub fn element(&self) -> Option<Type> {
        match self {
            Type::Range => Some(Type::Int),
            Type::Array(element, _) => Some((**element).clone()),
            Type::Str => Some(Type::Str),
            Type::Any | Type::Unknown => Some(Type::Any),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Str => write!(f, "string"),
            Type::Bool => write!(f, "bool"),
            Type::Void => write!(f, "void"),
            Type::Any => write!(f, "any"),
            Type::Range => write!(f, "range"),
            Type::Array(element, Some(size)) => write!(f, "{element}[{size}]"),
            Type::Array(element, None) => write!(f, "{element}[]"),
            Type::Struct(name) => write!(f, "{name}"),
            Type::Function(params, ret) => {
                write!(f, "fn(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") -> {ret}")
            }
            Type::Unknown => write!(f, "unknown"),
        }
    }
}

fn op_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Pow => "^",
        BinaryOp::Equal => "==",
        BinaryOp::NotEqual => "!=",
        BinaryOp::Less => "<",
        BinaryOp::LessEqual => "<=",
        BinaryOp::Greater => ">",
        BinaryOp::GreaterEqual => ">=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_parsing() {
        assert_eq!(Type::from_name("int"), Some(Type::Int));
        assert_eq!(
            Type::from_name("float[]"),
            Some(Type::Array(Box::new(Type::Float), None))
        );
        assert_eq!(
            Type::from_name("string[4]"),
            Some(Type::Array(Box::new(Type::Str), Some(4)))
        );
        assert_eq!(
            Type::from_name("Point"),
            Some(Type::Struct("Point".into()))
        );
        assert_eq!(Type::from_name("whatever"), None);
    }

    #[test]
    fn int_widens_to_float() {
        assert!(Type::Int.is_compatible_with(&Type::Float));
        assert!(!Type::Float.is_compatible_with(&Type::Int));
    }

    #[test]
    fn arithmetic_rules() {
        assert_eq!(
            Type::arithmetic(BinaryOp::Add, &Type::Int, &Type::Int),
            Ok(Type::Int)
        );
        assert_eq!(
            Type::arithmetic(BinaryOp::Mul, &Type::Int, &Type::Float),
            Ok(Type::Float)
        );
        assert_eq!(
            Type::arithmetic(BinaryOp::Add, &Type::Str, &Type::Str),
            Ok(Type::Str)
        );
        assert!(Type::arithmetic(BinaryOp::Sub, &Type::Str, &Type::Str).is_err());
        assert!(Type::arithmetic(BinaryOp::Add, &Type::Bool, &Type::Int).is_err());
    }

    #[test]
    fn comparison_rules() {
        assert_eq!(
            Type::comparison(BinaryOp::Less, &Type::Int, &Type::Float),
            Ok(Type::Bool)
        );
        assert_eq!(
            Type::comparison(BinaryOp::Equal, &Type::Str, &Type::Str),
            Ok(Type::Bool)
        );
        assert!(Type::comparison(BinaryOp::Less, &Type::Bool, &Type::Bool).is_err());
        assert!(Type::comparison(BinaryOp::Equal, &Type::Int, &Type::Str).is_err());
    }
}
