/// Static type of a value, as inferred by semantic analysis.
///
/// `None` marks a node that has not been typed yet (or could not be typed
/// after an error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    None,
    Bool,
    Int,
    Float,
}

impl ValueType {
    /// Returns true for the types arithmetic operators accept.
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Int | ValueType::Float)
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::None => write!(f, "none"),
            ValueType::Bool => write!(f, "bool"),
            ValueType::Int => write!(f, "int"),
            ValueType::Float => write!(f, "float"),
        }
    }
}

/// Runtime value.
///
/// Values live on the VM stack and in the constant pool. They are `Copy`:
/// every push, pop and constant load moves a fresh copy, nothing is aliased.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Value {
    /// Absence of a value. Only used for empty stack slots and placeholder nodes.
    #[default]
    None,

    Bool(bool),

    /// 32-bit signed integer.
    Int(i32),

    /// 32-bit floating-point number.
    Float(f32),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::None => ValueType::None,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
        }
    }
}

impl std::fmt::Display for Value {
    /// Formats a value the way `PRINT` renders it.
    ///
    /// Floats always carry six decimals (`7.000000`).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::None => write!(f, "none"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:.6}", n),
        }
    }
}
