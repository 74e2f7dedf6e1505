use std::{fmt, sync::Arc};

/// A single scalar cell of a [`super::Relation`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
}

impl Value {
    #[inline] pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

    /// Returns `true` for `Int` and `Float`.
    #[inline] pub fn is_numeric(&self) -> bool { matches!(self, Value::Int(_) | Value::Float(_)) }

    /// Get the value as a float, if numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get the value as a string slice, if a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
        }
    }

    /// Get the join key for this value. Nulls and NaNs have no key.
    pub fn key(&self) -> Option<Key> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(Key::Bool(*b)),
            Value::Int(i) => Some(Key::Int(*i)),
            Value::Float(f) => Key::from_f64(*f),
            Value::Str(s) => Some(Key::Str(s.clone())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value { fn from(s: &str) -> Self { Value::Str(s.into()) } }
impl From<String> for Value { fn from(s: String) -> Self { Value::Str(s.into()) } }
impl From<Arc<str>> for Value { fn from(s: Arc<str>) -> Self { Value::Str(s) } }
impl From<bool> for Value { fn from(b: bool) -> Self { Value::Bool(b) } }
impl From<i32> for Value { fn from(i: i32) -> Self { Value::Int(i.into()) } }
impl From<i64> for Value { fn from(i: i64) -> Self { Value::Int(i) } }
impl From<u32> for Value { fn from(i: u32) -> Self { Value::Int(i.into()) } }
impl From<f64> for Value { fn from(f: f64) -> Self { Value::Float(f) } }

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Bool(b) => Value::Bool(b),
            Key::Int(i) => Value::Int(i),
            Key::Float(bits) => Value::Float(f64::from_bits(bits)),
            Key::Str(s) => Value::Str(s),
        }
    }
}

/// A hashable join/group key.
///
/// Integral floats map to `Int`, so `3` and `3.0` are the same key; `-0.0`
/// is folded into `0`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Bool(bool),
    Int(i64),
    /// Bit pattern of a finite, non-integral float.
    Float(u64),
    Str(Arc<str>),
}

impl Key {
    fn from_f64(f: f64) -> Option<Key> {
        if f.is_nan() { return None }
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            return Some(Key::Int(f as i64));
        }
        Some(Key::Float(f.to_bits()))
    }
}

impl From<&str> for Key { fn from(s: &str) -> Self { Key::Str(s.into()) } }
impl From<i64> for Key { fn from(i: i64) -> Self { Key::Int(i) } }

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Bool(b) => write!(f, "{b}"),
            Key::Int(i) => write!(f, "{i}"),
            Key::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            Key::Str(s) => f.write_str(s),
        }
    }
}

/// Strings are quoted; everything else prints as in `Display`.
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => write!(f, "{:?}", &**s),
            other => write!(f, "{other}"),
        }
    }
}
