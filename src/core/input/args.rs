//=========================================================================
// Handler Arguments
//
// Named values attached to a handler binding and passed to it on every
// invocation. A binding's own arguments are merged with any explicit
// arguments supplied at call time; explicit values win on conflict.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::BTreeMap;

//=== Internal Dependencies ===============================================

use crate::core::error::SceneError;

//=== ArgValue ============================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Int(i64),
    Float(f64),
    Text(String),
    Flag(bool),
}

impl ArgValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Flag(_) => "flag",
        }
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u8> for ArgValue {
    fn from(value: u8) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

//=== Args ================================================================

/// Keyword arguments for a handler invocation.
///
/// # Examples
///
/// ```
/// use space_battle::core::input::Args;
///
/// let args = Args::new().with("player", 2).with("stop", true);
/// assert_eq!(args.int("player").unwrap(), 2);
/// assert!(args.flag("stop").unwrap());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(BTreeMap<&'static str, ArgValue>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &'static str, value: impl Into<ArgValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &'static str, value: impl Into<ArgValue>) {
        self.0.insert(name, value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `self` overlaid with `explicit`. Keys present in both take
    /// the explicit value.
    pub fn merged(&self, explicit: &Args) -> Args {
        let mut merged = self.clone();
        merged
            .0
            .extend(explicit.0.iter().map(|(name, value)| (*name, value.clone())));
        merged
    }

    //--- Typed Access -----------------------------------------------------

    pub fn int(&self, name: &str) -> Result<i64, SceneError> {
        match self.require(name)? {
            ArgValue::Int(value) => Ok(*value),
            other => Err(Self::mistyped(name, "int", other)),
        }
    }

    /// Floats accept integer values too.
    pub fn float(&self, name: &str) -> Result<f64, SceneError> {
        match self.require(name)? {
            ArgValue::Float(value) => Ok(*value),
            ArgValue::Int(value) => Ok(*value as f64),
            other => Err(Self::mistyped(name, "float", other)),
        }
    }

    pub fn text(&self, name: &str) -> Result<&str, SceneError> {
        match self.require(name)? {
            ArgValue::Text(value) => Ok(value),
            other => Err(Self::mistyped(name, "text", other)),
        }
    }

    pub fn flag(&self, name: &str) -> Result<bool, SceneError> {
        match self.require(name)? {
            ArgValue::Flag(value) => Ok(*value),
            other => Err(Self::mistyped(name, "flag", other)),
        }
    }

    /// Like [`flag`](Self::flag) but a missing argument yields `default`.
    pub fn flag_or(&self, name: &str, default: bool) -> Result<bool, SceneError> {
        if self.0.contains_key(name) {
            self.flag(name)
        } else {
            Ok(default)
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn require(&self, name: &str) -> Result<&ArgValue, SceneError> {
        self.0
            .get(name)
            .ok_or_else(|| SceneError::config(format!("missing handler argument `{name}`")))
    }

    fn mistyped(name: &str, expected: &str, found: &ArgValue) -> SceneError {
        SceneError::config(format!(
            "handler argument `{name}` should be {expected}, found {}",
            found.type_name()
        ))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
