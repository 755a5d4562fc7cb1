//! Value marshaling across the host/Lua boundary.
//!
//! Host values travel into Lua as a [`ScriptValue`], a closed sum type
//! with one constructor per Lua-visible tag, and come back out through
//! per-tag decoders.
//!
//! | Tag        | Encodes to          | Mismatched decode yields |
//! |------------|---------------------|--------------------------|
//! | `Nil`      | `nil`               | n/a                      |
//! | `Number`   | number              | `0.0`                    |
//! | `Str`      | string              | `None`                   |
//! | `Bool`     | boolean             | `false`                  |
//! | `Function` | host callback       | `None`                   |
//! | `Table`    | fresh empty table   | `None`                   |
//!
//! Decoding is deliberately soft: a wrong-typed value coerces to the
//! documented default instead of raising. Numeric strings decode as
//! numbers, matching Lua's own coercion rules.
//!
//! Table encoding always yields a fresh empty table; populating its fields
//! is the caller's job (see [`crate::registry`]).

use mlua::prelude::*;

// ── ScriptValue ───────────────────────────────────────────────────────────────

/// Signature of a host function callable from Lua.
pub type NativeFn = Box<dyn Fn(&Lua, LuaMultiValue) -> LuaResult<LuaValue> + 'static>;

/// A host-side value ready to cross into Lua.
pub enum ScriptValue {
    Nil,
    Number(f64),
    Str(String),
    Bool(bool),
    Function(NativeFn),
    /// Encodes to a fresh empty table.
    Table,
}

impl ScriptValue {
    /// Wrap a host closure as a [`ScriptValue::Function`].
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Lua, LuaMultiValue) -> LuaResult<LuaValue> + 'static,
    {
        ScriptValue::Function(Box::new(f))
    }

    /// The tag name, mirroring Lua type names.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScriptValue::Nil => "nil",
            ScriptValue::Number(_) => "number",
            ScriptValue::Str(_) => "string",
            ScriptValue::Bool(_) => "boolean",
            ScriptValue::Function(_) => "function",
            ScriptValue::Table => "table",
        }
    }
}

impl std::fmt::Debug for ScriptValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptValue::Number(n) => write!(f, "Number({n})"),
            ScriptValue::Str(s) => write!(f, "Str({s:?})"),
            ScriptValue::Bool(b) => write!(f, "Bool({b})"),
            other => f.write_str(other.type_name()),
        }
    }
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Convert a host value into a Lua value. Total for all six tags.
pub fn encode(lua: &Lua, value: ScriptValue) -> LuaResult<LuaValue> {
    Ok(match value {
        ScriptValue::Nil => LuaValue::Nil,
        ScriptValue::Number(n) => LuaValue::Number(n),
        ScriptValue::Str(s) => LuaValue::String(lua.create_string(&s)?),
        ScriptValue::Bool(b) => LuaValue::Boolean(b),
        ScriptValue::Function(f) => {
            LuaValue::Function(lua.create_function(move |lua, args: LuaMultiValue| f(lua, args))?)
        }
        ScriptValue::Table => LuaValue::Table(lua.create_table()?),
    })
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Decode as a number. Integers widen, numeric strings coerce, everything
/// else is `0.0`.
pub fn decode_number(value: &LuaValue) -> f64 {
    match value {
        LuaValue::Number(n) => *n,
        LuaValue::Integer(i) => *i as f64,
        LuaValue::String(s) => s
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Decode as a string. Non-strings decode as `None`.
pub fn decode_string(value: &LuaValue) -> Option<String> {
    match value {
        LuaValue::String(s) => s.to_str().ok().map(|s| s.to_string()),
        _ => None,
    }
}

/// Decode as a boolean. Non-booleans decode as `false` (not Lua
/// truthiness).
pub fn decode_bool(value: &LuaValue) -> bool {
    match value {
        LuaValue::Boolean(b) => *b,
        _ => false,
    }
}

/// Decode as a callable handle. Non-functions decode as `None`.
pub fn decode_function(value: &LuaValue) -> Option<LuaFunction> {
    match value {
        LuaValue::Function(f) => Some(f.clone()),
        _ => None,
    }
}

/// Decode as a table handle. `None` is the invalid-reference sentinel for
/// every non-table value.
pub fn decode_table(value: &LuaValue) -> Option<LuaTable> {
    match value {
        LuaValue::Table(t) => Some(t.clone()),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
