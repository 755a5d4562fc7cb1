//! Namespace registrar.
//!
//! Exposes host capabilities under dotted paths in the Lua global
//! environment, e.g. `register_field(lua, "process.versions", "lua", …)`
//! makes `process.versions.lua` visible to scripts.
//!
//! Path navigation descends one segment at a time from the global table.
//! A segment that is absent, or present but not a table, is replaced by
//! a fresh empty table. That overwrite policy is deliberate: registration
//! always succeeds, and a clobbered scalar is the registrant's problem,
//! not an error.

use mlua::prelude::*;

use crate::marshal::{self, ScriptValue};

// ── Path navigation ───────────────────────────────────────────────────────────

/// Walk `path` (dot-separated, non-empty segments) from the globals,
/// creating tables as needed, and return the table at the leaf.
fn navigate(lua: &Lua, path: &str) -> LuaResult<LuaTable> {
    if path.is_empty() {
        return Err(LuaError::RuntimeError(
            "registration path must not be empty".into(),
        ));
    }

    let mut current = lua.globals();
    for segment in path.split('.') {
        if segment.is_empty() {
            return Err(LuaError::RuntimeError(format!(
                "empty segment in registration path '{path}'"
            )));
        }
        let existing: LuaValue = current.get(segment)?;
        current = match marshal::decode_table(&existing) {
            Some(table) => table,
            None => {
                let fresh = lua.create_table()?;
                current.set(segment, fresh.clone())?;
                fresh
            }
        };
    }
    Ok(current)
}

// ── Registration ──────────────────────────────────────────────────────────────

/// Ensure every segment of `path` is a table and return the leaf table.
///
/// A no-op (returning the existing table) when the path already resolves
/// to tables end to end.
pub fn register_table(lua: &Lua, path: &str) -> LuaResult<LuaTable> {
    navigate(lua, path)
}

/// Bind `key` in the table at `path` to the marshaled `value`,
/// creating intermediate tables as needed.
pub fn register_field(lua: &Lua, path: &str, key: &str, value: ScriptValue) -> LuaResult<()> {
    let table = navigate(lua, path)?;
    table.set(key, marshal::encode(lua, value)?)
}

/// Bind `name` directly in the global table to the marshaled `value`.
pub fn register_global(lua: &Lua, name: &str, value: ScriptValue) -> LuaResult<()> {
    lua.globals().set(name, marshal::encode(lua, value)?)
}

/// Bind a host function directly in the global table.
pub fn register_global_function<F>(lua: &Lua, name: &str, f: F) -> LuaResult<()>
where
    F: Fn(&Lua, LuaMultiValue) -> LuaResult<LuaValue> + 'static,
{
    register_global(lua, name, ScriptValue::function(f))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
