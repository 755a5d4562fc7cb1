//! Module resolver: `require` against a host-controlled search root.
//!
//! [`install`] splices a custom searcher into `package.searchers` at slot 2
//! (after the `package.preload` searcher, before the stock filesystem
//! searchers) and prefixes `package.path` with `<root>/?.lua` so resolver
//! paths are tried before generic ones. A module name resolves to
//! `<root>/<name>.lua`, read through the injected [`FileReader`].
//!
//! Caching is `require`'s own: a successful load lands in `package.loaded`
//! and later `require` calls return it without reaching the searcher at
//! all, so each module is read and evaluated at most once per engine
//! lifetime. A failed read or a failed evaluation caches nothing.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mlua::prelude::*;

use crate::fsio::FileReader;

/// Searcher position: 1 is the `package.preload` searcher.
const SEARCHER_SLOT: i64 = 2;

/// Registry flag guarding against double installation.
const INSTALLED_KEY: &str = "luma.resolver.installed";

/// Registry copy of the engine's default `package.path`, taken at install
/// time so the root can be swapped without stacking prefixes.
const BASE_PATH_KEY: &str = "luma.resolver.base_path";

// ── Path construction ─────────────────────────────────────────────────────────

/// The single path a module name resolves to.
pub fn module_path(root: &Path, name: &str) -> PathBuf {
    root.join(format!("{name}.lua"))
}

fn compose_package_path(root: &Path, base: &str) -> String {
    format!("{}/?.lua;{}", root.display(), base)
}

// ── Installation ──────────────────────────────────────────────────────────────

/// Install the resolver into `lua`. Idempotent: a second call is a no-op
/// and does not duplicate the searcher entry.
pub fn install(
    lua: &Lua,
    root: Rc<RefCell<PathBuf>>,
    reader: Rc<dyn FileReader>,
) -> LuaResult<()> {
    let installed: bool = lua.named_registry_value(INSTALLED_KEY).unwrap_or(false);
    if installed {
        return Ok(());
    }

    let package: LuaTable = lua.globals().get("package")?;

    let base: String = package.get("path")?;
    package.set("path", compose_package_path(&root.borrow(), &base))?;
    lua.set_named_registry_value(BASE_PATH_KEY, base)?;

    // Shift searchers 2..n up one slot and claim slot 2.
    let searchers: LuaTable = package.get("searchers")?;
    let mut i = searchers.raw_len() as i64;
    while i >= SEARCHER_SLOT {
        let entry: LuaValue = searchers.raw_get(i)?;
        searchers.raw_set(i + 1, entry)?;
        i -= 1;
    }
    searchers.raw_set(SEARCHER_SLOT, make_searcher(lua, root, reader)?)?;

    lua.set_named_registry_value(INSTALLED_KEY, true)
}

/// Point the resolver at a new search root and recompose `package.path`
/// against the default path saved at install time.
pub fn set_search_root(
    lua: &Lua,
    root: &Rc<RefCell<PathBuf>>,
    new_root: impl Into<PathBuf>,
) -> LuaResult<()> {
    *root.borrow_mut() = new_root.into();

    if let Ok(base) = lua.named_registry_value::<String>(BASE_PATH_KEY) {
        let package: LuaTable = lua.globals().get("package")?;
        package.set("path", compose_package_path(&root.borrow(), &base))?;
    }
    Ok(())
}

// ── Searcher ──────────────────────────────────────────────────────────────────

/// Build the searcher closure.
///
/// Contract (Lua 5.4 `package.searchers`): on a miss, return a message
/// string; `require` folds it into its "module not found" error, which is
/// how the module name and the searched path reach the script. On a hit,
/// return a loader function plus the resolved path; the loader compiles
/// the source under the chunk name `@<path>` and evaluates it, and any
/// compile or runtime failure propagates as the `require` error.
fn make_searcher(
    lua: &Lua,
    root: Rc<RefCell<PathBuf>>,
    reader: Rc<dyn FileReader>,
) -> LuaResult<LuaFunction> {
    lua.create_function(move |lua, name: String| {
        let path = module_path(&root.borrow(), &name);

        let Some(source) = reader.read(&path) else {
            let msg = format!("\n\tno module '{}' in luma path: {}", name, path.display());
            return Ok(LuaMultiValue::from_vec(vec![LuaValue::String(
                lua.create_string(&msg)?,
            )]));
        };

        let display = path.display().to_string();
        let chunk_name = format!("@{display}");
        let loader = lua.create_function(move |lua, _args: LuaMultiValue| {
            lua.load(&source)
                .set_name(chunk_name.as_str())
                .eval::<LuaMultiValue>()
        })?;

        Ok(LuaMultiValue::from_vec(vec![
            LuaValue::Function(loader),
            LuaValue::String(lua.create_string(&display)?),
        ]))
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
