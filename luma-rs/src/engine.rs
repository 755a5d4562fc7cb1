//! The embedding engine.
//!
//! [`Engine`] owns a Lua state with the module resolver installed and an
//! error [`Reporter`] wired to the state's own `debug.traceback`. It is the
//! single entry point the binary uses: load and run a script file, execute
//! or evaluate snippets, register host capabilities, and format any
//! resulting error.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mlua::prelude::*;

use crate::fsio::{DiskReader, FileReader};
use crate::marshal::ScriptValue;
use crate::registry;
use crate::report::Reporter;
use crate::resolver;

// ── Errors ────────────────────────────────────────────────────────────────────

/// What can go wrong driving a script from the host side.
#[derive(Debug)]
pub enum EngineError {
    /// The script file could not be read or compiled.
    ScriptLoad { path: PathBuf, message: String },
    /// The script compiled but raised at runtime. `raw` is the raw Lua
    /// error text, suitable for [`Engine::capture_and_format`].
    ScriptRuntime { raw: String },
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::ScriptLoad { path, message } => {
                write!(f, "failed to load {}: {}", path.display(), message)
            }
            EngineError::ScriptRuntime { raw } => write!(f, "script error: {raw}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Pull the underlying message text out of an mlua error, unwrapping
/// callback layers and keeping any traceback the engine attached.
fn raw_message(err: &LuaError) -> String {
    match err {
        LuaError::RuntimeError(msg) => msg.clone(),
        LuaError::SyntaxError { message, .. } => message.clone(),
        LuaError::CallbackError { traceback, cause } => {
            format!("{}\n{}", raw_message(cause), traceback)
        }
        other => other.to_string(),
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

pub struct Engine {
    lua: Lua,
    search_root: Rc<RefCell<PathBuf>>,
    reporter: Reporter,
}

impl Engine {
    /// Build an engine with the resolver rooted at the current working
    /// directory and disk-backed file reads.
    pub fn new() -> LuaResult<Self> {
        let lua = Lua::new();
        let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let search_root = Rc::new(RefCell::new(root));
        let reader: Rc<dyn FileReader> = Rc::new(DiskReader);

        resolver::install(&lua, search_root.clone(), reader.clone())?;

        let reporter = Reporter::new(
            {
                let lua = lua.clone();
                move || lua_traceback(&lua)
            },
            reader,
        );

        Ok(Self {
            lua,
            search_root,
            reporter,
        })
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// Install the standard host tables (`luma`, `process`, `env`) and the
    /// print override. `script_args` becomes `process.argv`.
    pub fn install_builtins(&self, script_args: &[String]) -> LuaResult<()> {
        crate::builtins::install(&self.lua, script_args)
    }

    // ── Registration surface ──────────────────────────────────────────────

    pub fn register_table(&self, path: &str) -> LuaResult<LuaTable> {
        registry::register_table(&self.lua, path)
    }

    pub fn register_field(&self, path: &str, key: &str, value: ScriptValue) -> LuaResult<()> {
        registry::register_field(&self.lua, path, key, value)
    }

    pub fn register_global_function<F>(&self, name: &str, f: F) -> LuaResult<()>
    where
        F: Fn(&Lua, LuaMultiValue) -> LuaResult<LuaValue> + 'static,
    {
        registry::register_global_function(&self.lua, name, f)
    }

    /// Redirect `require` resolution to `root`.
    pub fn set_search_root(&self, root: impl Into<PathBuf>) -> LuaResult<()> {
        resolver::set_search_root(&self.lua, &self.search_root, root)
    }

    // ── Execution ─────────────────────────────────────────────────────────

    /// Load and run a script file. Load failures (unreadable file, syntax
    /// error) and runtime failures are reported as distinct variants.
    pub fn run_file(&self, path: &Path) -> Result<(), EngineError> {
        let Some(source) = DiskReader.read(path) else {
            return Err(EngineError::ScriptLoad {
                path: path.to_path_buf(),
                message: "cannot read file".into(),
            });
        };

        let chunk_name = format!("@{}", path.display());
        let func = self
            .lua
            .load(&source)
            .set_name(chunk_name.as_str())
            .into_function()
            .map_err(|e| EngineError::ScriptLoad {
                path: path.to_path_buf(),
                message: raw_message(&e),
            })?;

        func.call::<()>(())
            .map_err(|e| EngineError::ScriptRuntime {
                raw: raw_message(&e),
            })
    }

    /// Execute a snippet for its effects.
    pub fn exec(&self, source: &str) -> LuaResult<()> {
        self.lua.load(source).exec()
    }

    /// Evaluate a snippet and convert its result.
    pub fn eval<R: FromLuaMulti>(&self, source: &str) -> LuaResult<R> {
        self.lua.load(source).eval()
    }

    /// Run the error pipeline over raw error text and return the rendered
    /// report.
    pub fn capture_and_format(&self, raw: &str) -> String {
        self.reporter.capture_and_format(raw)
    }
}

/// Ask the Lua state for a traceback of the current stack, skipping the
/// capture frames themselves.
fn lua_traceback(lua: &Lua) -> Option<String> {
    let debug: LuaTable = lua.globals().get("debug").ok()?;
    let traceback: LuaFunction = debug.get("traceback").ok()?;
    traceback.call::<String>(("", 2)).ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
