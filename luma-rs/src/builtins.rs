//! Built-in host tables exposed to every script.
//!
//! Three namespaces are installed at engine startup:
//!
//! * `luma`: version query and the `luma.logger` leveled sink, which also
//!   carries the colorized `print` override
//! * `process`: platform, pid, exit, versions, and the script's argv
//! * `env`: environment variable get/set and dotenv loading
//!
//! Everything goes through [`crate::registry`] so the dotted namespaces
//! build themselves.

use mlua::prelude::*;

use crate::console;
use crate::fsio;
use crate::marshal::{self, ScriptValue};
use crate::registry;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install all built-in tables. `script_args` becomes `process.argv`.
pub fn install(lua: &Lua, script_args: &[String]) -> LuaResult<()> {
    install_luma_table(lua)?;
    install_process_table(lua, script_args)?;
    install_env_table(lua)
}

fn value_string(v: &LuaValue) -> String {
    match v {
        LuaValue::String(_) => marshal::decode_string(v).unwrap_or_default(),
        LuaValue::Nil => String::new(),
        other => format!("{other:?}"),
    }
}

/// First argument as a display string, empty when absent.
fn first_string(args: LuaMultiValue) -> String {
    args.into_iter()
        .next()
        .map(|v| value_string(&v))
        .unwrap_or_default()
}

fn log_fn(sink: fn(&str)) -> ScriptValue {
    ScriptValue::function(move |_, args| {
        sink(&first_string(args));
        Ok(LuaValue::Boolean(true))
    })
}

// ── luma ──────────────────────────────────────────────────────────────────────

fn install_luma_table(lua: &Lua) -> LuaResult<()> {
    registry::register_field(
        lua,
        "luma",
        "version",
        ScriptValue::function(|lua, _| Ok(LuaValue::String(lua.create_string(VERSION)?))),
    )?;

    registry::register_field(lua, "luma.logger", "info", log_fn(console::info))?;
    registry::register_field(lua, "luma.logger", "warn", log_fn(console::warn))?;
    registry::register_field(lua, "luma.logger", "error", log_fn(console::error))?;
    registry::register_field(lua, "luma.logger", "debug", log_fn(console::debug))?;

    registry::register_field(
        lua,
        "luma.logger",
        "overridePrint",
        ScriptValue::function(|lua, _| {
            registry::register_global_function(lua, "print", |_, args| {
                console::info(&first_string(args));
                Ok(LuaValue::Boolean(true))
            })?;
            Ok(LuaValue::Boolean(true))
        }),
    )
}

// ── process ───────────────────────────────────────────────────────────────────

fn platform_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "Windows"
    } else if cfg!(target_os = "macos") {
        "macOS"
    } else if cfg!(target_os = "linux") {
        "Linux"
    } else if cfg!(unix) {
        "Unix"
    } else {
        "Unknown"
    }
}

fn install_process_table(lua: &Lua, script_args: &[String]) -> LuaResult<()> {
    registry::register_field(
        lua,
        "process",
        "platform",
        ScriptValue::function(|lua, _| {
            Ok(LuaValue::String(lua.create_string(platform_name())?))
        }),
    )?;
    registry::register_field(
        lua,
        "process",
        "pid",
        ScriptValue::function(|_, _| Ok(LuaValue::Number(std::process::id() as f64))),
    )?;
    registry::register_field(
        lua,
        "process",
        "exit",
        ScriptValue::function(|_, args| {
            let code = args
                .into_iter()
                .next()
                .map(|v| marshal::decode_number(&v))
                .unwrap_or(0.0);
            std::process::exit(code as i32);
        }),
    )?;
    registry::register_field(
        lua,
        "process",
        "version",
        ScriptValue::function(|lua, _| Ok(LuaValue::String(lua.create_string(VERSION)?))),
    )?;

    registry::register_field(lua, "process", "versions", ScriptValue::Table)?;
    registry::register_field(
        lua,
        "process.versions",
        "luma",
        ScriptValue::Str(VERSION.into()),
    )?;
    let lua_version: String = lua.globals().get("_VERSION")?;
    registry::register_field(
        lua,
        "process.versions",
        "lua",
        ScriptValue::Str(lua_version),
    )?;

    // argv is a sequence; the marshal tags model scalars and empty tables,
    // so the array is built with the state directly.
    let process = registry::register_table(lua, "process")?;
    let argv = lua.create_sequence_from(script_args.iter().map(String::as_str))?;
    process.set("argv", argv)
}

// ── env ───────────────────────────────────────────────────────────────────────

fn install_env_table(lua: &Lua) -> LuaResult<()> {
    registry::register_field(
        lua,
        "env",
        "get",
        ScriptValue::function(|lua, args| {
            let key = first_string(args);
            let value = std::env::var(&key).unwrap_or_default();
            Ok(LuaValue::String(lua.create_string(&value)?))
        }),
    )?;
    registry::register_field(
        lua,
        "env",
        "set",
        ScriptValue::function(|_, args| {
            let mut it = args.into_iter();
            let key = it.next().map(|v| value_string(&v)).unwrap_or_default();
            if key.is_empty() {
                return Ok(LuaValue::Boolean(false));
            }
            match it.next() {
                Some(LuaValue::Nil) | None => std::env::remove_var(&key),
                Some(v) => std::env::set_var(&key, value_string(&v)),
            }
            Ok(LuaValue::Boolean(true))
        }),
    )?;
    registry::register_field(
        lua,
        "env",
        "load",
        ScriptValue::function(|_, _| {
            Ok(LuaValue::Integer(fsio::load_env() as i64))
        }),
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn lua_with_builtins(args: &[&str]) -> Lua {
        let lua = Lua::new();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        install(&lua, &args).unwrap();
        lua
    }

    #[test]
    fn luma_version_matches_crate() {
        let lua = lua_with_builtins(&[]);
        let v: String = lua.load("return luma.version()").eval().unwrap();
        assert_eq!(v, VERSION);
    }

    #[test]
    fn logger_functions_report_success() {
        let lua = lua_with_builtins(&[]);
        let all_true: bool = lua
            .load(
                "return luma.logger.info('i') and luma.logger.warn('w') \
                 and luma.logger.error('e') and luma.logger.debug('d')",
            )
            .eval()
            .unwrap();
        assert!(all_true);
    }

    #[test]
    fn override_print_replaces_global() {
        let lua = lua_with_builtins(&[]);
        let changed: bool = lua
            .load("local before = print; luma.logger.overridePrint(); return print ~= before")
            .eval()
            .unwrap();
        assert!(changed);
        let ok: bool = lua.load("return print('through the sink')").eval().unwrap();
        assert!(ok);
    }

    #[test]
    fn process_platform_is_known() {
        let lua = lua_with_builtins(&[]);
        let p: String = lua.load("return process.platform()").eval().unwrap();
        assert!(["Windows", "macOS", "Linux", "Unix", "Unknown"].contains(&p.as_str()));
    }

    #[test]
    fn process_pid_matches() {
        let lua = lua_with_builtins(&[]);
        let pid: f64 = lua.load("return process.pid()").eval().unwrap();
        assert_eq!(pid as u32, std::process::id());
    }

    #[test]
    fn process_accessors_are_functions() {
        let lua = lua_with_builtins(&[]);
        let shape: bool = lua
            .load(
                "return type(process.platform) == 'function' \
                 and type(process.pid) == 'function' \
                 and type(process.version) == 'function'",
            )
            .eval()
            .unwrap();
        assert!(shape);
        let v: String = lua.load("return process.version()").eval().unwrap();
        assert_eq!(v, VERSION);
    }

    #[test]
    fn process_versions_table() {
        let lua = lua_with_builtins(&[]);
        let luma: String = lua.load("return process.versions.luma").eval().unwrap();
        assert_eq!(luma, VERSION);
        let lv: String = lua.load("return process.versions.lua").eval().unwrap();
        assert!(lv.starts_with("Lua 5."), "{lv}");
    }

    #[test]
    fn process_argv_is_a_sequence() {
        let lua = lua_with_builtins(&["--fast", "input.txt"]);
        let n: i64 = lua.load("return #process.argv").eval().unwrap();
        assert_eq!(n, 2);
        let first: String = lua.load("return process.argv[1]").eval().unwrap();
        assert_eq!(first, "--fast");
    }

    #[test]
    fn env_get_returns_value_or_empty() {
        std::env::set_var("LUMA_BUILTIN_TEST", "present");
        let lua = lua_with_builtins(&[]);
        let v: String = lua.load("return env.get('LUMA_BUILTIN_TEST')").eval().unwrap();
        assert_eq!(v, "present");
        let missing: String = lua
            .load("return env.get('LUMA_NO_SUCH_VAR_EVER')")
            .eval()
            .unwrap();
        assert_eq!(missing, "");
    }

    #[test]
    fn env_set_and_remove() {
        let lua = lua_with_builtins(&[]);
        let ok: bool = lua
            .load("return env.set('LUMA_SET_TEST', 'val')")
            .eval()
            .unwrap();
        assert!(ok);
        assert_eq!(std::env::var("LUMA_SET_TEST").unwrap(), "val");
        lua.load("env.set('LUMA_SET_TEST', nil)").exec().unwrap();
        assert!(std::env::var("LUMA_SET_TEST").is_err());

        let ok: bool = lua.load("return env.set('', 'x')").eval().unwrap();
        assert!(!ok, "empty key must report failure");
    }

    #[test]
    fn env_load_reports_count() {
        let lua = lua_with_builtins(&[]);
        // no .env in the test cwd; count is numeric either way
        let n: i64 = lua.load("return env.load()").eval().unwrap();
        assert!(n >= 0);
    }
}
