//! End-to-end `require` behavior through a full [`Engine`] against real
//! on-disk module trees.

use std::fs;

use luma::engine::{Engine, EngineError};
use luma::marshal::ScriptValue;

fn engine_rooted_at(dir: &std::path::Path) -> Engine {
    let engine = Engine::new().unwrap();
    engine.set_search_root(dir).unwrap();
    engine
}

#[test]
fn require_resolves_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("point.lua"),
        "return { x = 3, y = 4, norm = function(p) return (p.x^2 + p.y^2)^0.5 end }",
    )
    .unwrap();

    let engine = engine_rooted_at(dir.path());
    let norm: f64 = engine
        .eval("local p = require('point'); return p.norm(p)")
        .unwrap();
    assert_eq!(norm, 5.0);
}

#[test]
fn modules_can_require_each_other() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("inner.lua"), "return { value = 10 }").unwrap();
    fs::write(
        dir.path().join("outer.lua"),
        "local inner = require('inner')\nreturn { doubled = inner.value * 2 }",
    )
    .unwrap();

    let engine = engine_rooted_at(dir.path());
    let v: i64 = engine.eval("return require('outer').doubled").unwrap();
    assert_eq!(v, 20);
}

#[test]
fn diamond_requires_evaluate_the_shared_module_once() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("shared.lua"),
        "hits = (hits or 0) + 1\nreturn { id = hits }",
    )
    .unwrap();
    fs::write(dir.path().join("a.lua"), "return require('shared')").unwrap();
    fs::write(dir.path().join("b.lua"), "return require('shared')").unwrap();

    let engine = engine_rooted_at(dir.path());
    let same: bool = engine
        .eval("return require('a') == require('b')")
        .unwrap();
    assert!(same);
    let hits: i64 = engine.eval("return hits").unwrap();
    assert_eq!(hits, 1);
}

#[test]
fn module_error_surfaces_through_run_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.lua"), "error('from the module')").unwrap();
    let main = dir.path().join("main.lua");
    fs::write(&main, "require('bad')").unwrap();

    let engine = engine_rooted_at(dir.path());
    let Err(EngineError::ScriptRuntime { raw }) = engine.run_file(&main) else {
        panic!("expected a runtime error");
    };
    assert!(raw.contains("from the module"), "{raw}");

    let report = engine.capture_and_format(&raw);
    assert!(report.contains("from the module"), "{report}");
    assert!(report.contains("stack traceback:"), "{report}");
}

#[test]
fn missing_module_report_names_the_search_path() {
    let dir = tempfile::tempdir().unwrap();
    let main = dir.path().join("main.lua");
    fs::write(&main, "require('nothere')").unwrap();

    let engine = engine_rooted_at(dir.path());
    let Err(EngineError::ScriptRuntime { raw }) = engine.run_file(&main) else {
        panic!("expected a runtime error");
    };
    assert!(raw.contains("nothere"), "{raw}");
    assert!(raw.contains("nothere.lua"), "{raw}");
}

#[test]
fn modules_see_registered_capabilities() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("greeter.lua"),
        "return { greet = function() return host.name end }",
    )
    .unwrap();

    let engine = engine_rooted_at(dir.path());
    engine
        .register_field("host", "name", ScriptValue::Str("luma".into()))
        .unwrap();
    let v: String = engine
        .eval("return require('greeter').greet()")
        .unwrap();
    assert_eq!(v, "luma");
}

#[test]
fn builtins_are_visible_inside_modules() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("sysinfo.lua"),
        "return { platform = process.platform(), pid = process.pid() }",
    )
    .unwrap();

    let engine = engine_rooted_at(dir.path());
    engine.install_builtins(&[]).unwrap();
    let pid: f64 = engine.eval("return require('sysinfo').pid").unwrap();
    assert_eq!(pid as u32, std::process::id());
}
