use std::path::Path;
use std::process::ExitCode;

use luma::cli::{self, Command};
use luma::console;
use luma::engine::{Engine, EngineError};
use luma::report::ErrorInfo;

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("luma: {e}");
            eprintln!("Usage: luma run <file.lua> [--debug] [-- <script args>]");
            return ExitCode::from(2);
        }
    };

    match args.command {
        Command::Help => {
            cli::print_help();
            ExitCode::SUCCESS
        }
        Command::Run {
            file,
            debug,
            script_args,
        } => ExitCode::from(run(&file, debug, &script_args)),
    }
}

fn run(file: &Path, debug: bool, script_args: &[String]) -> u8 {
    let engine = match Engine::new() {
        Ok(engine) => engine,
        Err(e) => {
            console::error(&format!("could not initialize the runtime: {e}"));
            return 1;
        }
    };
    if let Err(e) = engine.install_builtins(script_args) {
        console::error(&format!("could not install builtins: {e}"));
        return 1;
    }
    if debug {
        console::debug("debug mode enabled");
        console::debug(&format!("running {}", file.display()));
    }

    match engine.run_file(file) {
        Ok(()) => 0,
        Err(EngineError::ScriptLoad { path, message }) => {
            let info = ErrorInfo::from_parts(path.display().to_string(), message);
            console::print_report(&info.render());
            1
        }
        Err(EngineError::ScriptRuntime { raw }) => {
            console::print_report(&engine.capture_and_format(&raw));
            1
        }
    }
}
