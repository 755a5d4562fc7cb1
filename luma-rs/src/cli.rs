//! Command-line argument handling.
//!
//! Hand-rolled parsing over `std::env::args`; the surface is two commands:
//!
//! ```text
//! luma run <file.lua> [--debug] [-- <script args>]
//! luma help
//! ```
//!
//! Everything after a literal `--` is handed to the script untouched as
//! `process.argv`.

use std::path::PathBuf;

#[derive(Debug, PartialEq)]
pub struct CliArgs {
    pub command: Command,
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Run {
        file: PathBuf,
        debug: bool,
        script_args: Vec<String>,
    },
    Help,
}

/// Parse the process arguments, skipping the program name.
pub fn parse_args() -> Result<CliArgs, String> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    parse_argv(&argv)
}

pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let Some(command) = argv.first() else {
        return Err("no command given".into());
    };

    match command.as_str() {
        "help" | "--help" | "-h" => Ok(CliArgs {
            command: Command::Help,
        }),
        "run" => {
            let (own, script_args) = split_at_double_dash(&argv[1..]);

            let mut file: Option<PathBuf> = None;
            let mut debug = false;
            for arg in own {
                match arg.as_str() {
                    "--debug" => debug = true,
                    flag if flag.starts_with('-') => {
                        return Err(format!("unknown option '{flag}'"));
                    }
                    positional => {
                        if file.is_some() {
                            return Err(format!("unexpected argument '{positional}'"));
                        }
                        file = Some(PathBuf::from(positional));
                    }
                }
            }

            let file = file.ok_or("run needs a script file")?;
            Ok(CliArgs {
                command: Command::Run {
                    file,
                    debug,
                    script_args,
                },
            })
        }
        other => Err(format!("unknown command '{other}'")),
    }
}

fn split_at_double_dash(args: &[String]) -> (&[String], Vec<String>) {
    match args.iter().position(|a| a == "--") {
        Some(idx) => (&args[..idx], args[idx + 1..].to_vec()),
        None => (args, Vec::new()),
    }
}

pub fn print_help() {
    println!("luma - an embedded Lua script runner");
    println!();
    println!("Usage:");
    println!("  luma run <file.lua> [--debug] [-- <script args>]");
    println!("  luma help");
    println!();
    println!("Options:");
    println!("  --debug    enable debug output");
    println!();
    println!("Arguments after '--' are passed to the script as process.argv.");
}

// ── Tests ─────────────────────────────────────────────────────────────────────
