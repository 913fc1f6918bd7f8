use pup::{Config, Outcome, Session};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

const HISTORY_FILE: &str = ".pup_history";
const MAX_DEPTH_VAR: &str = "PUP_MAX_DEPTH";

/// Enable with `RUST_LOG=pup=debug` or `RUST_LOG=pup=trace`.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    // Only initialize if RUST_LOG is set
    if env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(HISTORY_FILE))
}

/// Print every outcome; returns false if any expression failed.
fn report(outcomes: Vec<Outcome>) -> bool {
    let mut ok = true;
    for outcome in outcomes {
        match outcome {
            Ok(Some(value)) => println!("{value}"),
            Ok(None) => {}
            Err(e) => {
                eprintln!("{e}");
                ok = false;
            }
        }
    }
    ok
}

fn repl(session: &Session) -> Result<(), String> {
    let mut editor = DefaultEditor::new().map_err(|e| format!("Failed to start editor: {e}"))?;
    let history = history_path();
    if let Some(path) = &history {
        // A missing history file is expected on first run
        let _ = editor.load_history(path);
    }

    println!("Puppy REPL");
    println!("Type expressions to evaluate, or quit to exit");
    println!();

    loop {
        match editor.readline(">>> ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if input == "quit" || input == "exit" {
                    break;
                }
                let _ = editor.add_history_entry(input);

                match session.evaluate_program(input) {
                    Ok(outcomes) => {
                        report(outcomes);
                    }
                    Err(e) => eprintln!("{e}"),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(format!("Failed to read line: {e}")),
        }
    }

    if let Some(path) = &history
        && let Err(e) = editor.save_history(path)
    {
        tracing::debug!(%e, "could not save history");
    }
    Ok(())
}

fn run_file(session: &Session, filename: &str) -> Result<(), String> {
    let contents = fs::read_to_string(filename)
        .map_err(|e| format!("Failed to read file '{filename}': {e}"))?;

    let outcomes = session.evaluate_program(&contents).map_err(|e| e.to_string())?;
    if report(outcomes) {
        Ok(())
    } else {
        Err(format!("Errors while evaluating '{filename}'"))
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  pup [--max-depth N]              Start interactive REPL");
    eprintln!("  pup [--max-depth N] <file.pup>   Run a Puppy file");
    eprintln!("  pup --help                       Show this help message");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  {MAX_DEPTH_VAR}   Maximum evaluation depth (overridden by --max-depth)");
    eprintln!("  RUST_LOG        Enable tracing output, e.g. RUST_LOG=pup=debug");
}

fn parse_depth(text: &str) -> Result<usize, String> {
    text.parse::<usize>()
        .ok()
        .filter(|depth| *depth > 0)
        .ok_or_else(|| format!("Invalid maximum depth: '{text}'"))
}

enum Command {
    Help,
    Repl(Config),
    Run(Config, String),
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut config = Config::default();
    if let Ok(depth) = env::var(MAX_DEPTH_VAR) {
        config = config.with_max_depth(parse_depth(&depth)?);
    }

    let mut file = None;
    let mut rest = args.iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--max-depth" => {
                let depth = rest.next().ok_or("--max-depth requires a value")?;
                config = config.with_max_depth(parse_depth(depth)?);
            }
            _ if file.is_none() => file = Some(arg.clone()),
            _ => return Err("Error: Too many arguments".to_string()),
        }
    }

    Ok(match file {
        Some(file) => Command::Run(config, file),
        None => Command::Repl(config),
    })
}

fn main() {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let result = match parse_args(&args) {
        Ok(Command::Help) => {
            print_usage();
            Ok(())
        }
        Ok(Command::Repl(config)) => repl(&Session::with_config(config)),
        Ok(Command::Run(config, file)) => run_file(&Session::with_config(config), &file),
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("{e}");
        process::exit(1);
    }
}
