//! # js2py CLI
//!
//! Command-line surface of the translator. The single `convert` subcommand
//! reads one JavaScript file, runs the pipeline, and writes the translated
//! module plus an optional JSON diagnostic report.
//!
//! Exit codes: 0 on success, 2 when diagnostics contain errors, 1 on
//! parse or I/O failure.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Arg, ArgAction, Command};

use js2py::diagnostics::DiagnosticBus;
use js2py::parser::ParseMode;
use js2py::parser::cache::AstCache;
use js2py::pipeline::{ConvertConfig, PipelineError, convert};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_NAME: &str = "js2py";

/// Errors surfaced to the user at the CLI boundary
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("input file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0}")]
    Pipeline(#[from] PipelineError),
}

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let matches = build_command().get_matches();

    let verbose = matches.get_flag("verbose");
    let level = if verbose {
        log::Level::Debug
    } else {
        log::Level::Warn
    };
    if let Err(error) = simple_logger::init_with_level(level) {
        eprintln!("failed to initialize logging: {error}");
    }

    let Some(convert_args) = matches.subcommand_matches("convert") else {
        eprintln!("usage: {APP_NAME} convert <INPUT> [--out <path>]");
        return 1;
    };

    let input = convert_args
        .get_one::<PathBuf>("input")
        .expect("input is required by clap");
    let strict = convert_args.get_flag("strict");
    let mode = if convert_args.get_flag("module") {
        ParseMode::Module
    } else {
        ParseMode::Script
    };
    let include_runtime = convert_args
        .get_one::<String>("runtime")
        .map(|value| value == "include")
        .unwrap_or(true);
    let cache = if convert_args.get_flag("no-cache") {
        None
    } else {
        let dir = convert_args
            .get_one::<PathBuf>("cache-dir")
            .cloned()
            .unwrap_or_else(AstCache::default_dir);
        Some(AstCache::new(dir))
    };

    let mut config = ConvertConfig::new(input.to_string_lossy().into_owned());
    config.mode = mode;
    config.strict = strict;
    config.include_runtime = include_runtime;
    config.cache = cache;

    let out_path = convert_args
        .get_one::<PathBuf>("out")
        .cloned()
        .unwrap_or_else(|| input.with_extension("py"));
    let report_path = convert_args.get_one::<PathBuf>("report").cloned();

    let mut bus = DiagnosticBus::new(strict);
    let outcome = convert_file(input, &config, &out_path, &mut bus);
    write_report(report_path.as_deref(), &bus);
    print_diagnostics(&bus);
    match outcome {
        Ok(()) => 0,
        Err(CliError::Pipeline(PipelineError::Diagnostics)) => 2,
        Err(error) => {
            eprintln!("error: {error}");
            1
        }
    }
}

fn build_command() -> Command {
    Command::new(APP_NAME)
        .version(VERSION)
        .about("Translates a JavaScript source file into a Python module")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Enable debug logging"),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert one JavaScript file")
                .arg(
                    Arg::new("input")
                        .help("Input JavaScript file")
                        .value_name("INPUT")
                        .value_parser(clap::value_parser!(PathBuf))
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_name("PATH")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Output path (defaults to the input with a .py extension)"),
                )
                .arg(
                    Arg::new("module")
                        .long("module")
                        .action(ArgAction::SetTrue)
                        .help("Parse the input as an ES module instead of a script"),
                )
                .arg(
                    Arg::new("runtime")
                        .long("runtime")
                        .value_name("MODE")
                        .value_parser(["include", "skip"])
                        .default_value("include")
                        .help("Whether to emit the runtime-import preamble"),
                )
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Treat warnings as errors at stage boundaries"),
                )
                .arg(
                    Arg::new("report")
                        .long("report")
                        .value_name("PATH")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Write the JSON diagnostic report to this path"),
                )
                .arg(
                    Arg::new("no-cache")
                        .long("no-cache")
                        .action(ArgAction::SetTrue)
                        .help("Disable the AST cache"),
                )
                .arg(
                    Arg::new("cache-dir")
                        .long("cache-dir")
                        .value_name("DIR")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("AST cache directory (defaults to .cache/ast)"),
                ),
        )
}

fn convert_file(
    input: &Path,
    config: &ConvertConfig,
    out_path: &Path,
    bus: &mut DiagnosticBus,
) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::FileNotFound(input.to_path_buf()));
    }
    let source = std::fs::read_to_string(input).map_err(|source| CliError::ReadFailed {
        path: input.to_path_buf(),
        source,
    })?;

    let conversion = convert(&source, config, bus)?;

    std::fs::write(out_path, conversion.output.as_bytes()).map_err(|source| {
        CliError::WriteFailed {
            path: out_path.to_path_buf(),
            source,
        }
    })?;
    log::info!("wrote {}", out_path.display());
    Ok(())
}

fn write_report(path: Option<&Path>, bus: &DiagnosticBus) {
    let Some(path) = path else { return };
    match bus.to_report_json() {
        Ok(json) => {
            if let Err(error) = std::fs::write(path, json) {
                eprintln!("failed to write report {}: {error}", path.display());
            }
        }
        Err(error) => eprintln!("failed to serialize report: {error}"),
    }
}

/// Prints the sorted diagnostic stream to stderr
fn print_diagnostics(bus: &DiagnosticBus) {
    for record in bus.sorted() {
        eprintln!(
            "{}:{}:{}: {:?} [{}] {}",
            record.file, record.line, record.column, record.level, record.code, record.message
        );
    }
}
