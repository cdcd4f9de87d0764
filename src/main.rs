use clap::Parser;
use jmmc::cli::{Args, format_reports, read_source_file};
use jmmc::frontend::report::report_syntax_errors;
use jmmc::pipeline::{CompileError, compile};
use std::fs;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    // Warnings by default, --verbose enables debug, RUST_LOG overrides
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_module("jmmc", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .init();

    let filename = args.path.display().to_string();

    // Read the source file
    let source = match read_source_file(&args.path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // Run the compilation pipeline
    let output = match compile(&source, &args.config()) {
        Ok(output) => output,
        Err(CompileError::Syntax(errors)) => {
            if let Err(e) = report_syntax_errors(&filename, &source, &errors) {
                eprintln!("error: could not render diagnostics: {}", e);
            }
            return ExitCode::FAILURE;
        }
        Err(CompileError::Backend(errors)) => {
            for error in &errors {
                eprintln!("error: {}", error);
            }
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let reports = format_reports(&output, args.liveness, args.var_tables);
    if !reports.is_empty() {
        eprint!("{}", reports);
    }

    match &args.output {
        Some(path) => {
            if let Err(e) = fs::write(path, &output.jasmin) {
                eprintln!("error: could not write '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
            log::info!("wrote {} to {}", output.class_name, path.display());
        }
        None => print!("{}", output.jasmin),
    }

    ExitCode::SUCCESS
}
