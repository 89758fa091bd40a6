//! Cinder interactive driver.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use cinder_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use cinder_diagnostic::SourceInfo;
use cinderc::{
    ExecuteFileError, ExecuteFileOutput, LineResult, MetaCommand, MetaProcessor, ProcessOutput,
    Session, SessionConfig,
};

const PROMPT: &str = "[cinder]$ ";

struct Args {
    nologo: bool,
    verbose: bool,
    include_paths: Vec<PathBuf>,
    files: Vec<String>,
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&args);
    init_tracing(args.verbose);

    let mut config = SessionConfig::new();
    for path in args.include_paths {
        config = config.with_include_path(path);
    }
    let mut session = Session::new(config);
    let mut meta = MetaProcessor::new();
    let mut emitter = TerminalEmitter::stderr(ColorMode::Auto, io::stderr().is_terminal());

    for file in args.files {
        let command = MetaCommand::Execute(file.clone());
        match meta.run_command(&mut session, command) {
            Ok(result) => report(&mut emitter, &file, result),
            Err(err) => {
                eprintln!("fatal: {err}");
                std::process::exit(1);
            }
        }
    }

    if !args.nologo {
        println!("cinder {}: incremental C++ interpreter", env!("CARGO_PKG_VERSION"));
        println!("Type C++ code and press enter to run it. Type .help for commands.");
    }
    repl(&mut session, &mut meta, &mut emitter);
}

fn parse_args(args: &[String]) -> Args {
    let mut parsed = Args {
        nologo: false,
        verbose: false,
        include_paths: Vec::new(),
        files: Vec::new(),
    };
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--nologo" => parsed.nologo = true,
            "-v" | "--verbose" => parsed.verbose = true,
            "--version" => {
                println!("cinder {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            "-I" => {
                let Some(dir) = args.get(i + 1) else {
                    eprintln!("error: -I requires a directory");
                    std::process::exit(1);
                };
                parsed.include_paths.push(PathBuf::from(dir));
                i += 1;
            }
            _ => {
                if let Some(dir) = arg.strip_prefix("-I") {
                    parsed.include_paths.push(PathBuf::from(dir));
                } else if arg.starts_with('-') {
                    eprintln!("error: unknown option '{arg}'");
                    print_usage();
                    std::process::exit(1);
                } else {
                    parsed.files.push(arg.to_owned());
                }
            }
        }
        i += 1;
    }
    parsed
}

fn print_usage() {
    eprintln!("Usage: cinder [options] [file[(args)]...]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --nologo         Do not print the banner");
    eprintln!("  -v, --verbose    Log compiler phases as a tree");
    eprintln!("  -I <dir>         Add an include search path");
    eprintln!("  --version        Print the version");
    eprintln!("  -h, --help       Show this help");
    eprintln!();
    eprintln!("Each file is loaded like `.x` before the prompt appears.");
    eprintln!("Set CINDER_LOG (or RUST_LOG) to filter log output.");
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let directives = std::env::var("CINDER_LOG").or_else(|_| std::env::var("RUST_LOG"));
    let filter = match directives {
        Ok(directives) => EnvFilter::new(directives),
        Err(_) if verbose => EnvFilter::new("debug"),
        Err(_) => return,
    };

    if verbose {
        tracing_subscriber::registry()
            .with(tracing_tree::HierarchicalLayer::new(2).with_writer(io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .init();
    }
}

fn repl<W: Write>(session: &mut Session, meta: &mut MetaProcessor, emitter: &mut TerminalEmitter<W>) {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut pending = String::new();
    loop {
        if meta.is_continuing() {
            print!("{:width$}", "", width = 4 * meta.depth().max(1));
        } else {
            print!("{PROMPT}");
            pending.clear();
        }
        let _ = io::stdout().flush();

        let Some(Ok(line)) = lines.next() else {
            println!();
            break;
        };
        pending.push_str(&line);
        pending.push('\n');

        match meta.process_line(session, &line) {
            Ok(LineResult::Quit) => break,
            Ok(result) => report(emitter, &pending, result),
            Err(err) => {
                eprintln!("fatal: {err}");
                std::process::exit(1);
            }
        }
    }
}

fn report<W: Write>(emitter: &mut TerminalEmitter<W>, input: &str, result: LineResult) {
    match result {
        LineResult::Processed(output) => report_output(emitter, input, &output),
        LineResult::Executed(ExecuteFileOutput { load, call }) => {
            report_output(emitter, input, &load);
            if let Some(call) = call {
                report_output(emitter, input, &call);
            }
        }
        LineResult::FileError(err) => {
            if let ExecuteFileError::LoadFailed { diagnostics, .. } = &err {
                emitter.emit_all(diagnostics, &SourceInfo::new("<input>", input));
                emitter.flush();
            }
            eprintln!("error: {err}");
        }
        LineResult::Message(text) => println!("{text}"),
        LineResult::NeedsMore { .. }
        | LineResult::Cancelled
        | LineResult::Empty
        | LineResult::Quit => {}
    }
}

fn report_output<W: Write>(emitter: &mut TerminalEmitter<W>, input: &str, output: &ProcessOutput) {
    emitter.emit_all(&output.compile.diagnostics, &SourceInfo::new("<input>", input));
    emitter.flush();
    if let Some(ast) = &output.compile.ast {
        print!("{ast}");
    }
    if let Some(err) = output.run.as_ref().and_then(|run| run.error.as_ref()) {
        eprintln!("runtime error: {err}");
    }
    if let Some(value) = &output.value {
        println!("{value}");
    }
    let _ = io::stdout().flush();
}
