//! YRM command-line tool for validating and transcoding YRM documents.
//!
//! Usage: yrm [OPTIONS] [FILE|DIR]
//!
//! Options:
//!   -t, --to <FORMAT>      Output format (json, yrm, yaml, toml, cbor, diag)
//!   -w, --write            Write output to file with inferred name
//!   -o, --output <FILE>    Write output to specified file
//!   --check                Check if file is valid (exit 0 if valid, 1 if invalid)
//!   -v, --verbose          Log more (repeatable)
//!   -h, --help             Print help
//!   -V, --version          Print version

use libyrm::{encode, parse_with_filename, Format, Value};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod transcode;

/// Output formats the tool can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Json,
    Yrm,
    Yaml,
    Toml,
    Cbor,
    CborDiag,
}

/// Options shared by every input processed in one run.
struct Options<'a> {
    output: Output,
    output_file: Option<&'a str>,
    write_back: bool,
    check_only: bool,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut output = Output::Json;
    let mut write_back = false;
    let mut output_file: Option<&str> = None;
    let mut check_only = false;
    let mut verbosity = 0u8;
    let mut input_path: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-V" | "--version" => {
                println!("yrm {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "-t" | "--to" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: -t requires a format argument");
                    process::exit(1);
                }
                output = match parse_format(&args[i]) {
                    Some(format) => format,
                    None => {
                        eprintln!("Error: Unknown format: {}", args[i]);
                        process::exit(1);
                    }
                };
            }
            "-w" | "--write" => {
                write_back = true;
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --output requires an argument");
                    process::exit(1);
                }
                output_file = Some(&args[i]);
            }
            "--check" => {
                check_only = true;
            }
            "-v" | "--verbose" => {
                verbosity = verbosity.saturating_add(1);
            }
            "-vv" => {
                verbosity = verbosity.saturating_add(2);
            }
            "-" => {
                // Explicit stdin; input_path stays None
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                process::exit(1);
            }
            _ => {
                if input_path.is_some() {
                    eprintln!("Error: Multiple input paths not supported");
                    process::exit(1);
                }
                input_path = Some(&args[i]);
            }
        }
        i += 1;
    }

    init_logging(verbosity);

    if write_back && output_file.is_some() {
        eprintln!("Error: --write and --output are mutually exclusive");
        process::exit(1);
    }

    let options = Options {
        output,
        output_file,
        write_back,
        check_only,
    };

    if let Some(path) = input_path {
        if Path::new(path).is_dir() {
            if output_file.is_some() {
                eprintln!("Error: --output cannot be used with directory input");
                process::exit(1);
            }
            process::exit(process_directory(path, &options));
        }
    }

    let input = match input_path {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path, e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading stdin: {}", e);
                process::exit(1);
            }
            buffer
        }
    };

    process::exit(process_input(&input, input_path, &options));
}

/// Install the stderr log subscriber.
///
/// Without `-v`, `RUST_LOG` decides and falls back to `warn`; each `-v`
/// raises the level (`debug`, then `trace`).
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn parse_format(s: &str) -> Option<Output> {
    match s {
        "json" => Some(Output::Json),
        "yrm" => Some(Output::Yrm),
        "yaml" | "yml" => Some(Output::Yaml),
        "toml" => Some(Output::Toml),
        "cbor" => Some(Output::Cbor),
        "diag" => Some(Output::CborDiag),
        _ => None,
    }
}

fn format_extension(format: Output) -> &'static str {
    match format {
        Output::Json => "json",
        Output::Yrm => "yrm",
        Output::Yaml => "yaml",
        Output::Toml => "toml",
        Output::Cbor => "cbor",
        Output::CborDiag => "diag",
    }
}

/// Process every `.yrm` file in a directory; returns the exit code.
fn process_directory(dir_path: &str, options: &Options) -> i32 {
    let entries = match fs::read_dir(dir_path) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error reading directory {}: {}", dir_path, e);
            return 1;
        }
    };

    let mut paths: Vec<_> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|e| e == "yrm").unwrap_or(false))
        .collect();
    paths.sort();
    debug!(dir = dir_path, files = paths.len(), "processing directory");

    let mut had_errors = false;
    for path in paths {
        let path_str = path.to_string_lossy();
        let input = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path_str, e);
                had_errors = true;
                continue;
            }
        };
        if process_input(&input, Some(&path_str), options) != 0 {
            had_errors = true;
        }
    }

    if had_errors {
        1
    } else {
        0
    }
}

/// Parse one document and write it out; returns the exit code.
fn process_input(input: &str, input_file: Option<&str>, options: &Options) -> i32 {
    let filename = input_file.map(|p| {
        Path::new(p)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| p.to_string())
    });

    let doc = match parse_with_filename(input, filename.as_deref()) {
        Ok(doc) => doc,
        Err(e) => {
            if let Some(path) = input_file {
                eprintln!("{}: {}", path, e);
            } else {
                eprintln!("Parse error: {}", e);
            }
            return 1;
        }
    };

    if options.check_only {
        println!("{}: ok", input_file.unwrap_or("<stdin>"));
        return 0;
    }

    info!(file = input_file.unwrap_or("<stdin>"), format = ?options.output, "transcoding");
    output_value(&Value::Mapping(doc), input_file, options)
}

fn output_value(value: &Value, input_file: Option<&str>, options: &Options) -> i32 {
    let text = match options.output {
        Output::Json => encode(value, Format::Json).map_err(|e| e.to_string()),
        Output::Yrm => encode(value, Format::Yrm).map_err(|e| e.to_string()),
        Output::Yaml => transcode::yaml::encode(value),
        Output::Toml => transcode::toml::encode(value),
        Output::CborDiag => transcode::cbor::diagnostic(&transcode::cbor::encode(value)),
        Output::Cbor => {
            let bytes = transcode::cbor::encode(value);
            return write_binary_output(&bytes, input_file, options);
        }
    };

    match text {
        Ok(output) => write_text_output(&output, input_file, options),
        Err(e) => {
            eprintln!(
                "Error: Cannot convert to {}: {}",
                format_extension(options.output).to_uppercase(),
                e
            );
            1
        }
    }
}

fn write_text_output(output: &str, input_file: Option<&str>, options: &Options) -> i32 {
    if options.output_file.is_none() && !options.write_back {
        print!("{}", output);
        if !output.ends_with('\n') {
            println!();
        }
        return 0;
    }
    write_file_output(output.as_bytes(), input_file, options)
}

fn write_binary_output(output: &[u8], input_file: Option<&str>, options: &Options) -> i32 {
    if options.output_file.is_none() && !options.write_back {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = handle.write_all(output) {
            eprintln!("Error writing to stdout: {}", e);
            return 1;
        }
        return 0;
    }
    write_file_output(output, input_file, options)
}

/// Write to `--output`, or next to the input with `--write`.
fn write_file_output(output: &[u8], input_file: Option<&str>, options: &Options) -> i32 {
    let output_path = match (options.output_file, input_file) {
        (Some(path), _) => Path::new(path).to_path_buf(),
        (None, Some(input_path)) => {
            Path::new(input_path).with_extension(format_extension(options.output))
        }
        (None, None) => {
            eprintln!("Error: --write requires an input file");
            return 1;
        }
    };
    if let Err(e) = fs::write(&output_path, output) {
        eprintln!("Error writing {}: {}", output_path.display(), e);
        return 1;
    }
    debug!(path = %output_path.display(), bytes = output.len(), "wrote output");
    0
}

fn print_help() {
    println!(
        "yrm - YRM command-line tool

USAGE:
    yrm [OPTIONS] [FILE|DIR]

ARGS:
    [FILE|DIR]    Input file or directory (reads from stdin if not provided)
                  When a directory is given, processes all .yrm files in it

OPTIONS:
    -t, --to <FORMAT>      Output format [default: json]
                           Supported: json, yrm, yaml, toml, cbor, diag

    -w, --write            Write output to file with inferred extension

    -o, --output <FILE>    Write output to specified file (not valid with directory input)

    --check                Check if input is valid (exit 0 if valid, 1 if invalid)

    -v, --verbose          Log parser activity to stderr (-v debug, -vv trace);
                           without it, RUST_LOG selects the filter [default: warn]

    -h, --help             Print help

    -V, --version          Print version

EXAMPLES:
    # Validate a YRM file
    yrm --check config.yrm

    # Validate all YRM files in a directory
    yrm --check ./configs/

    # Convert YRM to JSON (default)
    yrm config.yrm

    # Rewrite a file in canonical YRM form
    yrm -t yrm config.yrm -o config.yrm

    # Convert YRM to YAML or TOML next to the input
    yrm -t yaml -w config.yrm
    yrm -t toml -w config.yrm

    # Convert YRM to CBOR (binary)
    yrm -t cbor config.yrm -o config.cbor

    # View the CBOR encoding in diagnostic notation (RFC 8949 §8)
    yrm -t diag config.yrm"
    );
}
