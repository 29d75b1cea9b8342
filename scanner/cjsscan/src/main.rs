//! CommonJS export scanner CLI.
//!
//! Scans module files (or stdin) and reports the exported names and
//! re-exported module specifiers each one would surface to a loader.

use std::io::Read;
use std::process::ExitCode;

use cjs_scan_core::{scan_bytes, ScanFlags, ScanMode, ScanOptions};
use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

/// Per-file scan report, also the JSON output shape.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    exports: Vec<String>,
    reexports: Vec<String>,
    /// `true` when the scan degraded; `degradations` says how.
    partial: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    degradations: Vec<&'static str>,
}

/// Parsed `scan` subcommand arguments.
#[derive(Debug, PartialEq, Eq)]
struct ScanArgs {
    options: ScanOptions,
    json: bool,
    inputs: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(2);
    }

    match args[1].as_str() {
        "scan" => match parse_scan_args(&args[2..]) {
            Ok(scan_args) => run_scan(&scan_args),
            Err(message) => {
                eprintln!("error: {message}");
                print_usage();
                ExitCode::from(2)
            }
        },
        "help" | "-h" | "--help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        other => {
            eprintln!("error: unknown command `{other}`");
            print_usage();
            ExitCode::from(2)
        }
    }
}

fn print_usage() {
    eprintln!("Usage: cjsscan scan <file.js | -> [more files...] [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --strict          Stop recording after the first structural desync");
    eprintln!("  --max-depth=<n>   Bracket nesting ceiling (default 256)");
    eprintln!("  --json            Emit a JSON report array instead of text");
    eprintln!();
    eprintln!("Use `-` to read module source from stdin.");
}

fn parse_scan_args(args: &[String]) -> Result<ScanArgs, String> {
    let mut options = ScanOptions::default();
    let mut json = false;
    let mut inputs = Vec::new();

    for arg in args {
        if arg == "--strict" {
            options.mode = ScanMode::Strict;
        } else if arg == "--json" {
            json = true;
        } else if let Some(value) = arg.strip_prefix("--max-depth=") {
            options.max_depth = value
                .parse()
                .map_err(|_| format!("invalid --max-depth value `{value}`"))?;
        } else if arg.starts_with('-') && arg != "-" {
            return Err(format!("unknown option `{arg}`"));
        } else {
            inputs.push(arg.clone());
        }
    }

    if inputs.is_empty() {
        return Err("no input files".to_owned());
    }
    Ok(ScanArgs {
        options,
        json,
        inputs,
    })
}

fn run_scan(args: &ScanArgs) -> ExitCode {
    // Read inputs up front (stdin can only be drained once), then scan in
    // parallel; collect keeps the input order stable.
    let mut sources: Vec<(String, Vec<u8>)> = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        match read_input(input) {
            Ok(bytes) => sources.push((input.clone(), bytes)),
            Err(err) => {
                eprintln!("error: cannot read `{input}`: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    let reports: Vec<Result<FileReport, String>> = sources
        .par_iter()
        .map(|(name, bytes)| scan_one(name, bytes, &args.options))
        .collect();

    let mut failed = false;
    let mut ok_reports = Vec::with_capacity(reports.len());
    for report in reports {
        match report {
            Ok(report) => {
                if report.partial {
                    warn!(
                        file = report.file.as_str(),
                        degradations = ?report.degradations,
                        "scan degraded; results may be partial"
                    );
                }
                ok_reports.push(report);
            }
            Err(message) => {
                eprintln!("error: {message}");
                failed = true;
            }
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&ok_reports) {
            Ok(body) => println!("{body}"),
            Err(err) => {
                eprintln!("error: cannot serialize report: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        for report in &ok_reports {
            print_text_report(report);
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn read_input(input: &str) -> std::io::Result<Vec<u8>> {
    if input == "-" {
        let mut bytes = Vec::new();
        std::io::stdin().read_to_end(&mut bytes)?;
        Ok(bytes)
    } else {
        std::fs::read(input)
    }
}

fn scan_one(name: &str, bytes: &[u8], options: &ScanOptions) -> Result<FileReport, String> {
    let output = scan_bytes(bytes, options).map_err(|err| format!("{name}: {err}"))?;
    Ok(FileReport {
        file: name.to_owned(),
        exports: output.exports,
        reexports: output.reexports,
        partial: !output.flags.is_empty(),
        degradations: flag_names(output.flags),
    })
}

fn flag_names(flags: ScanFlags) -> Vec<&'static str> {
    let mut names = Vec::new();
    if flags.contains(ScanFlags::DEPTH_LIMIT_REACHED) {
        names.push("depth-limit-reached");
    }
    if flags.contains(ScanFlags::BRACKET_DESYNC) {
        names.push("bracket-desync");
    }
    if flags.contains(ScanFlags::UNTERMINATED_LITERAL) {
        names.push("unterminated-literal");
    }
    if flags.contains(ScanFlags::TEMPLATE_DEPTH_LIMIT) {
        names.push("template-depth-limit");
    }
    names
}

fn print_text_report(report: &FileReport) {
    let suffix = if report.partial { " (partial)" } else { "" };
    println!(
        "{}: {} exports, {} re-exports{}",
        report.file,
        report.exports.len(),
        report.reexports.len(),
        suffix
    );
    for name in &report.exports {
        println!("  export {name}");
    }
    for spec in &report.reexports {
        println!("  reexport {spec}");
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn parse_defaults() {
        let parsed = parse_scan_args(&strings(&["a.js"])).expect("valid args");
        assert_eq!(parsed.options, ScanOptions::default());
        assert!(!parsed.json);
        assert_eq!(parsed.inputs, ["a.js"]);
    }

    #[test]
    fn parse_all_options() {
        let parsed =
            parse_scan_args(&strings(&["--strict", "--json", "--max-depth=32", "a.js", "-"]))
                .expect("valid args");
        assert_eq!(parsed.options.mode, ScanMode::Strict);
        assert_eq!(parsed.options.max_depth, 32);
        assert!(parsed.json);
        assert_eq!(parsed.inputs, ["a.js", "-"]);
    }

    #[test]
    fn parse_rejects_unknown_option() {
        assert!(parse_scan_args(&strings(&["--nope", "a.js"])).is_err());
    }

    #[test]
    fn parse_rejects_bad_depth() {
        assert!(parse_scan_args(&strings(&["--max-depth=lots", "a.js"])).is_err());
    }

    #[test]
    fn parse_requires_inputs() {
        assert!(parse_scan_args(&strings(&["--json"])).is_err());
    }

    #[test]
    fn scan_one_reports_exports() {
        let report = scan_one(
            "mod.js",
            b"exports.a = 1; __export(require('./dep'));",
            &ScanOptions::default(),
        )
        .expect("scan succeeds");
        assert_eq!(report.exports, ["a"]);
        assert_eq!(report.reexports, ["./dep"]);
        assert!(!report.partial);
        assert!(report.degradations.is_empty());
    }

    #[test]
    fn scan_one_flags_partial() {
        let report = scan_one("mod.js", b"var s = \"runs off", &ScanOptions::default())
            .expect("scan succeeds");
        assert!(report.partial);
        assert_eq!(report.degradations, ["unterminated-literal"]);
    }

    #[test]
    fn read_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"exports.x = 1;").expect("write");
        let path = file.path().to_string_lossy().into_owned();
        let bytes = read_input(&path).expect("readable");
        assert_eq!(bytes, b"exports.x = 1;");
    }

    #[test]
    fn json_report_shape() {
        let report = FileReport {
            file: "m.js".to_owned(),
            exports: vec!["a".to_owned()],
            reexports: vec![],
            partial: false,
            degradations: vec![],
        };
        let json = serde_json::to_value(&report).expect("serializable");
        assert_eq!(json["file"], "m.js");
        assert_eq!(json["exports"][0], "a");
        // Empty degradation list is omitted entirely.
        assert!(json.get("degradations").is_none());
    }
}
