//! xmldelta command-line tool
//!
//! Diffs two XML documents into an edit script, patches documents with
//! stored scripts, and prints change reports.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use xmldelta::report::write_report;
use xmldelta::script::write_script;
use xmldelta::xml::{parse_file, XmlPrinter};
use xmldelta::{Diff, DiffMode, EditScript, ParseOptions, Patch, PrintOptions};

/// Ordered tree diff and patch for XML documents
#[derive(Parser)]
#[command(name = "xmldelta")]
#[command(version)]
#[command(about = "Ordered tree diff and patch for XML documents", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the edit script that turns the left document into the right
    #[command(visible_alias = "d")]
    Diff {
        /// Left (original) file
        left: String,
        /// Right (target) file
        right: String,
        /// Output file (default: stdout)
        output: Option<String>,

        #[command(flatten)]
        diff: DiffArgs,
    },

    /// Apply a stored edit script to a document
    #[command(visible_alias = "p")]
    Patch {
        /// Document to patch
        tree: String,
        /// Edit script file
        script: String,
        /// Output file (default: stdout)
        output: Option<String>,

        /// Indent the patched document
        #[arg(long)]
        pretty: bool,

        /// Keep whitespace-only text nodes
        #[arg(long)]
        keep_whitespace: bool,
    },

    /// Print a stored edit script as a change report
    #[command(visible_alias = "r")]
    Report {
        /// Edit script file
        script: String,
    },

    /// Diff two documents and print the change report
    #[command(visible_alias = "c")]
    Changes {
        /// Left (original) file
        left: String,
        /// Right (target) file
        right: String,

        #[command(flatten)]
        diff: DiffArgs,
    },
}

#[derive(Args)]
struct DiffArgs {
    /// Keep left-only nodes instead of removing them
    #[arg(short, long)]
    merge: bool,

    /// Keep whitespace-only text nodes
    #[arg(long)]
    keep_whitespace: bool,
}

impl DiffArgs {
    fn mode(&self) -> DiffMode {
        if self.merge {
            DiffMode::Merge
        } else {
            DiffMode::Transform
        }
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            keep_whitespace: self.keep_whitespace,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Diff {
            left,
            right,
            output,
            diff,
        } => run_diff(&left, &right, output.as_deref(), &diff),
        Commands::Patch {
            tree,
            script,
            output,
            pretty,
            keep_whitespace,
        } => run_patch(&tree, &script, output.as_deref(), pretty, keep_whitespace),
        Commands::Report { script } => run_report(&script),
        Commands::Changes { left, right, diff } => run_changes(&left, &right, &diff),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over the flags.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .init();
}

fn open_output(path: Option<&str>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    })
}

fn load_script(path: &str) -> Result<EditScript, Box<dyn std::error::Error>> {
    info!(path, "reading edit script");
    let text = fs::read_to_string(path)?;
    Ok(EditScript::from_xml(&text)?)
}

fn compute_diff(
    left_path: &str,
    right_path: &str,
    args: &DiffArgs,
) -> Result<EditScript, Box<dyn std::error::Error>> {
    let options = args.parse_options();
    info!(path = left_path, "parsing left document");
    let left = parse_file(left_path, &options)?;
    info!(path = right_path, "parsing right document");
    let right = parse_file(right_path, &options)?;

    let script = Diff::new(args.mode()).diff(&left, &right)?;
    info!(ops = script.op_count(), "diff complete");
    Ok(script)
}

/// Writes the encoded edit script.
fn run_diff(
    left_path: &str,
    right_path: &str,
    output_path: Option<&str>,
    args: &DiffArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let script = compute_diff(left_path, right_path, args)?;
    let mut output = open_output(output_path)?;
    write_script(&script, &mut output)?;
    output.flush()?;
    Ok(())
}

/// Applies a stored script and writes the patched document.
fn run_patch(
    tree_path: &str,
    script_path: &str,
    output_path: Option<&str>,
    pretty: bool,
    keep_whitespace: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(path = tree_path, "parsing document");
    let mut tree = parse_file(tree_path, &ParseOptions { keep_whitespace })?;
    let script = load_script(script_path)?;

    Patch::new().apply(&mut tree, &script)?;
    info!("patch complete");

    let options = PrintOptions {
        pretty,
        ..PrintOptions::default()
    };
    let mut printer = XmlPrinter::new(open_output(output_path)?, options);
    printer.print(&tree)?;
    Ok(())
}

/// Prints the report for a stored script.
fn run_report(script_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let script = load_script(script_path)?;
    let mut stdout = io::stdout().lock();
    write_report(&script, &mut stdout)?;
    Ok(())
}

/// Diffs two documents and prints the report.
fn run_changes(
    left_path: &str,
    right_path: &str,
    args: &DiffArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let script = compute_diff(left_path, right_path, args)?;
    let mut stdout = io::stdout().lock();
    write_report(&script, &mut stdout)?;
    Ok(())
}
