//! Example: Diff two XML documents and show the result
//!
//! Prints the encoded edit script on stdout and the change report on stderr.
//!
//! Usage: cargo run --example diff <left.xml> <right.xml> [--merge]

use std::env;
use std::io;

use xmldelta::xml::parse_file;
use xmldelta::{report, Diff, DiffMode, ParseOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 || args.len() > 4 {
        eprintln!("Usage: {} <left.xml> <right.xml> [--merge]", args[0]);
        std::process::exit(1);
    }

    let mode = match args.get(3).map(String::as_str) {
        Some("--merge") => DiffMode::Merge,
        Some(other) => {
            eprintln!("Unknown option: {}", other);
            std::process::exit(1);
        }
        None => DiffMode::Transform,
    };

    let options = ParseOptions::default();
    let left = parse_file(&args[1], &options)?;
    let right = parse_file(&args[2], &options)?;

    let script = Diff::new(mode).diff(&left, &right)?;
    xmldelta::script::write_script(&script, &mut io::stdout())?;

    eprint!("{}", report(&script));
    eprintln!("{} ops in total", script.op_count());

    Ok(())
}
