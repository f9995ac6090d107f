//! Jack Compiler - Main Entry Point
//!
//! Compiles a `.jack` file, or every `.jack` file in a directory, each
//! into its own `.vm` output alongside the source.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use jackcompiler::compile;
use log::{error, info};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Discovers the `.jack` files to compile for `path`, sorted
/// lexicographically so repeated runs over the same directory are
/// deterministic.
fn discover_jack_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "jack"))
        .collect();
    files.sort();
    Ok(files)
}

fn output_path(input: &Path) -> PathBuf {
    input.with_extension("vm")
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <file.jack|directory>", args[0]);
        process::exit(1);
    }

    let input = Path::new(&args[1]);
    let files = discover_jack_files(input)?;
    if files.is_empty() {
        return Err(format!("no .jack files found under {}", input.display()).into());
    }
    info!("compiling {} Jack file(s)", files.len());

    for file in &files {
        let source = fs::read_to_string(file)?;
        let vm = compile(&source).map_err(|e| format!("{}: {e}", file.display()))?;
        let out_path = output_path(file);
        fs::write(&out_path, vm)?;
        println!("Compiled: {} -> {}", file.display(), out_path.display());
    }

    Ok(())
}

fn main() {
    pretty_env_logger::init();
    if let Err(e) = run() {
        error!("{e}");
        eprintln!("error: {e}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_swaps_extension() {
        assert_eq!(output_path(Path::new("Main.jack")), PathBuf::from("Main.vm"));
    }
}
