//! VM Translator - Main Entry Point
//!
//! Translates a `.vm` file, or every `.vm` file in a directory, into a
//! single `.asm` output.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use log::{error, info};
use vmtranslator::{VmUnit, translate};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Discovers the `.vm` files to translate for `path`, sorted lexicographically
/// by path so that repeated runs over the same directory are deterministic.
fn discover_vm_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "vm"))
        .collect();
    files.sort();
    Ok(files)
}

fn output_path(input: &Path) -> PathBuf {
    if input.is_dir() {
        let dir_name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "out".to_string());
        input.join(format!("{dir_name}.asm"))
    } else {
        input.with_extension("asm")
    }
}

fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <file.vm|directory>", args[0]);
        process::exit(1);
    }

    let input = Path::new(&args[1]);
    let files = discover_vm_files(input)?;
    if files.is_empty() {
        return Err(format!("no .vm files found under {}", input.display()).into());
    }
    info!("translating {} VM file(s)", files.len());

    let contents: Vec<(String, String)> = files
        .iter()
        .map(|f| Ok((base_name(f), fs::read_to_string(f)?)))
        .collect::<Result<Vec<_>>>()?;

    let units: Vec<VmUnit> = contents
        .iter()
        .map(|(name, src)| VmUnit {
            base_name: name,
            source: src,
        })
        .collect();

    let asm = translate(&units)?;

    let out_path = output_path(input);
    fs::write(&out_path, asm)?;
    println!("Translation complete: {} -> {}", input.display(), out_path.display());
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
