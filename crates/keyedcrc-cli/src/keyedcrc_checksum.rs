//! Keyed checksum CLI
//!
//! Usage: keyedcrc_checksum <candidate> [options]
//!
//! Options:
//!   --dir <PATH>       Directory holding resource.bin and lookuptable.bin (default: .)
//!   --iterations <N>   Checksum rounds (default: 75776)
//!   --help, -h         Show help
//!
//! Example: keyedcrc_checksum 1234567 --dir ./res

use keyedcrc_search::KeyedChecksum;
use keyedcrc_search::constants::ITERATION_COUNT;
use keyedcrc_search::infra::resource_io::{
    key_material_path, load_key_material, load_lookup_table, lookup_table_path,
};
use std::env;
use std::path::PathBuf;
use std::process;

struct Args {
    candidate: String,
    dir: PathBuf,
    iterations: usize,
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <candidate> [options]", program);
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <candidate>        String to checksum (e.g., 1234567)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --dir <PATH>       Directory holding resource.bin and lookuptable.bin (default: .)");
    eprintln!("  --iterations <N>   Checksum rounds (default: {})", ITERATION_COUNT);
    eprintln!("  --help, -h         Show this help message");
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();

    let mut candidate = None;
    let mut dir = PathBuf::from(".");
    let mut iterations = ITERATION_COUNT;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--dir" => {
                i += 1;
                let value = args.get(i).ok_or("--dir requires a value")?;
                dir = PathBuf::from(value);
            }
            "--iterations" => {
                i += 1;
                let value = args.get(i).ok_or("--iterations requires a value")?;
                iterations = value
                    .parse()
                    .map_err(|_| format!("Invalid iteration count: {}", value))?;
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            value if !value.starts_with('-') => {
                if candidate.is_some() {
                    return Err(format!("Unexpected argument: {}", value));
                }
                candidate = Some(value.to_string());
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    let candidate = candidate.ok_or("Missing <candidate> argument")?;
    Ok(Args {
        candidate,
        dir,
        iterations,
    })
}

fn run(args: &Args) -> Result<u32, Box<dyn std::error::Error>> {
    let key_material = load_key_material(key_material_path(&args.dir), args.iterations)?;
    let table = load_lookup_table(lookup_table_path(&args.dir))?;
    let engine = KeyedChecksum::with_iterations(key_material.as_bytes(), &table, args.iterations)?;
    Ok(engine.compute(&args.candidate)?)
}

fn main() {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage(&env::args().next().unwrap_or_default());
            process::exit(1);
        }
    };

    match run(&args) {
        Ok(checksum) => println!("{:08X}", checksum),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
