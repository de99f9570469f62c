//! Synthetic resource creation CLI
//!
//! Usage: keyedcrc_create [options]
//!
//! Writes `resource.bin` (seeded key material) and `lookuptable.bin` (standard
//! CRC32 table) so the search can run without the original resource files.
//!
//! Options:
//!   --dir <PATH>          Output directory (default: .)
//!   --seed <N>            Key material seed (default: 0)
//!   --size <N>            Key material size in bytes (default: 75776)
//!   --plant <CANDIDATE>   Also print the checksum of CANDIDATE under the new resources
//!   --help, -h            Show help
//!
//! Example: keyedcrc_create --dir ./res --seed 42 --plant 1234

use keyedcrc_search::app::generator::{create_resources, generated_checksum};
use keyedcrc_search::constants::KEY_MATERIAL_SIZE;
use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

struct Args {
    dir: PathBuf,
    seed: u64,
    size: usize,
    plant: Option<String>,
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --dir <PATH>          Output directory (default: .)");
    eprintln!("  --seed <N>            Key material seed (default: 0)");
    eprintln!("  --size <N>            Key material size in bytes (default: {})", KEY_MATERIAL_SIZE);
    eprintln!("  --plant <CANDIDATE>   Also print the checksum of CANDIDATE under the new resources");
    eprintln!("  --help, -h            Show this help message");
}

fn parse_number(value: &str) -> Result<u64, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|_| format!("Invalid number: {}", value))
}

fn parse_size(value: &str) -> Result<usize, String> {
    let parsed = parse_number(value)?;
    usize::try_from(parsed).map_err(|_| format!("Number out of range: {}", value))
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();

    let mut parsed = Args {
        dir: PathBuf::from("."),
        seed: 0,
        size: KEY_MATERIAL_SIZE,
        plant: None,
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        if matches!(flag, "--help" | "-h") {
            print_usage(&args[0]);
            process::exit(0);
        }

        i += 1;
        let value = args
            .get(i)
            .ok_or_else(|| format!("{} requires a value", flag))?;
        match flag {
            "--dir" => parsed.dir = PathBuf::from(value),
            "--seed" => parsed.seed = parse_number(value)?,
            "--size" => parsed.size = parse_size(value)?,
            "--plant" => parsed.plant = Some(value.clone()),
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    Ok(parsed)
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

    println!(
        "Creating resources in {} (seed {}, {} bytes of key material)",
        args.dir.display(),
        args.seed,
        args.size
    );

    let start = Instant::now();
    let paths = match create_resources(&args.dir, args.seed, args.size) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    println!("Key material: {}", paths.key_material.display());
    println!("Lookup table: {}", paths.lookup_table.display());
    println!("Completed in {:.2} seconds.", start.elapsed().as_secs_f64());

    if let Some(candidate) = args.plant {
        match generated_checksum(&candidate, args.seed, args.size) {
            Ok(checksum) => {
                println!("Checksum of {}: {:08X}", candidate, checksum);
                println!(
                    "Search with: keyedcrc_search --dir {} --target {:08X} --iterations {}",
                    args.dir.display(),
                    checksum,
                    args.size
                );
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    }
}
