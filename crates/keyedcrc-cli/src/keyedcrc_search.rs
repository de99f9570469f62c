//! Keyed CRC32 preimage search CLI
//!
//! Usage: keyedcrc_search [options]
//!
//! Without options, reads `resource.bin` and `lookuptable.bin` from the working
//! directory, enumerates the counters 0 to 0xFFFFFFFE and prints the first
//! candidate whose checksum is 0x331252C3, followed by the checksum in
//! uppercase hex:
//!
//!   keyedcrc_search
//!   keyedcrc_search --dir ./res --target 1A2B3C4D --end 1000000 --verbose
//!
//! Exit codes: 0 match found, 1 error, 2 no match in the searched range.

use keyedcrc_search::{
    CandidateRange, ITERATION_COUNT, REFERENCE_COUNTER_LIMIT, ResourceError, SearchError,
    SearchJob, SearchOptions, Strategy, TARGET_CHECKSUM,
};
use std::env;
use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

/// Exit code when the range holds no match or the deadline expired
const EXIT_NOT_FOUND: i32 = 2;

struct Args {
    dir: PathBuf,
    key_material: Option<PathBuf>,
    lookup_table: Option<PathBuf>,
    target: u32,
    start: u64,
    end: u64,
    iterations: usize,
    timeout: Option<Duration>,
    threads: Option<usize>,
    sequential: bool,
    verbose: bool,
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --dir <PATH>           Directory holding resource.bin and lookuptable.bin (default: .)");
    eprintln!("  --key-material <PATH>  Key material file (overrides --dir)");
    eprintln!("  --lookup-table <PATH>  Lookup table file (overrides --dir)");
    eprintln!("  --target <HEX>         Target checksum (default: {:08X})", TARGET_CHECKSUM);
    eprintln!("  --start <N>            First counter (default: 0)");
    eprintln!("  --end <N>              Exclusive last counter (default: {})", REFERENCE_COUNTER_LIMIT);
    eprintln!("  --iterations <N>       Checksum rounds per candidate (default: {})", ITERATION_COUNT);
    eprintln!("  --timeout <SECS>       Give up after this many seconds");
    eprintln!("  --threads <N>          Worker threads (default: all cores)");
    eprintln!("  --sequential           Search on a single thread");
    eprintln!("  --verbose, -v          Report settings and progress on stderr");
    eprintln!("  --help, -h             Show this help message");
}

fn parse_u64(value: &str) -> Result<u64, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|_| format!("Invalid number: {}", value))
}

fn parse_usize(value: &str) -> Result<usize, String> {
    let parsed = parse_u64(value)?;
    usize::try_from(parsed).map_err(|_| format!("Number out of range: {}", value))
}

fn parse_hex_u32(value: &str) -> Result<u32, String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u32::from_str_radix(digits, 16).map_err(|_| format!("Invalid target checksum: {}", value))
}

/// Advance past a flag and return its value
fn take_value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str, String> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a value", flag))
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();

    let mut parsed = Args {
        dir: PathBuf::from("."),
        key_material: None,
        lookup_table: None,
        target: TARGET_CHECKSUM,
        start: 0,
        end: REFERENCE_COUNTER_LIMIT,
        iterations: ITERATION_COUNT,
        timeout: None,
        threads: None,
        sequential: false,
        verbose: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--dir" => parsed.dir = PathBuf::from(take_value(&args, &mut i)?),
            "--key-material" => {
                parsed.key_material = Some(PathBuf::from(take_value(&args, &mut i)?));
            }
            "--lookup-table" => {
                parsed.lookup_table = Some(PathBuf::from(take_value(&args, &mut i)?));
            }
            "--target" => parsed.target = parse_hex_u32(take_value(&args, &mut i)?)?,
            "--start" => parsed.start = parse_u64(take_value(&args, &mut i)?)?,
            "--end" => parsed.end = parse_u64(take_value(&args, &mut i)?)?,
            "--iterations" => parsed.iterations = parse_usize(take_value(&args, &mut i)?)?,
            "--timeout" => {
                let secs = parse_u64(take_value(&args, &mut i)?)?;
                parsed.timeout = Some(Duration::from_secs(secs));
            }
            "--threads" => parsed.threads = Some(parse_usize(take_value(&args, &mut i)?)?),
            "--sequential" => parsed.sequential = true,
            "--verbose" | "-v" => parsed.verbose = true,
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    Ok(parsed)
}

fn format_search_error(err: &SearchError) -> String {
    match err {
        SearchError::Resource(ResourceError::NotFound { path }) => format!(
            "Resource file '{}' not found.\nRun keyedcrc_create to generate a synthetic resource set.",
            path.display()
        ),
        SearchError::Resource(ResourceError::TooShort {
            path,
            expected,
            found,
        }) => format!(
            "Resource file '{}' is too short: {} bytes, at least {} required.\nCheck --iterations or regenerate the file.",
            path.display(),
            found,
            expected
        ),
        other => other.to_string(),
    }
}

fn progress_callback(searched: u64, total: u64) {
    let progress = if total > 0 {
        (searched as f64 / total as f64) * 100.0
    } else {
        100.0
    };
    eprint!(
        "\r[Search] Progress: {:.4}% ({}/{})",
        progress, searched, total
    );
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

    let range = match CandidateRange::new(args.start, args.end) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let strategy = if args.sequential {
        Strategy::Sequential
    } else {
        Strategy::Parallel
    };

    let mut job = SearchJob::reference(&args.dir)
        .with_target(args.target)
        .with_iterations(args.iterations)
        .with_strategy(strategy);
    if let Some(path) = args.key_material {
        job.key_material_path = path;
    }
    if let Some(path) = args.lookup_table {
        job.lookup_table_path = path;
    }

    let mut options = SearchOptions::default().with_range(range);
    if let Some(timeout) = args.timeout {
        options = options.with_deadline(timeout);
    }
    if let Some(threads) = args.threads {
        options = options.with_threads(threads);
    }

    if args.verbose {
        eprintln!("Key material: {}", job.key_material_path.display());
        eprintln!("Lookup table: {}", job.lookup_table_path.display());
        eprintln!(
            "Searching counters {}..{} for checksum {:08X} ({:?}, {} rounds per candidate)",
            range.start(),
            range.end(),
            job.target,
            job.strategy,
            job.iterations
        );
    }

    let start = Instant::now();
    let result = if args.verbose {
        job.run(options.with_progress(progress_callback))
    } else {
        job.run(options)
    };
    let elapsed = start.elapsed();

    if args.verbose {
        eprintln!();
    }

    match result {
        Ok(found) => {
            if args.verbose {
                eprintln!(
                    "Found after {} candidates in {:.2} seconds.",
                    found.searched,
                    elapsed.as_secs_f64()
                );
            }
            println!("{} {:X}", found.candidate, found.checksum);
        }
        Err(e) if e.is_not_found() => {
            if args.verbose {
                eprintln!("{} ({:.2} seconds)", e, elapsed.as_secs_f64());
            }
            process::exit(EXIT_NOT_FOUND);
        }
        Err(e) => {
            eprintln!("Error: {}", format_search_error(&e));
            process::exit(1);
        }
    }
}
