use clap::error::ErrorKind;
use clap::Parser;
use dungeon_hunt_core::{save_heat_map, Hunt, HuntConfig, HuntError, ManaGrid};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Heat maps written after every hunt: (file name, restrict to visited cells)
const HEAT_MAPS: [(&str, bool); 2] = [
    ("visualiseSearch.png", false),
    ("visualiseSearchPath.png", true),
];

/// Parallel hill-climbing hunt for the Dungeon Master
#[derive(Parser, Debug)]
#[command(name = "dungeon-hunter")]
#[command(about = "Parallel hill-climbing hunt over a random mana field", long_about = None)]
struct Args {
    /// Half-side of the square dungeon
    #[arg(allow_negative_numbers = true)]
    gate_size: i32,

    /// Climbers per unit area
    #[arg(allow_negative_numbers = true)]
    density: f64,

    /// Random seed (0 = nondeterministic)
    #[arg(allow_negative_numbers = true)]
    seed: i64,

    /// Worker threads (default: one per hardware thread)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Directory the heat maps are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Skip writing heat maps
    #[arg(long)]
    no_images: bool,
}

fn main() -> ExitCode {
    init_tracing();

    let argv: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => return usage_error(&err, positional_count(&argv)),
    };

    match hunt(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Count the tokens meant as positionals: everything except the known
/// options and their values. Unknown dash-prefixed tokens such as `-x` count.
fn positional_count(argv: &[String]) -> usize {
    let mut count = 0;
    let mut tokens = argv.iter();
    while let Some(token) = tokens.next() {
        match token.as_str() {
            "--no-images" => {}
            "-t" | "--threads" | "--out-dir" => {
                tokens.next();
            }
            t if t.starts_with("--threads=") || t.starts_with("--out-dir=") => {}
            _ => count += 1,
        }
    }
    count
}

/// Map clap failures onto the hunter's exit contract.
///
/// Exactly three positionals that still fail to parse are bad values, not a
/// bad count.
fn usage_error(err: &clap::Error, positionals: usize) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            ExitCode::SUCCESS
        }
        ErrorKind::MissingRequiredArgument
        | ErrorKind::UnknownArgument
        | ErrorKind::TooManyValues
        | ErrorKind::WrongNumberOfValues
            if positionals != 3 =>
        {
            println!("Incorrect number of command line arguments provided.");
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Error: All arguments must be numeric.");
            ExitCode::FAILURE
        }
    }
}

fn hunt(args: &Args) -> Result<(), HuntError> {
    let mut config = HuntConfig::new(args.gate_size, args.density, args.seed);
    if let Some(threads) = args.threads {
        config = config.with_workers(threads);
    }

    let mut hunt = Hunt::new(config)?;
    let report = hunt.run()?;
    print!("{report}");

    if !args.no_images {
        write_heat_maps(hunt.grid(), &args.out_dir);
    }
    Ok(())
}

/// The hunt has already succeeded; a failed write is logged, not fatal.
fn write_heat_maps(grid: &ManaGrid, out_dir: &Path) {
    for (name, path_only) in HEAT_MAPS {
        // Keep the bare file name for the working directory
        let path = if out_dir == Path::new(".") {
            PathBuf::from(name)
        } else {
            out_dir.join(name)
        };
        match save_heat_map(grid, path_only, &path) {
            Ok(()) => {
                info!("Heat map written to {}", path.display());
                println!("map saved to {}", path.display());
            }
            Err(err) => error!("Could not save {}: {err}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_owned).collect()
    }

    #[test]
    fn test_positional_count_skips_options() {
        assert_eq!(positional_count(&argv("10 0.5 1")), 3);
        assert_eq!(positional_count(&argv("10 0.5 1 --threads 4 --no-images")), 3);
        assert_eq!(positional_count(&argv("--out-dir maps 10 0.5 1 -t 2")), 3);
        assert_eq!(positional_count(&argv("--threads=2 10 0.5")), 2);
        assert_eq!(positional_count(&argv("10 0.5 1 4")), 4);
        assert_eq!(positional_count(&[]), 0);
    }

    #[test]
    fn test_dash_prefixed_value_counts_as_positional() {
        assert_eq!(positional_count(&argv("10 -x 1")), 3);
        assert_eq!(positional_count(&argv("-3 1 1")), 3);
    }

    #[test]
    fn test_args_accept_negative_values() {
        let args = Args::try_parse_from(["dungeon-hunter", "-3", "-0.5", "-1"]).expect("parses");
        assert_eq!(args.gate_size, -3);
        assert_eq!(args.seed, -1);
        assert!(!args.no_images);
        assert_eq!(args.out_dir, PathBuf::from("."));
    }
}
