use std::{path::PathBuf, process::exit};

use chrono::{DateTime, Local};
use clap::{ArgAction, Parser};
use env_logger::{Builder, Env};
use log::{error, info, LevelFilter};
use muse_score::{run_lilypond, Composer, Configuration, MuseError};

const EXIT_CONFIG: i32 = 1;
const EXIT_OUTPUT: i32 = 2;
const EXIT_COMPOSITION: i32 = 3;
const EXIT_LILYPOND: i32 = 4;

/// Composes a melody and writes it as LilyPond score.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML configuration. Defaults are used if missing or `*`.
    config: Option<String>,
    /// Output file. By default named after the algorithm and the
    /// current time.
    output: Option<PathBuf>,
    /// Do not run lilypond on the written file.
    #[arg(short = 'x', long)]
    no_render: bool,
    /// Random seed, overrides the configured one.
    #[arg(long)]
    seed: Option<u64>,
    /// LilyPond executable.
    #[arg(long, default_value = "lilypond")]
    lilypond: PathBuf,
    /// Log more, may be repeated.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug)]
struct Failure {
    code: i32,
    error: MuseError,
}
impl Failure {
    fn with_code(code: i32) -> impl FnOnce(MuseError) -> Self {
        move |error| Self { code, error }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    };
    match level {
        None => Builder::from_env(Env::default().default_filter_or("warn")).init(),
        Some(level) => Builder::new().filter_level(level).init(),
    }
}

fn load_config(path: Option<&str>) -> Result<Configuration, MuseError> {
    match path {
        None | Some("*") => {
            info!("no configuration given, using defaults");
            Ok(Configuration::default())
        }
        Some(path) => Configuration::from_path(path),
    }
}

/// Given path with `.ly` extension, or `<algorithm>_<time>.ly`.
fn output_path(
    output: Option<PathBuf>,
    algorithm: &str,
    now: DateTime<Local>,
) -> PathBuf {
    let path = output.unwrap_or_else(|| {
        PathBuf::from(format!("{}_{}", algorithm, now.format("%y%m%d_%H%M%S")))
    });
    match path.extension() {
        Some(ext) if ext == "ly" => path,
        _ => path.with_extension("ly"),
    }
}

fn run(args: Args) -> Result<(), Failure> {
    let mut config =
        load_config(args.config.as_deref()).map_err(Failure::with_code(EXIT_CONFIG))?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let path = output_path(args.output, &config.algorithm, Local::now());
    let mut composer =
        Composer::new(&config).map_err(Failure::with_code(EXIT_CONFIG))?;
    composer.write_to_path(&path).map_err(|error| match error {
        MuseError::OutputFile { .. } => Failure::with_code(EXIT_OUTPUT)(error),
        error => Failure::with_code(EXIT_COMPOSITION)(error),
    })?;
    println!("{}", path.display());
    if args.no_render {
        return Ok(());
    }
    run_lilypond(&args.lilypond, &path).map_err(Failure::with_code(EXIT_LILYPOND))
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    if let Err(failure) = run(args) {
        error!("{}", failure.error);
        exit(failure.code);
    }
}
