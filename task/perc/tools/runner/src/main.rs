#![forbid(unsafe_code)]

mod replay;

use std::{
    fs::File,
    io::{self, BufReader, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::*;
use perc::{source, Experiment, PercolationStats, Sampling};
use rand::{rngs::StdRng, SeedableRng};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

////////////////////////////////////////////////////////////////////////////////

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Arguments {
    #[command(subcommand)]
    cmd: Command,

    /// 0 - errors only, 1 - warnings, 2 - info, 3 - debug, 4 and above - trace.
    #[arg(short, long, global = true, default_value_t = 2)]
    log_level: usize,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate the percolation threshold of an N by N grid.
    Stats {
        /// Grid dimension.
        n: usize,

        /// Number of independent trials.
        trials: usize,

        /// Seed for reproducible runs.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Run trials on all cores.
        #[arg(short, long)]
        parallel: bool,

        #[arg(long, value_enum, default_value_t = SamplingArg::WithReplacement)]
        sampling: SamplingArg,
    },

    /// Open the sites listed in a file one by one.
    Replay {
        /// First line is the grid dimension, then one `row col` pair per line.
        path: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SamplingArg {
    WithReplacement,
    Shuffled,
}

impl From<SamplingArg> for Sampling {
    fn from(arg: SamplingArg) -> Self {
        match arg {
            SamplingArg::WithReplacement => Sampling::WithReplacement,
            SamplingArg::Shuffled => Sampling::Shuffled,
        }
    }
}

fn level_filter(log_level: usize) -> LevelFilter {
    match log_level {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn run_stats(
    n: usize,
    trials: usize,
    seed: Option<u64>,
    parallel: bool,
    sampling: Sampling,
) -> Result<PercolationStats> {
    let experiment = Experiment::new(n, trials)?.with_sampling(sampling);
    info!("running {trials} trials on a {n}x{n} grid, {sampling:?}");

    let stats = if parallel {
        let seed = seed.unwrap_or_else(rand::random);
        info!("parallel run with seed {seed}");
        experiment.run_parallel(seed)?
    } else if let Some(seed) = seed {
        experiment.run(source::from_rng(StdRng::seed_from_u64(seed)))?
    } else {
        experiment.run(source::from_rng(rand::thread_rng()))?
    };

    Ok(stats)
}

fn report(stats: &PercolationStats, mut out: impl Write) -> Result<()> {
    writeln!(out, "mean                    = {}", stats.mean())?;
    writeln!(out, "stddev                  = {}", stats.stddev())?;
    writeln!(
        out,
        "95% confidence interval = [{}, {}]",
        stats.confidence_lo(),
        stats.confidence_hi()
    )?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Arguments::parse();

    TermLogger::init(
        level_filter(args.log_level),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("failed to initialize logger")?;

    match args.cmd {
        Command::Stats {
            n,
            trials,
            seed,
            parallel,
            sampling,
        } => {
            let stats = run_stats(n, trials, seed, parallel, sampling.into())?;
            report(&stats, io::stdout().lock())?;
        }
        Command::Replay { path } => {
            let file =
                File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
            let script = replay::parse(BufReader::new(file))
                .with_context(|| format!("failed to parse {}", path.display()))?;
            replay::run(&script, io::stdout().lock())?;
        }
    }

    Ok(())
}

////////////////////////////////////////////////////////////////////////////////
