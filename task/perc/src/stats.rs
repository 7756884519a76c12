use log::debug;
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;

use crate::{
    error::{Error, Result},
    percolation::Percolation,
    source::{self, RandomSource},
};

////////////////////////////////////////////////////////////////////////////////

/// z-score of the two-sided 95% confidence interval.
pub const CONFIDENCE_95: f64 = 1.96;

/// How a trial picks the next site to open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Sampling {
    /// Draw row and column independently, redrawing over open sites.
    #[default]
    WithReplacement,
    /// Open the sites of a random permutation, each at most once.
    Shuffled,
}

////////////////////////////////////////////////////////////////////////////////

/// Opens random sites of a fresh `n` by `n` grid until it percolates and
/// returns the fraction of open sites at that moment.
pub fn run_trial<S: RandomSource>(n: usize, sampling: Sampling, source: &mut S) -> Result<f64> {
    let mut grid = Percolation::new(n)?;

    match sampling {
        Sampling::WithReplacement => {
            while !grid.percolates() {
                let row = source(n) + 1;
                let col = source(n) + 1;
                grid.open(row, col)?;
            }
        }
        Sampling::Shuffled => {
            let mut order = (0..n * n).collect::<Vec<_>>();
            for i in (1..order.len()).rev() {
                let j = source(i + 1);
                order.swap(i, j);
            }

            for site in order {
                grid.open(site / n + 1, site % n + 1)?;
                if grid.percolates() {
                    break;
                }
            }
        }
    }

    Ok(grid.open_fraction())
}

////////////////////////////////////////////////////////////////////////////////

/// Parameters of a Monte Carlo estimate of the percolation threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Experiment {
    n: usize,
    trials: usize,
    sampling: Sampling,
}

impl Experiment {
    pub fn new(n: usize, trials: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidArgument(
                "grid dimension must be positive".to_string(),
            ));
        }
        if trials == 0 {
            return Err(Error::InvalidArgument(
                "number of trials must be positive".to_string(),
            ));
        }
        if n.checked_mul(n).is_none() {
            return Err(Error::InvalidArgument(format!(
                "grid dimension {n} is too large"
            )));
        }

        Ok(Self {
            n,
            trials,
            sampling: Sampling::default(),
        })
    }

    pub fn with_sampling(self, sampling: Sampling) -> Self {
        Self { sampling, ..self }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    /// Runs every trial on the current thread, drawing from `source`.
    pub fn run<S: RandomSource>(&self, mut source: S) -> Result<PercolationStats> {
        let results = (0..self.trials)
            .map(|index| {
                let fraction = run_trial(self.n, self.sampling, &mut source)?;
                debug!("trial {index}: open fraction {fraction}");
                Ok(fraction)
            })
            .collect::<Result<Vec<_>>>()?;

        PercolationStats::from_results(results)
    }

    /// Runs the trials on the rayon thread pool. Trial `i` draws from its own
    /// generator keyed by `(seed, i)`, so the results do not depend on
    /// scheduling.
    pub fn run_parallel(&self, seed: u64) -> Result<PercolationStats> {
        let results = (0..self.trials)
            .into_par_iter()
            .map(|index| {
                let rng = trial_rng(seed, index);
                let fraction = run_trial(self.n, self.sampling, &mut source::from_rng(rng))?;
                debug!("trial {index}: open fraction {fraction}");
                Ok(fraction)
            })
            .collect::<Result<Vec<_>>>()?;

        PercolationStats::from_results(results)
    }
}

/// Generator of trial `index` in a run seeded with `seed`. Distinct
/// `(seed, index)` pairs give distinct generator keys.
fn trial_rng(seed: u64, index: usize) -> StdRng {
    let mut key = <StdRng as SeedableRng>::Seed::default();
    key[..8].copy_from_slice(&seed.to_le_bytes());
    key[8..16].copy_from_slice(&(index as u64).to_le_bytes());
    StdRng::from_seed(key)
}

////////////////////////////////////////////////////////////////////////////////

/// Sample statistics over the open fractions of independent trials.
#[derive(Clone, Debug, PartialEq)]
pub struct PercolationStats {
    results: Vec<f64>,
    mean: f64,
    stddev: f64,
}

impl PercolationStats {
    /// Runs `trials` trials on `n` by `n` grids using the thread-local
    /// generator.
    pub fn new(n: usize, trials: usize) -> Result<Self> {
        Experiment::new(n, trials)?.run(source::from_rng(rand::thread_rng()))
    }

    /// Same as [`PercolationStats::new`] but draws coordinates from `source`.
    pub fn with_source<S: RandomSource>(n: usize, trials: usize, source: S) -> Result<Self> {
        Experiment::new(n, trials)?.run(source)
    }

    /// Aggregates already computed open fractions.
    pub fn from_results(results: Vec<f64>) -> Result<Self> {
        if results.is_empty() {
            return Err(Error::InvalidArgument(
                "at least one trial result is required".to_string(),
            ));
        }
        if let Some(bad) = results.iter().find(|x| !(0.0..=1.0).contains(*x)) {
            return Err(Error::InvalidArgument(format!(
                "open fraction {bad} is outside of [0, 1]"
            )));
        }

        let count = results.len() as f64;
        let mean = results.iter().sum::<f64>() / count;
        let stddev = if results.len() == 1 {
            0.0
        } else {
            let squares = results.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
            (squares / (count - 1.0)).sqrt()
        };

        debug!("{} trials: mean {mean}, stddev {stddev}", results.len());

        Ok(Self {
            results,
            mean,
            stddev,
        })
    }

    pub fn trials(&self) -> usize {
        self.results.len()
    }

    /// Open fraction recorded by every trial, in trial order.
    pub fn results(&self) -> &[f64] {
        &self.results
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample standard deviation, zero for a single trial.
    pub fn stddev(&self) -> f64 {
        self.stddev
    }

    pub fn confidence_lo(&self) -> f64 {
        self.mean - self.half_width()
    }

    pub fn confidence_hi(&self) -> f64 {
        self.mean + self.half_width()
    }

    fn half_width(&self) -> f64 {
        CONFIDENCE_95 * self.stddev / (self.trials() as f64).sqrt()
    }
}

////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test {
    use super::*;
    use crate::source::scripted;
    use pretty_assertions::{assert_eq, assert_ne};
    use rand::Rng;

    const EPS: f64 = 1e-12;

    #[test]
    fn scripted_trial() {
        // Opens (1, 1), then (2, 1).
        let mut source = scripted(vec![0, 0, 1, 0]);
        assert_eq!(run_trial(2, Sampling::WithReplacement, &mut source), Ok(0.5));
    }

    #[test]
    fn redraws_do_not_count() {
        // Opens (1, 1) twice before (2, 1).
        let mut source = scripted(vec![0, 0, 0, 0, 1, 0]);
        assert_eq!(run_trial(2, Sampling::WithReplacement, &mut source), Ok(0.5));
    }

    #[test]
    fn shuffled_trial() {
        // Always swapping with the first slot yields the order 1, 2, 3, 0.
        let mut source = scripted(vec![0]);
        assert_eq!(run_trial(2, Sampling::Shuffled, &mut source), Ok(0.75));
    }

    #[test]
    fn single_site_trial() {
        let mut source = scripted(vec![0]);
        for sampling in [Sampling::WithReplacement, Sampling::Shuffled] {
            assert_eq!(run_trial(1, sampling, &mut source), Ok(1.0));
        }
    }

    #[test]
    fn bad_source() {
        let mut source = |n: usize| n;
        assert_eq!(
            run_trial(3, Sampling::WithReplacement, &mut source),
            Err(Error::OutOfRange { row: 4, col: 4, n: 3 })
        );
    }

    #[test]
    fn identical_trials() {
        let stats = PercolationStats::with_source(2, 5, scripted(vec![0, 0, 1, 0])).unwrap();
        assert_eq!(stats.trials(), 5);
        assert_eq!(stats.results(), &[0.5; 5]);
        assert_eq!(stats.mean(), 0.5);
        assert_eq!(stats.stddev(), 0.0);
        assert_eq!(stats.confidence_lo(), 0.5);
        assert_eq!(stats.confidence_hi(), 0.5);
    }

    #[test]
    fn sample_stddev() {
        let stats = PercolationStats::from_results(vec![0.5, 0.75]).unwrap();
        assert!((stats.mean() - 0.625).abs() < EPS);
        assert!((stats.stddev() - 0.125 * 2f64.sqrt()).abs() < EPS);
        assert!((stats.confidence_lo() - (0.625 - 1.96 * 0.125)).abs() < EPS);
        assert!((stats.confidence_hi() - (0.625 + 1.96 * 0.125)).abs() < EPS);
    }

    #[test]
    fn single_trial_has_zero_stddev() {
        let stats = PercolationStats::from_results(vec![0.6]).unwrap();
        assert_eq!(stats.stddev(), 0.0);
        assert_eq!(stats.confidence_lo(), stats.confidence_hi());
    }

    #[test]
    fn invalid_arguments() {
        assert!(matches!(
            PercolationStats::new(5, 0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            PercolationStats::new(0, 5),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            PercolationStats::from_results(vec![]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            PercolationStats::from_results(vec![0.5, 1.5]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            PercolationStats::from_results(vec![f64::NAN]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn experiment_config() {
        let experiment = Experiment::new(4, 3)
            .unwrap()
            .with_sampling(Sampling::Shuffled);
        assert_eq!(experiment.n(), 4);
        assert_eq!(experiment.trials(), 3);
        assert_eq!(experiment.sampling(), Sampling::Shuffled);
        assert!(matches!(
            Experiment::new(usize::MAX, 1),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn trial_streams_do_not_shift_with_seed() {
        let draws = |seed, index| {
            let mut rng = trial_rng(seed, index);
            (0..4).map(|_| rng.gen::<u64>()).collect::<Vec<_>>()
        };
        assert_eq!(draws(42, 1), draws(42, 1));
        assert_ne!(draws(42, 1), draws(43, 0));
        assert_ne!(draws(42, 0), draws(42, 1));
        assert_ne!(draws(0, 1), draws(1, 0));
    }
}
