//! Robustness simulations: repeated node removal with periodic measurement.
//!
//! Both modes share one driver. Each step asks a [`RemovalStrategy`] for a new graph value
//! derived from the current one, and every `measure_frequency` steps the structural metrics are
//! appended to a [`History`]. The caller's graph is never mutated, each run works on values of
//! its own.

use std::fmt::Debug;

use tracing::{debug, field, info, instrument, warn, Span};

use crate::{
    error::{Error, Result},
    graph::Graph,
    metrics::{diameter_and_average_path_length, giant_component_fraction},
    strategy::{DegreeAttack, RandomFailure, RemovalStrategy},
};

/// SplitMix64 increment (the 64-bit golden ratio) used for per-run seed derivation.
const RUN_SEED_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;
const SPLITMIX_MULT_A: u64 = 0xBF58_476D_1CE4_E5B9;
const SPLITMIX_MULT_B: u64 = 0x94D0_49BB_1331_11EB;

/// How many removals to perform and how often to measure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    nodes_to_remove: usize,
    measure_frequency: usize,
}

impl SimulationConfig {
    /// Creates a configuration, both values must be greater than zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if either value is zero.
    pub fn new(nodes_to_remove: usize, measure_frequency: usize) -> Result<Self> {
        if nodes_to_remove == 0 {
            return Err(Error::InvalidParameter {
                name: "nodes_to_remove",
                reason: "must be greater than zero".to_owned(),
            });
        }

        if measure_frequency == 0 {
            return Err(Error::InvalidParameter {
                name: "measure_frequency",
                reason: "must be greater than zero".to_owned(),
            });
        }

        Ok(Self {
            nodes_to_remove,
            measure_frequency,
        })
    }

    /// Creates a configuration removing `floor(fraction * node_count)` nodes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `fraction` is outside `(0, 1]`, if it rounds down to
    /// no removal at all for this graph or if `measure_frequency` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use robustness::simulation::SimulationConfig;
    ///
    /// let config = SimulationConfig::from_fraction(1005, 0.9, 50).unwrap();
    /// assert_eq!(config.nodes_to_remove(), 904);
    /// ```
    pub fn from_fraction(node_count: usize, fraction: f64, measure_frequency: usize) -> Result<Self> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(Error::InvalidParameter {
                name: "removal_fraction",
                reason: format!("{fraction} is outside (0, 1]"),
            });
        }

        let nodes_to_remove = (fraction * node_count as f64).floor() as usize;
        if nodes_to_remove == 0 {
            return Err(Error::InvalidParameter {
                name: "removal_fraction",
                reason: format!("{fraction} of {node_count} nodes rounds down to no removal"),
            });
        }

        Self::new(nodes_to_remove, measure_frequency)
    }

    /// Number of removal iterations requested.
    pub fn nodes_to_remove(&self) -> usize {
        self.nodes_to_remove
    }

    /// Sampling cadence, in iterations.
    pub fn measure_frequency(&self) -> usize {
        self.measure_frequency
    }
}

/// Settings specific to failure mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FailureOptions {
    /// Number of independent runs.
    pub runs: usize,
    /// Base seed, each run derives its own seed from it. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Whether to also record diameter and average path length. Off by default since they cost
    /// `O(V * (V + E))` per sample.
    pub record_path_metrics: bool,
}

impl FailureOptions {
    /// Checks the options before any run starts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `runs` is zero.
    pub fn validate(&self) -> Result<()> {
        check_runs(self.runs)
    }
}

impl Default for FailureOptions {
    fn default() -> Self {
        Self {
            runs: 3,
            seed: None,
            record_path_metrics: false,
        }
    }
}

/// Measurements collected during one run, one entry per sampled iteration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct History {
    /// Longest shortest path at each sample. Empty when path metrics weren't recorded.
    pub diameters: Vec<f64>,
    /// Average shortest path length at each sample. Empty when path metrics weren't recorded.
    pub path_lengths: Vec<f64>,
    /// Giant component fraction at each sample, see [`giant_component_fraction`].
    pub giant_fractions: Vec<f64>,
    /// Iteration at which the graph ran out of nodes, if the run stopped early.
    pub halted_at: Option<usize>,
}

impl History {
    /// Number of samples taken.
    pub fn len(&self) -> usize {
        self.giant_fractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.giant_fractions.is_empty()
    }
}

/// Whether a failure-mode run went through all its iterations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Complete,
    /// The run was aborted by an error, its history holds the samples taken until then.
    Incomplete { reason: String },
}

/// One failure-mode run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunRecord {
    /// Zero-based position of the run within its batch.
    pub index: usize,
    /// Samples taken by the run, partial if it was aborted.
    pub history: History,
    pub status: RunStatus,
}

/// Results of every failure-mode run, in run order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FailureHistory {
    /// One record per run, including aborted ones.
    pub runs: Vec<RunRecord>,
}

impl FailureHistory {
    /// Iterates over the runs that completed.
    pub fn complete_runs(&self) -> impl Iterator<Item = &RunRecord> + '_ {
        self.runs
            .iter()
            .filter(|record| record.status == RunStatus::Complete)
    }
}

/// Receives progress notifications from long simulations.
pub trait ProgressObserver {
    /// Called once before a run's first removal.
    fn on_run_start(&mut self, _mode: &'static str, _run: usize, _total: usize) {}

    /// Called before every removal.
    fn on_iteration(&mut self, mode: &'static str, run: usize, iteration: usize, total: usize);

    /// Called once after a run ends, whatever the outcome.
    fn on_run_end(&mut self, _mode: &'static str, _run: usize) {}
}

/// Reports progress as `tracing` events, roughly every tenth of a run.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn on_run_start(&mut self, mode: &'static str, run: usize, total: usize) {
        info!(mode, run, total, "starting robustness check");
    }

    fn on_iteration(&mut self, mode: &'static str, run: usize, iteration: usize, total: usize) {
        let step = (total / 10).max(1);
        if iteration % step == 0 {
            info!(
                mode,
                run,
                iteration,
                total,
                percent = iteration * 100 / total.max(1),
                "removal progress"
            );
        }
    }

    fn on_run_end(&mut self, mode: &'static str, run: usize) {
        info!(mode, run, "done: robustness check");
    }
}

/// Discards progress notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_iteration(&mut self, _: &'static str, _: usize, _: usize, _: usize) {}
}

/// Simulates a targeted attack: repeatedly removes a highest-degree node and records all three
/// metrics every `measure_frequency` iterations.
///
/// The run stops early, without error, when the graph runs out of nodes. In that case
/// [`History::halted_at`] is set and the history is shorter than requested.
///
/// # Errors
///
/// Returns any error raised by the strategy or the metrics other than exhaustion.
///
/// # Examples
///
/// ```
/// use robustness::edge::Edge;
/// use robustness::graph::Graph;
/// use robustness::simulation::{robustness_by_attack, NoProgress, SimulationConfig};
///
/// let graph: Graph<u64> = [(1, 2), (2, 3), (3, 4)].into_iter().map(Edge::from).collect();
/// let config = SimulationConfig::new(2, 1).unwrap();
///
/// let history = robustness_by_attack(&graph, &config, &mut NoProgress).unwrap();
///
/// // Removes 2, then 3 (degree ties break on the smallest id).
/// assert_eq!(history.giant_fractions, vec![1.0 / 3.0, 0.0]);
/// ```
#[instrument(
    name = "simulation.attack",
    err,
    skip_all,
    fields(nodes = graph.vertex_count(), nodes_to_remove = config.nodes_to_remove(), samples = field::Empty),
)]
pub fn robustness_by_attack<T>(
    graph: &Graph<T>,
    config: &SimulationConfig,
    observer: &mut dyn ProgressObserver,
) -> Result<History>
where
    T: Copy + Ord + Debug,
{
    let mut history = History::default();
    let mut strategy = DegreeAttack;

    observer.on_run_start(RemovalStrategy::<T>::name(&strategy), 0, config.nodes_to_remove);
    let outcome = run_removals(graph, &mut strategy, config, true, 0, observer, &mut history);
    observer.on_run_end(RemovalStrategy::<T>::name(&strategy), 0);
    outcome?;

    Span::current().record("samples", history.len());
    Ok(history)
}

/// Simulates random failures over `options.runs` independent runs, each starting from `graph`.
///
/// The giant component fraction is always recorded, diameter and path length only when
/// [`FailureOptions::record_path_metrics`] is set.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if `options.runs` is zero. Errors within a run don't
/// abort the batch, they mark the run [`RunStatus::Incomplete`].
#[instrument(
    name = "simulation.failure",
    err,
    skip_all,
    fields(nodes = graph.vertex_count(), runs = options.runs, seeded = options.seed.is_some()),
)]
pub fn robustness_by_failure<T>(
    graph: &Graph<T>,
    config: &SimulationConfig,
    options: &FailureOptions,
    observer: &mut dyn ProgressObserver,
) -> Result<FailureHistory>
where
    T: Copy + Ord + Debug,
{
    let seed = options.seed;
    run_batch(
        graph,
        config,
        options.runs,
        options.record_path_metrics,
        |run| match seed {
            Some(base) => RandomFailure::seeded(run_seed(base, run)),
            None => RandomFailure::from_entropy(),
        },
        observer,
    )
}

/// Runs `runs` independent simulations, building each run's strategy with `make_strategy`.
///
/// A run that fails is logged and recorded as incomplete, the following runs still execute.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if `runs` is zero.
pub fn run_batch<T, S, F>(
    graph: &Graph<T>,
    config: &SimulationConfig,
    runs: usize,
    record_path_metrics: bool,
    mut make_strategy: F,
    observer: &mut dyn ProgressObserver,
) -> Result<FailureHistory>
where
    T: Copy + Ord + Debug,
    S: RemovalStrategy<T>,
    F: FnMut(usize) -> S,
{
    check_runs(runs)?;

    let mut history = FailureHistory::default();

    for run in 0..runs {
        let mut strategy = make_strategy(run);
        let mode = strategy.name();
        let mut run_history = History::default();

        observer.on_run_start(mode, run, config.nodes_to_remove);
        let outcome = run_removals(
            graph,
            &mut strategy,
            config,
            record_path_metrics,
            run,
            observer,
            &mut run_history,
        );
        observer.on_run_end(mode, run);

        let status = match outcome {
            Ok(()) => RunStatus::Complete,
            Err(err) => {
                warn!(mode, run, error = %err, samples = run_history.len(), "run aborted");
                RunStatus::Incomplete {
                    reason: err.to_string(),
                }
            }
        };

        history.runs.push(RunRecord {
            index: run,
            history: run_history,
            status,
        });
    }

    Ok(history)
}

//
// Helpers
//

/// Drives one run, appending samples to `history` as they're taken so they survive an error.
fn run_removals<T, S>(
    graph: &Graph<T>,
    strategy: &mut S,
    config: &SimulationConfig,
    record_path_metrics: bool,
    run: usize,
    observer: &mut dyn ProgressObserver,
    history: &mut History,
) -> Result<()>
where
    T: Copy + Ord + Debug,
    S: RemovalStrategy<T> + ?Sized,
{
    let mode = strategy.name();
    let total = config.nodes_to_remove;
    let mut current = graph.clone();

    for iteration in 0..total {
        observer.on_iteration(mode, run, iteration, total);

        let (removed, next) = match strategy.select_and_remove(&current) {
            Ok(step) => step,
            Err(Error::ExhaustedGraph) => {
                info!(mode, run, iteration, total, "graph exhausted, halting early");
                history.halted_at = Some(iteration);
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        current = next;

        if iteration % config.measure_frequency != 0 {
            continue;
        }

        if current.is_empty() {
            debug!(mode, run, iteration, "nothing left to measure");
            continue;
        }

        if record_path_metrics {
            let stats = diameter_and_average_path_length(&current);
            history.diameters.push(stats.diameter as f64);
            history.path_lengths.push(stats.average_path_length);
        }
        let fraction = giant_component_fraction(&current)?;
        history.giant_fractions.push(fraction);

        debug!(
            mode,
            run,
            iteration,
            removed = ?removed,
            giant_fraction = fraction,
            "sampled"
        );
    }

    Ok(())
}

fn check_runs(runs: usize) -> Result<()> {
    if runs == 0 {
        return Err(Error::InvalidParameter {
            name: "runs",
            reason: "must be greater than zero".to_owned(),
        });
    }

    Ok(())
}

/// Derives a well-spread seed for run `run` from the batch seed.
fn run_seed(base_seed: u64, run: usize) -> u64 {
    splitmix64(base_seed ^ ((run as u64 + 1).wrapping_mul(RUN_SEED_SPACING)))
}

fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(RUN_SEED_SPACING);
    state = (state ^ (state >> 30)).wrapping_mul(SPLITMIX_MULT_A);
    state = (state ^ (state >> 27)).wrapping_mul(SPLITMIX_MULT_B);
    state ^ (state >> 31)
}
