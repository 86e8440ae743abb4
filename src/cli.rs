//! Command-line interface for the robustness toolkit.
//!
//! Three commands are offered: `simulate` runs both removal modes over an edge list and stores
//! their histories, `plot` turns stored histories into a chart and `stats` describes the degree
//! structure of an edge list.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand};
use itertools::Itertools;
use thiserror::Error;
use tracing::{info, instrument};

use crate::{
    edgelist::load_edge_list,
    history::{self, normalized_robustness, Mode},
    plot::{write_svg, Curve},
    simulation::{
        robustness_by_attack, robustness_by_failure, FailureHistory, FailureOptions, History,
        RunStatus, SimulationConfig, TracingProgress,
    },
    stats::{log_binning, summarize, DegreeSummary},
};

const DEFAULT_ATTACK_HISTORY: &str = "robustness_attack.txt";
const DEFAULT_FAILURE_HISTORY: &str = "robustness_fail.txt";
const CHART_TITLE: &str = "Dynamics of the fraction of nodes in giant component";

/// Top-level options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "robustness",
    about = "Simulate the robustness of a network under random failure and targeted attack."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the attack and failure simulations and store their histories.
    Simulate(SimulateArgs),
    /// Chart stored histories as an SVG file.
    Plot(PlotArgs),
    /// Print degree statistics of an edge list.
    Stats(StatsArgs),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Simulate(_) => "simulate",
            Self::Plot(_) => "plot",
            Self::Stats(_) => "stats",
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    /// Edge list to load: a header line, then one `source target` pair per line.
    #[arg(long)]
    pub edges: PathBuf,

    /// Where to store the attack history.
    #[arg(long, default_value = DEFAULT_ATTACK_HISTORY)]
    pub attack_history: PathBuf,

    /// Where to store the failure history.
    #[arg(long, default_value = DEFAULT_FAILURE_HISTORY)]
    pub failure_history: PathBuf,

    /// Share of the nodes to remove, in (0, 1].
    #[arg(long, default_value_t = 0.9)]
    pub removal_fraction: f64,

    /// Take a measurement every this many removals.
    #[arg(long, default_value_t = 50)]
    pub measure_frequency: usize,

    /// Number of independent failure runs.
    #[arg(long, default_value_t = 3)]
    pub runs: usize,

    /// Seed for the failure runs. Seeded from the OS when absent.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also record diameter and average path length during failure runs.
    #[arg(long)]
    pub failure_path_metrics: bool,
}

#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    #[arg(long, default_value = DEFAULT_ATTACK_HISTORY)]
    pub attack_history: PathBuf,

    #[arg(long, default_value = DEFAULT_FAILURE_HISTORY)]
    pub failure_history: PathBuf,

    /// Chart destination.
    #[arg(long, default_value = "robustness.svg")]
    pub output: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct StatsArgs {
    #[arg(long)]
    pub edges: PathBuf,

    /// Number of logarithmic bin edges for the degree distribution.
    #[arg(long, default_value_t = 50)]
    pub bins: usize,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] crate::Error),
    /// A history file holds no series to plot.
    #[error("`{}` holds no {what} series", path.display())]
    MissingSeries { path: PathBuf, what: &'static str },
    /// The series to plot starts at zero, so it can't be expressed relative to its start.
    #[error("the {what} series in `{}` starts at zero and can't be normalised", path.display())]
    ZeroBaseline { path: PathBuf, what: &'static str },
}

/// What a command produced, ready to be rendered.
#[derive(Debug, Clone)]
pub enum Report {
    Simulation {
        attack: History,
        failure: FailureHistory,
    },
    Plot {
        output: PathBuf,
        points: usize,
    },
    Stats {
        summary: DegreeSummary,
        binned: Vec<(f64, f64)>,
    },
}

/// Executes the command represented by `cli`.
///
/// # Errors
///
/// Returns [`CliError`] when loading, simulating or writing fails.
#[instrument(name = "cli.run", err, skip_all, fields(command = cli.command.name()))]
pub fn run_cli(cli: Cli) -> Result<Report, CliError> {
    match cli.command {
        Command::Simulate(args) => simulate(args),
        Command::Plot(args) => plot(args),
        Command::Stats(args) => stats(args),
    }
}

fn simulate(args: SimulateArgs) -> Result<Report, CliError> {
    let graph = load_edge_list(&args.edges)?;
    let config = SimulationConfig::from_fraction(
        graph.vertex_count(),
        args.removal_fraction,
        args.measure_frequency,
    )?;
    let options = FailureOptions {
        runs: args.runs,
        seed: args.seed,
        record_path_metrics: args.failure_path_metrics,
    };
    options.validate()?;

    // Nothing is written until both modes have finished.
    let attack = robustness_by_attack(&graph, &config, &mut TracingProgress)?;
    let failure = robustness_by_failure(&graph, &config, &options, &mut TracingProgress)?;

    log_series(&attack, &failure);
    history::dump_to_path(&args.attack_history, &attack)?;
    history::dump_failure_to_path(&args.failure_history, &failure)?;

    info!(
        attack = %args.attack_history.display(),
        failure = %args.failure_history.display(),
        "histories stored"
    );

    Ok(Report::Simulation { attack, failure })
}

fn plot(args: PlotArgs) -> Result<Report, CliError> {
    // Attack files hold diameter, path length then giant fraction. Only the giant fraction is
    // charted, so only it has to be normalisable.
    let attack = plotted_series(&args.attack_history, Mode::Attack, 2, "attack")?;
    let failure = plotted_series(&args.failure_history, Mode::Failure, 0, "failure")?;

    let points = attack.len() + failure.len();
    let curves = [
        Curve::new("Attack by degree", attack),
        Curve::new("Random failure", failure),
    ];
    write_svg(&args.output, CHART_TITLE, &curves)?;

    Ok(Report::Plot {
        output: args.output,
        points,
    })
}

fn plotted_series(
    path: &Path,
    mode: Mode,
    position: usize,
    what: &'static str,
) -> Result<Vec<f64>, CliError> {
    let series = history::load_series(path, mode)?
        .into_iter()
        .nth(position)
        .filter(|series| !series.is_empty())
        .ok_or_else(|| CliError::MissingSeries {
            path: path.to_path_buf(),
            what,
        })?;

    normalized_robustness(&series).map_err(|err| match err {
        crate::Error::ZeroBaseline => CliError::ZeroBaseline {
            path: path.to_path_buf(),
            what,
        },
        other => other.into(),
    })
}

/// Logs every final series before the histories are written.
fn log_series(attack: &History, failure: &FailureHistory) {
    info!(series = %attack.diameters.iter().join(" "), "attack diameter");
    info!(series = %attack.path_lengths.iter().join(" "), "attack average path length");
    info!(series = %attack.giant_fractions.iter().join(" "), "attack giant component fraction");

    for record in &failure.runs {
        info!(
            run = record.index,
            series = %record.history.giant_fractions.iter().join(" "),
            "failure giant component fraction"
        );
    }
}

fn stats(args: StatsArgs) -> Result<Report, CliError> {
    let graph = load_edge_list(&args.edges)?;
    let summary = summarize(&graph)?;
    let binned = log_binning(&summary.distribution, args.bins)?;

    Ok(Report::Stats { summary, binned })
}

/// Renders `report` to `writer` as plain text.
///
/// # Errors
///
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_report(report: &Report, mut writer: impl Write) -> io::Result<()> {
    match report {
        Report::Simulation { attack, failure } => {
            writeln!(writer, "attack diameter: {}", attack.diameters.iter().join(" "))?;
            writeln!(
                writer,
                "attack average path length: {}",
                attack.path_lengths.iter().join(" ")
            )?;
            writeln!(
                writer,
                "attack giant component fraction: {}",
                attack.giant_fractions.iter().join(" ")
            )?;

            for record in &failure.runs {
                write!(
                    writer,
                    "failure run {} giant component fraction: {}",
                    record.index,
                    record.history.giant_fractions.iter().join(" ")
                )?;
                match &record.status {
                    RunStatus::Complete => writeln!(writer)?,
                    RunStatus::Incomplete { reason } => writeln!(writer, " (incomplete: {reason})")?,
                }
            }
        }
        Report::Plot { output, points } => {
            writeln!(writer, "chart: {} ({points} points)", output.display())?;
        }
        Report::Stats { summary, binned } => {
            writeln!(writer, "nodes: {}", summary.nodes)?;
            writeln!(writer, "edges: {}", summary.edges)?;
            writeln!(writer, "average degree: {}", summary.average_degree)?;
            writeln!(writer, "density: {}", summary.density)?;
            writeln!(writer, "degree\tcount")?;
            for (degree, count) in binned {
                writeln!(writer, "{degree}\t{count}")?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::Error;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    /// Hub 1 with four leaves, and a triangle hanging off leaf 5.
    const STAR_WITH_TRIANGLE: &str = "Source Target\n1 2\n1 3\n1 4\n1 5\n5 6\n6 7\n7 5\n";

    fn write_edges(dir: &TempDir) -> io::Result<PathBuf> {
        let path = dir.path().join("edges.txt");
        fs::write(&path, STAR_WITH_TRIANGLE)?;
        Ok(path)
    }

    fn simulate_args(dir: &Path, edges: PathBuf) -> SimulateArgs {
        SimulateArgs {
            edges,
            attack_history: dir.join("attack.txt"),
            failure_history: dir.join("fail.txt"),
            removal_fraction: 0.9,
            measure_frequency: 2,
            runs: 2,
            seed: Some(7),
            failure_path_metrics: false,
        }
    }

    #[test]
    fn clap_applies_defaults() {
        let cli = Cli::try_parse_from(["robustness", "simulate", "--edges", "graph.txt"]).unwrap();

        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.attack_history, PathBuf::from("robustness_attack.txt"));
        assert_eq!(args.failure_history, PathBuf::from("robustness_fail.txt"));
        assert_eq!(args.removal_fraction, 0.9);
        assert_eq!(args.measure_frequency, 50);
        assert_eq!(args.runs, 3);
        assert_eq!(args.seed, None);
        assert!(!args.failure_path_metrics);
    }

    #[rstest]
    #[case::missing_edges(&["robustness", "simulate"])]
    #[case::bad_fraction(&["robustness", "simulate", "--edges", "g", "--removal-fraction", "most"])]
    #[case::unknown_command(&["robustness", "explode"])]
    fn clap_rejects_bad_arguments(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn simulate_stores_both_histories() -> TestResult {
        let dir = TempDir::new()?;
        let edges = write_edges(&dir)?;
        let args = simulate_args(dir.path(), edges);
        let cli = Cli {
            command: Command::Simulate(args.clone()),
        };

        let Report::Simulation { attack, failure } = run_cli(cli)? else {
            panic!("expected a simulation report");
        };

        // 7 nodes at 0.9 gives 6 removals, sampled at iterations 0, 2 and 4.
        assert_eq!(attack.giant_fractions.len(), 3);
        assert_eq!(attack.giant_fractions[0], 0.5);
        assert_eq!(failure.runs.len(), 2);

        let stored = history::load(io::BufReader::new(fs::File::open(&args.attack_history)?))?;
        assert_eq!(stored.giant_fractions, attack.giant_fractions);
        let runs = history::load_failure(io::BufReader::new(fs::File::open(
            &args.failure_history,
        )?))?;
        assert_eq!(runs.len(), 2);
        Ok(())
    }

    #[test]
    fn simulate_rejects_bad_fraction() -> TestResult {
        let dir = TempDir::new()?;
        let edges = write_edges(&dir)?;
        let mut args = simulate_args(dir.path(), edges);
        args.removal_fraction = 1.5;

        let err = run_cli(Cli {
            command: Command::Simulate(args),
        })
        .unwrap_err();

        assert!(matches!(
            err,
            CliError::Core(Error::InvalidParameter {
                name: "removal_fraction",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn simulate_rejects_zero_runs_before_writing() -> TestResult {
        let dir = TempDir::new()?;
        let edges = write_edges(&dir)?;
        let mut args = simulate_args(dir.path(), edges);
        args.runs = 0;

        let err = run_cli(Cli {
            command: Command::Simulate(args.clone()),
        })
        .unwrap_err();

        assert!(matches!(
            err,
            CliError::Core(Error::InvalidParameter { name: "runs", .. })
        ));
        assert!(!args.attack_history.exists());
        assert!(!args.failure_history.exists());
        Ok(())
    }

    #[test]
    fn plot_charts_stored_histories() -> TestResult {
        let dir = TempDir::new()?;
        let edges = write_edges(&dir)?;
        let args = simulate_args(dir.path(), edges);
        run_cli(Cli {
            command: Command::Simulate(args.clone()),
        })?;

        let output = dir.path().join("chart.svg");
        let report = run_cli(Cli {
            command: Command::Plot(PlotArgs {
                attack_history: args.attack_history,
                failure_history: args.failure_history,
                output: output.clone(),
            }),
        })?;

        assert!(matches!(report, Report::Plot { points: 6, .. }));
        let svg = fs::read_to_string(&output)?;
        assert!(svg.contains("Attack by degree"));
        assert!(svg.contains("Random failure"));
        Ok(())
    }

    #[test]
    fn plot_needs_a_failure_run() -> TestResult {
        let dir = TempDir::new()?;
        let attack = dir.path().join("attack.txt");
        let failure = dir.path().join("fail.txt");
        fs::write(&attack, "2 1\n1 0.5\n0.5 0.25\n")?;
        fs::write(&failure, "")?;

        let err = run_cli(Cli {
            command: Command::Plot(PlotArgs {
                attack_history: attack,
                failure_history: failure,
                output: dir.path().join("chart.svg"),
            }),
        })
        .unwrap_err();

        assert!(matches!(err, CliError::MissingSeries { what: "failure", .. }));
        Ok(())
    }

    #[test]
    fn plot_ignores_unplotted_zero_series() -> TestResult {
        let dir = TempDir::new()?;
        let attack = dir.path().join("attack.txt");
        let failure = dir.path().join("fail.txt");
        // Diameter and path length start at zero, the giant fraction doesn't.
        fs::write(&attack, "0 1\n0 0.5\n0.5 0.25\n")?;
        fs::write(&failure, "0\n0.5 0.4\n")?;

        let report = run_cli(Cli {
            command: Command::Plot(PlotArgs {
                attack_history: attack,
                failure_history: failure,
                output: dir.path().join("chart.svg"),
            }),
        })?;

        assert!(matches!(report, Report::Plot { points: 4, .. }));
        Ok(())
    }

    #[test]
    fn plot_names_the_series_starting_at_zero() -> TestResult {
        let dir = TempDir::new()?;
        let edges = dir.path().join("star.txt");
        fs::write(&edges, "Source Target\n1 2\n1 3\n1 4\n1 5\n")?;
        let args = simulate_args(dir.path(), edges);
        run_cli(Cli {
            command: Command::Simulate(args.clone()),
        })?;

        // Removing the hub leaves only isolated nodes, the attack series starts at zero.
        let err = run_cli(Cli {
            command: Command::Plot(PlotArgs {
                attack_history: args.attack_history.clone(),
                failure_history: args.failure_history,
                output: dir.path().join("chart.svg"),
            }),
        })
        .unwrap_err();

        assert!(matches!(
            &err,
            CliError::ZeroBaseline { path, what: "attack" } if *path == args.attack_history
        ));
        assert!(err.to_string().contains("attack series"));
        Ok(())
    }

    #[test]
    fn stats_summarizes_edge_list() -> TestResult {
        let dir = TempDir::new()?;
        let edges = write_edges(&dir)?;

        let report = run_cli(Cli {
            command: Command::Stats(StatsArgs { edges, bins: 10 }),
        })?;

        let Report::Stats { summary, binned } = &report else {
            panic!("expected a stats report");
        };
        assert_eq!((summary.nodes, summary.edges), (7, 7));
        assert_eq!(summary.average_degree, 2.0);
        assert!(!binned.is_empty());

        let mut buffer = Vec::new();
        render_report(&report, &mut buffer)?;
        let text = String::from_utf8(buffer)?;
        assert!(text.starts_with("nodes: 7\nedges: 7\naverage degree: 2\n"));
        Ok(())
    }

    #[test]
    fn missing_edge_list_is_an_io_error() {
        let err = run_cli(Cli {
            command: Command::Stats(StatsArgs {
                edges: PathBuf::from("/no/such/edges.txt"),
                bins: 10,
            }),
        })
        .unwrap_err();

        assert!(matches!(err, CliError::Core(Error::Io { .. })));
    }

    #[test]
    fn render_simulation_marks_incomplete_runs() -> TestResult {
        let report = Report::Simulation {
            attack: History {
                diameters: vec![2.0],
                path_lengths: vec![1.5],
                giant_fractions: vec![0.5],
                halted_at: None,
            },
            failure: FailureHistory {
                runs: vec![crate::simulation::RunRecord {
                    index: 0,
                    history: History {
                        giant_fractions: vec![0.75, 0.25],
                        ..History::default()
                    },
                    status: RunStatus::Incomplete {
                        reason: "boom".to_owned(),
                    },
                }],
            },
        };
        let mut buffer = Vec::new();

        render_report(&report, &mut buffer)?;

        assert_eq!(
            String::from_utf8(buffer)?,
            "attack diameter: 2\n\
             attack average path length: 1.5\n\
             attack giant component fraction: 0.5\n\
             failure run 0 giant component fraction: 0.75 0.25 (incomplete: boom)\n"
        );
        Ok(())
    }
}
