//! Persistence and normalisation of simulation histories.
//!
//! The files are positional, nothing in them says what a line holds:
//!
//! - attack: three lines, the diameter, average path length and giant component fraction series.
//! - failure: two lines per run, the run index followed by its giant component fraction series.
//!
//! Values within a line are separated by single spaces, in iteration order.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
    str::FromStr,
};

use itertools::Itertools;
use nalgebra::DVector;
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    simulation::{FailureHistory, History},
};

/// Which layout a history file follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Attack,
    Failure,
}

/// Writes an attack history as its three series lines.
pub fn dump(mut writer: impl Write, history: &History) -> std::io::Result<()> {
    for series in [
        &history.diameters,
        &history.path_lengths,
        &history.giant_fractions,
    ] {
        writeln!(writer, "{}", join_values(series))?;
    }

    Ok(())
}

/// Writes a failure history, the run index then the giant component fraction series for each run.
///
/// Diameter and path length are left out even when they were recorded.
pub fn dump_failure(mut writer: impl Write, history: &FailureHistory) -> std::io::Result<()> {
    for record in &history.runs {
        writeln!(writer, "{}", record.index)?;
        writeln!(writer, "{}", join_values(&record.history.giant_fractions))?;
    }

    Ok(())
}

/// Writes an attack history to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file can't be created or written.
#[instrument(name = "history.dump", err, skip_all, fields(path = %path.display()))]
pub fn dump_to_path(path: &Path, history: &History) -> Result<()> {
    write_file(path, |writer| dump(writer, history))
}

/// Writes a failure history to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file can't be created or written.
#[instrument(name = "history.dump_failure", err, skip_all, fields(path = %path.display()))]
pub fn dump_failure_to_path(path: &Path, history: &FailureHistory) -> Result<()> {
    write_file(path, |writer| dump_failure(writer, history))
}

/// Parses an attack history. Only the three series are restored.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] if a line isn't made of floats or there aren't exactly three
/// lines, [`Error::Io`] if reading fails.
///
/// # Examples
///
/// ```
/// use robustness::history::load;
///
/// let history = load("4 3\n2.5 2\n0.9 0.5\n".as_bytes()).unwrap();
///
/// assert_eq!(history.diameters, vec![4.0, 3.0]);
/// assert_eq!(history.giant_fractions, vec![0.9, 0.5]);
/// ```
pub fn load(reader: impl BufRead) -> Result<History> {
    let lines = read_lines(reader)?;

    if lines.len() != 3 {
        return Err(Error::malformed(
            lines.len().min(3) + 1,
            format!("expected 3 series lines, found {}", lines.len()),
        ));
    }

    let mut series = lines
        .iter()
        .enumerate()
        .map(|(i, line)| parse_values::<f64>(i + 1, line));

    // The length check above guarantees three items.
    let diameters = series.next().transpose()?.unwrap_or_default();
    let path_lengths = series.next().transpose()?.unwrap_or_default();
    let giant_fractions = series.next().transpose()?.unwrap_or_default();

    Ok(History {
        diameters,
        path_lengths,
        giant_fractions,
        halted_at: None,
    })
}

/// Parses a failure history into `(run index, giant component fraction series)` pairs.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] if a run index isn't an integer, a series line isn't made of
/// floats or the last run has no series line, [`Error::Io`] if reading fails.
pub fn load_failure(reader: impl BufRead) -> Result<Vec<(usize, Vec<f64>)>> {
    let lines = read_lines(reader)?;

    if lines.len() % 2 != 0 {
        return Err(Error::malformed(
            lines.len() + 1,
            "run index without a series line",
        ));
    }

    lines
        .iter()
        .enumerate()
        .tuples()
        .map(|((i, index), (j, values))| {
            let index = parse_value::<usize>(i + 1, index.trim())?;
            let values = parse_values::<f64>(j + 1, values)?;
            Ok((index, values))
        })
        .collect()
}

/// Divides every value by the first one, so the series starts at 1.0.
///
/// # Errors
///
/// Returns [`Error::ZeroBaseline`] if the first value is zero. An empty series is returned as is.
///
/// # Examples
///
/// ```
/// use robustness::history::normalized_robustness;
///
/// assert_eq!(
///     normalized_robustness(&[4.0, 2.0, 1.0]).unwrap(),
///     vec![1.0, 0.5, 0.25]
/// );
/// ```
pub fn normalized_robustness(data: &[f64]) -> Result<Vec<f64>> {
    let Some(&first) = data.first() else {
        return Ok(Vec::new());
    };

    if first == 0.0 {
        return Err(Error::ZeroBaseline);
    }

    let normalized = DVector::from_column_slice(data).unscale(first);
    Ok(normalized.iter().copied().collect())
}

/// Loads the raw series of a history file.
///
/// Attack files yield the diameter, path length and giant component fraction series in that
/// order, failure files one giant component fraction series per run.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file can't be read and [`Error::MalformedInput`] if it doesn't
/// follow the layout for `mode`.
#[instrument(name = "history.load_series", err, skip(path), fields(path = %path.display()))]
pub fn load_series(path: &Path, mode: Mode) -> Result<Vec<Vec<f64>>> {
    let file = File::open(path).map_err(|source| Error::io(path, source))?;
    let reader = BufReader::new(file);

    let series: Vec<Vec<f64>> = match mode {
        Mode::Attack => {
            let history = load(reader)?;
            vec![
                history.diameters,
                history.path_lengths,
                history.giant_fractions,
            ]
        }
        Mode::Failure => load_failure(reader)?
            .into_iter()
            .map(|(_, values)| values)
            .collect(),
    };

    debug!(series = series.len(), "loaded history");

    Ok(series)
}

/// Loads a history file and normalises each of its series, see [`load_series`].
///
/// # Errors
///
/// Returns [`Error::Io`] if the file can't be read, [`Error::MalformedInput`] if it doesn't
/// follow the layout for `mode` and [`Error::ZeroBaseline`] if a series starts at zero.
pub fn load_and_normalize(path: &Path, mode: Mode) -> Result<Vec<Vec<f64>>> {
    load_series(path, mode)?
        .iter()
        .map(|values| normalized_robustness(values))
        .collect()
}

//
// Helpers
//

fn join_values(values: &[f64]) -> String {
    values.iter().join(" ")
}

fn write_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let file = File::create(path).map_err(|source| Error::io(path, source))?;
    let mut writer = BufWriter::new(file);

    write(&mut writer)
        .and_then(|()| writer.flush())
        .map_err(|source| Error::io(path, source))
}

fn read_lines(reader: impl BufRead) -> Result<Vec<String>> {
    reader
        .lines()
        .collect::<std::io::Result<Vec<String>>>()
        .map_err(|source| Error::io("<history>", source))
}

fn parse_values<T: FromStr>(line: usize, raw: &str) -> Result<Vec<T>> {
    raw.split_whitespace()
        .map(|token| parse_value(line, token))
        .collect()
}

fn parse_value<T: FromStr>(line: usize, token: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| Error::malformed(line, format!("`{token}` is not a valid number")))
}
