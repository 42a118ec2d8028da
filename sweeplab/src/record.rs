//! The append-only record log of a run and its persisted formats.
//!
//! Every save writes two sibling files sharing a base name:
//!
//! - `<base>.csv`: comma separated, a header row, values as shortest round-trip decimal text.
//! - `<base>.txt`: tab separated, a `#` note line, a header row, values in scientific notation
//!   with six significant digits.
//!
//! Both formats load back with [`Recorder::load`].

use std::{
    ffi::OsString,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use log::{debug, info, warn};

use crate::{error::RecordError, sweep::Direction};

/// Mean and standard deviation of one channel at one sweep point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Arithmetic mean of the samples.
    pub mean: f64,
    /// Sample standard deviation, zero for fewer than two samples.
    pub std: f64,
}

/// One persisted tuple per sweep point.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Pass index, starting at 1.
    pub pass: usize,
    /// Direction the point was visited in.
    pub direction: Direction,
    /// Values set on the instruments, in the order of [`RecordLayout::setpoints`].
    pub setpoints: Vec<f64>,
    /// One reading per channel, in the order of [`RecordLayout::channels`].
    pub readings: Vec<Reading>,
}

/// Column names of the setpoints and measured channels of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    /// Names of the values set on the instruments.
    pub setpoints: Vec<String>,
    /// Names of the measured channels.
    pub channels: Vec<String>,
}

impl RecordLayout {
    /// Create a layout from setpoint and channel names.
    pub fn new<S: Into<String>, C: Into<String>>(
        setpoints: impl IntoIterator<Item = S>,
        channels: impl IntoIterator<Item = C>,
    ) -> Self {
        Self {
            setpoints: setpoints.into_iter().map(Into::into).collect(),
            channels: channels.into_iter().map(Into::into).collect(),
        }
    }

    /// The header row: pass, direction, setpoints, then mean and std per channel.
    pub fn header(&self) -> Vec<String> {
        let mut header = vec!["Pass".to_string(), "Direction".to_string()];
        header.extend(self.setpoints.iter().cloned());
        for ch in &self.channels {
            header.push(ch.clone());
            header.push(format!("{ch}_std"));
        }
        header
    }

    /// Number of fields a record line must have.
    pub fn field_count(&self) -> usize {
        2 + self.setpoints.len() + 2 * self.channels.len()
    }

    /// Recover the layout from a header row.
    ///
    /// Channels are the trailing `<name>`, `<name>_std` pairs, everything between the leading
    /// columns and the first channel is a setpoint.
    fn from_header(header: &StringRecord) -> Option<(Self, Columns)> {
        let fields: Vec<&str> = header.iter().collect();
        let first = fields.first()?;
        // Files of the older acquisition scripts name the first column `Loop`, those of the
        // older lock-in script `Repeat` and have no direction column.
        let columns = if first.eq_ignore_ascii_case("pass") || first.eq_ignore_ascii_case("loop") {
            Columns::PassDirection
        } else if first.eq_ignore_ascii_case("repeat") {
            Columns::PassOnly
        } else {
            return None;
        };
        let lead = columns.lead();
        if fields.len() < lead {
            return None;
        }
        let mut end = fields.len();
        let mut channels = Vec::new();
        while end >= lead + 2 {
            let name = fields[end - 2];
            if fields[end - 1] != format!("{name}_std") {
                break;
            }
            channels.push(name.to_string());
            end -= 2;
        }
        channels.reverse();
        let layout = Self {
            setpoints: fields[lead..end].iter().map(|s| s.to_string()).collect(),
            channels,
        };
        Some((layout, columns))
    }
}

/// Leading columns of a record line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Columns {
    /// Pass and direction.
    PassDirection,
    /// Pass only, every record is read as forward.
    PassOnly,
}

impl Columns {
    fn lead(self) -> usize {
        match self {
            Columns::PassDirection => 2,
            Columns::PassOnly => 1,
        }
    }
}

/// Files written by one save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFiles {
    /// Comma separated machine format.
    pub csv: PathBuf,
    /// Tab separated human format.
    pub txt: PathBuf,
}

/// Outcome of loading a file.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Number of records loaded.
    pub loaded: usize,
    /// Short lines that were skipped.
    pub skipped: Vec<RecordError>,
    /// The error that stopped the load early, if any. Records before it are kept.
    pub failure: Option<RecordError>,
}

/// Accumulates all records of a run.
///
/// The current-pass view is a filter over the same log, see [`Recorder::pass`].
#[derive(Debug, Clone)]
pub struct Recorder {
    layout: RecordLayout,
    records: Vec<Record>,
}

impl Recorder {
    /// Create an empty recorder for the given layout.
    pub fn new(layout: RecordLayout) -> Self {
        Self {
            layout,
            records: Vec::new(),
        }
    }

    /// Layout of the records.
    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Append a record to the log.
    pub fn append(&mut self, record: Record) {
        self.records.push(record);
    }

    /// All records in acquisition order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Records of the given pass in acquisition order.
    pub fn pass(&self, pass: usize) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(move |r| r.pass == pass)
    }

    /// The highest pass index in the log.
    pub fn latest_pass(&self) -> Option<usize> {
        self.records.iter().map(|r| r.pass).max()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop all records.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Write the full log to `<base>.csv` and `<base>.txt`.
    ///
    /// Both files are rewritten completely. Missing parent directories are created.
    pub fn save(&self, base: &Path, note: &str) -> Result<SavedFiles, RecordError> {
        if let Some(parent) = base.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let files = SavedFiles {
            csv: with_suffix(base, ".csv"),
            txt: with_suffix(base, ".txt"),
        };

        let mut wtr = WriterBuilder::new().from_path(&files.csv)?;
        wtr.write_record(self.layout.header())?;
        for record in &self.records {
            wtr.write_record(fields(record, |v| v.to_string()))?;
        }
        wtr.flush()?;

        let mut file = File::create(&files.txt)?;
        writeln!(file, "# {}", note.replace(['\r', '\n'], " "))?;
        let mut wtr = WriterBuilder::new().delimiter(b'\t').from_writer(file);
        wtr.write_record(self.layout.header())?;
        for record in &self.records {
            wtr.write_record(fields(record, |v| format!("{v:.5e}")))?;
        }
        wtr.flush()?;

        info!(
            "Saved {} records to {} and {}",
            self.records.len(),
            files.csv.display(),
            files.txt.display()
        );
        Ok(files)
    }

    /// Replace the log with the records of a saved file.
    ///
    /// Files ending in `.txt` are read tab separated, everything else comma separated. Comment
    /// lines starting with `#` are ignored. A header row replaces the layout of the recorder,
    /// files without header are read with the current layout.
    ///
    /// Short lines are skipped and listed in the report. A line with an unparsable value stops
    /// the load: records before it are kept and the error is returned in the report.
    pub fn load(&mut self, path: &Path) -> Result<LoadReport, RecordError> {
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("txt") => b'\t',
            _ => b',',
        };
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(Trim::All)
            .from_path(path)?;

        self.records.clear();
        let mut columns = Columns::PassDirection;
        let mut report = LoadReport::default();
        for row in rdr.records() {
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    report.failure = Some(err.into());
                    break;
                }
            };
            let line = row.position().map_or(0, |p| p.line());
            if row.iter().all(str::is_empty) {
                continue;
            }
            if let Some((layout, cols)) = RecordLayout::from_header(&row) {
                debug!("Header in line {line}: {layout:?}");
                self.layout = layout;
                columns = cols;
                continue;
            }
            match parse_record(&row, line, &self.layout, columns) {
                Ok(record) => self.records.push(record),
                Err(err @ RecordError::MalformedRecord { .. }) => {
                    warn!("Skipping line: {err}");
                    report.skipped.push(err);
                }
                Err(err) => {
                    warn!("Stopping load of {}: {err}", path.display());
                    report.failure = Some(err);
                    break;
                }
            }
        }
        report.loaded = self.records.len();
        info!("Loaded {} records from {}", report.loaded, path.display());
        Ok(report)
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn fields(record: &Record, fmt: impl Fn(f64) -> String) -> Vec<String> {
    let mut out = vec![record.pass.to_string(), record.direction.to_string()];
    out.extend(record.setpoints.iter().map(|&v| fmt(v)));
    for reading in &record.readings {
        out.push(fmt(reading.mean));
        out.push(fmt(reading.std));
    }
    out
}

fn parse_record(
    row: &StringRecord,
    line: u64,
    layout: &RecordLayout,
    columns: Columns,
) -> Result<Record, RecordError> {
    let lead = columns.lead();
    let expected = layout.field_count() - 2 + lead;
    if row.len() < expected {
        return Err(RecordError::MalformedRecord {
            line,
            expected,
            found: row.len(),
        });
    }
    let invalid = |value: &str| RecordError::InvalidValue {
        line,
        value: value.to_string(),
    };
    let float = |idx: usize| row[idx].parse::<f64>().map_err(|_| invalid(&row[idx]));

    let pass = row[0].parse::<usize>().map_err(|_| invalid(&row[0]))?;
    let direction = match columns {
        Columns::PassDirection => row[1].parse().map_err(|_| invalid(&row[1]))?,
        Columns::PassOnly => Direction::Forward,
    };
    let n_set = layout.setpoints.len();
    let setpoints = (lead..lead + n_set)
        .map(&float)
        .collect::<Result<Vec<_>, _>>()?;
    let readings = (0..layout.channels.len())
        .map(|ch| {
            let idx = lead + n_set + 2 * ch;
            Ok(Reading {
                mean: float(idx)?,
                std: float(idx + 1)?,
            })
        })
        .collect::<Result<Vec<_>, RecordError>>()?;
    Ok(Record {
        pass,
        direction,
        setpoints,
        readings,
    })
}
