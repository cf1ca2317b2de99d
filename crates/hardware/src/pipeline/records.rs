//! Pulse and waveform records.
//!
//! This module defines the records the extractor emits and their persisted
//! form. It provides:
//! 1. **Pulse:** One detected peak with amplitude, sub-bx position and optional time over threshold.
//! 2. **Waveform:** A latency-aligned window of raw samples or derived signal.
//! 3. **Text Form:** One comma-delimited record per line, no header, with readers and writers.
//!
//! Pulse lines are `orbit,bx,amplitude,position,tot`; an absent `tot` is an
//! empty field. Waveform lines are `orbit,bx,kind,s0,s1,...`.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::common::error::RecordError;

/// A detected pulse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pulse {
    /// Orbit (frame) number.
    pub orbit: u64,
    /// Bunch crossing within the orbit.
    pub bx: u32,
    /// Peak value reported by the detector.
    pub amplitude: i64,
    /// Sample index of the peak within the bunch crossing.
    pub position: u32,
    /// Time over threshold in samples, for detectors that report it.
    pub tot: Option<u32>,
}

impl fmt::Display for Pulse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},",
            self.orbit, self.bx, self.amplitude, self.position
        )?;
        if let Some(tot) = self.tot {
            write!(f, "{tot}")?;
        }
        Ok(())
    }
}

impl FromStr for Pulse {
    type Err = RecordError;

    /// Parses a pulse line.
    ///
    /// A missing, empty or `None` fifth field is an absent `tot`; fields after
    /// the fifth are ignored.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
        if fields.len() < 4 {
            return Err(RecordError::FieldCount {
                line: 0,
                expected: 4,
                found: fields.len(),
            });
        }
        let tot = match fields.get(4).copied() {
            None | Some("" | "None") => None,
            Some(raw) => Some(parse_field(raw, "tot")?),
        };
        Ok(Self {
            orbit: parse_field(fields[0], "orbit")?,
            bx: parse_field(fields[1], "bx")?,
            amplitude: parse_field(fields[2], "amplitude")?,
            position: parse_field(fields[3], "position")?,
            tot,
        })
    }
}

/// Waveform source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WaveformKind {
    /// Raw ADC samples.
    Raw,
    /// Detector-derived signal (e.g., the derivative).
    Derived,
}

impl WaveformKind {
    /// Tag used in the persisted record.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Derived => "derived",
        }
    }
}

impl fmt::Display for WaveformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for WaveformKind {
    type Err = RecordError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "raw" => Ok(Self::Raw),
            "derived" => Ok(Self::Derived),
            other => Err(RecordError::UnknownKind {
                line: 0,
                kind: other.to_string(),
            }),
        }
    }
}

/// A waveform window captured at a detection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Waveform {
    /// Orbit (frame) number of the detection.
    pub orbit: u64,
    /// Bunch crossing of the detection.
    pub bx: u32,
    /// Raw or derived.
    pub kind: WaveformKind,
    /// Samples, oldest bunch crossing first.
    pub samples: Vec<i64>,
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.orbit, self.bx, self.kind)?;
        for sample in &self.samples {
            write!(f, ",{sample}")?;
        }
        Ok(())
    }
}

impl FromStr for Waveform {
    type Err = RecordError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
        if fields.len() < 3 {
            return Err(RecordError::FieldCount {
                line: 0,
                expected: 3,
                found: fields.len(),
            });
        }
        let samples = fields[3..]
            .iter()
            .filter(|raw| !raw.is_empty())
            .map(|raw| parse_field(raw, "sample"))
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(Self {
            orbit: parse_field(fields[0], "orbit")?,
            bx: parse_field(fields[1], "bx")?,
            kind: fields[2].parse()?,
            samples,
        })
    }
}

fn parse_field<T: FromStr>(raw: &str, field: &'static str) -> Result<T, RecordError> {
    raw.parse().map_err(|_| RecordError::Integer {
        line: 0,
        field,
        value: raw.to_string(),
    })
}

/// Writes one record per line.
///
/// # Errors
///
/// Returns [`RecordError::Io`] if the writer fails.
pub fn write_records<W, R>(mut writer: W, records: &[R]) -> Result<(), RecordError>
where
    W: Write,
    R: fmt::Display,
{
    for record in records {
        writeln!(writer, "{record}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads one record per line, skipping blank lines.
///
/// # Errors
///
/// Returns the first malformed record, attributed to its 1-based line number,
/// or [`RecordError::Io`] if the reader fails.
pub fn read_records<B, R>(reader: B) -> Result<Vec<R>, RecordError>
where
    B: BufRead,
    R: FromStr<Err = RecordError>,
{
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(line.parse::<R>().map_err(|err| err.at_line(idx + 1))?);
    }
    Ok(records)
}

/// Returns `path` with a `.csv` extension appended when it has none.
pub fn csv_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.extension().is_some_and(|ext| ext == "csv") {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".csv");
        PathBuf::from(name)
    }
}

/// Writes pulses to a `.csv` file, creating or truncating it.
///
/// # Errors
///
/// Returns [`RecordError::Io`] if the file cannot be written.
pub fn save_pulses(path: impl AsRef<Path>, pulses: &[Pulse]) -> Result<PathBuf, RecordError> {
    let path = csv_path(path);
    write_records(BufWriter::new(File::create(&path)?), pulses)?;
    Ok(path)
}

/// Reads pulses from a file.
///
/// # Errors
///
/// As [`read_records`], plus [`RecordError::Io`] if the file cannot be opened.
pub fn load_pulses(path: impl AsRef<Path>) -> Result<Vec<Pulse>, RecordError> {
    read_records(BufReader::new(File::open(path)?))
}

/// Writes waveforms to a `.csv` file, creating or truncating it.
///
/// # Errors
///
/// Returns [`RecordError::Io`] if the file cannot be written.
pub fn save_waveforms(
    path: impl AsRef<Path>,
    waveforms: &[Waveform],
) -> Result<PathBuf, RecordError> {
    let path = csv_path(path);
    write_records(BufWriter::new(File::create(&path)?), waveforms)?;
    Ok(path)
}

/// Reads waveforms from a file.
///
/// # Errors
///
/// As [`read_records`], plus [`RecordError::Io`] if the file cannot be opened.
pub fn load_waveforms(path: impl AsRef<Path>) -> Result<Vec<Waveform>, RecordError> {
    read_records(BufReader::new(File::open(path)?))
}
