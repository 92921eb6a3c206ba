//! Touchstone file parser
//!
//! Implements parsing of Touchstone v1 two-port files into a validated
//! frequency sweep. Every data row must carry the full 2x2 matrix; the
//! frequency column must be strictly increasing.

use ndarray::Array3;
use num_complex::Complex64;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

use crate::constants::DEFAULT_Z0;
use crate::frequency::{Frequency, FrequencyUnit};
use crate::math::conversions::{dbdeg_2_reim, magdeg_2_reim};

/// Touchstone parsing errors
#[derive(Error, Debug)]
pub enum TouchstoneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed header at line {line}: {message}")]
    MalformedHeader { line: usize, message: String },

    #[error("malformed data row at line {line}: {message}")]
    MalformedRow { line: usize, message: String },

    #[error("non-monotonic frequency at line {line}: {freq_hz} Hz does not increase on the previous point")]
    NonMonotonicFrequency { line: usize, freq_hz: f64 },

    #[error("invalid file extension: expected .s2p")]
    InvalidExtension,
}

/// S-parameter data format declared in the option line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SParamFormat {
    #[default]
    RI, // Real-Imaginary
    MA, // Magnitude-Angle (degrees)
    DB, // dB-Angle (degrees)
}

impl SParamFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "RI" => Some(SParamFormat::RI),
            "MA" => Some(SParamFormat::MA),
            "DB" => Some(SParamFormat::DB),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            SParamFormat::RI => "RI",
            SParamFormat::MA => "MA",
            SParamFormat::DB => "DB",
        }
    }
}

/// Parsed two-port Touchstone file
#[derive(Debug, Clone)]
pub struct Touchstone {
    /// Frequency data
    pub frequency: Frequency,
    /// S-parameter matrices, shape [nfreq, 2, 2]
    pub s: Array3<Complex64>,
    /// Reference impedance (Ohm)
    pub z0: f64,
    /// Comments from the file
    pub comments: Vec<String>,
    /// Declared data format
    pub format: SParamFormat,
}

/// Number of ports this parser accepts
pub const NPORTS: usize = 2;

/// Columns per data row: frequency + 8 values for the 2x2 matrix
const ROW_COLUMNS: usize = 1 + 2 * NPORTS * NPORTS;

impl Touchstone {
    /// Parse a Touchstone file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TouchstoneError> {
        let path = path.as_ref();

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or(TouchstoneError::InvalidExtension)?;
        if !ext.eq_ignore_ascii_case("s2p") {
            return Err(TouchstoneError::InvalidExtension);
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);

        Self::parse(reader)
    }

    /// Parse from string content
    pub fn from_str(content: &str) -> Result<Self, TouchstoneError> {
        let cursor = std::io::Cursor::new(content);
        Self::parse(cursor)
    }

    /// Parse from a reader
    fn parse<R: BufRead>(reader: R) -> Result<Self, TouchstoneError> {
        let mut state = ParserState::new();

        for (idx, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let line_no = idx + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() {
                continue;
            }

            if let Some(comment) = trimmed.strip_prefix('!') {
                state.comments.push(comment.trim().to_string());
                continue;
            }

            if trimmed.starts_with('#') {
                state.parse_option_line(trimmed, line_no)?;
                continue;
            }

            state.parse_data_line(trimmed, line_no)?;
        }

        state.finalize()
    }

    /// Parse the option line (`# Hz S RI R 50`)
    ///
    /// The frequency unit, the `S` parameter-type token and the data format
    /// are all required; the reference impedance defaults to 50 Ohm when no
    /// `R` token is present.
    pub fn parse_option_line(
        line: &str,
        line_no: usize,
    ) -> Result<(FrequencyUnit, SParamFormat, f64), TouchstoneError> {
        let header = |message: String| TouchstoneError::MalformedHeader {
            line: line_no,
            message,
        };

        let parts: Vec<&str> = line[1..].split_whitespace().collect();

        let mut freq_unit = None;
        let mut format = None;
        let mut param_type_seen = false;
        let mut z0 = DEFAULT_Z0;

        let mut i = 0;
        while i < parts.len() {
            let part = parts[i].to_uppercase();

            if let Some(unit) = FrequencyUnit::from_str(&part) {
                freq_unit = Some(unit);
            } else if let Some(fmt) = SParamFormat::from_str(&part) {
                format = Some(fmt);
            } else if part == "S" {
                param_type_seen = true;
            } else if matches!(part.as_str(), "Y" | "Z" | "G" | "H" | "T") {
                return Err(header(format!(
                    "parameter type '{}' is not supported, expected S",
                    part
                )));
            } else if part == "R" {
                let value = parts
                    .get(i + 1)
                    .ok_or_else(|| header("R token without a value".to_string()))?;
                z0 = value
                    .parse::<f64>()
                    .map_err(|_| header(format!("invalid reference impedance '{}'", value)))?;
                i += 1;
            } else {
                return Err(header(format!("unrecognized token '{}'", parts[i])));
            }

            i += 1;
        }

        let freq_unit =
            freq_unit.ok_or_else(|| header("missing frequency unit token".to_string()))?;
        let format = format.ok_or_else(|| header("missing data format token".to_string()))?;
        if !param_type_seen {
            return Err(header("missing parameter type token".to_string()));
        }

        Ok((freq_unit, format, z0))
    }

    /// Get the number of frequency points
    pub fn nfreq(&self) -> usize {
        self.s.shape()[0]
    }
}

/// Internal parser state
struct ParserState {
    freq_unit: FrequencyUnit,
    format: SParamFormat,
    z0: f64,
    comments: Vec<String>,
    option_parsed: bool,

    frequencies: Vec<f64>,
    s_data: Vec<[Complex64; 4]>,
    last_line: usize,
}

impl ParserState {
    fn new() -> Self {
        Self {
            freq_unit: FrequencyUnit::Hz,
            format: SParamFormat::RI,
            z0: DEFAULT_Z0,
            comments: Vec::new(),
            option_parsed: false,
            frequencies: Vec::new(),
            s_data: Vec::new(),
            last_line: 0,
        }
    }

    fn parse_option_line(&mut self, line: &str, line_no: usize) -> Result<(), TouchstoneError> {
        // Subsequent option lines are ignored per the v1 format
        if self.option_parsed {
            return Ok(());
        }
        let (unit, format, z0) = Touchstone::parse_option_line(line, line_no)?;
        self.freq_unit = unit;
        self.format = format;
        self.z0 = z0;
        self.option_parsed = true;
        Ok(())
    }

    fn parse_data_line(&mut self, line: &str, line_no: usize) -> Result<(), TouchstoneError> {
        if !self.option_parsed {
            return Err(TouchstoneError::MalformedHeader {
                line: line_no,
                message: "data encountered before the option line".to_string(),
            });
        }

        // Strip a trailing comment if any
        let clean = line.find('!').map_or(line, |idx| &line[..idx]);

        let tokens: Vec<&str> = clean.split_whitespace().collect();
        if tokens.len() != ROW_COLUMNS {
            return Err(TouchstoneError::MalformedRow {
                line: line_no,
                message: format!("expected {} columns, found {}", ROW_COLUMNS, tokens.len()),
            });
        }

        let mut values = [0.0; ROW_COLUMNS];
        for (i, token) in tokens.iter().enumerate() {
            values[i] = token.parse::<f64>().map_err(|_| TouchstoneError::MalformedRow {
                line: line_no,
                message: format!("non-numeric token '{}'", token),
            })?;
        }

        let freq_hz = values[0] * self.freq_unit.multiplier();
        if let Some(&last) = self.frequencies.last() {
            if freq_hz <= last {
                return Err(TouchstoneError::NonMonotonicFrequency {
                    line: line_no,
                    freq_hz,
                });
            }
        }

        // V1 two-port column order: S11, S21, S12, S22
        let s11 = self.parse_complex_val(values[1], values[2]);
        let s21 = self.parse_complex_val(values[3], values[4]);
        let s12 = self.parse_complex_val(values[5], values[6]);
        let s22 = self.parse_complex_val(values[7], values[8]);

        self.frequencies.push(freq_hz);
        self.s_data.push([s11, s12, s21, s22]);
        self.last_line = line_no;
        Ok(())
    }

    fn parse_complex_val(&self, v1: f64, v2: f64) -> Complex64 {
        match self.format {
            SParamFormat::RI => Complex64::new(v1, v2),
            SParamFormat::MA => magdeg_2_reim(v1, v2),
            SParamFormat::DB => dbdeg_2_reim(v1, v2),
        }
    }

    fn finalize(self) -> Result<Touchstone, TouchstoneError> {
        if !self.option_parsed {
            return Err(TouchstoneError::MalformedHeader {
                line: self.last_line,
                message: "missing option line".to_string(),
            });
        }
        if self.s_data.is_empty() {
            return Err(TouchstoneError::MalformedHeader {
                line: self.last_line,
                message: "file contains no data rows".to_string(),
            });
        }

        let nfreq = self.s_data.len();
        // Row-major [s11, s12, s21, s22] per frequency point
        let s = Array3::from_shape_fn((nfreq, NPORTS, NPORTS), |(f, i, j)| {
            self.s_data[f][i * NPORTS + j]
        });

        let frequency = Frequency::from_f(
            self.frequencies
                .iter()
                .map(|&f| f / self.freq_unit.multiplier())
                .collect(),
            self.freq_unit,
        );

        Ok(Touchstone {
            frequency,
            s,
            z0: self.z0,
            comments: self.comments,
            format: self.format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_option_line() {
        let (unit, format, z0) = Touchstone::parse_option_line("# GHz S RI R 50", 1).unwrap();
        assert_eq!(unit, FrequencyUnit::GHz);
        assert_eq!(format, SParamFormat::RI);
        assert_eq!(z0, 50.0);

        let (unit, format, z0) = Touchstone::parse_option_line("# MHz S MA R 75", 1).unwrap();
        assert_eq!(unit, FrequencyUnit::MHz);
        assert_eq!(format, SParamFormat::MA);
        assert_eq!(z0, 75.0);
    }

    #[test]
    fn test_option_line_default_z0() {
        let (_, _, z0) = Touchstone::parse_option_line("# Hz S RI", 1).unwrap();
        assert_eq!(z0, DEFAULT_Z0);
    }

    #[test]
    fn test_option_line_missing_tokens() {
        assert!(matches!(
            Touchstone::parse_option_line("# GHz RI R 50", 3),
            Err(TouchstoneError::MalformedHeader { line: 3, .. })
        ));
        assert!(matches!(
            Touchstone::parse_option_line("# S RI", 1),
            Err(TouchstoneError::MalformedHeader { .. })
        ));
        // Non-S parameter types are rejected
        assert!(matches!(
            Touchstone::parse_option_line("# GHz Z RI R 50", 1),
            Err(TouchstoneError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_parse_minimal_ri() {
        let content = "! test fixture\n\
                       # GHz S RI R 50\n\
                       1.0 0.1 0.0 0.9 0.0 0.9 0.0 0.1 0.0\n\
                       2.0 0.2 -0.1 0.8 0.1 0.8 0.1 0.2 -0.1\n";
        let ts = Touchstone::from_str(content).unwrap();

        assert_eq!(ts.nfreq(), 2);
        assert_eq!(ts.z0, 50.0);
        assert_eq!(ts.comments, vec!["test fixture".to_string()]);
        assert_relative_eq!(ts.frequency.f()[0], 1e9, epsilon = 1.0);
        assert_relative_eq!(ts.s[[0, 0, 0]].re, 0.1, epsilon = 1e-12);
        assert_relative_eq!(ts.s[[1, 1, 0]].im, 0.1, epsilon = 1e-12);
        assert_relative_eq!(ts.s[[1, 1, 1]].im, -0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_ma_format() {
        let content = "# Hz S MA R 50\n1000 1.0 90.0 0.5 0.0 0.5 0.0 1.0 -90.0\n";
        let ts = Touchstone::from_str(content).unwrap();

        assert_relative_eq!(ts.s[[0, 0, 0]].re, 0.0, epsilon = 1e-12);
        assert_relative_eq!(ts.s[[0, 0, 0]].im, 1.0, epsilon = 1e-12);
        assert_relative_eq!(ts.s[[0, 1, 1]].im, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_wrong_column_count() {
        let content = "# Hz S RI R 50\n1000 0.1 0.0 0.9\n";
        assert!(matches!(
            Touchstone::from_str(content),
            Err(TouchstoneError::MalformedRow { line: 2, .. })
        ));
    }

    #[test]
    fn test_non_numeric_token() {
        let content = "# Hz S RI R 50\n1000 0.1 0.0 0.9 0.0 0.9 0.0 0.1 oops\n";
        assert!(matches!(
            Touchstone::from_str(content),
            Err(TouchstoneError::MalformedRow { line: 2, .. })
        ));
    }

    #[test]
    fn test_non_monotonic_frequency() {
        let row = "0.1 0.0 0.9 0.0 0.9 0.0 0.1 0.0";
        let content = format!("# Hz S RI R 50\n1000 {row}\n1000 {row}\n");
        assert!(matches!(
            Touchstone::from_str(&content),
            Err(TouchstoneError::NonMonotonicFrequency { line: 3, .. })
        ));

        let content = format!("# Hz S RI R 50\n2000 {row}\n1000 {row}\n");
        assert!(matches!(
            Touchstone::from_str(&content),
            Err(TouchstoneError::NonMonotonicFrequency { line: 3, .. })
        ));
    }

    #[test]
    fn test_missing_option_line() {
        let content = "1000 0.1 0.0 0.9 0.0 0.9 0.0 0.1 0.0\n";
        assert!(matches!(
            Touchstone::from_str(content),
            Err(TouchstoneError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(
            Touchstone::from_str(""),
            Err(TouchstoneError::MalformedHeader { .. })
        ));
    }
}
