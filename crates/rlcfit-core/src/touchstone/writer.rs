//! Touchstone file writer
//!
//! Re-serializes a parsed two-port sweep in the declared unit and format.
//! Parsing the output reproduces the numeric values within floating-point
//! tolerance.

use num_complex::Complex64;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use super::parser::{SParamFormat, Touchstone, TouchstoneError};
use crate::math::conversions::{complex_2_db, complex_2_degree, complex_2_magnitude};

impl fmt::Display for Touchstone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        let mut writer = Cursor::new(&mut buf);
        if self.write_to(&mut writer).is_err() {
            return Err(fmt::Error);
        }
        write!(f, "{}", String::from_utf8_lossy(&buf))
    }
}

impl Touchstone {
    /// Write to a Touchstone file
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), TouchstoneError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        self.write_to(&mut writer)
    }

    /// Write to a writer
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), TouchstoneError> {
        for comment in &self.comments {
            writeln!(writer, "! {}", comment)?;
        }

        writeln!(
            writer,
            "# {} S {} R {}",
            self.frequency.unit().token(),
            self.format.token(),
            self.z0
        )?;

        let f_scaled = self.frequency.f_scaled();

        for (freq_idx, freq) in f_scaled.iter().enumerate() {
            write!(writer, "{:>18.12e}", freq)?;

            // Standard v1 two-port order: S11, S21, S12, S22
            let order = [(0, 0), (1, 0), (0, 1), (1, 1)];
            for (i, j) in order {
                let c = self.s[[freq_idx, i, j]];
                let (v1, v2) = self.format_complex(c);
                write!(writer, " {:>18.12e} {:>18.12e}", v1, v2)?;
            }

            writeln!(writer)?;
        }

        Ok(())
    }

    fn format_complex(&self, c: Complex64) -> (f64, f64) {
        match self.format {
            SParamFormat::RI => (c.re, c.im),
            SParamFormat::MA => (complex_2_magnitude(c), complex_2_degree(c)),
            SParamFormat::DB => (complex_2_db(c), complex_2_degree(c)),
        }
    }
}
