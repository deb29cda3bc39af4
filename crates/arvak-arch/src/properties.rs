//! Per-device calibration data (error rates, coherence times, readout fidelity).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{ArchError, ArchResult};

/// Calibration data for a single physical qubit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QubitCalibration {
    /// Average single-qubit gate error rate, in `[0, 1]`.
    pub single_qubit_error: f64,
    /// Readout (measurement) error rate, in `[0, 1]`.
    pub readout_error: f64,
    /// T1 relaxation time, in microseconds.
    pub t1_us: f64,
    /// T2 dephasing time, in microseconds.
    pub t2_us: f64,
    /// Qubit drive frequency, in GHz.
    pub frequency_ghz: f64,
}

impl Default for QubitCalibration {
    fn default() -> Self {
        Self {
            single_qubit_error: 0.0,
            readout_error: 0.0,
            t1_us: f64::INFINITY,
            t2_us: f64::INFINITY,
            frequency_ghz: 0.0,
        }
    }
}

/// Calibration data for a two-qubit coupling edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeCalibration {
    /// Two-qubit gate error rate, in `[0, 1]`.
    pub two_qubit_error: f64,
    /// Gate duration, in nanoseconds.
    pub duration_ns: f64,
}

impl Default for EdgeCalibration {
    fn default() -> Self {
        Self {
            two_qubit_error: 0.0,
            duration_ns: 0.0,
        }
    }
}

/// A full calibration snapshot for a device: per-qubit and per-edge error
/// models plus the date the calibration was taken.
///
/// `calibration_date` is a free-form string (e.g. an ISO-8601 date) rather
/// than a parsed timestamp type, since downstream consumers only ever
/// display or compare it lexically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Properties {
    pub qubits: FxHashMap<u32, QubitCalibration>,
    pub edges: FxHashMap<(u32, u32), EdgeCalibration>,
    pub calibration_date: String,
}

impl Properties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_qubit(&mut self, qubit: u32, cal: QubitCalibration) {
        self.qubits.insert(qubit, cal);
    }

    pub fn set_edge(&mut self, a: u32, b: u32, cal: EdgeCalibration) {
        self.edges.insert(Self::edge_key(a, b), cal);
    }

    fn edge_key(a: u32, b: u32) -> (u32, u32) {
        if a <= b { (a, b) } else { (b, a) }
    }

    /// Single-qubit gate fidelity, `1 - error`.
    pub fn single_qubit_fidelity(&self, qubit: u32) -> ArchResult<f64> {
        self.qubits
            .get(&qubit)
            .map(|c| 1.0 - c.single_qubit_error)
            .ok_or_else(|| ArchError::NoFidelityData(format!("qubit {qubit}")))
    }

    /// Two-qubit gate fidelity between `a` and `b`, `1 - error`.
    pub fn two_qubit_fidelity(&self, a: u32, b: u32) -> ArchResult<f64> {
        self.edges
            .get(&Self::edge_key(a, b))
            .map(|c| 1.0 - c.two_qubit_error)
            .ok_or_else(|| ArchError::NoFidelityData(format!("edge ({a}, {b})")))
    }

    /// Readout fidelity for `qubit`, `1 - error`.
    pub fn readout_fidelity(&self, qubit: u32) -> ArchResult<f64> {
        self.qubits
            .get(&qubit)
            .map(|c| 1.0 - c.readout_error)
            .ok_or_else(|| ArchError::NoFidelityData(format!("qubit {qubit} readout")))
    }

    /// Loads per-qubit/per-edge calibration from a CSV payload.
    ///
    /// Expected columns, one row per qubit:
    /// `qubit,single_qubit_error,readout_error,t1_us,t2_us,frequency_ghz`
    /// followed by a `--edges--` marker line and rows of
    /// `q1,q2,two_qubit_error,duration_ns`.
    pub fn from_csv(text: &str, calibration_date: impl Into<String>) -> ArchResult<Self> {
        let mut props = Properties::new();
        props.calibration_date = calibration_date.into();
        let mut in_edges = false;

        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line == "--edges--" {
                in_edges = true;
                continue;
            }

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if !in_edges {
                if fields.len() != 5 {
                    return Err(ArchError::FormatError(format!(
                        "line {}: expected 5 qubit fields, found {}",
                        lineno + 1,
                        fields.len()
                    )));
                }
                let qubit = parse_field(fields[0], lineno)?;
                props.set_qubit(
                    qubit,
                    QubitCalibration {
                        single_qubit_error: parse_field(fields[1], lineno)?,
                        readout_error: parse_field(fields[2], lineno)?,
                        t1_us: parse_field(fields[3], lineno)?,
                        t2_us: parse_field(fields[4], lineno)?,
                        frequency_ghz: 0.0,
                    },
                );
            } else {
                if fields.len() != 4 {
                    return Err(ArchError::FormatError(format!(
                        "line {}: expected 4 edge fields, found {}",
                        lineno + 1,
                        fields.len()
                    )));
                }
                let a = parse_field(fields[0], lineno)?;
                let b = parse_field(fields[1], lineno)?;
                props.set_edge(
                    a,
                    b,
                    EdgeCalibration {
                        two_qubit_error: parse_field(fields[2], lineno)?,
                        duration_ns: parse_field(fields[3], lineno)?,
                    },
                );
            }
        }

        Ok(props)
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, lineno: usize) -> ArchResult<T> {
    field
        .parse()
        .map_err(|_| ArchError::FormatError(format!("line {}: bad field '{field}'", lineno + 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_csv_round_trip() {
        let csv = "qubit,single_qubit_error,readout_error,t1_us,t2_us,frequency_ghz\n\
                   0,0.001,0.02,100.0,80.0,0\n\
                   1,0.002,0.03,90.0,70.0,0\n\
                   --edges--\n\
                   0,1,0.01,300.0\n";
        let props = Properties::from_csv(csv, "2026-01-01").unwrap();
        assert_eq!(props.qubits.len(), 2);
        assert_eq!(props.edges.len(), 1);
        assert!((props.single_qubit_fidelity(0).unwrap() - 0.999).abs() < 1e-9);
        assert!((props.two_qubit_fidelity(1, 0).unwrap() - 0.99).abs() < 1e-9);
    }

    #[test]
    fn missing_fidelity_errors() {
        let props = Properties::new();
        assert!(props.single_qubit_fidelity(0).is_err());
    }
}
