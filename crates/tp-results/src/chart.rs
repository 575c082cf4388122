//! Aligned series for plotting a run.
//!
//! The chart has logical time on the x-axis and three y-series: process
//! variable, absolute error and control value (plus the setpoint line).
//! Rendering itself is left to external tools; [`ChartSeries::write_csv`]
//! produces a file any plotting tool can read.

use std::io::Write;

use serde::{Deserialize, Serialize};
use tp_sim::SimulationRecord;

use crate::types::TimeseriesRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub sample_time: f64,
    pub initial_temp: f64,
    /// `iteration * sample_time`.
    pub time_s: Vec<f64>,
    pub setpoint: Vec<f64>,
    pub process_variable: Vec<f64>,
    pub absolute_error: Vec<f64>,
    pub control_value: Vec<f64>,
}

impl ChartSeries {
    pub fn from_record(record: &SimulationRecord, sample_time: f64, initial_temp: f64) -> Self {
        Self::from_timeseries(
            &TimeseriesRecord::from_record(record, sample_time),
            sample_time,
            initial_temp,
        )
    }

    pub fn from_timeseries(rows: &[TimeseriesRecord], sample_time: f64, initial_temp: f64) -> Self {
        let mut series = Self {
            sample_time,
            initial_temp,
            ..Default::default()
        };
        for row in rows {
            series.time_s.push(row.time_s);
            series.setpoint.push(row.setpoint);
            series.process_variable.push(row.process_variable);
            series.absolute_error.push(row.absolute_error);
            series.control_value.push(row.control_value);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.time_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_s.is_empty()
    }

    pub fn time_min(&self) -> Vec<f64> {
        self.time_s.iter().map(|t| t / 60.0).collect()
    }

    /// Temperature trace as a continuous line: the initial temperature at
    /// t = 0, then each post-step temperature at the end of its period.
    /// Has one more point than the other series.
    pub fn temperature_trace(&self) -> Vec<(f64, f64)> {
        std::iter::once((0.0, self.initial_temp))
            .chain(
                self.time_s
                    .iter()
                    .zip(&self.process_variable)
                    .map(|(t, pv)| (t + self.sample_time, *pv)),
            )
            .collect()
    }

    /// Write one row per iteration with a header line, then flush `out`.
    pub fn write_csv<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(
            out,
            "time_s,time_min,setpoint,process_variable,absolute_error,control_value"
        )?;
        for i in 0..self.len() {
            writeln!(
                out,
                "{},{},{},{},{},{}",
                self.time_s[i],
                self.time_s[i] / 60.0,
                self.setpoint[i],
                self.process_variable[i],
                self.absolute_error[i],
                self.control_value[i]
            )?;
        }
        out.flush()
    }

    pub fn to_csv_string(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_csv(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Look up one series by name or short alias.
    pub fn column(&self, variable: &str) -> Option<&[f64]> {
        match variable {
            "pv" | "process_variable" | "temperature" => Some(self.process_variable.as_slice()),
            "error" | "absolute_error" => Some(self.absolute_error.as_slice()),
            "cv" | "control_value" => Some(self.control_value.as_slice()),
            "sp" | "setpoint" => Some(self.setpoint.as_slice()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tp_sim::{SimulationLoop, SimulationParameters};

    fn series(n: i64) -> ChartSeries {
        let params = SimulationParameters {
            max_iterations: n,
            ..Default::default()
        };
        let record = SimulationLoop::new(params).unwrap().run();
        ChartSeries::from_record(&record, params.sample_time, params.initial_temp)
    }

    #[test]
    fn series_are_aligned() {
        let s = series(5);
        assert_eq!(s.len(), 5);
        assert_eq!(s.setpoint.len(), 5);
        assert_eq!(s.process_variable.len(), 5);
        assert_eq!(s.absolute_error.len(), 5);
        assert_eq!(s.control_value.len(), 5);
        assert_eq!(s.time_min()[4], 2.0);
    }

    #[test]
    fn temperature_trace_starts_at_initial() {
        let s = series(3);
        let trace = s.temperature_trace();
        assert_eq!(trace.len(), 4);
        assert_eq!(trace[0], (0.0, 20.0));
        assert_eq!(trace[1], (30.0, s.process_variable[0]));
        assert_eq!(trace[3].0, 90.0);
    }

    #[test]
    fn csv_has_header_and_one_row_per_iteration() {
        let csv = series(4).to_csv_string();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("time_s,time_min,setpoint"));
        assert!(lines[1].starts_with("0,0,75,"));
        assert_eq!(lines[2].split(',').count(), 6);
    }

    #[test]
    fn empty_series_writes_only_header() {
        let csv = series(0).to_csv_string();
        assert_eq!(csv.lines().count(), 1);
        assert_eq!(series(0).temperature_trace(), vec![(0.0, 20.0)]);
    }

    struct FlushFails(Vec<u8>);

    impl Write for FlushFails {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::other("disk full"))
        }
    }

    #[test]
    fn flush_error_is_reported() {
        let mut out = FlushFails(Vec::new());
        assert!(series(2).write_csv(&mut out).is_err());
        assert_eq!(String::from_utf8_lossy(&out.0).lines().count(), 3);
    }

    #[test]
    fn column_lookup_by_alias() {
        let s = series(2);
        assert_eq!(s.column("cv"), Some(s.control_value.as_slice()));
        assert!(s.column("pressure").is_none());
    }
}
