// SDN-TE: Delay-Aware Traffic Engineering for Software-Defined Networks
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Report Decoding
//!
//! Extracts the average delay, jitter and bitrate from the decoded receiver log of the traffic
//! generator. A decoded report looks like this (only the tail is shown):
//!
//! ```text
//! Average delay            =      0.000116 s
//! Average jitter           =      0.000025 s
//! Delay standard deviation =      0.000050 s
//! Bytes received           =          1000
//! Average bitrate          =      0.800801 Kbit/s
//! Average packet rate      =     10.010010 pkt/s
//! Packets dropped          =             0 (0.00 %)
//! Average loss-burst size  =             0 pkt
//! Error lines              =             0
//! ----------------------------------------------------------
//! ```

use crate::error::ProbeParseError;
use crate::topology::LinkWeight;

use lazy_static::lazy_static;
use regex::Regex;

const DELAY_FIELD: &str = "average delay";
const JITTER_FIELD: &str = "average jitter";

lazy_static! {
    static ref DELAY_LABEL: Regex = Regex::new(r"(?i)^\s*average delay\s*=").unwrap();
    static ref JITTER_LABEL: Regex = Regex::new(r"(?i)^\s*average jitter\s*=").unwrap();
    static ref BITRATE_LABEL: Regex = Regex::new(r"(?i)^\s*average bitrate\s*=").unwrap();
    static ref THROUGHPUT_LABEL: Regex = Regex::new(r"(?i)^\s*throughput\s*=").unwrap();
}

/// Position of the fields, counted from the end of the report.
const DELAY_OFFSET: usize = 10;
const JITTER_OFFSET: usize = 9;
const BITRATE_OFFSET: usize = 6;

/// How to locate the fields inside the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportParseMode {
    /// Scan all lines for the field labels. If a label occurs multiple times (once per flow and
    /// once in the total results), the last occurrence is used.
    Labeled,
    /// Read the fields at a fixed line offset from the end of the report.
    TailOffset,
}

impl Default for ReportParseMode {
    fn default() -> Self {
        ReportParseMode::Labeled
    }
}

/// Values extracted from a report
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    /// Average one-way delay in milliseconds
    pub delay: LinkWeight,
    /// Average jitter in milliseconds
    pub jitter: Option<LinkWeight>,
    /// Average bitrate in Kbit/s
    pub bitrate: Option<f64>,
}

/// Parse the decoded report. Only the delay is required, jitter and bitrate are optional.
pub fn parse_report(report: &str, mode: ReportParseMode) -> Result<ProbeReport, ProbeParseError> {
    let (delay, jitter, bitrate) = match mode {
        ReportParseMode::Labeled => (
            find_labeled(report, &DELAY_LABEL)
                .ok_or(ProbeParseError::MissingField(DELAY_FIELD))?,
            find_labeled(report, &JITTER_LABEL),
            find_labeled(report, &BITRATE_LABEL)
                .or_else(|| find_labeled(report, &THROUGHPUT_LABEL)),
        ),
        ReportParseMode::TailOffset => {
            let lines: Vec<&str> = report.lines().collect();
            if lines.len() < DELAY_OFFSET {
                return Err(ProbeParseError::TooShort(lines.len()));
            }
            let tail = |offset: usize| value_of(lines[lines.len() - offset]);
            (
                tail(DELAY_OFFSET).ok_or(ProbeParseError::MissingField(DELAY_FIELD))?,
                tail(JITTER_OFFSET),
                tail(BITRATE_OFFSET),
            )
        }
    };

    let delay_ms = to_millis(DELAY_FIELD, &delay)?;
    if delay_ms < 0.0 {
        return Err(ProbeParseError::InvalidValue { field: DELAY_FIELD, value: delay.repr() });
    }

    Ok(ProbeReport {
        delay: delay_ms,
        jitter: jitter.and_then(|j| to_millis(JITTER_FIELD, &j).ok()),
        bitrate: bitrate.and_then(|b| to_kbps(&b)),
    })
}

/// Raw value of a field: the number and its unit (if any)
#[derive(Debug, Clone, PartialEq)]
struct RawValue {
    number: String,
    unit: Option<String>,
}

impl RawValue {
    fn repr(&self) -> String {
        match self.unit.as_ref() {
            Some(u) => format!("{} {}", self.number, u),
            None => self.number.clone(),
        }
    }
}

/// Value after the last `=` of the line, split into number and unit.
fn value_of(line: &str) -> Option<RawValue> {
    let (_, rhs) = line.rsplit_once('=')?;
    let mut parts = rhs.split_whitespace();
    let number = parts.next()?.to_string();
    let unit = parts.next().map(|u| u.to_string());
    Some(RawValue { number, unit })
}

fn find_labeled(report: &str, label: &Regex) -> Option<RawValue> {
    report.lines().filter(|l| label.is_match(l)).filter_map(value_of).last()
}

fn to_millis(field: &'static str, value: &RawValue) -> Result<LinkWeight, ProbeParseError> {
    let invalid = || ProbeParseError::InvalidValue { field, value: value.repr() };
    let number: LinkWeight = value.number.parse().map_err(|_| invalid())?;
    if !number.is_finite() {
        return Err(invalid());
    }
    let factor = match value.unit.as_deref() {
        None | Some("ms") => 1.0,
        Some("s") => 1000.0,
        Some("us") => 0.001,
        Some(_) => return Err(invalid()),
    };
    Ok(number * factor)
}

fn to_kbps(value: &RawValue) -> Option<f64> {
    let number: f64 = value.number.parse().ok()?;
    let factor = match value.unit.as_deref() {
        None | Some("Kbit/s") => 1.0,
        Some("bit/s") => 0.001,
        Some("Mbit/s") => 1000.0,
        Some("Gbit/s") => 1_000_000.0,
        Some(_) => return None,
    };
    Some(number * factor)
}
