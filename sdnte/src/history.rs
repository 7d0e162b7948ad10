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

//! # Delay History
//!
//! Reading and writing link delay measurements as CSV, with the columns `Source`, `Destination`
//! and `Avg_Delay(ms)`. Historical measurements are used to seed the initial link weights, and
//! every measurement of the probe can be appended to a measurement log.

use crate::topology::{LinkWeight, SwitchId, TopologyDescriptor};
use crate::Error;

use csv::{Reader, Writer, WriterBuilder};
use log::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

const HEADER: [&str; 3] = ["Source", "Destination", "Avg_Delay(ms)"];

/// A single row of a delay file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayRecord {
    /// Sending endpoint
    #[serde(rename = "Source")]
    pub source: SwitchId,
    /// Receiving endpoint
    #[serde(rename = "Destination")]
    pub destination: SwitchId,
    /// Average delay in milliseconds
    #[serde(rename = "Avg_Delay(ms)")]
    pub delay: LinkWeight,
}

/// Range from which link delays are drawn when no historical value is available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackRange {
    /// Lower bound (inclusive), in milliseconds
    pub low: LinkWeight,
    /// Upper bound (exclusive), in milliseconds
    pub high: LinkWeight,
}

impl FallbackRange {
    /// Create a new range
    pub fn new(low: LinkWeight, high: LinkWeight) -> Self {
        Self { low, high }
    }

    /// Draw a value from the range. If the range is empty, the lower bound is returned.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> LinkWeight {
        if self.high > self.low {
            rng.gen_range(self.low, self.high)
        } else {
            self.low
        }
    }
}

impl FallbackRange {
    /// Range used for links without history while perturbing the active path.
    pub fn perturbation() -> Self {
        Self { low: 0.000199, high: 0.000262 }
    }
}

impl Default for FallbackRange {
    fn default() -> Self {
        Self { low: 0.000119, high: 0.000152 }
    }
}

/// Number of links seeded from each source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Links for which a historical value was found
    pub from_history: usize,
    /// Links for which a random value was drawn
    pub from_fallback: usize,
}

/// Historical delay measurements, sorted by increasing delay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalDelays {
    records: Vec<DelayRecord>,
    either_orientation: bool,
}

impl HistoricalDelays {
    /// No historical data at all; every link is seeded from the fallback range.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read the measurements from a CSV file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_reader(File::open(path)?)
    }

    /// Read the measurements from any reader producing CSV
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let mut rdr = Reader::from_reader(reader);
        let mut records = Vec::new();
        for record in rdr.deserialize() {
            let record: DelayRecord = record?;
            if !record.delay.is_finite() || record.delay < 0.0 {
                warn!(
                    "Ignore invalid historical delay {} for {} -> {}",
                    record.delay, record.source, record.destination
                );
                continue;
            }
            records.push(record);
        }
        Ok(Self::from_records(records))
    }

    /// Create the history from a list of records
    pub fn from_records(mut records: Vec<DelayRecord>) -> Self {
        records.sort_by(|a, b| a.delay.partial_cmp(&b.delay).unwrap_or(std::cmp::Ordering::Equal));
        Self { records, either_orientation: false }
    }

    /// Also accept a row recorded in the opposite orientation `(destination, source)` when
    /// seeding or perturbing a link. Disabled by default.
    pub fn match_either_orientation(mut self, enable: bool) -> Self {
        self.either_orientation = enable;
        self
    }

    /// All records, sorted by delay
    pub fn records(&self) -> &[DelayRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Delay recorded for the exact pair `(source, destination)`. If the pair was measured
    /// multiple times, the smallest delay is returned.
    pub fn lookup(&self, source: SwitchId, destination: SwitchId) -> Option<LinkWeight> {
        self.records
            .iter()
            .find(|r| r.source == source && r.destination == destination)
            .map(|r| r.delay)
    }

    /// Delay recorded for the exact pair `(source, destination)`. If the pair was measured
    /// multiple times, the largest delay is returned.
    pub fn lookup_largest(&self, source: SwitchId, destination: SwitchId) -> Option<LinkWeight> {
        self.records
            .iter()
            .rev()
            .find(|r| r.source == source && r.destination == destination)
            .map(|r| r.delay)
    }

    /// Lookup the link `a -- b` using `lookup`, in the opposite orientation only if enabled.
    fn lookup_link<F>(&self, a: SwitchId, b: SwitchId, lookup: F) -> Option<LinkWeight>
    where
        F: Fn(&Self, SwitchId, SwitchId) -> Option<LinkWeight>,
    {
        match lookup(self, a, b) {
            None if self.either_orientation => lookup(self, b, a),
            found => found,
        }
    }

    /// Delay for the link `a -- b` that replaces the current one while perturbing the active
    /// path: the largest recorded value, or a random value from `fallback`.
    pub fn perturbed_delay<R: Rng>(
        &self,
        a: SwitchId,
        b: SwitchId,
        fallback: &FallbackRange,
        rng: &mut R,
    ) -> LinkWeight {
        self.lookup_link(a, b, Self::lookup_largest).unwrap_or_else(|| fallback.sample(rng))
    }

    /// Write a delay into the delay attribute of every link of the descriptor. The value is taken
    /// from the history, in the declared orientation of the link (or in either orientation, see
    /// [`HistoricalDelays::match_either_orientation`]). Links without history get a random value
    /// from `fallback`.
    pub fn seed_descriptor<R: Rng>(
        &self,
        descriptor: &mut TopologyDescriptor,
        fallback: &FallbackRange,
        rng: &mut R,
    ) -> SeedSummary {
        let mut summary = SeedSummary::default();
        for (a, b) in descriptor.link_pairs() {
            let delay = match self.lookup_link(a, b, Self::lookup) {
                Some(delay) => {
                    summary.from_history += 1;
                    delay
                }
                None => {
                    summary.from_fallback += 1;
                    let delay = fallback.sample(rng);
                    debug!("No history for {} <-> {}, using {}ms", a, b, delay);
                    delay
                }
            };
            descriptor.set_link_delay(a, b, delay);
        }
        info!(
            "Seeded {} links from history and {} links randomly",
            summary.from_history, summary.from_fallback
        );
        summary
    }
}

/// # Measurement Log
///
/// CSV output of link measurements. The header is written once when the log is created, and
/// every appended row is flushed immediately.
pub struct MeasurementLog<W: Write> {
    writer: Writer<W>,
    rows: usize,
}

impl MeasurementLog<File> {
    /// Create (or truncate) the file and write the header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> MeasurementLog<W> {
    /// Write the header into the writer.
    pub fn from_writer(inner: W) -> Result<Self, Error> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(inner);
        writer.write_record(&HEADER)?;
        writer.flush()?;
        Ok(Self { writer, rows: 0 })
    }

    /// Append a single measurement
    pub fn append(
        &mut self,
        source: SwitchId,
        destination: SwitchId,
        delay: LinkWeight,
    ) -> Result<(), Error> {
        self.writer.serialize(DelayRecord { source, destination, delay })?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Number of rows written (excluding the header)
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush the log and return the inner writer
    pub fn into_inner(self) -> Result<W, Error> {
        self.writer.into_inner().map_err(|e| Error::IoError(e.into_error()))
    }
}
