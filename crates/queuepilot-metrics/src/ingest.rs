//! Series smoothing and per-instance grouping.

use std::collections::BTreeMap;

use queuepilot_core::{Environment, TimeSeries};
use regex::Regex;
use tracing::warn;

use crate::error::IngestResult;
use crate::namespace::{INSTANCE_ID_PATTERN, parse_with};
use crate::render::RenderSeries;

/// Smoothed series grouped by environment, service, and instance.
pub type SeriesMap = BTreeMap<Environment, BTreeMap<String, BTreeMap<String, TimeSeries>>>;

/// Trailing moving average with zero-filled gaps.
///
/// A point is the mean of the last `window` raw samples only when the full
/// window is present. Everything else — the leading edge before the first
/// full window, and any window touching a missing sample — becomes 0.0.
/// A flat-zero stretch is therefore indistinguishable from a briefly idle
/// instance; the forecast gate treats long zero runs as "no usable data".
pub fn smooth(raw: &[Option<f64>], window: usize) -> Vec<f64> {
    raw.iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < window {
                return 0.0;
            }
            let frame = &raw[i + 1 - window..=i];
            let mut sum = 0.0;
            for sample in frame {
                match sample {
                    Some(v) => sum += v,
                    None => return 0.0,
                }
            }
            sum / window as f64
        })
        .collect()
}

/// Smooth every render record and file it under its parsed
/// (environment, service, instance) key.
///
/// A record whose namespace cannot be parsed is logged and skipped; it
/// aborts only that record, never the pass.
pub fn group_by_instance(records: Vec<RenderSeries>, window: usize) -> IngestResult<SeriesMap> {
    let instance_re = Regex::new(INSTANCE_ID_PATTERN)?;
    let mut grouped: SeriesMap = BTreeMap::new();

    for record in records {
        let (env, service, instance) = match parse_with(&record.name, &instance_re) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(name = %record.name, error = %e, "skipping unparsable render record");
                continue;
            }
        };

        let series = TimeSeries::new(record.start, record.step, smooth(&record.values, window));
        grouped
            .entry(env)
            .or_default()
            .entry(service)
            .or_default()
            .insert(instance, series);
    }

    Ok(grouped)
}
