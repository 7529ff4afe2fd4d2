//! Size step tables — current instance size to the next size up or down.
//!
//! Each direction is a `{family: {size: next_size}}` table. A size with no
//! entry in a direction cannot be scaled further that way; resolution
//! returns `None` and the caller decides how to report it.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::SizeClass;

type StepTable = BTreeMap<String, BTreeMap<String, String>>;

/// Upscale and downscale step tables, keyed by size family.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SizeSteps {
    pub upscale: StepTable,
    pub downscale: StepTable,
}

impl Default for SizeSteps {
    fn default() -> Self {
        let upscale = table(&[
            ("m1", &[("small", "medium"), ("medium", "large"), ("large", "xlarge"), ("xlarge", "2xlarge")]),
            ("m2", &[("xlarge", "2xlarge"), ("2xlarge", "4xlarge")]),
            ("c1", &[("medium", "xlarge")]),
        ]);
        let downscale = table(&[
            ("m1", &[("2xlarge", "xlarge"), ("xlarge", "large"), ("large", "medium"), ("medium", "small")]),
            ("m2", &[("4xlarge", "2xlarge"), ("2xlarge", "xlarge")]),
            ("c1", &[("xlarge", "medium")]),
        ]);
        Self { upscale, downscale }
    }
}

impl SizeSteps {
    /// Next size up for `current`, or `None` if the family tops out here.
    pub fn next_larger(&self, current: &SizeClass) -> Option<SizeClass> {
        step(&self.upscale, current)
    }

    /// Next size down for `current`, or `None` if the family bottoms out here.
    pub fn next_smaller(&self, current: &SizeClass) -> Option<SizeClass> {
        step(&self.downscale, current)
    }
}

fn step(table: &StepTable, current: &SizeClass) -> Option<SizeClass> {
    let target = table.get(&current.family)?.get(&current.size)?;
    Some(SizeClass {
        family: current.family.clone(),
        size: target.clone(),
    })
}

fn table(entries: &[(&str, &[(&str, &str)])]) -> StepTable {
    entries
        .iter()
        .map(|(family, sizes)| {
            let sizes = sizes
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect();
            (family.to_string(), sizes)
        })
        .collect()
}
