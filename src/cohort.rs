//! # Partitioning families into cases and controls
use std::collections::HashSet;

use anyhow::{bail, Result};
use indexmap::IndexMap;

use crate::calls::{CallRecord, SampleCall};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyCohort {
    pub family_id: String,
    pub cases: HashSet<String>,
    pub controls: HashSet<String>,
}

impl FamilyCohort {
    pub fn new(family_id: &str) -> Self {
        Self {
            family_id: family_id.to_owned(),
            ..Default::default()
        }
    }

    /// Add `sample_id` to the cases or the controls of this family.
    /// A sample that was already added with the opposite status is an input error:
    /// the pedigree disagrees with itself and neither observation can be trusted.
    pub fn add_sample(&mut self, sample_id: &str, affected: bool) -> Result<()> {
        let (own, other) = if affected {
            (&mut self.cases, &self.controls)
        } else {
            (&mut self.controls, &self.cases)
        };
        if other.contains(sample_id) {
            bail!(
                "Sample {sample_id} in family {} is recorded both as affected and as unaffected",
                self.family_id
            );
        }
        own.insert(sample_id.to_owned());
        Ok(())
    }

    pub fn n_cases(&self) -> usize {
        self.cases.len()
    }

    pub fn n_controls(&self) -> usize {
        self.controls.len()
    }

    pub fn contains(&self, sample_id: &str) -> bool {
        self.cases.contains(sample_id) || self.controls.contains(sample_id)
    }
}

/// The cohort of one family together with the deduplicated calls of its members.
#[derive(Debug, Clone)]
pub struct FamilyCalls {
    pub cohort: FamilyCohort,
    pub calls: Vec<SampleCall>,
}

/// Group accepted call rows by family, in order of first appearance, and build each family's cohort.
pub fn build_families(accepted: Vec<CallRecord>) -> Result<Vec<FamilyCalls>> {
    let mut families: IndexMap<String, FamilyCalls> = IndexMap::new();
    for record in accepted {
        let family = families
            .entry(record.family.clone())
            .or_insert_with(|| FamilyCalls {
                cohort: FamilyCohort::new(&record.family),
                calls: Vec::new(),
            });
        family
            .cohort
            .add_sample(&record.sample_id, record.affected)?;
        family.calls.push(record.into_sample_call());
    }

    Ok(families.into_values().collect())
}
