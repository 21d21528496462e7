//! # Case-control association of CNV regions
//!
//! For every region with carriers in a family, count carriers and non-carriers among the
//! family's cases and controls and test the resulting 2x2 table for independence.
//! When the test statistic is undefined (a row or column of the table sums to zero) the
//! region is reported with `chi2 = 0` and `p = 1`: no evidence of association.
use anyhow::{bail, Result};
use log::debug;

use crate::{
    carriers::RegionCarriers,
    cnv::{CopyNumberVariant, Sample},
    cohort::FamilyCohort,
    stats::{ContingencyTest, PearsonChiSquared, TestStatistic},
};

/// Statistic reported for regions whose contingency table cannot be tested.
pub const NO_EVIDENCE: TestStatistic = TestStatistic {
    statistic: 0.,
    p_value: 1.,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContingencyTable {
    pub positive_cases: usize,
    pub negative_cases: usize,
    pub positive_controls: usize,
    pub negative_controls: usize,
}

impl ContingencyTable {
    /// Count carriers and non-carriers among the cases and controls of `cohort`.
    pub fn from_carriers<'a, I>(cohort: &FamilyCohort, carriers: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Sample>,
    {
        let mut positive_cases = 0;
        let mut positive_controls = 0;
        for sample in carriers {
            if !cohort.contains(&sample.id) {
                bail!(
                    "Sample {} carries a CNV but is not part of family {}",
                    sample.id,
                    cohort.family_id
                );
            }
            if sample.affected {
                positive_cases += 1;
            } else {
                positive_controls += 1;
            }
        }

        let (Some(negative_cases), Some(negative_controls)) = (
            cohort.n_cases().checked_sub(positive_cases),
            cohort.n_controls().checked_sub(positive_controls),
        ) else {
            bail!(
                "Family {} has more carriers than members of a group",
                cohort.family_id
            );
        };

        Ok(Self {
            positive_cases,
            negative_cases,
            positive_controls,
            negative_controls,
        })
    }

    /// Table layout expected by [`ContingencyTest`]: carriers in the first row, cases in the first column.
    pub fn as_array(&self) -> [[usize; 2]; 2] {
        [
            [self.positive_cases, self.positive_controls],
            [self.negative_cases, self.negative_controls],
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociationResult {
    pub family_id: String,
    pub region: CopyNumberVariant,
    pub table: ContingencyTable,
    pub chi2: f64,
    pub p_value: f64,
    /// Carriers ordered by sample id
    pub carriers: Vec<Sample>,
}

pub struct AssociationEngine<T: ContingencyTest> {
    test: T,
}

impl Default for AssociationEngine<PearsonChiSquared> {
    fn default() -> Self {
        Self::new(PearsonChiSquared::default())
    }
}

impl<T: ContingencyTest> AssociationEngine<T> {
    pub fn new(test: T) -> Self {
        Self { test }
    }

    /// One result per region in `carriers`, in the order the regions appear there.
    pub fn evaluate(
        &self,
        cohort: &FamilyCohort,
        carriers: &RegionCarriers,
    ) -> Result<Vec<AssociationResult>> {
        carriers
            .iter()
            .map(|(region, samples)| {
                let table = ContingencyTable::from_carriers(cohort, samples)?;
                let outcome = self.test.test(&table.as_array()).unwrap_or_else(|e| {
                    debug!(
                        "No test statistic for {region} in family {}: {e}",
                        cohort.family_id
                    );
                    NO_EVIDENCE
                });

                Ok(AssociationResult {
                    family_id: cohort.family_id.clone(),
                    region: region.clone(),
                    table,
                    chi2: outcome.statistic,
                    p_value: outcome.p_value,
                    carriers: samples.iter().cloned().collect(),
                })
            })
            .collect()
    }
}
