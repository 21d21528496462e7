//! # Tests of independence on contingency tables
use anyhow::{anyhow, bail, Result};
use ndarray::{prelude::*, Zip};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Outcome of a test of independence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestStatistic {
    pub statistic: f64,
    pub p_value: f64,
}

/// A test of independence on a 2x2 table of counts, laid out as
/// `[[positive cases, positive controls], [negative cases, negative controls]]`.
/// Returns `Err` when the statistic is undefined for `table`.
pub trait ContingencyTest {
    fn test(&self, table: &[[usize; 2]; 2]) -> Result<TestStatistic>;
}

/// Pearson's chi-squared test, with Yates' continuity correction for tables
/// with a single degree of freedom when `correction` is set.
#[derive(Debug, Clone, Copy)]
pub struct PearsonChiSquared {
    pub correction: bool,
}

impl Default for PearsonChiSquared {
    fn default() -> Self {
        Self { correction: true }
    }
}

impl ContingencyTest for PearsonChiSquared {
    fn test(&self, table: &[[usize; 2]; 2]) -> Result<TestStatistic> {
        let observed = arr2(table).mapv(|x| x as f64);
        chi2_contingency(&observed, self.correction)
    }
}

/// Chi-squared test of independence of the variables in the contingency table `observed`.
/// Fails if any expected frequency is zero, i.e. if a row or a column sums to zero.
pub fn chi2_contingency(observed: &Array2<f64>, correction: bool) -> Result<TestStatistic> {
    if observed.iter().any(|x| *x < 0.) {
        bail!("All values in the contingency table must be non-negative");
    }
    let (nrows, ncols) = observed.dim();
    if nrows == 0 || ncols == 0 {
        bail!("Contingency table is empty");
    }

    let expected = expected_frequencies(observed);
    if expected.iter().any(|e| *e == 0.) {
        bail!("Contingency table has an expected frequency of zero: {expected}");
    }

    let dof = (nrows - 1) * (ncols - 1);
    if dof == 0 {
        return Ok(TestStatistic {
            statistic: 0.,
            p_value: 1.,
        });
    }

    let mut observed = observed.to_owned();
    if dof == 1 && correction {
        // move every observation up to half a count towards its expectation
        Zip::from(&mut observed).and(&expected).for_each(|o, e| {
            let diff = *e - *o;
            *o += diff.abs().min(0.5) * diff.signum();
        });
    }

    let statistic = Zip::from(&observed)
        .and(&expected)
        .fold(0., |acc, o, e| acc + (o - e).powi(2) / e);
    let distribution = ChiSquared::new(dof as f64)
        .map_err(|e| anyhow!("Could not build chi-squared distribution with {dof} degrees of freedom: {e:?}"))?;

    Ok(TestStatistic {
        statistic,
        p_value: distribution.sf(statistic),
    })
}

/// Expected frequencies under independence: `row sum * column sum / total`.
fn expected_frequencies(observed: &Array2<f64>) -> Array2<f64> {
    let total = observed.sum();
    let row_sums = observed.sum_axis(Axis(1));
    let col_sums = observed.sum_axis(Axis(0));
    Array2::from_shape_fn(observed.dim(), |(i, j)| {
        if total == 0. {
            0.
        } else {
            row_sums[i] * col_sums[j] / total
        }
    })
}
