use polars::prelude::{DataType, Series};
use serde::{Serialize, Deserialize};

use std::ops::Index;
use std::slice::Iter;

use crate::error::{ConfigurationError, Result};


/// Dense representation of a predictor column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature name
    pub(crate) name: String,
    /// Feature values.
    pub(crate) sample: Vec<f64>,
}


impl Feature {
    /// Construct a feature from the given values.
    /// Missing values (`NaN`) and infinite values are rejected.
    pub fn from_values<T: ToString>(name: T, sample: Vec<f64>)
        -> std::result::Result<Self, ConfigurationError>
    {
        let name = name.to_string();
        check_finite(&name, &sample)?;
        Ok(Self { name, sample })
    }


    /// Convert `polars::Series` into `Feature`.
    /// The series is casted to `f64`; null values are rejected.
    pub fn from_series(series: &Series) -> Result<Self> {
        let name = series.name().to_string();
        let casted = series.cast(&DataType::Float64)?;
        let sample = casted.f64()?
            .into_iter()
            .enumerate()
            .map(|(row, x)| {
                x.ok_or_else(|| ConfigurationError::MissingValue {
                    column: name.clone(),
                    row,
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self::from_values(name, sample)?)
    }


    /// Get the feature name.
    pub fn name(&self) -> &str {
        &self.name
    }


    /// Returns the feature values.
    pub fn values(&self) -> &[f64] {
        &self.sample[..]
    }


    /// Returns an iterator over feature values.
    pub fn iter(&self) -> Iter<'_, f64> {
        self.sample.iter()
    }


    /// Returns the number of items in `self.sample`.
    pub fn len(&self) -> usize {
        self.sample.len()
    }


    /// Returns `true` if `self.len()` is equals to `0`.
    pub fn is_empty(&self) -> bool {
        self.sample.is_empty()
    }


    pub(crate) fn into_target(self) -> Vec<f64> {
        self.sample
    }


    /// Returns the number of distinct values.
    pub fn distinct_value_count(&self) -> usize {
        distinct_values(&self.sample[..]).len()
    }
}


impl Index<usize> for Feature {
    type Output = f64;
    fn index(&self, idx: usize) -> &Self::Output {
        &self.sample[idx]
    }
}


/// Fails on the first `NaN` or infinite entry of `values`.
pub(crate) fn check_finite(column: &str, values: &[f64])
    -> std::result::Result<(), ConfigurationError>
{
    for (row, x) in values.iter().enumerate() {
        if x.is_nan() {
            return Err(ConfigurationError::MissingValue {
                column: column.to_string(), row,
            });
        }
        if x.is_infinite() {
            return Err(ConfigurationError::NonFiniteValue {
                column: column.to_string(), row,
            });
        }
    }
    Ok(())
}


/// Sorted distinct values of `values`.
pub(crate) fn distinct_values(values: &[f64]) -> Vec<f64> {
    let mut values = values.to_vec();
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();
    values
}
