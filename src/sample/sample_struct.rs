use std::collections::HashMap;
use std::ops::Index;

use polars::prelude::{DataFrame, Series};
use rayon::prelude::*;

use crate::error::{ConfigurationError, Result};
use super::feature_struct::*;


/// Struct `Sample` holds a batch sample in the dense format.
/// Every example has a value for every feature;
/// missing values are rejected at construction.
#[derive(Debug, Clone)]
pub struct Sample {
    pub(super) name_to_index: HashMap<String, usize>,
    pub(super) features: Vec<Feature>,
    pub(super) target: Vec<f64>,
    pub(super) n_sample: usize,
    pub(super) n_feature: usize,
}


impl Sample {
    /// Convert `polars::DataFrame` and `polars::Series` into `Sample`.
    /// This method takes the ownership for the given pair
    /// `data` and `target`.
    /// Every column is casted to `f64`.
    pub fn from_dataframe(data: DataFrame, target: Series) -> Result<Self> {
        let n_sample = data.shape().0;
        let target = Feature::from_series(&target)?.into_target();

        let features = data.get_columns()
            .par_iter()
            .map(Feature::from_series)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_parts(features, target, n_sample)?)
    }


    /// Construct a `Sample` from named columns and the response.
    ///
    /// ```
    /// use gamboost::Sample;
    ///
    /// let sample = Sample::from_columns(
    ///     vec![("x", vec![1.0, 2.0, 3.0])],
    ///     vec![2.0, 4.1, 5.9],
    /// ).unwrap();
    /// assert_eq!(sample.shape(), (3, 1));
    /// ```
    pub fn from_columns<S, T>(columns: T, target: Vec<f64>)
        -> std::result::Result<Self, ConfigurationError>
        where S: ToString,
              T: IntoIterator<Item = (S, Vec<f64>)>,
    {
        let n_sample = target.len();
        check_finite("target", &target)?;
        let features = columns.into_iter()
            .map(|(name, values)| Feature::from_values(name, values))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Self::from_parts(features, target, n_sample)
    }


    /// Construct a `Sample` without the response.
    /// Such a sample is used for the prediction.
    pub fn from_features<S, T>(columns: T)
        -> std::result::Result<Self, ConfigurationError>
        where S: ToString,
              T: IntoIterator<Item = (S, Vec<f64>)>,
    {
        let features = columns.into_iter()
            .map(|(name, values)| Feature::from_values(name, values))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let n_sample = features.first().map(|f| f.len()).unwrap_or(0);

        Self::from_parts(features, Vec::new(), n_sample)
    }


    fn from_parts(features: Vec<Feature>, target: Vec<f64>, n_sample: usize)
        -> std::result::Result<Self, ConfigurationError>
    {
        let mut name_to_index = HashMap::with_capacity(features.len());
        for (i, feature) in features.iter().enumerate() {
            if feature.len() != n_sample {
                return Err(ConfigurationError::LengthMismatch {
                    column: feature.name().to_string(),
                    expected: n_sample,
                    found: feature.len(),
                });
            }
            let name = feature.name().to_string();
            if name_to_index.insert(name.clone(), i).is_some() {
                return Err(ConfigurationError::DuplicatePredictor(name));
            }
        }

        let n_feature = features.len();
        let sample = Self {
            name_to_index, features, target, n_sample, n_feature,
        };
        Ok(sample)
    }


    /// Set the feature of name `target` to `self.target`.
    /// The old value assigned to `self.target` will be dropped.
    pub fn set_target<S: AsRef<str>>(mut self, target: S)
        -> std::result::Result<Self, ConfigurationError>
    {
        let target = target.as_ref();
        let pos = self.features.iter()
            .position(|feat| feat.name() == target)
            .ok_or_else(|| {
                ConfigurationError::UnknownTarget(target.to_string())
            })?;


        let target = self.features.remove(pos).into_target();
        self.target = target;
        self.n_feature -= 1;


        self.name_to_index = self.features.iter()
            .enumerate()
            .map(|(i, f)| (f.name().to_string(), i))
            .collect::<HashMap<_, _>>();

        Ok(self)
    }


    /// Returns a slice of type `f64`.
    /// The slice is empty for a sample built by
    /// [`Sample::from_features`].
    pub fn target(&self) -> &[f64] {
        &self.target[..]
    }


    /// Returns `true` if the response is specified.
    pub fn has_target(&self) -> bool {
        self.n_sample > 0 && self.target.len() == self.n_sample
    }


    /// Returns a slice of type `Feature`.
    pub fn features(&self) -> &[Feature] {
        &self.features[..]
    }


    /// Returns the feature named `name`, if exists.
    pub fn feature<S: AsRef<str>>(&self, name: S) -> Option<&Feature> {
        self.name_to_index.get(name.as_ref())
            .map(|&k| &self.features[k])
    }


    /// Returns `true` if the feature named `name` exists.
    pub fn has_feature<S: AsRef<str>>(&self, name: S) -> bool {
        self.name_to_index.contains_key(name.as_ref())
    }


    /// Returns the pair of the number of examples and
    /// the number of features
    pub fn shape(&self) -> (usize, usize) {
        (self.n_sample, self.n_feature)
    }


    /// Returns the `idx`-th instance `(x, y)`.
    /// `y` is `NaN` if the response is not specified.
    pub fn at(&self, idx: usize) -> (Vec<f64>, f64) {
        let x = self.features.iter()
            .map(|feat| feat[idx])
            .collect::<Vec<f64>>();
        let y = self.target.get(idx).copied().unwrap_or(f64::NAN);

        (x, y)
    }
}


impl<S> Index<S> for Sample
    where S: AsRef<str>
{
    type Output = Feature;


    fn index(&self, name: S) -> &Self::Output {
        let name: &str = name.as_ref();
        let k = *self.name_to_index.get(name)
            .unwrap_or_else(|| panic!("The feature named `{name}` does not exist"));
        &self.features[k]
    }
}
