use rand::prelude::*;
use colored::Colorize;
use serde::{Serialize, Deserialize};

use std::fmt;
use std::iter::Iterator;

const WIDTH: usize = 9;


/// How the training/test pairs of a cross-validation are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Resampling {
    /// Shuffled, near-equally sized, disjoint test folds.
    KFold,
    /// `n` rows drawn with replacement.
    /// The multiplicities are the training weights,
    /// the out-of-bag rows are the test rows.
    Bootstrap,
    /// A random `ratio` share of the rows for training,
    /// the rest for testing.
    Subsampling(f64),
}


impl Default for Resampling {
    fn default() -> Self {
        Self::KFold
    }
}


impl fmt::Display for Resampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KFold => write!(f, "k-fold"),
            Self::Bootstrap => write!(f, "bootstrap"),
            Self::Subsampling(ratio) => write!(f, "subsampling (ratio = {ratio})"),
        }
    }
}


/// A training/test pair, expressed on the full sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Fold {
    /// Observation weights of the training rows,
    /// zero for the rows that are not used for training.
    pub train_weights: Vec<f64>,
    /// Indices of the test rows.
    pub test: Vec<usize>,
}


impl Fold {
    /// Number of rows with positive training weight.
    pub fn train_size(&self) -> usize {
        self.train_weights.iter()
            .filter(|w| **w > 0.0)
            .count()
    }


    /// Number of test rows.
    pub fn test_size(&self) -> usize {
        self.test.len()
    }
}


/// A struct that generates
/// pairs of training/test rows for cross validation.
///
/// All folds come from a single random number generator
/// seeded at construction,
/// so the sequence of folds only depends on the seed.
///
/// # Example
/// ```
/// use gamboost::research::{Resampler, Resampling};
///
/// let folds = Resampler::new(10)
///     .n_folds(5)
///     .seed(777)
///     .resampling(Resampling::KFold)
///     .collect::<Vec<_>>();
/// assert_eq!(folds.len(), 5);
/// assert!(folds.iter().all(|fold| fold.test.len() == 2));
/// ```
pub struct Resampler {
    n_sample: usize,
    current_fold: usize,
    n_folds: usize,
    resampling: Resampling,
    rng: StdRng,
    ix: Option<Vec<usize>>,
    verbose: bool,
}


impl Resampler {
    /// Construct a new instance of `Resampler`
    /// over `n_sample` rows.
    #[inline]
    pub fn new(n_sample: usize) -> Self {
        Self {
            n_sample,
            current_fold: 0,
            n_folds: 10,
            resampling: Resampling::KFold,
            rng: StdRng::seed_from_u64(1234),
            ix: None,
            verbose: false,
        }
    }


    /// Set the number of folds.
    /// Default value is `10.`
    #[inline]
    pub fn n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }


    /// Set the seed of the randomness.
    /// Default vaule is `1234.`
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }


    /// Set the resampling scheme.
    /// Default is [`Resampling::KFold`].
    #[inline]
    pub fn resampling(mut self, resampling: Resampling) -> Self {
        self.resampling = resampling;
        self
    }


    /// Set the verbose parameter.
    /// If `true`, `Resampler` prints the fold sizes
    /// when generating a train/test pair.
    /// Default vaule is `false.`
    #[inline]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }


    /// The `i`-th of the `n_folds` disjoint folds.
    fn k_fold(&mut self, i: usize) -> Fold {
        let n_sample = self.n_sample;
        let rng = &mut self.rng;
        let ix = self.ix.get_or_insert_with(|| {
            let mut ix = (0..n_sample).collect::<Vec<_>>();
            ix.shuffle(rng);
            ix
        });

        let size = n_sample / self.n_folds;
        let rest = n_sample % self.n_folds;
        let start = i * size + i.min(rest);
        let end = start + size + usize::from(i < rest);

        let mut train_weights = vec![1.0; n_sample];
        let test = ix[start..end].to_vec();
        for &t in &test {
            train_weights[t] = 0.0;
        }
        Fold { train_weights, test }
    }


    fn bootstrap(&mut self) -> Fold {
        let n_sample = self.n_sample;
        let mut train_weights = vec![0.0; n_sample];
        for _ in 0..n_sample {
            let i = self.rng.gen_range(0..n_sample);
            train_weights[i] += 1.0;
        }
        let test = (0..n_sample)
            .filter(|&i| train_weights[i] == 0.0)
            .collect();
        Fold { train_weights, test }
    }


    fn subsampling(&mut self, ratio: f64) -> Fold {
        let n_sample = self.n_sample;
        let train_size = ((ratio * n_sample as f64).round() as usize)
            .clamp(1, n_sample.saturating_sub(1).max(1));

        let mut ix = (0..n_sample).collect::<Vec<_>>();
        ix.shuffle(&mut self.rng);

        let mut train_weights = vec![0.0; n_sample];
        for &i in &ix[..train_size] {
            train_weights[i] = 1.0;
        }
        let mut test = ix[train_size..].to_vec();
        test.sort_unstable();
        Fold { train_weights, test }
    }
}


impl Iterator for Resampler {
    type Item = Fold;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_fold >= self.n_folds || self.n_sample == 0 {
            return None;
        }

        let output = match self.resampling {
            Resampling::KFold => self.k_fold(self.current_fold),
            Resampling::Bootstrap => self.bootstrap(),
            Resampling::Subsampling(ratio) => self.subsampling(ratio),
        };
        self.current_fold += 1;

        if self.verbose {
            println!(
                "{}    {}    {}",
                format!("  [{: >3}'th fold]", self.current_fold).bold().red(),
                format!("[TRAIN {:>WIDTH$}]", output.train_size()).bold().green(),
                format!("[TEST {:>WIDTH$}]", output.test_size()).bold().yellow(),
            );
        }

        Some(output)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn k_fold_partitions_the_rows() {
        let folds = Resampler::new(11).n_folds(3).seed(5).collect::<Vec<_>>();
        let sizes = folds.iter().map(Fold::test_size).collect::<Vec<_>>();
        assert_eq!(sizes, vec![4, 4, 3]);

        let mut all = folds.iter()
            .flat_map(|fold| fold.test.iter().copied())
            .collect::<Vec<_>>();
        all.sort_unstable();
        assert_eq!(all, (0..11).collect::<Vec<_>>());

        for fold in &folds {
            assert_eq!(fold.train_size() + fold.test_size(), 11);
        }
    }


    #[test]
    fn same_seed_gives_the_same_folds() {
        let a = Resampler::new(20).resampling(Resampling::Bootstrap).seed(9)
            .collect::<Vec<_>>();
        let b = Resampler::new(20).resampling(Resampling::Bootstrap).seed(9)
            .collect::<Vec<_>>();
        assert_eq!(a, b);
    }


    #[test]
    fn bootstrap_weights_sum_to_the_sample_size() {
        for fold in Resampler::new(30).resampling(Resampling::Bootstrap) {
            assert_eq!(fold.train_weights.iter().sum::<f64>(), 30.0);
            assert!(fold.test.iter().all(|&i| fold.train_weights[i] == 0.0));
        }
    }


    #[test]
    fn subsampling_respects_the_ratio() {
        let fold = Resampler::new(10)
            .resampling(Resampling::Subsampling(0.7))
            .next()
            .unwrap();
        assert_eq!(fold.train_size(), 7);
        assert_eq!(fold.test_size(), 3);
    }
}
