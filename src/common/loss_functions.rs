use serde::{Serialize, Deserialize};

use std::fmt;


/// This trait defines the loss functions.
/// The boosting path descends along the negative gradient of the loss.
pub trait LossFunction {
    /// The name of the loss function.
    fn name(&self) -> &str;


    /// Loss value for a single point.
    fn eval_at_point(&self, prediction: f64, true_value: f64) -> f64;


    /// Mean loss over the given points.
    fn eval(&self, predictions: &[f64], target: &[f64]) -> f64 {
        let n_items = predictions.len();

        assert_eq!(n_items, target.len());


        predictions.iter()
            .zip(target)
            .map(|(&p, &y)| self.eval_at_point(p, y))
            .sum::<f64>()
            / n_items as f64
    }


    /// Weighted mean loss over the given points.
    fn weighted_eval(&self, predictions: &[f64], target: &[f64], weights: &[f64])
        -> f64
    {
        let total_weight = weights.iter().sum::<f64>();

        predictions.iter()
            .zip(target)
            .zip(weights)
            .filter(|(_, w)| **w > 0.0)
            .map(|((&p, &y), &w)| w * self.eval_at_point(p, y))
            .sum::<f64>()
            / total_weight
    }


    /// Negative gradient with respect to the predictions,
    /// a.k.a. the pseudo-residuals.
    fn pseudo_residuals(&self, predictions: &[f64], target: &[f64]) -> Vec<f64>;


    /// The constant that minimizes the weighted loss.
    /// This value is the intercept (offset) of the additive model.
    fn offset(&self, target: &[f64], weights: &[f64]) -> f64;
}


/// Some well-known loss functions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum GBMLoss {
    /// `L1`-loss.
    /// This loss function is also known as
    /// **Least Absolute Deviation (LAD)**.
    L1,

    /// `L2`-loss.
    /// This loss function is also known as
    /// **Mean Squared Error (MSE)**.
    L2,


    /// Huber loss with parameter `delta`.
    /// Huber loss maps the given scalar `z` to
    /// `0.5 * z.powi(2)` if `z.abs() < delta`,
    /// `delta * (z.abs() - 0.5 * delta)`, otherwise.
    Huber(f64),
}


impl Default for GBMLoss {
    fn default() -> Self {
        Self::L2
    }
}


impl fmt::Display for GBMLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Huber(delta) => write!(f, "Huber loss (delta = {delta})"),
            _ => write!(f, "{}", self.name()),
        }
    }
}


impl LossFunction for GBMLoss {
    fn name(&self) -> &str {
        match self {
            Self::L1 => "L1 loss",
            Self::L2 => "L2 loss",
            Self::Huber(_) => "Huber loss",
        }
    }


    fn eval_at_point(&self, prediction: f64, true_value: f64) -> f64 {
        match self {
            Self::L1 => (prediction - true_value).abs(),
            Self::L2 => (prediction - true_value).powi(2),
            Self::Huber(delta) => {
                let diff = (prediction - true_value).abs();
                if diff < *delta {
                    0.5 * diff.powi(2)
                } else {
                    delta * (diff - 0.5 * delta)
                }
            },
        }
    }


    fn pseudo_residuals(&self, predictions: &[f64], target: &[f64]) -> Vec<f64>
    {
        assert_eq!(predictions.len(), target.len());

        match self {
            Self::L1 => {
                target.iter()
                    .zip(predictions)
                    .map(|(y, p)| (y - p).signum())
                    .collect()
            },
            Self::L2 => {
                target.iter()
                    .zip(predictions)
                    .map(|(y, p)| y - p)
                    .collect()
            },
            Self::Huber(delta) => {
                target.iter()
                    .zip(predictions)
                    .map(|(y, p)| (y - p).clamp(-delta, *delta))
                    .collect()
            },
        }
    }


    fn offset(&self, target: &[f64], weights: &[f64]) -> f64 {
        match self {
            Self::L2 => {
                let total_weight = weights.iter().sum::<f64>();
                target.iter()
                    .zip(weights)
                    .map(|(y, w)| y * w)
                    .sum::<f64>()
                    / total_weight
            },
            Self::L1 | Self::Huber(_) => {
                let mut items = weights.iter()
                    .copied()
                    .zip(target.iter().copied())
                    .filter(|(w, _)| *w > 0.0)
                    .collect::<Vec<_>>();

                weighted_median(&mut items[..])
            },
        }
    }
}


/// Returns a weighted median of the given `(weight, value)` pairs.
fn weighted_median(items: &mut [(f64, f64)]) -> f64 {
    let n_items = items.len();

    assert!(n_items > 0);

    if n_items == 1 {
        return items[0].1;
    }
    items.sort_by(|a, b| a.1.total_cmp(&b.1));

    let total_weight = items.iter()
        .map(|(w, _)| *w)
        .sum::<f64>();


    let mut partial_sum = 0.0_f64;
    for (w, x) in items.iter() {
        partial_sum += *w;
        if partial_sum >= 0.5 * total_weight {
            return *x;
        }
    }

    items[n_items - 1].1
}
