use rand::prelude::*;
use approx::assert_abs_diff_eq;
use polars::prelude::{DataFrame, NamedFrom, Series};
use gamboost::prelude::*;
use gamboost::BoostError;

use std::f64::consts::PI;


fn synthetic(n_sample: usize, seed: u64) -> Sample {
    let mut rng = StdRng::seed_from_u64(seed);
    let x1 = (0..n_sample).map(|_| rng.gen::<f64>()).collect::<Vec<_>>();
    let x2 = (0..n_sample).map(|_| rng.gen::<f64>()).collect::<Vec<_>>();
    let z = (0..n_sample)
        .map(|_| rng.gen_range(0..3) as f64)
        .collect::<Vec<_>>();
    let y = (0..n_sample)
        .map(|i| (2.0 * PI * x1[i]).sin() + x2[i] + z[i])
        .collect::<Vec<_>>();

    Sample::from_columns(vec![("x1", x1), ("x2", x2), ("z", z)], y).unwrap()
}


fn fitted_path(sample: &Sample) -> BoostingPath {
    let terms = ModelBuilder::new()
        .spline("x1")
        .stump("x2")
        .categorical("z")
        .build(sample)
        .unwrap();
    fit_path(sample, &terms, 60, 0.1).unwrap()
}


/// Tests for the predictions and the partial effects.
#[cfg(test)]
pub mod prediction_tests {
    use super::*;

    #[test]
    fn zero_iterations_predict_the_offset() {
        let sample = synthetic(50, 1);
        let path = fitted_path(&sample);

        let predictions = predict(&path, 0, &sample).unwrap();
        assert!(predictions.iter().all(|p| *p == path.offset()));
    }


    #[test]
    fn partial_effects_add_up_to_the_prediction() {
        let sample = synthetic(70, 2);
        let path = fitted_path(&sample);
        let view = path.at(40).unwrap();

        let predictions = view.predict(&sample).unwrap();
        let effects = view.partial_effects();
        assert_eq!(effects.len(), 3);

        for (i, p) in predictions.iter().enumerate() {
            let (row, _) = sample.at(i);
            let sum = path.offset()
                + effects.iter()
                    .zip(&row)
                    .map(|(effect, x)| effect.eval(*x))
                    .sum::<f64>();
            assert_abs_diff_eq!(*p, sum, epsilon = 1e-10);
        }
    }


    #[test]
    fn out_of_range_queries_are_rejected() {
        let sample = synthetic(40, 3);
        let path = fitted_path(&sample);

        assert!(matches!(
            predict(&path, 61, &sample),
            Err(BoostError::Configuration(
                ConfigurationError::IterationOutOfRange { requested: 61, .. }
            )),
        ));
        assert!(matches!(
            partial_effect(&path, 10, 3),
            Err(BoostError::Configuration(ConfigurationError::UnknownTerm(3))),
        ));
    }


    #[test]
    fn new_sample_needs_the_selected_predictors() {
        let sample = synthetic(60, 4);
        let path = fitted_path(&sample);
        assert!(path.selected_terms().contains(&Some(0)));

        let new_sample = Sample::from_features(
            vec![("x2", vec![0.1, 0.9]), ("z", vec![0.0, 2.0])]
        ).unwrap();
        assert!(matches!(
            predict(&path, 60, &new_sample),
            Err(BoostError::Configuration(ConfigurationError::UnknownPredictor(_))),
        ));

        // Before any update of `x1`, the predictor is not needed.
        let first = path.selected_terms()
            .iter()
            .position(|t| *t == Some(0))
            .unwrap();
        assert!(predict(&path, first, &new_sample).is_ok());
    }


    #[test]
    fn spline_effects_extrapolate_linearly() {
        let sample = synthetic(80, 5);
        let path = fitted_path(&sample);
        let effect = partial_effect(&path, 60, 0).unwrap();
        assert!(!effect.is_zero());

        let upper = sample.feature("x1").unwrap()
            .values()
            .iter()
            .fold(f64::MIN, |m, x| m.max(*x));
        let f = effect.into_fn();
        let step1 = f(upper + 1.0) - f(upper + 0.5);
        let step2 = f(upper + 1.5) - f(upper + 1.0);
        assert_abs_diff_eq!(step1, step2, epsilon = 1e-9);
    }


    #[test]
    fn stump_effects_are_piecewise_constant() {
        let sample = synthetic(80, 6);
        let path = fitted_path(&sample);
        let effect = partial_effect(&path, 60, 1).unwrap();
        assert!(effect.coefficients().is_empty());

        // Beyond every split point the effect is flat.
        assert_eq!(effect.eval(5.0), effect.eval(50.0));
        assert_eq!(effect.eval(-5.0), effect.eval(-50.0));
    }


    #[test]
    fn unseen_levels_contribute_nothing() {
        let sample = synthetic(80, 7);
        let path = fitted_path(&sample);
        let effect = partial_effect(&path, 60, 2).unwrap();

        assert_eq!(effect.eval(7.0), 0.0);
        assert_eq!(effect.eval(0.5), 0.0);
        assert!(effect.eval(2.0) != 0.0);
    }


    #[test]
    fn samples_convert_from_dataframes() {
        let data = DataFrame::new(vec![
            Series::new("x", &[0.0, 1.0, 2.0, 3.0]),
            Series::new("k", &[1_i32, 2, 1, 2]),
        ]).unwrap();
        let target = Series::new("y", &[0.5, 1.5, 2.5, 3.5]);

        let sample = Sample::from_dataframe(data, target).unwrap();
        assert_eq!(sample.shape(), (4, 2));
        assert_eq!(sample.feature("k").unwrap().values(), &[1.0, 2.0, 1.0, 2.0]);
        assert_eq!(sample.target(), &[0.5, 1.5, 2.5, 3.5]);

        let data = DataFrame::new(vec![
            Series::new("x", &[Some(0.0), None, Some(2.0)]),
        ]).unwrap();
        let target = Series::new("y", &[1.0, 2.0, 3.0]);
        match Sample::from_dataframe(data, target) {
            Err(BoostError::Configuration(
                ConfigurationError::MissingValue { column, row }
            )) => {
                assert_eq!(column, "x");
                assert_eq!(row, 1);
            },
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
