use rand::prelude::*;
use approx::assert_abs_diff_eq;
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
        .map(|i| {
            (2.0 * PI * x1[i]).sin()
                + 2.0 * x2[i]
                + 0.5 * z[i]
                + 0.1 * (rng.gen::<f64>() - 0.5)
        })
        .collect::<Vec<_>>();

    Sample::from_columns(vec![("x1", x1), ("x2", x2), ("z", z)], y).unwrap()
}


fn terms(sample: &Sample) -> TermList {
    ModelBuilder::new()
        .spline("x1")
        .ols("x2")
        .categorical("z")
        .build(sample)
        .unwrap()
}


/// Tests for the component-wise boosting path.
#[cfg(test)]
pub mod boosting_path_tests {
    use super::*;

    #[test]
    fn in_sample_risk_never_increases() {
        let _ = env_logger::builder().is_test(true).try_init();
        let sample = synthetic(200, 1);
        let terms = terms(&sample);

        let path = fit_path(&sample, &terms, 150, 0.1).unwrap();
        assert_eq!(path.mstop(), 150);
        assert_eq!(path.risk().len(), 151);
        for pair in path.risk().windows(2) {
            assert!(pair[1] <= pair[0] + 1e-12, "{} > {}", pair[1], pair[0]);
        }
        assert!(path.risk()[150] < 0.25 * path.risk()[0]);
    }


    #[test]
    fn truncation_equals_refit() {
        let sample = synthetic(150, 2);
        let terms = terms(&sample);

        let long = fit_path(&sample, &terms, 80, 0.1).unwrap();
        let short = fit_path(&sample, &terms, 30, 0.1).unwrap();

        assert_eq!(&long.selected_terms()[..30], &short.selected_terms()[..]);

        let truncated = long.at(30).unwrap().predict(&sample).unwrap();
        let refit = short.last().predict(&sample).unwrap();
        for (a, b) in truncated.iter().zip(&refit) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-10);
        }
        assert_abs_diff_eq!(long.risk()[30], short.risk()[30], epsilon = 1e-12);
    }


    #[test]
    fn selection_is_deterministic() {
        let sample = synthetic(120, 3);
        let terms = terms(&sample);

        let a = fit_path(&sample, &terms, 60, 0.1).unwrap();
        let b = fit_path(&sample, &terms, 60, 0.1).unwrap();
        assert_eq!(a.selected_terms(), b.selected_terms());
        assert_eq!(a.risk(), b.risk());
    }


    #[test]
    fn one_full_step_of_ols_is_least_squares() {
        let x = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![1.0, 2.5, 2.9, 4.2, 5.1, 5.8];
        let sample = Sample::from_columns(vec![("x", x.clone())], y.clone())
            .unwrap();

        let path = fit_path(&sample, &[ModelTerm::ols("x")], 1, 1.0).unwrap();
        let fitted = path.last().predict(&sample).unwrap();

        let n = x.len() as f64;
        let x_mean = x.iter().sum::<f64>() / n;
        let y_mean = y.iter().sum::<f64>() / n;
        let sxy = x.iter().zip(&y).map(|(x, y)| (x - x_mean) * (y - y_mean)).sum::<f64>();
        let sxx = x.iter().map(|x| (x - x_mean).powi(2)).sum::<f64>();
        let slope = sxy / sxx;

        for (f, x) in fitted.iter().zip(&x) {
            let expected = y_mean + slope * (x - x_mean);
            assert_abs_diff_eq!(*f, expected, epsilon = 1e-10);
        }
    }


    #[test]
    fn unknown_predictor_is_rejected_before_fitting() {
        let sample = synthetic(50, 4);
        let terms = vec![ModelTerm::ols("x1"), ModelTerm::spline("missing")];

        match fit_path(&sample, &terms, 10, 0.1) {
            Err(BoostError::Configuration(ConfigurationError::UnknownPredictor(name))) => {
                assert_eq!(name, "missing");
            },
            other => panic!("unexpected result: {other:?}"),
        }
    }


    #[test]
    fn invalid_parameters_are_rejected() {
        let sample = synthetic(50, 5);
        let terms = terms(&sample);

        assert!(matches!(
            fit_path(&sample, &terms, 0, 0.1),
            Err(BoostError::Configuration(ConfigurationError::NonPositiveMstop)),
        ));
        assert!(matches!(
            fit_path(&sample, &terms, 10, 0.0),
            Err(BoostError::Configuration(ConfigurationError::InvalidShrinkage(_))),
        ));
        assert!(matches!(
            fit_path(&sample, &[], 10, 0.1),
            Err(BoostError::Configuration(ConfigurationError::EmptyTermList)),
        ));

        let result = ComponentwiseBoost::init(&sample, &terms)
            .weights(vec![1.0; 3])
            .run();
        assert!(matches!(
            result,
            Err(BoostError::Configuration(ConfigurationError::LengthMismatch { .. })),
        ));
    }


    #[test]
    fn degenerate_terms_are_excluded_and_reported_once() {
        let sample = Sample::from_columns(
            vec![
                ("x", vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]),
                ("c", vec![7.0; 6]),
            ],
            vec![0.0, 1.1, 1.9, 3.2, 4.0, 4.8],
        ).unwrap();
        let terms = vec![ModelTerm::spline("c"), ModelTerm::ols("x")];

        let path = fit_path(&sample, &terms, 20, 0.1).unwrap();
        assert!(path.selected_terms().iter().all(|t| *t == Some(1)));

        let degenerate = path.warnings()
            .iter()
            .filter(|w| matches!(w, FitWarning::Degenerate { .. }))
            .collect::<Vec<_>>();
        assert_eq!(degenerate.len(), 1);
        match degenerate[0] {
            FitWarning::Degenerate { iteration, predictor, reason } => {
                assert_eq!(*iteration, 1);
                assert_eq!(predictor, "c");
                assert_eq!(*reason, DegenerateFitError::ZeroVariance);
            },
            _ => unreachable!(),
        }
    }


    #[test]
    fn all_degenerate_terms_give_null_steps() {
        let sample = Sample::from_columns(
            vec![("c", vec![2.0; 5])],
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
        ).unwrap();

        let path = fit_path(&sample, &[ModelTerm::stump("c")], 5, 0.1).unwrap();
        assert_eq!(path.mstop(), 5);
        assert!(path.selected_terms().iter().all(Option::is_none));
        assert!(path.risk().iter().all(|r| *r == path.risk()[0]));
        assert_abs_diff_eq!(path.offset(), 3.0);
    }


    #[test]
    fn weights_and_holdout_rows_are_honored() {
        let sample = synthetic(100, 6);
        let terms = terms(&sample);
        let holdout = (0..100).filter(|i| i % 5 == 0).collect::<Vec<_>>();

        let path = ComponentwiseBoost::init(&sample, &terms)
            .max_iter(40)
            .holdout(holdout.clone())
            .run()
            .unwrap();
        assert_eq!(path.holdout_risk().len(), 41);

        // The offset is the mean over the training rows only.
        let target = sample.target();
        let (sum, count) = (0..100)
            .filter(|i| i % 5 != 0)
            .fold((0.0, 0), |(s, c), i| (s + target[i], c + 1));
        assert_abs_diff_eq!(path.offset(), sum / count as f64, epsilon = 1e-12);

        let weights = (0..100)
            .map(|i| if i % 5 == 0 { 0.0 } else { 1.0 })
            .collect::<Vec<_>>();
        let weighted = ComponentwiseBoost::init(&sample, &terms)
            .max_iter(40)
            .weights(weights)
            .run()
            .unwrap();
        assert_eq!(path.selected_terms(), weighted.selected_terms());
        assert!(weighted.holdout_risk().is_empty());
    }


    #[test]
    fn robust_losses_start_from_the_median() {
        let sample = Sample::from_columns(
            vec![("x", vec![0.0, 1.0, 2.0, 3.0, 4.0])],
            vec![1.0, 2.0, 3.0, 4.0, 100.0],
        ).unwrap();

        let path = ComponentwiseBoost::init(&sample, &[ModelTerm::ols("x")])
            .loss(GBMLoss::L1)
            .max_iter(10)
            .run()
            .unwrap();
        assert_abs_diff_eq!(path.offset(), 3.0);

        let huber = ComponentwiseBoost::init(&sample, &[ModelTerm::ols("x")])
            .loss(GBMLoss::Huber(1.0))
            .max_iter(10)
            .run()
            .unwrap();
        assert_eq!(huber.mstop(), 10);
    }


    #[test]
    fn selection_frequencies_sum_to_one() {
        let sample = synthetic(80, 7);
        let terms = terms(&sample);
        let path = fit_path(&sample, &terms, 50, 0.1).unwrap();

        let freq = path.selection_frequencies();
        assert_eq!(freq.len(), 3);
        assert_abs_diff_eq!(freq.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }


    #[test]
    fn path_survives_a_json_round_trip() {
        let sample = synthetic(60, 8);
        let terms = terms(&sample);
        let path = fit_path(&sample, &terms, 25, 0.1).unwrap();

        let file = std::env::temp_dir().join("gamboost_path_round_trip.json");
        path.to_json_file(&file).unwrap();
        let restored = BoostingPath::from_json_file(&file).unwrap();
        let _ = std::fs::remove_file(&file);

        assert_eq!(restored.selected_terms(), path.selected_terms());
        let a = path.at(20).unwrap().predict(&sample).unwrap();
        let b = restored.at(20).unwrap().predict(&sample).unwrap();
        for (a, b) in a.iter().zip(&b) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }


    #[test]
    fn corrupt_path_files_are_rejected() {
        let sample = synthetic(40, 9);
        let terms = terms(&sample);
        let path = fit_path(&sample, &terms, 10, 0.1).unwrap();

        let file = std::env::temp_dir().join("gamboost_corrupt_path.json");
        path.to_json_file(&file).unwrap();

        let text = std::fs::read_to_string(&file).unwrap();
        let mut value = serde_json::from_str::<serde_json::Value>(&text).unwrap();
        value["risk"].as_array_mut().unwrap().pop();
        std::fs::write(&file, value.to_string()).unwrap();

        let restored = BoostingPath::from_json_file(&file);
        let _ = std::fs::remove_file(&file);
        assert!(matches!(
            restored,
            Err(BoostError::Configuration(ConfigurationError::MalformedPath(_))),
        ));
    }


    #[test]
    fn infinite_predictor_values_are_rejected_before_fitting() {
        let result = Sample::from_columns(
            vec![("x", vec![0.0, 1.0, 2.0, 3.0, f64::INFINITY, 5.0])],
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
        );
        assert_eq!(
            result.unwrap_err(),
            ConfigurationError::NonFiniteValue { column: "x".into(), row: 4 },
        );
    }


    #[test]
    fn badly_scaled_design_warns_and_keeps_going() {
        let _ = env_logger::builder().is_test(true).try_init();
        let t = (0..50).map(|i| i as f64 / 49.0).collect::<Vec<_>>();
        let x = t.iter().map(|t| 1e6 * t).collect::<Vec<_>>();
        let y = t.iter().map(|t| 2.0 * t + 1.0).collect::<Vec<_>>();
        let sample = Sample::from_columns(vec![("x", x)], y).unwrap();

        let path = fit_path(&sample, &[ModelTerm::ols("x")], 10, 0.1).unwrap();
        assert_eq!(path.mstop(), 10);
        assert!(path.selected_terms().iter().all(|t| *t == Some(0)));

        let unstable = path.warnings()
            .iter()
            .filter_map(|w| match w {
                FitWarning::NumericInstability(warning) => Some(warning),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(unstable.len(), 1);
        assert_eq!(unstable[0].predictor, "x");
        assert!(unstable[0].condition_estimate > 1e10);
        assert!(path.risk()[10] < path.risk()[0]);
    }
}
