//! Integration tests for prior-aware boosting.

mod common;

use approx::assert_abs_diff_eq;
use common::*;
use imbalance_boost::*;

/// Rows keyed 0 are class 0, keys 1 and 2 are class 1. Priors are
/// [0.7, 0.3]. The lookup base confuses key-1 rows until a linear
/// rebalance of strength above 0.4 is applied.
fn sweep_fixture() -> (Dataset, LookupClassifier) {
    let keys = [0, 0, 0, 0, 0, 0, 0, 1, 1, 2];
    let labels = vec![0, 0, 0, 0, 0, 0, 0, 1, 1, 1];
    let base = LookupClassifier {
        table: vec![vec![0.9, 0.1], vec![0.55, 0.45], vec![0.2, 0.8]],
    };
    (create_keyed_dataset(&keys, labels, 2), base)
}

#[test]
fn test_single_member_ensemble_matches_member() {
    let dataset = create_blobs(&[60, 12], 21);
    let config = BoostingConfig::builder().num_members(1).build().unwrap();
    let mut ensemble =
        BoostedEnsemble::uniform_resampling(Box::new(NearestCentroid::default()), config).unwrap();
    ensemble.train(&dataset).unwrap();

    assert_eq!(ensemble.members().len(), 1);
    assert_eq!(ensemble.effective_length(), 1);
    let member = &ensemble.members()[0].classifier;
    for instance in dataset.iter() {
        assert_distributions_close(
            &ensemble.predict_distribution(&instance.features).unwrap(),
            &member.predict_distribution(&instance.features).unwrap(),
            1e-12,
        );
    }
}

#[test]
fn test_perfect_first_member_stops_boosting() {
    let dataset = create_oracle_dataset(&[18, 2]);
    let config = BoostingConfig::builder().num_members(5).build().unwrap();
    let mut ensemble =
        BoostedEnsemble::uniform_resampling(Box::new(OracleClassifier { num_classes: 2 }), config)
            .unwrap();
    ensemble.train(&dataset).unwrap();

    assert_eq!(ensemble.members().len(), 1);
    assert_eq!(ensemble.effective_length(), 1);
    assert_eq!(ensemble.weights(), vec![1.0]);
    assert_eq!(ensemble.history()[0].pseudo_loss, Some(0.0));
}

#[test]
fn test_perfect_later_member_takes_all_weight() {
    let (dataset, base) = sweep_fixture();
    let config = BoostingConfig::builder().num_members(4).build().unwrap();
    let mut ensemble = BoostedEnsemble::rebalance_sweep(Box::new(base), config).unwrap();
    ensemble.train(&dataset).unwrap();

    // Round 0 runs unrebalanced and misses the key-1 rows; round 1 uses
    // strength 0.5 and classifies every row.
    assert_eq!(ensemble.members().len(), 2);
    assert_eq!(ensemble.effective_length(), 2);
    assert_eq!(ensemble.weights(), vec![0.0, 1.0]);

    let history = ensemble.history();
    assert_eq!(history.len(), 2);
    assert_abs_diff_eq!(history[0].performance, (1.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    assert!(history[0].pseudo_loss.unwrap() > 0.0);
    assert_eq!(history[1].performance, 1.0);
    assert_eq!(history[1].pseudo_loss, Some(0.0));

    let counts = evaluate_classifier(&ensemble, &dataset).unwrap();
    assert_eq!(counts.accuracy(), 1.0);
}

#[test]
fn test_first_round_pseudo_loss() {
    let (dataset, base) = sweep_fixture();
    let config = BoostingConfig::builder().num_members(1).build().unwrap();
    let mut ensemble = BoostedEnsemble::rebalance_sweep(Box::new(base), config).unwrap();
    ensemble.train(&dataset).unwrap();

    // Key-1 rows err by 1 - 0.45 + 0.55. Every row has distribution 0.1.
    let loss = 2.0 * 0.1 * 1.1 * 0.3;
    let max_loss = 2.0 * 0.1 * (7.0 * 0.7 + 3.0 * 0.3);
    let expected = loss / max_loss;
    let round = &ensemble.history()[0];
    assert_abs_diff_eq!(round.pseudo_loss.unwrap(), expected, epsilon = 1e-12);

    let beta = expected / (1.0 - expected);
    assert_abs_diff_eq!(
        round.member_weight,
        -beta.ln() * (1.0f64 / 3.0).sqrt(),
        epsilon = 1e-12
    );
}

#[test]
fn test_uniform_resampling_keeps_every_round() {
    let dataset = create_blobs(&[80, 10, 6], 4);
    let config = BoostingConfig::builder()
        .num_members(4)
        .random_seed(9)
        .build()
        .unwrap();
    let mut ensemble =
        BoostedEnsemble::uniform_resampling(Box::new(NearestCentroid::default()), config).unwrap();
    ensemble.train(&dataset).unwrap();

    assert!(ensemble.is_trained());
    assert!(ensemble.history().iter().all(|round| round.retained));
    assert_eq!(ensemble.effective_length(), ensemble.members().len());

    let distribution = ensemble.predict_distribution(&dataset.row(0)).unwrap();
    assert_abs_diff_eq!(distribution.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_boosting_is_deterministic_for_a_seed() {
    let dataset = create_blobs(&[50, 8], 17);
    let train = || {
        let config = BoostingConfig::builder().num_members(3).random_seed(5).build().unwrap();
        let mut ensemble =
            BoostedEnsemble::uniform_resampling(Box::new(NearestCentroid::default()), config)
                .unwrap();
        ensemble.train(&dataset).unwrap();
        ensemble.history().to_vec()
    };
    assert_eq!(train(), train());
}

#[test]
fn test_untrained_ensemble_cannot_predict() {
    let ensemble = BoostedEnsemble::uniform_resampling(
        Box::new(NearestCentroid::default()),
        BoostingConfig::default(),
    )
    .unwrap();
    let dataset = create_blobs(&[3, 3], 1);
    assert!(ensemble.predict_distribution(&dataset.row(0)).is_err());
}

#[test]
fn test_empty_dataset_is_rejected() {
    let mut ensemble = BoostedEnsemble::rebalance_sweep(
        Box::new(NearestCentroid::default()),
        BoostingConfig::default(),
    )
    .unwrap();
    assert!(ensemble.train(&Dataset::empty(2, 2).unwrap()).is_err());
}

#[test]
fn test_invalid_config_is_rejected() {
    assert!(BoostingConfig::builder().num_members(0).build().is_err());
    assert!(BoostingConfig::builder().max_spread(0.5).build().is_err());
}

#[test]
fn test_round_without_improvement_is_not_retained() {
    // Round 0 misses the key-2 row; round 1 at strength 0.5 scores the
    // same, and round 2 loses the majority class entirely.
    let keys = [0, 0, 0, 0, 0, 0, 0, 1, 1, 2];
    let labels = vec![0, 0, 0, 0, 0, 0, 0, 1, 1, 1];
    let base = LookupClassifier {
        table: vec![vec![0.6, 0.4], vec![0.2, 0.8], vec![0.7, 0.3]],
    };
    let dataset = create_keyed_dataset(&keys, labels, 2);
    let config = BoostingConfig::builder().num_members(4).build().unwrap();
    let mut ensemble = BoostedEnsemble::rebalance_sweep(Box::new(base), config).unwrap();
    ensemble.train(&dataset).unwrap();

    let history = ensemble.history();
    assert_eq!(history.len(), 3);
    assert_abs_diff_eq!(history[0].performance, (2.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    assert!(history[0].retained);
    assert_eq!(history[0].effective_length, 1);

    assert_abs_diff_eq!(history[1].performance, history[0].performance, epsilon = 1e-12);
    assert!(!history[1].retained);
    assert_eq!(history[1].effective_length, 1);

    assert_eq!(history[2].performance, 0.0);
    assert_eq!(history[2].pseudo_loss, None);
    assert_eq!(ensemble.members().len(), 3);
    assert_eq!(ensemble.effective_length(), 1);

    // Only the first member votes.
    let first = &ensemble.members()[0].classifier;
    for instance in dataset.iter() {
        let combined = ensemble.predict_distribution(&instance.features).unwrap();
        let own = first.predict_distribution(&instance.features).unwrap();
        assert_distributions_close(&combined, &own, 1e-12);
    }
}

/// Class 0 split between blobs around (0, 0) and (12, 0), class 1 around (6, 6).
fn split_majority_dataset() -> Dataset {
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for (cx, cy, label) in [(0.0, 0.0, 0), (12.0, 0.0, 0), (6.0, 6.0, 1)] {
        for i in 0..20 {
            rows.push(vec![cx + (i % 4) as f64 * 0.2, cy + (i / 4) as f64 * 0.2]);
            labels.push(label);
        }
    }
    Dataset::from_rows(&rows, labels, 2).unwrap()
}

#[test]
fn test_cluster_boost_trains_one_member_per_blob() {
    let dataset = split_majority_dataset();
    let config = BoostingConfig::builder().random_seed(12).build().unwrap();
    let mut ensemble =
        BoostedEnsemble::cluster(Box::new(NearestCentroid::default()), config).unwrap();
    ensemble.train(&dataset).unwrap();

    let clusters = ensemble.policy().clusters();
    assert_eq!(clusters.len(), 2);
    for cluster in clusters {
        assert_eq!(cluster.len(), 20);
        let blob = cluster[0] / 20;
        assert!(cluster.iter().all(|&row| row / 20 == blob));
    }

    assert!(!ensemble.members().is_empty() && ensemble.members().len() <= 2);
    assert_eq!(ensemble.history().len(), ensemble.members().len());
    assert!(ensemble.history()[0].retained);
    assert!(ensemble.history()[0].performance > 0.0);

    let distribution = ensemble.predict_distribution(&dataset.row(45)).unwrap();
    assert_abs_diff_eq!(distribution.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_cluster_boost_requires_two_classes() {
    let dataset = create_blobs(&[20, 10, 5], 2);
    let mut ensemble = BoostedEnsemble::cluster(
        Box::new(NearestCentroid::default()),
        BoostingConfig::default(),
    )
    .unwrap();
    assert!(matches!(ensemble.train(&dataset), Err(RebalanceError::Config { .. })));
    assert!(!ensemble.is_trained());
}
