use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::constants::DEFAULT_EXCLUDED_FEATURES;
use crate::dataset::{flatten, FeatureSummary};
use crate::error::TrainError;
use crate::forest::{ForestParams, MultiOutputForest};
use crate::metrics::{evaluate, EvaluationReport};
use crate::record::LogRow;

/// One row to fit on and one to evaluate against
pub const MIN_TRAINING_ROWS: usize = 2;

/// Knobs for one training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    /// Share of rows held out for evaluation
    pub test_ratio: f64,
    /// Feature columns left out of the model
    pub excluded_features: Vec<String>,
    pub forest: ForestParams,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            excluded_features: DEFAULT_EXCLUDED_FEATURES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            forest: ForestParams {
                positive_weight: 2.0,
                ..ForestParams::default()
            },
        }
    }
}

/// Result of a training run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub feature_names: Vec<String>,
    /// Statistics of the features the model was given, over all rows
    pub feature_summary: Vec<FeatureSummary>,
    pub dropped_targets: Vec<String>,
    pub train_rows: usize,
    pub test_rows: usize,
    pub report: EvaluationReport,
    pub model: MultiOutputForest,
}

/// Shuffled split of `0..n` into (train, test) index sets.
///
/// The test set gets `ceil(n * test_ratio)` rows; both sets must end up
/// non-empty.
pub fn train_test_split(
    n: usize,
    test_ratio: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), TrainError> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(TrainError::InvalidTestRatio(test_ratio));
    }
    let n_test = (n as f64 * test_ratio).ceil() as usize;
    if n < MIN_TRAINING_ROWS || n_test >= n {
        return Err(TrainError::NotEnoughRows {
            needed: MIN_TRAINING_ROWS,
            found: n,
        });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut SmallRng::seed_from_u64(seed));
    let train = indices.split_off(n_test);
    Ok((train, indices))
}

/// Runs the whole pipeline on `rows`
pub fn train(rows: &[LogRow], options: &TrainOptions) -> Result<TrainingOutcome, TrainError> {
    if rows.len() < MIN_TRAINING_ROWS {
        return Err(TrainError::NotEnoughRows {
            needed: MIN_TRAINING_ROWS,
            found: rows.len(),
        });
    }

    let mut table = flatten(rows)?;

    let excluded = table.features.drop_columns(&options.excluded_features);
    if !excluded.is_empty() {
        tracing::info!("Excluding features: {}", excluded.join(", "));
    }
    if table.features.names.is_empty() {
        return Err(TrainError::NoFeatures);
    }

    let dropped_targets = table.targets.drop_constant_columns();
    if !dropped_targets.is_empty() {
        tracing::info!(
            "Dropping targets without variation: {}",
            dropped_targets.join(", ")
        );
    }
    if table.targets.names.is_empty() {
        return Err(TrainError::NoTargets);
    }

    let (train_idx, test_idx) = train_test_split(rows.len(), options.test_ratio, options.forest.seed)?;
    let x_train = table.features.select_rows(&train_idx);
    let y_train = table.targets.select_rows(&train_idx);
    let x_test = table.features.select_rows(&test_idx);
    let y_test = table.targets.select_rows(&test_idx);

    tracing::info!(
        "Fitting {} forests of {} trees on {} rows",
        y_train.names.len(),
        options.forest.n_trees,
        x_train.len()
    );
    let model = MultiOutputForest::fit(&x_train.rows, &y_train.rows, &options.forest);
    let predicted = model.predict(&x_test.rows);
    let report = evaluate(&y_test.names, &y_test.groups, &y_test.rows, &predicted);

    Ok(TrainingOutcome {
        feature_summary: table.features.describe(),
        feature_names: table.features.names,
        dropped_targets,
        train_rows: x_train.len(),
        test_rows: x_test.len(),
        report,
        model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_holds_out_a_fifth_rounded_up() {
        let (train, test) = train_test_split(10, 0.2, 8).unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);

        let (train, test) = train_test_split(11, 0.2, 8).unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 3);
    }

    #[test]
    fn split_covers_every_row_once() {
        let (train, test) = train_test_split(25, 0.2, 3).unwrap();
        let mut all: Vec<usize> = train.into_iter().chain(test).collect();
        all.sort_unstable();
        assert_eq!(all, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn split_is_reproducible_for_a_seed() {
        assert_eq!(
            train_test_split(30, 0.2, 8).unwrap(),
            train_test_split(30, 0.2, 8).unwrap()
        );
    }

    #[test]
    fn split_needs_rows_on_both_sides() {
        assert!(matches!(
            train_test_split(1, 0.2, 8),
            Err(TrainError::NotEnoughRows { found: 1, .. })
        ));
        assert!(matches!(
            train_test_split(10, 1.5, 8),
            Err(TrainError::InvalidTestRatio(_))
        ));
    }
}
