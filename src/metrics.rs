use crate::dataset::TargetGroup;

const ZERO_DIVISION: f64 = 1.0;

/// Scores for one target column
#[derive(Debug, Clone, PartialEq)]
pub struct LabelScore {
    pub name: String,
    pub group: TargetGroup,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of `true` values in the truth
    pub support: usize,
}

/// Scores for a whole prediction matrix
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub labels: Vec<LabelScore>,
    /// `None` when there are no clothing columns
    pub clothing_accuracy: Option<f64>,
    /// `None` when there are no sports columns
    pub sports_accuracy: Option<f64>,
    pub overall_accuracy: f64,
    pub weighted_precision: f64,
    pub weighted_recall: f64,
    pub weighted_f1: f64,
}

#[derive(Debug, Default, Clone, Copy)]
struct Confusion {
    tp: usize,
    fp: usize,
    tn: usize,
    fn_: usize,
}

impl Confusion {
    fn count(truth: &[Vec<bool>], predicted: &[Vec<bool>], column: usize) -> Self {
        truth
            .iter()
            .zip(predicted)
            .fold(Self::default(), |mut acc, (t, p)| {
                match (t[column], p[column]) {
                    (true, true) => acc.tp += 1,
                    (false, true) => acc.fp += 1,
                    (false, false) => acc.tn += 1,
                    (true, false) => acc.fn_ += 1,
                }
                acc
            })
    }

    fn total(self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    fn correct(self) -> usize {
        self.tp + self.tn
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        ZERO_DIVISION
    } else {
        numerator as f64 / denominator as f64
    }
}

fn group_accuracy(confusions: &[(TargetGroup, Confusion)], group: Option<TargetGroup>) -> Option<f64> {
    let (correct, total) = confusions
        .iter()
        .filter(|(g, _)| group.map_or(true, |wanted| *g == wanted))
        .fold((0, 0), |(correct, total), (_, c)| (correct + c.correct(), total + c.total()));
    (total > 0).then(|| correct as f64 / total as f64)
}

fn weighted(labels: &[LabelScore], metric: impl Fn(&LabelScore) -> f64) -> f64 {
    let support: usize = labels.iter().map(|label| label.support).sum();
    if support == 0 {
        return ZERO_DIVISION;
    }
    labels
        .iter()
        .map(|label| metric(label) * label.support as f64)
        .sum::<f64>()
        / support as f64
}

/// Scores `predicted` against `truth`; both are row-major and share the
/// column layout described by `names` and `groups`
pub fn evaluate(
    names: &[String],
    groups: &[TargetGroup],
    truth: &[Vec<bool>],
    predicted: &[Vec<bool>],
) -> EvaluationReport {
    let confusions: Vec<(TargetGroup, Confusion)> = groups
        .iter()
        .enumerate()
        .map(|(column, group)| (*group, Confusion::count(truth, predicted, column)))
        .collect();

    let labels: Vec<LabelScore> = names
        .iter()
        .zip(&confusions)
        .map(|(name, (group, c))| LabelScore {
            name: name.clone(),
            group: *group,
            accuracy: ratio(c.correct(), c.total()),
            precision: ratio(c.tp, c.tp + c.fp),
            recall: ratio(c.tp, c.tp + c.fn_),
            f1: ratio(2 * c.tp, 2 * c.tp + c.fp + c.fn_),
            support: c.tp + c.fn_,
        })
        .collect();

    EvaluationReport {
        clothing_accuracy: group_accuracy(&confusions, Some(TargetGroup::Clothing)),
        sports_accuracy: group_accuracy(&confusions, Some(TargetGroup::Sports)),
        overall_accuracy: group_accuracy(&confusions, None).unwrap_or(ZERO_DIVISION),
        weighted_precision: weighted(&labels, |label| label.precision),
        weighted_recall: weighted(&labels, |label| label.recall),
        weighted_f1: weighted(&labels, |label| label.f1),
        labels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn perfect_predictions_score_one() {
        let truth = vec![vec![true, false], vec![false, true]];
        let report = evaluate(
            &names(&["jacket", "running"]),
            &[TargetGroup::Clothing, TargetGroup::Sports],
            &truth,
            &truth,
        );
        assert_eq!(report.overall_accuracy, 1.0);
        assert_eq!(report.clothing_accuracy, Some(1.0));
        assert_eq!(report.sports_accuracy, Some(1.0));
        assert_eq!(report.weighted_f1, 1.0);
    }

    #[test]
    fn counts_precision_and_recall_per_column() {
        // truth:     T T F F
        // predicted: T F T F
        let truth = vec![vec![true], vec![true], vec![false], vec![false]];
        let predicted = vec![vec![true], vec![false], vec![true], vec![false]];
        let report = evaluate(&names(&["hat"]), &[TargetGroup::Clothing], &truth, &predicted);

        let hat = &report.labels[0];
        assert_eq!(hat.accuracy, 0.5);
        assert_eq!(hat.precision, 0.5);
        assert_eq!(hat.recall, 0.5);
        assert_eq!(hat.f1, 0.5);
        assert_eq!(hat.support, 2);
        assert_eq!(report.sports_accuracy, None);
    }

    #[test]
    fn undefined_ratios_count_as_one() {
        let truth = vec![vec![false], vec![false]];
        let predicted = vec![vec![false], vec![false]];
        let report = evaluate(&names(&["scarf"]), &[TargetGroup::Clothing], &truth, &predicted);
        assert_eq!(report.labels[0].precision, 1.0);
        assert_eq!(report.labels[0].recall, 1.0);
        assert_eq!(report.weighted_recall, 1.0);
    }

    #[test]
    fn weighted_average_follows_support() {
        // column a: 3 positives, all found; column b: 1 positive, missed
        let truth = vec![
            vec![true, true],
            vec![true, false],
            vec![true, false],
            vec![false, false],
        ];
        let predicted = vec![
            vec![true, false],
            vec![true, false],
            vec![true, false],
            vec![false, false],
        ];
        let report = evaluate(
            &names(&["a", "b"]),
            &[TargetGroup::Clothing, TargetGroup::Sports],
            &truth,
            &predicted,
        );
        assert_eq!(report.labels[1].recall, 0.0);
        assert!((report.weighted_recall - 0.75).abs() < 1e-12);
        assert_eq!(report.clothing_accuracy, Some(1.0));
        assert_eq!(report.sports_accuracy, Some(0.75));
    }
}
