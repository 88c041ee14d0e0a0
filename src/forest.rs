use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Hyper-parameters shared by every tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_trees: usize,
    /// Unlimited when `None`
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Weight of a `true` sample relative to a `false` one
    pub positive_weight: f64,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            positive_weight: 1.0,
            seed: 8,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        /// Weighted share of positive samples that reached this leaf
        positive: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A single CART tree
#[derive(Debug, Clone)]
pub struct DecisionTree {
    root: Node,
}

struct TreeBuilder<'a> {
    features: &'a [Vec<f64>],
    labels: &'a [bool],
    params: &'a ForestParams,
    max_features: usize,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// Weighted Gini impurity times total weight
fn weighted_gini(positive: f64, negative: f64) -> f64 {
    let total = positive + negative;
    if total <= 0.0 {
        return 0.0;
    }
    total - (positive * positive + negative * negative) / total
}

impl<'a> TreeBuilder<'a> {
    fn weight(&self, sample: usize) -> (f64, f64) {
        if self.labels[sample] {
            (self.params.positive_weight, 0.0)
        } else {
            (0.0, 1.0)
        }
    }

    fn class_weights(&self, samples: &[usize]) -> (f64, f64) {
        samples.iter().fold((0.0, 0.0), |(pos, neg), sample| {
            let (p, n) = self.weight(*sample);
            (pos + p, neg + n)
        })
    }

    fn grow(&self, samples: &[usize], depth: usize, rng: &mut SmallRng) -> Node {
        let (positive, negative) = self.class_weights(samples);
        let total = positive + negative;
        let leaf = Node::Leaf {
            positive: if total > 0.0 { positive / total } else { 0.0 },
        };

        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);
        if positive == 0.0
            || negative == 0.0
            || samples.len() < self.params.min_samples_split
            || depth_reached
        {
            return leaf;
        }

        let parent_impurity = weighted_gini(positive, negative);
        let Some(best) = self.best_split(samples, rng) else {
            return leaf;
        };
        if best.impurity >= parent_impurity {
            return leaf;
        }

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|sample| self.features[**sample][best.feature] <= best.threshold);

        Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.grow(&left, depth + 1, rng)),
            right: Box::new(self.grow(&right, depth + 1, rng)),
        }
    }

    /// Tries up to `max_features` non-constant features in random order
    fn best_split(&self, samples: &[usize], rng: &mut SmallRng) -> Option<Candidate> {
        let n_features = self.features.first().map_or(0, Vec::len);
        let mut order: Vec<usize> = (0..n_features).collect();
        order.shuffle(rng);

        let mut best: Option<Candidate> = None;
        let mut tried = 0;
        for feature in order {
            if tried >= self.max_features {
                break;
            }
            let Some(candidate) = self.best_threshold(samples, feature) else {
                continue;
            };
            tried += 1;
            if best.map_or(true, |current| candidate.impurity < current.impurity) {
                best = Some(candidate);
            }
        }
        best
    }

    /// Best threshold on one feature; `None` when the feature is constant here
    fn best_threshold(&self, samples: &[usize], feature: usize) -> Option<Candidate> {
        let mut sorted: Vec<usize> = samples.to_vec();
        sorted.sort_by(|a, b| {
            self.features[*a][feature].total_cmp(&self.features[*b][feature])
        });

        let value = |idx: usize| self.features[sorted[idx]][feature];
        if value(0) == value(sorted.len() - 1) {
            return None;
        }

        let (total_pos, total_neg) = self.class_weights(&sorted);
        let (mut left_pos, mut left_neg) = (0.0, 0.0);
        let mut best: Option<Candidate> = None;

        for idx in 0..sorted.len() - 1 {
            let (p, n) = self.weight(sorted[idx]);
            left_pos += p;
            left_neg += n;
            if value(idx) == value(idx + 1) {
                continue;
            }

            let impurity = weighted_gini(left_pos, left_neg)
                + weighted_gini(total_pos - left_pos, total_neg - left_neg);
            if best.map_or(true, |current| impurity < current.impurity) {
                best = Some(Candidate {
                    feature,
                    threshold: (value(idx) + value(idx + 1)) / 2.0,
                    impurity,
                });
            }
        }
        best
    }
}

impl DecisionTree {
    fn fit(
        features: &[Vec<f64>],
        labels: &[bool],
        samples: &[usize],
        params: &ForestParams,
        rng: &mut SmallRng,
    ) -> Self {
        let n_features = features.first().map_or(0, Vec::len);
        let builder = TreeBuilder {
            features,
            labels,
            params,
            max_features: ((n_features as f64).sqrt() as usize).max(1),
        };
        Self {
            root: builder.grow(samples, 0, rng),
        }
    }

    /// Probability that `row` belongs to the positive class
    #[must_use]
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { positive } => return *positive,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { &**left } else { &**right };
                }
            }
        }
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        fn depth_of(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        depth_of(&self.root)
    }
}

/// Bagged ensemble of decision trees for one boolean target
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fits `params.n_trees` trees, each on its own bootstrap sample
    pub fn fit(features: &[Vec<f64>], labels: &[bool], params: &ForestParams) -> Self {
        let mut rng = SmallRng::seed_from_u64(params.seed);
        Self::fit_with_rng(features, labels, params, &mut rng)
    }

    fn fit_with_rng(
        features: &[Vec<f64>],
        labels: &[bool],
        params: &ForestParams,
        rng: &mut SmallRng,
    ) -> Self {
        let n = features.len();
        let trees = (0..params.n_trees.max(1))
            .map(|_| {
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(features, labels, &bootstrap, params, rng)
            })
            .collect();
        Self { trees }
    }

    /// Mean positive probability across trees
    #[must_use]
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        self.trees.iter().map(|tree| tree.predict_proba(row)).sum::<f64>() / self.trees.len() as f64
    }

    #[must_use]
    pub fn predict(&self, row: &[f64]) -> bool {
        self.predict_proba(row) > 0.5
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

/// One forest per target column, sharing the feature matrix
#[derive(Debug, Clone)]
pub struct MultiOutputForest {
    forests: Vec<RandomForest>,
}

impl MultiOutputForest {
    /// `targets[i][j]` is target `j` of sample `i`
    pub fn fit(features: &[Vec<f64>], targets: &[Vec<bool>], params: &ForestParams) -> Self {
        let n_targets = targets.first().map_or(0, Vec::len);
        let forests = (0..n_targets)
            .map(|column| {
                let labels: Vec<bool> = targets.iter().map(|row| row[column]).collect();
                tracing::trace!("Fitting forest for target column {}", column);
                RandomForest::fit(features, &labels, params)
            })
            .collect();
        Self { forests }
    }

    /// Predicts every target for every row
    #[must_use]
    pub fn predict(&self, features: &[Vec<f64>]) -> Vec<Vec<bool>> {
        features
            .iter()
            .map(|row| self.forests.iter().map(|forest| forest.predict(row)).collect())
            .collect()
    }

    #[must_use]
    pub fn n_outputs(&self) -> usize {
        self.forests.len()
    }
}
