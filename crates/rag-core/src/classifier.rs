//! The classifier plug-in boundary, and a small deterministic logistic
//! regression sufficient to drive the `active` priority mode without an
//! external machine-learning dependency.
//!
//! A production deployment would implement [`Classifier`] over a real
//! random-forest binding; this module exists so the `active` priority
//! mode and the learning engine's provisional-classifier warm start work
//! out of the box.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand::seq::SliceRandom;

/// A binary classifier over edge feature vectors, predicting the
/// probability that a proposed merge is *correct*.
pub trait Classifier {
    /// Predicts `P(merge is correct)` for a single feature vector.
    fn predict_proba(&self, features: &[f64]) -> f64;

    /// Trains (or retrains) the classifier from scratch on the given
    /// labeled examples. Must be deterministic given `seed`.
    fn fit(&mut self, features: &[Vec<f64>], labels: &[bool], seed: u64);
}

/// Batch-gradient-descent logistic regression with L2 regularization.
///
/// Not intended to compete with a real random forest; it exists to give
/// the `active` priority mode a working, fully self-contained warm start.
#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    weights: Vec<f64>,
    bias: f64,
    learning_rate: f64,
    l2: f64,
    epochs: usize,
}

impl Default for LogisticClassifier {
    fn default() -> Self {
        Self {
            weights: Vec::new(),
            bias: 0.0,
            learning_rate: 0.1,
            l2: 1e-4,
            epochs: 200,
        }
    }
}

impl LogisticClassifier {
    pub fn new(learning_rate: f64, l2: f64, epochs: usize) -> Self {
        Self {
            weights: Vec::new(),
            bias: 0.0,
            learning_rate,
            l2,
            epochs,
        }
    }

    fn score(&self, features: &[f64]) -> f64 {
        let dot: f64 = self
            .weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum();
        dot + self.bias
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Classifier for LogisticClassifier {
    fn predict_proba(&self, features: &[f64]) -> f64 {
        if self.weights.is_empty() {
            // No training data yet: maximally uninformative prior.
            return 0.5;
        }
        sigmoid(self.score(features))
    }

    fn fit(&mut self, features: &[Vec<f64>], labels: &[bool], seed: u64) {
        if features.is_empty() {
            self.weights.clear();
            self.bias = 0.0;
            return;
        }
        let dim = features[0].len();
        self.weights = vec![0.0; dim];
        self.bias = 0.0;

        let mut order: Vec<usize> = (0..features.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..self.epochs {
            order.shuffle(&mut rng);
            for &i in &order {
                let x = &features[i];
                let y = if labels[i] { 1.0 } else { 0.0 };
                let p = sigmoid(self.score(x));
                let error = p - y;
                for (w, xi) in self.weights.iter_mut().zip(x) {
                    *w -= self.learning_rate * (error * xi + self.l2 * *w);
                }
                self.bias -= self.learning_rate * error;
            }
        }
    }
}
