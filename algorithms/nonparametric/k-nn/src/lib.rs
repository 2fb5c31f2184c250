use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
// These are the core components from our shared library.
use trivalid_helpers::{DataPoint, Distance};

// ndarray and trivalid_helpers are used in the public function signatures.
use ndarray::ArrayView1;
use trivalid_helpers::Float;

/// Errors that can occur when using the k-NN classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum KnnError {
    /// k cannot be zero for a k-NN classifier
    InvalidK,
    /// Cannot predict with an empty training set
    EmptyTrainingSet,
    /// Invalid distance comparison (likely due to NaN values in data)
    InvalidDistance,
    /// Could not determine a majority class among neighbors
    NoMajorityClass,
    /// The query point does not have the same number of features as the training data
    DimensionMismatch { expected: usize, actual: usize },
}

impl Display for KnnError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KnnError::InvalidK => write!(f, "k cannot be zero for a k-NN classifier"),
            KnnError::EmptyTrainingSet => write!(f, "Cannot predict with an empty training set"),
            KnnError::InvalidDistance => write!(
                f,
                "Invalid distance comparison (likely due to NaN values in data)"
            ),
            KnnError::NoMajorityClass => {
                write!(f, "Could not determine a majority class among neighbors")
            }
            KnnError::DimensionMismatch { expected, actual } => write!(
                f,
                "Query has {} features but the training data has {}",
                actual, expected
            ),
        }
    }
}

impl Error for KnnError {}

/// A k-Nearest Neighbors (k-NN) classifier.
///
/// This classifier predicts the label of a new data point by finding the `k`
/// most similar points in its training set and taking a majority vote among their labels.
///
/// # Type Parameters
///
/// * `L`: The type of the label (e.g., `bool`, `String`, or a custom `enum`).
/// * `F`: The float type for the features (e.g., `f32`, `f64`).
/// * `D`: The distance metric, which must implement the `trivalid_helpers::Distance` trait.
#[derive(Debug, Clone)]
pub struct KnnClassifier<L, F, D>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
    D: Distance<F>,
{
    k: usize,
    training_data: Vec<DataPoint<L, F>>,
    distance: D,
}

impl<L, F, D> KnnClassifier<L, F, D>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
    D: Distance<F>,
{
    /// Creates a new k-NN classifier.
    ///
    /// # Arguments
    ///
    /// * `k`: The number of neighbors to consider for classification. Must be greater than 0.
    /// * `training_data`: A vector of `DataPoint`s that the classifier will learn from.
    /// * `distance`: An instance of a struct that implements the `Distance` trait (e.g., `L2Dist`).
    ///
    /// # Errors
    ///
    /// Returns `KnnError::InvalidK` if `k` is 0, as this is not a valid configuration.
    pub fn new(
        k: usize,
        training_data: Vec<DataPoint<L, F>>,
        distance: D,
    ) -> Result<Self, KnnError> {
        if k == 0 {
            return Err(KnnError::InvalidK);
        }
        Ok(Self {
            k,
            training_data,
            distance,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn training_data(&self) -> &[DataPoint<L, F>] {
        &self.training_data
    }

    /// Finds the labels of the `min(k, n)` training points closest to `features`.
    fn nearest_labels(&self, features: ArrayView1<F>) -> Result<Vec<&L>, KnnError> {
        let first = self
            .training_data
            .first()
            .ok_or(KnnError::EmptyTrainingSet)?;
        if first.dim() != features.len() {
            return Err(KnnError::DimensionMismatch {
                expected: first.dim(),
                actual: features.len(),
            });
        }

        // 1. Calculate the "relative distance" (e.g., squared Euclidean) from the new point
        //    to every point in the training set. This is faster than the true distance.
        let mut distances: Vec<(F, &L)> = self
            .training_data
            .iter()
            .map(|dp| {
                let dist = self.distance.rdistance(dp.features.view(), features);
                (dist, &dp.label)
            })
            .collect();

        if distances.iter().any(|(d, _)| d.is_nan()) {
            return Err(KnnError::InvalidDistance);
        }

        // 2. Sort the training points by their distance to the new point (ascending).
        //    A stable sort keeps ties in training order, so repeated queries
        //    always see the same neighbourhood.
        distances.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        // 3. Take the top `k` neighbors.
        //    We use `min` to handle cases where k is larger than the training set size.
        let num_neighbors = self.k.min(distances.len());
        Ok(distances
            .into_iter()
            .take(num_neighbors)
            .map(|(_, label)| label)
            .collect())
    }

    /// Predicts the label for a new, unseen data point.
    ///
    /// # Arguments
    ///
    /// * `features`: An `ArrayView1` containing the features of the point to classify.
    ///
    /// # Returns
    ///
    /// Returns the predicted label `L` on success.
    ///
    /// # Errors
    ///
    /// Returns `KnnError::EmptyTrainingSet` if the training data is empty.
    /// Returns `KnnError::InvalidDistance` if distance comparison fails (e.g., due to NaN values).
    /// Returns `KnnError::NoMajorityClass` if no majority class can be determined.
    pub fn predict(&self, features: ArrayView1<F>) -> Result<L, KnnError> {
        let neighbors = self.nearest_labels(features)?;

        // Count the votes for each label among the neighbors.
        let mut votes: HashMap<&L, usize> = HashMap::new();
        for label in neighbors {
            *votes.entry(label).or_insert(0) += 1;
        }

        let max_votes = votes
            .values()
            .copied()
            .max()
            .ok_or(KnnError::EmptyTrainingSet)?;

        let winners: Vec<_> = votes
            .iter()
            .filter(|&(_, &count)| count == max_votes)
            .map(|(&label, _)| label)
            .collect();

        // More than one winner means there was a tie.
        match winners.as_slice() {
            [winner] => Ok((*winner).clone()),
            _ => Err(KnnError::NoMajorityClass),
        }
    }

    /// Returns the fraction of nearest neighbors whose label satisfies `positive`.
    ///
    /// This turns a binary k-NN vote into a score in `[0, 1]`, which is how
    /// the classifier is used as a confidence estimator.
    ///
    /// # Errors
    ///
    /// Same as [`KnnClassifier::predict`], except that ties are not an error.
    pub fn vote_share<P>(&self, features: ArrayView1<F>, positive: P) -> Result<F, KnnError>
    where
        P: Fn(&L) -> bool,
    {
        let neighbors = self.nearest_labels(features)?;
        let hits = neighbors.iter().filter(|&&label| positive(label)).count();
        let total = F::from_usize(neighbors.len()).ok_or(KnnError::InvalidDistance)?;
        let hits = F::from_usize(hits).ok_or(KnnError::InvalidDistance)?;
        Ok(hits / total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use trivalid_helpers::L2Dist;

    fn two_clusters() -> Vec<DataPoint<&'static str, f64>> {
        vec![
            DataPoint::new(array![1.0, 1.0], "A"),
            DataPoint::new(array![2.0, 2.0], "A"),
            DataPoint::new(array![1.0, 2.0], "A"),
            DataPoint::new(array![8.0, 8.0], "B"),
            DataPoint::new(array![9.0, 8.0], "B"),
            DataPoint::new(array![8.0, 9.0], "B"),
        ]
    }

    #[test]
    fn test_knn_classification_simple() {
        // Create a classifier with k=3 and L2 (Euclidean) distance
        let classifier = KnnClassifier::new(3, two_clusters(), L2Dist).unwrap();

        // Point close to class "A"
        let point_a = array![2.5, 2.5];
        assert_eq!(classifier.predict(point_a.view()).unwrap(), "A");

        // Point close to class "B"
        let point_b = array![7.5, 8.5];
        assert_eq!(classifier.predict(point_b.view()).unwrap(), "B");
    }

    #[test]
    fn test_knn_k_larger_than_dataset() {
        let training_data = vec![
            DataPoint::new(array![1.0], "A"),
            DataPoint::new(array![2.0], "A"),
            DataPoint::new(array![10.0], "B"),
        ];

        // k=5 is larger than the dataset size of 3, but this should work fine.
        // The two 'A's will outvote the one 'B'.
        let classifier = KnnClassifier::new(5, training_data, L2Dist).unwrap();
        let point = array![3.0];
        assert_eq!(classifier.predict(point.view()).unwrap(), "A");
    }

    #[test]
    fn test_tie_is_reported() {
        let training_data = vec![
            DataPoint::new(array![0.0], "A"),
            DataPoint::new(array![2.0], "B"),
        ];
        let classifier = KnnClassifier::new(2, training_data, L2Dist).unwrap();
        let result = classifier.predict(array![1.0].view());
        assert_eq!(result, Err(KnnError::NoMajorityClass));
    }

    #[test]
    fn test_vote_share_counts_positive_neighbors() {
        let training_data = vec![
            DataPoint::new(array![0.0], true),
            DataPoint::new(array![0.1], true),
            DataPoint::new(array![0.2], false),
            DataPoint::new(array![5.0], false),
        ];
        let classifier = KnnClassifier::new(3, training_data, L2Dist).unwrap();
        let share = classifier.vote_share(array![0.0].view(), |&l| l).unwrap();
        assert_abs_diff_eq!(share, 2.0 / 3.0, epsilon = 1e-12);

        let far = classifier.vote_share(array![10.0].view(), |&l| l).unwrap();
        assert_abs_diff_eq!(far, 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_vote_share_is_bounded() {
        use rand::{Rng, SeedableRng};
        use rand_xoshiro::Xoshiro256PlusPlus;

        let classifier = KnnClassifier::new(3, two_clusters(), L2Dist).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        for _ in 0..200 {
            let q = array![rng.random_range(-5.0..15.0), rng.random_range(-5.0..15.0)];
            let share = classifier.vote_share(q.view(), |&l| l == "A").unwrap();
            assert!((0.0..=1.0).contains(&share));
        }
    }

    #[test]
    fn test_error_on_k_zero() {
        let training_data: Vec<DataPoint<&str, f64>> = vec![];
        let result = KnnClassifier::new(0, training_data, L2Dist);
        assert!(matches!(result, Err(KnnError::InvalidK)));
    }

    #[test]
    fn test_error_on_empty_training_set() {
        let training_data: Vec<DataPoint<&str, f64>> = vec![];
        let classifier = KnnClassifier::new(3, training_data, L2Dist).unwrap();
        let result = classifier.predict(array![1.0, 1.0].view());
        assert!(matches!(result, Err(KnnError::EmptyTrainingSet)));
        let share = classifier.vote_share(array![1.0, 1.0].view(), |_| true);
        assert!(matches!(share, Err(KnnError::EmptyTrainingSet)));
    }

    #[test]
    fn test_error_on_dimension_mismatch() {
        let classifier = KnnClassifier::new(3, two_clusters(), L2Dist).unwrap();
        let result = classifier.predict(array![1.0, 2.0, 3.0].view());
        assert_eq!(
            result,
            Err(KnnError::DimensionMismatch { expected: 2, actual: 3 })
        );
    }

    #[test]
    fn test_error_on_nan_query() {
        let classifier = KnnClassifier::new(3, two_clusters(), L2Dist).unwrap();
        let result = classifier.vote_share(array![f64::NAN, 1.0].view(), |_| true);
        assert_eq!(result, Err(KnnError::InvalidDistance));
    }
}
