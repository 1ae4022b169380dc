use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::linear_algebra::Matrix;

/// Draws a batch of `samples` uniform inputs in `[0, 1)` with one-hot targets over `classes`.
pub fn random_batch(
    rng: &mut impl Rng,
    samples: usize,
    features: usize,
    classes: usize,
) -> (Matrix, Matrix) {
    let uniform_distribution = Uniform::new(0.0, 1.0);

    let mut inputs = Matrix::zeros(samples, features);
    inputs
        .values_mut()
        .iter_mut()
        .for_each(|x| *x = uniform_distribution.sample(rng));

    let mut targets = Matrix::zeros(samples, classes);
    if classes > 0 {
        for row in 0..samples {
            targets[row][rng.gen_range(0..classes)] = 1.0;
        }
    }

    (inputs, targets)
}
