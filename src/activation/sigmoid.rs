use std::f64::consts::E;

use crate::math::matrix::Matrix;

/// Logistic function `1 / (1 + e^-x)`, squashing any real into (0, 1).
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + E.powf(-x))
}

/// Derivative of the sigmoid written in terms of its OUTPUT: `y * (1 - y)`.
///
/// `y` must already be an activated value (`y = sigmoid(x)`). Passing the
/// pre-activation `x` here silently computes the wrong gradient.
pub fn sigmoid_prime(y: f64) -> f64 {
    y * (1.0 - y)
}

/// `sigmoid` applied to every entry.
pub fn activate(m: &Matrix) -> Matrix {
    m.apply(sigmoid)
}

/// `sigmoid_prime` applied to every entry of an already-activated matrix.
pub fn activated_derivative(outputs: &Matrix) -> Matrix {
    outputs.apply(sigmoid_prime)
}
