pub struct SquaredError;

impl SquaredError {
    /// Sum of squared differences: sum((target - output)²)
    pub fn loss(output: &[f64], target: &[f64]) -> f64 {
        output.iter().zip(target.iter())
            .map(|(a, b)| (b - a).powi(2))
            .sum()
    }
}
