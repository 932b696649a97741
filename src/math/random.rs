use rand::distributions::{Distribution, Uniform};
use rand::Rng;

/// Draws `n` values uniformly from the open interval
/// `(-1/sqrt(scale_factor), 1/sqrt(scale_factor))`.
///
/// `scale_factor` is the fan-in of the layer being initialized, so wider
/// layers start with smaller weights. The caller supplies the generator;
/// nothing here touches a global RNG.
pub fn random_array<R: Rng + ?Sized>(rng: &mut R, n: usize, scale_factor: f64) -> Vec<f64> {
    let bound = 1.0 / scale_factor.sqrt();
    // `Uniform::new` is half-open, so the lower edge is redrawn.
    let dist = Uniform::new(-bound, bound);
    (0..n)
        .map(|_| loop {
            let x = dist.sample(rng);
            if x > -bound {
                break x;
            }
        })
        .collect()
}
