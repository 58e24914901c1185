/// Arithmetic mean of `values`.
///
/// An empty slice is not guarded against and yields `NaN` (`0.0 / 0.0`).
pub fn calculate_average(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}
