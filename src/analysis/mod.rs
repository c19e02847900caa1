/// Per-day and windowed quantities computed ahead of scoring.
///
/// Submodules:
/// - `derived`: water balance, deficit, evaporation ratio and VPD from one day's raw values.
/// - `rolling`: trailing-window means over the ordered series.

pub mod derived;
pub mod rolling;
