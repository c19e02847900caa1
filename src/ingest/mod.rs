/// Provider adapters that turn remote payloads into a `Series`.
///
/// Submodules:
/// - `power`: NASA POWER daily point API (observed history).
/// - `weatherbit`: Weatherbit agweather forecast, appended after the observed days.

pub mod power;
pub mod weatherbit;
