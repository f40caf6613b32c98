pub mod input;
pub mod utilization;

/// Core Pulse trait.
///
/// A pulse:
/// - owns internal state
/// - consumes exactly one input tick
/// - produces a result or rejects the input without touching its state
pub trait Pulse {
    /// Input type consumed per tick
    type Input;

    /// Output type produced per tick
    type Output;

    /// Rejection raised for malformed input
    type Error;

    fn evaluate(&mut self, input: Self::Input) -> Result<Self::Output, Self::Error>;
}
