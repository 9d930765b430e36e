//! Logging statistics from simulation runs
mod cli;

pub use cli::CLILogger;

use enum_map::Enum;
use thiserror::Error;

/// Simulation run events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum Event {
    Step,
    Episode,
}

/// A value that can be logged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Loggable {
    /// Nothing. No data to log.
    /// Logging Nothing data may still produce a placeholder entry for the name.
    Nothing,
    /// A scalar value. Aggregate by taking means.
    Scalar(f64),
    /// A sample from a distribution over `0 .. size`
    IndexSample { value: usize, size: usize },
}

impl From<f64> for Loggable {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<f32> for Loggable {
    fn from(value: f32) -> Self {
        Self::Scalar(value.into())
    }
}

/// Log statistics from a simulation run.
pub trait Logger {
    /// Log a value.
    ///
    /// # Args
    /// * `event` - The event associated with this value.
    /// * `name` - The name that identifies this value.
    /// * `value` - The value to log.
    ///
    /// # Returns
    /// May return an error if the logged value is structurally incompatible
    /// with previous values logged under the same name.
    fn log(&mut self, event: Event, name: &str, value: Loggable) -> Result<(), LogError>;

    /// Mark the end of an event.
    fn done(&mut self, event: Event);
}

/// Logger that does nothing
impl Logger for () {
    fn log(&mut self, _: Event, _: &str, _: Loggable) -> Result<(), LogError> {
        Ok(())
    }

    fn done(&mut self, _: Event) {}
}

impl<L: Logger + ?Sized> Logger for &'_ mut L {
    fn log(&mut self, event: Event, name: &str, value: Loggable) -> Result<(), LogError> {
        L::log(self, event, name, value)
    }

    fn done(&mut self, event: Event) {
        L::done(self, event)
    }
}

impl<L: Logger + ?Sized> Logger for Box<L> {
    fn log(&mut self, event: Event, name: &str, value: Loggable) -> Result<(), LogError> {
        L::log(self, event, name, value)
    }

    fn done(&mut self, event: Event) {
        L::done(self, event)
    }
}

/// A logged value is incompatible with earlier values logged under the same name.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("\"{name}\": incompatible value {value:?}, expected {expected}")]
pub struct LogError {
    name: String,
    value: Loggable,
    expected: String,
}

impl LogError {
    pub fn new(name: &str, value: Loggable, expected: String) -> Self {
        Self {
            name: name.into(),
            value,
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_logger_accepts_anything() {
        let mut logger = ();
        assert!(logger.log(Event::Step, "x", 1.0.into()).is_ok());
        assert!(logger
            .log(Event::Step, "x", Loggable::IndexSample { value: 1, size: 2 })
            .is_ok());
        logger.done(Event::Step);
    }

    #[test]
    fn log_error_display() {
        let err = LogError::new("reward", Loggable::Nothing, "Scalar".into());
        assert_eq!(
            err.to_string(),
            "\"reward\": incompatible value Nothing, expected Scalar"
        );
    }

    #[test]
    fn from_f32() {
        assert_eq!(Loggable::from(0.5_f32), Loggable::Scalar(0.5));
    }
}
