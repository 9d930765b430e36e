//! Command-line logger
use super::{Event, LogError, Loggable, Logger};
use enum_map::{enum_map, EnumMap};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};
use yansi::Paint;

/// Logger that periodically writes summaries of the logged values to stdout.
///
/// Values logged during an event are committed when the event is done.
/// Scalars are summarized by their mean and index samples by their empirical distribution.
/// Any remaining summary is displayed when the logger is dropped.
#[derive(Debug)]
pub struct CLILogger {
    events: EnumMap<Event, EventLog>,

    display_period: Duration,
    last_display_time: Instant,
}

impl CLILogger {
    pub fn new(display_period: Duration) -> Self {
        Self {
            events: enum_map! { _ => EventLog::default() },
            display_period,
            last_display_time: Instant::now(),
        }
    }

    /// Display the summary and clear all stored data.
    pub fn display(&mut self) {
        let summary = self.summary();
        if !summary.is_empty() {
            println!();
            print!("{}", summary);
        }
        self.clear();
        self.last_display_time = Instant::now();
    }

    /// Summary of the values committed since the last display.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (event, event_log) in &self.events {
            let summary_size = event_log.index - event_log.summary_start_index;
            if summary_size == 0 {
                continue;
            }
            out.push_str(&format!(
                "==== {} ====\n",
                Paint::fixed(
                    35,
                    format!(
                        "{:?}s {} - {}",
                        event,
                        event_log.summary_start_index,
                        event_log.index - 1
                    )
                )
            ));
            for (name, aggregator) in &event_log.aggregators {
                out.push_str(&format!("{:<16} {}\n", name, aggregator));
            }
        }
        out
    }

    fn clear(&mut self) {
        for event_log in self.events.values_mut() {
            for aggregator in event_log.aggregators.values_mut() {
                aggregator.clear();
            }
            event_log.summary_start_index = event_log.index;
        }
    }
}

impl Default for CLILogger {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Logger for CLILogger {
    fn log(&mut self, event: Event, name: &str, value: Loggable) -> Result<(), LogError> {
        // Separate get / insert since the entry API would allocate the key on every call.
        let aggregators = &mut self.events[event].aggregators;
        if let Some(aggregator) = aggregators.get_mut(name) {
            aggregator
                .update(value)
                .map_err(|expected| LogError::new(name, value, expected))?;
        } else {
            aggregators.insert(name.into(), Aggregator::new(value));
        }
        Ok(())
    }

    fn done(&mut self, event: Event) {
        let event_log = &mut self.events[event];
        event_log.index += 1;
        for aggregator in event_log.aggregators.values_mut() {
            aggregator.commit()
        }

        if self.last_display_time.elapsed() >= self.display_period {
            self.display();
        }
    }
}

impl Drop for CLILogger {
    fn drop(&mut self) {
        // Flush anything not yet displayed.
        self.display();
    }
}

#[derive(Debug, Default)]
struct EventLog {
    /// Global index for this event
    index: u64,
    /// Value of `index` at the start of this summary period
    summary_start_index: u64,
    aggregators: BTreeMap<String, Aggregator>,
}

#[derive(Debug, Clone, PartialEq)]
enum Aggregator {
    Nothing,
    ScalarMean {
        sum: f64,
        count: u64,
        pending: Option<f64>,
    },
    IndexDistribution {
        counts: Vec<u64>,
        pending: Option<usize>,
    },
}

impl Aggregator {
    /// Create a new aggregator from its first logged value.
    fn new(value: Loggable) -> Self {
        match value {
            Loggable::Nothing => Self::Nothing,
            Loggable::Scalar(x) => Self::ScalarMean {
                sum: 0.0,
                count: 0,
                pending: Some(x),
            },
            Loggable::IndexSample { value, size } => Self::IndexDistribution {
                counts: vec![0; size],
                pending: Some(value),
            },
        }
    }

    /// Update the pending value within an event.
    ///
    /// Returns a description of the expected value if `value` is incompatible.
    fn update(&mut self, value: Loggable) -> Result<(), String> {
        match (self, value) {
            (Self::Nothing, Loggable::Nothing) => {}
            (Self::ScalarMean { pending, .. }, Loggable::Scalar(x)) => *pending = Some(x),
            (Self::IndexDistribution { counts, pending }, Loggable::IndexSample { value, size })
                if counts.len() == size && value < size =>
            {
                *pending = Some(value)
            }
            (Self::Nothing, _) => return Err("Nothing".into()),
            (Self::ScalarMean { .. }, _) => return Err("Scalar".into()),
            (Self::IndexDistribution { counts, .. }, _) => {
                return Err(format!("IndexSample{{size: {}}}", counts.len()))
            }
        }
        Ok(())
    }

    /// Commit the pending value into the aggregate.
    fn commit(&mut self) {
        match self {
            Self::Nothing => {}
            Self::ScalarMean {
                sum,
                count,
                pending,
            } => {
                if let Some(x) = pending.take() {
                    *sum += x;
                    *count += 1;
                }
            }
            Self::IndexDistribution { counts, pending } => {
                if let Some(value) = pending.take() {
                    if let Some(c) = counts.get_mut(value) {
                        *c += 1;
                    }
                }
            }
        }
    }

    /// Clear the committed values (but not the pending values)
    fn clear(&mut self) {
        match self {
            Self::Nothing => {}
            Self::ScalarMean { sum, count, .. } => {
                *sum = 0.0;
                *count = 0;
            }
            Self::IndexDistribution { counts, .. } => counts.iter_mut().for_each(|c| *c = 0),
        }
    }
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Nothing => write!(f, "Nothing"),
            Self::ScalarMean { sum, count, .. } => {
                if *count == 0 {
                    write!(f, "None")
                } else {
                    write!(f, "{:.3}", sum / *count as f64)
                }
            }
            Self::IndexDistribution { counts, .. } => {
                let total: u64 = counts.iter().sum();
                if total == 0 {
                    return write!(f, "None");
                }
                write!(f, "[")?;
                for (i, c) in counts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:.3}", *c as f64 / total as f64)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn logger() -> CLILogger {
        Paint::disable();
        CLILogger::new(Duration::from_secs(3600))
    }

    #[rstest]
    fn scalar_mean(logger: CLILogger) {
        let mut logger = logger;
        for x in [1.0, 2.0, 6.0] {
            logger.log(Event::Episode, "reward", x.into()).unwrap();
            logger.done(Event::Episode);
        }
        let summary = logger.summary();
        assert!(summary.contains("Episodes 0 - 2"));
        assert!(summary.contains("3.000"));
    }

    #[rstest]
    fn last_value_in_event_wins(logger: CLILogger) {
        let mut logger = logger;
        logger.log(Event::Step, "reward", 1.0.into()).unwrap();
        logger.log(Event::Step, "reward", 5.0.into()).unwrap();
        logger.done(Event::Step);
        assert!(logger.summary().contains("5.000"));
    }

    #[rstest]
    fn index_distribution(logger: CLILogger) {
        let mut logger = logger;
        for value in [0, 1, 1, 1] {
            logger
                .log(Event::Step, "action", Loggable::IndexSample { value, size: 2 })
                .unwrap();
            logger.done(Event::Step);
        }
        assert!(logger.summary().contains("[0.250, 0.750]"));
    }

    #[rstest]
    fn incompatible_value(logger: CLILogger) {
        let mut logger = logger;
        logger.log(Event::Step, "reward", 1.0.into()).unwrap();
        let err = logger
            .log(Event::Step, "reward", Loggable::Nothing)
            .unwrap_err();
        assert_eq!(
            err,
            LogError::new("reward", Loggable::Nothing, "Scalar".into())
        );
    }

    #[rstest]
    fn index_size_mismatch(logger: CLILogger) {
        let mut logger = logger;
        logger
            .log(Event::Step, "action", Loggable::IndexSample { value: 0, size: 2 })
            .unwrap();
        assert!(logger
            .log(Event::Step, "action", Loggable::IndexSample { value: 0, size: 3 })
            .is_err());
    }

    #[rstest]
    fn display_clears_summary(logger: CLILogger) {
        let mut logger = logger;
        logger.log(Event::Episode, "length", 3.0.into()).unwrap();
        logger.done(Event::Episode);
        logger.display();
        assert!(logger.summary().is_empty());
        logger.log(Event::Episode, "length", 5.0.into()).unwrap();
        logger.done(Event::Episode);
        assert!(logger.summary().contains("Episodes 1 - 1"));
    }
}
