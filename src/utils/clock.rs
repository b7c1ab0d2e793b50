use chrono::{DateTime, Local};

/// Represents an entity responsible for providing dates across application. This allows tests to
/// pin the moment a photo is captured.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync + 'static {
    fn time(&self) -> DateTime<Local>;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Local> {
        Local::now()
    }
}
