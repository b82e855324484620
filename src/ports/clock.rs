use chrono::NaiveDate;

#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    /// Current calendar date in local time
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}
