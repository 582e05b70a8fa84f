use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::TimeSeriesLink;

/// One timestamped measurement.
pub type TimeSeriesPoint = (DateTime<Utc>, f64);

/// Port for an opened time-series file
pub trait TimeSeriesFile {
    /// Parameter names present in the file
    fn parameters(&self) -> Vec<String>;

    /// Location names present in the file
    fn locations(&self) -> Vec<String>;

    /// Series of `parameter` at `location` within the optional bounds,
    /// ordered by timestamp
    fn get_timeseries(
        &self,
        location: &str,
        parameter: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<TimeSeriesPoint>>;

    /// First timestamp in the file, if any
    fn dtstart(&self) -> Option<DateTime<Utc>>;
}

/// Port for opening the time-series file a dataset links to
pub trait TimeSeriesProvider {
    fn open(&self, link: &TimeSeriesLink) -> Result<Box<dyn TimeSeriesFile>>;
}
