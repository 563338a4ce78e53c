mod calendar;
mod error;
mod limits;
mod pipeline;
mod visibility;
mod weeks;
#[cfg(test)]
mod tests;

pub use calendar::{
    days_until_sunday, end_of_day, local_date, parse_instant, resolve_local, start_of_day,
    weekday_index,
};
pub use error::FilterError;
pub use limits::{is_week_valid, DayAggregate, WeekCheck, WeekDistribution};
pub use pipeline::Filter;
pub use visibility::{is_visible, is_visible_with};
pub use weeks::{bookings_in, in_range, partition};
