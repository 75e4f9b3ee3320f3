pub mod mjd;

pub use mjd::{mjd_from_str, parse_utc, ModifiedJulianDate, SECONDS_PER_DAY};
