//! UTC datetime utilities without timezone dependencies.
//!
//! Provides a lightweight `DateTimeUtc` struct for the timestamps that
//! object store request signing needs.
//!
//! # Examples
//!
//! ```ignore
//! let dt = DateTimeUtc::from_unix(1_440_938_160);
//! assert_eq!(dt.to_amz_datetime(), "20150830T123600Z");
//! assert_eq!(dt.to_amz_date(), "20150830");
//! ```

use std::time::SystemTime;

const SECS_PER_DAY: u64 = 86_400;

/// UTC datetime without timezone complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeUtc {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTimeUtc {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::from_unix(secs)
    }

    /// Convert seconds since the Unix epoch to a calendar datetime.
    #[allow(clippy::cast_possible_truncation)] // All components are range-bounded
    pub fn from_unix(secs: u64) -> Self {
        let days = secs / SECS_PER_DAY;
        let rem = secs % SECS_PER_DAY;

        let (year, month, day) = civil_from_days(days);

        Self::new(
            year,
            month,
            day,
            (rem / 3600) as u8,
            ((rem / 60) % 60) as u8,
            (rem % 60) as u8,
        )
    }

    /// Format as the compact ISO 8601 basic form used by `x-amz-date`.
    ///
    /// Returns: `YYYYMMDDTHHMMSSZ`
    pub fn to_amz_datetime(self) -> String {
        format!(
            "{:04}{:02}{:02}T{:02}{:02}{:02}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }

    /// Format the date part used in a SigV4 credential scope.
    ///
    /// Returns: `YYYYMMDD`
    pub fn to_amz_date(self) -> String {
        format!("{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

/// Days since 1970-01-01 to (year, month, day) in the proleptic Gregorian calendar.
#[allow(clippy::cast_possible_truncation)]
const fn civil_from_days(days: u64) -> (u16, u8, u8) {
    // Shift epoch to 0000-03-01 so leap days fall at the end of each cycle
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };

    (year as u16, month as u8, day as u8)
}
