//! Calendar quarters used for VAT and withholding returns.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a quarter/year selection is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// No quarter given where one is required.
    #[error("Debe especificar el trimestre")]
    MissingQuarter,

    /// Quarter or year is not an integer.
    #[error("Trimestre y año deben ser números")]
    NotANumber,

    /// Quarter outside 1..=4.
    #[error("Trimestre debe ser 1, 2, 3 o 4")]
    QuarterOutOfRange,

    /// Year outside 1..=9999.
    #[error("Año fuera de rango")]
    YearOutOfRange,
}

/// One of the four fixed three-month periods of a calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Quarter {
    /// January to March.
    Q1,
    /// April to June.
    Q2,
    /// July to September.
    Q3,
    /// October to December.
    Q4,
}

impl Quarter {
    /// All quarters in order.
    pub const ALL: [Self; 4] = [Self::Q1, Self::Q2, Self::Q3, Self::Q4];

    /// Quarter number, 1..=4.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Q1 => 1,
            Self::Q2 => 2,
            Self::Q3 => 3,
            Self::Q4 => 4,
        }
    }

    /// Quarter containing `date`.
    #[must_use]
    pub fn of_date(date: NaiveDate) -> Self {
        match date.month() {
            1..=3 => Self::Q1,
            4..=6 => Self::Q2,
            7..=9 => Self::Q3,
            _ => Self::Q4,
        }
    }

    const fn first_month(self) -> u32 {
        match self {
            Self::Q1 => 1,
            Self::Q2 => 4,
            Self::Q3 => 7,
            Self::Q4 => 10,
        }
    }

    // (month, day) of the last day; fixed regardless of leap years.
    const fn last_day(self) -> (u32, u32) {
        match self {
            Self::Q1 => (3, 31),
            Self::Q2 => (6, 30),
            Self::Q3 => (9, 30),
            Self::Q4 => (12, 31),
        }
    }
}

impl TryFrom<i32> for Quarter {
    type Error = PeriodError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Q1),
            2 => Ok(Self::Q2),
            3 => Ok(Self::Q3),
            4 => Ok(Self::Q4),
            _ => Err(PeriodError::QuarterOutOfRange),
        }
    }
}

impl From<Quarter> for i32 {
    fn from(quarter: Quarter) -> Self {
        Self::from(quarter.number())
    }
}

impl std::str::FromStr for Quarter {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: i32 = s.trim().parse().map_err(|_| PeriodError::NotANumber)?;
        Self::try_from(n)
    }
}

impl std::fmt::Display for Quarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

/// A quarter of a specific year, with its boundary dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiscalQuarter {
    quarter: Quarter,
    year: i32,
    start: NaiveDate,
    end: NaiveDate,
}

impl FiscalQuarter {
    /// Earliest supported year.
    pub const MIN_YEAR: i32 = 1;
    /// Latest supported year.
    pub const MAX_YEAR: i32 = 9999;

    /// Builds the quarter and resolves its boundaries.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError::YearOutOfRange` outside `MIN_YEAR..=MAX_YEAR`.
    pub fn new(quarter: Quarter, year: i32) -> Result<Self, PeriodError> {
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(PeriodError::YearOutOfRange);
        }

        let (end_month, end_day) = quarter.last_day();
        let start = NaiveDate::from_ymd_opt(year, quarter.first_month(), 1)
            .ok_or(PeriodError::YearOutOfRange)?;
        let end = NaiveDate::from_ymd_opt(year, end_month, end_day)
            .ok_or(PeriodError::YearOutOfRange)?;

        Ok(Self {
            quarter,
            year,
            start,
            end,
        })
    }

    /// Quarter containing `date`.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError::YearOutOfRange` for dates outside the supported years.
    pub fn of_date(date: NaiveDate) -> Result<Self, PeriodError> {
        Self::new(Quarter::of_date(date), date.year())
    }

    /// Parses the `trimestre` / `año` pair of a summary request.
    ///
    /// The quarter is mandatory; the year falls back to `current_year`. Both
    /// checks run before anything touches storage.
    ///
    /// # Errors
    ///
    /// Returns the `PeriodError` describing the first problem found.
    pub fn from_query(
        trimestre: Option<&str>,
        year: Option<&str>,
        current_year: i32,
    ) -> Result<Self, PeriodError> {
        let raw_quarter = trimestre
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(PeriodError::MissingQuarter)?;

        let quarter_number: i32 = raw_quarter.parse().map_err(|_| PeriodError::NotANumber)?;
        let year = match year {
            Some(raw) => raw.trim().parse().map_err(|_| PeriodError::NotANumber)?,
            None => current_year,
        };

        Self::new(Quarter::try_from(quarter_number)?, year)
    }

    /// The quarter.
    #[must_use]
    pub const fn quarter(&self) -> Quarter {
        self.quarter
    }

    /// The year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// First day, inclusive.
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start
    }

    /// Last day, inclusive.
    #[must_use]
    pub const fn end_date(&self) -> NaiveDate {
        self.end
    }

    /// Returns true if `date` falls inside this quarter.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl std::fmt::Display for FiscalQuarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.quarter, self.year)
    }
}

/// Optional `trimestre` / `año` filters of a list request.
///
/// Unlike [`FiscalQuarter::from_query`] neither value is required, and the
/// year is not defaulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodFilter {
    /// Quarter filter.
    pub quarter: Option<Quarter>,
    /// Year filter.
    pub year: Option<i32>,
}

impl PeriodFilter {
    /// Parses raw query values; empty strings count as absent.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError` for non-numeric values or a quarter outside 1..=4.
    pub fn parse(trimestre: Option<&str>, year: Option<&str>) -> Result<Self, PeriodError> {
        let quarter = match trimestre.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(raw.parse::<Quarter>()?),
            None => None,
        };
        let year = match year.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(raw.parse().map_err(|_| PeriodError::NotANumber)?),
            None => None,
        };

        Ok(Self { quarter, year })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    proptest! {
        #[test]
        fn prop_every_date_is_inside_its_quarter(days in 0i64..3_000_000) {
            let day = date(1, 1, 1) + chrono::Duration::days(days);
            prop_assume!(day.year() <= FiscalQuarter::MAX_YEAR);

            let fq = FiscalQuarter::of_date(day).unwrap();
            prop_assert!(fq.contains(day));
            prop_assert_eq!(fq.year(), day.year());
        }

        #[test]
        fn prop_quarters_tile_the_year(year in 1i32..=9999) {
            let quarters: Vec<FiscalQuarter> = Quarter::ALL
                .iter()
                .map(|q| FiscalQuarter::new(*q, year).unwrap())
                .collect();

            prop_assert_eq!(quarters[0].start_date(), date(year, 1, 1));
            prop_assert_eq!(quarters[3].end_date(), date(year, 12, 31));
            for pair in quarters.windows(2) {
                prop_assert_eq!(pair[0].end_date().succ_opt().unwrap(), pair[1].start_date());
            }
        }
    }

    #[rstest]
    #[case(Quarter::Q1, date(2024, 1, 1), date(2024, 3, 31))]
    #[case(Quarter::Q2, date(2024, 4, 1), date(2024, 6, 30))]
    #[case(Quarter::Q3, date(2024, 7, 1), date(2024, 9, 30))]
    #[case(Quarter::Q4, date(2024, 10, 1), date(2024, 12, 31))]
    fn test_boundaries_leap_year(
        #[case] quarter: Quarter,
        #[case] start: NaiveDate,
        #[case] end: NaiveDate,
    ) {
        let fq = FiscalQuarter::new(quarter, 2024).unwrap();
        assert_eq!(fq.start_date(), start);
        assert_eq!(fq.end_date(), end);
    }

    #[test]
    fn test_q1_ignores_february_29() {
        let leap = FiscalQuarter::new(Quarter::Q1, 2024).unwrap();
        let common = FiscalQuarter::new(Quarter::Q1, 2025).unwrap();
        assert!(leap.contains(date(2024, 2, 29)));
        assert_eq!(leap.end_date(), date(2024, 3, 31));
        assert_eq!(common.end_date(), date(2025, 3, 31));
    }

    #[rstest]
    #[case(Some("3"), Some("2025"), Ok((Quarter::Q3, 2025)))]
    #[case(Some(" 1 "), None, Ok((Quarter::Q1, 2030)))]
    #[case(None, Some("2025"), Err(PeriodError::MissingQuarter))]
    #[case(Some(""), Some("2025"), Err(PeriodError::MissingQuarter))]
    #[case(Some("tres"), Some("2025"), Err(PeriodError::NotANumber))]
    #[case(Some("3"), Some("dos mil"), Err(PeriodError::NotANumber))]
    #[case(Some("5"), Some("2025"), Err(PeriodError::QuarterOutOfRange))]
    #[case(Some("0"), None, Err(PeriodError::QuarterOutOfRange))]
    #[case(Some("2"), Some("10000"), Err(PeriodError::YearOutOfRange))]
    fn test_from_query(
        #[case] trimestre: Option<&str>,
        #[case] year: Option<&str>,
        #[case] expected: Result<(Quarter, i32), PeriodError>,
    ) {
        let result = FiscalQuarter::from_query(trimestre, year, 2030)
            .map(|fq| (fq.quarter(), fq.year()));
        assert_eq!(result, expected);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PeriodError::QuarterOutOfRange.to_string(),
            "Trimestre debe ser 1, 2, 3 o 4"
        );
        assert_eq!(
            PeriodError::MissingQuarter.to_string(),
            "Debe especificar el trimestre"
        );
    }

    #[test]
    fn test_period_filter() {
        assert_eq!(PeriodFilter::parse(None, Some("")), Ok(PeriodFilter::default()));
        assert_eq!(
            PeriodFilter::parse(Some("4"), Some("2025")),
            Ok(PeriodFilter {
                quarter: Some(Quarter::Q4),
                year: Some(2025)
            })
        );
        assert_eq!(
            PeriodFilter::parse(Some("x"), None),
            Err(PeriodError::NotANumber)
        );
    }

    #[test]
    fn test_display() {
        let fq = FiscalQuarter::new(Quarter::Q3, 2025).unwrap();
        assert_eq!(fq.to_string(), "Q3/2025");
    }
}
