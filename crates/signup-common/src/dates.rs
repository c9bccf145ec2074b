//! Date and birthday input patterns
//!
//! Administrators pick one of 18 date patterns and one of 6 birthday
//! patterns. Patterns are stored by index; the index layout is fixed.
//!
//! ```text
//! date      0-8:  dd/mm/yyyy dd-mm-yyyy dd.mm.yyyy
//!                 mm/dd/yyyy mm-dd-yyyy mm.dd.yyyy
//!                 yyyy/mm/dd yyyy-mm-dd yyyy.mm.dd
//! date     9-17:  the same orderings with a two-digit year
//! birthday  0-5:  dd/mm dd-mm dd.mm mm/dd mm-dd mm.dd
//! ```

use crate::error::DomainError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Component separator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Separator {
    /// `/`
    Slash,
    /// `-`
    Dash,
    /// `.`
    Dot,
}

impl Separator {
    const ALL: [Separator; 3] = [Separator::Slash, Separator::Dash, Separator::Dot];

    /// Separator character
    pub const fn as_char(&self) -> char {
        match self {
            Self::Slash => '/',
            Self::Dash => '-',
            Self::Dot => '.',
        }
    }
}

/// Component ordering of a full date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateOrder {
    /// Day, month, year
    DayMonthYear,
    /// Month, day, year
    MonthDayYear,
    /// Year, month, day
    YearMonthDay,
}

impl DateOrder {
    const ALL: [DateOrder; 3] = [
        DateOrder::DayMonthYear,
        DateOrder::MonthDayYear,
        DateOrder::YearMonthDay,
    ];
}

/// Administrator-selected date pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DateFormat {
    order: DateOrder,
    separator: Separator,
    long_year: bool,
}

impl DateFormat {
    /// Number of selectable patterns
    pub const COUNT: u8 = 18;

    /// Pattern at stored index
    pub fn from_index(index: u8) -> Result<Self, DomainError> {
        if index >= Self::COUNT {
            return Err(DomainError::UnknownDateFormat(index));
        }
        let within = (index % 9) as usize;
        Ok(Self {
            order: DateOrder::ALL[within / 3],
            separator: Separator::ALL[within % 3],
            long_year: index < 9,
        })
    }

    /// Stored index
    pub fn index(&self) -> u8 {
        let order = DateOrder::ALL.iter().position(|o| *o == self.order).unwrap_or(0) as u8;
        let sep = Separator::ALL.iter().position(|s| *s == self.separator).unwrap_or(0) as u8;
        let base = if self.long_year { 0 } else { 9 };
        base + order * 3 + sep
    }

    /// Component ordering
    pub fn order(&self) -> DateOrder {
        self.order
    }

    /// Separator
    pub fn separator(&self) -> Separator {
        self.separator
    }

    /// strftime-style pattern, e.g. `%d/%m/%Y`
    pub fn strftime(&self) -> String {
        let year = if self.long_year { "%Y" } else { "%y" };
        self.join(["%d", "%m", year])
    }

    /// Placeholder shown to visitors, e.g. `dd/mm/yyyy`
    pub fn placeholder(&self) -> String {
        let year = if self.long_year { "yyyy" } else { "yy" };
        self.join(["dd", "mm", year])
    }

    /// Input mask, e.g. `99/99/9999`
    pub fn mask(&self) -> String {
        let year = if self.long_year { "9999" } else { "99" };
        self.join(["99", "99", year])
    }

    /// Parse visitor input
    ///
    /// Long-year patterns need all four year digits.
    pub fn parse(&self, input: &str) -> Option<NaiveDate> {
        let input = input.trim();
        if self.long_year && !self.has_full_year(input) {
            return None;
        }
        NaiveDate::parse_from_str(input, &self.strftime()).ok()
    }

    /// Parse visitor input and render it as `YYYY-MM-DD`
    pub fn normalize(&self, input: &str) -> Option<String> {
        self.parse(input).map(|d| d.format("%Y-%m-%d").to_string())
    }

    fn has_full_year(&self, input: &str) -> bool {
        let mut parts = input.split(self.separator.as_char());
        let year = match self.order {
            DateOrder::YearMonthDay => parts.next(),
            DateOrder::DayMonthYear | DateOrder::MonthDayYear => parts.nth(2),
        };
        year.is_some_and(|y| y.len() == 4 && y.bytes().all(|b| b.is_ascii_digit()))
    }

    fn join(&self, [day, month, year]: [&str; 3]) -> String {
        let parts = match self.order {
            DateOrder::DayMonthYear => [day, month, year],
            DateOrder::MonthDayYear => [month, day, year],
            DateOrder::YearMonthDay => [year, month, day],
        };
        parts.join(&self.separator.as_char().to_string())
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self {
            order: DateOrder::DayMonthYear,
            separator: Separator::Slash,
            long_year: true,
        }
    }
}

impl TryFrom<u8> for DateFormat {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value)
    }
}

impl From<DateFormat> for u8 {
    fn from(format: DateFormat) -> Self {
        format.index()
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.placeholder())
    }
}

/// Administrator-selected birthday pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BirthdayFormat {
    month_first: bool,
    separator: Separator,
}

impl BirthdayFormat {
    /// Number of selectable patterns
    pub const COUNT: u8 = 6;

    /// Pattern at stored index
    pub fn from_index(index: u8) -> Result<Self, DomainError> {
        if index >= Self::COUNT {
            return Err(DomainError::UnknownBirthdayFormat(index));
        }
        Ok(Self {
            month_first: index >= 3,
            separator: Separator::ALL[(index % 3) as usize],
        })
    }

    /// Stored index
    pub fn index(&self) -> u8 {
        let sep = Separator::ALL.iter().position(|s| *s == self.separator).unwrap_or(0) as u8;
        if self.month_first { 3 + sep } else { sep }
    }

    /// Whether month comes before day
    pub fn month_first(&self) -> bool {
        self.month_first
    }

    /// Separator
    pub fn separator(&self) -> Separator {
        self.separator
    }

    /// strftime-style pattern, e.g. `%m-%d`
    pub fn strftime(&self) -> String {
        self.join("%d", "%m")
    }

    /// Placeholder shown to visitors, e.g. `mm-dd`
    pub fn placeholder(&self) -> String {
        self.join("dd", "mm")
    }

    /// Input mask
    pub fn mask(&self) -> String {
        self.join("99", "99")
    }

    /// Normalize visitor input to `MM/DD`.
    ///
    /// Input must be exactly five characters: two digits, the configured
    /// separator, two digits. Day and month ranges are not checked.
    pub fn normalize(&self, input: &str) -> Option<String> {
        if input.len() != 5 {
            return None;
        }
        let (first, second) = input.split_once(self.separator.as_char())?;
        let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
        if !two_digits(first) || !two_digits(second) {
            return None;
        }
        let (month, day) = if self.month_first { (first, second) } else { (second, first) };
        Some(format!("{}/{}", month, day))
    }

    fn join(&self, day: &str, month: &str) -> String {
        let sep = self.separator.as_char();
        if self.month_first {
            format!("{}{}{}", month, sep, day)
        } else {
            format!("{}{}{}", day, sep, month)
        }
    }
}

impl Default for BirthdayFormat {
    fn default() -> Self {
        Self {
            month_first: false,
            separator: Separator::Slash,
        }
    }
}

impl TryFrom<u8> for BirthdayFormat {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value)
    }
}

impl From<BirthdayFormat> for u8 {
    fn from(format: BirthdayFormat) -> Self {
        format.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_index_layout() {
        let expected = [
            "dd/mm/yyyy", "dd-mm-yyyy", "dd.mm.yyyy",
            "mm/dd/yyyy", "mm-dd-yyyy", "mm.dd.yyyy",
            "yyyy/mm/dd", "yyyy-mm-dd", "yyyy.mm.dd",
            "dd/mm/yy", "dd-mm-yy", "dd.mm.yy",
            "mm/dd/yy", "mm-dd-yy", "mm.dd.yy",
            "yy/mm/dd", "yy-mm-dd", "yy.mm.dd",
        ];
        for (i, placeholder) in expected.iter().enumerate() {
            let format = DateFormat::from_index(i as u8).unwrap();
            assert_eq!(&format.placeholder(), placeholder);
            assert_eq!(format.index(), i as u8);
        }
        assert!(DateFormat::from_index(18).is_err());
    }

    #[test]
    fn test_date_strftime_and_mask() {
        let format = DateFormat::from_index(4).unwrap();
        assert_eq!(format.strftime(), "%m-%d-%Y");
        assert_eq!(format.mask(), "99-99-9999");
    }

    #[test]
    fn test_date_normalize() {
        let dmy = DateFormat::from_index(0).unwrap();
        assert_eq!(dmy.normalize("25/03/2024").as_deref(), Some("2024-03-25"));
        assert_eq!(dmy.normalize("5/3/2024").as_deref(), Some("2024-03-05"));
        assert_eq!(dmy.normalize("2024-03-25"), None);
        assert_eq!(dmy.normalize("31/02/2024"), None);
        assert_eq!(dmy.normalize("25/03/24"), None);
        assert_eq!(dmy.normalize("25/03/0"), None);
        assert_eq!(dmy.normalize(" 25/03/2024 ").as_deref(), Some("2024-03-25"));

        let ymd = DateFormat::from_index(7).unwrap();
        assert_eq!(ymd.normalize("2024-03-25").as_deref(), Some("2024-03-25"));
        assert_eq!(ymd.normalize("24-03-25"), None);

        let ymd_short = DateFormat::from_index(16).unwrap();
        assert_eq!(ymd_short.normalize("24-03-25").as_deref(), Some("2024-03-25"));
        assert_eq!(ymd_short.normalize("85-12-01").as_deref(), Some("1985-12-01"));
    }

    #[test]
    fn test_birthday_index_layout() {
        let expected = ["dd/mm", "dd-mm", "dd.mm", "mm/dd", "mm-dd", "mm.dd"];
        for (i, placeholder) in expected.iter().enumerate() {
            let format = BirthdayFormat::from_index(i as u8).unwrap();
            assert_eq!(&format.placeholder(), placeholder);
            assert_eq!(format.index(), i as u8);
        }
        assert!(BirthdayFormat::from_index(6).is_err());
    }

    #[test]
    fn test_birthday_normalize() {
        let mm_dd = BirthdayFormat::from_index(4).unwrap();
        let dd_mm = BirthdayFormat::from_index(1).unwrap();

        assert_eq!(mm_dd.normalize("03-25").as_deref(), Some("03/25"));
        assert_eq!(dd_mm.normalize("25-03").as_deref(), Some("03/25"));

        assert_eq!(mm_dd.normalize("3-25"), None);
        assert_eq!(mm_dd.normalize("03/25"), None);
        assert_eq!(mm_dd.normalize("ab-cd"), None);
    }
}
