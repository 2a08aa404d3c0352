use crate::models::MrzRecord;
use crate::utils::{MrzError, Result};
use chrono::{Datelike, Local, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKind {
    Birth,
    Expiry,
}

pub struct ExpiryValidator;

impl ExpiryValidator {
    pub fn today() -> NaiveDate {
        Local::now().naive_local().date()
    }

    /// Parse an MRZ `YYMMDD` date.
    ///
    /// Birth years that would land after `today` fall in the previous
    /// century; expiry years are always 20YY.
    pub fn parse_mrz_date(yymmdd: &str, kind: DateKind, today: NaiveDate) -> Result<NaiveDate> {
        if yymmdd.len() != 6 || !yymmdd.chars().all(|c| c.is_ascii_digit()) {
            return Err(MrzError::MalformedField(format!(
                "date {:?} is not YYMMDD",
                yymmdd
            )));
        }

        let year = yymmdd[0..2].parse::<i32>().unwrap_or(0);
        let month = yymmdd[2..4].parse::<u32>().unwrap_or(0);
        let day = yymmdd[4..6].parse::<u32>().unwrap_or(0);

        let full_year = match kind {
            DateKind::Expiry => 2000 + year,
            DateKind::Birth if 2000 + year > today.year() => 1900 + year,
            DateKind::Birth => 2000 + year,
        };

        NaiveDate::from_ymd_opt(full_year, month, day).ok_or_else(|| {
            MrzError::MalformedField(format!("date {:?} is not a calendar date", yymmdd))
        })
    }

    pub fn birth_date(record: &MrzRecord, today: NaiveDate) -> Result<NaiveDate> {
        Self::parse_mrz_date(&record.birth_date, DateKind::Birth, today)
    }

    pub fn expiry_date(record: &MrzRecord) -> Result<NaiveDate> {
        // The expiry century does not depend on the reference day.
        Self::parse_mrz_date(&record.expiry_date, DateKind::Expiry, NaiveDate::MIN)
    }

    /// A document is valid through its expiry day.
    pub fn is_expired(record: &MrzRecord, today: NaiveDate) -> Result<bool> {
        Ok(Self::expiry_date(record)? < today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentFormat;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(birth: &str, expiry: &str) -> MrzRecord {
        MrzRecord {
            format: DocumentFormat::TD3,
            document_code: "P".to_string(),
            issuing_state: "UTO".to_string(),
            document_number: "L898902C3".to_string(),
            birth_date: birth.to_string(),
            expiry_date: expiry.to_string(),
            sex: "F".to_string(),
            nationality: "UTO".to_string(),
            surname: "ERIKSSON".to_string(),
            given_names: "ANNA MARIA".to_string(),
            optional_data: None,
            raw_lines: Vec::new(),
        }
    }

    #[test]
    fn test_birth_century_pivot() {
        let today = day(2026, 10, 16);
        assert_eq!(
            ExpiryValidator::parse_mrz_date("740812", DateKind::Birth, today).unwrap(),
            day(1974, 8, 12)
        );
        assert_eq!(
            ExpiryValidator::parse_mrz_date("150101", DateKind::Birth, today).unwrap(),
            day(2015, 1, 1)
        );
    }

    #[test]
    fn test_expiry_is_twenty_first_century() {
        assert_eq!(
            ExpiryValidator::expiry_date(&record("740812", "991231")).unwrap(),
            day(2099, 12, 31)
        );
    }

    #[test]
    fn test_is_expired() {
        let rec = record("740812", "120415");
        assert!(ExpiryValidator::is_expired(&rec, day(2012, 4, 16)).unwrap());
        assert!(!ExpiryValidator::is_expired(&rec, day(2012, 4, 15)).unwrap());
    }

    #[test]
    fn test_invalid_calendar_date() {
        let rec = record("741332", "120415");
        assert!(matches!(
            ExpiryValidator::birth_date(&rec, day(2026, 1, 1)),
            Err(MrzError::MalformedField(_))
        ));
    }
}
