use crate::models::{DocumentFormat, MrzRecord};
use crate::utils::{MrzError, Result};
use crate::validation::check_digit;
use crate::validation::format::FormatMatch;
use log::debug;

/// Position in the TD1 document number where a read `0` is taken as `O`.
const TD1_DOCUMENT_NUMBER_FIX_POSITION: usize = 3;

pub struct MrzValidator;

impl MrzValidator {
    /// Slices the checked fields out of matched lines and verifies every
    /// check digit. A single failing field rejects the whole record.
    pub fn validate(found: &FormatMatch, verify_composite: bool) -> Result<MrzRecord> {
        let width = found.format.mrz_chars_per_line();
        if found.lines.len() != found.format.mrz_lines()
            || found
                .lines
                .iter()
                .any(|line| line.len() != width || !line.is_ascii())
        {
            return Err(MrzError::MalformedField(format!(
                "{} needs {} ASCII lines of {} characters",
                found.format,
                found.format.mrz_lines(),
                width
            )));
        }

        let record = match found.format {
            DocumentFormat::TD1 => Self::validate_td1(&found.lines, verify_composite)?,
            DocumentFormat::TD3 => Self::validate_td3(&found.lines, verify_composite)?,
        };
        debug!(
            "Accepted {} MRZ for document {} (marker {:?})",
            record.format, record.document_number, found.marker_used
        );
        Ok(record)
    }

    fn validate_td1(lines: &[String], verify_composite: bool) -> Result<MrzRecord> {
        let (line1, line2, line3) = (&lines[0], &lines[1], &lines[2]);

        let document_number = correct_td1_document_number(&line1[5..14]);
        check_digit::verify("document_number", &document_number, char_at(line1, 14))?;
        check_digit::verify("birth_date", &line2[0..6], char_at(line2, 6))?;
        check_digit::verify("expiry_date", &line2[8..14], char_at(line2, 14))?;

        if verify_composite {
            let composite = format!(
                "{}{}{}{}{}",
                document_number,
                &line1[14..30],
                &line2[0..7],
                &line2[8..15],
                &line2[18..29]
            );
            check_digit::verify("composite", &composite, char_at(line2, 29))?;
        }

        let (surname, given_names) = parse_name(line3);
        Ok(MrzRecord {
            format: DocumentFormat::TD1,
            document_code: trim_filler(&line1[0..2]),
            issuing_state: trim_filler(&line1[2..5]),
            document_number,
            birth_date: line2[0..6].to_string(),
            expiry_date: line2[8..14].to_string(),
            sex: line2[7..8].to_string(),
            nationality: trim_filler(&line2[15..18]),
            surname,
            given_names,
            optional_data: optional(&line1[15..30]),
            raw_lines: lines.to_vec(),
        })
    }

    fn validate_td3(lines: &[String], verify_composite: bool) -> Result<MrzRecord> {
        let (line1, line2) = (&lines[0], &lines[1]);

        let document_number = &line2[0..9];
        check_digit::verify("document_number", document_number, char_at(line2, 9))?;
        check_digit::verify("birth_date", &line2[13..19], char_at(line2, 19))?;
        check_digit::verify("expiry_date", &line2[21..27], char_at(line2, 27))?;

        if verify_composite {
            let personal_number = &line2[28..42];
            let personal_check = char_at(line2, 42);
            let blank = personal_number.chars().all(|c| c == '<');
            if !(blank && (personal_check == '<' || personal_check == '0')) {
                check_digit::verify("personal_number", personal_number, personal_check)?;
            }
            let composite = format!("{}{}{}", &line2[0..10], &line2[13..20], &line2[21..43]);
            check_digit::verify("composite", &composite, char_at(line2, 43))?;
        }

        let (surname, given_names) = parse_name(&line1[5..44]);
        Ok(MrzRecord {
            format: DocumentFormat::TD3,
            document_code: trim_filler(&line1[0..2]),
            issuing_state: trim_filler(&line1[2..5]),
            document_number: document_number.to_string(),
            birth_date: line2[13..19].to_string(),
            expiry_date: line2[21..27].to_string(),
            sex: line2[20..21].to_string(),
            nationality: trim_filler(&line2[10..13]),
            surname,
            given_names,
            optional_data: optional(&line2[28..42]),
            raw_lines: lines.to_vec(),
        })
    }
}

/// TD1 cards of this family print a letter `O` in the fourth position that
/// OCR reads as a zero. Only that position is rewritten.
pub fn correct_td1_document_number(number: &str) -> String {
    let pos = TD1_DOCUMENT_NUMBER_FIX_POSITION;
    if number.get(pos..pos + 1) == Some("0") {
        format!("{}O{}", &number[..pos], &number[pos + 1..])
    } else {
        number.to_string()
    }
}

// Lines reaching this module are grammar-checked ASCII of fixed width.
fn char_at(line: &str, index: usize) -> char {
    line.as_bytes()[index] as char
}

fn trim_filler(field: &str) -> String {
    field.trim_matches('<').to_string()
}

fn optional(field: &str) -> Option<String> {
    let value = trim_filler(field);
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Splits an MRZ name field into surname and given names.
fn parse_name(field: &str) -> (String, String) {
    let field = field.trim_end_matches('<');
    let (surname, given) = field.split_once("<<").unwrap_or((field, ""));
    let words = |part: &str| {
        part.split('<')
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    };
    (words(surname), words(given))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn td1_match(lines: [&str; 3]) -> FormatMatch {
        FormatMatch {
            format: DocumentFormat::TD1,
            marker_used: Some("I<".to_string()),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    fn td3_match(lines: [&str; 2]) -> FormatMatch {
        FormatMatch {
            format: DocumentFormat::TD3,
            marker_used: Some("P<".to_string()),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    const TD1: [&str; 3] = [
        "I<UTOD231458907<<<<<<<<<<<<<<<",
        "7408122F1204159UTO<<<<<<<<<<<6",
        "ERIKSSON<<ANNA<MARIA<<<<<<<<<<",
    ];
    const TD3: [&str; 2] = [
        "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<",
        "L898902C36UTO7408122F1204159ZE184226B<<<<<10",
    ];

    #[test]
    fn test_td1_record_fields() {
        let record = MrzValidator::validate(&td1_match(TD1), true).unwrap();
        assert_eq!(record.document_number, "D23145890");
        assert_eq!(record.birth_date, "740812");
        assert_eq!(record.expiry_date, "120415");
        assert_eq!(record.issuing_state, "UTO");
        assert_eq!(record.document_code, "I");
        assert_eq!(record.sex, "F");
        assert_eq!(record.surname, "ERIKSSON");
        assert_eq!(record.given_names, "ANNA MARIA");
        assert_eq!(record.optional_data, None);
        assert_eq!(record.mrz_string(), TD1.concat());
    }

    #[test]
    fn test_td3_record_fields() {
        let record = MrzValidator::validate(&td3_match(TD3), true).unwrap();
        assert_eq!(record.format, DocumentFormat::TD3);
        assert_eq!(record.document_number, "L898902C3");
        assert_eq!(record.birth_date, "740812");
        assert_eq!(record.expiry_date, "120415");
        assert_eq!(record.nationality, "UTO");
        assert_eq!(record.optional_data.as_deref(), Some("ZE184226B"));
        assert_eq!(record.raw_lines, TD3.to_vec());
    }

    #[test]
    fn test_td3_any_flipped_check_digit_rejects() {
        for pos in [9usize, 19, 27] {
            let mut line2 = TD3[1].to_string();
            let digit = line2.as_bytes()[pos] - b'0';
            let flipped = char::from(b'0' + (digit + 1) % 10);
            line2.replace_range(pos..pos + 1, &flipped.to_string());
            let result = MrzValidator::validate(&td3_match([TD3[0], &line2]), false);
            assert!(
                matches!(result, Err(MrzError::ChecksumMismatch { .. })),
                "flip at {pos} accepted"
            );
        }
    }

    #[test]
    fn test_composite_only_checked_when_enabled() {
        let line2 = "L898902C36UTO7408122F1204159ZE184226B<<<<<20";
        assert!(MrzValidator::validate(&td3_match([TD3[0], line2]), false).is_ok());
        assert!(matches!(
            MrzValidator::validate(&td3_match([TD3[0], line2]), true),
            Err(MrzError::ChecksumMismatch { field, .. }) if field == "personal_number"
        ));
    }

    #[test]
    fn test_td1_zero_read_as_letter_o() {
        // Check digit 6 is computed for ABCO12345; the OCR read a zero.
        let lines = [
            "I<UTOABC0123456<<<<<<<<<<<<<<<",
            TD1[1],
            TD1[2],
        ];
        let record = MrzValidator::validate(&td1_match(lines), false).unwrap();
        assert_eq!(record.document_number, "ABCO12345");
        assert_eq!(record.raw_lines[0], lines[0]);
    }

    #[test]
    fn test_short_lines_are_malformed() {
        let lines = ["I<UTOD231458907", TD1[1], TD1[2]];
        assert!(matches!(
            MrzValidator::validate(&td1_match(lines), false),
            Err(MrzError::MalformedField(_))
        ));
    }

    #[test]
    fn test_correction_is_position_specific() {
        assert_eq!(correct_td1_document_number("ABC012345"), "ABCO12345");
        assert_eq!(correct_td1_document_number("A0C112340"), "A0C112340");
        assert_eq!(correct_td1_document_number("AB"), "AB");
    }

    #[test]
    fn test_parse_name_single_component() {
        assert_eq!(
            parse_name("DOE<<<<<<<<"),
            ("DOE".to_string(), String::new())
        );
        assert_eq!(
            parse_name("VAN<DER<BERG<<JAN<<<"),
            ("VAN DER BERG".to_string(), "JAN".to_string())
        );
    }
}
