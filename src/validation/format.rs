use crate::models::DocumentFormat;
use crate::utils::{MrzError, Result};
use lazy_static::lazy_static;
use log::trace;
use regex::Regex;

lazy_static! {
    // Line grammars, anchored. The TD1 first line also admits the OCR-confused
    // document codes `1<` and `1K` that the marker search accepts.
    static ref TD1_LINE_1: Regex =
        Regex::new(r"^(?:[ACI][A-Z0-9<]|1[<K])[A-Z]{3}[A-Z0-9<]{25}$").unwrap();
    static ref TD1_LINE_2: Regex =
        Regex::new(r"^[0-9]{6}[0-9][MFX<][0-9]{6}[0-9][A-Z]{3}[A-Z0-9<]{11}[0-9]$").unwrap();
    static ref TD1_LINE_3: Regex = Regex::new(r"^[A-Z0-9<]{30}$").unwrap();
    static ref TD3_LINE_1: Regex = Regex::new(r"^P[A-Z0-9<][A-Z]{3}[A-Z0-9<]{39}$").unwrap();
    static ref TD3_LINE_2: Regex = Regex::new(
        r"^[A-Z0-9<]{9}[0-9][A-Z]{3}[0-9]{6}[0-9][MFX<][0-9]{6}[0-9][A-Z0-9<]{14}[0-9]{2}$"
    )
    .unwrap();

    // Whole-block grammars for text with no document marker.
    static ref TD1_BLOCK: Regex = Regex::new(concat!(
        r"(?:[ACI][A-Z0-9<]|1[<K])[A-Z]{3}[A-Z0-9<]{25}",
        r"[0-9]{6}[0-9][MFX<][0-9]{6}[0-9][A-Z]{3}[A-Z0-9<]{11}[0-9]",
        r"[A-Z0-9<]{30}"
    ))
    .unwrap();
    static ref TD3_BLOCK: Regex = Regex::new(concat!(
        r"P[A-Z0-9<][A-Z]{3}[A-Z0-9<]{39}",
        r"[A-Z0-9<]{9}[0-9][A-Z]{3}[0-9]{6}[0-9][MFX<][0-9]{6}[0-9][A-Z0-9<]{14}[0-9]{2}"
    ))
    .unwrap();
}

/// TD1 document-type markers, in the order they are tried.
pub const TD1_MARKERS: [&str; 4] = ["I<", "1<", "1K", "IK"];
pub const TD3_MARKERS: [&str; 1] = ["P<"];

/// Lines located in one frame's text, ready for field extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatMatch {
    pub format: DocumentFormat,
    /// `None` when the block was found by the anchorless grammar search.
    pub marker_used: Option<String>,
    pub lines: Vec<String>,
}

struct Marker {
    text: &'static str,
    pattern: Regex,
}

/// Locates TD1/TD3 MRZ blocks in normalized OCR text.
pub struct FormatMatcher {
    td1_markers: Vec<Marker>,
    td3_markers: Vec<Marker>,
}

impl FormatMatcher {
    /// `issuing_state` pins markers to one state code; otherwise any three
    /// letters after the marker are accepted.
    pub fn new(issuing_state: Option<&str>) -> Result<Self> {
        let state = match issuing_state {
            Some(code) => regex::escape(code),
            None => "[A-Z]{3}".to_string(),
        };
        Ok(FormatMatcher {
            td1_markers: Self::compile_markers(&TD1_MARKERS, &state)?,
            td3_markers: Self::compile_markers(&TD3_MARKERS, &state)?,
        })
    }

    fn compile_markers(markers: &[&'static str], state: &str) -> Result<Vec<Marker>> {
        markers
            .iter()
            .map(|&text| {
                let pattern = Regex::new(&format!("{}{}", regex::escape(text), state))
                    .map_err(|e| MrzError::Config(format!("invalid marker pattern: {}", e)))?;
                Ok(Marker { text, pattern })
            })
            .collect()
    }

    pub fn find(&self, text: &str, format: DocumentFormat) -> Result<FormatMatch> {
        let markers = match format {
            DocumentFormat::TD1 => &self.td1_markers,
            DocumentFormat::TD3 => &self.td3_markers,
        };
        let required = format.mrz_total_chars();
        let mut truncated: Option<MrzError> = None;
        let mut marker_seen = false;

        for marker in markers {
            for found in marker.pattern.find_iter(text) {
                marker_seen = true;
                let block = &text[found.start()..];
                let candidate = match block.get(..required) {
                    Some(candidate) => candidate,
                    None if block.len() < required => {
                        trace!(
                            "{} marker {} at {} leaves only {} characters",
                            format,
                            marker.text,
                            found.start(),
                            block.len()
                        );
                        truncated.get_or_insert(MrzError::TruncatedCandidate {
                            marker: marker.text.to_string(),
                            available: block.chars().count(),
                            required,
                        });
                        continue;
                    }
                    None => continue,
                };
                if let Some(lines) = split_lines(candidate, format) {
                    return Ok(FormatMatch {
                        format,
                        marker_used: Some(marker.text.to_string()),
                        lines,
                    });
                }
            }
        }

        // Marker patterns also fire inside names and optional data, so a
        // complete block anywhere in the text wins over a failed marker.
        let block = match format {
            DocumentFormat::TD1 => &*TD1_BLOCK,
            DocumentFormat::TD3 => &*TD3_BLOCK,
        };
        if let Some(lines) = block
            .find(text)
            .and_then(|m| split_lines(m.as_str(), format))
        {
            return Ok(FormatMatch {
                format,
                marker_used: None,
                lines,
            });
        }

        if let Some(err) = truncated {
            return Err(err);
        }
        if marker_seen {
            return Err(MrzError::NoMatch(format!(
                "{} marker found but the block does not satisfy the line grammar",
                format
            )));
        }
        Err(MrzError::NoMatch(format!("no {} block in text", format)))
    }
}

/// Splits a full-length block into lines and checks every line grammar.
fn split_lines(block: &str, format: DocumentFormat) -> Option<Vec<String>> {
    if !block.is_ascii() || block.len() != format.mrz_total_chars() {
        return None;
    }
    let width = format.mrz_chars_per_line();
    let lines: Vec<&str> = (0..format.mrz_lines())
        .map(|i| &block[i * width..(i + 1) * width])
        .collect();
    let grammars: Vec<&Regex> = match format {
        DocumentFormat::TD1 => vec![&*TD1_LINE_1, &*TD1_LINE_2, &*TD1_LINE_3],
        DocumentFormat::TD3 => vec![&*TD3_LINE_1, &*TD3_LINE_2],
    };
    if lines
        .iter()
        .zip(grammars.iter())
        .all(|(line, grammar)| grammar.is_match(line))
    {
        Some(lines.into_iter().map(str::to_string).collect())
    } else {
        None
    }
}
