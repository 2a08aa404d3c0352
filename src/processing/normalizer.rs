use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Tags as emitted by hOCR output: `<span class='ocrx_word' ...>`, `</p>`, `<br/>`.
    static ref MARKUP_TAG: Regex =
        Regex::new(r"</?[a-z][a-z0-9]*(?:\s[^<>]*)?/?>").unwrap();
    static ref ENTITY: Regex = Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,6});").unwrap();
}

/// Cleans raw OCR text before grammar matching. Total: never fails.
pub struct TextNormalizer;

impl TextNormalizer {
    /// Strips markup, decodes HTML entities and removes all whitespace.
    pub fn normalize(raw: &str) -> String {
        let text = if Self::looks_like_markup(raw) {
            MARKUP_TAG.replace_all(raw, " ").into_owned()
        } else {
            raw.to_string()
        };
        Self::decode_entities(&text)
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_control())
            .collect()
    }

    /// Keeps only MRZ symbols `A-Z`, `0-9` and `<`.
    pub fn restrict_to_alphabet(text: &str) -> String {
        text.chars()
            .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '<')
            .collect()
    }

    // MRZ text is uppercase, so a lowercase tag name means markup.
    fn looks_like_markup(text: &str) -> bool {
        text.contains("</") || MARKUP_TAG.is_match(text)
    }

    pub fn decode_entities(text: &str) -> String {
        ENTITY
            .replace_all(text, |caps: &regex::Captures| {
                let name = &caps[1];
                let decoded = match name {
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "amp" => Some('&'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    _ if name.starts_with("#x") || name.starts_with("#X") => {
                        u32::from_str_radix(&name[2..], 16).ok().and_then(char::from_u32)
                    }
                    _ if name.starts_with('#') => {
                        name[1..].parse::<u32>().ok().and_then(char::from_u32)
                    }
                    _ => None,
                };
                decoded
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_all_whitespace() {
        let raw = " I<UTOD231458907<<<<\n7408122F 1204159\tUTO\r\n";
        assert_eq!(
            TextNormalizer::normalize(raw),
            "I<UTOD231458907<<<<7408122F1204159UTO"
        );
    }

    #[test]
    fn test_decodes_escaped_filler() {
        assert_eq!(
            TextNormalizer::normalize("P&lt;UTO&#60;&#x3C;&amp;"),
            "P<UTO<<&"
        );
    }

    #[test]
    fn test_unknown_entity_is_kept() {
        assert_eq!(TextNormalizer::decode_entities("A&bogus;B"), "A&bogus;B");
    }

    #[test]
    fn test_strips_hocr_markup() {
        let raw = "<div class='ocr_page'><span class='ocrx_word' title='bbox 1 2 3 4'>I&lt;UTO</span>\n<span>D23145890</span></div>";
        assert_eq!(TextNormalizer::normalize(raw), "I<UTOD23145890");
    }

    #[test]
    fn test_plain_mrz_fillers_survive() {
        let raw = "P<UTOERIKSSON<<ANNA<MARIA<<<";
        assert_eq!(TextNormalizer::normalize(raw), raw);
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(TextNormalizer::normalize(""), "");
        assert_eq!(TextNormalizer::normalize(" \n\t "), "");
    }

    #[test]
    fn test_restrict_to_alphabet() {
        assert_eq!(
            TextNormalizer::restrict_to_alphabet("P<uto»ERIK-SSON<<"),
            "P<ERIKSSON<<"
        );
    }
}
