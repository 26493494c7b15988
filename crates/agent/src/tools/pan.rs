use async_trait::async_trait;
use glidedesk_core::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Tool;

/// Fields printed on an Indian PAN card. A field the scraper cannot find is
/// `None`, never guessed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanDetails {
    pub pan_number: Option<String>,
    pub name: Option<String>,
    pub father_name: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
}

impl PanDetails {
    pub fn is_empty(&self) -> bool {
        self.pan_number.is_none()
            && self.name.is_none()
            && self.father_name.is_none()
            && self.dob.is_none()
            && self.gender.is_none()
    }
}

/// Scrapes PAN card fields out of OCR text.
///
/// Works line by line: labeled values (`Name: ...`) win, then token patterns
/// (PAN number shape, DD/MM/YYYY, gender words), then card-layout heuristics
/// for the unlabeled name lines. Input order follows the printed card, where
/// the holder's name precedes the father's name.
pub fn extract_pan_details(text: &str) -> PanDetails {
    let mut details = PanDetails::default();
    let mut candidate_names: Vec<String> = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        // Labeled lines override anything inferred from layout. Father
        // labels are tested first since they also contain "name".
        if let Some(value) = labeled_value(line, "father") {
            details.father_name = Some(value);
            continue;
        }
        if let Some(value) = labeled_value(line, "name") {
            details.name = Some(value);
            continue;
        }

        for raw_token in line.split_whitespace() {
            let token = raw_token
                .trim_matches(|character: char| !character.is_ascii_alphanumeric() && character != '/');
            if details.pan_number.is_none() && is_pan_number(token) {
                details.pan_number = Some(token.to_string());
            } else if details.dob.is_none() && is_date_of_birth(token) {
                details.dob = Some(token.to_string());
            } else if details.gender.is_none() && is_gender(token) {
                details.gender = Some(token.to_ascii_uppercase());
            }
        }

        if is_candidate_name_line(line) {
            candidate_names.push(line.to_string());
        }
    }

    let mut remaining = candidate_names.into_iter();
    if details.name.is_none() {
        details.name = remaining.next();
    }
    if details.father_name.is_none() {
        details.father_name = remaining.next();
    }

    details
}

fn labeled_value(line: &str, label: &str) -> Option<String> {
    let lowered = line.to_ascii_lowercase();
    if !lowered.contains(label) {
        return None;
    }
    let (_, value) = line.split_once(':')?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// 5 letters, 4 digits, 1 letter — e.g. ABCDE1234F.
fn is_pan_number(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 10
        && bytes[..5].iter().all(u8::is_ascii_uppercase)
        && bytes[5..9].iter().all(u8::is_ascii_digit)
        && bytes[9].is_ascii_uppercase()
}

/// DD/MM/YYYY with a plausible day and month.
fn is_date_of_birth(token: &str) -> bool {
    let bytes = token.as_bytes();
    if bytes.len() != 10 || bytes[2] != b'/' || bytes[5] != b'/' {
        return false;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(index, byte)| matches!(index, 2 | 5) || byte.is_ascii_digit());
    if !digits_ok {
        return false;
    }

    let day: u32 = token[..2].parse().unwrap_or(0);
    let month: u32 = token[3..5].parse().unwrap_or(0);
    (1..=31).contains(&day) && (1..=12).contains(&month)
}

fn is_gender(token: &str) -> bool {
    matches!(token.to_ascii_uppercase().as_str(), "MALE" | "FEMALE" | "OTHER")
}

const NON_NAME_MARKERS: &[&str] = &[
    "income tax",
    "govt",
    "government",
    "india",
    "permanent account",
    "account number",
    "department",
    "signature",
    "date of birth",
];

fn is_candidate_name_line(line: &str) -> bool {
    let lowered = line.to_ascii_lowercase();
    if NON_NAME_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        return false;
    }
    if is_gender(line.trim()) {
        return false;
    }

    let printed_name_shape = line
        .chars()
        .all(|character| character.is_ascii_uppercase() || character == ' ' || character == '.');
    printed_name_shape && line.chars().any(|character| character.is_ascii_alphabetic())
}

/// Parses PAN fields out of already-detected text. Idempotent.
#[derive(Default)]
pub struct PanParseTool;

#[derive(Deserialize)]
struct PanParseArgs {
    text: String,
}

impl PanParseTool {
    pub fn parse(&self, text: &str) -> Result<PanDetails, ToolError> {
        if text.trim().len() < 10 {
            return Err(ToolError::invalid_argument(
                "text",
                "too short to contain valid PAN card details",
            ));
        }

        let details = extract_pan_details(text);
        if details.is_empty() {
            return Err(ToolError::ExtractionFailed {
                message: "no PAN card fields recognized".to_string(),
                raw_output: Some(text.to_string()),
            });
        }
        Ok(details)
    }
}

#[async_trait]
impl Tool for PanParseTool {
    fn name(&self) -> &'static str {
        "extract_pan"
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let args: PanParseArgs = serde_json::from_value(args)
            .map_err(|error| ToolError::invalid_argument("args", error.to_string()))?;
        let details = self.parse(&args.text)?;
        Ok(json!({"extracted_pan": details}))
    }
}

#[cfg(test)]
mod tests {
    use super::{extract_pan_details, is_date_of_birth, PanParseTool};
    use crate::tools::ocr::FIXTURE_CARD_TEXT;

    #[test]
    fn extracts_all_fields_from_card_layout() {
        let details = extract_pan_details(FIXTURE_CARD_TEXT);
        assert_eq!(details.pan_number.as_deref(), Some("ABCDE1234F"));
        assert_eq!(details.name.as_deref(), Some("RAVI KUMAR"));
        assert_eq!(details.father_name.as_deref(), Some("SURESH KUMAR"));
        assert_eq!(details.dob.as_deref(), Some("12/05/1985"));
        assert_eq!(details.gender.as_deref(), Some("MALE"));
    }

    #[test]
    fn labeled_lines_override_layout_heuristics() {
        let text = "Name: Priya Sharma\nFather's Name: Anand Sharma\nFGHIJ5678K\n23/11/1990\nFEMALE";
        let details = extract_pan_details(text);
        assert_eq!(details.name.as_deref(), Some("Priya Sharma"));
        assert_eq!(details.father_name.as_deref(), Some("Anand Sharma"));
        assert_eq!(details.pan_number.as_deref(), Some("FGHIJ5678K"));
        assert_eq!(details.gender.as_deref(), Some("FEMALE"));
    }

    #[test]
    fn missing_fields_stay_null() {
        let details = extract_pan_details("Permanent Account Number\nABCDE1234F");
        assert_eq!(details.pan_number.as_deref(), Some("ABCDE1234F"));
        assert_eq!(details.name, None);
        assert_eq!(details.father_name, None);
        assert_eq!(details.dob, None);
        assert_eq!(details.gender, None);
    }

    #[test]
    fn rejects_implausible_dates() {
        assert!(is_date_of_birth("12/05/1985"));
        assert!(!is_date_of_birth("99/99/9999"));
        assert!(!is_date_of_birth("12-05-1985"));
        assert!(!is_date_of_birth("2/5/1985"));
    }

    #[test]
    fn short_text_is_an_invalid_argument() {
        let error = PanParseTool.parse("abc").err().expect("error");
        assert_eq!(error.kind(), "invalid_argument");
    }

    #[test]
    fn unrecognizable_text_fails_with_raw_output_attached() {
        let raw = "lorem ipsum dolor sit amet, nothing card-like here";
        let error = PanParseTool.parse(raw).err().expect("error");
        assert_eq!(error.kind(), "extraction_failed");
        assert_eq!(error.as_wire_value()["raw_output"], raw);
    }
}
