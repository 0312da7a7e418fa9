use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// Marker that opens each recommendation segment.
pub const RECOMMENDATION_DELIMITER: &str = "--";
/// Separates the listing id from the explanation inside a segment.
pub const FIELD_SEPARATOR: char = '/';
/// Literal reply meaning the model found no listing that fits.
pub const REFUSAL_SENTINEL: &str = "False";

/// A listing id and explanation read from model text, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub identifier: u64,
    pub explanation: String,
}

/// True when the whole reply is the refusal sentinel.
pub fn is_refusal(text: &str) -> bool {
    text.trim() == REFUSAL_SENTINEL
}

/// Read the first recommendation out of a model reply.
///
/// Only the first `--` segment is consumed. Within it, the first `/` splits
/// the id from the explanation, so the explanation may contain further
/// slashes.
pub fn parse_response(text: &str) -> Result<Candidate, FormatError> {
    let mut segments = text.split(RECOMMENDATION_DELIMITER);
    // Whatever precedes the first delimiter is preamble.
    segments.next();
    let segment = segments.next().ok_or(FormatError::MissingDelimiter)?;

    let (id_text, explanation) = segment
        .split_once(FIELD_SEPARATOR)
        .ok_or_else(|| FormatError::MissingSeparator(segment.trim().to_string()))?;

    let id_text = id_text.trim();
    if id_text.is_empty() {
        return Err(FormatError::EmptyIdentifier);
    }

    let explanation = explanation.trim();
    if explanation.is_empty() {
        return Err(FormatError::EmptyExplanation(id_text.to_string()));
    }

    let identifier = id_text
        .parse::<u64>()
        .map_err(|source| FormatError::InvalidIdentifier {
            text: id_text.to_string(),
            source,
        })?;

    Ok(Candidate {
        identifier,
        explanation: explanation.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_well_formed_recommendation() {
        let candidate = parse_response("-- 123456/it is great").unwrap();
        assert_eq!(candidate.identifier, 123456);
        assert_eq!(candidate.explanation, "it is great");
    }

    #[test]
    fn test_only_first_separator_splits() {
        let candidate = parse_response("-- 5/cheap / near beach").unwrap();
        assert_eq!(candidate.identifier, 5);
        assert_eq!(candidate.explanation, "cheap / near beach");
    }

    #[test]
    fn test_only_first_recommendation_is_consumed() {
        let text = "Here are my picks:\n-- 11/close to the old town\n-- 22/cheapest option";
        let candidate = parse_response(text).unwrap();
        assert_eq!(candidate.identifier, 11);
        assert_eq!(candidate.explanation, "close to the old town");
    }

    #[test]
    fn test_spaces_around_id_are_tolerated() {
        let candidate = parse_response("--  987 / I recommend it because it sleeps four").unwrap();
        assert_eq!(candidate.identifier, 987);
        assert_eq!(candidate.explanation, "I recommend it because it sleeps four");
    }

    #[test]
    fn test_missing_delimiter() {
        assert_eq!(
            parse_response("garbage with no delimiter"),
            Err(FormatError::MissingDelimiter)
        );
        assert_eq!(parse_response(""), Err(FormatError::MissingDelimiter));
        assert_eq!(parse_response("False"), Err(FormatError::MissingDelimiter));
    }

    #[test]
    fn test_missing_separator() {
        assert!(matches!(
            parse_response("-- 123456 it is great"),
            Err(FormatError::MissingSeparator(_))
        ));
        assert!(matches!(
            parse_response("--"),
            Err(FormatError::MissingSeparator(_))
        ));
    }

    #[test]
    fn test_empty_parts() {
        assert_eq!(
            parse_response("-- /nice place"),
            Err(FormatError::EmptyIdentifier)
        );
        assert_eq!(
            parse_response("-- 42/   "),
            Err(FormatError::EmptyExplanation("42".to_string()))
        );
    }

    #[test]
    fn test_non_numeric_id_is_reported() {
        match parse_response("-- abc/lovely flat") {
            Err(FormatError::InvalidIdentifier { text, .. }) => assert_eq!(text, "abc"),
            other => panic!("expected InvalidIdentifier, got {:?}", other),
        }
    }

    #[test]
    fn test_refusal_detection() {
        assert!(is_refusal("False"));
        assert!(is_refusal("False\n"));
        assert!(!is_refusal("false"));
        assert!(!is_refusal("-- 1/False"));
    }
}
