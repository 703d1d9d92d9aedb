//! Response envelope and decoder.
//!
//! Every endpoint answers with the same top-level object holding up to three
//! arrays. Which ones are filled depends on the endpoint, so all of them
//! default to empty.
//!
//! The upstream API escapes apostrophes inside strings as `\'`, which is not
//! a legal JSON escape. `decode_envelope` rewrites every such sequence to a
//! bare `'` on the raw text before handing it to `serde_json`. The rewrite is
//! global and blind to context, so a genuine backslash followed by an
//! apostrophe is altered too.

use std::borrow::Cow;

use serde::Deserialize;

use crate::error::ApiError;
use crate::types::{null_as_default, Game, Run, Series};

/// Top-level shape of every response. Only the client sees this type.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Envelope {
    #[serde(deserialize_with = "null_as_default")]
    pub series: Vec<Series>,
    #[serde(deserialize_with = "null_as_default")]
    pub games: Vec<Game>,
    #[serde(deserialize_with = "null_as_default")]
    pub runs: Vec<Run>,
}

/// Replace every `\'` with `'`. Borrows when there is nothing to replace.
pub fn fix_escaped_apostrophes(raw: &str) -> Cow<'_, str> {
    if raw.contains("\\'") {
        Cow::Owned(raw.replace("\\'", "'"))
    } else {
        Cow::Borrowed(raw)
    }
}

/// Decode a raw response body into the envelope.
///
/// Invalid UTF-8 is replaced rather than rejected; anything that breaks the
/// JSON structure will still fail in `serde_json`.
pub(crate) fn decode_envelope(body: &[u8]) -> Result<Envelope, ApiError> {
    let text = String::from_utf8_lossy(body);
    let fixed = fix_escaped_apostrophes(&text);
    let envelope: Envelope = serde_json::from_str(&fixed)?;

    tracing::debug!(
        series = envelope.series.len(),
        games = envelope.games.len(),
        runs = envelope.runs.len(),
        "decoded response envelope"
    );

    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_replaces_every_occurrence() {
        let fixed = fix_escaped_apostrophes(r#"{"a":"Wily\'s \'Castle\'"}"#);
        assert_eq!(fixed, r#"{"a":"Wily's 'Castle'"}"#);
        assert!(!fixed.contains("\\'"));
    }

    #[test]
    fn fix_borrows_clean_input() {
        let fixed = fix_escaped_apostrophes(r#"{"a":"plain"}"#);
        assert!(matches!(fixed, Cow::Borrowed(_)));
    }

    #[test]
    fn fix_touches_literal_backslash_apostrophe_too() {
        // `\\'` is a valid escaped backslash followed by an apostrophe. The
        // rewrite still consumes the second backslash.
        let fixed = fix_escaped_apostrophes(r#""a\\'b""#);
        assert_eq!(fixed, r#""a\'b""#);
    }

    #[test]
    fn decode_escaped_apostrophe_in_names() {
        let body = br#"{"games":[{"id":1,"name":"Mega Man: Dr. Wily\'s Revenge"}]}"#;
        let envelope = decode_envelope(body).unwrap();
        assert_eq!(envelope.games.len(), 1);
        assert_eq!(envelope.games[0].name, "Mega Man: Dr. Wily's Revenge");
    }

    #[test]
    fn decode_without_quirk_fails_in_plain_serde() {
        let body = r#"{"games":[{"id":1,"name":"Wily\'s"}]}"#;
        assert!(serde_json::from_str::<Envelope>(body).is_err());
        assert!(decode_envelope(body.as_bytes()).is_ok());
    }

    #[test]
    fn decode_missing_and_null_collections_are_empty() {
        let envelope = decode_envelope(br#"{"series":null}"#).unwrap();
        assert!(envelope.series.is_empty());
        assert!(envelope.games.is_empty());
        assert!(envelope.runs.is_empty());

        let envelope = decode_envelope(b"{}").unwrap();
        assert!(envelope.runs.is_empty());
    }

    #[test]
    fn decode_empty_runs_is_not_an_error() {
        let envelope = decode_envelope(br#"{"runs":[]}"#).unwrap();
        assert!(envelope.runs.is_empty());
    }

    #[test]
    fn decode_ignores_unknown_keys() {
        let envelope =
            decode_envelope(br#"{"status":"ok","series":[{"id":2,"name":"X","extra":true}]}"#)
                .unwrap();
        assert_eq!(envelope.series[0].id, 2);
    }

    #[test]
    fn decode_truncated_payload_fails() {
        let err = decode_envelope(br#"{"runs":[{"id":1,"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn decode_wrong_field_type_fails() {
        let err = decode_envelope(br#"{"series":[{"id":"one","name":"X"}]}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn decode_html_error_page_fails() {
        let err = decode_envelope(b"<html><body>404 Not Found</body></html>").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
