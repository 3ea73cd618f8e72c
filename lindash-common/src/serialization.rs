use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{Error, Result};
use crate::result_set::ResultSet;

/// Wire format of query responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// JSON (what the broker HTTP API returns).
    #[default]
    Json,

    /// CBOR (compact binary, used for recorded fixtures).
    Cbor,
}

impl Format {
    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Cbor => "application/cbor",
        }
    }

    /// Resolve a format from a `Content-Type` header value.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next()?.trim();
        match essence {
            "application/json" | "text/json" => Some(Format::Json),
            "application/cbor" => Some(Format::Cbor),
            _ => None,
        }
    }
}

/// Encode a value to bytes using the specified format.
pub fn encode<T: Serialize>(value: &T, format: Format) -> Result<Vec<u8>> {
    match format {
        Format::Json => serde_json::to_vec(value).map_err(Error::from),
        Format::Cbor => {
            let mut buf = Vec::new();
            ciborium::into_writer(value, &mut buf)?;
            Ok(buf)
        }
    }
}

/// Decode bytes to a value using the specified format.
pub fn decode<T: DeserializeOwned>(data: &[u8], format: Format) -> Result<T> {
    match format {
        Format::Json => serde_json::from_slice(data).map_err(Error::from),
        Format::Cbor => ciborium::from_reader(data).map_err(Error::from),
    }
}

/// Guess the format of a payload.
///
/// JSON payloads start (after whitespace) with `{` or `[`; anything else is
/// treated as CBOR.
pub fn detect_format(data: &[u8]) -> Format {
    match data.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') | Some(b'[') => Format::Json,
        _ => Format::Cbor,
    }
}

/// Whether the payload's top-level value is an array.
fn is_list(data: &[u8], format: Format) -> bool {
    match format {
        Format::Json => data.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'['),
        // CBOR major type 4 is an array.
        Format::Cbor => data.first().is_some_and(|b| b >> 5 == 4),
    }
}

/// Decode a query response holding either one result set or a list of them.
///
/// Every decoded result set is validated before it is returned.
pub fn decode_result_sets(data: &[u8]) -> Result<Vec<ResultSet>> {
    let format = detect_format(data);
    let sets = if is_list(data, format) {
        decode::<Vec<ResultSet>>(data, format)?
    } else {
        vec![decode::<ResultSet>(data, format)?]
    };
    for set in &sets {
        set.validate()?;
    }
    tracing::debug!(count = sets.len(), "Decoded result sets");
    Ok(sets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result_set::ResultSeries;

    fn sample_set() -> ResultSet {
        ResultSet::new("lindb.runtime.mem", 0, 2000)
            .with_interval(1000)
            .with_series(
                ResultSeries::new()
                    .with_tag("node", "broker-1")
                    .with_field("heap", [(0, Some(10.0)), (1000, None), (2000, Some(12.5))]),
            )
    }

    #[test]
    fn test_cbor_decode_keeps_missing_markers() {
        let encoded = encode(&sample_set(), Format::Cbor).unwrap();
        let decoded: ResultSet = decode(&encoded, Format::Cbor).unwrap();

        let heap = &decoded.series[0].fields["heap"];
        assert_eq!(heap.get(&1000), Some(&None));
        assert_eq!(heap.get(&2000), Some(&Some(12.5)));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(detect_format(b"{\"metricName\": \"m\"}"), Format::Json);
        assert_eq!(detect_format(b"  \n[1, 2]"), Format::Json);
        assert_eq!(detect_format(b"\xa1\x63key\x65value"), Format::Cbor);
        assert_eq!(detect_format(b""), Format::Cbor);
    }

    #[test]
    fn test_content_type() {
        assert_eq!(
            Format::from_content_type("application/json; charset=utf-8"),
            Some(Format::Json)
        );
        assert_eq!(
            Format::from_content_type("application/cbor"),
            Some(Format::Cbor)
        );
        assert_eq!(Format::from_content_type("text/html"), None);
        assert_eq!(Format::Cbor.mime_type(), "application/cbor");
    }

    #[test]
    fn test_decode_single_and_list() {
        let one = encode(&sample_set(), Format::Json).unwrap();
        assert_eq!(decode_result_sets(&one).unwrap().len(), 1);

        let many = encode(&vec![sample_set(), sample_set()], Format::Cbor).unwrap();
        assert_eq!(decode_result_sets(&many).unwrap().len(), 2);
    }

    #[test]
    fn test_decode_rejects_invalid_header() {
        let json = br#"{"metricName": "m", "startTime": 10, "endTime": 5}"#;
        let err = decode_result_sets(json).unwrap_err();
        assert!(matches!(err, Error::ResultSet { .. }));
    }
}
