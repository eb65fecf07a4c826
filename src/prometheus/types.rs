//! Query response types and decoding.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use thiserror::Error;

/// Errors from querying the metrics backend. Both variants abort the run.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Transport-level failure (connection refused, DNS, etc.).
    #[error("query request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response decoded as JSON but lacks the expected result container.
    #[error("response missing data.result: {body}")]
    Format {
        /// The offending payload, for diagnosis.
        body: String,
    },
}

/// The `[<unix time>, "<value>"]` pair of an instant vector.
///
/// The timestamp is accepted as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuePair {
    /// Sample timestamp in Unix seconds (may carry a fractional part).
    pub timestamp: f64,

    /// Scalar value, kept as the backend's string rendering.
    pub value: String,
}

impl ValuePair {
    /// Render the timestamp without a trailing `.0` when it is whole.
    pub fn timestamp_field(&self) -> String {
        if self.timestamp.fract() == 0.0 && self.timestamp.abs() < 9.0e15 {
            format!("{}", self.timestamp as i64)
        } else {
            format!("{}", self.timestamp)
        }
    }
}

impl<'de> Deserialize<'de> for ValuePair {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PairVisitor;

        impl<'de> Visitor<'de> for PairVisitor {
            type Value = ValuePair;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a [timestamp, value] pair")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let raw: serde_json::Value = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let timestamp = match &raw {
                    serde_json::Value::Number(n) => n.as_f64(),
                    serde_json::Value::String(s) => s.parse::<f64>().ok(),
                    _ => None,
                }
                .ok_or_else(|| {
                    de::Error::custom(format!("invalid value timestamp: {raw}"))
                })?;
                let value: String = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                // Tolerate trailing elements, per the API's array encoding.
                while seq.next_element::<serde_json::Value>()?.is_some() {}
                Ok(ValuePair { timestamp, value })
            }
        }

        deserializer.deserialize_seq(PairVisitor)
    }
}

/// One element of `data.result`: a label set and, for instant vectors, a
/// value pair. Info-style queries may omit the pair.
#[derive(Debug, Clone, Deserialize)]
pub struct InstantSample {
    /// Label name/value tuples.
    #[serde(default)]
    pub metric: BTreeMap<String, String>,

    /// `[timestamp, value]` pair; absent for label-only results.
    #[serde(default)]
    pub value: Option<ValuePair>,
}

/// Outcome of decoding one query response body.
#[derive(Debug)]
pub enum QueryResult {
    /// Body was not JSON at all. Carries the raw body for the log stream.
    Undecodable {
        /// The JSON decode failure.
        error: serde_json::Error,
        /// Full response text.
        body: String,
    },

    /// Decoded result set (possibly empty).
    Samples(Vec<InstantSample>),
}

/// Decode a query response body.
///
/// A body that is not JSON is reported as [`QueryResult::Undecodable`] and
/// left to the caller to skip; JSON that lacks `data.result` is a fatal
/// [`QueryError::Format`].
pub fn parse_query_response(body: &str) -> Result<QueryResult, QueryError> {
    let json: serde_json::Value = match serde_json::from_str(body) {
        Ok(json) => json,
        Err(error) => {
            return Ok(QueryResult::Undecodable {
                error,
                body: body.to_string(),
            });
        }
    };

    let Some(result) = json.get("data").and_then(|data| data.get("result")) else {
        return Err(QueryError::Format {
            body: json.to_string(),
        });
    };

    let samples: Vec<InstantSample> =
        serde_json::from_value(result.clone()).map_err(|e| QueryError::Format {
            body: format!("invalid result array ({e}): {json}"),
        })?;

    Ok(QueryResult::Samples(samples))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_samples() {
        let body = r#"{"data":{"result":[
            {"metric":{"instance":"a","job":"node"},"value":[1000,"0.5"]},
            {"metric":{"instance":"b"},"value":[1000.5,"1"]}
        ]}}"#;

        let QueryResult::Samples(samples) = parse_query_response(body).unwrap() else {
            panic!("expected samples");
        };
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].metric.get("instance"), Some(&"a".to_string()));
        assert_eq!(
            samples[0].value,
            Some(ValuePair {
                timestamp: 1000.0,
                value: "0.5".to_string()
            })
        );
        assert_eq!(samples[1].value.as_ref().unwrap().timestamp, 1000.5);
    }

    #[test]
    fn test_parse_string_timestamp() {
        let body = r#"{"data":{"result":[{"metric":{"instance":"a"},"value":["1000","0.5"]}]}}"#;

        let QueryResult::Samples(samples) = parse_query_response(body).unwrap() else {
            panic!("expected samples");
        };
        assert_eq!(samples[0].value.as_ref().unwrap().timestamp, 1000.0);
    }

    #[test]
    fn test_parse_empty_result() {
        let QueryResult::Samples(samples) =
            parse_query_response(r#"{"data":{"result":[]}}"#).unwrap()
        else {
            panic!("expected samples");
        };
        assert!(samples.is_empty());
    }

    #[test]
    fn test_parse_missing_data_is_fatal() {
        let result = parse_query_response(r#"{"status":"error"}"#);
        assert!(matches!(result, Err(QueryError::Format { .. })));

        let result = parse_query_response(r#"{"data":{}}"#);
        assert!(matches!(result, Err(QueryError::Format { .. })));
    }

    #[test]
    fn test_parse_undecodable_is_not_fatal() {
        let result = parse_query_response("<html>502 Bad Gateway</html>").unwrap();
        let QueryResult::Undecodable { body, .. } = result else {
            panic!("expected undecodable");
        };
        assert!(body.contains("502"));
    }

    #[test]
    fn test_sample_without_value_pair() {
        let body = r#"{"data":{"result":[{"metric":{"version":"1.2.3"}}]}}"#;

        let QueryResult::Samples(samples) = parse_query_response(body).unwrap() else {
            panic!("expected samples");
        };
        assert!(samples[0].value.is_none());
    }

    #[test]
    fn test_timestamp_field_rendering() {
        let whole = ValuePair {
            timestamp: 1000.0,
            value: "1".to_string(),
        };
        assert_eq!(whole.timestamp_field(), "1000");

        let fractional = ValuePair {
            timestamp: 1000.5,
            value: "1".to_string(),
        };
        assert_eq!(fractional.timestamp_field(), "1000.5");
    }
}
