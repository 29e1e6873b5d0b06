//! Stream record payload decoding.
//!
//! Stream events carry their payloads as base64 in `Records[].kinesis.data`,
//! optionally gzip-compressed by the producer.

use std::io::Read;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::read::GzDecoder;
use serde_json::Value;

use crate::error::{RecordError, RecordResult};

/// Decodes the payload of one stream record into text.
pub fn decode_record(record: &Value, compressed: bool) -> RecordResult<String> {
    let data = record
        .pointer("/kinesis/data")
        .and_then(Value::as_str)
        .ok_or(RecordError::MissingData)?;
    let decoded = STANDARD.decode(data)?;

    let bytes = if compressed {
        let mut decompressed = Vec::new();
        GzDecoder::new(decoded.as_slice()).read_to_end(&mut decompressed)?;
        decompressed
    } else {
        decoded
    };
    Ok(String::from_utf8(bytes)?)
}

/// Decodes every record, failing on the first undecodable one.
pub fn decode_records<'a, I>(records: I, compressed: bool) -> RecordResult<Vec<String>>
where
    I: IntoIterator<Item = &'a Value>,
{
    records
        .into_iter()
        .map(|record| decode_record(record, compressed))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use serde_json::json;

    use super::*;

    fn record(payload: &[u8]) -> Value {
        json!({"kinesis": {"data": STANDARD.encode(payload)}})
    }

    #[test]
    fn test_plain_records() {
        let event = json!({"Records": [record(b"first"), record(b"{\"n\": 2}")]});
        let records = event["Records"].as_array().unwrap();

        let decoded = decode_records(records, false).unwrap();
        assert_eq!(decoded, ["first", "{\"n\": 2}"]);
    }

    #[test]
    fn test_compressed_record() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"squeezed").unwrap();
        let compressed = encoder.finish().unwrap();

        assert_eq!(decode_record(&record(&compressed), true).unwrap(), "squeezed");
        assert!(matches!(
            decode_record(&record(b"not gzip"), true),
            Err(RecordError::Decompress(_))
        ));
    }

    #[test]
    fn test_malformed_records() {
        assert!(matches!(
            decode_record(&json!({"kinesis": {}}), false),
            Err(RecordError::MissingData)
        ));
        assert!(matches!(
            decode_record(&json!({"kinesis": {"data": "%%%"}}), false),
            Err(RecordError::Base64(_))
        ));
        assert!(matches!(
            decode_record(&record(&[0xff, 0xfe]), false),
            Err(RecordError::Utf8(_))
        ));
    }
}
