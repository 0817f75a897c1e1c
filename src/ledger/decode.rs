//! Ledger read-response decoding
//!
//! Reads validate the remote's response shape defensively. A malformed
//! top-level shape yields `None` (the caller degrades to an empty listing); a
//! malformed individual row is dropped and the rest kept.
//!
//! Wire shapes mirror the contract ABI: `getUserFiles` returns an array of
//! record objects, `getSharedFiles` returns the record array plus three
//! parallel arrays (`sharedBy`, `sharedAt`, `hasAccess`), and
//! `getSharedFileRecipients` returns two parallel arrays (`recipients`,
//! `accessStatus`).

use serde_json::Value;
use tracing::debug;

use crate::client::{FileRecord, Recipient, SharedFileView};
use crate::identity::Address;

fn field_str(obj: &Value, key: &str) -> Option<String> {
    obj.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

fn field_i64(obj: &Value, key: &str) -> Option<i64> {
    obj.get(key).and_then(|v| v.as_i64())
}

fn field_u64(obj: &Value, key: &str) -> Option<u64> {
    obj.get(key).and_then(|v| v.as_u64())
}

fn field_bool(obj: &Value, key: &str) -> Option<bool> {
    obj.get(key).and_then(|v| v.as_bool())
}

fn field_address(obj: &Value, key: &str) -> Option<Address> {
    field_str(obj, key).and_then(|s| Address::parse(&s).ok())
}

/// Decode one file record object. `None` drops the row.
fn decode_record(value: &Value) -> Option<FileRecord> {
    Some(FileRecord {
        content_id: field_str(value, "ipfsHash")?,
        file_name: field_str(value, "fileName")?,
        created_at: field_i64(value, "timestamp")?,
        owner: field_address(value, "owner")?,
        is_public: field_bool(value, "isPublic")?,
        description: field_str(value, "description").unwrap_or_default(),
        file_type: field_str(value, "fileType").unwrap_or_default(),
        file_size: field_u64(value, "fileSize")?,
    })
}

/// Decode a `getUserFiles` response. `None` means the top-level shape is
/// not an array.
pub(crate) fn decode_file_records(value: &Value) -> Option<Vec<FileRecord>> {
    let rows = value.as_array()?;
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match decode_record(row) {
            Some(record) => records.push(record),
            None => debug!(row = %row, "dropping malformed file record row"),
        }
    }
    Some(records)
}

/// Decode a `getSharedFiles` response: record array plus parallel
/// `sharedBy`/`sharedAt`/`hasAccess` arrays joined by index.
pub(crate) fn decode_shared_views(value: &Value) -> Option<Vec<SharedFileView>> {
    let files = value.get("files")?.as_array()?;
    let shared_by = value.get("sharedBy")?.as_array()?;
    let shared_at = value.get("sharedAt")?.as_array()?;
    let has_access = value.get("hasAccess")?.as_array()?;

    let mut views = Vec::with_capacity(files.len());
    for (index, row) in files.iter().enumerate() {
        let view = decode_record(row).and_then(|record| {
            Some(SharedFileView {
                record,
                shared_by: shared_by
                    .get(index)?
                    .as_str()
                    .and_then(|s| Address::parse(s).ok())?,
                shared_at: shared_at.get(index)?.as_i64()?,
                has_access: has_access.get(index)?.as_bool()?,
            })
        });
        match view {
            Some(view) => views.push(view),
            None => debug!(index = index, "dropping malformed shared file row"),
        }
    }
    Some(views)
}

/// Decode a `getSharedFileRecipients` response: parallel
/// `recipients`/`accessStatus` arrays joined by index.
pub(crate) fn decode_recipients(value: &Value) -> Option<Vec<Recipient>> {
    let recipients = value.get("recipients")?.as_array()?;
    let access = value.get("accessStatus")?.as_array()?;

    let mut out = Vec::with_capacity(recipients.len());
    for (index, row) in recipients.iter().enumerate() {
        let entry = row
            .as_str()
            .and_then(|s| Address::parse(s).ok())
            .and_then(|address| {
                Some(Recipient {
                    address,
                    has_access: access.get(index)?.as_bool()?,
                })
            });
        match entry {
            Some(entry) => out.push(entry),
            None => debug!(index = index, "dropping malformed recipient row"),
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const OWNER: &str = "0x1234567890abcdef1234567890abcdef12345678";
    const OTHER: &str = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";

    fn record_json() -> Value {
        json!({
            "ipfsHash": "QmFoo",
            "fileName": "a.png",
            "timestamp": 1_700_000_000,
            "owner": OWNER,
            "isPublic": true,
            "description": "",
            "fileType": "image/png",
            "fileSize": 10_485_760,
        })
    }

    #[test]
    fn test_decode_file_records() {
        let records = decode_file_records(&json!([record_json()])).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content_id, "QmFoo");
        assert_eq!(records[0].owner.as_str(), OWNER);
        assert_eq!(records[0].file_size, 10_485_760);
    }

    #[test]
    fn test_non_array_is_top_level_malformed() {
        assert!(decode_file_records(&json!({"files": []})).is_none());
        assert!(decode_file_records(&json!("oops")).is_none());
        assert!(decode_file_records(&Value::Null).is_none());
    }

    #[test]
    fn test_malformed_row_dropped_rest_kept() {
        let records = decode_file_records(&json!([
            record_json(),
            {"ipfsHash": "QmBar"},
            record_json(),
        ]))
        .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_bad_owner_address_drops_row() {
        let mut row = record_json();
        row["owner"] = json!("not-an-address");
        let records = decode_file_records(&json!([row])).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_decode_shared_views_joins_parallel_arrays() {
        let value = json!({
            "files": [record_json(), record_json()],
            "sharedBy": [OTHER, OTHER],
            "sharedAt": [100, 200],
            "hasAccess": [true, false],
        });
        let views = decode_shared_views(&value).unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].shared_by.as_str(), OTHER);
        assert_eq!(views[0].shared_at, 100);
        assert!(views[0].has_access);
        assert!(!views[1].has_access);
    }

    #[test]
    fn test_shared_views_missing_parallel_entry_drops_row() {
        let value = json!({
            "files": [record_json(), record_json()],
            "sharedBy": [OTHER],
            "sharedAt": [100],
            "hasAccess": [true],
        });
        let views = decode_shared_views(&value).unwrap();
        assert_eq!(views.len(), 1);
    }

    #[test]
    fn test_shared_views_malformed_top_level() {
        assert!(decode_shared_views(&json!([])).is_none());
        assert!(decode_shared_views(&json!({"files": "oops"})).is_none());
    }

    #[test]
    fn test_decode_recipients() {
        let value = json!({
            "recipients": [OWNER, OTHER],
            "accessStatus": [true, false],
        });
        let recipients = decode_recipients(&value).unwrap();
        assert_eq!(recipients.len(), 2);
        assert!(recipients[0].has_access);
        assert!(!recipients[1].has_access);
    }

    #[test]
    fn test_recipients_malformed() {
        assert!(decode_recipients(&json!("oops")).is_none());
        let partial = json!({ "recipients": [OWNER] });
        assert!(decode_recipients(&partial).is_none());
    }
}
