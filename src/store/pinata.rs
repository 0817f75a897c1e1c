//! Pinata pinning backend
//!
//! Multipart POST to `pinning/pinFileToIPFS` with key/secret headers. Pins
//! with CID v1 and no directory wrapping; the response carries the content
//! id under `IpfsHash`.

use reqwest::multipart::{Form, Part};
use tracing::debug;

use super::{extract_content_id, UploadMeta};
use crate::client::Error;

const PIN_URL: &str = "https://api.pinata.cloud/pinning/pinFileToIPFS";

pub(crate) async fn upload(
    http: &reqwest::Client,
    api_key: &str,
    secret_key: &str,
    meta: &UploadMeta,
    body: reqwest::Body,
) -> Result<String, Error> {
    let metadata = serde_json::json!({
        "name": meta.file_name,
        "keyvalues": {
            "size": meta.size,
            "type": meta.file_type,
        },
    });
    let options = serde_json::json!({
        "cidVersion": 1,
        "wrapWithDirectory": false,
    });

    let form = Form::new()
        .part(
            "file",
            Part::stream_with_length(body, meta.size).file_name(meta.file_name.clone()),
        )
        .text("pinataMetadata", metadata.to_string())
        .text("pinataOptions", options.to_string());

    debug!(file = %meta.file_name, size = meta.size, "uploading to Pinata");

    let response = http
        .post(PIN_URL)
        .header("pinata_api_key", api_key)
        .header("pinata_secret_api_key", secret_key)
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Store(format!("Pinata returned status {}", status)));
    }

    let value: serde_json::Value = response.json().await?;
    extract_content_id(&value, "IpfsHash", "Pinata")
}
