//! Self-hosted IPFS node backend
//!
//! Multipart POST to the node's `/api/v0/add` endpoint. The node replies with
//! a JSON line like `{"Name":"a.png","Hash":"Qm...","Size":"123"}`.

use reqwest::multipart::{Form, Part};
use tracing::debug;

use super::{extract_content_id, UploadMeta};
use crate::client::Error;

pub(crate) async fn upload(
    http: &reqwest::Client,
    api_url: &str,
    meta: &UploadMeta,
    body: reqwest::Body,
) -> Result<String, Error> {
    let form = Form::new().part(
        "file",
        Part::stream_with_length(body, meta.size).file_name(meta.file_name.clone()),
    );

    debug!(file = %meta.file_name, size = meta.size, url = %api_url, "uploading to IPFS node");

    let response = http
        .post(format!("{}/api/v0/add", api_url))
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Store(format!("IPFS node returned status {}", status)));
    }

    let text = response.text().await?;
    let value: serde_json::Value = serde_json::from_str(text.trim())
        .map_err(|_| Error::Store(format!("unexpected IPFS node response: {}", text)))?;
    extract_content_id(&value, "Hash", "IPFS node")
}
