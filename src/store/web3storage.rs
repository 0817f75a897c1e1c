//! Web3.Storage pinning backend
//!
//! Multipart POST to the upload endpoint with a bearer token; the response
//! carries the content id under `cid`.

use reqwest::multipart::{Form, Part};
use tracing::debug;

use super::{extract_content_id, UploadMeta};
use crate::client::Error;

const UPLOAD_URL: &str = "https://api.web3.storage/upload";

pub(crate) async fn upload(
    http: &reqwest::Client,
    token: &str,
    meta: &UploadMeta,
    body: reqwest::Body,
) -> Result<String, Error> {
    let form = Form::new().part(
        "file",
        Part::stream_with_length(body, meta.size).file_name(meta.file_name.clone()),
    );

    debug!(file = %meta.file_name, size = meta.size, "uploading to Web3.Storage");

    let response = http
        .post(UPLOAD_URL)
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Store(format!(
            "Web3.Storage returned status {}",
            status
        )));
    }

    let value: serde_json::Value = response.json().await?;
    extract_content_id(&value, "cid", "Web3.Storage")
}
