//! Reference-document upload to the Gemini Files API.
//!
//! Narrative prompts attach an uploaded document (historically a PDF of the
//! underlying essay) via its file URI. This module performs the one-time
//! upload; the returned URI goes into the configuration as
//! `reference_document`.

use serde_json::Value;

use crate::{ApiKey, Result, http_client_with_timeout, read_capped_error_body};

/// Media-upload endpoint. Distinct from the API base: uploads go through
/// the `/upload` prefix.
pub const GEMINI_UPLOAD_URL: &str =
    "https://generativelanguage.googleapis.com/upload/v1beta/files";

const UPLOAD_TIMEOUT_SECS: u64 = 120;

/// Handle for a file uploaded to the Files API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    /// Resource name, e.g. `files/abc123`.
    pub name: String,
    /// URI to reference from generation requests.
    pub uri: String,
}

/// Upload raw document bytes and return the handle for prompt references.
pub async fn upload_document(
    api_key: &ApiKey,
    bytes: Vec<u8>,
    mime_type: &str,
) -> Result<UploadedDocument> {
    let client = http_client_with_timeout(UPLOAD_TIMEOUT_SECS)
        .map_err(|e| anyhow::anyhow!("HTTP client: {e}"))?;
    upload_document_at(GEMINI_UPLOAD_URL, &client, api_key, bytes, mime_type).await
}

pub(crate) async fn upload_document_at(
    url: &str,
    client: &reqwest::Client,
    api_key: &ApiKey,
    bytes: Vec<u8>,
    mime_type: &str,
) -> Result<UploadedDocument> {
    let response = client
        .post(url)
        .header("x-goog-api-key", api_key.expose_secret())
        .header("X-Goog-Upload-Protocol", "raw")
        .header("content-type", mime_type)
        .body(bytes)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = read_capped_error_body(response).await;
        anyhow::bail!("Failed to upload document: {status} - {error_text}");
    }

    let data: Value = response.json().await?;
    let file = &data["file"];
    let name = file["name"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Missing 'file.name' in upload response"))?
        .to_string();
    let uri = file["uri"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Missing 'file.uri' in upload response"))?
        .to_string();

    tracing::info!("Uploaded reference document: {name}");

    Ok(UploadedDocument { name, uri })
}
