use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::fs;
use url::Url;

use crate::errors::{UploadError, ValidationError};

// Field names read by the conversion service.
pub const ISATAB_FILE_FIELD: &str = "inputIsatabFile";
pub const ISATAB_FILE_CHUNKED_FIELD: &str = "inputIsajsonFileOption";
pub const ACCESSION_NUMBER_FIELD: &str = "inputIsatabAccessionNumber";
pub const ACCESSION_REPOSITORY_FIELD: &str = "inputIsatabRepositoryOption";
pub const ACCESSION_CHUNKED_FIELD: &str = "inputIsajsonAccessionOption";
pub const ISAJSON_FILE_FIELD: &str = "inputIsajsonFile";
pub const ISAJSON_CHUNKED_FIELD: &str = "inputIsajsonFileFormat";

/// Shown when the designated field of either ISA-TAB form is empty.
// The accession form shares this text, although it still asks for a zip file.
pub const ISATAB_MISSING_MESSAGE: &str = "Please enter either an ISA-TAB file (.zip).";
pub const ISAJSON_MISSING_MESSAGE: &str = "Please enter an ISA-JSON file (.zip).";

/// The upload flows the conversion service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    /// ISA-TAB archive converted to ISA-JSON.
    ByFile,
    /// ISA-TAB fetched from a public repository by accession number.
    ByAccessionNumber,
    /// ISA-JSON archive converted to ISA-TAB.
    IsajsonByFile,
}

impl UploadKind {
    pub fn endpoint(self) -> &'static str {
        match self {
            UploadKind::ByFile => "/uploadIsatabByFile",
            UploadKind::ByAccessionNumber => "/uploadIsatabByAccessionNumber",
            UploadKind::IsajsonByFile => "/uploadIsajson",
        }
    }

    pub fn validation_message(self) -> &'static str {
        match self {
            UploadKind::ByFile | UploadKind::ByAccessionNumber => ISATAB_MISSING_MESSAGE,
            UploadKind::IsajsonByFile => ISAJSON_MISSING_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// A file input; `None` when nothing has been chosen.
    File(Option<PathBuf>),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::File(path) => path.is_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: FieldValue,
}

/// Snapshot of a form's fields taken when it was submitted.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub kind: UploadKind,
    pub fields: Vec<FormField>,
}

/// Whatever the server sent back. The body is never interpreted.
#[derive(Debug, Clone)]
pub struct ServerResponse {
    pub status: u16,
    /// Final URL after redirects.
    pub url: Url,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl ServerResponse {
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// True unless the server labelled the body as something other than text.
    pub fn is_text(&self) -> bool {
        match self.content_type.as_deref() {
            None => true,
            Some(content_type) => {
                content_type.starts_with("text/") || content_type.contains("json") || content_type.contains("xml")
            }
        }
    }

    /// The body verbatim when it is text, otherwise a one-line description of it.
    pub fn summary(&self) -> Cow<'_, str> {
        if self.is_text() {
            return self.text();
        }
        Cow::Owned(format!(
            "Received {} ({} bytes, {})",
            self.file_name().unwrap_or("response"),
            self.body.len(),
            self.content_type.as_deref().unwrap_or_default()
        ))
    }

    /// Last path segment of the final URL, e.g. `study-json.zip`.
    pub fn file_name(&self) -> Option<&str> {
        self.url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
    }

    pub async fn save_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        fs::create_dir_all(dir).await?;
        let path = dir.join(self.file_name().unwrap_or("response.bin"));
        fs::write(&path, &self.body).await?;
        Ok(path)
    }
}

/// How a single submit event ended.
#[derive(Debug)]
pub enum Outcome {
    Rejected(ValidationError),
    Delivered(ServerResponse),
    Failed(UploadError),
    /// No handler is bound to the submitted form.
    Unhandled,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(url: &str, body: &'static [u8]) -> ServerResponse {
        ServerResponse {
            status: 200,
            url: Url::parse(url).unwrap(),
            content_type: None,
            body: Bytes::from_static(body),
        }
    }

    #[test]
    fn empty_values() {
        assert!(FieldValue::Text(String::new()).is_empty());
        assert!(FieldValue::File(None).is_empty());
        assert!(!FieldValue::Text("MTBLS1".into()).is_empty());
        assert!(!FieldValue::File(Some("study.zip".into())).is_empty());
    }

    #[test]
    fn accession_form_reuses_isatab_message() {
        assert_eq!(
            UploadKind::ByAccessionNumber.validation_message(),
            UploadKind::ByFile.validation_message()
        );
        assert_eq!(
            UploadKind::ByFile.validation_message(),
            "Please enter either an ISA-TAB file (.zip)."
        );
    }

    #[test]
    fn kinds_deserialize_from_snake_case() {
        let kinds: Vec<UploadKind> =
            serde_json::from_str(r#"["by_file", "by_accession_number", "isajson_by_file"]"#).unwrap();
        assert_eq!(
            kinds,
            vec![UploadKind::ByFile, UploadKind::ByAccessionNumber, UploadKind::IsajsonByFile]
        );
    }

    #[test]
    fn file_name_comes_from_final_url() {
        let download = response("http://localhost:5000/uploadsIsadoc/abc/BII-S-3-json.zip", b"PK");
        assert_eq!(download.file_name(), Some("BII-S-3-json.zip"));

        let root = response("http://localhost:5000/", b"OK");
        assert_eq!(root.file_name(), None);
    }

    #[test]
    fn archives_are_summarized() {
        let mut download = response("http://localhost:5000/uploadsIsadoc/abc/BII-S-3-json.zip", b"PK\x03\x04");
        download.content_type = Some("application/zip".to_string());

        assert!(!download.is_text());
        assert_eq!(download.summary(), "Received BII-S-3-json.zip (4 bytes, application/zip)");
    }

    #[test]
    fn text_bodies_are_shown_as_is() {
        let mut reply = response("http://localhost:5000/uploadIsatabByFile", b"OK:12345");
        reply.content_type = Some("text/plain; charset=utf-8".to_string());
        assert_eq!(reply.summary(), "OK:12345");

        reply.content_type = Some("text/html".to_string());
        assert_eq!(reply.summary(), "OK:12345");

        reply.content_type = None;
        assert_eq!(reply.summary(), "OK:12345");
    }

    #[test]
    fn text_is_verbatim() {
        assert_eq!(response("http://localhost/", b"OK:12345").text(), "OK:12345");
    }

    #[tokio::test]
    async fn save_to_writes_body() {
        let dir = tempfile::tempdir().unwrap();
        let download = response("http://localhost:5000/uploadsIsadoc/abc/out-tab.zip", b"archive");

        let path = download.save_to(dir.path()).await.unwrap();

        assert_eq!(path, dir.path().join("out-tab.zip"));
        assert_eq!(std::fs::read(path).unwrap(), b"archive");
    }
}
