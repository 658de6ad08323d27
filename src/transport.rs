use std::path::Path;

use log::debug;
use reqwest::{
    header::CONTENT_TYPE,
    multipart::{Form, Part},
    Body, Client,
};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use url::Url;

use crate::{
    errors::UploadError,
    models::{FieldValue, FormField, ServerResponse, UploadRequest},
};

const OCTET_STREAM: &str = "application/octet-stream";

/// Sends upload requests to the conversion service.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    base_url: Url,
}

impl Transport {
    pub fn new(base_url: Url) -> Result<Self, UploadError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| UploadError::Transport {
                endpoint: base_url.to_string(),
                source,
            })?;

        Ok(Self { client, base_url })
    }

    /// POSTs the request's fields as multipart form data and waits for the reply.
    ///
    /// Redirects are followed, so on success the body is whatever the server finally
    /// served. Any non-success status is an error carrying the body.
    pub async fn post_multipart(&self, request: UploadRequest) -> Result<ServerResponse, UploadError> {
        let endpoint = request.kind.endpoint();
        let url = self.base_url.join(endpoint).map_err(|source| UploadError::Url {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let form = multipart_form(&request.fields).await?;
        debug!("POST {} ({} fields)", url, request.fields.len());

        let transport_error = |source| UploadError::Transport {
            endpoint: endpoint.to_string(),
            source,
        };
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await.map_err(transport_error)?;
        debug!("{} answered {} with {} bytes", final_url, status, body.len());

        if !status.is_success() {
            return Err(UploadError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(ServerResponse {
            status: status.as_u16(),
            url: final_url,
            content_type,
            body,
        })
    }
}

async fn multipart_form(fields: &[FormField]) -> Result<Form, UploadError> {
    let mut form = Form::new();
    for field in fields {
        let part = match &field.value {
            FieldValue::Text(text) => Part::text(text.clone()),
            FieldValue::File(Some(path)) => file_part(&field.name, path).await?,
            // Browsers still send unselected file inputs, as an empty part with no name.
            FieldValue::File(None) => Part::bytes(Vec::new())
                .file_name("")
                .mime_str(OCTET_STREAM)
                .map_err(|source| UploadError::Multipart {
                    field: field.name.clone(),
                    source,
                })?,
        };
        form = form.part(field.name.clone(), part);
    }
    Ok(form)
}

/// Streams the file from disk instead of buffering it.
async fn file_part(name: &str, path: &Path) -> Result<Part, UploadError> {
    let io_error = |source| UploadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).await.map_err(io_error)?;
    let length = file.metadata().await.map_err(io_error)?.len();

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), length)
        .file_name(file_name)
        .mime_str(mime.essence_str())
        .map_err(|source| UploadError::Multipart {
            field: name.to_string(),
            source,
        })
}
