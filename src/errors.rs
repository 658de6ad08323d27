use std::{error::Error as _, path::PathBuf};

use reqwest::StatusCode;
use thiserror::Error as ThisError;

use crate::models::UploadKind;

/// The designated field of a form was empty when it was submitted.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
#[error("{}", .kind.validation_message())]
pub struct ValidationError {
    pub kind: UploadKind,
    pub field: String,
}

impl ValidationError {
    pub fn message(&self) -> &'static str {
        self.kind.validation_message()
    }
}

#[derive(ThisError, Debug)]
pub enum UploadError {
    /// The selected file could not be opened or inspected
    #[error("could not read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A part could not be built from the field's metadata
    #[error("invalid multipart field {field}")]
    Multipart {
        field: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid endpoint {endpoint}")]
    Url {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// The request never completed: connection refused, reset, bad TLS and so on
    #[error("request to {endpoint} failed")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl UploadError {
    /// The error and all of its sources, joined for display to the user.
    pub fn diagnostic(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
