//! Binds upload flows to forms and runs one upload per submit event.
//!
//! Each submission ends in exactly one notification: the validation message when the
//! designated field is empty, the server's reply verbatim when the upload succeeds (a one-line
//! summary if the reply is not text, such as a converted archive), or an
//! "Upload failed" message otherwise. Submissions share nothing, so two forms can be
//! submitted at the same time.

use std::{collections::HashMap, sync::Arc};

use log::{error, info, warn};

use crate::{
    config::FormsConfig,
    errors::ValidationError,
    form::SubmitEvent,
    models::{FieldValue, Outcome, UploadKind},
    notify::Notifier,
    transport::Transport,
};

#[derive(Debug, Clone)]
struct Handler {
    kind: UploadKind,
    field: String,
}

pub struct FormUploadController {
    forms: FormsConfig,
    transport: Transport,
    notifier: Arc<dyn Notifier>,
    /// Keyed by form selector.
    handlers: HashMap<String, Handler>,
}

impl FormUploadController {
    pub fn new(forms: FormsConfig, transport: Transport, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            forms,
            transport,
            notifier,
            handlers: HashMap::new(),
        }
    }

    /// Wires up exactly the flows in `enabled`.
    pub fn initialize(&mut self, enabled: &[UploadKind]) {
        for kind in enabled {
            match kind {
                UploadKind::ByFile => self.register_file_upload_handler(),
                UploadKind::ByAccessionNumber => self.register_accession_number_upload_handler(),
                UploadKind::IsajsonByFile => self.register_isajson_upload_handler(),
            }
        }
    }

    pub fn register_file_upload_handler(&mut self) {
        self.register(UploadKind::ByFile);
    }

    pub fn register_accession_number_upload_handler(&mut self) {
        self.register(UploadKind::ByAccessionNumber);
    }

    pub fn register_isajson_upload_handler(&mut self) {
        self.register(UploadKind::IsajsonByFile);
    }

    fn register(&mut self, kind: UploadKind) {
        let (selector, field) = self.forms.binding(kind);
        let handler = Handler {
            kind,
            field: field.to_string(),
        };
        info!("Binding {} to {}", kind.endpoint(), selector);
        self.handlers.insert(selector.to_string(), handler);
    }

    #[cfg(test)]
    pub fn is_registered(&self, kind: UploadKind) -> bool {
        self.handlers.values().any(|handler| handler.kind == kind)
    }

    /// Handles one submit event from start to finish.
    pub async fn submit(&self, event: &mut SubmitEvent) -> Outcome {
        let selector = event.form().selector();
        let Some(handler) = self.handlers.get(selector) else {
            warn!("No upload handler is bound to {}", selector);
            return Outcome::Unhandled;
        };

        event.prevent_default();
        let form = event.form();

        if form.value(&handler.field).map_or(true, FieldValue::is_empty) {
            let rejection = ValidationError {
                kind: handler.kind,
                field: handler.field.clone(),
            };
            info!("Not submitting {}: {} is empty", form.selector(), rejection.field);
            self.notifier.notify(rejection.message());
            return Outcome::Rejected(rejection);
        }

        let request = form.to_request(handler.kind);
        info!("Submitting {} to {}", form.selector(), handler.kind.endpoint());

        match self.transport.post_multipart(request).await {
            Ok(response) => {
                info!("{} answered with status {}", handler.kind.endpoint(), response.status);
                self.notifier.notify(&response.summary());
                Outcome::Delivered(response)
            }
            Err(e) => {
                let detail = e.diagnostic();
                error!("Upload to {} failed: {}", handler.kind.endpoint(), detail);
                self.notifier.notify(&format!("Upload failed: {detail}"));
                Outcome::Failed(e)
            }
        }
    }
}
