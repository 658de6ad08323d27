//! Page-side view of a submission: the form being submitted and the event that carries it.

use std::path::PathBuf;

use crate::models::{FieldValue, FormField, UploadKind, UploadRequest};

/// A form identified by its selector, holding its fields in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    selector: String,
    fields: Vec<FormField>,
}

impl Form {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(FormField {
            name: name.into(),
            value: FieldValue::Text(value.into()),
        });
        self
    }

    pub fn with_file(mut self, name: impl Into<String>, path: Option<PathBuf>) -> Self {
        self.fields.push(FormField {
            name: name.into(),
            value: FieldValue::File(path),
        });
        self
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Current value of the first field called `name`.
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    /// Copies every field into a request for `kind`. The form itself is left untouched.
    pub fn to_request(&self, kind: UploadKind) -> UploadRequest {
        UploadRequest {
            kind,
            fields: self.fields.clone(),
        }
    }
}

/// A submit event raised by a form.
#[derive(Debug)]
pub struct SubmitEvent {
    form: Form,
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new(form: Form) -> Self {
        Self {
            form,
            default_prevented: false,
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Stops the page from navigating to the form's action.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}
