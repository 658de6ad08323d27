//! In-process stand-in for the conversion service, plus a notifier that remembers what it showed.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{Multipart, State},
    http::{StatusCode, Uri},
    routing::post,
    Router,
};
use url::Url;

use crate::notify::Notifier;

#[derive(Debug, Clone)]
pub struct RecordedField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub fields: Vec<RecordedField>,
}

impl RecordedRequest {
    pub fn field(&self, name: &str) -> Option<&RecordedField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    status: StatusCode,
    body: String,
}

/// Answers every upload endpoint with a fixed status and body.
pub struct MockServer {
    url: Url,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    pub async fn start(status: StatusCode, body: &str) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            requests: requests.clone(),
            status,
            body: body.to_string(),
        };
        let app = Router::new()
            .route("/uploadIsatabByFile", post(record_upload))
            .route("/uploadIsatabByAccessionNumber", post(record_upload))
            .route("/uploadIsajson", post(record_upload))
            .with_state(state);

        Self {
            url: spawn_server(app).await,
            requests,
        }
    }

    pub fn url(&self) -> Url {
        self.url.clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }
}

async fn record_upload(
    State(state): State<MockState>,
    uri: Uri,
    mut multipart: Multipart,
) -> (StatusCode, String) {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let data = field.bytes().await.unwrap().to_vec();
        fields.push(RecordedField {
            name,
            file_name,
            content_type,
            data,
        });
    }

    state.requests.lock().unwrap().push(RecordedRequest {
        path: uri.path().to_string(),
        fields,
    });
    (state.status, state.body.clone())
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_server(app: Router) -> Url {
    let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0))).serve(app.into_make_service());
    let addr = server.local_addr();
    tokio::spawn(async move {
        server.await.unwrap();
    });
    Url::parse(&format!("http://{addr}/")).unwrap()
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
