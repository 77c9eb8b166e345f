use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use shared::protocol::{CREATE_STORY_PATH, GENERATE_PATH};
use tokio::net::TcpListener;

use crate::{
    download::{DownloadSink, ObjectUrl},
    error::DownloadError,
    presentation::ResultView,
    preview::PreviewImage,
    surface::{Control, Element, Notice, Surface},
};

#[derive(Default, Clone)]
struct SurfaceState {
    visible: HashMap<Element, bool>,
    controls: HashMap<Control, (bool, String)>,
    loading_message: String,
    preview: Option<PreviewImage>,
    result: Option<ResultView>,
    notices: Vec<Notice>,
    calls: usize,
    log: Vec<String>,
}

/// In-memory surface that records everything the workflow shows.
#[derive(Default)]
pub struct MemorySurface {
    state: Mutex<SurfaceState>,
}

impl MemorySurface {
    fn state(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().expect("surface state")
    }

    pub fn is_visible(&self, element: Element) -> bool {
        self.state().visible.get(&element).copied().unwrap_or(false)
    }

    pub fn control(&self, control: Control) -> Option<(bool, String)> {
        self.state().controls.get(&control).cloned()
    }

    pub fn loading_message(&self) -> String {
        self.state().loading_message.clone()
    }

    pub fn preview(&self) -> Option<PreviewImage> {
        self.state().preview.clone()
    }

    pub fn result(&self) -> Option<ResultView> {
        self.state().result.clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.state().notices.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().calls
    }

    /// Ordered record of surface calls, e.g. `visible Loading true`.
    pub fn log(&self) -> Vec<String> {
        self.state().log.clone()
    }

    fn record(&self, entry: String, apply: impl FnOnce(&mut SurfaceState)) {
        let mut state = self.state();
        state.calls += 1;
        state.log.push(entry);
        apply(&mut state);
    }
}

impl Surface for MemorySurface {
    fn set_visible(&self, element: Element, visible: bool) {
        self.record(format!("visible {element:?} {visible}"), |state| {
            state.visible.insert(element, visible);
        });
    }

    fn set_control(&self, control: Control, enabled: bool, label: &str) {
        self.record(format!("control {control:?} {enabled} {label}"), |state| {
            state.controls.insert(control, (enabled, label.to_string()));
        });
    }

    fn set_loading_message(&self, message: &str) {
        self.record(format!("loading {message}"), |state| {
            state.loading_message = message.to_string();
        });
    }

    fn show_preview(&self, preview: &PreviewImage) {
        self.record(format!("preview {}", preview.file_name), |state| {
            state.preview = Some(preview.clone());
        });
    }

    fn show_result(&self, view: &ResultView) {
        self.record(format!("result {}", view.quote), |state| {
            state.result = Some(view.clone());
        });
    }

    fn notify(&self, notice: &Notice) {
        self.record(format!("notify {}", notice.message), |state| {
            state.notices.push(notice.clone());
        });
    }
}

#[derive(Default)]
struct DownloadState {
    next_id: usize,
    created: usize,
    revoked: usize,
    live: HashMap<ObjectUrl, Vec<u8>>,
    activations: Vec<(String, Vec<u8>)>,
}

/// Download sink that keeps activations in memory and counts object URL churn.
#[derive(Default)]
pub struct RecordingDownloads {
    state: Mutex<DownloadState>,
    fail_activation: bool,
}

impl RecordingDownloads {
    pub fn failing() -> Self {
        Self {
            state: Mutex::default(),
            fail_activation: true,
        }
    }

    fn state(&self) -> MutexGuard<'_, DownloadState> {
        self.state.lock().expect("download state")
    }

    pub fn created(&self) -> usize {
        self.state().created
    }

    pub fn revoked(&self) -> usize {
        self.state().revoked
    }

    pub fn live(&self) -> usize {
        self.state().live.len()
    }

    /// `(filename, bytes)` for each activated download.
    pub fn activations(&self) -> Vec<(String, Vec<u8>)> {
        self.state().activations.clone()
    }
}

#[async_trait::async_trait]
impl DownloadSink for RecordingDownloads {
    fn create_object_url(&self, blob: Vec<u8>) -> ObjectUrl {
        let mut state = self.state();
        state.next_id += 1;
        state.created += 1;
        let url = ObjectUrl::from_raw(format!("blob:test/{}", state.next_id));
        state.live.insert(url.clone(), blob);
        url
    }

    async fn activate(&self, url: &ObjectUrl, filename: &str) -> Result<(), DownloadError> {
        if self.fail_activation {
            return Err(DownloadError::UnknownUrl(url.to_string()));
        }
        let mut state = self.state();
        let blob = state
            .live
            .get(url)
            .cloned()
            .ok_or_else(|| DownloadError::UnknownUrl(url.to_string()))?;
        state.activations.push((filename.to_string(), blob));
        Ok(())
    }

    fn revoke_object_url(&self, url: &ObjectUrl) {
        let mut state = self.state();
        state.revoked += 1;
        state.live.remove(url);
    }
}

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

    pub fn text(&self, name: &str) -> Option<String> {
        self.field(name)
            .map(|field| String::from_utf8_lossy(&field.data).into_owned())
    }
}

/// Canned response for one stub endpoint.
#[derive(Debug, Clone)]
pub struct StubReply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl StubReply {
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: value.to_string().into_bytes(),
        }
    }

    pub fn bytes(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }
}

pub struct StubState {
    generate: Mutex<StubReply>,
    story: Mutex<StubReply>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl StubState {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests").clone()
    }
}

async fn handle_stub(
    path: &'static str,
    state: Arc<StubState>,
    mut multipart: Multipart,
) -> Response {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.expect("field bytes").to_vec();
        fields.push(RecordedField {
            name,
            file_name,
            content_type,
            data,
        });
    }
    state.requests.lock().expect("requests").push(RecordedRequest {
        path: path.to_string(),
        fields,
    });

    let reply = if path == GENERATE_PATH {
        state.generate.lock().expect("generate reply").clone()
    } else {
        state.story.lock().expect("story reply").clone()
    };
    (
        StatusCode::from_u16(reply.status).expect("status code"),
        [(header::CONTENT_TYPE, reply.content_type)],
        reply.body,
    )
        .into_response()
}

/// Serves both endpoints on an ephemeral local port and records every request.
pub async fn spawn_stub_server(
    generate: StubReply,
    story: StubReply,
) -> (String, Arc<StubState>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub server");
    let addr = listener.local_addr().expect("stub addr");
    let state = Arc::new(StubState {
        generate: Mutex::new(generate),
        story: Mutex::new(story),
        requests: Mutex::new(Vec::new()),
    });
    let app = Router::new()
        .route(
            GENERATE_PATH,
            post(
                |State(state): State<Arc<StubState>>,
                 multipart: Multipart| async move {
                    handle_stub(GENERATE_PATH, state, multipart).await
                },
            ),
        )
        .route(
            CREATE_STORY_PATH,
            post(
                |State(state): State<Arc<StubState>>,
                 multipart: Multipart| async move {
                    handle_stub(CREATE_STORY_PATH, state, multipart).await
                },
            ),
        )
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

/// URL of a port nothing listens on.
pub async fn dead_server_url() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

pub fn generation_json(quote: &str, author: &str, title: &str, commentary: &str) -> serde_json::Value {
    serde_json::json!({
        "quote": quote,
        "source": { "author": author, "title": title },
        "commentary": commentary,
    })
}
