use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use shared::{
    domain::{GenerationResult, SourceImage},
    protocol::{StoryRequest, STORY_FILENAME},
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub mod download;
pub mod error;
pub mod flow;
pub mod presentation;
pub mod preview;
pub mod session;
pub mod surface;
pub mod transport;

pub use download::{DirectoryDownloads, DownloadSink, ObjectUrl};
pub use error::{ApiError, DownloadError, FlowError, PreviewError};
pub use flow::{FlowKind, FlowState};
pub use presentation::ResultView;
pub use preview::{PreviewImage, SelectedFile};
pub use session::SessionState;
pub use surface::{Control, Element, Notice, Surface};
pub use transport::{HttpQuoteApi, QuoteApi};

use flow::{BusyGuard, FlowSlot};

pub const GENERATION_LOADING_MESSAGE: &str = "Finding a passage for your image...";
pub const EXPORT_LOADING_MESSAGE: &str = "Designing the story image...";

/// Drives the select → generate → export workflow for one session.
///
/// The controller owns the session state. Flows snapshot what they need before going to
/// the network, so a slow request never holds the session lock.
pub struct WorkflowController {
    api: Arc<dyn QuoteApi>,
    surface: Arc<dyn Surface>,
    downloads: Arc<dyn DownloadSink>,
    session: Mutex<SessionState>,
    generation: FlowSlot,
    export: FlowSlot,
    selection_seq: AtomicU64,
}

impl WorkflowController {
    pub fn new(
        api: Arc<dyn QuoteApi>,
        surface: Arc<dyn Surface>,
        downloads: Arc<dyn DownloadSink>,
    ) -> Self {
        Self {
            api,
            surface,
            downloads,
            session: Mutex::new(SessionState::default()),
            generation: FlowSlot::new(FlowKind::Generation),
            export: FlowSlot::new(FlowKind::Export),
            selection_seq: AtomicU64::new(0),
        }
    }

    pub async fn session(&self) -> SessionState {
        self.session.lock().await.clone()
    }

    pub fn generation_state(&self) -> FlowState {
        self.generation.state()
    }

    pub fn export_state(&self) -> FlowState {
        self.export.state()
    }

    /// Stores the selection and shows its preview. A cleared selection changes nothing.
    ///
    /// Returns `None` when there was nothing to show, or when a newer selection arrived
    /// while this one was decoding.
    pub async fn select_image(
        &self,
        selection: Option<SelectedFile>,
    ) -> Result<Option<PreviewImage>, PreviewError> {
        let Some(file) = selection else {
            debug!("selection cleared; keeping current image");
            return Ok(None);
        };

        let image = file.into_image();
        info!(
            file_name = %image.file_name,
            mime_type = %image.mime_type,
            size_bytes = image.size_bytes(),
            "image selected"
        );

        let seq = {
            let mut session = self.session.lock().await;
            session.replace_source_image(image.clone());
            self.selection_seq.fetch_add(1, Ordering::SeqCst) + 1
        };

        let preview = preview::decode_preview(image).await?;

        let _session = self.session.lock().await;
        if self.selection_seq.load(Ordering::SeqCst) != seq {
            debug!(seq, "discarding preview of superseded selection");
            return Ok(None);
        }
        self.surface.show_preview(&preview);
        self.surface.set_visible(Element::Preview, true);
        self.surface.set_visible(Element::GenerateControl, true);
        Ok(Some(preview))
    }

    /// Sends the selected image for generation and presents the result.
    pub async fn generate(&self) -> Result<GenerationResult, FlowError> {
        let image = self.session.lock().await.source_image().cloned();
        let Some(image) = image else {
            return Err(self.reject(FlowKind::Generation, FlowError::MissingImage));
        };

        let mut busy = self.enter(
            &self.generation,
            Control::Generate,
            GENERATION_LOADING_MESSAGE,
        )?;
        self.surface.set_visible(Element::Result, false);
        self.surface.set_visible(Element::ShareControl, false);

        match self.request_generation(&image).await {
            Ok(result) => {
                busy.succeed();
                Ok(result)
            }
            Err(err) => Err(self.reject(FlowKind::Generation, err)),
        }
    }

    /// Renders the story image for the current result and downloads it.
    pub async fn export_story(&self) -> Result<(), FlowError> {
        let snapshot = self.session.lock().await.share_snapshot();
        let Some((image, result)) = snapshot else {
            return Err(self.reject(FlowKind::Export, FlowError::NothingToShare));
        };

        let mut busy = self.enter(&self.export, Control::Share, EXPORT_LOADING_MESSAGE)?;
        let request = StoryRequest::new(image, &result);

        match self.request_story(&request).await {
            Ok(()) => {
                busy.succeed();
                Ok(())
            }
            Err(err) => Err(self.reject(FlowKind::Export, err)),
        }
    }

    fn enter<'a>(
        &'a self,
        slot: &'a FlowSlot,
        control: Control,
        loading_message: &str,
    ) -> Result<BusyGuard<'a>, FlowError> {
        BusyGuard::acquire(slot, self.surface.as_ref(), control, loading_message).map_err(|err| {
            warn!(flow = %slot.kind(), "ignoring trigger while flow is busy");
            err
        })
    }

    async fn request_generation(&self, image: &SourceImage) -> Result<GenerationResult, FlowError> {
        let response = self.api.generate(image).await?;
        let result = GenerationResult::try_from(response)?;

        self.session.lock().await.replace_result(result.clone());
        presentation::present(self.surface.as_ref(), &result);
        self.surface.set_visible(Element::ShareControl, true);

        info!(
            author = %result.source.author,
            title = %result.source.title,
            "generation completed"
        );
        Ok(result)
    }

    async fn request_story(&self, request: &StoryRequest) -> Result<(), FlowError> {
        let blob = self.api.create_story(request).await?;
        info!(size_bytes = blob.len(), "story image received");
        download::download_blob(self.downloads.as_ref(), blob, STORY_FILENAME).await?;
        Ok(())
    }

    /// Shows the failure to the user. Runs while the busy guard is still held, so the
    /// notification comes before the control is restored.
    fn reject(&self, flow: FlowKind, err: FlowError) -> FlowError {
        warn!(%flow, error = %err, "flow failed");
        self.surface.notify(&Notice::new(flow, err.to_string()));
        err
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
