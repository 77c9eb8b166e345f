use shared::domain::{GenerationResult, SourceImage};

/// Page-lifetime state: the selected image and the latest generation result.
#[derive(Debug, Default, Clone)]
pub struct SessionState {
    source_image: Option<SourceImage>,
    result: Option<GenerationResult>,
}

impl SessionState {
    pub fn source_image(&self) -> Option<&SourceImage> {
        self.source_image.as_ref()
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    pub(crate) fn replace_source_image(&mut self, image: SourceImage) {
        self.source_image = Some(image);
    }

    pub(crate) fn replace_result(&mut self, result: GenerationResult) {
        self.result = Some(result);
    }

    /// Both pieces the export flow needs, cloned so the lock can be released before I/O.
    pub(crate) fn share_snapshot(&self) -> Option<(SourceImage, GenerationResult)> {
        Some((self.source_image.clone()?, self.result.clone()?))
    }
}
