use shared::domain::GenerationResult;

use crate::surface::{Element, Surface};

/// Text shown for one generation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub quote: String,
    pub source_line: String,
    pub commentary: String,
}

impl From<&GenerationResult> for ResultView {
    fn from(result: &GenerationResult) -> Self {
        Self {
            quote: result.quote.clone(),
            source_line: format!("— {}, 「{}」", result.source.author, result.source.title),
            commentary: result.commentary.clone(),
        }
    }
}

/// Replaces whatever result text is on the surface and reveals the result container.
pub fn present(surface: &dyn Surface, result: &GenerationResult) {
    surface.show_result(&ResultView::from(result));
    surface.set_visible(Element::Result, true);
}
