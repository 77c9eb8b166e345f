//! Terminal rendering of the workflow surface.

use client_core::{Control, Element, Notice, PreviewImage, ResultView, Surface};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct TerminalSurface;

impl Surface for TerminalSurface {
    fn set_visible(&self, element: Element, visible: bool) {
        debug!(?element, visible, "surface visibility");
    }

    fn set_control(&self, control: Control, enabled: bool, label: &str) {
        debug!(?control, enabled, label, "surface control");
    }

    fn set_loading_message(&self, message: &str) {
        info!("{message}");
    }

    fn show_preview(&self, preview: &PreviewImage) {
        info!(
            file_name = %preview.file_name,
            data_url_len = preview.data_url.len(),
            "preview ready"
        );
    }

    fn show_result(&self, view: &ResultView) {
        println!();
        println!("{}", view.quote);
        println!();
        println!("    {}", view.source_line);
        println!();
        println!("{}", view.commentary);
        println!();
    }

    fn notify(&self, notice: &Notice) {
        eprintln!("{} failed: {}", notice.flow, notice.message);
    }
}
