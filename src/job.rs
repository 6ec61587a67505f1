use log::{debug, info};
use serde::Serialize;
use std::collections::HashSet;

use crate::{
    config::Config,
    error::Error,
    media::LabelSize,
    memory::{RecencyStore, SavedLabel},
    model::LabelRequest,
    render::{check_font_size, preview_data_url, Renderer},
    spooler::{CupsSpooler, JobId, PrinterStatus, Spooler},
};

/// Title given to every print job.
pub const JOB_TITLE: &str = "Label";

/// Result of a successful print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintReceipt {
    pub job_id: JobId,
    pub message: String,
    /// The entry recorded in the recency list for this print.
    #[serde(skip)]
    pub entry: SavedLabel,
}

/// Preview, print and remember labels.
///
/// One method per action of the label web page. The service owns the
/// recency list, so sharing it between threads needs an outer lock.
pub struct LabelService<S> {
    renderer: Renderer,
    spooler: S,
    store: RecencyStore,
}

impl LabelService<CupsSpooler> {
    /// Service printing through CUPS with every setting taken from `config`.
    pub fn from_config(config: &Config) -> Self {
        LabelService::new(
            Renderer::from_config(config),
            CupsSpooler::from_config(config),
            RecencyStore::open(config.get_memory_file()),
        )
    }
}

impl<S: Spooler> LabelService<S> {
    pub fn new(renderer: Renderer, spooler: S, store: RecencyStore) -> Self {
        LabelService {
            renderer,
            spooler,
            store,
        }
    }

    /// Label sizes offered to the user.
    pub fn label_sizes(&self) -> &'static [LabelSize] {
        LabelSize::all()
    }

    /// Render `request` and return it as a PNG data URL.
    pub fn preview(&self, request: &LabelRequest) -> Result<String, Error> {
        let image = self.renderer.render_request(request)?;
        preview_data_url(&image)
    }

    /// Render and print `request`, then remember it.
    ///
    /// Nothing is recorded when rendering or submission fails.
    pub fn print(&mut self, request: &LabelRequest) -> Result<PrintReceipt, Error> {
        if request.text.is_empty() {
            return Err(Error::EmptyText);
        }
        if request.copies == 0 {
            return Err(Error::InvalidCopies);
        }
        check_font_size(request.font_size)?;
        let size = LabelSize::from_code(&request.label_size)?;

        let image = self
            .renderer
            .render_size(&request.text, size, request.font_size, request.align);
        debug!("rendered {}x{} label", image.width(), image.height());

        let job_id = self
            .spooler
            .submit(&image, size, request.copies, JOB_TITLE)?;
        info!("print job {} submitted for {:?}", job_id, request.text);

        let entry = self.store.save(request);
        Ok(PrintReceipt {
            job_id,
            message: format!("Print job {} submitted successfully", job_id),
            entry,
        })
    }

    /// Printer status, or `None` when the spooler does not know the printer.
    pub fn status(&self) -> Result<Option<PrinterStatus>, Error> {
        self.spooler.status().map_err(Error::Status)
    }

    /// Recently printed labels, most recent first.
    pub fn memory(&self) -> &[SavedLabel] {
        self.store.list()
    }

    /// Drop the given entries from the recency list.
    pub fn forget(&mut self, ids: &HashSet<String>) -> &[SavedLabel] {
        self.store.delete(ids)
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn spooler(&self) -> &S {
        &self.spooler
    }

    pub fn store(&self) -> &RecencyStore {
        &self.store
    }
}
