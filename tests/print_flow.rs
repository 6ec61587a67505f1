use dymo_label::{
    ink_bounds, Alignment, Error, JobId, LabelRequest, LabelService, LabelSize, PrinterState,
    PrinterStatus, RecencyStore, Renderer, SavedLabel, Spooler, SpoolerError,
};
use image::RgbImage;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fs;
use tempfile::TempDir;

/// Spooler that keeps every submitted image instead of printing it.
struct RecordingSpooler {
    next_job: Cell<JobId>,
    jobs: RefCell<Vec<(RgbImage, LabelSize, u32)>>,
}

impl RecordingSpooler {
    fn new() -> Self {
        RecordingSpooler {
            next_job: Cell::new(1),
            jobs: RefCell::new(Vec::new()),
        }
    }
}

impl Spooler for RecordingSpooler {
    fn submit(
        &self,
        image: &RgbImage,
        size: LabelSize,
        copies: u32,
        _title: &str,
    ) -> Result<JobId, SpoolerError> {
        let job = self.next_job.get();
        self.next_job.set(job + 1);
        self.jobs.borrow_mut().push((image.clone(), size, copies));
        Ok(job)
    }

    fn status(&self) -> Result<Option<PrinterStatus>, SpoolerError> {
        Ok(Some(PrinterStatus {
            name: "dymo".to_string(),
            state: PrinterState::Idle,
            message: "printer dymo is idle.".to_string(),
        }))
    }
}

fn open_service(dir: &TempDir) -> LabelService<RecordingSpooler> {
    LabelService::new(
        Renderer::builtin(300),
        RecordingSpooler::new(),
        RecencyStore::open(dir.path().join("saved_labels.json")),
    )
}

#[test]
fn printed_labels_survive_restart() {
    let dir = TempDir::new().unwrap();

    let printed: Vec<SavedLabel> = {
        let mut service = open_service(&dir);
        service.print(&LabelRequest::new("One")).unwrap();
        service
            .print(&LabelRequest::new("Two").label_size("99012").align(Alignment::Left))
            .unwrap();
        service.memory().to_vec()
    };

    let service = open_service(&dir);
    assert_eq!(service.memory(), printed.as_slice());
    assert_eq!(service.memory()[0].text, "Two");
    assert_eq!(service.memory()[0].label_size, "99012");
}

#[test]
fn persisted_file_is_a_json_array_of_entries() {
    let dir = TempDir::new().unwrap();
    let mut service = open_service(&dir);
    service.print(&LabelRequest::new("Persist Me")).unwrap();

    let raw = fs::read_to_string(dir.path().join("saved_labels.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["text"], "Persist Me");
    assert_eq!(items[0]["label_size"], "11354");
    assert_eq!(items[0]["font_size"], 40);
    assert_eq!(items[0]["align"], "center");
    assert_eq!(items[0]["copies"], 1);
    assert!(items[0]["id"].is_string());
}

#[test]
fn submitted_image_matches_label_size() {
    let dir = TempDir::new().unwrap();
    let mut service = open_service(&dir);
    service
        .print(&LabelRequest::new("Ship it").label_size("30256").copies(4))
        .unwrap();

    let jobs = service.spooler().jobs.borrow();
    let (image, size, copies) = &jobs[0];
    assert_eq!(*size, LabelSize::Shipping30256);
    assert_eq!(*copies, 4);
    assert_eq!(image.dimensions(), (697, 1193));
    assert!(ink_bounds(image).is_some());
}

#[test]
fn job_ids_come_from_spooler() {
    let dir = TempDir::new().unwrap();
    let mut service = open_service(&dir);
    let first = service.print(&LabelRequest::new("A")).unwrap();
    let second = service.print(&LabelRequest::new("B")).unwrap();
    assert_eq!(first.job_id, 1);
    assert_eq!(second.job_id, 2);
    assert_eq!(second.message, "Print job 2 submitted successfully");
}

#[test]
fn select_all_and_delete_empties_memory() {
    let dir = TempDir::new().unwrap();
    let mut service = open_service(&dir);
    service.print(&LabelRequest::new("One")).unwrap();
    service.print(&LabelRequest::new("Two")).unwrap();

    let all: HashSet<String> = service.memory().iter().map(|e| e.id.clone()).collect();
    assert!(service.forget(&all).is_empty());

    let reopened = open_service(&dir);
    assert!(reopened.memory().is_empty());
}

#[test]
fn failed_render_input_never_reaches_spooler() {
    let dir = TempDir::new().unwrap();
    let mut service = open_service(&dir);
    let err = service
        .print(&LabelRequest::new("Hello").label_size("12345"))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownSize(ref code) if code == "12345"));
    assert!(service.spooler().jobs.borrow().is_empty());
}

#[test]
fn status_reports_spooler_record() {
    let dir = TempDir::new().unwrap();
    let service = open_service(&dir);
    let status = service.status().unwrap().unwrap();
    assert_eq!(status.state, PrinterState::Idle);
}
