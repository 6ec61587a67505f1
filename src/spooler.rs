//! Print spooler adapters.
//!
//! The rest of the crate only needs a way to hand over a rendered label and
//! to ask whether the printer is there. [`CupsSpooler`] does both with the
//! CUPS command line tools.

use image::{ImageFormat, RgbImage};
use log::{debug, info};
use serde::Serialize;
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use crate::{config::Config, error::SpoolerError, media::LabelSize};

/// Job number assigned by the spooler.
pub type JobId = u32;

/// Trait for print spoolers.
pub trait Spooler {
    /// Queue `copies` prints of `image` on `size` labels.
    ///
    /// The spooler is asked to use the size's media code and to fit the image
    /// to the page.
    fn submit(
        &self,
        image: &RgbImage,
        size: LabelSize,
        copies: u32,
        title: &str,
    ) -> Result<JobId, SpoolerError>;

    /// Current printer status, or `None` when the spooler does not know the printer.
    fn status(&self) -> Result<Option<PrinterStatus>, SpoolerError>;
}

impl<S: Spooler + ?Sized> Spooler for &S {
    fn submit(
        &self,
        image: &RgbImage,
        size: LabelSize,
        copies: u32,
        title: &str,
    ) -> Result<JobId, SpoolerError> {
        (**self).submit(image, size, copies, title)
    }

    fn status(&self) -> Result<Option<PrinterStatus>, SpoolerError> {
        (**self).status()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterState {
    Idle,
    Printing,
    Disabled,
    Unknown,
}

/// Printer status as reported by the spooler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrinterStatus {
    pub name: String,
    pub state: PrinterState,
    pub message: String,
}

/// Spooler backed by the CUPS `lp` and `lpstat` commands.
#[derive(Debug, Clone)]
pub struct CupsSpooler {
    printer: String,
}

impl CupsSpooler {
    pub fn new(printer: impl Into<String>) -> Self {
        CupsSpooler {
            printer: printer.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.get_printer_name())
    }

    pub fn printer_name(&self) -> &str {
        &self.printer
    }
}

impl Spooler for CupsSpooler {
    fn submit(
        &self,
        image: &RgbImage,
        size: LabelSize,
        copies: u32,
        title: &str,
    ) -> Result<JobId, SpoolerError> {
        // Removed when `tmp` drops, whichever way this function returns.
        let mut tmp = tempfile::Builder::new()
            .prefix("label-")
            .suffix(".png")
            .tempfile()?;
        image.write_to(tmp.as_file_mut(), ImageFormat::Png)?;
        tmp.as_file_mut().flush()?;

        let args = lp_args(&self.printer, title, size, copies, tmp.path());
        debug!("lp {:?}", args);

        let output = Command::new("lp")
            .args(&args)
            .output()
            .map_err(|source| SpoolerError::Launch {
                program: "lp",
                source,
            })?;

        if !output.status.success() {
            return Err(SpoolerError::Rejected(failure_message(
                &output.stderr,
                "lp",
                output.status,
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let job_id = parse_job_id(&stdout)
            .ok_or_else(|| SpoolerError::UnexpectedOutput(stdout.trim().to_string()))?;
        info!("submitted job {} to {}", job_id, self.printer);
        Ok(job_id)
    }

    fn status(&self) -> Result<Option<PrinterStatus>, SpoolerError> {
        let output = Command::new("lpstat")
            .arg("-p")
            .arg(&self.printer)
            .output()
            .map_err(|source| SpoolerError::Launch {
                program: "lpstat",
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_unknown_printer(&stderr) {
                debug!("printer {} not found: {}", self.printer, stderr.trim());
                return Ok(None);
            }
            return Err(SpoolerError::Rejected(failure_message(
                &output.stderr,
                "lpstat",
                output.status,
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_status(&self.printer, &stdout))
    }
}

/// Arguments for `lp`: destination, title, copies, media, fit-to-page, file.
fn lp_args(printer: &str, title: &str, size: LabelSize, copies: u32, file: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    args.push("-d".into());
    args.push(printer.into());
    args.push("-t".into());
    args.push(title.into());
    args.push("-n".into());
    args.push(copies.to_string().into());
    args.push("-o".into());
    args.push(format!("media={}", size.media_code()).into());
    args.push("-o".into());
    args.push("fit-to-page".into());
    args.push(file.as_os_str().to_os_string());
    args
}

fn failure_message(stderr: &[u8], program: &str, status: std::process::ExitStatus) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("{} exited with {}", program, status)
    } else {
        stderr.to_string()
    }
}

/// Extract the job number from `request id is <printer>-<n> (1 file(s))`.
fn parse_job_id(stdout: &str) -> Option<JobId> {
    let rest = stdout.split("request id is ").nth(1)?;
    let request = rest.split_whitespace().next()?;
    let (_, number) = request.rsplit_once('-')?;
    number.parse().ok()
}

fn is_unknown_printer(stderr: &str) -> bool {
    let stderr = stderr.to_lowercase();
    stderr.contains("invalid destination")
        || stderr.contains("does not exist")
        || stderr.contains("unknown printer")
}

/// Parse `lpstat -p` output for `printer`.
fn parse_status(printer: &str, stdout: &str) -> Option<PrinterStatus> {
    let prefix = format!("printer {} ", printer);
    let mut lines = stdout.lines().skip_while(|line| !line.starts_with(&prefix));
    let first = lines.next()?;
    let rest = &first[prefix.len()..];

    let state = if rest.starts_with("is idle") {
        PrinterState::Idle
    } else if rest.starts_with("now printing") {
        PrinterState::Printing
    } else if rest.starts_with("disabled") {
        PrinterState::Disabled
    } else {
        PrinterState::Unknown
    };

    // Continuation lines are indented, the next printer's line is not.
    let mut message = first.trim().to_string();
    for line in lines.take_while(|line| line.starts_with(char::is_whitespace)) {
        message.push('\n');
        message.push_str(line.trim());
    }

    Some(PrinterStatus {
        name: printer.to_string(),
        state,
        message,
    })
}
