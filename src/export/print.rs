use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use tempfile::TempDir;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use super::{ExportError, ExportReceipt, Exporter};
use crate::invoice_gen::{INVOICE_STYLESHEET, RenderedInvoice, escape_html};

/// Appended after the invoice styles in the document sent to the printer.
pub const PRINT_OVERRIDES: &str = r#"
@page { size: letter; margin: 0.5in; }
@media print {
  body { margin: 0; padding: 0; }
  .no-print, button, nav { display: none !important; }
}
* {
  -webkit-print-color-adjust: exact !important;
  print-color-adjust: exact !important;
  color-adjust: exact !important;
}
html, body { -webkit-text-size-adjust: 100%; text-size-adjust: 100%; zoom: 1; }
.invoice { transform: none !important; box-shadow: none !important; }
"#;

/// Build the standalone page handed to the print command.
pub fn assemble_print_document(doc: &RenderedInvoice, logo_src: Option<&str>) -> String {
    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    page.push_str(&format!("<title>{}</title>\n", escape_html(&doc.title())));
    page.push_str("<style>");
    page.push_str(INVOICE_STYLESHEET);
    page.push_str("</style>\n<style>");
    page.push_str(PRINT_OVERRIDES);
    page.push_str("</style>\n</head>\n<body>\n");
    page.push_str(&doc.to_html_with_logo(logo_src));
    page.push_str("</body>\n</html>\n");
    page
}

fn mime_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

/// Load an image as a data URI, giving up after `limit`.
async fn load_image(path: &Path, limit: Duration) -> Option<String> {
    match tokio::time::timeout(limit, tokio::fs::read(path)).await {
        Ok(Ok(bytes)) => Some(format!("data:{};base64,{}", mime_for(path), BASE64.encode(bytes))),
        Ok(Err(e)) => {
            warn!(path = %path.display(), error = %e, "image could not be loaded for printing");
            None
        }
        Err(_) => {
            warn!(path = %path.display(), "image load timed out");
            None
        }
    }
}

/// Scratch space holding one assembled print page. Removed on drop.
#[derive(Debug)]
pub struct PrintContext {
    dir: TempDir,
}

impl PrintContext {
    fn open(parent: Option<&Path>) -> std::io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("invoice-print-");
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        Ok(Self { dir })
    }

    fn write_page(&self, html: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join("invoice.html");
        std::fs::write(&path, html)?;
        Ok(path)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// A print command that has been started and the page it is printing.
#[derive(Debug)]
pub struct PrintJob {
    context: PrintContext,
    child: Child,
    wait_period: Duration,
}

impl PrintJob {
    /// Wait up to one period for the command. `Ok(false)` means it is still running.
    pub async fn wait(&mut self) -> Result<bool, ExportError> {
        match tokio::time::timeout(self.wait_period, self.child.wait()).await {
            Ok(Ok(status)) if status.success() => Ok(true),
            Ok(Ok(status)) => Err(ExportError::PrintAssembly(format!(
                "print command exited with {}",
                status
            ))),
            Ok(Err(e)) => Err(ExportError::PrintAssembly(e.to_string())),
            Err(_) => Ok(false),
        }
    }

    /// Stop the command if it is still running and discard the page.
    pub async fn close(mut self) {
        if let Ok(None) = self.child.try_wait() {
            if let Err(e) = self.child.kill().await {
                warn!(error = %e, "could not stop print command");
            }
        }
        debug!(context = %self.context.path().display(), "print context closed");
    }
}

/// Sends invoices to the platform print facility through an external command.
pub struct PrintExporter {
    program: String,
    args: Vec<String>,
    image_timeout: Duration,
    wait_period: Duration,
    scratch_dir: Option<PathBuf>,
}

impl PrintExporter {
    /// `command` is split on whitespace; the assembled page path is appended.
    pub fn new(command: &str, image_timeout: Duration, wait_period: Duration) -> Self {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_else(|| "lp".to_string());
        Self {
            program,
            args: parts.collect(),
            image_timeout,
            wait_period,
            scratch_dir: None,
        }
    }

    /// Create print contexts under `dir` instead of the system temp directory.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl Exporter for PrintExporter {
    fn label(&self) -> &'static str {
        "print"
    }

    async fn export(&self, document: &RenderedInvoice) -> Result<ExportReceipt, ExportError> {
        let context = PrintContext::open(self.scratch_dir.as_deref())
            .map_err(|e| ExportError::PrintWindowBlocked(e.to_string()))?;

        let logo_src = match document.images().first() {
            Some(image) => load_image(image, self.image_timeout).await,
            None => None,
        };

        let html = assemble_print_document(document, logo_src.as_deref());
        let page = context
            .write_page(&html)
            .map_err(|e| ExportError::PrintAssembly(e.to_string()))?;

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&page)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ExportError::PrintAssembly(format!("could not run {}: {}", self.program, e))
            })?;
        info!(program = %self.program, page = %page.display(), "print job started");

        let mut job = PrintJob {
            context,
            child,
            wait_period: self.wait_period,
        };

        match job.wait().await {
            Ok(true) => {
                job.close().await;
                Ok(ExportReceipt::Printed)
            }
            Ok(false) => Ok(ExportReceipt::PrintPending(job)),
            Err(e) => {
                job.close().await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice_gen::render_invoice;
    use crate::invoice_gen::tests::{billed_invoice, profile};
    use chrono::NaiveDate;

    fn rendered_with_logo(logo: Option<PathBuf>) -> RenderedInvoice {
        let mut profile = profile();
        profile.logo_path = logo;
        render_invoice(&billed_invoice(), &profile, NaiveDate::from_ymd_opt(2024, 7, 20).unwrap())
    }

    fn exporter(command: &str, scratch: &Path) -> PrintExporter {
        PrintExporter::new(command, Duration::from_millis(500), Duration::from_secs(5))
            .with_scratch_dir(scratch)
    }

    #[test]
    fn print_document_clones_markup_and_styles() {
        let doc = rendered_with_logo(None);
        let page = assemble_print_document(&doc, None);

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Invoice - INV-123456</title>"));
        assert!(page.contains(INVOICE_STYLESHEET));
        assert!(page.contains("print-color-adjust: exact"));
        assert!(page.contains("@page { size: letter; margin: 0.5in; }"));
        assert!(page.contains(".no-print, button, nav { display: none !important; }"));
        assert!(page.contains(&doc.to_html_with_logo(None)));
    }

    #[test]
    fn command_line_is_split_on_whitespace() {
        let exporter =
            PrintExporter::new("lp -d front-desk", Duration::from_secs(1), Duration::from_secs(1));
        assert_eq!(exporter.program, "lp");
        assert_eq!(exporter.args, vec!["-d", "front-desk"]);
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for(Path::new("logo.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("logo.jpeg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("logo.svg")), "image/svg+xml");
    }

    #[tokio::test]
    async fn images_are_inlined_or_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        std::fs::write(&logo, [0x89, b'P', b'N', b'G']).unwrap();

        let loaded = load_image(&logo, Duration::from_secs(1)).await;
        assert_eq!(loaded.as_deref(), Some("data:image/png;base64,iVBORw=="));

        let missing = load_image(&dir.path().join("nope.png"), Duration::from_secs(1)).await;
        assert_eq!(missing, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_command_prints_and_cleans_up() {
        let scratch = tempfile::tempdir().unwrap();
        let receipt = exporter("true", scratch.path())
            .export(&rendered_with_logo(None))
            .await
            .unwrap();

        assert!(matches!(receipt, ExportReceipt::Printed));
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn page_handed_to_printer_inlines_the_logo() {
        let scratch = tempfile::tempdir().unwrap();
        let logo = scratch.path().join("logo.png");
        std::fs::write(&logo, b"png").unwrap();
        // `cp -t <dir> <page>` keeps a copy of the page after the context is gone.
        let command = format!("cp -t {}", scratch.path().display());
        let receipt = exporter(&command, scratch.path())
            .export(&rendered_with_logo(Some(logo)))
            .await
            .unwrap();
        assert!(matches!(receipt, ExportReceipt::Printed));

        let printed = std::fs::read_to_string(scratch.path().join("invoice.html")).unwrap();
        assert!(printed.contains("src=\"data:image/png;base64,cG5n\""));
        assert!(printed.contains("Total Amount: ₹8,200"));
    }

    #[tokio::test]
    async fn missing_command_is_reported() {
        let scratch = tempfile::tempdir().unwrap();
        let err = exporter("definitely-not-a-print-command", scratch.path())
            .export(&rendered_with_logo(None))
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::PrintAssembly(_)));
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_is_reported() {
        let scratch = tempfile::tempdir().unwrap();
        let err = exporter("false", scratch.path())
            .export(&rendered_with_logo(None))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::PrintAssembly(_)));
    }

    #[tokio::test]
    async fn unavailable_context_blocks_printing() {
        let scratch = tempfile::tempdir().unwrap();
        let err = exporter("true", &scratch.path().join("gone"))
            .export(&rendered_with_logo(None))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::PrintWindowBlocked(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_command_waits_for_confirmation() {
        let scratch = tempfile::tempdir().unwrap();
        let exporter = PrintExporter {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "sleep 5".to_string()],
            image_timeout: Duration::from_millis(500),
            wait_period: Duration::from_millis(100),
            scratch_dir: Some(scratch.path().to_path_buf()),
        };

        let receipt = exporter.export(&rendered_with_logo(None)).await.unwrap();
        let mut job = match receipt {
            ExportReceipt::PrintPending(job) => job,
            other => panic!("unexpected receipt {:?}", other),
        };

        assert!(!job.wait().await.unwrap());
        job.close().await;
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }
}
