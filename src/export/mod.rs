pub mod pdf;
pub mod print;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::invoice_gen::RenderedInvoice;

pub use pdf::PdfExporter;
pub use print::{PrintExporter, PrintJob};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF generation failed: {0}")]
    PdfGeneration(String),

    #[error("print window could not be opened: {0}")]
    PrintWindowBlocked(String),

    #[error("printing failed: {0}")]
    PrintAssembly(String),
}

impl ExportError {
    /// Text for the blocking notification shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ExportError::PdfGeneration(_) => {
                "PDF generation failed. Please try the print option instead.".to_string()
            }
            ExportError::PrintWindowBlocked(_) => concat!(
                "Unable to open the print window. ",
                "Please check that printing is allowed and try again."
            )
            .to_string(),
            ExportError::PrintAssembly(reason) => {
                format!("Printing failed: {}. Please try again.", reason)
            }
        }
    }
}

#[derive(Debug)]
pub enum ExportReceipt {
    /// A file was written.
    Saved(PathBuf),
    /// The print command finished.
    Printed,
    /// The print command is still running after the fallback timer.
    PrintPending(PrintJob),
}

/// Turns a rendered invoice into something outside the application.
#[async_trait]
pub trait Exporter: Send + Sync {
    fn label(&self) -> &'static str;

    async fn export(&self, document: &RenderedInvoice) -> Result<ExportReceipt, ExportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_failures_point_at_printing() {
        let err = ExportError::PdfGeneration("font table missing".into());
        assert_eq!(
            err.user_message(),
            "PDF generation failed. Please try the print option instead."
        );
        assert_eq!(err.to_string(), "PDF generation failed: font table missing");
    }

    #[test]
    fn print_failures_carry_their_reason() {
        let err = ExportError::PrintAssembly("lp exited with status 1".into());
        assert_eq!(
            err.user_message(),
            "Printing failed: lp exited with status 1. Please try again."
        );
    }
}
