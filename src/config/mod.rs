use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

use crate::export::{PdfExporter, PrintExporter};
use crate::invoice_gen::HostelProfile;

/// Prefix for every environment variable the application reads.
pub const ENV_PREFIX: &str = "HOSTEL_";

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_name() -> String {
    "St. Johns Boys Hostel".to_string()
}

fn default_location() -> String {
    "Bangalore, Karnataka".to_string()
}

fn default_phones() -> Vec<String> {
    vec!["+91 98765 43210".to_string(), "+91 98765 43211".to_string()]
}

fn default_email() -> String {
    "info@stjohnshostel.com".to_string()
}

fn default_seal_lines() -> Vec<String> {
    vec!["ST. JOHNS".to_string(), "BOYS HOSTEL".to_string()]
}

fn default_print_command() -> String {
    "lp".to_string()
}

fn default_print_timeout_secs() -> u64 {
    10
}

fn default_image_timeout_secs() -> u64 {
    3
}

fn default_log_file() -> PathBuf {
    PathBuf::from("hostel-invoice.log")
}

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Directory exported PDF files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_location")]
    pub location: String,

    /// Comma separated contact numbers
    #[serde(default = "default_phones")]
    pub phones: Vec<String>,

    #[serde(default = "default_email")]
    pub email: String,

    #[serde(default)]
    pub logo_path: Option<PathBuf>,

    #[serde(default = "default_seal_lines")]
    pub seal_lines: Vec<String>,

    /// Command that receives the assembled print page as its last argument
    #[serde(default = "default_print_command")]
    pub print_command: String,

    /// Seconds to wait for the print command before asking; at least one
    #[serde(default = "default_print_timeout_secs")]
    pub print_timeout_secs: u64,

    #[serde(default = "default_image_timeout_secs")]
    pub image_timeout_secs: u64,

    /// Where print pages are staged; the system temp directory when unset
    #[serde(default)]
    pub print_scratch_dir: Option<PathBuf>,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Config {
    /// Load configuration from `HOSTEL_*` environment variables
    pub fn load() -> Result<Self> {
        let config = envy::prefixed(ENV_PREFIX).from_env::<Config>()?;
        Ok(config)
    }

    pub fn hostel_profile(&self) -> HostelProfile {
        HostelProfile {
            name: self.name.clone(),
            location: self.location.clone(),
            phones: self
                .phones
                .iter()
                .map(|phone| phone.trim().to_string())
                .filter(|phone| !phone.is_empty())
                .collect(),
            email: self.email.clone(),
            logo_path: self.logo_path.clone(),
            seal_lines: self.seal_lines.clone(),
        }
    }

    pub fn pdf_exporter(&self) -> PdfExporter {
        PdfExporter::new(&self.output_dir)
    }

    /// How long a print job runs before the user is asked whether it finished.
    pub fn print_wait_period(&self) -> Duration {
        Duration::from_secs(self.print_timeout_secs.max(1))
    }

    pub fn print_exporter(&self) -> PrintExporter {
        let exporter = PrintExporter::new(
            &self.print_command,
            Duration::from_secs(self.image_timeout_secs),
            self.print_wait_period(),
        );
        match &self.print_scratch_dir {
            Some(dir) => exporter.with_scratch_dir(dir),
            None => exporter,
        }
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    // A missing .env file is fine
    dotenv().ok();

    Config::load()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        envy::prefixed(ENV_PREFIX)
            .from_iter(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())))
            .unwrap()
    }

    #[test]
    fn defaults_apply_without_variables() {
        let config = from_pairs(&[]);

        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.print_command, "lp");
        assert_eq!(config.print_timeout_secs, 10);
        assert_eq!(config.logo_path, None);
        assert_eq!(config.print_scratch_dir, None);

        let profile = config.hostel_profile();
        assert_eq!(profile.name, "St. Johns Boys Hostel");
        assert_eq!(profile.phones.len(), 2);
        assert_eq!(profile.seal_lines, vec!["ST. JOHNS", "BOYS HOSTEL"]);
    }

    #[test]
    fn variables_override_defaults() {
        let config = from_pairs(&[
            ("HOSTEL_OUTPUT_DIR", "/srv/invoices"),
            ("HOSTEL_NAME", "Green Valley Hostel"),
            ("HOSTEL_PHONES", "+91 11111 22222, +91 33333 44444"),
            ("HOSTEL_LOGO_PATH", "/srv/logo.png"),
            ("HOSTEL_PRINT_COMMAND", "lp -d office"),
            ("HOSTEL_PRINT_TIMEOUT_SECS", "30"),
            ("UNRELATED", "ignored"),
        ]);

        assert_eq!(config.output_dir, PathBuf::from("/srv/invoices"));
        assert_eq!(config.print_command, "lp -d office");
        assert_eq!(config.print_timeout_secs, 30);

        let profile = config.hostel_profile();
        assert_eq!(profile.name, "Green Valley Hostel");
        assert_eq!(profile.phones, vec!["+91 11111 22222", "+91 33333 44444"]);
        assert_eq!(profile.logo_path, Some(PathBuf::from("/srv/logo.png")));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let vars = vec![("HOSTEL_PRINT_TIMEOUT_SECS".to_string(), "soon".to_string())];
        let result = envy::prefixed(ENV_PREFIX).from_iter::<_, Config>(vars);
        assert!(result.is_err());
    }

    #[test]
    fn print_wait_is_at_least_one_second() {
        let config = from_pairs(&[("HOSTEL_PRINT_TIMEOUT_SECS", "0")]);
        assert_eq!(config.print_timeout_secs, 0);
        assert_eq!(config.print_wait_period(), Duration::from_secs(1));

        let config = from_pairs(&[("HOSTEL_PRINT_TIMEOUT_SECS", "45")]);
        assert_eq!(config.print_wait_period(), Duration::from_secs(45));
        assert_eq!(from_pairs(&[]).print_wait_period(), Duration::from_secs(10));
    }
}
