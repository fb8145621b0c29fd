mod auth;
mod config;
mod export;
mod invoice_gen;
mod models;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::export::Exporter;
use crate::invoice_gen::HostelProfile;
use crate::models::Invoice;
use crate::ui::{
    login::{LoginState, LoginAction, render_login, handle_input as handle_login_input},
    invoice_form::{
        InvoiceFormState, InvoiceFormAction, render_invoice_form,
        handle_input as handle_invoice_form_input,
    },
};

/// Hostel student billing: fill in an invoice, preview it, save it as PDF or print it.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Directory exported PDF files are written to (overrides HOSTEL_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Log file (overrides HOSTEL_LOG_FILE)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// Represents the current screen in the app
enum AppScreen {
    Login,
    Invoice,
}

// Main application state
struct AppState {
    profile: HostelProfile,
    screen: AppScreen,
    login_state: Option<LoginState>,
    invoice_form_state: Option<InvoiceFormState>,
    pdf_exporter: Box<dyn Exporter>,
    print_exporter: Box<dyn Exporter>,
}

impl AppState {
    fn new(
        profile: HostelProfile,
        pdf_exporter: Box<dyn Exporter>,
        print_exporter: Box<dyn Exporter>,
    ) -> Self {
        let login_state = LoginState::new(&profile.name);
        Self {
            profile,
            screen: AppScreen::Login,
            login_state: Some(login_state),
            invoice_form_state: None,
            pdf_exporter,
            print_exporter,
        }
    }
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("could not open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = config::init()?;
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(log_file) = cli.log_file {
        config.log_file = log_file;
    }

    init_logging(&config.log_file)?;

    let pdf_exporter = config.pdf_exporter();
    info!(
        output_dir = %pdf_exporter.output_dir().display(),
        print_command = %config.print_command,
        "starting"
    );

    let mut app_state = AppState::new(
        config.hostel_profile(),
        Box::new(pdf_exporter),
        Box::new(config.print_exporter()),
    );

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Show any error message
    if let Err(err) = result {
        println!("Error: {}", err);
    }

    // Don't leave a print command running after exit
    if let Some(state) = &mut app_state.invoice_form_state {
        state.finish_print().await;
    }

    info!("exiting");
    println!("Thanks for using {} invoicing!", app_state.profile.name);

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        // Render current screen
        terminal.draw(|f| {
            match app_state.screen {
                AppScreen::Login => {
                    if let Some(state) = &app_state.login_state {
                        render_login(f, state);
                    }
                }
                AppScreen::Invoice => {
                    if let Some(state) = &mut app_state.invoice_form_state {
                        render_invoice_form(f, state, &app_state.profile);
                    }
                }
            }
        })?;

        // Handle input for current screen
        let should_quit = match app_state.screen {
            AppScreen::Login => handle_login_screen(app_state)?,
            AppScreen::Invoice => handle_invoice_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_login_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.login_state {
        match handle_login_input(state)? {
            Some(LoginAction::Exit) => return Ok(true),
            Some(LoginAction::Authenticated) => {
                app_state.login_state = None;
                app_state.invoice_form_state = Some(InvoiceFormState::new(Invoice::default()));
                app_state.screen = AppScreen::Invoice;
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_invoice_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.invoice_form_state {
        match handle_invoice_form_input(state)? {
            Some(InvoiceFormAction::Quit) => return Ok(true),
            Some(InvoiceFormAction::ExportPdf) => {
                state.run_export(app_state.pdf_exporter.as_ref(), &app_state.profile).await;
            }
            Some(InvoiceFormAction::Print) => {
                state.run_export(app_state.print_exporter.as_ref(), &app_state.profile).await;
            }
            Some(InvoiceFormAction::FinishPrint) => state.finish_print().await,
            Some(InvoiceFormAction::KeepWaitingForPrint) => state.keep_waiting_for_print().await,
            None => {}
        }
    }

    Ok(false)
}
