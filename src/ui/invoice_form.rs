use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode};
use tracing::{error, info};
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::export::{ExportReceipt, Exporter, PrintJob};
use crate::invoice_gen::{HostelProfile, format_inr, render_invoice};
use crate::models::{Invoice, InvoiceField, LineItemField, PaymentMethod};
use crate::ui::components::date_input::DateInputState;
use crate::ui::components::notification::{Notification, NotificationKind, render_notification};
use crate::ui::preview::render_preview;

// Represents a field in the invoice form, in tab order
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FormField {
    StudentName,
    RoomNo,
    PhoneNo,
    Date,
    Address,
    InvoiceNo,
    PaymentMethod,
    Items,
    Notes,
}

impl FormField {
    const ORDER: [FormField; 9] = [
        FormField::StudentName,
        FormField::RoomNo,
        FormField::PhoneNo,
        FormField::Date,
        FormField::Address,
        FormField::InvoiceNo,
        FormField::PaymentMethod,
        FormField::Items,
        FormField::Notes,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    fn previous(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// Fields edited as free text.
    fn text_field(self) -> Option<InvoiceField> {
        match self {
            FormField::StudentName => Some(InvoiceField::StudentName),
            FormField::RoomNo => Some(InvoiceField::RoomNo),
            FormField::PhoneNo => Some(InvoiceField::PhoneNo),
            FormField::Address => Some(InvoiceField::Address),
            FormField::InvoiceNo => Some(InvoiceField::InvoiceNo),
            FormField::Notes => Some(InvoiceField::Notes),
            FormField::Date | FormField::PaymentMethod | FormField::Items => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            FormField::StudentName => "Student Name",
            FormField::RoomNo => "Room Number",
            FormField::PhoneNo => "Phone Number",
            FormField::Date => "Invoice Date",
            FormField::Address => "Student Address",
            FormField::InvoiceNo => "Invoice Number",
            FormField::PaymentMethod => "Payment Method",
            FormField::Items => "Payment Details",
            FormField::Notes => "Additional Notes",
        }
    }
}

pub enum InvoiceFormAction {
    ExportPdf,
    Print,
    FinishPrint,
    KeepWaitingForPrint,
    Quit,
}

pub struct InvoiceFormState {
    invoice: Invoice,
    current_field: FormField,
    editing: bool,
    items_list_state: ListState,
    editing_item: Option<(usize, LineItemField, String)>, // (index, field, current input)
    date_state: DateInputState,
    notification: Option<Notification>,
    pending_print: Option<PrintJob>,
}

impl InvoiceFormState {
    pub fn new(invoice: Invoice) -> Self {
        let date_state = DateInputState::from_text(&invoice.date, Local::now().date_naive());
        let mut items_list_state = ListState::default();
        if !invoice.items.is_empty() {
            items_list_state.select(Some(0));
        }
        Self {
            invoice,
            current_field: FormField::StudentName,
            editing: false,
            items_list_state,
            editing_item: None,
            date_state,
            notification: None,
            pending_print: None,
        }
    }

    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    fn start_editing(&mut self) {
        match self.current_field {
            FormField::Date => {
                self.date_state =
                    DateInputState::from_text(&self.invoice.date, Local::now().date_naive());
                self.date_state.start_editing();
                self.editing = true;
            }
            FormField::PaymentMethod => self.cycle_payment_method(PaymentMethod::next),
            FormField::Items => {
                self.editing = true;
                if self.items_list_state.selected().is_none() && !self.invoice.items.is_empty() {
                    self.items_list_state.select(Some(0));
                }
            }
            _ => self.editing = true,
        }
    }

    fn cycle_payment_method(&mut self, step: fn(PaymentMethod) -> PaymentMethod) {
        self.invoice = self.invoice.with_payment_method(step(self.invoice.payment_method));
    }

    fn stop_editing(&mut self) {
        self.editing = false;
        self.editing_item = None;
        self.date_state.stop_editing();
    }

    fn edit_text(&mut self, field: InvoiceField, key: KeyCode) {
        let mut value = self.invoice.get(field).to_string();
        match key {
            KeyCode::Char(c) => value.push(c),
            KeyCode::Backspace => {
                value.pop();
            }
            _ => return,
        }
        self.invoice = self.invoice.set(field, &value);
    }

    fn add_line_item(&mut self) {
        self.invoice = self.invoice.add_item();
        let index = self.invoice.items.len() - 1;
        self.items_list_state.select(Some(index));
        self.editing_item = Some((index, LineItemField::Description, String::new()));
    }

    fn edit_selected_item(&mut self) {
        if let Some(index) = self.items_list_state.selected() {
            if let Some(item) = self.invoice.items.get(index) {
                let description = item.description.clone();
                self.editing_item = Some((index, LineItemField::Description, description));
            }
        }
    }

    fn delete_selected_item(&mut self) {
        if let Some(index) = self.items_list_state.selected() {
            if index < self.invoice.items.len() {
                self.invoice = self.invoice.remove_item(index);
                let len = self.invoice.items.len();
                let selected = if len == 0 { None } else { Some(index.min(len - 1)) };
                self.items_list_state.select(selected);
            }
        }
    }

    fn move_item_selection(&mut self, forward: bool) {
        let len = self.invoice.items.len();
        if len == 0 {
            return;
        }
        let i = match self.items_list_state.selected() {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        self.items_list_state.select(Some(i));
    }

    /// Advance from description to amount, or finish the row.
    fn next_field_in_item(&mut self) {
        let Some((index, field, _)) = &self.editing_item else {
            return;
        };
        let (index, field) = (*index, *field);
        match field {
            LineItemField::Description => {
                let amount = self.invoice.items.get(index).map(|item| item.amount).unwrap_or(0.0);
                self.editing_item = Some((index, LineItemField::Amount, amount.to_string()));
            }
            LineItemField::Amount => self.editing_item = None,
        }
    }

    fn edit_item(&mut self, key: KeyCode) {
        if let Some((index, field, value)) = &mut self.editing_item {
            match key {
                KeyCode::Char(c) => value.push(c),
                KeyCode::Backspace => {
                    value.pop();
                }
                _ => return,
            }
            self.invoice = self.invoice.update_item(*index, *field, value);
        }
    }

    fn handle_items_key(&mut self, key: KeyCode) {
        if self.editing_item.is_some() {
            match key {
                KeyCode::Enter | KeyCode::Tab => self.next_field_in_item(),
                KeyCode::Esc => self.editing_item = None,
                _ => self.edit_item(key),
            }
            return;
        }

        match key {
            KeyCode::Char('a') => self.add_line_item(),
            KeyCode::Char('e') | KeyCode::Enter => self.edit_selected_item(),
            KeyCode::Char('d') => self.delete_selected_item(),
            KeyCode::Up => self.move_item_selection(false),
            KeyCode::Down => self.move_item_selection(true),
            KeyCode::Esc => self.stop_editing(),
            _ => {}
        }
    }

    fn handle_notification_key(&mut self, key: KeyCode) -> Option<InvoiceFormAction> {
        let kind = self.notification.as_ref().map(|n| n.kind)?;
        match (kind, key) {
            (NotificationKind::Confirm, KeyCode::Char('y') | KeyCode::Char('Y')) => {
                self.notification = None;
                Some(InvoiceFormAction::FinishPrint)
            }
            (NotificationKind::Confirm, KeyCode::Char('n') | KeyCode::Char('N')) => {
                self.notification = None;
                Some(InvoiceFormAction::KeepWaitingForPrint)
            }
            (NotificationKind::Confirm, _) => None,
            _ => {
                self.notification = None;
                None
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<InvoiceFormAction> {
        if self.notification.is_some() {
            return self.handle_notification_key(key);
        }

        if self.editing {
            match self.current_field {
                FormField::Items => self.handle_items_key(key),
                FormField::Date => match key {
                    KeyCode::Enter | KeyCode::Esc => self.stop_editing(),
                    _ => {
                        if self.date_state.handle_input(key) {
                            let text = self.date_state.as_text();
                            self.invoice = self.invoice.set(InvoiceField::Date, &text);
                        }
                    }
                },
                field => match key {
                    KeyCode::Enter | KeyCode::Esc => self.stop_editing(),
                    _ => {
                        if let Some(text_field) = field.text_field() {
                            self.edit_text(text_field, key);
                        }
                    }
                },
            }
            return None;
        }

        match key {
            KeyCode::Esc | KeyCode::Char('q') => return Some(InvoiceFormAction::Quit),
            KeyCode::Char('p') => return Some(InvoiceFormAction::ExportPdf),
            KeyCode::Char('r') => return Some(InvoiceFormAction::Print),
            KeyCode::Enter => self.start_editing(),
            KeyCode::Down | KeyCode::Tab => self.current_field = self.current_field.next(),
            KeyCode::Up | KeyCode::BackTab => self.current_field = self.current_field.previous(),
            KeyCode::Right if self.current_field == FormField::PaymentMethod => {
                self.cycle_payment_method(PaymentMethod::next);
            }
            KeyCode::Left if self.current_field == FormField::PaymentMethod => {
                self.cycle_payment_method(PaymentMethod::previous);
            }
            _ => {}
        }
        None
    }

    /// Render the current invoice and hand it to `exporter`. Failures become
    /// a notification; the invoice itself is never touched.
    pub async fn run_export(&mut self, exporter: &dyn Exporter, profile: &HostelProfile) {
        let document = render_invoice(&self.invoice, profile, Local::now().date_naive());
        info!(exporter = exporter.label(), invoice_no = %document.invoice_no, "export started");

        match exporter.export(&document).await {
            Ok(ExportReceipt::Saved(path)) => {
                let message = format!("Invoice saved to {}", path.display());
                self.notification = Some(Notification::info("Saved", message));
            }
            Ok(ExportReceipt::Printed) => {
                self.notification = Some(printed());
            }
            Ok(ExportReceipt::PrintPending(job)) => {
                self.pending_print = Some(job);
                self.notification = Some(print_confirmation());
            }
            Err(err) => {
                error!(exporter = exporter.label(), error = %err, "export failed");
                self.notification = Some(Notification::error(err.user_message()));
            }
        }
    }

    pub async fn finish_print(&mut self) {
        if let Some(job) = self.pending_print.take() {
            job.close().await;
            info!("print job closed after confirmation");
        }
    }

    pub async fn keep_waiting_for_print(&mut self) {
        let Some(mut job) = self.pending_print.take() else {
            return;
        };
        match job.wait().await {
            Ok(true) => {
                job.close().await;
                self.notification = Some(printed());
            }
            Ok(false) => {
                self.pending_print = Some(job);
                self.notification = Some(print_confirmation());
            }
            Err(err) => {
                job.close().await;
                error!(error = %err, "print job failed");
                self.notification = Some(Notification::error(err.user_message()));
            }
        }
    }
}

fn printed() -> Notification {
    Notification::info("Printed", "Invoice sent to the printer.")
}

fn print_confirmation() -> Notification {
    Notification::confirm(
        "Printing",
        "Has the invoice finished printing? The print job will be closed.",
    )
}

fn field_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn render_field<B: Backend>(
    frame: &mut Frame<B>,
    state: &InvoiceFormState,
    field: FormField,
    area: Rect,
) {
    let active = state.current_field == field;
    let editing = active && state.editing;

    let value = match field {
        FormField::Date if editing => state.date_state.get_display_string(),
        FormField::PaymentMethod => format!("< {} >", state.invoice.payment_method),
        _ => match field.text_field() {
            Some(text_field) => state.invoice.get(text_field).to_string(),
            None => state.invoice.date.clone(),
        },
    };
    let cursor = if editing && field.text_field().is_some() { "|" } else { "" };

    let paragraph = Paragraph::new(Spans::from(vec![Span::raw(format!("{}{}", value, cursor))]))
        .block(
            Block::default()
                .title(Span::styled(field.label(), field_style(active)))
                .borders(Borders::ALL)
                .border_style(field_style(active)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_items<B: Backend>(frame: &mut Frame<B>, state: &mut InvoiceFormState, area: Rect) {
    let active = state.current_field == FormField::Items;
    let title = if active && state.editing {
        "Payment Details (editing)"
    } else {
        FormField::Items.label()
    };

    let items: Vec<ListItem> = state
        .invoice
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let text = match &state.editing_item {
                Some((index, LineItemField::Description, value)) if *index == i => {
                    format!("{}|  {}", value, format_inr(item.amount))
                }
                Some((index, LineItemField::Amount, value)) if *index == i => {
                    format!("{}  ₹{}|", item.description, value)
                }
                _ => format!("{}  {}", item.description, format_inr(item.amount)),
            };
            ListItem::new(text)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(Span::styled(title, field_style(active)))
                .borders(Borders::ALL)
                .border_style(field_style(active)),
        )
        .highlight_style(if active && state.editing {
            Style::default().bg(Color::Blue).fg(Color::White)
        } else {
            Style::default()
        });
    frame.render_stateful_widget(list, area, &mut state.items_list_state);
}

fn help_text(state: &InvoiceFormState) -> &'static str {
    match (state.editing, state.current_field) {
        (false, FormField::PaymentMethod) => {
            "Left/Right - Change method | Up/Down - Navigate | P - Save PDF | R - Print | Q - Quit"
        }
        (false, _) => {
            "Enter - Edit field | Up/Down - Navigate | P - Save PDF | R - Print | Q - Quit"
        }
        (true, FormField::Date) => {
            "Digits - Type part | Left/Right - Switch part | Up/Down - Step | Enter - Done"
        }
        (true, FormField::Items) => {
            if state.editing_item.is_some() {
                "Type to edit | Tab/Enter - Next field | Esc - Done with row"
            } else {
                "A - Add item | E - Edit selected | D - Delete selected | Esc - Done"
            }
        }
        (true, _) => "Type to edit | Enter - Done",
    }
}

pub fn render_invoice_form<B: Backend>(
    frame: &mut Frame<B>,
    state: &mut InvoiceFormState,
    profile: &HostelProfile,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(frame.size());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3), // Title
                Constraint::Length(3), // Name / room
                Constraint::Length(3), // Phone / date
                Constraint::Length(3), // Address
                Constraint::Length(3), // Invoice number / payment method
                Constraint::Min(5),    // Items
                Constraint::Length(3), // Total
                Constraint::Length(3), // Notes
                Constraint::Length(3), // Help
            ]
            .as_ref(),
        )
        .split(columns[0]);

    let title = Paragraph::new(Spans::from(vec![
        Span::styled(
            profile.name.as_str(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" - Invoice Details"),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, rows[0]);

    let pairs = [
        (rows[1], FormField::StudentName, FormField::RoomNo),
        (rows[2], FormField::PhoneNo, FormField::Date),
        (rows[4], FormField::InvoiceNo, FormField::PaymentMethod),
    ];
    for (area, left, right) in pairs {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
            .split(area);
        render_field(frame, state, left, halves[0]);
        render_field(frame, state, right, halves[1]);
    }
    render_field(frame, state, FormField::Address, rows[3]);

    render_items(frame, state, rows[5]);

    let total = Paragraph::new(Span::styled(
        format!("Total Amount: {}", format_inr(state.invoice.total())),
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Right)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(total, rows[6]);

    render_field(frame, state, FormField::Notes, rows[7]);

    let help = Paragraph::new(help_text(state))
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, rows[8]);

    // The preview is rebuilt from the model on every frame.
    let document = render_invoice(&state.invoice, profile, Local::now().date_naive());
    render_preview(frame, columns[1], &document);

    if let Some(notification) = &state.notification {
        render_notification(frame, frame.size(), notification);
    }
}

pub fn handle_input(state: &mut InvoiceFormState) -> Result<Option<InvoiceFormAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(state.handle_key(key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportError;
    use crate::invoice_gen::RenderedInvoice;
    use crate::invoice_gen::tests::{billed_invoice, profile};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct FailingPdf;

    #[async_trait]
    impl Exporter for FailingPdf {
        fn label(&self) -> &'static str {
            "pdf"
        }

        async fn export(&self, _document: &RenderedInvoice) -> Result<ExportReceipt, ExportError> {
            Err(ExportError::PdfGeneration("canvas exploded".into()))
        }
    }

    #[derive(Default)]
    struct RecordingPdf {
        seen: Mutex<Vec<RenderedInvoice>>,
    }

    #[async_trait]
    impl Exporter for RecordingPdf {
        fn label(&self) -> &'static str {
            "pdf"
        }

        async fn export(&self, document: &RenderedInvoice) -> Result<ExportReceipt, ExportError> {
            self.seen.lock().unwrap().push(document.clone());
            Ok(ExportReceipt::Saved(PathBuf::from("Invoice_INV-123456_Rahul_Sharma.pdf")))
        }
    }

    fn press(state: &mut InvoiceFormState, keys: &[KeyCode]) {
        for key in keys {
            state.handle_key(*key);
        }
    }

    fn type_text(state: &mut InvoiceFormState, text: &str) {
        for c in text.chars() {
            state.handle_key(KeyCode::Char(c));
        }
    }

    fn focus(state: &mut InvoiceFormState, field: FormField) {
        while state.current_field != field {
            state.handle_key(KeyCode::Down);
        }
    }

    #[test]
    fn typing_updates_the_invoice_immediately() {
        let mut state = InvoiceFormState::new(Invoice::default());
        press(&mut state, &[KeyCode::Enter]);
        type_text(&mut state, "Rahul Sharmaa");
        press(&mut state, &[KeyCode::Backspace]);
        assert_eq!(state.invoice().student_name, "Rahul Sharma");
        press(&mut state, &[KeyCode::Enter]);
        assert!(!state.editing);
    }

    #[test]
    fn shortcuts_only_fire_outside_editing() {
        let mut state = InvoiceFormState::new(Invoice::default());
        assert!(matches!(state.handle_key(KeyCode::Char('p')), Some(InvoiceFormAction::ExportPdf)));
        assert!(matches!(state.handle_key(KeyCode::Char('r')), Some(InvoiceFormAction::Print)));

        press(&mut state, &[KeyCode::Enter]);
        assert!(state.handle_key(KeyCode::Char('p')).is_none());
        assert_eq!(state.invoice().student_name, "p");
    }

    #[test]
    fn payment_method_cycles_with_arrows() {
        let mut state = InvoiceFormState::new(Invoice::default());
        focus(&mut state, FormField::PaymentMethod);
        press(&mut state, &[KeyCode::Right, KeyCode::Right]);
        assert_eq!(state.invoice().payment_method, PaymentMethod::NetBanking);
        press(&mut state, &[KeyCode::Left, KeyCode::Left, KeyCode::Left]);
        assert_eq!(state.invoice().payment_method, PaymentMethod::Cheque);
    }

    #[test]
    fn date_edits_flow_into_the_invoice() {
        let invoice = Invoice::default().set(InvoiceField::Date, "2024-07-15");
        let mut state = InvoiceFormState::new(invoice);
        focus(&mut state, FormField::Date);
        press(&mut state, &[KeyCode::Enter, KeyCode::Right]);
        type_text(&mut state, "09");
        press(&mut state, &[KeyCode::Enter]);
        assert_eq!(state.invoice().date, "2024-09-15");
    }

    #[test]
    fn line_items_can_be_added_edited_and_removed() {
        let mut state = InvoiceFormState::new(Invoice::default());
        focus(&mut state, FormField::Items);
        press(&mut state, &[KeyCode::Enter, KeyCode::Char('a')]);
        type_text(&mut state, "Laundry");
        press(&mut state, &[KeyCode::Tab, KeyCode::Backspace]);
        type_text(&mut state, "450");
        press(&mut state, &[KeyCode::Enter]);

        assert_eq!(state.invoice().items.len(), 3);
        assert_eq!(state.invoice().items[2].description, "Laundry");
        assert_eq!(state.invoice().items[2].amount, 450.0);

        // Remove "Monthly Rent"; later rows shift up.
        press(&mut state, &[KeyCode::Down, KeyCode::Char('d')]);
        assert_eq!(state.invoice().items.len(), 2);
        assert_eq!(state.invoice().items[0].description, "Mess Charges");
        assert_eq!(state.invoice().items[1].description, "Laundry");
        assert_eq!(state.invoice().total(), 450.0);
    }

    #[test]
    fn garbage_amount_becomes_zero() {
        let mut state = InvoiceFormState::new(Invoice::default());
        focus(&mut state, FormField::Items);
        press(&mut state, &[KeyCode::Enter, KeyCode::Enter, KeyCode::Tab, KeyCode::Backspace]);
        type_text(&mut state, "12x");
        assert_eq!(state.invoice().items[0].amount, 0.0);
        press(&mut state, &[KeyCode::Backspace]);
        assert_eq!(state.invoice().items[0].amount, 12.0);
    }

    #[test]
    fn deleting_every_item_is_allowed() {
        let mut state = InvoiceFormState::new(Invoice::default());
        focus(&mut state, FormField::Items);
        press(
            &mut state,
            &[KeyCode::Enter, KeyCode::Char('d'), KeyCode::Char('d'), KeyCode::Char('d')],
        );
        assert!(state.invoice().items.is_empty());
        assert_eq!(state.invoice().total(), 0.0);
    }

    #[tokio::test]
    async fn pdf_failure_notifies_and_keeps_the_invoice() {
        let mut state = InvoiceFormState::new(billed_invoice());
        let before = state.invoice().clone();

        state.run_export(&FailingPdf, &profile()).await;

        let notification = state.notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(
            notification.message,
            "PDF generation failed. Please try the print option instead."
        );
        assert_eq!(state.invoice(), &before);
        assert_eq!(state.invoice().total(), 8200.0);

        // Any key dismisses; the form is usable and exportable again.
        assert!(state.handle_key(KeyCode::Char('x')).is_none());
        assert!(state.notification().is_none());
        assert!(matches!(state.handle_key(KeyCode::Char('r')), Some(InvoiceFormAction::Print)));
    }

    #[tokio::test]
    async fn exporter_receives_what_the_preview_shows() {
        let mut state = InvoiceFormState::new(billed_invoice());
        let exporter = RecordingPdf::default();

        state.run_export(&exporter, &profile()).await;

        let seen = exporter.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].total_line, "Total Amount: ₹8,200");
        assert_eq!(seen[0].invoice_no, "INV-123456");
        assert_eq!(state.notification().unwrap().kind, NotificationKind::Info);
    }

    #[test]
    fn confirmation_answers_map_to_print_actions() {
        let mut state = InvoiceFormState::new(Invoice::default());
        state.notification = Some(print_confirmation());

        assert!(state.handle_key(KeyCode::Char('x')).is_none());
        assert!(state.notification().is_some());
        assert!(matches!(
            state.handle_key(KeyCode::Char('n')),
            Some(InvoiceFormAction::KeepWaitingForPrint)
        ));

        state.notification = Some(print_confirmation());
        assert!(matches!(
            state.handle_key(KeyCode::Char('y')),
            Some(InvoiceFormAction::FinishPrint)
        ));
        assert!(state.notification().is_none());
    }
}
