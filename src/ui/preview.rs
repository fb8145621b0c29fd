use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::invoice_gen::{Field, RenderedInvoice};

fn field_spans(fields: &[Field]) -> Vec<Spans<'_>> {
    fields
        .iter()
        .map(|field| {
            Spans::from(vec![
                Span::styled(
                    format!("{}: ", field.label),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(field.value.as_str()),
            ])
        })
        .collect()
}

/// Draw the rendered invoice. Exports are made from the same document.
pub fn render_preview<B: Backend>(frame: &mut Frame<B>, area: Rect, doc: &RenderedInvoice) {
    let block = Block::default()
        .title("Invoice Preview")
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::White));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let notes_height = doc
        .notes
        .as_ref()
        .map(|notes| notes.lines().count().max(1) as u16 + 2)
        .unwrap_or(0);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(4),                         // Header
                Constraint::Length(6),                         // Bill to / details
                Constraint::Min(4),                            // Items
                Constraint::Length(2),                         // Totals
                Constraint::Length(notes_height),              // Notes
                Constraint::Length(doc.seal.len() as u16 + 2), // Seal
                Constraint::Length(doc.footer.len() as u16),   // Footer
            ]
            .as_ref(),
        )
        .split(inner);

    let header_style = Style::default().fg(Color::White).bg(Color::Blue);
    let header = Paragraph::new(vec![
        Spans::from(Span::styled(
            doc.header.name.as_str(),
            header_style.add_modifier(Modifier::BOLD),
        )),
        Spans::from(Span::styled(doc.header.location.as_str(), header_style)),
        Spans::from(Span::styled(doc.header.contact.as_str(), header_style)),
    ])
    .style(header_style)
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    frame.render_widget(header, chunks[0]);

    let parties = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(chunks[1]);

    let bill_to = Paragraph::new(field_spans(&doc.bill_to))
        .block(
            Block::default()
                .title(Span::styled("Bill To:", Style::default().fg(Color::Blue)))
                .borders(Borders::LEFT),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(bill_to, parties[0]);

    let details = Paragraph::new(field_spans(&doc.details))
        .block(
            Block::default()
                .title(Span::styled("Invoice Details:", Style::default().fg(Color::Green)))
                .borders(Borders::LEFT),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(details, parties[1]);

    let rows = doc.rows.iter().map(|row| {
        Row::new(vec![
            Cell::from(row.description.as_str()),
            Cell::from(row.amount.as_str()),
        ])
    });
    let table = Table::new(rows)
        .header(
            Row::new(vec!["Description", "Amount (₹)"])
                .style(Style::default().add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .widths(&[Constraint::Percentage(70), Constraint::Percentage(30)]);
    frame.render_widget(table, chunks[2]);

    let totals = Paragraph::new(vec![
        Spans::from(Span::styled(
            doc.total_line.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Spans::from(Span::styled(doc.paid_line.as_str(), Style::default().fg(Color::Green))),
    ])
    .alignment(Alignment::Right);
    frame.render_widget(totals, chunks[3]);

    if let Some(notes) = &doc.notes {
        let notes = Paragraph::new(notes.as_str())
            .block(
                Block::default()
                    .title(Span::styled("Notes:", Style::default().fg(Color::Yellow)))
                    .borders(Borders::LEFT),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(notes, chunks[4]);
    }

    let seal_width = doc.seal.iter().map(|line| line.chars().count()).max().unwrap_or(0) as u16 + 6;
    let seal_area = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Min(0),
                Constraint::Length(seal_width),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(chunks[5])[1];
    let seal_lines: Vec<Spans> = doc.seal.iter().map(|line| Spans::from(line.as_str())).collect();
    let seal = Paragraph::new(seal_lines)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green)),
        );
    frame.render_widget(seal, seal_area);

    let footer_lines: Vec<Spans> =
        doc.footer.iter().map(|line| Spans::from(line.as_str())).collect();
    let footer = Paragraph::new(footer_lines)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, chunks[6]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice_gen::render_invoice;
    use crate::invoice_gen::tests::{billed_invoice, profile};
    use crate::models::InvoiceField;
    use chrono::NaiveDate;
    use tui::{backend::TestBackend, Terminal};

    fn screen_text(doc: &RenderedInvoice) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| render_preview(f, f.size(), doc)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol.as_str())
            .collect()
    }

    #[test]
    fn preview_shows_the_rendered_document() {
        let invoice = billed_invoice().set(InvoiceField::Notes, "Paid in advance");
        let generated_on = NaiveDate::from_ymd_opt(2024, 7, 20).unwrap();
        let doc = render_invoice(&invoice, &profile(), generated_on);
        let text = screen_text(&doc);

        assert!(text.contains("St. Johns Boys Hostel"));
        assert!(text.contains("Rahul Sharma"));
        assert!(text.contains("Monthly Rent"));
        assert!(text.contains("₹5,000"));
        assert!(text.contains("Total Amount: ₹8,200"));
        assert!(text.contains("Paid in advance"));
        assert!(text.contains("VERIFIED"));
    }
}
