use std::path::PathBuf;

use chrono::NaiveDate;

use crate::models::Invoice;

/// Shown in place of any blank bill-to value or item description.
pub const PLACEHOLDER: &str = "Not specified";

/// Identity of the hostel issuing invoices.
#[derive(Debug, Clone, PartialEq)]
pub struct HostelProfile {
    pub name: String,
    pub location: String,
    pub phones: Vec<String>,
    pub email: String,
    pub logo_path: Option<PathBuf>,
    /// Lines printed inside the verification seal, under "VERIFIED".
    pub seal_lines: Vec<String>,
}

impl HostelProfile {
    pub fn contact_line(&self) -> String {
        let mut parts = Vec::new();
        if !self.phones.is_empty() {
            parts.push(format!("Phone: {}", self.phones.join(" / ")));
        }
        if !self.email.is_empty() {
            parts.push(format!("Email: {}", self.email));
        }
        parts.join(" | ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
}

impl Field {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }

    fn or_placeholder(label: &'static str, value: &str) -> Self {
        if value.is_empty() {
            Self::new(label, PLACEHOLDER)
        } else {
            Self::new(label, value)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemRow {
    pub description: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub name: String,
    pub location: String,
    pub contact: String,
    pub logo: Option<PathBuf>,
}

/// The invoice as the user sees it. The screen preview and both exporters
/// work from this value only, so what is shown is what gets exported.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedInvoice {
    pub invoice_no: String,
    pub student_name: String,
    pub header: Header,
    pub bill_to: Vec<Field>,
    pub details: Vec<Field>,
    pub rows: Vec<ItemRow>,
    pub total_line: String,
    pub paid_line: String,
    pub notes: Option<String>,
    pub seal: Vec<String>,
    pub footer: Vec<String>,
}

/// Indian digit grouping: the last three digits, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (mut head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    while head.len() > 2 {
        let (rest, pair) = head.split_at(head.len() - 2);
        groups.push(pair);
        head = rest;
    }
    groups.push(head);
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Format a number the way the en-IN locale does: grouped digits and at
/// most three fraction digits with trailing zeros dropped.
pub fn format_en_in(amount: f64) -> String {
    let fixed = format!("{:.3}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');
    let is_zero = int_part.chars().all(|c| c == '0') && frac.is_empty();
    let sign = if amount < 0.0 && !is_zero { "-" } else { "" };

    let grouped = group_indian(int_part);
    if frac.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac)
    }
}

pub fn format_inr(amount: f64) -> String {
    format!("₹{}", format_en_in(amount))
}

/// `d/m/yyyy`, or "Invalid Date" when the text is not a `YYYY-MM-DD` date.
pub fn format_en_in_date(text: &str) -> String {
    match NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d") {
        Ok(date) => date.format("%-d/%-m/%Y").to_string(),
        Err(_) => "Invalid Date".to_string(),
    }
}

pub fn render_invoice(
    invoice: &Invoice,
    profile: &HostelProfile,
    generated_on: NaiveDate,
) -> RenderedInvoice {
    let total = format_inr(invoice.total());

    let rows = invoice
        .items
        .iter()
        .map(|item| ItemRow {
            description: if item.description.is_empty() {
                PLACEHOLDER.to_string()
            } else {
                item.description.clone()
            },
            amount: format_inr(item.amount),
        })
        .collect();

    let mut seal = vec!["✓".to_string(), "VERIFIED".to_string()];
    seal.extend(profile.seal_lines.iter().cloned());

    RenderedInvoice {
        invoice_no: invoice.invoice_no.clone(),
        student_name: invoice.student_name.clone(),
        header: Header {
            name: profile.name.clone(),
            location: profile.location.clone(),
            contact: profile.contact_line(),
            logo: profile.logo_path.clone(),
        },
        bill_to: vec![
            Field::or_placeholder("Student Name", &invoice.student_name),
            Field::or_placeholder("Room No", &invoice.room_no),
            Field::or_placeholder("Phone", &invoice.phone_no),
            Field::or_placeholder("Address", &invoice.address),
        ],
        details: vec![
            Field::new("Invoice No", invoice.invoice_no.clone()),
            Field::new("Date", format_en_in_date(&invoice.date)),
            Field::new("Payment Method", invoice.payment_method.label()),
            Field::new("Generated On", generated_on.format("%-d/%-m/%Y").to_string()),
        ],
        rows,
        total_line: format!("Total Amount: {}", total),
        paid_line: format!("Amount Paid: {}", total),
        notes: if invoice.notes.is_empty() {
            None
        } else {
            Some(invoice.notes.clone())
        },
        seal,
        footer: vec![
            "This is a computer-generated invoice and does not require a signature.".to_string(),
            format!("Thank you for choosing {}!", profile.name),
        ],
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Styles the rendered markup relies on.
pub const INVOICE_STYLESHEET: &str = r#"
body { font-family: Arial, sans-serif; margin: 0; padding: 20px; color: #333; }
.invoice { max-width: 800px; margin: 0 auto; background: #fff; }
.header {
  background: linear-gradient(135deg, #1e3a8a, #3b82f6);
  color: #fff;
  padding: 30px;
  text-align: center;
  border-radius: 10px;
  margin-bottom: 30px;
}
.header h1 { margin: 0; font-size: 2em; }
.header p { margin: 5px 0; opacity: 0.9; }
.header .logo { max-height: 80px; margin-bottom: 10px; }
.details {
  display: grid;
  grid-template-columns: 1fr 1fr;
  gap: 30px;
  margin-bottom: 30px;
  font-size: 0.9em;
}
.section { background: #f8fafc; padding: 20px; border-radius: 8px; border-left: 4px solid #3b82f6; }
.section.meta { border-left-color: #22c55e; }
.section h3 { color: #1e40af; margin: 0 0 15px 0; }
.section p { margin: 0 0 4px 0; }
.table { width: 100%; border-collapse: collapse; margin-bottom: 30px; font-size: 0.9em; }
.table th, .table td { padding: 12px; text-align: left; border-bottom: 1px solid #e5e7eb; }
.table th { background: #f3f4f6; font-weight: bold; color: #374151; }
.table .amount { text-align: right; }
.total {
  text-align: right;
  background: #f9fafb;
  padding: 16px;
  border-radius: 8px;
  margin-bottom: 30px;
}
.total .due { font-size: 1.2em; font-weight: bold; }
.total .paid { color: #16a34a; font-weight: 600; }
.notes {
  background: #fefce8;
  padding: 16px;
  border-radius: 8px;
  border-left: 4px solid #eab308;
  margin-bottom: 30px;
}
.notes h4 { color: #854d0e; margin: 0 0 8px 0; }
.seal { width: 150px; height: 150px; margin: 20px auto; }
.seal-circle {
  width: 150px;
  height: 150px;
  border: 3px solid #059669;
  border-radius: 50%;
  display: flex;
  align-items: center;
  justify-content: center;
  background: linear-gradient(135deg, #ecfdf5, #d1fae5);
}
.seal-text {
  text-align: center;
  color: #059669;
  font-weight: bold;
  line-height: 1.2;
  font-size: 0.8em;
}
.seal-text .tick { font-size: 2em; }
.footer { text-align: center; color: #6b7280; margin-top: 30px; font-size: 0.9em; }
"#;

impl RenderedInvoice {
    /// Image files the document embeds.
    pub fn images(&self) -> Vec<PathBuf> {
        self.header.logo.iter().cloned().collect()
    }

    pub fn title(&self) -> String {
        format!("Invoice - {}", self.invoice_no)
    }

    /// Markup with the logo source supplied by the caller; `None` leaves it out.
    pub fn to_html_with_logo(&self, logo_src: Option<&str>) -> String {
        let mut content = String::new();

        content.push_str("<div class=\"invoice\">\n");

        content.push_str("<div class=\"header\">\n");
        if let Some(src) = logo_src {
            content.push_str(&format!(
                "<img class=\"logo\" src=\"{}\" alt=\"{}\">\n",
                escape_html(src),
                escape_html(&self.header.name)
            ));
        }
        content.push_str(&format!("<h1>{}</h1>\n", escape_html(&self.header.name)));
        content.push_str(&format!("<p>{}</p>\n", escape_html(&self.header.location)));
        content.push_str(&format!("<p>{}</p>\n", escape_html(&self.header.contact)));
        content.push_str("</div>\n");

        content.push_str("<div class=\"details\">\n");
        push_section(&mut content, "section", "Bill To:", &self.bill_to);
        push_section(&mut content, "section meta", "Invoice Details:", &self.details);
        content.push_str("</div>\n");

        content.push_str("<table class=\"table\">\n");
        content.push_str(
            "<thead><tr><th>Description</th><th class=\"amount\">Amount (₹)</th></tr></thead>\n",
        );
        content.push_str("<tbody>\n");
        for row in &self.rows {
            content.push_str(&format!(
                "<tr><td>{}</td><td class=\"amount\">{}</td></tr>\n",
                escape_html(&row.description),
                escape_html(&row.amount)
            ));
        }
        content.push_str("</tbody>\n</table>\n");

        content.push_str("<div class=\"total\">\n");
        content.push_str(&format!("<div class=\"due\">{}</div>\n", escape_html(&self.total_line)));
        content.push_str(&format!("<div class=\"paid\">{}</div>\n", escape_html(&self.paid_line)));
        content.push_str("</div>\n");

        if let Some(notes) = &self.notes {
            content.push_str("<div class=\"notes\">\n<h4>Notes:</h4>\n");
            content.push_str(&format!("<p>{}</p>\n", escape_html(notes)));
            content.push_str("</div>\n");
        }

        content.push_str(
            "<div class=\"seal\"><div class=\"seal-circle\"><div class=\"seal-text\">\n",
        );
        for (i, line) in self.seal.iter().enumerate() {
            let class = if i == 0 { "tick" } else { "line" };
            content.push_str(&format!("<div class=\"{}\">{}</div>\n", class, escape_html(line)));
        }
        content.push_str("</div></div></div>\n");

        content.push_str("<div class=\"footer\">\n");
        for line in &self.footer {
            content.push_str(&format!("<p>{}</p>\n", escape_html(line)));
        }
        content.push_str("</div>\n");

        content.push_str("</div>\n");
        content
    }
}

fn push_section(content: &mut String, class: &str, heading: &str, fields: &[Field]) {
    content.push_str(&format!("<div class=\"{}\">\n<h3>{}</h3>\n", class, heading));
    for field in fields {
        content.push_str(&format!(
            "<p><strong>{}:</strong> {}</p>\n",
            field.label,
            escape_html(&field.value)
        ));
    }
    content.push_str("</div>\n");
}
