use chrono::{DateTime, Local};

use super::line_item::{self, LineItem, LineItemField};
use super::payment_method::PaymentMethod;

/// Top-level fields of an invoice that the form edits as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceField {
    StudentName,
    RoomNo,
    Address,
    PhoneNo,
    InvoiceNo,
    Date,
    PaymentMethod,
    Notes,
}

/// The invoice being prepared in this session.
///
/// Every update returns a new value; the caller decides when to swap it in.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub student_name: String,
    pub room_no: String,
    pub address: String,
    pub phone_no: String,
    pub invoice_no: String,
    /// Issue date as typed, normally `YYYY-MM-DD`.
    pub date: String,
    pub items: Vec<LineItem>,
    pub payment_method: PaymentMethod,
    pub notes: String,
}

/// `INV-` followed by the last six digits of a millisecond timestamp.
pub fn default_invoice_number(timestamp_millis: i64) -> String {
    let digits = timestamp_millis.to_string();
    let tail = &digits[digits.len().saturating_sub(6)..];
    format!("INV-{}", tail)
}

impl Invoice {
    pub fn new_at(now: DateTime<Local>) -> Self {
        Self {
            student_name: String::new(),
            room_no: String::new(),
            address: String::new(),
            phone_no: String::new(),
            invoice_no: default_invoice_number(now.timestamp_millis()),
            date: now.date_naive().format("%Y-%m-%d").to_string(),
            items: vec![
                LineItem::new("Monthly Rent", 0.0),
                LineItem::new("Mess Charges", 0.0),
            ],
            payment_method: PaymentMethod::default(),
            notes: String::new(),
        }
    }

    pub fn get(&self, field: InvoiceField) -> &str {
        match field {
            InvoiceField::StudentName => &self.student_name,
            InvoiceField::RoomNo => &self.room_no,
            InvoiceField::Address => &self.address,
            InvoiceField::PhoneNo => &self.phone_no,
            InvoiceField::InvoiceNo => &self.invoice_no,
            InvoiceField::Date => &self.date,
            InvoiceField::PaymentMethod => self.payment_method.label(),
            InvoiceField::Notes => &self.notes,
        }
    }

    /// Replace one field, keeping the rest. The payment method only accepts
    /// one of its known labels; anything else keeps the current method.
    pub fn set(&self, field: InvoiceField, value: &str) -> Self {
        let mut next = self.clone();
        match field {
            InvoiceField::StudentName => next.student_name = value.to_string(),
            InvoiceField::RoomNo => next.room_no = value.to_string(),
            InvoiceField::Address => next.address = value.to_string(),
            InvoiceField::PhoneNo => next.phone_no = value.to_string(),
            InvoiceField::InvoiceNo => next.invoice_no = value.to_string(),
            InvoiceField::Date => next.date = value.to_string(),
            InvoiceField::PaymentMethod => {
                if let Some(method) = PaymentMethod::from_label(value) {
                    next.payment_method = method;
                }
            }
            InvoiceField::Notes => next.notes = value.to_string(),
        }
        next
    }

    pub fn with_payment_method(&self, method: PaymentMethod) -> Self {
        Self {
            payment_method: method,
            ..self.clone()
        }
    }

    pub fn add_item(&self) -> Self {
        Self {
            items: line_item::add_item(&self.items),
            ..self.clone()
        }
    }

    pub fn update_item(&self, index: usize, field: LineItemField, value: &str) -> Self {
        Self {
            items: line_item::update_item(&self.items, index, field, value),
            ..self.clone()
        }
    }

    pub fn remove_item(&self, index: usize) -> Self {
        Self {
            items: line_item::remove_item(&self.items, index),
            ..self.clone()
        }
    }

    pub fn total(&self) -> f64 {
        line_item::total(&self.items)
    }
}

impl Default for Invoice {
    fn default() -> Self {
        Self::new_at(Local::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 7, 15, 10, 30, 0).unwrap()
    }

    #[test]
    fn invoice_number_uses_last_six_timestamp_digits() {
        assert_eq!(default_invoice_number(1_721_039_400_123), "INV-400123");
        assert_eq!(default_invoice_number(42), "INV-42");
    }

    #[test]
    fn fresh_invoice_has_defaults() {
        let now = fixed_now();
        let invoice = Invoice::new_at(now);

        assert_eq!(invoice.date, "2024-07-15");
        assert_eq!(invoice.invoice_no, default_invoice_number(now.timestamp_millis()));
        assert_eq!(invoice.payment_method, PaymentMethod::Cash);
        assert_eq!(invoice.items.len(), 2);
        assert_eq!(invoice.items[0].description, "Monthly Rent");
        assert_eq!(invoice.items[1].description, "Mess Charges");
        assert_eq!(invoice.total(), 0.0);
        assert!(invoice.student_name.is_empty());
        assert!(invoice.notes.is_empty());
    }

    #[test]
    fn set_replaces_only_the_named_field() {
        let invoice = Invoice::new_at(fixed_now());
        let updated = invoice.set(InvoiceField::StudentName, "Rahul Sharma");

        assert_eq!(updated.student_name, "Rahul Sharma");
        assert_eq!(updated.get(InvoiceField::StudentName), "Rahul Sharma");
        assert_eq!(Invoice { student_name: String::new(), ..updated }, invoice);
    }

    #[test]
    fn set_accepts_unvalidated_text() {
        let invoice = Invoice::new_at(fixed_now())
            .set(InvoiceField::PhoneNo, "call the warden")
            .set(InvoiceField::Date, "someday")
            .set(InvoiceField::InvoiceNo, "");

        assert_eq!(invoice.phone_no, "call the warden");
        assert_eq!(invoice.date, "someday");
        assert_eq!(invoice.invoice_no, "");
    }

    #[test]
    fn payment_method_is_set_by_label() {
        let invoice = Invoice::new_at(fixed_now());

        let upi = invoice.set(InvoiceField::PaymentMethod, "UPI");
        assert_eq!(upi.payment_method, PaymentMethod::Upi);
        assert_eq!(upi.get(InvoiceField::PaymentMethod), "UPI");

        let unchanged = upi.set(InvoiceField::PaymentMethod, "Barter");
        assert_eq!(unchanged.payment_method, PaymentMethod::Upi);
    }

    #[test]
    fn item_operations_return_new_invoices() {
        let invoice = Invoice::new_at(fixed_now())
            .update_item(0, LineItemField::Amount, "5000")
            .update_item(1, LineItemField::Amount, "3200");
        assert_eq!(invoice.total(), 8200.0);

        let extended = invoice.add_item().update_item(2, LineItemField::Description, "Fine");
        assert_eq!(extended.items.len(), 3);
        assert_eq!(invoice.items.len(), 2);

        let trimmed = extended.remove_item(0);
        assert_eq!(trimmed.items[0].description, "Mess Charges");
        assert_eq!(trimmed.total(), 3200.0);
    }
}
