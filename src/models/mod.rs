mod invoice;
mod line_item;
mod payment_method;

pub use invoice::{Invoice, InvoiceField};
pub use line_item::LineItemField;
pub use payment_method::PaymentMethod;
