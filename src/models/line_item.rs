/// A single billable row on an invoice. Rows are addressed by position.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub description: String,
    pub amount: f64,
}

impl LineItem {
    pub fn new(description: impl Into<String>, amount: f64) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }

    pub fn blank() -> Self {
        Self::new(String::new(), 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemField {
    Description,
    Amount,
}

/// Parse user input for an amount. Anything that is not a finite number becomes 0.
pub fn parse_amount(input: &str) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

pub fn add_item(items: &[LineItem]) -> Vec<LineItem> {
    let mut next = items.to_vec();
    next.push(LineItem::blank());
    next
}

/// Returns a copy of `items` with one attribute of the row at `index` replaced.
/// An index past the end leaves the rows unchanged.
pub fn update_item(
    items: &[LineItem],
    index: usize,
    field: LineItemField,
    value: &str,
) -> Vec<LineItem> {
    let mut next = items.to_vec();
    if let Some(item) = next.get_mut(index) {
        match field {
            LineItemField::Description => item.description = value.to_string(),
            LineItemField::Amount => item.amount = parse_amount(value),
        }
    }
    next
}

pub fn remove_item(items: &[LineItem], index: usize) -> Vec<LineItem> {
    items
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, item)| item.clone())
        .collect()
}

pub fn total(items: &[LineItem]) -> f64 {
    items.iter().map(|item| item.amount).sum()
}
