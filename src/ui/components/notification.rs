use tui::{
    backend::Backend,
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::Spans,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::centered_rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
    /// Waits for a yes/no answer instead of any key.
    Confirm,
}

/// A blocking popup. Input goes to the popup until it is dismissed.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn info(title: &str, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            title: title.to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: "Error".to_string(),
            message: message.into(),
        }
    }

    pub fn confirm(title: &str, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Confirm,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

pub fn render_notification<B: Backend>(
    frame: &mut Frame<B>,
    size: Rect,
    notification: &Notification,
) {
    let popup_area = centered_rect(60, 25, size);

    let (color, prompt) = match notification.kind {
        NotificationKind::Info => (Color::Green, "Press any key to continue"),
        NotificationKind::Error => (Color::Red, "Press any key to continue"),
        NotificationKind::Confirm => (Color::Yellow, "Y - Yes | N - No"),
    };

    let body = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(notification.message.as_str()),
        Spans::from(""),
        Spans::from(prompt),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().title(notification.title.as_str()).borders(Borders::ALL))
    .style(Style::default().fg(color));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(body, popup_area);
}
