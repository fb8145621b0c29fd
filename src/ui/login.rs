use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::auth::{LoginField, LoginForm};
use crate::ui::components::centered_rect;

pub struct LoginState {
    form: LoginForm,
    current_field: LoginField,
    show_password: bool,
    hostel_name: String,
}

pub enum LoginAction {
    Authenticated,
    Exit,
}

impl LoginState {
    pub fn new(hostel_name: &str) -> Self {
        Self {
            form: LoginForm::new(),
            current_field: LoginField::UserId,
            show_password: false,
            hostel_name: hostel_name.to_string(),
        }
    }

    fn toggle_field(&mut self) {
        self.current_field = match self.current_field {
            LoginField::UserId => LoginField::Password,
            LoginField::Password => LoginField::UserId,
        };
    }

    fn password_display(&self) -> String {
        if self.show_password {
            self.form.password.clone()
        } else {
            "•".repeat(self.form.password.chars().count())
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<LoginAction> {
        match key {
            KeyCode::Esc => return Some(LoginAction::Exit),
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => self.toggle_field(),
            KeyCode::F(2) => self.show_password = !self.show_password,
            KeyCode::Enter => {
                if self.current_field == LoginField::UserId {
                    self.current_field = LoginField::Password;
                } else if self.form.submit().is_ok() {
                    return Some(LoginAction::Authenticated);
                }
            }
            KeyCode::Backspace => self.form.pop(self.current_field),
            KeyCode::Char(c) => self.form.push(self.current_field, c),
            _ => {}
        }
        None
    }
}

pub fn render_login<B: Backend>(frame: &mut Frame<B>, state: &LoginState) {
    let area = centered_rect(50, 60, frame.size());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3), // Title
                Constraint::Length(3), // User ID
                Constraint::Length(3), // Password
                Constraint::Length(2), // Error
                Constraint::Min(2),    // Help
            ]
            .as_ref(),
        )
        .split(area);

    frame.render_widget(Block::default().title("Staff Login").borders(Borders::ALL), area);

    let title = Paragraph::new(vec![
        Spans::from(Span::styled(
            state.hostel_name.as_str(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Spans::from("Invoice Management System"),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let field_style = |field: LoginField| {
        if state.current_field == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        }
    };

    let cursor = |field: LoginField| if state.current_field == field { "|" } else { "" };

    let userid = Paragraph::new(Spans::from(vec![
        Span::styled("User ID: ", field_style(LoginField::UserId)),
        Span::raw(format!(
            "{}{}",
            state.form.value(LoginField::UserId),
            cursor(LoginField::UserId)
        )),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(userid, chunks[1]);

    let password = Paragraph::new(Spans::from(vec![
        Span::styled("Password: ", field_style(LoginField::Password)),
        Span::raw(format!("{}{}", state.password_display(), cursor(LoginField::Password))),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(password, chunks[2]);

    if let Some(error) = &state.form.error {
        let error = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center);
        frame.render_widget(error, chunks[3]);
    }

    let help = Paragraph::new(
        "Enter - Next / Sign in | Tab - Switch field | F2 - Show password | Esc - Quit",
    )
    .style(Style::default().fg(Color::Gray))
    .alignment(Alignment::Center);
    frame.render_widget(help, chunks[4]);
}

pub fn handle_input(state: &mut LoginState) -> Result<Option<LoginAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(state.handle_key(key.code));
    }
    Ok(None)
}
