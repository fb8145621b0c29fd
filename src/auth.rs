use thiserror::Error;
use tracing::{info, warn};

const VALID_USERID: &str = "admin1";
const VALID_PASSWORD: &str = "hostel@1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials. Please check your userid and password.")]
    InvalidCredentials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    UserId,
    Password,
}

/// The credential form in front of the invoice tool.
#[derive(Debug, Default)]
pub struct LoginForm {
    pub userid: String,
    pub password: String,
    pub error: Option<String>,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, field: LoginField) -> &str {
        match field {
            LoginField::UserId => &self.userid,
            LoginField::Password => &self.password,
        }
    }

    fn value_mut(&mut self, field: LoginField) -> &mut String {
        match field {
            LoginField::UserId => &mut self.userid,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn push(&mut self, field: LoginField, c: char) {
        self.value_mut(field).push(c);
        self.error = None;
    }

    pub fn pop(&mut self, field: LoginField) {
        self.value_mut(field).pop();
        self.error = None;
    }

    /// Check the entered credentials. A rejected attempt clears the password
    /// and keeps the user id.
    pub fn submit(&mut self) -> Result<(), AuthError> {
        if self.userid == VALID_USERID && self.password == VALID_PASSWORD {
            info!(userid = %self.userid, "login accepted");
            self.error = None;
            Ok(())
        } else {
            warn!(userid = %self.userid, "login rejected");
            let err = AuthError::InvalidCredentials;
            self.error = Some(err.to_string());
            self.password.clear();
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(userid: &str, password: &str) -> LoginForm {
        LoginForm {
            userid: userid.to_string(),
            password: password.to_string(),
            error: None,
        }
    }

    #[test]
    fn fixed_credentials_unlock() {
        let mut login = form("admin1", "hostel@1");
        assert_eq!(login.submit(), Ok(()));
        assert_eq!(login.error, None);
    }

    #[test]
    fn wrong_credentials_clear_only_the_password() {
        let attempts = [
            ("admin1", "hostel@2"),
            ("admin", "hostel@1"),
            ("", ""),
            ("ADMIN1", "hostel@1"),
        ];
        for (userid, password) in attempts {
            let mut login = form(userid, password);
            assert_eq!(login.submit(), Err(AuthError::InvalidCredentials));
            assert_eq!(login.userid, userid);
            assert!(login.password.is_empty());
            assert_eq!(
                login.error.as_deref(),
                Some("Invalid credentials. Please check your userid and password.")
            );
        }
    }

    #[test]
    fn typing_clears_the_error() {
        let mut login = form("admin1", "nope");
        let _ = login.submit();
        login.push(LoginField::Password, 'h');
        assert_eq!(login.error, None);
        assert_eq!(login.value(LoginField::Password), "h");

        let _ = login.submit();
        login.pop(LoginField::UserId);
        assert_eq!(login.error, None);
        assert_eq!(login.value(LoginField::UserId), "admin");
    }
}
