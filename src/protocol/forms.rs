//! Account forms and their client-side validation.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// A field that failed validation. Shown inline next to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

impl ValidationError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Text fields addressable by index, so one screen can edit any form.
pub trait EditableForm {
    fn labels(&self) -> &'static [&'static str];
    fn field(&self, index: usize) -> &str;
    fn field_mut(&mut self, index: usize) -> Option<&mut String>;

    /// Whether the field should be masked when drawn.
    fn is_secret(&self, index: usize) -> bool;

    fn len(&self) -> usize {
        self.labels().len()
    }
}

fn require(value: &str, field: &'static str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new(field, message))
    } else {
        Ok(())
    }
}

fn check_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_PATTERN.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::new("email", "Invalid email format"))
    }
}

/// Body of `POST /api/user/register`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub full_name: String,
    pub roll_number: String,
    pub email: String,
    pub branch: String,
    pub course: String,
    pub phone_number: String,
    pub yog: String,
}

const REGISTRATION_LABELS: [&str; 7] = [
    "Full name",
    "Roll number",
    "Email",
    "Branch",
    "Course",
    "Phone number",
    "Year of graduation",
];

impl RegistrationForm {
    /// Check fields in form order and report the first failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.full_name, "fullName", "Full name is required")?;
        require(&self.roll_number, "rollNumber", "Roll number is required")?;
        check_email(&self.email)?;
        require(&self.branch, "branch", "Branch is required")?;
        require(&self.course, "course", "Course is required")?;

        let phone_ok =
            self.phone_number.len() == 10 && self.phone_number.chars().all(|c| c.is_ascii_digit());
        if !phone_ok {
            return Err(ValidationError::new("phoneNumber", "Must be 10 digit number"));
        }

        if self.yog.chars().count() < 4 {
            return Err(ValidationError::new("yog", "Year of graduation must be valid"));
        }
        Ok(())
    }
}

impl EditableForm for RegistrationForm {
    fn labels(&self) -> &'static [&'static str] {
        &REGISTRATION_LABELS
    }

    fn field(&self, index: usize) -> &str {
        match index {
            0 => &self.full_name,
            1 => &self.roll_number,
            2 => &self.email,
            3 => &self.branch,
            4 => &self.course,
            5 => &self.phone_number,
            6 => &self.yog,
            _ => "",
        }
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.full_name),
            1 => Some(&mut self.roll_number),
            2 => Some(&mut self.email),
            3 => Some(&mut self.branch),
            4 => Some(&mut self.course),
            5 => Some(&mut self.phone_number),
            6 => Some(&mut self.yog),
            _ => None,
        }
    }

    fn is_secret(&self, _index: usize) -> bool {
        false
    }
}

/// Body of `POST /api/user/signin`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

const SIGN_IN_LABELS: [&str; 2] = ["Email", "Password"];

impl SignInForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_email(&self.email)?;
        require(&self.password, "password", "Password is required")
    }
}

impl EditableForm for SignInForm {
    fn labels(&self) -> &'static [&'static str] {
        &SIGN_IN_LABELS
    }

    fn field(&self, index: usize) -> &str {
        match index {
            0 => &self.email,
            1 => &self.password,
            _ => "",
        }
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.email),
            1 => Some(&mut self.password),
            _ => None,
        }
    }

    fn is_secret(&self, index: usize) -> bool {
        index == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_registration() -> RegistrationForm {
        RegistrationForm {
            full_name: "Ada Lovelace".to_string(),
            roll_number: "21CS042".to_string(),
            email: "ada@example.com".to_string(),
            branch: "CSE".to_string(),
            course: "B.Tech".to_string(),
            phone_number: "9876543210".to_string(),
            yog: "2026".to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(valid_registration().validate().is_ok());
    }

    #[test]
    fn test_registration_reports_first_failure() {
        let mut form = valid_registration();
        form.full_name.clear();
        form.email = "broken".to_string();
        assert_eq!(form.validate().unwrap_err().field, "fullName");
    }

    #[test]
    fn test_phone_number_rules() {
        let mut form = valid_registration();
        form.phone_number = "12345".to_string();
        assert_eq!(
            form.validate().unwrap_err().message,
            "Must be 10 digit number"
        );

        form.phone_number = "98765x3210".to_string();
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_year_of_graduation_length() {
        let mut form = valid_registration();
        form.yog = "26".to_string();
        assert_eq!(form.validate().unwrap_err().field, "yog");
    }

    #[test]
    fn test_email_pattern() {
        let mut form = SignInForm {
            email: "a@b.c".to_string(),
            password: "x".to_string(),
        };
        assert!(form.validate().is_ok());

        for bad in ["a@b", "a b@c.d", "@c.d", "a@.", ""] {
            form.email = bad.to_string();
            assert_eq!(form.validate().unwrap_err().message, "Invalid email format", "{bad}");
        }
    }

    #[test]
    fn test_sign_in_requires_password() {
        let form = SignInForm {
            email: "a@b.c".to_string(),
            password: String::new(),
        };
        assert_eq!(form.validate().unwrap_err().message, "Password is required");
    }

    #[test]
    fn test_editable_fields() {
        let mut form = SignInForm::default();
        form.field_mut(0).unwrap().push_str("x@y.z");
        assert_eq!(form.field(0), "x@y.z");
        assert!(form.field_mut(2).is_none());
        assert!(form.is_secret(1));
        assert_eq!(form.len(), 2);
    }

    #[test]
    fn test_registration_body_field_names() {
        let json = serde_json::to_string(&valid_registration()).unwrap();
        assert!(json.contains("\"fullName\""));
        assert!(json.contains("\"phoneNumber\""));
        assert!(json.contains("\"yog\""));
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_registration_has_seven_plain_fields() {
        let mut form = RegistrationForm::default();
        assert_eq!(form.len(), 7);
        assert!(form.field_mut(7).is_none());
        assert!((0..7).all(|index| !form.is_secret(index)));
    }
}
