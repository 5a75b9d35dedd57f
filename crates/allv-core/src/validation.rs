//! Input validation for user and post forms.
//!
//! Every rule runs, so a single submission reports all of its field errors at
//! once. Accepted input comes back trimmed.

use crate::error::{AllvError, Result};
use crate::types::{PostInput, UserInput};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

pub const NAME_MAX_CHARS: usize = 50;
pub const TITLE_MAX_CHARS: usize = 120;

/// Field name -> messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn into_result<T>(self, value: T) -> Result<T> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(AllvError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

/// Validate a user form. Returns the trimmed input on success.
pub fn validate_user(input: &UserInput) -> Result<UserInput> {
    let name = input.name.trim();
    let email = input.email.trim();
    let mut errors = FieldErrors::new();

    if name.is_empty() {
        errors.add("name", "Name is required");
    } else if name.chars().count() > NAME_MAX_CHARS {
        errors.add(
            "name",
            format!("Name must be at most {NAME_MAX_CHARS} characters"),
        );
    }

    if !email_pattern().is_match(email) {
        errors.add("email", "Invalid email");
    }

    errors.into_result(UserInput {
        name: name.to_string(),
        email: email.to_string(),
    })
}

/// Validate a post form. Returns the trimmed input on success.
pub fn validate_post(input: &PostInput) -> Result<PostInput> {
    let title = input.title.trim();
    let body = input.body.trim();
    let mut errors = FieldErrors::new();

    if title.is_empty() {
        errors.add("title", "Title is required");
    } else if title.chars().count() > TITLE_MAX_CHARS {
        errors.add(
            "title",
            format!("Title must be at most {TITLE_MAX_CHARS} characters"),
        );
    }

    if body.is_empty() {
        errors.add("body", "Content is required");
    }

    errors.into_result(PostInput {
        title: title.to_string(),
        body: body.to_string(),
    })
}
