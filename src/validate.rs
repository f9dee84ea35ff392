//! Explicit per-entity validation.
//!
//! Each function collects every field failure before returning, so a caller
//! sees the full list in one response rather than one failure at a time.
//! Length bounds mirror the column definitions in the schema.

use crate::error::{ApiError, FieldError};
use crate::models::{
    CommentRequest, CreatePostRequest, RegisterRequest, TagRequest, UpdatePostRequest,
    UpdateUserRequest,
};

pub const USERNAME_MAX: usize = 80;
pub const EMAIL_MAX: usize = 120;
pub const NAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 8;
pub const TITLE_MIN: usize = 5;
pub const TITLE_MAX: usize = 120;
pub const TAG_MAX: usize = 50;

/// Structural email check: non-empty local part, domain with a dot, no
/// whitespace. Deliverability is not this layer's problem.
fn email_is_valid(email: &str) -> bool {
    if email.is_empty() || email.len() > EMAIL_MAX || email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
        }
        None => false,
    }
}

fn check_username(errors: &mut Vec<FieldError>, username: &str) {
    if username.is_empty() || username.len() > USERNAME_MAX {
        errors.push(FieldError::new(
            "username",
            format!("must be between 1 and {USERNAME_MAX} characters"),
        ));
    }
}

fn check_email(errors: &mut Vec<FieldError>, email: &str) {
    if !email_is_valid(email) {
        errors.push(FieldError::new("email", "must be a valid email address"));
    }
}

fn check_password(errors: &mut Vec<FieldError>, password: &str) {
    if password.len() < PASSWORD_MIN {
        errors.push(FieldError::new(
            "password",
            format!("must be at least {PASSWORD_MIN} characters"),
        ));
    }
}

fn check_name(errors: &mut Vec<FieldError>, field: &'static str, value: &Option<String>) {
    if let Some(name) = value {
        if name.len() > NAME_MAX {
            errors.push(FieldError::new(
                field,
                format!("must be at most {NAME_MAX} characters"),
            ));
        }
    }
}

fn check_title(errors: &mut Vec<FieldError>, title: &str) {
    if title.len() < TITLE_MIN || title.len() > TITLE_MAX {
        errors.push(FieldError::new(
            "title",
            format!("must be between {TITLE_MIN} and {TITLE_MAX} characters"),
        ));
    }
}

fn check_content(errors: &mut Vec<FieldError>, content: &str) {
    if content.is_empty() {
        errors.push(FieldError::new("content", "must not be empty"));
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Registration payload. The password policy is enforced here, before any
/// hashing is attempted.
pub fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    check_username(&mut errors, &req.username);
    check_email(&mut errors, &req.email);
    check_password(&mut errors, &req.password);
    check_name(&mut errors, "first_name", &req.first_name);
    check_name(&mut errors, "last_name", &req.last_name);
    finish(errors)
}

/// Partial user update. Only the fields that are present are checked.
pub fn validate_user_update(req: &UpdateUserRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if let Some(username) = &req.username {
        check_username(&mut errors, username);
    }
    if let Some(email) = &req.email {
        check_email(&mut errors, email);
    }
    if let Some(password) = &req.password {
        check_password(&mut errors, password);
    }
    check_name(&mut errors, "first_name", &req.first_name);
    check_name(&mut errors, "last_name", &req.last_name);
    finish(errors)
}

pub fn validate_new_post(req: &CreatePostRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    check_title(&mut errors, &req.title);
    if let Some(content) = &req.content {
        check_content(&mut errors, content);
    }
    finish(errors)
}

pub fn validate_post_update(req: &UpdatePostRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if let Some(title) = &req.title {
        check_title(&mut errors, title);
    }
    if let Some(content) = &req.content {
        check_content(&mut errors, content);
    }
    finish(errors)
}

pub fn validate_comment(req: &CommentRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    check_content(&mut errors, &req.content);
    finish(errors)
}

pub fn validate_tag(req: &TagRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if req.name.is_empty() || req.name.len() > TAG_MAX {
        errors.push(FieldError::new(
            "name",
            format!("must be between 1 and {TAG_MAX} characters"),
        ));
    }
    finish(errors)
}
