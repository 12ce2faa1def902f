//! Validated inputs for the store.
//!
//! Every value here is checked on construction, so the store never sees a
//! missing, blank or over-long field. Identifiers arriving as text (form
//! fields, path segments) go through [`parse_id`].

use crate::domain::error::{StoreError, StoreResult};

/// Column width of `user.username`.
pub const USERNAME_MAX_LEN: usize = 50;
/// Column width of `user.email`.
pub const EMAIL_MAX_LEN: usize = 120;

fn required(field: &'static str, value: Option<String>) -> StoreResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(StoreError::validation(field, "must not be blank")),
        None => Err(StoreError::validation(field, "is required")),
    }
}

fn bounded(field: &'static str, value: Option<String>, max_len: usize) -> StoreResult<String> {
    let value = required(field, value)?.trim().to_string();
    if value.chars().count() > max_len {
        return Err(StoreError::validation(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }
    Ok(value)
}

/// Parses a record identifier supplied as text.
pub fn parse_id(field: &'static str, value: Option<&str>) -> StoreResult<i64> {
    let raw = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        Some(_) => return Err(StoreError::validation(field, "must not be blank")),
        None => return Err(StoreError::validation(field, "is required")),
    };
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        Ok(_) => Err(StoreError::validation(field, "must be a positive integer")),
        Err(_) => Err(StoreError::validation(
            field,
            format!("expected an integer id, got '{}'", raw),
        )),
    }
}

/// Username and email of a user, checked against the column widths.
///
/// Creating a user and replacing a user's fields take the same pair of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    username: String,
    email: String,
}

pub type NewUser = UserFields;
pub type UserChanges = UserFields;

impl UserFields {
    pub fn new(username: Option<String>, email: Option<String>) -> StoreResult<Self> {
        Ok(Self {
            username: bounded("username", username, USERNAME_MAX_LEN)?,
            email: bounded("email", email, EMAIL_MAX_LEN)?,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    content: String,
    owner_id: i64,
}

impl NewPost {
    pub fn new(content: Option<String>, owner_id: i64) -> StoreResult<Self> {
        Ok(Self {
            content: required("content", content)?,
            owner_id,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn owner_id(&self) -> i64 {
        self.owner_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostChanges {
    content: String,
}

impl PostChanges {
    pub fn new(content: Option<String>) -> StoreResult<Self> {
        Ok(Self {
            content: required("content", content)?,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    text: String,
    post_id: i64,
}

impl NewComment {
    pub fn new(text: Option<String>, post_id: i64) -> StoreResult<Self> {
        Ok(Self {
            text: required("text", text)?,
            post_id,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn post_id(&self) -> i64 {
        self.post_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentChanges {
    text: String,
}

impl CommentChanges {
    pub fn new(text: Option<String>) -> StoreResult<Self> {
        Ok(Self {
            text: required("text", text)?,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
