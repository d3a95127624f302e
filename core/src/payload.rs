//! Form data as it travels from the surface to the relay.

use crate::error::ValidationError;
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Reserved payload key carrying the relay credential.
pub const ACCESS_KEY_FIELD: &str = "access_key";

/// Opaque credential identifying the caller to the relay.
///
/// Never parsed. `Debug` and `Display` are redacted so the key cannot leak
/// through logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessKey(String);

impl AccessKey {
    pub fn new(key: impl Into<String>) -> Self {
        AccessKey(key.into())
    }

    /// The raw key, for the one place that has to put it on the wire.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessKey(<redacted>)")
    }
}

impl std::fmt::Display for AccessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Ordered field/value pairs with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    entries: Vec<(String, String)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FormFields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = FormFields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

/// What actually goes over the wire for one attempt: the caller's fields
/// followed by the credential under [`ACCESS_KEY_FIELD`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPayload {
    fields: FormFields,
}

impl FormPayload {
    /// Merge the caller's fields with the credential.
    ///
    /// A caller-supplied `access_key` field is dropped; the credential always
    /// comes last so it is the only value for that key.
    pub fn assemble(mut fields: FormFields, credential: &AccessKey) -> Self {
        if fields.remove(ACCESS_KEY_FIELD).is_some() {
            tracing::debug!("caller supplied `{}`; replaced by credential", ACCESS_KEY_FIELD);
        }
        fields.insert(ACCESS_KEY_FIELD, credential.expose());
        FormPayload { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter()
    }

    /// Field names without the credential, safe to log.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().filter(|k| *k != ACCESS_KEY_FIELD).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The contact form rendered on the site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    /// Required-field check, in the order the fields appear on the page.
    pub fn validate(&self) -> Result<FormFields, ValidationError> {
        let name = required("name", &self.name)?;
        let email = required("email", &self.email)?;
        let message = required("message", &self.message)?;

        if EmailAddress::from_str(email).is_err() {
            return Err(ValidationError::InvalidEmail(email.to_string()));
        }

        Ok(FormFields::new()
            .with("name", name)
            .with("email", email)
            .with("message", message))
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}
