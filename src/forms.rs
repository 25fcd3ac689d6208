//! Boundary validation of submitted form fields.
//!
//! Form values arrive as untyped strings. A [`FormReader`] pulls each field
//! out as the type a flow needs, recording a message for every field that
//! fails, and [`FormReader::finish`] turns the collected messages into a
//! [`ValidationError`].

use std::collections::HashMap;

use crate::error::ValidationError;

pub type FormData = HashMap<String, String>;

pub struct FormReader<'a> {
    form: &'a FormData,
    aliases: Vec<(&'a str, &'a str)>,
    errors: ValidationError,
}

impl<'a> FormReader<'a> {
    pub fn new(form: &'a FormData) -> Self {
        Self {
            form,
            aliases: Vec::new(),
            errors: ValidationError::default(),
        }
    }

    /// Accept `alias` as another spelling of `canonical`. Errors are always
    /// reported under the canonical name.
    pub fn with_alias(mut self, alias: &'a str, canonical: &'a str) -> Self {
        self.aliases.push((alias, canonical));
        self
    }

    fn raw(&self, name: &str) -> Option<&'a str> {
        if let Some(value) = self.form.get(name) {
            return Some(value.as_str());
        }
        self.aliases
            .iter()
            .filter(|(_, canonical)| *canonical == name)
            .find_map(|(alias, _)| self.form.get(*alias))
            .map(String::as_str)
    }

    fn fail(&mut self, name: &str, message: &str) {
        self.errors.push_field(name, message);
    }

    /// Any finite number.
    pub fn number(&mut self, name: &str, message: &str) -> f64 {
        match self.raw(name).and_then(parse_number) {
            Some(value) => value,
            None => {
                self.fail(name, message);
                0.0
            }
        }
    }

    /// A finite number no smaller than `min`.
    pub fn number_at_least(&mut self, name: &str, min: f64, message: &str) -> f64 {
        match self.raw(name).and_then(parse_number) {
            Some(value) if value >= min => value,
            _ => {
                self.fail(name, message);
                0.0
            }
        }
    }

    /// A finite number strictly greater than `bound`.
    pub fn number_above(&mut self, name: &str, bound: f64, message: &str) -> f64 {
        match self.raw(name).and_then(parse_number) {
            Some(value) if value > bound => value,
            _ => {
                self.fail(name, message);
                0.0
            }
        }
    }

    /// Any submitted string, empty included.
    pub fn text(&mut self, name: &str, message: &str) -> String {
        match self.raw(name) {
            Some(value) => value.to_string(),
            None => {
                self.fail(name, message);
                String::new()
            }
        }
    }

    /// A string with at least `min_chars` characters once trimmed.
    pub fn text_at_least(&mut self, name: &str, min_chars: usize, message: &str) -> String {
        match self.raw(name).map(str::trim) {
            Some(value) if value.chars().count() >= min_chars => value.to_string(),
            _ => {
                self.fail(name, message);
                String::new()
            }
        }
    }

    /// The raw string, unchecked. Used when a later typed parse reports its
    /// own error.
    pub fn raw_text(&self, name: &str) -> &'a str {
        self.raw(name).unwrap_or("")
    }

    /// The parsed number, unchecked. `None` when missing or not a finite
    /// number.
    pub fn raw_number(&self, name: &str) -> Option<f64> {
        self.raw(name).and_then(parse_number)
    }

    /// One of a fixed set of values, matched exactly against `options`.
    pub fn choice<T: Copy>(
        &mut self,
        name: &str,
        options: &[(&str, T)],
        message: &str,
    ) -> Option<T> {
        let found = self.raw(name).and_then(|value| {
            options
                .iter()
                .find(|(label, _)| *label == value.trim())
                .map(|(_, option)| *option)
        });
        if found.is_none() {
            self.fail(name, message);
        }
        found
    }

    pub fn merge(&mut self, other: ValidationError) {
        for (field, messages) in other.field_errors {
            for message in messages {
                self.errors.push_field(&field, message);
            }
        }
        for message in other.form_errors {
            self.errors.push_form(message);
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
