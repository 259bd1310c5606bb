use std::sync::LazyLock;
use regex::{Captures, Regex};
use scraper::{Html, Node};
use serde::{Deserialize, Serialize};
use crate::config::DEFAULT_CAPACITY;
use crate::domain::models::ledger::{Attendee, EventRecord, Payment, SkillLevel};
use crate::error::AppError;

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</p\s*>|</div\s*>").expect("valid line break pattern")
});

static NBSP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)&nbsp;").expect("valid nbsp pattern")
});

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""__s(\d+)__""#).expect("valid placeholder pattern")
});

/// Wire shape of a record inside the calendar entry's description.
///
/// The aliases are the keys of the older YAML descriptions.
#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(default)]
struct RecordDocument {
    price: u32,
    #[serde(alias = "max_participants")]
    capacity: u32,
    level: SkillLevel,
    #[serde(alias = "attendes")]
    attendees: Vec<Attendee>,
    payments: Vec<Payment>,
}

/// Converts event records to and from the text stored in the backing calendar.
#[derive(Debug, Clone)]
pub struct RecordCodec {
    default_capacity: u32,
}

impl Default for RecordCodec {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl RecordCodec {
    pub fn new(default_capacity: u32) -> Self {
        Self { default_capacity }
    }

    pub fn default_capacity(&self) -> u32 {
        self.default_capacity
    }

    /// Blank text yields the zero-value record. Text that does not parse is a hard
    /// `MalformedRecord`: it may still hold attendees and payments.
    ///
    /// Descriptions written before the TOML format are YAML; they are read as such
    /// and come back as TOML on the next write.
    pub fn decode(&self, id: &str, raw_text: &str) -> Result<EventRecord, AppError> {
        let text = sanitize(raw_text);

        let document: RecordDocument = match toml::from_str(&text) {
            Ok(document) => document,
            Err(toml_err) => serde_yaml::from_str(&text).map_err(|_| {
                AppError::MalformedRecord(format!("event {}: {}", id, toml_err.message()))
            })?,
        };

        let mut attendees = document.attendees;
        attendees.sort_by_key(|a| a.signup_time);

        Ok(EventRecord {
            id: id.to_string(),
            capacity: if document.capacity == 0 { self.default_capacity } else { document.capacity },
            price: document.price,
            required_level: document.level,
            attendees,
            payments: document.payments,
        })
    }

    /// Every string value is written as a basic string with markup characters
    /// escaped, so `sanitize` leaves the text as it is on the way back.
    pub fn encode(&self, record: &EventRecord) -> Result<String, AppError> {
        let document = RecordDocument {
            price: record.price,
            capacity: record.capacity,
            level: record.required_level,
            attendees: record.attendees.clone(),
            payments: record.payments.clone(),
        };
        let encode_err = |e: &dyn std::fmt::Display| {
            AppError::Internal(format!("could not encode event {}: {}", record.id, e))
        };

        let mut value = toml::Value::try_from(&document).map_err(|e| encode_err(&e))?;
        let mut strings = Vec::new();
        take_strings(&mut value, &mut strings);

        let text = toml::to_string(&value).map_err(|e| encode_err(&e))?;

        Ok(PLACEHOLDER
            .replace_all(&text, |caps: &Captures| {
                caps[1].parse::<usize>().ok()
                    .and_then(|i| strings.get(i))
                    .map(|s| inert_basic_string(s))
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned())
    }
}

/// Swaps every string for a numbered placeholder the serializer writes verbatim.
fn take_strings(value: &mut toml::Value, strings: &mut Vec<String>) {
    match value {
        toml::Value::String(s) => {
            let placeholder = format!("__s{}__", strings.len());
            strings.push(std::mem::replace(s, placeholder));
        }
        toml::Value::Array(items) => items.iter_mut().for_each(|v| take_strings(v, strings)),
        toml::Value::Table(table) => table.iter_mut().for_each(|(_, v)| take_strings(v, strings)),
        _ => {}
    }
}

fn inert_basic_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '<' | '>' | '&' | '\u{a0}' => out.push_str(&format!("\\u{:04X}", ch as u32)),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Neutralises markup typed into the calendar UI. Line breaks become newlines,
/// non-breaking spaces become spaces, and everything else that is markup is dropped
/// so only text nodes reach the parser.
pub fn sanitize(raw_text: &str) -> String {
    let with_breaks = LINE_BREAKS.replace_all(raw_text, "\n");
    let spaced = NBSP.replace_all(&with_breaks, " ");

    let fragment = Html::parse_fragment(&spaced);
    let mut text = String::with_capacity(spaced.len());

    for node in fragment.root_element().descendants() {
        if let Node::Text(t) = node.value() {
            let hidden = node.ancestors().any(|a| {
                a.value().as_element().is_some_and(|e| matches!(e.name(), "script" | "style"))
            });
            if !hidden {
                text.push_str(t);
            }
        }
    }

    text.replace('\u{a0}', " ")
}
