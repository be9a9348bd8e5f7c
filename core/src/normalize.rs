//! Classification of raw responses into outcomes and errors.
//!
//! # Design
//! Status codes are checked in a fixed order: 401 and 204 are structural
//! signals that do not depend on the body, so they are handled before any
//! attempt at JSON parsing. Remaining statuses below 400 are successes and
//! must carry JSON; everything else becomes an `HttpError` whose message is
//! composed from the error body when the server declares JSON and supplies a
//! `message` (or `msg`) field, and is the raw body text otherwise.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::http::HttpResponse;

/// Message used for a 401 whose body carries none.
pub const DEFAULT_AUTH_MESSAGE: &str = "Authentication failed: invalid or missing API key";

/// A successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A JSON body from a success status.
    Success(Value),
    /// 204 No Content.
    Empty,
}

impl Outcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Empty => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Empty => None,
        }
    }

    /// Decode the payload into `T`. An empty outcome has nothing to decode.
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            Outcome::Success(value) => serde_json::from_value(value)
                .map_err(|e| ApiError::DeserializationError(e.to_string())),
            Outcome::Empty => Err(ApiError::DeserializationError(
                "response had no content".to_string(),
            )),
        }
    }
}

/// Turn a raw response into an [`Outcome`] or the matching [`ApiError`].
pub fn normalize(response: &HttpResponse) -> Result<Outcome> {
    match response.status {
        401 => {
            let message = serde_json::from_str::<Value>(&response.body)
                .ok()
                .and_then(|body| body.get("message").filter(|m| !m.is_null()).map(render))
                .unwrap_or_else(|| DEFAULT_AUTH_MESSAGE.to_string());
            debug!(status = response.status, "request was not authenticated");
            Err(ApiError::Authentication {
                message,
                status: response.status,
            })
        }
        204 => Ok(Outcome::Empty),
        status if status < 400 => serde_json::from_str(&response.body)
            .map(Outcome::Success)
            .map_err(|e| {
                ApiError::DeserializationError(format!(
                    "status {status} carried a body that is not JSON: {e}"
                ))
            }),
        status => {
            let message = error_message(response);
            debug!(status, %message, "request failed");
            Err(ApiError::HttpError {
                message,
                status,
                response: response.clone(),
            })
        }
    }
}

/// Best-effort message for an error status.
fn error_message(response: &HttpResponse) -> String {
    if !response.is_json() {
        return response.body.clone();
    }
    let Ok(body) = serde_json::from_str::<Value>(&response.body) else {
        return response.body.clone();
    };
    let message = ["message", "msg"]
        .iter()
        .find_map(|key| body.get(*key).filter(|m| !m.is_null()));
    match message {
        Some(message) => format!(
            "Message: {} , Error details: {}, {}",
            render(message),
            render_field(&body, "errors"),
            render_field(&body, "data"),
        ),
        None => response.body.clone(),
    }
}

fn render_field(body: &Value, key: &str) -> String {
    body.get(key).map(render).unwrap_or_else(|| "None".to_string())
}

/// Render a value in Python literal style: strings
/// bare, everything else in literal form.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => literal(other),
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => float(f),
            _ => n.to_string(),
        },
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quote(k), literal(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

/// Shortest round-trip digits, positional for exponents in `-4..16` and
/// `d.ddde+XX` otherwise.
fn float(f: f64) -> String {
    let sci = format!("{f:e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

    if (-4..16).contains(&exponent) {
        if exponent < 0 {
            let zeros = "0".repeat((-exponent - 1) as usize);
            return format!("{sign}0.{zeros}{digits}");
        }
        let split = exponent as usize + 1;
        if digits.len() <= split {
            let zeros = "0".repeat(split - digits.len());
            format!("{sign}{digits}{zeros}.0")
        } else {
            format!("{sign}{}.{}", &digits[..split], &digits[split..])
        }
    } else {
        let (head, tail) = digits.split_at(1);
        let fraction = if tail.is_empty() { String::new() } else { format!(".{tail}") };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!("{sign}{head}{fraction}e{exp_sign}{:02}", exponent.abs())
    }
}

/// Single quotes unless the text contains one and no double quote.
fn quote(s: &str) -> String {
    let delimiter = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delimiter);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c if c < ' ' || ('\u{7f}'..='\u{9f}').contains(&c) => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}
