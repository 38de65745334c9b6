//! Field model for a single log call
//!
//! Every call is captured as [`Fields`]: an ordered `prefix` (`ts`, `caller`,
//! then always `level`) and an ordered `payload` (`msg` first, then the
//! caller's key/value pairs in call order). Values are stringified once, at
//! the call boundary, into a closed [`Value`] so rendering never has to
//! inspect argument types.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Well-known field keys.
pub mod keys {
    pub const TIMESTAMP: &str = "ts";
    pub const CALLER: &str = "caller";
    pub const LEVEL: &str = "level";
    pub const MESSAGE: &str = "msg";
    /// Key used when a value has no (or a blank) key.
    pub const MISSING: &str = "missing";
}

/// A pre-stringified argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Came from a string; always quoted in fully structured lines.
    Text(String),
    /// Numbers, booleans and other `Display` values.
    Scalar(String),
    /// Debug or serialized dump of a composite value.
    Structured(String),
}

impl Value {
    /// Wrap any `Display` value as a scalar.
    pub fn display<T: fmt::Display + ?Sized>(value: &T) -> Self {
        Value::Scalar(value.to_string())
    }

    /// Full structural dump of a composite value.
    pub fn debug<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Value::Structured(format!("{:?}", value))
    }

    /// Serialize a composite value as compact JSON.
    ///
    /// Never fails: values serde cannot represent fall back to an error marker.
    pub fn serialized<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(json) => Value::Structured(json),
            Err(e) => Value::Structured(format!("<unserializable: {}>", e)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Value::Text(s) | Value::Scalar(s) | Value::Structured(s) => s,
        }
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    /// Whether this value must be quoted when rendered as `key=value`.
    pub fn needs_quoting(&self) -> bool {
        match self {
            Value::Text(_) => true,
            Value::Scalar(s) | Value::Structured(s) => {
                s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == '"' || c == '=')
            }
        }
    }

    /// Render for a `key=value` pair, quoting and escaping when needed.
    pub fn render_logfmt(&self) -> Cow<'_, str> {
        if self.needs_quoting() {
            Cow::Owned(quote(self.as_str()))
        } else {
            Cow::Borrowed(self.as_str())
        }
    }

    /// Render an extra of a plain line: quoted and escaped only when the
    /// text contains whitespace, whatever the kind.
    pub fn render_plain(&self) -> Cow<'_, str> {
        let s = self.as_str();
        if s.chars().any(char::is_whitespace) {
            Cow::Owned(quote(s))
        } else {
            Cow::Borrowed(s)
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<Cow<'_, str>> for Value {
    fn from(s: Cow<'_, str>) -> Self {
        Value::Text(s.into_owned())
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Text(c.to_string())
    }
}

impl From<fmt::Arguments<'_>> for Value {
    fn from(args: fmt::Arguments<'_>) -> Self {
        Value::Text(args.to_string())
    }
}

macro_rules! scalar_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Scalar(v.to_string())
                }
            }
        )*
    };
}

scalar_from!(bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Number(n) => Value::Scalar(n.to_string()),
            serde_json::Value::Bool(b) => Value::Scalar(b.to_string()),
            other => Value::Structured(other.to_string()),
        }
    }
}

/// Quote a value, escaping backslashes, quotes and control characters.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Join operands the way `Sprint` does: a space goes between two adjacent
/// operands only when neither of them is text.
pub fn join_print(values: &[Value]) -> String {
    let mut out = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 && !value.is_text() && !values[i - 1].is_text() {
            out.push(' ');
        }
        out.push_str(value.as_str());
    }
    out
}

/// Join operands the way `Sprintln` does: always space-separated, newline
/// terminated.
pub fn join_println(values: &[Value]) -> String {
    let mut out = values
        .iter()
        .map(Value::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    out.push('\n');
    out
}

/// One key/value pair of a log call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    pub value: Value,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let key = if key.trim().is_empty() {
            keys::MISSING.to_string()
        } else {
            key
        };
        Self {
            key,
            value: value.into(),
        }
    }

    /// `key=value` with the value quoted per [`Value::needs_quoting`].
    pub fn render_logfmt(&self) -> String {
        format!("{}={}", self.key, self.value.render_logfmt())
    }
}

/// Pair a flat `key, value, key, value, ...` list.
///
/// A trailing value without a partner gets the key `"missing"`, as does any
/// blank key.
pub fn pair_key_values(args: &[Value]) -> Vec<Field> {
    args.chunks(2)
        .map(|chunk| match chunk.get(1) {
            Some(value) => Field::new(chunk[0].as_str(), value.clone()),
            None => Field::new(keys::MISSING, chunk[0].clone()),
        })
        .collect()
}

/// The complete structured representation of one log call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fields {
    /// `ts` and `caller` when enabled, followed by exactly one `level`.
    pub prefix: Vec<Field>,
    /// `msg` first, then user pairs in call order.
    pub payload: Vec<Field>,
}

impl Fields {
    pub fn new(prefix: Vec<Field>, message: impl Into<Value>, extras: Vec<Field>) -> Self {
        let mut payload = Vec::with_capacity(extras.len() + 1);
        payload.push(Field {
            key: keys::MESSAGE.to_string(),
            value: message.into(),
        });
        payload.extend(extras);
        Self { prefix, payload }
    }

    /// The message text, exactly as captured.
    pub fn message(&self) -> &str {
        self.payload
            .first()
            .map(|f| f.value.as_str())
            .unwrap_or_default()
    }

    /// The message with one trailing line terminator removed.
    pub fn message_line(&self) -> &str {
        let message = self.message();
        message
            .strip_suffix("\r\n")
            .or_else(|| message.strip_suffix('\n'))
            .unwrap_or(message)
    }

    /// User-supplied pairs following `msg`.
    pub fn extras(&self) -> &[Field] {
        self.payload.get(1..).unwrap_or_default()
    }

    /// First prefix field with `key`.
    pub fn prefix_value(&self, key: &str) -> Option<&Value> {
        self.prefix.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    /// First payload field with `key`.
    pub fn payload_value(&self, key: &str) -> Option<&Value> {
        self.payload.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    /// All fields, prefix first.
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.prefix.iter().chain(self.payload.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kinds() {
        assert_eq!(Value::from("v1"), Value::Text("v1".to_string()));
        assert_eq!(Value::from(2.5), Value::Scalar("2.5".to_string()));
        assert_eq!(Value::from(15.5_f32), Value::Scalar("15.5".to_string()));
        assert_eq!(Value::from(true), Value::Scalar("true".to_string()));
        assert_eq!(
            Value::debug(&vec![1, 2]),
            Value::Structured("[1, 2]".to_string())
        );
    }

    #[test]
    fn test_serialized_value() {
        #[derive(Serialize)]
        struct Point {
            x: i32,
            y: i32,
        }

        let value = Value::serialized(&Point { x: 1, y: -2 });
        assert_eq!(value, Value::Structured(r#"{"x":1,"y":-2}"#.to_string()));
    }

    #[test]
    fn test_quoting_rule() {
        assert_eq!(Value::from("v1").render_logfmt(), "\"v1\"");
        assert_eq!(Value::from("a b").render_logfmt(), "\"a b\"");
        assert_eq!(Value::from(42).render_logfmt(), "42");
        assert_eq!(Value::display("no-space").render_logfmt(), "no-space");
        assert_eq!(Value::display("has space").render_logfmt(), "\"has space\"");
        assert_eq!(Value::debug(&(1, 2)).render_logfmt(), "\"(1, 2)\"");
        assert_eq!(Value::display("").render_logfmt(), "\"\"");
    }

    #[test]
    fn test_quote_escapes_once() {
        assert_eq!(quote(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(quote("a\\b"), r#""a\\b""#);
        assert_eq!(quote("line\nbreak"), r#""line\nbreak""#);
    }

    #[test]
    fn test_join_print() {
        let values = [Value::from("This is "), Value::from("info log")];
        assert_eq!(join_print(&values), "This is info log");

        let values = [Value::from(1), Value::from(2), Value::from("x"), Value::from(3)];
        assert_eq!(join_print(&values), "1 2x3");
    }

    #[test]
    fn test_join_println() {
        let values = [Value::from("This is warn log"), Value::from("level warning")];
        assert_eq!(join_println(&values), "This is warn log level warning\n");
        assert_eq!(join_println(&[]), "\n");
    }

    #[test]
    fn test_pairing_even() {
        let args = [
            Value::from("k1"),
            Value::from("v1"),
            Value::from("k2"),
            Value::from(2.5),
        ];
        let fields = pair_key_values(&args);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], Field::new("k1", "v1"));
        assert_eq!(fields[1], Field::new("k2", 2.5));
    }

    #[test]
    fn test_pairing_odd_pads_missing() {
        let args = [Value::from("k1"), Value::from("v1"), Value::from("orphan")];
        let fields = pair_key_values(&args);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].key, keys::MISSING);
        assert_eq!(fields[1].value.as_str(), "orphan");
    }

    #[test]
    fn test_blank_key_becomes_missing() {
        let args = [Value::from("  "), Value::from("v")];
        let fields = pair_key_values(&args);
        assert_eq!(fields[0].key, keys::MISSING);
    }

    #[test]
    fn test_fields_accessors() {
        let fields = Fields::new(
            vec![Field::new(keys::LEVEL, Value::display("INFO"))],
            "hello",
            vec![Field::new("user", "alice")],
        );

        assert_eq!(fields.message(), "hello");
        assert_eq!(fields.message_line(), "hello");
        assert_eq!(fields.extras().len(), 1);
        assert_eq!(fields.payload[0].key, keys::MESSAGE);
        assert_eq!(fields.prefix_value(keys::LEVEL).unwrap().as_str(), "INFO");
        assert_eq!(fields.payload_value("user").unwrap().as_str(), "alice");
        assert_eq!(fields.iter().count(), 3);
    }

    #[test]
    fn test_message_line_strips_one_terminator() {
        let fields = Fields::new(Vec::new(), "a\n\n", Vec::new());
        assert_eq!(fields.message_line(), "a\n");

        let fields = Fields::new(Vec::new(), "b\r\n", Vec::new());
        assert_eq!(fields.message_line(), "b");
    }
}
