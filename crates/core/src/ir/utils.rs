//! Common utilities for Go code generation.
//!
//! This module provides identifier synthesis and literal helpers shared
//! across the renderer, the operation compiler and emission.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::spec::EnumValue;

/// Go keywords that cannot be used as identifiers.
pub static GO_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "break",
        "case",
        "chan",
        "const",
        "continue",
        "default",
        "defer",
        "else",
        "fallthrough",
        "for",
        "func",
        "go",
        "goto",
        "if",
        "import",
        "interface",
        "map",
        "package",
        "range",
        "return",
        "select",
        "struct",
        "switch",
        "type",
        "var",
    ]
    .into_iter()
    .collect()
});

/// Locals and package names used inside generated function bodies.
pub static GENERATED_LOCALS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "body", "c", "context", "ctx", "err", "fmt", "http", "item", "net", "opt", "opts", "out",
        "path", "q", "req", "time", "url", "uuid", "v",
    ]
    .into_iter()
    .collect()
});

/// Words Go style writes fully upper-cased.
pub static COMMON_INITIALISMS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID",
        "IP", "JSON", "QPS", "RAM", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS", "TTL", "UDP",
        "UI", "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML", "XMPP", "XSRF", "XSS",
    ]
    .into_iter()
    .collect()
});

/// Split a name into words on separators and case boundaries.
///
/// `widget_id` → `[widget, id]`, `HTTPServer` → `[HTTP, Server]`.
pub fn split_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_ascii_uppercase() && !current.is_empty() {
            let prev = i.checked_sub(1).and_then(|p| chars.get(p)).copied();
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let boundary = prev.is_some_and(|p| {
                p.is_ascii_lowercase()
                    || p.is_ascii_digit()
                    || (p.is_ascii_uppercase() && next_is_lower)
            });
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn pascal_word(word: &str) -> String {
    let upper = word.to_ascii_uppercase();
    if COMMON_INITIALISMS.contains(upper.as_str()) {
        return upper;
    }
    let lower = word.to_ascii_lowercase();
    capitalize_first(&lower)
}

/// Convert a name to PascalCase with Go initialisms (`user_id` → `UserID`).
///
/// May return an empty string or one starting with a digit; use
/// [`exported_name`] for a guaranteed identifier.
pub fn to_pascal_case(name: &str) -> String {
    split_words(name).iter().map(|w| pascal_word(w)).collect()
}

/// An exported Go identifier for `name`.
pub fn exported_name(name: &str) -> String {
    let pascal = to_pascal_case(name);
    if pascal.is_empty() {
        return "Unnamed".to_string();
    }
    if pascal.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("N{pascal}");
    }
    pascal
}

/// An unexported Go identifier for a parameter (`widget_id` → `widgetID`).
///
/// Keywords and names used by generated bodies get a `Param` suffix.
pub fn local_name(name: &str) -> String {
    let words = split_words(name);
    let mut result = String::new();
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            result.push_str(&word.to_ascii_lowercase());
        } else {
            result.push_str(&pascal_word(word));
        }
    }

    if result.is_empty() {
        return "param".to_string();
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result = format!("p{result}");
    }
    if GO_RESERVED_WORDS.contains(result.as_str()) || GENERATED_LOCALS.contains(result.as_str())
    {
        result.push_str("Param");
    }
    result
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Convert a string to snake_case (for comparison purposes).
pub fn to_snake_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Drop one plural suffix: `widgets` → `widget`, `entries` → `entry`.
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies")
        && !stem.is_empty()
    {
        return format!("{stem}y");
    }
    if let Some(stem) = word.strip_suffix('s')
        && !stem.is_empty()
        && !stem.ends_with('s')
    {
        return stem.to_string();
    }
    word.to_string()
}

/// Quote a string as a Go interpreted string literal.
pub fn go_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a number without a trailing `.0` when it is integral.
pub fn format_number(n: f64) -> String {
    if n.fract().abs() < f64::EPSILON && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Identifier-safe suffix for an enum constant (`-2` → `Neg2`, `1.5` → `1_5`).
pub fn enum_const_suffix(value: &EnumValue) -> String {
    let literal = match value {
        EnumValue::String(s) => return to_pascal_case(s),
        EnumValue::Integer(n) => n.to_string(),
        EnumValue::Float(f) => format_number(*f),
        EnumValue::Bool(b) => return if *b { "True" } else { "False" }.to_string(),
        EnumValue::Null => return "Null".to_string(),
    };
    let unsigned = literal.strip_prefix('-');
    let digits = unsigned.unwrap_or(literal.as_str()).replace(['.', '+'], "_");
    if unsigned.is_some() {
        format!("Neg{digits}")
    } else {
        digits
    }
}

/// Map a package qualifier to its import path.
pub fn qualifier_import(qualifier: &str) -> Option<&'static str> {
    match qualifier {
        "context" => Some("context"),
        "fmt" => Some("fmt"),
        "http" => Some("net/http"),
        "net" => Some("net"),
        "time" => Some("time"),
        "url" => Some("net/url"),
        "uuid" => Some("github.com/google/uuid"),
        _ => None,
    }
}

/// Split documentation text into comment lines; blank or `"null"` text yields none.
pub fn doc_lines(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return Vec::new();
    }
    trimmed.lines().map(|l| l.trim_end().to_string()).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("widget_id"), vec!["widget", "id"]);
        assert_eq!(split_words("HTTPServer"), vec!["HTTP", "Server"]);
        assert_eq!(split_words("listWidgets"), vec!["list", "Widgets"]);
        assert_eq!(split_words("x-request-id"), vec!["x", "request", "id"]);
        assert_eq!(split_words("v2Beta"), vec!["v2", "Beta"]);
        assert!(split_words("--").is_empty());
    }

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("id"), "ID");
        assert_eq!(to_pascal_case("userId"), "UserID");
        assert_eq!(to_pascal_case("html_url"), "HTMLURL");
        assert_eq!(to_pascal_case("listWidgets"), "ListWidgets");
        assert_eq!(to_pascal_case("STATUS"), "Status");
        assert_eq!(to_pascal_case("OAuth"), "OAuth");
    }

    #[test]
    fn test_exported_name() {
        assert_eq!(exported_name("name"), "Name");
        assert_eq!(exported_name("1password"), "N1password");
        assert_eq!(exported_name("$"), "Unnamed");
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("widget_id"), "widgetID");
        assert_eq!(local_name("ID"), "id");
        assert_eq!(local_name("type"), "typeParam");
        assert_eq!(local_name("path"), "pathParam");
        assert_eq!(local_name("9lives"), "p9lives");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("itemId"), "item_id");
        assert_eq!(to_snake_case("item_id"), "item_id");
        assert_eq!(to_snake_case("ItemID"), "item_id");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("widgets"), "widget");
        assert_eq!(singularize("widget"), "widget");
        assert_eq!(singularize("entries"), "entry");
        assert_eq!(singularize("address"), "address");
    }

    #[test]
    fn test_go_string_literal() {
        assert_eq!(go_string_literal("plain"), "\"plain\"");
        assert_eq!(go_string_literal("a\"b"), "\"a\\\"b\"");
        assert_eq!(go_string_literal("a\\b\n"), "\"a\\\\b\\n\"");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(1.5), "1.5");
    }

    #[test]
    fn test_enum_const_suffix() {
        assert_eq!(enum_const_suffix(&EnumValue::String("in-progress".into())), "InProgress");
        assert_eq!(enum_const_suffix(&EnumValue::Integer(1)), "1");
        assert_eq!(enum_const_suffix(&EnumValue::Integer(-2)), "Neg2");
        assert_eq!(enum_const_suffix(&EnumValue::Float(1.5)), "1_5");
        assert_eq!(enum_const_suffix(&EnumValue::Bool(true)), "True");
    }

    #[test]
    fn test_doc_lines() {
        assert!(doc_lines("   ").is_empty());
        assert!(doc_lines("null").is_empty());
        assert_eq!(doc_lines("First.\nSecond.  "), vec!["First.", "Second."]);
    }
}
