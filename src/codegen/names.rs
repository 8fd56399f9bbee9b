//! C# identifier helpers for generated members.

const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Turn a file or directory name into an identifier: `.`, `-` and spaces
/// become `_`, anything else outside `[A-Za-z0-9_]` is dropped, a leading
/// digit gets a `_` prefix and keywords are escaped with `@`.
pub fn sanitize_identifier(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .filter_map(|c| match c {
            '.' | '-' | ' ' => Some('_'),
            c if c == '_' || c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect();

    if out.is_empty() {
        return "_".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if KEYWORDS.contains(&out.as_str()) {
        out.insert(0, '@');
    }
    out
}

/// Parameter name without a verbatim `@` prefix, as bound into route values.
pub fn route_key(name: &str) -> &str {
    name.strip_prefix('@').unwrap_or(name)
}

/// `name` as written in code: keywords get the verbatim `@` prefix.
pub fn verbatim_identifier(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("@{}", name)
    } else {
        name.to_string()
    }
}

/// C# string literal.
pub fn string_literal(value: &str) -> String {
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

/// Drop the backtick arity from every segment of a metadata name.
pub fn strip_arity(name: &str) -> String {
    name.split('.')
        .map(|part| part.split('`').next().unwrap_or(part))
        .collect::<Vec<_>>()
        .join(".")
}

/// `global::`-qualified form of a metadata name without type arguments.
pub fn global_name(metadata: &str) -> String {
    format!("global::{}", strip_arity(metadata))
}
