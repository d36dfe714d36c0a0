// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! Prints the outcome of matching a pattern against a list of candidate
//! strings, one line per candidate.

use std::{
    fmt::Display,
    io::{self, Write},
};

use crate::process::Regex;

/// Matches an opening html tag, e.g. `<a>`, and the content until the
/// same tag is closed, e.g. `</a>`.
pub const TAG_PATTERN: &str = r#"<(?P<tag>[a-z]+)\b[^>]*>(.*?)</(?P=tag)>"#;

pub const TAG_CANDIDATES: [&str; 5] = [
    "<a>hello</a>",
    "<p>hello</p>",
    "<p>hello</a>",
    "<foo>hello</f>",
    "<div><div>hello</div></div>",
];

/// A password with at least one upper case letter, one lower case letter,
/// one digit, one symbol and 8 chars in total.
pub const PASSWORD_PATTERN: &str =
    r#"^(?=.*?[A-Z])(?=.*?[a-z])(?=.*?[0-9])(?=.*?[#?!@$%^&*-]).{8,}$"#;

pub const PASSWORD_CANDIDATES: [&str; 4] = ["password123", "Passord", "P4$$wrd", "P4$$word"];

#[derive(Debug, PartialEq, Clone)]
pub enum MatchResult<'a> {
    NoMatch,
    Matched {
        full: &'a str,
        groups: Vec<Option<&'a str>>,
        named: Vec<(&'a str, Option<&'a str>)>,
    },
}

/// Matches the candidate from its first char.
pub fn evaluate<'a>(regex: &'a Regex, candidate: &'a str) -> MatchResult<'a> {
    let Some(captures) = regex.captures_anchored(candidate) else {
        return MatchResult::NoMatch;
    };

    let full = captures.get(0).map_or("", |m| m.as_str());

    MatchResult::Matched {
        full,
        groups: captures.groups(),
        named: captures.named_groups(),
    }
}

pub fn format_line(regex: &Regex, candidate: &str, result: &MatchResult) -> String {
    format!(
        "Regex: '{}' matching against haystack: '{}', returned the match: {}",
        regex.as_str(),
        candidate,
        result
    )
}

pub fn write_demo<W: Write>(writer: &mut W, regex: &Regex, candidates: &[&str]) -> io::Result<()> {
    for candidate in candidates {
        let result = evaluate(regex, candidate);
        tracing::debug!(candidate, ?result, "evaluated");
        writeln!(writer, "{}", format_line(regex, candidate, &result))?;
    }

    // separator
    writeln!(writer)
}

/// Writes the demo to stdout.
pub fn run_demo(regex: &Regex, candidates: &[&str]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_demo(&mut handle, regex, candidates)?;
    handle.flush()
}

impl Display for MatchResult<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchResult::NoMatch => f.write_str("None"),
            MatchResult::Matched {
                full,
                groups,
                named,
            } => {
                let group_items: Vec<String> = groups.iter().map(|g| format_optional(*g)).collect();
                let groups_text = match group_items.len() {
                    1 => format!("({},)", group_items[0]),
                    _ => format!("({})", group_items.join(", ")),
                };

                let named_items: Vec<String> = named
                    .iter()
                    .map(|(name, value)| format!("{}: {}", quote(name), format_optional(*value)))
                    .collect();

                write!(
                    f,
                    "({}, {}, {{{}}})",
                    quote(full),
                    groups_text,
                    named_items.join(", ")
                )
            }
        }
    }
}

fn format_optional(value: Option<&str>) -> String {
    match value {
        Some(s) => quote(s),
        None => "None".to_owned(),
    }
}

// string literal in the style of the Python `repr()`
fn quote(s: &str) -> String {
    let quote_char = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut text = String::with_capacity(s.len() + 2);
    text.push(quote_char);
    for c in s.chars() {
        match c {
            '\\' => text.push_str("\\\\"),
            '\n' => text.push_str("\\n"),
            '\r' => text.push_str("\\r"),
            '\t' => text.push_str("\\t"),
            _ if c == quote_char => {
                text.push('\\');
                text.push(c);
            }
            _ if c.is_ascii_control() => text.push_str(&format!("\\x{:02x}", c as u32)),
            _ => text.push(c),
        }
    }
    text.push(quote_char);
    text
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::process::Regex;

    use super::{
        evaluate, quote, write_demo, MatchResult, PASSWORD_CANDIDATES, PASSWORD_PATTERN,
        TAG_CANDIDATES, TAG_PATTERN,
    };

    fn render(pattern: &str, candidates: &[&str]) -> String {
        let regex = Regex::new(pattern).unwrap();
        let mut buffer: Vec<u8> = vec![];
        write_demo(&mut buffer, &regex, candidates).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_evaluate() {
        let regex = Regex::new(TAG_PATTERN).unwrap();

        assert_eq!(
            evaluate(&regex, "<a>hello</a>"),
            MatchResult::Matched {
                full: "<a>hello</a>",
                groups: vec![Some("a"), Some("hello")],
                named: vec![("tag", Some("a"))],
            }
        );

        assert_eq!(evaluate(&regex, "<p>hello</a>"), MatchResult::NoMatch);
    }

    #[test]
    fn test_tag_demo_output() {
        assert_eq!(
            render(TAG_PATTERN, &TAG_CANDIDATES),
            "\
Regex: '<(?P<tag>[a-z]+)\\b[^>]*>(.*?)</(?P=tag)>' matching against haystack: '<a>hello</a>', returned the match: ('<a>hello</a>', ('a', 'hello'), {'tag': 'a'})
Regex: '<(?P<tag>[a-z]+)\\b[^>]*>(.*?)</(?P=tag)>' matching against haystack: '<p>hello</p>', returned the match: ('<p>hello</p>', ('p', 'hello'), {'tag': 'p'})
Regex: '<(?P<tag>[a-z]+)\\b[^>]*>(.*?)</(?P=tag)>' matching against haystack: '<p>hello</a>', returned the match: None
Regex: '<(?P<tag>[a-z]+)\\b[^>]*>(.*?)</(?P=tag)>' matching against haystack: '<foo>hello</f>', returned the match: None
Regex: '<(?P<tag>[a-z]+)\\b[^>]*>(.*?)</(?P=tag)>' matching against haystack: '<div><div>hello</div></div>', returned the match: ('<div><div>hello</div>', ('div', '<div>hello'), {'tag': 'div'})

"
        );
    }

    #[test]
    fn test_password_demo_output() {
        assert_eq!(
            render(PASSWORD_PATTERN, &PASSWORD_CANDIDATES),
            "\
Regex: '^(?=.*?[A-Z])(?=.*?[a-z])(?=.*?[0-9])(?=.*?[#?!@$%^&*-]).{8,}$' matching against haystack: 'password123', returned the match: None
Regex: '^(?=.*?[A-Z])(?=.*?[a-z])(?=.*?[0-9])(?=.*?[#?!@$%^&*-]).{8,}$' matching against haystack: 'Passord', returned the match: None
Regex: '^(?=.*?[A-Z])(?=.*?[a-z])(?=.*?[0-9])(?=.*?[#?!@$%^&*-]).{8,}$' matching against haystack: 'P4$$wrd', returned the match: None
Regex: '^(?=.*?[A-Z])(?=.*?[a-z])(?=.*?[0-9])(?=.*?[#?!@$%^&*-]).{8,}$' matching against haystack: 'P4$$word', returned the match: ('P4$$word', (), {})

"
        );
    }

    #[test]
    fn test_demo_output_is_repeatable() {
        let first = render(TAG_PATTERN, &TAG_CANDIDATES);
        let second = render(TAG_PATTERN, &TAG_CANDIDATES);
        assert_eq!(first, second);
    }

    #[test]
    fn test_match_result_display() {
        let one_group = MatchResult::Matched {
            full: "ab",
            groups: vec![Some("a")],
            named: vec![],
        };
        assert_eq!(one_group.to_string(), "('ab', ('a',), {})");

        let unmatched_group = MatchResult::Matched {
            full: "b",
            groups: vec![None, Some("b")],
            named: vec![("x", None), ("y", Some("b"))],
        };
        assert_eq!(
            unmatched_group.to_string(),
            "('b', (None, 'b'), {'x': None, 'y': 'b'})"
        );
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("abc"), "'abc'");
        assert_eq!(quote("it's"), "\"it's\"");
        assert_eq!(quote("'\""), "'\\'\"'");
        assert_eq!(quote("a\\b\n\t"), "'a\\\\b\\n\\t'");
        assert_eq!(quote("文"), "'文'");
    }
}
