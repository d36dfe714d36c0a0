// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::{error::RegexError, location::Location};

/// Renders the error message followed by the pattern line it refers to
/// and a caret underline, e.g.
///
/// ```text
/// Incomplete group. (line 1, column 1)
/// (?abc)
/// ^^
/// ```
pub fn print_error(source: &str, error: &RegexError) -> String {
    match error {
        RegexError::MessageWithLocation(_, location) => {
            format!("{}\n{}", error, underline_location(source, location))
        }
        _ => error.to_string(),
    }
}

fn underline_location(source: &str, location: &Location) -> String {
    let line_text = source.lines().nth(location.line).unwrap_or("");

    // a position (length 0) is marked with a single caret
    let mark_length = location.length.max(1);
    let indent = " ".repeat(location.column);
    let marks = "^".repeat(mark_length);

    format!("{}\n{}{}", line_text, indent, marks)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{error::RegexError, location::Location};

    use super::print_error;

    #[test]
    fn test_print_error_with_location() {
        let error = RegexError::MessageWithLocation(
            "Incomplete group.".to_owned(),
            Location::new_range(2, 0, 2, 2),
        );

        assert_eq!(
            print_error("ab(?x)", &error),
            "Incomplete group. (line 1, column 3)\nab(?x)\n  ^^"
        );
    }

    #[test]
    fn test_print_error_position() {
        let error = RegexError::MessageWithLocation(
            "Expect an identifier".to_owned(),
            Location::new_position(3, 0, 3),
        );

        assert_eq!(
            print_error("(?<>a)", &error),
            "Expect an identifier (line 1, column 4)\n(?<>a)\n   ^"
        );
    }

    #[test]
    fn test_print_error_without_location() {
        let error = RegexError::SyntaxIncorrect("Unknown group name \"x\".".to_owned());
        assert_eq!(print_error("(?P=x)", &error), "Unknown group name \"x\".");
    }
}
