// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use thiserror::Error;

use crate::location::Location;

#[derive(Debug, PartialEq, Clone, Error)]
pub enum RegexError {
    /// The pattern is well-formed but violates a rule, e.g. a back-reference
    /// to an undefined group.
    #[error("{0}")]
    SyntaxIncorrect(String),

    #[error("{0} ({1})")]
    MessageWithLocation(String, Location),

    #[error("{0} (unexpected end of pattern)")]
    UnexpectedEndOfDocument(String),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::location::Location;

    use super::RegexError;

    #[test]
    fn test_error_display() {
        assert_eq!(
            RegexError::SyntaxIncorrect("Unknown group name \"x\".".to_owned()).to_string(),
            "Unknown group name \"x\"."
        );

        assert_eq!(
            RegexError::MessageWithLocation(
                "Incomplete group.".to_owned(),
                Location::new_range(3, 0, 3, 2)
            )
            .to_string(),
            "Incomplete group. (line 1, column 4)"
        );

        assert_eq!(
            RegexError::UnexpectedEndOfDocument("Incomplete charset.".to_owned()).to_string(),
            "Incomplete charset. (unexpected end of pattern)"
        );
    }
}
