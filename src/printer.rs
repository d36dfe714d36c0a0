// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

// Prints the AST in a function-call notation, e.g. the pattern
// `(?P<tag>[a-z]+)` is printed as `name(one_or_more(['a'..'z']), tag)`.

use std::fmt::Display;

use crate::ast::{
    AnchorAssertionName, BackReference, BoundaryAssertionName, Capture, CharRange, CharSet,
    CharSetElement, Expression, Literal, LookAround, LookAroundDirection, PresetCharSetName,
    Program, Quantified, Quantifier, SpecialCharName,
};

impl Display for BackReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackReference::Index(index) => write!(f, "^{}", index),
            BackReference::Name(name) => f.write_str(name),
        }
    }
}

impl Display for AnchorAssertionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnchorAssertionName::Start => f.write_str("start"),
            AnchorAssertionName::End => f.write_str("end"),
        }
    }
}

impl Display for BoundaryAssertionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryAssertionName::IsBound => f.write_str("is_bound"),
            BoundaryAssertionName::IsNotBound => f.write_str("is_not_bound"),
        }
    }
}

impl Display for PresetCharSetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name_str = match self {
            PresetCharSetName::CharWord => "char_word",
            PresetCharSetName::CharNotWord => "char_not_word",
            PresetCharSetName::CharDigit => "char_digit",
            PresetCharSetName::CharNotDigit => "char_not_digit",
            PresetCharSetName::CharSpace => "char_space",
            PresetCharSetName::CharNotSpace => "char_not_space",
        };
        f.write_str(name_str)
    }
}

impl Display for SpecialCharName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecialCharName::CharAny => f.write_str("char_any"),
        }
    }
}

impl Display for CharRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}'..'{}'", self.start, self.end_included)
    }
}

impl Display for CharSetElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CharSetElement::Char(c) => write!(f, "'{}'", c),
            CharSetElement::CharRange(r) => write!(f, "{}", r),
            CharSetElement::PresetCharSet(p) => write!(f, "{}", p),
        }
    }
}

impl Display for CharSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s: Vec<String> = self.elements.iter().map(|e| e.to_string()).collect();
        if self.negative {
            write!(f, "![{}]", s.join(", "))
        } else {
            write!(f, "[{}]", s.join(", "))
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Char(c) => write!(f, "'{}'", c),
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::CharSet(c) => write!(f, "{}", c),
            Literal::PresetCharSet(p) => write!(f, "{}", p),
            Literal::Special(s) => write!(f, "{}", s),
        }
    }
}

impl Quantifier {
    fn function_name(&self) -> String {
        let base = match (self.min, self.max) {
            (0, Some(1)) => "optional".to_owned(),
            (0, None) => "zero_or_more".to_owned(),
            (1, None) => "one_or_more".to_owned(),
            (m, Some(n)) if m == n => "repeat".to_owned(),
            (_, None) => "at_least".to_owned(),
            (_, Some(_)) => "repeat_range".to_owned(),
        };

        if self.lazy {
            format!("{}_lazy", base)
        } else {
            base
        }
    }
}

impl Display for Quantified {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self.quantifier.function_name();
        match (self.quantifier.min, self.quantifier.max) {
            (0, Some(1)) | (0, None) | (1, None) => write!(f, "{}({})", name, self.expression),
            (m, Some(n)) if m == n => write!(f, "{}({}, {})", name, self.expression, m),
            (m, None) => write!(f, "{}({}, {})", name, self.expression, m),
            (m, Some(n)) => write!(f, "{}({}, {}, {})", name, self.expression, m, n),
        }
    }
}

impl Display for Capture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "name({}, {})", self.expression, name),
            None => write!(f, "index({})", self.expression),
        }
    }
}

impl Display for LookAround {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match (self.direction, self.negative) {
            (LookAroundDirection::Ahead, false) => "is_before",
            (LookAroundDirection::Ahead, true) => "is_not_before",
            (LookAroundDirection::Behind, false) => "is_after",
            (LookAroundDirection::Behind, true) => "is_not_after",
        };
        write!(f, "{}({})", name, self.expression)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Literal(e) => write!(f, "{}", e),
            Expression::BackReference(e) => write!(f, "{}", e),
            Expression::AnchorAssertion(e) => write!(f, "{}", e),
            Expression::BoundaryAssertion(e) => write!(f, "{}", e),
            Expression::Group(expressions) => {
                let items: Vec<String> = expressions.iter().map(|e| e.to_string()).collect();
                write!(f, "({})", items.join(", "))
            }
            Expression::Capture(e) => write!(f, "{}", e),
            Expression::Quantified(e) => write!(f, "{}", e),
            Expression::LookAround(e) => write!(f, "{}", e),
            Expression::Or(left, right) => {
                let left_is_or = matches!(left.as_ref(), Expression::Or(_, _));
                let right_is_or = matches!(right.as_ref(), Expression::Or(_, _));
                match (left_is_or, right_is_or) {
                    (true, true) => write!(f, "({}) || ({})", left, right),
                    (true, false) => write!(f, "({}) || {}", left, right),
                    (false, true) => write!(f, "{} || ({})", left, right),
                    (false, false) => write!(f, "{} || {}", left, right),
                }
            }
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let items: Vec<String> = self.expressions.iter().map(|e| e.to_string()).collect();
        f.write_str(&items.join(", "))
    }
}
