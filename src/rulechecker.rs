// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::ops::{Add, BitOr, Mul};

use crate::ast::{Expression, Literal};

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum MatchLength {
    Variable,
    Fixed(usize), // length by char (unicode char codepoint)
}

impl Add for MatchLength {
    type Output = MatchLength;

    fn add(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (MatchLength::Fixed(v0), MatchLength::Fixed(v1)) => {
                v0.checked_add(v1).map_or(MatchLength::Variable, MatchLength::Fixed)
            }
            _ => MatchLength::Variable,
        }
    }
}

impl Mul<usize> for MatchLength {
    type Output = MatchLength;

    fn mul(self, rhs: usize) -> Self::Output {
        match self {
            MatchLength::Variable => MatchLength::Variable,
            // a length that overflows can not be stepped back over
            MatchLength::Fixed(v) => v
                .checked_mul(rhs)
                .map_or(MatchLength::Variable, MatchLength::Fixed),
        }
    }
}

impl BitOr for MatchLength {
    type Output = MatchLength;

    // both alternatives must have the same length
    fn bitor(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (MatchLength::Fixed(v0), MatchLength::Fixed(v1)) if v0 == v1 => MatchLength::Fixed(v0),
            _ => MatchLength::Variable,
        }
    }
}

/// Number of chars an expression consumes, used to check that
/// the body of a look behind assertion has a fixed length.
pub fn get_match_length(exp: &Expression) -> MatchLength {
    match exp {
        Expression::Literal(literal) => match literal {
            Literal::String(s) => MatchLength::Fixed(s.chars().count()),
            Literal::Char(_)
            | Literal::Special(_)
            | Literal::CharSet(_)
            | Literal::PresetCharSet(_) => MatchLength::Fixed(1),
        },
        Expression::BackReference(_) => MatchLength::Variable,
        Expression::AnchorAssertion(_) => MatchLength::Fixed(0),
        Expression::BoundaryAssertion(_) => MatchLength::Fixed(0),
        Expression::LookAround(_) => MatchLength::Fixed(0),
        Expression::Group(exps) => exps
            .iter()
            .map(get_match_length)
            .fold(MatchLength::Fixed(0), |acc, item| acc + item),
        Expression::Capture(capture) => get_match_length(&capture.expression),
        Expression::Quantified(quantified) => match quantified.quantifier.max {
            Some(max) if max == quantified.quantifier.min => {
                get_match_length(&quantified.expression) * max
            }
            _ => MatchLength::Variable,
        },
        Expression::Or(left, right) => get_match_length(left) | get_match_length(right),
    }
}
