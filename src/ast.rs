// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

#[derive(Debug, PartialEq)]
pub struct Program {
    pub expressions: Vec<Expression>,
}

#[derive(Debug, PartialEq)]
pub enum Expression {
    Literal(Literal),
    BackReference(BackReference),
    AnchorAssertion(AnchorAssertionName),
    BoundaryAssertion(BoundaryAssertionName),

    /**
     * A series of patterns matched one after another.
     * It is produced by non-capturing groups `(?:...)` and by the
     * implied group of consecutive expressions, e.g. `ab\w+`.
     */
    Group(Vec<Expression>),

    Capture(Box<Capture>),
    Quantified(Box<Quantified>),
    LookAround(Box<LookAround>),

    /**
     * Disjunction, the left side is tried first.
     * https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Regular_expressions/Disjunction
     */
    Or(Box<Expression>, Box<Expression>),
}

/// A capturing group. Its index is assigned by the compiler in the order of
/// the opening parentheses.
#[derive(Debug, PartialEq)]
pub struct Capture {
    pub name: Option<String>,
    pub expression: Expression,
}

#[derive(Debug, PartialEq)]
pub struct Quantified {
    pub expression: Expression,
    pub quantifier: Quantifier,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Quantifier {
    pub min: usize,
    pub max: Option<usize>, // `None` for unbounded
    pub lazy: bool,
}

impl Quantifier {
    pub fn new(min: usize, max: Option<usize>, lazy: bool) -> Self {
        Self { min, max, lazy }
    }
}

/// Zero-width assertion on the text ahead of or behind the current position.
#[derive(Debug, PartialEq)]
pub struct LookAround {
    pub direction: LookAroundDirection,
    pub negative: bool,
    pub expression: Expression,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum LookAroundDirection {
    Ahead,
    Behind,
}

#[derive(Debug, PartialEq)]
pub enum Literal {
    Char(char),
    String(String),
    Special(SpecialCharName),
    CharSet(CharSet),
    PresetCharSet(PresetCharSetName),
}

#[derive(Debug, PartialEq)]
pub struct CharSet {
    pub negative: bool,
    pub elements: Vec<CharSetElement>,
}

#[derive(Debug, PartialEq)]
pub enum CharSetElement {
    Char(char),
    CharRange(CharRange),
    PresetCharSet(PresetCharSetName), // only positive preset charsets are allowed
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct CharRange {
    pub start: char,
    pub end_included: char,
}

#[derive(Debug, PartialEq)]
pub enum BackReference {
    Index(usize),
    Name(String),
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum AnchorAssertionName {
    Start,
    End,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BoundaryAssertionName {
    IsBound,
    IsNotBound,
}

#[allow(clippy::enum_variant_names)]
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PresetCharSetName {
    CharWord,
    CharNotWord,
    CharDigit,
    CharNotDigit,
    CharSpace,
    CharNotSpace,
}

// 'special char' currently contains only the 'char_any'.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum SpecialCharName {
    CharAny,
}
