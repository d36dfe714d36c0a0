// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::{
    ast::{
        AnchorAssertionName, BackReference, BoundaryAssertionName, Capture, CharSet,
        CharSetElement, Expression, Literal, LookAround, LookAroundDirection, Program, Quantified,
        SpecialCharName,
    },
    error::RegexError,
    route::{
        AssertionName, CaptureGroup, CharSetItem, CharSetMatcher, LookAroundNode, Node,
        RepetitionNode, Route,
    },
    rulechecker::{get_match_length, MatchLength},
    traditional::parse_from_str,
};

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct CompileOptions {
    // `^` and `$` match at the beginning and end of each line
    pub multi_line: bool,
}

/// Compile from traditional regular expression.
pub fn compile_from_str(s: &str) -> Result<Route, RegexError> {
    compile_from_str_with_options(s, &CompileOptions::default())
}

pub fn compile_from_str_with_options(
    s: &str,
    options: &CompileOptions,
) -> Result<Route, RegexError> {
    let program = parse_from_str(s)?;
    compile(&program, options)
}

/// Compile from AST `Program`.
pub fn compile(program: &Program, options: &CompileOptions) -> Result<Route, RegexError> {
    let mut compiler = Compiler::new(*options);
    compiler.emit_program(program)
}

struct Compiler {
    options: CompileOptions,
    capture_groups: Vec<CaptureGroup>,

    // whether the capture group at the same index has been closed,
    // a back-reference can only refer to a closed group.
    closed_groups: Vec<bool>,
}

impl Compiler {
    fn new(options: CompileOptions) -> Self {
        Self {
            options,
            capture_groups: vec![],
            closed_groups: vec![],
        }
    }

    fn emit_program(&mut self, program: &Program) -> Result<Route, RegexError> {
        // the first (index 0) capture group represents the whole match
        self.capture_groups.push(CaptureGroup { name: None });
        self.closed_groups.push(false);

        // in multi-line mode `^` also matches after each line feed
        let fixed_start = !self.options.multi_line
            && matches!(
                program.expressions.first(),
                Some(Expression::AnchorAssertion(AnchorAssertionName::Start))
            );

        let node = self.emit_group(&program.expressions)?;
        self.closed_groups[0] = true;

        let capture_groups = std::mem::take(&mut self.capture_groups);
        Ok(Route::new(node, capture_groups, fixed_start))
    }

    fn emit_expression(&mut self, expression: &Expression) -> Result<Node, RegexError> {
        let node = match expression {
            Expression::Literal(literal) => emit_literal(literal),
            Expression::BackReference(back_reference) => {
                self.emit_backreference(back_reference)?
            }
            Expression::AnchorAssertion(name) => {
                let assertion_name = match (name, self.options.multi_line) {
                    (AnchorAssertionName::Start, false) => AssertionName::Start,
                    (AnchorAssertionName::End, false) => AssertionName::End,
                    (AnchorAssertionName::Start, true) => AssertionName::LineStart,
                    (AnchorAssertionName::End, true) => AssertionName::LineEnd,
                };
                Node::Assertion(assertion_name)
            }
            Expression::BoundaryAssertion(name) => {
                let assertion_name = match name {
                    BoundaryAssertionName::IsBound => AssertionName::IsBound,
                    BoundaryAssertionName::IsNotBound => AssertionName::IsNotBound,
                };
                Node::Assertion(assertion_name)
            }
            Expression::Group(expressions) => self.emit_group(expressions)?,
            Expression::Capture(capture) => self.emit_capture_group(capture)?,
            Expression::Quantified(quantified) => self.emit_quantified(quantified)?,
            Expression::LookAround(look_around) => self.emit_look_around(look_around)?,
            Expression::Or(left, right) => {
                let left_node = self.emit_expression(left)?;
                let right_node = self.emit_expression(right)?;
                Node::Alternation(Box::new(left_node), Box::new(right_node))
            }
        };

        Ok(node)
    }

    fn emit_group(&mut self, expressions: &[Expression]) -> Result<Node, RegexError> {
        let mut nodes = expressions
            .iter()
            .map(|expression| self.emit_expression(expression))
            .collect::<Result<Vec<Node>, RegexError>>()?;

        let node = match nodes.len() {
            0 => Node::Empty,
            1 => nodes.remove(0),
            _ => Node::Sequence(nodes),
        };

        Ok(node)
    }

    fn emit_capture_group(&mut self, capture: &Capture) -> Result<Node, RegexError> {
        if let Some(name) = &capture.name {
            if self.get_capture_group_index_by_name(name).is_some() {
                return Err(RegexError::SyntaxIncorrect(format!(
                    "Duplicate group name: \"{}\".",
                    name
                )));
            }
        }

        // groups are numbered by the order of their opening parentheses
        let capture_group_index = self.capture_groups.len();
        self.capture_groups.push(CaptureGroup {
            name: capture.name.clone(),
        });
        self.closed_groups.push(false);

        let node = self.emit_expression(&capture.expression)?;
        self.closed_groups[capture_group_index] = true;

        Ok(Node::Capture(capture_group_index, Box::new(node)))
    }

    fn emit_backreference(&self, back_reference: &BackReference) -> Result<Node, RegexError> {
        let capture_group_index = match back_reference {
            BackReference::Index(index) => *index,
            BackReference::Name(name) => match self.get_capture_group_index_by_name(name) {
                Some(index) => index,
                None => {
                    return Err(RegexError::SyntaxIncorrect(format!(
                        "Cannot find the group with name: \"{}\".",
                        name
                    )));
                }
            },
        };

        if capture_group_index >= self.capture_groups.len() {
            return Err(RegexError::SyntaxIncorrect(format!(
                "The group index ({}) of back-reference is out of range, the max index should be: {}.",
                capture_group_index,
                self.capture_groups.len() - 1
            )));
        }

        if !self.closed_groups[capture_group_index] {
            return Err(RegexError::SyntaxIncorrect(format!(
                "Cannot refer to the open group {} with a back-reference.",
                back_reference
            )));
        }

        Ok(Node::BackReference(capture_group_index))
    }

    fn emit_quantified(&mut self, quantified: &Quantified) -> Result<Node, RegexError> {
        let node = self.emit_expression(&quantified.expression)?;
        let quantifier = &quantified.quantifier;

        Ok(Node::Repetition(Box::new(RepetitionNode {
            node,
            min: quantifier.min,
            max: quantifier.max,
            lazy: quantifier.lazy,
        })))
    }

    fn emit_look_around(&mut self, look_around: &LookAround) -> Result<Node, RegexError> {
        let node = self.emit_expression(&look_around.expression)?;

        let node = match look_around.direction {
            LookAroundDirection::Ahead => Node::LookAhead(Box::new(LookAroundNode {
                node,
                negative: look_around.negative,
                match_length_in_char: 0,
            })),
            LookAroundDirection::Behind => {
                let match_length_in_char = match get_match_length(&look_around.expression) {
                    MatchLength::Fixed(length) => length,
                    MatchLength::Variable => {
                        return Err(RegexError::SyntaxIncorrect(
                            "Look behind assertion requires a fixed length pattern.".to_owned(),
                        ));
                    }
                };

                Node::LookBehind(Box::new(LookAroundNode {
                    node,
                    negative: look_around.negative,
                    match_length_in_char,
                }))
            }
        };

        Ok(node)
    }

    fn get_capture_group_index_by_name(&self, name: &str) -> Option<usize> {
        self.capture_groups
            .iter()
            .position(|group| group.name.as_deref() == Some(name))
    }
}

fn emit_literal(literal: &Literal) -> Node {
    match literal {
        Literal::Char(c) => Node::Char(*c),
        Literal::String(s) => Node::String(s.to_owned()),
        Literal::Special(SpecialCharName::CharAny) => Node::AnyChar,
        Literal::CharSet(charset) => Node::CharSet(emit_charset(charset)),
        Literal::PresetCharSet(name) => Node::CharSet(CharSetMatcher::new_preset(*name)),
    }
}

fn emit_charset(charset: &CharSet) -> CharSetMatcher {
    let items = charset
        .elements
        .iter()
        .map(|element| match element {
            CharSetElement::Char(c) => CharSetItem::Char(*c),
            CharSetElement::CharRange(range) => CharSetItem::Range(range.start, range.end_included),
            CharSetElement::PresetCharSet(name) => CharSetItem::Preset(*name),
        })
        .collect();

    CharSetMatcher::new(items, charset.negative)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_str_eq;

    use crate::error::RegexError;

    use super::{compile_from_str, compile_from_str_with_options, CompileOptions};

    #[test]
    fn test_compile_tag_pattern() {
        let route = compile_from_str(r#"<(?P<tag>[a-z]+)\b[^>]*>(.*?)</(?P=tag)>"#).unwrap();

        assert_str_eq!(
            route.get_debug_text(),
            "\
('<', capture {1} (repeat 1..MAX greedy (['a'..'z'])), is_bound, \
repeat 0..MAX greedy (!['>']), '>', capture {2} (repeat 0..MAX lazy (any)), \
\"</\", ref {1}, '>')
# groups: [0, 1:tag, 2], fixed start: false"
        );
    }

    #[test]
    fn test_compile_password_pattern() {
        let route = compile_from_str(r#"^(?=.*?[A-Z])(?=.*?[0-9]).{8,}$"#).unwrap();

        assert_str_eq!(
            route.get_debug_text(),
            "\
(start, look ahead ((repeat 0..MAX lazy (any), ['A'..'Z'])), \
look ahead ((repeat 0..MAX lazy (any), ['0'..'9'])), repeat 8..MAX greedy (any), end)
# groups: [0], fixed start: true"
        );
    }

    #[test]
    fn test_compile_look_behind() {
        let route = compile_from_str(r#"(?<=ab|cd)x(?<!\d)"#).unwrap();

        assert_str_eq!(
            route.get_debug_text(),
            "\
(look behind 2 ((\"ab\" | \"cd\")), 'x', look behind negative 1 ([char_digit]))
# groups: [0], fixed start: false"
        );

        // err: variable length
        assert!(matches!(
            compile_from_str(r#"(?<=a+)b"#),
            Err(RegexError::SyntaxIncorrect(_))
        ));

        // err: the length overflows
        assert!(matches!(
            compile_from_str(&format!("(?<=(?:a{{{}}}){{2}})b", usize::MAX)),
            Err(RegexError::SyntaxIncorrect(_))
        ));
    }

    #[test]
    fn test_compile_multi_line() {
        let options = CompileOptions { multi_line: true };
        let route = compile_from_str_with_options(r#"^\w+$"#, &options).unwrap();

        assert_str_eq!(
            route.get_debug_text(),
            "\
(line_start, repeat 1..MAX greedy ([char_word]), line_end)
# groups: [0], fixed start: false"
        );
    }

    #[test]
    fn test_compile_backreference_rules() {
        assert!(compile_from_str(r#"(a)(?<x>b)\1\2\k<x>"#).is_ok());

        // err: undefined index
        assert!(matches!(
            compile_from_str(r#"(a)\2"#),
            Err(RegexError::SyntaxIncorrect(_))
        ));

        // err: undefined name
        assert!(matches!(
            compile_from_str(r#"(?P<a>x)(?P=b)"#),
            Err(RegexError::SyntaxIncorrect(_))
        ));

        // err: refer to an open group
        assert!(matches!(
            compile_from_str(r#"(a\1)"#),
            Err(RegexError::SyntaxIncorrect(_))
        ));

        // err: duplicate name
        assert!(matches!(
            compile_from_str(r#"(?<a>x)(?P<a>y)"#),
            Err(RegexError::SyntaxIncorrect(_))
        ));
    }
}
