// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::vec::IntoIter;

use crate::{
    ast::{
        AnchorAssertionName, BackReference, BoundaryAssertionName, Capture, CharRange, CharSet,
        CharSetElement, Expression, Literal, LookAround, LookAroundDirection, PresetCharSetName,
        Program, Quantified, Quantifier, SpecialCharName,
    },
    error::RegexError,
    location::Location,
    peekableiter::PeekableIter,
};

use super::{
    lexer::lex_from_str,
    token::{Repetition, Token, TokenWithRange},
};

pub const PARSER_PEEK_TOKEN_MAX_COUNT: usize = 1;

pub fn parse_from_str(s: &str) -> Result<Program, RegexError> {
    let tokens = lex_from_str(s)?;
    let upstream = PeekableIter::new(tokens.into_iter(), PARSER_PEEK_TOKEN_MAX_COUNT);
    let mut parser = Parser::new(upstream);
    parser.parse_program()
}

struct Parser {
    upstream: PeekableIter<IntoIter<TokenWithRange>>,
    last_range: Location,
}

impl Parser {
    fn new(upstream: PeekableIter<IntoIter<TokenWithRange>>) -> Self {
        Self {
            upstream,
            last_range: Location::new_range(0, 0, 0, 0),
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        match self.upstream.next() {
            Some(TokenWithRange { token, range }) => {
                self.last_range = range;
                Some(token)
            }
            None => None,
        }
    }

    fn peek_token(&mut self, offset: usize) -> Option<Token> {
        self.upstream.peek(offset).map(|twr| twr.token.clone())
    }

    fn peek_range(&mut self, offset: usize) -> Option<Location> {
        self.upstream.peek(offset).map(|twr| twr.range)
    }

    fn consume_token(
        &mut self,
        expected_token: &Token,
        token_description: &str,
    ) -> Result<(), RegexError> {
        match self.next_token() {
            Some(token) if &token == expected_token => Ok(()),
            Some(_) => Err(RegexError::MessageWithLocation(
                format!("Expect token: {}.", token_description),
                self.last_range.get_position_by_range_start(),
            )),
            None => Err(RegexError::UnexpectedEndOfDocument(format!(
                "Expect token: {}.",
                token_description
            ))),
        }
    }
}

impl Parser {
    fn parse_program(&mut self) -> Result<Program, RegexError> {
        if self.peek_token(0).is_none() {
            // an empty pattern matches the empty string
            return Ok(Program {
                expressions: vec![],
            });
        }

        let expression = self.parse_expression()?;

        // a ')' without the matching '('
        if self.peek_token(0).is_some() {
            let range = self.peek_range(0).unwrap_or(self.last_range);
            return Err(RegexError::MessageWithLocation(
                "Unbalanced parenthesis.".to_owned(),
                range,
            ));
        }

        // the top level implied group is unwrapped into the program
        let expressions = match expression {
            Expression::Group(expressions) => expressions,
            _ => vec![expression],
        };

        Ok(Program { expressions })
    }

    fn parse_expression(&mut self) -> Result<Expression, RegexError> {
        // the parsing order:
        //
        //    > precedence low <
        // 1. logic or
        // 2. consecutive expressions (implied group)
        // 3. notations (quantifiers)
        // 4. primary expressions (group, assertion, back reference, literal)
        //    > precedence high <

        self.parse_logic_or()
    }

    fn parse_logic_or(&mut self) -> Result<Expression, RegexError> {
        // token ... [ "|" expression ]
        //
        // "|" has the lowest precedence, e.g.
        // "ab|cd" == "(ab)|(cd)"
        //
        // it is parsed right-associative:
        // a | b | c -> a | (b | c)
        // which keeps the left-to-right trying order of the matcher.

        let left = self.parse_consecutive_expression()?;

        if let Some(Token::LogicOr) = self.peek_token(0) {
            self.next_token(); // consume "|"
            let right = self.parse_logic_or()?;
            return Ok(Expression::Or(Box::new(left), Box::new(right)));
        }

        Ok(left)
    }

    fn parse_consecutive_expression(&mut self) -> Result<Expression, RegexError> {
        let mut expressions = vec![];
        while let Some(token) = self.peek_token(0) {
            match token {
                // terminator
                Token::GroupEnd | Token::LogicOr => {
                    break;
                }
                _ => {
                    let expression = self.parse_notations()?;
                    expressions.push(expression);
                }
            }
        }

        // a blank alternative or group, e.g. `a|` and `()`, matches
        // the empty string.
        if expressions.is_empty() {
            return Ok(Expression::Group(vec![]));
        }

        let mut expressions = merge_continuous_chars(expressions);

        // escape the group if it contains only one element
        if expressions.len() == 1 {
            Ok(expressions.remove(0))
        } else {
            Ok(Expression::Group(expressions))
        }
    }

    fn parse_notations(&mut self) -> Result<Expression, RegexError> {
        // primary_expression {quantifier}

        let mut expression = self.parse_primary_expression()?;

        while let Some(token) = self.peek_token(0) {
            let quantifier = match token {
                // greedy quantifier
                Token::Optional => Quantifier::new(0, Some(1), false),
                Token::OneOrMore => Quantifier::new(1, None, false),
                Token::ZeroOrMore => Quantifier::new(0, None, false),

                // lazy quantifier
                Token::OptionalLazy => Quantifier::new(0, Some(1), true),
                Token::OneOrMoreLazy => Quantifier::new(1, None, true),
                Token::ZeroOrMoreLazy => Quantifier::new(0, None, true),

                Token::Repetition(repetition, lazy) => {
                    self.next_token(); // consume repetition, to update the `last_range`
                    let quantifier = self.convert_repetition(&repetition, lazy)?;
                    expression = Expression::Quantified(Box::new(Quantified {
                        expression,
                        quantifier,
                    }));
                    continue;
                }
                _ => {
                    break;
                }
            };

            self.next_token(); // consume notation

            expression = Expression::Quantified(Box::new(Quantified {
                expression,
                quantifier,
            }));
        }

        Ok(expression)
    }

    fn convert_repetition(
        &self,
        repetition: &Repetition,
        lazy: bool,
    ) -> Result<Quantifier, RegexError> {
        match repetition {
            Repetition::Specified(n) => {
                if lazy {
                    return Err(RegexError::MessageWithLocation(
                        "Specified number of repetitions does not support lazy mode, i.e. '{m}?' is not allowed.".to_owned(),
                        self.last_range,
                    ));
                }
                Ok(Quantifier::new(*n, Some(*n), false))
            }
            Repetition::AtLeast(n) => Ok(Quantifier::new(*n, None, lazy)),
            Repetition::Range(m, n) => {
                if m > n {
                    return Err(RegexError::MessageWithLocation(
                        format!("Repetition range {{{},{}}} is out of order.", m, n),
                        self.last_range,
                    ));
                }

                if lazy && m == n {
                    return Err(RegexError::MessageWithLocation(
                        "Specified number of repetitions does not support lazy mode, i.e. '{m,m}?' is not allowed.".to_owned(),
                        self.last_range,
                    ));
                }

                Ok(Quantifier::new(*m, Some(*n), lazy))
            }
        }
    }

    fn parse_primary_expression(&mut self) -> Result<Expression, RegexError> {
        // primary expressions:
        // - literal
        // - anchor assertion
        // - boundary assertion
        // - look around assertion
        // - group
        // - back reference

        let token = match self.peek_token(0) {
            Some(token) => token,
            None => {
                return Err(RegexError::UnexpectedEndOfDocument(
                    "Expect an expression.".to_owned(),
                ))
            }
        };

        let expression = match token {
            Token::StartAssertion => {
                self.next_token(); // consume '^'
                Expression::AnchorAssertion(AnchorAssertionName::Start)
            }
            Token::EndAssertion => {
                self.next_token(); // consume '$'
                Expression::AnchorAssertion(AnchorAssertionName::End)
            }
            Token::BoundaryAssertion(c) => {
                self.next_token(); // consume boundary assertion
                if c == 'B' {
                    Expression::BoundaryAssertion(BoundaryAssertionName::IsNotBound)
                } else {
                    Expression::BoundaryAssertion(BoundaryAssertionName::IsBound)
                }
            }
            Token::LookAhead
            | Token::LookAheadNegative
            | Token::LookBehind
            | Token::LookBehindNegative => self.parse_look_around()?,
            Token::GroupStart | Token::NonCapturing | Token::NamedCapture(_) => {
                self.parse_group()?
            }
            Token::BackReferenceNumber(index) => {
                self.next_token(); // consume '\num'
                Expression::BackReference(BackReference::Index(index))
            }
            Token::BackReferenceIdentifier(name) => {
                self.next_token(); // consume '\k<name>' or '(?P=name)'
                Expression::BackReference(BackReference::Name(name))
            }
            _ => {
                let literal = self.parse_literal()?;
                Expression::Literal(literal)
            }
        };

        Ok(expression)
    }

    fn parse_look_around(&mut self) -> Result<Expression, RegexError> {
        // "(?=" expression ")" ?
        // ----                 -
        // ^                    ^-- to here
        // | current, validated
        //
        // also "(?!", "(?<=" and "(?<!"

        let (direction, negative) = match self.next_token() {
            Some(Token::LookAhead) => (LookAroundDirection::Ahead, false),
            Some(Token::LookAheadNegative) => (LookAroundDirection::Ahead, true),
            Some(Token::LookBehind) => (LookAroundDirection::Behind, false),
            Some(Token::LookBehindNegative) => (LookAroundDirection::Behind, true),
            _ => unreachable!(),
        };

        let expression = self.parse_expression()?;
        self.consume_token(&Token::GroupEnd, "right parenthese \")\"")?;

        Ok(Expression::LookAround(Box::new(LookAround {
            direction,
            negative,
            expression,
        })))
    }

    fn parse_group(&mut self) -> Result<Expression, RegexError> {
        // "(" {expression} ")" ?
        // ---                  -
        // ^                    ^-- to here
        // | current, validated
        //
        // also:
        // - "(?:" {expression} ")"
        // - "(?<...>" {expression} ")"

        let head_token = self.next_token();
        let expression = self.parse_expression()?;

        self.consume_token(&Token::GroupEnd, "right parenthese \")\"")?;

        let group_expression = match head_token {
            Some(Token::GroupStart) => Expression::Capture(Box::new(Capture {
                name: None,
                expression,
            })),
            Some(Token::NamedCapture(name)) => Expression::Capture(Box::new(Capture {
                name: Some(name),
                expression,
            })),
            Some(Token::NonCapturing) => match expression {
                // keep the boundary of a non-capturing group so that
                // the merging of chars does not cross it, e.g. `a(?:bc)*`
                Expression::Group(_) => expression,
                _ => Expression::Group(vec![expression]),
            },
            _ => unreachable!(),
        };

        Ok(group_expression)
    }

    fn parse_literal(&mut self) -> Result<Literal, RegexError> {
        // literals:
        // - char
        // - charset
        // - preset charset
        // - any char

        let literal = match self.peek_token(0) {
            Some(Token::Char(c)) => {
                self.next_token(); // consume char
                Literal::Char(c)
            }
            Some(Token::CharSetStart | Token::CharSetStartNegative) => {
                let charset = self.parse_charset()?;
                Literal::CharSet(charset)
            }
            Some(Token::PresetCharSet(c)) => {
                self.next_token(); // consume preset charset
                Literal::PresetCharSet(preset_charset_name_from_char(c))
            }
            Some(Token::Dot) => {
                self.next_token(); // consume '.'
                Literal::Special(SpecialCharName::CharAny)
            }
            _ => {
                let range = self.peek_range(0).unwrap_or(self.last_range);
                return Err(RegexError::MessageWithLocation(
                    "Expect a literal.".to_owned(),
                    range,
                ));
            }
        };

        Ok(literal)
    }

    fn parse_charset(&mut self) -> Result<CharSet, RegexError> {
        // "[" {char | char_range | preset_charset} "]" ?
        // ---                                          -
        // ^                                            ^__ to here
        // | current, validated
        //
        // also: "[^" ...

        let head_token = self.next_token(); // consume '[' or '[^'

        let mut elements = vec![];
        while let Some(token) = self.peek_token(0) {
            let element = match token {
                Token::CharSetEnd => break,
                Token::Char(c) => CharSetElement::Char(c),
                Token::CharRange(start, end_included) => CharSetElement::CharRange(CharRange {
                    start,
                    end_included,
                }),
                Token::PresetCharSet(c) => {
                    CharSetElement::PresetCharSet(preset_charset_name_from_char(c))
                }
                _ => {
                    return Err(RegexError::MessageWithLocation(
                        "Unsupported char set element.".to_owned(),
                        self.last_range,
                    ));
                }
            };

            self.next_token(); // consume element
            elements.push(element);
        }

        self.consume_token(&Token::CharSetEnd, "right bracket \"]\"")?;

        Ok(CharSet {
            negative: matches!(head_token, Some(Token::CharSetStartNegative)),
            elements,
        })
    }
}

fn preset_charset_name_from_char(name_char: char) -> PresetCharSetName {
    match name_char {
        'w' => PresetCharSetName::CharWord,
        'W' => PresetCharSetName::CharNotWord,
        's' => PresetCharSetName::CharSpace,
        'S' => PresetCharSetName::CharNotSpace,
        'd' => PresetCharSetName::CharDigit,
        'D' => PresetCharSetName::CharNotDigit,
        _ => unreachable!(),
    }
}

// merges runs of `Literal::Char` into `Literal::String`, e.g.
// `'<', '/'` becomes `"</"`.
fn merge_continuous_chars(expressions: Vec<Expression>) -> Vec<Expression> {
    let mut merged: Vec<Expression> = Vec::with_capacity(expressions.len());
    let mut pending = String::new();

    for expression in expressions {
        if let Expression::Literal(Literal::Char(c)) = expression {
            pending.push(c);
            continue;
        }

        flush_pending_chars(&mut pending, &mut merged);
        merged.push(expression);
    }

    flush_pending_chars(&mut pending, &mut merged);
    merged
}

fn flush_pending_chars(pending: &mut String, merged: &mut Vec<Expression>) {
    let mut chars = pending.chars();
    match (chars.next(), chars.next()) {
        (None, _) => {}
        (Some(c), None) => merged.push(Expression::Literal(Literal::Char(c))),
        _ => merged.push(Expression::Literal(Literal::String(pending.clone()))),
    }
    pending.clear();
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        ast::{
            CharRange, CharSet, CharSetElement, Expression, Literal, PresetCharSetName, Program,
        },
        error::RegexError,
    };

    use super::parse_from_str;

    #[test]
    fn test_parse_literal_simple() {
        {
            let program = parse_from_str(r#"a\w"#).unwrap();

            assert_eq!(
                program,
                Program {
                    expressions: vec![
                        Expression::Literal(Literal::Char('a')),
                        Expression::Literal(Literal::PresetCharSet(PresetCharSetName::CharWord)),
                    ]
                }
            );

            assert_eq!(program.to_string(), r#"'a', char_word"#);
        }

        // merge continuous chars
        {
            let program = parse_from_str(r#"abc\dmn\dp\dxyz"#).unwrap();

            assert_eq!(
                program.to_string(),
                r#""abc", char_digit, "mn", char_digit, 'p', char_digit, "xyz""#
            );
        }

        // empty pattern
        assert_eq!(
            parse_from_str("").unwrap(),
            Program {
                expressions: vec![]
            }
        );
    }

    #[test]
    fn test_parse_literal_charset() {
        let program = parse_from_str(r#"[a0-9\w]"#).unwrap();

        assert_eq!(
            program,
            Program {
                expressions: vec![Expression::Literal(Literal::CharSet(CharSet {
                    negative: false,
                    elements: vec![
                        CharSetElement::Char('a'),
                        CharSetElement::CharRange(CharRange {
                            start: '0',
                            end_included: '9'
                        }),
                        CharSetElement::PresetCharSet(PresetCharSetName::CharWord),
                    ]
                })),]
            }
        );

        assert_eq!(program.to_string(), r#"['a', '0'..'9', char_word]"#);

        assert_eq!(
            parse_from_str(r#"[^>]"#).unwrap().to_string(),
            r#"!['>']"#
        );
    }

    #[test]
    fn test_parse_quantifiers() {
        assert_eq!(
            parse_from_str(r#"a?b*c+d??e*?f+?"#).unwrap().to_string(),
            "optional('a'), zero_or_more('b'), one_or_more('c'), \
optional_lazy('d'), zero_or_more_lazy('e'), one_or_more_lazy('f')"
        );

        assert_eq!(
            parse_from_str(r#"a{3}b{2,}c{1,5}d{2,}?e{1,3}?"#)
                .unwrap()
                .to_string(),
            "repeat('a', 3), at_least('b', 2), repeat_range('c', 1, 5), \
at_least_lazy('d', 2), repeat_range_lazy('e', 1, 3)"
        );

        // quantifier binds to the last char only
        assert_eq!(
            parse_from_str(r#"abc+"#).unwrap().to_string(),
            r#""ab", one_or_more('c')"#
        );

        // err: lazy specified repetition
        assert!(matches!(
            parse_from_str(r#"a{3}?"#),
            Err(RegexError::MessageWithLocation(_, _))
        ));

        // err: out of order
        assert!(matches!(
            parse_from_str(r#"a{5,2}"#),
            Err(RegexError::MessageWithLocation(_, _))
        ));
    }

    #[test]
    fn test_parse_groups() {
        assert_eq!(
            parse_from_str(r#"(a)(?:bc)*(?<x>d)"#).unwrap().to_string(),
            r#"index('a'), zero_or_more(("bc")), name('d', x)"#
        );

        assert_eq!(
            parse_from_str(r#"(ab|c)\1\k<x>"#).unwrap().to_string(),
            r#"index("ab" || 'c'), ^1, x"#
        );

        // err: missing ')'
        assert!(matches!(
            parse_from_str(r#"(abc"#),
            Err(RegexError::UnexpectedEndOfDocument(_))
        ));

        // err: unbalanced ')'
        assert!(matches!(
            parse_from_str(r#"abc)"#),
            Err(RegexError::MessageWithLocation(_, _))
        ));

        // blank group
        assert_eq!(
            parse_from_str(r#"a()"#).unwrap().to_string(),
            r#"'a', index(())"#
        );
    }

    #[test]
    fn test_parse_logic_or() {
        assert_eq!(
            parse_from_str(r#"ab|c|d"#).unwrap().to_string(),
            r#""ab" || ('c' || 'd')"#
        );

        // blank alternatives
        assert_eq!(parse_from_str(r#"a|"#).unwrap().to_string(), r#"'a' || ()"#);
        assert_eq!(
            parse_from_str(r#"(a|)b"#).unwrap().to_string(),
            r#"index('a' || ()), 'b'"#
        );
        assert_eq!(parse_from_str(r#"|"#).unwrap().to_string(), r#"() || ()"#);
    }

    #[test]
    fn test_parse_tag_pattern() {
        assert_eq!(
            parse_from_str(r#"<(?P<tag>[a-z]+)\b[^>]*>(.*?)</(?P=tag)>"#)
                .unwrap()
                .to_string(),
            "'<', name(one_or_more(['a'..'z']), tag), is_bound, zero_or_more(!['>']), '>', \
index(zero_or_more_lazy(char_any)), \"</\", tag, '>'"
        );
    }

    #[test]
    fn test_parse_password_pattern() {
        assert_eq!(
            parse_from_str(r#"^(?=.*?[A-Z])(?=.*?[a-z])(?=.*?[0-9])(?=.*?[#?!@$%^&*-]).{8,}$"#)
                .unwrap()
                .to_string(),
            "start, \
is_before((zero_or_more_lazy(char_any), ['A'..'Z'])), \
is_before((zero_or_more_lazy(char_any), ['a'..'z'])), \
is_before((zero_or_more_lazy(char_any), ['0'..'9'])), \
is_before((zero_or_more_lazy(char_any), ['#', '?', '!', '@', '$', '%', '^', '&', '*', '-'])), \
at_least(char_any, 8), end"
        );
    }

    #[test]
    fn test_parse_look_behind() {
        assert_eq!(
            parse_from_str(r#"(?<=a)b(?<!cd)"#).unwrap().to_string(),
            r#"is_after('a'), 'b', is_not_after("cd")"#
        );
    }
}
