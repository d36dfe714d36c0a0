// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

// Syntax Summary:
//
// Meta characters and their meanings:
//
// - [ ]      Character set
// - [^ ]     Negated character set
// - {m}      Exact repetition (m times)
// - {m,n}    Repetition range (m to n times)
// - {m,}     At least m repetitions
// - (xyz)    Capturing group
// - *        Zero or more repetitions
// - +        One or more repetitions
// - ?        Optional, or the lazy mark after another quantifier
// - |        Logical OR
// - ^        Start-of-text assertion
// - $        End-of-text assertion (also before a final newline)
// - .        Any character except newline
// - \        Escape character
//
// Any ASCII punctuation can be escaped to get the literal char, e.g. `\(`, `\*`, `\-`.
// In character sets `^` is literal unless it is the first char, and `-` is
// literal when it is the first or last char, e.g. `[#?!@$%^&*-]`.
//
// Escaped characters:
//
// - \t       Horizontal tab
// - \n       Newline
// - \r       Carriage return
// - \u{hhhh} Unicode character (hexadecimal code point)
//
// Preset character sets:
//
// - \w       Word characters (alphanumeric and `_`)
// - \W       Negated \w
// - \d       Digits: [0-9]
// - \D       Negated \d
// - \s       Whitespace characters
// - \S       Negated \s
//
// Boundary assertions:
// - \b       Word boundary
// - \B       Not a word boundary
//
// Groups:
// - (?:...)        Non-capturing group
// - (?<name>...)   Named group
// - (?P<name>...)  Named group, Python flavour
//
// Backreferences:
// - \number  Backreference by group number, e.g. `\1`, `\2`
// - \k<name> Backreference by group name
// - (?P=name) Backreference by group name, Python flavour
//
// Lookaround assertions:
//
// - (?=...)  Positive lookahead
// - (?!...)  Negative lookahead
// - (?<=...) Positive lookbehind
// - (?<!...) Negative lookbehind

use std::str::Chars;

use crate::{
    charwithposition::{CharWithPosition, CharsWithPositionIter},
    error::RegexError,
    location::Location,
    peekableiter::PeekableIter,
};

use super::token::{Repetition, Token, TokenWithRange};

pub const LEXER_PEEK_CHAR_MAX_COUNT: usize = 3;

pub fn lex_from_str(s: &str) -> Result<Vec<TokenWithRange>, RegexError> {
    let char_position_iter = CharsWithPositionIter::new(s.chars());
    let upstream = PeekableIter::new(char_position_iter, LEXER_PEEK_CHAR_MAX_COUNT);
    let mut lexer = Lexer::new(upstream);
    lexer.lex()
}

struct Lexer<'a> {
    upstream: PeekableIter<CharsWithPositionIter<Chars<'a>>>,
    last_position: Location, // last position consumed
    saved_positions: Vec<Location>,
}

impl<'a> Lexer<'a> {
    fn new(upstream: PeekableIter<CharsWithPositionIter<Chars<'a>>>) -> Self {
        Self {
            upstream,
            last_position: Location::new_position(0, 0, 0),
            saved_positions: vec![],
        }
    }

    fn next_char(&mut self) -> Option<char> {
        match self.upstream.next() {
            Some(CharWithPosition {
                character,
                position,
            }) => {
                self.last_position = position;
                Some(character)
            }
            None => None,
        }
    }

    fn peek_char(&mut self, offset: usize) -> Option<char> {
        self.upstream.peek(offset).map(|item| item.character)
    }

    fn peek_char_and_equals(&mut self, offset: usize, expected_char: char) -> bool {
        self.peek_char(offset) == Some(expected_char)
    }

    fn peek_position(&mut self, offset: usize) -> Option<Location> {
        self.upstream.peek(offset).map(|item| item.position)
    }

    fn push_peek_position(&mut self) {
        let position = match self.peek_position(0) {
            Some(position) => position,
            None => self.last_position.move_position_forward(),
        };
        self.saved_positions.push(position);
    }

    fn pop_saved_position(&mut self) -> Location {
        self.saved_positions.pop().unwrap_or(self.last_position)
    }

    fn expect_char(
        &mut self,
        expected_char: char,
        char_description: &str,
    ) -> Result<(), RegexError> {
        match self.next_char() {
            Some(ch) if ch == expected_char => Ok(()),
            Some(_) => Err(RegexError::MessageWithLocation(
                format!("Expect char: {}.", char_description),
                self.last_position,
            )),
            None => Err(RegexError::UnexpectedEndOfDocument(format!(
                "Expect char: {}.",
                char_description
            ))),
        }
    }

    fn push_single(&mut self, token_with_ranges: &mut Vec<TokenWithRange>, token: Token) {
        self.next_char(); // consume the single char
        token_with_ranges.push(TokenWithRange::from_position_and_length(
            token,
            &self.last_position,
            1,
        ));
    }

    fn push_with_lazy_mark(
        &mut self,
        token_with_ranges: &mut Vec<TokenWithRange>,
        greedy: Token,
        lazy: Token,
    ) {
        if self.peek_char_and_equals(1, '?') {
            self.push_peek_position();
            self.next_char(); // consume the quantifier
            self.next_char(); // consume '?'
            token_with_ranges.push(TokenWithRange::from_position_and_length(
                lazy,
                &self.pop_saved_position(),
                2,
            ));
        } else {
            self.push_single(token_with_ranges, greedy);
        }
    }
}

impl Lexer<'_> {
    fn lex(&mut self) -> Result<Vec<TokenWithRange>, RegexError> {
        let mut token_with_ranges = vec![];

        while let Some(current_char) = self.peek_char(0) {
            match current_char {
                '[' => {
                    let mut twrs = self.lex_charset()?;
                    token_with_ranges.append(&mut twrs);
                }
                '{' => {
                    let twr = self.lex_repetition()?;
                    token_with_ranges.push(twr);
                }
                '(' if self.peek_char_and_equals(1, '?') => {
                    let twr = self.lex_group_extension()?;
                    token_with_ranges.push(twr);
                }
                '(' => self.push_single(&mut token_with_ranges, Token::GroupStart),
                ')' => self.push_single(&mut token_with_ranges, Token::GroupEnd),
                '?' => self.push_with_lazy_mark(
                    &mut token_with_ranges,
                    Token::Optional,
                    Token::OptionalLazy,
                ),
                '+' => self.push_with_lazy_mark(
                    &mut token_with_ranges,
                    Token::OneOrMore,
                    Token::OneOrMoreLazy,
                ),
                '*' => self.push_with_lazy_mark(
                    &mut token_with_ranges,
                    Token::ZeroOrMore,
                    Token::ZeroOrMoreLazy,
                ),
                '^' => self.push_single(&mut token_with_ranges, Token::StartAssertion),
                '$' => self.push_single(&mut token_with_ranges, Token::EndAssertion),
                '.' => self.push_single(&mut token_with_ranges, Token::Dot),
                '|' => self.push_single(&mut token_with_ranges, Token::LogicOr),
                '\\' => {
                    let twr = self.lex_main_escaping()?;
                    token_with_ranges.push(twr);
                }
                _ => self.push_single(&mut token_with_ranges, Token::Char(current_char)),
            }
        }

        Ok(token_with_ranges)
    }

    fn lex_group_extension(&mut self) -> Result<TokenWithRange, RegexError> {
        // (?....  //
        // ^       //
        // |_______// current char, validated

        self.push_peek_position();

        if !matches!(self.peek_char(2), Some(':' | '<' | '=' | '!' | 'P')) {
            return Err(RegexError::MessageWithLocation(
                "Incomplete group.".to_owned(),
                Location::from_position_and_length(&self.pop_saved_position(), 2),
            ));
        }

        self.next_char(); // consume '('
        self.next_char(); // consume '?'

        let token = match self.peek_char(0) {
            Some('<') => match self.peek_char(1) {
                Some('=') => {
                    self.next_char(); // consume '<'
                    self.next_char(); // consume '='
                    Token::LookBehind
                }
                Some('!') => {
                    self.next_char(); // consume '<'
                    self.next_char(); // consume '!'
                    Token::LookBehindNegative
                }
                _ => {
                    let name = self.lex_identifier('>')?;
                    Token::NamedCapture(name)
                }
            },
            Some('P') => {
                self.next_char(); // consume 'P'

                match self.peek_char(0) {
                    Some('<') => {
                        let name = self.lex_identifier('>')?;
                        Token::NamedCapture(name)
                    }
                    Some('=') => {
                        // the terminator ')' is consumed along with the name
                        let name = self.lex_identifier(')')?;
                        Token::BackReferenceIdentifier(name)
                    }
                    _ => {
                        return Err(RegexError::MessageWithLocation(
                            "Expect \"<\" or \"=\" after \"(?P\".".to_owned(),
                            self.last_position.move_position_forward(),
                        ));
                    }
                }
            }
            Some('=') => {
                self.next_char(); // consume '='
                Token::LookAhead
            }
            Some('!') => {
                self.next_char(); // consume '!'
                Token::LookAheadNegative
            }
            Some(':') => {
                self.next_char(); // consume ':'
                Token::NonCapturing
            }
            _ => unreachable!(),
        };

        let range = Location::from_position_pair_with_end_included(
            &self.pop_saved_position(),
            &self.last_position,
        );

        Ok(TokenWithRange::new(token, range))
    }

    fn lex_charset(&mut self) -> Result<Vec<TokenWithRange>, RegexError> {
        // [.....]?  //
        // ^      ^__// to here
        // |_________// current char, validated
        //
        // also `[^.....]`

        let mut token_with_ranges = vec![];

        self.push_peek_position();

        self.next_char(); // consume '['

        let charset_start = if self.peek_char_and_equals(0, '^') {
            self.next_char(); // consume '^'
            TokenWithRange::from_position_and_length(
                Token::CharSetStartNegative,
                &self.pop_saved_position(),
                2,
            )
        } else {
            TokenWithRange::from_position_and_length(
                Token::CharSetStart,
                &self.pop_saved_position(),
                1,
            )
        };

        token_with_ranges.push(charset_start);

        loop {
            match self.peek_char(0) {
                Some('\\') => {
                    let twr = self.lex_charset_escaping()?;
                    token_with_ranges.push(twr);
                }
                Some(']') => {
                    break;
                }
                Some(c) => {
                    self.next_char(); // consume current char
                    token_with_ranges.push(TokenWithRange::from_position_and_length(
                        Token::Char(c),
                        &self.last_position,
                        1,
                    ));
                }
                None => {
                    return Err(RegexError::UnexpectedEndOfDocument(
                        "Incomplete charset.".to_owned(),
                    ));
                }
            }
        }

        self.next_char(); // consume ']'

        if token_with_ranges.len() == 1 {
            return Err(RegexError::MessageWithLocation(
                "Empty charset.".to_owned(),
                Location::from_position_pair_with_end_included(
                    &token_with_ranges[0].range,
                    &self.last_position,
                ),
            ));
        }

        token_with_ranges.push(TokenWithRange::from_position_and_length(
            Token::CharSetEnd,
            &self.last_position,
            1,
        ));

        // merge char ranges, e.g.
        // [a-z]
        //  ^ ^__ // to here
        //  |____ // merge from here
        //
        // a '-' right after the start token or right before the end token
        // is a literal char, so is the escaped '\-' (its range length is 2).

        if token_with_ranges.len() > 4 {
            let mut idx = token_with_ranges.len() - 3;
            while idx > 1 {
                if token_with_ranges[idx].token != Token::Char('-')
                    || token_with_ranges[idx].range.length != 1
                {
                    idx -= 1;
                    continue;
                }

                let position_start = token_with_ranges[idx - 1].range;
                let position_end = token_with_ranges[idx + 1].range;

                let char_start = match &token_with_ranges[idx - 1].token {
                    Token::Char(c) => *c,
                    _ => {
                        return Err(RegexError::MessageWithLocation(
                            "Expect a char for char range, e.g. \"a-z\".".to_owned(),
                            position_start,
                        ));
                    }
                };

                let char_end = match &token_with_ranges[idx + 1].token {
                    Token::Char(c) => *c,
                    _ => {
                        return Err(RegexError::MessageWithLocation(
                            "Expect a char for char range, e.g. \"a-z\".".to_owned(),
                            position_end,
                        ));
                    }
                };

                let range =
                    Location::from_position_pair_with_end_included(&position_start, &position_end);

                if char_start > char_end {
                    return Err(RegexError::MessageWithLocation(
                        format!("Invalid char range \"{}-{}\".", char_start, char_end),
                        range,
                    ));
                }

                let twr = TokenWithRange::new(Token::CharRange(char_start, char_end), range);

                let pos = idx - 1;
                token_with_ranges.drain(pos..(pos + 3));
                token_with_ranges.insert(pos, twr);

                idx -= 2;
            }
        }

        Ok(token_with_ranges)
    }

    fn lex_main_escaping(&mut self) -> Result<TokenWithRange, RegexError> {
        // \xxxx?  //
        // ^    ^__// to here
        // |_______// current char, validated

        self.push_peek_position();

        self.next_char(); // consume '\'

        let token = match self.peek_char(0) {
            Some(previous_char) => match previous_char {
                't' => {
                    self.next_char();
                    Token::Char('\t')
                }
                'r' => {
                    self.next_char();
                    Token::Char('\r')
                }
                'n' => {
                    self.next_char();
                    Token::Char('\n')
                }
                'u' => {
                    self.next_char(); // consume 'u'
                    let c = self.unescape_unicode()?;
                    Token::Char(c)
                }
                // preset charsets
                'w' | 'W' | 'd' | 'D' | 's' | 'S' => {
                    self.next_char();
                    Token::PresetCharSet(previous_char)
                }
                // boundary assertions
                'b' | 'B' => {
                    self.next_char();
                    Token::BoundaryAssertion(previous_char)
                }
                // back reference by index
                '1'..='9' => {
                    let num = self.lex_number()?;
                    Token::BackReferenceNumber(num)
                }
                '0' => {
                    return Err(RegexError::MessageWithLocation(
                        "Cannot back-reference group 0.".to_owned(),
                        self.last_position.move_position_forward(),
                    ));
                }
                // back reference by name
                'k' => {
                    self.next_char(); // consume 'k'

                    if self.peek_char_and_equals(0, '<') {
                        let s = self.lex_identifier('>')?;
                        Token::BackReferenceIdentifier(s)
                    } else {
                        return Err(RegexError::MessageWithLocation(
                            "Missing the angle bracket \"<\" for group name.".to_owned(),
                            self.last_position.move_position_forward(),
                        ));
                    }
                }
                // meta chars and other punctuation
                c if c.is_ascii_punctuation() => {
                    self.next_char();
                    Token::Char(c)
                }
                _ => {
                    return Err(RegexError::MessageWithLocation(
                        format!("Unsupported escape char '{}'.", previous_char),
                        Location::from_position_and_length(&self.pop_saved_position(), 2),
                    ));
                }
            },
            None => {
                return Err(RegexError::UnexpectedEndOfDocument(
                    "Incomplete escape character sequence.".to_owned(),
                ));
            }
        };

        let token_range = Location::from_position_pair_with_end_included(
            &self.pop_saved_position(),
            &self.last_position,
        );

        Ok(TokenWithRange::new(token, token_range))
    }

    fn lex_charset_escaping(&mut self) -> Result<TokenWithRange, RegexError> {
        // [\xxxx...]  //
        //  ^    ^_____// to here
        //  |__________// current char, validated

        self.push_peek_position();

        self.next_char(); // consume '\'

        let token = match self.next_char() {
            Some(previous_char) => match previous_char {
                't' => Token::Char('\t'),
                'r' => Token::Char('\r'),
                'n' => Token::Char('\n'),
                'u' => {
                    let c = self.unescape_unicode()?;
                    Token::Char(c)
                }
                // only positive preset charsets are supported in a charset
                'w' | 'd' | 's' => Token::PresetCharSet(previous_char),
                'W' | 'D' | 'S' => {
                    return Err(RegexError::MessageWithLocation(
                        format!(
                            "Negative char class '{}' is not supported in charset.",
                            previous_char
                        ),
                        Location::from_position_and_length(&self.pop_saved_position(), 2),
                    ));
                }
                'b' | 'B' => {
                    return Err(RegexError::MessageWithLocation(
                        "Boundary assertions are not supported in charset.".to_owned(),
                        Location::from_position_and_length(&self.pop_saved_position(), 2),
                    ));
                }
                '0'..='9' | 'k' => {
                    return Err(RegexError::MessageWithLocation(
                        "Back references are not supported in charset.".to_owned(),
                        Location::from_position_and_length(&self.pop_saved_position(), 2),
                    ));
                }
                c if c.is_ascii_punctuation() => Token::Char(c),
                _ => {
                    return Err(RegexError::MessageWithLocation(
                        format!("Unsupported escape char '{}' in charset.", previous_char),
                        Location::from_position_and_length(&self.pop_saved_position(), 2),
                    ));
                }
            },
            None => {
                return Err(RegexError::UnexpectedEndOfDocument(
                    "Incomplete escape character sequence.".to_owned(),
                ));
            }
        };

        let token_range = Location::from_position_pair_with_end_included(
            &self.pop_saved_position(),
            &self.last_position,
        );

        Ok(TokenWithRange::new(token, token_range))
    }

    fn unescape_unicode(&mut self) -> Result<char, RegexError> {
        // \u{6587}?  //
        //   ^     ^__// to here
        //   |________// current char

        if !self.peek_char_and_equals(0, '{') {
            return Err(RegexError::MessageWithLocation(
                "Missing the brace \"{\" for unicode escape sequence.".to_owned(),
                self.last_position.move_position_forward(),
            ));
        }

        self.push_peek_position();

        self.next_char(); // consume '{'

        let mut codepoint_string = String::new();

        loop {
            match self.next_char() {
                Some('}') => break,
                Some(c @ ('0'..='9' | 'a'..='f' | 'A'..='F')) => codepoint_string.push(c),
                Some(c) => {
                    return Err(RegexError::MessageWithLocation(
                        format!("Invalid character '{}' for unicode escape sequence.", c),
                        self.last_position,
                    ));
                }
                None => {
                    return Err(RegexError::UnexpectedEndOfDocument(
                        "Incomplete unicode escape sequence.".to_owned(),
                    ));
                }
            }

            if codepoint_string.len() > 6 {
                break;
            }
        }

        let codepoint_range = Location::from_position_pair_with_end_included(
            &self.pop_saved_position(),
            &self.last_position,
        );

        if codepoint_string.len() > 6 {
            return Err(RegexError::MessageWithLocation(
                "Unicode point code exceeds six digits.".to_owned(),
                codepoint_range,
            ));
        }

        if codepoint_string.is_empty() {
            return Err(RegexError::MessageWithLocation(
                "Empty unicode code point.".to_owned(),
                codepoint_range,
            ));
        }

        u32::from_str_radix(&codepoint_string, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| {
                RegexError::MessageWithLocation(
                    "Invalid unicode code point.".to_owned(),
                    codepoint_range,
                )
            })
    }

    fn lex_number(&mut self) -> Result<usize, RegexError> {
        // 123456N  //
        // ^     ^__// to here
        // |________// current char

        let mut num_string = String::new();

        self.push_peek_position();

        while let Some(current_char) = self.peek_char(0) {
            if !current_char.is_ascii_digit() {
                break;
            }
            num_string.push(current_char);
            self.next_char(); // consume digit
        }

        if num_string.is_empty() {
            self.pop_saved_position();
            return Err(RegexError::MessageWithLocation(
                "Expect a number.".to_owned(),
                self.last_position.move_position_forward(),
            ));
        }

        let num_range = Location::from_position_pair_with_end_included(
            &self.pop_saved_position(),
            &self.last_position,
        );

        num_string.parse::<usize>().map_err(|_| {
            RegexError::MessageWithLocation(
                format!("Can not convert \"{}\" to integer number.", num_string),
                num_range,
            )
        })
    }

    fn lex_identifier(&mut self, terminator: char) -> Result<String, RegexError> {
        // <name>?  //
        // ^     ^__// to here
        // |________// current char, the opening mark, validated
        //
        // also `=name)` for the Python flavour back-reference.

        self.next_char(); // consume the opening mark

        let mut name_string = String::new();

        loop {
            match self.peek_char(0) {
                Some(c) if c == terminator => break,
                Some(c @ ('0'..='9' | 'a'..='z' | 'A'..='Z' | '_')) => {
                    name_string.push(c);
                    self.next_char();
                }
                Some(c @ ('\u{a0}'..='\u{d7ff}' | '\u{e000}'..='\u{10ffff}')) => {
                    // non-ASCII letters such as CJK chars are allowed in names
                    name_string.push(c);
                    self.next_char();
                }
                Some(c) => {
                    let position = self
                        .peek_position(0)
                        .unwrap_or_else(|| self.last_position.move_position_forward());
                    return Err(RegexError::MessageWithLocation(
                        format!("Invalid char '{}' for identifier.", c),
                        position,
                    ));
                }
                None => {
                    return Err(RegexError::UnexpectedEndOfDocument(
                        "Incomplete identifier.".to_owned(),
                    ));
                }
            }
        }

        if name_string.is_empty() {
            return Err(RegexError::MessageWithLocation(
                "Expect an identifier".to_owned(),
                self.last_position.move_position_forward(),
            ));
        }

        self.expect_char(terminator, &format!("\"{}\"", terminator))?;

        Ok(name_string)
    }

    fn lex_repetition(&mut self) -> Result<TokenWithRange, RegexError> {
        // {...}?  //
        // ^    ^__// to here
        // |_______// from here, validated

        self.push_peek_position();

        self.next_char(); // consume '{'

        let from = self.lex_number()?;

        let repetition = if self.peek_char_and_equals(0, ',') {
            self.next_char(); // consume ','
            if self.peek_char_and_equals(0, '}') {
                self.next_char(); // consume '}'
                Repetition::AtLeast(from)
            } else {
                let to = self.lex_number()?;
                self.expect_char('}', "right brace \"}\"")?;
                Repetition::Range(from, to)
            }
        } else {
            self.expect_char('}', "right brace \"}\"")?;
            Repetition::Specified(from)
        };

        let lazy = if self.peek_char_and_equals(0, '?') {
            self.next_char(); // consume '?'
            true
        } else {
            false
        };

        let token = Token::Repetition(repetition, lazy);
        let range = Location::from_position_pair_with_end_included(
            &self.pop_saved_position(),
            &self.last_position,
        );

        Ok(TokenWithRange { token, range })
    }
}
