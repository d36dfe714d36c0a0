// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::fmt::Display;

use crate::ast::PresetCharSetName;

/// The compiled form of a pattern, walked by the backtracking `Instance`.
#[derive(Debug, PartialEq)]
pub struct Route {
    pub node: Node,

    // the group at index 0 represents the whole match
    pub capture_groups: Vec<CaptureGroup>,

    // the pattern begins with the start assertion `^`,
    // so searching does not need to move the start position forward.
    pub fixed_start: bool,
}

#[derive(Debug, PartialEq)]
pub struct CaptureGroup {
    pub name: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum Node {
    Empty,
    Char(char),
    String(String),
    AnyChar, // any char except '\n'
    CharSet(CharSetMatcher),
    Assertion(AssertionName),
    BackReference(usize),
    Capture(usize, Box<Node>),
    Sequence(Vec<Node>),
    Alternation(Box<Node>, Box<Node>),
    Repetition(Box<RepetitionNode>),
    LookAhead(Box<LookAroundNode>),
    LookBehind(Box<LookAroundNode>),
}

#[derive(Debug, PartialEq)]
pub struct RepetitionNode {
    pub node: Node,
    pub min: usize,
    pub max: Option<usize>,
    pub lazy: bool,
}

#[derive(Debug, PartialEq)]
pub struct LookAroundNode {
    pub node: Node,
    pub negative: bool,
    pub match_length_in_char: usize, // used by look behind only
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum AssertionName {
    Start,
    End,
    LineStart, // `^` in multi-line mode
    LineEnd,   // `$` in multi-line mode
    IsBound,
    IsNotBound,
}

#[derive(Debug, PartialEq)]
pub struct CharSetMatcher {
    pub items: Vec<CharSetItem>,
    pub negative: bool,
}

#[derive(Debug, PartialEq)]
pub enum CharSetItem {
    Char(char),
    Range(char, char),
    Preset(PresetCharSetName),
}

impl Route {
    pub fn new(node: Node, capture_groups: Vec<CaptureGroup>, fixed_start: bool) -> Self {
        Self {
            node,
            capture_groups,
            fixed_start,
        }
    }

    pub fn get_capture_group_name_by_index(&self, index: usize) -> Option<&str> {
        self.capture_groups
            .get(index)
            .and_then(|group| group.name.as_deref())
    }

    pub fn get_debug_text(&self) -> String {
        let names: Vec<String> = self
            .capture_groups
            .iter()
            .enumerate()
            .map(|(index, group)| match &group.name {
                Some(name) => format!("{}:{}", index, name),
                None => index.to_string(),
            })
            .collect();

        format!(
            "{}\n# groups: [{}], fixed start: {}",
            self.node,
            names.join(", "),
            self.fixed_start
        )
    }
}

impl Node {
    /// Nodes that consume a fixed piece of text in at most one way,
    /// a repetition of them is matched by a loop instead of recursion.
    pub fn is_single_step(&self) -> bool {
        matches!(
            self,
            Node::Char(_) | Node::String(_) | Node::AnyChar | Node::CharSet(_)
        )
    }
}

impl CharSetMatcher {
    pub fn new(items: Vec<CharSetItem>, negative: bool) -> Self {
        Self { items, negative }
    }

    pub fn new_preset(name: PresetCharSetName) -> Self {
        Self::new(vec![CharSetItem::Preset(name)], false)
    }

    pub fn is_match(&self, c: char) -> bool {
        let found = self.items.iter().any(|item| match item {
            CharSetItem::Char(expected) => c == *expected,
            CharSetItem::Range(start, end_included) => c >= *start && c <= *end_included,
            CharSetItem::Preset(name) => is_preset_char(*name, c),
        });

        found ^ self.negative
    }
}

pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_preset_char(name: PresetCharSetName, c: char) -> bool {
    match name {
        PresetCharSetName::CharWord => is_word_char(c),
        PresetCharSetName::CharNotWord => !is_word_char(c),
        PresetCharSetName::CharDigit => c.is_ascii_digit(),
        PresetCharSetName::CharNotDigit => !c.is_ascii_digit(),
        PresetCharSetName::CharSpace => c.is_whitespace(),
        PresetCharSetName::CharNotSpace => !c.is_whitespace(),
    }
}

impl Display for AssertionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssertionName::Start => f.write_str("start"),
            AssertionName::End => f.write_str("end"),
            AssertionName::LineStart => f.write_str("line_start"),
            AssertionName::LineEnd => f.write_str("line_end"),
            AssertionName::IsBound => f.write_str("is_bound"),
            AssertionName::IsNotBound => f.write_str("is_not_bound"),
        }
    }
}

impl Display for CharSetMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let items: Vec<String> = self
            .items
            .iter()
            .map(|item| match item {
                CharSetItem::Char('\t') => "'\\t'".to_owned(),
                CharSetItem::Char('\r') => "'\\r'".to_owned(),
                CharSetItem::Char('\n') => "'\\n'".to_owned(),
                CharSetItem::Char(c) => format!("'{}'", c),
                CharSetItem::Range(start, end_included) => {
                    format!("'{}'..'{}'", start, end_included)
                }
                CharSetItem::Preset(name) => name.to_string(),
            })
            .collect();

        if self.negative {
            write!(f, "![{}]", items.join(", "))
        } else {
            write!(f, "[{}]", items.join(", "))
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Empty => f.write_str("empty"),
            Node::Char(c) => write!(f, "'{}'", c),
            Node::String(s) => write!(f, "\"{}\"", s),
            Node::AnyChar => f.write_str("any"),
            Node::CharSet(matcher) => write!(f, "{}", matcher),
            Node::Assertion(name) => write!(f, "{}", name),
            Node::BackReference(index) => write!(f, "ref {{{}}}", index),
            Node::Capture(index, node) => write!(f, "capture {{{}}} ({})", index, node),
            Node::Sequence(nodes) => {
                let items: Vec<String> = nodes.iter().map(|n| n.to_string()).collect();
                write!(f, "({})", items.join(", "))
            }
            Node::Alternation(left, right) => write!(f, "({} | {})", left, right),
            Node::Repetition(repetition) => {
                let max = match repetition.max {
                    Some(n) => n.to_string(),
                    None => "MAX".to_owned(),
                };
                let mode = if repetition.lazy { "lazy" } else { "greedy" };
                write!(
                    f,
                    "repeat {}..{} {} ({})",
                    repetition.min, max, mode, repetition.node
                )
            }
            Node::LookAhead(look_around) => {
                let negative = if look_around.negative { " negative" } else { "" };
                write!(f, "look ahead{} ({})", negative, look_around.node)
            }
            Node::LookBehind(look_around) => {
                let negative = if look_around.negative { " negative" } else { "" };
                write!(
                    f,
                    "look behind{} {} ({})",
                    negative, look_around.match_length_in_char, look_around.node
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::ast::PresetCharSetName;

    use super::{CharSetItem, CharSetMatcher, Node};

    #[test]
    fn test_charset_matcher() {
        let matcher = CharSetMatcher::new(
            vec![
                CharSetItem::Char('#'),
                CharSetItem::Range('a', 'c'),
                CharSetItem::Preset(PresetCharSetName::CharDigit),
            ],
            false,
        );

        assert!(matcher.is_match('#'));
        assert!(matcher.is_match('b'));
        assert!(matcher.is_match('7'));
        assert!(!matcher.is_match('d'));
        assert!(!matcher.is_match('-'));

        let negative = CharSetMatcher::new(vec![CharSetItem::Char('>')], true);
        assert!(negative.is_match('a'));
        assert!(!negative.is_match('>'));

        assert_eq!(matcher.to_string(), "['#', 'a'..'c', char_digit]");
        assert_eq!(negative.to_string(), "!['>']");
    }

    #[test]
    fn test_single_step_node() {
        assert!(Node::Char('a').is_single_step());
        assert!(Node::String("ab".to_owned()).is_single_step());
        assert!(Node::AnyChar.is_single_step());
        assert!(!Node::Empty.is_single_step());
        assert!(!Node::BackReference(1).is_single_step());
        assert!(!Node::Capture(1, Box::new(Node::AnyChar)).is_single_step());
    }

    #[test]
    fn test_preset_charset_matcher() {
        let word = CharSetMatcher::new_preset(PresetCharSetName::CharWord);
        assert!(word.is_match('a'));
        assert!(word.is_match('_'));
        assert!(word.is_match('文'));
        assert!(!word.is_match('-'));

        let not_space = CharSetMatcher::new_preset(PresetCharSetName::CharNotSpace);
        assert!(not_space.is_match('x'));
        assert!(!not_space.is_match('\t'));
    }
}
