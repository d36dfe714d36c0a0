// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::route::{is_word_char, AssertionName, LookAroundNode, Node, RepetitionNode, Route};

/// The rest of the pattern, called with the position where the current
/// node finished matching.
type Continuation<'c, 'a> = &'c mut dyn FnMut(&mut Instance<'a>, usize) -> bool;

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct MatchRange {
    pub start: usize,        // position included
    pub end_excluded: usize, // position excluded
}

impl MatchRange {
    pub fn new(start: usize, end_excluded: usize) -> Self {
        Self {
            start,
            end_excluded,
        }
    }
}

pub struct Instance<'a> {
    pub text: &'a str,

    // index 0 is the whole match, a group that did not
    // participate in the match is `None`.
    pub match_ranges: Vec<Option<MatchRange>>,
}

impl<'a> Instance<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            match_ranges: vec![],
        }
    }

    /// Searches the leftmost match starting from the byte position `start`.
    pub fn exec(&mut self, route: &Route, start: usize) -> bool {
        let end = self.text.len();
        if start > end || !self.text.is_char_boundary(start) {
            return false;
        }

        let mut position = start;
        loop {
            if self.try_at(route, position) {
                return true;
            }

            // `^` can only be satisfied at the beginning of the text
            if route.fixed_start || position == end {
                break;
            }

            // move forward one character and try again
            position += self.char_at(position).map_or(1, |c| c.len_utf8());
        }

        false
    }

    /// Matches only at the byte position `start`.
    pub fn exec_anchored(&mut self, route: &Route, start: usize) -> bool {
        if start > self.text.len() || !self.text.is_char_boundary(start) {
            return false;
        }

        self.try_at(route, start)
    }

    fn try_at(&mut self, route: &Route, position: usize) -> bool {
        self.match_ranges = vec![None; route.capture_groups.len()];

        tracing::trace!(position, "try to match");

        let matched = self.match_node(
            &route.node,
            position,
            &mut |instance: &mut Instance<'a>, end: usize| {
                instance.match_ranges[0] = Some(MatchRange::new(position, end));
                true
            },
        );

        if matched {
            tracing::trace!(position, match_ranges = ?self.match_ranges, "matched");
        }

        matched
    }

    fn match_node(&mut self, node: &Node, position: usize, next: Continuation<'_, 'a>) -> bool {
        match node {
            Node::Empty => next(self, position),
            Node::Char(_) | Node::String(_) | Node::AnyChar | Node::CharSet(_) => {
                match self.match_single_step(node, position) {
                    Some(end) => next(self, end),
                    None => false,
                }
            }
            Node::Assertion(name) => {
                if self.is_assertion_satisfied(*name, position) {
                    next(self, position)
                } else {
                    false
                }
            }
            Node::BackReference(capture_group_index) => {
                // referring to a group which did not participate fails
                let Some(range) = self.match_ranges[*capture_group_index] else {
                    return false;
                };

                let captured = &self.text[range.start..range.end_excluded];
                if self.text[position..].starts_with(captured) {
                    next(self, position + captured.len())
                } else {
                    false
                }
            }
            Node::Capture(capture_group_index, inner) => {
                let capture_group_index = *capture_group_index;
                self.match_node(
                    inner,
                    position,
                    &mut |instance: &mut Instance<'a>, end: usize| {
                        let previous = instance.match_ranges[capture_group_index];
                        instance.match_ranges[capture_group_index] =
                            Some(MatchRange::new(position, end));

                        if next(instance, end) {
                            return true;
                        }

                        instance.match_ranges[capture_group_index] = previous;
                        false
                    },
                )
            }
            Node::Sequence(nodes) => self.match_sequence(nodes, position, next),
            Node::Alternation(left, right) => {
                self.match_node(left, position, &mut *next)
                    || self.match_node(right, position, next)
            }
            Node::Repetition(repetition) => {
                if repetition.node.is_single_step() {
                    self.match_single_step_repetition(repetition, position, next)
                } else {
                    self.match_repetition(repetition, 0, position, next)
                }
            }
            Node::LookAhead(look_around) => {
                let saved_match_ranges = self.match_ranges.clone();
                let matched =
                    self.match_node(&look_around.node, position, &mut |_: &mut Instance<'a>, _| {
                        true
                    });
                self.finish_look_around(look_around, matched, saved_match_ranges, position, next)
            }
            Node::LookBehind(look_around) => {
                let saved_match_ranges = self.match_ranges.clone();
                let matched = match self
                    .get_position_by_chars_backward(position, look_around.match_length_in_char)
                {
                    Some(start) => self.match_node(
                        &look_around.node,
                        start,
                        &mut |_: &mut Instance<'a>, end: usize| end == position,
                    ),
                    None => false,
                };
                self.finish_look_around(look_around, matched, saved_match_ranges, position, next)
            }
        }
    }

    /// Returns the end position if the node matches the text at `position`.
    fn match_single_step(&self, node: &Node, position: usize) -> Option<usize> {
        match node {
            Node::Char(expected) => match self.char_at(position) {
                Some(c) if c == *expected => Some(position + c.len_utf8()),
                _ => None,
            },
            Node::String(s) => {
                if self.text[position..].starts_with(s.as_str()) {
                    Some(position + s.len())
                } else {
                    None
                }
            }
            Node::AnyChar => match self.char_at(position) {
                Some(c) if c != '\n' => Some(position + c.len_utf8()),
                _ => None,
            },
            Node::CharSet(matcher) => match self.char_at(position) {
                Some(c) if matcher.is_match(c) => Some(position + c.len_utf8()),
                _ => None,
            },
            _ => None,
        }
    }

    // the body matches in at most one way, so the iterations are
    // stepped by a loop and only the continuation is backtracked.
    // the stack depth does not grow with the length of the text.
    fn match_single_step_repetition(
        &mut self,
        repetition: &RepetitionNode,
        position: usize,
        next: Continuation<'_, 'a>,
    ) -> bool {
        let min = repetition.min;
        let max = repetition.max.unwrap_or(usize::MAX);

        if repetition.lazy {
            let mut count = 0;
            let mut current = position;
            loop {
                if count >= min && next(self, current) {
                    return true;
                }

                if count == max {
                    return false;
                }

                match self.match_single_step(&repetition.node, current) {
                    Some(end) if end > current => {
                        current = end;
                        count += 1;
                    }
                    _ => return false,
                }
            }
        }

        // the end position after each iteration, index 0 is the start
        let mut ends = vec![position];
        while ends.len() - 1 < max {
            let current = ends[ends.len() - 1];
            match self.match_single_step(&repetition.node, current) {
                Some(end) if end > current => ends.push(end),
                _ => break,
            }
        }

        if ends.len() <= min {
            return false;
        }

        ends[min..].iter().rev().any(|end| next(self, *end))
    }

    fn match_sequence(
        &mut self,
        nodes: &[Node],
        position: usize,
        next: Continuation<'_, 'a>,
    ) -> bool {
        match nodes.split_first() {
            None => next(self, position),
            Some((first, rest)) => self.match_node(
                first,
                position,
                &mut |instance: &mut Instance<'a>, end: usize| {
                    instance.match_sequence(rest, end, &mut *next)
                },
            ),
        }
    }

    fn match_repetition(
        &mut self,
        repetition: &RepetitionNode,
        count: usize,
        position: usize,
        next: Continuation<'_, 'a>,
    ) -> bool {
        let can_stop = count >= repetition.min;
        let can_continue = repetition.max.map_or(true, |max| count < max);

        if repetition.lazy {
            if can_stop && next(self, position) {
                return true;
            }
            can_continue && self.match_repetition_once_more(repetition, count, position, next)
        } else {
            if can_continue
                && self.match_repetition_once_more(repetition, count, position, &mut *next)
            {
                return true;
            }
            can_stop && next(self, position)
        }
    }

    fn match_repetition_once_more(
        &mut self,
        repetition: &RepetitionNode,
        count: usize,
        position: usize,
        next: Continuation<'_, 'a>,
    ) -> bool {
        self.match_node(
            &repetition.node,
            position,
            &mut |instance: &mut Instance<'a>, end: usize| {
                // an iteration beyond the minimum must consume something
                if end == position && count >= repetition.min {
                    return false;
                }
                instance.match_repetition(repetition, count + 1, end, &mut *next)
            },
        )
    }

    // look around assertions are atomic: the body is matched once and
    // the continuation is not allowed to backtrack into it.
    fn finish_look_around(
        &mut self,
        look_around: &LookAroundNode,
        matched: bool,
        saved_match_ranges: Vec<Option<MatchRange>>,
        position: usize,
        next: Continuation<'_, 'a>,
    ) -> bool {
        if look_around.negative {
            // the captures of a negative assertion never survive
            if matched {
                self.match_ranges = saved_match_ranges;
                return false;
            }
            return next(self, position);
        }

        if !matched {
            return false;
        }

        // the captures of the body are kept until the rest fails
        if next(self, position) {
            return true;
        }

        self.match_ranges = saved_match_ranges;
        false
    }

    fn is_assertion_satisfied(&self, name: AssertionName, position: usize) -> bool {
        match name {
            AssertionName::Start => position == 0,
            AssertionName::End => {
                // the end of text, or right before the final line feed
                let rest = &self.text[position..];
                rest.is_empty() || rest == "\n"
            }
            AssertionName::LineStart => position == 0 || self.text[..position].ends_with('\n'),
            AssertionName::LineEnd => {
                position == self.text.len() || self.text[position..].starts_with('\n')
            }
            AssertionName::IsBound => self.is_word_bound(position),
            AssertionName::IsNotBound => !self.is_word_bound(position),
        }
    }

    fn is_word_bound(&self, position: usize) -> bool {
        let previous = self.text[..position]
            .chars()
            .next_back()
            .map_or(false, is_word_char);
        let current = self.char_at(position).map_or(false, is_word_char);
        previous != current
    }

    fn char_at(&self, position: usize) -> Option<char> {
        self.text[position..].chars().next()
    }

    fn get_position_by_chars_backward(&self, position: usize, count: usize) -> Option<usize> {
        if count == 0 {
            return Some(position);
        }

        self.text[..position]
            .char_indices()
            .rev()
            .nth(count - 1)
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::compiler::{compile_from_str, compile_from_str_with_options, CompileOptions};

    use super::{Instance, MatchRange};

    fn exec(pattern: &str, text: &str) -> Option<Vec<Option<(usize, usize)>>> {
        exec_with_options(pattern, text, &CompileOptions::default())
    }

    fn exec_multi_line(pattern: &str, text: &str) -> Option<Vec<Option<(usize, usize)>>> {
        exec_with_options(pattern, text, &CompileOptions { multi_line: true })
    }

    fn exec_with_options(
        pattern: &str,
        text: &str,
        options: &CompileOptions,
    ) -> Option<Vec<Option<(usize, usize)>>> {
        let route = compile_from_str_with_options(pattern, options).unwrap();
        let mut instance = Instance::new(text);
        if !instance.exec(&route, 0) {
            return None;
        }

        Some(
            instance
                .match_ranges
                .iter()
                .map(|range| range.map(|r| (r.start, r.end_excluded)))
                .collect(),
        )
    }

    #[test]
    fn test_exec_literal() {
        assert_eq!(exec("abc", "xxabcxx"), Some(vec![Some((2, 5))]));
        assert_eq!(exec("abd", "xxabcxx"), None);

        // empty pattern matches at the first position
        assert_eq!(exec("", "abc"), Some(vec![Some((0, 0))]));
        assert_eq!(exec("", ""), Some(vec![Some((0, 0))]));

        // utf-8
        assert_eq!(exec("文字", "中文字"), Some(vec![Some((3, 9))]));
        assert_eq!(exec(".b", "文b"), Some(vec![Some((0, 4))]));
    }

    #[test]
    fn test_exec_any_char_and_end() {
        assert_eq!(exec("a.c", "a\nc"), None);
        assert_eq!(exec("a$", "a\n"), Some(vec![Some((0, 1))]));
        assert_eq!(exec("a$", "a\nb"), None);
        assert_eq!(exec("^b", "ab"), None);
    }

    #[test]
    fn test_exec_greedy_and_lazy() {
        assert_eq!(exec("a+", "caaab"), Some(vec![Some((1, 4))]));
        assert_eq!(exec("a+?", "caaab"), Some(vec![Some((1, 2))]));
        assert_eq!(exec("a{2,3}", "aaaa"), Some(vec![Some((0, 3))]));
        assert_eq!(exec("a{2,3}?", "aaaa"), Some(vec![Some((0, 2))]));
        assert_eq!(exec("<.*>", "<a><b>"), Some(vec![Some((0, 6))]));
        assert_eq!(exec("<.*?>", "<a><b>"), Some(vec![Some((0, 3))]));

        // empty iterations terminate
        assert_eq!(exec("(a*)+b", "b"), Some(vec![Some((0, 1)), Some((0, 0))]));

        // backtrack into the repetition
        assert_eq!(exec("a*ab", "aaab"), Some(vec![Some((0, 4))]));
        assert_eq!(exec("a*?ab", "aaab"), Some(vec![Some((0, 4))]));
        assert_eq!(exec("[ab]{2,3}b", "abab"), Some(vec![Some((0, 4))]));
        assert_eq!(exec("a{3,}", "aab"), None);
        assert_eq!(exec("(?:ab){2}", "abab"), Some(vec![Some((0, 4))]));
    }

    #[test]
    fn test_exec_long_text() {
        let long_word = "x".repeat(100_000);

        let text = format!("{}!", long_word);
        assert_eq!(exec("x*!", &text), Some(vec![Some((0, 100_001))]));
        assert_eq!(exec("x*?!", &text), Some(vec![Some((0, 100_001))]));
        assert_eq!(exec("^x+$", &long_word), Some(vec![Some((0, 100_000))]));
        assert_eq!(exec("^x+y", &long_word), None);

        let text = format!("<a>{}</a>", long_word);
        assert_eq!(
            exec(r#"<([a-z]+)>(.*?)</\1>"#, &text),
            Some(vec![
                Some((0, 100_007)),
                Some((1, 2)),
                Some((3, 100_003))
            ])
        );
    }

    #[test]
    fn test_exec_empty_alternative() {
        assert_eq!(exec("(a|)b", "b"), Some(vec![Some((0, 1)), Some((0, 0))]));
        assert_eq!(exec("(a|)b", "ab"), Some(vec![Some((0, 2)), Some((0, 1))]));
        assert_eq!(exec("a|", "x"), Some(vec![Some((0, 0))]));
        assert_eq!(exec("x()y", "xy"), Some(vec![Some((0, 2)), Some((1, 1))]));
    }

    #[test]
    fn test_exec_multi_line() {
        assert_eq!(exec_multi_line("^b", "a\nb"), Some(vec![Some((2, 3))]));
        assert_eq!(exec_multi_line("a$", "a\nb"), Some(vec![Some((0, 1))]));
        assert_eq!(exec_multi_line("^b$", "a\nb\nc"), Some(vec![Some((2, 3))]));
        assert_eq!(exec_multi_line("^$", "a\n\nb"), Some(vec![Some((2, 2))]));

        // not after a char other than line feed
        assert_eq!(exec_multi_line("^b", "ab"), None);

        // single line
        assert_eq!(exec("^b", "a\nb"), None);
    }

    #[test]
    fn test_exec_alternation_and_captures() {
        assert_eq!(
            exec("(a)|(b)", "b"),
            Some(vec![Some((0, 1)), None, Some((0, 1))])
        );

        // the captures of a failed path are restored
        assert_eq!(
            exec("(a)x|ay", "ay"),
            Some(vec![Some((0, 2)), None])
        );

        // the last iteration wins
        assert_eq!(
            exec("(\\w)+", "abc"),
            Some(vec![Some((0, 3)), Some((2, 3))])
        );
    }

    #[test]
    fn test_exec_back_reference() {
        assert_eq!(
            exec(r#"(\w+) \1"#, "hello hello"),
            Some(vec![Some((0, 11)), Some((0, 5))])
        );
        assert_eq!(exec(r#"^(\w+) \1$"#, "hello world"), None);

        // refer to a group that did not participate
        assert_eq!(exec(r#"(a)?b\1"#, "b"), None);
    }

    #[test]
    fn test_exec_word_bound() {
        assert_eq!(exec(r#"\bcat\b"#, "concat cat"), Some(vec![Some((7, 10))]));
        assert_eq!(exec(r#"\Bcat"#, "cat concat"), Some(vec![Some((7, 10))]));
    }

    #[test]
    fn test_exec_look_ahead() {
        assert_eq!(exec("a(?=b)", "acab"), Some(vec![Some((2, 3))]));
        assert_eq!(exec("a(?!b)", "abac"), Some(vec![Some((2, 3))]));

        // positive look ahead keeps its captures
        assert_eq!(
            exec("(?=(\\w+))a", "ab"),
            Some(vec![Some((0, 1)), Some((0, 2))])
        );

        // negative look ahead discards its captures
        assert_eq!(exec("(?!(b))a", "a"), Some(vec![Some((0, 1)), None]));
    }

    #[test]
    fn test_exec_look_behind() {
        assert_eq!(exec("(?<=a)b", "bab"), Some(vec![Some((2, 3))]));
        assert_eq!(exec("(?<!a)b", "abcb"), Some(vec![Some((3, 4))]));
        assert_eq!(exec("(?<=文)b", "b文b"), Some(vec![Some((4, 5))]));

        // not enough chars behind
        assert_eq!(exec("(?<=ab)c", "bc"), None);
        assert_eq!(exec("(?<!ab)c", "bc"), Some(vec![Some((1, 2))]));
    }

    #[test]
    fn test_exec_start_position() {
        let route = compile_from_str("a").unwrap();
        let mut instance = Instance::new("aba");

        assert!(instance.exec(&route, 1));
        assert_eq!(instance.match_ranges[0], Some(MatchRange::new(2, 3)));

        // the end of the text
        assert!(!instance.exec(&route, 3));

        // out of range
        assert!(!instance.exec(&route, 4));

        // not a char boundary
        let mut instance = Instance::new("文a");
        assert!(!instance.exec(&route, 1));

        // anchored
        let mut instance = Instance::new("ba");
        assert!(!instance.exec_anchored(&route, 0));
        assert!(instance.exec_anchored(&route, 1));
    }
}
