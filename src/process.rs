// Copyright (c) 2024 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE, LICENSE.additional and CONTRIBUTING.

use std::ops::Range;

use crate::{
    compiler::{compile_from_str_with_options, CompileOptions},
    error::RegexError,
    instance::{Instance, MatchRange},
    route::Route,
};

/// A compiled regular expression with support for back-references
/// and look around assertions.
#[derive(Debug)]
pub struct Regex {
    route: Route,
    pattern: String,
}

/// Configures and builds a `Regex`.
#[derive(Debug, Clone)]
pub struct RegexBuilder {
    pattern: String,
    options: CompileOptions,
}

impl RegexBuilder {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_owned(),
            options: CompileOptions::default(),
        }
    }

    /// When enabled, `^` matches at the beginning of each line and `$`
    /// matches at the end of each line. Disabled by default.
    pub fn multi_line(&mut self, yes: bool) -> &mut Self {
        self.options.multi_line = yes;
        self
    }

    pub fn build(&self) -> Result<Regex, RegexError> {
        let route = compile_from_str_with_options(&self.pattern, &self.options)?;

        tracing::debug!(
            pattern = self.pattern.as_str(),
            multi_line = self.options.multi_line,
            route = %route.get_debug_text(),
            "compiled"
        );

        Ok(Regex {
            route,
            pattern: self.pattern.clone(),
        })
    }
}

impl Regex {
    pub fn new(pattern: &str) -> Result<Self, RegexError> {
        RegexBuilder::new(pattern).build()
    }

    /// The source text of this regular expression.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// The number of capture groups, including the implied group 0.
    pub fn captures_len(&self) -> usize {
        self.route.capture_groups.len()
    }

    pub fn capture_names(&self) -> impl Iterator<Item = Option<&str>> {
        self.route
            .capture_groups
            .iter()
            .map(|group| group.name.as_deref())
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.is_match_at(text, 0)
    }

    pub fn is_match_at(&self, text: &str, start: usize) -> bool {
        let mut instance = Instance::new(text);
        instance.exec(&self.route, start)
    }

    pub fn find<'a, 'b>(&'a self, text: &'b str) -> Option<Match<'a, 'b>> {
        self.find_at(text, 0)
    }

    pub fn find_at<'a, 'b>(&'a self, text: &'b str, start: usize) -> Option<Match<'a, 'b>> {
        let mut instance = Instance::new(text);
        if !instance.exec(&self.route, start) {
            return None;
        }

        instance.match_ranges[0].map(|range| self.new_match(text, 0, range))
    }

    pub fn find_iter<'a, 'b>(&'a self, text: &'b str) -> Matches<'a, 'b> {
        Matches {
            regex: self,
            text,
            last_position: Some(0),
        }
    }

    pub fn captures<'a, 'b>(&'a self, text: &'b str) -> Option<Captures<'a, 'b>> {
        self.captures_at(text, 0)
    }

    pub fn captures_at<'a, 'b>(&'a self, text: &'b str, start: usize) -> Option<Captures<'a, 'b>> {
        let mut instance = Instance::new(text);
        if !instance.exec(&self.route, start) {
            return None;
        }

        Some(self.new_captures(text, &instance.match_ranges))
    }

    /// Captures of a match that must begin at the start of the text.
    pub fn captures_anchored<'a, 'b>(&'a self, text: &'b str) -> Option<Captures<'a, 'b>> {
        let mut instance = Instance::new(text);
        if !instance.exec_anchored(&self.route, 0) {
            return None;
        }

        Some(self.new_captures(text, &instance.match_ranges))
    }

    pub fn captures_iter<'a, 'b>(&'a self, text: &'b str) -> CaptureMatches<'a, 'b> {
        CaptureMatches {
            regex: self,
            text,
            last_position: Some(0),
        }
    }

    fn new_match<'a, 'b>(&'a self, text: &'b str, index: usize, range: MatchRange) -> Match<'a, 'b> {
        Match::new(
            range.start,
            range.end_excluded,
            self.route.get_capture_group_name_by_index(index),
            &text[range.start..range.end_excluded],
        )
    }

    fn new_captures<'a, 'b>(
        &'a self,
        text: &'b str,
        match_ranges: &[Option<MatchRange>],
    ) -> Captures<'a, 'b> {
        let matches = match_ranges
            .iter()
            .enumerate()
            .map(|(index, range)| range.map(|r| self.new_match(text, index, r)))
            .collect();

        let names = self
            .route
            .capture_groups
            .iter()
            .map(|group| group.name.as_deref())
            .collect();

        Captures { matches, names }
    }
}

// the next search starts after the current match, an empty
// match moves the position forward by one char so that
// the iteration always terminates.
fn next_search_position(text: &str, start: usize, end: usize) -> Option<usize> {
    if end > start {
        return Some(end);
    }

    text[end..].chars().next().map(|c| end + c.len_utf8())
}

pub struct Matches<'a, 'b> {
    regex: &'a Regex,
    text: &'b str,
    last_position: Option<usize>,
}

impl<'a, 'b> Iterator for Matches<'a, 'b> {
    type Item = Match<'a, 'b>;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.last_position?;
        let match_ = self.regex.find_at(self.text, position)?;

        self.last_position = next_search_position(self.text, match_.start, match_.end);
        Some(match_)
    }
}

pub struct CaptureMatches<'a, 'b> {
    regex: &'a Regex,
    text: &'b str,
    last_position: Option<usize>,
}

impl<'a, 'b> Iterator for CaptureMatches<'a, 'b> {
    type Item = Captures<'a, 'b>;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.last_position?;
        let captures = self.regex.captures_at(self.text, position)?;

        let (start, end) = match captures.get(0) {
            Some(m) => (m.start, m.end),
            None => return None,
        };

        self.last_position = next_search_position(self.text, start, end);
        Some(captures)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Captures<'a, 'b> {
    pub matches: Vec<Option<Match<'a, 'b>>>,
    names: Vec<Option<&'a str>>,
}

impl<'a, 'b> Captures<'a, 'b> {
    // the following methods are intended to
    // be compatible with the 'Captures' API of crate 'regex':
    // https://docs.rs/regex/latest/regex/struct.Captures.html

    pub fn get(&self, index: usize) -> Option<&Match<'a, 'b>> {
        self.matches.get(index).and_then(|m| m.as_ref())
    }

    pub fn name(&self, name: &str) -> Option<&Match<'a, 'b>> {
        let index = self.names.iter().position(|n| *n == Some(name))?;
        self.get(index)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// The text of the groups 1..n, named groups included.
    pub fn groups(&self) -> Vec<Option<&'b str>> {
        self.matches
            .iter()
            .skip(1)
            .map(|m| m.as_ref().map(|m| m.value))
            .collect()
    }

    /// The named groups only, in the order of their opening parentheses.
    pub fn named_groups(&self) -> Vec<(&'a str, Option<&'b str>)> {
        self.names
            .iter()
            .zip(self.matches.iter())
            .filter_map(|(name, m)| name.map(|n| (n, m.as_ref().map(|m| m.value))))
            .collect()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Match<'a, 'b> {
    pub start: usize, // position included
    pub end: usize,   // position excluded
    pub name: Option<&'a str>,
    pub value: &'b str,
}

impl<'a, 'b> Match<'a, 'b> {
    pub fn new(start: usize, end: usize, name: Option<&'a str>, value: &'b str) -> Self {
        Match {
            start,
            end,
            name,
            value,
        }
    }

    // the following methods are intended to
    // be compatible with the 'Match' API of crate 'regex':
    // https://docs.rs/regex/latest/regex/struct.Match.html

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn as_str(&self) -> &'b str {
        self.value
    }
}
