// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::location::Location;

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct CharWithPosition {
    pub character: char,
    pub position: Location,
}

/// Attaches the pattern position to each char of the upstream iterator.
pub struct CharsWithPositionIter<I>
where
    I: Iterator<Item = char>,
{
    upstream: I,
    next_position: Location,
}

impl<I> CharsWithPositionIter<I>
where
    I: Iterator<Item = char>,
{
    pub fn new(upstream: I) -> Self {
        Self {
            upstream,
            next_position: Location::new_position(0, 0, 0),
        }
    }
}

impl<I> Iterator for CharsWithPositionIter<I>
where
    I: Iterator<Item = char>,
{
    type Item = CharWithPosition;

    fn next(&mut self) -> Option<Self::Item> {
        let character = self.upstream.next()?;
        let position = self.next_position;

        self.next_position.index += 1;
        if character == '\n' {
            self.next_position.line += 1;
            self.next_position.column = 0;
        } else {
            self.next_position.column += 1;
        }

        Some(CharWithPosition {
            character,
            position,
        })
    }
}
