// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::collections::VecDeque;

/// An iterator adapter that can look ahead up to `max_peek` items.
pub struct PeekableIter<I>
where
    I: Iterator,
{
    upstream: I,
    buffer: VecDeque<I::Item>,
    max_peek: usize,
}

impl<I> PeekableIter<I>
where
    I: Iterator,
{
    pub fn new(upstream: I, max_peek: usize) -> Self {
        Self {
            upstream,
            buffer: VecDeque::with_capacity(max_peek),
            max_peek,
        }
    }

    /// Returns the item `offset` positions ahead without consuming it.
    ///
    /// `offset` must be less than the `max_peek` given on construction.
    pub fn peek(&mut self, offset: usize) -> Option<&I::Item> {
        debug_assert!(offset < self.max_peek, "peek offset out of range");

        while self.buffer.len() <= offset {
            match self.upstream.next() {
                Some(item) => self.buffer.push_back(item),
                None => return None,
            }
        }

        self.buffer.get(offset)
    }
}

impl<I> Iterator for PeekableIter<I>
where
    I: Iterator,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self.buffer.pop_front() {
            Some(item) => Some(item),
            None => self.upstream.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::PeekableIter;

    #[test]
    fn test_peek_and_next() {
        let mut iter = PeekableIter::new("abc".chars(), 3);

        assert_eq!(iter.peek(0), Some(&'a'));
        assert_eq!(iter.peek(2), Some(&'c'));
        assert_eq!(iter.next(), Some('a'));
        assert_eq!(iter.peek(1), Some(&'c'));
        assert_eq!(iter.peek(2), None);
        assert_eq!(iter.next(), Some('b'));
        assert_eq!(iter.next(), Some('c'));
        assert_eq!(iter.peek(0), None);
        assert_eq!(iter.next(), None);
    }
}
