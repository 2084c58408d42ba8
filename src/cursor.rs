//! Position-aware cursors over a [`DoublyLinkedList`].
//!
//! A cursor is always in one of four states: on a live element, before the first
//! element, after the last element, or, when the list is empty, before the first and
//! after the last element at once. Moving off either end enters the matching boundary;
//! moving again in the same direction is an error rather than a wrap-around.

use std::fmt::{self, Debug};

use log::debug;

use crate::{
    base::{DoublyLinkedList, Link},
    error::{Boundary, IteratorError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Position {
    /// Before the first and after the last element of an empty list.
    Empty,
    BeforeFirst,
    At(usize),
    AfterLast,
}

impl Position {
    fn first<T>(list: &DoublyLinkedList<T>) -> Self {
        list.head().map_or(Self::Empty, Self::At)
    }

    fn last<T>(list: &DoublyLinkedList<T>) -> Self {
        list.tail().map_or(Self::Empty, Self::At)
    }

    /// The element after a removed or skipped node, or the trailing boundary.
    fn forward<T>(list: &DoublyLinkedList<T>, next: Link) -> Self {
        match next {
            _ if list.is_empty() => Self::Empty,
            Some(index) => Self::At(index),
            None => Self::AfterLast,
        }
    }

    fn backward<T>(list: &DoublyLinkedList<T>, prev: Link) -> Self {
        match prev {
            _ if list.is_empty() => Self::Empty,
            Some(index) => Self::At(index),
            None => Self::BeforeFirst,
        }
    }

    fn boundary(self) -> Option<Boundary> {
        match self {
            Self::Empty => Some(Boundary::Both),
            Self::BeforeFirst => Some(Boundary::Start),
            Self::AfterLast => Some(Boundary::End),
            Self::At(_) => None,
        }
    }
}

/// Traversal state shared by [`Cursor`] and [`CursorMut`]: where the cursor is and
/// which generation of the list that position belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CursorState {
    position: Position,
    generation: u64,
}

impl CursorState {
    fn new<T>(list: &DoublyLinkedList<T>) -> Self {
        Self {
            position: Position::first(list),
            generation: list.generation(),
        }
    }

    fn current(&self) -> Result<usize, IteratorError> {
        match self.position {
            Position::At(index) => Ok(index),
            other => Err(other.boundary().unwrap_or(Boundary::Both).into()),
        }
    }

    fn move_next<T>(&mut self, list: &DoublyLinkedList<T>) -> Result<(), IteratorError> {
        self.position = match self.position {
            Position::Empty => return Err(Boundary::Both.into()),
            Position::AfterLast => return Err(Boundary::End.into()),
            Position::BeforeFirst => Position::first(list),
            Position::At(index) => Position::forward(list, list.node(index).next),
        };
        Ok(())
    }

    fn move_prev<T>(&mut self, list: &DoublyLinkedList<T>) -> Result<(), IteratorError> {
        self.position = match self.position {
            Position::Empty => return Err(Boundary::Both.into()),
            Position::BeforeFirst => return Err(Boundary::Start.into()),
            Position::AfterLast => Position::last(list),
            Position::At(index) => Position::backward(list, list.node(index).prev),
        };
        Ok(())
    }

    fn is_past_start(&self) -> bool {
        matches!(self.position, Position::BeforeFirst | Position::Empty)
    }

    fn is_past_end(&self) -> bool {
        matches!(self.position, Position::AfterLast | Position::Empty)
    }
}

/// A detached snapshot of a cursor position.
///
/// Unlike a cursor it does not borrow the list, so the list may be mutated while a
/// bookmark is held. Resuming it afterwards fails with [`IteratorError::Stale`]
/// instead of pointing at a node that no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bookmark {
    list: u64,
    state: CursorState,
}

impl<T> DoublyLinkedList<T> {
    /// Returns a read-only cursor on the first element, or in the empty state if the
    /// list has no elements.
    pub fn cursor(&self) -> Cursor<'_, T> {
        Cursor {
            list: self,
            state: CursorState::new(self),
        }
    }

    /// Returns a cursor that can insert and remove elements at its position.
    pub fn cursor_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut {
            state: CursorState::new(self),
            list: self,
        }
    }

    /// Rebuilds a read-only cursor from `bookmark`.
    pub fn resume(&self, bookmark: Bookmark) -> Result<Cursor<'_, T>, IteratorError> {
        Ok(Cursor {
            state: self.check_bookmark(bookmark)?,
            list: self,
        })
    }

    /// Rebuilds a mutating cursor from `bookmark`.
    pub fn resume_mut(&mut self, bookmark: Bookmark) -> Result<CursorMut<'_, T>, IteratorError> {
        Ok(CursorMut {
            state: self.check_bookmark(bookmark)?,
            list: self,
        })
    }

    fn check_bookmark(&self, bookmark: Bookmark) -> Result<CursorState, IteratorError> {
        if bookmark.list != self.id() {
            return Err(IteratorError::ForeignList);
        }
        if bookmark.state.generation != self.generation() {
            return Err(IteratorError::Stale {
                expected: bookmark.state.generation,
                found: self.generation(),
            });
        }
        debug!(
            "list {}: resuming cursor at generation {}",
            self.id(),
            self.generation()
        );
        Ok(bookmark.state)
    }
}

pub struct Cursor<'a, T> {
    list: &'a DoublyLinkedList<T>,
    state: CursorState,
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T: Debug> Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("position", &self.state.position)
            .field("value", &self.value().ok())
            .finish()
    }
}

impl<'a, T> Cursor<'a, T> {
    /// Moves to the next element.
    ///
    /// From before the first element this enters the list at its head; from the last
    /// element it moves past the end. Fails if the cursor is already past the end.
    pub fn move_next(&mut self) -> Result<(), IteratorError> {
        self.state.move_next(self.list)
    }

    /// Moves to the previous element. Fails if the cursor is already past the start.
    pub fn move_prev(&mut self) -> Result<(), IteratorError> {
        self.state.move_prev(self.list)
    }

    pub fn is_past_start(&self) -> bool {
        self.state.is_past_start()
    }

    pub fn is_past_end(&self) -> bool {
        self.state.is_past_end()
    }

    /// The element under the cursor. Fails on either boundary.
    pub fn value(&self) -> Result<&'a T, IteratorError> {
        let index = self.state.current()?;
        Ok(&self.list.node(index).value)
    }

    pub fn bookmark(&self) -> Bookmark {
        Bookmark {
            list: self.list.id(),
            state: self.state,
        }
    }

    pub fn list(&self) -> &'a DoublyLinkedList<T> {
        self.list
    }
}

pub struct CursorMut<'a, T> {
    list: &'a mut DoublyLinkedList<T>,
    state: CursorState,
}

impl<T: Debug> Debug for CursorMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("position", &self.state.position)
            .field("value", &self.value().ok())
            .finish()
    }
}

impl<'a, T> CursorMut<'a, T> {
    pub fn move_next(&mut self) -> Result<(), IteratorError> {
        self.state.move_next(self.list)
    }

    pub fn move_prev(&mut self) -> Result<(), IteratorError> {
        self.state.move_prev(self.list)
    }

    pub fn is_past_start(&self) -> bool {
        self.state.is_past_start()
    }

    pub fn is_past_end(&self) -> bool {
        self.state.is_past_end()
    }

    pub fn value(&self) -> Result<&T, IteratorError> {
        let index = self.state.current()?;
        Ok(&self.list.node(index).value)
    }

    pub fn value_mut(&mut self) -> Result<&mut T, IteratorError> {
        let index = self.state.current()?;
        Ok(&mut self.list.node_mut(index).value)
    }

    /// Inserts `value` immediately before the cursor position without moving the cursor.
    ///
    /// Past the end, the new element becomes the last one. Fails past the start, where
    /// there is nothing to insert ahead of.
    pub fn insert_before(&mut self, value: T) -> Result<(), IteratorError> {
        let (prev, next) = match self.state.position {
            Position::Empty => return Err(Boundary::Both.into()),
            Position::BeforeFirst => return Err(Boundary::Start.into()),
            Position::AfterLast => (self.list.tail(), None),
            Position::At(index) => (self.list.node(index).prev, Some(index)),
        };
        self.list.try_link(prev, next, value)?;
        self.restamp();
        Ok(())
    }

    /// Inserts `value` immediately after the cursor position without moving the cursor.
    ///
    /// Past the start, the new element becomes the first one. Fails past the end.
    pub fn insert_after(&mut self, value: T) -> Result<(), IteratorError> {
        let (prev, next) = match self.state.position {
            Position::Empty => return Err(Boundary::Both.into()),
            Position::AfterLast => return Err(Boundary::End.into()),
            Position::BeforeFirst => (None, self.list.head()),
            Position::At(index) => (Some(index), self.list.node(index).next),
        };
        self.list.try_link(prev, next, value)?;
        self.restamp();
        Ok(())
    }

    /// Removes the element under the cursor and returns it.
    ///
    /// Afterwards the cursor is on the following element (past the end if there is
    /// none) when `move_forward` is set, otherwise on the preceding element (past the
    /// start if there is none). Removing the only element leaves the cursor in the
    /// empty state.
    pub fn remove(&mut self, move_forward: bool) -> Result<T, IteratorError> {
        let index = self.state.current()?;
        let node = self.list.unlink(index);
        self.state.position = if move_forward {
            Position::forward(self.list, node.next)
        } else {
            Position::backward(self.list, node.prev)
        };
        self.restamp();
        Ok(node.value)
    }

    pub fn as_cursor(&self) -> Cursor<'_, T> {
        Cursor {
            list: self.list,
            state: self.state,
        }
    }

    pub fn bookmark(&self) -> Bookmark {
        Bookmark {
            list: self.list.id(),
            state: self.state,
        }
    }

    pub fn list(&self) -> &DoublyLinkedList<T> {
        self.list
    }

    fn restamp(&mut self) {
        self.state.generation = self.list.generation();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::tests::{assert_links, with_failing_allocation};

    fn list_of(values: &[i32]) -> DoublyLinkedList<i32> {
        values.iter().copied().collect()
    }

    #[test]
    fn forward_traversal() {
        let list = list_of(&[10, 20, 30]);
        let mut cursor = list.cursor();
        let mut seen = Vec::new();
        while !cursor.is_past_end() {
            seen.push(*cursor.value().unwrap());
            cursor.move_next().unwrap();
        }
        assert_eq!(seen, [10, 20, 30]);
        assert_eq!(
            cursor.move_next(),
            Err(IteratorError::OutOfRange(Boundary::End))
        );
        assert_eq!(
            cursor.value(),
            Err(IteratorError::OutOfRange(Boundary::End))
        );
    }

    #[test]
    fn round_trip_returns_to_first() {
        let list = list_of(&[1, 2, 3, 4]);
        let mut cursor = list.cursor();
        let mut steps = 0;
        while !cursor.is_past_end() {
            cursor.move_next().unwrap();
            steps += 1;
        }
        for _ in 0..steps {
            cursor.move_prev().unwrap();
        }
        assert_eq!(cursor.value(), Ok(&1));
        assert!(!cursor.is_past_start());

        cursor.move_prev().unwrap();
        assert!(cursor.is_past_start());
        assert_eq!(
            cursor.move_prev(),
            Err(IteratorError::OutOfRange(Boundary::Start))
        );
        cursor.move_next().unwrap();
        assert_eq!(cursor.value(), Ok(&1));
    }

    #[test]
    fn empty_list_cursor_is_on_both_boundaries() {
        let mut list = DoublyLinkedList::<i32>::new();
        let cursor = list.cursor();
        assert!(cursor.is_past_start());
        assert!(cursor.is_past_end());
        assert_eq!(
            cursor.value(),
            Err(IteratorError::OutOfRange(Boundary::Both))
        );

        let mut cursor = list.cursor_mut();
        let both = IteratorError::OutOfRange(Boundary::Both);
        assert_eq!(cursor.move_next(), Err(both.clone()));
        assert_eq!(cursor.move_prev(), Err(both.clone()));
        assert_eq!(cursor.remove(true), Err(both.clone()));
        assert_eq!(cursor.insert_before(1), Err(both.clone()));
        assert_eq!(cursor.insert_after(1), Err(both));
        assert!(cursor.list().is_empty());
    }

    #[test]
    fn insert_keeps_position() {
        let mut list = list_of(&[2, 4]);
        let mut cursor = list.cursor_mut();
        cursor.insert_before(1).unwrap();
        cursor.insert_after(3).unwrap();
        assert_eq!(cursor.value(), Ok(&2));

        cursor.move_next().unwrap();
        assert_eq!(cursor.value(), Ok(&3));
        cursor.move_next().unwrap();
        cursor.insert_after(5).unwrap();
        assert_eq!(cursor.value(), Ok(&4));
        assert!(list.iter().eq(&[1, 2, 3, 4, 5]));
        assert_links(&list);
    }

    #[test]
    fn insert_from_boundaries() {
        let mut list = list_of(&[2]);
        let mut cursor = list.cursor_mut();

        cursor.move_prev().unwrap();
        assert_eq!(
            cursor.insert_before(0),
            Err(IteratorError::OutOfRange(Boundary::Start))
        );
        cursor.insert_after(1).unwrap();
        assert!(cursor.is_past_start());

        cursor.move_next().unwrap();
        assert_eq!(cursor.value(), Ok(&1));
        cursor.move_next().unwrap();
        cursor.move_next().unwrap();
        assert!(cursor.is_past_end());
        assert_eq!(
            cursor.insert_after(9),
            Err(IteratorError::OutOfRange(Boundary::End))
        );
        cursor.insert_before(3).unwrap();
        assert!(cursor.is_past_end());
        cursor.move_prev().unwrap();
        assert_eq!(cursor.value(), Ok(&3));

        assert!(list.iter().eq(&[1, 2, 3]));
        assert_links(&list);
    }

    #[test]
    fn failed_insert_keeps_cursor_and_list() {
        let mut list = list_of(&[1, 2, 3]);
        let mut cursor = list.cursor_mut();
        cursor.move_next().unwrap();
        let bookmark = cursor.bookmark();

        let (before, after) =
            with_failing_allocation(|| (cursor.insert_before(9), cursor.insert_after(9)));
        assert!(matches!(before, Err(IteratorError::Alloc(_))));
        assert!(matches!(after, Err(IteratorError::Alloc(_))));
        assert_eq!(cursor.value(), Ok(&2));
        assert_eq!(cursor.bookmark(), bookmark);

        cursor.move_prev().unwrap();
        cursor.move_prev().unwrap();
        assert!(cursor.is_past_start());
        let at_start = cursor.bookmark();
        let result = with_failing_allocation(|| cursor.insert_after(0));
        assert!(matches!(result, Err(IteratorError::Alloc(_))));
        assert_eq!(cursor.bookmark(), at_start);

        assert!(list.iter().eq(&[1, 2, 3]));
        assert_links(&list);
        assert_eq!(list.resume(bookmark).unwrap().value(), Ok(&2));
    }

    #[test]
    fn remove_moves_forward_or_backward() {
        let mut list = list_of(&[1, 2, 3, 4, 5]);
        let mut cursor = list.cursor_mut();
        cursor.move_next().unwrap();
        cursor.move_next().unwrap();

        assert_eq!(cursor.remove(true), Ok(3));
        assert_eq!(cursor.value(), Ok(&4));
        assert_eq!(cursor.remove(false), Ok(4));
        assert_eq!(cursor.value(), Ok(&2));

        cursor.move_prev().unwrap();
        assert_eq!(cursor.remove(false), Ok(1));
        assert!(cursor.is_past_start());
        assert!(!cursor.is_past_end());
        assert_eq!(
            cursor.remove(true),
            Err(IteratorError::OutOfRange(Boundary::Start))
        );

        cursor.move_next().unwrap();
        cursor.move_next().unwrap();
        assert_eq!(cursor.value(), Ok(&5));
        assert_eq!(cursor.remove(true), Ok(5));
        assert!(cursor.is_past_end());
        assert_eq!(
            cursor.remove(true),
            Err(IteratorError::OutOfRange(Boundary::End))
        );

        assert!(list.iter().eq(&[2]));
        assert_links(&list);
    }

    #[test]
    fn removing_only_element_empties_cursor() {
        for move_forward in [true, false] {
            let mut list = list_of(&[42]);
            let mut cursor = list.cursor_mut();
            assert_eq!(cursor.remove(move_forward), Ok(42));
            assert!(cursor.is_past_start());
            assert!(cursor.is_past_end());
            assert!(cursor.list().is_empty());
            assert_eq!(
                cursor.value(),
                Err(IteratorError::OutOfRange(Boundary::Both))
            );
            assert_links(&list);
        }
    }

    #[test]
    fn value_mut_writes_through() {
        let mut list = list_of(&[1, 2, 3]);
        let mut cursor = list.cursor_mut();
        while !cursor.is_past_end() {
            *cursor.value_mut().unwrap() *= 10;
            cursor.move_next().unwrap();
        }
        assert_eq!(
            cursor.value_mut(),
            Err(IteratorError::OutOfRange(Boundary::End))
        );
        assert!(list.iter().eq(&[10, 20, 30]));
    }

    #[test]
    fn as_cursor_shares_position() {
        let mut list = list_of(&[1, 2, 3]);
        let mut cursor = list.cursor_mut();
        cursor.move_next().unwrap();
        let mut view = cursor.as_cursor();
        assert_eq!(view.value(), Ok(&2));
        view.move_next().unwrap();
        assert_eq!(view.value(), Ok(&3));
        assert_eq!(cursor.value(), Ok(&2));
    }

    #[test]
    fn bookmark_resumes_unchanged_list() {
        let mut list = list_of(&[1, 2, 3]);
        let mut cursor = list.cursor();
        cursor.move_next().unwrap();
        let bookmark = cursor.bookmark();

        let resumed = list.resume(bookmark).unwrap();
        assert_eq!(resumed.value(), Ok(&2));

        let mut cursor = list.resume_mut(bookmark).unwrap();
        cursor.remove(true).unwrap();
        // the cursor that mutated the list stays valid
        let bookmark = cursor.bookmark();
        assert_eq!(list.resume(bookmark).unwrap().value(), Ok(&3));
    }

    #[test]
    fn bookmark_goes_stale_after_mutation() {
        let mut list = list_of(&[1, 2, 3]);
        let mut cursor = list.cursor();
        cursor.move_next().unwrap();
        let bookmark = cursor.bookmark();

        list.pop_front().unwrap();
        assert!(matches!(
            list.resume(bookmark),
            Err(IteratorError::Stale { .. })
        ));
        assert!(matches!(
            list.resume_mut(bookmark),
            Err(IteratorError::Stale { .. })
        ));

        let bookmark = list.cursor().bookmark();
        list.push_back(4).unwrap();
        assert!(list.resume(bookmark).is_err());
    }

    #[test]
    fn bookmark_rejects_other_list() {
        let list = list_of(&[1, 2, 3]);
        let copy = list.clone();
        let bookmark = list.cursor().bookmark();
        assert!(matches!(
            copy.resume(bookmark),
            Err(IteratorError::ForeignList)
        ));
    }

    #[test]
    fn move_invalidates_bookmarks_on_both_lists() {
        let mut a = list_of(&[1]);
        let mut b = list_of(&[2]);
        let mark_a = a.cursor().bookmark();
        let mark_b = b.cursor().bookmark();
        a.move_from(&mut b);
        assert!(a.resume(mark_a).is_err());
        assert!(b.resume(mark_b).is_err());
        assert_eq!(a.cursor().value(), Ok(&2));
        assert_eq!(b.cursor().value(), Ok(&1));
    }

    #[test]
    fn cursor_edits_match_model() {
        // mirror every cursor edit on a Vec and compare after each step
        let mut list = list_of(&[0]);
        let mut model = vec![0];
        let mut at = 0usize;
        let mut cursor = list.cursor_mut();
        for step in 1..200 {
            match step % 5 {
                0 | 1 => {
                    cursor.insert_after(step).unwrap();
                    model.insert(at + 1, step);
                }
                2 => {
                    cursor.insert_before(step).unwrap();
                    model.insert(at, step);
                    at += 1;
                }
                3 => {
                    if cursor.move_next().is_ok() && !cursor.is_past_end() {
                        at += 1;
                    } else {
                        cursor.move_prev().unwrap();
                    }
                }
                _ => {
                    if model.len() > 1 {
                        assert_eq!(cursor.remove(false), Ok(model.remove(at)));
                        if cursor.is_past_start() {
                            cursor.move_next().unwrap();
                        } else {
                            at -= 1;
                        }
                    }
                }
            }
            assert_eq!(cursor.value(), Ok(&model[at]));
            assert!(cursor.list().iter().eq(model.iter()));
        }
        assert_links(&list);
    }
}
