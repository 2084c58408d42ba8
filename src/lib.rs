//! A doubly linked list with position-aware cursors, and a FIFO queue built on it.
//!
//! Nodes are kept in an arena of slots owned by the list and linked by slot index, so
//! insertion and removal at the ends or under a cursor are O(1) without raw pointers.
//! Every fallible operation returns an explicit error: [`EmptyError`] when an element
//! is required but there is none, [`IteratorError`] when a cursor is on a boundary
//! that forbids the operation, and [`AllocationError`] when a node cannot be
//! allocated (the container is then left unchanged).
//!
//! ```
//! use doubly_linked_list::{DoublyLinkedList, Queue};
//!
//! let mut list = DoublyLinkedList::new();
//! list.push_back(20).unwrap();
//! list.push_front(10).unwrap();
//!
//! let mut cursor = list.cursor_mut();
//! cursor.insert_after(15).unwrap();
//! cursor.move_next().unwrap();
//! assert_eq!(cursor.value(), Ok(&15));
//! assert_eq!(cursor.remove(true), Ok(15));
//! assert_eq!(cursor.value(), Ok(&20));
//!
//! let mut line = Queue::new();
//! line.enqueue(3u64).unwrap();
//! line.enqueue(7).unwrap();
//! assert_eq!(line.front(), Ok(&3));
//! assert_eq!(line.dequeue(), Ok(3));
//! assert_eq!(line.len(), 1);
//! ```
//!
//! Cursors borrow their list. To remember a position across a mutation, take a
//! [`Bookmark`]; resuming it on a list that has changed since is reported as
//! [`IteratorError::Stale`]:
//!
//! ```
//! use doubly_linked_list::{DoublyLinkedList, IteratorError};
//!
//! let mut list: DoublyLinkedList<_> = [1, 2, 3].into();
//! let bookmark = list.cursor().bookmark();
//! assert_eq!(list.resume(bookmark).unwrap().value(), Ok(&1));
//!
//! list.pop_front().unwrap();
//! assert!(matches!(list.resume(bookmark), Err(IteratorError::Stale { .. })));
//! ```

mod base;
mod cursor;
mod error;
mod queue;

pub use base::{DoublyLinkedList, IntoIter, Iter, IterMut};
pub use cursor::{Bookmark, Cursor, CursorMut};
pub use error::{AllocationError, Boundary, EmptyError, IteratorError};
pub use queue::Queue;
