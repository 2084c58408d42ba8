use crate::{
    base::{DoublyLinkedList, IntoIter, Iter},
    cursor::Cursor,
    error::{AllocationError, EmptyError},
};

/// A first-in-first-out queue backed by a [`DoublyLinkedList`].
///
/// Values enter at the tail and leave from the head. Apart from that, only read-only
/// access is offered: the length, the oldest value, and forward traversal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Queue<T> {
    list: DoublyLinkedList<T>,
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self {
            list: DoublyLinkedList::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            list: DoublyLinkedList::with_capacity(capacity),
        }
    }

    /// Appends `value` behind every value already queued.
    pub fn enqueue(&mut self, value: T) -> Result<(), AllocationError> {
        self.list.push_back(value)
    }

    /// Removes and returns the oldest value.
    pub fn dequeue(&mut self) -> Result<T, EmptyError> {
        self.list.pop_front()
    }

    /// The value [`dequeue`](Self::dequeue) would return next.
    pub fn front(&self) -> Result<&T, EmptyError> {
        self.list.front()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }

    /// Exchanges the contents of two queues; see [`DoublyLinkedList::move_from`].
    pub fn move_from(&mut self, source: &mut Self) {
        self.list.move_from(&mut source.list);
    }

    /// Oldest to newest.
    pub fn iter(&self) -> Iter<'_, T> {
        self.list.iter()
    }

    /// A read-only cursor on the oldest value.
    pub fn cursor(&self) -> Cursor<'_, T> {
        self.list.cursor()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for Queue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.list.extend(iter);
    }
}

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            list: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for Queue<T> {
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        self.list.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Queue<T> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        base::tests::with_failing_allocation,
        error::{Boundary, IteratorError},
    };

    #[test]
    fn fifo_order() {
        let mut queue = Queue::new();
        queue.enqueue(1).unwrap();
        queue.enqueue(2).unwrap();
        queue.enqueue(3).unwrap();

        for expected in 1..=3 {
            assert_eq!(queue.front(), Ok(&expected));
            assert_eq!(queue.dequeue(), Ok(expected));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn empty_queue() {
        let mut queue = Queue::<u64>::new();
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.front(), Err(EmptyError));
        assert_eq!(queue.dequeue(), Err(EmptyError));
        assert_eq!(
            queue.cursor().value(),
            Err(IteratorError::OutOfRange(Boundary::Both))
        );
    }

    #[test]
    fn service_line() {
        // arrival timestamps queued per line, served oldest first
        let mut line: Queue<u32> = Queue::with_capacity(4);
        for arrival in [3, 5, 8] {
            line.enqueue(arrival).unwrap();
        }
        assert_eq!(line.len(), 3);

        let now = 10;
        let waited = now - line.dequeue().unwrap();
        assert_eq!(waited, 7);
        assert_eq!(line.front(), Ok(&5));
        assert_eq!(line.len(), 2);

        line.enqueue(11).unwrap();
        assert!(line.iter().eq(&[5, 8, 11]));

        let mut cursor = line.cursor();
        cursor.move_next().unwrap();
        assert_eq!(cursor.value(), Ok(&8));
    }

    #[test]
    fn failed_enqueue_keeps_line() {
        let mut queue: Queue<_> = [4, 5].into_iter().collect();
        assert!(with_failing_allocation(|| queue.enqueue(6)).is_err());
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.front(), Ok(&4));
        assert!(queue.iter().eq(&[4, 5]));

        queue.enqueue(6).unwrap();
        assert!(queue.iter().eq(&[4, 5, 6]));
    }

    #[test]
    fn copy_and_move() {
        let mut queue: Queue<_> = ["a", "b"].into_iter().collect();
        let copy = queue.clone();
        queue.dequeue().unwrap();
        assert_eq!(copy.len(), 2);
        assert_eq!(copy.front(), Ok(&"a"));

        let mut other: Queue<_> = ["x"].into_iter().collect();
        other.move_from(&mut queue);
        assert!(other.iter().eq(&["b"]));
        assert!(queue.iter().eq(&["x"]));

        queue.extend(["y", "z"]);
        assert!(queue.into_iter().eq(["x", "y", "z"]));
    }
}
