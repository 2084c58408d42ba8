use std::{
    cmp::Ordering,
    fmt::{self, Debug},
    hash::{Hash, Hasher},
    iter::FusedIterator,
    marker::PhantomData,
    mem,
    ptr::NonNull,
    sync::atomic::{self, AtomicU64},
};

use log::trace;

use crate::error::{AllocationError, EmptyError};

/// A doubly linked list whose nodes live in an arena of slots owned by the list.
///
/// Links between nodes are slot indices rather than pointers. The `prev` link is only
/// ever used for reverse traversal; a node is owned by the slot it occupies.
pub struct DoublyLinkedList<T> {
    slots: Vec<Slot<T>>,
    free: Link,
    head: Link,
    tail: Link,
    len: usize,
    id: u64,
    generation: u64,
}

pub(crate) type Link = Option<usize>;

#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    pub(crate) prev: Link,
    pub(crate) next: Link,
    pub(crate) value: T,
}

#[derive(Debug, Clone)]
enum Slot<T> {
    Occupied(Node<T>),
    Vacant { next_free: Link },
}

fn next_list_id() -> u64 {
    static NEXT_LIST_ID: AtomicU64 = AtomicU64::new(0);
    NEXT_LIST_ID.fetch_add(1, atomic::Ordering::Relaxed)
}

impl<T> DoublyLinkedList<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for at least `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: None,
            head: None,
            tail: None,
            len: 0,
            id: next_list_id(),
            generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        debug_assert_eq!(self.head.is_none(), self.len == 0);
        debug_assert_eq!(self.tail.is_none(), self.len == 0);
        self.len == 0
    }

    /// Number of nodes the list can hold without allocating.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Reserves room for at least `additional` more nodes.
    ///
    /// On failure the list is left untouched.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), AllocationError> {
        #[cfg(test)]
        if tests::allocation_fails() {
            // no allocator can satisfy this
            self.slots.try_reserve(usize::MAX)?;
        }
        let vacant = self.slots.len() - self.len;
        if additional > vacant {
            let before = self.slots.capacity();
            self.slots.try_reserve(additional - vacant)?;
            if self.slots.capacity() != before {
                trace!(
                    "list {}: slot storage grew from {} to {}",
                    self.id,
                    before,
                    self.slots.capacity()
                );
            }
        }
        Ok(())
    }

    /// Adds `value` before the current first element.
    ///
    /// Either the list gains one node or, if the node cannot be allocated, it is left
    /// exactly as it was.
    pub fn push_front(&mut self, value: T) -> Result<(), AllocationError> {
        self.try_link(None, self.head, value).map(drop)
    }

    /// Adds `value` after the current last element. All-or-nothing, like [`push_front`].
    ///
    /// [`push_front`]: Self::push_front
    pub fn push_back(&mut self, value: T) -> Result<(), AllocationError> {
        self.try_link(self.tail, None, value).map(drop)
    }

    pub fn pop_front(&mut self) -> Result<T, EmptyError> {
        let head = self.head.ok_or(EmptyError)?;
        Ok(self.unlink(head).value)
    }

    pub fn pop_back(&mut self) -> Result<T, EmptyError> {
        let tail = self.tail.ok_or(EmptyError)?;
        Ok(self.unlink(tail).value)
    }

    pub fn front(&self) -> Result<&T, EmptyError> {
        let head = self.head.ok_or(EmptyError)?;
        Ok(&self.node(head).value)
    }

    pub fn back(&self) -> Result<&T, EmptyError> {
        let tail = self.tail.ok_or(EmptyError)?;
        Ok(&self.node(tail).value)
    }

    pub fn front_mut(&mut self) -> Result<&mut T, EmptyError> {
        let head = self.head.ok_or(EmptyError)?;
        Ok(&mut self.node_mut(head).value)
    }

    pub fn back_mut(&mut self) -> Result<&mut T, EmptyError> {
        let tail = self.tail.ok_or(EmptyError)?;
        Ok(&mut self.node_mut(tail).value)
    }

    pub fn contains(&self, x: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|value| value == x)
    }

    /// Drops every element. The slot storage is kept for reuse.
    pub fn clear(&mut self) {
        trace!("list {}: clearing {} nodes", self.id, self.len);
        self.slots.clear();
        self.free = None;
        self.head = None;
        self.tail = None;
        self.len = 0;
        self.bump_generation();
    }

    /// Exchanges the whole contents of `self` and `source`.
    ///
    /// `source` ends up holding what `self` held before the call; it is not drained.
    /// Both lists count this as a structural change, so bookmarks taken on either of
    /// them before the call are stale afterwards.
    pub fn move_from(&mut self, source: &mut Self) {
        trace!(
            "list {}: swapping {} nodes with list {} ({} nodes)",
            self.id,
            self.len,
            source.id,
            source.len
        );
        mem::swap(&mut self.slots, &mut source.slots);
        mem::swap(&mut self.free, &mut source.free);
        mem::swap(&mut self.head, &mut source.head);
        mem::swap(&mut self.tail, &mut source.tail);
        mem::swap(&mut self.len, &mut source.len);
        self.bump_generation();
        source.bump_generation();
    }

    /// Deep copy that reports allocation failure instead of aborting.
    pub fn try_clone(&self) -> Result<Self, AllocationError>
    where
        T: Clone,
    {
        let mut list = Self::new();
        list.try_reserve(self.len)?;
        for value in self {
            list.link(list.tail, None, value.clone());
        }
        trace!("list {}: deep copied into list {}", self.id, list.id);
        Ok(list)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            head: self.head,
            tail: self.tail,
            len: self.len,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            head: self.head,
            tail: self.tail,
            len: self.len,
            slots: NonNull::from(&mut self.slots[..]).cast(),
            _marker: PhantomData,
        }
    }
}

// Link-level operations shared with the cursors.
impl<T> DoublyLinkedList<T> {
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn head(&self) -> Link {
        self.head
    }

    pub(crate) fn tail(&self) -> Link {
        self.tail
    }

    pub(crate) fn node(&self, index: usize) -> &Node<T> {
        match &self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("link to vacant slot {index}"),
        }
    }

    pub(crate) fn node_mut(&mut self, index: usize) -> &mut Node<T> {
        match &mut self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("link to vacant slot {index}"),
        }
    }

    /// Splices a new node between `prev` and `next`, which must be adjacent
    /// (or `None` for the respective end of the list).
    pub(crate) fn try_link(
        &mut self,
        prev: Link,
        next: Link,
        value: T,
    ) -> Result<usize, AllocationError> {
        self.try_reserve(1)?;
        Ok(self.link(prev, next, value))
    }

    fn link(&mut self, prev: Link, next: Link, value: T) -> usize {
        debug_assert_eq!(prev.map_or(self.head, |p| self.node(p).next), next);
        debug_assert_eq!(next.map_or(self.tail, |n| self.node(n).prev), prev);

        let index = self.occupy(Node { prev, next, value });
        match prev {
            Some(prev) => self.node_mut(prev).next = Some(index),
            None => self.head = Some(index),
        }
        match next {
            Some(next) => self.node_mut(next).prev = Some(index),
            None => self.tail = Some(index),
        }
        self.len += 1;
        self.bump_generation();
        index
    }

    /// Detaches the node at `index`, joining its neighbours, and returns it with the
    /// links it had.
    pub(crate) fn unlink(&mut self, index: usize) -> Node<T> {
        let node = match mem::replace(
            &mut self.slots[index],
            Slot::Vacant {
                next_free: self.free,
            },
        ) {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("unlinking vacant slot {index}"),
        };
        self.free = Some(index);

        match node.prev {
            Some(prev) => self.node_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.node_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }
        self.len -= 1;
        if self.len == 0 {
            // only vacant slots are left
            self.slots.clear();
            self.free = None;
        }
        self.bump_generation();
        node
    }

    fn occupy(&mut self, node: Node<T>) -> usize {
        match self.free {
            Some(index) => {
                let slot = mem::replace(&mut self.slots[index], Slot::Occupied(node));
                match slot {
                    Slot::Vacant { next_free } => self.free = next_free,
                    Slot::Occupied(_) => unreachable!("free list points at occupied slot {index}"),
                }
                index
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                self.slots.len() - 1
            }
        }
    }

    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

impl<T> Default for DoublyLinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for DoublyLinkedList<T> {
    fn clone(&self) -> Self {
        let mut list = Self::with_capacity(self.len);
        list.extend(self.iter().cloned());
        trace!("list {}: deep copied into list {}", self.id, list.id);
        list
    }

    fn clone_from(&mut self, source: &Self) {
        self.clear();
        self.extend(source.iter().cloned());
    }
}

impl<T> Extend<T> for DoublyLinkedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.slots.reserve(lower.saturating_sub(self.slots.len() - self.len));
        for value in iter {
            self.link(self.tail, None, value);
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for DoublyLinkedList<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> FromIterator<T> for DoublyLinkedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T, const N: usize> From<[T; N]> for DoublyLinkedList<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T> IntoIterator for DoublyLinkedList<T> {
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

impl<'a, T> IntoIterator for &'a DoublyLinkedList<T> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DoublyLinkedList<T> {
    type IntoIter = IterMut<'a, T>;
    type Item = &'a mut T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

pub struct IntoIter<T> {
    list: DoublyLinkedList<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.list.pop_front().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len, Some(self.list.len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.list.pop_back().ok()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

pub struct Iter<'a, T> {
    list: &'a DoublyLinkedList<T>,
    head: Link,
    tail: Link,
    len: usize,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            list: self.list,
            head: self.head,
            tail: self.tail,
            len: self.len,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let node = self.list.node(self.head?);
        self.len -= 1;
        self.head = node.next;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let node = self.list.node(self.tail?);
        self.len -= 1;
        self.tail = node.prev;
        Some(&node.value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

pub struct IterMut<'a, T> {
    slots: NonNull<Slot<T>>,
    head: Link,
    tail: Link,
    len: usize,
    _marker: PhantomData<&'a mut DoublyLinkedList<T>>,
}

unsafe impl<T: Send> Send for IterMut<'_, T> {}
unsafe impl<T: Sync> Sync for IterMut<'_, T> {}

impl<'a, T> IterMut<'a, T> {
    /// # Safety
    /// * `index` is an occupied slot of the borrowed list that has not been yielded yet
    unsafe fn node_at(&mut self, index: usize) -> &'a mut Node<T> {
        match &mut *self.slots.as_ptr().add(index) {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("link to vacant slot {index}"),
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        // each index is visited at most once, since `len` stops the walk before the
        // front and back of the iterator cross
        let node = unsafe { self.node_at(self.head?) };
        self.len -= 1;
        self.head = node.next;
        Some(&mut node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let node = unsafe { self.node_at(self.tail?) };
        self.len -= 1;
        self.tail = node.prev;
        Some(&mut node.value)
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

impl<T: Debug> Debug for DoublyLinkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self).finish()
    }
}

impl<T: PartialEq> PartialEq for DoublyLinkedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for DoublyLinkedList<T> {}

impl<T: PartialOrd> PartialOrd for DoublyLinkedList<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for DoublyLinkedList<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash> Hash for DoublyLinkedList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for value in self {
            value.hash(state);
        }
    }
}
