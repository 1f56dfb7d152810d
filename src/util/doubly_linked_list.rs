use std::collections::HashMap;

use crate::util::Address;

#[derive(Debug)]
struct Node<T> {
    prev: Option<Address>,
    next: Option<Address>,
    payload: T,
}

/// A doubly linked list of cells keyed by their start address. Nodes are kept out of line, so
/// the list never touches heap memory. Insertion, removal and lookup of the successor are O(1),
/// and removing the current cell during a walk is fine as long as the walker saved its
/// successor first.
#[derive(Debug)]
pub struct DoublyLinkedList<T> {
    nodes: HashMap<Address, Node<T>>,
    head: Option<Address>,
}

impl<T> DoublyLinkedList<T> {
    pub fn new() -> Self {
        DoublyLinkedList {
            nodes: HashMap::new(),
            head: None,
        }
    }

    /// Insert a cell at the head of the list.
    pub fn add(&mut self, cell: Address, payload: T) {
        debug_assert!(!self.nodes.contains_key(&cell), "{} is already in the list", cell);
        let old_head = self.head;
        if let Some(h) = old_head {
            if let Some(node) = self.nodes.get_mut(&h) {
                node.prev = Some(cell);
            }
        }
        self.nodes.insert(
            cell,
            Node {
                prev: None,
                next: old_head,
                payload,
            },
        );
        self.head = Some(cell);
    }

    /// Unlink a cell. Returns its payload, or `None` if the cell is not in the list.
    pub fn remove(&mut self, cell: Address) -> Option<T> {
        let node = self.nodes.remove(&cell)?;
        match node.prev {
            Some(p) => {
                if let Some(prev) = self.nodes.get_mut(&p) {
                    prev.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        if let Some(n) = node.next {
            if let Some(next) = self.nodes.get_mut(&n) {
                next.prev = node.prev;
            }
        }
        Some(node.payload)
    }

    pub fn head(&self) -> Option<Address> {
        self.head
    }

    pub fn next(&self, cell: Address) -> Option<Address> {
        self.nodes.get(&cell).and_then(|n| n.next)
    }

    pub fn get(&self, cell: Address) -> Option<&T> {
        self.nodes.get(&cell).map(|n| &n.payload)
    }

    pub fn contains(&self, cell: Address) -> bool {
        self.nodes.contains_key(&cell)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Cells from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = (Address, &T)> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let cell = cursor?;
            let node = self.nodes.get(&cell)?;
            cursor = node.next;
            Some((cell, &node.payload))
        })
    }
}

impl<T> Default for DoublyLinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}
