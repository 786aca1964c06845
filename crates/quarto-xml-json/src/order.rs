//! Sibling order bookkeeping.
//!
//! JSON objects have no ordered list of differently-named children, so each
//! child node carries an order index that is dense and scoped to its parent.
//! [`OrderCounter`] hands those indices out while a parent is being built, and
//! [`arrange`] puts children back in document order when writing XML.

use crate::Node;

/// Transient per-parent counter.
///
/// It lives in the builder's frame next to the parent node, never inside the
/// node itself, and is dropped when the parent is closed.
#[derive(Debug, Default)]
pub struct OrderCounter {
    last: Option<u64>,
}

impl OrderCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next order index to `child`, which is about to be attached to `parent`.
    ///
    /// The first call for a parent starts counting at zero and back-fills every
    /// child already attached to it, in storage order, before numbering `child`.
    pub fn annotate(&mut self, parent: &mut Node, child: &mut Node) {
        let last = match self.last {
            Some(last) => last,
            None => {
                let mut count = 0;
                for existing in parent.child_nodes_mut() {
                    count += 1;
                    existing.order = Some(count);
                }
                count
            }
        } + 1;
        self.last = Some(last);
        child.order = Some(last);
    }
}

/// Restore document order for a list of children.
///
/// Children without an order index keep their relative order and are laid
/// out first. Children with one are then inserted in ascending index order at
/// position `index - 1`, clamped to the current length. Equal indices are
/// inserted in incoming order, so the later one ends up in front.
pub fn arrange<T>(items: Vec<T>, order_of: impl Fn(&T) -> Option<u64>) -> Vec<T> {
    let mut arranged = Vec::with_capacity(items.len());
    let mut ordered = Vec::new();

    for item in items {
        match order_of(&item) {
            Some(order) => ordered.push((order, item)),
            None => arranged.push(item),
        }
    }

    ordered.sort_by_key(|(order, _)| *order);

    for (order, item) in ordered {
        let index = usize::try_from(order.saturating_sub(1))
            .unwrap_or(usize::MAX)
            .min(arranged.len());
        arranged.insert(index, item);
    }

    arranged
}
