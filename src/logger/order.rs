//! Delivery ordering for cut batches.
//!
//! Batches are numbered under the buffer lock when they are cut and handed
//! to the sinks strictly in that order, each on the thread that cut it. No
//! buffer lock is held while a thread waits for its turn.
//!
//! A thread that is delivering for a logger is marked; entries that thread
//! logs from inside a sink are held in the buffer instead of being cut, and
//! the marked thread drains them once its own delivery has finished.

use std::cell::RefCell;
use std::sync::{Condvar, Mutex, PoisonError};

thread_local! {
    static DELIVERING: RefCell<Vec<usize>> = RefCell::new(Vec::new());
}

#[derive(Debug, Default)]
pub(crate) struct DeliveryOrder {
    next: Mutex<u64>,
    advanced: Condvar,
}

impl DeliveryOrder {
    /// Block until `ticket` is the next batch to deliver.
    ///
    /// The returned guard marks the current thread as delivering for
    /// `owner` and passes the turn on when dropped, including on unwind.
    pub(crate) fn wait_turn(&self, owner: usize, ticket: u64) -> Turn<'_> {
        let mut next = self.next.lock().unwrap_or_else(PoisonError::into_inner);
        while *next != ticket {
            next = self
                .advanced
                .wait(next)
                .unwrap_or_else(PoisonError::into_inner);
        }
        drop(next);

        DELIVERING.with(|d| d.borrow_mut().push(owner));
        Turn { order: self, owner }
    }
}

/// Whether the current thread is inside a delivery for `owner`.
pub(crate) fn is_delivering(owner: usize) -> bool {
    DELIVERING.with(|d| d.borrow().contains(&owner))
}

pub(crate) struct Turn<'a> {
    order: &'a DeliveryOrder,
    owner: usize,
}

impl Drop for Turn<'_> {
    fn drop(&mut self) {
        DELIVERING.with(|d| {
            let mut owners = d.borrow_mut();
            if let Some(pos) = owners.iter().rposition(|o| *o == self.owner) {
                owners.remove(pos);
            }
        });

        *self.order.next.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        self.order.advanced.notify_all();
    }
}
