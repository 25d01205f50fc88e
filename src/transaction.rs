use crate::frame::Frame;

/// Requests queued by a client between `MULTI` and `EXEC`.
///
/// The transaction remembers the store generation it was opened at. A `FLUSHALL` in between bumps
/// the generation, which cancels the transaction.
#[derive(Debug)]
pub struct Transaction {
    queue: Vec<Frame>,
    generation: u64,
}

impl Transaction {
    pub fn new(generation: u64) -> Transaction {
        Transaction {
            queue: Vec::new(),
            generation,
        }
    }

    pub fn queue(&mut self, request: Frame) {
        self.queue.push(request);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_cancelled(&self, generation: u64) -> bool {
        self.generation != generation
    }

    /// The queued requests, in the order they were received.
    pub fn into_requests(self) -> Vec<Frame> {
        self.queue
    }
}
