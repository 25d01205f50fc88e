use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::commands;
use crate::context::Context;
use crate::frame::Frame;
use crate::transaction::Transaction;

/// How many push frames (pub/sub messages) may wait for the connection to write them out.
pub const PUSH_CAPACITY: usize = 32;

/// Per-connection state: the open transaction, if any, and the channel subscriptions.
///
/// Every request of a connection goes through [`Session::handle`]. While a transaction is open,
/// requests other than `MULTI`, `EXEC` and `DISCARD` are queued instead of executed.
pub struct Session {
    pub id: Uuid,
    ctx: Context,
    transaction: Option<Transaction>,
    subscriptions: HashMap<String, Uuid>,
    pushes: mpsc::Sender<Frame>,
}

impl Session {
    pub fn new(id: Uuid, ctx: Context, pushes: mpsc::Sender<Frame>) -> Session {
        Session {
            id,
            ctx,
            transaction: None,
            subscriptions: HashMap::new(),
            pushes,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn handle(&mut self, request: Frame) -> Frame {
        if let Some(transaction) = self.transaction.as_mut() {
            if !commands::controls_transaction(&request) {
                transaction.queue(request);
                return Frame::Simple("QUEUED".to_string());
            }
        }

        commands::dispatch(self, request)
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    pub fn begin_transaction(&mut self) -> Frame {
        if self.transaction.is_some() {
            return Frame::Error("ERR MULTI calls can't be nested".to_string());
        }

        let generation = self.ctx.store.read().generation();
        self.transaction = Some(Transaction::new(generation));
        Frame::ok()
    }

    pub fn discard_transaction(&mut self) -> Frame {
        match self.transaction.take() {
            Some(transaction) => {
                debug!(queued = transaction.len(), "transaction discarded");
                Frame::ok()
            }
            None => Frame::Error("ERR DISCARD without MULTI".to_string()),
        }
    }

    /// Replays the queued requests through the dispatcher. The first error reply stops the replay
    /// and is returned; effects of the requests before it stay.
    pub fn exec_transaction(&mut self) -> Frame {
        let Some(transaction) = self.transaction.take() else {
            return Frame::Error("ERR EXEC without MULTI".to_string());
        };

        let generation = self.ctx.store.read().generation();
        if transaction.is_cancelled(generation) {
            return Frame::Error(
                "EXECABORT Transaction discarded because the dataset was flushed".to_string(),
            );
        }

        debug!(queued = transaction.len(), "executing transaction");
        for request in transaction.into_requests() {
            let reply = commands::dispatch(self, request);
            if reply.is_error() {
                return reply;
            }
        }

        Frame::ok()
    }

    /// Subscribes to `channel` and returns the number of channels this session listens to.
    ///
    /// Subscribing twice to the same channel is a no-op.
    pub fn subscribe(&mut self, channel: String) -> usize {
        if self.subscriptions.contains_key(&channel) {
            return self.subscriptions.len();
        }

        let mut subscriber = self.ctx.broker.subscribe(&channel);
        self.subscriptions.insert(channel.clone(), subscriber.id);

        let pushes = self.pushes.clone();
        tokio::spawn(async move {
            while let Some(message) = subscriber.receiver.recv().await {
                let frame = Frame::Array(vec![
                    Frame::bulk("message"),
                    Frame::bulk(channel.clone()),
                    Frame::Bulk(message),
                ]);
                if pushes.send(frame).await.is_err() {
                    break;
                }
            }
            debug!(channel, "delivery task finished");
        });

        self.subscriptions.len()
    }

    /// Unsubscribes from `channels`, or from every channel when none is given. Returns each
    /// channel together with the number of subscriptions left after leaving it.
    pub fn unsubscribe(&mut self, channels: Vec<String>) -> Vec<(String, usize)> {
        let channels = if channels.is_empty() {
            let mut all: Vec<String> = self.subscriptions.keys().cloned().collect();
            all.sort();
            all
        } else {
            channels
        };

        channels
            .into_iter()
            .map(|channel| {
                if let Some(id) = self.subscriptions.remove(&channel) {
                    self.ctx.broker.unsubscribe(&channel, id);
                }
                let remaining = self.subscriptions.len();
                (channel, remaining)
            })
            .collect()
    }

    pub fn publish(&self, channel: &str, message: Bytes) -> usize {
        self.ctx.broker.publish(channel, message)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        for (channel, id) in self.subscriptions.drain() {
            self.ctx.broker.unsubscribe(&channel, id);
        }
    }
}

#[cfg(test)]
impl Session {
    /// A session on a fresh context whose push frames are returned alongside it.
    pub(crate) fn for_tests() -> (Session, mpsc::Receiver<Frame>) {
        let snapshot = std::env::temp_dir().join(format!("kvdis-{}.kvdis", Uuid::new_v4()));
        let (pushes, receiver) = mpsc::channel(PUSH_CAPACITY);
        let session = Session::new(Uuid::new_v4(), Context::new(snapshot, 6379), pushes);
        (session, receiver)
    }
}
