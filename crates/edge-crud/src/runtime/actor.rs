//! Actor system utilities
//!
//! A service runs as a long-lived async task that owns its state and
//! processes commands received over a channel. Callers hold a cheap,
//! cloneable handle and get answers back through oneshot replies.

use std::fmt;
use tokio::sync::{mpsc, oneshot};

/// Trait for actor messages - all commands sent to actors must implement this
pub trait ActorMessage: Send + 'static {}

/// Generic actor handle that can send commands to an actor
pub struct ActorHandle<C: ActorMessage> {
    sender: mpsc::Sender<C>,
}

// Manual Clone implementation that doesn't require C: Clone
impl<C: ActorMessage> Clone for ActorHandle<C> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<C: ActorMessage> ActorHandle<C> {
    /// Create a new actor handle from a sender
    pub fn new(sender: mpsc::Sender<C>) -> Self {
        Self { sender }
    }

    /// Send a command to the actor
    pub async fn send(&self, cmd: C) -> ActorResult<()> {
        self.sender.send(cmd).await?;
        Ok(())
    }

    /// Send a command built around a fresh reply channel and wait for the answer
    pub async fn request<R, F>(&self, make: F) -> ActorResult<R>
    where
        R: Send + 'static,
        F: FnOnce(oneshot::Sender<R>) -> C,
    {
        let (tx, rx) = oneshot::channel();
        self.send(make(tx)).await?;
        Ok(rx.await?)
    }

    /// Check if the actor is still alive (channel not closed)
    pub fn is_alive(&self) -> bool {
        !self.sender.is_closed()
    }
}

impl<C: ActorMessage> fmt::Debug for ActorHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorHandle")
            .field("is_alive", &self.is_alive())
            .finish()
    }
}

/// Spawn an actor task and return its handle
pub fn spawn_actor<C, F, Fut>(buffer_size: usize, actor_fn: F) -> ActorHandle<C>
where
    C: ActorMessage,
    F: FnOnce(mpsc::Receiver<C>) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(buffer_size);
    tokio::spawn(actor_fn(rx));
    ActorHandle::new(tx)
}

/// Result type for actor operations
pub type ActorResult<T> = Result<T, ActorError>;

/// Errors that can occur in actor operations
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    #[error("Actor channel closed")]
    ChannelClosed,

    #[error("No reply from actor")]
    NoReply,
}

impl From<oneshot::error::RecvError> for ActorError {
    fn from(_: oneshot::error::RecvError) -> Self {
        ActorError::NoReply
    }
}

impl<T> From<mpsc::error::SendError<T>> for ActorError {
    fn from(_: mpsc::error::SendError<T>) -> Self {
        ActorError::ChannelClosed
    }
}
