use async_trait::async_trait;

use crate::prelude::*;

/// Publish side of a pub/sub transport.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Whether the transport is believed to be live right now.
    fn is_connected(&self) -> bool;

    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result;
}

/// Channel that only logs the messages, used for dry runs.
pub struct LogChannel;

#[async_trait]
impl Channel for LogChannel {
    fn is_connected(&self) -> bool {
        true
    }

    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result {
        info!(topic, payload = %String::from_utf8_lossy(&payload), "dry run");
        Ok(())
    }
}

/// Channel that keeps the messages in memory.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingChannel {
    pub is_connected: std::sync::atomic::AtomicBool,

    /// Never complete a publish.
    pub is_stalled: bool,

    pub(crate) messages: std::sync::Mutex<Vec<(String, Vec<u8>)>>,
}

#[cfg(test)]
impl RecordingChannel {
    pub fn connected() -> Self {
        Self { is_connected: std::sync::atomic::AtomicBool::new(true), ..Self::default() }
    }

    pub fn messages(&self) -> Vec<(String, Vec<u8>)> {
        self.messages.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Channel for RecordingChannel {
    fn is_connected(&self) -> bool {
        self.is_connected.load(std::sync::atomic::Ordering::Relaxed)
    }

    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result {
        if self.is_stalled {
            std::future::pending::<()>().await;
        }
        self.messages.lock().unwrap().push((topic.to_owned(), payload));
        Ok(())
    }
}
