//! Scripted transport and recording scheduler for testing.
//!
//! [`MockTransport`] plays back one scripted session per connect attempt.
//! [`RecordingScheduler`] returns immediately and remembers every delay.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crate::scheduler::Scheduler;
use crate::transport::{Channel, ChannelError, Transport};

/// Outcome of one scripted connect attempt.
#[derive(Clone, Debug)]
enum Session {
    /// Connect fails.
    Refused,
    /// Connect succeeds, the messages are delivered, then the channel closes.
    Open {
        messages: Vec<String>,
        send_fails: bool,
    },
}

/// Transport that plays back scripted sessions in order.
///
/// Once the script is exhausted every connect attempt is refused.
///
/// # Example
///
/// ```ignore
/// let transport = MockTransport::new()
///     .with_refused(2)
///     .with_session(["build-1"])
///     .with_session(["build-1", "build-2"]);
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    script: VecDeque<Session>,
    connected_urls: Vec<String>,
    sent: Rc<RefCell<Vec<String>>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse the next `count` connect attempts.
    #[must_use]
    pub fn with_refused(mut self, count: usize) -> Self {
        self.script.extend(std::iter::repeat_n(Session::Refused, count));
        self
    }

    /// Open a channel that delivers `messages` and then closes.
    #[must_use]
    pub fn with_session<I, S>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script.push_back(Session::Open {
            messages: messages.into_iter().map(Into::into).collect(),
            send_fails: false,
        });
        self
    }

    /// Open a channel on which sending fails.
    #[must_use]
    pub fn with_broken_send(mut self) -> Self {
        self.script.push_back(Session::Open {
            messages: Vec::new(),
            send_fails: true,
        });
        self
    }

    /// Number of connect attempts so far, refused ones included.
    #[must_use]
    pub fn connect_count(&self) -> usize {
        self.connected_urls.len()
    }

    /// URLs of all connect attempts, in order.
    #[must_use]
    pub fn connected_urls(&self) -> &[String] {
        &self.connected_urls
    }

    /// Messages sent on any channel, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }
}

impl Transport for MockTransport {
    type Channel = MockChannel;

    async fn connect(&mut self, url: &str) -> Result<MockChannel, ChannelError> {
        self.connected_urls.push(url.to_owned());
        match self.script.pop_front() {
            Some(Session::Open {
                messages,
                send_fails,
            }) => Ok(MockChannel {
                messages: messages.into(),
                send_fails,
                sent: Rc::clone(&self.sent),
            }),
            Some(Session::Refused) | None => Err(ChannelError::Connect {
                url: url.to_owned(),
                message: "connection refused".to_owned(),
            }),
        }
    }
}

/// Channel produced by [`MockTransport`].
#[derive(Debug)]
pub struct MockChannel {
    messages: VecDeque<String>,
    send_fails: bool,
    sent: Rc<RefCell<Vec<String>>>,
}

impl Channel for MockChannel {
    async fn send(&mut self, text: &str) -> Result<(), ChannelError> {
        if self.send_fails {
            return Err(ChannelError::Send("broken pipe".to_owned()));
        }
        self.sent.borrow_mut().push(text.to_owned());
        Ok(())
    }

    async fn next_message(&mut self) -> Option<String> {
        self.messages.pop_front()
    }
}

/// Scheduler that records delays instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    delays: Vec<Duration>,
}

impl RecordingScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delay requested so far, in order.
    #[must_use]
    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }
}

impl Scheduler for RecordingScheduler {
    async fn sleep(&mut self, delay: Duration) {
        self.delays.push(delay);
    }
}
