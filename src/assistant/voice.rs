//! The voice session: frame protocol and ordered audio playback.
//!
//! The wire service streams 24 kHz mono 16-bit PCM, base64-encoded inside
//! JSON frames, in both directions. This module models those frames and
//! the one ordering contract voice mode has to keep: incoming audio chunks
//! play strictly in arrival order, one at a time, and closing the session
//! drops everything still queued instead of letting it play later.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::{sync::Notify, task::JoinHandle};

// ============================================================================
// FRAMES
// ============================================================================

/// A frame sent to the voice service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Open a voice session.
    StartApp,
    /// One chunk of captured microphone audio, base64-encoded PCM.
    Audio {
        /// The base64-encoded PCM payload.
        data: String,
    },
    /// Close the voice session.
    Stop,
}

/// A frame received from the voice service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// The service accepted the session.
    SessionStarted,
    /// One chunk of synthesized speech, base64-encoded PCM.
    Audio {
        /// The base64-encoded PCM payload.
        data: String,
    },
    /// A piece of recognized user speech.
    Transcript {
        /// The recognized text.
        text: String,
    },
    /// The user spoke over the assistant; stop playing queued speech.
    Interrupt,
    /// The service reported a problem.
    Error {
        /// The service's description of the problem.
        message: String,
    },
}

// ============================================================================
// PLAYBACK QUEUE
// ============================================================================

/// Something that can play one audio chunk to completion.
///
/// `play` must only return once the chunk has finished; the queue relies
/// on that to keep chunks from overlapping.
#[async_trait]
pub trait AudioSink: Send + 'static {
    /// Play one base64-encoded PCM chunk to completion.
    async fn play(&mut self, pcm_base64: String);
}

struct QueueShared {
    pending: Mutex<VecDeque<String>>,
    notify: Notify,
    closed: AtomicBool,
}

/// A FIFO of audio chunks drained by a single consumer task.
///
/// The consumer plays one chunk at a time, in arrival order, and picks up
/// the next only when the current one finishes. [PlaybackQueue::close]
/// synchronously clears everything pending, stops playback, and makes any
/// late enqueue a no-op.
pub struct PlaybackQueue {
    shared: Arc<QueueShared>,
    consumer: JoinHandle<()>,
}

impl PlaybackQueue {
    /// Start the queue with its consumer task draining into `sink`.
    pub fn start<S: AudioSink>(mut sink: S) -> Self {
        let shared = Arc::new(QueueShared {
            pending: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            closed: AtomicBool::new(false),
        });

        let consumer_shared = Arc::clone(&shared);
        let consumer = tokio::spawn(async move {
            loop {
                if consumer_shared.closed.load(Ordering::Acquire) {
                    break;
                }

                let chunk = consumer_shared.pending.lock().unwrap().pop_front();
                match chunk {
                    Some(chunk) => sink.play(chunk).await,
                    None => consumer_shared.notify.notified().await,
                }
            }
        });

        Self { shared, consumer }
    }

    /// Append a chunk to the queue.
    ///
    /// Returns `false` if the queue has been closed; the chunk is dropped,
    /// not played.
    pub fn enqueue(&self, pcm_base64: String) -> bool {
        if self.shared.closed.load(Ordering::Acquire) {
            return false;
        }

        self.shared.pending.lock().unwrap().push_back(pcm_base64);
        self.shared.notify.notify_one();
        true
    }

    /// Drop every chunk that has not started playing yet.
    ///
    /// The chunk currently in the sink finishes; this only empties the
    /// line behind it.
    pub fn clear_pending(&self) {
        self.shared.pending.lock().unwrap().clear();
    }

    /// How many chunks are waiting to play.
    pub fn pending_len(&self) -> usize {
        self.shared.pending.lock().unwrap().len()
    }

    /// Tear the queue down: clear pending chunks, stop the consumer (mid-
    /// chunk if necessary), and reject further enqueues.
    pub fn close(&self) {
        self.shared.closed.store(true, Ordering::Release);
        self.clear_pending();
        self.shared.notify.notify_one();
        self.consumer.abort();
    }

    /// Whether the queue has been closed.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}

impl Drop for PlaybackQueue {
    fn drop(&mut self) {
        self.close();
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// Where a voice session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceSessionState {
    /// `start_app` sent, waiting for the service to accept.
    Starting,
    /// The service accepted; audio and transcripts are flowing.
    Active,
    /// Torn down. Frames arriving now are dropped.
    Closed,
}

/// One voice conversation: the session state machine over incoming frames
/// and the playback queue they feed.
pub struct VoiceSession {
    state: VoiceSessionState,
    queue: PlaybackQueue,
    transcript: Vec<String>,
}

impl VoiceSession {
    /// Open a session playing into `sink`.
    pub fn start<S: AudioSink>(sink: S) -> Self {
        Self {
            state: VoiceSessionState::Starting,
            queue: PlaybackQueue::start(sink),
            transcript: Vec::new(),
        }
    }

    /// Where the session is in its lifecycle.
    pub fn state(&self) -> VoiceSessionState {
        self.state
    }

    /// The recognized user speech so far, in arrival order.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// How many audio chunks are waiting to play.
    pub fn pending_audio(&self) -> usize {
        self.queue.pending_len()
    }

    /// Feed one incoming frame into the session.
    ///
    /// Frames arriving after [VoiceSession::close] are dropped entirely; a
    /// late network response must not resurrect a closed session.
    pub fn handle_frame(&mut self, frame: ServerFrame) {
        if self.state == VoiceSessionState::Closed {
            return;
        }

        match frame {
            ServerFrame::SessionStarted => self.state = VoiceSessionState::Active,
            ServerFrame::Audio { data } => {
                self.queue.enqueue(data);
            }
            ServerFrame::Transcript { text } => self.transcript.push(text),
            // Barge-in: the user is talking, so queued speech is stale.
            ServerFrame::Interrupt => self.queue.clear_pending(),
            ServerFrame::Error { message } => {
                tracing::warn!("voice service reported an error: {message}");
            }
        }
    }

    /// Tear the session down: stop playback, drop queued audio, and ignore
    /// anything that arrives afterwards.
    pub fn close(&mut self) {
        self.queue.close();
        self.state = VoiceSessionState::Closed;
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    /// A sink that records what it plays.
    #[derive(Clone)]
    struct RecordingSink {
        played: Arc<Mutex<Vec<String>>>,
        delay: Duration,
    }

    impl RecordingSink {
        fn new(delay: Duration) -> Self {
            Self {
                played: Arc::new(Mutex::new(Vec::new())),
                delay,
            }
        }

        fn played(&self) -> Vec<String> {
            self.played.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AudioSink for RecordingSink {
        async fn play(&mut self, pcm_base64: String) {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.played.lock().unwrap().push(pcm_base64);
        }
    }

    async fn wait_for<F: Fn() -> bool>(condition: F) {
        for _ in 0..100 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached within one second");
    }

    #[tokio::test]
    async fn chunks_play_in_arrival_order() {
        let sink = RecordingSink::new(Duration::ZERO);
        let queue = PlaybackQueue::start(sink.clone());

        for chunk in ["first", "second", "third"] {
            assert!(queue.enqueue(chunk.to_owned()));
        }

        wait_for(|| sink.played().len() == 3).await;
        assert_eq!(sink.played(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn close_drops_pending_chunks() {
        // Each chunk takes long enough that the rest are still queued.
        let sink = RecordingSink::new(Duration::from_millis(200));
        let queue = PlaybackQueue::start(sink.clone());

        for chunk in ["a", "b", "c"] {
            queue.enqueue(chunk.to_owned());
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        queue.close();
        tokio::time::sleep(Duration::from_millis(500)).await;

        // At most the in-flight chunk made it out; nothing queued played.
        assert!(sink.played().len() <= 1);
        assert!(!queue.enqueue("late".to_owned()));
        assert!(queue.is_closed());
    }

    #[tokio::test]
    async fn interrupt_clears_the_line_but_not_the_session() {
        let sink = RecordingSink::new(Duration::from_millis(200));
        let mut session = VoiceSession::start(sink.clone());
        session.handle_frame(ServerFrame::SessionStarted);

        for chunk in ["a", "b", "c"] {
            session.handle_frame(ServerFrame::Audio {
                data: chunk.to_owned(),
            });
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        session.handle_frame(ServerFrame::Interrupt);

        assert_eq!(session.pending_audio(), 0);
        assert_eq!(session.state(), VoiceSessionState::Active);
    }

    #[tokio::test]
    async fn frames_after_close_are_dropped() {
        let sink = RecordingSink::new(Duration::ZERO);
        let mut session = VoiceSession::start(sink.clone());
        session.handle_frame(ServerFrame::SessionStarted);

        session.close();

        session.handle_frame(ServerFrame::Transcript {
            text: "too late".to_owned(),
        });
        session.handle_frame(ServerFrame::Audio {
            data: "too late".to_owned(),
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(session.transcript().is_empty());
        assert!(sink.played().is_empty());
        assert_eq!(session.state(), VoiceSessionState::Closed);
    }

    #[tokio::test]
    async fn transcripts_accumulate_in_order() {
        let sink = RecordingSink::new(Duration::ZERO);
        let mut session = VoiceSession::start(sink);
        session.handle_frame(ServerFrame::SessionStarted);

        session.handle_frame(ServerFrame::Transcript {
            text: "spent 5000".to_owned(),
        });
        session.handle_frame(ServerFrame::Transcript {
            text: "on coffee".to_owned(),
        });

        assert_eq!(session.transcript(), ["spent 5000", "on coffee"]);
    }

    #[test]
    fn frames_use_snake_case_type_tags() {
        let start = serde_json::to_value(ClientFrame::StartApp).unwrap();
        assert_eq!(start["type"], "start_app");

        let frame: ServerFrame =
            serde_json::from_str(r#"{"type":"audio","data":"UENN"}"#).unwrap();
        assert_eq!(
            frame,
            ServerFrame::Audio {
                data: "UENN".to_owned()
            }
        );

        let interrupt: ServerFrame = serde_json::from_str(r#"{"type":"interrupt"}"#).unwrap();
        assert_eq!(interrupt, ServerFrame::Interrupt);
    }
}
