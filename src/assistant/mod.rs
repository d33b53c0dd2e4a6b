//! The client side of the external assistant service.
//!
//! This module contains:
//! - The HTTP client for the chat, speech synthesis, and health endpoints
//! - The voice session: the typed frame protocol and the strictly ordered
//!   audio playback queue
//! - Route handlers exposing the assistant to the app
//!
//! The assistant service itself is external and opaque; nothing here
//! implements it, only speaks to it. Every network failure degrades to a
//! logged warning and a user-visible fallback, never a crash.

mod client;
mod handlers;
mod voice;

pub use client::{AssistantClient, CHAT_FALLBACK_REPLY, ChatContext};
pub use handlers::{chat_endpoint, health_endpoint, tts_endpoint};
pub use voice::{AudioSink, ClientFrame, PlaybackQueue, ServerFrame, VoiceSession,
    VoiceSessionState};
