//! Client logic for the medseek consultation chat
//!
//! Everything here is independent of the browser: configuration, setup-form
//! validation, the chat session state machine with its reconnect backoff,
//! the app shell state and the platform checks used by the viewport fixes.
//! The wasm front end drives these types from DOM and socket events.

pub mod app;
pub mod config;
pub mod platform;
pub mod reconnect;
pub mod session;
pub mod setup;
pub mod urls;

// Re-export commonly used types
pub use app::AppState;
pub use config::{ClientConfig, EchoPolicy};
pub use platform::{is_ios, is_ios_safari, KeyboardEvent, KeyboardTracker};
pub use reconnect::{Backoff, ReconnectPolicy};
pub use session::{end_session, ChatSession, ConnectionState, FrameOutcome};
pub use setup::{SetupForm, SetupState};
pub use urls::{api_url, socket_scheme, socket_url};
