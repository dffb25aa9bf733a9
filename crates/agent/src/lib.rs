//! Agent Actions - the operations the phone agent's LLM can invoke mid-call
//!
//! This crate is the contract between the conversational runtime and the
//! scheduling back office:
//! - **Actions** (`actions`) - `find_slots` and `send_text` handlers with typed
//!   parameter schemas over the pipe-delimited wire string
//! - **Factory** (`factory`) - resolves an action identifier to its handler
//! - **Runtime** (`runtime`) - runs one agent turn and classifies failures
//! - **Profile** (`profile`) - persona and action catalog advertised to the LLM
//!
//! # Flow
//!
//! ```text
//! LLM picks action + input_str → ActionFactory → handler.run → ActionOutput
//!                                                    ↓
//!                              AvailabilityProvider / SmsSender
//! ```
//!
//! Telephony, transcription, and speech synthesis live outside this crate.

pub mod actions;
pub mod factory;
pub mod profile;
pub mod runtime;

pub use actions::{Action, ActionKind, ActionOutput, ActionResponse};
pub use factory::{ActionFactory, ActionSettings};
pub use profile::{ActionDescriptor, AgentProfile};
pub use runtime::ActionRuntime;
