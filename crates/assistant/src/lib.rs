//! Assistant core - command parsing and reply generation
//!
//! This crate provides:
//! - A parser that recognises the assistant's German command vocabulary
//! - Two response engines behind one `ResponseEngine` trait: keyword rules
//!   and a local text-generation model
//! - Cleanup of generated text
//! - The side-effecting actions (program launch, URL, web search)
//! - Chat session bookkeeping and off-thread reply dispatch

pub mod actions;
pub mod engine;
pub mod parser;
pub mod postprocess;
pub mod session;

pub use actions::{ActionRunner, Launcher, SystemLauncher};
pub use engine::{select_engine, EngineSelection, GenerativeEngine, ResponseEngine, RuleBasedEngine};
pub use parser::{help_text, parse_command};
pub use postprocess::clean_response;
pub use session::{ChatSession, Reply, ReplyDispatcher, RequestTicket, ThinkingDelay};
