//! Crew Runner - executes agents and crews
//!
//! This crate turns agent descriptors and an objective into model output.
//! A rich external orchestrator is tried first when enabled; otherwise
//! agents are run through direct chat completions, chained in order for
//! crews.

mod chat;
mod engine;
mod error;
mod rich;

pub use chat::{
    ChatChoice, ChatClient, ChatCompletionApi, ChatCompletionResponse, ChatConfig, ChatMessage,
    CompletionMessage, MessageRole, Usage, DEFAULT_CHAT_BASE_URL,
};
pub use engine::{
    build_messages, stitch_crew_input, AgentDescriptor, AgentResponse, CrewEngine, CrewResponse,
    EngineConfig, ExecutionMode, RunMode,
};
pub use error::{Result, RunnerError};
pub use rich::{
    DisabledOrchestrator, RichAgent, RichOrchestrator, RichOutcome, RichSession, RichTask,
    WorkerOrchestrator, EXPECTED_OUTPUT,
};
