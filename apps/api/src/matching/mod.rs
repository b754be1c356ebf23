pub mod documents;
pub mod engine;
pub mod handlers;
pub mod insights;
pub mod listings;
pub mod matcher;
pub mod models;
pub mod orchestrator;
pub mod profile;
pub mod prompts;
pub mod simulation;
pub mod writer;
