pub mod document;
pub mod job;
pub mod profile;
pub mod session;
