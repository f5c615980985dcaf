pub mod agent;
pub mod guardrails;
pub mod http;
pub mod providers;
pub mod session;
pub mod tools;
