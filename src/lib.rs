pub mod config;
pub mod engine;
pub mod error;
pub mod global_skip;
pub mod loader;
pub mod oracle;
pub mod phrase;
pub mod selector;
pub mod transform;
pub mod vocabulary;
