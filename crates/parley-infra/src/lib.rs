//! Infrastructure layer for Parley.
//!
//! Contains implementations of the ports defined in `parley-core`:
//! the OpenAI-compatible Model Client and the configuration file loader.

pub mod config;
pub mod llm;
