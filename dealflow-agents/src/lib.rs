//! dealflow Agents
//!
//! Language-model collaborators around the analysis core:
//! - **Backends**: Gemini, OpenAI-compatible and Anthropic chat APIs
//! - **Extractor**: turns news items into validated article records
//! - **Reporter**: writes the deal-flow report from the ranked payload
//!
//! ## Personas
//!
//! Agent prompts are defined as TOML persona files in `prompts/`.
//! See [`persona::PersonaRegistry`] for loading and overriding them.

pub mod backend;
pub mod persona;
pub mod extractor;
pub mod reporter;
pub mod error;

pub use backend::*;
pub use persona::*;
pub use extractor::*;
pub use reporter::*;
pub use error::*;
