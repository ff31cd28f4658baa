//! External collaborators behind capability traits.
//!
//! The pipeline treats the language model, speech synthesis and stock
//! footage services as opaque interfaces:
//!
//! - [`ScriptOracle`]: topic -> structured 7-scene script
//! - [`SpeechSynthesizer`]: text -> audio file on disk
//! - [`StockProvider`]: keyword -> candidate assets
//!
//! Each trait ships a production implementation and a deterministic
//! mock, so the worker can run offline and tests never touch the
//! network.

pub mod error;
pub mod oracle;
pub mod stock;
pub mod tts;

pub use error::{ProviderError, ProviderResult};
pub use oracle::{fallback_script, LlmOracle, MockOracle, OracleConfig, ScriptOracle};
pub use stock::{MockStockProvider, PexelsProvider, StockAsset, StockProvider};
pub use tts::{SpeechEngine, SpeechSynthesizer};
