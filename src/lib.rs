// AR4JA LDPC matrix generator
//
// This library builds the parity-check and generator matrices of the
// CCSDS 131.0-B-2 AR4JA codes and reduces them to the compact tables
// embedded in firmware encoders and decoders.

pub mod app_config;
pub mod error;
pub mod ldpc;
pub mod store;
pub mod telemetry;

pub use app_config::GeneratorConfig;
pub use error::{LdpcError, Result};
pub use ldpc::{BinaryMatrix, CodeParameters, GeneratedCode, Rate};
pub use store::MatrixStore;
