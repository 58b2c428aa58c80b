pub mod config;
pub mod error;
pub mod types;

pub use config::PapercryptConfig;
pub use error::{PaperError, PaperResult};
pub use types::{DataFormat, HeaderStyle, HexCase, ParsePolicy};
