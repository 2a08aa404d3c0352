pub mod models;
pub mod mrz_reader;
pub mod processing;
pub mod utils;
pub mod validation;

pub use mrz_reader::MrzReader;
pub use utils::{MrzError, Result};
