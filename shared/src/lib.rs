pub mod models;
pub mod utils;

// Re-export the record model and the parsers every consumer reaches for.
pub use models::{Field, FieldParseError, Materia, RawValue, SENTINEL};
pub use utils::brazilian_format;
