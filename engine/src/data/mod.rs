// Ingestion (JSON, CSV) and the in-memory record store.
pub mod csv_parser;
pub mod json_loader;
pub mod materia_store;

pub use materia_store::{MateriaFilter, MateriaStore};
