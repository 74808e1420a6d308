use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use shared::{Field, Materia};

use crate::error::EngineError;

const ID_COLUMN: &str = "id_noticia";

pub struct MateriaCsvParser;

impl MateriaCsvParser {
    // Header: id_noticia;titulo;Data;Tipo;Mídia;Veiculo;Valor;publico;K;Vn;Teor;...
    // Row:    17;Nota;15/03/2024;Release;TV;Folha;1.234,56;5000;2;;Positiva;...
    pub fn load_from_file(path: &Path, delimiter: u8) -> Result<Vec<Materia>, EngineError> {
        let file = File::open(path)?;
        let records = Self::load_from_reader(BufReader::new(file), delimiter)?;
        tracing::info!(path = %path.display(), records = records.len(), "Loaded materias from CSV");
        Ok(records)
    }

    pub fn load_from_reader<R: Read>(
        reader: R,
        delimiter: u8,
    ) -> Result<Vec<Materia>, EngineError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let columns = Self::map_columns(&headers);
        let id_pos = headers.iter().position(|h| h.trim() == ID_COLUMN);

        let mut records = Vec::new();
        for result in rdr.records() {
            let row = result?;
            let mut materia = Materia::default();
            for (pos, field) in &columns {
                if let Some(cell) = row.get(*pos) {
                    materia.set(*field, cell);
                }
            }
            materia.id = Self::get_field(&row, id_pos)
                .filter(|cell| !cell.trim().is_empty())
                .map(str::to_string);
            records.push(materia);
        }
        Ok(records)
    }

    // Header positions the record model knows about; the rest is ignored.
    fn map_columns(headers: &StringRecord) -> Vec<(usize, Field)> {
        let mut columns = Vec::new();
        for (pos, header) in headers.iter().enumerate() {
            match header.parse::<Field>() {
                Ok(field) => columns.push((pos, field)),
                Err(_) if header.trim() == ID_COLUMN => {}
                Err(_) => tracing::debug!(column = header, "Ignoring unknown CSV column"),
            }
        }
        columns
    }

    fn get_field(record: &StringRecord, pos: Option<usize>) -> Option<&str> {
        pos.and_then(|p| record.get(p))
    }
}
