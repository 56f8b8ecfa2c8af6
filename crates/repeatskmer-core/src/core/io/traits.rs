use crate::core::models::structure::Structure;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Defines the interface for reading structural file formats down to residue
/// level.
///
/// Implementors handle format-specific parsing; the produced [`Structure`]
/// exposes models, chains, residues and any supplemental missing-residue
/// annotation the format carries.
pub trait StructureFile {
    /// The error type for read operations.
    type Error: Error + From<io::Error>;

    /// Reads a structure from a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `structure_id` - Identifier recorded on the resulting structure.
    /// * `reader` - The buffered reader to read from.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(structure_id: &str, reader: &mut impl BufRead) -> Result<Structure, Self::Error>;

    /// Reads a structure from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(structure_id: &str, path: P) -> Result<Structure, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(structure_id, &mut reader)
    }

    /// Reads a structure from in-memory text.
    fn read_from_str(structure_id: &str, content: &str) -> Result<Structure, Self::Error> {
        let mut reader = content.as_bytes();
        Self::read_from(structure_id, &mut reader)
    }
}
