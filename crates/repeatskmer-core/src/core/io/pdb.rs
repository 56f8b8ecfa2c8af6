use crate::core::io::traits::StructureFile;
use crate::core::models::structure::{MissingResidueEntry, Structure, StructureBuilder};
use crate::core::utils::identifiers::{ResidueKey, ResidueKeyError};
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::{debug, warn};

const MISSING_RESIDUES_REMARK: &str = "465";
const MISSING_RESIDUES_HEADER_TOKEN: &str = "SSSEQI";

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Line is too short for ATOM/HETATM record (must be at least 27 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

// Keyed on the raw number columns so the atoms of an unreadable residue still
// collapse into one record.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResidueCursor {
    chain_id: String,
    number: String,
    insertion_code: Option<char>,
}

/// Residue-level reader for PDB files.
///
/// Consecutive `ATOM`/`HETATM` records sharing chain, sequence number and
/// insertion code collapse into one residue. A residue whose number columns do
/// not hold an integer is recorded as malformed and parsing goes on.
/// `REMARK 465` entries become the structure's missing-residue listing.
pub struct PdbFile;

impl StructureFile for PdbFile {
    type Error = PdbError;

    fn read_from(structure_id: &str, reader: &mut impl BufRead) -> Result<Structure, Self::Error> {
        let mut builder = StructureBuilder::new(structure_id);
        let mut cursor: Option<ResidueCursor> = None;
        let mut in_missing_listing = false;
        let mut model_count = 0;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            match slice_and_trim(&line, 0, 6) {
                "MODEL" => {
                    model_count += 1;
                    let serial = slice_and_trim(&line, 10, 14)
                        .parse()
                        .unwrap_or(model_count);
                    builder.start_model(serial);
                    cursor = None;
                }
                "ENDMDL" | "TER" => cursor = None,
                "ATOM" | "HETATM" => {
                    let next = parse_residue_cursor(&line, line_num)?;
                    if cursor.as_ref() != Some(&next) {
                        let name = slice_and_trim(&line, 17, 20);
                        match next.number.parse::<isize>() {
                            Ok(number) => {
                                builder.add_residue(
                                    &next.chain_id,
                                    number,
                                    next.insertion_code,
                                    name,
                                );
                            }
                            Err(_) => {
                                let error = ResidueKeyError::MalformedIdentifier {
                                    raw: next.number.clone(),
                                    reason: "sequence number in columns 23-26 is not an integer",
                                };
                                warn!(line = line_num, "Skipping residue record: {}", error);
                                builder.add_malformed_residue(&next.chain_id, name, error);
                            }
                        }
                        cursor = Some(next);
                    }
                }
                "REMARK" if slice_and_trim(&line, 6, 10) == MISSING_RESIDUES_REMARK => {
                    let tokens: Vec<&str> = line.get(10..).unwrap_or("").split_whitespace().collect();
                    if tokens.contains(&MISSING_RESIDUES_HEADER_TOKEN) {
                        in_missing_listing = true;
                    } else if in_missing_listing {
                        if let Some(entry) = parse_missing_residue(&tokens, line_num) {
                            builder.add_missing_residue(entry);
                        }
                    }
                }
                _ => {}
            }
        }

        let structure = builder.build();
        debug!(
            structure = structure_id,
            models = structure.models().len(),
            residues = structure.residue_count(),
            missing = structure.missing_residues().len(),
            "Parsed PDB structure."
        );
        Ok(structure)
    }
}

fn parse_residue_cursor(line: &str, line_num: usize) -> Result<ResidueCursor, PdbError> {
    if line.len() < 27 {
        return Err(PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::LineTooShort,
        });
    }

    let insertion_code = line
        .get(26..27)
        .and_then(|s| s.chars().next())
        .filter(|c| !c.is_whitespace());

    Ok(ResidueCursor {
        chain_id: slice_and_trim(line, 21, 22).to_string(),
        number: slice_and_trim(line, 22, 26).to_string(),
        insertion_code,
    })
}

// Entries read `[model] RES C SSSEQI`; the model column is optional.
fn parse_missing_residue(tokens: &[&str], line_num: usize) -> Option<MissingResidueEntry> {
    let [.., residue_name, chain_id, identifier] = tokens else {
        return None;
    };
    match ResidueKey::parse(identifier) {
        Ok(key) => Some(MissingResidueEntry {
            chain_id: chain_id.to_string(),
            key,
            residue_name: residue_name.to_string(),
        }),
        Err(e) => {
            warn!(line = line_num, "Skipping missing-residue remark: {}", e);
            None
        }
    }
}
