use crate::core::io::traits::StructureFile;
use crate::core::models::structure::{MissingResidueEntry, Structure, StructureBuilder};
use crate::core::utils::identifiers::{ResidueKey, ResidueKeyError};
use std::collections::HashMap;
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::{debug, warn};

const ATOM_SITE: &str = "_atom_site";
const UNOBSERVED_RESIDUES: &str = "_pdbx_unobs_or_zero_occ_residues";

#[derive(Debug, Error)]
pub enum MmcifError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Required category '{0}' not found")]
    MissingCategory(&'static str),
    #[error("Category '{category}' lacks required column '{column}'")]
    MissingColumn {
        category: &'static str,
        column: &'static str,
    },
    #[error("Text field opened on line {0} is never closed")]
    UnterminatedTextField(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    text: String,
    quoted: bool,
}

impl Token {
    fn is_null(&self) -> bool {
        !self.quoted && (self.text == "?" || self.text == ".")
    }

    fn starts_item(&self) -> bool {
        !self.quoted && self.text.starts_with('_')
    }

    fn is_keyword(&self) -> bool {
        if self.quoted {
            return false;
        }
        let lower = self.text.to_ascii_lowercase();
        lower == "loop_"
            || lower.starts_with("data_")
            || lower.starts_with("save_")
            || lower == "global_"
    }
}

/// A `loop_` table: column names (without the category prefix) and its rows.
#[derive(Debug, Default)]
struct CifLoop {
    columns: Vec<String>,
    rows: Vec<Vec<Token>>,
}

impl CifLoop {
    fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn first_column(&self, names: &[&str]) -> Option<usize> {
        names.iter().find_map(|n| self.column(n))
    }
}

fn tokenize(reader: &mut impl BufRead) -> Result<Vec<Token>, MmcifError> {
    let mut tokens = Vec::new();
    let mut text_field: Option<(usize, String)> = None;

    for (line_num, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        let line_num = line_num + 1;

        if let Some((start, mut buffer)) = text_field.take() {
            if line.starts_with(';') {
                tokens.push(Token {
                    text: buffer.trim_end().to_string(),
                    quoted: true,
                });
            } else {
                buffer.push('\n');
                buffer.push_str(&line);
                text_field = Some((start, buffer));
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix(';') {
            text_field = Some((line_num, rest.to_string()));
            continue;
        }

        tokenize_line(&line, &mut tokens);
    }

    match text_field {
        Some((start, _)) => Err(MmcifError::UnterminatedTextField(start)),
        None => Ok(tokens),
    }
}

fn tokenize_line(line: &str, tokens: &mut Vec<Token>) {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '#' {
            break;
        }
        if c == '\'' || c == '"' {
            // A quote only closes when followed by whitespace or end of line.
            let mut j = i + 1;
            while j < chars.len() && !(chars[j] == c && chars.get(j + 1).is_none_or(|n| n.is_whitespace())) {
                j += 1;
            }
            tokens.push(Token {
                text: chars[i + 1..j.min(chars.len())].iter().collect(),
                quoted: true,
            });
            i = j + 1;
            continue;
        }
        let mut j = i;
        while j < chars.len() && !chars[j].is_whitespace() {
            j += 1;
        }
        tokens.push(Token {
            text: chars[i..j].iter().collect(),
            quoted: false,
        });
        i = j;
    }
}

/// Collects the `loop_` tables of the requested categories.
fn collect_loops(tokens: &[Token], categories: &[&str]) -> HashMap<String, CifLoop> {
    let mut loops = HashMap::new();
    let mut i = 0;
    while i < tokens.len() {
        if !tokens[i].quoted && tokens[i].text.eq_ignore_ascii_case("loop_") {
            i += 1;
            let mut category: Option<String> = None;
            let mut table = CifLoop::default();
            while i < tokens.len() && tokens[i].starts_item() {
                if let Some((cat, column)) = tokens[i].text.split_once('.') {
                    category.get_or_insert_with(|| cat.to_string());
                    table.columns.push(column.to_string());
                }
                i += 1;
            }
            let mut values = Vec::new();
            while i < tokens.len() && !tokens[i].starts_item() && !tokens[i].is_keyword() {
                values.push(tokens[i].clone());
                i += 1;
            }
            if let Some(cat) = category {
                if categories.contains(&cat.as_str()) && !table.columns.is_empty() {
                    let width = table.columns.len();
                    if values.len() % width != 0 {
                        warn!(
                            category = %cat,
                            "Loop has {} values, not a multiple of {} columns; trailing values ignored.",
                            values.len(),
                            width
                        );
                    }
                    table.rows = values.chunks_exact(width).map(<[Token]>::to_vec).collect();
                    loops.insert(cat, table);
                }
            }
        } else {
            i += 1;
        }
    }
    loops
}

fn insertion_code(token: Option<&Token>) -> Option<char> {
    token
        .filter(|t| !t.is_null())
        .and_then(|t| t.text.chars().next())
}

/// Residue-level reader for PDBx/mmCIF files.
///
/// Reads the `_atom_site` loop (author numbering preferred over label
/// numbering) and the `_pdbx_unobs_or_zero_occ_residues` loop as the
/// missing-residue listing. Rows with a non-integer sequence number are
/// recorded as malformed residues.
pub struct MmcifFile;

impl StructureFile for MmcifFile {
    type Error = MmcifError;

    fn read_from(structure_id: &str, reader: &mut impl BufRead) -> Result<Structure, Self::Error> {
        let tokens = tokenize(reader)?;
        let mut loops = collect_loops(&tokens, &[ATOM_SITE, UNOBSERVED_RESIDUES]);

        let atom_site = loops
            .remove(ATOM_SITE)
            .ok_or(MmcifError::MissingCategory(ATOM_SITE))?;
        let mut builder = StructureBuilder::new(structure_id);
        read_atom_site(&atom_site, &mut builder)?;

        if let Some(unobserved) = loops.remove(UNOBSERVED_RESIDUES) {
            read_unobserved_residues(&unobserved, &mut builder);
        }

        let structure = builder.build();
        debug!(
            structure = structure_id,
            models = structure.models().len(),
            residues = structure.residue_count(),
            missing = structure.missing_residues().len(),
            "Parsed mmCIF structure."
        );
        Ok(structure)
    }
}

fn read_atom_site(table: &CifLoop, builder: &mut StructureBuilder) -> Result<(), MmcifError> {
    let missing = |column| MmcifError::MissingColumn {
        category: ATOM_SITE,
        column,
    };
    let chain_col = table
        .first_column(&["auth_asym_id", "label_asym_id"])
        .ok_or_else(|| missing("auth_asym_id"))?;
    let number_col = table
        .first_column(&["auth_seq_id", "label_seq_id"])
        .ok_or_else(|| missing("auth_seq_id"))?;
    let name_col = table
        .first_column(&["auth_comp_id", "label_comp_id"])
        .ok_or_else(|| missing("auth_comp_id"))?;
    let insertion_col = table.column("pdbx_PDB_ins_code");
    let model_col = table.column("pdbx_PDB_model_num");

    let mut current_model: Option<String> = None;
    let mut cursor: Option<(String, String, Option<char>)> = None;

    for row in &table.rows {
        if row[number_col].is_null() {
            continue;
        }
        if let Some(model) = model_col.map(|c| &row[c].text) {
            if current_model.as_ref() != Some(model) {
                let serial = model.parse().unwrap_or(next_model_serial(&current_model));
                builder.start_model(serial);
                current_model = Some(model.clone());
                cursor = None;
            }
        }

        let next = (
            row[chain_col].text.clone(),
            row[number_col].text.clone(),
            insertion_code(insertion_col.map(|c| &row[c])),
        );
        if cursor.as_ref() == Some(&next) {
            continue;
        }
        let (chain_id, number, code) = &next;
        let name = &row[name_col].text;
        match number.parse::<isize>() {
            Ok(number) => {
                builder.add_residue(chain_id, number, *code, name);
            }
            Err(_) => {
                let error = ResidueKeyError::MalformedIdentifier {
                    raw: number.clone(),
                    reason: "sequence number is not an integer",
                };
                warn!(chain = %chain_id, "Skipping atom_site residue: {}", error);
                builder.add_malformed_residue(chain_id, name, error);
            }
        }
        cursor = Some(next);
    }
    Ok(())
}

fn next_model_serial(current: &Option<String>) -> usize {
    current
        .as_ref()
        .and_then(|m| m.parse::<usize>().ok())
        .map_or(1, |m| m + 1)
}

fn read_unobserved_residues(table: &CifLoop, builder: &mut StructureBuilder) {
    let (Some(chain_col), Some(number_col), Some(name_col)) = (
        table.first_column(&["auth_asym_id", "label_asym_id"]),
        table.first_column(&["auth_seq_id", "label_seq_id"]),
        table.first_column(&["auth_comp_id", "label_comp_id"]),
    ) else {
        warn!("Unobserved-residue loop lacks chain, number or name columns; ignoring it.");
        return;
    };
    let insertion_col = table.column("PDB_ins_code");
    let occupancy_col = table.column("occupancy_flag");
    let model_col = table.column("PDB_model_num");

    let first_model = model_col
        .and_then(|c| table.rows.first().map(|row| row[c].text.clone()));

    for row in &table.rows {
        if let (Some(c), Some(first)) = (model_col, first_model.as_ref()) {
            if &row[c].text != first {
                continue;
            }
        }
        // Flag 0 marks zero-occupancy atoms of an otherwise observed residue.
        if occupancy_col.is_some_and(|c| row[c].text == "0") {
            continue;
        }
        if row[number_col].is_null() {
            continue;
        }

        let mut raw = row[number_col].text.clone();
        if let Some(code) = insertion_code(insertion_col.map(|c| &row[c])) {
            raw.push(code);
        }
        match ResidueKey::parse(&raw) {
            Ok(key) => {
                builder.add_missing_residue(MissingResidueEntry {
                    chain_id: row[chain_col].text.clone(),
                    key,
                    residue_name: row[name_col].text.clone(),
                });
            }
            Err(e) => warn!("Skipping unobserved residue entry: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
data_1TST
#
_entry.id 1TST
#
loop_
_pdbx_unobs_or_zero_occ_residues.id
_pdbx_unobs_or_zero_occ_residues.PDB_model_num
_pdbx_unobs_or_zero_occ_residues.polymer_flag
_pdbx_unobs_or_zero_occ_residues.occupancy_flag
_pdbx_unobs_or_zero_occ_residues.auth_asym_id
_pdbx_unobs_or_zero_occ_residues.auth_comp_id
_pdbx_unobs_or_zero_occ_residues.auth_seq_id
_pdbx_unobs_or_zero_occ_residues.PDB_ins_code
1 1 Y 1 A GLY 3 ?
2 1 Y 1 A SER 4 B
3 1 Y 0 A LYS 1 ?
#
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.label_atom_id
_atom_site.label_comp_id
_atom_site.auth_comp_id
_atom_site.auth_asym_id
_atom_site.auth_seq_id
_atom_site.pdbx_PDB_ins_code
_atom_site.pdbx_PDB_model_num
ATOM 1 N ALA ALA A 1 ? 1
ATOM 2 CA ALA ALA A 1 ? 1
ATOM 3 N CYS CYS A 2 ? 1
ATOM 4 \"O5'\" CYS CYS A 2 ? 1
ATOM 5 N GLY GLY A 2 A 1
ATOM 6 N ALA ALA A 1 ? 2
#
";

    fn labels(structure: &Structure, model: usize, chain: &str) -> Vec<String> {
        structure
            .chain_residues(model, chain)
            .map(|r| match r.insertion_code {
                Some(code) => format!("{}{}{}", r.name, r.number, code),
                None => format!("{}{}", r.name, r.number),
            })
            .collect()
    }

    #[test]
    fn read_builds_residues_per_model_from_atom_site() {
        let structure = MmcifFile::read_from_str("1tst", SAMPLE).unwrap();
        assert_eq!(structure.models().len(), 2);
        assert_eq!(labels(&structure, 0, "A"), vec!["ALA1", "CYS2", "GLY2A"]);
        assert_eq!(labels(&structure, 1, "A"), vec!["ALA1"]);
    }

    #[test]
    fn read_collects_unobserved_residues_but_not_zero_occupancy_ones() {
        let structure = MmcifFile::read_from_str("1tst", SAMPLE).unwrap();
        let missing: Vec<_> = structure
            .missing_residues()
            .iter()
            .map(|m| format!("{}:{}:{}", m.chain_id, m.key, m.residue_name))
            .collect();
        assert_eq!(missing, vec!["A:3:GLY", "A:4B:SER"]);
    }

    #[test]
    fn read_records_non_integer_sequence_numbers_as_malformed() {
        let content = "\
data_2BAD
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.auth_comp_id
_atom_site.auth_asym_id
_atom_site.auth_seq_id
ATOM 1 ALA A 1
ATOM 2 GLY A X
ATOM 3 GLY A X
ATOM 4 CYS A 3
";
        let structure = MmcifFile::read_from_str("2bad", content).unwrap();
        assert_eq!(labels(&structure, 0, "A"), vec!["ALA1", "CYS3"]);
        let malformed = structure.malformed_residues();
        assert_eq!(malformed.len(), 1);
        assert_eq!(malformed[0].residue_name, "GLY");
        assert!(matches!(
            &malformed[0].error,
            ResidueKeyError::MalformedIdentifier { raw, .. } if raw == "X"
        ));
    }

    #[test]
    fn read_fails_without_atom_site() {
        let err = MmcifFile::read_from_str("x", "data_X\n_entry.id X\n").unwrap_err();
        assert!(matches!(err, MmcifError::MissingCategory(ATOM_SITE)));
    }

    #[test]
    fn tokenizer_handles_quotes_comments_and_text_fields() {
        let content = "a 'b c' \"it's\" # comment\n;line one\nline two\n;\nd\n";
        let tokens = tokenize(&mut content.as_bytes()).unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b c", "it's", "line one\nline two", "d"]);
        assert!(tokens[1].quoted);
        assert!(!tokens[4].quoted);
    }

    #[test]
    fn tokenizer_reports_unterminated_text_fields() {
        let err = tokenize(&mut ";open\nnever closed\n".as_bytes()).unwrap_err();
        assert!(matches!(err, MmcifError::UnterminatedTextField(1)));
    }
}
