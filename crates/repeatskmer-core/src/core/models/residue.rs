use phf::{Map, Set, phf_map, phf_set};

/// One-letter code emitted for residue names missing from [`ONE_LETTER_CODES`].
pub const UNKNOWN_RESIDUE: &str = "X";

#[rustfmt::skip]
static ONE_LETTER_CODES: Map<&'static str, &'static str> = phf_map! {
    // --- Standard amino acids ---
    "ALA" => "A", "CYS" => "C", "ASP" => "D", "GLU" => "E", "PHE" => "F",
    "GLY" => "G", "HIS" => "H", "ILE" => "I", "LYS" => "K", "LEU" => "L",
    "MET" => "M", "ASN" => "N", "PRO" => "P", "GLN" => "Q", "ARG" => "R",
    "SER" => "S", "THR" => "T", "VAL" => "V", "TRP" => "W", "TYR" => "Y",

    // --- Genetically encoded non-standard ---
    "PYL" => "O", "SEC" => "U",
};

// Solvent entries are elided from sequences rather than mapped to the sentinel.
static SOLVENT_NAMES: Set<&'static str> = phf_set! {
    "HOH", "WAT", "DOD", "H2O",
};

/// A single residue as delivered by a structural file reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralResidue {
    pub chain_id: String,             // Chain identifier as written in the source file
    pub number: isize,                // Author sequence number (may be negative)
    pub insertion_code: Option<char>, // Insertion code, if any
    pub name: String,                 // Three-letter residue name (e.g., "ALA")
    pub model: usize,                 // Index of the model this residue belongs to
}

pub fn is_solvent(residue_name: &str) -> bool {
    SOLVENT_NAMES.contains(residue_name.trim())
}

/// Translates a three-letter residue name into its one-letter code.
///
/// Unknown names yield [`UNKNOWN_RESIDUE`]; solvent names yield the empty string
/// so they contribute nothing to a sequence.
pub fn one_letter_code(residue_name: &str) -> &'static str {
    let trimmed = residue_name.trim();
    if is_solvent(trimmed) {
        return "";
    }
    ONE_LETTER_CODES
        .get(trimmed)
        .copied()
        .unwrap_or(UNKNOWN_RESIDUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_letter_code_translates_standard_residues() {
        assert_eq!(one_letter_code("ALA"), "A");
        assert_eq!(one_letter_code("CYS"), "C");
        assert_eq!(one_letter_code("GLY"), "G");
        assert_eq!(one_letter_code("TRP"), "W");
        assert_eq!(one_letter_code("SEC"), "U");
    }

    #[test]
    fn one_letter_code_maps_unknown_names_to_sentinel() {
        assert_eq!(one_letter_code("MSE"), UNKNOWN_RESIDUE);
        assert_eq!(one_letter_code(""), UNKNOWN_RESIDUE);
        assert_eq!(one_letter_code("ala"), UNKNOWN_RESIDUE);
    }

    #[test]
    fn one_letter_code_elides_water() {
        assert_eq!(one_letter_code("HOH"), "");
        assert_eq!(one_letter_code(" WAT "), "");
        assert!(is_solvent("DOD"));
        assert!(!is_solvent("ALA"));
    }

    #[test]
    fn one_letter_code_trims_whitespace() {
        assert_eq!(one_letter_code(" LYS "), "K");
    }
}
