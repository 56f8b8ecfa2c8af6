use crate::core::models::region::Region;
use crate::core::models::residue::one_letter_code;
use crate::core::models::structure::Structure;
use crate::core::utils::identifiers::{ResidueKey, ResidueKeyError};
use crate::engine::source::{StructureFormat, StructureSource};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconstructionError {
    #[error("Structure '{structure_id}' could not be retrieved: {primary}; {fallback}")]
    RetrievalFailure {
        structure_id: String,
        primary: String,
        fallback: String,
    },
}

/// A non-fatal irregularity met while rebuilding a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconstructionWarning {
    /// The primary format was unusable; the sequence came from the fallback.
    FallbackFormatUsed {
        format: StructureFormat,
        reason: String,
    },
    /// Two residues shared an identifier; the later one was renamed.
    DuplicateIdentifier {
        original: ResidueKey,
        assigned: ResidueKey,
    },
    /// A residue's identifier could not be normalized and was left out.
    MalformedIdentifier(ResidueKeyError),
    /// The rebuilt sequence does not span the whole window.
    LengthMismatch { expected: usize, actual: usize },
}

impl fmt::Display for ReconstructionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconstructionWarning::FallbackFormatUsed { format, reason } => {
                write!(f, "used {} fallback ({})", format, reason)
            }
            ReconstructionWarning::DuplicateIdentifier { original, assigned } => write!(
                f,
                "duplicate residue identifier {} renamed to {}",
                original, assigned
            ),
            ReconstructionWarning::MalformedIdentifier(e) => {
                write!(f, "residue skipped: {}", e)
            }
            ReconstructionWarning::LengthMismatch { expected, actual } => write!(
                f,
                "sequence has {} residues but the window spans {}",
                actual, expected
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconstruction {
    pub sequence: String,
    pub warnings: Vec<ReconstructionWarning>,
}

/// Rebuilds the one-letter sequence of `chain_id` over `[start, end]`.
///
/// Residues come from the first model that has any residue for the chain.
/// When they do not cover the window, the structure's missing-residue listing
/// fills the gaps; observed residues win over listed ones at the same key.
pub fn reconstruct(structure: &Structure, chain_id: &str, start: isize, end: isize) -> Reconstruction {
    let window = start..=end;
    let expected = window_len(start, end);
    let mut warnings = Vec::new();

    let mut collected = collect_observed(structure, chain_id, &window, &mut warnings);

    if collected.len() != expected {
        let mut filled = 0;
        for entry in structure
            .missing_residues()
            .iter()
            .filter(|m| m.chain_id == chain_id && window.contains(&m.key.number()))
        {
            if let Entry::Vacant(slot) = collected.entry(entry.key.clone()) {
                slot.insert(entry.residue_name.clone());
                filled += 1;
            }
        }
        if filled > 0 {
            debug!(
                structure = structure.id(),
                chain = chain_id,
                filled,
                "Filled gaps from missing-residue listing."
            );
        }
    }

    let sequence: String = collected.values().map(|name| one_letter_code(name)).collect();
    let actual = sequence.chars().count();
    if actual != expected {
        warn!(
            structure = structure.id(),
            chain = chain_id,
            start,
            end,
            expected,
            actual,
            "Reconstructed sequence length disagrees with window."
        );
        warnings.push(ReconstructionWarning::LengthMismatch { expected, actual });
    }

    Reconstruction { sequence, warnings }
}

fn window_len(start: isize, end: isize) -> usize {
    if end < start {
        0
    } else {
        (end - start) as usize + 1
    }
}

fn collect_observed(
    structure: &Structure,
    chain_id: &str,
    window: &RangeInclusive<isize>,
    warnings: &mut Vec<ReconstructionWarning>,
) -> BTreeMap<ResidueKey, String> {
    let mut collected = BTreeMap::new();

    let chosen_model = (0..structure.models().len())
        .find(|&index| structure.chain_residues(index, chain_id).next().is_some());

    if let Some(model_index) = chosen_model {
        for residue in structure
            .chain_residues(model_index, chain_id)
            .filter(|r| window.contains(&r.number))
        {
            let key = match ResidueKey::new(residue.number, residue.insertion_code) {
                Ok(key) => key,
                Err(e) => {
                    warn!(structure = structure.id(), "Skipping residue: {}", e);
                    warnings.push(ReconstructionWarning::MalformedIdentifier(e));
                    continue;
                }
            };
            insert_disambiguated(&mut collected, key, &residue.name, warnings);
        }
    }

    // Unreadable numbers cannot be placed in the window; every one in the chain is reported.
    let malformed_model = chosen_model.or_else(|| {
        structure
            .malformed_residues()
            .iter()
            .filter(|m| m.chain_id == chain_id)
            .map(|m| m.model)
            .min()
    });
    for entry in structure
        .malformed_residues()
        .iter()
        .filter(|m| m.chain_id == chain_id && Some(m.model) == malformed_model)
    {
        debug!(
            structure = structure.id(),
            residue = %entry.residue_name,
            "Residue with malformed identifier treated as missing."
        );
        warnings.push(ReconstructionWarning::MalformedIdentifier(entry.error.clone()));
    }

    collected
}

fn insert_disambiguated(
    collected: &mut BTreeMap<ResidueKey, String>,
    key: ResidueKey,
    name: &str,
    warnings: &mut Vec<ReconstructionWarning>,
) {
    if !collected.contains_key(&key) {
        collected.insert(key, name.to_string());
        return;
    }
    let assigned = (0..)
        .map(|ordinal| key.with_suffix(ordinal))
        .find(|candidate| !collected.contains_key(candidate))
        .unwrap_or_else(|| key.clone());
    warn!(
        original = %key,
        assigned = %assigned,
        "Duplicate residue identifier within window."
    );
    collected.insert(assigned.clone(), name.to_string());
    warnings.push(ReconstructionWarning::DuplicateIdentifier {
        original: key,
        assigned,
    });
}

/// Reconstructs region sequences by fetching their structures from a source,
/// falling back from PDB to mmCIF.
pub struct SequenceReconstructor<'s, S: StructureSource + ?Sized> {
    source: &'s S,
}

impl<'s, S: StructureSource + ?Sized> SequenceReconstructor<'s, S> {
    pub fn new(source: &'s S) -> Self {
        Self { source }
    }

    pub fn reconstruct_region(&self, region: &Region) -> Result<Reconstruction, ReconstructionError> {
        let [primary, fallback] = StructureFormat::LOOKUP_ORDER;

        let primary_error = match self.source.fetch(&region.structure_id, primary) {
            Ok(structure) => {
                return Ok(reconstruct(
                    &structure,
                    &region.chain_id,
                    region.start,
                    region.end,
                ));
            }
            Err(e) => e.to_string(),
        };

        match self.source.fetch(&region.structure_id, fallback) {
            Ok(structure) => {
                debug!(
                    region = %region.region_id,
                    "Primary format unavailable, using {}.", fallback
                );
                let mut result = reconstruct(&structure, &region.chain_id, region.start, region.end);
                result.warnings.insert(
                    0,
                    ReconstructionWarning::FallbackFormatUsed {
                        format: fallback,
                        reason: primary_error,
                    },
                );
                Ok(result)
            }
            Err(e) => Err(ReconstructionError::RetrievalFailure {
                structure_id: region.structure_id.clone(),
                primary: primary_error,
                fallback: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::structure::{MissingResidueEntry, StructureBuilder};
    use crate::engine::source::InMemorySource;

    fn missing(chain: &str, key: &str, name: &str) -> MissingResidueEntry {
        MissingResidueEntry {
            chain_id: chain.into(),
            key: ResidueKey::parse(key).unwrap(),
            residue_name: name.into(),
        }
    }

    #[test]
    fn reconstruct_treats_malformed_residues_as_missing() {
        let mut builder = StructureBuilder::new("1bad");
        builder.add_residue("A", 1, None, "ALA");
        builder.add_malformed_residue("A", "GLY", ResidueKey::parse("X").unwrap_err());
        builder.add_residue("A", 3, None, "CYS");
        builder.add_malformed_residue("B", "SER", ResidueKey::parse("Y").unwrap_err());
        let structure = builder.build();

        let result = reconstruct(&structure, "A", 1, 3);
        assert_eq!(result.sequence, "AC");
        assert_eq!(
            result.warnings,
            vec![
                ReconstructionWarning::MalformedIdentifier(ResidueKey::parse("X").unwrap_err()),
                ReconstructionWarning::LengthMismatch {
                    expected: 3,
                    actual: 2
                },
            ]
        );
    }

    #[test]
    fn reconstruct_fills_gaps_from_missing_listing() {
        let mut builder = StructureBuilder::new("1gap");
        builder.add_residue("A", 1, None, "ALA");
        builder.add_residue("A", 2, None, "CYS");
        builder.add_missing_residue(missing("A", "3", "GLY"));
        let structure = builder.build();

        let result = reconstruct(&structure, "A", 1, 3);
        assert_eq!(result.sequence, "ACG");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn reconstruct_orders_by_number_then_insertion_code() {
        let mut builder = StructureBuilder::new("1ord");
        builder.add_residue("A", 10, Some('A'), "GLY");
        builder.add_residue("A", 10, None, "ALA");
        builder.add_residue("A", 9, None, "CYS");
        builder.add_missing_residue(missing("A", "-1", "MET"));
        let structure = builder.build();

        let result = reconstruct(&structure, "A", -1, 10);
        assert_eq!(result.sequence, "MCAG");
        assert_eq!(
            result.warnings,
            vec![ReconstructionWarning::LengthMismatch {
                expected: 12,
                actual: 4
            }]
        );
    }

    #[test]
    fn reconstruct_marks_unknown_and_drops_solvent() {
        let mut builder = StructureBuilder::new("1unk");
        builder.add_residue("A", 1, None, "MSE");
        builder.add_residue("A", 2, None, "HOH");
        let structure = builder.build();

        let result = reconstruct(&structure, "A", 1, 2);
        assert_eq!(result.sequence, "X");
    }

    #[test]
    fn reconstruct_observed_residue_wins_over_listing() {
        let mut builder = StructureBuilder::new("1win");
        builder.add_residue("A", 1, None, "ALA");
        builder.add_missing_residue(missing("A", "1", "TRP"));
        builder.add_missing_residue(missing("A", "2", "TYR"));
        builder.add_missing_residue(missing("B", "3", "LYS"));
        let structure = builder.build();

        let result = reconstruct(&structure, "A", 1, 3);
        assert_eq!(result.sequence, "AY");
    }

    #[test]
    fn reconstruct_suffixes_duplicate_identifiers() {
        let mut builder = StructureBuilder::new("1dup");
        builder.add_residue("A", 5, None, "ALA");
        builder.add_residue("A", 6, None, "GLY");
        builder.add_residue("A", 5, None, "SER");
        let structure = builder.build();

        let result = reconstruct(&structure, "A", 5, 6);
        assert_eq!(result.sequence, "ASG");
        assert!(result.warnings.contains(&ReconstructionWarning::DuplicateIdentifier {
            original: ResidueKey::parse("5").unwrap(),
            assigned: ResidueKey::parse("5A").unwrap(),
        }));
    }

    #[test]
    fn reconstruct_skips_malformed_insertion_codes() {
        let mut builder = StructureBuilder::new("1bad");
        builder.add_residue("A", 1, None, "ALA");
        builder.add_residue("A", 2, Some('*'), "GLY");
        let structure = builder.build();

        let result = reconstruct(&structure, "A", 1, 2);
        assert_eq!(result.sequence, "A");
        assert!(matches!(
            result.warnings[0],
            ReconstructionWarning::MalformedIdentifier(_)
        ));
    }

    #[test]
    fn reconstruct_uses_first_model_containing_the_chain() {
        let mut builder = StructureBuilder::new("1nmr");
        builder.start_model(1);
        builder.add_residue("B", 1, None, "TRP");
        builder.start_model(2);
        builder.add_residue("A", 1, None, "ALA");
        builder.start_model(3);
        builder.add_residue("A", 1, None, "GLY");
        let structure = builder.build();

        assert_eq!(reconstruct(&structure, "A", 1, 1).sequence, "A");
    }

    #[test]
    fn reconstruct_of_absent_chain_is_empty() {
        let structure = StructureBuilder::new("1non").build();
        let result = reconstruct(&structure, "Z", 1, 2);
        assert_eq!(result.sequence, "");
    }

    fn region(structure: &str) -> Region {
        Region::new(&format!("{}A_1_2", structure), structure, "A", 1, 2, "3.3").unwrap()
    }

    #[test]
    fn reconstructor_falls_back_to_mmcif() {
        let mut builder = StructureBuilder::new("1cif");
        builder.add_residue("A", 1, None, "ALA");
        builder.add_residue("A", 2, None, "GLY");
        let mut source = InMemorySource::new();
        source.insert(StructureFormat::Mmcif, builder.build());

        let result = SequenceReconstructor::new(&source)
            .reconstruct_region(&region("1cif"))
            .unwrap();
        assert_eq!(result.sequence, "AG");
        assert!(matches!(
            result.warnings[0],
            ReconstructionWarning::FallbackFormatUsed {
                format: StructureFormat::Mmcif,
                ..
            }
        ));
    }

    #[test]
    fn reconstructor_prefers_pdb_when_present() {
        let mut pdb = StructureBuilder::new("1both");
        pdb.add_residue("A", 1, None, "CYS");
        let mut cif = StructureBuilder::new("1both");
        cif.add_residue("A", 1, None, "TRP");
        let mut source = InMemorySource::new();
        source
            .insert(StructureFormat::Pdb, pdb.build())
            .insert(StructureFormat::Mmcif, cif.build());

        let result = SequenceReconstructor::new(&source)
            .reconstruct_region(&region("1both"))
            .unwrap();
        assert_eq!(result.sequence, "C");
    }

    #[test]
    fn reconstructor_fails_when_both_formats_are_missing() {
        let source = InMemorySource::new();
        let err = SequenceReconstructor::new(&source)
            .reconstruct_region(&region("9zzz"))
            .unwrap_err();
        let ReconstructionError::RetrievalFailure { structure_id, .. } = err;
        assert_eq!(structure_id, "9zzz");
    }
}
