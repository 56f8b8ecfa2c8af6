use super::chain::Chain;
use super::ids::{ChainId, ResidueId};
use super::residue::StructuralResidue;
use crate::core::utils::identifiers::{ResidueKey, ResidueKeyError};
use slotmap::SlotMap;
use std::collections::HashMap;

/// A residue listed in a structure's supplemental "missing residues" annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingResidueEntry {
    pub chain_id: String,
    pub key: ResidueKey,
    pub residue_name: String,
}

/// A residue record whose identifier could not be read. The residue itself is
/// left out of its chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedResidueEntry {
    pub chain_id: String,
    pub residue_name: String,
    pub model: usize,
    pub error: ResidueKeyError,
}

/// One coordinate model of a structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    pub serial: usize,
    chains: Vec<ChainId>,
    chain_id_map: HashMap<String, ChainId>,
}

impl Model {
    pub fn chains(&self) -> &[ChainId] {
        &self.chains
    }

    pub fn find_chain(&self, chain_id: &str) -> Option<ChainId> {
        self.chain_id_map.get(chain_id).copied()
    }
}

/// A parsed structural record reduced to residue level.
///
/// Residues and chains live in slot maps and are referenced from models through
/// stable ids, so a chain of a given model can be walked in file order without
/// copying residues around.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    id: String,
    residues: SlotMap<ResidueId, StructuralResidue>,
    chains: SlotMap<ChainId, Chain>,
    models: Vec<Model>,
    missing_residues: Vec<MissingResidueEntry>,
    malformed_residues: Vec<MalformedResidueEntry>,
}

impl Structure {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    pub fn residue(&self, id: ResidueId) -> Option<&StructuralResidue> {
        self.residues.get(id)
    }

    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    pub fn missing_residues(&self) -> &[MissingResidueEntry] {
        &self.missing_residues
    }

    pub fn malformed_residues(&self) -> &[MalformedResidueEntry] {
        &self.malformed_residues
    }

    /// Iterates over the residues of `chain_id` in the model at `model_index`,
    /// in file order. Yields nothing if the model or chain does not exist.
    pub fn chain_residues<'a>(
        &'a self,
        model_index: usize,
        chain_id: &str,
    ) -> impl Iterator<Item = &'a StructuralResidue> + 'a {
        self.models
            .get(model_index)
            .and_then(|model| model.find_chain(chain_id))
            .and_then(|id| self.chains.get(id))
            .into_iter()
            .flat_map(|chain| chain.residues().iter())
            .filter_map(|id| self.residues.get(*id))
    }
}

#[derive(Debug, Default)]
pub struct StructureBuilder {
    structure: Structure,
    current_model: Option<usize>,
}

impl StructureBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            structure: Structure {
                id: id.to_string(),
                ..Structure::default()
            },
            current_model: None,
        }
    }

    /// Opens a new model; subsequent residues are attached to it.
    pub fn start_model(&mut self, serial: usize) -> &mut Self {
        self.structure.models.push(Model {
            serial,
            ..Model::default()
        });
        self.current_model = Some(self.structure.models.len() - 1);
        self
    }

    /// Appends a residue to the current model, opening model 1 implicitly when
    /// the source declares no models.
    pub fn add_residue(
        &mut self,
        chain_id: &str,
        number: isize,
        insertion_code: Option<char>,
        name: &str,
    ) -> ResidueId {
        let model_index = self.current_model_index();

        let residue_id = self.structure.residues.insert(StructuralResidue {
            chain_id: chain_id.to_string(),
            number,
            insertion_code,
            name: name.to_string(),
            model: model_index,
        });

        let model = &mut self.structure.models[model_index];
        let chains = &mut self.structure.chains;
        let chain_key = *model
            .chain_id_map
            .entry(chain_id.to_string())
            .or_insert_with(|| chains.insert(Chain::new(chain_id, model_index)));
        if !model.chains.contains(&chain_key) {
            model.chains.push(chain_key);
        }
        if let Some(chain) = chains.get_mut(chain_key) {
            chain.residues.push(residue_id);
        }

        residue_id
    }

    /// Records a residue of the current model whose identifier is unreadable.
    pub fn add_malformed_residue(
        &mut self,
        chain_id: &str,
        residue_name: &str,
        error: ResidueKeyError,
    ) -> &mut Self {
        let model = self.current_model_index();
        self.structure.malformed_residues.push(MalformedResidueEntry {
            chain_id: chain_id.to_string(),
            residue_name: residue_name.to_string(),
            model,
            error,
        });
        self
    }

    fn current_model_index(&mut self) -> usize {
        match self.current_model {
            Some(index) => index,
            None => {
                self.start_model(1);
                self.structure.models.len() - 1
            }
        }
    }

    pub fn add_missing_residue(&mut self, entry: MissingResidueEntry) -> &mut Self {
        self.structure.missing_residues.push(entry);
        self
    }

    pub fn build(self) -> Structure {
        self.structure
    }
}
