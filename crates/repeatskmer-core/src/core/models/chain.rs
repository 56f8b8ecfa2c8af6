use super::ids::ResidueId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub id: String,                      // Chain identifier (e.g., "A", "AA" in mmCIF)
    pub model: usize,                    // Index of the owning model
    pub(crate) residues: Vec<ResidueId>, // Residues in file order
}

impl Chain {
    pub(crate) fn new(id: &str, model: usize) -> Self {
        Self {
            id: id.to_string(),
            model,
            residues: Vec::new(),
        }
    }

    pub fn residues(&self) -> &[ResidueId] {
        &self.residues
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }
}
