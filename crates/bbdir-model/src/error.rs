use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("duplicate id {id} in {sheet}")]
    DuplicateId { sheet: String, id: String },

    #[error("row {row} of {sheet} has no id")]
    MissingId { sheet: String, row: usize },

    #[error("{id} not found in {sheet}")]
    NotFound { sheet: String, id: String },

    #[error("collection {collection} has no biobank reference")]
    MissingBiobankReference { collection: String },

    #[error("collection {collection} references unknown biobank {biobank}")]
    UnknownBiobank { collection: String, biobank: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
