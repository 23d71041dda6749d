use serde::{Deserialize, Serialize};

use stockbook_core::{DomainResult, LedgerError, ProductId, impl_entity};

/// Immutable product reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    /// Selling unit label (e.g. "carton", "kg").
    unit: String,
}

impl_entity!(Product, ProductId);

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, unit: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        let unit = unit.into();
        if name.trim().is_empty() {
            return Err(LedgerError::validation("product name cannot be empty"));
        }
        if unit.trim().is_empty() {
            return Err(LedgerError::validation("product unit cannot be empty"));
        }
        Ok(Self { id, name, unit })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }
}
