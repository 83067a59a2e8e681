use std::collections::BTreeMap;
use std::path::Path;

use lpkit_model::{Atom, Constraint, Expression, Model, Relation};
use serde::Deserialize;

use crate::error::CliError;

/// A model as written in a JSON model file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelFile {
    #[serde(default = "default_name")]
    pub name: String,
    pub variables: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<ConstraintEntry>,
    pub objective: Option<ObjectiveEntry>,
    /// Restrict every variable to integer values
    #[serde(default)]
    pub integer: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstraintEntry {
    pub terms: BTreeMap<String, f64>,
    pub relation: RelationSymbol,
    pub bound: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub enum RelationSymbol {
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = ">=")]
    Ge,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sense {
    Max,
    Min,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectiveEntry {
    pub sense: Sense,
    pub terms: BTreeMap<String, f64>,
}

fn default_name() -> String {
    "model".to_string()
}

impl From<RelationSymbol> for Relation {
    fn from(relation: RelationSymbol) -> Self {
        match relation {
            RelationSymbol::Le => Relation::Le,
            RelationSymbol::Eq => Relation::Eq,
            RelationSymbol::Ge => Relation::Ge,
        }
    }
}

impl ModelFile {
    pub fn read(path: &Path) -> Result<Self, CliError> {
        let source = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source)
    }

    pub fn parse(source: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Builds the symbolic model. Terms may only name declared variables.
    pub fn to_model(&self) -> Result<Model, CliError> {
        let mut model = Model::new(self.name.as_str());
        for name in self.variables.iter() {
            model.create_variable(name)?;
        }

        for entry in self.constraints.iter() {
            let expression = expression(&model, &entry.terms)?;
            model.add_constraint(Constraint::new(expression, entry.bound, entry.relation.into()));
        }

        if let Some(objective) = &self.objective {
            let expression = expression(&model, &objective.terms)?;
            match objective.sense {
                Sense::Max => model.maximize(expression),
                Sense::Min => model.minimize(expression),
            }
        }

        tracing::debug!(
            model = %self.name,
            variables = model.num_variables(),
            constraints = model.num_constraints(),
            "loaded model file"
        );
        Ok(model)
    }
}

fn expression(model: &Model, terms: &BTreeMap<String, f64>) -> Result<Expression, CliError> {
    terms
        .iter()
        .map(|(name, &factor)| {
            let variable = model
                .variable(name)
                .ok_or_else(|| CliError::UnknownVariable(name.clone()))?;
            Ok(Atom::new(variable.clone(), factor))
        })
        .collect()
}
