//! Department → stage lookup table.
//!
//! Workers carry the department name the roster uses; matching goes through
//! this table so department names can drift from stage identifiers.

use crate::error::{Error, Result};
use crate::model::StageId;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Top-level TOML wrapper.
#[derive(Debug, Deserialize)]
struct DepartmentConfig {
    #[serde(default, rename = "department")]
    departments: Vec<DepartmentEntry>,
}

/// One `[[department]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentEntry {
    pub name: String,
    pub stage: StageId,
}

/// Registry of department names, indexed case-insensitively.
#[derive(Debug, Clone)]
pub struct DepartmentMap {
    stages: HashMap<String, StageId>,
}

impl DepartmentMap {
    /// A map with no departments at all.
    pub fn empty() -> Self {
        Self {
            stages: HashMap::new(),
        }
    }

    /// The workshop's stock departments, one per work stage.
    pub fn standard() -> Self {
        let mut map = Self::empty();
        for stage in StageId::WORK_STAGES {
            map.stages.insert(stage.as_str().to_string(), stage);
        }
        map
    }

    /// Add or replace a mapping. Only work stages may be targeted.
    pub fn insert(&mut self, name: impl AsRef<str>, stage: StageId) -> Result<()> {
        let name = name.as_ref();
        if !stage.takes_tasks() {
            return Err(Error::Config(format!(
                "department {name:?} maps to stage {stage}, which takes no tasks"
            )));
        }
        self.stages.insert(normalize(name), stage);
        Ok(())
    }

    pub fn with(mut self, name: impl AsRef<str>, stage: StageId) -> Result<Self> {
        self.insert(name, stage)?;
        Ok(self)
    }

    /// Parse a `[[department]]` TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: DepartmentConfig = toml::from_str(content)?;
        let mut map = Self::empty();
        for entry in config.departments {
            map.insert(&entry.name, entry.stage)?;
        }
        Ok(map)
    }

    /// Load a department map file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read department map {}: {e}", path.display()))
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            Error::Toml(e) => {
                Error::Config(format!("bad department map {}: {e}", path.display()))
            }
            other => other,
        })
    }

    /// The stage a department works on.
    pub fn stage_for(&self, department: &str) -> Result<StageId> {
        self.stages
            .get(&normalize(department))
            .copied()
            .ok_or_else(|| Error::UnknownDepartmentMapping(department.to_string()))
    }

    /// Department names mapped to `stage`, sorted.
    pub fn departments_for(&self, stage: StageId) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .stages
            .iter()
            .filter(|(_, s)| **s == stage)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Default for DepartmentMap {
    fn default() -> Self {
        Self::standard()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
