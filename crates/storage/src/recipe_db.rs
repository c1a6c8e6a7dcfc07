// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable recipe-name → installed-version mapping (spec.md §3, §4.2).
//!
//! Persisted as a JSON array sorted by recipe name. A non-existent file is
//! treated as an empty DB. Every mutation goes through [`RecipeDb::save`],
//! which performs a full atomic rewrite — there is no incremental append.

use crate::atomic::write_atomic;
use osconfig_core::Recipe;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecipeDbError {
    #[error("io error reading/writing recipe db at {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("recipe db at {path} is not valid JSON: {source}")]
    Parse { path: PathBuf, #[source] source: serde_json::Error },
}

/// Default POSIX location for the recipe DB (spec.md §6).
pub const DEFAULT_POSIX_PATH: &str = "/var/lib/google/osconfig_recipedb";

/// Default Windows location for the recipe DB (spec.md §6).
pub const DEFAULT_WINDOWS_PATH: &str = r"C:\ProgramData\Google\osconfig_recipedb";

#[derive(Debug, Clone)]
pub struct RecipeDb {
    path: PathBuf,
    recipes: BTreeMap<String, Recipe>,
}

impl RecipeDb {
    /// Load the DB from `path`. A missing file is an empty DB, not an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, RecipeDbError> {
        let path = path.into();
        let recipes = match std::fs::read(&path) {
            Ok(bytes) => {
                let list: Vec<Recipe> = serde_json::from_slice(&bytes)
                    .map_err(|source| RecipeDbError::Parse { path: path.clone(), source })?;
                list.into_iter().map(|r| (r.name.clone(), r)).collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(RecipeDbError::Io { path: path.clone(), source }),
        };
        Ok(Self { path, recipes })
    }

    pub fn get(&self, name: &str) -> Option<&Recipe> {
        self.recipes.get(name)
    }

    /// Insert or replace a recipe's record and persist the full DB.
    pub fn upsert(&mut self, recipe: Recipe) -> Result<(), RecipeDbError> {
        self.recipes.insert(recipe.name.clone(), recipe);
        self.save()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), RecipeDbError> {
        let list: Vec<&Recipe> = self.recipes.values().collect();
        let bytes = serde_json::to_vec_pretty(&list)
            .map_err(|source| RecipeDbError::Parse { path: self.path.clone(), source })?;
        write_atomic(&self.path, &bytes)
            .map_err(|source| RecipeDbError::Io { path: self.path.clone(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osconfig_core::RecipeVersion;

    fn recipe(name: &str, version: &str) -> Recipe {
        Recipe { name: name.into(), version: RecipeVersion::parse(version).unwrap(), install_time: 1, success: true }
    }

    #[test]
    fn missing_file_is_empty_db() {
        let dir = tempfile::tempdir().unwrap();
        let db = RecipeDb::load(dir.path().join("nope.json")).unwrap();
        assert!(db.get("foo").is_none());
    }

    #[test]
    fn upsert_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let mut db = RecipeDb::load(&path).unwrap();
        db.upsert(recipe("foo", "1.2.3")).unwrap();

        let reloaded = RecipeDb::load(&path).unwrap();
        assert_eq!(reloaded.get("foo").unwrap().version.to_string(), "1.2.3");
    }

    #[test]
    fn on_disk_array_is_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let mut db = RecipeDb::load(&path).unwrap();
        db.upsert(recipe("zeta", "1.0")).unwrap();
        db.upsert(recipe("alpha", "1.0")).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<Recipe> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[0].name, "alpha");
        assert_eq!(parsed[1].name, "zeta");
    }

    #[test]
    fn upsert_replaces_existing_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let mut db = RecipeDb::load(&path).unwrap();
        db.upsert(recipe("foo", "1.0")).unwrap();
        db.upsert(recipe("foo", "2.0")).unwrap();
        assert_eq!(db.get("foo").unwrap().version.to_string(), "2.0");
    }
}
