//! File-backed plan store: one TOML document per user

use super::{Catalog, PlanStore, StoreError};
use crate::core::models::{
    CompletedRecord, FlowchartPlacement, ScheduledPlacement, SectionId, Semester,
};
use crate::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
struct UserDocument {
    #[serde(default)]
    completed: Vec<CompletedRecord>,
    #[serde(default)]
    schedules: Vec<StoredSchedule>,
    #[serde(default)]
    flowchart: Vec<FlowchartPlacement>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSchedule {
    semester: Semester,
    #[serde(default)]
    sections: Vec<SectionId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    colors: BTreeMap<SectionId, String>,
}

/// Plan store writing `<data_dir>/<user>.toml`
///
/// Stored schedules hold section ids only; they are resolved back into full
/// sections through the catalog on read. Ids the catalog does not know are
/// skipped on read and kept on write, so a catalog missing a section never
/// erases it from the student's file.
#[derive(Debug, Clone)]
pub struct FileStore<C> {
    data_dir: PathBuf,
    catalog: C,
}

impl<C: Catalog> FileStore<C> {
    /// Create a store rooted at `data_dir`
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>, catalog: C) -> Self {
        Self {
            data_dir: data_dir.into(),
            catalog,
        }
    }

    /// Directory holding the user documents
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Catalog used to resolve section ids
    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Path of the document for `user`
    ///
    /// # Errors
    /// Returns an error if `user` is empty or contains path separators
    pub fn user_path(&self, user: &str) -> Result<PathBuf, StoreError> {
        let valid = !user.is_empty()
            && user
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !user.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidUser(user.to_string()));
        }
        Ok(self.data_dir.join(format!("{user}.toml")))
    }

    fn read_document(&self, user: &str) -> Result<UserDocument, StoreError> {
        let path = self.user_path(user)?;
        if !path.exists() {
            debug!("No plan file for '{user}' at {}, starting empty", path.display());
            return Ok(UserDocument::default());
        }
        let contents = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| StoreError::Parse { path, source })
    }

    fn update_document<F>(&self, user: &str, edit: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut UserDocument),
    {
        let mut document = self.read_document(user)?;
        edit(&mut document);

        let path = self.user_path(user)?;
        fs::create_dir_all(&self.data_dir).map_err(|source| StoreError::Io {
            path: self.data_dir.clone(),
            source,
        })?;
        let contents = toml::to_string_pretty(&document)?;
        fs::write(&path, contents).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("Wrote plan file {}", path.display());
        Ok(())
    }

    /// Stored sections of `semester` the catalog cannot resolve, with colors
    fn unresolved_sections(
        &self,
        user: &str,
        semester: &Semester,
    ) -> Result<Vec<(SectionId, Option<String>)>, StoreError> {
        let document = self.read_document(user)?;
        let Some(stored) = document.schedules.into_iter().find(|s| &s.semester == semester) else {
            return Ok(Vec::new());
        };
        let mut unresolved = Vec::new();
        for id in stored.sections {
            if self.catalog.get_section(&id)?.is_none() {
                let color = stored.colors.get(&id).cloned();
                unresolved.push((id, color));
            }
        }
        Ok(unresolved)
    }
}

impl<C: Catalog> PlanStore for FileStore<C> {
    fn get_completed_courses(&self, user: &str) -> Result<Vec<CompletedRecord>, StoreError> {
        Ok(self.read_document(user)?.completed)
    }

    fn put_completed_courses(
        &mut self,
        user: &str,
        records: &[CompletedRecord],
    ) -> Result<(), StoreError> {
        self.update_document(user, |doc| doc.completed = records.to_vec())
    }

    fn get_schedule(
        &self,
        user: &str,
        semester: &Semester,
    ) -> Result<Vec<ScheduledPlacement>, StoreError> {
        let document = self.read_document(user)?;
        let Some(stored) = document.schedules.into_iter().find(|s| &s.semester == semester) else {
            return Ok(Vec::new());
        };

        let mut placements = Vec::with_capacity(stored.sections.len());
        for id in stored.sections {
            match self.catalog.get_section(&id)? {
                Some(section) => placements.push(ScheduledPlacement {
                    color: stored.colors.get(&id).cloned(),
                    section,
                }),
                None => warn!("Section {id} in {user}'s {semester} schedule is not in the catalog, skipping"),
            }
        }
        Ok(placements)
    }

    fn put_schedule(
        &mut self,
        user: &str,
        semester: &Semester,
        section_ids: &[SectionId],
        colors: &BTreeMap<SectionId, String>,
    ) -> Result<(), StoreError> {
        let mut sections = section_ids.to_vec();
        let mut kept_colors: BTreeMap<SectionId, String> = colors
            .iter()
            .filter(|(id, _)| section_ids.contains(id))
            .map(|(id, color)| (id.clone(), color.clone()))
            .collect();
        for (id, color) in self.unresolved_sections(user, semester)? {
            if sections.contains(&id) {
                continue;
            }
            debug!("Keeping section {id} in {user}'s {semester} schedule until the catalog lists it");
            if let Some(color) = color {
                kept_colors.insert(id.clone(), color);
            }
            sections.push(id);
        }

        let stored = StoredSchedule {
            semester: *semester,
            sections,
            colors: kept_colors,
        };
        self.update_document(user, |doc| {
            match doc.schedules.iter_mut().find(|s| s.semester == stored.semester) {
                Some(existing) => *existing = stored,
                None => doc.schedules.push(stored),
            }
            doc.schedules.sort_by_key(|s| s.semester);
        })
    }

    fn get_flowchart(&self, user: &str) -> Result<Vec<FlowchartPlacement>, StoreError> {
        Ok(self.read_document(user)?.flowchart)
    }

    fn put_flowchart(
        &mut self,
        user: &str,
        nodes: &[FlowchartPlacement],
    ) -> Result<(), StoreError> {
        self.update_document(user, |doc| doc.flowchart = nodes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::FileCatalog;
    use crate::core::schedule::{DayFallback, ParseDiagnostics};

    fn store(dir: &Path) -> FileStore<FileCatalog> {
        let catalog = FileCatalog::from_toml(
            "[[sections]]\nid = \"1\"\ncourse = \"CS 2114\"\ntime = \"MWF 9:05 am-9:55 am\"\n",
            DayFallback::Monday,
            &mut ParseDiagnostics::new(),
        )
        .unwrap();
        FileStore::new(dir, catalog)
    }

    #[test]
    fn test_rejects_path_like_users() {
        let tmp = tempfile::tempdir().unwrap();
        let s = store(tmp.path());
        assert!(s.user_path("../etc/passwd").is_err());
        assert!(s.user_path("").is_err());
        assert!(s.user_path(".hidden").is_err());
        assert!(s.user_path("jdoe-2").is_ok());
    }

    #[test]
    fn test_missing_user_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let s = store(tmp.path());
        assert!(s.get_completed_courses("nobody").unwrap().is_empty());
        assert!(s.get_flowchart("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_sections_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = store(tmp.path());
        let fall: Semester = "Fall 2025".parse().unwrap();
        let ids = vec![SectionId::from("1"), SectionId::from("999")];
        let mut colors = BTreeMap::new();
        colors.insert(SectionId::from("1"), "#336699".to_string());

        s.put_schedule("jdoe", &fall, &ids, &colors).unwrap();
        let placements = s.get_schedule("jdoe", &fall).unwrap();
        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].color.as_deref(), Some("#336699"));
        assert!(s.get_schedule("jdoe", &"Spring 2026".parse().unwrap()).unwrap().is_empty());
    }
}
