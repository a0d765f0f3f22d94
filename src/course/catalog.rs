use std::path::Path;
use thiserror::Error;

use crate::models::Lesson;

const BUNDLED_LESSONS: &str = include_str!("../../lessons.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read lessons file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid lessons JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("lesson {0} has an empty title")]
    EmptyTitle(usize),
}

/// Неизменяемый упорядоченный список уроков. Урок идентифицируется своей
/// позицией.
#[derive(Debug, Clone, Default)]
pub struct LessonCatalog {
    lessons: Vec<Lesson>,
}

impl LessonCatalog {
    pub fn new(lessons: Vec<Lesson>) -> Result<Self, CatalogError> {
        if let Some(idx) = lessons.iter().position(|l| l.title.trim().is_empty()) {
            return Err(CatalogError::EmptyTitle(idx));
        }

        let last = lessons.len().saturating_sub(1);
        for (idx, lesson) in lessons.iter().enumerate() {
            if lesson.is_final && idx != last {
                log::warn!("⚠️ Lesson {} ('{}') is final but not last in the catalog", idx, lesson.title);
            }
        }
        Ok(Self { lessons })
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(raw)?)
    }

    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_LESSONS)
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn get(&self, index: usize) -> Option<&Lesson> {
        self.lessons.get(index)
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_ends_with_final_lesson() {
        let catalog = LessonCatalog::bundled().unwrap();
        assert!(!catalog.is_empty());
        let last = catalog.get(catalog.len() - 1).unwrap();
        assert!(last.is_final);
        assert!((0..catalog.len() - 1).all(|i| !catalog.get(i).unwrap().is_final));
    }

    #[test]
    fn is_final_defaults_to_false() {
        let catalog = LessonCatalog::from_json(r#"[{"title": "Один", "text": "…"}]"#).unwrap();
        assert!(!catalog.get(0).unwrap().is_final);
        assert!(catalog.get(1).is_none());
    }

    #[test]
    fn empty_title_is_rejected() {
        let err = LessonCatalog::from_json(r#"[{"title": "ok", "text": ""}, {"title": " ", "text": ""}]"#).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyTitle(1)));
    }

    #[test]
    fn empty_catalog_is_allowed() {
        assert!(LessonCatalog::from_json("[]").unwrap().is_empty());
    }
}
