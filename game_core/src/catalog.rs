use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One puzzle answer as it appears in a category file
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, getset::CopyGetters, getset::Getters)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[getset(get = "pub")]
    answer: String,
    #[getset(get = "pub")]
    category: String,
    #[serde(default)]
    #[getset(get_copy = "pub")]
    number_of_words: usize,
    #[serde(default)]
    #[getset(get_copy = "pub")]
    number_of_letters: usize,
}

#[derive(Debug, Deserialize)]
struct CategoryFile {
    answers: Vec<Answer>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("category directory [{0}] could not be read: {1}")]
    MissingDirectory(PathBuf, #[source] std::io::Error),
    #[error("bad category glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("could not read category file [{0}]: {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("could not parse category file [{0}]: {1}")]
    Parse(PathBuf, #[source] serde_json::Error),
}

/// Every category and answer available to a game
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    categories: Vec<String>,
    answers: Arc<[Answer]>,
}

impl Answer {
    /// Builds an answer, deriving the word and letter counts from the phrase
    pub fn new<A: Into<String>, C: Into<String>>(answer: A, category: C) -> Self {
        let answer = answer.into();
        Answer {
            number_of_words: answer.split_whitespace().count(),
            number_of_letters: answer.chars().filter(|c| c.is_alphabetic()).count(),
            answer,
            category: category.into(),
        }
    }
}

impl Catalog {
    pub fn new<I: IntoIterator<Item = (String, Vec<Answer>)>>(categories: I) -> Self {
        let mut names = Vec::new();
        let mut answers = Vec::new();
        for (name, category_answers) in categories {
            names.push(name);
            answers.extend(category_answers);
        }
        Catalog {
            categories: names,
            answers: answers.into(),
        }
    }

    /// Loads every `*.json` category file in `dir`. Files that cannot be read
    /// or parsed are skipped with a warning, a missing directory is an error.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        fs::read_dir(dir).map_err(|e| CatalogError::MissingDirectory(dir.to_path_buf(), e))?;
        let pattern = dir.join("*.json");
        let mut paths: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
            .filter_map(|path| match path {
                Ok(path) => Some(path),
                Err(e) => {
                    log::warn!("Skipping unreadable category path: {e}");
                    None
                },
            })
            .collect();
        paths.sort();

        let mut categories = Vec::new();
        for path in paths {
            match Self::load_file(&path) {
                Ok(category) => {
                    log::debug!(
                        "Found category file {} with {} answers",
                        path.to_string_lossy(),
                        category.1.len()
                    );
                    categories.push(category)
                },
                Err(e) => log::warn!("{e}"),
            }
        }
        let catalog = Catalog::new(categories);
        log::info!(
            "Loaded {} categories with {} answers from {}",
            catalog.categories.len(),
            catalog.answers.len(),
            dir.to_string_lossy()
        );
        Ok(catalog)
    }

    fn load_file(path: &Path) -> Result<(String, Vec<Answer>), CatalogError> {
        let contents =
            fs::read_to_string(path).map_err(|e| CatalogError::Read(path.to_path_buf(), e))?;
        let file: CategoryFile = serde_json::from_str(&contents)
            .map_err(|e| CatalogError::Parse(path.to_path_buf(), e))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok((name, file.answers))
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// The shared answer pool handed to every game
    pub fn answers(&self) -> Arc<[Answer]> {
        Arc::clone(&self.answers)
    }

    pub fn answer_count(&self) -> usize {
        self.answers.len()
    }
}
