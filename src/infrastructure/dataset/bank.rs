use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::tagged::parse_tagged;
use super::tree_instruct::parse_tree_instruct;
use super::DatasetError;
use crate::domain::errors::DomainError;
use crate::domain::models::{Problem, ProblemBankConfig, ProblemFormat};
use crate::domain::ports::ProblemBank;

/// Problems loaded from text files on disk
#[derive(Debug, Clone)]
pub struct FileProblemBank {
    problems: Vec<Problem>,
}

impl FileProblemBank {
    /// Load, validate and order every configured problem.
    ///
    /// With no explicit entries, `directory` is scanned for `<n>.txt` tagged
    /// files. `limit` keeps only the first problems by id.
    pub fn load(config: &ProblemBankConfig, limit: Option<usize>) -> Result<Self, DatasetError> {
        let mut problems = if config.entries.is_empty() {
            Self::scan_directory(&config.directory)?
        } else {
            config
                .entries
                .iter()
                .map(|entry| {
                    let path = resolve(&config.directory, &entry.file);
                    load_file(&path, entry.id, entry.format)
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        problems.sort_by_key(|p| p.id);
        Self::from_problems_limited(problems, limit)
    }

    /// Build a bank from already-parsed problems
    pub fn from_problems(problems: Vec<Problem>) -> Result<Self, DatasetError> {
        Self::from_problems_limited(problems, None)
    }

    /// Take ownership of the loaded problems, ordered by id
    pub fn into_problems(self) -> Vec<Problem> {
        self.problems
    }

    fn from_problems_limited(
        mut problems: Vec<Problem>,
        limit: Option<usize>,
    ) -> Result<Self, DatasetError> {
        let mut seen = HashSet::new();
        for problem in &problems {
            problem.validate()?;
            if !seen.insert(problem.id) {
                return Err(DomainError::DuplicateProblem(problem.id).into());
            }
        }
        if let Some(limit) = limit {
            problems.truncate(limit);
        }
        if problems.is_empty() {
            return Err(DomainError::NoProblems.into());
        }

        info!(count = problems.len(), "problem bank loaded");
        Ok(Self { problems })
    }

    fn scan_directory(directory: &Path) -> Result<Vec<Problem>, DatasetError> {
        if !directory.is_dir() {
            return Err(DatasetError::NotFound(directory.to_path_buf()));
        }

        let entries = fs::read_dir(directory).map_err(|source| DatasetError::Io {
            path: directory.to_path_buf(),
            source,
        })?;

        let mut problems = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| DatasetError::Io {
                    path: directory.to_path_buf(),
                    source,
                })?
                .path();
            let Some(id) = numeric_stem(&path) else {
                debug!(path = %path.display(), "skipping non-problem file");
                continue;
            };
            problems.push(load_file(&path, id, ProblemFormat::Tagged)?);
        }
        Ok(problems)
    }
}

impl ProblemBank for FileProblemBank {
    fn problems(&self) -> &[Problem] {
        &self.problems
    }
}

/// Parse one problem file in the given format
pub fn load_file(path: &Path, id: u32, format: ProblemFormat) -> Result<Problem, DatasetError> {
    if !path.is_file() {
        return Err(DatasetError::NotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), id, ?format, "parsing problem file");

    match format {
        ProblemFormat::Tagged => parse_tagged(&text, id),
        ProblemFormat::TreeInstruct => parse_tree_instruct(&text, id),
    }
}

/// Id for files named `<digits>.txt`
fn numeric_stem(path: &Path) -> Option<u32> {
    if path.extension()? != "txt" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

fn resolve(directory: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        directory.join(file)
    }
}
