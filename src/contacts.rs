use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use strsim::normalized_levenshtein;

/// Minimum similarity for a fuzzy contact-name match.
const SIMILARITY_CUTOFF: f64 = 0.6;

/// Name → address book, loaded once at startup from a two-column CSV
/// (name, email; no header row). Read-only for the session.
#[derive(Debug, Default)]
pub struct ContactBook {
    by_name: HashMap<String, String>,
}

impl ContactBook {
    /// Load from `path`. A missing file is an empty book, not an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("no contact list at {}", path.display());
            return Ok(Self::default());
        }
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;
        Self::from_csv(reader)
    }

    fn from_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let mut by_name = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let (Some(name), Some(email)) = (record.get(0), record.get(1)) else {
                continue;
            };
            let (name, email) = (name.trim(), email.trim());
            if !name.is_empty() && !email.is_empty() {
                by_name.insert(name.to_lowercase(), email.to_string());
            }
        }
        Ok(Self { by_name })
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Address for a spoken name: case-insensitive exact match first,
    /// then the most similar known name above the cutoff.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        let wanted = name.trim().to_lowercase();
        if let Some(email) = self.by_name.get(&wanted) {
            return Some(email);
        }
        self.by_name
            .iter()
            .map(|(known, email)| (normalized_levenshtein(&wanted, known), email))
            .filter(|(score, _)| *score >= SIMILARITY_CUTOFF)
            .max_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, email)| email.as_str())
    }
}
