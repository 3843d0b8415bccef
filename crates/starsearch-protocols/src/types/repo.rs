//! Repository records.

use serde::{Deserialize, Serialize};

/// A starred repository as materialised by the fetch stage.
///
/// Field names follow the hosting service's JSON so a raw API dump can be
/// deserialised directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoRecord {
    pub id: i64,
    pub full_name: String,
    pub name: String,
    #[serde(default)]
    pub owner: String,
    pub html_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub stargazers_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starred_at: Option<String>,
}

impl RepoRecord {
    pub fn new(id: i64, full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let (owner, name) = match full_name.split_once('/') {
            Some((owner, name)) => (owner.to_string(), name.to_string()),
            None => (String::new(), full_name.clone()),
        };
        Self {
            id,
            html_url: format!("https://github.com/{}", full_name),
            full_name,
            name,
            owner,
            description: None,
            homepage: None,
            language: None,
            topics: Vec::new(),
            stargazers_count: 0,
            updated_at: None,
            created_at: None,
            starred_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_stars(mut self, stars: i64) -> Self {
        self.stargazers_count = stars;
        self
    }

    /// Text fed to the embedding model: `"owner/name: description"`.
    pub fn search_text(&self) -> String {
        match self.description.as_deref() {
            Some(desc) if !desc.is_empty() => format!("{}: {}", self.full_name, desc),
            _ => self.full_name.clone(),
        }
    }
}

/// Metadata row returned with every search result.
///
/// Owned by the row store; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoMetadata {
    #[serde(rename = "id")]
    pub entity_id: i64,
    pub full_name: String,
    pub description: Option<String>,
    #[serde(rename = "html_url")]
    pub url: String,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Popularity proxy (star count).
    #[serde(rename = "stargazers_count")]
    pub popularity: i64,
}

impl From<&RepoRecord> for RepoMetadata {
    fn from(record: &RepoRecord) -> Self {
        Self {
            entity_id: record.id,
            full_name: record.full_name.clone(),
            description: record.description.clone(),
            url: record.html_url.clone(),
            language: record.language.clone(),
            topics: record.topics.clone(),
            popularity: record.stargazers_count,
        }
    }
}

#[cfg(test)]
#[path = "repo_tests.rs"]
mod tests;
