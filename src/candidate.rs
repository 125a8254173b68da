use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// One selectable record. `label` doubles as the committed value and is
/// assumed (not enforced) to be unique within a session's candidate set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub code: String,
    pub label: String,
    pub phone: String,
}

impl Candidate {
    pub fn new(
        code: impl Into<String>,
        label: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            phone: phone.into(),
        }
    }

    /// Composite text the name field is matched against.
    pub fn display_name(&self) -> String {
        format!("{} | {}", self.code, self.label)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.code.trim().is_empty() {
            return Err("code must not be blank".to_string());
        }
        if self.label.trim().is_empty() {
            return Err("label must not be blank".to_string());
        }
        if !phone_pattern().is_match(&self.phone) {
            return Err(format!("phone {:?} is not a dialing prefix", self.phone));
        }
        Ok(())
    }
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+?[0-9][0-9 \-]*$").expect("Invalid phone pattern"))
}

pub fn load_candidates(path: &Path) -> Result<Vec<Candidate>, String> {
    let raw = fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => parse_candidates_yaml(&raw),
        Some("json") => parse_candidates_json(&raw),
        _ => Err(format!(
            "{}: expected a .yaml, .yml or .json dataset",
            path.display()
        )),
    }
}

pub fn parse_candidates_yaml(raw: &str) -> Result<Vec<Candidate>, String> {
    let candidates: Vec<Candidate> = serde_yaml::from_str(raw).map_err(|e| e.to_string())?;
    validate_all(&candidates)?;
    Ok(candidates)
}

pub fn parse_candidates_json(raw: &str) -> Result<Vec<Candidate>, String> {
    let candidates: Vec<Candidate> = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    validate_all(&candidates)?;
    Ok(candidates)
}

fn validate_all(candidates: &[Candidate]) -> Result<(), String> {
    for (index, candidate) in candidates.iter().enumerate() {
        candidate
            .validate()
            .map_err(|e| format!("candidate #{}: {}", index, e))?;
    }
    Ok(())
}
