use serde::{Deserialize, Serialize};

/// The user's current input snapshot.
///
/// Values are free strings: anything not in the coefficient table scores 0.
/// `skills` behaves as an ordered set (selection order kept, no duplicates).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub seniority: String,
    pub location: String,
    pub industry: String,
    #[serde(default, deserialize_with = "deserialize_skill_set")]
    pub skills: Vec<String>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            seniority: "Mid-Level".to_string(),
            location: "United States".to_string(),
            industry: "Technology".to_string(),
            skills: Vec::new(),
        }
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectionPatch {
    pub seniority: Option<String>,
    pub location: Option<String>,
    pub industry: Option<String>,
    /// Replaces the whole skill set when present.
    pub skills: Option<Vec<String>>,
}

impl Selection {
    pub fn apply(&mut self, patch: SelectionPatch) {
        if let Some(seniority) = patch.seniority {
            self.seniority = seniority;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(industry) = patch.industry {
            self.industry = industry;
        }
        if let Some(skills) = patch.skills {
            self.skills = dedup_skills(skills);
        }
    }

    /// Adds the skill if absent, removes it if present. Returns whether it is now selected.
    pub fn toggle_skill(&mut self, skill: &str) -> bool {
        if let Some(pos) = self.skills.iter().position(|s| s == skill) {
            self.skills.remove(pos);
            false
        } else {
            self.skills.push(skill.to_string());
            true
        }
    }
}

/// Collapses duplicates, keeping the first occurrence.
fn dedup_skills(skills: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        if !out.contains(&skill) {
            out.push(skill);
        }
    }
    out
}

fn deserialize_skill_set<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Vec::<String>::deserialize(deserializer).map(dedup_skills)
}
