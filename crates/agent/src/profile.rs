//! The student profile shared by all three agents.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// One project on the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    #[serde(rename = "desc")]
    pub description: String,
}

/// Everything the agents have collected about one student.
///
/// `branch` is last-write-wins, `skills` is replaced wholesale on each
/// save, `projects` only ever grows. Fields that were never saved are
/// omitted from the JSON rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<Project>,
}

impl StudentProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.branch.is_none() && self.skills.is_empty() && self.projects.is_empty()
    }
}

/// Handle shared between the tools and the shell.
pub type SharedProfile = Arc<Mutex<StudentProfile>>;

/// Fresh empty profile behind its lock.
pub fn shared_profile() -> SharedProfile {
    Arc::new(Mutex::new(StudentProfile::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_is_empty() {
        let profile = StudentProfile::new();
        assert!(profile.is_empty());
        assert!(profile.branch.is_none());
        assert!(profile.skills.is_empty());
        assert!(profile.projects.is_empty());
    }

    #[test]
    fn test_profile_with_branch_is_not_empty() {
        let profile = StudentProfile {
            branch: Some("CSE".to_string()),
            ..Default::default()
        };
        assert!(!profile.is_empty());
    }

    #[test]
    fn test_empty_profile_serializes_to_empty_object() {
        let profile = StudentProfile::new();
        let json = serde_json::to_string(&profile).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_project_serializes_with_desc_key() {
        let project = Project {
            title: "Chat App".to_string(),
            description: "Built a realtime chat app".to_string(),
        };
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["title"], "Chat App");
        assert_eq!(json["desc"], "Built a realtime chat app");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_profile_roundtrip() {
        let profile = StudentProfile {
            branch: Some("ECE".to_string()),
            skills: vec!["python".to_string(), "docker".to_string()],
            projects: vec![Project {
                title: "IoT Monitor".to_string(),
                description: "Developed a sensor dashboard with 200 users".to_string(),
            }],
        };
        let json = serde_json::to_string(&profile).unwrap();
        let back: StudentProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }
}
