//! Tools that read and write the shared student profile.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use resumeguide_provider::object_schema;

use super::ToolTrait;
use crate::profile::{Project, SharedProfile};

/// Saves the student's engineering branch.
pub struct SaveBranchTool {
    profile: SharedProfile,
}

impl SaveBranchTool {
    pub fn new(profile: SharedProfile) -> Self {
        Self { profile }
    }
}

#[derive(Deserialize)]
struct SaveBranchArgs {
    branch: String,
}

#[async_trait]
impl ToolTrait for SaveBranchTool {
    fn name(&self) -> &str {
        "save_branch"
    }
    fn description(&self) -> &str {
        "Save the student's engineering branch."
    }

    fn parameters(&self) -> Value {
        object_schema(vec![(
            "branch".to_string(),
            "Engineering branch, e.g. CSE or Mechanical".to_string(),
            true,
        )])
    }

    async fn execute(
        &self,
        args: Value,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let args: SaveBranchArgs = serde_json::from_value(args)?;
        debug!("saving branch: {}", args.branch);

        self.profile.lock().unwrap().branch = Some(args.branch.clone());
        Ok(format!("✅ Branch saved: {}", args.branch))
    }
}

/// Saves technical skills, replacing whatever was stored before.
pub struct SaveSkillsTool {
    profile: SharedProfile,
}

impl SaveSkillsTool {
    pub fn new(profile: SharedProfile) -> Self {
        Self { profile }
    }
}

#[derive(Deserialize)]
struct SaveSkillsArgs {
    skills: String,
}

#[async_trait]
impl ToolTrait for SaveSkillsTool {
    fn name(&self) -> &str {
        "save_skills"
    }
    fn description(&self) -> &str {
        "Save technical skills as comma-separated string."
    }

    fn parameters(&self) -> Value {
        object_schema(vec![(
            "skills".to_string(),
            "Comma-separated skills, e.g. 'python, react, docker'".to_string(),
            true,
        )])
    }

    async fn execute(
        &self,
        args: Value,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let args: SaveSkillsArgs = serde_json::from_value(args)?;
        let skills: Vec<String> = args
            .skills
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();
        debug!("saving {} skills", skills.len());

        self.profile.lock().unwrap().skills = skills.clone();
        Ok(format!("✅ Skills saved: {:?}", skills))
    }
}

/// Appends a project to the profile.
pub struct SaveProjectTool {
    profile: SharedProfile,
}

impl SaveProjectTool {
    pub fn new(profile: SharedProfile) -> Self {
        Self { profile }
    }
}

#[derive(Deserialize)]
struct SaveProjectArgs {
    title: String,
    description: String,
}

#[async_trait]
impl ToolTrait for SaveProjectTool {
    fn name(&self) -> &str {
        "save_project"
    }
    fn description(&self) -> &str {
        "Save a project with title and description."
    }

    fn parameters(&self) -> Value {
        object_schema(vec![
            (
                "title".to_string(),
                "Short project title".to_string(),
                true,
            ),
            (
                "description".to_string(),
                "What was built and what it achieved".to_string(),
                true,
            ),
        ])
    }

    async fn execute(
        &self,
        args: Value,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let args: SaveProjectArgs = serde_json::from_value(args)?;
        debug!("saving project: {}", args.title);

        self.profile.lock().unwrap().projects.push(Project {
            title: args.title.clone(),
            description: args.description,
        });
        Ok(format!("✅ Project added: {}", args.title))
    }
}

/// Renders the current profile for the model.
pub struct GetProfileTool {
    profile: SharedProfile,
}

impl GetProfileTool {
    pub fn new(profile: SharedProfile) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl ToolTrait for GetProfileTool {
    fn name(&self) -> &str {
        "get_profile"
    }
    fn description(&self) -> &str {
        "Get current student profile."
    }

    fn parameters(&self) -> Value {
        object_schema(vec![])
    }

    async fn execute(
        &self,
        _args: Value,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let profile = self.profile.lock().unwrap().clone();
        if profile.is_empty() {
            return Ok("No data yet.".to_string());
        }
        Ok(serde_json::to_string(&profile)?)
    }
}
