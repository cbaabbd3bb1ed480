//! Career heuristics: skill demand, project review, trends, certifications.
//!
//! Exposed as plain functions because the shell's quick actions call them
//! directly, bypassing the model. The tool types below wrap them for the
//! registry.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use resumeguide_provider::object_schema;

use super::ToolTrait;

const HOT_SKILLS: &[&str] = &[
    "python",
    "react",
    "machine learning",
    "aws",
    "docker",
    "kubernetes",
    "typescript",
    "golang",
];

const ACTION_VERBS: &[&str] = &["built", "developed", "created", "implemented", "designed"];

/// Check if a skill is in demand.
pub fn check_skill_demand(skill: &str) -> String {
    if HOT_SKILLS.contains(&skill.to_lowercase().as_str()) {
        format!("🔥 '{}' is HIGH DEMAND in 2024-25!", skill)
    } else {
        format!(
            "'{}' is useful but consider adding trending skills like Python, React, or AWS.",
            skill
        )
    }
}

/// Analyze project description quality.
pub fn analyze_project(_title: &str, description: &str) -> String {
    let mut issues = Vec::new();
    let lower = description.to_lowercase();

    if description.chars().count() < 20 {
        issues.push("Too short - add more details");
    }
    if !ACTION_VERBS.iter().any(|verb| lower.contains(verb)) {
        issues.push("Use action verbs (built, developed, created)");
    }
    if !description.chars().any(|c| c.is_ascii_digit()) {
        issues.push("Add metrics/numbers (e.g., '50% faster', '1000 users')");
    }

    if issues.is_empty() {
        "✅ Project description looks strong!".to_string()
    } else {
        format!("⚠️ Improvements needed: {}", issues.join(", "))
    }
}

/// Get industry trends for an engineering branch.
pub fn get_industry_trends(branch: &str) -> String {
    let trends = match branch.to_lowercase().as_str() {
        "cse" => {
            "🚀 AI/ML, Cloud Computing, Cybersecurity are hot. Remote work is common. \
             Focus on DSA + System Design."
        }
        "ece" => {
            "📡 IoT, Embedded Systems, 5G. Hardware + Software hybrid roles are growing. \
             Learn Python for automation."
        }
        "mechanical" => {
            "⚡ EV industry is booming. CAD/CAM + Python automation highly valued. \
             Consider robotics."
        }
        "civil" => "🏗️ Sustainable construction, BIM software. Green building certifications help stand out.",
        "electrical" => "🔋 Renewable energy, Power Electronics, Smart Grid. Python + MATLAB are useful.",
        _ => "Focus on interdisciplinary skills + coding basics. Python is universal.",
    };
    trends.to_string()
}

/// Suggest certifications based on skills.
pub fn suggest_certifications(skills: &str) -> String {
    let lower = skills.to_lowercase();
    let mut certs = Vec::new();

    if lower.contains("python") {
        certs.push("Google Professional ML Engineer");
    }
    if lower.contains("cloud") || lower.contains("aws") {
        certs.push("AWS Solutions Architect");
    }
    if lower.contains("react") || lower.contains("frontend") {
        certs.push("Meta Front-End Developer");
    }
    if lower.contains("data") {
        certs.push("Google Data Analytics Certificate");
    }
    if certs.is_empty() {
        certs.push("Google IT Support Certificate (good starting point)");
    }

    format!("📜 Recommended: {}", certs.join(", "))
}

/// Registry wrapper around [`check_skill_demand`].
#[derive(Default)]
pub struct CheckSkillDemandTool;

impl CheckSkillDemandTool {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Deserialize)]
struct SkillArgs {
    skill: String,
}

#[async_trait]
impl ToolTrait for CheckSkillDemandTool {
    fn name(&self) -> &str {
        "check_skill_demand"
    }
    fn description(&self) -> &str {
        "Check if a skill is in demand."
    }

    fn parameters(&self) -> Value {
        object_schema(vec![(
            "skill".to_string(),
            "A single skill name, e.g. python".to_string(),
            true,
        )])
    }

    async fn execute(
        &self,
        args: Value,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let args: SkillArgs = serde_json::from_value(args)?;
        debug!("checking demand for {}", args.skill);
        Ok(check_skill_demand(&args.skill))
    }
}

/// Registry wrapper around [`analyze_project`].
#[derive(Default)]
pub struct AnalyzeProjectTool;

impl AnalyzeProjectTool {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Deserialize)]
struct AnalyzeProjectArgs {
    title: String,
    description: String,
}

#[async_trait]
impl ToolTrait for AnalyzeProjectTool {
    fn name(&self) -> &str {
        "analyze_project"
    }
    fn description(&self) -> &str {
        "Analyze project description quality."
    }

    fn parameters(&self) -> Value {
        object_schema(vec![
            ("title".to_string(), "Project title".to_string(), true),
            (
                "description".to_string(),
                "Project description to review".to_string(),
                true,
            ),
        ])
    }

    async fn execute(
        &self,
        args: Value,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let args: AnalyzeProjectArgs = serde_json::from_value(args)?;
        debug!("analyzing project: {}", args.title);
        Ok(analyze_project(&args.title, &args.description))
    }
}

/// Registry wrapper around [`get_industry_trends`].
#[derive(Default)]
pub struct IndustryTrendsTool;

impl IndustryTrendsTool {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Deserialize)]
struct BranchArgs {
    branch: String,
}

#[async_trait]
impl ToolTrait for IndustryTrendsTool {
    fn name(&self) -> &str {
        "get_industry_trends"
    }
    fn description(&self) -> &str {
        "Get industry trends for engineering branch."
    }

    fn parameters(&self) -> Value {
        object_schema(vec![(
            "branch".to_string(),
            "Engineering branch, e.g. CSE".to_string(),
            true,
        )])
    }

    async fn execute(
        &self,
        args: Value,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let args: BranchArgs = serde_json::from_value(args)?;
        debug!("looking up trends for {}", args.branch);
        Ok(get_industry_trends(&args.branch))
    }
}

/// Registry wrapper around [`suggest_certifications`].
#[derive(Default)]
pub struct SuggestCertificationsTool;

impl SuggestCertificationsTool {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Deserialize)]
struct CertArgs {
    skills: String,
}

#[async_trait]
impl ToolTrait for SuggestCertificationsTool {
    fn name(&self) -> &str {
        "suggest_certifications"
    }
    fn description(&self) -> &str {
        "Suggest certifications based on skills."
    }

    fn parameters(&self) -> Value {
        object_schema(vec![(
            "skills".to_string(),
            "Skills or interests, free text".to_string(),
            true,
        )])
    }

    async fn execute(
        &self,
        args: Value,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let args: CertArgs = serde_json::from_value(args)?;
        debug!("suggesting certifications for {}", args.skills);
        Ok(suggest_certifications(&args.skills))
    }
}
