//! Application shell: the three advisors, their shared profile, and
//! per-agent conversation transcripts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use resumeguide_agent::tools::{
    AnalyzeProjectTool, CheckSkillDemandTool, GetProfileTool, IndustryTrendsTool, SaveBranchTool,
    SaveProjectTool, SaveSkillsTool, SuggestCertificationsTool,
};
use resumeguide_agent::{shared_profile, AgentAdapter, SharedProfile, StudentProfile, ToolRegistry};
use resumeguide_provider::Provider;
use resumeguide_session::SessionService;
use serde::Serialize;

/// Registry keys for the three advisors, in display order.
pub const AGENT_KEYS: [&str; 3] = ["profile", "reviewer", "coach"];

/// Skills behind the quick-check action.
pub const QUICK_SKILLS: [&str; 6] = ["Python", "React", "Java", "Machine Learning", "Docker", "SQL"];

/// Branches behind the quick-trends action.
pub const QUICK_BRANCHES: [&str; 5] = ["CSE", "ECE", "Mechanical", "Civil", "Electrical"];

const PROFILE_INSTRUCTION: &str =
    "You are ProfileBot, a friendly assistant that collects student info for resumes.\n\
     Ask about: Branch, Skills, Projects. Use tools to SAVE each piece.\n\
     Be conversational. One question at a time. Keep responses short.";

const REVIEWER_INSTRUCTION: &str = "You are ReviewerBot, a resume expert. Your job:\n\
     1. Check skill demand using check_skill_demand tool\n\
     2. Analyze projects using analyze_project tool\n\
     Give specific, actionable feedback. Be encouraging but honest.";

const COACH_INSTRUCTION: &str = "You are CoachBot, a career advisor for B.Tech students.\n\
     Use get_industry_trends for branch-specific advice.\n\
     Use suggest_certifications for cert recommendations.\n\
     Be motivating and give specific actionable advice.";

/// Map loose user input ("ProfileBot", "COACH") onto a registry key.
pub fn agent_key(input: &str) -> Option<&'static str> {
    match input.to_lowercase().as_str() {
        "profile" | "profilebot" => Some("profile"),
        "reviewer" | "reviewerbot" => Some("reviewer"),
        "coach" | "coachbot" => Some("coach"),
        _ => None,
    }
}

/// One line of a per-agent conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub role: String,
    pub content: String,
}

/// Everything one running instance owns: three agents over a shared
/// profile and session registry, plus the transcripts shown in the UI.
pub struct App {
    profile: SharedProfile,
    profile_bot: AgentAdapter,
    reviewer_bot: AgentAdapter,
    coach_bot: AgentAdapter,
    transcripts: Mutex<HashMap<String, Vec<TranscriptEntry>>>,
}

impl App {
    /// Build the three advisors against live Vertex AI credentials.
    pub fn new() -> resumeguide_agent::Result<Self> {
        let profile = shared_profile();
        let sessions = Arc::new(SessionService::new());

        // Each construction re-resolves credentials; redundant but idempotent.
        let profile_bot = AgentAdapter::new(
            "ProfileBot",
            None,
            PROFILE_INSTRUCTION,
            profile_tools(&profile),
            sessions.clone(),
        )?;
        let reviewer_bot = AgentAdapter::new(
            "ReviewerBot",
            None,
            REVIEWER_INSTRUCTION,
            reviewer_tools(),
            sessions.clone(),
        )?;
        let coach_bot = AgentAdapter::new(
            "CoachBot",
            None,
            COACH_INSTRUCTION,
            coach_tools(),
            sessions,
        )?;

        Ok(Self {
            profile,
            profile_bot,
            reviewer_bot,
            coach_bot,
            transcripts: Mutex::new(empty_transcripts()),
        })
    }

    /// Same wiring, but every agent talks to the given provider.
    pub fn with_provider(provider: Arc<dyn Provider>) -> Self {
        let profile = shared_profile();
        let sessions = Arc::new(SessionService::new());

        let profile_bot = AgentAdapter::with_provider(
            "ProfileBot",
            None,
            PROFILE_INSTRUCTION,
            profile_tools(&profile),
            sessions.clone(),
            provider.clone(),
        );
        let reviewer_bot = AgentAdapter::with_provider(
            "ReviewerBot",
            None,
            REVIEWER_INSTRUCTION,
            reviewer_tools(),
            sessions.clone(),
            provider.clone(),
        );
        let coach_bot = AgentAdapter::with_provider(
            "CoachBot",
            None,
            COACH_INSTRUCTION,
            coach_tools(),
            sessions,
            provider,
        );

        Self {
            profile,
            profile_bot,
            reviewer_bot,
            coach_bot,
            transcripts: Mutex::new(empty_transcripts()),
        }
    }

    pub fn agent(&self, key: &str) -> Option<&AgentAdapter> {
        match key {
            "profile" => Some(&self.profile_bot),
            "reviewer" => Some(&self.reviewer_bot),
            "coach" => Some(&self.coach_bot),
            _ => None,
        }
    }

    /// Display name for a key, falling back to the key itself.
    pub fn agent_name(&self, key: &str) -> String {
        self.agent(key)
            .map(|a| a.name().to_string())
            .unwrap_or_else(|| key.to_string())
    }

    /// The advisors in display order.
    pub fn agents(&self) -> [(&'static str, &AgentAdapter); 3] {
        [
            ("profile", &self.profile_bot),
            ("reviewer", &self.reviewer_bot),
            ("coach", &self.coach_bot),
        ]
    }

    /// Run one turn against the named agent and record both sides in
    /// its transcript. The user line is kept even when the turn fails.
    pub async fn chat(&self, key: &str, message: &str) -> anyhow::Result<String> {
        let agent = self
            .agent(key)
            .with_context(|| format!("unknown agent: {}", key))?;

        self.record(key, "user", message);
        let reply = agent.chat_turn(message).await?;
        self.record(key, "assistant", &reply);
        Ok(reply)
    }

    fn record(&self, key: &str, role: &str, content: &str) {
        let mut transcripts = self.transcripts.lock().unwrap();
        transcripts
            .entry(key.to_string())
            .or_default()
            .push(TranscriptEntry {
                role: role.to_string(),
                content: content.to_string(),
            });
    }

    pub fn transcript(&self, key: &str) -> Vec<TranscriptEntry> {
        self.transcripts
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Wipe one agent's memory and transcript. Returns the confirmation
    /// line for the UI, or None for an unknown key.
    pub fn clear_agent(&self, key: &str) -> Option<String> {
        let agent = self.agent(key)?;
        agent.clear_memory();
        self.transcripts
            .lock()
            .unwrap()
            .insert(key.to_string(), Vec::new());
        Some(format!("🧹 Memory cleared for {}.", agent.name()))
    }

    /// Wipe everything: profile, transcripts, and every agent's memory.
    pub fn reset(&self) {
        *self.profile.lock().unwrap() = StudentProfile::new();
        *self.transcripts.lock().unwrap() = empty_transcripts();
        for (_, agent) in self.agents() {
            agent.clear_memory();
        }
    }

    pub fn profile_snapshot(&self) -> StudentProfile {
        self.profile.lock().unwrap().clone()
    }
}

fn profile_tools(profile: &SharedProfile) -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    tools.register(SaveBranchTool::new(profile.clone()));
    tools.register(SaveSkillsTool::new(profile.clone()));
    tools.register(SaveProjectTool::new(profile.clone()));
    tools.register(GetProfileTool::new(profile.clone()));
    tools
}

fn reviewer_tools() -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    tools.register(CheckSkillDemandTool::new());
    tools.register(AnalyzeProjectTool::new());
    tools
}

fn coach_tools() -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    tools.register(IndustryTrendsTool::new());
    tools.register(SuggestCertificationsTool::new());
    tools
}

fn empty_transcripts() -> HashMap<String, Vec<TranscriptEntry>> {
    AGENT_KEYS
        .iter()
        .map(|key| (key.to_string(), Vec::new()))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
