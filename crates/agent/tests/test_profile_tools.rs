//! Tests for the profile tools
//!
//! Covers the save/read behaviors against one shared profile: branch
//! last-write-wins, wholesale skills replacement, append-only projects,
//! and the JSON rendering of get_profile.

use resumeguide_agent::profile::shared_profile;
use resumeguide_agent::tools::{
    GetProfileTool, SaveBranchTool, SaveProjectTool, SaveSkillsTool, ToolTrait,
};
use serde_json::json;

// ============================================================================
// save_branch
// ============================================================================

#[tokio::test]
async fn test_save_branch_stores_and_confirms() {
    let profile = shared_profile();
    let tool = SaveBranchTool::new(profile.clone());

    let result = tool.execute(json!({"branch": "CSE"})).await.unwrap();

    assert_eq!(result, "✅ Branch saved: CSE");
    assert_eq!(profile.lock().unwrap().branch.as_deref(), Some("CSE"));
}

#[tokio::test]
async fn test_save_branch_overwrites_previous_value() {
    let profile = shared_profile();
    let tool = SaveBranchTool::new(profile.clone());

    tool.execute(json!({"branch": "ECE"})).await.unwrap();
    tool.execute(json!({"branch": "Mechanical"})).await.unwrap();

    assert_eq!(
        profile.lock().unwrap().branch.as_deref(),
        Some("Mechanical")
    );
}

#[tokio::test]
async fn test_save_branch_missing_argument_is_error() {
    let tool = SaveBranchTool::new(shared_profile());

    let result = tool.execute(json!({})).await;

    assert!(result.is_err());
}

// ============================================================================
// save_skills
// ============================================================================

#[tokio::test]
async fn test_save_skills_splits_and_trims() {
    let profile = shared_profile();
    let tool = SaveSkillsTool::new(profile.clone());

    let result = tool
        .execute(json!({"skills": " python ,  react , docker"}))
        .await
        .unwrap();

    assert_eq!(
        profile.lock().unwrap().skills,
        vec!["python", "react", "docker"]
    );
    assert_eq!(result, r#"✅ Skills saved: ["python", "react", "docker"]"#);
}

#[tokio::test]
async fn test_save_skills_replaces_whole_list() {
    let profile = shared_profile();
    let tool = SaveSkillsTool::new(profile.clone());

    tool.execute(json!({"skills": "python, react"})).await.unwrap();
    tool.execute(json!({"skills": "java"})).await.unwrap();

    // No merge: the second save wins outright.
    assert_eq!(profile.lock().unwrap().skills, vec!["java"]);
}

#[tokio::test]
async fn test_save_skills_single_entry() {
    let profile = shared_profile();
    let tool = SaveSkillsTool::new(profile.clone());

    let result = tool
        .execute(json!({"skills": "machine learning"}))
        .await
        .unwrap();

    assert_eq!(profile.lock().unwrap().skills, vec!["machine learning"]);
    assert_eq!(result, r#"✅ Skills saved: ["machine learning"]"#);
}

// ============================================================================
// save_project
// ============================================================================

#[tokio::test]
async fn test_save_project_appends_in_order() {
    let profile = shared_profile();
    let tool = SaveProjectTool::new(profile.clone());

    let first = tool
        .execute(json!({
            "title": "Chat App",
            "description": "Built a realtime chat app with 500 users"
        }))
        .await
        .unwrap();
    let second = tool
        .execute(json!({
            "title": "Weather CLI",
            "description": "Developed a CLI fetching forecasts for 10 cities"
        }))
        .await
        .unwrap();

    assert_eq!(first, "✅ Project added: Chat App");
    assert_eq!(second, "✅ Project added: Weather CLI");

    let projects = profile.lock().unwrap().projects.clone();
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0].title, "Chat App");
    assert_eq!(projects[1].title, "Weather CLI");
    assert_eq!(
        projects[0].description,
        "Built a realtime chat app with 500 users"
    );
}

// ============================================================================
// get_profile
// ============================================================================

#[tokio::test]
async fn test_get_profile_empty() {
    let tool = GetProfileTool::new(shared_profile());

    let result = tool.execute(json!({})).await.unwrap();

    assert_eq!(result, "No data yet.");
}

#[tokio::test]
async fn test_get_profile_renders_json() {
    let profile = shared_profile();
    SaveBranchTool::new(profile.clone())
        .execute(json!({"branch": "CSE"}))
        .await
        .unwrap();
    SaveSkillsTool::new(profile.clone())
        .execute(json!({"skills": "python, aws"}))
        .await
        .unwrap();
    SaveProjectTool::new(profile.clone())
        .execute(json!({
            "title": "Chat App",
            "description": "Built a realtime chat app with 500 users"
        }))
        .await
        .unwrap();

    let rendered = GetProfileTool::new(profile)
        .execute(json!({}))
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    assert_eq!(parsed["branch"], "CSE");
    assert_eq!(parsed["skills"], json!(["python", "aws"]));
    assert_eq!(parsed["projects"][0]["title"], "Chat App");
    // Project descriptions keep the short `desc` key.
    assert_eq!(
        parsed["projects"][0]["desc"],
        "Built a realtime chat app with 500 users"
    );
}

#[tokio::test]
async fn test_tools_share_one_profile() {
    let profile = shared_profile();
    let save = SaveBranchTool::new(profile.clone());
    let get = GetProfileTool::new(profile);

    assert_eq!(get.execute(json!({})).await.unwrap(), "No data yet.");

    save.execute(json!({"branch": "Civil"})).await.unwrap();

    let rendered = get.execute(json!({})).await.unwrap();
    assert!(rendered.contains("Civil"));
}
