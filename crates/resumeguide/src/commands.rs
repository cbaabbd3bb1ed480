//! ResumeGuide command implementations

use std::io::Write;

use anyhow::{anyhow, Result};
use resumeguide_agent::tools::career;
use resumeguide_config::resolve_credentials;
use resumeguide_provider::{GeminiProvider, Provider};

use crate::app::{agent_key, App, AGENT_KEYS, QUICK_BRANCHES, QUICK_SKILLS};

/// Boxed output for one-shot replies and quick actions.
fn print_box(title: &str, content: &str) {
    println!("\n{} {} {}", "=".repeat(10), title, "=".repeat(10));
    println!("{}", content);
    println!("{}\n", "=".repeat(30));
}

// ============================================================================
// Chat
// ============================================================================

/// Talk to one agent, either one-shot (-m) or in a REPL.
pub async fn chat_command(agent: String, message: Option<String>) -> Result<()> {
    let key = agent_key(&agent).ok_or_else(|| {
        anyhow!(
            "unknown agent: {} (expected profile, reviewer, or coach)",
            agent
        )
    })?;

    let app = App::new()?;

    if let Some(msg) = message {
        let name = app.agent_name(key);
        println!("⏳ {} is thinking...", name);
        let reply = app.chat(key, &msg).await?;
        print_box(&name, &reply);
        return Ok(());
    }

    repl(&app, key).await
}

async fn repl(app: &App, start: &'static str) -> Result<()> {
    let mut current = start;

    println!("🤖 ResumeGuide - A 3-Agent System for B.Tech Resume Guidance");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "Chatting with {}. Type /help for commands, exit to quit.\n",
        app.agent_name(current)
    );

    loop {
        print!("({}) > ", current);
        std::io::stdout().flush()?;

        let mut input = String::new();
        let bytes = std::io::stdin().read_line(&mut input)?;
        if bytes == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            println!("Bye! 👋");
            break;
        }

        if let Some(rest) = input.strip_prefix('/') {
            current = handle_slash(app, current, rest)?;
            continue;
        }

        let name = app.agent_name(current);
        println!("⏳ {} is thinking...", name);
        match app.chat(current, input).await {
            Ok(reply) => println!("\n{}: {}\n", name, reply),
            Err(e) => println!("Error: {}", e),
        }
    }

    Ok(())
}

/// Run one slash command and return the (possibly switched) agent key.
fn handle_slash(app: &App, current: &'static str, line: &str) -> Result<&'static str> {
    let mut parts = line.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or("");
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

    match command {
        "help" => print_help(),
        "agents" => {
            for (key, adapter) in app.agents() {
                let marker = if key == current { "*" } else { " " };
                println!("{} {:<8} - {}", marker, key, adapter.name());
            }
        }
        "agent" => match arg.and_then(agent_key) {
            Some(key) => {
                println!("Now chatting with {}.", app.agent_name(key));
                return Ok(key);
            }
            None => println!("Unknown agent. Available: profile, reviewer, coach."),
        },
        "profile" => {
            let profile = app.profile_snapshot();
            if profile.is_empty() {
                println!("No data yet. Start chatting!");
            } else {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            }
        }
        "check" => {
            let results: Vec<String> = match arg {
                Some(skill) => vec![career::check_skill_demand(skill)],
                None => QUICK_SKILLS
                    .iter()
                    .map(|s| career::check_skill_demand(s))
                    .collect(),
            };
            print_box("⚡ Quick Skill Check", &results.join("\n"));
        }
        "trends" => {
            let results: Vec<String> = match arg {
                Some(branch) => vec![career::get_industry_trends(branch)],
                None => QUICK_BRANCHES
                    .iter()
                    .map(|b| career::get_industry_trends(b))
                    .collect(),
            };
            print_box("🎓 Quick Industry Trends", &results.join("\n"));
        }
        "clear" => {
            if let Some(status) = app.clear_agent(current) {
                println!("{}", status);
            }
        }
        "reset" => {
            app.reset();
            println!("🗑️ Everything cleared. Profile, transcripts, and agent memory are fresh.");
        }
        "dashboard" => print_dashboard(app),
        other => println!("Unknown command: /{}. Type /help for a list.", other),
    }

    Ok(current)
}

fn print_help() {
    println!("Commands:");
    println!("  /agents            List the agents");
    println!("  /agent <name>      Switch agent (profile, reviewer, coach)");
    println!("  /profile           Show the saved student profile");
    println!("  /check [skill]     Quick skill demand check (all six if omitted)");
    println!("  /trends [branch]   Quick industry trends (all branches if omitted)");
    println!("  /dashboard         Profile summary and transcript counts");
    println!("  /clear             Clear the current agent's memory");
    println!("  /reset             Clear everything");
    println!("  /help              This list");
    println!("  exit               Quit");
}

fn print_dashboard(app: &App) {
    println!("\n📊 Resume Dashboard");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let profile = app.profile_snapshot();
    if profile.is_empty() {
        println!("Start with ProfileBot to build your profile!");
    } else {
        if let Some(branch) = &profile.branch {
            println!("Branch:   {}", branch);
        }
        if !profile.skills.is_empty() {
            println!("Skills:   {}", profile.skills.join(", "));
        }
        if !profile.projects.is_empty() {
            println!("Projects: {}", profile.projects.len());
            for project in &profile.projects {
                println!("  • {}", project.title);
            }
        }
    }

    println!("\nTranscripts:");
    for key in AGENT_KEYS {
        println!(
            "  {:<8} {} messages",
            key,
            app.transcript(key).len()
        );
    }
    println!();
}

// ============================================================================
// Status
// ============================================================================

/// Show credential, provider, and agent roster status.
pub async fn status_command() -> Result<()> {
    println!("🤖 ResumeGuide System Status");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match resolve_credentials() {
        Ok(creds) => {
            println!("Credentials: {} [OK]", creds.credentials_path.display());
            println!("Project:     {}", creds.project_id);
            println!("Location:    {}", creds.location);
            println!("Backend:     Vertex AI");
        }
        Err(e) => {
            println!("Credentials: [Missing] ({})", e);
            println!("             Set GOOGLE_API_KEY to use the Generative Language API instead.");
        }
    }

    let provider = GeminiProvider::from_env();
    println!("Model:       {}", provider.default_model());
    let auth = if provider.is_configured() {
        "[Set]"
    } else {
        "[Missing]"
    };
    println!("Auth:        {}", auth);

    println!();
    println!("Agents:");
    println!("  ProfileBot  - collects branch, skills, and projects");
    println!("  ReviewerBot - reviews skills and projects for impact");
    println!("  CoachBot    - industry trends and certification advice");

    println!("\n🤖 Ready");
    Ok(())
}
