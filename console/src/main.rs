//! Headless runner: reconciles against the backend, walks through install,
//! setup and login on the terminal, then follows the dashboard until Ctrl-C.

use anyhow::{bail, Context, Result};
use zeroize::Zeroizing;

use validator_console_lib::dashboard::{DashboardFeed, DashboardPoller};
use validator_console_lib::navigation;
use validator_console_lib::pipeline::{DependencyInstallPipeline, InstallEvent};
use validator_console_lib::reconcile::{reconcile, Step};
use validator_console_lib::session::suggest_password;
use validator_console_lib::ConsoleContext;

/// Setup and login prompts before giving up.
const MAX_PROMPTS: usize = 3;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let context = ConsoleContext::from_env().context("failed to initialize console")?;
    let gateway = context.gateway().clone();
    let credentials = context.credentials().clone();

    let mut prompts = 0;
    loop {
        let outcome = reconcile(gateway.as_ref(), &credentials).await;
        if let Some(notice) = &outcome.notice {
            log::warn!("{}", notice);
        }
        log::info!("Current step: {:?}", outcome.step);

        match outcome.step {
            Step::Loading => continue,
            Step::InstallDependencies => {
                let mut pipeline = DependencyInstallPipeline::with_default_catalog();
                pipeline.refresh(gateway.as_ref()).await;
                log::info!(
                    "Installing {} component(s), about {} MB",
                    pipeline.pending().len(),
                    pipeline.estimated_size_mb()
                );
                pipeline
                    .run(gateway.as_ref(), |event| {
                        if let InstallEvent::Installed { id, progress } = event {
                            log::info!("{} installed ({}%)", id, progress);
                        }
                    })
                    .await?;
            }
            Step::FirstRunSetup => {
                prompts += 1;
                if prompts > MAX_PROMPTS {
                    bail!("setup was not completed");
                }
                let suggestion = suggest_password(&mut rand::thread_rng());
                println!("Choose a console password (suggestion: {})", suggestion.as_str());
                let password = read_secret("Password: ").await?;
                let confirmation = read_secret("Confirm password: ").await?;
                if let Err(e) = credentials
                    .setup(gateway.as_ref(), &password, &confirmation)
                    .await
                {
                    log::error!("{}", e);
                }
            }
            Step::Login => {
                prompts += 1;
                if prompts > MAX_PROMPTS {
                    bail!("login failed");
                }
                let password = read_secret("Password: ").await?;
                if let Err(e) = credentials.login(gateway.as_ref(), &password).await {
                    log::error!("{}", e);
                }
            }
            Step::Wallet | Step::NodeSetup | Step::Dashboard => {
                if let Some(snapshot) = &outcome.snapshot {
                    for warning in navigation::setup_warnings(snapshot) {
                        log::warn!("{}", warning.message());
                    }
                }
                break;
            }
        }
    }

    follow_dashboard(&context).await
}

async fn follow_dashboard(context: &ConsoleContext) -> Result<()> {
    let feed = DashboardFeed::new();
    let mut updates = feed.subscribe();
    let poller = DashboardPoller::start(
        context.gateway().clone(),
        feed,
        &context.config().polling,
    );

    let mut last_line: Option<String> = None;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if state.session_expired {
                    log::error!("Session expired; restart the console to log in again");
                    break;
                }
                if let Some(snapshot) = &state.snapshot {
                    log::info!(
                        "running={} block={} peers={} balance={}",
                        snapshot.is_node_running,
                        snapshot.current_block,
                        snapshot.peer_count,
                        state.balance.as_ref().map(|b| b.display.as_str()).unwrap_or("-")
                    );
                }
                // The tail is a sliding window; print what follows the last line shown.
                let start = last_line
                    .as_ref()
                    .and_then(|last| state.logs.iter().rposition(|l| l == last))
                    .map_or(0, |i| i + 1);
                for line in &state.logs[start..] {
                    println!("{}", line);
                }
                if let Some(line) = state.logs.last() {
                    last_line = Some(line.clone());
                }
            }
        }
    }

    poller.stop().await;
    Ok(())
}

/// Prompt on the terminal with echo disabled.
async fn read_secret(prompt: &'static str) -> Result<Zeroizing<String>> {
    tokio::task::spawn_blocking(move || -> Result<Zeroizing<String>> {
        let secret = rpassword::prompt_password(prompt)
            .with_context(|| format!("failed to read {}", prompt_label(prompt)))?;
        Ok(Zeroizing::new(secret))
    })
    .await
    .context("prompt task failed")?
}

fn prompt_label(prompt: &str) -> String {
    prompt.trim_end_matches([':', ' ']).to_lowercase()
}
