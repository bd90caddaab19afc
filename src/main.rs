use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};

use form_steps_wizard::error::{AppResult, StepChangeError};
use form_steps_wizard::router::{MemoryRouter, NavigationTarget, Router};
use form_steps_wizard::storage::MemoryBackend;
use form_steps_wizard::window::{BrowserWindow, MemoryWindow};
use form_steps_wizard::wizard::paths::pathname_prefix;
use form_steps_wizard::wizard::{
    child, step, FormElement, FormSnapshot, FormWizardSteps, StepHooks, StepId, StepProps, Steps,
    Wizard, WizardProps, WizardView,
};
use form_steps_wizard::WizardConfig;

const LOG_TARGET_STARTUP: &str = "form_steps_wizard::startup";
const LOG_TARGET_DEMO: &str = "form_steps_wizard::demo";

/// Initialize tracing with file rotation
///
/// Logs are written to:
/// - macOS: ~/Library/Application Support/FormStepsWizard/logs/
/// - Windows: %APPDATA%/FormStepsWizard/logs/
/// - Linux: ~/.config/FormStepsWizard/logs/
///
/// Debug builds also log to the console.
fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = dirs::config_dir()
        .map(|dir| dir.join("FormStepsWizard").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "form-steps-wizard.log");

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }

    tracing::info!("Log directory: {}", log_dir.display());
}

fn log_runtime_environment() {
    tracing::info!(
        target: LOG_TARGET_STARTUP,
        "Starting form-steps-wizard v{} on {} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    );
}

/// `--config <path>` or the platform config file
fn load_config() -> AppResult<WizardConfig> {
    let args: Vec<String> = std::env::args().collect();
    let explicit = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from);

    let config = match explicit {
        Some(path) => WizardConfig::load_from(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => WizardConfig::load().context("Failed to load wizard config")?,
    };
    Ok(config)
}

/// Accepts every step; the confirmation step needs `accepted: true`
struct SignupHooks;

#[async_trait]
impl StepHooks for SignupHooks {
    async fn on_step_change(
        &self,
        data: Value,
        current_index: usize,
        disable_form_submission: bool,
    ) -> Result<bool, StepChangeError> {
        tracing::info!(
            target: LOG_TARGET_DEMO,
            "Submitting step #{} (submission {}): {}",
            current_index,
            if disable_form_submission { "disabled" } else { "enabled" },
            data
        );

        if current_index == 2 && data.get("accepted") != Some(&Value::Bool(true)) {
            return Err(StepChangeError::Rejected("terms not accepted".to_string()));
        }
        Ok(true)
    }

    fn on_step_change_discarded(&self) {
        tracing::info!(target: LOG_TARGET_DEMO, "User discarded unsaved changes");
    }

    fn on_step_change_error(&self, error: &StepChangeError) {
        tracing::warn!(target: LOG_TARGET_DEMO, "Step change error: {}", error);
    }
}

fn signup_steps() -> AppResult<Steps<String>> {
    let mut steps = Steps::new();
    for (id, title) in [
        ("account", "Create your account"),
        ("profile", "Tell us about yourself"),
        ("confirm", "Review and confirm"),
    ] {
        steps.insert(
            StepId::new(id)?,
            step(move |props: &StepProps<String>| {
                format!("[{}/{}] {}", props.current_step, props.steps_total, title)
            }),
        );
    }
    Ok(steps)
}

fn print_view(view: &WizardView<String>) {
    for child in &view.children {
        println!("  {}", child);
    }
    println!("  {}\n", view.step);
}

fn four_field_form(filled: &[&str]) -> FormSnapshot {
    let mut form = FormSnapshot::new(vec![
        FormElement::input("name"),
        FormElement::input("email"),
        FormElement::input("password"),
        FormElement::input("phone"),
        FormElement::button("next"),
    ]);
    for name in filled {
        form = form.with_value(*name, "filled");
    }
    form
}

#[tokio::main]
async fn main() -> AppResult<()> {
    initialize_tracing();
    log_runtime_environment();

    println!("===========================================");
    println!("  Form Steps Wizard - headless walkthrough");
    println!("===========================================\n");

    let config = load_config()?;
    let prefix = pathname_prefix(&config.steps_pathname_pattern);

    let memory_window = MemoryWindow::new(format!("https://forms.local{}", prefix));
    let window: Arc<dyn BrowserWindow> = memory_window.clone();
    let router = MemoryRouter::new(window.clone());
    let backend = MemoryBackend::new();

    let props = WizardProps::from_config(&config, "account", signup_steps()?, Arc::new(SignupHooks));
    let wizard = Wizard::new(props, router.clone(), window.clone())?;
    let events = wizard.events().subscribe();

    let mut progress = FormWizardSteps::new("confirm", backend, &window);
    tracing::info!(target: LOG_TARGET_DEMO, "Stored progress: {}", progress.current_step_id());

    let breadcrumbs = child(|props| {
        let trail: Vec<String> = props
            .step_ids
            .iter()
            .enumerate()
            .map(|(i, id)| match props.current_step_index {
                Some(current) if current == i => format!("*{}*", id),
                _ => id.to_string(),
            })
            .collect();
        trail.join(" > ")
    });
    let children = [breadcrumbs];

    wizard.mount();
    println!("Location: {}", memory_window.href());
    print_view(&wizard.render(&children));

    // Account step: fill everything and continue
    wizard.on_form_change_triggered(&four_field_form(&["name", "email", "password", "phone"]));
    wizard
        .on_step_change_triggered(json!({"email": "ada@example.com"}), false, true)
        .await?;
    progress.sync_with(&wizard);
    print_view(&wizard.render(&children));

    // Profile step: half filled, then try to go back and decline discarding
    let percentage = wizard.on_form_change_triggered(&four_field_form(&["name", "phone"]));
    println!("Profile form is {}% complete", percentage);
    memory_window.answer_confirm_with(false);
    if let Some(previous) = wizard.derived_view().paths.previous {
        if let Err(e) = router.navigate(NavigationTarget::parse(&previous)).await {
            println!("Going back was stopped: {}", e);
        }
    }
    memory_window.answer_confirm_with(true);

    wizard
        .on_step_change_triggered(json!({"bio": "Mathematician"}), false, true)
        .await?;
    progress.sync_with(&wizard);
    print_view(&wizard.render(&children));

    // Confirmation: first without accepting the terms, then properly
    let accepted = wizard
        .on_step_change_triggered(json!({"accepted": false}), false, true)
        .await?;
    println!("Confirm without terms accepted: {}", accepted);
    let accepted = wizard
        .on_step_change_triggered(json!({"accepted": true}), false, true)
        .await?;
    println!("Confirm with terms accepted: {}", accepted);
    progress.sync_with(&wizard);
    print_view(&wizard.render(&children));

    println!("Events:");
    while let Ok(event) = events.try_recv() {
        println!("  - {}", event.description());
    }
    println!("\nStored progress: {}", progress.current_step_id());

    wizard.unmount();
    Ok(())
}
