use mangagen::{
    load_credential,
    logger::{self, LoggerConfig},
    BlurbGenerator, Config, CoverGenerator, EnvCredentialStore, OpenAiClient, RunOutcome,
    TerminalView, Workflow, WorkflowView, CREDENTIAL_KEY,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(LoggerConfig::from_env())?;
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = Config::from_env()?;
    logger::log_config_info(&config);

    let mut view = TerminalView::stdio();

    let credential = match load_credential(&EnvCredentialStore) {
        Ok(credential) => credential,
        Err(e) => {
            log::error!("❌ {}", e);
            view.notify_error(&format!(
                "Please store your API key in the environment or a .env file under the key '{}' ({}).",
                CREDENTIAL_KEY,
                CREDENTIAL_KEY.to_uppercase()
            ));
            return Err(e.into());
        }
    };

    let mut client = OpenAiClient::new(config.openai.clone(), credential)?;
    if let Some(policy) = config.retry {
        client = client.with_retry(policy);
    }
    let blurbs: Arc<dyn BlurbGenerator> = Arc::new(client.text().clone());
    let covers: Arc<dyn CoverGenerator> = Arc::new(client.image().clone());

    let mut workflow = Workflow::new(blurbs, covers, view);

    println!("Enter a title and a theme to generate a manga blurb and cover (Ctrl-D to quit).");
    loop {
        let view = workflow.view_mut();
        let Some(title) = view.prompt("Manga title")? else {
            break;
        };
        let Some(theme) = view.prompt("Theme")? else {
            break;
        };

        match workflow.submit(&title, &theme).await {
            RunOutcome::Completed(cover) => log::debug!("Cover ready at {}", cover.image.url),
            RunOutcome::Failed(e) => log::debug!("Run failed: {}", e),
            RunOutcome::Rejected(_) => {}
        }
    }

    log::info!("👋 Bye");
    Ok(())
}
