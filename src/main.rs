use mentor_match::config::Settings;
use mentor_match::core::Matcher;
use mentor_match::models::RunReport;
use mentor_match::services::DatasetStore;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let loaded = Settings::load();

    // Initialize logging; LOG_LEVEL / LOG_FORMAT override the settings file
    let logging = loaded.as_ref().map(|s| s.logging.clone()).unwrap_or_default();
    let log_level = std::env::var("LOG_LEVEL").unwrap_or(logging.level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(logging.format);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    info!("Starting mentor matching run...");

    let settings = match loaded {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Configuration loaded successfully");

    match run(settings).await {
        Ok(report) => {
            info!(
                run_id = %report.run_id,
                groups = report.groups,
                matched_mentees = report.matched_mentees,
                "Matching finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Matching failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: Settings) -> Result<RunReport, Box<dyn std::error::Error>> {
    let started_at = chrono::Utc::now();
    let store = DatasetStore::new(settings.input.id_field.clone());

    let mentors = store.load_population(&settings.input.mentors)?;
    let mentees = store.load_population(&settings.input.mentees)?;
    info!(
        "Loaded {} mentors from {} and {} mentees from {}",
        mentors.len(),
        settings.input.mentors.display(),
        mentees.len(),
        settings.input.mentees.display()
    );

    let matcher = Matcher::new(settings.match_config(), settings.mentor_cost(), settings.group_cost())?;

    info!("Matcher initialized with config: {:?}", matcher.config());

    let outcome = if settings.matching.parallel {
        Arc::new(matcher).run_parallel(&mentors, &mentees).await?
    } else {
        matcher.run(&mentors, &mentees)?
    };

    let report = RunReport {
        run_id: uuid::Uuid::new_v4(),
        started_at,
        finished_at: chrono::Utc::now(),
        mentors: mentors.len(),
        mentees: mentees.len(),
        groups: outcome.groups.len(),
        partitions: outcome.partitions,
        matched_mentees: outcome.matched_mentees(),
    };

    let dir = &settings.output.directory;
    std::fs::create_dir_all(dir)?;
    store.write_table(dir.join("assignments_by_mentor.json"), &outcome.by_mentor)?;
    store.write_table(dir.join("assignments_by_mentee.json"), &outcome.by_mentee)?;
    store.write_table(dir.join("mentor_groups.json"), &outcome.groups)?;
    store.write_table(dir.join("run_report.json"), &report)?;

    Ok(report)
}
