use clap::Parser;
use funnel_tracker::cli::commands::{
    build_tracker, cmd_click, cmd_identify, cmd_play, cmd_record, cmd_submit,
};
use funnel_tracker::cli::config::{Cli, Commands, load_config, resolve_page_settings};
use funnel_tracker::video::telemetry::VideoInfo;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref());

    // Resolve page settings: CLI > config > defaults
    let settings = resolve_page_settings(&cli, &config);
    let trace = cli.trace.as_deref();

    match &cli.command {
        Commands::Identify { page, form } => {
            cmd_identify(page, form.as_deref())?;
        }
        Commands::Record { page, form } => {
            cmd_record(page, form.as_deref(), &settings)?;
        }
        Commands::Click {
            page,
            element,
            index,
        } => {
            let tracker = build_tracker(page, settings, config.endpoints.clone(), trace)?;
            cmd_click(&tracker, element.as_deref(), *index).await?;
        }
        Commands::Submit { page, form } => {
            let tracker = build_tracker(page, settings, config.endpoints.clone(), trace)?;
            cmd_submit(&tracker, form).await?;
        }
        Commands::Play {
            page,
            media,
            duration,
            visitor_key,
            event_key,
        } => {
            let tracker = build_tracker(page, settings, config.endpoints.clone(), trace)?;
            let video = VideoInfo {
                hashed_id: media.clone(),
                duration: *duration,
                visitor_key: visitor_key.clone(),
                event_key: event_key.clone(),
            };
            cmd_play(&tracker, video).await?;
        }
    }

    Ok(())
}
