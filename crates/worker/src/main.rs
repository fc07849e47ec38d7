use anyhow::Context;
use clap::Parser;
use readiness_core::pipeline::{self, RunOptions};
use readiness_core::store::intervals::IntervalsClient;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "readiness_worker")]
struct Args {
    /// Run date (YYYY-MM-DD). Defaults to today's local calendar date.
    #[arg(long)]
    as_of_date: Option<String>,

    /// Do everything except writing the result back.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = readiness_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    // Fail on missing credentials before any network activity.
    let client = IntervalsClient::from_settings(&settings)?;
    let run_date = resolve_run_date(args.as_of_date.as_deref())?;
    let opts = RunOptions::from_settings(&settings, run_date, args.dry_run);

    match pipeline::run(&client, &opts).await {
        Ok(outcome) => {
            tracing::info!(
                %run_date,
                records = outcome.records,
                score = outcome.decision.map(|d| d.score),
                label = outcome.decision.map(|d| d.label.as_str()),
                published = outcome.published,
                "readiness run complete"
            );
            Ok(())
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(%run_date, error = %format!("{err:#}"), "readiness run failed");
            Err(err)
        }
    }
}

fn init_sentry(settings: &readiness_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

fn resolve_run_date(as_of_date_arg: Option<&str>) -> anyhow::Result<chrono::NaiveDate> {
    if let Some(s) = as_of_date_arg {
        return chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("--as-of-date must be YYYY-MM-DD (got {s:?})"));
    }
    Ok(chrono::Local::now().date_naive())
}
