//! Command execution

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use colored::Colorize;
use tracing::{debug, info};

use crate::app::options::ClientOptions;
use crate::authn::session::Session;
use crate::authn::session_mngr::SessionManager;
use crate::cli::{Cli, Commands};
use crate::http::client::{copy_body, HttpClient};
use crate::models::Activity;
use crate::storage::session::{FileSessionStore, SessionStore};
use crate::storage::settings::Settings;
use crate::sync::paginator::ActivityPaginator;
use crate::utils::{human_bytes, human_rate, localize, parse_duration, Zone};

/// Wall-clock format accepted by `--begin` and `--end`
pub const RANGE_TIME_FORMAT: &str = "%b %d %Y %H:%M:%S";

/// Run the command selected on the command line
pub async fn run(cli: &Cli, settings: &Settings, options: ClientOptions) -> anyhow::Result<()> {
    let http_client = Arc::new(HttpClient::new(&options)?);
    let session_mngr = SessionManager::new(http_client.clone());

    let store = cli
        .session_cache
        .clone()
        .or_else(|| settings.session_cache.clone())
        .map(FileSessionStore::new);

    let session = session_mngr
        .obtain_session(
            cli.credentials()?,
            store.as_ref().map(|s| s as &dyn SessionStore),
        )
        .await
        .context("could not obtain a session")?;

    match &cli.command {
        Commands::Accessories { json } => list_accessories(&http_client, &session, *json).await,
        Commands::Snapshot {
            accessory_id,
            output,
        } => {
            let output = output
                .clone()
                .unwrap_or_else(|| format!("{}.jpeg", Utc::now().timestamp()).into());
            save_snapshot(&http_client, &session, accessory_id, &output).await
        }
        Commands::Download {
            accessory_id,
            begin,
            end,
            duration,
            tz,
            output_dir,
        } => {
            let zone: Zone = tz.as_deref().unwrap_or(settings.time_zone.as_str()).parse()?;
            let download = Download {
                http_client: &http_client,
                session: &session,
                page_limit: options.page_limit,
                accessory_id,
                output_dir,
            };
            let (begin, end, duration) = (begin.as_str(), end.as_deref(), duration.as_deref());

            match zone {
                Zone::Local => download.in_zone(&Local, begin, end, duration).await,
                Zone::Named(tz) => download.in_zone(&tz, begin, end, duration).await,
                Zone::Fixed(offset) => download.in_zone(&offset, begin, end, duration).await,
            }
        }
    }
}

/// Turn `--begin` plus `--end` or `--duration` into a range in `zone`
pub fn resolve_range<Z: TimeZone>(
    begin: &str,
    end: Option<&str>,
    duration: Option<&str>,
    zone: &Z,
) -> anyhow::Result<(DateTime<Z>, DateTime<Z>)> {
    let parse = |value: &str| -> anyhow::Result<DateTime<Z>> {
        let naive = NaiveDateTime::parse_from_str(value, RANGE_TIME_FORMAT)
            .with_context(|| format!("could not make sense of date/time {:?}", value))?;
        Ok(localize(zone, naive)?)
    };

    let begin = parse(begin)?;
    let end = match (end, duration) {
        (Some(end), None) => parse(end)?,
        (None, Some(duration)) => begin.clone() + parse_duration(duration)?,
        _ => bail!("exactly one of --end and --duration must be specified"),
    };

    if end < begin {
        bail!(
            "end {} is before begin {}",
            end.naive_local(),
            begin.naive_local()
        );
    }
    Ok((begin, end))
}

async fn list_accessories(
    http_client: &HttpClient,
    session: &Session,
    json: bool,
) -> anyhow::Result<()> {
    let accessories = http_client.list_accessories(session).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&accessories)?);
        return Ok(());
    }

    for accessory in &accessories {
        println!("{}  {}", accessory.name.bold(), accessory.accessory_id.dimmed());
    }
    Ok(())
}

async fn save_snapshot(
    http_client: &HttpClient,
    session: &Session,
    accessory_id: &str,
    output: &Path,
) -> anyhow::Result<()> {
    let accessory = http_client
        .get_accessory(session, accessory_id)
        .await
        .with_context(|| format!("could not find accessory {:?}", accessory_id))?;

    let image = http_client
        .get_snapshot(session, &accessory)
        .await
        .with_context(|| format!("could not get snapshot for {:?}", accessory_id))?;

    let mut file = tokio::fs::File::create(output)
        .await
        .with_context(|| format!("couldn't open {} for output", output.display()))?;
    let size = copy_body(image, &mut file)
        .await
        .context("could not save snapshot")?;

    info!("Snapshot ({}) saved to {}", human_bytes(size), output.display());
    Ok(())
}

/// Everything a download needs apart from the range
struct Download<'a> {
    http_client: &'a HttpClient,
    session: &'a Session,
    page_limit: u32,
    accessory_id: &'a str,
    output_dir: &'a Path,
}

impl Download<'_> {
    /// Resolve the range in `zone`, then download every activity in it
    async fn in_zone<Z: TimeZone>(
        &self,
        zone: &Z,
        begin: &str,
        end: Option<&str>,
        duration: Option<&str>,
    ) -> anyhow::Result<()> {
        let (begin, end) = resolve_range(begin, end, duration, zone)?;
        debug!("Range: {} .. {}", begin.naive_local(), end.naive_local());

        let accessory = self
            .http_client
            .get_accessory(self.session, self.accessory_id)
            .await
            .with_context(|| format!("could not find accessory {:?}", self.accessory_id))?;

        let activities = ActivityPaginator::new(self.http_client, self.session)
            .with_page_limit(self.page_limit)
            .list_activities_in_range(&accessory, &begin, &end)
            .await
            .context("could not list activities")?;

        self.save_all(&activities).await
    }

    async fn save_all(&self, activities: &[Activity]) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(self.output_dir)
            .await
            .with_context(|| format!("could not create {}", self.output_dir.display()))?;

        let total = activities.len();
        for (n, activity) in activities.iter().enumerate() {
            let path = self.output_dir.join(activity.video_file_name());
            let start = Instant::now();

            let video = self
                .http_client
                .download_activity_mp4(self.session, activity)
                .await
                .with_context(|| format!("requesting video {}", activity.activity_id))?;

            let mut file = tokio::fs::File::create(&path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            let size = copy_body(video, &mut file)
                .await
                .with_context(|| format!("writing {}", path.display()))?;

            let elapsed = start.elapsed();
            info!(
                n,
                total,
                id = %activity.activity_id,
                "got {} in {:.2}s ({}/s)",
                human_bytes(size),
                elapsed.as_secs_f64(),
                human_rate(size, elapsed)
            );
        }

        Ok(())
    }
}
