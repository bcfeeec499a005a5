//! Activity pagination
//!
//! The activity listing only answers "up to N activities with id at or after
//! this cursor", sorted ascending. Activity ids are UTC timestamps, so a time
//! range is walked by feeding the last accepted activity back in as the next
//! cursor until a page runs past the end of the range or brings nothing new.
//! Pages may be smaller than the requested limit, so a short page alone does
//! not end the walk.

use chrono::{DateTime, TimeZone, Utc};
use circle_api::models::ActivityRecord;
use tracing::{debug, info, warn};

use crate::app::options::DEFAULT_PAGE_LIMIT;
use crate::authn::session::Session;
use crate::errors::Result;
use crate::http::client::HttpClient;
use crate::models::activity::{format_activity_id, parse_activity_id, truncate_to_minute};
use crate::models::{Accessory, Activity};

/// What to do after absorbing a page
#[derive(Debug, PartialEq, Eq)]
enum PageOutcome {
    /// Fetch the next page starting at this cursor
    Advance(String),

    /// Nothing further can fall inside the range
    RangeExhausted,
}

/// Range bounds and accumulated results for one traversal
struct Traversal<Tz: TimeZone> {
    accessory_id: String,
    zone: Tz,
    begin: DateTime<Utc>,
    end: DateTime<Utc>,
    activities: Vec<Activity>,
}

impl<Tz: TimeZone> Traversal<Tz> {
    fn absorb(&mut self, records: Vec<ActivityRecord>) -> PageOutcome {
        if records.is_empty() {
            return PageOutcome::RangeExhausted;
        }

        let accepted_before = self.activities.len();

        for record in records {
            let time = match parse_activity_id(&record.activity_id) {
                Ok(time) => time,
                Err(e) => {
                    warn!("Skipping activity: {}", e);
                    continue;
                }
            };

            // The cursor is inclusive, so the previous page's last activity
            // comes back first on the next page. Ids sort by time.
            if let Some(last) = self.activities.last() {
                if record.activity_id <= last.activity_id {
                    debug!("{} already listed", record.activity_id);
                    continue;
                }
            }

            let minute = truncate_to_minute(time);
            if minute < self.begin {
                debug!("{} is too soon", record.activity_id);
                continue;
            }
            if minute > self.end {
                debug!("{} is too late", record.activity_id);
                return PageOutcome::RangeExhausted;
            }

            self.activities.push(Activity {
                activity_id: record.activity_id,
                activity_time: time.with_timezone(&self.zone).fixed_offset(),
                accessory_id: self.accessory_id.clone(),
            });
        }

        if self.activities.len() == accepted_before {
            return PageOutcome::RangeExhausted;
        }

        match self.activities.last() {
            Some(last) => PageOutcome::Advance(format_activity_id(&last.activity_time)),
            None => PageOutcome::RangeExhausted,
        }
    }
}

/// Lists an accessory's activities across an arbitrary time range
///
/// ```no_run
/// use chrono::{Duration, Utc};
/// use circle::app::options::ClientOptions;
/// use circle::models::Accessory;
/// use circle::{ActivityPaginator, HttpClient, Session};
///
/// # tokio_test::block_on(async {
/// let client = HttpClient::new(&ClientOptions::default()).unwrap();
/// let session = Session::from_cookie("cookie", None);
/// let accessory = Accessory {
///     name: "Porch".to_string(),
///     accessory_id: "abc-123".to_string(),
///     node_id: String::new(),
/// };
///
/// let end = Utc::now();
/// let activities = ActivityPaginator::new(&client, &session)
///     .list_activities_in_range(&accessory, &(end - Duration::hours(1)), &end)
///     .await
///     .unwrap();
/// # });
/// ```
pub struct ActivityPaginator<'a> {
    http_client: &'a HttpClient,
    session: &'a Session,
    page_limit: u32,
}

impl<'a> ActivityPaginator<'a> {
    /// Create a paginator issuing requests with `session`
    pub fn new(http_client: &'a HttpClient, session: &'a Session) -> Self {
        Self {
            http_client,
            session,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Set how many activities each page asks for
    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    /// List the activities whose minute falls within `[begin, end]`
    ///
    /// Results are in ascending time order with no duplicates, and their
    /// times are expressed in `begin`'s zone. Any failed page aborts the
    /// whole listing.
    pub async fn list_activities_in_range<Tz: TimeZone>(
        &self,
        accessory: &Accessory,
        begin: &DateTime<Tz>,
        end: &DateTime<Tz>,
    ) -> Result<Vec<Activity>> {
        let mut traversal = Traversal {
            accessory_id: accessory.accessory_id.clone(),
            zone: begin.timezone(),
            begin: begin.with_timezone(&Utc),
            end: end.with_timezone(&Utc),
            activities: Vec::new(),
        };

        if traversal.begin > traversal.end {
            debug!("Empty range {} .. {}", traversal.begin, traversal.end);
            return Ok(Vec::new());
        }

        let mut cursor = format_activity_id(begin);
        let mut pages = 0u32;

        loop {
            let records = self
                .http_client
                .get_activities_page(
                    self.session,
                    &accessory.accessory_id,
                    &cursor,
                    self.page_limit,
                )
                .await?;
            pages += 1;

            match traversal.absorb(records) {
                PageOutcome::Advance(next) => cursor = next,
                PageOutcome::RangeExhausted => break,
            }
        }

        info!(
            "Found {} activities for {} in {} pages",
            traversal.activities.len(),
            accessory.name,
            pages
        );
        Ok(traversal.activities)
    }
}
