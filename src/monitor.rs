use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use regex::Regex;
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::db::rosters;
use crate::error::AppError;
use crate::host::HostGateway;
use crate::models::channel::ChannelRenderEvent;
use crate::models::user::UserRecord;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub space_id: String,
    pub channel_pattern: Regex,
    pub liveness_window: Duration,
    pub sampler_interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum MonitorPhase {
    Idle,
    Active { channel_id: String },
}

enum Phase {
    Idle,
    Active { channel_id: String, last_seen: Instant },
}

struct SessionTasks {
    sampler: JoinHandle<()>,
    liveness: JoinHandle<()>,
}

/// Mutable session state. The epoch counter is bumped on every transition;
/// timer tasks carry the epoch they were spawned under and stop acting the
/// moment it no longer matches.
struct Session {
    phase: Phase,
    tasks: Option<SessionTasks>,
    epoch: u64,
}

struct Inner {
    db: SqlitePool,
    host: Arc<dyn HostGateway>,
    config: MonitorConfig,
    session: Mutex<Session>,
}

/// Tracks the operator's presence in the monitored channel and drives the
/// auto-ban sweep and join-history bookkeeping.
///
/// One channel is tracked at a time. A render event for a matching channel in
/// the configured space activates the monitor; the session ends when no
/// render event refreshes it within the liveness window, or immediately when
/// an event names a different space.
#[derive(Clone)]
pub struct MembershipMonitor {
    inner: Arc<Inner>,
}

impl MembershipMonitor {
    pub fn new(db: SqlitePool, host: Arc<dyn HostGateway>, config: MonitorConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                db,
                host,
                config,
                session: Mutex::new(Session {
                    phase: Phase::Idle,
                    tasks: None,
                    epoch: 0,
                }),
            }),
        }
    }

    pub async fn phase(&self) -> MonitorPhase {
        match &self.inner.session.lock().await.phase {
            Phase::Idle => MonitorPhase::Idle,
            Phase::Active { channel_id, .. } => MonitorPhase::Active {
                channel_id: channel_id.clone(),
            },
        }
    }

    pub async fn observe(&self, event: &ChannelRenderEvent) -> Result<(), AppError> {
        let inner = &self.inner;
        let mut session = inner.session.lock().await;

        if event.space_id != inner.config.space_id {
            return inner
                .leave_locked(&mut session, "event outside configured space")
                .await;
        }

        let matches = inner.config.channel_pattern.is_match(&event.name);
        match &mut session.phase {
            Phase::Active {
                channel_id,
                last_seen,
            } if *channel_id == event.channel_id => {
                *last_seen = Instant::now();
                Ok(())
            }
            Phase::Active { .. } => {
                if matches {
                    // Re-entrant transition: full teardown, then a fresh
                    // session on the new channel.
                    inner
                        .leave_locked(&mut session, "switching monitored channel")
                        .await?;
                    enter(inner.clone(), &mut session, event.channel_id.clone()).await
                } else {
                    Ok(())
                }
            }
            Phase::Idle => {
                if matches {
                    enter(inner.clone(), &mut session, event.channel_id.clone()).await
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl Inner {
    async fn leave_locked(&self, session: &mut Session, reason: &str) -> Result<(), AppError> {
        if let Phase::Active { channel_id, .. } = &session.phase {
            tracing::info!(%channel_id, %reason, "leaving monitored channel");
        }
        session.phase = Phase::Idle;
        session.epoch += 1;

        let tasks = session.tasks.take();
        if let Some(t) = &tasks {
            t.sampler.abort();
        }
        rosters::clear_session(&self.db).await?;
        // The liveness checker may be the task running this teardown, so it
        // is aborted only after the store is clean.
        if let Some(t) = tasks {
            t.liveness.abort();
        }
        Ok(())
    }
}

async fn enter(
    inner: Arc<Inner>,
    session: &mut Session,
    channel_id: String,
) -> Result<(), AppError> {
    tracing::info!(%channel_id, "entering monitored channel");
    session.epoch += 1;
    let epoch = session.epoch;
    session.phase = Phase::Active {
        channel_id: channel_id.clone(),
        last_seen: Instant::now(),
    };
    session.tasks = Some(SessionTasks {
        sampler: tokio::spawn(sample_loop(inner.clone(), channel_id.clone(), epoch)),
        liveness: tokio::spawn(liveness_loop(inner.clone(), epoch)),
    });
    auto_ban_sweep(&inner, &channel_id).await
}

/// Fires once per entry. Only the first occupant of the channel runs the
/// sweep; everyone flagged is banned in a single submission and recorded as
/// banned before the command resolves.
async fn auto_ban_sweep(inner: &Arc<Inner>, channel_id: &str) -> Result<(), AppError> {
    let operator = match inner.host.current_operator_id().await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("auto-ban sweep aborted, operator identity unavailable: {e}");
            return Ok(());
        }
    };
    let occupants = match inner.host.list_occupants(channel_id).await {
        Ok(o) => o,
        Err(e) => {
            tracing::warn!("auto-ban sweep skipped, occupant listing failed: {e}");
            return Ok(());
        }
    };
    if occupants.first().map(String::as_str) != Some(operator.as_str()) {
        return Ok(());
    }

    let flagged = rosters::roster(&inner.db, rosters::AUTOBAN_USERS).await?;
    if flagged.is_empty() {
        return Ok(());
    }
    let mut ids: Vec<String> = flagged.iter().cloned().collect();
    ids.sort_unstable();

    let host = inner.host.clone();
    let space_id = inner.config.space_id.clone();
    let submit_ids = ids.clone();
    tokio::spawn(async move {
        if let Err(e) = host.submit_ban(&submit_ids, &space_id).await {
            tracing::error!("auto-ban submission failed: {e}");
        }
    });

    // Optimistic: the roster update is not rolled back if the submission
    // fails.
    rosters::add_to_roster(&inner.db, rosters::BANNED_USERS, &ids).await?;
    rosters::prune_history(&inner.db, &flagged).await?;
    tracing::info!(count = ids.len(), "auto-ban sweep dispatched");
    Ok(())
}

async fn sample_loop(inner: Arc<Inner>, channel_id: String, epoch: u64) {
    let mut ticker = tokio::time::interval(inner.config.sampler_interval);
    loop {
        ticker.tick().await;
        match sample_once(&inner, &channel_id, epoch).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => tracing::warn!("history sample failed: {e:?}"),
        }
    }
}

/// One sampler tick. Returns `Ok(false)` once the session this sampler
/// belongs to is over.
async fn sample_once(
    inner: &Arc<Inner>,
    channel_id: &str,
    epoch: u64,
) -> Result<bool, AppError> {
    if inner.session.lock().await.epoch != epoch {
        return Ok(false);
    }

    let occupants = match inner.host.list_occupants(channel_id).await {
        Ok(o) => o,
        Err(e) => {
            tracing::debug!("occupant listing failed: {e}");
            return Ok(true);
        }
    };

    let banned = rosters::roster(&inner.db, rosters::BANNED_USERS).await?;
    let blacklist = rosters::roster(&inner.db, rosters::BLACKLIST).await?;

    let mut resolved = Vec::new();
    for user_id in occupants {
        if banned.contains(&user_id) || blacklist.contains(&user_id) {
            continue;
        }
        match inner.host.resolve_user(&user_id).await {
            Ok(Some(user)) => resolved.push(user),
            Ok(None) => tracing::debug!(%user_id, "occupant not resolvable"),
            Err(e) => tracing::debug!(%user_id, "occupant resolution failed: {e}"),
        }
    }

    // Merge under the session lock so a concurrent teardown cannot interleave
    // with the write.
    let session = inner.session.lock().await;
    if session.epoch != epoch {
        return Ok(false);
    }
    let mut records = rosters::history(&inner.db).await?;
    let mut known: HashSet<String> = records.iter().map(|r| r.id.clone()).collect();
    let now = Utc::now();
    let mut changed = false;
    for user in resolved {
        if known.insert(user.id.clone()) {
            records.push(UserRecord::from_resolved(user, now));
            changed = true;
        }
    }
    if changed {
        rosters::put_history(&inner.db, &records).await?;
    }
    drop(session);
    Ok(true)
}

async fn liveness_loop(inner: Arc<Inner>, epoch: u64) {
    let tick = inner.config.liveness_window.min(Duration::from_secs(1));
    let mut ticker = tokio::time::interval(tick);
    loop {
        ticker.tick().await;
        let mut session = inner.session.lock().await;
        if session.epoch != epoch {
            break;
        }
        let expired = match &session.phase {
            Phase::Active { last_seen, .. } => {
                last_seen.elapsed() > inner.config.liveness_window
            }
            Phase::Idle => true,
        };
        if expired {
            if let Err(e) = inner
                .leave_locked(&mut session, "no render activity within liveness window")
                .await
            {
                tracing::error!("session teardown failed: {e:?}");
            }
            break;
        }
    }
}
