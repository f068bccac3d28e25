use crate::error::{ErrorKind, Result};
use crate::job::{ContentJob, Needs, enqueue, requeue_front};
use crate::process::{Extracted, process_job};
use crate::status::Status;
use exn::ResultExt;
use folio_asyncutils::{CancellationToken, Debouncer, run_chunked};
use folio_cache::{ContentField, MtimeUpdate, Repository};
use folio_config::{ChangedInputs, Limits, Settings};
use folio_extract::Extractor;
use folio_vault::{VaultFile, VaultHandle};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;
use tracing::instrument;

/// What [`ContentService::update_settings`] did about a settings change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsImpact {
    /// Kinds whose extraction inputs changed (and were cleared).
    pub changed: ChangedInputs,
    /// Stored values nulled across all cleared kinds.
    pub cleared: u64,
}

/// The active processing run.
struct Run {
    id: u64,
    token: CancellationToken,
}

#[derive(Default)]
struct State {
    queue: VecDeque<ContentJob>,
    run: Option<Run>,
    next_run_id: u64,
    /// A start was requested while a run was still winding down.
    restart: bool,
    settings_changed: bool,
    latest_settings: Option<Arc<Settings>>,
}

struct Inner {
    vault: VaultHandle,
    repo: Repository,
    limits: Limits,
    debouncer: Debouncer,
    state: Mutex<State>,
    /// Held around store writes of a run and around settings clears.
    writes: tokio::sync::Mutex<()>,
    status: watch::Sender<Status>,
}

/// Keeps the derived content of vault files (tags, preview text, feature
/// image, frontmatter metadata) in the store up to date.
///
/// Callers hand over files they consider worth checking, typically on
/// startup and on every vault change. Each call evaluates staleness against
/// the store, queues what is stale and (re)arms a debounce timer; when it
/// fires, queued jobs are processed in batches of
/// [`Limits::batch_size`], each batch in concurrent chunks of
/// [`Limits::parallel_limit`], and written back with one notifying store
/// write per batch.
///
/// The queue belongs to this instance. Dropping the service stops it.
pub struct ContentService {
    inner: Arc<Inner>,
}

impl ContentService {
    /// Must be called from within a Tokio runtime. Zero batch or chunk sizes
    /// are raised to one.
    pub fn new(vault: VaultHandle, repo: Repository, limits: Limits) -> Self {
        let limits = Limits {
            batch_size: limits.batch_size.max(1),
            parallel_limit: limits.parallel_limit.max(1),
            ..limits
        };
        let (status, _) = watch::channel(Status::default());
        let inner = Inner {
            vault,
            repo,
            debouncer: Debouncer::new(limits.debounce()),
            limits,
            state: Mutex::new(State::default()),
            writes: tokio::sync::Mutex::new(()),
            status,
        };
        Self { inner: Arc::new(inner) }
    }

    pub fn repository(&self) -> &Repository {
        &self.inner.repo
    }

    /// Watch queue and run progress.
    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.inner.status.subscribe()
    }

    pub fn status(&self) -> Status {
        *self.inner.status.borrow()
    }

    /// Check `files` for stale content and queue the ones that need work.
    ///
    /// Returns the number of jobs added to the queue. Jobs for paths that are
    /// already queued are merged into the existing entry. A run in progress
    /// is aborted (its unprocessed jobs return to the front of the queue) and
    /// processing restarts once the debounce window has passed, using these
    /// settings.
    #[instrument(skip_all, fields(files = files.len()))]
    pub async fn queue_content(&self, files: Vec<VaultFile>, settings: impl Into<Arc<Settings>>) -> Result<usize> {
        let settings = settings.into();
        let inner = &self.inner;
        inner.debouncer.cancel();
        {
            let mut state = inner.lock();
            if state.settings_changed {
                tracing::debug!(discarded = state.queue.len(), "settings changed; discarding queue");
                state.queue.clear();
                state.settings_changed = false;
            }
            inner.publish(&state);
        }
        if !settings.any_content_enabled() {
            self.resume();
            return Ok(0);
        }

        let paths: Vec<String> = files.iter().map(|file| file.path.clone()).collect();
        let records = match inner.repo.get_files(&paths).await {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(error = ?err, "could not read existing records");
                self.resume();
                return Err(err).or_raise(|| ErrorKind::Store);
            },
        };
        let jobs: Vec<ContentJob> = files
            .into_iter()
            .filter_map(|file| {
                let needs = Needs::evaluate(&file, records.get(&file.path), &settings);
                needs.any().then_some(ContentJob { file, needs })
            })
            .collect();
        if jobs.is_empty() {
            self.resume();
            return Ok(0);
        }

        let added = {
            let mut state = inner.lock();
            let added = enqueue(&mut state.queue, jobs);
            state.latest_settings = Some(settings);
            if let Some(run) = &state.run {
                tracing::debug!(run = run.id, "aborting active run");
                run.token.cancel();
            }
            inner.publish(&state);
            added
        };
        tracing::debug!(added, "queued content jobs");
        Inner::schedule(inner);
        Ok(added)
    }

    /// Re-arm the timer for jobs that were already queued.
    fn resume(&self) {
        if !self.inner.lock().queue.is_empty() {
            Inner::schedule(&self.inner);
        }
    }

    /// Stop all processing: cancel the timer, empty the queue and abort the
    /// active run. Results of an aborted run that are still in flight are
    /// discarded. Safe to call repeatedly.
    pub fn stop(&self) {
        let inner = &self.inner;
        inner.debouncer.cancel();
        let mut state = inner.lock();
        state.queue.clear();
        state.restart = false;
        if let Some(run) = state.run.take() {
            run.token.cancel();
        }
        inner.publish(&state);
    }

    /// Mark settings as changed: the next [`queue_content`](Self::queue_content)
    /// starts from an empty queue.
    ///
    /// The pending timer is cancelled and the active run is abandoned; nothing
    /// it extracted with the old settings is written.
    pub fn settings_changed(&self) {
        let inner = &self.inner;
        inner.debouncer.cancel();
        let mut state = inner.lock();
        state.settings_changed = true;
        state.restart = false;
        if let Some(run) = state.run.take() {
            tracing::debug!(run = run.id, "settings changed; abandoning active run");
            run.token.cancel();
        }
        inner.publish(&state);
    }

    /// Apply a settings change.
    ///
    /// Marks settings as changed, then clears the stored values of every
    /// enabled kind whose extraction inputs differ between `previous` and
    /// `next`, so they are regenerated on the next
    /// [`queue_content`](Self::queue_content).
    #[instrument(skip_all)]
    pub async fn update_settings(&self, previous: &Settings, next: &Settings) -> Result<SettingsImpact> {
        self.settings_changed();
        // Let a write of the abandoned run finish before clearing under it.
        let _writes = self.inner.writes.lock().await;
        let changed = previous.changed_inputs(next);
        let fields = [
            (changed.tags, ContentField::Tags),
            (changed.preview, ContentField::Preview),
            (changed.feature_image, ContentField::FeatureImage),
            (changed.metadata, ContentField::Metadata),
        ];
        let mut cleared = 0;
        for (_, field) in fields.into_iter().filter(|(changed, _)| *changed) {
            cleared += self.clear(field).await?;
        }
        Ok(SettingsImpact { changed, cleared })
    }

    pub async fn clear_previews(&self) -> Result<u64> {
        self.clear(ContentField::Preview).await
    }

    pub async fn clear_feature_images(&self) -> Result<u64> {
        self.clear(ContentField::FeatureImage).await
    }

    pub async fn clear_tags(&self) -> Result<u64> {
        self.clear(ContentField::Tags).await
    }

    pub async fn clear_metadata(&self) -> Result<u64> {
        self.clear(ContentField::Metadata).await
    }

    async fn clear(&self, field: ContentField) -> Result<u64> {
        self.inner.repo.batch_clear_all_file_content(field).await.or_raise(|| ErrorKind::Store)
    }
}

impl Drop for ContentService {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &State) {
        self.status.send_modify(|status| {
            status.processing = state.run.is_some();
            status.queued = state.queue.len();
        });
    }

    fn schedule(this: &Arc<Self>) {
        let weak: Weak<Self> = Arc::downgrade(this);
        this.debouncer.schedule(async move {
            if let Some(inner) = weak.upgrade() {
                Inner::start(&inner);
            }
        });
    }

    /// Start a run unless one is active or there is nothing to do.
    fn start(this: &Arc<Self>) {
        let mut state = this.lock();
        if state.run.is_some() {
            state.restart = true;
            return;
        }
        state.restart = false;
        let Some(settings) = state.latest_settings.clone() else {
            return;
        };
        if state.queue.is_empty() {
            return;
        }
        let id = state.next_run_id;
        state.next_run_id += 1;
        let token = CancellationToken::new();
        state.run = Some(Run { id, token: token.clone() });
        this.publish(&state);
        this.status.send_modify(|status| status.runs += 1);
        drop(state);
        tokio::spawn(Self::run(Arc::clone(this), id, token, settings));
    }

    /// `true` while run `id` has not been stopped or replaced.
    fn is_current(&self, id: u64) -> bool {
        self.lock().run.as_ref().is_some_and(|run| run.id == id)
    }

    #[instrument(skip(this, token, settings))]
    async fn run(this: Arc<Self>, id: u64, token: CancellationToken, settings: Arc<Settings>) {
        // One snapshot for the whole run, however often settings change.
        let extractor = Extractor::new(&settings);
        while !token.is_cancelled() {
            let batch: Vec<ContentJob> = {
                let mut state = this.lock();
                if !state.run.as_ref().is_some_and(|run| run.id == id) {
                    break;
                }
                let take = this.limits.batch_size.min(state.queue.len());
                let batch = state.queue.drain(..take).collect();
                this.publish(&state);
                batch
            };
            if batch.is_empty() {
                break;
            }
            if let Err(err) = this.process_batch(id, &extractor, batch, &token).await {
                tracing::error!(error = ?err, "content batch failed; dropping queue");
                let mut state = this.lock();
                if state.run.as_ref().is_some_and(|run| run.id == id) {
                    state.queue.clear();
                }
                break;
            }
            tokio::task::yield_now().await;
        }
        Self::finish(&this, id);
    }

    async fn process_batch(
        &self,
        id: u64,
        extractor: &Extractor,
        batch: Vec<ContentJob>,
        token: &CancellationToken,
    ) -> Result<()> {
        let vault = self.vault.as_ref();
        let run = run_chunked(batch, self.limits.parallel_limit, token, |job| async move {
            let result = process_job(vault, extractor, &job).await;
            (job, result)
        })
        .await;

        if run.was_interrupted() {
            let mut state = self.lock();
            if state.run.as_ref().is_some_and(|run| run.id == id) {
                tracing::debug!(returned = run.remaining.len(), "run aborted mid-batch");
                requeue_front(&mut state.queue, run.remaining);
                self.publish(&state);
            }
        }

        let mut done: Vec<(ContentJob, Extracted)> = Vec::with_capacity(run.completed.len());
        let mut failed = 0;
        for (job, result) in run.completed {
            match result {
                Ok(extracted) => done.push((job, extracted)),
                Err(err) => {
                    tracing::debug!(path = %job.file.path, error = ?err, "content job failed");
                    failed += 1;
                },
            }
        }

        let _writes = self.writes.lock().await;
        if !self.is_current(id) {
            // Stopped or replaced: nobody wants these results any more.
            return Ok(());
        }
        let paths: Vec<String> = done.iter().map(|(job, _)| job.file.path.clone()).collect();
        let existing = self.repo.get_files(&paths).await.or_raise(|| ErrorKind::Store)?;
        let mut mtimes = Vec::with_capacity(done.len());
        let mut updates = Vec::with_capacity(done.len());
        for (job, extracted) in done {
            let update = extracted.into_update(&job.file.path, existing.get(&job.file.path));
            if !update.is_empty() {
                updates.push(update);
            }
            mtimes.push(MtimeUpdate::new(job.file.path, job.file.mtime, job.needs.fields()));
        }
        if !self.is_current(id) {
            return Ok(());
        }
        self.repo.batch_update_file_content(&updates).await.or_raise(|| ErrorKind::Store)?;
        if !self.is_current(id) {
            return Ok(());
        }
        self.repo.update_mtimes(&mtimes).await.or_raise(|| ErrorKind::Store)?;
        tracing::debug!(written = updates.len(), processed = mtimes.len(), failed, "content batch complete");
        self.status.send_modify(|status| {
            status.processed += mtimes.len() as u64;
            status.failed += failed;
        });
        Ok(())
    }

    fn finish(this: &Arc<Self>, id: u64) {
        let mut state = this.lock();
        if !state.run.as_ref().is_some_and(|run| run.id == id) {
            return;
        }
        state.run = None;
        this.publish(&state);
        if std::mem::take(&mut state.restart) && !state.queue.is_empty() {
            drop(state);
            Self::start(this);
        }
    }
}
