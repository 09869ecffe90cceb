//! The interactive loop. Every iteration reloads the stored state, keeps the reminder timer
//! alive, delivers pending reminders and then waits a short while for the next [Action].

pub mod action;
pub mod presenter;
pub mod shutdown;

use std::{ops::ControlFlow, sync::Arc, time::Duration};

use anyhow::Result;
use chrono::NaiveDate;
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    analysis::{historic, labelled, logged_share, sum_all},
    model::{BinSet, Configuration, Report},
    reminder::{ReminderHandle, ReminderSignal, ReminderTimer, StoredSettings, DEFAULT_POLL_INTERVAL},
    storage::{
        sync::{RemoteSync, SyncStatus},
        Storage,
    },
    tracker::{self, SettingsChange, TrackerError},
    utils::clock::Clock,
};

pub use action::Action;
pub use presenter::Presenter;

/// How long the loop waits for an action before refreshing the state.
const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub action_timeout: Duration,
    pub reminder_poll_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            action_timeout: DEFAULT_ACTION_TIMEOUT,
            reminder_poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// State loaded at the start of an iteration.
struct Snapshot {
    date: NaiveDate,
    config: Configuration,
    bins: BinSet,
    report: Report,
}

pub struct SessionController<S, P> {
    storage: Arc<S>,
    presenter: P,
    clock: Arc<dyn Clock>,
    sync: Box<dyn RemoteSync>,
    signal: Arc<ReminderSignal>,
    timer: Option<ReminderHandle>,
    shutdown: CancellationToken,
    options: SessionOptions,
    shown_total: Option<(u64, f64)>,
    last_load_error: Option<String>,
}

impl<S, P> SessionController<S, P>
where
    S: Storage + Send + Sync + 'static,
    P: Presenter,
{
    pub fn new(
        storage: Arc<S>,
        presenter: P,
        clock: Arc<dyn Clock>,
        sync: Box<dyn RemoteSync>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            storage,
            presenter,
            clock,
            sync,
            signal: Arc::new(ReminderSignal::default()),
            timer: None,
            shutdown,
            options: SessionOptions::default(),
            shown_total: None,
            last_load_error: None,
        }
    }

    pub fn with_options(self, options: SessionOptions) -> Self {
        Self { options, ..self }
    }

    pub fn signal(&self) -> Arc<ReminderSignal> {
        self.signal.clone()
    }

    /// Executes the session loop until the user exits, `actions` ends or shutdown is requested.
    /// The reminder timer is stopped before this returns.
    pub async fn run(mut self, mut actions: impl Stream<Item = Action> + Unpin) -> Result<()> {
        info!("Session started");
        loop {
            let snapshot = self.refresh().await;
            self.ensure_timer();
            self.deliver_reminder();
            self.display_total(&snapshot);

            let action = tokio::select! {
                _ = self.shutdown.cancelled() => Action::Exit,
                action = actions.next() => action.unwrap_or(Action::Exit),
                _ = self.signal.raised() => continue,
                _ = self.clock.sleep(self.options.action_timeout) => continue,
            };

            if self.dispatch(action, &snapshot).await.is_break() {
                break;
            }
        }

        if let Some(timer) = self.timer.take() {
            info!("Waiting for the reminder timer to stop");
            timer.stop().await?;
        }
        info!("Session finished");
        Ok(())
    }

    /// Loads the current state. Failures are shown once and replaced with empty values, so the
    /// loop keeps going with a total of 0.
    async fn refresh(&mut self) -> Snapshot {
        let date = self.clock.today();
        let mut errors = Vec::new();

        let config = self.storage.load_config().await.unwrap_or_else(|e| {
            errors.push(e.to_string());
            Configuration::default()
        });
        let bins = self.storage.load_bins().await.unwrap_or_else(|e| {
            errors.push(e.to_string());
            BinSet::default()
        });
        let report = self.storage.load_report(date).await.unwrap_or_else(|e| {
            errors.push(e.to_string());
            Report::default()
        });

        let message = (!errors.is_empty()).then(|| errors.join("\n"));
        if message != self.last_load_error {
            if let Some(message) = &message {
                error!("Failed to load state {message}");
                self.presenter.show_error(message);
            }
            self.last_load_error = message;
        }

        Snapshot {
            date,
            config,
            bins,
            report,
        }
    }

    fn ensure_timer(&mut self) {
        match &self.timer {
            Some(timer) if !timer.is_finished() => return,
            Some(_) => warn!("Reminder timer exited, starting a new one"),
            None => (),
        }

        let timer = ReminderTimer::new(
            Box::new(StoredSettings(self.storage.clone())),
            Box::new(self.clock.clone()),
            self.signal.clone(),
            self.options.reminder_poll_interval,
        );
        self.timer = Some(timer.spawn());
    }

    fn deliver_reminder(&mut self) {
        if self.signal.take_pending() {
            info!("Delivering reminder");
            self.presenter.remind();
        }
    }

    fn display_total(&mut self, snapshot: &Snapshot) {
        let logged = sum_all(&snapshot.report);
        let total = (logged, snapshot.config.total_hours);
        if self.shown_total != Some(total) {
            self.presenter.show_total(
                logged,
                snapshot.config.total_hours,
                logged_share(logged, snapshot.config.total_hours),
            );
            self.shown_total = Some(total);
        }
    }

    async fn dispatch(&mut self, action: Action, snapshot: &Snapshot) -> ControlFlow<()> {
        debug!("Dispatching {action:?}");
        let result = match action {
            Action::Exit => {
                info!("Exit requested");
                return ControlFlow::Break(());
            }
            Action::Help => {
                self.presenter.show_help();
                Ok(())
            }
            Action::Settings => {
                self.presenter.show_settings(&snapshot.config, &snapshot.bins);
                Ok(())
            }
            Action::Log(key) => self.log(&key).await,
            Action::Report { history } => self.report(snapshot, history).await,
            Action::SetTotalHours(total_hours) => {
                self.change_settings(SettingsChange {
                    total_hours: Some(total_hours),
                    ..Default::default()
                })
                .await
            }
            Action::SetReminderMinutes(reminder_minutes) => {
                self.change_settings(SettingsChange {
                    reminder_minutes: Some(reminder_minutes),
                    ..Default::default()
                })
                .await
            }
            Action::AddBin(bin) => tracker::add_bin(self.storage.as_ref(), bin)
                .await
                .map(|bin| {
                    self.presenter
                        .show_message(&format!("Bin {} added", bin.nice_name))
                }),
            Action::EditBin { key, update } => {
                tracker::edit_bin(self.storage.as_ref(), &key, update)
                    .await
                    .map(|bin| {
                        self.presenter
                            .show_message(&format!("Bin {} edited", bin.nice_name))
                    })
            }
            Action::DeleteBin(key) => tracker::delete_bin(self.storage.as_ref(), &key)
                .await
                .map(|bin| {
                    self.presenter
                        .show_message(&format!("Bin {} has been deleted", bin.nice_name))
                }),
        };

        if let Err(e) = result {
            error!("Action failed {e:?}");
            self.presenter.show_error(&e);
        }
        ControlFlow::Continue(())
    }

    async fn log(&mut self, key: &str) -> Result<(), TrackerError> {
        // Taken now rather than from the snapshot, the day might have changed while waiting.
        let date = self.clock.today();
        let logged = tracker::log_time(self.storage.as_ref(), date, key).await?;
        self.presenter.show_logged(&logged.bin, logged.count);

        match self.sync.push_report(date, &logged.report).await {
            Ok(SyncStatus::Synced) => debug!("Report for {date} synced"),
            Ok(SyncStatus::NotConfigured) => debug!("Remote sync is not configured"),
            Ok(SyncStatus::Rejected { details }) => warn!("Remote sync rejected report {details}"),
            Err(e) => warn!("Remote sync failed {e:?}"),
        }
        Ok(())
    }

    async fn report(&mut self, snapshot: &Snapshot, history: usize) -> Result<(), TrackerError> {
        let today = labelled(&snapshot.report, &snapshot.bins);
        let past = historic(self.storage.as_ref(), history)
            .await?
            .into_iter()
            .map(|(date, report)| (date, labelled(&report, &snapshot.bins)))
            .collect::<Vec<_>>();
        self.presenter.show_report(snapshot.date, &today, &past);
        Ok(())
    }

    async fn change_settings(&mut self, change: SettingsChange) -> Result<(), TrackerError> {
        let config = tracker::update_settings(self.storage.as_ref(), change).await?;
        self.presenter.show_message(&format!(
            "Working day is {} hours, reminders every {} minutes",
            config.total_hours, config.reminder_minutes
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fmt::Display,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, Utc};
    use futures::{stream, StreamExt};
    use tempfile::tempdir;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    use crate::{
        analysis::ReportLine,
        model::{BinDefinition, BinSet, Configuration},
        storage::{sync::NoopSync, FileStorage, Storage},
        utils::{clock::Clock, percentage::Percentage},
    };

    use super::{Action, Presenter, SessionController, SessionOptions};

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2018, 7, 4).unwrap();

    #[derive(Clone)]
    struct TestClock {
        today: Arc<Mutex<NaiveDate>>,
    }

    impl TestClock {
        fn new(today: NaiveDate) -> Self {
            Self {
                today: Arc::new(Mutex::new(today)),
            }
        }

        fn set_today(&self, today: NaiveDate) {
            *self.today.lock().unwrap() = today;
        }
    }

    #[async_trait]
    impl Clock for TestClock {
        fn time(&self) -> DateTime<Utc> {
            Utc::now()
        }

        fn instant(&self) -> Instant {
            Instant::now()
        }

        fn today(&self) -> NaiveDate {
            *self.today.lock().unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            tokio::time::sleep(duration).await;
        }

        async fn sleep_until(&self, instant: Instant) {
            tokio::time::sleep_until(instant).await;
        }
    }

    #[derive(Debug, PartialEq)]
    enum Shown {
        Total(u64),
        Reminder,
        Logged(String, u64),
        Report(usize, usize),
        Settings,
        Message,
        Error(String),
        Help,
    }

    #[derive(Default)]
    struct RecordingPresenter {
        shown: Vec<Shown>,
    }

    impl RecordingPresenter {
        fn errors(&self) -> Vec<&String> {
            self.shown
                .iter()
                .filter_map(|v| match v {
                    Shown::Error(e) => Some(e),
                    _ => None,
                })
                .collect()
        }
    }

    impl Presenter for RecordingPresenter {
        fn show_total(&mut self, logged: u64, _total_hours: f64, _share: Percentage) {
            self.shown.push(Shown::Total(logged));
        }

        fn remind(&mut self) {
            self.shown.push(Shown::Reminder);
        }

        fn show_logged(&mut self, bin: &BinDefinition, count: u64) {
            self.shown.push(Shown::Logged(bin.name.clone(), count));
        }

        fn show_report(
            &mut self,
            _date: NaiveDate,
            today: &[ReportLine],
            history: &[(NaiveDate, Vec<ReportLine>)],
        ) {
            self.shown.push(Shown::Report(today.len(), history.len()));
        }

        fn show_settings(&mut self, _config: &Configuration, _bins: &BinSet) {
            self.shown.push(Shown::Settings);
        }

        fn show_message(&mut self, _message: &str) {
            self.shown.push(Shown::Message);
        }

        fn show_error(&mut self, error: &dyn Display) {
            self.shown.push(Shown::Error(error.to_string()));
        }

        fn show_help(&mut self) {
            self.shown.push(Shown::Help);
        }
    }

    fn controller<'a>(
        storage: &Arc<FileStorage>,
        presenter: &'a mut RecordingPresenter,
        clock: &TestClock,
    ) -> SessionController<FileStorage, &'a mut RecordingPresenter> {
        SessionController::new(
            storage.clone(),
            presenter,
            Arc::new(clock.clone()),
            Box::new(NoopSync),
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn test_logging_scenario() -> Result<()> {
        let dir = tempdir()?;
        let storage = Arc::new(FileStorage::new(dir.path())?);
        let clock = TestClock::new(TEST_DATE);
        let mut presenter = RecordingPresenter::default();

        let actions = stream::iter([
            Action::Log("meetings".into()),
            Action::Log("Meetings".into()),
            Action::Log("meetings".into()),
            Action::Exit,
        ]);
        controller(&storage, &mut presenter, &clock)
            .run(actions)
            .await?;

        assert_eq!(storage.load_report(TEST_DATE).await?.get("meetings"), 3);
        assert_eq!(
            presenter.shown,
            vec![
                Shown::Total(0),
                Shown::Logged("meetings".into(), 1),
                Shown::Total(1),
                Shown::Logged("meetings".into(), 2),
                Shown::Total(2),
                Shown::Logged("meetings".into(), 3),
                Shown::Total(3),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_actions_keep_the_loop_running() -> Result<()> {
        let dir = tempdir()?;
        let storage = Arc::new(FileStorage::new(dir.path())?);
        let clock = TestClock::new(TEST_DATE);
        let mut presenter = RecordingPresenter::default();

        let travel = BinDefinition::new("travel", "Travel", "Time traveling");
        let actions = stream::iter([
            Action::AddBin(travel.clone()),
            Action::AddBin(BinDefinition::new("Travel", "Trips", "")),
            Action::Log("unknown".into()),
            Action::SetTotalHours(0.),
            Action::Log("travel".into()),
        ]);
        controller(&storage, &mut presenter, &clock)
            .run(actions)
            .await?;

        let bins = storage.load_bins().await?;
        assert_eq!(bins.iter().filter(|v| v.name == "travel").count(), 1);
        assert_eq!(presenter.errors().len(), 3);
        assert!(presenter
            .shown
            .contains(&Shown::Logged("travel".into(), 1)));
        Ok(())
    }

    #[tokio::test]
    async fn test_pending_reminder_is_delivered_once() -> Result<()> {
        let dir = tempdir()?;
        let storage = Arc::new(FileStorage::new(dir.path())?);
        let clock = TestClock::new(TEST_DATE);
        let mut presenter = RecordingPresenter::default();

        let session = controller(&storage, &mut presenter, &clock);
        let signal = session.signal();
        signal.raise();
        session
            .run(stream::iter([Action::Help, Action::Exit]))
            .await?;

        assert!(!signal.is_pending());
        assert_eq!(
            presenter
                .shown
                .iter()
                .filter(|v| **v == Shown::Reminder)
                .count(),
            1
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_day_rollover_starts_a_new_report() -> Result<()> {
        let dir = tempdir()?;
        let storage = Arc::new(FileStorage::new(dir.path())?);
        let clock = TestClock::new(TEST_DATE);
        let next_day = TEST_DATE.succ_opt().unwrap();
        let mut presenter = RecordingPresenter::default();

        let rollover = clock.clone();
        let actions = stream::iter([Action::Log("meetings".into())])
            .chain(stream::once(async move {
                rollover.set_today(next_day);
                Action::Log("meetings".into())
            }))
            .chain(stream::iter([Action::Report { history: 5 }]));
        controller(&storage, &mut presenter, &clock)
            .run(Box::pin(actions))
            .await?;

        assert_eq!(storage.load_report(TEST_DATE).await?.get("meetings"), 1);
        assert_eq!(storage.load_report(next_day).await?.get("meetings"), 1);
        assert!(presenter.shown.contains(&Shown::Report(1, 2)));
        Ok(())
    }

    #[tokio::test]
    async fn test_broken_report_is_shown_once_and_counts_as_zero() -> Result<()> {
        let dir = tempdir()?;
        let storage = Arc::new(FileStorage::new(dir.path())?);
        std::fs::write(dir.path().join("reports/18-07-04.json"), "not json")?;
        let clock = TestClock::new(TEST_DATE);
        let mut presenter = RecordingPresenter::default();

        controller(&storage, &mut presenter, &clock)
            .run(stream::iter([Action::Settings, Action::Settings]))
            .await?;

        assert_eq!(presenter.errors().len(), 1);
        assert!(presenter.shown.contains(&Shown::Total(0)));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("reports/18-07-04.json"))?,
            "not json"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_raised_signal_wakes_an_idle_session() -> Result<()> {
        let dir = tempdir()?;
        let storage = Arc::new(FileStorage::new(dir.path())?);
        let clock = TestClock::new(TEST_DATE);
        let mut presenter = RecordingPresenter::default();
        let shutdown = CancellationToken::new();

        let session = SessionController::new(
            storage.clone(),
            &mut presenter,
            Arc::new(clock.clone()),
            Box::new(NoopSync),
            shutdown.clone(),
        )
        .with_options(SessionOptions {
            action_timeout: Duration::from_secs(3600),
            ..Default::default()
        });
        let signal = session.signal();

        let raiser = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            signal.raise();
            while signal.is_pending() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            shutdown.cancel();
        };
        let (result, _) = tokio::join!(session.run(stream::pending::<Action>()), raiser);
        result?;

        assert!(presenter.shown.contains(&Shown::Reminder));
        Ok(())
    }

    #[tokio::test]
    async fn test_shutdown_stops_the_session() -> Result<()> {
        let dir = tempdir()?;
        let storage = Arc::new(FileStorage::new(dir.path())?);
        let clock = TestClock::new(TEST_DATE);
        let mut presenter = RecordingPresenter::default();
        let shutdown = CancellationToken::new();

        let session = SessionController::new(
            storage.clone(),
            &mut presenter,
            Arc::new(clock.clone()),
            Box::new(NoopSync),
            shutdown.clone(),
        );
        shutdown.cancel();

        tokio::time::timeout(
            Duration::from_secs(5),
            session.run(stream::pending::<Action>()),
        )
        .await??;
        Ok(())
    }
}
