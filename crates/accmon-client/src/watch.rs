//! Polling monitor session.
//!
//! Runs on a single-threaded runtime inside a `LocalSet`. The only suspension
//! points are the network fetch, the refresh timer and stdin. Each fetch runs
//! as its own local task; a trigger while another fetch is pending starts an
//! overlapping fetch instead of queueing. Results are applied in arrival
//! order.

use std::io::{BufRead, Write};
use std::str::FromStr;
use std::time::Instant;

use accmon_types::{AccountFilter, AccountState, AccountsSnapshot};
use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::LocalSet;
use tokio::time::{self, Interval, MissedTickBehavior};

use crate::client::MonitorClient;
use crate::credentials::CredentialStore;
use crate::error::ClientError;
use crate::types::RefreshInterval;
use crate::view::render::{render_frame, CLEAR_SCREEN, HELP};
use crate::view::{FetchOutcome, MonitorView};

/// Startup settings of a watch session.
#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    pub filter: AccountFilter,
    pub interval: RefreshInterval,
}

/// A line typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    Interval(RefreshInterval),
    Provider(Option<String>),
    Status(Option<AccountState>),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, arg)) => (verb, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (line, None),
        };

        match verb.to_ascii_lowercase().as_str() {
            "" | "r" | "refresh" => Ok(Self::Refresh),
            "i" | "interval" => {
                let arg = arg.ok_or("usage: i <off|5|10|30|60>")?;
                arg.parse().map(Self::Interval).map_err(|e| format!("{}", e))
            },
            "p" | "provider" => Ok(Self::Provider(arg.map(str::to_string))),
            "s" | "status" => match arg {
                Some(arg) => arg.parse().map(|s| Self::Status(Some(s))).map_err(|e| format!("{}", e)),
                None => Ok(Self::Status(None)),
            },
            "h" | "help" | "?" => Ok(Self::Help),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command '{}' ({})", other, HELP)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct FetchDone {
    generation: u64,
    result: Result<AccountsSnapshot, ClientError>,
}

pub struct WatchSession<W: Write> {
    options: WatchOptions,
    store: CredentialStore,
    client: MonitorClient,
    view: MonitorView,
    timer: Option<Interval>,
    generation: u64,
    results_tx: mpsc::UnboundedSender<FetchDone>,
    results_rx: mpsc::UnboundedReceiver<FetchDone>,
    out: W,
}

impl<W: Write> WatchSession<W> {
    pub fn new(client: MonitorClient, store: CredentialStore, options: WatchOptions, out: W) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let view = MonitorView::new(options.filter.clone(), options.interval);
        Self {
            options,
            store,
            client,
            view,
            timer: None,
            generation: 0,
            results_tx,
            results_rx,
            out,
        }
    }

    pub const fn view(&self) -> &MonitorView {
        &self.view
    }

    pub fn client(&self) -> &MonitorClient {
        &self.client
    }

    /// Drive the session until `q` or end of input.
    ///
    /// Must be called from within a `LocalSet`.
    pub async fn run(mut self, mut input: mpsc::UnboundedReceiver<String>) -> Result<(), ClientError> {
        self.trigger_fetch();
        self.reschedule_timer();
        self.draw()?;

        loop {
            let deadline = self.view.notification_deadline();
            tokio::select! {
                line = input.recv() => match line {
                    Some(line) => {
                        if self.handle_line(&line)? == Flow::Quit {
                            break;
                        }
                    },
                    None => break,
                },
                Some(done) = self.results_rx.recv() => self.handle_fetch(done),
                () = next_tick(&mut self.timer) => self.trigger_fetch(),
                () = sleep_until(deadline) => {},
            }

            self.view.dismiss_expired(Instant::now());
            self.draw()?;
            self.view.settle();
        }

        tracing::debug!("[Monitor] Watch session finished");
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> Result<Flow, ClientError> {
        if self.view.is_awaiting_key() {
            if matches!(line.trim().parse::<Command>(), Ok(Command::Quit)) {
                self.view.end_key_prompt();
                return Ok(Flow::Quit);
            }
            self.submit_key(line)?;
            return Ok(Flow::Continue);
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => return Ok(Flow::Quit),
            Ok(command) => self.apply(command),
            Err(message) => self.view.notify(message, true, Instant::now()),
        }
        Ok(Flow::Continue)
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Refresh => self.trigger_fetch(),
            Command::Interval(interval) => {
                self.view.set_interval(interval);
                self.reschedule_timer();
            },
            Command::Provider(provider) => self.view.filter_mut().set_provider(provider.as_deref()),
            Command::Status(status) => self.view.filter_mut().set_status(status),
            Command::Help => self.view.notify(HELP, false, Instant::now()),
            Command::Quit => {},
        }
    }

    /// Answer to an auth challenge. An empty answer abandons the refresh.
    fn submit_key(&mut self, line: &str) -> Result<(), ClientError> {
        self.view.end_key_prompt();
        let key = line.trim();
        if key.is_empty() {
            tracing::debug!("[Monitor] Key prompt dismissed, refresh abandoned");
            return Ok(());
        }

        if let Err(e) = self.store.save(key) {
            tracing::warn!("[Monitor] Could not persist management key: {}", e);
            self.view.notify(format!("Could not save management key: {}", e), true, Instant::now());
        }
        self.reload(key)
    }

    /// Start over with a new key: fresh client, fresh view, fresh timer.
    /// Results of fetches started before the reload are discarded.
    fn reload(&mut self, key: &str) -> Result<(), ClientError> {
        self.client = self.client.with_management_key(key)?;
        self.generation += 1;
        let notification = self.view.notification().cloned();
        self.view = MonitorView::new(self.options.filter.clone(), self.options.interval);
        if let Some(note) = notification {
            self.view.notify(note.message, note.is_error, Instant::now());
        }
        tracing::info!("[Monitor] Reloading with new management key");
        self.trigger_fetch();
        self.reschedule_timer();
        Ok(())
    }

    fn handle_fetch(&mut self, done: FetchDone) {
        if done.generation != self.generation {
            tracing::debug!("[Monitor] Dropping result from before reload");
            return;
        }
        if self.view.finish_fetch(done.result, Instant::now()) == FetchOutcome::AuthChallenge {
            tracing::info!("[Monitor] Server requires a management key");
        }
    }

    fn trigger_fetch(&mut self) {
        self.view.begin_fetch();
        let client = self.client.clone();
        let tx = self.results_tx.clone();
        let generation = self.generation;
        tokio::task::spawn_local(async move {
            let result = client.fetch_snapshot().await;
            let _ = tx.send(FetchDone { generation, result });
        });
    }

    /// Replace the refresh timer. The first tick fires one full period from now.
    fn reschedule_timer(&mut self) {
        self.timer = self.view.interval().period().map(|period| {
            let mut timer = time::interval_at(time::Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            timer
        });
    }

    fn draw(&mut self) -> Result<(), ClientError> {
        let frame = render_frame(&self.view, Utc::now());
        write!(self.out, "{}{}", CLEAR_SCREEN, frame)?;
        self.out.flush()?;
        Ok(())
    }
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        },
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

/// Forward stdin lines to a channel. The channel closes on EOF.
///
/// Reads on a detached OS thread so a pending read never holds up runtime
/// shutdown after `q`.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                },
                Err(e) => {
                    tracing::warn!("[Monitor] stdin read failed: {}", e);
                    break;
                },
            }
        }
    });
    rx
}

/// Run a watch session to completion on the current (single-threaded) runtime.
pub async fn run_watch<W: Write>(
    client: MonitorClient,
    store: CredentialStore,
    options: WatchOptions,
    input: mpsc::UnboundedReceiver<String>,
    out: W,
) -> Result<(), ClientError> {
    let session = WatchSession::new(client, store, options, out);
    LocalSet::new().run_until(session.run(input)).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("r".parse::<Command>().unwrap(), Command::Refresh);
        assert_eq!("".parse::<Command>().unwrap(), Command::Refresh);
        assert_eq!("q".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!("i off".parse::<Command>().unwrap(), Command::Interval(RefreshInterval::Off));
        assert_eq!(
            "interval 60".parse::<Command>().unwrap(),
            Command::Interval(RefreshInterval::SixtySeconds)
        );
        assert_eq!("p cod".parse::<Command>().unwrap(), Command::Provider(Some("cod".to_string())));
        assert_eq!("p".parse::<Command>().unwrap(), Command::Provider(None));
        assert_eq!(
            "s cooldown".parse::<Command>().unwrap(),
            Command::Status(Some(AccountState::Cooldown))
        );
        assert_eq!("s".parse::<Command>().unwrap(), Command::Status(None));
    }

    #[test]
    fn test_parse_command_errors() {
        assert!("i".parse::<Command>().is_err());
        assert!("i 7".parse::<Command>().is_err());
        assert!("s paused".parse::<Command>().is_err());
        assert!("launch".parse::<Command>().unwrap_err().contains("unknown command"));
    }

    mod session {
        use super::*;
        use crate::client::SNAPSHOT_PATH;
        use crate::types::ClientConfig;
        use accmon_types::{aggregate, AccountRecord};
        use tempfile::TempDir;
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        fn snapshot_body() -> serde_json::Value {
            let records = [AccountRecord::new("acc-1", "codex")];
            serde_json::to_value(aggregate(records.iter().map(Some), Utc::now())).unwrap()
        }

        fn session(server: &MockServer, dir: &TempDir) -> WatchSession<Vec<u8>> {
            let config = ClientConfig { base_url: server.uri(), ..Default::default() };
            let options = WatchOptions { interval: RefreshInterval::Off, ..Default::default() };
            WatchSession::new(
                MonitorClient::new(config).unwrap(),
                CredentialStore::new(dir.path().join("key")),
                options,
                Vec::new(),
            )
        }

        async fn settle_next(session: &mut WatchSession<Vec<u8>>) {
            let done = session.results_rx.recv().await.unwrap();
            session.handle_fetch(done);
            session.view.settle();
        }

        #[tokio::test]
        async fn test_auth_challenge_then_key_reloads() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path(SNAPSHOT_PATH))
                .and(header("authorization", "Bearer secret"))
                .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body()))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path(SNAPSHOT_PATH))
                .respond_with(ResponseTemplate::new(401))
                .mount(&server)
                .await;
            let dir = TempDir::new().unwrap();

            LocalSet::new()
                .run_until(async {
                    let mut session = session(&server, &dir);
                    session.trigger_fetch();
                    settle_next(&mut session).await;
                    assert!(session.view().is_awaiting_key());
                    assert!(session.view().snapshot().is_none());

                    assert_eq!(session.handle_line("secret").unwrap(), Flow::Continue);
                    assert!(!session.view().is_awaiting_key());
                    assert_eq!(session.generation, 1);
                    assert_eq!(session.store.load().unwrap().as_deref(), Some("secret"));

                    settle_next(&mut session).await;
                    assert_eq!(session.view().snapshot().unwrap().total_count, 1);
                    assert_eq!(session.client().config().management_key.as_deref(), Some("secret"));
                })
                .await;
        }

        #[tokio::test]
        async fn test_empty_key_abandons_refresh() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path(SNAPSHOT_PATH))
                .respond_with(ResponseTemplate::new(403))
                .mount(&server)
                .await;
            let dir = TempDir::new().unwrap();

            LocalSet::new()
                .run_until(async {
                    let mut session = session(&server, &dir);
                    session.trigger_fetch();
                    settle_next(&mut session).await;
                    assert!(session.view().is_awaiting_key());

                    session.handle_line("   ").unwrap();
                    assert!(!session.view().is_awaiting_key());
                    assert!(!session.view().is_busy());
                    assert!(session.view().notification().is_none());
                    assert_eq!(session.generation, 0);
                    assert_eq!(session.store.load().unwrap(), None);
                })
                .await;
        }

        #[tokio::test]
        async fn test_quit_at_key_prompt_is_not_saved() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path(SNAPSHOT_PATH))
                .respond_with(ResponseTemplate::new(401))
                .mount(&server)
                .await;
            let dir = TempDir::new().unwrap();

            LocalSet::new()
                .run_until(async {
                    let mut session = session(&server, &dir);
                    session.trigger_fetch();
                    settle_next(&mut session).await;
                    assert!(session.view().is_awaiting_key());

                    assert_eq!(session.handle_line(" Q ").unwrap(), Flow::Quit);
                    assert!(!session.view().is_awaiting_key());
                    assert_eq!(session.generation, 0);
                    assert_eq!(session.store.load().unwrap(), None);
                })
                .await;
        }

        #[tokio::test]
        async fn test_run_returns_on_quit_with_input_open() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path(SNAPSHOT_PATH))
                .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body()))
                .mount(&server)
                .await;
            let dir = TempDir::new().unwrap();

            LocalSet::new()
                .run_until(async {
                    let session = session(&server, &dir);
                    let (tx, rx) = mpsc::unbounded_channel();
                    tx.send("q".to_string()).unwrap();

                    let finished =
                        time::timeout(std::time::Duration::from_secs(5), session.run(rx)).await;
                    assert!(matches!(finished, Ok(Ok(()))));
                    // Held until here so the loop cannot end on channel close.
                    drop(tx);
                })
                .await;
        }

        #[tokio::test]
        async fn test_server_error_notifies() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path(SNAPSHOT_PATH))
                .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
                .mount(&server)
                .await;
            let dir = TempDir::new().unwrap();

            LocalSet::new()
                .run_until(async {
                    let mut session = session(&server, &dir);
                    session.trigger_fetch();
                    settle_next(&mut session).await;
                    let note = session.view().notification().unwrap();
                    assert!(note.is_error);
                    assert!(note.message.starts_with("Failed to fetch accounts"));
                })
                .await;
        }

        #[tokio::test]
        async fn test_results_from_before_reload_are_dropped() {
            let server = MockServer::start().await;
            let dir = TempDir::new().unwrap();
            let mut session = session(&server, &dir);
            session.generation = 1;
            session.view.begin_fetch();

            let stale = aggregate(std::iter::empty::<Option<&AccountRecord>>(), Utc::now());
            session.handle_fetch(FetchDone { generation: 0, result: Ok(stale) });
            assert!(session.view().snapshot().is_none());
        }

        #[tokio::test]
        async fn test_commands_update_filter_and_interval() {
            let server = MockServer::start().await;
            let dir = TempDir::new().unwrap();
            let mut session = session(&server, &dir);

            session.handle_line("p Claude").unwrap();
            session.handle_line("s error").unwrap();
            session.handle_line("i 5").unwrap();
            assert_eq!(session.view().filter().provider(), Some("claude"));
            assert_eq!(session.view().filter().status(), Some(AccountState::Error));
            assert_eq!(session.view().interval(), RefreshInterval::FiveSeconds);
            assert!(session.timer.is_some());

            session.handle_line("i off").unwrap();
            assert!(session.timer.is_none());
            assert_eq!(session.handle_line("q").unwrap(), Flow::Quit);
        }

        #[tokio::test]
        async fn test_draw_clears_screen() {
            let server = MockServer::start().await;
            let dir = TempDir::new().unwrap();
            let mut session = session(&server, &dir);
            session.draw().unwrap();
            let out = String::from_utf8(session.out.clone()).unwrap();
            assert!(out.starts_with(CLEAR_SCREEN));
            assert!(out.contains("Loading accounts..."));
        }
    }
}
