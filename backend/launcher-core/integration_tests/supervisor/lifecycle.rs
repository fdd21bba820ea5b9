// End-to-end supervisor tests: fake window, real child process, mocked HTTP server.
#![cfg(unix)]

use super::fake_window::FakeWindow;

use launcher_core::config::LauncherConfig;
use launcher_core::error::CoreError;
use launcher_core::error::supervisor::SupervisorError;
use launcher_core::server::ServerCommand;
use launcher_core::supervisor::{
    ERROR_DIALOG_MESSAGE, ERROR_DIALOG_TITLE, NavigationOutcome, Supervisor,
};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const EXIT_WAIT: Duration = Duration::from_secs(5);

fn config_for_port(port: u16, timeout: &str) -> LauncherConfig {
    let mut config = LauncherConfig::default();
    config.server.host = String::from("127.0.0.1");
    config.server.port = port;
    config.readiness.timeout = timeout.to_string();
    config.readiness.initial_interval = String::from("20ms");
    config.readiness.max_interval = String::from("100ms");
    config
}

fn sleeping_server() -> ServerCommand {
    ServerCommand::new("sleep", ["30"], "/")
}

async fn ready_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn process_alive(pid: u32) -> bool {
    let mut sys = System::new();
    let target = Pid::from_u32(pid);
    sys.refresh_processes(ProcessesToUpdate::Some(&[target]), true);
    sys.process(target)
        .is_some_and(|p| p.status() != ProcessStatus::Zombie)
}

async fn wait_until_dead(pid: u32) -> bool {
    tokio::time::timeout(EXIT_WAIT, async {
        while process_alive(pid) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .is_ok()
}

/// **VALUE**: Verifies the happy path: one window, one child, navigation to the server URL.
///
/// **WHY THIS MATTERS**: This is the whole job of the launcher. If any step is skipped, the
/// user sees a blank window.
///
/// **BUG THIS CATCHES**: Would catch navigating before the server answers, navigating to
/// the wrong URL, or spawning no child.
#[tokio::test]
async fn given_reachable_server_when_starting_up_then_spawns_once_and_navigates() {
    // GIVEN: A server that answers, and a supervisor pointed at it
    let http = ready_server().await;
    let port = http.address().port();
    let supervisor: Supervisor<FakeWindow> =
        Supervisor::with_command(&config_for_port(port, "5s"), sleeping_server()).unwrap();
    let window = Arc::new(FakeWindow::default());

    // WHEN: Starting up
    let outcome = supervisor.startup(Arc::clone(&window)).await.unwrap();

    // THEN: Loaded, exactly one navigation to the target, one child running, no dialog
    assert_eq!(outcome, NavigationOutcome::Loaded);
    assert_eq!(window.navigations(), [supervisor.target().clone()]);
    assert_eq!(
        supervisor.target().as_str(),
        format!("http://127.0.0.1:{port}/")
    );
    assert!(supervisor.has_window());
    assert!(supervisor.has_server());
    assert!(supervisor.server_pid().is_some());
    assert!(window.dialogs().is_empty());

    supervisor.shutdown();
}

/// **VALUE**: Verifies the window is revealed only on the display-ready signal.
///
/// **WHY THIS MATTERS**: The window is created hidden to avoid a flash of blank content.
///
/// **BUG THIS CATCHES**: Would catch startup revealing the window itself.
#[tokio::test]
async fn given_started_supervisor_when_window_ready_then_window_is_revealed() {
    // GIVEN: A started supervisor
    let http = ready_server().await;
    let supervisor: Supervisor<FakeWindow> = Supervisor::with_command(
        &config_for_port(http.address().port(), "5s"),
        sleeping_server(),
    )
    .unwrap();
    let window = Arc::new(FakeWindow::default());
    supervisor.startup(Arc::clone(&window)).await.unwrap();

    // THEN: Still hidden after startup
    assert!(!window.revealed(), "Window should stay hidden until ready");

    // WHEN: The host signals display-ready
    supervisor.window_ready();

    // THEN: Revealed
    assert!(window.revealed());

    supervisor.shutdown();
}

/// **VALUE**: Verifies shutdown terminates the child and clears both references.
///
/// **WHY THIS MATTERS**: The server's lifetime is bounded by the window's. A surviving child
/// keeps the port and the Python process alive after the app is gone.
///
/// **BUG THIS CATCHES**: Would catch shutdown clearing state without signalling the child.
#[tokio::test]
async fn given_running_supervisor_when_shut_down_then_child_process_exits() {
    // GIVEN: A started supervisor with a live child
    let http = ready_server().await;
    let supervisor: Supervisor<FakeWindow> = Supervisor::with_command(
        &config_for_port(http.address().port(), "5s"),
        sleeping_server(),
    )
    .unwrap();
    supervisor
        .startup(Arc::new(FakeWindow::default()))
        .await
        .unwrap();
    let pid = supervisor.server_pid().expect("child should be running");
    assert!(process_alive(pid));

    // WHEN: Shutting down (twice, as close and exit events both fire)
    supervisor.shutdown();
    supervisor.shutdown();

    // THEN: Child exits and nothing is held
    assert!(wait_until_dead(pid).await, "Child {pid} should exit");
    assert!(!supervisor.has_server());
    assert!(!supervisor.has_window());
}

/// **VALUE**: Verifies an unreachable server yields exactly one error dialog and no crash.
///
/// **WHY THIS MATTERS**: This is the only user-visible failure. It must appear once, with
/// the fixed wording, and leave the app running.
///
/// **BUG THIS CATCHES**: Would catch retry loops that stack dialogs, or panics on failure.
#[tokio::test]
async fn given_unreachable_server_when_starting_up_then_shows_one_error_dialog() {
    // GIVEN: Nothing listening on the target port
    let supervisor: Supervisor<FakeWindow> = Supervisor::with_command(
        &config_for_port(closed_port(), "300ms"),
        sleeping_server(),
    )
    .unwrap();
    let window = Arc::new(FakeWindow::default());

    // WHEN: Starting up
    let outcome = supervisor.startup(Arc::clone(&window)).await.unwrap();

    // THEN: Failed, one dialog with the fixed text, no navigation
    assert_eq!(outcome, NavigationOutcome::Failed);
    assert_eq!(
        window.dialogs(),
        [(
            ERROR_DIALOG_TITLE.to_string(),
            ERROR_DIALOG_MESSAGE.to_string()
        )]
    );
    assert_eq!(ERROR_DIALOG_TITLE, "Luther Terminal Error");
    assert!(window.navigations().is_empty());

    supervisor.shutdown();
}

/// **VALUE**: Verifies a rejected load also produces the single dialog.
#[tokio::test]
async fn given_window_rejecting_load_when_starting_up_then_shows_one_error_dialog() {
    // GIVEN: A reachable server but a window that refuses navigation
    let http = ready_server().await;
    let supervisor: Supervisor<FakeWindow> = Supervisor::with_command(
        &config_for_port(http.address().port(), "5s"),
        sleeping_server(),
    )
    .unwrap();
    let window = Arc::new(FakeWindow::rejecting_navigation());

    // WHEN: Starting up
    let outcome = supervisor.startup(Arc::clone(&window)).await.unwrap();

    // THEN: Failed with one dialog
    assert_eq!(outcome, NavigationOutcome::Failed);
    assert_eq!(window.dialogs().len(), 1);

    supervisor.shutdown();
}

/// **VALUE**: Verifies a missing interpreter fails fast with the dialog instead of a crash.
///
/// **WHY THIS MATTERS**: Spawn failures are never escalated directly; the user learns about
/// them only through the navigation failure.
#[tokio::test]
async fn given_missing_interpreter_when_starting_up_then_fails_with_dialog_quickly() {
    // GIVEN: A Streamlit command under an app root without a venv
    let dir = tempfile::tempdir().unwrap();
    let supervisor: Supervisor<FakeWindow> =
        Supervisor::new(&config_for_port(closed_port(), "30s"), dir.path()).unwrap();
    let window = Arc::new(FakeWindow::default());

    // WHEN: Starting up
    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        supervisor.startup(Arc::clone(&window)),
    )
    .await
    .expect("missing server should not wait for the full timeout")
    .unwrap();

    // THEN: Failed, with the dialog, and no server held
    assert_eq!(outcome, NavigationOutcome::Failed);
    assert_eq!(window.dialogs().len(), 1);
    assert!(!supervisor.has_server());
}

/// **VALUE**: Verifies that a window closed during the wait is left alone.
///
/// **WHY THIS MATTERS**: The wait is not cancelled on close. Acting on a destroyed window
/// would error or pop a dialog with no parent after the user already quit.
#[tokio::test]
async fn given_window_closed_during_wait_when_server_ready_then_nothing_happens() {
    // GIVEN: A reachable server and a window that is already closed
    let http = ready_server().await;
    let supervisor: Supervisor<FakeWindow> = Supervisor::with_command(
        &config_for_port(http.address().port(), "5s"),
        sleeping_server(),
    )
    .unwrap();
    let window = Arc::new(FakeWindow::default());
    window.close();

    // WHEN: Starting up
    let outcome = supervisor.startup(Arc::clone(&window)).await.unwrap();

    // THEN: No navigation, no dialog
    assert_eq!(outcome, NavigationOutcome::WindowClosed);
    assert!(window.navigations().is_empty());
    assert!(window.dialogs().is_empty());

    supervisor.shutdown();
}

/// **VALUE**: Verifies that at most one window can be attached.
#[tokio::test]
async fn given_running_supervisor_when_starting_again_then_rejects_second_window() {
    // GIVEN: A started supervisor
    let http = ready_server().await;
    let supervisor: Supervisor<FakeWindow> = Supervisor::with_command(
        &config_for_port(http.address().port(), "5s"),
        sleeping_server(),
    )
    .unwrap();
    supervisor
        .startup(Arc::new(FakeWindow::default()))
        .await
        .unwrap();
    let first_pid = supervisor.server_pid();

    // WHEN: Starting again with another window
    let result = supervisor.startup(Arc::new(FakeWindow::default())).await;

    // THEN: Rejected, and the first child is untouched
    assert!(matches!(
        result,
        Err(CoreError::Supervisor(SupervisorError::AlreadyRunning { .. }))
    ));
    assert_eq!(supervisor.server_pid(), first_pid);

    supervisor.shutdown();
}

/// **VALUE**: Verifies a new window can be started after shutdown (macOS reactivation).
#[tokio::test]
async fn given_shut_down_supervisor_when_started_again_then_spawns_new_child() {
    // GIVEN: A supervisor that ran once and was shut down
    let http = ready_server().await;
    let supervisor: Supervisor<FakeWindow> = Supervisor::with_command(
        &config_for_port(http.address().port(), "5s"),
        sleeping_server(),
    )
    .unwrap();
    supervisor
        .startup(Arc::new(FakeWindow::default()))
        .await
        .unwrap();
    let first_pid = supervisor.server_pid().unwrap();
    supervisor.shutdown();

    // WHEN: Starting with a fresh window
    let outcome = supervisor
        .startup(Arc::new(FakeWindow::default()))
        .await
        .unwrap();

    // THEN: Loaded with a different child
    assert_eq!(outcome, NavigationOutcome::Loaded);
    let second_pid = supervisor.server_pid().unwrap();
    assert_ne!(first_pid, second_pid);

    supervisor.shutdown();
}

/// **VALUE**: Verifies the Streamlit constructor wires the app root into the command.
#[test]
fn given_app_root_when_creating_supervisor_then_command_runs_from_it() {
    let supervisor: Supervisor<FakeWindow> =
        Supervisor::new(&LauncherConfig::default(), Path::new("/opt/luther")).unwrap();

    assert_eq!(
        supervisor.server_command().working_dir(),
        Path::new("/opt/luther")
    );
    assert_eq!(supervisor.target().as_str(), "http://localhost:8501/");
}

/// **VALUE**: Verifies an invalid config is refused at construction.
#[test]
fn given_invalid_config_when_creating_supervisor_then_returns_config_error() {
    let mut config = LauncherConfig::default();
    config.readiness.timeout = String::from("never");

    let result: Result<Supervisor<FakeWindow>, _> =
        Supervisor::with_command(&config, sleeping_server());

    assert!(matches!(result, Err(CoreError::Config(_))));
}

/// **VALUE**: Verifies a display-ready signal that beats the attach still reveals the window.
///
/// **WHY THIS MATTERS**: The loading page can finish before the window is attached. If that
/// signal is dropped, the window stays hidden, and a later error dialog has nothing visible
/// behind it.
///
/// **BUG THIS CATCHES**: Would catch `window_ready` discarding the event when no window is
/// attached yet.
#[tokio::test]
async fn given_window_ready_before_startup_when_started_then_window_is_revealed() {
    // GIVEN: A supervisor that already received display-ready
    let supervisor: Supervisor<FakeWindow> = Supervisor::with_command(
        &config_for_port(closed_port(), "200ms"),
        sleeping_server(),
    )
    .unwrap();
    let window = Arc::new(FakeWindow::default());
    supervisor.window_ready();

    // WHEN: The window is attached and the sequence runs
    supervisor.startup(Arc::clone(&window)).await.unwrap();

    // THEN: Revealed exactly once, and the dialog shown over it
    assert_eq!(window.reveal_count(), 1);
    assert_eq!(window.dialogs().len(), 1);

    supervisor.shutdown();
}

/// **VALUE**: Verifies attach reveals immediately when ready arrived first, before any run.
#[test]
fn given_window_ready_before_attach_when_attached_then_revealed_synchronously() {
    let supervisor: Supervisor<FakeWindow> =
        Supervisor::with_command(&config_for_port(closed_port(), "1s"), sleeping_server())
            .unwrap();
    let window = Arc::new(FakeWindow::default());
    supervisor.window_ready();

    let _launch = supervisor.attach(Arc::clone(&window)).unwrap();

    assert!(window.revealed());
    assert!(supervisor.has_window());
    assert!(!supervisor.has_server(), "Server starts only when the launch runs");
}

/// **VALUE**: Verifies a pending ready signal does not carry over a shutdown.
#[test]
fn given_ready_then_shutdown_when_attached_then_window_stays_hidden() {
    let supervisor: Supervisor<FakeWindow> =
        Supervisor::with_command(&config_for_port(closed_port(), "1s"), sleeping_server())
            .unwrap();
    supervisor.window_ready();
    supervisor.shutdown();

    let window = Arc::new(FakeWindow::default());
    let _launch = supervisor.attach(Arc::clone(&window)).unwrap();

    assert!(!window.revealed());
}

/// **VALUE**: Verifies later page loads do not reveal and focus the window again.
///
/// **WHY THIS MATTERS**: Every in-window reload fires display-ready. Re-focusing on each one
/// steals focus from whatever the user switched to.
///
/// **BUG THIS CATCHES**: Would catch `window_ready` calling reveal on every finished load.
#[tokio::test]
async fn given_revealed_window_when_ready_fires_again_then_not_revealed_twice() {
    // GIVEN: A started and revealed window
    let http = ready_server().await;
    let supervisor: Supervisor<FakeWindow> = Supervisor::with_command(
        &config_for_port(http.address().port(), "5s"),
        sleeping_server(),
    )
    .unwrap();
    let window = Arc::new(FakeWindow::default());
    supervisor.startup(Arc::clone(&window)).await.unwrap();
    supervisor.window_ready();

    // WHEN: More page loads finish
    supervisor.window_ready();
    supervisor.window_ready();

    // THEN: Still a single reveal
    assert_eq!(window.reveal_count(), 1);

    supervisor.shutdown();
}

/// **VALUE**: Verifies a run outliving its window never acts on the replacement window.
///
/// **WHY THIS MATTERS**: On macOS the window can be closed during the readiness poll and
/// reopened at once. The old run must not keep polling against the new server, navigate the
/// new window or add a second error dialog to it.
///
/// **BUG THIS CATCHES**: Would catch runs that check whichever window and server are current
/// instead of the ones they attached and spawned.
#[tokio::test]
async fn given_window_closed_and_reopened_during_poll_when_runs_finish_then_one_dialog() {
    // GIVEN: A run polling a port that never answers
    let supervisor: Supervisor<FakeWindow> = Supervisor::with_command(
        &config_for_port(closed_port(), "1s"),
        sleeping_server(),
    )
    .unwrap();
    let first_window = Arc::new(FakeWindow::default());
    let second_window = Arc::new(FakeWindow::default());

    let first_run = supervisor.startup(Arc::clone(&first_window));

    // WHEN: The window closes mid-poll and a new one starts right away
    let reopen = async {
        tokio::time::sleep(Duration::from_millis(150)).await;
        first_window.close();
        supervisor.shutdown();
        supervisor.startup(Arc::clone(&second_window)).await
    };

    let (first, second) = tokio::join!(first_run, reopen);

    // THEN: The first run ends quietly, the second reports exactly once
    assert_eq!(first.unwrap(), NavigationOutcome::WindowClosed);
    assert_eq!(second.unwrap(), NavigationOutcome::Failed);
    assert!(first_window.dialogs().is_empty());
    assert_eq!(second_window.dialogs().len(), 1);
    assert!(first_window.navigations().is_empty());

    supervisor.shutdown();
}
