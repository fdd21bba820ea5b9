// Integration tests for spawning and terminating the server process.
// These spawn real child processes (`sleep`, `sh`), so they are Unix-only.
#![cfg(unix)]

use launcher_core::server::ServerCommand;
use launcher_core::server::spawn::spawn_server;

use std::time::Duration;

use tokio::time::timeout;

const EXIT_WAIT: Duration = Duration::from_secs(5);

/// **VALUE**: Verifies that terminate() actually stops a running child.
///
/// **WHY THIS MATTERS**: Closing the window must take the server down. If the signal never
/// reaches the child, every launch leaves a Streamlit process holding port 8501, and the
/// next launch talks to the stale one.
///
/// **BUG THIS CATCHES**: Would catch a terminate() that only drops channels, or a
/// supervising task that never reaps the child.
#[tokio::test]
async fn given_running_server_when_terminated_then_process_exits() {
    // GIVEN: A long-running child
    let command = ServerCommand::new("sleep", ["30"], "/");
    let mut process = spawn_server(&command, 8501).expect("sleep should spawn");
    assert!(process.pid().is_some(), "Spawned child should have a PID");
    assert!(!process.has_exited());

    // WHEN: Terminating
    let requested = process.terminate();

    // THEN: The request is issued and the child exits (killed by signal)
    assert!(requested, "First terminate should issue a request");
    let exit = timeout(EXIT_WAIT, process.wait())
        .await
        .expect("child should exit after terminate")
        .expect("exit should be published");
    assert_eq!(exit.code, None, "sleep should be ended by a signal");
    assert!(process.has_exited());
}

/// **VALUE**: Verifies terminate() is idempotent.
#[tokio::test]
async fn given_terminated_server_when_terminated_again_then_returns_false() {
    // GIVEN: A terminated child
    let command = ServerCommand::new("sleep", ["30"], "/");
    let mut process = spawn_server(&command, 8501).unwrap();
    assert!(process.terminate());

    // WHEN: Terminating again
    let second = process.terminate();

    // THEN: No second request
    assert!(!second);
    timeout(EXIT_WAIT, process.wait()).await.unwrap();
}

/// **VALUE**: Verifies that dropping the handle kills the child.
///
/// **WHY THIS MATTERS**: ServerProcess lifetime is tied to the window. If a handle is dropped
/// without an explicit shutdown (e.g. a panic unwinds the supervisor), the child must not
/// be orphaned.
#[tokio::test]
async fn given_server_handle_when_dropped_then_child_is_killed() {
    // GIVEN: A running child whose PID we remember
    let command = ServerCommand::new("sleep", ["30"], "/");
    let process = spawn_server(&command, 8501).unwrap();
    let pid = process.pid().unwrap();

    // WHEN: Dropping the handle
    drop(process);

    // THEN: The process disappears
    let gone = timeout(EXIT_WAIT, async {
        loop {
            if !process_alive(pid) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await;
    assert!(gone.is_ok(), "Child {pid} should be killed when its handle drops");
}

/// **VALUE**: Verifies a nonzero exit is observed and reported, not escalated.
#[tokio::test]
async fn given_failing_server_when_it_exits_then_exit_code_is_published() {
    // GIVEN: A child that fails immediately
    let command = ServerCommand::new("sh", ["-c", "echo boom >&2; exit 3"], "/");
    let mut process = spawn_server(&command, 8501).unwrap();

    // WHEN: Waiting for it
    let exit = timeout(EXIT_WAIT, process.wait()).await.unwrap().unwrap();

    // THEN: Exit code 3 and terminate is a no-op afterwards
    assert_eq!(exit.code, Some(3));
    assert!(!exit.success());
    assert!(!process.terminate(), "Nothing left to terminate");
}

/// **VALUE**: Verifies the child runs in the configured working directory.
///
/// **WHY THIS MATTERS**: `streamlit run main.py` resolves the script against the working
/// directory; the launcher's own cwd is arbitrary when started from a desktop shortcut.
#[tokio::test]
async fn given_working_directory_when_spawned_then_child_runs_there() {
    // GIVEN: A temp directory containing a marker file, and a child that requires it
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("main.py"), "").unwrap();
    let command = ServerCommand::new("sh", ["-c", "test -f main.py"], dir.path());

    // WHEN: Running it
    let mut process = spawn_server(&command, 8501).unwrap();
    let exit = timeout(EXIT_WAIT, process.wait()).await.unwrap().unwrap();

    // THEN: The marker was found, and the handle reports the same exit
    assert!(exit.success(), "main.py should be visible from the child's cwd");
    assert_eq!(process.exit(), Some(exit));
    assert!(process.has_exited());
}

fn process_alive(pid: u32) -> bool {
    use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System};

    let mut sys = System::new();
    let target = Pid::from_u32(pid);
    sys.refresh_processes(ProcessesToUpdate::Some(&[target]), true);
    sys.process(target)
        .is_some_and(|p| p.status() != ProcessStatus::Zombie)
}
