use crate::errors::GhdashError;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
    fn sleep_until(&self, deadline: SystemTime) -> Result<(), GhdashError>;
}

pub trait ProcessRunner: Send + Sync {
    fn spawn(&self, request: ProcessRequest) -> Result<u64, GhdashError>;
    fn wait(&self, handle: u64) -> Result<ProcessOutput, GhdashError>;
    fn kill(&self, handle: u64) -> Result<(), GhdashError>;

    fn run(&self, request: ProcessRequest) -> Result<ProcessOutput, GhdashError> {
        let handle = self.spawn(request)?;
        self.wait(handle)
    }
}

pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> Result<String, GhdashError>;
    fn write_string(&self, path: &Path, contents: &str) -> Result<(), GhdashError>;
    fn exists(&self, path: &Path) -> bool;
}

pub trait Terminal: Send + Sync {
    fn stdin_is_tty(&self) -> bool;
    fn write_line(&self, line: &str) -> Result<(), GhdashError>;
    fn draw(&self, frame: &str) -> Result<(), GhdashError>;
}

pub struct ProductionClock;

impl Clock for ProductionClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn sleep_until(&self, deadline: SystemTime) -> Result<(), GhdashError> {
        let now = SystemTime::now();
        if let Ok(duration) = deadline.duration_since(now) {
            std::thread::sleep(duration);
        }
        Ok(())
    }
}

pub struct ProductionFileSystem;

impl FileSystem for ProductionFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, GhdashError> {
        std::fs::read_to_string(path).map_err(|e| GhdashError::Io(e.to_string()))
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<(), GhdashError> {
        std::fs::write(path, contents).map_err(|e| GhdashError::Io(e.to_string()))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[derive(Default)]
struct ProcessState {
    next_handle: u64,
    children: HashMap<u64, std::process::Child>,
    killed: HashSet<u64>,
}

pub struct ProductionProcessRunner {
    state: Mutex<ProcessState>,
}

impl ProductionProcessRunner {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ProcessState::default()),
        }
    }
}

impl Default for ProductionProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner for ProductionProcessRunner {
    fn spawn(&self, request: ProcessRequest) -> Result<u64, GhdashError> {
        let mut cmd = std::process::Command::new(&request.program);
        cmd.args(&request.args);
        if let Some(cwd) = &request.cwd {
            cmd.current_dir(cwd);
        }
        cmd.stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());

        let child = cmd
            .spawn()
            .map_err(|e| GhdashError::Process(e.to_string()))?;
        let mut state = self.state.lock().expect("process lock poisoned");
        let handle = state.next_handle;
        state.next_handle += 1;
        state.children.insert(handle, child);
        Ok(handle)
    }

    fn wait(&self, handle: u64) -> Result<ProcessOutput, GhdashError> {
        let child = {
            let mut state = self.state.lock().expect("process lock poisoned");
            if state.killed.remove(&handle) {
                return Err(GhdashError::Timeout(
                    "process killed at deadline".to_string(),
                ));
            }
            state.children.remove(&handle)
        };
        let child =
            child.ok_or_else(|| GhdashError::Process(format!("unknown handle {handle}")))?;
        let output = child
            .wait_with_output()
            .map_err(|e| GhdashError::Process(e.to_string()))?;
        Ok(ProcessOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn kill(&self, handle: u64) -> Result<(), GhdashError> {
        let mut child = {
            let mut state = self.state.lock().expect("process lock poisoned");
            state.children.remove(&handle)
        }
        .ok_or_else(|| GhdashError::Process(format!("unknown handle {handle}")))?;

        child
            .kill()
            .map_err(|e| GhdashError::Process(e.to_string()))?;
        // Reap; an unreaped child lingers as a zombie until process exit.
        let _ = child.wait();
        let mut state = self.state.lock().expect("process lock poisoned");
        state.killed.insert(handle);
        Ok(())
    }
}

pub struct ProductionTerminal;

impl Terminal for ProductionTerminal {
    fn stdin_is_tty(&self) -> bool {
        std::io::IsTerminal::is_terminal(&std::io::stdin())
    }

    fn write_line(&self, line: &str) -> Result<(), GhdashError> {
        use std::io::Write;
        let mut out = std::io::stdout();
        writeln!(out, "{line}").map_err(|e| GhdashError::Io(e.to_string()))
    }

    fn draw(&self, frame: &str) -> Result<(), GhdashError> {
        self.write_line(frame)
    }
}

pub struct DashRuntime {
    pub clock: Arc<dyn Clock>,
    pub file_system: Arc<dyn FileSystem>,
    pub process_runner: Arc<dyn ProcessRunner>,
    pub terminal: Arc<dyn Terminal>,
}

impl DashRuntime {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(ProductionClock),
            file_system: Arc::new(ProductionFileSystem),
            process_runner: Arc::new(ProductionProcessRunner::new()),
            terminal: Arc::new(ProductionTerminal),
        }
    }
}

impl Default for DashRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct FakeClock {
    now: Arc<Mutex<SystemTime>>,
    sleeps: Arc<Mutex<Vec<SystemTime>>>,
}

impl FakeClock {
    pub fn new(now: SystemTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn sleeps(&self) -> Vec<SystemTime> {
        self.sleeps.lock().expect("sleep lock").clone()
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(SystemTime::UNIX_EPOCH)
    }
}

impl Clock for FakeClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().expect("clock lock")
    }

    fn sleep_until(&self, deadline: SystemTime) -> Result<(), GhdashError> {
        self.sleeps.lock().expect("sleep lock").push(deadline);
        *self.now.lock().expect("clock lock") = deadline;
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct FakeFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
}

impl FakeFileSystem {
    pub fn with_file(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        let fs = Self::default();
        fs.files
            .lock()
            .expect("files lock")
            .insert(path.into(), contents.into());
        fs
    }
}

impl FileSystem for FakeFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, GhdashError> {
        self.files
            .lock()
            .expect("files lock")
            .get(path)
            .cloned()
            .ok_or_else(|| GhdashError::Io(format!("missing file {}", path.display())))
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<(), GhdashError> {
        self.files
            .lock()
            .expect("files lock")
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().expect("files lock").contains_key(path)
    }
}

#[derive(Default, Clone)]
pub struct FakeTerminal {
    pub is_tty: bool,
    writes: Arc<Mutex<Vec<String>>>,
    draws: Arc<Mutex<Vec<String>>>,
}

impl FakeTerminal {
    pub fn new(is_tty: bool) -> Self {
        Self {
            is_tty,
            ..Self::default()
        }
    }

    pub fn written_lines(&self) -> Vec<String> {
        self.writes.lock().expect("writes lock").clone()
    }

    pub fn drawn_frames(&self) -> Vec<String> {
        self.draws.lock().expect("draw lock").clone()
    }
}

impl Terminal for FakeTerminal {
    fn stdin_is_tty(&self) -> bool {
        self.is_tty
    }

    fn write_line(&self, line: &str) -> Result<(), GhdashError> {
        self.writes
            .lock()
            .expect("writes lock")
            .push(line.to_string());
        Ok(())
    }

    fn draw(&self, frame: &str) -> Result<(), GhdashError> {
        self.draws
            .lock()
            .expect("draw lock")
            .push(frame.to_string());
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct FakeProcessRunner {
    responses: Arc<Mutex<Vec<Result<ProcessOutput, GhdashError>>>>,
    keyed: Arc<Mutex<Vec<(String, ProcessOutput)>>>,
    assigned: Arc<Mutex<HashMap<u64, ProcessOutput>>>,
    spawned: Arc<Mutex<Vec<ProcessRequest>>>,
    kills: Arc<Mutex<Vec<u64>>>,
    next_handle: Arc<Mutex<u64>>,
}

impl FakeProcessRunner {
    pub fn push_response(&self, output: Result<ProcessOutput, GhdashError>) {
        self.responses.lock().expect("responses lock").push(output);
    }

    /// Deterministic response for any request whose args contain `needle`.
    /// Concurrent callers racing for FIFO responses get the right payload.
    pub fn push_output_for(&self, needle: impl Into<String>, output: ProcessOutput) {
        self.keyed
            .lock()
            .expect("keyed lock")
            .push((needle.into(), output));
    }

    pub fn spawned(&self) -> Vec<ProcessRequest> {
        self.spawned.lock().expect("spawned lock").clone()
    }

    pub fn kills(&self) -> Vec<u64> {
        self.kills.lock().expect("kills lock").clone()
    }
}

impl ProcessRunner for FakeProcessRunner {
    fn spawn(&self, request: ProcessRequest) -> Result<u64, GhdashError> {
        let handle = {
            let mut next = self.next_handle.lock().expect("next lock");
            let handle = *next;
            *next += 1;
            handle
        };
        let matched = {
            let mut keyed = self.keyed.lock().expect("keyed lock");
            keyed
                .iter()
                .position(|(needle, _)| request.args.iter().any(|arg| arg.contains(needle)))
                .map(|idx| keyed.remove(idx).1)
        };
        if let Some(output) = matched {
            self.assigned
                .lock()
                .expect("assigned lock")
                .insert(handle, output);
        }
        self.spawned.lock().expect("spawned lock").push(request);
        Ok(handle)
    }

    /// Mirrors the production runner: delivers a queued response when one
    /// exists, reports a deadline kill once the watchdog fires, and only
    /// errors out when neither happens within the poll window.
    fn wait(&self, handle: u64) -> Result<ProcessOutput, GhdashError> {
        let poll_deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            if let Some(output) = self.assigned.lock().expect("assigned lock").remove(&handle) {
                return Ok(output);
            }
            {
                let mut responses = self.responses.lock().expect("responses lock");
                if !responses.is_empty() {
                    return responses.remove(0);
                }
            }
            if self.kills.lock().expect("kills lock").contains(&handle) {
                return Err(GhdashError::Timeout(
                    "process killed at deadline".to_string(),
                ));
            }
            if std::time::Instant::now() >= poll_deadline {
                return Err(GhdashError::Process("no fake response queued".to_string()));
            }
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
    }

    fn kill(&self, handle: u64) -> Result<(), GhdashError> {
        self.kills.lock().expect("kills lock").push(handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        FakeProcessRunner, ProcessRequest, ProcessRunner, ProductionProcessRunner,
    };
    use crate::errors::GhdashError;

    fn sleep_request(seconds: &str) -> ProcessRequest {
        ProcessRequest {
            program: "sleep".to_string(),
            args: vec![seconds.to_string()],
            cwd: None,
        }
    }

    #[test]
    fn killed_child_is_reaped_and_wait_reports_the_deadline_kill() {
        let runner = ProductionProcessRunner::new();
        let handle = runner.spawn(sleep_request("30")).expect("spawn");

        runner.kill(handle).expect("kill");

        let err = runner.wait(handle).expect_err("killed");
        match err {
            GhdashError::Timeout(message) => assert!(message.contains("killed")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fake_wait_reports_a_deadline_kill_when_no_response_is_queued() {
        let runner = FakeProcessRunner::default();
        let handle = runner.spawn(sleep_request("30")).expect("spawn");

        runner.kill(handle).expect("kill");

        let err = runner.wait(handle).expect_err("killed");
        assert!(matches!(err, GhdashError::Timeout(_)));
    }
}
