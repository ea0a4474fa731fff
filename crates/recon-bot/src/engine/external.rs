use super::{Analysis, EngineError, PrincipalLine, Score, ScoringEngine, SearchLimit};
use recon_core::model::board::Board;
use recon_core::model::chess_move::Move;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{Level, event};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalOptions {
    pub command: Option<String>,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    /// Per-query limit in milliseconds when the search limit carries none.
    pub timeout_ms: Option<u64>,
}

/// Scores positions by running a configured program once per query.
///
/// The program receives `{"fen", "depth", "multipv"}` as one JSON line on stdin
/// and must print `{"lines": [{"pv": ["e2e4", ...], "cp": 31}, ...]}` (or `"mate"`
/// instead of `"cp"`) on stdout.
pub struct ExternalEngine {
    name: String,
    options: ExternalOptions,
}

impl ExternalEngine {
    pub fn new(name: impl Into<String>, options: ExternalOptions) -> Self {
        let name = name.into();
        if options.command.is_none() {
            event!(
                target: "recon_bot::engine",
                Level::WARN,
                engine = %name,
                "no external command configured; every query will fail"
            );
        }
        Self { name, options }
    }

    fn invoke(
        &self,
        request: &EngineRequest,
        timeout: Option<Duration>,
    ) -> Result<EngineResponse, EngineError> {
        let command = match &self.options.command {
            Some(cmd) if !cmd.is_empty() => cmd,
            _ => return Err(EngineError::NoCommand),
        };

        let mut cmd = Command::new(command);
        if !self.options.args.is_empty() {
            cmd.args(&self.options.args);
        }
        if let Some(dir) = &self.options.working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let mut child = cmd
            .spawn()
            .map_err(|err| EngineError::Spawn(err.to_string()))?;
        let response = exchange(&mut child, request, timeout);
        if response.is_err() {
            reap(&mut child, &self.name);
        }
        response
    }

    fn default_timeout(&self) -> Option<Duration> {
        self.options.timeout_ms.map(Duration::from_millis)
    }
}

/// Sends the request and collects the answer. The caller reaps the child on error.
fn exchange(
    child: &mut Child,
    request: &EngineRequest,
    timeout: Option<Duration>,
) -> Result<EngineResponse, EngineError> {
    {
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Io("stdin".into()))?;
        serde_json::to_writer(&mut stdin, request)
            .map_err(|err| EngineError::Protocol(err.to_string()))?;
        stdin
            .write_all(b"\n")
            .map_err(|err| EngineError::Io(err.to_string()))?;
    }

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| EngineError::Io("stdout".into()))?;
    let reader = thread::spawn(move || {
        let mut buffer = Vec::new();
        stdout.read_to_end(&mut buffer).map(|_| buffer)
    });

    wait(child, timeout)?;

    let stdout = reader
        .join()
        .map_err(|_| EngineError::Io("stdout reader panicked".into()))?
        .map_err(|err| EngineError::Io(err.to_string()))?;
    serde_json::from_slice(&stdout).map_err(|err| EngineError::Protocol(err.to_string()))
}

/// Polls the child until it exits or `timeout` passes.
fn wait(child: &mut Child, timeout: Option<Duration>) -> Result<(), EngineError> {
    let start = Instant::now();
    loop {
        let status = child
            .try_wait()
            .map_err(|err| EngineError::Io(err.to_string()))?;
        if let Some(status) = status {
            if !status.success() {
                return Err(EngineError::Status(format!("exit status {status}")));
            }
            return Ok(());
        }
        if let Some(limit) = timeout
            && start.elapsed() >= limit
        {
            return Err(EngineError::Timeout(limit));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kills and waits a child that may still be running.
fn reap(child: &mut Child, engine: &str) {
    if let Ok(Some(_)) = child.try_wait() {
        return;
    }
    if let Err(err) = child.kill() {
        event!(
            target: "recon_bot::engine",
            Level::WARN,
            engine = %engine,
            pid = child.id(),
            error = %err,
            "failed to kill engine process"
        );
    }
    if let Err(err) = child.wait() {
        event!(
            target: "recon_bot::engine",
            Level::WARN,
            engine = %engine,
            pid = child.id(),
            error = %err,
            "failed to wait for engine process"
        );
    }
}

impl ScoringEngine for ExternalEngine {
    fn analyse(&self, board: &Board, limit: &SearchLimit) -> Result<Analysis, EngineError> {
        let request = EngineRequest {
            fen: board.fen(),
            depth: limit.depth,
            multipv: limit.multipv,
        };
        let timeout = limit.timeout.or_else(|| self.default_timeout());
        let response = self.invoke(&request, timeout).inspect_err(|err| {
            event!(
                target: "recon_bot::engine",
                Level::DEBUG,
                engine = %self.name,
                error = %err,
                "external analysis failed"
            );
        })?;
        let lines = response
            .lines
            .into_iter()
            .take(limit.multipv.max(1))
            .map(ResponseLine::into_line)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Analysis { lines })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Serialize)]
struct EngineRequest {
    fen: String,
    depth: u32,
    multipv: usize,
}

#[derive(Deserialize)]
struct EngineResponse {
    #[serde(default)]
    lines: Vec<ResponseLine>,
}

#[derive(Deserialize)]
struct ResponseLine {
    pv: Vec<String>,
    cp: Option<i32>,
    mate: Option<i32>,
}

impl ResponseLine {
    fn into_line(self) -> Result<PrincipalLine, EngineError> {
        let score = match (self.cp, self.mate) {
            (_, Some(mate)) => Score::Mate(mate),
            (Some(cp), None) => Score::Centipawns(cp),
            (None, None) => return Err(EngineError::Protocol("line without score".into())),
        };
        let pv = self
            .pv
            .iter()
            .map(|uci| {
                uci.parse::<Move>()
                    .map_err(|err| EngineError::Protocol(err.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PrincipalLine { pv, score })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_command_is_an_error() {
        let engine = ExternalEngine::new("none", ExternalOptions::default());
        assert_eq!(
            engine.analyse(&Board::starting(), &SearchLimit::default()),
            Err(EngineError::NoCommand)
        );
    }

    #[test]
    fn unknown_binary_fails_to_spawn() {
        let engine = ExternalEngine::new(
            "ghost",
            ExternalOptions {
                command: Some("__recon_bot_missing_engine__".into()),
                ..ExternalOptions::default()
            },
        );
        assert!(matches!(
            engine.analyse(&Board::starting(), &SearchLimit::default()),
            Err(EngineError::Spawn(_))
        ));
    }

    #[cfg(unix)]
    fn shell_engine(script: &str, timeout_ms: u64) -> ExternalEngine {
        ExternalEngine::new(
            "shell",
            ExternalOptions {
                command: Some("sh".into()),
                args: vec!["-c".into(), script.into()],
                timeout_ms: Some(timeout_ms),
                ..ExternalOptions::default()
            },
        )
    }

    #[cfg(unix)]
    #[test]
    fn reap_leaves_no_running_child() {
        let mut child = Command::new("sleep")
            .arg("30")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()
            .unwrap();
        reap(&mut child, "sleeper");
        assert!(child.try_wait().unwrap().is_some());
    }

    #[cfg(unix)]
    #[test]
    fn reap_is_quiet_on_an_exited_child() {
        let mut child = Command::new("true").spawn().unwrap();
        child.wait().unwrap();
        reap(&mut child, "done");
        assert!(child.try_wait().unwrap().unwrap().success());
    }

    #[cfg(unix)]
    #[test]
    fn silent_engine_times_out() {
        let engine = shell_engine("exec sleep 30", 50);
        let started = Instant::now();
        assert!(matches!(
            engine.analyse(&Board::starting(), &SearchLimit::default()),
            Err(EngineError::Timeout(_))
        ));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn engine_closing_stdin_early_is_an_error() {
        let engine = shell_engine("exec 0<&-; exec sleep 30", 200);
        let started = Instant::now();
        assert!(
            engine
                .analyse(&Board::starting(), &SearchLimit::default())
                .is_err()
        );
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn garbage_output_is_a_protocol_error() {
        let engine = shell_engine("cat >/dev/null; echo not-json", 5_000);
        assert!(matches!(
            engine.analyse(&Board::starting(), &SearchLimit::default()),
            Err(EngineError::Protocol(_))
        ));
    }

    #[test]
    fn response_lines_parse_scores_and_moves() {
        let response: EngineResponse = serde_json::from_str(
            r#"{"lines":[{"pv":["e2e4","e7e5"],"cp":35},{"pv":["d1h5"],"mate":2}]}"#,
        )
        .unwrap();
        let lines: Vec<_> = response
            .lines
            .into_iter()
            .map(|line| line.into_line().unwrap())
            .collect();
        assert_eq!(lines[0].first_move(), Some("e2e4".parse().unwrap()));
        assert_eq!(lines[0].score, Score::Centipawns(35));
        assert_eq!(lines[1].score, Score::Mate(2));
    }

    #[test]
    fn malformed_move_is_a_protocol_error() {
        let line = ResponseLine {
            pv: vec!["zz99".into()],
            cp: Some(0),
            mate: None,
        };
        assert!(matches!(line.into_line(), Err(EngineError::Protocol(_))));
    }
}
