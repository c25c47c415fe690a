use std::{path::PathBuf, time::Duration};

use anyhow::{Context, bail};
use blockfall_engine::{GameSession, SessionConfig, SessionSnapshot};
use serde::Serialize;

use crate::{
    script::{self, ScriptStep},
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Script text, e.g. "+left wait:300 -left tap:rotate"
    #[arg(long, conflicts_with = "script_file")]
    script: Option<String>,
    /// File containing the script
    #[arg(long)]
    script_file: Option<PathBuf>,
    /// Seed for the piece sequence
    #[arg(long)]
    seed: Option<u64>,
    /// Gravity tick interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    gravity_ms: u64,
    /// Held-movement repeat interval in milliseconds
    #[arg(long, default_value_t = 100)]
    repeat_ms: u64,
    /// Clock step used to split waits into frames, in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    config: SessionConfig,
    steps: usize,
    elapsed_ms: u64,
    quit: bool,
    snapshot: SessionSnapshot,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        script,
        script_file,
        seed,
        gravity_ms,
        repeat_ms,
        frame_ms,
        output,
    } = arg;

    if *frame_ms == 0 {
        bail!("--frame-ms must be greater than zero");
    }
    let text = match (script, script_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => util::read_text_file("script", path)?,
        (None, None) => String::new(),
    };
    let steps = script::parse_script(&text).context("Failed to parse script")?;

    let config = SessionConfig {
        gravity_interval: Duration::from_millis(*gravity_ms),
        repeat_interval: Duration::from_millis(*repeat_ms),
        seed: *seed,
    };
    let mut session = GameSession::new(config).context("Invalid session configuration")?;
    tracing::info!(steps = steps.len(), ?seed, "simulation started");

    let elapsed = play_script(&mut session, &steps, Duration::from_millis(*frame_ms));

    let report = SimulationReport {
        config,
        steps: steps.len(),
        elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        quit: session.should_quit(),
        snapshot: session.snapshot(),
    };
    tracing::info!(
        score = report.snapshot.score,
        state = ?report.snapshot.state,
        "simulation finished"
    );
    Output::save_json(&report, output.clone())?;
    Ok(())
}

/// Feeds `steps` to the session, splitting waits into frames of `frame`.
///
/// Stops early once the session asks to quit. Returns the simulated time.
fn play_script(session: &mut GameSession, steps: &[ScriptStep], frame: Duration) -> Duration {
    let mut elapsed = Duration::ZERO;
    for step in steps {
        if session.should_quit() {
            break;
        }
        match *step {
            ScriptStep::Event(event) => session.process_event(event),
            ScriptStep::Wait(duration) => {
                let mut remaining = duration;
                while !remaining.is_zero() && !session.should_quit() {
                    let dt = remaining.min(frame);
                    session.advance(dt);
                    remaining -= dt;
                    elapsed += dt;
                }
            }
        }
    }
    elapsed
}

#[cfg(test)]
mod tests {
    use blockfall_engine::SessionState;

    use super::*;

    fn session() -> GameSession {
        GameSession::new(SessionConfig::default().with_seed(5)).unwrap()
    }

    #[test]
    fn test_wait_is_split_into_frames() {
        let mut session = session();
        let id = session.board().falling_piece_id().unwrap();
        let steps = script::parse_script("wait:2050").unwrap();
        let elapsed = play_script(&mut session, &steps, Duration::from_millis(16));
        assert_eq!(elapsed, Duration::from_millis(2050));
        assert_eq!(session.board().piece(id).unwrap().position().row(), 2);
    }

    #[test]
    fn test_quit_stops_script() {
        let mut session = session();
        let steps = script::parse_script("tap:quit wait:5000 tap:pause").unwrap();
        let elapsed = play_script(&mut session, &steps, Duration::from_millis(16));
        assert_eq!(elapsed, Duration::ZERO);
        assert!(session.should_quit());
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn test_report_serializes() {
        let mut session = session();
        let steps = script::parse_script("tap:pause gravity").unwrap();
        play_script(&mut session, &steps, Duration::from_millis(16));
        let report = SimulationReport {
            config: *session.config(),
            steps: steps.len(),
            elapsed_ms: 0,
            quit: false,
            snapshot: session.snapshot(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["snapshot"]["state"], "Paused");
        assert_eq!(value["config"]["seed"], 5);
    }
}
