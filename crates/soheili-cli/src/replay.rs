//! Event script replay
//!
//! A script is a JSON array of timed events:
//!
//! ```json
//! [
//!   { "at_ms": 0,    "event": { "type": "loaded" } },
//!   { "at_ms": 600,  "event": { "type": "scroll", "offset": 950 } },
//!   { "at_ms": 1200, "event": { "type": "gallery_click", "index": 2 } }
//! ]
//! ```
//!
//! Each event is dispatched at its offset from the start of the replay and
//! followed by one JSON render snapshot on the output. A submission settles
//! in the background as soon as its backend answers, between steps.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use soheili_core::{render, Page, PageConfig, PageEvent, RenderSnapshot};

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// Milliseconds after replay start
    #[serde(default)]
    pub at_ms: u64,
    pub event: PageEvent,
}

#[derive(Debug, Serialize)]
struct Frame {
    step: usize,
    at_ms: u64,
    event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    snapshot: RenderSnapshot,
}

pub fn load_script(path: &Path) -> Result<Vec<Step>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    parse_script(&content).with_context(|| format!("invalid script {}", path.display()))
}

pub fn parse_script(content: &str) -> Result<Vec<Step>> {
    let steps: Vec<Step> = serde_json::from_str(content)?;
    if let Some(pos) = steps.windows(2).position(|w| w[1].at_ms < w[0].at_ms) {
        bail!(
            "step {} at {}ms comes before step {} at {}ms",
            pos + 1,
            steps[pos + 1].at_ms,
            pos,
            steps[pos].at_ms
        );
    }
    Ok(steps)
}

/// Replay `steps` against a fresh page, writing one snapshot line per step
pub async fn run<W: Write>(config: PageConfig, steps: Vec<Step>, out: &mut W, pretty: bool) -> Result<()> {
    let mut page = Page::from_config(config)?;
    let start = Instant::now();
    let total = steps.len();
    info!(steps = total, "replaying script");

    for (i, step) in steps.into_iter().enumerate() {
        let due = start + Duration::from_millis(step.at_ms);
        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(due) => break,
                Some(outcome) = page.submission_settled() => {
                    debug!(?outcome, "submission settled");
                }
            }
        }

        let event = format!("{:?}", step.event);
        // Page errors are soft: record them and keep going
        let error = match page.handle(step.event) {
            Ok(()) => None,
            Err(e) => {
                warn!(step = i, error = %e, "event rejected");
                Some(e.to_string())
            }
        };

        let frame = Frame {
            step: i,
            at_ms: step.at_ms,
            event,
            error,
            snapshot: render(&page),
        };
        if pretty {
            serde_json::to_writer_pretty(&mut *out, &frame)?;
        } else {
            serde_json::to_writer(&mut *out, &frame)?;
        }
        writeln!(out)?;
    }

    out.flush()?;
    if let Some(outcome) = page.submission_settled().await {
        debug!(?outcome, "submission settled after the last step");
    }
    info!(steps = total, "replay finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
[[sections]]
id = "home"
top = 0
height = 900

[[sections]]
id = "gallery"
top = 900
height = 900

[[gallery]]
src = "img/a.jpg"
title = "A"

[[gallery]]
src = "img/b.jpg"
title = "B"

[backend]
kind = "simulated"
delay_ms = 100
"#;

    fn frames(output: &[u8]) -> Vec<serde_json::Value> {
        String::from_utf8_lossy(output)
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_script_must_be_ordered() {
        let err = parse_script(
            r#"[
                {"at_ms": 100, "event": {"type": "loaded"}},
                {"at_ms": 50, "event": {"type": "hamburger_click"}}
            ]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("comes before"));
    }

    #[test]
    fn test_at_ms_defaults_to_zero() {
        let steps = parse_script(r#"[{"event": {"type": "hamburger_click"}}]"#).unwrap();
        assert_eq!(steps[0].at_ms, 0);
        assert_eq!(steps[0].event, PageEvent::HamburgerClick);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_emits_one_frame_per_step() {
        let config = PageConfig::from_toml_str(PAGE).unwrap();
        let steps = parse_script(
            r#"[
                {"at_ms": 0, "event": {"type": "hamburger_click"}},
                {"at_ms": 10, "event": {"type": "gallery_click", "index": 1}},
                {"at_ms": 20, "event": {"type": "lightbox_close"}},
                {"at_ms": 30, "event": {"type": "gallery_click", "index": 9}},
                {"at_ms": 40, "event": {"type": "scroll", "offset": 1000}}
            ]"#,
        )
        .unwrap();

        let mut out = Vec::new();
        run(config, steps, &mut out, false).await.unwrap();
        let frames = frames(&out);
        assert_eq!(frames.len(), 5);

        assert_eq!(frames[1]["snapshot"]["lightbox"]["title"], "B");
        // Menu still holds the lock after the lightbox closes
        assert_eq!(frames[2]["snapshot"]["body"]["overflow"], "hidden");
        assert!(frames[3]["error"]
            .as_str()
            .unwrap()
            .contains("out of range"));
        assert!(frames[2].get("error").is_none());
        assert_eq!(frames[4]["snapshot"]["nav"]["active_link"], "#gallery");
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_submission_shows_notification() {
        let config = PageConfig::from_toml_str(PAGE).unwrap();
        let steps = parse_script(
            r#"[
                {"event": {"type": "field_input", "name": "name", "value": "Sara"}},
                {"event": {"type": "field_input", "name": "phone", "value": "09123456789"}},
                {"event": {"type": "submit"}},
                {"at_ms": 200, "event": {"type": "scroll", "offset": 0}},
                {"at_ms": 6000, "event": {"type": "scroll", "offset": 0}}
            ]"#,
        )
        .unwrap();

        let mut out = Vec::new();
        run(config, steps, &mut out, false).await.unwrap();
        let frames = frames(&out);

        assert_eq!(frames[2]["snapshot"]["form"]["submit_disabled"], true);

        let notes = frames[3]["snapshot"]["notifications"].as_array().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0]["icon"], "check-circle");
        assert_eq!(frames[3]["snapshot"]["form"]["submit_disabled"], false);

        let notes = frames[4]["snapshot"]["notifications"].as_array().unwrap();
        assert!(notes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_keep_flowing_while_submission_pending() {
        let config = PageConfig::from_toml_str(&PAGE.replace("delay_ms = 100", "delay_ms = 1000"))
            .unwrap();
        let steps = parse_script(
            r#"[
                {"event": {"type": "field_input", "name": "name", "value": "Sara"}},
                {"event": {"type": "field_input", "name": "phone", "value": "09123456789"}},
                {"at_ms": 0, "event": {"type": "submit"}},
                {"at_ms": 10, "event": {"type": "hamburger_click"}},
                {"at_ms": 1100, "event": {"type": "hamburger_click"}}
            ]"#,
        )
        .unwrap();

        let started = Instant::now();
        let mut out = Vec::new();
        run(config, steps, &mut out, false).await.unwrap();
        let frames = frames(&out);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1100) && elapsed < Duration::from_millis(1200));

        let form = &frames[2]["snapshot"]["form"];
        assert_eq!(form["submit_disabled"], true);
        assert_eq!(form["submit_label"], soheili_core::constants::inquiry::PENDING_LABEL);

        // Handled on time, before the backend answered
        let pending = &frames[3]["snapshot"];
        assert_eq!(pending["nav"]["menu_active"], true);
        assert_eq!(pending["form"]["submit_disabled"], true);
        assert!(pending["notifications"].as_array().unwrap().is_empty());

        let settled = &frames[4]["snapshot"];
        assert_eq!(settled["form"]["submit_disabled"], false);
        assert_eq!(settled["notifications"].as_array().unwrap().len(), 1);
    }
}
