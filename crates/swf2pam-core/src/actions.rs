//! Optional per-frame stop and command description.
//!
//! The file is a JSON object keyed by sprite name (`"main"` for the top-level
//! timeline), each value mapping a 0-based frame number to a list of
//! `{ "action": "..." }` records.

use crate::error::{PamError, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::warn;

/// Name the top-level timeline is listed under.
pub const MAIN_TIMELINE: &str = "main";

/// A command attached to a frame, e.g. from `fscommand("sound", "hit")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaCommand {
    pub command: String,
    pub param: String,
}

#[derive(Debug, Deserialize)]
struct ActionRecord {
    action: String,
}

#[derive(Debug, Default, Clone)]
struct SpriteActions {
    stops: HashSet<u32>,
    commands: HashMap<u32, Vec<PaCommand>>,
}

#[derive(Debug, Default, Clone)]
pub struct ActionTable {
    sprites: HashMap<String, SpriteActions>,
}

impl ActionTable {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: BTreeMap<String, BTreeMap<String, Vec<ActionRecord>>> = serde_json::from_str(s)?;
        let mut sprites = HashMap::new();
        for (sprite, frames) in raw {
            let mut entry = SpriteActions::default();
            for (frame_key, records) in frames {
                let frame: u32 = frame_key.trim().parse().map_err(|_| {
                    PamError::InvalidData(format!(
                        "actions for `{sprite}` use frame key `{frame_key}`, expected a frame number"
                    ))
                })?;
                let mut commands = Vec::new();
                for record in &records {
                    match parse_action(&record.action) {
                        Some(Action::Stop) => {
                            entry.stops.insert(frame);
                        }
                        Some(Action::Command(cmd)) => commands.push(cmd),
                        None => {}
                    }
                }
                if !commands.is_empty() {
                    entry.commands.insert(frame, commands);
                }
            }
            sprites.insert(sprite, entry);
        }
        Ok(Self { sprites })
    }

    /// Load the table, or `Ok(None)` with a warning when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            warn!(
                path = %path.display(),
                "actions file not found; stop frames will be inferred from animation labels"
            );
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text).map(Some)
    }

    pub fn is_stop(&self, sprite: &str, frame: u32) -> bool {
        self.sprites
            .get(sprite)
            .is_some_and(|s| s.stops.contains(&frame))
    }

    pub fn commands(&self, sprite: &str, frame: u32) -> &[PaCommand] {
        self.sprites
            .get(sprite)
            .and_then(|s| s.commands.get(&frame))
            .map_or(&[], Vec::as_slice)
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }
}

enum Action {
    Stop,
    Command(PaCommand),
}

fn parse_action(action: &str) -> Option<Action> {
    if action.eq_ignore_ascii_case("stop();") {
        return Some(Action::Stop);
    }
    let prefix = action.get(..9)?;
    if !prefix.eq_ignore_ascii_case("fscommand") {
        return None;
    }
    let start = action.find('(')? + 1;
    let end = action.rfind(')')?;
    let args = action.get(start..end)?;

    let mut parts = args.split(',').map(|a| a.trim().trim_matches('"'));
    let command = parts.next()?.to_string();
    let param = parts.collect::<Vec<_>>().join(",");
    Some(Action::Command(PaCommand { command, param }))
}
