//! Scripted replay of workspace events.
//!
//! A script is a JSON array of steps tagged by `op`. Panels can be named by
//! their live id or by `"#<n>"`, the nth panel created during the replay
//! (`#0` is the panel the session starts with).

use anyhow::{anyhow, bail, Context, Result};
use lovpen_core::selection::{ClickTarget, PanelKey};
use lovpen_core::settings::{GlobalSettingsPatch, PlatformSettings};
use lovpen_core::{Interaction, PanelId, Workspace};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// One scripted event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    AddPanel {
        platform: String,
    },
    RemovePanel {
        panel: String,
    },
    RemoveSelected,
    Click {
        panel: String,
        #[serde(default)]
        modifier: bool,
        #[serde(default)]
        target: ClickTarget,
    },
    Key {
        panel: String,
        key: PanelKey,
        #[serde(default)]
        modifier: bool,
    },
    Background,
    Escape,
    Move {
        from: usize,
        to: usize,
    },
    DragEnd {
        active: String,
        #[serde(default)]
        over: Option<String>,
    },
    ReturnToGlobal,
    Global {
        settings: GlobalSettingsPatch,
    },
    Platform {
        platform: String,
        settings: PlatformSettings,
    },
    Broadcast {
        settings: PlatformSettings,
    },
    Content {
        text: String,
    },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddPanel { .. } => "add_panel",
            Self::RemovePanel { .. } => "remove_panel",
            Self::RemoveSelected => "remove_selected",
            Self::Click { .. } => "click",
            Self::Key { .. } => "key",
            Self::Background => "background",
            Self::Escape => "escape",
            Self::Move { .. } => "move",
            Self::DragEnd { .. } => "drag_end",
            Self::ReturnToGlobal => "return_to_global",
            Self::Global { .. } => "global",
            Self::Platform { .. } => "platform",
            Self::Broadcast { .. } => "broadcast",
            Self::Content { .. } => "content",
        }
    }
}

/// Parse a script from JSON text.
pub fn parse_script(raw: &str) -> Result<Vec<Step>> {
    serde_json::from_str(raw).context("script is not a JSON array of steps")
}

/// Read and parse a script file.
pub fn load_script(path: &Path) -> Result<Vec<Step>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    parse_script(&raw).with_context(|| format!("invalid script {}", path.display()))
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub op: &'static str,
    pub ok: bool,
    pub detail: String,
}

/// Drives a [`Workspace`] through scripted steps.
pub struct Replay {
    workspace: Workspace,
    created: Vec<PanelId>,
}

impl Replay {
    pub fn new(workspace: Workspace) -> Self {
        let created = workspace.panels().ids();
        Self { workspace, created }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Resolve a `#<n>` reference or pass a literal id through.
    pub fn resolve_panel(&self, reference: &str) -> Result<PanelId> {
        let Some(raw_index) = reference.strip_prefix('#') else {
            return Ok(PanelId::from(reference));
        };
        let index: usize = raw_index
            .parse()
            .with_context(|| format!("bad panel reference '{}'", reference))?;
        self.created
            .get(index)
            .cloned()
            .ok_or_else(|| anyhow!("panel reference '{}' was never created", reference))
    }

    fn changed(changed: bool) -> String {
        if changed {
            "changed".to_string()
        } else {
            "no change".to_string()
        }
    }

    /// Apply one step.
    ///
    /// Single-target failures leave the workspace untouched; a broadcast can
    /// fail after writing some platforms.
    pub fn apply(&mut self, step: &Step) -> Result<String> {
        let detail = match step {
            Step::AddPanel { platform } => {
                let id = self.workspace.add_panel(platform)?;
                self.created.push(id.clone());
                format!("added {}", id)
            }
            Step::RemovePanel { panel } => {
                let id = self.resolve_panel(panel)?;
                self.workspace.remove_panel(&id)?;
                format!("removed {}", id)
            }
            Step::RemoveSelected => {
                let report = self.workspace.remove_selected_panels();
                if report.removed.is_empty() && !report.failed.is_empty() {
                    bail!("no selected panel could be removed");
                }
                format!(
                    "removed {}, kept {}",
                    report.removed.len(),
                    report.failed.len()
                )
            }
            Step::Click {
                panel,
                modifier,
                target,
            } => {
                let interaction = Interaction::PanelClick {
                    panel_id: self.resolve_panel(panel)?,
                    modifier: *modifier,
                    target: *target,
                };
                Self::changed(self.workspace.handle_interaction(&interaction))
            }
            Step::Key {
                panel,
                key,
                modifier,
            } => {
                let interaction = Interaction::PanelKey {
                    panel_id: self.resolve_panel(panel)?,
                    key: *key,
                    modifier: *modifier,
                };
                Self::changed(self.workspace.handle_interaction(&interaction))
            }
            Step::Background => Self::changed(self.workspace.on_background_interact()),
            Step::Escape => Self::changed(self.workspace.on_escape()),
            Step::Move { from, to } => {
                self.workspace.move_panel(*from, *to)?;
                format!("moved {} -> {}", from, to)
            }
            Step::DragEnd { active, over } => {
                let active = self.resolve_panel(active)?;
                let over = over
                    .as_deref()
                    .map(|reference| self.resolve_panel(reference))
                    .transpose()?;
                self.workspace.drag_end(&active, over.as_ref())?;
                "dropped".to_string()
            }
            Step::ReturnToGlobal => Self::changed(self.workspace.return_to_global()),
            Step::Global { settings } => {
                Self::changed(self.workspace.update_global_settings(settings))
            }
            Step::Platform { platform, settings } => {
                Self::changed(self.workspace.update_platform_settings(platform, settings)?)
            }
            Step::Broadcast { settings } => {
                let report = self.workspace.edit_platform_settings(settings)?;
                if !report.is_complete() {
                    let failed: Vec<String> = report
                        .failed
                        .iter()
                        .map(|(platform, err)| format!("{}: {}", platform, err))
                        .collect();
                    bail!(
                        "applied to {} platform(s), failed: {}",
                        report.applied.len(),
                        failed.join("; ")
                    );
                }
                format!("applied to {}", report.applied.join(", "))
            }
            Step::Content { text } => {
                self.workspace.set_generated_content(text.as_str());
                format!("{} characters", lovpen_core::text::character_count(text))
            }
        };
        Ok(detail)
    }

    /// Apply every step, continuing past failures.
    pub fn run(&mut self, steps: &[Step]) -> Vec<StepReport> {
        steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let (ok, detail) = match self.apply(step) {
                    Ok(detail) => (true, detail),
                    Err(err) => (false, format!("{:#}", err)),
                };
                debug!(index, op = step.name(), ok, "replayed step");
                StepReport {
                    index,
                    op: step.name(),
                    ok,
                    detail,
                }
            })
            .collect()
    }
}
