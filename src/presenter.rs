//! Task and activity-log rendering
//!
//! Renders task snapshots as single lines and activity logs as an indented
//! tree. Finished activity branches are remembered in [`RenderedActivities`]
//! so repeated polls only reprint what can still change.

use std::collections::HashMap;
use std::io::Write;

use crate::task::{ActivityNode, ActivityStatus, TaskSnapshot, TaskStatus};

const INDENT: &str = "  ";

/// Activity IDs whose subtree has been fully printed
#[derive(Debug, Default)]
pub struct RenderedActivities {
    done: HashMap<String, bool>,
}

impl RenderedActivities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_rendered(&self, id: &str) -> bool {
        self.done.get(id).copied().unwrap_or(false)
    }

    pub fn mark(&mut self, id: &str) {
        self.done.insert(id.to_string(), true);
    }

    pub fn len(&self) -> usize {
        self.done.values().filter(|done| **done).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Writes task progress to an output sink
pub struct TaskPresenter<W: Write> {
    out: W,
}

impl<W: Write> TaskPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print one line describing the task's current state
    pub fn print_task_info(&mut self, task: &TaskSnapshot) {
        let title = if task.description.is_empty() {
            &task.name
        } else {
            &task.description
        };

        let mut line = format!("{}: {} ({})", task.id, title, task.state);
        if task.status() == TaskStatus::Failed {
            if let Some(error) = task.error_message.as_deref().filter(|e| !e.is_empty()) {
                line.push_str(&format!(" - {}", error));
            }
        }

        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            tracing::debug!("Failed to print task {}: {}", task.id, e);
        }
    }

    /// Print an activity entry and its children, skipping finished subtrees
    /// already recorded in `rendered`
    pub fn print_activity_element(
        &mut self,
        node: &ActivityNode,
        depth: usize,
        rendered: &mut RenderedActivities,
    ) {
        if let Err(e) = render_activity(&mut self.out, node, depth, rendered).and_then(|_| self.out.flush()) {
            tracing::debug!("Failed to print activity {}: {}", node.id, e);
        }
    }
}

fn status_marker(status: &ActivityStatus) -> &'static str {
    match status {
        ActivityStatus::Pending => "…",
        ActivityStatus::Running => "▶",
        ActivityStatus::Success => "✓",
        ActivityStatus::SuccessWithWarning => "⚠",
        ActivityStatus::Failed => "✗",
        ActivityStatus::Skipped => "-",
        ActivityStatus::Canceled => "⊘",
        ActivityStatus::Unknown(_) => "?",
    }
}

fn render_activity<W: Write>(
    out: &mut W,
    node: &ActivityNode,
    depth: usize,
    rendered: &mut RenderedActivities,
) -> std::io::Result<()> {
    if rendered.is_rendered(&node.id) {
        return Ok(());
    }

    let indent = INDENT.repeat(depth);
    writeln!(out, "{}{} {}", indent, status_marker(&node.status), node.name)?;

    for element in &node.log_elements {
        match element.occurred_at {
            Some(at) => writeln!(
                out,
                "{}{}{} {:<7} {}",
                indent,
                INDENT,
                at.format("%H:%M:%S"),
                element.category,
                element.message_text
            )?,
            None => writeln!(
                out,
                "{}{}{:<7} {}",
                indent, INDENT, element.category, element.message_text
            )?,
        }
    }

    for child in &node.children {
        render_activity(out, child, depth + 1, rendered)?;
    }

    if node.status.is_terminal() {
        rendered.mark(&node.id);
    }

    Ok(())
}
