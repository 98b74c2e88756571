//! Session: the board, the two dialogs, and text rendering.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;
use taskdesk_core::app::{Signals, Sweep};
use taskdesk_core::ports::UlidGenerator;
use taskdesk_core::{
    Action, Clock, FieldEdit, FieldOutcome, FormError, FormMode, FormPolicy, InMemoryTaskStore,
    NoticeKind, Priority, StoreOutcome, SubmitOutcome, Task, TaskBoard, TaskForm, TaskId,
    TaskStore,
};

use crate::command::{Command, HELP};

type Board<C> = TaskBoard<InMemoryTaskStore<UlidGenerator<C>>, C>;

/// What the REPL should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Continue(String),
    Quit,
}

/// JSON row for `list json`.
#[derive(Debug, Serialize)]
struct TaskRow<'a> {
    id: TaskId,
    title: &'a str,
    description: &'a str,
    deadline: DateTime<Utc>,
    priority: Priority,
    is_complete: bool,
    permitted_actions: Vec<Action>,
}

impl<'a> From<&'a Task> for TaskRow<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            id: task.id,
            title: &task.title,
            description: &task.description,
            deadline: task.deadline,
            priority: task.priority,
            is_complete: task.is_complete,
            permitted_actions: task.permitted_actions().to_vec(),
        }
    }
}

pub struct Session<C> {
    clock: C,
    board: Board<C>,
    create: TaskForm<C>,
    edit: TaskForm<C>,
    active: Option<FormMode>,
}

impl<C: Clock + Clone> Session<C> {
    pub fn new(clock: C, policy: FormPolicy) -> Self {
        let store = InMemoryTaskStore::with_clock(clock.clone());
        Self {
            board: TaskBoard::new(store, clock.clone(), &policy),
            create: TaskForm::create(clock.clone(), policy.clone()),
            edit: TaskForm::edit(clock.clone(), policy),
            active: None,
            clock,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.board.tasks()
    }

    pub fn execute(&mut self, command: Command) -> Step {
        let message = match command {
            Command::Quit => return Step::Quit,
            Command::Help => return Step::Continue(HELP.to_string()),
            Command::List { json: true } => return Step::Continue(self.tasks_json()),
            Command::List { json: false } => String::new(),
            Command::New => self.open(FormMode::Create, None),
            Command::Edit(title) => match self.board.store().find_by_title(&title).cloned() {
                Some(task) => self.open(FormMode::Edit, Some(task)),
                None => format!("no task titled '{title}'"),
            },
            Command::Title(title) => self.edit_field(FieldEdit::Title(title)),
            Command::Desc(description) => self.edit_field(FieldEdit::Description(description)),
            Command::Deadline(spec) => {
                self.edit_field(FieldEdit::Deadline(spec.resolve(self.clock.now())))
            }
            Command::Priority(priority) => self.edit_field(FieldEdit::Priority(priority)),
            Command::Submit => self.submit(),
            Command::Cancel => match self.active.take() {
                Some(mode) => {
                    self.form_mut(mode).cancel();
                    "cancelled".to_string()
                }
                None => "no form is open".to_string(),
            },
            Command::Toggle(title) => self.by_title(&title, |board, id| board.toggle_complete(id)),
            Command::Delete(title) => self.by_title(&title, |board, id| board.delete(id)),
        };

        let mut out = String::new();
        if !message.is_empty() {
            let _ = writeln!(out, "{message}");
        }
        out.push_str(&self.render());
        Step::Continue(out)
    }

    fn form(&self, mode: FormMode) -> &TaskForm<C> {
        match mode {
            FormMode::Create => &self.create,
            FormMode::Edit => &self.edit,
        }
    }

    fn form_mut(&mut self, mode: FormMode) -> &mut TaskForm<C> {
        match mode {
            FormMode::Create => &mut self.create,
            FormMode::Edit => &mut self.edit,
        }
    }

    fn open(&mut self, mode: FormMode, target: Option<Task>) -> String {
        if let Some(active) = self.active {
            return format!("finish the open {} form first (submit or cancel)", mode_name(active));
        }
        match self.form_mut(mode).open(target.as_ref()) {
            Ok(()) => {
                self.active = Some(mode);
                format!("{} form opened", mode_name(mode))
            }
            Err(err) => format!("error: {err}"),
        }
    }

    fn edit_field(&mut self, edit: FieldEdit) -> String {
        let Some(mode) = self.active else {
            return format!("error: {}", FormError::NotOpen);
        };
        match self.form_mut(mode).edit_field(edit) {
            Ok(FieldOutcome::Accepted) => String::new(),
            Ok(FieldOutcome::DeadlineRejected) => "deadline rejected".to_string(),
            Err(err) => format!("error: {err}"),
        }
    }

    fn submit(&mut self) -> String {
        let Some(mode) = self.active else {
            return format!("error: {}", FormError::NotOpen);
        };
        let form = match mode {
            FormMode::Create => &mut self.create,
            FormMode::Edit => &mut self.edit,
        };
        match form.submit(self.board.store_mut()) {
            Ok(SubmitOutcome::Committed(outcome)) => {
                self.active = None;
                match outcome {
                    StoreOutcome::Missing => "task no longer exists".to_string(),
                    StoreOutcome::Rejected(rejection) => format!("store refused: {rejection:?}"),
                    _ => String::new(),
                }
            }
            Ok(SubmitOutcome::Invalid { .. }) => "please fill in the highlighted fields".to_string(),
            Ok(SubmitOutcome::DuplicateTitle) => String::new(),
            Err(err) => format!("error: {err}"),
        }
    }

    fn by_title(
        &mut self,
        title: &str,
        apply: impl FnOnce(&mut Board<C>, TaskId) -> StoreOutcome,
    ) -> String {
        let Some(id) = self.board.store().find_by_title(title).map(|task| task.id) else {
            return format!("no task titled '{title}'");
        };
        apply(&mut self.board, id);
        String::new()
    }

    fn active_notices(&self) -> Vec<NoticeKind> {
        let mut notices = self.create.active_notices();
        notices.extend(self.edit.active_notices());
        notices.extend(self.board.active_notices());
        notices.sort();
        notices.dedup();
        notices
    }

    fn tasks_json(&self) -> String {
        let rows: Vec<TaskRow<'_>> = self.tasks().iter().map(TaskRow::from).collect();
        serde_json::to_string_pretty(&rows).unwrap_or_else(|err| format!("error: {err}"))
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        if let Some(mode) = self.active {
            let form = self.form(mode);
            let draft = form.draft();
            let signals = form.signals();
            let _ = writeln!(out, "[{} form]", mode_name(mode));
            let _ = writeln!(out, "  title:       {}{}", draft.title, title_marks(signals));
            let _ = writeln!(
                out,
                "  description: {}{}",
                draft.description,
                if signals.description_invalid { "  <- required" } else { "" }
            );
            let _ = writeln!(out, "  deadline:    {}", draft.deadline.format("%m/%d/%Y %H:%M"));
            let _ = writeln!(out, "  priority:    {}", draft.priority);
        }

        for notice in self.active_notices() {
            let tag = if notice.is_warning() { "warning" } else { "info" };
            let _ = writeln!(out, "({tag}) {notice}");
        }

        if self.tasks().is_empty() {
            out.push_str("(no tasks)\n");
            return out;
        }
        let _ = writeln!(
            out,
            "{:<20} {:<28} {:<10} {:<8} {:<5} actions",
            "title", "description", "deadline", "priority", "done"
        );
        for task in self.tasks() {
            let actions: Vec<&str> = task
                .permitted_actions()
                .to_vec()
                .into_iter()
                .map(|action| match action {
                    Action::Update => "update",
                    Action::Delete => "delete",
                })
                .collect();
            let _ = writeln!(
                out,
                "{:<20} {:<28} {:<10} {:<8} {:<5} {}",
                task.title,
                task.description,
                task.deadline.format("%m/%d/%Y"),
                task.priority,
                if task.is_complete { "[x]" } else { "[ ]" },
                actions.join(",")
            );
        }
        out
    }
}

impl<C: Clock + Clone> Sweep for Session<C> {
    fn sweep(&mut self) -> Vec<NoticeKind> {
        let mut cleared = self.create.clear_expired();
        cleared.extend(self.edit.clear_expired());
        cleared.extend(self.board.clear_expired());
        cleared
    }
}

fn mode_name(mode: FormMode) -> &'static str {
    match mode {
        FormMode::Create => "create",
        FormMode::Edit => "edit",
    }
}

fn title_marks(signals: Signals) -> &'static str {
    if signals.duplicate_title {
        "  <- already taken"
    } else if signals.title_invalid {
        "  <- required"
    } else {
        ""
    }
}
