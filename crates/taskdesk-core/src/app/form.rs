//! TaskForm - 作成／編集ダイアログの状態機械
//!
//! # 状態遷移
//! - Closed -> Open（`open`）
//! - Open -> Closed（`submit` 成功 / `cancel`）
//! - Open -> Open（`submit` の検証失敗・重複タイトル）
//!
//! フォームはストアを所有しません。`submit` のときだけ `&mut` で借りて、
//! 成功時にちょうど 1 回だけ `add` か `update` を呼びます。

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::notice::{NoticeKind, Notifications};
use super::policy::FormPolicy;
use crate::domain::{Action, FormError, NewTask, Priority, Task};
use crate::ports::{Clock, StoreOutcome, TaskStore};

/// Create or Edit; fixed for the lifetime of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Closed,
    Open,
}

/// Working copy of the editable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub priority: Priority,
}

impl Draft {
    fn blank(policy: &FormPolicy, now: DateTime<Utc>) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            deadline: policy.seeded_deadline(now),
            priority: policy.default_priority,
        }
    }

    fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            deadline: task.deadline,
            priority: task.priority,
        }
    }
}

/// Per-field validity flags shown next to the inputs.
///
/// Set only by `submit`; cleared by the next edit of the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    pub title_invalid: bool,
    pub description_invalid: bool,
    pub duplicate_title: bool,
}

/// A single user edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Title(String),
    Description(String),
    Deadline(DateTime<Utc>),
    Priority(Priority),
}

impl FieldEdit {
    fn name(&self) -> &'static str {
        match self {
            FieldEdit::Title(_) => "title",
            FieldEdit::Description(_) => "description",
            FieldEdit::Deadline(_) => "deadline",
            FieldEdit::Priority(_) => "priority",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOutcome {
    Accepted,
    /// Deadline too soon; the draft keeps its previous deadline.
    DeadlineRejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The store was called exactly once; the form is closed.
    Committed(StoreOutcome),
    /// Title and/or description were blank; the form stays open.
    Invalid { title: bool, description: bool },
    /// Create only: the title is already in the store; the form stays open.
    DuplicateTitle,
}

/// TaskForm は 1 つのダイアログに対応するフォームコントローラ
pub struct TaskForm<C> {
    mode: FormMode,
    state: FormState,
    clock: C,
    policy: FormPolicy,
    target: Option<Task>,
    draft: Draft,
    signals: Signals,
    notices: Notifications,
}

impl<C: Clock> TaskForm<C> {
    pub fn create(clock: C, policy: FormPolicy) -> Self {
        Self::new(FormMode::Create, clock, policy)
    }

    pub fn edit(clock: C, policy: FormPolicy) -> Self {
        Self::new(FormMode::Edit, clock, policy)
    }

    fn new(mode: FormMode, clock: C, policy: FormPolicy) -> Self {
        let draft = Draft::blank(&policy, clock.now());
        let notices = Notifications::new(policy.notice_ttl());
        Self {
            mode,
            state: FormState::Closed,
            clock,
            policy,
            target: None,
            draft,
            signals: Signals::default(),
            notices,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == FormState::Open
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn signals(&self) -> Signals {
        self.signals
    }

    /// Task being edited (Edit mode, while open).
    pub fn target(&self) -> Option<&Task> {
        self.target.as_ref()
    }

    pub fn notices(&self) -> &Notifications {
        &self.notices
    }

    pub fn active_notices(&self) -> Vec<NoticeKind> {
        self.notices.active(self.clock.now())
    }

    pub fn is_notice_active(&self, kind: NoticeKind) -> bool {
        self.notices.is_active(kind, self.clock.now())
    }

    pub fn dismiss(&mut self, kind: NoticeKind) -> bool {
        self.notices.dismiss(kind)
    }

    /// Drop expired notices and return the cleared kinds.
    pub fn clear_expired(&mut self) -> Vec<NoticeKind> {
        self.notices.sweep(self.clock.now())
    }

    /// Open the dialog and seed the draft.
    ///
    /// Create takes no target. Edit needs a target that still permits updates.
    pub fn open(&mut self, target: Option<&Task>) -> Result<(), FormError> {
        if self.is_open() {
            return Err(FormError::AlreadyOpen);
        }

        match (self.mode, target) {
            (FormMode::Create, Some(_)) => return Err(FormError::UnexpectedTarget),
            (FormMode::Create, None) => {
                self.target = None;
                self.draft = Draft::blank(&self.policy, self.clock.now());
            }
            (FormMode::Edit, None) => return Err(FormError::MissingTarget),
            (FormMode::Edit, Some(task)) => {
                if !task.permits(Action::Update) {
                    return Err(FormError::NotEditable(task.title.clone()));
                }
                self.draft = Draft::from_task(task);
                self.target = Some(task.clone());
            }
        }

        self.signals = Signals::default();
        self.state = FormState::Open;
        debug!(mode = ?self.mode, "form opened");
        Ok(())
    }

    pub fn edit_field(&mut self, edit: FieldEdit) -> Result<FieldOutcome, FormError> {
        self.ensure_open()?;
        let field = edit.name();

        let outcome = match edit {
            FieldEdit::Title(_) if self.mode == FormMode::Edit => {
                return Err(FormError::ReadOnlyField(field));
            }
            FieldEdit::Title(title) => {
                self.draft.title = title;
                self.signals.title_invalid = false;
                self.signals.duplicate_title = false;
                FieldOutcome::Accepted
            }
            FieldEdit::Description(description) => {
                self.draft.description = description;
                self.signals.description_invalid = false;
                FieldOutcome::Accepted
            }
            FieldEdit::Deadline(deadline) => {
                let now = self.clock.now();
                if self.policy.accepts_deadline(deadline, now) {
                    self.draft.deadline = deadline;
                    FieldOutcome::Accepted
                } else {
                    self.notices.raise(NoticeKind::DeadlineWarning, now);
                    debug!(%deadline, floor = %self.policy.deadline_floor(now), "deadline rejected");
                    FieldOutcome::DeadlineRejected
                }
            }
            FieldEdit::Priority(priority) => {
                self.draft.priority = priority;
                FieldOutcome::Accepted
            }
        };

        debug!(field, ?outcome, "field edited");
        Ok(outcome)
    }

    /// Validate the draft and, on success, make exactly one store call.
    pub fn submit<S>(&mut self, store: &mut S) -> Result<SubmitOutcome, FormError>
    where
        S: TaskStore + ?Sized,
    {
        self.ensure_open()?;
        let now = self.clock.now();

        let title = match (&self.mode, &self.target) {
            (FormMode::Edit, Some(target)) => target.title.clone(),
            _ => self.draft.title.trim().to_string(),
        };
        let description = self.draft.description.trim().to_string();

        let title_empty = self.mode == FormMode::Create && title.is_empty();
        let description_empty = description.is_empty();
        if title_empty || description_empty {
            if title_empty {
                self.signals.title_invalid = true;
            }
            if description_empty {
                self.signals.description_invalid = true;
            }
            self.reset_draft();
            info!(title_empty, description_empty, "submit rejected: blank fields");
            return Ok(SubmitOutcome::Invalid {
                title: title_empty,
                description: description_empty,
            });
        }

        let outcome = match self.mode {
            FormMode::Create => {
                if store.contains_title(&title) {
                    self.notices.raise(NoticeKind::DuplicateWarning, now);
                    self.reset_draft();
                    self.signals = Signals {
                        title_invalid: true,
                        description_invalid: true,
                        duplicate_title: true,
                    };
                    info!(%title, "submit rejected: duplicate title");
                    return Ok(SubmitOutcome::DuplicateTitle);
                }
                store.add(NewTask {
                    title,
                    description,
                    deadline: self.draft.deadline,
                    priority: self.draft.priority,
                    is_complete: false,
                })
            }
            FormMode::Edit => {
                let Some(target) = self.target.as_ref() else {
                    return Err(FormError::MissingTarget);
                };
                store.update(Task {
                    description,
                    deadline: self.draft.deadline,
                    priority: self.draft.priority,
                    ..target.clone()
                })
            }
        };

        if outcome.is_applied() {
            self.notices.raise(NoticeKind::Success, now);
            info!(mode = ?self.mode, ?outcome, "task committed");
        } else {
            warn!(mode = ?self.mode, ?outcome, "store did not apply the submitted task");
        }
        self.close();
        Ok(SubmitOutcome::Committed(outcome))
    }

    /// Discard the draft and close. Notices keep running.
    pub fn cancel(&mut self) {
        if self.is_open() {
            debug!(mode = ?self.mode, "form cancelled");
        }
        self.close();
    }

    fn close(&mut self) {
        self.reset_draft();
        self.signals = Signals::default();
        self.target = None;
        self.state = FormState::Closed;
    }

    /// Blank defaults for Create; for Edit, the values `open` seeded from the target.
    fn reset_draft(&mut self) {
        self.draft = match (&self.mode, &self.target) {
            (FormMode::Edit, Some(target)) => Draft::from_task(target),
            _ => Draft::blank(&self.policy, self.clock.now()),
        };
    }

    fn ensure_open(&self) -> Result<(), FormError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(FormError::NotOpen)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryTaskStore;
    use crate::ports::{FixedClock, UlidGenerator};
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    type Store = InMemoryTaskStore<UlidGenerator<FixedClock>>;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn fixture() -> (FixedClock, Store) {
        let clock = FixedClock::new(start());
        let store = InMemoryTaskStore::with_clock(clock.clone());
        (clock, store)
    }

    fn fill(form: &mut TaskForm<FixedClock>, title: &str, description: &str) {
        form.edit_field(FieldEdit::Title(title.into())).unwrap();
        form.edit_field(FieldEdit::Description(description.into())).unwrap();
    }

    fn add_via_form(clock: &FixedClock, store: &mut Store, title: &str) -> Task {
        let mut form = TaskForm::create(clock.clone(), FormPolicy::default());
        form.open(None).unwrap();
        fill(&mut form, title, "details");
        form.submit(store).unwrap();
        store.find_by_title(title).unwrap().clone()
    }

    #[test]
    fn create_form_seeds_blank_defaults() {
        let (clock, _) = fixture();
        let mut form = TaskForm::create(clock, FormPolicy::default());

        form.open(None).unwrap();

        assert_eq!(form.state(), FormState::Open);
        assert_eq!(form.draft().title, "");
        assert_eq!(form.draft().description, "");
        assert_eq!(form.draft().priority, Priority::Low);
        assert!(form.draft().deadline > start() + Duration::days(1));
        assert_eq!(form.signals(), Signals::default());
    }

    #[test]
    fn create_submit_adds_one_task_and_closes() {
        let (clock, mut store) = fixture();
        let mut form = TaskForm::create(clock.clone(), FormPolicy::default());
        form.open(None).unwrap();
        fill(&mut form, "Buy milk", "2% milk");
        form.edit_field(FieldEdit::Deadline(start() + Duration::days(2))).unwrap();
        form.edit_field(FieldEdit::Priority(Priority::Medium)).unwrap();

        let outcome = form.submit(&mut store).unwrap();

        assert!(matches!(outcome, SubmitOutcome::Committed(StoreOutcome::Added(_))));
        assert_eq!(store.len(), 1);
        let task = &store.tasks()[0];
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, "2% milk");
        assert_eq!(task.deadline, start() + Duration::days(2));
        assert_eq!(task.priority, Priority::Medium);
        assert!(!task.is_complete);
        assert!(task.permits(Action::Update) && task.permits(Action::Delete));
        assert_eq!(form.state(), FormState::Closed);
        assert!(form.is_notice_active(NoticeKind::Success));
    }

    #[test]
    fn success_notice_clears_after_ttl() {
        let (clock, mut store) = fixture();
        add_via_form(&clock, &mut store, "Buy milk");
        let mut form = TaskForm::create(clock.clone(), FormPolicy::default());
        form.open(None).unwrap();
        fill(&mut form, "Walk dog", "around the block");
        form.submit(&mut store).unwrap();

        clock.advance(Duration::milliseconds(1999));
        assert!(form.is_notice_active(NoticeKind::Success));

        clock.advance(Duration::milliseconds(1));
        assert!(!form.is_notice_active(NoticeKind::Success));
        assert_eq!(form.clear_expired(), vec![NoticeKind::Success]);
    }

    #[test]
    fn submitted_values_are_trimmed() {
        let (clock, mut store) = fixture();
        let mut form = TaskForm::create(clock, FormPolicy::default());
        form.open(None).unwrap();
        fill(&mut form, "  Buy milk \t", " 2% milk  ");

        form.submit(&mut store).unwrap();

        assert_eq!(store.tasks()[0].title, "Buy milk");
        assert_eq!(store.tasks()[0].description, "2% milk");
    }

    #[rstest]
    #[case::both_blank("", "", true, true)]
    #[case::title_blank("   ", "desc", true, false)]
    #[case::whitespace_description("title", "   \t  ", false, true)]
    fn blank_fields_keep_the_form_open(
        #[case] title: &str,
        #[case] description: &str,
        #[case] title_flag: bool,
        #[case] description_flag: bool,
    ) {
        let (clock, mut store) = fixture();
        let mut form = TaskForm::create(clock, FormPolicy::default());
        form.open(None).unwrap();
        fill(&mut form, title, description);
        form.edit_field(FieldEdit::Priority(Priority::High)).unwrap();

        let outcome = form.submit(&mut store).unwrap();

        assert_eq!(
            outcome,
            SubmitOutcome::Invalid {
                title: title_flag,
                description: description_flag
            }
        );
        assert!(store.is_empty());
        assert!(form.is_open());
        assert_eq!(form.signals().title_invalid, title_flag);
        assert_eq!(form.signals().description_invalid, description_flag);
        // 検証失敗時はドラフト全体がリセットされる（有効だった項目も含む）
        assert_eq!(form.draft().title, "");
        assert_eq!(form.draft().description, "");
        assert_eq!(form.draft().priority, Priority::Low);
    }

    #[test]
    fn editing_a_field_clears_only_its_flag() {
        let (clock, mut store) = fixture();
        let mut form = TaskForm::create(clock, FormPolicy::default());
        form.open(None).unwrap();
        form.submit(&mut store).unwrap();
        assert!(form.signals().title_invalid && form.signals().description_invalid);

        form.edit_field(FieldEdit::Title("x".into())).unwrap();
        assert!(!form.signals().title_invalid);
        assert!(form.signals().description_invalid);

        // 空文字を入力しても submit までは再設定されない
        form.edit_field(FieldEdit::Description(String::new())).unwrap();
        assert!(!form.signals().description_invalid);
    }

    #[test]
    fn duplicate_title_is_caught_before_the_store() {
        let (clock, mut store) = fixture();
        add_via_form(&clock, &mut store, "Buy milk");
        let mut form = TaskForm::create(clock, FormPolicy::default());
        form.open(None).unwrap();
        fill(&mut form, "Buy milk", "again");

        let outcome = form.submit(&mut store).unwrap();

        assert_eq!(outcome, SubmitOutcome::DuplicateTitle);
        assert_eq!(store.len(), 1);
        assert!(form.is_open());
        assert!(form.is_notice_active(NoticeKind::DuplicateWarning));
        assert_eq!(
            form.signals(),
            Signals {
                title_invalid: true,
                description_invalid: true,
                duplicate_title: true
            }
        );
        assert_eq!(form.draft().title, "");

        form.edit_field(FieldEdit::Title("Buy oat milk".into())).unwrap();
        assert!(!form.signals().duplicate_title);
    }

    #[rstest]
    #[case::now(Duration::zero())]
    #[case::exactly_one_day(Duration::days(1))]
    #[case::yesterday(-Duration::days(1))]
    fn too_early_deadline_is_rejected_and_draft_unchanged(#[case] offset: Duration) {
        let (clock, _) = fixture();
        let mut form = TaskForm::create(clock, FormPolicy::default());
        form.open(None).unwrap();
        let before = form.draft().deadline;

        let outcome = form.edit_field(FieldEdit::Deadline(start() + offset)).unwrap();

        assert_eq!(outcome, FieldOutcome::DeadlineRejected);
        assert_eq!(form.draft().deadline, before);
        assert!(form.is_notice_active(NoticeKind::DeadlineWarning));
    }

    #[test]
    fn deadline_just_after_one_day_is_accepted() {
        let (clock, _) = fixture();
        let mut form = TaskForm::create(clock, FormPolicy::default());
        form.open(None).unwrap();
        let deadline = start() + Duration::days(1) + Duration::seconds(1);

        let outcome = form.edit_field(FieldEdit::Deadline(deadline)).unwrap();

        assert_eq!(outcome, FieldOutcome::Accepted);
        assert_eq!(form.draft().deadline, deadline);
        assert!(!form.is_notice_active(NoticeKind::DeadlineWarning));
    }

    #[test]
    fn deadline_gate_uses_the_time_of_entry() {
        let (clock, _) = fixture();
        let mut form = TaskForm::create(clock.clone(), FormPolicy::default());
        form.open(None).unwrap();
        let deadline = start() + Duration::days(1) + Duration::seconds(30);

        clock.advance(Duration::minutes(1));

        assert_eq!(
            form.edit_field(FieldEdit::Deadline(deadline)).unwrap(),
            FieldOutcome::DeadlineRejected
        );
    }

    #[test]
    fn rejected_deadline_reraise_extends_the_warning() {
        let (clock, _) = fixture();
        let mut form = TaskForm::create(clock.clone(), FormPolicy::default());
        form.open(None).unwrap();

        form.edit_field(FieldEdit::Deadline(start())).unwrap();
        clock.advance(Duration::milliseconds(1500));
        form.edit_field(FieldEdit::Deadline(start())).unwrap();
        clock.advance(Duration::milliseconds(1000));

        assert!(form.clear_expired().is_empty());
        assert!(form.is_notice_active(NoticeKind::DeadlineWarning));
    }

    #[test]
    fn edit_form_seeds_from_target_and_updates_in_place() {
        let (clock, mut store) = fixture();
        add_via_form(&clock, &mut store, "first");
        let target = add_via_form(&clock, &mut store, "second");
        let mut form = TaskForm::edit(clock.clone(), FormPolicy::default());

        form.open(Some(&target)).unwrap();
        assert_eq!(form.draft().title, "second");
        assert_eq!(form.draft().description, "details");

        form.edit_field(FieldEdit::Description("changed".into())).unwrap();
        form.edit_field(FieldEdit::Priority(Priority::High)).unwrap();
        let outcome = form.submit(&mut store).unwrap();

        assert_eq!(outcome, SubmitOutcome::Committed(StoreOutcome::Updated));
        assert_eq!(store.len(), 2);
        let updated = &store.tasks()[1];
        assert_eq!(updated.id, target.id);
        assert_eq!(updated.title, "second");
        assert_eq!(updated.description, "changed");
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(store.tasks()[0].description, "details");
        assert!(form.is_notice_active(NoticeKind::Success));
        assert!(!form.is_open());
    }

    #[test]
    fn edit_form_title_is_read_only() {
        let (clock, mut store) = fixture();
        let target = add_via_form(&clock, &mut store, "fixed");
        let mut form = TaskForm::edit(clock, FormPolicy::default());
        form.open(Some(&target)).unwrap();

        let err = form.edit_field(FieldEdit::Title("renamed".into())).unwrap_err();

        assert_eq!(err, FormError::ReadOnlyField("title"));
        assert_eq!(form.draft().title, "fixed");
    }

    #[test]
    fn edit_form_blank_description_reseeds_from_target() {
        let (clock, mut store) = fixture();
        let target = add_via_form(&clock, &mut store, "keep");
        let mut form = TaskForm::edit(clock, FormPolicy::default());
        form.open(Some(&target)).unwrap();
        form.edit_field(FieldEdit::Priority(Priority::High)).unwrap();
        form.edit_field(FieldEdit::Description("  ".into())).unwrap();

        let outcome = form.submit(&mut store).unwrap();

        assert_eq!(
            outcome,
            SubmitOutcome::Invalid {
                title: false,
                description: true
            }
        );
        assert!(form.is_open());
        assert_eq!(form.draft(), &Draft::from_task(&target));
        assert_eq!(store.tasks()[0], target);
    }

    #[test]
    fn edit_of_a_deleted_task_closes_without_success() {
        let (clock, mut store) = fixture();
        let target = add_via_form(&clock, &mut store, "gone");
        let mut form = TaskForm::edit(clock, FormPolicy::default());
        form.open(Some(&target)).unwrap();
        store.delete(&target);

        let outcome = form.submit(&mut store).unwrap();

        assert_eq!(outcome, SubmitOutcome::Committed(StoreOutcome::Missing));
        assert!(store.is_empty());
        assert!(!form.is_open());
        assert!(!form.is_notice_active(NoticeKind::Success));
    }

    #[test]
    fn completed_task_cannot_be_edited() {
        let (clock, mut store) = fixture();
        let target = add_via_form(&clock, &mut store, "done").with_completion(true);
        let mut form = TaskForm::edit(clock, FormPolicy::default());

        let err = form.open(Some(&target)).unwrap_err();

        assert_eq!(err, FormError::NotEditable("done".into()));
        assert!(!form.is_open());
    }

    #[test]
    fn open_checks_mode_and_target() {
        let (clock, mut store) = fixture();
        let task = add_via_form(&clock, &mut store, "t");
        let mut create = TaskForm::create(clock.clone(), FormPolicy::default());
        let mut edit = TaskForm::edit(clock, FormPolicy::default());

        assert_eq!(create.open(Some(&task)), Err(FormError::UnexpectedTarget));
        assert_eq!(edit.open(None), Err(FormError::MissingTarget));

        create.open(None).unwrap();
        assert_eq!(create.open(None), Err(FormError::AlreadyOpen));
    }

    #[test]
    fn closed_form_refuses_edits_and_submit() {
        let (clock, mut store) = fixture();
        let mut form = TaskForm::create(clock, FormPolicy::default());

        assert_eq!(
            form.edit_field(FieldEdit::Priority(Priority::High)),
            Err(FormError::NotOpen)
        );
        assert_eq!(form.submit(&mut store), Err(FormError::NotOpen));
    }

    #[test]
    fn cancel_discards_draft_and_keeps_notices() {
        let (clock, mut store) = fixture();
        let mut form = TaskForm::create(clock, FormPolicy::default());
        form.open(None).unwrap();
        fill(&mut form, "half", "typed");
        form.edit_field(FieldEdit::Deadline(start())).unwrap();

        form.cancel();

        assert_eq!(form.state(), FormState::Closed);
        assert_eq!(form.draft().title, "");
        assert!(form.is_notice_active(NoticeKind::DeadlineWarning));
        assert!(store.is_empty());

        form.open(None).unwrap();
        assert_eq!(form.draft().description, "");
        assert!(form.submit(&mut store).is_ok());
    }
}
