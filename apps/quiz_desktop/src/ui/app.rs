use std::time::{Duration, Instant};

use arboard::Clipboard;
use client_core::{
    attempt::{AttemptPhase, QuestionReview, StepState},
    notice::NoticeKind,
    AttemptController, AuthoringController, ClientSettings, QuestionEdit,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{AnswerPosition, Difficulty};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{classify_request_failure, err_label, UiError, UiErrorContext, UiEvent},
    orchestration::dispatch_backend_command,
};

const SUCCESS_GREEN: egui::Color32 = egui::Color32::from_rgb(87, 171, 90);
const ERROR_RED: egui::Color32 = egui::Color32::from_rgb(214, 92, 92);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Create,
    Take,
}

impl Page {
    fn label(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Create => "Create Quiz",
            Page::Take => "Take Quiz",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBannerSeverity {
    Error,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: StatusBannerSeverity,
    message: String,
}

pub struct QuizDeskApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    api_base_url: String,
    page: Page,
    authoring: AuthoringController,
    attempt: AttemptController,
    generating_id: bool,
    last_created_id: Option<String>,

    status: String,
    status_banner: Option<StatusBanner>,
}

impl QuizDeskApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: &ClientSettings,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            api_base_url: settings.api_base_url.clone(),
            page: Page::Home,
            authoring: AuthoringController::with_notice_ttl(settings.notice_dismiss_after()),
            attempt: AttemptController::new(),
            generating_id: false,
            last_created_id: None,
            status: "Backend worker starting...".to_string(),
            status_banner: None,
        }
    }

    fn process_ui_events(&mut self) {
        let now = Instant::now();
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply_ui_event(event, now);
        }
    }

    fn apply_ui_event(&mut self, event: UiEvent, now: Instant) {
        match event {
            UiEvent::Info(message) => {
                self.status = message;
            }
            UiEvent::QuizLoaded(quiz) => {
                self.status = format!("Loaded \"{}\" ({} questions)", quiz.name, quiz.len());
                self.attempt.complete_fetch(Ok(quiz));
            }
            UiEvent::QuizLoadFailed(err) => {
                let ui_err = UiError::from_request(UiErrorContext::FetchQuiz, &err);
                self.report_error(&ui_err);
                self.attempt.complete_fetch(Err(err));
            }
            UiEvent::QuizCreated { quiz_id, created } => {
                self.authoring.complete_submit(Ok(created), now);
                self.status = if copy_to_clipboard(&quiz_id) {
                    format!("Quiz {quiz_id} created and its ID copied to clipboard")
                } else {
                    format!("Quiz {quiz_id} created")
                };
                self.last_created_id = Some(quiz_id);
            }
            UiEvent::QuizCreateFailed(err) => {
                let ui_err = UiError::from_request(UiErrorContext::CreateQuiz, &err);
                self.report_error(&ui_err);
                self.authoring.complete_submit(Err(err), now);
            }
            UiEvent::QuizIdGenerated(quiz_id) => {
                self.generating_id = false;
                self.authoring.apply_generated_id(&quiz_id);
                self.status = format!("Generated quiz ID {quiz_id}");
            }
            UiEvent::Error(err) => {
                if err.context() == UiErrorContext::GenerateQuizId {
                    self.generating_id = false;
                }
                self.report_error(&err);
            }
        }
    }

    fn report_error(&mut self, err: &UiError) {
        self.status = if err.context() == UiErrorContext::BackendStartup {
            classify_request_failure(err.message())
        } else {
            format!("{} error: {}", err_label(err.category()), err.message())
        };
        if err.wants_banner() {
            self.status_banner = Some(StatusBanner {
                severity: StatusBannerSeverity::Error,
                message: self.status.clone(),
            });
        }
    }

    fn go_to(&mut self, page: Page) {
        if self.page != page {
            tracing::debug!(from = ?self.page, to = ?page, "switching page");
            self.page = page;
        }
    }

    fn request_fetch(&mut self) {
        match self.attempt.begin_fetch() {
            Ok(quiz_id) => {
                if !dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::FetchQuiz { quiz_id },
                    &mut self.status,
                ) {
                    self.attempt.abort_fetch(self.status.clone());
                }
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn request_submit(&mut self) {
        match self.authoring.begin_submit() {
            Ok(request) => {
                if !dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::CreateQuiz { request },
                    &mut self.status,
                ) {
                    self.authoring.abort_submit();
                }
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn request_generated_id(&mut self) {
        if self.generating_id {
            return;
        }
        self.generating_id = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::GenerateQuizId,
            &mut self.status,
        );
    }

    fn note_rejected<E: std::fmt::Display>(&mut self, result: Result<(), E>) {
        if let Err(err) = result {
            tracing::debug!(%err, "ui action rejected");
            self.status = err.to_string();
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            let (fill, stroke) = match banner.severity {
                StatusBannerSeverity::Error => (
                    egui::Color32::from_rgb(111, 53, 53),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
                ),
            };

            egui::Frame::NONE
                .fill(fill)
                .stroke(stroke)
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
            ui.add_space(8.0);
        }
    }

    fn show_notice(&mut self, ui: &mut egui::Ui, now: Instant) {
        let Some(notice) = self.authoring.notice().cloned() else {
            return;
        };
        let (fill, stroke) = match notice.kind {
            NoticeKind::Success => (
                egui::Color32::from_rgb(44, 92, 52),
                egui::Stroke::new(1.0, SUCCESS_GREEN),
            ),
            NoticeKind::Error => (
                egui::Color32::from_rgb(111, 53, 53),
                egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
            ),
        };
        let remaining = self
            .authoring
            .notice_remaining(now)
            .unwrap_or(Duration::ZERO);

        egui::Frame::NONE
            .fill(fill)
            .stroke(stroke)
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new(&notice.text).color(egui::Color32::WHITE));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            self.authoring.dismiss_notice();
                        }
                        ui.small(format!("{}s", remaining.as_secs() + 1));
                    });
                });
            });
        ui.add_space(8.0);
    }

    fn labeled_text_field(
        ui: &mut egui::Ui,
        id: &str,
        label: &str,
        hint: &str,
        value: &mut String,
    ) -> egui::Response {
        ui.label(egui::RichText::new(label).strong());
        let edit = egui::TextEdit::singleline(value)
            .id_salt(id)
            .hint_text(
                egui::RichText::new(hint)
                    .color(ui.visuals().weak_text_color().gamma_multiply(0.85)),
            )
            .desired_width(f32::INFINITY);
        ui.add_sized([ui.available_width(), 30.0], edit)
    }

    fn show_nav_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("nav_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Quiz Desk");
                ui.add_space(16.0);
                for page in [Page::Home, Page::Create, Page::Take] {
                    if ui
                        .selectable_label(self.page == page, page.label())
                        .clicked()
                    {
                        self.go_to(page);
                    }
                }
            });
        });
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.small("Status:");
                ui.small(egui::RichText::new(&self.status).weak());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.small(egui::RichText::new(&self.api_base_url).weak());
                });
            });
        });
    }

    fn show_home_page(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading("Welcome to Quiz Desk");
            ui.weak("Write a multiple-choice quiz, or take one by its 6-digit ID.");
            ui.add_space(24.0);
            let size = egui::vec2(220.0, 44.0);
            if ui
                .add(egui::Button::new(egui::RichText::new("Create a Quiz").size(16.0)).min_size(size))
                .clicked()
            {
                self.go_to(Page::Create);
            }
            ui.add_space(8.0);
            if ui
                .add(egui::Button::new(egui::RichText::new("Take a Quiz").size(16.0)).min_size(size))
                .clicked()
            {
                self.go_to(Page::Take);
            }
            if let Some(quiz_id) = &self.last_created_id {
                ui.add_space(16.0);
                ui.weak(format!("Last created quiz: {quiz_id}"));
            }
        });
    }

    fn show_create_page(&mut self, ui: &mut egui::Ui, now: Instant) {
        self.show_notice(ui, now);

        let busy = self.authoring.is_submitting();
        let draft = self.authoring.draft().clone();
        let mut edits: Vec<(usize, QuestionEdit)> = Vec::new();
        let mut remove: Option<usize> = None;

        ui.add_enabled_ui(!busy, |ui| {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.set_width((ui.available_width() - 140.0).max(120.0));
                    let mut id_buf = draft.id.clone();
                    let resp =
                        Self::labeled_text_field(ui, "create_quiz_id", "Quiz ID", "123456", &mut id_buf);
                    if resp.changed() {
                        self.authoring.edit_id(&id_buf);
                    }
                });
                ui.vertical(|ui| {
                    ui.add_space(18.0);
                    let label = if self.generating_id {
                        "Generating..."
                    } else {
                        "Generate ID"
                    };
                    if ui
                        .add_enabled(!self.generating_id, egui::Button::new(label))
                        .clicked()
                    {
                        self.request_generated_id();
                    }
                });
            });
            if let Some(err) = self.authoring.id_error() {
                ui.colored_label(ERROR_RED, err);
            }

            let mut name_buf = draft.name.clone();
            if Self::labeled_text_field(ui, "create_quiz_name", "Quiz Name", "Ownership basics", &mut name_buf)
                .changed()
            {
                self.authoring.edit_name(name_buf);
            }

            ui.label(egui::RichText::new("Difficulty").strong());
            let mut difficulty = draft.difficulty;
            egui::ComboBox::from_id_salt("create_quiz_difficulty")
                .selected_text(difficulty.label())
                .show_ui(ui, |ui| {
                    for option in Difficulty::ALL {
                        ui.selectable_value(&mut difficulty, option, option.label());
                    }
                });
            if difficulty != draft.difficulty {
                self.authoring.edit_difficulty(difficulty);
            }

            ui.add_space(8.0);
            ui.separator();

            let can_remove = self.authoring.can_remove_questions();
            for (index, question) in draft.questions.iter().enumerate() {
                egui::Frame::new()
                    .fill(ui.visuals().faint_bg_color)
                    .corner_radius(8.0)
                    .inner_margin(egui::Margin::symmetric(12, 10))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new(format!("Question {}", index + 1)).strong());
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                if ui.add_enabled(can_remove, egui::Button::new("Remove")).clicked() {
                                    remove = Some(index);
                                }
                            });
                        });

                        let mut title = question.title.clone();
                        if Self::labeled_text_field(
                            ui,
                            &format!("question_{index}_title"),
                            "Question",
                            "What does the borrow checker enforce?",
                            &mut title,
                        )
                        .changed()
                        {
                            edits.push((index, QuestionEdit::Title(title)));
                        }

                        ui.label(egui::RichText::new("Answers (select the correct one)").strong());
                        for position in AnswerPosition::ALL {
                            ui.horizontal(|ui| {
                                if ui
                                    .radio(question.correct == position, "")
                                    .on_hover_text("Mark as correct")
                                    .clicked()
                                {
                                    edits.push((index, QuestionEdit::Correct(position)));
                                }
                                let mut answer = question.answers[position.index()].clone();
                                let edit = egui::TextEdit::singleline(&mut answer)
                                    .id_salt(format!("question_{index}_answer_{}", position.number()))
                                    .hint_text(format!("Answer {position}"))
                                    .desired_width(f32::INFINITY);
                                if ui.add(edit).changed() {
                                    edits.push((index, QuestionEdit::Answer(position, answer)));
                                }
                            });
                        }
                    });
                ui.add_space(6.0);
            }

            if ui.button("+ Add Question").clicked() {
                self.authoring.add_question();
            }
        });

        for (index, edit) in edits {
            let result = self.authoring.edit_question(index, edit);
            self.note_rejected(result);
        }
        if let Some(index) = remove {
            self.authoring.remove_question(index);
        }

        ui.add_space(10.0);
        let label = if busy { "Creating..." } else { "Create Quiz" };
        let button = egui::Button::new(egui::RichText::new(label).strong().size(16.0))
            .min_size(egui::vec2(ui.available_width(), 38.0));
        if ui.add_enabled(self.authoring.can_submit(), button).clicked() {
            self.request_submit();
        }
    }

    fn show_take_page(&mut self, ui: &mut egui::Ui) {
        match self.attempt.phase() {
            AttemptPhase::AwaitingId | AttemptPhase::Loading => self.show_quiz_id_entry(ui),
            AttemptPhase::InProgress => self.show_current_question(ui),
            AttemptPhase::Submitted => self.show_results(ui),
        }
    }

    fn show_quiz_id_entry(&mut self, ui: &mut egui::Ui) {
        let loading = self.attempt.phase() == AttemptPhase::Loading;
        ui.heading("Take a Quiz");
        ui.add_space(8.0);

        let mut id_buf = self.attempt.quiz_id_input().to_string();
        let resp = ui
            .add_enabled_ui(!loading, |ui| {
                Self::labeled_text_field(ui, "take_quiz_id", "Quiz ID", "Enter the 6-digit quiz ID", &mut id_buf)
            })
            .inner;
        if resp.changed() {
            let result = self.attempt.edit_quiz_id(&id_buf);
            self.note_rejected(result);
        }
        if let Some(err) = self.attempt.error() {
            ui.colored_label(ERROR_RED, err);
        }

        let enter_pressed = ui.input(|i| i.key_pressed(egui::Key::Enter));
        ui.add_space(8.0);
        let label = if loading { "Loading..." } else { "Start Quiz" };
        let clicked = ui
            .add_enabled(
                self.attempt.can_fetch(),
                egui::Button::new(egui::RichText::new(label).strong())
                    .min_size(egui::vec2(ui.available_width(), 36.0)),
            )
            .clicked();
        if clicked || (enter_pressed && resp.lost_focus() && self.attempt.can_fetch()) {
            self.request_fetch();
        }
    }

    fn show_step_indicator(&self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            for (index, step) in self.attempt.steps().into_iter().enumerate() {
                let text = egui::RichText::new(format!(" {} ", index + 1));
                let text = match step {
                    StepState::Current => text.strong().background_color(ui.visuals().selection.bg_fill),
                    StepState::Answered => text.color(SUCCESS_GREEN),
                    StepState::Unanswered => text.weak(),
                };
                ui.label(text);
            }
        });
    }

    fn show_current_question(&mut self, ui: &mut egui::Ui) {
        let Some(quiz) = self.attempt.quiz() else {
            return;
        };
        let Some(question) = self.attempt.current_question().cloned() else {
            return;
        };
        let total = quiz.len();
        let index = self.attempt.current_index().unwrap_or(0);

        ui.horizontal(|ui| {
            ui.heading(quiz.name.as_str());
            ui.label(egui::RichText::new(quiz.difficulty.label()).weak());
        });
        self.show_step_indicator(ui);
        ui.add_space(6.0);
        ui.label(format!("Question {} of {}", index + 1, total));
        ui.label(egui::RichText::new(&question.title).size(18.0).strong());
        ui.add_space(6.0);

        let selected = self.attempt.selected(question.id);
        let mut choice = None;
        for position in AnswerPosition::ALL {
            if ui
                .radio(selected == Some(position), question.answer(position))
                .clicked()
            {
                choice = Some(position);
            }
        }
        if let Some(position) = choice {
            let result = self.attempt.select_answer(question.id, position);
            self.note_rejected(result);
        }

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.attempt.can_go_prev(), egui::Button::new("Previous"))
                .clicked()
            {
                let result = self.attempt.prev();
                self.note_rejected(result);
            }
            if self.attempt.is_last_question() {
                if ui
                    .add_enabled(self.attempt.can_submit(), egui::Button::new("Submit Quiz"))
                    .clicked()
                {
                    let result = self.attempt.submit().map(|_| ());
                    self.note_rejected(result);
                }
            } else if ui
                .add_enabled(self.attempt.can_go_next(), egui::Button::new("Next"))
                .clicked()
            {
                let result = self.attempt.next();
                self.note_rejected(result);
            }
        });
    }

    fn show_review_entry(ui: &mut egui::Ui, index: usize, review: &QuestionReview) {
        egui::Frame::new()
            .fill(ui.visuals().faint_bg_color)
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(12, 10))
            .show(ui, |ui| {
                ui.label(egui::RichText::new(format!("{}. {}", index + 1, review.title)).strong());
                for option in &review.options {
                    let text = egui::RichText::new(format!("{}. {}", option.position, option.text));
                    let text = if option.is_correct {
                        text.color(SUCCESS_GREEN).strong()
                    } else if option.is_selected {
                        text.color(ERROR_RED)
                    } else {
                        text
                    };
                    ui.label(text);
                }
                let color = if review.answered_correctly() {
                    SUCCESS_GREEN
                } else {
                    ERROR_RED
                };
                ui.colored_label(color, review.summary());
            });
        ui.add_space(6.0);
    }

    fn show_results(&mut self, ui: &mut egui::Ui) {
        let total = self.attempt.quiz().map(|q| q.len()).unwrap_or(0);
        let score = self.attempt.score().unwrap_or(0);

        ui.heading("Quiz Results");
        ui.label(
            egui::RichText::new(format!("You scored {score} out of {total}"))
                .size(18.0)
                .strong(),
        );
        if let Some(tier) = self.attempt.tier() {
            ui.label(tier.message());
        }
        ui.add_space(8.0);

        for (index, review) in self.attempt.review().iter().enumerate() {
            Self::show_review_entry(ui, index, review);
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.button("Try Again").clicked() {
                let result = self.attempt.retry();
                self.note_rejected(result);
            }
            if ui.button("Take Another Quiz").clicked() {
                let result = self.attempt.new_quiz();
                self.note_rejected(result);
            }
        });
    }
}

/// Returns whether the text landed on the system clipboard.
fn copy_to_clipboard(text: &str) -> bool {
    match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string())) {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(%err, "clipboard unavailable");
            false
        }
    }
}

impl eframe::App for QuizDeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        let now = Instant::now();
        self.authoring.tick(now);

        self.show_nav_bar(ctx);
        self.show_status_bar(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            egui::ScrollArea::vertical()
                .id_salt("page_scroll")
                .show(ui, |ui| match self.page {
                    Page::Home => self.show_home_page(ui),
                    Page::Create => self.show_create_page(ui, now),
                    Page::Take => self.show_take_page(ui),
                });
        });

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
