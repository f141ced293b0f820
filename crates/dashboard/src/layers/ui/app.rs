use crate::layers::service::{Controller, SessionEvent};
use crate::layers::session::SessionView;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Pane {
    #[default]
    Form,
    Results,
    Assistant,
    Calculator,
}

impl Pane {
    /// Tab order. The assistant pane is skipped while its window is closed.
    fn next(self, assistant_open: bool) -> Self {
        match self {
            Pane::Form => Pane::Results,
            Pane::Results if assistant_open => Pane::Assistant,
            Pane::Results | Pane::Assistant => Pane::Calculator,
            Pane::Calculator => Pane::Form,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PathTarget {
    Screenshot,
    ChatImage,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum InputMode {
    #[default]
    Normal,
    EditSender,
    EditText,
    ChatInput,
    CalcField,
    PathPrompt(PathTarget),
}

#[derive(Default)]
pub(crate) struct AppState {
    pub(crate) view: SessionView,
    pub(crate) pane: Pane,
    pub(crate) mode: InputMode,
    pub(crate) path_input: String,
    pub(crate) backend_url: String,
    pub(crate) result_max_scroll: usize,
    pub(crate) result_total_lines: usize,
    pub(crate) result_view_height: u16,
    pub(crate) pending_g: bool,
    pub(crate) confirm_quit: bool,
}

impl AppState {
    pub(crate) fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            ..Self::default()
        }
    }

    /// Applies a background result; a finished analysis brings the results
    /// pane into focus unless the user is typing somewhere.
    pub(crate) fn handle_event(&mut self, controller: &Controller, event: SessionEvent) {
        let reveal = matches!(event, SessionEvent::AnalysisFinished(_));
        controller.handle(&mut self.view, event);
        if reveal && self.view.last_result.is_some() && self.mode == InputMode::Normal {
            self.pane = Pane::Results;
        }
    }

    pub(crate) fn next_pane(&mut self) {
        self.pane = self.pane.next(self.view.assistant.open);
        self.pending_g = false;
    }

    pub(crate) fn toggle_assistant(&mut self) {
        self.view.assistant.toggle();
        if self.view.assistant.open {
            self.pane = Pane::Assistant;
        } else if self.pane == Pane::Assistant {
            self.pane = Pane::Results;
        }
    }

    pub(crate) fn open_path_prompt(&mut self, target: PathTarget) {
        self.path_input.clear();
        self.mode = InputMode::PathPrompt(target);
    }

    /// Leaves the prompt and hands back what was typed, if anything.
    pub(crate) fn take_path_input(&mut self) -> Option<String> {
        self.mode = InputMode::Normal;
        let path = std::mem::take(&mut self.path_input);
        let path = path.trim();
        (!path.is_empty()).then(|| path.to_string())
    }

    /// The text buffer the current mode edits.
    pub(crate) fn edit_buffer(&mut self) -> Option<&mut String> {
        match self.mode {
            InputMode::Normal => None,
            InputMode::EditSender => Some(&mut self.view.form.selected_row_mut().sender),
            InputMode::EditText => Some(&mut self.view.form.selected_row_mut().text),
            InputMode::ChatInput => Some(&mut self.view.assistant.input),
            InputMode::CalcField => self.view.financial.form.focused_text_mut(),
            InputMode::PathPrompt(_) => Some(&mut self.path_input),
        }
    }

    pub(crate) fn set_result_metrics(&mut self, total_lines: usize, view_height: u16) {
        let total_lines = total_lines.max(1);
        self.result_total_lines = total_lines;
        self.result_view_height = view_height;
        self.result_max_scroll = total_lines.saturating_sub(view_height as usize);
        if self.result_scroll() > self.result_max_scroll {
            self.set_result_scroll(self.result_max_scroll);
        }
    }

    pub(crate) fn result_scroll(&self) -> usize {
        usize::from(self.view.results.scroll)
    }

    fn set_result_scroll(&mut self, scroll: usize) {
        self.view.results.scroll = u16::try_from(scroll).unwrap_or(u16::MAX);
    }

    pub(crate) fn scroll_down(&mut self, lines: usize) {
        let target = (self.result_scroll() + lines).min(self.result_max_scroll);
        self.set_result_scroll(target);
        self.pending_g = false;
    }

    pub(crate) fn scroll_up(&mut self, lines: usize) {
        let target = self.result_scroll().saturating_sub(lines);
        self.set_result_scroll(target);
        self.pending_g = false;
    }

    pub(crate) fn scroll_to_top(&mut self) {
        self.set_result_scroll(0);
        self.pending_g = false;
    }

    pub(crate) fn scroll_to_bottom(&mut self) {
        self.set_result_scroll(self.result_max_scroll);
        self.pending_g = false;
    }

    pub(crate) fn page_size(&self) -> usize {
        let height = self.result_view_height.max(1) as usize;
        height.saturating_sub(1).max(1)
    }

    pub(crate) fn half_page_size(&self) -> usize {
        let height = self.result_view_height.max(1) as usize;
        (height / 2).max(1)
    }
}
