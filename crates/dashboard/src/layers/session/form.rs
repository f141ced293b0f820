use protocol::Message;

use super::Alert;

pub(crate) const DEFAULT_SENDER: &str = "Them";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct MessageRow {
    pub(crate) sender: String,
    pub(crate) text: String,
}

/// Editable conversation rows. Never holds fewer than one row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct MessageForm {
    rows: Vec<MessageRow>,
    pub(crate) selected: usize,
    /// Hidden while a screenshot is attached.
    pub(crate) inputs_visible: bool,
}

impl Default for MessageForm {
    fn default() -> Self {
        Self {
            rows: vec![MessageRow {
                sender: DEFAULT_SENDER.to_string(),
                text: String::new(),
            }],
            selected: 0,
            inputs_visible: true,
        }
    }
}

impl MessageForm {
    pub(crate) fn rows(&self) -> &[MessageRow] {
        &self.rows
    }

    pub(crate) fn add_row(&mut self, sender: impl Into<String>, text: impl Into<String>) {
        self.rows.push(MessageRow {
            sender: sender.into(),
            text: text.into(),
        });
        self.selected = self.rows.len() - 1;
    }

    pub(crate) fn remove_row(&mut self, index: usize) -> Result<(), Alert> {
        if self.rows.len() <= 1 {
            return Err(Alert::LastMessage);
        }
        if index >= self.rows.len() {
            return Ok(());
        }
        self.rows.remove(index);
        self.selected = self.selected.min(self.rows.len() - 1);
        Ok(())
    }

    /// Swaps in a whole conversation; an empty one leaves a single blank row.
    pub(crate) fn replace_all(&mut self, messages: Vec<Message>) {
        self.rows = messages
            .into_iter()
            .map(|message| MessageRow {
                sender: message.sender,
                text: message.text,
            })
            .collect();
        if self.rows.is_empty() {
            self.rows.push(MessageRow::default());
        }
        self.selected = 0;
    }

    pub(crate) fn selected_row_mut(&mut self) -> &mut MessageRow {
        let index = self.selected.min(self.rows.len() - 1);
        &mut self.rows[index]
    }

    pub(crate) fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.rows.len();
    }

    pub(crate) fn select_prev(&mut self) {
        if self.selected == 0 {
            self.selected = self.rows.len() - 1;
        } else {
            self.selected -= 1;
        }
    }

    /// Rows whose text is not blank, in order, exactly as typed.
    pub(crate) fn collect_messages(&self) -> Vec<Message> {
        self.rows
            .iter()
            .filter(|row| !row.text.trim().is_empty())
            .map(|row| Message::new(row.sender.clone(), row.text.clone()))
            .collect()
    }

    /// `sender: text` for every row, blank ones included.
    pub(crate) fn context(&self) -> String {
        self.rows
            .iter()
            .map(|row| format!("{}: {}", row.sender, row.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_row_cannot_be_removed() {
        let mut form = MessageForm::default();
        assert_eq!(form.remove_row(0), Err(Alert::LastMessage));
        assert_eq!(form.rows().len(), 1);
    }

    #[test]
    fn removal_keeps_selection_in_range() {
        let mut form = MessageForm::default();
        form.add_row("Her", "hi");
        form.add_row("Me", "hello");
        assert_eq!(form.selected, 2);
        form.remove_row(2).expect("remove");
        assert_eq!(form.rows().len(), 2);
        assert_eq!(form.selected, 1);
    }

    #[test]
    fn blank_rows_are_not_submitted() {
        let mut form = MessageForm::default();
        form.add_row("Her", "   ");
        form.add_row("Her", "Send me $500 gift card urgently");
        assert_eq!(
            form.collect_messages(),
            vec![Message::new("Her", "Send me $500 gift card urgently")]
        );
    }

    #[test]
    fn replacing_with_nothing_keeps_one_row() {
        let mut form = MessageForm::default();
        form.add_row("Her", "hi");
        form.replace_all(Vec::new());
        assert_eq!(form.rows().len(), 1);
        assert!(form.collect_messages().is_empty());
    }

    #[test]
    fn context_includes_every_row() {
        let mut form = MessageForm::default();
        form.selected_row_mut().text = "hey".to_string();
        form.add_row("Me", "");
        assert_eq!(form.context(), "Them: hey\nMe: ");
    }
}
