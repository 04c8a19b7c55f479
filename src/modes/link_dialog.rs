//! Link insertion dialog used by the rich toolbar

use crate::keymap::KeyCode;

/// Which input has focus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkField {
    #[default]
    Url,
    Title,
}

/// What a key press did to the dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    /// Still open
    Pending,
    Confirmed { url: String, title: Option<String> },
    Cancelled,
}

/// `{url, title}` form. The url is required; the title is the link text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkDialog {
    pub url: String,
    pub title: String,
    pub focus: LinkField,
}

impl LinkDialog {
    /// Open prefilled from the selection text and any link already under it
    pub fn open(selected_text: &str, existing: Option<(String, Option<String>)>) -> Self {
        let (url, title) = match existing {
            Some((href, title)) => (href, title.unwrap_or_else(|| selected_text.to_string())),
            None => (String::new(), selected_text.to_string()),
        };
        Self {
            url,
            title,
            focus: LinkField::Url,
        }
    }

    pub fn can_confirm(&self) -> bool {
        !self.url.trim().is_empty()
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            LinkField::Url => &mut self.url,
            LinkField::Title => &mut self.title,
        }
    }

    pub fn insert_text(&mut self, text: &str) {
        // Both fields are single-line
        let clean: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
        self.field_mut().push_str(&clean);
    }

    pub fn delete_backward(&mut self) {
        self.field_mut().pop();
    }

    /// Enter confirms when the url is filled, Escape cancels, Tab moves focus
    pub fn on_key(&mut self, key: KeyCode) -> DialogOutcome {
        match key {
            KeyCode::Enter => self.confirm(),
            KeyCode::Escape => DialogOutcome::Cancelled,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    LinkField::Url => LinkField::Title,
                    LinkField::Title => LinkField::Url,
                };
                DialogOutcome::Pending
            }
            KeyCode::Backspace => {
                self.delete_backward();
                DialogOutcome::Pending
            }
            _ => DialogOutcome::Pending,
        }
    }

    pub fn confirm(&self) -> DialogOutcome {
        if !self.can_confirm() {
            tracing::debug!("link dialog: url required");
            return DialogOutcome::Pending;
        }
        let title = self.title.trim();
        DialogOutcome::Confirmed {
            url: self.url.trim().to_string(),
            title: (!title.is_empty()).then(|| title.to_string()),
        }
    }
}
