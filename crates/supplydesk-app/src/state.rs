// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ScreenKind;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Query,
    SaveView,
}

impl PromptKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Query => "search",
            Self::SaveView => "save view as",
        }
    }
}

/// One-line text input shown under the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub active_screen: ScreenKind,
    pub show_help: bool,
    pub prompt: Option<Prompt>,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            active_screen: ScreenKind::Alerts,
            show_help: false,
            prompt: None,
            status_line: None,
        }
    }
}

impl AppState {
    pub fn new(start: ScreenKind) -> Self {
        Self {
            active_screen: start,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextScreen,
    PrevScreen,
    GoToScreen(ScreenKind),
    ToggleHelp,
    /// Open a prompt seeded with `initial`.
    OpenPrompt {
        kind: PromptKind,
        initial: String,
    },
    PromptInput(char),
    PromptBackspace,
    SubmitPrompt,
    CancelPrompt,
    ShowStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ScreenChanged(ScreenKind),
    HelpToggled(bool),
    PromptOpened(PromptKind),
    PromptEdited { kind: PromptKind, input: String },
    PromptSubmitted { kind: PromptKind, input: String },
    PromptCancelled(PromptKind),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        trace!(?command, "app dispatch");
        match command {
            AppCommand::NextScreen => self.rotate_screen(1),
            AppCommand::PrevScreen => self.rotate_screen(-1),
            AppCommand::GoToScreen(kind) => {
                if self.active_screen == kind {
                    return Vec::new();
                }
                self.active_screen = kind;
                vec![AppEvent::ScreenChanged(kind)]
            }
            AppCommand::ToggleHelp => {
                self.show_help = !self.show_help;
                vec![AppEvent::HelpToggled(self.show_help)]
            }
            AppCommand::OpenPrompt { kind, initial } => {
                self.prompt = Some(Prompt {
                    kind,
                    input: initial,
                });
                vec![AppEvent::PromptOpened(kind)]
            }
            AppCommand::PromptInput(ch) => self.edit_prompt(|input| input.push(ch)),
            AppCommand::PromptBackspace => self.edit_prompt(|input| {
                input.pop();
            }),
            AppCommand::SubmitPrompt => match self.prompt.take() {
                Some(prompt) => vec![AppEvent::PromptSubmitted {
                    kind: prompt.kind,
                    input: prompt.input.trim().to_owned(),
                }],
                None => Vec::new(),
            },
            AppCommand::CancelPrompt => match self.prompt.take() {
                Some(prompt) => vec![
                    AppEvent::PromptCancelled(prompt.kind),
                    self.set_status("cancelled"),
                ],
                None => Vec::new(),
            },
            AppCommand::ShowStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_screen(&mut self, delta: isize) -> Vec<AppEvent> {
        let screens = ScreenKind::ALL;
        let current = screens
            .iter()
            .position(|screen| *screen == self.active_screen)
            .unwrap_or(0) as isize;
        let len = screens.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_screen = screens[next];
        vec![AppEvent::ScreenChanged(self.active_screen)]
    }

    fn edit_prompt(&mut self, edit: impl FnOnce(&mut String)) -> Vec<AppEvent> {
        match self.prompt.as_mut() {
            Some(prompt) => {
                edit(&mut prompt.input);
                vec![AppEvent::PromptEdited {
                    kind: prompt.kind,
                    input: prompt.input.clone(),
                }]
            }
            None => Vec::new(),
        }
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState, PromptKind};
    use crate::ScreenKind;

    #[test]
    fn screen_rotation_wraps_both_ways() {
        let mut state = AppState::new(ScreenKind::Inventory);

        let events = state.dispatch(AppCommand::NextScreen);
        assert_eq!(state.active_screen, ScreenKind::Alerts);
        assert_eq!(events, vec![AppEvent::ScreenChanged(ScreenKind::Alerts)]);

        state.dispatch(AppCommand::PrevScreen);
        assert_eq!(state.active_screen, ScreenKind::Inventory);
    }

    #[test]
    fn going_to_the_active_screen_is_quiet() {
        let mut state = AppState::default();
        assert!(state.dispatch(AppCommand::GoToScreen(ScreenKind::Alerts)).is_empty());
        assert_eq!(
            state.dispatch(AppCommand::GoToScreen(ScreenKind::Payments)),
            vec![AppEvent::ScreenChanged(ScreenKind::Payments)]
        );
    }

    #[test]
    fn prompt_edits_then_submits_trimmed_input() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::OpenPrompt {
            kind: PromptKind::SaveView,
            initial: String::new(),
        });
        for ch in "Late ".chars() {
            state.dispatch(AppCommand::PromptInput(ch));
        }
        state.dispatch(AppCommand::PromptInput('x'));
        let edited = state.dispatch(AppCommand::PromptBackspace);
        assert_eq!(
            edited,
            vec![AppEvent::PromptEdited {
                kind: PromptKind::SaveView,
                input: "Late ".to_owned(),
            }]
        );

        let submitted = state.dispatch(AppCommand::SubmitPrompt);
        assert_eq!(
            submitted,
            vec![AppEvent::PromptSubmitted {
                kind: PromptKind::SaveView,
                input: "Late".to_owned(),
            }]
        );
        assert!(state.prompt.is_none());
    }

    #[test]
    fn input_without_prompt_is_ignored() {
        let mut state = AppState::default();
        assert!(state.dispatch(AppCommand::PromptInput('a')).is_empty());
        assert!(state.dispatch(AppCommand::SubmitPrompt).is_empty());
    }

    #[test]
    fn cancelling_prompt_updates_status() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::OpenPrompt {
            kind: PromptKind::Query,
            initial: "acme".to_owned(),
        });
        let events = state.dispatch(AppCommand::CancelPrompt);
        assert_eq!(
            events,
            vec![
                AppEvent::PromptCancelled(PromptKind::Query),
                AppEvent::StatusUpdated("cancelled".to_owned()),
            ]
        );
        assert_eq!(state.status_line.as_deref(), Some("cancelled"));
    }

    #[test]
    fn help_toggles() {
        let mut state = AppState::default();
        assert_eq!(
            state.dispatch(AppCommand::ToggleHelp),
            vec![AppEvent::HelpToggled(true)]
        );
        state.dispatch(AppCommand::ToggleHelp);
        assert!(!state.show_help);
    }
}
