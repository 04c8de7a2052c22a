use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Rect},
    widgets::Row,
    Frame,
};

use super::{status_cell, HelpBinding, ListView, Panel, PanelEvent, LIST_BINDINGS};
use crate::action::Loaded;
use crate::command::ApiCall;
use crate::config::Theme;
use crate::forge::SiteCommand;
use crate::intent::{InputPurpose, SubView};
use crate::util::short_timestamp;

/// History of ad-hoc commands run on a site.
pub struct CommandsPanel {
    server_id: u64,
    site_id: u64,
    list: ListView<SiteCommand>,
}

impl CommandsPanel {
    pub fn new(server_id: u64, site_id: u64) -> Self {
        Self {
            server_id,
            site_id,
            list: ListView::new(),
        }
    }
}

impl Panel for CommandsPanel {
    fn title(&self) -> String {
        "Commands".to_string()
    }

    fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        if self.list.handle_nav(&key) {
            return PanelEvent::Handled;
        }
        match key.code {
            KeyCode::Char('c') => PanelEvent::Prompt(InputPurpose::RunCommand {
                server_id: self.server_id,
                site_id: self.site_id,
            }),
            KeyCode::Enter => match self.list.selected() {
                Some(cmd) => PanelEvent::Open(SubView::CommandDetail { command_id: cmd.id }),
                None => PanelEvent::Handled,
            },
            _ => PanelEvent::Ignored,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let rows: Vec<Row> = self
            .list
            .items()
            .iter()
            .map(|cmd| {
                Row::new(vec![
                    status_cell(theme, cmd.status.as_deref()),
                    cmd.command.as_str().into(),
                    cmd.user_name.as_deref().unwrap_or("-").into(),
                    cmd.created_at.as_deref().map(short_timestamp).unwrap_or_default().into(),
                ])
            })
            .collect();

        self.list.render(
            frame,
            area,
            focused,
            theme,
            "Commands",
            Row::new(vec!["Status", "Command", "User", "Created"]),
            rows,
            &[
                Constraint::Length(10),
                Constraint::Fill(1),
                Constraint::Length(14),
                Constraint::Length(16),
            ],
            "No commands have been run",
        );
    }

    fn help_bindings(&self) -> Vec<HelpBinding> {
        let mut bindings = LIST_BINDINGS.to_vec();
        bindings.extend([
            HelpBinding::new("c", "run command"),
            HelpBinding::new("enter", "command output"),
        ]);
        bindings
    }

    fn load(&mut self) -> Option<ApiCall> {
        self.list.set_loading(true);
        Some(ApiCall::ListCommands {
            server_id: self.server_id,
            site_id: self.site_id,
        })
    }

    fn apply(&mut self, loaded: &Loaded) -> bool {
        match loaded {
            Loaded::Commands { site_id, commands } if *site_id == self.site_id => {
                self.list.set_items(commands.clone());
                true
            }
            _ => false,
        }
    }

    fn stop_loading(&mut self) {
        self.list.set_loading(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_enter_opens_command_detail() {
        let mut panel = CommandsPanel::new(1, 2);
        assert_eq!(panel.handle_key(KeyEvent::from(KeyCode::Enter)), PanelEvent::Handled);
        panel.apply(&Loaded::Commands {
            site_id: 2,
            commands: vec![SiteCommand {
                id: 5,
                command: "php artisan about".to_string(),
                ..Default::default()
            }],
        });
        assert_eq!(
            panel.handle_key(KeyEvent::from(KeyCode::Enter)),
            PanelEvent::Open(SubView::CommandDetail { command_id: 5 })
        );
        assert_eq!(
            panel.handle_key(KeyEvent::from(KeyCode::Char('c'))),
            PanelEvent::Prompt(InputPurpose::RunCommand { server_id: 1, site_id: 2 })
        );
    }
}
