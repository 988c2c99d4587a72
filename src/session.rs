//! Turns one line of user input into bot replies.

use std::sync::Arc;

use menu_render_backend::FontLibrary;

use crate::command::{accepted_reply, ready_reply, MenuCommand, REPLY_PREFIX, WELCOME_TEXT};
use crate::menu_data::MenuTable;
use crate::render::{render_menu, render_menu_with_fonts, MenuRenderError};
use crate::settings::AppConfig;

/// Loaded table and settings shared across commands.
#[derive(Debug)]
pub struct MenuSession {
    table: MenuTable,
    config: AppConfig,
    fonts: Option<Arc<FontLibrary>>,
}

impl MenuSession {
    pub fn new(table: MenuTable, config: AppConfig) -> Self {
        Self {
            table,
            config,
            fonts: None,
        }
    }

    /// Reuse an already loaded font library for every render.
    pub fn with_fonts(mut self, fonts: Arc<FontLibrary>) -> Self {
        self.fonts = Some(fonts);
        self
    }

    pub fn table(&self) -> &MenuTable {
        &self.table
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Replies, in order, to a single input line.
    ///
    /// Render warnings go to the log only; [`crate::render_menu`] returns them
    /// to API callers.
    pub fn respond(&self, input: &str) -> Vec<String> {
        let command = match MenuCommand::parse(input).and_then(|cmd| cmd.validate(&self.table)) {
            Ok(command) => command,
            Err(err) => return vec![err.reply()],
        };
        match command {
            MenuCommand::Start => vec![WELCOME_TEXT.to_string()],
            MenuCommand::Menu(dishes) => {
                let mut replies = vec![accepted_reply(&dishes)];
                match self.render(&dishes) {
                    Ok(outcome) => replies.push(ready_reply(&outcome.output, outcome.format)),
                    Err(err) => {
                        log::error!("render failed ({}): {}", err.kind(), err);
                        replies.push(format!("{REPLY_PREFIX}Error! {err}"));
                    }
                }
                replies
            }
        }
    }

    fn render(&self, dishes: &[String]) -> Result<crate::RenderOutcome, MenuRenderError> {
        match &self.fonts {
            Some(fonts) => {
                render_menu_with_fonts(dishes, &self.table, &self.config, Arc::clone(fonts))
            }
            None => render_menu(dishes, &self.table, &self.config),
        }
    }
}
