//! Terminal lifecycle and the synchronous event loop.
//!
//! Every polled event runs edit → tokenize → parse → complete → render to
//! completion before the next event is read; there is no asynchrony and no
//! cancellation in the pipeline.

use std::io::stdout;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::content::Content;
use crate::parser::Parser;
use crate::ui::render;

use super::input::handle_event;
use super::{update, App, Model};

impl App {
    /// Load the file, take over the terminal and run until quit.
    pub fn run(&self) -> Result<()> {
        // Environment failures surface before the main loop starts.
        let content = Content::from_file(&self.file_path)?;
        let mut terminal = ratatui::try_init().context("Failed to initialize terminal")?;

        let result = self.session(&mut terminal, content);

        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();
        result
    }

    fn session(&self, terminal: &mut DefaultTerminal, content: Content) -> Result<()> {
        execute!(stdout(), EnableMouseCapture).context("Failed to enable mouse capture")?;
        let size = terminal.size().context("Failed to query terminal size")?;
        let parser = Parser::new(
            self.meta.clone(),
            self.inputs.clone(),
            self.operations.clone(),
        );
        let mut model = Model::new(content, parser, self.theme, (size.width, size.height));
        self.event_loop(terminal, &mut model)
    }

    fn event_loop(&self, terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let mut needs_render = true;
        loop {
            if needs_render {
                terminal.draw(|frame| render::render(model, frame))?;
                needs_render = false;
            }

            if event::poll(Duration::from_millis(250))? {
                if self.step(model, &event::read()?) {
                    needs_render = true;
                }
                // Coalesce key-repeat bursts into a single render.
                while event::poll(Duration::from_millis(0))? {
                    if self.step(model, &event::read()?) {
                        needs_render = true;
                    }
                }
            }

            if model.should_quit {
                tracing::debug!("quit requested");
                return Ok(());
            }
        }
    }

    fn step(&self, model: &mut Model, event: &event::Event) -> bool {
        let Some(msg) = handle_event(event) else {
            return false;
        };
        tracing::trace!(?msg, "event");
        *model = update(std::mem::take(model), msg);
        true
    }
}
