//! Application state and the mutation, render, save cycle.

use crate::confirm::Confirm;
use crate::event_handler::{EventHandler, Response};
use canvashub_core::persistence::{export_artifact, load_artifact};
use canvashub_core::store::BoardResult;
use canvashub_core::{
    ArtifactError, Board, BoardError, Config, EnvelopeId, Ghost, ImportError, ImportReport, Instant, LaunchError,
    LinkLauncher, LinkOpener, Persistence, PointerEvent, Storage, StorageError, TagId, import_legacy,
};
use canvashub_render::{Frame, Reconciler, ViewTransforms};
use kurbo::{Point, Size, Vec2};
use std::sync::Arc;
use thiserror::Error;

/// Offset from the viewport centre to a new envelope's corner, in world units.
const NEW_ENVELOPE_OFFSET: Vec2 = Vec2::new(140.0, 100.0);

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error("Export failed: {0}")]
    Export(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// The Canvas Hub application.
pub struct App<S: Storage> {
    board: Board,
    nodes: Reconciler,
    persistence: Persistence<S>,
    events: EventHandler,
    launcher: LinkLauncher,
    config: Config,
    viewport: Size,
}

impl<S: Storage> App<S> {
    /// Restore the saved board (or the welcome board) and render it.
    pub fn new(storage: Arc<S>, viewport: Size) -> Self {
        let persistence = Persistence::new(storage);
        let board = persistence.load_or_default(viewport.width);
        let config = persistence.read_config();
        let mut app = Self {
            board,
            nodes: Reconciler::new(),
            persistence,
            events: EventHandler::new(),
            launcher: LinkLauncher::new(),
            config,
            viewport,
        };
        app.render();
        log::info!("Canvas Hub ready with {} envelopes", app.board.len());
        app
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn nodes(&self) -> &Reconciler {
        &self.nodes
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn ghost(&self) -> Option<&Ghost> {
        self.events.ghost()
    }

    pub fn view(&self) -> ViewTransforms {
        ViewTransforms::from_camera(&self.board.camera)
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Sync visual nodes with the board, forcing ids marked dirty.
    pub fn render(&mut self) -> Frame {
        let forced = self.board.take_dirty();
        self.nodes.render(&self.board, &forced)
    }

    /// Render, then persist. Save failures are returned after the render.
    fn commit(&mut self) -> AppResult<Frame> {
        let frame = self.render();
        self.persistence.save(&self.board)?;
        Ok(frame)
    }

    /// Write the board now.
    pub fn save(&mut self) -> AppResult<()> {
        Ok(self.persistence.save(&self.board)?)
    }

    /// Route a pointer event.
    pub fn handle_event(&mut self, event: PointerEvent, now: Instant) -> AppResult<Response> {
        let response = self.events.handle(&mut self.board, &mut self.nodes, event);
        match response {
            Response::Ignored | Response::Redraw => {}
            Response::Render => {
                self.render();
            }
            Response::Commit => {
                self.commit()?;
            }
            Response::Zoomed => self.persistence.schedule_save(now),
        }
        Ok(response)
    }

    /// Advance timers: flush a due zoom save and open due team links.
    ///
    /// Returns the number of links opened.
    pub fn tick(&mut self, now: Instant, opener: &mut dyn LinkOpener) -> AppResult<usize> {
        self.persistence.poll(now, &self.board)?;
        Ok(self.launcher.open_due(now, opener))
    }

    /// When the next queued team link is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.launcher.next_due()
    }

    /// Apply a board mutation, then render and save.
    pub fn edit<T>(&mut self, f: impl FnOnce(&mut Board) -> BoardResult<T>) -> AppResult<T> {
        let value = f(&mut self.board)?;
        self.commit()?;
        Ok(value)
    }

    /// Create an envelope centred in the viewport, or at `position` in world units.
    pub fn create_envelope(&mut self, position: Option<Point>) -> AppResult<EnvelopeId> {
        let position = position.unwrap_or_else(|| {
            let centre = Point::new(self.viewport.width / 2.0, self.viewport.height / 2.0);
            self.board.camera.screen_to_world(centre) - NEW_ENVELOPE_OFFSET
        });
        let id = self.board.create_envelope(position).id.clone();
        self.commit()?;
        Ok(id)
    }

    /// Delete an envelope after confirmation. Returns false when declined or unknown.
    pub fn delete_envelope(&mut self, id: &str, confirm: &mut dyn Confirm) -> AppResult<bool> {
        let Some(env) = self.board.envelope(id) else {
            return Ok(false);
        };
        if !confirm.confirm(&format!("Delete envelope \"{}\"?", env.name)) {
            return Ok(false);
        }
        self.board.delete_envelope(id);
        self.launcher.cancel_for(id);
        self.commit()?;
        Ok(true)
    }

    /// Delete a tag after confirmation. Returns false when declined.
    pub fn delete_tag(&mut self, envelope: &str, tag: TagId, confirm: &mut dyn Confirm) -> AppResult<bool> {
        let env = self
            .board
            .envelope(envelope)
            .ok_or_else(|| BoardError::EnvelopeNotFound(envelope.to_string()))?;
        if env.tag(tag).is_none() {
            return Err(BoardError::TagNotFound {
                envelope: envelope.to_string(),
                tag,
            }
            .into());
        }
        if !confirm.confirm("Delete tag?") {
            return Ok(false);
        }
        self.edit(|b| b.delete_tag(envelope, tag))?;
        Ok(true)
    }

    pub fn toggle_open(&mut self, id: &str) -> AppResult<bool> {
        self.edit(|b| b.toggle_open(id))
    }

    pub fn set_color(&mut self, id: &str, color: &str) -> AppResult<()> {
        self.edit(|b| b.set_color(id, color))
    }

    pub fn add_tag(&mut self, id: &str) -> AppResult<TagId> {
        self.edit(|b| b.add_tag(id, "", canvashub_core::envelope::DEFAULT_TAG_IMAGE))
    }

    pub fn reset_camera(&mut self) -> AppResult<()> {
        self.board.reset_camera(self.viewport.width);
        self.save()
    }

    /// Queue the envelope's selected team links, spaced by the configured delay.
    pub fn open_team_links(&mut self, id: &str, now: Instant) -> AppResult<usize> {
        let env = self
            .board
            .envelope(id)
            .ok_or_else(|| BoardError::EnvelopeNotFound(id.to_string()))?;
        Ok(self.launcher.schedule(env, now, self.config.delay())?)
    }

    /// Append envelopes from a legacy groups file.
    pub fn import_legacy(&mut self, text: &str) -> AppResult<ImportReport> {
        let report = import_legacy(&mut self.board, text)?;
        self.commit()?;
        Ok(report)
    }

    /// Serialize the board as a data script.
    pub fn export(&self) -> AppResult<Vec<u8>> {
        Ok(export_artifact(&self.board)?)
    }

    /// Replace the board with one read from a data script.
    pub fn load_data(&mut self, bytes: &[u8]) -> AppResult<()> {
        let mut board = load_artifact(bytes, self.board.camera)?;
        // Retained nodes may share ids with the new envelopes but not their content.
        let ids: Vec<EnvelopeId> = board.envelopes.iter().map(|e| e.id.clone()).collect();
        for id in &ids {
            board.mark_dirty(id);
        }
        self.launcher = LinkLauncher::new();
        self.board = board;
        self.commit()?;
        log::info!("Loaded data file with {} envelopes", self.board.len());
        Ok(())
    }

    /// Store a delay typed by the user; invalid input falls back to the default.
    pub fn write_config(&mut self, delay_input: &str) -> AppResult<Config> {
        self.config.delay = Config::delay_from_input(delay_input);
        self.persistence.write_config(&self.config)?;
        Ok(self.config)
    }
}
