//! Image lifecycle controller
//!
//! An [`EditSession`] owns everything one editing session needs: the original
//! upload, the image currently displayed, the prompt, the error banner and
//! the mask overlay. Views only feed it pointer coordinates and button
//! presses.
//!
//! ```text
//! Empty --upload--> HasImage --begin_edit--> Editing --complete_edit--> HasImage
//!   ^                  |                        |
//!   +------reset-------+------------------------+
//! ```
//!
//! Failure policy is deliberately asymmetric: an image that cannot be
//! decoded ends the session, while a failed edit request only raises the
//! error banner and keeps the last good image.

use crate::{
    client::ImageEditBackend,
    config::EditorConfig,
    error::{EditError, Result},
    mask::{LetterboxProjection, MaskRenderer, StrokeTarget},
    presets::Feature,
    services::ImageIOService,
    types::{EditImage, EditRequest, Mask, Point},
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Shown when an edit is requested before any upload
pub const NO_IMAGE_MESSAGE: &str = "Please upload an image first.";
/// Shown when an edit is requested with a blank prompt
pub const EMPTY_PROMPT_MESSAGE: &str = "Please describe the change you want to make.";

/// Lifecycle state of a session. The error banner is tracked separately and
/// can accompany any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No image loaded
    Empty,
    /// An image is displayed and can be edited
    HasImage,
    /// An edit request is in flight
    Editing,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::HasImage => write!(f, "has-image"),
            Self::Editing => write!(f, "editing"),
        }
    }
}

/// Editing session: image lifecycle, prompt, error banner and mask overlay
pub struct EditSession {
    id: Uuid,
    backend: Arc<dyn ImageEditBackend>,
    config: EditorConfig,
    state: SessionState,
    original: Option<Arc<EditImage>>,
    current: Option<Arc<EditImage>>,
    prompt: String,
    error: Option<String>,
    active_prompt: Option<String>,
    renderer: MaskRenderer,
    projection: Option<LetterboxProjection>,
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("id", &self.id)
            .field("backend", &self.backend.name())
            .field("state", &self.state)
            .field("current", &self.current.as_ref().map(|i| i.id()))
            .field("prompt", &self.prompt)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl EditSession {
    /// Create an empty session that sends edits to `backend`
    #[must_use]
    pub fn new(backend: Arc<dyn ImageEditBackend>, config: EditorConfig) -> Self {
        let renderer = MaskRenderer::new(config.brush_size);
        Self {
            id: Uuid::new_v4(),
            backend,
            config,
            state: SessionState::Empty,
            original: None,
            current: None,
            prompt: String::new(),
            error: None,
            active_prompt: None,
            renderer,
            projection: None,
        }
    }

    /// Correlation id used in logs
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.state == SessionState::Editing
    }

    /// The image as first uploaded
    #[must_use]
    pub fn original(&self) -> Option<&Arc<EditImage>> {
        self.original.as_ref()
    }

    /// The image currently displayed
    #[must_use]
    pub fn current(&self) -> Option<&Arc<EditImage>> {
        self.current.as_ref()
    }

    /// True once an edit has been committed since the last upload.
    ///
    /// Compares image handles, not pixels.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        match (&self.original, &self.current) {
            (Some(original), Some(current)) => !Arc::ptr_eq(original, current),
            (None, None) => false,
            _ => true,
        }
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt<S: Into<String>>(&mut self, prompt: S) {
        self.prompt = prompt.into();
    }

    /// Fill the prompt from a catalog entry
    pub fn select_preset(&mut self, feature: &Feature) {
        debug!(session = %self.id, feature = feature.title, "preset selected");
        self.prompt = feature.prompt.to_string();
    }

    /// Message for the error banner, if any
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Prompt of the request in flight, for "Applying: …" feedback
    #[must_use]
    pub fn active_prompt(&self) -> Option<&str> {
        self.active_prompt.as_deref()
    }

    #[must_use]
    pub fn renderer(&self) -> &MaskRenderer {
        &self.renderer
    }

    #[must_use]
    pub fn brush_size(&self) -> u32 {
        self.renderer.brush_size()
    }

    /// Current canvas-to-image mapping, once laid out
    #[must_use]
    pub fn projection(&self) -> Option<&LetterboxProjection> {
        self.projection.as_ref()
    }

    /// Load a new image from encoded bytes.
    ///
    /// Replaces both the original and the current image, clears prompt,
    /// error and mask. If the bytes cannot be decoded the whole session is
    /// reset and the decode message is shown.
    ///
    /// # Errors
    /// - [`EditError::EditInFlight`] while a request is pending
    /// - [`EditError::Decode`] for unusable image data
    #[instrument(skip(self, bytes), fields(session = %self.id))]
    pub fn upload<B: Into<Vec<u8>>>(&mut self, bytes: B, name: &str) -> Result<()> {
        if self.is_editing() {
            return Err(EditError::EditInFlight);
        }

        match ImageIOService::decode(bytes, name) {
            Ok(image) => {
                self.accept_upload(image);
                Ok(())
            },
            Err(err) => {
                self.fail_session(&err);
                Err(err)
            },
        }
    }

    /// Read an image file and load it like [`upload`](Self::upload)
    ///
    /// # Errors
    /// - [`EditError::EditInFlight`] while a request is pending
    /// - [`EditError::Io`] if the file cannot be read (session untouched)
    /// - [`EditError::Decode`] for unusable image data (session reset)
    #[instrument(skip(self, path), fields(session = %self.id))]
    pub fn upload_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        if self.is_editing() {
            return Err(EditError::EditInFlight);
        }

        match ImageIOService::load_image(path) {
            Ok(image) => {
                self.accept_upload(image);
                Ok(())
            },
            Err(err) if err.is_session_fatal() => {
                self.fail_session(&err);
                Err(err)
            },
            Err(err) => {
                warn!(session = %self.id, error = %err, "image file not loaded");
                Err(err)
            },
        }
    }

    fn accept_upload(&mut self, image: EditImage) {
        info!(
            session = %self.id,
            name = image.name(),
            width = image.width(),
            height = image.height(),
            "image uploaded"
        );

        let image = Arc::new(image);
        self.original = Some(Arc::clone(&image));
        self.current = Some(image);
        self.prompt.clear();
        self.error = None;
        self.active_prompt = None;
        self.state = SessionState::HasImage;
        self.layout_default();
    }

    /// Size the overlay for a canvas of `width` x `height` and recompute the
    /// letterbox projection. Any painted mask is discarded.
    ///
    /// Returns `None` (and leaves the overlay unavailable) without an image
    /// or for a zero-sized canvas.
    pub fn layout(&mut self, width: u32, height: u32) -> Option<LetterboxProjection> {
        let image = self.current.as_ref()?;
        self.projection = LetterboxProjection::fit(image.dimensions(), (width, height));
        match self.projection {
            Some(_) => self.renderer.resize(width, height),
            None => self.renderer.detach(),
        }
        self.projection
    }

    fn layout_default(&mut self) {
        let canvas = self
            .config
            .canvas
            .map(|c| (c.width, c.height))
            .or_else(|| self.current.as_ref().map(|i| i.dimensions()));
        if let Some((width, height)) = canvas {
            self.layout(width, height);
        }
    }

    /// Erase the painted selection
    pub fn clear_mask(&mut self) {
        self.renderer.clear();
    }

    /// Mask in canvas space, `None` if nothing is painted
    #[must_use]
    pub fn export_mask(&self) -> Option<Mask> {
        self.renderer.export_mask()
    }

    /// Mask resampled to the current image's resolution, `None` if nothing
    /// selected falls on the image
    #[must_use]
    pub fn mask_for_request(&self) -> Option<Mask> {
        let mask = self.renderer.export_mask()?;
        self.projection.as_ref()?.project_mask(&mask)
    }

    /// Validate and start an edit, entering [`SessionState::Editing`].
    ///
    /// Input problems are shown in the error banner and no request is
    /// produced.
    ///
    /// # Errors
    /// - [`EditError::EditInFlight`] while another request is pending
    /// - [`EditError::InvalidInput`] without an image or with a blank prompt
    pub fn begin_edit(&mut self) -> Result<EditRequest> {
        if self.is_editing() {
            return Err(EditError::EditInFlight);
        }

        let Some(image) = self.current.clone() else {
            return Err(self.reject_input(NO_IMAGE_MESSAGE));
        };
        if self.prompt.trim().is_empty() {
            return Err(self.reject_input(EMPTY_PROMPT_MESSAGE));
        }

        let mask = self.mask_for_request();
        let request = EditRequest::new(image, self.prompt.clone(), mask)?;

        self.error = None;
        self.active_prompt = Some(self.prompt.clone());
        self.state = SessionState::Editing;
        self.renderer.end_stroke();

        info!(
            session = %self.id,
            backend = self.backend.name(),
            masked = request.mask().is_some(),
            "edit started"
        );
        Ok(request)
    }

    fn reject_input(&mut self, message: &str) -> EditError {
        debug!(session = %self.id, message, "edit rejected before sending");
        self.error = Some(message.to_string());
        EditError::invalid_input(message)
    }

    /// Apply the outcome of the request started by [`begin_edit`](Self::begin_edit).
    ///
    /// - success: the result becomes the current image, the original is
    ///   kept, the mask is cleared
    /// - remote failure: the error is shown, the current image stays
    /// - undecodable result: the session is reset and the error shown
    ///
    /// Returns the outcome so callers can react to it as well.
    ///
    /// # Errors
    /// - [`EditError::InvalidState`] if no edit is in flight (the outcome is
    ///   discarded, e.g. after a reset)
    /// - the failure carried by `outcome`
    pub fn complete_edit(&mut self, outcome: Result<EditImage>) -> Result<()> {
        if !self.is_editing() {
            warn!(session = %self.id, state = %self.state, "discarding edit result: no edit in flight");
            return Err(EditError::invalid_state(format!(
                "no edit in flight (session is {})",
                self.state
            )));
        }
        self.active_prompt = None;

        match outcome {
            Ok(image) => {
                info!(
                    session = %self.id,
                    width = image.width(),
                    height = image.height(),
                    "edit committed"
                );
                let previous = self.current.replace(Arc::new(image));
                self.state = SessionState::HasImage;
                let canvas_changed = previous.as_ref().map(|p| p.dimensions())
                    != self.current.as_ref().map(|c| c.dimensions());
                if canvas_changed && self.config.canvas.is_none() {
                    self.layout_default();
                } else {
                    if let (Some(projection), Some(current)) = (self.projection, self.current.as_ref()) {
                        self.projection =
                            LetterboxProjection::fit(current.dimensions(), projection.canvas_size());
                    }
                    self.renderer.clear();
                }
                Ok(())
            },
            Err(err) if err.is_session_fatal() => {
                warn!(session = %self.id, error = %err, "edit result unusable, resetting session");
                self.fail_session(&err);
                Err(err)
            },
            Err(err) => {
                warn!(session = %self.id, error = %err, "edit failed, keeping current image");
                self.state = SessionState::HasImage;
                self.error = Some(err.to_string());
                Err(err)
            },
        }
    }

    /// Run one complete edit: validate, send to the backend, commit.
    ///
    /// If the returned future is dropped before it finishes, the session
    /// goes back to [`SessionState::HasImage`] with the current image kept.
    ///
    /// # Errors
    /// Same as [`begin_edit`](Self::begin_edit) and
    /// [`complete_edit`](Self::complete_edit)
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn request_edit(&mut self) -> Result<()> {
        let request = self.begin_edit()?;
        let backend = Arc::clone(&self.backend);
        let guard = InFlightEdit { session: Some(self) };
        let outcome = backend.submit(&request).await;
        drop(request);
        guard.finish(outcome)
    }

    /// Abandon the edit in flight without applying any result.
    ///
    /// The current image, prompt and mask stay as they were. Returns `false`
    /// if no edit was in flight.
    pub fn cancel_edit(&mut self) -> bool {
        if !self.is_editing() {
            return false;
        }
        warn!(session = %self.id, "edit abandoned before completion");
        self.active_prompt = None;
        self.state = SessionState::HasImage;
        true
    }

    /// Drop all images and return to [`SessionState::Empty`]
    pub fn reset(&mut self) {
        debug!(session = %self.id, state = %self.state, "session reset");
        self.original = None;
        self.current = None;
        self.prompt.clear();
        self.error = None;
        self.active_prompt = None;
        self.projection = None;
        self.renderer.detach();
        self.state = SessionState::Empty;
    }

    fn fail_session(&mut self, err: &EditError) {
        self.reset();
        self.error = Some(err.to_string());
    }

    /// Encode the displayed image in the configured download format
    ///
    /// # Errors
    /// - [`EditError::InvalidState`] without an image
    /// - encoding failures
    pub fn download_bytes(&self) -> Result<Vec<u8>> {
        let current = self
            .current
            .as_ref()
            .ok_or_else(|| EditError::invalid_state("no image to download"))?;
        ImageIOService::encode(current.image(), self.config.output_format)
    }

    /// Save the displayed image to `path`
    ///
    /// # Errors
    /// - [`EditError::InvalidState`] without an image
    /// - file system or encoding failures
    pub fn download<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let current = self
            .current
            .as_ref()
            .ok_or_else(|| EditError::invalid_state("no image to download"))?;
        ImageIOService::save_image(current.image(), path, self.config.output_format)
    }

    fn accepts_strokes(&self) -> bool {
        self.state == SessionState::HasImage
    }
}

impl StrokeTarget for EditSession {
    fn begin_stroke(&mut self, point: Point) {
        if self.accepts_strokes() {
            self.renderer.begin_stroke(point);
        }
    }

    fn extend_stroke(&mut self, point: Point) {
        if self.accepts_strokes() {
            self.renderer.extend_stroke(point);
        }
    }

    fn end_stroke(&mut self) {
        self.renderer.end_stroke();
    }

    fn set_brush_size(&mut self, diameter: u32) -> u32 {
        self.renderer.set_brush_size(diameter)
    }
}

/// Puts the session back into `HasImage` if a request is dropped mid-flight
struct InFlightEdit<'a> {
    session: Option<&'a mut EditSession>,
}

impl InFlightEdit<'_> {
    fn finish(mut self, outcome: Result<EditImage>) -> Result<()> {
        match self.session.take() {
            Some(session) => session.complete_edit(outcome),
            None => Err(EditError::invalid_state("edit already finished")),
        }
    }
}

impl Drop for InFlightEdit<'_> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.cancel_edit();
        }
    }
}
