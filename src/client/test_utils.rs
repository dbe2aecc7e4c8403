//! Scripted edit backend for testing session behavior
//!
//! Lets tests drive the lifecycle without any network access and inspect
//! exactly what the session sent.

use super::ImageEditBackend;
use crate::{
    error::{EditError, RemoteFailure, Result},
    services::ImageIOService,
    types::{EditImage, EditRequest},
};
use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage};
use std::sync::{Arc, Mutex};

/// What the mock answers with
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Encoded image bytes, decoded like a real response
    Image(Vec<u8>),
    /// Remote failure
    Fail(RemoteFailure),
    /// Never answers
    Pending,
}

/// One observed `submit` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub prompt: String,
    pub mask_pixels: Option<usize>,
    pub mask_dimensions: Option<(u32, u32)>,
    pub image_dimensions: (u32, u32),
}

/// Mock backend that records calls and replays a fixed reply
#[derive(Debug, Clone)]
pub struct MockEditBackend {
    reply: MockReply,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockEditBackend {
    /// Backend that returns a solid-colour PNG of the given size
    #[must_use]
    pub fn returning_image(width: u32, height: u32) -> Self {
        Self::with_reply(MockReply::Image(solid_png(width, height, [200, 40, 40])))
    }

    /// Backend that fails every request
    #[must_use]
    pub fn failing(failure: RemoteFailure) -> Self {
        Self::with_reply(MockReply::Fail(failure))
    }

    #[must_use]
    pub fn with_reply(reply: MockReply) -> Self {
        Self {
            reply,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Calls observed so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageEditBackend for MockEditBackend {
    async fn submit(&self, request: &EditRequest) -> Result<EditImage> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                prompt: request.prompt().to_string(),
                mask_pixels: request.mask().map(crate::types::Mask::white_pixel_count),
                mask_dimensions: request.mask().map(crate::types::Mask::dimensions),
                image_dimensions: request.image().dimensions(),
            });
        }

        match &self.reply {
            MockReply::Image(bytes) => ImageIOService::decode(bytes.clone(), "mock-result.png"),
            MockReply::Fail(failure) => Err(EditError::remote(failure.clone())),
            MockReply::Pending => std::future::pending().await,
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Encode a solid-colour RGB image as PNG
#[must_use]
pub fn solid_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)));
    ImageIOService::encode_png(&image).unwrap()
}
