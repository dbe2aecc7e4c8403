//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use house_architect::{
    EditError, EditImage, EditRequest, ImageEditBackend, ImageIOService, RemoteFailure, Result,
};
use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Encode a solid-colour RGB image as PNG
pub fn solid_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)));
    ImageIOService::encode_png(&image).unwrap()
}

/// One reply of the scripted backend
#[derive(Debug, Clone)]
pub enum Reply {
    Image(Vec<u8>),
    Fail(RemoteFailure),
}

/// What the backend saw for one request
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub prompt: String,
    pub image_name: String,
    pub image_size: (u32, u32),
    pub mask: Option<GrayImage>,
}

/// Backend answering from a queue of replies, recording every request
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    seen: Mutex<Vec<SeenRequest>>,
}

impl ScriptedBackend {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageEditBackend for ScriptedBackend {
    async fn submit(&self, request: &EditRequest) -> Result<EditImage> {
        self.seen.lock().unwrap().push(SeenRequest {
            prompt: request.prompt().to_string(),
            image_name: request.image().name().to_string(),
            image_size: request.image().dimensions(),
            mask: request.mask().map(|m| m.raster().clone()),
        });

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Image(bytes)) => ImageIOService::decode(bytes, "result.png"),
            Some(Reply::Fail(failure)) => Err(EditError::remote(failure)),
            None => Err(EditError::remote(RemoteFailure::NoImage)),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
