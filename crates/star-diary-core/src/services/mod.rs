//! Injected collaborators.
//!
//! The state machines never reach for globals: each receives the handles it
//! needs from a [`Services`] bundle built by the application.

mod audio_output;
mod auth_service;
mod capture_device;
mod document_store;
mod object_store;
mod subscription;

pub use {
    audio_output::{AudioHandle, AudioOutput},
    auth_service::{AuthService, User},
    capture_device::{CaptureDevice, CaptureStream},
    document_store::DocumentStore,
    object_store::ObjectStore,
    subscription::Subscription,
};

use std::sync::Arc;

/// Handles to every external collaborator.
///
/// Cloning is cheap; all fields are reference counted.
#[derive(Clone)]
pub struct Services {
    /// Identity and session changes.
    pub auth: Arc<dyn AuthService>,
    /// Entry documents and user profiles.
    pub documents: Arc<dyn DocumentStore>,
    /// Audio object storage.
    pub objects: Arc<dyn ObjectStore>,
    /// Microphone access.
    pub capture: Arc<dyn CaptureDevice>,
    /// Speaker access.
    pub output: Arc<dyn AudioOutput>,
}
