//! Confab core business logic.
//!
//! Owns the local video source selection and remote subscription
//! reconciliation contract. The native media engine and the camera
//! hardware sit behind the [`transport::MediaTransport`] and
//! [`confab_video::CameraCapture`] collaborator traits.

pub mod config;
pub mod controller;
pub mod data_message;
pub mod errors;
pub mod events;
pub mod subscriptions;
pub mod transport;

pub use controller::VideoSourceController;
pub use errors::ConfabError;
pub use events::ConfabEvent;
