//! Core of a dual-pane media browser.
//!
//! Two independent panes (source and destination) each show a media listing
//! in a virtualized grid with click/shift-click selection and a full-screen
//! preview. Details and thumbnails come from a shared [`cache::MediaCache`]
//! in front of a [`backend::MediaBackend`].

pub mod backend;
pub mod cache;
pub mod cli;
pub mod columns;
pub mod config;
pub mod error;
pub mod gallery;
pub mod grid;
pub mod logging;
pub mod model;
pub mod preview;
pub mod selection;
pub mod settings;
pub mod tui;

pub use error::{GalleryError, Result};
