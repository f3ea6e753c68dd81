//! Playing-card recognition service: YOLO detections are deduplicated per card
//! and grouped into player hands by spatial clustering.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
