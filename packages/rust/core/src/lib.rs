//! Core workflows for ContentPilot.
//!
//! Ties the Gemini and GitHub clients together into the end-to-end flows:
//! article generation, publishing, the scheduled publication run, and the
//! AI consultant.

pub mod consultant;
pub mod generator;
pub mod publisher;
pub mod scheduler;
