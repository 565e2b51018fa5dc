//! Algorithmic melody composer, that writes GNU LilyPond scores.
//!
//! A [`melody::NoteSource`] produces rhythm units, the
//! [`composer::Composer`] packs them into measures, splitting units on
//! barlines, and the [`orchestrator::Orchestrator`] turns every measure
//! into tied and dotted LilyPond notes.
//!
//! ```
//! use muse_score::{Composer, Configuration};
//!
//! let config = Configuration::from_yaml_str(
//!     "key: Am\ntimeSignature: 3/4\nnumMeasures: 4\nseed: 1",
//! )
//! .unwrap();
//! let document = Composer::new(&config).unwrap().render_document().unwrap();
//! assert!(document.contains("\\key a \\minor"));
//! assert!(document.contains("% Measure 4"));
//! ```

pub mod composer;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod lilypond_render;
pub mod melody;
pub mod orchestrator;
pub mod primitives;

pub use composer::{Composer, ComposerState};
pub use config::Configuration;
pub use error::{MuseError, MuseResult};
pub use lilypond_render::{run_lilypond, RendersToLilypond};
pub use orchestrator::Orchestrator;
