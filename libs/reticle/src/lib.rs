//! Merges a chip design layout into a fabrication-facility reticle template.
//!
//! Composition resolves layer conflicts between the design and the template,
//! scales the design from wafer to reticle coordinates when asked, centers it,
//! optionally mirrors it for maskless lithography, and places it in the
//! template's target cell along with an identifying barcode.
//!
//! # Examples
//!
//! ```
//! # use gds21::{GdsBoundary, GdsLibrary, GdsPoint, GdsStruct};
//! # use reticle::{compose::{compose, ComposeOptions}, config::FacilityConfig};
//! # use reticle::library::LibraryExt;
//! let mut template = GdsLibrary::new("template");
//! template.structs.push(GdsStruct::new("asml_template"));
//!
//! let mut design = GdsLibrary::new("design");
//! let mut top = GdsStruct::new("chip");
//! top.elems.push(
//!     GdsBoundary {
//!         layer: 1,
//!         xy: GdsPoint::vec(&[(0, 0), (100, 0), (100, 50), (0, 50), (0, 0)]),
//!         ..Default::default()
//!     }
//!     .into(),
//! );
//! design.structs.push(top);
//!
//! let opts = ComposeOptions { wafer_scale: true, ..Default::default() };
//! let out = compose(&template, &design, &opts, &FacilityConfig::default()).unwrap();
//! assert_eq!(out.report.placed_cell, "chip");
//! assert!(out.library.struct_named("chip").is_some());
//! ```
#![warn(missing_docs)]

pub mod barcode;
pub mod compose;
pub mod config;
mod error;
pub mod font;
pub mod hierarchy;
pub mod labels;
pub mod layer_map;
pub mod library;
pub mod merge;
pub mod names;
pub mod report;
pub mod transform;


pub use error::{Error, Result};
