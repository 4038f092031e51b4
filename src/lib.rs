//! # flowgen - Flow Model Generator
//!
//! **flowgen** sits between a visual flow editor and a project's source files. It hands
//! the editor pre-populated node templates, and turns the nodes the user edited back
//! into text edits that insert or replace source code.
//!
//! ## Core Workflow
//!
//! 1.  **Template**: `FlowGenerator::template` produces a node of the requested kind with
//!     its property schema, defaults and generated names filled in. Lookups against the
//!     compiler and the symbol catalog are best effort.
//! 2.  **Edit**: the editor fills in property values and child branches. The node is a
//!     plain serde value, so it can travel as JSON.
//! 3.  **Render**: `FlowGenerator::render` writes the node back as [`source::SourceEdits`],
//!     text edits grouped by file, including any imports the new code needs. New
//!     declarations go to the auxiliary file of their family (`connections.bal`,
//!     `functions.bal`, ...), existing nodes are replaced in place.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowgen::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     let project = MemoryProject::new("/project")
//!         .with_module(ModuleDescriptor::new("acme", "orders"));
//!     let generator = FlowGenerator::new(Arc::new(project));
//!
//!     // Ask for a variable declaration at line 4 of main.bal.
//!     let context = generator
//!         .context()
//!         .with_file("/project/main.bal")
//!         .with_position(LinePosition::new(4, 4));
//!     let mut node = generator.template(NodeKind::Variable, &context)?;
//!
//!     // The editor fills in the schema.
//!     node.set("type", "int");
//!     node.set("expression", "40 + 2");
//!     node.codedata.line_range = Some(LineRange::at(LinePosition::new(4, 4)));
//!
//!     let edits = generator.render(&node, Path::new("/project/main.bal"))?;
//!     for (file, edits) in &edits {
//!         for edit in edits {
//!             println!("{}: {}", file.display(), edit.new_text);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod config;
pub mod debounce;
pub mod error;
pub mod generator;
pub mod model;
pub mod palette;
pub mod prelude;
pub mod search;
pub mod services;
pub mod source;
