// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Docstring formatting for hover.
//!
//! [`DocFormatter::format`] turns a raw docstring into a [`FormattedDoc`]
//! (Google, reST or NumPy conventions, detected automatically) and
//! [`DocFormatter::hover`] renders a definition into Markdown hover content.

pub mod parser;
pub mod render;

pub use parser::{detect_style, DocStyle};
pub use render::{hover_content, to_markdown};

use crate::analysis::docstring::cleandoc;
use crate::timed;
use crate::types::{Definition, FormattedDoc, HoverContent};

/// Stateless docstring formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocFormatter;

impl DocFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Structure a docstring. `None` for a missing or blank docstring, or
    /// one with nothing to show.
    pub fn format(&self, docstring: Option<&str>) -> Option<FormattedDoc> {
        let docstring = docstring.filter(|d| !d.trim().is_empty())?;

        let timer = timed!("docs.format");
        let formatted = parser::parse(&cleandoc(docstring));
        timer.finish();

        (!formatted.is_empty()).then_some(formatted)
    }

    /// Markdown hover for a definition.
    pub fn hover(&self, definition: &Definition) -> HoverContent {
        let formatted = self.format(definition.docstring.as_deref());
        hover_content(definition, formatted.as_ref())
    }
}
