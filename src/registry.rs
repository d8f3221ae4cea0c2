//! The conversion registry: which source formats reach which targets, and
//! through which logical [`Route`].
//!
//! The registry is the single source of truth for the dispatcher, the batch
//! controller's format prompt and the shell-menu entries. It is built once
//! from a static table and never mutated afterwards. Construction goes
//! through [`RegistryBuilder`], which refuses a second binding for an
//! existing `(source, target)` pair.

use crate::error::RegistryError;
use crate::format::Format;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The logical conversion a binding names. Backends are chosen per route
/// and per platform by [`crate::resolver::Resolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// Word-processor document → PDF.
    DocumentToPdf,
    /// Presentation → PDF.
    PresentationToPdf,
    /// Spreadsheet → PDF.
    SpreadsheetToPdf,
    /// Document → another markup or document format (pandoc writers).
    DocumentExport,
    /// PDF → editable word-processor document.
    PdfToDocument,
    /// PDF → presentation, one slide per page.
    PdfToPresentation,
    /// PDF → plain text.
    PdfToText,
    /// PDF → HTML.
    PdfToHtml,
    /// PDF → Markdown.
    PdfToMarkdown,
    /// PDF → one raster image per page.
    PdfToImages,
    /// Raster image → single-page PDF.
    ImageToPdf,
}

/// How many artifacts a route writes per input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    /// One output file.
    Single,
    /// A numbered sequence, one file per page.
    Paged,
}

impl Route {
    pub fn cardinality(self) -> Cardinality {
        match self {
            Route::PdfToImages => Cardinality::Paged,
            _ => Cardinality::Single,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One registered edge: `source → target` via `route`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub source: Format,
    pub target: Format,
    pub route: Route,
}

impl Binding {
    pub fn cardinality(&self) -> Cardinality {
        self.route.cardinality()
    }
}

/// Immutable mapping `source → [target binding]`, targets kept in
/// declaration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    edges: BTreeMap<Format, Vec<Binding>>,
}

/// The built-in table. Target order per source is the order offered in the
/// format prompt.
const STANDARD_TABLE: &[(&str, &str, Route)] = &[
    ("docx", "pdf", Route::DocumentToPdf),
    ("docx", "odt", Route::DocumentExport),
    ("docx", "txt", Route::DocumentExport),
    ("docx", "md", Route::DocumentExport),
    ("docx", "tex", Route::DocumentExport),
    ("docx", "html", Route::DocumentExport),
    ("doc", "pdf", Route::DocumentToPdf),
    ("odt", "pdf", Route::DocumentToPdf),
    ("odt", "docx", Route::DocumentExport),
    ("rtf", "pdf", Route::DocumentToPdf),
    ("pptx", "pdf", Route::PresentationToPdf),
    ("ppt", "pdf", Route::PresentationToPdf),
    ("odp", "pdf", Route::PresentationToPdf),
    ("xlsx", "pdf", Route::SpreadsheetToPdf),
    ("xls", "pdf", Route::SpreadsheetToPdf),
    ("ods", "pdf", Route::SpreadsheetToPdf),
    ("pdf", "docx", Route::PdfToDocument),
    ("pdf", "png", Route::PdfToImages),
    ("pdf", "pptx", Route::PdfToPresentation),
    ("pdf", "txt", Route::PdfToText),
    ("pdf", "html", Route::PdfToHtml),
    ("pdf", "md", Route::PdfToMarkdown),
    ("png", "pdf", Route::ImageToPdf),
    ("jpg", "pdf", Route::ImageToPdf),
    ("jpeg", "pdf", Route::ImageToPdf),
];

static STANDARD: Lazy<Registry> = Lazy::new(|| {
    Registry::from_table(STANDARD_TABLE).expect("built-in conversion table must be valid")
});

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            registry: Registry::default(),
        }
    }

    /// The process-wide registry built from the built-in table.
    pub fn standard() -> &'static Registry {
        &STANDARD
    }

    /// Build a registry from `(source, target, route)` rows.
    pub fn from_table(rows: &[(&str, &str, Route)]) -> Result<Registry, RegistryError> {
        let mut builder = Registry::builder();
        for &(source, target, route) in rows {
            let source = Format::parse(source).ok_or_else(|| invalid_row(source))?;
            let target = Format::parse(target).ok_or_else(|| invalid_row(target))?;
            builder = builder.edge(source, target, route)?;
        }
        Ok(builder.build())
    }

    /// Targets reachable from `source`, in declaration order. `None` when
    /// the source format is unknown.
    pub fn lookup(&self, source: &Format) -> Option<Vec<Format>> {
        self.edges
            .get(source)
            .map(|bindings| bindings.iter().map(|b| b.target.clone()).collect())
    }

    /// The binding for `source → target`.
    pub fn resolve(&self, source: &Format, target: &Format) -> Result<&Binding, RegistryError> {
        let bindings = self
            .edges
            .get(source)
            .ok_or_else(|| RegistryError::UnknownSource {
                source_format: source.clone(),
            })?;

        bindings
            .iter()
            .find(|b| &b.target == target)
            .ok_or_else(|| RegistryError::NoEdge {
                source_format: source.clone(),
                target: target.clone(),
                available: bindings.iter().map(|b| b.target.clone()).collect(),
            })
    }

    pub fn contains(&self, source: &Format, target: &Format) -> bool {
        self.resolve(source, target).is_ok()
    }

    /// All source formats, sorted.
    pub fn sources(&self) -> impl Iterator<Item = &Format> {
        self.edges.keys()
    }

    /// Every binding, grouped by source (sorted) and in declaration order
    /// within a source.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.edges.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

fn invalid_row(token: &str) -> RegistryError {
    RegistryError::InvalidToken {
        token: token.to_string(),
    }
}

/// Builder for [`Registry`]; rejects duplicate and self edges.
#[derive(Debug)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    pub fn edge(
        mut self,
        source: Format,
        target: Format,
        route: Route,
    ) -> Result<Self, RegistryError> {
        if source == target {
            return Err(RegistryError::SelfEdge { format: source });
        }

        let bindings = self.registry.edges.entry(source.clone()).or_default();
        if bindings.iter().any(|b| b.target == target) {
            return Err(RegistryError::DuplicateEdge {
                source_format: source,
                target,
            });
        }
        bindings.push(Binding {
            source,
            target,
            route,
        });
        Ok(self)
    }

    pub fn build(self) -> Registry {
        self.registry
    }
}
