// HTML report generator
//
// Renders the single-page report through the template engine. The same page
// serves static exports and the live session; live pages carry a refresh tag.

use crate::analysis::AnalysisResult;
use crate::error::Result;
use crate::output::templates::TemplateEngine;

/// How the page will be consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Static,
    Live { refresh_secs: u64 },
}

impl RenderMode {
    fn refresh_secs(self) -> Option<u64> {
        match self {
            RenderMode::Static => None,
            RenderMode::Live { refresh_secs } => Some(refresh_secs),
        }
    }
}

/// HTML report generator
pub struct HtmlGenerator {
    template_engine: TemplateEngine,
    mode: RenderMode,
}

impl HtmlGenerator {
    /// Create a generator for static exports
    pub fn new() -> Result<Self> {
        Ok(Self {
            template_engine: TemplateEngine::new()?,
            mode: RenderMode::Static,
        })
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Render the full report page
    pub fn render(&self, analysis: &AnalysisResult) -> Result<String> {
        self.template_engine
            .render_report(analysis, self.mode.refresh_secs())
    }
}
