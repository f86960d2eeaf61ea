//! Per-run logging context.
//!
//! Every component receives a `RunContext` when it is built and logs inside its span,
//! so two pipelines in one process keep their diagnostics apart.

use tracing::{info_span, Span};

#[derive(Debug, Clone)]
pub struct RunContext {
    name: String,
    span: Span,
}

impl RunContext {
    pub fn new<N: Into<String>>(name: N) -> Self {
        let name = name.into();
        let span = info_span!("run", run = %name);
        Self { name, span }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new("domprobe")
    }
}
