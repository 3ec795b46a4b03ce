use std::sync::Arc;

use protoguard_core::config::{JavaScriptFrontend, ParserConfig};

use crate::infrastructure::parsers::{
    EspreeFrontend, EstreeJsonFrontend, SyntaxTreeProvider, TreeSitterFrontend,
};

/// Effective parser frontend for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserFrontend {
    TreeSitter,
    Espree,
    /// Inputs are ESTree JSON documents rather than JavaScript
    EstreeJson,
}

/// Routing selector from parser config to parser frontend.
#[derive(Debug, Clone, Copy)]
pub struct ParserFrontendSelector {
    js_frontend: JavaScriptFrontend,
    pre_parsed: bool,
}

impl ParserFrontendSelector {
    pub fn new(js_frontend: JavaScriptFrontend) -> Self {
        Self {
            js_frontend,
            pre_parsed: false,
        }
    }

    /// Treat every input as ESTree JSON, whatever the configured frontend
    pub fn pre_parsed(mut self, pre_parsed: bool) -> Self {
        self.pre_parsed = pre_parsed;
        self
    }

    pub fn select(&self) -> ParserFrontend {
        if self.pre_parsed {
            return ParserFrontend::EstreeJson;
        }
        match self.js_frontend {
            JavaScriptFrontend::TreeSitter => ParserFrontend::TreeSitter,
            JavaScriptFrontend::Espree => ParserFrontend::Espree,
        }
    }

    /// Build the provider for the selected frontend
    pub fn provider(&self, config: &ParserConfig) -> Arc<dyn SyntaxTreeProvider> {
        match self.select() {
            ParserFrontend::TreeSitter => Arc::new(TreeSitterFrontend::new()),
            ParserFrontend::Espree => Arc::new(EspreeFrontend::with_config(config)),
            ParserFrontend::EstreeJson => Arc::new(EstreeJsonFrontend::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select() {
        let selector = ParserFrontendSelector::new(JavaScriptFrontend::Espree);
        assert_eq!(selector.select(), ParserFrontend::Espree);
        assert_eq!(selector.pre_parsed(true).select(), ParserFrontend::EstreeJson);
        assert_eq!(
            ParserFrontendSelector::new(JavaScriptFrontend::default()).select(),
            ParserFrontend::TreeSitter
        );
    }

    #[test]
    fn test_provider_names() {
        let config = ParserConfig::default();
        let provider = ParserFrontendSelector::new(JavaScriptFrontend::TreeSitter).provider(&config);
        assert_eq!(provider.name(), "tree-sitter");
        let provider = ParserFrontendSelector::new(JavaScriptFrontend::TreeSitter)
            .pre_parsed(true)
            .provider(&config);
        assert_eq!(provider.name(), "estree-json");
    }
}
