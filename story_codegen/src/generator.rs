//! Code generation passes.
//!
//! A pass builds a fresh [`ContextTree`] over a story snapshot and resolves
//! the translator's root format against the root context. Nothing is cached
//! between passes.

use log::{info, warn};

use story_model::{NodeId, StoryModel};

use crate::context::ContextTree;
use crate::error::CodegenError;
use crate::translator::Translator;

/// Runs generation passes for one translator.
pub struct CodeGenerator<'t> {
    translator: &'t Translator,
}

impl<'t> CodeGenerator<'t> {
    pub fn new(translator: &'t Translator) -> Self {
        Self { translator }
    }

    /// Generate the file for `model`.
    ///
    /// `story_start` roots the story graph; see [`ContextTree::build`].
    /// On failure no partial output is returned.
    pub fn generate(&self, model: &StoryModel, story_start: Option<NodeId>) -> Result<String, CodegenError> {
        let root_format = &self.translator.config().root_format;
        info!(
            "event=generation_started translator={} components={} format={}",
            self.translator.name(),
            model.len(),
            root_format
        );

        let result = ContextTree::build(model, self.translator.slots(), story_start)
            .and_then(|tree| self.translator.resolver().resolve_format(root_format, tree.root()));
        self.log_outcome(&result);
        result
    }

    /// Resolve a named format against a single component.
    pub fn generate_component(
        &self,
        model: &StoryModel,
        story_start: Option<NodeId>,
        component: NodeId,
        format_keyword: &str,
    ) -> Result<String, CodegenError> {
        let tree = ContextTree::build(model, self.translator.slots(), story_start)?;
        let context = tree.context_for(component).ok_or_else(|| {
            CodegenError::MalformedModel(format!("component {component} is outside the containment tree"))
        })?;
        let result = self.translator.resolver().resolve_format(format_keyword, context);
        self.log_outcome(&result);
        result
    }

    fn log_outcome(&self, result: &Result<String, CodegenError>) {
        match result {
            Ok(code) => info!(
                "event=generation_finished translator={} bytes={}",
                self.translator.name(),
                code.len()
            ),
            Err(err) => warn!(
                "event=generation_failed translator={} error={}",
                self.translator.name(),
                err
            ),
        }
    }
}
