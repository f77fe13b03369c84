//! Scopes a fragment is resolved against.

use story_model::{Binding, Variable};

use crate::context::{legal_name, ResolutionContext};
use crate::error::CodegenError;

/// One link of the scope chain.
///
/// Series and scope fragments push item scopes on top of the context they
/// were resolved in. Anything an item cannot answer falls through to the
/// scope below it. Variable names are made legal but not suffixed, so one
/// variable reads the same wherever it appears.
#[derive(Clone, Copy, Debug)]
pub enum Scope<'s> {
    Context(ResolutionContext<'s>),
    Variable {
        variable: &'s Variable,
        enclosing: &'s Scope<'s>,
    },
    Text {
        text: &'s str,
        enclosing: &'s Scope<'s>,
    },
}

impl<'s> Scope<'s> {
    /// The nearest component context in the chain.
    pub fn context(&self) -> ResolutionContext<'s> {
        match self {
            Scope::Context(context) => *context,
            Scope::Variable { enclosing, .. } | Scope::Text { enclosing, .. } => enclosing.context(),
        }
    }

    pub fn lookup(&self, name: &str) -> Result<String, CodegenError> {
        match self {
            Scope::Context(context) => context.lookup(name),
            Scope::Variable { variable, enclosing } => match name.to_ascii_lowercase().as_str() {
                "name" => Ok(legal_name(&variable.name)),
                "value" => self.context().binding_value(variable),
                "type" => Ok(variable.primary_type().unwrap_or_default().to_string()),
                "uniqueid" => match variable.binding {
                    Binding::StoryPoint { node } => Ok(node.to_string()),
                    _ => enclosing.lookup(name),
                },
                _ => enclosing.lookup(name),
            },
            Scope::Text { text, enclosing } => match name.to_ascii_lowercase().as_str() {
                "name" | "value" => Ok(text.to_string()),
                _ => enclosing.lookup(name),
            },
        }
    }

    /// Name used when filtering series items.
    pub(crate) fn item_name(&self) -> Result<String, CodegenError> {
        match self {
            Scope::Context(context) => context.name(),
            Scope::Variable { variable, .. } => Ok(legal_name(&variable.name)),
            Scope::Text { text, .. } => Ok(text.to_string()),
        }
    }
}
