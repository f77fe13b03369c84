//! Fragment resolution - turns format templates into text.
//!
//! Every fragment is resolved against a [`Scope`]. References walk the scope
//! chain, series and scope fragments push new item scopes, and format
//! references inline named formats up to the configured depth.
//!
//! Series data labels:
//! - `children`, `variables`, `parameters`, `includes`
//! - `implicits`, `slotparameters` (from the active slot)
//! - `storychildren`, `storyparents`, `storypoints` (from the story graph)

mod scope;

pub use scope::*;

use log::trace;

use story_model::{Fragment, FormatLibrary};

use crate::config::GeneratorConfig;
use crate::context::ResolutionContext;
use crate::error::CodegenError;

/// Reference name that inlines the code of the nearest code block.
pub const CODE_REFERENCE: &str = "code";

/// Indentation and format nesting at the current position.
#[derive(Clone, Copy)]
struct Cursor<'c> {
    indent: &'c str,
    depth: usize,
}

impl Cursor<'_> {
    fn nested(self, max_depth: usize) -> Result<Self, CodegenError> {
        if self.depth >= max_depth {
            return Err(CodegenError::FormatDepthExceeded(max_depth));
        }
        Ok(Self {
            depth: self.depth + 1,
            ..self
        })
    }
}

/// Options shared by every item of one series.
struct SeriesSpec<'f> {
    separator: &'f str,
    unique: bool,
    filter: Option<&'f str>,
    format: &'f [Fragment],
}

/// Resolves fragments using one translator's formats and layout.
pub struct FragmentResolver<'r> {
    formats: &'r FormatLibrary,
    config: &'r GeneratorConfig,
}

impl<'r> FragmentResolver<'r> {
    pub fn new(formats: &'r FormatLibrary, config: &'r GeneratorConfig) -> Self {
        Self { formats, config }
    }

    /// Resolve `fragments` against a component context.
    pub fn resolve(&self, fragments: &[Fragment], context: ResolutionContext<'_>) -> Result<String, CodegenError> {
        self.resolve_in(fragments, &Scope::Context(context))
    }

    /// Resolve the named format against a component context.
    pub fn resolve_format(&self, keyword: &str, context: ResolutionContext<'_>) -> Result<String, CodegenError> {
        let format = self.formats.get(keyword).ok_or_else(|| CodegenError::UnknownFormat {
            format: keyword.to_string(),
            component: context.describe(),
        })?;
        self.resolve(format, context)
    }

    /// Resolve `fragments` against an arbitrary scope.
    ///
    /// Output is only returned when every fragment resolved.
    pub fn resolve_in(&self, fragments: &[Fragment], scope: &Scope<'_>) -> Result<String, CodegenError> {
        let mut out = String::new();
        let cursor = Cursor { indent: "", depth: 0 };
        self.write_all(fragments, scope, cursor, &mut out)?;
        Ok(out)
    }

    fn write_all(
        &self,
        fragments: &[Fragment],
        scope: &Scope<'_>,
        cursor: Cursor<'_>,
        out: &mut String,
    ) -> Result<(), CodegenError> {
        for fragment in fragments {
            self.write(fragment, scope, cursor, out)?;
        }
        Ok(())
    }

    fn write(&self, fragment: &Fragment, scope: &Scope<'_>, cursor: Cursor<'_>, out: &mut String) -> Result<(), CodegenError> {
        match fragment {
            Fragment::Literal { text } => out.push_str(text),
            Fragment::Reference { name } => self.write_reference(name, scope, cursor, out)?,
            Fragment::Series {
                data,
                separator,
                unique,
                filter,
                format,
            } => {
                let spec = SeriesSpec {
                    separator,
                    unique: *unique,
                    filter: filter.as_deref(),
                    format,
                };
                self.write_series(data, &spec, scope, cursor, out)?;
            }
            Fragment::Scope { data, name_ref, format } => {
                self.write_scope(data, name_ref.as_deref(), format, scope, cursor, out)?;
            }
            Fragment::Conditional {
                condition,
                negate,
                format,
            } => {
                if self.condition_holds(condition, scope)? != *negate {
                    self.write_all(format, scope, cursor, out)?;
                }
            }
            Fragment::Line { fragments } => {
                out.push_str(cursor.indent);
                self.write_all(fragments, scope, cursor, out)?;
                out.push_str(&self.config.line_break);
            }
            Fragment::Indent { fragments } => {
                let indent = format!("{}{}", cursor.indent, self.config.indent);
                let deeper = Cursor {
                    indent: &indent,
                    depth: cursor.depth,
                };
                self.write_all(fragments, scope, deeper, out)?;
            }
            Fragment::FormatRef { format } => {
                let fragments = self.formats.get(format).ok_or_else(|| CodegenError::UnknownFormat {
                    format: format.clone(),
                    component: scope.context().describe(),
                })?;
                let nested = cursor.nested(self.config.max_format_depth)?;
                trace!("event=format_inlined format={format} depth={}", nested.depth);
                self.write_all(fragments, scope, nested, out)?;
            }
        }
        Ok(())
    }

    fn write_reference(&self, name: &str, scope: &Scope<'_>, cursor: Cursor<'_>, out: &mut String) -> Result<(), CodegenError> {
        if name.eq_ignore_ascii_case(CODE_REFERENCE) {
            let block = scope.context().main_code_block()?;
            let nested = cursor.nested(self.config.max_format_depth)?;
            return self.write_all(&block.code, scope, nested, out);
        }
        out.push_str(&scope.lookup(name)?);
        Ok(())
    }

    fn write_series(
        &self,
        data: &str,
        spec: &SeriesSpec<'_>,
        scope: &Scope<'_>,
        cursor: Cursor<'_>,
        out: &mut String,
    ) -> Result<(), CodegenError> {
        let context = scope.context();

        match data.to_ascii_lowercase().as_str() {
            "children" => self.write_items(context_scopes(context.children()), spec, cursor, out),
            "storychildren" => self.write_items(context_scopes(context.story_children()?), spec, cursor, out),
            "storyparents" => self.write_items(context_scopes(context.story_parents()?), spec, cursor, out),
            "storypoints" => self.write_items(context_scopes(context.story_points()?), spec, cursor, out),
            "variables" => {
                let items = variable_scopes(context.variables(), scope);
                self.write_items(items, spec, cursor, out)
            }
            "parameters" => {
                let items = variable_scopes(context.parameters()?, scope);
                self.write_items(items, spec, cursor, out)
            }
            "implicits" => {
                let implicits = context.implicits()?;
                let items = variable_scopes(implicits.iter().collect(), scope);
                self.write_items(items, spec, cursor, out)
            }
            "slotparameters" => {
                let parameters = context.slot_parameters()?;
                let items = variable_scopes(parameters.iter().collect(), scope);
                self.write_items(items, spec, cursor, out)
            }
            "includes" => {
                let items = context
                    .includes()?
                    .into_iter()
                    .map(|text| Scope::Text { text, enclosing: scope })
                    .collect();
                self.write_items(items, spec, cursor, out)
            }
            _ => Err(CodegenError::UnknownSeries {
                data: data.to_string(),
                component: context.describe(),
            }),
        }
    }

    fn write_items(
        &self,
        items: Vec<Scope<'_>>,
        spec: &SeriesSpec<'_>,
        cursor: Cursor<'_>,
        out: &mut String,
    ) -> Result<(), CodegenError> {
        let filter = spec.filter.map(str::to_ascii_lowercase);
        let mut kept: Vec<Scope<'_>> = Vec::with_capacity(items.len());

        for item in items {
            if spec.unique && kept.iter().any(|other| same_item(other, &item)) {
                continue;
            }
            if let Some(filter) = &filter {
                if !item.item_name()?.to_ascii_lowercase().contains(filter.as_str()) {
                    continue;
                }
            }
            kept.push(item);
        }

        for (index, item) in kept.iter().enumerate() {
            if index > 0 {
                out.push_str(spec.separator);
            }
            self.write_all(spec.format, item, cursor, out)?;
        }
        Ok(())
    }

    fn write_scope(
        &self,
        data: &str,
        name_ref: Option<&str>,
        format: &[Fragment],
        scope: &Scope<'_>,
        cursor: Cursor<'_>,
        out: &mut String,
    ) -> Result<(), CodegenError> {
        let context = scope.context();
        let unresolved = |reference: &str| CodegenError::unresolved(reference, context.describe());

        match data.to_ascii_lowercase().as_str() {
            "owner" => {
                let owner = context.enclosing().ok_or_else(|| unresolved("owner"))?;
                self.write_all(format, &Scope::Context(owner), cursor, out)
            }
            "story" => {
                let story = context.nearest_story().ok_or_else(|| unresolved("story"))?;
                self.write_all(format, &Scope::Context(story), cursor, out)
            }
            "start" => self.write_all(format, &Scope::Context(context.story_start()?), cursor, out),
            "argument" => {
                let name = name_ref.ok_or_else(|| unresolved("argument"))?;
                let variable = context.main_code_block()?.parameter(name).ok_or_else(|| unresolved(name))?;
                self.write_all(format, &Scope::Variable { variable, enclosing: scope }, cursor, out)
            }
            "slotparameter" => {
                let name = name_ref.ok_or_else(|| unresolved("slotparameter"))?;
                let parameters = context.slot_parameters()?;
                let variable = parameters
                    .iter()
                    .find(|p| p.name.eq_ignore_ascii_case(name))
                    .ok_or_else(|| unresolved(name))?;
                self.write_all(format, &Scope::Variable { variable, enclosing: scope }, cursor, out)
            }
            _ => Err(CodegenError::UnknownScope {
                data: data.to_string(),
                component: context.describe(),
            }),
        }
    }

    fn condition_holds(&self, condition: &str, scope: &Scope<'_>) -> Result<bool, CodegenError> {
        let context = scope.context();
        let holds = match condition.to_ascii_lowercase().as_str() {
            "haschildren" => !context.children().is_empty(),
            "hasmultiplechildren" => context.children().len() > 1,
            "hasvariables" => !context.variables().is_empty(),
            "hasparameters" => !context.parameters()?.is_empty(),
            "hasimplicits" => !context.implicits()?.is_empty(),
            "hasincludes" => !context.includes()?.is_empty(),
            "hasstorychildren" => !context.story_children()?.is_empty(),
            "hasparents" => !context.story_parents()?.is_empty(),
            "isstory" => context.component().is_story(),
            _ => {
                return Err(CodegenError::UnknownCondition {
                    condition: condition.to_string(),
                    component: context.describe(),
                })
            }
        };
        Ok(holds)
    }
}

fn variable_scopes<'s>(variables: Vec<&'s story_model::Variable>, enclosing: &'s Scope<'s>) -> Vec<Scope<'s>> {
    variables
        .into_iter()
        .map(|variable| Scope::Variable { variable, enclosing })
        .collect()
}

fn context_scopes(contexts: Vec<ResolutionContext<'_>>) -> Vec<Scope<'_>> {
    contexts.into_iter().map(Scope::Context).collect()
}

fn same_item(a: &Scope<'_>, b: &Scope<'_>) -> bool {
    match (a, b) {
        (Scope::Context(a), Scope::Context(b)) => a.id() == b.id(),
        (Scope::Variable { variable: a, .. }, Scope::Variable { variable: b, .. }) => a == b,
        (Scope::Text { text: a, .. }, Scope::Text { text: b, .. }) => a == b,
        _ => false,
    }
}
