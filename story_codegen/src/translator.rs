//! Translator registry - everything a generation pass needs about one target.
//!
//! A translator bundles the generator config, the slot table and the format
//! library. It is loaded from a TOML (or JSON) definition and passed
//! explicitly to each pass.

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use story_model::{Fragment, FormatLibrary, Slot, SlotTable};

use crate::config::GeneratorConfig;
use crate::error::CodegenError;
use crate::resolver::FragmentResolver;

/// On-disk shape of a translator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslatorDefinition {
    pub name: String,

    #[serde(default)]
    pub config: GeneratorConfig,

    #[serde(default)]
    pub slots: Vec<Slot>,

    /// Named formats, keyed by format keyword.
    #[serde(default)]
    pub formats: HashMap<String, Vec<Fragment>>,
}

/// A loaded translator.
#[derive(Debug, Clone)]
pub struct Translator {
    name: String,
    config: GeneratorConfig,
    slots: SlotTable,
    formats: FormatLibrary,
}

impl Translator {
    /// Create a translator with no slots and no formats.
    pub fn new(name: impl Into<String>, config: GeneratorConfig) -> Self {
        let mut slots = SlotTable::new();
        if let Some(default_format_keyword) = &config.default_format_keyword {
            slots.set_default_format_keyword(default_format_keyword.clone());
        }
        Self {
            name: name.into(),
            config,
            slots,
            formats: FormatLibrary::new(),
        }
    }

    pub fn from_definition(definition: TranslatorDefinition) -> Self {
        let mut translator = Self::new(definition.name, definition.config);
        translator.slots.add_event_slots(definition.slots);
        translator.formats = definition.formats.into_iter().collect();
        info!(
            "event=translator_loaded name={} slots={} formats={}",
            translator.name,
            translator.slots.len(),
            translator.formats.len()
        );
        translator
    }

    pub fn from_toml_str(text: &str) -> Result<Self, CodegenError> {
        let definition: TranslatorDefinition = toml::from_str(text)?;
        Ok(Self::from_definition(definition))
    }

    pub fn from_json_str(text: &str) -> Result<Self, CodegenError> {
        let definition: TranslatorDefinition = serde_json::from_str(text)?;
        Ok(Self::from_definition(definition))
    }

    /// Replace the slot table contents, keeping the default keyword.
    pub fn reload_slots(&mut self, slots: impl IntoIterator<Item = Slot>) {
        self.slots.clear();
        self.slots.add_event_slots(slots);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn slots(&self) -> &SlotTable {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut SlotTable {
        &mut self.slots
    }

    pub fn formats(&self) -> &FormatLibrary {
        &self.formats
    }

    pub fn formats_mut(&mut self) -> &mut FormatLibrary {
        &mut self.formats
    }

    pub fn resolver(&self) -> FragmentResolver<'_> {
        FragmentResolver::new(&self.formats, &self.config)
    }
}
