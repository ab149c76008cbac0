use rustc_hash::FxHashMap;
use tracing::warn;

use super::job::ProgramTemplate;
use crate::error::ConfigError;

/// Registered program templates. Lookup is by name, first registration wins.
#[derive(Debug, Default)]
pub struct Catalog {
    templates: Vec<ProgramTemplate>,
    // name --> index of the first template registered under it
    by_name: FxHashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, template: ProgramTemplate) -> Result<(), ConfigError> {
        template.validate()?;

        let index = self.templates.len();
        if self.by_name.contains_key(&template.name) {
            warn!(name = %template.name, "duplicate program name; the earlier template shadows it");
        } else {
            self.by_name.insert(template.name.clone(), index);
        }
        self.templates.push(template);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ProgramTemplate> {
        self.by_name.get(name).map(|&index| &self.templates[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProgramTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
