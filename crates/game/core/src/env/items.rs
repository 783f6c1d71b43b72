use std::collections::BTreeMap;

/// Display lookup for material ids that show up in rewards.
pub trait ItemOracle: Send + Sync {
    fn template(&self, item_id: &str) -> Option<ItemTemplate>;

    /// Returns all templates available in this oracle.
    fn all_templates(&self) -> Vec<ItemTemplate>;
}

/// Presentation data for one material.
///
/// Templates only affect what a UI shows; stored rewards keep every material
/// whether or not a template exists for it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemTemplate {
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub icon: String,
}

impl ItemTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
        }
    }
}

/// In-memory [`ItemOracle`] keyed by item id.
#[derive(Clone, Debug, Default)]
pub struct ItemCatalog {
    templates: BTreeMap<String, ItemTemplate>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, template: ItemTemplate) {
        self.templates.insert(template.id.clone(), template);
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl FromIterator<ItemTemplate> for ItemCatalog {
    fn from_iter<I: IntoIterator<Item = ItemTemplate>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for template in iter {
            catalog.insert(template);
        }
        catalog
    }
}

impl ItemOracle for ItemCatalog {
    fn template(&self, item_id: &str) -> Option<ItemTemplate> {
        self.templates.get(item_id).cloned()
    }

    fn all_templates(&self) -> Vec<ItemTemplate> {
        self.templates.values().cloned().collect()
    }
}
