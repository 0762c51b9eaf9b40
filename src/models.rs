use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One category link, as produced by the navigation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(rename = "Categoria")]
    pub name: String,
    #[serde(rename = "Link")]
    pub url: String,
}

/// A series entry found on a category listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: String,
    pub detail_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRecord {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "metadatos")]
    pub metadata_tags: Option<Vec<String>>,
    pub link: String,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "temporadas")]
    pub seasons: Option<Vec<String>>,
}

impl SeriesRecord {
    /// Record carrying only what the listing page told us.
    pub fn bare(entry: CatalogEntry) -> Self {
        Self {
            title: entry.title,
            metadata_tags: None,
            link: entry.detail_url,
            description: None,
            seasons: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResult {
    count: usize,
    movies: Vec<SeriesRecord>,
}

impl CategoryResult {
    pub fn new(movies: Vec<SeriesRecord>) -> Self {
        Self {
            count: movies.len(),
            movies,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// Per-category documents keyed by file stem.
pub type CombinedResult = BTreeMap<String, Value>;

/// A channel link from the channel catalog. Fields are kept in input order;
/// unknown ones pass through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ChannelItem {
    link: String,
    fields: Map<String, Value>,
}

impl ChannelItem {
    pub fn link(&self) -> &str {
        &self.link
    }

    /// Existing `canal`/`descripcion` keep their position, new ones go last.
    pub fn set_info(&mut self, canal: String, descripcion: String) {
        self.fields.insert("canal".to_string(), Value::String(canal));
        self.fields
            .insert("descripcion".to_string(), Value::String(descripcion));
    }
}

impl TryFrom<Map<String, Value>> for ChannelItem {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let link = fields
            .get("link")
            .and_then(Value::as_str)
            .ok_or("channel item without a string `link`")?
            .to_string();
        Ok(Self { link, fields })
    }
}

impl From<ChannelItem> for Map<String, Value> {
    fn from(item: ChannelItem) -> Self {
        item.fields
    }
}

/// Channel catalog: category key to its channels, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ChannelCatalog {
    groups: Vec<(String, Vec<ChannelItem>)>,
}

impl ChannelCatalog {
    pub fn items(&self) -> impl Iterator<Item = &ChannelItem> {
        self.groups.iter().flat_map(|(_, items)| items)
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut ChannelItem> {
        self.groups.iter_mut().flat_map(|(_, items)| items)
    }

    pub fn channel_count(&self) -> usize {
        self.groups.iter().map(|(_, items)| items.len()).sum()
    }
}

impl TryFrom<Map<String, Value>> for ChannelCatalog {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let groups = map
            .into_iter()
            .map(|(key, value)| {
                let items: Vec<ChannelItem> = serde_json::from_value(value)
                    .map_err(|e| format!("category `{}`: {}", key, e))?;
                Ok((key, items))
            })
            .collect::<Result<_, String>>()?;
        Ok(Self { groups })
    }
}

impl From<ChannelCatalog> for Map<String, Value> {
    fn from(catalog: ChannelCatalog) -> Self {
        catalog
            .groups
            .into_iter()
            .map(|(key, items)| {
                let items = items.into_iter().map(|i| Value::Object(i.into())).collect();
                (key, Value::Array(items))
            })
            .collect()
    }
}
