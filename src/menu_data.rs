//! Tabular menu data source.

use core::fmt;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use menu_render_layout::MenuEntry;

/// Raw row as stored in the data file.
#[derive(Debug, Deserialize)]
struct MenuRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Description", default)]
    description: Option<String>,
}

/// Validated menu rows indexed by dish name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MenuTable {
    entries: Vec<MenuEntry>,
    by_name: HashMap<String, usize>,
}

impl MenuTable {
    /// Read a JSON array of `{ "Name", "Category", "Description" }` rows.
    pub fn load(path: &Path) -> Result<Self, MenuDataError> {
        if !path.is_file() {
            return Err(MenuDataError::Missing(path.to_path_buf()));
        }
        let bytes = std::fs::read(path).map_err(|err| MenuDataError::Read {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let table = Self::from_json_slice(&bytes)?;
        log::info!(
            "loaded {} dishes in {} categories from {}",
            table.len(),
            table.categories().len(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, MenuDataError> {
        let rows: Vec<MenuRow> =
            serde_json::from_slice(bytes).map_err(|err| MenuDataError::Parse(err.to_string()))?;
        let mut entries = Vec::with_capacity(rows.len());
        for (idx, row) in rows.into_iter().enumerate() {
            let name = row.name.trim();
            if name.is_empty() {
                return Err(MenuDataError::EmptyName { row: idx + 1 });
            }
            entries.push(MenuEntry::new(
                name,
                row.category.trim(),
                row.description.as_deref().unwrap_or_default().trim(),
            ));
        }
        Ok(Self::from_entries(entries))
    }

    /// Build from entries; on duplicate names the first row wins.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = MenuEntry>,
    {
        let mut table = Self::default();
        for entry in entries {
            if table.by_name.contains_key(&entry.name) {
                log::warn!("duplicate dish {:?} ignored; keeping first row", entry.name);
                continue;
            }
            table.by_name.insert(entry.name.clone(), table.entries.len());
            table.entries.push(entry);
        }
        table
    }

    pub fn lookup(&self, name: &str) -> Option<&MenuEntry> {
        self.by_name.get(name).map(|&idx| &self.entries[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Dish names in table order.
    pub fn dish_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Unique category labels, sorted.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|e| e.category.as_str()).collect()
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every requested name in order, or report all unknown ones.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<MenuEntry>, UnknownDishes> {
        let unknown: Vec<String> = names
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| !self.contains(name))
            .map(str::to_string)
            .collect();
        if !unknown.is_empty() {
            return Err(UnknownDishes {
                unknown,
                available: self.dish_names().into_iter().map(str::to_string).collect(),
            });
        }
        Ok(names
            .iter()
            .filter_map(|name| self.lookup(name.as_ref()).cloned())
            .collect())
    }
}

/// Requested dish names absent from the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownDishes {
    pub unknown: Vec<String>,
    pub available: Vec<String>,
}

impl fmt::Display for UnknownDishes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown dish: {}. Available: {}",
            self.unknown.join(", "),
            self.available.join(", ")
        )
    }
}

impl std::error::Error for UnknownDishes {}

/// Menu data loading error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuDataError {
    /// Data file does not exist.
    Missing(PathBuf),
    /// Data file exists but could not be read.
    Read { path: PathBuf, message: String },
    /// Data file is not a JSON array of menu rows.
    Parse(String),
    /// Row (1-based) has a blank `Name`.
    EmptyName { row: usize },
}

impl fmt::Display for MenuDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "menu data file not found: {}", path.display()),
            Self::Read { path, message } => {
                write!(f, "failed to read {}: {}", path.display(), message)
            }
            Self::Parse(err) => write!(f, "invalid menu data: {}", err),
            Self::EmptyName { row } => write!(f, "menu row {} has an empty Name", row),
        }
    }
}

impl std::error::Error for MenuDataError {}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        { "Name": "Rosół", "Category": "Zupy", "Description": "Bulion z makaronem" },
        { "Name": " Schabowy ", "Category": "Dania główne", "Description": "Kotlet z ziemniakami" },
        { "Name": "Sernik", "Category": "Desery" },
        { "Name": "Żurek", "Category": "Zupy", "Description": null },
        { "Name": "Rosół", "Category": "Inne", "Description": "duplicate" }
    ]"#;

    #[test]
    fn rows_are_trimmed_and_optional_description_defaults_empty() {
        let table = MenuTable::from_json_slice(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.lookup("Schabowy").unwrap().category, "Dania główne");
        assert_eq!(table.lookup("Sernik").unwrap().description, "");
        assert_eq!(table.lookup("Żurek").unwrap().description, "");
        assert!(table.lookup("Unicorn").is_none());
    }

    #[test]
    fn duplicate_names_keep_first_row() {
        let table = MenuTable::from_json_slice(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.lookup("Rosół").unwrap().category, "Zupy");
        assert_eq!(
            table.dish_names(),
            vec!["Rosół", "Schabowy", "Sernik", "Żurek"]
        );
    }

    #[test]
    fn categories_are_unique_and_sorted() {
        let table = MenuTable::from_json_slice(SAMPLE.as_bytes()).unwrap();
        let categories: Vec<&str> = table.categories().into_iter().collect();
        assert_eq!(categories, vec!["Dania główne", "Desery", "Zupy"]);
    }

    #[test]
    fn select_preserves_request_order() {
        let table = MenuTable::from_json_slice(SAMPLE.as_bytes()).unwrap();
        let picked = table.select(&["Sernik", "Rosół"]).unwrap();
        let names: Vec<&str> = picked.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Sernik", "Rosół"]);
    }

    #[test]
    fn select_reports_every_unknown_name_and_the_valid_ones() {
        let table = MenuTable::from_json_slice(SAMPLE.as_bytes()).unwrap();
        let err = table.select(&["Soup", "Rosół", "Unicorn"]).unwrap_err();
        assert_eq!(err.unknown, vec!["Soup", "Unicorn"]);
        assert_eq!(err.available.len(), 4);
        assert_eq!(
            err.to_string(),
            "Unknown dish: Soup, Unicorn. Available: Rosół, Schabowy, Sernik, Żurek"
        );
    }

    #[test]
    fn blank_name_is_rejected_with_row_number() {
        let err = MenuTable::from_json_slice(
            br#"[{ "Name": "A", "Category": "X" }, { "Name": "  ", "Category": "X" }]"#,
        )
        .unwrap_err();
        assert_eq!(err, MenuDataError::EmptyName { row: 2 });
    }

    #[test]
    fn missing_file_and_bad_json_are_distinct_errors() {
        let missing = MenuTable::load(Path::new("no/such/menu_data.json")).unwrap_err();
        assert!(matches!(missing, MenuDataError::Missing(_)));
        let parse = MenuTable::from_json_slice(b"{\"Name\": 1}").unwrap_err();
        assert!(matches!(parse, MenuDataError::Parse(_)));
    }
}
