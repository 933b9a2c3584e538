use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::columns::ColumnMapping;
use crate::data;
use crate::error::ScoreError;
use crate::models::ChannelTable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Landing,
    Dashboard,
}

/// Per-session application state: which view is shown and the raw channel
/// table, loaded at most once and never mutated afterwards.
#[derive(Debug)]
pub struct AppState {
    view: View,
    data_path: PathBuf,
    mapping: ColumnMapping,
    table: OnceCell<ChannelTable>,
}

impl AppState {
    pub fn new(data_path: impl Into<PathBuf>, mapping: ColumnMapping) -> Self {
        Self {
            view: View::Landing,
            data_path: data_path.into(),
            mapping,
            table: OnceCell::new(),
        }
    }

    /// State over an already loaded table.
    pub fn with_table(table: ChannelTable, mapping: ColumnMapping) -> Self {
        Self {
            view: View::Landing,
            data_path: PathBuf::new(),
            mapping,
            table: OnceCell::with_value(table),
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn open_dashboard(&mut self) {
        self.view = View::Dashboard;
    }

    pub fn back_to_landing(&mut self) {
        self.view = View::Landing;
    }

    pub fn toggle(&mut self) -> View {
        self.view = match self.view {
            View::Landing => View::Dashboard,
            View::Dashboard => View::Landing,
        };
        self.view
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }

    /// The raw table, read from disk on first use. A failed load is not
    /// cached, so a later call retries.
    pub fn table_or_load(&self) -> Result<&ChannelTable, ScoreError> {
        self.table.get_or_try_init(|| {
            debug!(path = %self.data_path.display(), "loading channel table");
            data::load_channels(&self.data_path, &self.mapping)
        })
    }
}
