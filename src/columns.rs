//! Column counts per pane and view context.
//!
//! Each pane remembers one count per context. Counts are clamped to the
//! context's bounds both when set and when read back from storage.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::Pane;
use crate::settings::SettingsStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewContext {
    #[default]
    DesktopSplit,
    DesktopSingle,
    MobileSplit,
    MobileSingle,
}

impl ViewContext {
    pub const ALL: [ViewContext; 4] = [
        ViewContext::DesktopSplit,
        ViewContext::DesktopSingle,
        ViewContext::MobileSplit,
        ViewContext::MobileSingle,
    ];

    pub fn from_layout(mobile: bool, split: bool) -> Self {
        match (mobile, split) {
            (false, true) => ViewContext::DesktopSplit,
            (false, false) => ViewContext::DesktopSingle,
            (true, true) => ViewContext::MobileSplit,
            (true, false) => ViewContext::MobileSingle,
        }
    }

    pub fn is_mobile(self) -> bool {
        matches!(self, ViewContext::MobileSplit | ViewContext::MobileSingle)
    }

    /// Both panes shown side by side
    pub fn is_split(self) -> bool {
        matches!(self, ViewContext::DesktopSplit | ViewContext::MobileSplit)
    }

    pub fn key(self) -> &'static str {
        match self {
            ViewContext::DesktopSplit => "desktop-split",
            ViewContext::DesktopSingle => "desktop-single",
            ViewContext::MobileSplit => "mobile-split",
            ViewContext::MobileSingle => "mobile-single",
        }
    }

    /// Inclusive (min, max) column bounds
    pub fn bounds(self) -> (u32, u32) {
        match self {
            ViewContext::DesktopSplit | ViewContext::DesktopSingle => (2, 10),
            ViewContext::MobileSplit => (1, 4),
            ViewContext::MobileSingle => (2, 6),
        }
    }

    pub fn default_columns(self) -> u32 {
        match self {
            ViewContext::DesktopSplit => 5,
            ViewContext::DesktopSingle => 6,
            ViewContext::MobileSplit => 2,
            ViewContext::MobileSingle => 4,
        }
    }

    pub fn clamp(self, count: u32) -> u32 {
        let (min, max) = self.bounds();
        count.clamp(min, max)
    }
}

impl fmt::Display for ViewContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for ViewContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown view context '{}'", s))
    }
}

fn settings_key(pane: Pane, context: ViewContext) -> String {
    format!("columns-{}-{}", context.key(), pane.side())
}

/// Column counts for both panes in every context, backed by the settings store.
pub struct ColumnSettings {
    store: SettingsStore,
    values: HashMap<(Pane, ViewContext), u32>,
}

impl ColumnSettings {
    /// Read all stored counts; absent or unreadable values take defaults
    pub fn load(store: SettingsStore) -> Result<Self> {
        let mut values = HashMap::new();
        for pane in Pane::ALL {
            for context in ViewContext::ALL {
                let key = settings_key(pane, context);
                let count = match store.get(&key)? {
                    Some(raw) => match raw.trim().parse::<u32>() {
                        Ok(n) => context.clamp(n),
                        Err(_) => {
                            warn!(%key, value = %raw, "ignoring unreadable column count");
                            context.default_columns()
                        }
                    },
                    None => context.default_columns(),
                };
                values.insert((pane, context), count);
            }
        }
        Ok(Self { store, values })
    }

    pub fn get(&self, pane: Pane, context: ViewContext) -> u32 {
        self.values
            .get(&(pane, context))
            .copied()
            .unwrap_or_else(|| context.default_columns())
    }

    /// Clamp, remember and persist. Returns the stored count.
    pub fn set(&mut self, pane: Pane, context: ViewContext, count: u32) -> Result<u32> {
        let count = context.clamp(count);
        self.store.set(&settings_key(pane, context), &count.to_string())?;
        self.values.insert((pane, context), count);
        debug!(%pane, %context, count, "column count saved");
        Ok(count)
    }

    pub fn adjust(&mut self, pane: Pane, context: ViewContext, delta: i32) -> Result<u32> {
        let current = self.get(pane, context) as i64;
        let target = (current + delta as i64).max(0) as u32;
        self.set(pane, context, target)
    }
}
