use anyhow::Result;

use crate::columns::{ColumnSettings, ViewContext};
use crate::model::Pane;
use crate::settings::SettingsStore;

#[derive(Debug, Default)]
pub struct ColumnsOptions {
    /// Restrict to one pane (both when absent)
    pub pane: Option<Pane>,
    /// Restrict to one context (all when absent)
    pub context: Option<ViewContext>,
    /// New count for the selected panes and contexts
    pub set: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRow {
    pub pane: Pane,
    pub context: ViewContext,
    pub count: u32,
    pub bounds: (u32, u32),
}

/// Show, and optionally change, persisted column counts
pub fn run_columns(store: SettingsStore, options: ColumnsOptions) -> Result<Vec<ColumnRow>> {
    let mut settings = ColumnSettings::load(store)?;

    let panes: Vec<Pane> = match options.pane {
        Some(pane) => vec![pane],
        None => Pane::ALL.to_vec(),
    };
    let contexts: Vec<ViewContext> = match options.context {
        Some(context) => vec![context],
        None => ViewContext::ALL.to_vec(),
    };

    let mut rows = Vec::with_capacity(panes.len() * contexts.len());
    for &pane in &panes {
        for &context in &contexts {
            let count = match options.set {
                Some(count) => settings.set(pane, context, count)?,
                None => settings.get(pane, context),
            };
            rows.push(ColumnRow {
                pane,
                context,
                count,
                bounds: context.bounds(),
            });
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lists_every_pane_and_context() {
        let rows = run_columns(SettingsStore::open_in_memory().unwrap(), ColumnsOptions::default())
            .unwrap();
        assert_eq!(rows.len(), 8);
        assert!(rows
            .iter()
            .all(|row| row.count == row.context.default_columns()));
    }

    #[test]
    fn test_set_is_clamped_and_persisted() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.db");

        let rows = run_columns(
            SettingsStore::open(&path).unwrap(),
            ColumnsOptions {
                pane: Some(Pane::Destination),
                context: Some(ViewContext::MobileSingle),
                set: Some(12),
            },
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 6);

        let rows = run_columns(
            SettingsStore::open(&path).unwrap(),
            ColumnsOptions {
                context: Some(ViewContext::MobileSingle),
                ..Default::default()
            },
        )
        .unwrap();
        let counts: Vec<(Pane, u32)> = rows.iter().map(|r| (r.pane, r.count)).collect();
        assert_eq!(counts, vec![(Pane::Source, 4), (Pane::Destination, 6)]);
    }
}
