use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::{Local, NaiveDate};

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::cache::PreparedCache;
use crate::data::export::export_top_n;
use crate::data::filter::{FilterState, RangeControl};
use crate::data::model::{Category, StudentTable};
use crate::data::pipeline::{evaluate, range_controls, Evaluation};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Everything one dashboard session owns, independent of rendering.
pub struct SessionState {
    pub config: DashboardConfig,

    /// Prepared tables keyed by file content.
    cache: PreparedCache,

    /// Path of the loaded roster.
    pub source: Option<PathBuf>,

    /// Prepared table (None until a file is loaded).
    pub table: Option<Arc<StudentTable>>,

    /// Current filter inputs.
    pub filters: FilterState,

    /// Result of the last evaluation.
    pub evaluation: Option<Evaluation>,

    /// Filters the current `evaluation` was computed from.
    evaluated_for: Option<FilterState>,

    /// Age and height bounds of the last evaluation. A chosen range only
    /// survives while these stay the same.
    range_bounds: Option<(RangeControl, RangeControl)>,

    /// Colours per blood type and per hair colour, stable across filters.
    pub blood_colors: ColorMap,
    pub hair_colors: ColorMap,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,

    /// Outcome of the last top-N export.
    pub export_message: Option<Result<String, String>>,
}

impl SessionState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            cache: PreparedCache::default(),
            source: None,
            table: None,
            filters: FilterState::default(),
            evaluation: None,
            evaluated_for: None,
            range_bounds: None,
            blood_colors: ColorMap::default(),
            hair_colors: ColorMap::default(),
            status_message: None,
            export_message: None,
        }
    }

    /// Load (or reuse) the prepared table for `path` and reset the filters.
    /// The top-N reports are regenerated whenever a table is freshly prepared.
    pub fn load_source(&mut self, path: &Path) {
        match self.try_load(path, Local::now().date_naive()) {
            Ok(fresh) => {
                self.status_message = None;
                if fresh {
                    self.export_top();
                }
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    fn try_load(&mut self, path: &Path, today: NaiveDate) -> Result<bool> {
        let (table, fresh) = self.cache.get_or_prepare(path, today)?;
        log::info!(
            "Session now showing {} students from {}",
            table.len(),
            path.display()
        );
        self.blood_colors = ColorMap::new(table.distinct(Category::BloodType));
        self.hair_colors = ColorMap::new(table.distinct(Category::HairColor));
        self.table = Some(table);
        self.source = Some(path.to_path_buf());
        self.filters = FilterState::default();
        self.evaluation = None;
        self.evaluated_for = None;
        self.range_bounds = None;
        self.refresh();
        Ok(fresh)
    }

    /// Re-run the filter & aggregate stage if the inputs changed since the
    /// last run. A range whose bounds moved goes back to the full bounds.
    pub fn refresh(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        if self.evaluated_for.as_ref() == Some(&self.filters) {
            return;
        }
        let (age, height) = range_controls(table, &self.filters);
        if let Some((prev_age, prev_height)) = self.range_bounds {
            if prev_age != age && self.filters.age_range.take().is_some() {
                log::debug!("Age bounds changed; range reset");
            }
            if prev_height != height && self.filters.height_range.take().is_some() {
                log::debug!("Height bounds changed; range reset");
            }
        }
        self.range_bounds = Some((age, height));
        self.evaluation = Some(evaluate(table, &self.filters));
        self.evaluated_for = Some(self.filters.clone());
    }

    /// Write the top-N by height and by weight of the full prepared table.
    pub fn export_top(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        let height_path = self.config.top_height_path();
        let weight_path = self.config.top_weight_path();
        self.export_message = Some(
            match export_top_n(table, self.config.top_n, &height_path, &weight_path) {
                Ok(()) => Ok(format!(
                    "Files written: {} and {}",
                    height_path.display(),
                    weight_path.display()
                )),
                Err(e) => {
                    log::error!("Top-N export failed: {e}");
                    Err(format!("Export failed: {e}"))
                }
            },
        );
    }

    pub fn toggle_filter_value(&mut self, category: Category, value: &str) {
        self.filters.toggle(category, value);
        self.refresh();
    }

    pub fn clear_filter(&mut self, category: Category) {
        self.filters.clear(category);
        self.refresh();
    }

    pub fn set_group_only(&mut self, group_only: bool) {
        self.filters.group_only = group_only;
        self.refresh();
    }

    pub fn set_age_range(&mut self, range: (i64, i64)) {
        self.filters.age_range = Some(range);
        self.refresh();
    }

    pub fn set_height_range(&mut self, range: (i64, i64)) {
        self.filters.height_range = Some(range);
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "Código,RH,Color_Cabello,Barrio_Residencia,Fecha_Nacimiento,Estatura,Peso,Talla_Zapato";

    fn write_roster(dir: &Path) -> PathBuf {
        let path = dir.join("roster.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "202310254018,o+,NEGRO,centro,2003-05-01,1.80,90,42").unwrap();
        writeln!(file, "S2,a-,rubio,norte,2004-02-10,1.62,55,37").unwrap();
        writeln!(file, "S3,o+,castaño,sur,not-a-date,1.70,68,40").unwrap();
        writeln!(file, "S4,,castaño,sur,2002-01-01,1.75,70,41").unwrap();
        path
    }

    fn session(dir: &Path) -> SessionState {
        SessionState::new(DashboardConfig {
            output_dir: dir.to_path_buf(),
            ..Default::default()
        })
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn load_prepares_and_evaluates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_roster(dir.path());
        let mut state = session(dir.path());

        assert!(state.try_load(&path, today()).unwrap());
        let table = state.table.clone().unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.records[0].is_group_member);
        match state.evaluation.as_ref().unwrap() {
            // S3 has no valid birth date, so the age range drops it.
            Evaluation::Ready(view) => assert_eq!(view.indices, vec![0, 1]),
            Evaluation::NoData => panic!("expected data"),
        }
    }

    #[test]
    fn reload_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_roster(dir.path());
        let mut state = session(dir.path());
        assert!(state.try_load(&path, today()).unwrap());
        let first = state.table.clone().unwrap();
        assert!(!state.try_load(&path, today()).unwrap());
        assert!(Arc::ptr_eq(&first, state.table.as_ref().unwrap()));
    }

    #[test]
    fn group_toggle_and_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_roster(dir.path());
        let mut state = session(dir.path());
        state.try_load(&path, today()).unwrap();

        state.set_group_only(true);
        match state.evaluation.as_ref().unwrap() {
            Evaluation::Ready(view) => assert_eq!(view.indices, vec![0]),
            Evaluation::NoData => panic!("expected data"),
        }

        state.toggle_filter_value(Category::BloodType, "A-");
        assert_eq!(state.evaluation, Some(Evaluation::NoData));

        state.clear_filter(Category::BloodType);
        state.set_group_only(false);
        assert!(matches!(state.evaluation, Some(Evaluation::Ready(_))));
    }

    #[test]
    fn chosen_range_resets_when_bounds_move() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_roster(dir.path());
        let mut state = session(dir.path());
        state.try_load(&path, today()).unwrap();

        state.set_height_range((170, 180));
        assert_eq!(state.filters.height_range, Some((170, 180)));

        // O+ narrows the heights to 170..180, so the chosen range is dropped.
        state.toggle_filter_value(Category::BloodType, "O+");
        assert_eq!(state.filters.height_range, None);
        match state.evaluation.as_ref().unwrap() {
            Evaluation::Ready(view) => assert_eq!(view.height_applied, (170, 180)),
            Evaluation::NoData => panic!("expected data"),
        }

        // Re-evaluating over the same subset keeps the range.
        state.set_height_range((175, 180));
        state.set_age_range((20, 30));
        assert_eq!(state.filters.height_range, Some((175, 180)));
        match state.evaluation.as_ref().unwrap() {
            Evaluation::Ready(view) => assert_eq!(view.indices, vec![0]),
            Evaluation::NoData => panic!("expected data"),
        }
    }

    #[test]
    fn export_writes_both_reports() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_roster(dir.path());
        let mut state = session(dir.path());
        state.try_load(&path, today()).unwrap();
        state.toggle_filter_value(Category::BloodType, "A-");

        state.export_top();
        assert!(matches!(state.export_message, Some(Ok(_))));
        assert!(dir.path().join("Top5_Estatura.xlsx").exists());
        assert!(dir.path().join("Top5_Peso.xlsx").exists());
    }

    #[test]
    fn bad_file_sets_status() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = session(dir.path());
        state.load_source(&dir.path().join("missing.csv"));
        assert!(state.status_message.unwrap().starts_with("Error"));
        assert!(state.table.is_none());
    }
}
