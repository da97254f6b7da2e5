//! Dependent division → district → upazila selection.
//!
//! Selectors never talk to the network. A selection that needs new options
//! returns a [`LookupRequest`] stamped with the generation of the level it
//! fills; the caller runs it and hands the result back through
//! [`CascadeController::on_lookup_completed`]. Every selection above a level
//! bumps that level's generation, and results stamped with an older one are
//! dropped, so a slow earlier lookup can never overwrite the state left by a
//! later one. This holds even when the same parent is selected again.

use shared::domain::{option_value, AdminLevel, LocationSelection};

use crate::error::{DirectoryError, FormError};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupRequest {
    Divisions {
        generation: u64,
    },
    Districts {
        division: String,
        generation: u64,
    },
    Upazilas {
        division: String,
        district: String,
        generation: u64,
    },
}

impl LookupRequest {
    pub fn level(&self) -> AdminLevel {
        match self {
            LookupRequest::Divisions { .. } => AdminLevel::Division,
            LookupRequest::Districts { .. } => AdminLevel::District,
            LookupRequest::Upazilas { .. } => AdminLevel::Upazila,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            LookupRequest::Divisions { generation }
            | LookupRequest::Districts { generation, .. }
            | LookupRequest::Upazilas { generation, .. } => *generation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Applied { level: AdminLevel, count: usize },
    Stale { level: AdminLevel },
    Failed { level: AdminLevel, error: DirectoryError },
}

#[derive(Debug, Clone, Default)]
pub struct CascadeController {
    selection: LocationSelection,
    divisions: Vec<String>,
    districts: Vec<String>,
    upazilas: Vec<String>,
    division_generation: u64,
    district_generation: u64,
    upazila_generation: u64,
}

impl CascadeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &LocationSelection {
        &self.selection
    }

    pub fn division_options(&self) -> &[String] {
        &self.divisions
    }

    pub fn district_options(&self) -> &[String] {
        &self.districts
    }

    pub fn upazila_options(&self) -> &[String] {
        &self.upazilas
    }

    pub fn load_divisions(&mut self) -> LookupRequest {
        self.division_generation += 1;
        LookupRequest::Divisions {
            generation: self.division_generation,
        }
    }

    /// Accepts a label or its canonical value, or `""` to unselect.
    pub fn select_division(&mut self, value: &str) -> Result<Option<LookupRequest>, FormError> {
        let division = resolve_option(AdminLevel::Division, &self.divisions, value)?;
        self.selection.division = division.clone();
        self.clear_district();

        if division.is_empty() {
            return Ok(None);
        }
        Ok(Some(LookupRequest::Districts {
            division,
            generation: self.district_generation,
        }))
    }

    pub fn select_district(&mut self, value: &str) -> Result<Option<LookupRequest>, FormError> {
        let district = resolve_option(AdminLevel::District, &self.districts, value)?;
        self.selection.district = district.clone();
        self.clear_upazila();

        if district.is_empty() {
            return Ok(None);
        }
        Ok(Some(LookupRequest::Upazilas {
            division: self.selection.division.clone(),
            district,
            generation: self.upazila_generation,
        }))
    }

    pub fn select_upazila(&mut self, value: &str) -> Result<(), FormError> {
        self.selection.upazila = resolve_option(AdminLevel::Upazila, &self.upazilas, value)?;
        Ok(())
    }

    pub fn set_union(&mut self, text: impl Into<String>) {
        self.selection.union = text.into();
    }

    pub fn on_lookup_completed(
        &mut self,
        request: &LookupRequest,
        result: Result<Vec<String>, DirectoryError>,
    ) -> LookupOutcome {
        match request {
            LookupRequest::Divisions { generation } => {
                self.on_divisions_loaded(*generation, result)
            }
            LookupRequest::Districts { generation, .. } => {
                self.on_districts_loaded(*generation, result)
            }
            LookupRequest::Upazilas { generation, .. } => {
                self.on_upazilas_loaded(*generation, result)
            }
        }
    }

    pub fn on_divisions_loaded(
        &mut self,
        generation: u64,
        result: Result<Vec<String>, DirectoryError>,
    ) -> LookupOutcome {
        let level = AdminLevel::Division;
        if generation != self.division_generation {
            return LookupOutcome::Stale { level };
        }
        match result {
            Ok(divisions) => {
                self.divisions = divisions;
                LookupOutcome::Applied {
                    level,
                    count: self.divisions.len(),
                }
            }
            Err(error) => {
                self.divisions.clear();
                self.selection.division.clear();
                self.clear_district();
                LookupOutcome::Failed { level, error }
            }
        }
    }

    pub fn on_districts_loaded(
        &mut self,
        generation: u64,
        result: Result<Vec<String>, DirectoryError>,
    ) -> LookupOutcome {
        let level = AdminLevel::District;
        if generation != self.district_generation {
            return LookupOutcome::Stale { level };
        }
        match result {
            Ok(districts) => {
                self.districts = districts;
                LookupOutcome::Applied {
                    level,
                    count: self.districts.len(),
                }
            }
            Err(error) => {
                self.clear_district();
                LookupOutcome::Failed { level, error }
            }
        }
    }

    pub fn on_upazilas_loaded(
        &mut self,
        generation: u64,
        result: Result<Vec<String>, DirectoryError>,
    ) -> LookupOutcome {
        let level = AdminLevel::Upazila;
        if generation != self.upazila_generation {
            return LookupOutcome::Stale { level };
        }
        match result {
            Ok(upazilas) => {
                self.upazilas = upazilas;
                LookupOutcome::Applied {
                    level,
                    count: self.upazilas.len(),
                }
            }
            Err(error) => {
                self.clear_upazila();
                LookupOutcome::Failed { level, error }
            }
        }
    }

    // Clearing a level supersedes any lookup still outstanding for it.
    fn clear_district(&mut self) {
        self.district_generation += 1;
        self.selection.district.clear();
        self.districts.clear();
        self.clear_upazila();
    }

    fn clear_upazila(&mut self) {
        self.upazila_generation += 1;
        self.selection.upazila.clear();
        self.upazilas.clear();
    }
}

fn resolve_option(level: AdminLevel, options: &[String], raw: &str) -> Result<String, FormError> {
    let value = option_value(raw);
    if value.is_empty() || options.iter().any(|label| option_value(label) == value) {
        Ok(value)
    } else {
        Err(FormError::UnknownOption { level, value })
    }
}

#[cfg(test)]
#[path = "tests/cascade_tests.rs"]
mod tests;
