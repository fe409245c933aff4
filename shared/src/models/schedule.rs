//! Crop cycle stage schedule

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDate {
    pub stage: String,
    pub date: NaiveDate,
}

/// Ordered stage dates of a crop cycle (seeding, transplant, harvest, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropCycleSchedule {
    pub stages: Vec<StageDate>,
}

impl CropCycleSchedule {
    pub fn new(stages: Vec<StageDate>) -> Self {
        Self { stages }
    }

    pub fn date_of(&self, stage: &str) -> Option<NaiveDate> {
        self.stages.iter().find(|s| s.stage == stage).map(|s| s.date)
    }

    /// Move one stage to `new_date` and shift every later stage by the same
    /// number of days. Earlier stages are left alone. Returns the offset.
    ///
    /// Nothing is changed if any shifted date would overflow.
    pub fn shift_stage(&mut self, stage: &str, new_date: NaiveDate) -> Result<i64, ValidationError> {
        let position = self
            .stages
            .iter()
            .position(|s| s.stage == stage)
            .ok_or_else(|| ValidationError::UnknownStage(stage.to_string()))?;

        let offset = new_date.signed_duration_since(self.stages[position].date);
        let shifted = self.stages[position..]
            .iter()
            .map(|s| shift_date(s, offset))
            .collect::<Result<Vec<_>, _>>()?;
        for (later, date) in self.stages[position..].iter_mut().zip(shifted) {
            later.date = date;
        }
        Ok(offset.num_days())
    }

    /// Days between two stages, if both are scheduled
    pub fn days_between(&self, from: &str, to: &str) -> Option<i64> {
        let start = self.date_of(from)?;
        let end = self.date_of(to)?;
        Some((end - start).num_days())
    }

    pub fn shifted_by(&self, days: i64) -> Result<Self, ValidationError> {
        let offset = Duration::try_days(days)
            .ok_or_else(|| ValidationError::DateOutOfRange(self.first_stage_name()))?;
        let stages = self
            .stages
            .iter()
            .map(|s| {
                Ok(StageDate {
                    stage: s.stage.clone(),
                    date: shift_date(s, offset)?,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;
        Ok(Self { stages })
    }

    fn first_stage_name(&self) -> String {
        self.stages.first().map(|s| s.stage.clone()).unwrap_or_default()
    }
}

fn shift_date(stage: &StageDate, offset: Duration) -> Result<NaiveDate, ValidationError> {
    stage
        .date
        .checked_add_signed(offset)
        .ok_or_else(|| ValidationError::DateOutOfRange(stage.stage.clone()))
}
