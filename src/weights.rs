use crate::error::ScoreError;

/// Raw, possibly unnormalized weights keyed by criterion column, in the order
/// they were supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriterionWeights {
    entries: Vec<(String, f64)>,
}

impl CriterionWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the weight for `column`, replacing any earlier value.
    pub fn with_weight(mut self, column: impl Into<String>, weight: f64) -> Self {
        self.set(column, weight);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, weight: f64) {
        let column = column.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = weight,
            None => self.entries.push((column, weight)),
        }
    }

    /// Aligns `weights` with `criteria` by position. Trailing criteria without
    /// a weight stay unweighted.
    pub fn positional(criteria: &[String], weights: &[f64]) -> Result<Self, ScoreError> {
        if weights.len() > criteria.len() {
            return Err(ScoreError::WeightCountMismatch {
                weights: weights.len(),
                criteria: criteria.len(),
            });
        }

        Ok(Self {
            entries: criteria
                .iter()
                .cloned()
                .zip(weights.iter().copied())
                .collect(),
        })
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, w)| *w)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    /// Weights rescaled to sum to one.
    pub fn normalized(&self) -> Result<Vec<(String, f64)>, ScoreError> {
        for (criterion, weight) in &self.entries {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ScoreError::InvalidWeight {
                    criterion: criterion.clone(),
                    weight: *weight,
                });
            }
        }

        // Scale by the largest weight first so the sum cannot overflow.
        let largest = self.entries.iter().map(|(_, w)| *w).fold(0.0, f64::max);
        if largest <= 0.0 {
            return Err(ScoreError::ZeroWeightSum);
        }
        let total: f64 = self.entries.iter().map(|(_, w)| w / largest).sum();

        Ok(self
            .entries
            .iter()
            .map(|(c, w)| (c.clone(), w / largest / total))
            .collect())
    }
}
