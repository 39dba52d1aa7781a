use std::path::{Path, PathBuf};

use crate::budget::{recommend, BudgetRecommendation};
use crate::error::{Result, SpendError};
use crate::filter::Filter;
use crate::insight::{generate_insight, TextGenerator};
use crate::loader::load_table;
use crate::models::Transaction;
use crate::preprocess::{preprocess, ValidationReport};
use crate::report::{render_markdown, NO_NARRATIVE};
use crate::settings::Settings;
use crate::summary::{summarize, Summary};

struct CachedInsight {
    filter: Filter,
    text: String,
}

/// Everything one interactive run works with: the cleaned dataset, the
/// current filter, and the AI narrative fetched for that filter. Owned by the
/// caller and passed by reference; nothing here is global.
pub struct Session {
    pub source: PathBuf,
    pub transactions: Vec<Transaction>,
    pub validation: ValidationReport,
    filter: Filter,
    insight: Option<CachedInsight>,
}

impl Session {
    pub fn open(path: &Path) -> Result<Session> {
        let raw = load_table(path)?;
        let cleaned = preprocess(&raw)?;
        Ok(Session::from_parts(path, cleaned.transactions, cleaned.report))
    }

    pub fn from_parts(
        source: &Path,
        transactions: Vec<Transaction>,
        validation: ValidationReport,
    ) -> Session {
        Session {
            source: source.to_path_buf(),
            transactions,
            validation,
            filter: Filter::default(),
            insight: None,
        }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Replace the filter. A cached narrative only survives if the filter is
    /// unchanged.
    pub fn set_filter(&mut self, filter: Filter) {
        if self.filter != filter {
            self.insight = None;
        }
        self.filter = filter;
    }

    pub fn update_filter(&mut self, change: impl FnOnce(&mut Filter)) {
        let mut next = self.filter.clone();
        change(&mut next);
        self.set_filter(next);
    }

    pub fn selected(&self) -> Vec<Transaction> {
        self.filter.apply(&self.transactions)
    }

    /// Summary of the current selection, or `NoMatchingData` when the filter
    /// leaves nothing.
    pub fn summary(&self) -> Result<Summary> {
        let summary = summarize(&self.selected());
        if summary.is_empty() {
            return Err(SpendError::NoMatchingData);
        }
        Ok(summary)
    }

    pub fn budget(&self) -> Result<Vec<BudgetRecommendation>> {
        Ok(recommend(&self.summary()?))
    }

    pub fn cached_insight(&self) -> Option<&str> {
        self.insight
            .as_ref()
            .filter(|c| c.filter == self.filter)
            .map(|c| c.text.as_str())
    }

    /// Return the cached narrative for the current filter, fetching it first
    /// if needed. A failed fetch leaves the cache untouched.
    pub fn insight(&mut self, generator: &dyn TextGenerator, settings: &Settings) -> Result<&str> {
        if self.cached_insight().is_none() {
            let summary = self.summary()?;
            let text = generate_insight(generator, &summary, settings)?;
            self.insight = Some(CachedInsight {
                filter: self.filter.clone(),
                text,
            });
        }
        Ok(self.cached_insight().unwrap_or_default())
    }

    pub fn render_report(&self, generated_at: chrono::NaiveDateTime) -> Result<String> {
        let summary = self.summary()?;
        let budget = recommend(&summary);
        let narrative = self.cached_insight().unwrap_or(NO_NARRATIVE);
        Ok(render_markdown(&summary, narrative, &budget, generated_at))
    }
}
