//! Hot-swappable form registry

use crate::selector::FormSelector;
use arc_swap::ArcSwap;
use serde::Serialize;
use signup_common::{CategoryTree, FormDefinition, FormId, PageContext, Settings};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Configured forms in registry order
///
/// Readers always see a complete snapshot; `update` swaps the whole list at
/// once.
pub struct FormRegistry {
    forms: ArcSwap<Vec<FormDefinition>>,
    version: AtomicU64,
    selections: AtomicU64,
    matches: AtomicU64,
}

impl FormRegistry {
    /// Create empty registry
    pub fn new() -> Self {
        Self {
            forms: ArcSwap::from_pointee(Vec::new()),
            version: AtomicU64::new(0),
            selections: AtomicU64::new(0),
            matches: AtomicU64::new(0),
        }
    }

    /// Create with initial forms
    pub fn with_forms(forms: Vec<FormDefinition>) -> Self {
        let registry = Self::new();
        registry.forms.store(Arc::new(forms));
        registry.version.store(1, Ordering::Release);
        registry
    }

    /// Create from loaded settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_forms(settings.forms.clone())
    }

    /// Current version
    #[inline(always)]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Replace all forms atomically
    pub fn update(&self, forms: Vec<FormDefinition>) {
        let count = forms.len();
        self.forms.store(Arc::new(forms));
        let version = self.version.fetch_add(1, Ordering::Release) + 1;
        info!("Form registry updated: {} forms, version {}", count, version);
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<Vec<FormDefinition>> {
        self.forms.load_full()
    }

    /// Form by id
    pub fn get(&self, id: FormId) -> Option<FormDefinition> {
        self.forms.load().iter().find(|f| f.id == id).cloned()
    }

    /// Number of forms
    pub fn len(&self) -> usize {
        self.forms.load().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.forms.load().is_empty()
    }

    /// Select the form to display for `context`
    pub fn select(
        &self,
        context: &PageContext,
        allowed: &[FormId],
        categories: &CategoryTree,
    ) -> Option<FormDefinition> {
        let forms = self.forms.load();
        self.selections.fetch_add(1, Ordering::Relaxed);

        let selected = FormSelector::new(categories)
            .select(&forms, context, allowed)
            .cloned();

        if selected.is_some() {
            self.matches.fetch_add(1, Ordering::Relaxed);
        }
        selected
    }

    /// Registry statistics
    pub fn stats(&self) -> RegistryStats {
        let selections = self.selections.load(Ordering::Relaxed);
        let matches = self.matches.load(Ordering::Relaxed);

        RegistryStats {
            forms_loaded: self.len(),
            version: self.version(),
            selections,
            matches,
            match_rate: if selections > 0 { matches as f64 / selections as f64 } else { 0.0 },
        }
    }
}

impl Default for FormRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry statistics
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStats {
    /// Forms in the current snapshot
    pub forms_loaded: usize,
    /// Snapshot version
    pub version: u64,
    /// Selections run
    pub selections: u64,
    /// Selections that found a form
    pub matches: u64,
    /// `matches / selections`
    pub match_rate: f64,
}
