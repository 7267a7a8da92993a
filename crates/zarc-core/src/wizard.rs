//! Report configuration wizard.
//!
//! ```text
//! SelectIndustry --pick--> SelectModules --generate--> Synthesizing --delay--> Ready
//!        ^                      |                                               |
//!        +--------back----------+                                               |
//!        +-------------------------------restart--------------------------------+
//! ```
//!
//! Generation is split in two: [`ReportWizard::start_generation`] performs the
//! guarded transition and hands back a [`SynthesisJob`] that owns everything it
//! needs. Running the job waits out the simulated delay, builds the report and
//! commits it to the catalog. Because the job does not borrow the wizard it can
//! be spawned, and a wizard closed mid-synthesis still yields its report.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn, Instrument};

use crate::catalog::ReportCatalog;
use crate::config::ZarcConfig;
use crate::domain::{OptionKind, Report, ReportId, ReportStatus, SelectOption, ValidationError};
use crate::export::{compose_sections, SectionWriter, TemplateWriter};
use crate::filter;
use crate::metrics::METRICS;
use crate::obs;
use crate::reference::ReferenceData;

/// Position in the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum WizardStep {
    SelectIndustry,
    SelectModules,
    Synthesizing,
    /// Terminal for this run; carries the report just created.
    Ready { report_id: ReportId },
}

impl WizardStep {
    pub fn index(&self) -> usize {
        match self {
            WizardStep::SelectIndustry => 0,
            WizardStep::SelectModules => 1,
            WizardStep::Synthesizing => 2,
            WizardStep::Ready { .. } => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WizardStep::SelectIndustry => "selecting an industry",
            WizardStep::SelectModules => "selecting modules",
            WizardStep::Synthesizing => "synthesizing",
            WizardStep::Ready { .. } => "ready",
        }
    }
}

/// Stepper labels, one per [`WizardStep`].
pub const STEP_LABELS: [&str; 4] = ["Select Industry", "Add Modules", "Synthesis", "Delivery"];

/// How a stepper entry should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Done,
    Current,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepperEntry {
    pub label: &'static str,
    pub status: StepStatus,
}

/// Transient choices collected during one wizard session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardSelection {
    pub industry: Option<SelectOption>,
    /// Ordered, unique by id.
    pub modules: Vec<SelectOption>,
    /// Live filter over the list shown in the current step.
    pub search_query: String,
}

/// Multi-step flow that collects a selection and produces a report.
pub struct ReportWizard {
    session_id: String,
    catalog: Arc<dyn ReportCatalog>,
    reference: Arc<ReferenceData>,
    writer: Arc<dyn SectionWriter>,
    synthesis_delay: Duration,
    step: WizardStep,
    selection: WizardSelection,
}

impl std::fmt::Debug for ReportWizard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportWizard")
            .field("session_id", &self.session_id)
            .field("step", &self.step)
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

impl ReportWizard {
    pub fn new(
        catalog: Arc<dyn ReportCatalog>,
        reference: Arc<ReferenceData>,
        config: &ZarcConfig,
    ) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            catalog,
            reference,
            writer: Arc::new(TemplateWriter),
            synthesis_delay: config.synthesis_delay(),
            step: WizardStep::SelectIndustry,
            selection: WizardSelection::default(),
        }
    }

    /// Swap the section content generator.
    pub fn with_writer(mut self, writer: Arc<dyn SectionWriter>) -> Self {
        self.writer = writer;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn step(&self) -> &WizardStep {
        &self.step
    }

    pub fn selection(&self) -> &WizardSelection {
        &self.selection
    }

    pub fn selected_industry(&self) -> Option<&SelectOption> {
        self.selection.industry.as_ref()
    }

    pub fn selected_modules(&self) -> &[SelectOption] {
        &self.selection.modules
    }

    pub fn search_query(&self) -> &str {
        &self.selection.search_query
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.selection.search_query = query.into();
    }

    /// The reference list for the current step, filtered by the search query.
    pub fn visible_options(&self) -> Vec<SelectOption> {
        let list = match self.step {
            WizardStep::SelectIndustry => self.reference.industries(),
            WizardStep::SelectModules => self.reference.modules(),
            _ => return Vec::new(),
        };
        filter::filter_by_label(list, &self.selection.search_query)
    }

    /// Stepper state for the current position.
    pub fn steps(&self) -> Vec<StepperEntry> {
        let current = self.step.index();
        STEP_LABELS
            .into_iter()
            .enumerate()
            .map(|(i, label)| StepperEntry {
                label,
                status: if i < current {
                    StepStatus::Done
                } else if i == current {
                    StepStatus::Current
                } else {
                    StepStatus::Pending
                },
            })
            .collect()
    }

    /// Pick the industry and advance to module selection.
    ///
    /// On the first entry (no modules chosen yet) every module is preselected.
    pub fn select_industry(&mut self, industry_id: &str) -> Result<(), ValidationError> {
        self.expect_step(WizardStep::SelectIndustry)?;
        let industry = self
            .reference
            .industry(industry_id)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownOption {
                kind: OptionKind::Industry,
                id: industry_id.to_string(),
            })?;

        self.selection.industry = Some(industry);
        self.selection.search_query.clear();
        if self.selection.modules.is_empty() {
            self.selection.modules = self.reference.modules().to_vec();
        }
        self.step = WizardStep::SelectModules;

        let _span = obs::WizardSpan::enter(&self.session_id);
        obs::emit_industry_selected(industry_id, self.selection.modules.len());
        Ok(())
    }

    /// Return to industry selection. The selection itself is kept.
    pub fn back(&mut self) -> Result<(), ValidationError> {
        self.expect_step(WizardStep::SelectModules)?;
        self.selection.search_query.clear();
        self.step = WizardStep::SelectIndustry;
        Ok(())
    }

    pub fn toggle_module(&mut self, module_id: &str) -> Result<(), ValidationError> {
        self.expect_step(WizardStep::SelectModules)?;
        let module = self
            .reference
            .module(module_id)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownOption {
                kind: OptionKind::Module,
                id: module_id.to_string(),
            })?;
        self.selection.modules = filter::toggle_selection(&self.selection.modules, &module);
        Ok(())
    }

    pub fn select_all_visible(&mut self) -> Result<(), ValidationError> {
        self.expect_step(WizardStep::SelectModules)?;
        let visible = self.visible_options();
        self.selection.modules = filter::select_all_visible(&self.selection.modules, &visible);
        Ok(())
    }

    pub fn deselect_all_visible(&mut self) -> Result<(), ValidationError> {
        self.expect_step(WizardStep::SelectModules)?;
        let visible = self.visible_options();
        self.selection.modules = filter::deselect_all_visible(&self.selection.modules, &visible);
        Ok(())
    }

    /// The Select All / Deselect All button.
    pub fn toggle_all_visible(&mut self) -> Result<(), ValidationError> {
        if self.all_visible_selected() {
            self.deselect_all_visible()
        } else {
            self.select_all_visible()
        }
    }

    pub fn all_visible_selected(&self) -> bool {
        filter::are_all_visible_selected(&self.selection.modules, &self.visible_options())
    }

    /// Why generation is currently disabled, if it is.
    pub fn validate_generate(&self) -> Result<(), ValidationError> {
        self.expect_step(WizardStep::SelectModules)?;
        if self.selection.industry.is_none() {
            return Err(ValidationError::NoIndustrySelected);
        }
        if self.selection.modules.is_empty() {
            return Err(ValidationError::NoModulesSelected);
        }
        Ok(())
    }

    pub fn can_generate(&self) -> bool {
        self.validate_generate().is_ok()
    }

    /// Enter `Synthesizing` and hand back the job that builds the report.
    ///
    /// Returns `None` and changes nothing while generation is disabled.
    pub fn start_generation(&mut self) -> Option<SynthesisJob> {
        if let Err(reason) = self.validate_generate() {
            METRICS.inc_validation_rejections();
            debug!(wizard_id = %self.session_id, %reason, "generate ignored");
            return None;
        }
        let industry = self.selection.industry.clone()?;

        self.step = WizardStep::Synthesizing;
        Some(SynthesisJob {
            industry,
            modules: self.selection.modules.clone(),
            delay: self.synthesis_delay,
            catalog: Arc::clone(&self.catalog),
            writer: Arc::clone(&self.writer),
        })
    }

    /// Move from `Synthesizing` to `Ready` once the job has committed.
    pub fn finish(&mut self, report_id: ReportId) -> Result<(), ValidationError> {
        self.expect_step(WizardStep::Synthesizing)?;
        self.step = WizardStep::Ready { report_id };
        Ok(())
    }

    /// Run the whole generation step in place.
    ///
    /// A no-op returning `None` while generation is disabled.
    pub async fn generate(&mut self) -> Option<ReportId> {
        let job = {
            let _span = obs::WizardSpan::enter(&self.session_id);
            self.start_generation()?
        };
        let report = job.run().instrument(obs::wizard_span(&self.session_id)).await;
        self.finish(report.id.clone()).ok()?;
        Some(report.id)
    }

    /// Clear every choice and start over.
    pub fn restart(&mut self) {
        self.selection = WizardSelection::default();
        self.step = WizardStep::SelectIndustry;
    }

    /// Close the wizard and hand over the report to view.
    pub fn view_report(self) -> Result<ReportId, ValidationError> {
        match self.step {
            WizardStep::Ready { report_id } => Ok(report_id),
            other => Err(ValidationError::WrongStep {
                step: other.name().to_string(),
            }),
        }
    }

    fn expect_step(&self, expected: WizardStep) -> Result<(), ValidationError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(ValidationError::WrongStep {
                step: self.step.name().to_string(),
            })
        }
    }
}

/// A pending generation detached from the wizard that started it.
pub struct SynthesisJob {
    industry: SelectOption,
    modules: Vec<SelectOption>,
    delay: Duration,
    catalog: Arc<dyn ReportCatalog>,
    writer: Arc<dyn SectionWriter>,
}

impl SynthesisJob {
    pub fn industry(&self) -> &SelectOption {
        &self.industry
    }

    pub fn modules(&self) -> &[SelectOption] {
        &self.modules
    }

    /// Wait out the simulated delay, then build and commit the report.
    ///
    /// Always succeeds; there is no failure path for generation.
    pub async fn run(self) -> Report {
        obs::emit_generation_started(&self.industry.label, self.modules.len());
        tokio::time::sleep(self.delay).await;

        let report = self.build_report();
        self.catalog.add(report.clone());

        METRICS.inc_reports_generated();
        obs::emit_report_generated(report.id.as_str(), &report.industry, report.modules.len());
        report
    }

    fn build_report(&self) -> Report {
        let modules: Vec<String> = self.modules.iter().map(|m| m.label.clone()).collect();
        let sections = compose_sections(&self.industry.label, &modules, self.writer.as_ref());
        Report {
            id: self.fresh_id(),
            title: Report::title_for(&self.industry.label),
            industry: self.industry.label.clone(),
            created_at: Utc::now(),
            file_size: synthesize_file_size(),
            status: ReportStatus::Completed,
            modules,
            sections: Some(sections),
        }
    }

    /// A generated id not already present in the catalog.
    fn fresh_id(&self) -> ReportId {
        loop {
            let id = ReportId::generate();
            if !self.catalog.contains(&id) {
                return id;
            }
            warn!(report_id = %id, "generated report id collided, retrying");
        }
    }
}

/// Cosmetic "X.Y MB" between 0.5 and 5.0 MB.
fn synthesize_file_size() -> String {
    let tenths: u32 = rand::thread_rng().gen_range(5..=50);
    format!("{}.{} MB", tenths / 10, tenths % 10)
}
