//! Planning coordinator - the stage pipeline
//!
//! collect -> assess -> filter -> integrate -> generate insights. Only the
//! collection stage is concurrent; the rest are pure functions of the
//! joined dataset.

use std::future::Future;
use std::path::Path;

use eyre::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Dataset, DeepNeeds, TravelFramework};
use crate::error::PlanError;
use crate::filter::{FilteredDataset, filter};
use crate::insight::{InsightSet, generate};
use crate::integrator::{IntegratedView, Integrator};
use crate::orchestrator::Orchestrator;
use crate::quality::{QualityReport, assess};

/// Framework plus deep needs, as produced by the upstream stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningRequest {
    pub framework: TravelFramework,
    #[serde(default)]
    pub needs: DeepNeeds,
}

impl PlanningRequest {
    pub fn new(framework: TravelFramework, needs: DeepNeeds) -> Self {
        Self { framework, needs }
    }

    /// Parse a request document
    ///
    /// A malformed `framework` is an invalid framework; a malformed `needs`
    /// section is an upstream contract violation.
    pub fn from_yaml(content: &str) -> Result<Self, PlanError> {
        debug!(len = content.len(), "PlanningRequest::from_yaml: called");
        let doc: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| PlanError::InvalidFramework(e.to_string()))?;

        let framework = doc
            .get("framework")
            .cloned()
            .ok_or_else(|| PlanError::InvalidFramework("request has no framework section".to_string()))?;
        let framework: TravelFramework =
            serde_yaml::from_value(framework).map_err(|e| PlanError::InvalidFramework(e.to_string()))?;

        let needs = match doc.get("needs") {
            Some(value) if !value.is_null() => serde_yaml::from_value(value.clone())
                .map_err(|e| PlanError::UpstreamContract(format!("needs: {}", e)))?,
            _ => DeepNeeds::default(),
        };

        Ok(Self { framework, needs })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
        Ok(Self::from_yaml(&content)?)
    }

    /// Every fail-fast input rule, without touching a provider
    pub fn validate(&self) -> Result<(), PlanError> {
        self.framework.validate()?;
        self.needs.validate()
    }
}

/// Everything one planning run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinationResult {
    pub raw_dataset: Dataset,
    pub filtered_dataset: FilteredDataset,
    pub integrated_view: IntegratedView,
    pub insight_set: InsightSet,
    pub quality_report: QualityReport,
}

pub struct PlanningCoordinator {
    orchestrator: Orchestrator,
    integrator: Integrator,
}

impl PlanningCoordinator {
    pub fn new(orchestrator: Orchestrator, integrator: Integrator) -> Self {
        Self {
            orchestrator,
            integrator,
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub async fn run(&self, request: &PlanningRequest) -> Result<CoordinationResult, PlanError> {
        self.run_until(request, std::future::pending()).await
    }

    /// Run the pipeline, abandoning collection when `cancel` resolves
    pub async fn run_until<C>(&self, request: &PlanningRequest, cancel: C) -> Result<CoordinationResult, PlanError>
    where
        C: Future<Output = ()>,
    {
        debug!(
            destinations = request.framework.destinations.len(),
            constraints = request.needs.constraints.len(),
            "PlanningCoordinator::run_until: called"
        );
        request.needs.validate()?;

        let raw_dataset = self.orchestrator.collect_until(&request.framework, cancel).await?;
        let quality_report = assess(&raw_dataset);
        let filtered_dataset = filter(&raw_dataset, &request.needs.constraints);
        let integrated_view = self.integrator.integrate(&filtered_dataset.dataset);
        let insight_set = generate(
            &integrated_view,
            &request.framework,
            &request.needs.deep_preferences,
            &filtered_dataset.deferred,
        );

        info!(
            completeness = quality_report.completeness,
            needs_completion = quality_report.needs_completion,
            conflicts = integrated_view.conflicts.len(),
            warnings = insight_set.warnings.len(),
            "Planning run finished"
        );

        Ok(CoordinationResult {
            raw_dataset,
            filtered_dataset,
            integrated_view,
            insight_set,
            quality_report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::{Category, Constraint, DeepPreference, fixtures::framework, tags};
    use crate::orchestrator::OrchestratorConfig;
    use crate::provider::{KnowledgeBase, Providers, StaticProvider};
    use crate::provider::mock::MockProvider;
    use crate::provider::Capability;

    const REQUEST: &str = r#"
framework:
  theme:
    primary_theme: cultural-immersion
  destinations:
    - name: Dali
    - name: Shaxi
      commercial_level: low
  duration_days: 7
  total_budget: 8000
  travel_dates:
    check_in: 2024-06-01
    check_out: 2024-06-08
needs:
  deep_preferences:
    - type: cultural
      preference: craves deep cultural contact
      confidence: 0.9
      rationale: asked about Bai villages
  constraints:
    - type: soft
      text: avoid over-commercialized places
    - type: hard
      text: back in Beijing by June 8
"#;

    fn coordinator(providers: Providers) -> PlanningCoordinator {
        let routes = KnowledgeBase::builtin().routes;
        PlanningCoordinator::new(
            Orchestrator::new(providers, OrchestratorConfig::default()),
            Integrator::new(routes),
        )
    }

    fn static_providers() -> Providers {
        Providers::from_all(Arc::new(StaticProvider::new(KnowledgeBase::builtin())))
    }

    #[test]
    fn test_parse_request() {
        let request = PlanningRequest::from_yaml(REQUEST).unwrap();
        assert_eq!(request.framework.destinations.len(), 2);
        assert_eq!(request.needs.constraints.len(), 2);
        assert!(request.needs.has_preference(tags::CRAVES_DEEP_CULTURAL_CONTACT));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_missing_needs_defaults_to_empty() {
        let framework_only = REQUEST.split("needs:").next().unwrap();
        let request = PlanningRequest::from_yaml(framework_only).unwrap();
        assert!(request.needs.constraints.is_empty());
    }

    #[test]
    fn test_non_canonical_preferences_are_contract_violations() {
        let doc = REQUEST.replace(
            "    - type: cultural\n      preference: craves deep cultural contact\n      confidence: 0.9\n      rationale: asked about Bai villages\n",
            "    cultural: craves deep cultural contact\n",
        );
        let err = PlanningRequest::from_yaml(&doc).unwrap_err();
        assert!(matches!(err, PlanError::UpstreamContract(_)));
    }

    #[test]
    fn test_missing_framework_is_invalid() {
        let err = PlanningRequest::from_yaml("needs: {}\n").unwrap_err();
        assert!(matches!(err, PlanError::InvalidFramework(_)));
    }

    #[tokio::test]
    async fn test_run_produces_every_stage() {
        let request = PlanningRequest::from_yaml(REQUEST).unwrap();
        let result = coordinator(static_providers()).run(&request).await.unwrap();

        assert_eq!(result.raw_dataset.len(), 2);
        assert_eq!(result.quality_report.completeness, 1.0);
        assert_eq!(result.filtered_dataset.applied.len(), 1);
        assert_eq!(result.filtered_dataset.deferred, vec![Constraint::hard("back in Beijing by June 8")]);
        assert_eq!(result.integrated_view.summaries.len(), 2);
        assert!(
            result
                .insight_set
                .recommendations
                .iter()
                .any(|r| r.message.contains("back in Beijing"))
        );
        assert!(!result.insight_set.opportunities.is_empty());
    }

    #[tokio::test]
    async fn test_run_rejects_bad_confidence_before_collecting() {
        let mock = Arc::new(MockProvider::new());
        let mut request = PlanningRequest::new(framework(&["Dali"]), DeepNeeds::default());
        request.needs.deep_preferences.push(DeepPreference {
            kind: "cultural".to_string(),
            preference: tags::CRAVES_DEEP_CULTURAL_CONTACT.to_string(),
            confidence: 1.5,
            rationale: String::new(),
        });

        let err = coordinator(Providers::from_all(mock.clone())).run(&request).await.unwrap_err();
        assert!(matches!(err, PlanError::UpstreamContract(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_run_with_failed_lodging_still_completes() {
        let mock = Arc::new(MockProvider::new().fail_on(Capability::Lodging, "Dali"));
        let request = PlanningRequest::new(framework(&["Dali", "Shaxi"]), DeepNeeds::default());
        let result = coordinator(Providers::from_all(mock)).run(&request).await.unwrap();

        assert!(result.quality_report.needs_completion);
        assert_eq!(result.quality_report.completion_requests().len(), 1);
        assert_eq!(result.quality_report.issues[0].category, Category::Accommodation);
        assert_eq!(result.integrated_view.summaries.len(), 2);
    }
}
