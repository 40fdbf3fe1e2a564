//! Runs the category comparisons between two schemas.
//!
//! Order is fixed: triggers, functions, tables, then columns and indexes for
//! each table. Columns and indexes are only compared when both sides have the
//! same set of tables.

use serde::Serialize;

use crate::diff::{compare_names, normalize_names, ComparisonResult};
use crate::filter::Filter;
use crate::model::{MetadataCategory, NameList};
use crate::reader::SchemaRef;
use crate::util::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Compared(ComparisonResult),
    NotCompared { reason: String },
}

/// Result of one category comparison, for one table when the category is table-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOutcome {
    pub category: MetadataCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl CategoryOutcome {
    pub fn comparison(&self) -> Option<&ComparisonResult> {
        match &self.status {
            OutcomeStatus::Compared(result) => Some(result),
            OutcomeStatus::NotCompared { .. } => None,
        }
    }

    /// Compared and found no difference.
    pub fn is_equal(&self) -> bool {
        self.comparison().is_some_and(|result| result.equal)
    }
}

/// Receives each outcome as soon as it is known.
///
/// `Send` so a comparison holding the sink can run on a spawned task.
pub trait ReportSink: Send {
    fn record(&mut self, outcome: &CategoryOutcome);
}

impl ReportSink for Vec<CategoryOutcome> {
    fn record(&mut self, outcome: &CategoryOutcome) {
        self.push(outcome.clone());
    }
}

/// Sink for callers that only want the final [`DriftReport`].
pub struct DiscardSink;

impl ReportSink for DiscardSink {
    fn record(&mut self, _outcome: &CategoryOutcome) {}
}

#[derive(Debug, Clone, Default)]
pub struct DriftOptions {
    pub filter: Filter,
    /// Record fetch failures as "not compared" and carry on instead of aborting.
    pub keep_going: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    pub left_schema: String,
    pub right_schema: String,
    pub tables_equal: bool,
    pub has_drift: bool,
    pub outcomes: Vec<CategoryOutcome>,
}

impl DriftReport {
    /// Table sets were compared and differ, so per-table checks never ran.
    pub fn columns_and_indexes_skipped(&self) -> bool {
        self.outcomes.iter().any(|o| {
            o.category == MetadataCategory::Table
                && o.comparison().is_some_and(|result| !result.equal)
        })
    }

    /// Table fetch failed in keep-going mode, so per-table checks never ran.
    pub fn tables_not_compared(&self) -> bool {
        self.outcomes.iter().any(|o| {
            o.category == MetadataCategory::Table
                && matches!(o.status, OutcomeStatus::NotCompared { .. })
        })
    }

    /// Outcomes that were compared and found a difference.
    pub fn differing(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.comparison().is_some_and(|result| !result.equal))
            .count()
    }

    pub fn not_compared(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.comparison().is_none())
            .count()
    }

    pub fn outcome(
        &self,
        category: MetadataCategory,
        table: Option<&str>,
    ) -> Option<&CategoryOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.category == category && o.table.as_deref() == table)
    }
}

struct Run<'r, 'a> {
    left: SchemaRef<'a>,
    right: SchemaRef<'a>,
    options: &'r DriftOptions,
    sink: &'r mut dyn ReportSink,
    outcomes: Vec<CategoryOutcome>,
}

async fn fetch_both(
    left: SchemaRef<'_>,
    right: SchemaRef<'_>,
    filter: &Filter,
    category: MetadataCategory,
    table: Option<&str>,
) -> Result<(NameList, NameList)> {
    let left = left.fetch(category, table).await?;
    let right = right.fetch(category, table).await?;
    if category.is_table_scoped() {
        Ok((left, right))
    } else {
        Ok((filter.apply(left), filter.apply(right)))
    }
}

impl Run<'_, '_> {
    /// Returns the fetched lists when the comparison ran, `None` when it failed in keep-going mode.
    async fn compare(
        &mut self,
        category: MetadataCategory,
        table: Option<&str>,
    ) -> Result<Option<(NameList, ComparisonResult)>> {
        let fetched = fetch_both(self.left, self.right, &self.options.filter, category, table).await;
        let (left, right) = match fetched {
            Ok(lists) => lists,
            Err(e) if self.options.keep_going => {
                tracing::error!(%category, table, error = %e, "comparison failed, continuing");
                self.record(category, table, OutcomeStatus::NotCompared { reason: e.to_string() });
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let result = compare_names(left.clone(), right);
        if result.equal {
            tracing::info!(%category, table, "no differences");
        } else {
            tracing::warn!(
                %category,
                table,
                count = result.difference_count(),
                only_in_left = ?result.only_in_left,
                only_in_right = ?result.only_in_right,
                "differences found"
            );
        }
        self.record(category, table, OutcomeStatus::Compared(result.clone()));
        Ok(Some((left, result)))
    }

    fn record(&mut self, category: MetadataCategory, table: Option<&str>, status: OutcomeStatus) {
        let outcome = CategoryOutcome {
            category,
            table: table.map(str::to_string),
            status,
        };
        self.sink.record(&outcome);
        self.outcomes.push(outcome);
    }
}

/// Compares `left` against `right`, reporting each outcome to `sink` as it is produced.
///
/// Without `keep_going`, the first fetch failure aborts the run; outcomes
/// already handed to the sink stay reported.
pub async fn detect_drift(
    left: SchemaRef<'_>,
    right: SchemaRef<'_>,
    options: &DriftOptions,
    sink: &mut dyn ReportSink,
) -> Result<DriftReport> {
    tracing::info!(left = %left.label(), right = %right.label(), "comparing schemas");

    let mut run = Run {
        left,
        right,
        options,
        sink,
        outcomes: Vec::new(),
    };
    let filter = &options.filter;

    for category in [MetadataCategory::Trigger, MetadataCategory::Function] {
        if filter.compares(category) {
            run.compare(category, None).await?;
        }
    }

    let mut tables_equal = false;
    if filter.compares(MetadataCategory::Table) {
        match run.compare(MetadataCategory::Table, None).await? {
            Some((tables, result)) if result.equal => {
                tables_equal = true;
                for table in normalize_names(tables) {
                    if filter.compares(MetadataCategory::Column) {
                        run.compare(MetadataCategory::Column, Some(table.as_str())).await?;
                    }
                    if filter.compares(MetadataCategory::Index) {
                        run.compare(MetadataCategory::Index, Some(table.as_str())).await?;
                    }
                }
            }
            Some(_) => {
                tracing::warn!("table sets differ, skipping column and index comparison");
            }
            None => {
                tracing::warn!("table sets unknown, skipping column and index comparison");
            }
        }
    }

    let has_drift = run.outcomes.iter().any(|o| !o.is_equal());
    tracing::info!(
        has_drift,
        comparisons = run.outcomes.len(),
        "comparison finished"
    );

    Ok(DriftReport {
        left_schema: left.schema.to_string(),
        right_schema: right.schema.to_string(),
        tables_equal,
        has_drift,
        outcomes: run.outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Scope;
    use crate::reader::MetadataReader;
    use crate::util::{FetchContext, SchemaError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    type Key = (MetadataCategory, Option<String>);

    #[derive(Default)]
    struct FakeReader {
        names: HashMap<Key, Vec<String>>,
        failing: Vec<Key>,
        calls: Mutex<Vec<Key>>,
    }

    impl FakeReader {
        fn with(mut self, category: MetadataCategory, table: Option<&str>, names: &[&str]) -> Self {
            self.names.insert(
                (category, table.map(str::to_string)),
                names.iter().map(|s| s.to_string()).collect(),
            );
            self
        }

        fn failing_on(mut self, category: MetadataCategory, table: Option<&str>) -> Self {
            self.failing.push((category, table.map(str::to_string)));
            self
        }

        fn calls_for(&self, category: MetadataCategory) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(c, _)| *c == category)
                .count()
        }
    }

    #[async_trait]
    impl MetadataReader for FakeReader {
        fn describe(&self) -> String {
            "fake".to_string()
        }

        async fn fetch_names(&self, category: MetadataCategory, scope: Scope<'_>) -> Result<NameList> {
            let key = (category, scope.table.map(str::to_string));
            self.calls.lock().unwrap().push(key.clone());
            if self.failing.contains(&key) {
                return Err(SchemaError::query(
                    FetchContext {
                        category,
                        source: self.describe(),
                        schema: scope.schema.to_string(),
                        table: key.1.clone(),
                    },
                    "lost connection",
                ));
            }
            Ok(self.names.get(&key).cloned().unwrap_or_default())
        }
    }

    fn two_tables() -> FakeReader {
        FakeReader::default()
            .with(MetadataCategory::Table, None, &["orders", "users"])
            .with(MetadataCategory::Column, Some("orders"), &["id", "total"])
            .with(MetadataCategory::Column, Some("users"), &["id", "name"])
            .with(MetadataCategory::Index, Some("orders"), &["PRIMARY"])
            .with(MetadataCategory::Index, Some("users"), &["PRIMARY"])
    }

    async fn run(left: &FakeReader, right: &FakeReader, options: &DriftOptions) -> Result<DriftReport> {
        detect_drift(
            SchemaRef::new(left, "app"),
            SchemaRef::new(right, "app_staging"),
            options,
            &mut DiscardSink,
        )
        .await
    }

    #[tokio::test]
    async fn identical_schemas_compare_every_table() {
        let left = two_tables();
        let right = two_tables();

        let report = run(&left, &right, &DriftOptions::default()).await.unwrap();

        assert!(!report.has_drift);
        assert!(report.tables_equal);
        assert_eq!(report.left_schema, "app");
        assert_eq!(report.right_schema, "app_staging");
        // triggers, functions, tables, then columns + indexes for two tables
        assert_eq!(report.outcomes.len(), 7);
        assert!(report.outcomes.iter().all(CategoryOutcome::is_equal));
        assert_eq!(left.calls_for(MetadataCategory::Column), 2);
        assert_eq!(right.calls_for(MetadataCategory::Index), 2);
    }

    #[tokio::test]
    async fn outcomes_follow_the_fixed_order() {
        let left = two_tables();
        let right = two_tables();

        let report = run(&left, &right, &DriftOptions::default()).await.unwrap();

        let order: Vec<(MetadataCategory, Option<&str>)> = report
            .outcomes
            .iter()
            .map(|o| (o.category, o.table.as_deref()))
            .collect();
        assert_eq!(
            order,
            vec![
                (MetadataCategory::Trigger, None),
                (MetadataCategory::Function, None),
                (MetadataCategory::Table, None),
                (MetadataCategory::Column, Some("orders")),
                (MetadataCategory::Index, Some("orders")),
                (MetadataCategory::Column, Some("users")),
                (MetadataCategory::Index, Some("users")),
            ]
        );
    }

    #[tokio::test]
    async fn differing_tables_skip_columns_and_indexes() {
        let left = two_tables();
        let right = FakeReader::default().with(MetadataCategory::Table, None, &["orders"]);

        let report = run(&left, &right, &DriftOptions::default()).await.unwrap();

        assert!(report.has_drift);
        assert!(!report.tables_equal);
        assert!(report.columns_and_indexes_skipped());
        let tables = report
            .outcome(MetadataCategory::Table, None)
            .and_then(CategoryOutcome::comparison)
            .unwrap();
        assert_eq!(tables.combined(), vec!["users".to_string()]);
        assert_eq!(left.calls_for(MetadataCategory::Column), 0);
        assert_eq!(left.calls_for(MetadataCategory::Index), 0);
        assert_eq!(right.calls_for(MetadataCategory::Column), 0);
    }

    #[tokio::test]
    async fn extra_column_is_reported_for_its_table_only() {
        let left = two_tables();
        let right = two_tables().with(MetadataCategory::Column, Some("users"), &["email", "id", "name"]);

        let report = run(&left, &right, &DriftOptions::default()).await.unwrap();

        assert!(report.has_drift);
        let users = report
            .outcome(MetadataCategory::Column, Some("users"))
            .and_then(CategoryOutcome::comparison)
            .unwrap();
        assert_eq!(users.only_in_right, vec!["email".to_string()]);
        assert_eq!(users.difference_count(), 1);
        assert!(report
            .outcome(MetadataCategory::Column, Some("orders"))
            .unwrap()
            .is_equal());
        assert!(report
            .outcome(MetadataCategory::Index, Some("users"))
            .unwrap()
            .is_equal());
    }

    #[tokio::test]
    async fn trigger_difference_does_not_stop_the_run() {
        let left = two_tables().with(MetadataCategory::Trigger, None, &["audit_users"]);
        let right = two_tables();

        let report = run(&left, &right, &DriftOptions::default()).await.unwrap();

        assert!(report.has_drift);
        assert!(!report.outcome(MetadataCategory::Trigger, None).unwrap().is_equal());
        assert!(report.tables_equal);
        assert_eq!(report.outcomes.len(), 7);
    }

    #[tokio::test]
    async fn empty_schemas_are_equal() {
        let left = FakeReader::default();
        let right = FakeReader::default();

        let report = run(&left, &right, &DriftOptions::default()).await.unwrap();

        assert!(!report.has_drift);
        assert!(report.tables_equal);
        assert_eq!(report.outcomes.len(), 3);
    }

    #[tokio::test]
    async fn query_failure_aborts_the_run() {
        let left = two_tables().failing_on(MetadataCategory::Function, None);
        let right = two_tables();
        let mut seen: Vec<CategoryOutcome> = Vec::new();

        let err = detect_drift(
            SchemaRef::new(&left, "app"),
            SchemaRef::new(&right, "app"),
            &DriftOptions::default(),
            &mut seen,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SchemaError::Query { .. }));
        assert!(err.to_string().contains("functions"));
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].category, MetadataCategory::Trigger);
        assert_eq!(left.calls_for(MetadataCategory::Table), 0);
    }

    #[tokio::test]
    async fn keep_going_marks_failures_as_not_compared() {
        let left = two_tables().failing_on(MetadataCategory::Column, Some("orders"));
        let right = two_tables();
        let options = DriftOptions {
            keep_going: true,
            ..Default::default()
        };

        let report = run(&left, &right, &options).await.unwrap();

        assert!(report.has_drift);
        let orders = report.outcome(MetadataCategory::Column, Some("orders")).unwrap();
        match &orders.status {
            OutcomeStatus::NotCompared { reason } => assert!(reason.contains("lost connection")),
            other => panic!("expected not compared, got {other:?}"),
        }
        assert!(report.outcome(MetadataCategory::Index, Some("orders")).unwrap().is_equal());
        assert!(report.outcome(MetadataCategory::Column, Some("users")).unwrap().is_equal());
    }

    #[tokio::test]
    async fn keep_going_with_failed_table_fetch_skips_per_table_checks() {
        let left = two_tables().failing_on(MetadataCategory::Table, None);
        let right = two_tables();
        let options = DriftOptions {
            keep_going: true,
            ..Default::default()
        };

        let report = run(&left, &right, &options).await.unwrap();

        assert!(!report.tables_equal);
        assert!(report.has_drift);
        assert!(report.tables_not_compared());
        assert!(!report.columns_and_indexes_skipped());
        assert_eq!(report.differing(), 0);
        assert_eq!(report.not_compared(), 1);
        assert_eq!(left.calls_for(MetadataCategory::Column), 0);
    }

    #[tokio::test]
    async fn excluded_tables_get_no_per_table_checks() {
        let left = two_tables().with(MetadataCategory::Table, None, &["orders", "tmp_load", "users"]);
        let right = two_tables();
        let options = DriftOptions {
            filter: Filter::new(&[], &["tmp_*".to_string()]).unwrap(),
            ..Default::default()
        };

        let report = run(&left, &right, &options).await.unwrap();

        assert!(!report.has_drift);
        assert!(report.outcome(MetadataCategory::Column, Some("tmp_load")).is_none());
        assert_eq!(left.calls_for(MetadataCategory::Column), 2);
    }

    #[tokio::test]
    async fn skipped_categories_are_not_fetched() {
        let left = two_tables();
        let right = two_tables();
        let options = DriftOptions {
            filter: Filter::default()
                .with_skipped([MetadataCategory::Trigger, MetadataCategory::Index]),
            ..Default::default()
        };

        let report = run(&left, &right, &options).await.unwrap();

        assert_eq!(left.calls_for(MetadataCategory::Trigger), 0);
        assert_eq!(left.calls_for(MetadataCategory::Index), 0);
        assert!(report.outcome(MetadataCategory::Trigger, None).is_none());
        assert_eq!(report.outcomes.len(), 4);
    }

    #[tokio::test]
    async fn sink_sees_outcomes_in_order() {
        let left = two_tables();
        let right = two_tables();
        let mut seen: Vec<CategoryOutcome> = Vec::new();

        let report = detect_drift(
            SchemaRef::new(&left, "app"),
            SchemaRef::new(&right, "app"),
            &DriftOptions::default(),
            &mut seen,
        )
        .await
        .unwrap();

        assert_eq!(seen, report.outcomes);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = CategoryOutcome {
            category: MetadataCategory::Column,
            table: Some("users".to_string()),
            status: OutcomeStatus::Compared(compare_names(
                vec!["id".to_string()],
                vec!["id".to_string(), "email".to_string()],
            )),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["category"], "column");
        assert_eq!(json["table"], "users");
        assert_eq!(json["status"], "compared");
        assert_eq!(json["only_in_right"][0], "email");
    }
}
