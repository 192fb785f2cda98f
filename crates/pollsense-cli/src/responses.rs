//! Survey response analysis handlers.

use pollsense_core::Scope;
use pollsense_sentiment::AnalysisRequest;

use crate::{print_json, LiveAnalyzer, ResponseCommands, ScopeArgs};

impl From<ScopeArgs> for Scope {
    fn from(args: ScopeArgs) -> Self {
        Scope::new(args.event, args.poll)
    }
}

/// Dispatch one `responses` sub-command and print its result as JSON.
///
/// # Errors
///
/// Returns an error if the analysis fails (unknown criteria, unknown
/// respondent, embedding or store failure).
pub(crate) async fn run(analyzer: &LiveAnalyzer, command: ResponseCommands) -> anyhow::Result<()> {
    match command {
        ResponseCommands::Cluster { scope } => {
            print_json(&analyzer.cluster_similar(scope.into()).await?)
        }
        ResponseCommands::Similar {
            scope,
            respondent,
            limit,
        } => print_json(
            &analyzer
                .search_similar(scope.into(), respondent, limit)
                .await?,
        ),
        ResponseCommands::Analyze {
            scope,
            respondent,
            criteria,
            search,
            limit,
        } => {
            let request = AnalysisRequest {
                scope: scope.into(),
                respondent_id: respondent,
                criteria,
                search_text: search,
                limit,
            };
            print_json(&analyzer.analyze_responses(&request).await?)
        }
        ResponseCommands::Sentiment { scope } => {
            print_json(&analyzer.analyze_overall_sentiment(scope.into()).await?)
        }
        ResponseCommands::Scores { scope, limit } => {
            print_json(&analyzer.respondent_scores(scope.into(), limit).await?)
        }
    }
}
