use std::sync::Arc;

use crate::core::interpreter::QueryInterpreter;
use crate::core::search::SearchExecutor;
use crate::core::validator::CriteriaValidator;
use crate::models::{SearchCriteria, SearchResult};
use crate::services::parser::ConversationalParser;
use crate::services::repository::RepositoryError;

/// Free-text search orchestrator
///
/// # Pipeline Stages
/// 1. Translation: conversational parser when configured, heuristic
///    interpreter otherwise or whenever the parser fails
/// 2. Merge over the criteria of earlier turns
/// 3. Validation
/// 4. Execution (tag matching, platform mix, pagination)
#[derive(Clone)]
pub struct SearchEngine {
    interpreter: QueryInterpreter,
    validator: CriteriaValidator,
    executor: SearchExecutor,
    parser: Option<Arc<dyn ConversationalParser>>,
}

impl SearchEngine {
    pub fn new(interpreter: QueryInterpreter, validator: CriteriaValidator, executor: SearchExecutor) -> Self {
        Self {
            interpreter,
            validator,
            executor,
            parser: None,
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn ConversationalParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Validated criteria for `text`; never fails
    pub async fn interpret(&self, text: &str, preset: Option<&SearchCriteria>) -> SearchCriteria {
        let criteria = match &self.parser {
            Some(parser) => match parser.parse(text, preset).await {
                Ok(parsed) => parsed.merged_over(preset),
                Err(e) => {
                    tracing::warn!("Conversational parser failed, using heuristic interpreter: {}", e);
                    self.interpreter.interpret_with_context(text, preset)
                }
            },
            None => self.interpreter.interpret_with_context(text, preset),
        };

        self.validator.validate(criteria, text)
    }

    /// Interpret and execute; `page` overrides the page of the criteria
    pub async fn search(
        &self,
        text: &str,
        preset: Option<&SearchCriteria>,
        page: Option<u32>,
    ) -> Result<(SearchCriteria, SearchResult), RepositoryError> {
        let mut criteria = self.interpret(text, preset).await;
        if let Some(page) = page {
            criteria.page = page.max(1);
        }

        let result = self.executor.execute(&criteria).await?;

        tracing::info!(
            "Search matched {} creators (page {}/{})",
            result.total_count,
            result.page,
            result.total_pages
        );

        Ok((criteria, result))
    }
}
