//! Search-service translation.
//!
//! Renders a query into the Lucene-style string a hosted search service accepts, together
//! with the limit, offset and sort it needs alongside. Grouping is preserved with
//! parentheses; fields are renamed through the configured alias table.

pub(crate) mod lucene;

use rql::{
    ArrayOperation, BooleanKind, BooleanOperation, LimitOperation, Operation, PropertyOperation,
    SortOperation,
};
use rql_config::SearchSettings;
use serde::Serialize;
use tracing::debug;

use crate::{TranslateError, Visitor};

/// Everything a search call needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    /// Lucene-style query string; `*` matches everything.
    pub query: String,
    /// Maximum number of results.
    pub limit: u64,
    /// Number of results to skip.
    pub offset: u64,
    /// Comma-separated `field:asc|desc` list.
    pub sort: String,
}

impl SearchQuery {
    /// Hands the query to `service` and returns whatever it produces, without waiting on it.
    pub fn submit<S: SearchService>(&self, service: &S) -> S::Pending {
        debug!(query = %self.query, limit = self.limit, offset = self.offset, "submitting search");
        service.search(&self.query, self.limit, self.offset, &self.sort)
    }
}

/// A hosted search service.
pub trait SearchService {
    /// The service's handle for an issued search.
    type Pending;

    /// Issues a search.
    fn search(&self, query: &str, limit: u64, offset: u64, sort: &str) -> Self::Pending;
}

/// Translation state threaded through [`SearchVisitor`].
#[derive(Debug, Default)]
pub struct SearchDraft {
    /// Whether the walk is inside a boolean group.
    nested: bool,
    /// Rendered filter fragments at this scope.
    fragments: Vec<String>,
    /// Rendered sort specification.
    sort: Option<String>,
    /// Limit and offset.
    page: Option<(u64, u64)>,
}

impl SearchDraft {
    /// State for the children of a boolean group.
    fn nested() -> Self {
        Self {
            nested: true,
            ..Self::default()
        }
    }

    /// Fails when a modifier appears inside a boolean group.
    fn require_top_level(&self, operation: &'static str) -> Result<(), TranslateError> {
        if self.nested {
            Err(TranslateError::Misplaced { operation })
        } else {
            Ok(())
        }
    }

    /// Appends a rendered fragment.
    fn push(mut self, fragment: String) -> Self {
        self.fragments.push(fragment);
        self
    }
}

/// Translates queries into [`SearchQuery`] values.
#[derive(Debug, Clone, Copy)]
pub struct SearchVisitor<'a> {
    /// Defaults and field aliases.
    settings: &'a SearchSettings,
}

impl<'a> SearchVisitor<'a> {
    /// Creates a visitor using the given settings.
    pub fn new(settings: &'a SearchSettings) -> Self {
        Self { settings }
    }

    /// Translates a parsed query.
    pub fn translate(&self, op: &Operation) -> Result<SearchQuery, TranslateError> {
        let draft = self.visit(op, SearchDraft::default())?;
        let (limit, offset) = draft
            .page
            .unwrap_or((self.settings.default_limit, self.settings.default_offset));
        let query = if draft.fragments.is_empty() {
            "*".to_string()
        } else {
            draft.fragments.join(" AND ")
        };
        let search = SearchQuery {
            query,
            limit,
            offset,
            sort: draft
                .sort
                .unwrap_or_else(|| self.settings.default_sort.clone()),
        };
        debug!(
            query = %search.query,
            limit = search.limit,
            offset = search.offset,
            sort = %search.sort,
            "translated search query"
        );
        Ok(search)
    }
}

impl Visitor<SearchDraft> for SearchVisitor<'_> {
    fn visit_match_all(&self, draft: SearchDraft) -> Result<SearchDraft, TranslateError> {
        draft.require_top_level("match-all")?;
        Ok(draft)
    }

    fn visit_property(
        &self,
        op: &PropertyOperation,
        draft: SearchDraft,
    ) -> Result<SearchDraft, TranslateError> {
        let field = self.settings.aliases.resolve(&op.field);
        Ok(draft.push(lucene::property_clause(field, op.kind, &op.value)))
    }

    fn visit_array(
        &self,
        op: &ArrayOperation,
        draft: SearchDraft,
    ) -> Result<SearchDraft, TranslateError> {
        let field = self.settings.aliases.resolve(&op.field);
        Ok(draft.push(lucene::membership_clause(field, op.kind, &op.values)))
    }

    fn visit_boolean(
        &self,
        op: &BooleanOperation,
        draft: SearchDraft,
    ) -> Result<SearchDraft, TranslateError> {
        let children = op
            .children
            .iter()
            .try_fold(SearchDraft::nested(), |inner, child| self.visit(child, inner))?;
        let connective = match op.kind {
            BooleanKind::And => " AND ",
            BooleanKind::Or => " OR ",
        };
        Ok(draft.push(format!("({})", children.fragments.join(connective))))
    }

    fn visit_sort(
        &self,
        op: &SortOperation,
        mut draft: SearchDraft,
    ) -> Result<SearchDraft, TranslateError> {
        draft.require_top_level("sort")?;
        let sort = op
            .fields
            .iter()
            .map(|sort| {
                format!(
                    "{}:{}",
                    self.settings.aliases.resolve(&sort.field),
                    sort.direction.as_str()
                )
            })
            .collect::<Vec<_>>()
            .join(",");
        draft.sort = Some(sort);
        Ok(draft)
    }

    fn visit_limit(
        &self,
        op: &LimitOperation,
        mut draft: SearchDraft,
    ) -> Result<SearchDraft, TranslateError> {
        draft.require_top_level("limit")?;
        draft.page = Some((op.limit, op.skip));
        Ok(draft)
    }

    fn visit_query(
        &self,
        ops: &[Operation],
        draft: SearchDraft,
    ) -> Result<SearchDraft, TranslateError> {
        draft.require_top_level("query")?;
        ops.iter().try_fold(draft, |draft, op| self.visit(op, draft))
    }
}

/// Parses `input` and translates it for the search service.
pub fn to_search_query(input: &str, settings: &SearchSettings) -> Result<SearchQuery, TranslateError> {
    let op = rql::parse(input)?;
    SearchVisitor::new(settings).translate(&op)
}
