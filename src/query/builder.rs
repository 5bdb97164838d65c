use serde_json::Value;

use crate::query::{FilterExpression, FilterOp, LogicOp, Query, SortKey};

/// Fluent builder for [`Query`] descriptors.
///
/// Filter composition follows one rule: the first group installs directly
/// (unwrapped when it has a single member), and every later group demotes
/// the existing filter to the first member of the new group. Repeated calls
/// therefore nest one level per call.
#[derive(Debug, Default, Clone)]
pub struct QueryBuilder {
    filter: Option<FilterExpression>,
    sort: Vec<SortKey>,
    limit: Option<i64>,
    offset: Option<i64>,
    page: Option<i64>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter group joined by `logic`. An empty member list is a
    /// no-op; a group never reaches the tree without members.
    pub fn add_group(&mut self, logic: LogicOp, mut members: Vec<FilterExpression>) -> &mut Self {
        if members.is_empty() {
            return self;
        }

        self.filter = Some(match self.filter.take() {
            None => {
                if members.len() == 1 {
                    members.remove(0)
                } else {
                    FilterExpression::group(logic, members)
                }
            }
            Some(existing) => {
                let mut all = Vec::with_capacity(members.len() + 1);
                all.push(existing);
                all.append(&mut members);
                FilterExpression::group(logic, all)
            }
        });

        self
    }

    pub fn and(&mut self, members: Vec<FilterExpression>) -> &mut Self {
        self.add_group(LogicOp::And, members)
    }

    pub fn or(&mut self, members: Vec<FilterExpression>) -> &mut Self {
        self.add_group(LogicOp::Or, members)
    }

    /// Adds a single field comparison, AND-joined with whatever is already
    /// set. The operator accepts a [`FilterOp`] or a wire id like `"_eq"`.
    pub fn field(
        &mut self,
        name: &str,
        operator: impl Into<FilterOp>,
        value: impl Into<Value>,
    ) -> &mut Self {
        let comparison = FilterExpression::comparison(name, operator.into(), value.into());
        self.and(vec![comparison])
    }

    /// Replaces the sort list. Descending fields carry a `-` prefix, e.g.
    /// `"-created_at"`. An empty list is a no-op and keeps a previous sort.
    pub fn sort<S: AsRef<str>>(&mut self, specs: &[S]) -> &mut Self {
        if specs.is_empty() {
            return self;
        }

        self.sort = specs.iter().map(|spec| SortKey::parse(spec.as_ref())).collect();
        self
    }

    /// `-1` asks the target API for an uncapped result set.
    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: i64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    /// 1-indexed page, an alternative to `offset`.
    pub fn page(&mut self, page: i64) -> &mut Self {
        self.page = Some(page);
        self
    }

    /// Assembles the descriptor. The builder keeps its state, so it can be
    /// extended and built again.
    pub fn build(&self) -> Query {
        Query {
            filter: self.filter.clone(),
            sort: self.sort.clone(),
            limit: self.limit,
            offset: self.offset,
            page: self.page,
        }
    }
}
