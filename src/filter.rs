//! # Dynamic filter engine
//!
//! A [`Filter`] is a registry of named handlers for one resource. Applying it
//! to a [`ParameterSet`] and a query builder runs, in order:
//!
//! 1. one parameter handler per parameter whose name (or its camelCase form)
//!    is registered, in parameter order
//! 2. one range handler per synthesized `<column>Between` name
//! 3. the internal hook, when the request is internal and a hook exists
//!
//! Names without a handler are ignored, never rejected.
//!
//! ```rust,ignore
//! use paramfilter::{Filter, columns};
//!
//! let filter = Filter::new()
//!     .on("status", columns::exact(user::Column::Status))
//!     .on("query", columns::contains(user::Column::Name))
//!     .between("created_at", columns::between(user::Column::CreatedAt))
//!     .for_internal(move |select| {
//!         select.constrain(user::Column::CompanyUuid.eq(company));
//!         Ok(())
//!     });
//!
//! // GET /users?status=active&created_at_after=2024-01-01
//! let select = filter.apply(&params, user::Entity::find(), false)?;
//! ```

use crate::case::camel_case;
use crate::errors::FilterError;
use crate::extract::FilterRequest;
use crate::params::{ParameterSet, is_falsy};
use crate::range::{self, RangeVocabulary};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Handler for a single parameter. Receives `None` when the value is falsy.
pub type ParamHandler<Q> =
    Box<dyn Fn(&mut Q, Option<&Value>) -> Result<(), FilterError> + Send + Sync>;

/// Handler for a synthesized range: `(lower, upper)` in pair order.
pub type RangeHandler<Q> =
    Box<dyn Fn(&mut Q, Option<&Value>, Option<&Value>) -> Result<(), FilterError> + Send + Sync>;

/// Hook run last for internal (console) requests.
pub type InternalHook<Q> = Box<dyn Fn(&mut Q) -> Result<(), FilterError> + Send + Sync>;

pub struct Filter<Q> {
    params: HashMap<String, ParamHandler<Q>>,
    ranges: HashMap<String, RangeHandler<Q>>,
    internal: Option<InternalHook<Q>>,
    vocabulary: RangeVocabulary,
}

impl<Q> Default for Filter<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q> fmt::Debug for Filter<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut params: Vec<_> = self.params.keys().collect();
        let mut ranges: Vec<_> = self.ranges.keys().collect();
        params.sort();
        ranges.sort();
        f.debug_struct("Filter")
            .field("params", &params)
            .field("ranges", &ranges)
            .field("internal", &self.internal.is_some())
            .field("vocabulary", &self.vocabulary)
            .finish()
    }
}

impl<Q> Filter<Q> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_vocabulary(RangeVocabulary::default())
    }

    #[must_use]
    pub fn with_vocabulary(vocabulary: RangeVocabulary) -> Self {
        Self {
            params: HashMap::new(),
            ranges: HashMap::new(),
            internal: None,
            vocabulary,
        }
    }

    /// Register a handler for parameter `name`.
    ///
    /// A parameter matches when its raw name or its camelCase form equals
    /// `name`, so `.on("createdBy", ..)` serves both `createdBy` and `created_by`.
    #[must_use]
    pub fn on<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut Q, Option<&Value>) -> Result<(), FilterError> + Send + Sync + 'static,
    {
        self.params.insert(name.into(), Box::new(handler));
        self
    }

    /// Register a range handler under an explicit method name such as
    /// `createdAtBetween`.
    #[must_use]
    pub fn on_range<F>(mut self, method: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut Q, Option<&Value>, Option<&Value>) -> Result<(), FilterError>
            + Send
            + Sync
            + 'static,
    {
        self.ranges.insert(method.into(), Box::new(handler));
        self
    }

    /// Register a range handler for `column` (`created_at` -> `createdAtBetween`).
    #[must_use]
    pub fn between<F>(self, column: &str, handler: F) -> Self
    where
        F: Fn(&mut Q, Option<&Value>, Option<&Value>) -> Result<(), FilterError>
            + Send
            + Sync
            + 'static,
    {
        self.on_range(crate::case::between_method(column), handler)
    }

    #[must_use]
    pub fn for_internal<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Q) -> Result<(), FilterError> + Send + Sync + 'static,
    {
        self.internal = Some(Box::new(hook));
        self
    }

    /// Adopt every handler of `parent` that this filter does not define.
    ///
    /// Handlers registered on `self` always shadow the parent's. The parent's
    /// range vocabulary is ignored.
    #[must_use]
    pub fn inherit(mut self, parent: Self) -> Self {
        for (name, handler) in parent.params {
            self.params.entry(name).or_insert(handler);
        }
        for (method, handler) in parent.ranges {
            self.ranges.entry(method).or_insert(handler);
        }
        if self.internal.is_none() {
            self.internal = parent.internal;
        }
        self
    }

    #[must_use]
    pub fn handles(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    #[must_use]
    pub fn handles_range(&self, method: &str) -> bool {
        self.ranges.contains_key(method)
    }

    #[must_use]
    pub const fn has_internal_hook(&self) -> bool {
        self.internal.is_some()
    }

    #[must_use]
    pub const fn vocabulary(&self) -> &RangeVocabulary {
        &self.vocabulary
    }

    /// Apply every matching handler to `builder` and hand it back.
    pub fn apply(
        &self,
        parameters: &ParameterSet,
        mut builder: Q,
        is_internal_request: bool,
    ) -> Result<Q, FilterError> {
        self.apply_to(parameters, &mut builder, is_internal_request)?;
        Ok(builder)
    }

    /// Same as [`Filter::apply`], taking parameters and the internal flag from
    /// an extracted request.
    pub fn apply_request(&self, request: &FilterRequest, builder: Q) -> Result<Q, FilterError> {
        self.apply(&request.parameters, builder, request.internal)
    }

    /// Apply every matching handler to `builder` in place.
    ///
    /// The first handler error stops processing and is returned unchanged.
    pub fn apply_to(
        &self,
        parameters: &ParameterSet,
        builder: &mut Q,
        is_internal_request: bool,
    ) -> Result<(), FilterError> {
        for (name, value) in parameters.iter() {
            self.dispatch_single(name, value, builder)?;
        }

        self.apply_range_filters(parameters, builder)?;

        if is_internal_request && let Some(hook) = &self.internal {
            tracing::trace!("applying internal filter hook");
            hook(builder)?;
        }

        Ok(())
    }

    fn dispatch_single(&self, name: &str, value: &Value, builder: &mut Q) -> Result<(), FilterError> {
        let Some((method, handler)) = self.resolve(name) else {
            tracing::debug!(parameter = %name, "no filter handler, parameter ignored");
            return Ok(());
        };

        let argument = (!is_falsy(value)).then_some(value);
        tracing::trace!(
            parameter = %name,
            handler = %method,
            has_value = argument.is_some(),
            "applying filter"
        );
        handler(builder, argument)
    }

    /// First registered candidate among `[name, camel_case(name)]`.
    fn resolve(&self, name: &str) -> Option<(String, &ParamHandler<Q>)> {
        if let Some(handler) = self.params.get(name) {
            return Some((name.to_string(), handler));
        }
        let camel = camel_case(name);
        self.params.get(&camel).map(|handler| (camel, handler))
    }

    fn apply_range_filters(
        &self,
        parameters: &ParameterSet,
        builder: &mut Q,
    ) -> Result<(), FilterError> {
        for call in range::plan(parameters, &self.vocabulary) {
            let Some(handler) = self.ranges.get(&call.method) else {
                tracing::debug!(
                    method = %call.method,
                    column = %call.column,
                    "no range handler, range ignored"
                );
                continue;
            };

            tracing::trace!(method = %call.method, pair = %call.pair, "applying range filter");
            handler(builder, call.lower, call.upper)?;
        }

        Ok(())
    }
}
