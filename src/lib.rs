//! # paramfilter
//!
//! Turn the query parameters of a request into query-builder constraints
//! through a registry of named handlers.
//!
//! Each resource declares a [`Filter`]: parameter handlers keyed by name,
//! range handlers keyed by `<column>Between`, and an optional hook for
//! internal (console) requests. Applying the filter walks the request's
//! [`ParameterSet`] once:
//!
//! - `?status=active` runs the `status` handler (or `createdBy` for
//!   `?created_by=..`, via camelCase fallback)
//! - `?created_at_after=..&created_at_before=..` runs `createdAtBetween` once
//!   with both bounds
//! - parameters nobody registered for are ignored
//!
//! ```rust,ignore
//! use paramfilter::{Constrain, Filter, FilterError, FilterRequest, columns};
//! use sea_orm::{ColumnTrait, EntityTrait};
//!
//! fn user_filter(company: Uuid) -> Filter<sea_orm::Select<user::Entity>> {
//!     Filter::new()
//!         .on("status", columns::exact(user::Column::Status))
//!         .on("query", columns::contains(user::Column::Name))
//!         .between("created_at", columns::between(user::Column::CreatedAt))
//!         .for_internal(move |select| {
//!             select.constrain(user::Column::CompanyUuid.eq(company));
//!             Ok(())
//!         })
//! }
//!
//! async fn list_users(
//!     request: FilterRequest,
//!     State(state): State<AppState>,
//! ) -> Result<Json<Vec<user::Model>>, FilterError> {
//!     let select = user_filter(state.company).apply_request(&request, user::Entity::find())?;
//!     Ok(Json(select.all(&state.db).await?))
//! }
//! ```

pub mod case;
pub mod columns;
pub mod config;
pub mod errors;
pub mod extract;
pub mod filter;
pub mod params;
pub mod range;

pub use columns::Constrain;
pub use config::FilterConfig;
pub use errors::FilterError;
pub use extract::FilterRequest;
pub use filter::Filter;
pub use params::{ParameterSet, is_falsy};
pub use range::{RangePair, RangeVocabulary};
