//! `JobFamily` extractor: the report job service for the route's family.

use std::ops::Deref;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use reportflow_core::error::AppError;
use reportflow_entity::job::JobKind;
use reportflow_worker::ReportJobService;

use crate::error::ApiError;
use crate::state::AppState;

/// Service for the job family the route was mounted for.
#[derive(Debug, Clone)]
pub struct JobFamily(pub Arc<ReportJobService>);

impl Deref for JobFamily {
    type Target = ReportJobService;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for JobFamily {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let kind = parts
            .extensions
            .get::<JobKind>()
            .copied()
            .ok_or_else(|| AppError::internal("Route is not mounted under a job family"))?;
        Ok(Self(Arc::clone(state.family(kind))))
    }
}
