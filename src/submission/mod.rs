//! Analysis submission: form state, validation, and the backend payload.

pub mod catalog;
pub mod dcm;
pub mod form;
pub mod payload;

pub use catalog::{ChargingPointModel, charging_point_catalog};
pub use dcm::{DcmChargingOutput, DcmChargingRequest, DcmRatioOutput, DcmRatioRequest};
pub use form::{AnalysisForm, DayProfile, FormError};
pub use payload::{AnalysisPayload, AnalysisRecord};
