//! Request and response DTOs for the REST API.

pub mod automation_dto;
pub mod common_dto;
pub mod offer_dto;
pub mod schedule_dto;
pub mod venue_dto;

pub use automation_dto::{AutomationStatusResponse, ScenarioRequest, TickReportResponse};
pub use common_dto::{PaginationMeta, PaginationParams};
pub use offer_dto::{
    CreateOfferRequest, OfferDto, OfferStatsResponse, RedeemOfferRequest, RedemptionResponse,
    UpdateOfferStatusRequest,
};
pub use schedule_dto::{
    CreateScheduleRuleRequest, CurrentVibeResponse, NextVibeChangeResponse, ScheduleRuleDto,
};
pub use venue_dto::{
    CreateVenueRequest, CreateVenueResponse, LiveStateDto, OverrideLiveStateRequest,
    VenueListResponse, VenueSummaryDto,
};
