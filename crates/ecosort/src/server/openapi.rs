use ecosort_identify::{
    BackendKind, BackendStatus, Category, IdentificationResult, ResolverConfig, ServiceStatus,
};
use utoipa::OpenApi;

use crate::ledger::{RecyclingStats, ScanMode, ScanRecord};
use crate::reminders::{Frequency, Reminder, ReminderDraft, ReminderKind};
use crate::server::catalog::CategoryGuideResponse;
use crate::server::error::{ApiErrorBody, ApiErrorResponse};
use crate::server::resolver::{ResolverConfigUpdate, TogglePrimaryResponse};
use crate::server::scan::{
    CaptureMode, FailedAttempt, IdentifyRequest, ScanResponse, SearchRequest,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "EcoSort API",
        version = "0.1.0",
        description = "Recycling identification with local model and remote AI fallback"
    ),
    paths(
        crate::server::scan::identify,
        crate::server::scan::search,
        crate::server::resolver::status,
        crate::server::resolver::get_config,
        crate::server::resolver::replace_config,
        crate::server::resolver::toggle_primary,
        crate::server::ledger::history,
        crate::server::ledger::stats,
        crate::server::catalog::category_guide,
        crate::server::reminders::list_reminders,
        crate::server::reminders::create_reminder,
        crate::server::reminders::update_reminder,
        crate::server::reminders::delete_reminder,
    ),
    components(schemas(
        // Error
        ApiErrorResponse,
        ApiErrorBody,
        // Scan
        IdentifyRequest,
        SearchRequest,
        CaptureMode,
        ScanResponse,
        FailedAttempt,
        IdentificationResult,
        Category,
        // Resolver
        ResolverConfig,
        ResolverConfigUpdate,
        BackendKind,
        ServiceStatus,
        BackendStatus,
        TogglePrimaryResponse,
        // Ledger
        ScanRecord,
        ScanMode,
        RecyclingStats,
        // Catalog
        CategoryGuideResponse,
        // Reminders
        Reminder,
        ReminderDraft,
        ReminderKind,
        Frequency,
    )),
    tags(
        (name = "scan", description = "Item identification and search"),
        (name = "resolver", description = "Backend selection and config"),
        (name = "ledger", description = "Scan history and stats"),
        (name = "catalog", description = "Disposal guidance by category"),
        (name = "reminders", description = "Bin collection reminders"),
    )
)]
pub struct ApiDoc;
