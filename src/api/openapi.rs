use utoipa::OpenApi;

use crate::{
    api::models::{BaseCurrencyQuery, ErrorResponse, EventAccepted, RatesResponse, ReadinessRequest, RegisterMemberRequest},
    core::{
        currency::ConversionResult,
        models::{
            AppLog, Expense, Member, NewExpense, Payment, ReadinessStatus, ReadinessUpdate, SettlementReport, Transfer,
            UserStatement,
        },
    },
    infrastructure::events::ReadinessEvent,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::get_rates,
        super::handlers::convert_amount,
        super::handlers::list_expenses,
        super::handlers::record_expense,
        super::handlers::calculate_settlement,
        super::handlers::get_statement,
        super::handlers::get_readiness,
        super::handlers::register_member,
        super::handlers::mark_ready,
        super::handlers::publish_readiness_event,
        super::handlers::get_app_logs
    ),
    components(schemas(
        BaseCurrencyQuery,
        RegisterMemberRequest,
        ReadinessRequest,
        RatesResponse,
        EventAccepted,
        ErrorResponse,
        ConversionResult,
        Expense,
        NewExpense,
        Member,
        ReadinessStatus,
        ReadinessUpdate,
        ReadinessEvent,
        SettlementReport,
        Transfer,
        Payment,
        UserStatement,
        AppLog
    )),
    info(
        title = "Trip Settlement API",
        description = "Records trip expenses and settles who owes whom in one base currency",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
