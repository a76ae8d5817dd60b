//! Translation of query-string filters into a Qdrant payload filter.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};

use crate::error::{Result, TicketLensError};
use crate::models::{non_blank, SearchParams};
use crate::vector::{Condition, DatetimeRange, Filter};

pub const ATTACHMENTS_FIELD: &str = "attachments";
pub const IS_INTERNAL_FIELD: &str = "is_internal";
pub const REQUEST_TYPE_FIELD: &str = "request_type";
pub const DATE_FIELD: &str = "date";

/// `request_type` value that disables the request type filter.
const ALL_REQUEST_TYPES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Start,
    End,
}

/// Build the `must` filter for a search. `None` when no condition applies.
pub fn build_filter(params: &SearchParams, ticket_id_field: &str) -> Result<Option<Filter>> {
    let mut must = Vec::new();

    if parse_flag("attachments", params.attachments.as_deref())? {
        must.push(Condition::matches(ATTACHMENTS_FIELD, true));
    }

    if parse_flag("is_internal", params.is_internal.as_deref())? {
        must.push(Condition::matches(IS_INTERNAL_FIELD, true));
    }

    if let Some(request_type) = non_blank(params.request_type.as_deref()) {
        if !request_type.eq_ignore_ascii_case(ALL_REQUEST_TYPES) {
            must.push(Condition::matches(REQUEST_TYPE_FIELD, request_type));
        }
    }

    if let Some(range) = date_range(params)? {
        must.push(Condition::datetime_range(DATE_FIELD, range));
    }

    if let Some(ticket_id) = params.ticket_id() {
        must.push(ticket_condition(ticket_id_field, ticket_id));
    }

    if must.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Filter::must(must)))
    }
}

/// Flags only ever narrow the search: `false` means "don't filter".
fn parse_flag(name: &str, raw: Option<&str>) -> Result<bool> {
    let Some(value) = non_blank(raw) else {
        return Ok(false);
    };

    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(TicketLensError::Validation(format!(
            "Invalid value '{value}' for `{name}`: expected true or false"
        ))),
    }
}

fn date_range(params: &SearchParams) -> Result<Option<DatetimeRange>> {
    let from = parse_date("date_from", params.date_from.as_deref(), Bound::Start)?;
    let to = parse_date("date_to", params.date_to.as_deref(), Bound::End)?;

    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(TicketLensError::Validation(
                "`date_from` must not be later than `date_to`".to_string(),
            ));
        }
    }

    if from.is_none() && to.is_none() {
        return Ok(None);
    }

    Ok(Some(DatetimeRange {
        gte: from.map(format_datetime),
        lte: to.map(format_datetime),
    }))
}

/// Accepts RFC 3339, a naive date-time (UTC assumed) or a bare date. A bare
/// date expands to the first or last instant of that day depending on `bound`.
fn parse_date(name: &str, raw: Option<&str>, bound: Bound) -> Result<Option<DateTime<Utc>>> {
    let Some(value) = non_blank(raw) else {
        return Ok(None);
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Some(Utc.from_utc_datetime(&naive)));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let time = match bound {
            Bound::Start => NaiveTime::from_hms_milli_opt(0, 0, 0, 0),
            Bound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999),
        }
        .ok_or_else(|| TicketLensError::Internal("invalid day boundary".to_string()))?;
        return Ok(Some(Utc.from_utc_datetime(&date.and_time(time))));
    }

    Err(TicketLensError::Validation(format!(
        "Invalid value '{value}' for `{name}`: expected YYYY-MM-DD or an RFC 3339 timestamp"
    )))
}

fn format_datetime(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Ticket ids may be indexed as integers or keywords; numeric input matches either.
fn ticket_condition(field: &str, ticket_id: &str) -> Condition {
    match ticket_id.parse::<i64>() {
        Ok(numeric) => Condition::nested(Filter::should(vec![
            Condition::matches(field, numeric),
            Condition::matches(field, ticket_id),
        ])),
        Err(_) => Condition::matches(field, ticket_id),
    }
}
