//! CSV export of one month of transactions.
//!
//! The column layout and the DD/MM/YYYY dates match the report format the
//! companion spreadsheet templates expect, so the headers stay in
//! Portuguese even though the UI is English.

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use time::macros::format_description;

use crate::{
    AppState, Error,
    session::Session,
    transaction::{Period, PeriodQuery, Transaction, TransactionLedger, summarize},
};

/// The state needed to export a month of transactions.
#[derive(Clone)]
pub struct ExportState {
    /// The store accessor for transactions.
    pub ledger: TransactionLedger,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger: state.ledger.clone(),
        }
    }
}

/// Serialize `transactions` as a CSV report.
///
/// The rows keep the order they are given in, so passing a summarized
/// month produces a report sorted most recent first.
///
/// # Errors
/// Returns [Error::CsvError] if a row cannot be serialized.
pub fn export_csv(transactions: &[Transaction]) -> Result<Vec<u8>, Error> {
    let date_format = format_description!("[day]/[month]/[year]");
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(["Data", "Descrição", "Categoria", "Tipo", "Valor"])
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for transaction in transactions {
        let date = transaction
            .date
            .format(date_format)
            .map_err(|error| Error::CsvError(error.to_string()))?;

        writer
            .write_record([
                date.as_str(),
                transaction.description.as_str(),
                transaction.category.as_str(),
                transaction.kind.as_wire_str(),
                format!("{:.2}", transaction.amount).as_str(),
            ])
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}

/// The download file name for the report covering `period`, e.g.
/// "eazzy_report_3_2024.csv". The month is 1-based.
pub fn export_filename(period: Period) -> String {
    format!(
        "eazzy_report_{}_{}.csv",
        period.month_number(),
        period.year
    )
}

/// A route handler that downloads the displayed month as a CSV report.
pub async fn get_export(
    State(state): State<ExportState>,
    Extension(session): Extension<Session>,
    Query(period_query): Query<PeriodQuery>,
) -> Response {
    let period = period_query.resolve();

    let (transactions, _) = match state.ledger.load(&session).await {
        Ok(result) => result,
        Err(error) => return error.into_response(),
    };

    let summary = summarize(&transactions, period.month, period.year);

    let csv_bytes = match export_csv(&summary.transactions) {
        Ok(csv_bytes) => csv_bytes,
        Err(error) => return error.into_response(),
    };

    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export_filename(period)),
            ),
        ],
        csv_bytes,
    )
        .into_response()
}
