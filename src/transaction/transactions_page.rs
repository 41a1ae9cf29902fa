//! Defines the transactions page, the main view of the app.
//!
//! The page shows one calendar month at a time: the summary cards, the
//! month's transactions sorted most recent first, the entry form, and the
//! CSV export link.

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::macros::format_description;

use crate::{
    AppState, endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_LABEL_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, local_mode_banner,
    },
    render,
    session::Session,
    transaction::{
        Backend, FinancialSummary, Period, PeriodQuery, Transaction, TransactionKind,
        TransactionLedger, summarize,
    },
};

/// The state needed to display the transactions page.
#[derive(Clone)]
pub struct TransactionsPageState {
    /// The store accessor for transactions.
    pub ledger: TransactionLedger,
    /// Whether a remote store is configured.
    pub remote_configured: bool,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger: state.ledger.clone(),
            remote_configured: state.remote.is_some(),
        }
    }
}

/// A route handler for displaying the transactions page for the month in
/// the query string, defaulting to the current month.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(session): Extension<Session>,
    Query(period_query): Query<PeriodQuery>,
) -> Response {
    let period = period_query.resolve();

    let (transactions, backend) = match state.ledger.load(&session).await {
        Ok(result) => result,
        Err(error) => return error.into_response(),
    };

    let summary = summarize(&transactions, period.month, period.year);

    render(
        StatusCode::OK,
        transactions_view(&summary, period, backend, state.remote_configured),
    )
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn transactions_view(
    summary: &FinancialSummary,
    period: Period,
    backend: Backend,
    remote_configured: bool,
) -> Markup {
    let content = html! {
        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-3xl"
            {
                div class="flex items-center justify-between mb-4"
                {
                    h1 class="text-2xl font-bold" { "EAZZY" }

                    @if remote_configured
                    {
                        form method="post" action=(endpoints::LOG_OUT)
                        {
                            button type="submit" class=(LINK_STYLE) { "Log out" }
                        }
                    }
                }

                @if !remote_configured
                {
                    (local_mode_banner())
                }
                @else if backend == Backend::Local
                {
                    div
                        class="w-full p-4 mb-4 text-sm text-yellow-800 rounded-lg \
                            bg-yellow-50 dark:bg-gray-800 dark:text-yellow-300"
                        role="alert"
                    {
                        "The remote service could not be reached. Showing "
                        "transactions saved on this device."
                    }
                }

                (month_selector(period))
                (summary_cards(summary))
                (entry_form(period))
                (transactions_table(&summary.transactions))

                p class="mt-4"
                {
                    a
                        class=(LINK_STYLE)
                        href=(format!(
                            "{}?month={}&year={}",
                            endpoints::EXPORT,
                            period.month_number(),
                            period.year
                        ))
                    {
                        "Download CSV report"
                    }
                }
            }
        }
    };

    base("Transactions", &content)
}

fn month_selector(period: Period) -> Markup {
    html! {
        form method="get" action=(endpoints::TRANSACTIONS_VIEW) class="flex items-end gap-2 mb-4"
        {
            div
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Month" }
                select name="month" id="month" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for (index, name) in MONTH_NAMES.iter().enumerate()
                    {
                        @let number = index + 1;
                        option
                            value=(number)
                            selected[number == period.month_number() as usize]
                        {
                            (name)
                        }
                    }
                }
            }

            div
            {
                label for="year" class=(FORM_LABEL_STYLE) { "Year" }
                input
                    type="number"
                    name="year"
                    id="year"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(period.year);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Show" }
        }
    }
}

fn summary_cards(summary: &FinancialSummary) -> Markup {
    html! {
        div class="flex flex-wrap gap-4 mb-6"
        {
            div class=(CARD_STYLE)
            {
                p class=(CARD_LABEL_STYLE) { "Income" }
                p id="total-income" class="text-lg font-semibold text-green-600 dark:text-green-400"
                {
                    (format_currency(summary.total_income))
                }
            }

            div class=(CARD_STYLE)
            {
                p class=(CARD_LABEL_STYLE) { "Expenses" }
                p id="total-expense" class="text-lg font-semibold text-red-600 dark:text-red-400"
                {
                    (format_currency(summary.total_expense))
                }
            }

            div class=(CARD_STYLE)
            {
                p class=(CARD_LABEL_STYLE) { "Balance" }
                @let balance_color = if summary.balance < 0.0 {
                    "text-red-600 dark:text-red-400"
                } else {
                    "text-green-600 dark:text-green-400"
                };
                p id="balance" class=(format!("text-lg font-semibold {balance_color}"))
                {
                    (format_currency(summary.balance))
                }
            }
        }
    }
}

fn entry_form(period: Period) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::TRANSACTIONS_API)
            class="flex flex-col gap-3 p-4 mb-6 bg-white rounded-lg shadow dark:bg-gray-800"
        {
            h2 class="text-lg font-semibold" { "New transaction" }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }
                input
                    type="text"
                    name="description"
                    id="description"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required;
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                input
                    type="number"
                    name="amount"
                    id="amount"
                    class=(FORM_TEXT_INPUT_STYLE)
                    step="0.01"
                    min="0.01"
                    required;
            }

            div class="flex gap-4"
            {
                label class="flex items-center gap-1"
                {
                    input type="radio" name="kind" value=(TransactionKind::Income.as_wire_str()) required;
                    "Income"
                }
                label class="flex items-center gap-1"
                {
                    input type="radio" name="kind" value=(TransactionKind::Expense.as_wire_str()) checked;
                    "Expense"
                }
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                select name="category" id="category" class=(FORM_TEXT_INPUT_STYLE)
                {
                    optgroup label="Income"
                    {
                        @for category in TransactionKind::Income.categories()
                        {
                            option value=(category) { (category) }
                        }
                    }
                    optgroup label="Expense"
                    {
                        @for category in TransactionKind::Expense.categories()
                        {
                            option value=(category) { (category) }
                        }
                    }
                }
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }
                @let default_date = match time::Date::from_calendar_date(period.year, period.month, 1) {
                    Ok(date) => date.to_string(),
                    Err(_) => String::new(),
                };
                input
                    type="date"
                    name="date"
                    id="date"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(default_date)
                    required;
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add" }
        }
    }
}

fn transactions_table(transactions: &[Transaction]) -> Markup {
    let display_date = format_description!("[day]/[month]/[year]");

    html! {
        @if transactions.is_empty()
        {
            p class="text-gray-500 dark:text-gray-400" { "No transactions this month." }
        }
        @else
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th class=(TABLE_CELL_STYLE) { "Date" }
                        th class=(TABLE_CELL_STYLE) { "Description" }
                        th class=(TABLE_CELL_STYLE) { "Category" }
                        th class=(TABLE_CELL_STYLE) { "Amount" }
                        th class=(TABLE_CELL_STYLE) { "" }
                    }
                }

                tbody
                {
                    @for transaction in transactions
                    {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE)
                            {
                                (transaction.date.format(display_date).unwrap_or_default())
                            }
                            td class=(TABLE_CELL_STYLE) { (transaction.description) }
                            td class=(TABLE_CELL_STYLE) { (transaction.category) }

                            @let (sign, color) = match transaction.kind {
                                TransactionKind::Income => ("+", "text-green-600 dark:text-green-400"),
                                TransactionKind::Expense => ("-", "text-red-600 dark:text-red-400"),
                            };
                            td class=(format!("{TABLE_CELL_STYLE} {color}"))
                            {
                                (sign) (format_currency(transaction.amount))
                            }

                            td class=(TABLE_CELL_STYLE)
                            {
                                form
                                    method="post"
                                    action=(endpoints::format_endpoint(
                                        endpoints::DELETE_TRANSACTION,
                                        &transaction.id
                                    ))
                                {
                                    button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
