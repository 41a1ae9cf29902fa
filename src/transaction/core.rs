//! Defines the core data models for transactions.
//!
//! The serialized field names follow the remote `transactions` collection
//! schema, which uses Portuguese column names. The snapshot file reuses the
//! same representation so records can move between the two stores unchanged.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::user::UserId;

/// Whether a transaction adds to or subtracts from the user's balance.
///
/// Serialized as the remote store's discriminator values `receita` (income)
/// and `despesa` (expense).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money earned.
    #[serde(rename = "receita")]
    Income,
    /// Money spent.
    #[serde(rename = "despesa")]
    Expense,
}

impl TransactionKind {
    /// The categories a transaction of this kind may belong to.
    ///
    /// These sets are fixed. The last entry of each is the catch-all
    /// "Outros".
    pub fn categories(self) -> &'static [&'static str] {
        match self {
            TransactionKind::Income => {
                &["Salário", "Freelance", "Investimentos", "Vendas", "Outros"]
            }
            TransactionKind::Expense => &[
                "Alimentação",
                "Transporte",
                "Moradia",
                "Saúde",
                "Educação",
                "Lazer",
                "Contas",
                "Outros",
            ],
        }
    }

    /// The value the remote store uses for this kind.
    pub fn as_wire_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "receita",
            TransactionKind::Expense => "despesa",
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction. Remote records carry UUIDs, locally
    /// synthesized records carry a unix-millisecond timestamp string.
    pub id: String,
    /// The user the transaction belongs to.
    #[serde(rename = "user_id")]
    pub owner: UserId,
    /// A text description of what the transaction was for.
    #[serde(rename = "descricao")]
    pub description: String,
    /// The amount of money spent or earned in this transaction. Always
    /// positive, the sign is carried by [Transaction::kind].
    #[serde(rename = "valor")]
    pub amount: f64,
    /// The category the transaction belongs to, one of
    /// [TransactionKind::categories].
    #[serde(rename = "categoria")]
    pub category: String,
    /// The calendar date the transaction happened on.
    #[serde(rename = "data")]
    pub date: Date,
    /// Whether this is income or an expense.
    #[serde(rename = "tipo")]
    pub kind: TransactionKind,
    /// The remote store's creation timestamp. Absent on locally synthesized
    /// records until they reach the remote store, which they currently never
    /// do.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created_at: Option<String>,
}

/// A transaction as submitted by the entry form, before a store has assigned
/// it an ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    /// The user the transaction belongs to.
    #[serde(rename = "user_id")]
    pub owner: UserId,
    /// A text description of what the transaction was for.
    #[serde(rename = "descricao")]
    pub description: String,
    /// The amount of money spent or earned. Always positive.
    #[serde(rename = "valor")]
    pub amount: f64,
    /// The category the transaction belongs to.
    #[serde(rename = "categoria")]
    pub category: String,
    /// The calendar date the transaction happened on.
    #[serde(rename = "data")]
    pub date: Date,
    /// Whether this is income or an expense.
    #[serde(rename = "tipo")]
    pub kind: TransactionKind,
}

impl TransactionDraft {
    /// Turn the draft into a full [Transaction] with a store-assigned `id`.
    pub fn into_transaction(self, id: String, created_at: Option<String>) -> Transaction {
        Transaction {
            id,
            owner: self.owner,
            description: self.description,
            amount: self.amount,
            category: self.category,
            date: self.date,
            kind: self.kind,
            created_at,
        }
    }
}

#[cfg(test)]
mod core_tests {
    use time::macros::date;

    use crate::user::UserId;

    use super::{Transaction, TransactionDraft, TransactionKind};

    #[test]
    fn transaction_serializes_with_wire_field_names() {
        let transaction = Transaction {
            id: "abc-123".to_owned(),
            owner: UserId::new("user-1"),
            description: "Mercado".to_owned(),
            amount: 150.0,
            category: "Alimentação".to_owned(),
            date: date!(2024 - 03 - 10),
            kind: TransactionKind::Expense,
            created_at: None,
        };

        let json = serde_json::to_value(&transaction).unwrap();

        assert_eq!(json["user_id"], "user-1");
        assert_eq!(json["descricao"], "Mercado");
        assert_eq!(json["valor"], 150.0);
        assert_eq!(json["categoria"], "Alimentação");
        assert_eq!(json["data"], "2024-03-10");
        assert_eq!(json["tipo"], "despesa");
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn transaction_deserializes_remote_record() {
        let json = r#"{
            "id": "f3b1",
            "user_id": "user-1",
            "descricao": "Salário de Janeiro",
            "valor": 1000.0,
            "categoria": "Salário",
            "data": "2024-01-15",
            "tipo": "receita",
            "created_at": "2024-01-15T09:00:00Z"
        }"#;

        let transaction: Transaction = serde_json::from_str(json).unwrap();

        assert_eq!(transaction.kind, TransactionKind::Income);
        assert_eq!(transaction.date, date!(2024 - 01 - 15));
        assert_eq!(
            transaction.created_at.as_deref(),
            Some("2024-01-15T09:00:00Z")
        );
    }

    #[test]
    fn draft_round_trips_through_into_transaction() {
        let draft = TransactionDraft {
            owner: UserId::new("user-1"),
            description: "Uber".to_owned(),
            amount: 32.5,
            category: "Transporte".to_owned(),
            date: date!(2024 - 03 - 11),
            kind: TransactionKind::Expense,
        };

        let transaction = draft.clone().into_transaction("1712345678901".to_owned(), None);

        assert_eq!(transaction.id, "1712345678901");
        assert_eq!(transaction.description, draft.description);
        assert_eq!(transaction.amount, draft.amount);
        assert!(transaction.created_at.is_none());
    }

    #[test]
    fn category_sets_end_with_catch_all() {
        assert_eq!(TransactionKind::Income.categories().last(), Some(&"Outros"));
        assert_eq!(
            TransactionKind::Expense.categories().last(),
            Some(&"Outros")
        );
        assert_eq!(TransactionKind::Income.categories().len(), 5);
        assert_eq!(TransactionKind::Expense.categories().len(), 8);
    }
}
