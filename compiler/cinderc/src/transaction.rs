//! Transaction ledger.
//!
//! One [`Transaction`] per successfully compiled increment, in commit
//! order. A transaction records only the [`DeclRange`] the context handed
//! back from its commit; the declarations themselves stay in the context.
//! Ranges of consecutive transactions are contiguous, so the declarations
//! introduced between any two transactions form a single range.

use std::fmt;

use cinder_ir::{DeclId, DeclRange};
use cinder_sema::ContextMark;

use crate::error::LedgerError;

/// Position of a transaction in the ledger.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct TransactionId(u32);

impl TransactionId {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome recorded for a committed increment.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TransactionStatus {
    Success,
    SuccessWithWarnings,
}

/// A committed increment.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Transaction {
    pub id: TransactionId,
    pub range: DeclRange,
    pub status: TransactionStatus,
    /// The transaction committed just before this one.
    pub previous: Option<TransactionId>,
    /// State of the context the increment was compiled against.
    pub mark: ContextMark,
}

impl Transaction {
    pub fn first_decl(&self) -> DeclId {
        self.range.start
    }

    /// Last declaration; ranges in the ledger are never empty.
    pub fn last_decl(&self) -> DeclId {
        self.range.last().unwrap_or(self.range.start)
    }
}

/// Append-only record of committed increments.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed range.
    ///
    /// The range must start where the previous transaction ended (or at the
    /// first declaration for the first transaction) and must not be empty.
    #[tracing::instrument(level = "debug", skip(self), fields(transactions = self.transactions.len()))]
    pub fn commit(
        &mut self,
        range: DeclRange,
        mark: ContextMark,
        status: TransactionStatus,
    ) -> Result<Transaction, LedgerError> {
        if range.is_empty() {
            return Err(LedgerError::EmptyRange);
        }
        let expected = self
            .transactions
            .last()
            .map_or(DeclId::from_raw(0), |t| t.range.end);
        if range.start != expected {
            return Err(LedgerError::NonContiguous {
                expected,
                found: range.start,
            });
        }
        let transaction = Transaction {
            id: TransactionId(u32::try_from(self.transactions.len()).unwrap_or(u32::MAX)),
            range,
            status,
            previous: self.transactions.last().map(|t| t.id),
            mark,
        };
        self.transactions.push(transaction);
        Ok(transaction)
    }

    pub fn last_transaction(&self) -> Option<&Transaction> {
        self.transactions.last()
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Declarations introduced by transactions `from` through `to`, inclusive.
    pub fn decls_between(
        &self,
        from: TransactionId,
        to: TransactionId,
    ) -> Result<DeclRange, LedgerError> {
        let first = self.get(from).ok_or(LedgerError::UnknownTransaction(from))?;
        let last = self.get(to).ok_or(LedgerError::UnknownTransaction(to))?;
        if from > to {
            return Err(LedgerError::Reversed { from, to });
        }
        Ok(DeclRange::new(first.range.start, last.range.end))
    }
}
