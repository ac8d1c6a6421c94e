
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Settings models
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
	#[serde(default = "default_currency_symbol")]
	pub currency_symbol: String,
	/// How many unparseable date rows are listed before collapsing into "and N more".
	#[serde(default = "default_problem_rows_shown")]
	pub problem_rows_shown: usize,
	#[serde(default = "default_recent_transactions_shown")]
	pub recent_transactions_shown: usize,
	#[serde(default = "default_export_file_prefix")]
	pub export_file_prefix: String,
}

fn default_currency_symbol() -> String {
	"$".to_string()
}

fn default_problem_rows_shown() -> usize {
	5
}

fn default_recent_transactions_shown() -> usize {
	10
}

fn default_export_file_prefix() -> String {
	"mis_finanzas".to_string()
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			currency_symbol: default_currency_symbol(),
			problem_rows_shown: default_problem_rows_shown(),
			recent_transactions_shown: default_recent_transactions_shown(),
			export_file_prefix: default_export_file_prefix(),
		}
	}
}

// Ledger models
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
	Expense,
	Income,
}

impl TransactionKind {
	/// Parses a `Tipo` cell. Accepts the Spanish labels written by the exported
	/// workbook and their English equivalents, case-insensitive.
	pub fn from_label(s: &str) -> Option<Self> {
		match s.trim().to_lowercase().as_str() {
			"gasto" | "gastos" | "expense" => Some(TransactionKind::Expense),
			"ingreso" | "ingresos" | "income" => Some(TransactionKind::Income),
			_ => None,
		}
	}

	/// Fallback for unknown labels: the amount sign decides.
	pub fn from_amount(amount: f64) -> Self {
		if amount < 0.0 {
			TransactionKind::Expense
		} else {
			TransactionKind::Income
		}
	}

	/// Label used in the `Tipo` column of generated workbooks.
	pub fn label(&self) -> &'static str {
		match self {
			TransactionKind::Expense => "Gasto",
			TransactionKind::Income => "Ingreso",
		}
	}
}

/// A single ledger row. `kind` is informational; every calculation uses the
/// sign of `amount`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
	pub date: NaiveDate,
	pub category: String,
	pub kind: TransactionKind,
	pub amount: f64,
}

impl Transaction {
	pub fn new(date: NaiveDate, category: impl Into<String>, kind: TransactionKind, amount: f64) -> Self {
		Self {
			date,
			category: category.into(),
			kind,
			amount,
		}
	}

	pub fn is_expense(&self) -> bool {
		self.amount < 0.0
	}

	pub fn is_income(&self) -> bool {
		self.amount > 0.0
	}
}

/// Historical rows first, then new rows. Duplicates are kept.
pub type Ledger = Vec<Transaction>;

// Goal models
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
	pub name: String,
	pub target_amount: f64,
	#[serde(default)]
	pub deadline: Option<NaiveDate>,
	pub created_at: NaiveDate,
}

#[derive(Debug, Error, PartialEq)]
pub enum GoalError {
	#[error("goal name must not be empty")]
	EmptyName,

	#[error("goal target must be greater than zero (got {0})")]
	NonPositiveTarget(f64),

	#[error("no goal at position {index} ({len} goals)")]
	IndexOutOfRange { index: usize, len: usize },
}

impl Goal {
	pub fn new(
		name: impl Into<String>,
		target_amount: f64,
		deadline: Option<NaiveDate>,
		created_at: NaiveDate,
	) -> Result<Self, GoalError> {
		let name = name.into().trim().to_string();
		if name.is_empty() {
			return Err(GoalError::EmptyName);
		}
		if target_amount.is_nan() || target_amount <= 0.0 {
			return Err(GoalError::NonPositiveTarget(target_amount));
		}
		Ok(Self {
			name,
			target_amount,
			deadline,
			created_at,
		})
	}
}

// Ingestion diagnostics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemRow {
	pub sheet: String,
	/// 1-based spreadsheet row, header included.
	pub row: usize,
	pub raw_value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostics {
	pub new_count: usize,
	pub historical_count: usize,
	pub goal_count: usize,
	pub problem_rows: Vec<ProblemRow>,
	#[serde(default)]
	pub skipped_sheets: Vec<String>,
	/// Set when a workbook without `Historico` was read as the old single-sheet layout.
	#[serde(default)]
	pub legacy_format: bool,
}

impl Diagnostics {
	pub fn displayed_problems(&self, limit: usize) -> &[ProblemRow] {
		&self.problem_rows[..self.problem_rows.len().min(limit)]
	}

	pub fn overflow_count(&self, limit: usize) -> usize {
		self.problem_rows.len().saturating_sub(limit)
	}

	pub fn transaction_count(&self) -> usize {
		self.new_count + self.historical_count
	}
}

// Session state
/// Everything a session holds between user actions. Calls take it by value and
/// hand it back, so there is exactly one writer at a time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppState {
	pub ledger: Ledger,
	pub goals: Vec<Goal>,
}

impl AppState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replace-on-load: an ingested ledger or goal list only replaces the
	/// current one when it is non-empty.
	pub fn apply_ingestion(mut self, ledger: Ledger, goals: Vec<Goal>) -> Self {
		if !ledger.is_empty() {
			self.ledger = ledger;
		}
		if !goals.is_empty() {
			self.goals = goals;
		}
		self
	}

	pub fn add_goal(&mut self, goal: Goal) {
		self.goals.push(goal);
	}

	pub fn remove_goal(&mut self, index: usize) -> Result<Goal, GoalError> {
		if index >= self.goals.len() {
			return Err(GoalError::IndexOutOfRange {
				index,
				len: self.goals.len(),
			});
		}
		Ok(self.goals.remove(index))
	}

	pub fn clear_transactions(&mut self) {
		self.ledger.clear();
	}

	pub fn clear_goals(&mut self) {
		self.goals.clear();
	}

	pub fn balance(&self) -> f64 {
		self.ledger.iter().map(|t| t.amount).sum()
	}
}
