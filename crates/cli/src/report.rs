use dashboard_engine::{GoalStatus, Summary, format_money};
use models::{Diagnostics, Settings};
use workbook_ingest::IngestOutcome;

pub fn problem_lines(diagnostics: &Diagnostics, limit: usize) -> Vec<String> {
    let mut lines: Vec<String> = diagnostics
        .displayed_problems(limit)
        .iter()
        .map(|p| format!("Fila {}: {} ({})", p.row, p.raw_value, p.sheet))
        .collect();
    let more = diagnostics.overflow_count(limit);
    if more > 0 {
        lines.push(format!("... and {} more", more));
    }
    lines
}

pub fn print_ingestion(outcome: &IngestOutcome, settings: &Settings) {
    let d = &outcome.diagnostics;
    if d.legacy_format {
        println!("Old single-sheet format: Transacciones read as history");
    }
    println!("Historical transactions: {}", d.historical_count);
    println!("New transactions       : {}", d.new_count);
    println!("Goals                  : {}", d.goal_count);

    for sheet in &d.skipped_sheets {
        println!("[WARN] sheet '{}' skipped: required columns missing", sheet);
    }
    if !d.problem_rows.is_empty() {
        println!(
            "[WARN] {} rows skipped, date not readable (use DD/MM/YYYY):",
            d.problem_rows.len()
        );
        for line in problem_lines(d, settings.problem_rows_shown) {
            println!("  {}", line);
        }
    }
}

pub fn print_summary(summary: &Summary) {
    let symbol = summary.metadata.currency_symbol.as_str();
    let money = |v: f64| format_money(symbol, v);
    let t = &summary.totals;

    println!("Balance : {}", money(t.balance));
    println!("Income  : {}", money(t.income));
    println!("Expenses: {}", money(t.expenses));
    println!("Transactions: {}", t.transaction_count);
    if let Some(p) = &summary.period {
        println!("Period: {} .. {}", p.from.format("%d/%m/%Y"), p.to.format("%d/%m/%Y"));
    }

    if !summary.expenses_by_category.is_empty() {
        println!("\nExpenses by category:");
        for c in &summary.expenses_by_category {
            println!("  {:<20} {:>14}", c.category, money(c.amount));
        }
    }

    if !summary.monthly_cash_flow.is_empty() {
        println!("\nMonthly cash flow:");
        for m in &summary.monthly_cash_flow {
            println!(
                "  {}  in {:>12}  out {:>12}  net {:>12}",
                m.month,
                money(m.income),
                money(m.expenses),
                money(m.net_cash_flow)
            );
        }
    }
    if let Some(trend) = summary.expense_trend {
        println!("Expense trend vs previous month: {}", money(trend));
    }
    println!("Average daily spending: {}", money(summary.average_daily_expense));

    if !summary.recent_transactions.is_empty() {
        println!("\nRecent transactions:");
        for txn in &summary.recent_transactions {
            println!(
                "  {}  {:<20} {:<8} {:>12}",
                txn.date.format("%d/%m/%Y"),
                txn.category,
                txn.kind.label(),
                money(txn.amount)
            );
        }
    }

    if !summary.goals.is_empty() {
        println!();
        print_goals(summary);
    }

    if !summary.insights.is_empty() {
        println!("\nInsights:");
        for line in &summary.insights {
            println!("  - {}", line);
        }
    }
}

pub fn print_goals(summary: &Summary) {
    if summary.goals.is_empty() {
        println!("No goals yet");
        return;
    }
    let money = |v: f64| format_money(&summary.metadata.currency_symbol, v);
    println!("Goals:");
    for (i, g) in summary.goals.iter().enumerate() {
        let status = match g.status {
            GoalStatus::Reached => "reached".to_string(),
            GoalStatus::OnTrack => format!(
                "{} days left, {} per day",
                g.days_left.unwrap_or_default(),
                money(g.daily_saving_needed.unwrap_or_default())
            ),
            GoalStatus::Overdue => "deadline passed".to_string(),
            GoalStatus::NoDeadline => "no deadline".to_string(),
        };
        println!(
            "  {}. {} {} / {} ({:.1}%) {}",
            i + 1,
            g.name,
            money(g.saved),
            money(g.target_amount),
            g.progress_pct,
            status
        );
    }
}
