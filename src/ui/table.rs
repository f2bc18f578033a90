use crate::matcher::CallMatch;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// One call site as shown in the human report
#[derive(Tabled)]
pub struct CallRow {
    #[tabled(rename = "Scope")]
    pub scope: String,
    #[tabled(rename = "Location")]
    pub location: String,
    #[tabled(rename = "Pattern")]
    pub pattern: String,
}

impl From<&CallMatch> for CallRow {
    fn from(call: &CallMatch) -> Self {
        Self {
            scope: call.enclosing_scope.clone().unwrap_or_else(|| "<module>".to_string()),
            location: format!("{}:{}:{}", call.file_path.display(), call.line, call.column),
            pattern: call.pattern_kind.to_string(),
        }
    }
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

/// Call sites in report order; empty when there are none
pub fn call_table(calls: &[CallMatch]) -> String {
    if calls.is_empty() {
        return String::new();
    }

    let rows: Vec<CallRow> = calls.iter().map(CallRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
