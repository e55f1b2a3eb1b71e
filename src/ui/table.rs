use tabled::{builder::Builder, settings::Style, Table, Tabled};
use crate::introspect::Column;
use crate::query::Row;
use crate::ui::Icons;

#[derive(Tabled)]
pub struct ColumnRow {
    #[tabled(rename = "Column")]
    pub name: String,
    #[tabled(rename = "Type")]
    pub column_type: String,
    #[tabled(rename = "PK")]
    pub primary_key: String,
    #[tabled(rename = "References")]
    pub references: String,
}

impl From<&Column> for ColumnRow {
    fn from(column: &Column) -> Self {
        Self {
            name: column.name.clone(),
            column_type: column.column_type.clone(),
            primary_key: if column.primary_key { Icons::KEY.to_string() } else { String::new() },
            references: column
                .references
                .as_ref()
                .map(|target| format!("{} {}", Icons::LINK, target))
                .unwrap_or_default(),
        }
    }
}

/// Result rows as a rounded table, header taken from the first row's columns
pub fn rows_table(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };

    let mut builder = Builder::default();
    builder.push_record(first.columns().map(str::to_string));
    for row in rows {
        builder.push_record(row.iter().map(|(_, value)| value.display()));
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Columns of one table
pub fn schema_table(columns: &[Column]) -> String {
    let rows: Vec<ColumnRow> = columns.iter().map(ColumnRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
