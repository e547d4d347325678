use tabled::settings::Style;
use tabled::{Table, Tabled};
use todo_core::error::AppError;
use todo_core::model::TaskStatus;
use todo_core::view::{RenderedList, Row};

pub const PLACEHOLDER: &str = "Nothing to do. Add a task with `add <text>`.";

#[derive(Tabled)]
struct RowView {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "done")]
    checkbox: &'static str,
    #[tabled(rename = "task")]
    name: String,
    #[tabled(rename = "id")]
    id: String,
}

/// Completed names are struck through with tildes.
fn checked_name(name: &str) -> String {
    format!("~{name}~")
}

impl From<&Row> for RowView {
    fn from(row: &Row) -> Self {
        let (checkbox, name) = if row.checked {
            ("[x]", checked_name(&row.name))
        } else {
            ("[ ]", row.name.clone())
        };
        Self {
            index: row.index,
            checkbox,
            name,
            id: row.id.short(),
        }
    }
}

fn filter_button(rendered: &RenderedList, status: TaskStatus) -> String {
    if rendered.is_filter_active(status) {
        format!("[{status}]")
    } else {
        format!(" {status} ")
    }
}

pub fn render_plain(rendered: &RenderedList) -> String {
    let mut out = format!(
        "filter:{}{}\n",
        filter_button(rendered, TaskStatus::Pending),
        filter_button(rendered, TaskStatus::Completed),
    );

    if rendered.show_placeholder {
        out.push_str(PLACEHOLDER);
        return out;
    }

    let views: Vec<RowView> = rendered
        .rows
        .iter()
        .map(RowView::from)
        .collect();
    let mut table = Table::new(views);
    table.with(Style::psql());
    out.push_str(&table.to_string());
    out
}

pub fn render_json(rendered: &RenderedList) -> Result<String, AppError> {
    serde_json::to_string(rendered).map_err(|err| AppError::invalid_data(err.to_string()))
}
