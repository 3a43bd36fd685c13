use tabled::{
    Table, Tabled,
    settings::{Panel, Style},
};

pub struct Formatter;

#[derive(Debug, Clone, Default)]
pub struct FormatConfig {
    pub header: Option<String>,
    pub footer: Option<String>,
}

impl Formatter {
    pub fn render<T: Tabled>(data: impl IntoIterator<Item = T>, config: FormatConfig) -> Table {
        let mut table = Table::new(data);
        if let Some(header) = config.header {
            table.with(Panel::header(header));
        }
        if let Some(footer) = config.footer {
            table.with(Panel::footer(footer));
        }

        table.with(Style::blank());
        table
    }
}
