use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Modify, Panel, Style, object::Columns, object::Rows, style::LineText},
};

use super::TabStyle;

pub(crate) fn apply_style(table: &mut Table, style: TabStyle) {
    match style {
        TabStyle::Rounded => table.with(Style::rounded()),
        TabStyle::Modern => table.with(Style::modern()),
        TabStyle::ModernRounded => table.with(Style::modern_rounded()),
        TabStyle::Ascii => table.with(Style::ascii()),
        TabStyle::AsciiRounded => table.with(Style::ascii_rounded()),
        TabStyle::Psql => table.with(Style::psql()),
        TabStyle::Markdown => table.with(Style::markdown()),
        TabStyle::Extended => table.with(Style::extended()),
        TabStyle::Sharp => table.with(Style::sharp()),
        TabStyle::Dots => table.with(Style::dots()),
        TabStyle::ReStructuredText => table.with(Style::re_structured_text()),
        TabStyle::Blank => table.with(Style::blank()),
        TabStyle::Empty => table.with(Style::empty()),
    };
}

/// Styles without a top border have no line to draw the title into.
fn has_top_border(style: TabStyle) -> bool {
    !matches!(
        style,
        TabStyle::Psql | TabStyle::Markdown | TabStyle::Blank | TabStyle::Empty
    )
}

pub(crate) fn apply_title_line(table: &mut Table, title: &str, style: TabStyle) {
    if has_top_border(style) {
        table.with(LineText::new(format!(" {title} "), Rows::first()).offset(1));
    } else {
        table.with(Panel::header(format!(" {title} ")));
    }
}

pub(crate) fn render_empty(title: &str, style: TabStyle) -> String {
    let mut builder = Builder::default();
    builder.push_record(["(none)"]);
    let mut table = builder.build();
    apply_style(&mut table, style);
    table.with(Panel::header(format!(" {title} ")));
    table.to_string()
}

/// Right-align the numeric columns `from..to`.
pub(crate) fn align_counts(table: &mut Table, from: usize, to: usize) {
    table.with(Modify::new(Columns::new(from..to)).with(Alignment::right()));
}
