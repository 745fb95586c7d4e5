// HTML report rendering
//
// Layout follows the dataframe-style table the report has always had so that
// pages embedding it keep their styling.

use katilim_recon::Table;

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render a table as `<table border="1" class="dataframe">` with thead/tbody.
pub fn render_table(table: &Table) -> String {
    let mut out = String::new();
    out.push_str("<table border=\"1\" class=\"dataframe\">\n");
    out.push_str("  <thead>\n    <tr style=\"text-align: right;\">\n");
    for col in &table.columns {
        out.push_str(&format!("      <th>{}</th>\n", escape(col)));
    }
    out.push_str("    </tr>\n  </thead>\n  <tbody>\n");
    for row in &table.rows {
        out.push_str("    <tr>\n");
        for i in 0..table.columns.len() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            out.push_str(&format!("      <td>{}</td>\n", escape(cell)));
        }
        out.push_str("    </tr>\n");
    }
    out.push_str("  </tbody>\n</table>");
    out
}
