use colored::*;
use ndarray::Array2;
use unicode_width::UnicodeWidthStr;

use std::fmt;

pub struct BorderStyle {
    top: char,
    right: char,
    bottom: char,
    left: char,

    down_and_left: char,
    down_and_right: char,

    up_and_right: char,
    up_and_left: char,

    vertical_and_right: char,
    vertical_and_left: char,

    up_and_horizontal: char,
    down_and_horizontal: char,

    vertical_and_horizontal: char,
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self {
            top: '─',
            right: '│',
            bottom: '─',
            left: '│',

            down_and_left: '┐',
            down_and_right: '┌',

            up_and_right: '┘',
            up_and_left: '└',

            vertical_and_right: '├',
            vertical_and_left: '┤',

            up_and_horizontal: '┴',
            down_and_horizontal: '┬',

            vertical_and_horizontal: '┼',
        }
    }
}

impl BorderStyle {
    /// Plain ASCII borders for terminals without box-drawing glyphs.
    pub fn ascii() -> Self {
        Self {
            top: '-',
            right: '|',
            bottom: '-',
            left: '|',
            down_and_left: '+',
            down_and_right: '+',
            up_and_right: '+',
            up_and_left: '+',
            vertical_and_right: '+',
            vertical_and_left: '+',
            up_and_horizontal: '+',
            down_and_horizontal: '+',
            vertical_and_horizontal: '+',
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PrintTableCell {
    data: String,
    width: usize,
    highlight: bool,
}

impl PrintTableCell {
    pub fn new(data: String) -> Self {
        let width = UnicodeWidthStr::width(data.as_str());
        Self {
            data,
            width,
            highlight: false,
        }
    }

    pub fn highlighted(mut self) -> Self {
        self.highlight = true;
        self
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

/// Grid of right-aligned cells drawn with box borders. A horizontal rule is drawn below
/// every row listed in `rules`.
pub struct PrintTable {
    cells: Array2<PrintTableCell>,
    border: BorderStyle,
    rules: Vec<usize>,
}

impl PrintTable {
    pub fn new(cells: Array2<PrintTableCell>) -> Self {
        Self {
            cells,
            border: BorderStyle::default(),
            rules: Vec::new(),
        }
    }

    pub fn with_border(mut self, border: BorderStyle) -> Self {
        self.border = border;
        self
    }

    pub fn with_rule_after(mut self, row: usize) -> Self {
        self.rules.push(row);
        self
    }

    pub fn col_widths(&self) -> Vec<usize> {
        self.cells
            .columns()
            .into_iter()
            .map(|col| col.iter().fold(0, |l, cell| std::cmp::max(l, cell.width())))
            .collect::<Vec<usize>>()
    }

    fn write_rule(
        &self,
        f: &mut fmt::Formatter,
        widths: &[usize],
        (start, fill, join, end): (char, char, char, char),
    ) -> fmt::Result {
        let segments = widths
            .iter()
            .map(|w| fill.to_string().repeat(w + 2))
            .collect::<Vec<String>>();
        writeln!(f, "{}{}{}", start, segments.join(&join.to_string()), end)
    }
}

impl fmt::Display for PrintTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let widths = self.col_widths();
        let b = &self.border;

        self.write_rule(f, &widths, (b.down_and_right, b.top, b.down_and_horizontal, b.down_and_left))?;
        for (i, row) in self.cells.rows().into_iter().enumerate() {
            write!(f, "{}", b.left)?;
            for (j, cell) in row.iter().enumerate() {
                let pad = " ".repeat(widths[j] - cell.width());
                if cell.highlight {
                    write!(f, " {}{} ", pad, cell.data.bold().yellow())?;
                } else {
                    write!(f, " {}{} ", pad, cell.data)?;
                }
                if j + 1 < widths.len() {
                    write!(f, "{}", b.right)?;
                }
            }
            writeln!(f, "{}", b.right)?;

            if self.rules.contains(&i) && i + 1 < self.cells.nrows() {
                self.write_rule(
                    f,
                    &widths,
                    (b.vertical_and_right, b.top, b.vertical_and_horizontal, b.vertical_and_left),
                )?;
            }
        }
        self.write_rule(f, &widths, (b.up_and_left, b.bottom, b.up_and_horizontal, b.up_and_right))
    }
}

/// Short decimal form for tableau entries: integers without a fraction, otherwise
/// up to four decimals with trailing zeros removed.
pub fn format_value(v: f64) -> String {
    if v.abs() < 5e-5 {
        return "0".to_string();
    }
    if (v - v.round()).abs() < 5e-5 {
        return format!("{}", v.round());
    }
    let s = format!("{:.4}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
