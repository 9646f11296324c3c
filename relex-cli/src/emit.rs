use relex::table::{TransitionTable, ASCII_COLUMNS};
use std::io::{self, Write};

/// Writes the accessor macro and the `state x ascii` next-state array in the
/// shape a generated C scanner skeleton includes, followed by the per-row
/// acceptance array.
pub fn emit_table(
    out: &mut dyn Write,
    table: &TransitionTable,
    name: &str,
) -> io::Result<()> {
    writeln!(
        out,
        "// yy_next(state, c) is given the current state and next character,"
    )?;
    writeln!(out, "// and evaluates to the next state.")?;
    writeln!(out, "#define yy_next(state, c)    {name}[state][c]")?;
    writeln!(out)?;

    writeln!(out, "static const int {name}[][{ASCII_COLUMNS}] = {{")?;
    for (row, cells) in table.rows().iter().enumerate() {
        write!(out, "/* {row:05} */ {{ ")?;
        for cell in cells {
            write!(out, "{cell:5}, ")?;
        }
        writeln!(out, "}},")?;
    }
    writeln!(out, "}};")?;
    writeln!(out)?;

    writeln!(out, "// -1 marks a non-accepting row; any other value is the")?;
    writeln!(out, "// anchor mask (1 = line start, 2 = line end).")?;
    writeln!(out, "static const int {name}_accept[] = {{")?;
    for row in 0..table.rows().len() {
        let cell: i16 = if table.is_accepting(row) {
            i16::from(table.anchor(row).bits())
        } else {
            -1
        };
        writeln!(out, "/* {row:05} */ {cell:5},")?;
    }
    writeln!(out, "}};")?;
    Ok(())
}
