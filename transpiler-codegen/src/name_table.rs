//! The one piece of runtime configuration the generator has: which
//! target-library call backs a source-level built-in name.

use std::collections::BTreeMap;

/// `print -> Console.Write`, etc. Names absent from the table pass
/// through unchanged, so a call to an undeclared-looking name still
/// emits something instead of failing.
pub fn default_name_table() -> BTreeMap<&'static str, &'static str> {
    let mut table = BTreeMap::new();
    table.insert("print", "Console.Write");
    table.insert("println", "Console.WriteLine");
    table.insert("readln", "Console.ReadLine");
    table.insert("sqrt", "Math.Sqrt");
    table
}
