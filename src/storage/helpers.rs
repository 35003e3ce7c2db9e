// Small query building helpers for the sqlite backend.
// Everything here only ever produces column names and
// placeholders, values go through prepared statement
// params.

pub fn set_clause(name: &str) -> String {
  format!("{} = ?", name)
}

// Case-insensitive equality. SQLite LIKE would also work
// for ASCII but LOWER() says what it means.
pub fn set_clause_ci(name: &str) -> String {
  format!("LOWER({}) = LOWER(?)", name)
}

// OR-combined substring match over several columns, one
// placeholder per column.
pub fn like_any_clause(names: &[&str]) -> String {
  let clauses: Vec<String> = names
    .iter()
    .map(|n| format!("{} LIKE ?", n))
    .collect();
  clauses.join(" OR ")
}

pub fn like_pattern(term: &str) -> String {
  format!("%{}%", term)
}
