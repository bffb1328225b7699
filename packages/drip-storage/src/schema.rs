pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

/// Executable statements from the rendered schema. Comment lines are dropped
/// before splitting on ';' so a semicolon inside a comment never produces a
/// broken statement.
pub fn statements() -> Vec<String> {
	let sql = render_schema()
		.lines()
		.filter(|line| !line.trim_start().starts_with("--"))
		.collect::<Vec<_>>()
		.join("\n");

	sql.split(';')
		.map(str::trim)
		.filter(|statement| !statement.is_empty())
		.map(str::to_string)
		.collect()
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_leads.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_leads.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rendered_schema_has_no_unexpanded_includes() {
		let sql = render_schema();

		assert!(!sql.contains("\\ir "));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS leads"));
	}

	#[test]
	fn statements_carry_no_comment_text() {
		let statements = statements();

		assert!(!statements.is_empty());

		for statement in &statements {
			assert!(
				statement.starts_with("CREATE"),
				"statement does not start with CREATE: {statement}"
			);
			assert!(!statement.contains("--"), "comment leaked into statement: {statement}");
		}
	}
}
