//! Maintenance of the workflow's rule include list.
//!
//! Pure text transformation; the caller owns reading and writing the file.

/// Relative path of the include list inside a rendered project.
pub const INCLUDES_FILE: &str = "workflow/rules/includes.smk";

/// The line registering `smk_file`, newline included.
pub fn include_line(smk_file: &str) -> String {
    format!("include: \"{smk_file}\"\n")
}

/// Append the include line for `smk_file` to `content`.
///
/// Returns `None` when the line is already present (compared with surrounding
/// whitespace trimmed). Trailing blank lines are dropped so the include line
/// becomes the last line of the file.
pub fn append_include(content: &str, smk_file: &str) -> Option<String> {
    let line = include_line(smk_file);
    if content.lines().any(|l| l.trim() == line.trim()) {
        return None;
    }

    let mut out = content.trim_end().to_owned();
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&line);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_after_existing_includes() {
        let content = "include: \"a.smk\"\n";
        assert_eq!(
            append_include(content, "b.smk").unwrap(),
            "include: \"a.smk\"\ninclude: \"b.smk\"\n"
        );
    }

    #[test]
    fn trailing_blank_lines_are_dropped() {
        let content = "include: \"a.smk\"\n\n\n";
        assert_eq!(
            append_include(content, "b.smk").unwrap(),
            "include: \"a.smk\"\ninclude: \"b.smk\"\n"
        );
    }

    #[test]
    fn already_present_is_a_no_op() {
        let content = "include: \"a.smk\"\n  include: \"b.smk\"  \n";
        assert!(append_include(content, "b.smk").is_none());
    }

    #[test]
    fn missing_final_newline_is_repaired() {
        assert_eq!(
            append_include("# rules", "x.smk").unwrap(),
            "# rules\ninclude: \"x.smk\"\n"
        );
    }

    #[test]
    fn empty_file_gets_single_line() {
        assert_eq!(append_include("", "x.smk").unwrap(), "include: \"x.smk\"\n");
    }
}
