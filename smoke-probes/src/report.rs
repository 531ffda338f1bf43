//! Plain-text rendering of probe results and the closing summary.
use crate::probe::ProbeMeta;
use smoke_common::{FailureKind, ProbeOutcome, truncate_chars};
use std::io::{self, Write};

pub const RULE_WIDTH: usize = 60;
const ITEM_CHARS: usize = 60;

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn write_header<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", rule())?;
    writeln!(out, "🔍 Testing External APIs")?;
    writeln!(out, "{}", rule())
}

pub fn write_banner<W: Write>(out: &mut W, meta: &ProbeMeta) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", meta.banner())
}

/// The per-probe diagnostic lines printed right after it runs.
pub fn write_outcome<W: Write>(out: &mut W, meta: &ProbeMeta, outcome: &ProbeOutcome) -> io::Result<()> {
    match outcome {
        ProbeOutcome::Pass(ev) => {
            writeln!(out, "✅ {} works! {}", meta.label, ev.summary)?;
            for note in &ev.notes {
                writeln!(out, "   {note}")?;
            }
            for (i, item) in ev.items.iter().enumerate() {
                writeln!(out, "   {}. {}...", i + 1, truncate_chars(item, ITEM_CHARS))?;
            }
            Ok(())
        }
        ProbeOutcome::Fail(f) => match f.kind {
            FailureKind::MissingCredential => writeln!(out, "❌ {}", f.message),
            FailureKind::Rejected => writeln!(out, "❌ {} failed: {}", meta.label, f.message),
            FailureKind::Transport => writeln!(out, "❌ {} error: {}", meta.label, f.message),
            FailureKind::EmptyResult => writeln!(out, "❌ {}: {}", meta.label, f.message),
        },
    }
}

/// One row of the result table.
#[derive(Debug, Clone)]
pub struct SummaryEntry {
    pub name: &'static str,
    pub outcome: ProbeOutcome,
}

/// Ordered name → outcome table for one run.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub entries: Vec<SummaryEntry>,
}

impl Summary {
    pub fn push(&mut self, name: &'static str, outcome: ProbeOutcome) {
        self.entries.push(SummaryEntry { name, outcome });
    }

    pub fn passed(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.passed()).count()
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Summary table, pass count and the configuration hint block.
    pub fn render<W: Write>(&self, out: &mut W, hints: &[String], env_file: &str) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", rule())?;
        writeln!(out, "📊 Test Summary")?;
        writeln!(out, "{}", rule())?;

        for entry in &self.entries {
            match &entry.outcome {
                ProbeOutcome::Pass(_) => writeln!(out, "✅ {}: PASS", entry.name)?,
                ProbeOutcome::Fail(f) => writeln!(out, "❌ {}: FAIL ({})", entry.name, f.kind)?,
            }
        }

        writeln!(out)?;
        writeln!(
            out,
            "📈 Results: {}/{} APIs working",
            self.passed(),
            self.total()
        )?;
        writeln!(out)?;
        writeln!(out, "💡 Tip: Add your API keys to {env_file} file")?;
        for hint in hints {
            writeln!(out, "   - {hint}")?;
        }
        writeln!(out, "   (Hacker News & Stack Exchange: No authentication needed)")?;
        writeln!(out, "{}", rule())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smoke_common::{Evidence, ProbeFailure};

    fn meta() -> ProbeMeta {
        ProbeMeta {
            name: "Stack Exchange",
            label: "Stack Exchange API",
            icon: "📚",
            focus: "",
        }
    }

    fn render_outcome(outcome: &ProbeOutcome) -> String {
        let mut buf = Vec::new();
        write_outcome(&mut buf, &meta(), outcome).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn pass_lists_notes_and_truncated_items() {
        let long = "x".repeat(80);
        let out = render_outcome(&ProbeOutcome::Pass(
            Evidence::new("Found 2 AI/ML/DL questions")
                .with_note("Quota remaining: 299")
                .with_items(["short", long.as_str()]),
        ));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "✅ Stack Exchange API works! Found 2 AI/ML/DL questions");
        assert_eq!(lines[1], "   Quota remaining: 299");
        assert_eq!(lines[2], "   1. short...");
        assert_eq!(lines[3], format!("   2. {}...", "x".repeat(60)));
    }

    #[test]
    fn failure_lines_depend_on_kind() {
        assert_eq!(
            render_outcome(&ProbeOutcome::Fail(ProbeFailure::rejected(500, "boom"))),
            "❌ Stack Exchange API failed: 500 - boom\n"
        );
        assert_eq!(
            render_outcome(&ProbeOutcome::Fail(ProbeFailure::missing_credential(&["K"]))),
            "❌ K not found in configuration\n"
        );
        assert!(
            render_outcome(&ProbeOutcome::Fail(ProbeFailure::transport("timed out")))
                .starts_with("❌ Stack Exchange API error: timed out")
        );
    }
}
